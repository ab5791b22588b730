use std::collections::BTreeMap;
use std::fmt;

use byteorder::{ByteOrder, NativeEndian};

use crate::byte_order::{swap_in_place, Endian};
use crate::enums::{DataType, Encoding, IndexOrder, Intent};
use crate::error::{GiftiError, Result};
use crate::header::metadata_names;
use crate::matrix::TransformMatrix;
use crate::metadata::MetaData;

mod convert;

pub use self::convert::convert_buffer;

/// Typed element storage of a data array.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayBuffer {
    Float32(Vec<f32>),
    Int32(Vec<i32>),
    UInt8(Vec<u8>),
}

impl Default for ArrayBuffer {
    fn default() -> Self {
        ArrayBuffer::Float32(Vec::new())
    }
}

impl ArrayBuffer {
    pub fn zeroed(data_type: DataType, len: usize) -> ArrayBuffer {
        match data_type {
            DataType::Float32 => ArrayBuffer::Float32(vec![0.0; len]),
            DataType::Int32 => ArrayBuffer::Int32(vec![0; len]),
            DataType::UInt8 => ArrayBuffer::UInt8(vec![0; len]),
        }
    }

    #[inline(always)]
    pub fn data_type(&self) -> DataType {
        match self {
            ArrayBuffer::Float32(_) => DataType::Float32,
            ArrayBuffer::Int32(_) => DataType::Int32,
            ArrayBuffer::UInt8(_) => DataType::UInt8,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        match self {
            ArrayBuffer::Float32(v) => v.len(),
            ArrayBuffer::Int32(v) => v.len(),
            ArrayBuffer::UInt8(v) => v.len(),
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline(always)]
    pub fn byte_len(&self) -> usize {
        self.len() * self.data_type().size()
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            ArrayBuffer::Float32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<&[i32]> {
        match self {
            ArrayBuffer::Int32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<&[u8]> {
        match self {
            ArrayBuffer::UInt8(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32_mut(&mut self) -> Option<&mut [f32]> {
        match self {
            ArrayBuffer::Float32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32_mut(&mut self) -> Option<&mut [i32]> {
        match self {
            ArrayBuffer::Int32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u8_mut(&mut self) -> Option<&mut [u8]> {
        match self {
            ArrayBuffer::UInt8(v) => Some(v),
            _ => None,
        }
    }

    /// Resizes to `len` elements, zero filling new ones.
    pub(crate) fn resize(&mut self, len: usize) {
        match self {
            ArrayBuffer::Float32(v) => v.resize(len, 0.0),
            ArrayBuffer::Int32(v) => v.resize(len, 0),
            ArrayBuffer::UInt8(v) => v.resize(len, 0),
        }
    }

    pub(crate) fn fill_zero(&mut self) {
        match self {
            ArrayBuffer::Float32(v) => v.iter_mut().for_each(|x| *x = 0.0),
            ArrayBuffer::Int32(v) => v.iter_mut().for_each(|x| *x = 0),
            ArrayBuffer::UInt8(v) => v.iter_mut().for_each(|x| *x = 0),
        }
    }

    /// Removes `count` elements starting at `start`.
    pub(crate) fn remove_range(&mut self, start: usize, count: usize) {
        let range = start..start + count;
        match self {
            ArrayBuffer::Float32(v) => drop(v.drain(range)),
            ArrayBuffer::Int32(v) => drop(v.drain(range)),
            ArrayBuffer::UInt8(v) => drop(v.drain(range)),
        }
    }

    /// Raw bytes in host order.
    pub(crate) fn to_ne_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.byte_len()];
        match self {
            ArrayBuffer::Float32(v) => NativeEndian::write_f32_into(v, &mut bytes),
            ArrayBuffer::Int32(v) => NativeEndian::write_i32_into(v, &mut bytes),
            ArrayBuffer::UInt8(v) => bytes.copy_from_slice(v),
        }
        bytes
    }

    /// Fills the buffer from raw host order bytes. `bytes` must be exactly
    /// [`ArrayBuffer::byte_len`] long.
    pub(crate) fn copy_from_ne_bytes(&mut self, bytes: &[u8]) {
        assert_eq!(bytes.len(), self.byte_len(), "raw buffer length mismatch");
        match self {
            ArrayBuffer::Float32(v) => NativeEndian::read_f32_into(bytes, v),
            ArrayBuffer::Int32(v) => NativeEndian::read_i32_into(bytes, v),
            ArrayBuffer::UInt8(v) => v.copy_from_slice(bytes),
        }
    }

    /// Reverses the byte order of every element. Single byte elements are untouched.
    pub(crate) fn swap_bytes(&mut self) {
        match self {
            ArrayBuffer::Float32(v) => swap_in_place(v),
            ArrayBuffer::Int32(v) => swap_in_place(v),
            ArrayBuffer::UInt8(_) => {}
        }
    }

    pub(crate) fn transpose(&mut self, rows: usize, cols: usize, order: IndexOrder) {
        match self {
            ArrayBuffer::Float32(v) => convert::transpose(v, rows, cols, order),
            ArrayBuffer::Int32(v) => convert::transpose(v, rows, cols, order),
            ArrayBuffer::UInt8(v) => convert::transpose(v, rows, cols, order),
        }
    }
}

/// Dimensions padded to at least rank 2: `[n]` becomes `[n, 1]` and `[]` becomes `[0, 0]`.
pub fn normalize_dimensions(dimensions: &[usize]) -> Vec<usize> {
    match dimensions {
        [] => vec![0, 0],
        [n] => vec![*n, 1],
        dims => dims.to_vec(),
    }
}

/// Byte length of a buffer of `data_type` elements shaped by `dimensions`.
///
/// `None` when the size does not fit in memory addressing, i.e. the product
/// overflows or exceeds `isize::MAX` bytes.
pub fn checked_byte_len(dimensions: &[usize], data_type: DataType) -> Option<usize> {
    let bytes = dimensions
        .iter()
        .try_fold(data_type.size(), |acc, &d| acc.checked_mul(d))?;
    if bytes > isize::MAX as usize {
        return None;
    }
    Some(bytes)
}

/// One typed, multi-dimensional array of a GIFTI document.
#[derive(Debug, Clone)]
pub struct DataArray {
    pub(crate) intent: Intent,
    pub(crate) dimensions: Vec<usize>,
    pub(crate) encoding: Encoding,
    pub(crate) endian: Endian,
    pub(crate) index_order: IndexOrder,
    pub(crate) buffer: ArrayBuffer,
    pub(crate) external_file_name: String,
    pub(crate) external_file_offset: u64,
    pub(crate) matrices: Vec<TransformMatrix>,
    pub(crate) metadata: MetaData,
    pub(crate) modified: bool,
}

impl DataArray {
    /// Empty array holding the element type appropriate for `intent`.
    pub fn new(intent: Intent) -> DataArray {
        DataArray::with_dimensions(intent, intent.data_type(), &[])
    }

    pub fn with_dimensions(intent: Intent, data_type: DataType, dimensions: &[usize]) -> DataArray {
        let mut array = DataArray {
            intent,
            dimensions: Vec::new(),
            encoding: Encoding::default(),
            endian: Endian::host(),
            index_order: IndexOrder::default(),
            buffer: ArrayBuffer::zeroed(data_type, 0),
            external_file_name: String::new(),
            external_file_offset: 0,
            matrices: Vec::new(),
            metadata: MetaData::new(),
            modified: false,
        };
        array.set_dimensions(dimensions);
        array
    }

    /// Array owning `buffer`, whose length must equal the product of `dimensions`.
    pub fn from_buffer(intent: Intent, dimensions: &[usize], buffer: ArrayBuffer) -> DataArray {
        let mut array = DataArray::with_dimensions(intent, buffer.data_type(), dimensions);
        assert_eq!(
            buffer.len(),
            array.total_number_of_elements(),
            "buffer does not match dimensions {:?}",
            array.dimensions
        );
        array.buffer = buffer;
        array
    }

    /// Replaces the dimensions and reallocates the buffer, zero filled.
    pub fn set_dimensions(&mut self, dimensions: &[usize]) {
        self.dimensions = normalize_dimensions(dimensions);
        self.allocate(self.buffer.data_type());
    }

    fn allocate(&mut self, data_type: DataType) {
        self.buffer = ArrayBuffer::zeroed(data_type, self.total_number_of_elements());
        self.check_invariant();
        self.modified = true;
    }

    #[inline(always)]
    fn check_invariant(&self) {
        assert_eq!(
            self.buffer.byte_len(),
            self.total_number_of_elements() * self.buffer.data_type().size(),
            "buffer size does not match dimensions {:?}",
            self.dimensions
        );
    }

    #[inline(always)]
    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn set_intent(&mut self, intent: Intent) {
        self.intent = intent;
        self.modified = true;
    }

    #[inline(always)]
    pub fn data_type(&self) -> DataType {
        self.buffer.data_type()
    }

    #[inline(always)]
    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    #[inline(always)]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    #[inline(always)]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    #[inline(always)]
    pub fn index_order(&self) -> IndexOrder {
        self.index_order
    }

    #[inline(always)]
    pub fn buffer(&self) -> &ArrayBuffer {
        &self.buffer
    }

    /// Mutable access to the elements. Marks the array modified.
    pub fn buffer_mut(&mut self) -> &mut ArrayBuffer {
        self.modified = true;
        &mut self.buffer
    }

    pub fn number_of_rows(&self) -> usize {
        self.dimensions.first().copied().unwrap_or(0)
    }

    pub fn number_of_components(&self) -> usize {
        match self.dimensions.len() {
            0 => 0,
            1 => 1,
            _ => self.dimensions[1],
        }
    }

    pub fn total_number_of_elements(&self) -> usize {
        if self.dimensions.is_empty() {
            return 0;
        }
        self.dimensions.iter().product()
    }

    #[inline(always)]
    pub fn external_file_name(&self) -> &str {
        &self.external_file_name
    }

    #[inline(always)]
    pub fn external_file_offset(&self) -> u64 {
        self.external_file_offset
    }

    pub fn set_external_file_information<S: Into<String>>(&mut self, name: S, offset: u64) {
        self.external_file_name = name.into();
        self.external_file_offset = offset;
    }

    #[inline(always)]
    pub fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    #[inline(always)]
    pub fn metadata_mut(&mut self) -> &mut MetaData {
        &mut self.metadata
    }

    /// The `Name` metadata entry.
    pub fn name(&self) -> &str {
        self.metadata.get(metadata_names::NAME)
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.metadata.set(metadata_names::NAME, name);
    }

    #[inline(always)]
    pub fn matrices(&self) -> &[TransformMatrix] {
        &self.matrices
    }

    pub fn add_matrix(&mut self, matrix: TransformMatrix) {
        self.matrices.push(matrix);
        self.modified = true;
    }

    pub fn remove_matrix(&mut self, index: usize) -> Option<TransformMatrix> {
        if index >= self.matrices.len() {
            return None;
        }
        self.modified = true;
        Some(self.matrices.remove(index))
    }

    pub fn remove_all_matrices(&mut self) {
        self.matrices.clear();
        self.modified = true;
    }

    pub(crate) fn last_matrix_mut(&mut self) -> Option<&mut TransformMatrix> {
        self.matrices.last_mut()
    }

    /// Flat offset of the element at `indices`, following the array's index order.
    ///
    /// Missing trailing indices are taken as zero. Returns `None` when an index
    /// is out of range or there are more indices than dimensions.
    pub fn data_offset(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() > self.dimensions.len() {
            return None;
        }
        let index = |d: usize| indices.get(d).copied().unwrap_or(0);
        if (0..self.dimensions.len()).any(|d| index(d) >= self.dimensions[d]) {
            return None;
        }

        let mut offset = 0;
        let mut stride = 1;
        match self.index_order {
            IndexOrder::RowMajor => {
                for d in (0..self.dimensions.len()).rev() {
                    offset += index(d) * stride;
                    stride *= self.dimensions[d];
                }
            }
            IndexOrder::ColumnMajor => {
                for d in 0..self.dimensions.len() {
                    offset += index(d) * stride;
                    stride *= self.dimensions[d];
                }
            }
        }
        Some(offset)
    }

    pub fn get_f32(&self, indices: &[usize]) -> Option<f32> {
        let offset = self.data_offset(indices)?;
        self.buffer.as_f32().map(|v| v[offset])
    }

    pub fn get_i32(&self, indices: &[usize]) -> Option<i32> {
        let offset = self.data_offset(indices)?;
        self.buffer.as_i32().map(|v| v[offset])
    }

    pub fn get_u8(&self, indices: &[usize]) -> Option<u8> {
        let offset = self.data_offset(indices)?;
        self.buffer.as_u8().map(|v| v[offset])
    }

    /// Returns false when the indices are out of range or the element type differs.
    pub fn set_f32(&mut self, indices: &[usize], value: f32) -> bool {
        match (self.data_offset(indices), self.buffer.as_f32_mut()) {
            (Some(offset), Some(v)) => {
                v[offset] = value;
                self.modified = true;
                true
            }
            _ => false,
        }
    }

    /// Returns false when the indices are out of range or the element type differs.
    pub fn set_i32(&mut self, indices: &[usize], value: i32) -> bool {
        match (self.data_offset(indices), self.buffer.as_i32_mut()) {
            (Some(offset), Some(v)) => {
                v[offset] = value;
                self.modified = true;
                true
            }
            _ => false,
        }
    }

    /// Returns false when the indices are out of range or the element type differs.
    pub fn set_u8(&mut self, indices: &[usize], value: u8) -> bool {
        match (self.data_offset(indices), self.buffer.as_u8_mut()) {
            (Some(offset), Some(v)) => {
                v[offset] = value;
                self.modified = true;
                true
            }
            _ => false,
        }
    }

    /// Appends `count` zero filled rows.
    pub fn add_rows(&mut self, count: usize) {
        self.dimensions[0] += count;
        self.buffer.resize(self.total_number_of_elements());
        self.check_invariant();
        self.modified = true;
    }

    /// Removes the given rows. Duplicates and out of range rows are ignored.
    pub fn delete_rows(&mut self, rows: &[usize]) {
        if rows.is_empty() {
            return;
        }
        let mut rows: Vec<usize> = rows
            .iter()
            .copied()
            .filter(|&r| r < self.number_of_rows())
            .collect();
        rows.sort_unstable();
        rows.dedup();

        let row_len: usize = self.dimensions[1..].iter().product();
        for &row in rows.iter().rev() {
            self.buffer.remove_range(row * row_len, row_len);
        }
        self.dimensions[0] -= rows.len();
        self.check_invariant();
        self.modified = true;
    }

    /// Sets every element to zero and clears the metadata.
    pub fn zeroize(&mut self) {
        self.buffer.fill_zero();
        self.metadata.clear();
        self.modified = true;
    }

    /// Rewrites label keys through `converter`. Keys it does not contain become 0.
    /// Only integer arrays are touched.
    pub fn transfer_label_indices(&mut self, converter: &BTreeMap<i32, i32>) {
        if let Some(values) = self.buffer.as_i32_mut() {
            for value in values.iter_mut() {
                *value = converter.get(value).copied().unwrap_or(0);
            }
            self.modified = true;
        }
    }

    /// Smallest and largest element of a float array.
    pub fn min_max_float(&self) -> Option<(f32, f32)> {
        let values = self.buffer.as_f32()?;
        let mut iter = values.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Smallest and largest element of an integer array.
    pub fn min_max_int(&self) -> Option<(i32, i32)> {
        let values = self.buffer.as_i32()?;
        let lo = values.iter().copied().min()?;
        let hi = values.iter().copied().max()?;
        Some((lo, hi))
    }

    /// Converts the elements to `data_type`. A matching type is left as is.
    pub fn convert_to_data_type(&mut self, data_type: DataType) {
        if self.buffer.data_type() != data_type {
            self.buffer = convert_buffer(&self.buffer, data_type);
            self.check_invariant();
        }
        self.modified = true;
    }

    /// Transposes a rank-2 array between row-major and column-major storage
    /// and flips its index order.
    ///
    /// Dimensions are never swapped, for square and non-square arrays alike:
    /// `[rows, cols]` stays `[rows, cols]` and only the storage order and the
    /// index order flag change, so element accessors see the same logical
    /// matrix before and after. Arrays with a dimension of 1 are left
    /// untouched.
    pub fn convert_array_indexing_order(&mut self) -> Result<()> {
        if self.dimensions.len() > 2 {
            return Err(GiftiError::UnsupportedOperation(format!(
                "Row/column major order conversion is unavailable for arrays with {} dimensions",
                self.dimensions.len()
            )));
        }

        let (rows, cols) = (self.dimensions[0], self.dimensions[1]);
        if rows == 1 || cols == 1 {
            return Ok(());
        }

        self.buffer.transpose(rows, cols, self.index_order);
        self.index_order = self.index_order.flipped();
        self.modified = true;
        Ok(())
    }

    /// Applies fixups after an array has been read: point sets without a
    /// transform get an identity Talairach transform.
    pub fn validate_after_read(&mut self) {
        if self.intent == Intent::PointSet && self.matrices.is_empty() {
            tracing::warn!(
                intent = %self.intent,
                "point set array has no transformation matrix, adding identity transform"
            );
            self.matrices.push(TransformMatrix::talairach_identity());
        }
    }

    #[inline(always)]
    pub fn is_modified(&self) -> bool {
        self.modified || self.metadata.is_modified()
    }

    pub fn set_modified(&mut self) {
        self.modified = true;
    }

    pub fn clear_modified(&mut self) {
        self.modified = false;
        self.metadata.clear_modified();
    }
}

impl fmt::Display for DataArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.dimensions.iter().map(|d| d.to_string()).collect();
        writeln!(f, "Data Array")?;
        writeln!(f, "   DataType={}", self.data_type())?;
        writeln!(f, "   Intent={}", self.intent)?;
        writeln!(f, "   Dimensions={}", dims.join(","))?;
        write!(f, "   MetaData=")?;
        for (name, value) in &self.metadata {
            write!(f, "{}={} ", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_2x3() -> DataArray {
        DataArray::from_buffer(
            Intent::None,
            &[2, 3],
            ArrayBuffer::Float32(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
        )
    }

    #[test]
    fn dimensions_are_normalized() {
        let a = DataArray::with_dimensions(Intent::Shape, DataType::Float32, &[5]);
        assert_eq!(a.dimensions(), &[5, 1]);
        assert_eq!(a.buffer().len(), 5);

        let b = DataArray::new(Intent::Label);
        assert_eq!(b.dimensions(), &[0, 0]);
        assert_eq!(b.data_type(), DataType::Int32);
        assert_eq!(b.total_number_of_elements(), 0);
    }

    #[test]
    fn row_major_offsets() {
        let a = matrix_2x3();
        assert_eq!(a.data_offset(&[1, 2]), Some(5));
        assert_eq!(a.get_f32(&[1, 2]), Some(6.0));
        assert_eq!(a.get_f32(&[0, 1]), Some(2.0));
        assert_eq!(a.get_f32(&[2, 0]), None);
        assert_eq!(a.get_i32(&[0, 0]), None);
    }

    #[test]
    fn byte_len_is_checked() {
        assert_eq!(checked_byte_len(&[2, 3], DataType::Float32), Some(24));
        assert_eq!(checked_byte_len(&[0, 0], DataType::UInt8), Some(0));
        assert_eq!(checked_byte_len(&[1 << 32, 1 << 32], DataType::Float32), None);
        assert_eq!(checked_byte_len(&[usize::MAX / 2], DataType::Int32), None);
    }

    #[test]
    fn transpose_twice_restores() {
        let mut a = matrix_2x3();
        a.index_order = IndexOrder::ColumnMajor;
        let original = a.buffer().clone();

        a.convert_array_indexing_order().unwrap();
        assert_eq!(a.index_order(), IndexOrder::RowMajor);
        assert_eq!(a.dimensions(), &[2, 3]);
        assert_ne!(a.buffer(), &original);

        a.convert_array_indexing_order().unwrap();
        assert_eq!(a.index_order(), IndexOrder::ColumnMajor);
        assert_eq!(a.dimensions(), &[2, 3]);
        assert_eq!(a.buffer(), &original);
    }

    #[test]
    fn transpose_keeps_logical_elements() {
        // Column-major storage of [[1, 2, 3], [4, 5, 6]].
        let mut a = DataArray::from_buffer(
            Intent::None,
            &[2, 3],
            ArrayBuffer::Int32(vec![1, 4, 2, 5, 3, 6]),
        );
        a.index_order = IndexOrder::ColumnMajor;
        assert_eq!(a.get_i32(&[1, 2]), Some(6));
        a.convert_array_indexing_order().unwrap();
        assert_eq!(a.buffer(), &ArrayBuffer::Int32(vec![1, 2, 3, 4, 5, 6]));
        assert_eq!(a.get_i32(&[1, 2]), Some(6));
        assert_eq!(a.get_i32(&[0, 1]), Some(2));
    }

    #[test]
    fn transpose_square_twice_restores() {
        let mut a = DataArray::from_buffer(
            Intent::None,
            &[2, 2],
            ArrayBuffer::UInt8(vec![1, 2, 3, 4]),
        );
        a.convert_array_indexing_order().unwrap();
        assert_eq!(a.buffer(), &ArrayBuffer::UInt8(vec![1, 3, 2, 4]));
        a.convert_array_indexing_order().unwrap();
        assert_eq!(a.buffer(), &ArrayBuffer::UInt8(vec![1, 2, 3, 4]));
    }

    #[test]
    fn transpose_vector_is_noop() {
        for dims in [[4usize, 1], [1, 4]] {
            let mut a = DataArray::from_buffer(
                Intent::None,
                &dims,
                ArrayBuffer::Float32(vec![1.0, 2.0, 3.0, 4.0]),
            );
            a.index_order = IndexOrder::ColumnMajor;
            a.convert_array_indexing_order().unwrap();
            assert_eq!(a.index_order(), IndexOrder::ColumnMajor);
            assert_eq!(a.dimensions(), &dims);
            assert_eq!(a.buffer().as_f32().unwrap(), &[1.0, 2.0, 3.0, 4.0]);
        }
    }

    #[test]
    fn transpose_rank_three_fails() {
        let mut a = DataArray::with_dimensions(Intent::None, DataType::Float32, &[2, 2, 2]);
        match a.convert_array_indexing_order() {
            Err(GiftiError::UnsupportedOperation(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rows() {
        let mut a = matrix_2x3();
        a.add_rows(2);
        assert_eq!(a.dimensions(), &[4, 3]);
        assert_eq!(a.get_f32(&[3, 2]), Some(0.0));
        assert_eq!(a.get_f32(&[1, 2]), Some(6.0));

        a.delete_rows(&[0, 2, 2, 9]);
        assert_eq!(a.dimensions(), &[2, 3]);
        assert_eq!(a.buffer().as_f32().unwrap(), &[4.0, 5.0, 6.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn conversion_marks_modified() {
        let mut a = matrix_2x3();
        a.clear_modified();
        a.convert_to_data_type(DataType::Int32);
        assert!(a.is_modified());
        assert_eq!(a.get_i32(&[1, 0]), Some(4));
    }

    #[test]
    fn label_index_transfer() {
        let mut a = DataArray::from_buffer(Intent::Label, &[3], ArrayBuffer::Int32(vec![0, 1, 5]));
        let converter: BTreeMap<i32, i32> = [(0, 0), (1, 7)].into_iter().collect();
        a.transfer_label_indices(&converter);
        assert_eq!(a.buffer().as_i32().unwrap(), &[0, 7, 0]);
    }

    #[test]
    fn min_max() {
        let a = DataArray::from_buffer(Intent::Label, &[4], ArrayBuffer::Int32(vec![3, -2, 9, 0]));
        assert_eq!(a.min_max_int(), Some((-2, 9)));
        assert_eq!(a.min_max_float(), None);
        assert_eq!(matrix_2x3().min_max_float(), Some((1.0, 6.0)));
    }

    #[test]
    fn zeroize_clears_values_and_metadata() {
        let mut a = matrix_2x3();
        a.set_name("thickness");
        a.zeroize();
        assert_eq!(a.name(), "");
        assert!(a.buffer().as_f32().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn pointset_gets_identity_transform() {
        let mut a = DataArray::with_dimensions(Intent::PointSet, DataType::Float32, &[3, 3]);
        a.validate_after_read();
        assert_eq!(a.matrices().len(), 1);
        assert_eq!(a.matrices()[0].data_space, "NIFTI_XFORM_TALAIRACH");
        a.validate_after_read();
        assert_eq!(a.matrices().len(), 1);
    }
}
