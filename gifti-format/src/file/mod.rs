use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::array::{ArrayBuffer, DataArray};
use crate::enums::{DataType, Encoding, Intent};
use crate::error::{GiftiError, Result};
use crate::header::CURRENT_VERSION;
use crate::label::LabelTable;
use crate::metadata::MetaData;

#[cfg(feature = "reader")]
pub mod reader;
#[cfg(feature = "writer")]
pub mod writer;
#[cfg(feature = "writer")]
pub(crate) mod xml;

/// An in-memory GIFTI document.
#[derive(Debug, Clone)]
pub struct GiftiFile {
    pub(crate) data_arrays: Vec<DataArray>,
    pub(crate) metadata: MetaData,
    pub(crate) label_table: LabelTable,
    pub(crate) version: f32,
    pub(crate) encoding_for_writing: Encoding,
    pub(crate) file_name: Option<PathBuf>,
    pub(crate) modified: bool,
}

impl Default for GiftiFile {
    fn default() -> Self {
        GiftiFile::new()
    }
}

impl GiftiFile {
    pub fn new() -> GiftiFile {
        GiftiFile {
            data_arrays: Vec::new(),
            metadata: MetaData::new(),
            label_table: LabelTable::new(),
            version: CURRENT_VERSION,
            encoding_for_writing: Encoding::GZipBase64Binary,
            file_name: None,
            modified: false,
        }
    }

    /// Removes every array, all metadata and all labels.
    pub fn clear(&mut self) {
        self.data_arrays.clear();
        self.metadata.clear();
        self.label_table.clear();
        self.modified = true;
    }

    /// Version declared by the document this was read from.
    #[inline(always)]
    pub fn version(&self) -> f32 {
        self.version
    }

    #[inline(always)]
    pub fn file_name(&self) -> Option<&Path> {
        self.file_name.as_deref()
    }

    #[inline(always)]
    pub fn encoding_for_writing(&self) -> Encoding {
        self.encoding_for_writing
    }

    /// Encoding used for every array when the document is written.
    pub fn set_encoding_for_writing(&mut self, encoding: Encoding) {
        self.encoding_for_writing = encoding;
    }

    #[inline(always)]
    pub fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    #[inline(always)]
    pub fn metadata_mut(&mut self) -> &mut MetaData {
        &mut self.metadata
    }

    #[inline(always)]
    pub fn label_table(&self) -> &LabelTable {
        &self.label_table
    }

    #[inline(always)]
    pub fn label_table_mut(&mut self) -> &mut LabelTable {
        &mut self.label_table
    }

    #[inline(always)]
    pub fn number_of_data_arrays(&self) -> usize {
        self.data_arrays.len()
    }

    #[inline(always)]
    pub fn data_arrays(&self) -> &[DataArray] {
        &self.data_arrays
    }

    pub fn data_array(&self, index: usize) -> Option<&DataArray> {
        self.data_arrays.get(index)
    }

    pub fn data_array_mut(&mut self, index: usize) -> Option<&mut DataArray> {
        self.data_arrays.get_mut(index)
    }

    pub fn add_data_array(&mut self, array: DataArray) {
        self.data_arrays.push(array);
        self.modified = true;
    }

    pub fn remove_data_array(&mut self, index: usize) -> Option<DataArray> {
        if index >= self.data_arrays.len() {
            return None;
        }
        self.modified = true;
        Some(self.data_arrays.remove(index))
    }

    /// First array whose `Name` metadata is `name`.
    pub fn data_array_with_name(&self, name: &str) -> Option<&DataArray> {
        self.data_arrays.iter().find(|array| array.name() == name)
    }

    /// First array with the given intent.
    pub fn data_array_with_intent(&self, intent: Intent) -> Option<&DataArray> {
        self.data_arrays.iter().find(|array| array.intent() == intent)
    }

    /// Maps are the document's data arrays.
    #[inline(always)]
    pub fn number_of_maps(&self) -> usize {
        self.data_arrays.len()
    }

    /// Name of map `index`, or an empty string when out of range.
    pub fn map_name(&self, index: usize) -> &str {
        self.data_arrays.get(index).map(DataArray::name).unwrap_or("")
    }

    pub fn set_map_name<S: Into<String>>(&mut self, index: usize, name: S) -> bool {
        match self.data_arrays.get_mut(index) {
            Some(array) => {
                array.set_name(name);
                true
            }
            None => false,
        }
    }

    /// Names maps without a `Name` as `#1`, `#2`, ... by position.
    pub(crate) fn assign_default_map_names(&mut self) {
        for (i, array) in self.data_arrays.iter_mut().enumerate() {
            if array.name().is_empty() {
                array.set_name(format!("#{}", i + 1));
            }
        }
    }

    /// Appends `count` zero filled rows to every array.
    pub fn add_rows(&mut self, count: usize) {
        for array in self.data_arrays.iter_mut() {
            array.add_rows(count);
        }
        self.modified = true;
    }

    /// Zeroes the values and clears the metadata of array `index`.
    pub fn reset_data_array(&mut self, index: usize) {
        if let Some(array) = self.data_arrays.get_mut(index) {
            array.zeroize();
        }
    }

    pub fn is_modified(&self) -> bool {
        self.modified
            || self.metadata.is_modified()
            || self.label_table.is_modified()
            || self.data_arrays.iter().any(DataArray::is_modified)
    }

    pub fn clear_modified(&mut self) {
        self.modified = false;
        self.metadata.clear_modified();
        self.label_table.clear_modified();
        for array in self.data_arrays.iter_mut() {
            array.clear_modified();
        }
    }

    /// Differences between the arrays of this document and `other`.
    ///
    /// Elements are compared numerically; values further apart than
    /// `tolerance` count as different. An empty result means the documents
    /// hold the same data.
    pub fn compare(&self, other: &GiftiFile, tolerance: f32) -> Vec<String> {
        let mut messages = Vec::new();
        if self.data_arrays.len() != other.data_arrays.len() {
            messages.push(format!(
                "Number of data arrays differs: {} and {}",
                self.data_arrays.len(),
                other.data_arrays.len()
            ));
            return messages;
        }

        for (i, (a, b)) in self.data_arrays.iter().zip(&other.data_arrays).enumerate() {
            if a.dimensions() != b.dimensions() {
                messages.push(format!(
                    "Data array {} dimensions differ: {:?} and {:?}",
                    i,
                    a.dimensions(),
                    b.dimensions()
                ));
                continue;
            }
            if a.data_type() != b.data_type() {
                messages.push(format!(
                    "Data array {} data types differ: {} and {}",
                    i,
                    a.data_type(),
                    b.data_type()
                ));
                continue;
            }

            let left = element_values(a.buffer());
            let right = element_values(b.buffer());
            let mismatches: Vec<usize> = left
                .iter()
                .zip(&right)
                .enumerate()
                .filter(|(_, (x, y))| (*x - *y).abs() > tolerance as f64)
                .map(|(j, _)| j)
                .collect();
            if let Some(&first) = mismatches.first() {
                messages.push(format!(
                    "Data array {} has {} elements differing by more than {}; first at element {} ({} and {})",
                    i,
                    mismatches.len(),
                    tolerance,
                    first,
                    left[first],
                    right[first]
                ));
            }
        }
        messages
    }

    /// Appends the arrays, metadata and labels of `other`.
    ///
    /// Label arrays from `other` are rewritten to the keys their labels
    /// receive in this document.
    pub fn append(&mut self, other: &GiftiFile) {
        self.metadata.append(&other.metadata);
        let key_map = self.label_table.append(&other.label_table);
        for array in &other.data_arrays {
            let mut array = array.clone();
            if array.intent() == Intent::Label {
                array.transfer_label_indices(&key_map);
            }
            self.data_arrays.push(array);
        }
        self.modified = true;
    }

    /// Expands sparse node data.
    ///
    /// When the document holds a `NIFTI_INTENT_NODE_INDEX` array, every other
    /// array holds one row per listed node. Those rows are scattered into
    /// dense arrays covering nodes `0..=max(index)`, unlisted nodes are zero,
    /// and the node index array is removed.
    pub fn process_node_index_arrays(&mut self) -> Result<()> {
        let position = match self
            .data_arrays
            .iter()
            .position(|array| array.intent() == Intent::NodeIndex)
        {
            Some(position) => position,
            None => return Ok(()),
        };

        let nodes: Vec<usize> = {
            let index_array = &self.data_arrays[position];
            let values = index_array.buffer().as_i32().ok_or_else(|| {
                GiftiError::malformed(format!(
                    "Node index array has data type {} but should be {}",
                    index_array.data_type(),
                    DataType::Int32
                ))
            })?;
            values
                .iter()
                .map(|&node| {
                    usize::try_from(node).map_err(|_| {
                        GiftiError::malformed(format!("Node index {} is negative", node))
                    })
                })
                .collect::<Result<_>>()?
        };
        let number_of_nodes = nodes.iter().max().map_or(0, |&max| max + 1);

        for (i, array) in self.data_arrays.iter_mut().enumerate() {
            if i == position {
                continue;
            }
            if array.number_of_rows() != nodes.len() {
                return Err(GiftiError::SizeMismatch {
                    what: "sparse data array rows",
                    expected: nodes.len(),
                    actual: array.number_of_rows(),
                });
            }

            let row_len: usize = array.dimensions[1..].iter().product();
            array.buffer = scatter_rows(&array.buffer, &nodes, row_len, number_of_nodes);
            array.dimensions[0] = number_of_nodes;
            array.modified = true;
        }

        tracing::debug!(
            listed = nodes.len(),
            nodes = number_of_nodes,
            "expanded sparse node data"
        );
        self.data_arrays.remove(position);
        self.modified = true;
        Ok(())
    }
}

fn element_values(buffer: &ArrayBuffer) -> Vec<f64> {
    match buffer {
        ArrayBuffer::Float32(v) => v.iter().map(|&x| x as f64).collect(),
        ArrayBuffer::Int32(v) => v.iter().map(|&x| x as f64).collect(),
        ArrayBuffer::UInt8(v) => v.iter().map(|&x| x as f64).collect(),
    }
}

fn scatter<T: Copy + Default>(values: &[T], targets: &[usize], row_len: usize, rows: usize) -> Vec<T> {
    let mut dense = vec![T::default(); rows * row_len];
    for (row, &target) in values.chunks(row_len.max(1)).zip(targets) {
        dense[target * row_len..(target + 1) * row_len].copy_from_slice(row);
    }
    dense
}

/// Moves row `i` of `buffer` to row `targets[i]` of a zeroed buffer of `rows` rows.
fn scatter_rows(buffer: &ArrayBuffer, targets: &[usize], row_len: usize, rows: usize) -> ArrayBuffer {
    match buffer {
        ArrayBuffer::Float32(v) => ArrayBuffer::Float32(scatter(v, targets, row_len, rows)),
        ArrayBuffer::Int32(v) => ArrayBuffer::Int32(scatter(v, targets, row_len, rows)),
        ArrayBuffer::UInt8(v) => ArrayBuffer::UInt8(scatter(v, targets, row_len, rows)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Label;

    fn shape(values: Vec<f32>) -> DataArray {
        let n = values.len();
        DataArray::from_buffer(Intent::Shape, &[n], ArrayBuffer::Float32(values))
    }

    #[test]
    fn new_document() {
        let file = GiftiFile::new();
        assert_eq!(file.number_of_maps(), 0);
        assert_eq!(file.label_table().label_name(0), "???");
        assert_eq!(file.version(), 1.0);
        assert!(!file.is_modified());
    }

    #[test]
    fn map_names() {
        let mut file = GiftiFile::new();
        file.add_data_array(shape(vec![1.0]));
        file.add_data_array(shape(vec![2.0]));
        file.set_map_name(1, "curvature");
        file.assign_default_map_names();

        assert_eq!(file.map_name(0), "#1");
        assert_eq!(file.map_name(1), "curvature");
        assert_eq!(file.map_name(2), "");
        assert!(!file.set_map_name(5, "nothing"));
        assert_eq!(
            file.data_array_with_name("curvature").and_then(|a| a.get_f32(&[0])),
            Some(2.0)
        );
    }

    #[test]
    fn modified_is_aggregated() {
        let mut file = GiftiFile::new();
        file.add_data_array(shape(vec![1.0, 2.0]));
        file.clear_modified();
        assert!(!file.is_modified());

        file.data_array_mut(0).unwrap().set_f32(&[1], 5.0);
        assert!(file.is_modified());
        file.clear_modified();

        file.label_table_mut().add_label_named("sulcus", [0.0, 0.0, 1.0, 1.0]);
        assert!(file.is_modified());
    }

    #[test]
    fn compare_with_tolerance() {
        let mut a = GiftiFile::new();
        a.add_data_array(shape(vec![1.0, 2.0, 3.0]));
        let mut b = GiftiFile::new();
        b.add_data_array(shape(vec![1.0, 2.05, 3.0]));

        assert!(a.compare(&b, 0.1).is_empty());
        let messages = a.compare(&b, 0.01);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("first at element 1"), "{}", messages[0]);

        b.add_data_array(shape(vec![0.0]));
        assert_eq!(a.compare(&b, 1.0).len(), 1);
    }

    #[test]
    fn append_remaps_label_keys() {
        let mut a = GiftiFile::new();
        a.label_table_mut().insert_label(Label::new(1, "cortex", [1.0, 0.0, 0.0, 1.0]));

        let mut b = GiftiFile::new();
        b.label_table_mut().insert_label(Label::new(1, "white", [0.0, 1.0, 0.0, 1.0]));
        b.metadata_mut().set("Comment", "second");
        b.add_data_array(DataArray::from_buffer(
            Intent::Label,
            &[3],
            ArrayBuffer::Int32(vec![0, 1, 1]),
        ));

        a.append(&b);
        assert_eq!(a.metadata().get("Comment"), "second");
        assert_eq!(a.number_of_data_arrays(), 1);
        let labels = a.data_array(0).unwrap().buffer().as_i32().unwrap().to_vec();
        for key in labels {
            let name = a.label_table().label_name(key);
            assert!(name == "???" || name == "white", "{}", name);
        }
    }

    #[test]
    fn node_index_expansion() {
        let mut file = GiftiFile::new();
        file.add_data_array(DataArray::from_buffer(
            Intent::NodeIndex,
            &[2],
            ArrayBuffer::Int32(vec![3, 1]),
        ));
        file.add_data_array(DataArray::from_buffer(
            Intent::Shape,
            &[2, 2],
            ArrayBuffer::Float32(vec![1.0, 2.0, 3.0, 4.0]),
        ));

        file.process_node_index_arrays().unwrap();
        assert_eq!(file.number_of_data_arrays(), 1);
        let array = file.data_array(0).unwrap();
        assert_eq!(array.dimensions(), &[4, 2]);
        assert_eq!(
            array.buffer().as_f32().unwrap(),
            &[0.0, 0.0, 3.0, 4.0, 0.0, 0.0, 1.0, 2.0]
        );
    }

    #[test]
    fn node_index_rows_must_match() {
        let mut file = GiftiFile::new();
        file.add_data_array(DataArray::from_buffer(
            Intent::NodeIndex,
            &[2],
            ArrayBuffer::Int32(vec![0, 1]),
        ));
        file.add_data_array(shape(vec![1.0, 2.0, 3.0]));
        assert!(matches!(
            file.process_node_index_arrays(),
            Err(GiftiError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn remove_and_reset() {
        let mut file = GiftiFile::new();
        let mut array = shape(vec![1.0, 2.0]);
        array.set_name("thickness");
        file.add_data_array(array);
        file.add_data_array(DataArray::new(Intent::Triangle));

        assert!(file.data_array_with_intent(Intent::Triangle).is_some());
        assert!(file.remove_data_array(1).is_some());
        assert!(file.remove_data_array(1).is_none());

        file.add_rows(1);
        assert_eq!(file.data_array(0).unwrap().dimensions(), &[3, 1]);

        file.reset_data_array(0);
        let array = file.data_array(0).unwrap();
        assert_eq!(array.name(), "");
        assert_eq!(array.min_max_float(), Some((0.0, 0.0)));
    }
}
