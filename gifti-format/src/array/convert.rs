//! Element type conversion and index order transposition.
//!
//! Conversions use plain `as` casts. Float to `u8` goes through `i32` so that
//! out of range values wrap (`300.0` becomes `44`) rather than saturate.

use crate::enums::{DataType, IndexOrder};

use super::ArrayBuffer;

#[inline(always)]
fn f32_to_u8(value: f32) -> u8 {
    value as i32 as u8
}

/// Converts every element of `buffer` to `data_type`.
pub fn convert_buffer(buffer: &ArrayBuffer, data_type: DataType) -> ArrayBuffer {
    use ArrayBuffer::*;

    match (buffer, data_type) {
        (Float32(v), DataType::Float32) => Float32(v.clone()),
        (Float32(v), DataType::Int32) => Int32(v.iter().map(|&x| x as i32).collect()),
        (Float32(v), DataType::UInt8) => UInt8(v.iter().map(|&x| f32_to_u8(x)).collect()),
        (Int32(v), DataType::Float32) => Float32(v.iter().map(|&x| x as f32).collect()),
        (Int32(v), DataType::Int32) => Int32(v.clone()),
        (Int32(v), DataType::UInt8) => UInt8(v.iter().map(|&x| x as u8).collect()),
        (UInt8(v), DataType::Float32) => Float32(v.iter().map(|&x| x as f32).collect()),
        (UInt8(v), DataType::Int32) => Int32(v.iter().map(|&x| x as i32).collect()),
        (UInt8(v), DataType::UInt8) => UInt8(v.clone()),
    }
}

/// Transposes a `rows × cols` matrix stored in `order`, leaving it stored in
/// the opposite order.
pub(crate) fn transpose<T: Copy>(data: &mut [T], rows: usize, cols: usize, order: IndexOrder) {
    debug_assert_eq!(data.len(), rows * cols);

    if rows == cols {
        for i in 1..rows {
            for j in 0..i {
                data.swap(i * cols + j, j * rows + i);
            }
        }
        return;
    }

    let copy = data.to_vec();
    match order {
        IndexOrder::RowMajor => {
            for i in 0..rows {
                for j in 0..cols {
                    data[j * rows + i] = copy[i * cols + j];
                }
            }
        }
        IndexOrder::ColumnMajor => {
            for i in 0..rows {
                for j in 0..cols {
                    data[i * cols + j] = copy[j * rows + i];
                }
            }
        }
    }
}
