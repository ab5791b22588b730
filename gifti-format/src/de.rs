use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::str::FromStr;

use crate::array::{checked_byte_len, ArrayBuffer, DataArray};
use crate::base64;
use crate::byte_order::Endian;
use crate::compression::ZlibCompressor;
use crate::enums::{DataType, Encoding, IndexOrder, Intent};
use crate::error::{GiftiError, Result};

/// Location of an `ExternalFileBinary` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalFile {
    /// Resolved path of the payload file.
    pub path: PathBuf,
    pub offset: u64,
}

/// Everything known about a data array before its `Data` text arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDecodeParams {
    pub intent: Intent,
    /// Element type of the stored payload.
    pub data_type: DataType,
    pub dimensions: Vec<usize>,
    pub encoding: Encoding,
    pub endian: Endian,
    pub index_order: IndexOrder,
    pub external_file: Option<ExternalFile>,
}

impl ArrayDecodeParams {
    /// Empty array shaped by these parameters, ready for [`DataArray::decode`].
    pub fn create_array(&self) -> DataArray {
        let mut array = DataArray::with_dimensions(self.intent, self.data_type, &self.dimensions);
        array.encoding = self.encoding;
        array.endian = self.endian;
        array.index_order = self.index_order;
        if let Some(external) = &self.external_file {
            array.external_file_name = external.path.to_string_lossy().into_owned();
            array.external_file_offset = external.offset;
        }
        array
    }
}

fn parse_ascii_values<T: FromStr>(tokens: &[&str], out: &mut [T]) -> Result<()> {
    for (value, token) in out.iter_mut().zip(tokens) {
        *value = token.parse().map_err(|_| {
            GiftiError::malformed(format!("ASCII data value \"{}\" is not a valid number", token))
        })?;
    }
    Ok(())
}

fn decode_ascii(text: &str, buffer: &mut ArrayBuffer) -> Result<()> {
    let tokens: Vec<&str> = text.split_ascii_whitespace().collect();
    if tokens.len() != buffer.len() {
        return Err(GiftiError::SizeMismatch {
            what: "ASCII data (values)",
            expected: buffer.len(),
            actual: tokens.len(),
        });
    }

    match buffer {
        ArrayBuffer::Float32(v) => parse_ascii_values(&tokens, v),
        ArrayBuffer::Int32(v) => parse_ascii_values(&tokens, v),
        ArrayBuffer::UInt8(v) => {
            let mut ints = vec![0i32; v.len()];
            parse_ascii_values(&tokens, &mut ints)?;
            for (byte, int) in v.iter_mut().zip(ints) {
                *byte = int as u8;
            }
            Ok(())
        }
    }
}

#[inline(always)]
fn base64_symbols(text: &str) -> Vec<u8> {
    text.bytes().filter(|b| !b.is_ascii_whitespace()).collect()
}

fn decode_base64(text: &str, byte_len: usize) -> Result<Vec<u8>> {
    let symbols = base64_symbols(text);
    let mut bytes = vec![0u8; byte_len];
    let decoded = base64::decode(&symbols, &mut bytes, None);
    if decoded != byte_len {
        return Err(GiftiError::SizeMismatch {
            what: "Base64 decoded data",
            expected: byte_len,
            actual: decoded,
        });
    }
    Ok(bytes)
}

fn decode_gzip_base64(text: &str, byte_len: usize) -> Result<Vec<u8>> {
    let symbols = base64_symbols(text);
    let mut compressed = vec![0u8; symbols.len() - symbols.len() / 4 + 10];
    let compressed_len = base64::decode(&symbols, &mut compressed, None);
    if compressed_len == 0 {
        return Err(GiftiError::malformed(
            "Base64 decoding of compressed data produced no bytes",
        ));
    }

    let mut bytes = vec![0u8; byte_len];
    let inflated = ZlibCompressor::default()
        .uncompress(&compressed[..compressed_len], &mut bytes)
        .map_err(|e| GiftiError::malformed(format!("Could not decompress data: {}", e)))?;
    if inflated != byte_len {
        return Err(GiftiError::SizeMismatch {
            what: "decompressed data",
            expected: byte_len,
            actual: inflated,
        });
    }
    Ok(bytes)
}

fn read_external(external: &ExternalFile, byte_len: usize) -> Result<Vec<u8>> {
    let path = &external.path;
    let mut file =
        File::open(path).map_err(|e| GiftiError::io("open external binary file", path, e))?;
    file.seek(SeekFrom::Start(external.offset))
        .map_err(|e| GiftiError::io("seek in external binary file", path, e))?;

    let mut bytes = vec![0u8; byte_len];
    file.read_exact(&mut bytes)
        .map_err(|e| GiftiError::io("read external binary file", path, e))?;
    Ok(bytes)
}

impl DataArray {
    /// Decodes the body of a `Data` element into this array.
    ///
    /// The buffer is reallocated from `params`, filled, byte swapped to host
    /// order, converted to the element type the intent calls for and finally
    /// stored row-major.
    pub fn decode(&mut self, params: &ArrayDecodeParams, text: &str) -> Result<()> {
        self.intent = params.intent;
        self.encoding = params.encoding;
        self.index_order = params.index_order;
        checked_byte_len(&params.dimensions, params.data_type).ok_or_else(|| {
            GiftiError::malformed(format!(
                "DataArray dimensions overflow: {:?} elements of {}",
                params.dimensions, params.data_type
            ))
        })?;
        self.dimensions = crate::array::normalize_dimensions(&params.dimensions);
        self.buffer = ArrayBuffer::zeroed(params.data_type, self.total_number_of_elements());

        let byte_len = self.buffer.byte_len();
        let raw = match params.encoding {
            Encoding::Ascii => {
                decode_ascii(text, &mut self.buffer)?;
                None
            }
            Encoding::Base64Binary => Some(decode_base64(text, byte_len)?),
            Encoding::GZipBase64Binary => Some(decode_gzip_base64(text, byte_len)?),
            Encoding::ExternalFileBinary => {
                let external = params.external_file.as_ref().ok_or_else(|| {
                    GiftiError::malformed("External binary data array has no external file name")
                })?;
                Some(read_external(external, byte_len)?)
            }
        };

        if let Some(bytes) = raw {
            self.buffer.copy_from_ne_bytes(&bytes);
            if !params.endian.is_host() {
                self.buffer.swap_bytes();
            }
        }
        self.endian = Endian::host();

        tracing::debug!(
            intent = %params.intent,
            data_type = %params.data_type,
            encoding = %params.encoding,
            elements = self.buffer.len(),
            bytes = byte_len,
            "decoded data array"
        );

        let required = self.intent.data_type();
        if required != params.data_type && self.intent != Intent::PointSet {
            self.convert_to_data_type(required);
        }

        if self.index_order == IndexOrder::ColumnMajor {
            self.convert_array_indexing_order()?;
        }

        self.modified = true;
        Ok(())
    }
}
