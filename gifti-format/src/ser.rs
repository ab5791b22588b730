use std::fmt::Write as _;
use std::io::{Seek, Write};

use crate::array::{ArrayBuffer, DataArray};
use crate::base64;
use crate::compression::ZlibCompressor;
use crate::config::EncodeConfig;
use crate::enums::Encoding;
use crate::error::{GiftiError, Result};

/// Destination for `ExternalFileBinary` payloads.
///
/// Each encoded array is appended at the stream's current position, which
/// becomes the array's external file offset.
pub struct ExternalBinarySink<W> {
    inner: W,
    file_name: String,
}

impl<W: Write + Seek> ExternalBinarySink<W> {
    /// `file_name` is recorded in each array as written to the document.
    pub fn new<S: Into<String>>(inner: W, file_name: S) -> ExternalBinarySink<W> {
        ExternalBinarySink {
            inner,
            file_name: file_name.into(),
        }
    }

    #[inline(always)]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(GiftiError::Write)
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

fn write_ascii_rows(buffer: &ArrayBuffer, rows: usize, precision: usize) -> String {
    let mut text = String::with_capacity(buffer.len() * (precision + 4));
    let row_len = if rows == 0 { 0 } else { buffer.len() / rows };
    if row_len == 0 {
        return text;
    }

    // Writing to a String cannot fail.
    match buffer {
        ArrayBuffer::Float32(v) => {
            for row in v.chunks(row_len) {
                for value in row {
                    let _ = write!(text, "{:.*} ", precision, value);
                }
                text.push('\n');
            }
        }
        ArrayBuffer::Int32(v) => {
            for row in v.chunks(row_len) {
                for value in row {
                    let _ = write!(text, "{} ", value);
                }
                text.push('\n');
            }
        }
        ArrayBuffer::UInt8(v) => {
            for row in v.chunks(row_len) {
                for value in row {
                    let _ = write!(text, "{} ", value);
                }
                text.push('\n');
            }
        }
    }
    text
}

fn base64_text(bytes: &[u8]) -> String {
    let capacity = (bytes.len() * 3 / 2).max(base64::encoded_len(bytes.len()));
    let mut out = vec![0u8; capacity];
    let len = base64::encode(bytes, &mut out, false);
    out.truncate(len);
    out.into_iter().map(char::from).collect()
}

impl DataArray {
    /// Encodes the elements as the text of a `Data` element.
    ///
    /// `ExternalFileBinary` payloads do not live in the document; use
    /// [`DataArray::encode_external`] for those.
    pub fn encode_inline(&self, encoding: Encoding, config: &EncodeConfig) -> Result<String> {
        let text = match encoding {
            Encoding::Ascii => {
                write_ascii_rows(&self.buffer, self.number_of_rows(), config.float_precision)
            }
            Encoding::Base64Binary => base64_text(&self.buffer.to_ne_bytes()),
            Encoding::GZipBase64Binary => {
                let compressed = ZlibCompressor::new(config.compression_level)
                    .compress_to_vec(&self.buffer.to_ne_bytes())
                    .map_err(GiftiError::Write)?;
                base64_text(&compressed)
            }
            Encoding::ExternalFileBinary => {
                return Err(GiftiError::UnsupportedOperation(
                    "External binary data cannot be encoded inline".to_string(),
                ))
            }
        };

        tracing::debug!(
            intent = %self.intent,
            data_type = %self.data_type(),
            encoding = %encoding,
            elements = self.buffer.len(),
            chars = text.len(),
            "encoded data array"
        );
        Ok(text)
    }

    /// Appends the raw elements to `sink` and records the file name and
    /// offset they were written at.
    pub fn encode_external<W: Write + Seek>(
        &mut self,
        sink: &mut ExternalBinarySink<W>,
    ) -> Result<()> {
        let offset = sink.inner.stream_position().map_err(GiftiError::Write)?;
        let bytes = self.buffer.to_ne_bytes();
        sink.inner.write_all(&bytes).map_err(GiftiError::Write)?;

        self.external_file_name = sink.file_name.clone();
        self.external_file_offset = offset;

        tracing::debug!(
            intent = %self.intent,
            file = %sink.file_name,
            offset,
            bytes = bytes.len(),
            "wrote external binary data"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::de::ArrayDecodeParams;
    use crate::enums::{DataType, IndexOrder, Intent};
    use crate::Endian;

    fn sample() -> DataArray {
        DataArray::from_buffer(
            Intent::Shape,
            &[2, 2],
            ArrayBuffer::Float32(vec![0.5, -1.25, 3.0, 1.0e-7]),
        )
    }

    fn decode(array: &DataArray, encoding: Encoding, text: &str) -> DataArray {
        let params = ArrayDecodeParams {
            intent: array.intent(),
            data_type: array.data_type(),
            dimensions: array.dimensions().to_vec(),
            encoding,
            endian: Endian::host(),
            index_order: IndexOrder::RowMajor,
            external_file: None,
        };
        let mut decoded = params.create_array();
        decoded.decode(&params, text).unwrap();
        decoded
    }

    #[test]
    fn ascii_layout() {
        let text = sample()
            .encode_inline(Encoding::Ascii, &EncodeConfig::builtin().with_float_precision(2))
            .unwrap();
        assert_eq!(text, "0.50 -1.25 \n3.00 0.00 \n");

        let ints = DataArray::from_buffer(Intent::Triangle, &[1, 3], ArrayBuffer::Int32(vec![0, 1, 2]));
        assert_eq!(
            ints.encode_inline(Encoding::Ascii, &EncodeConfig::builtin()).unwrap(),
            "0 1 2 \n"
        );
    }

    #[test]
    fn ascii_precision_bounds_error() {
        let array = sample();
        let text = array.encode_inline(Encoding::Ascii, &EncodeConfig::builtin()).unwrap();
        let decoded = decode(&array, Encoding::Ascii, &text);
        let expected = array.buffer().as_f32().unwrap();
        for (a, b) in decoded.buffer().as_f32().unwrap().iter().zip(expected) {
            assert!((a - b).abs() <= 1.0e-6);
        }
    }

    #[test]
    fn binary_encodings_are_exact() {
        let array = sample();
        for encoding in [Encoding::Base64Binary, Encoding::GZipBase64Binary] {
            let text = array.encode_inline(encoding, &EncodeConfig::builtin()).unwrap();
            assert!(!text.contains(char::is_whitespace));
            assert_eq!(decode(&array, encoding, &text).buffer(), array.buffer());
        }
    }

    #[test]
    fn external_records_offsets() {
        let mut first = sample();
        let mut second = DataArray::from_buffer(Intent::Label, &[3], ArrayBuffer::Int32(vec![1, 2, 3]));
        let mut sink = ExternalBinarySink::new(Cursor::new(Vec::new()), "surface.gii.data");

        first.encode_external(&mut sink).unwrap();
        second.encode_external(&mut sink).unwrap();

        assert_eq!(first.external_file_offset(), 0);
        assert_eq!(second.external_file_offset(), 16);
        assert_eq!(second.external_file_name(), "surface.gii.data");
        assert_eq!(sink.into_inner().into_inner().len(), 28);
        assert!(first
            .encode_inline(Encoding::ExternalFileBinary, &EncodeConfig::builtin())
            .is_err());
        assert_eq!(second.data_type(), DataType::Int32);
    }
}
