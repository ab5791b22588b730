use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use super::xml::XmlWriter;
use super::GiftiFile;
use crate::array::DataArray;
use crate::byte_order::Endian;
use crate::config::EncodeConfig;
use crate::enums::{Encoding, Intent};
use crate::error::{GiftiError, Result};
use crate::header::{
    attrs, tags, CURRENT_VERSION, DOCTYPE, EXTERNAL_DATA_EXTENSION, XML_ENCODING, XML_VERSION,
};
use crate::label::LabelTable;
use crate::matrix::TransformMatrix;
use crate::metadata::MetaData;
use crate::ser::ExternalBinarySink;

/// Arrays without rows are left out of written documents.
#[inline(always)]
pub(crate) fn is_writable(array: &DataArray) -> bool {
    array.number_of_rows() > 0
}

/// Dimensions as written: trailing dimensions of 1 after the first are dropped.
pub(crate) fn written_dimensions(dimensions: &[usize]) -> &[usize] {
    let mut len = dimensions.len();
    while len > 1 && dimensions[len - 1] == 1 {
        len -= 1;
    }
    &dimensions[..len]
}

/// Path of the external binary file that accompanies `path`.
pub fn external_data_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(EXTERNAL_DATA_EXTENSION);
    PathBuf::from(name)
}

/// Streams a GIFTI document: [`start`](Self::start), one
/// [`write_data_array`](Self::write_data_array) per array, then
/// [`finish`](Self::finish).
pub struct GiftiFileWriter<W: Write, X = BufWriter<File>> {
    xml: XmlWriter<W>,
    encoding: Encoding,
    config: EncodeConfig,
    external: Option<ExternalBinarySink<X>>,
}

impl<W: Write, X: Write + Seek> GiftiFileWriter<W, X> {
    /// `external` receives the payloads when `encoding` is `ExternalFileBinary`
    /// and is required in that case.
    pub fn new(
        inner: W,
        encoding: Encoding,
        config: EncodeConfig,
        external: Option<ExternalBinarySink<X>>,
    ) -> Result<GiftiFileWriter<W, X>> {
        if encoding.is_external() && external.is_none() {
            return Err(GiftiError::UnsupportedOperation(
                "External binary encoding needs a destination for the binary data".to_string(),
            ));
        }
        Ok(GiftiFileWriter {
            xml: XmlWriter::new(inner),
            encoding,
            config,
            external,
        })
    }

    /// Writes the prologue, the root element, document metadata and labels.
    pub fn start(
        &mut self,
        number_of_arrays: usize,
        metadata: &MetaData,
        labels: &LabelTable,
    ) -> Result<()> {
        self.xml.write_declaration(XML_VERSION, XML_ENCODING)?;
        self.xml.write_doctype(DOCTYPE)?;
        self.xml.start_element(
            tags::GIFTI,
            &[
                (attrs::VERSION, format!("{:.1}", CURRENT_VERSION)),
                (attrs::NUMBER_OF_DATA_ARRAYS, number_of_arrays.to_string()),
            ],
        )?;
        self.write_metadata(metadata)?;
        self.write_label_table(labels)
    }

    fn write_metadata(&mut self, metadata: &MetaData) -> Result<()> {
        self.xml.start_element(tags::METADATA, &[])?;
        for (name, value) in metadata {
            self.xml.start_element(tags::METADATA_ENTRY, &[])?;
            self.xml.write_element_cdata(tags::METADATA_NAME, name)?;
            self.xml.write_element_cdata(tags::METADATA_VALUE, value)?;
            self.xml.end_element()?;
        }
        self.xml.end_element()
    }

    fn write_label_table(&mut self, labels: &LabelTable) -> Result<()> {
        self.xml.start_element(tags::LABEL_TABLE, &[])?;
        for label in labels.iter() {
            let [r, g, b, a] = label.rgba;
            let mut attributes = vec![
                (attrs::LABEL_KEY, label.key.to_string()),
                (attrs::LABEL_RED, r.to_string()),
                (attrs::LABEL_GREEN, g.to_string()),
                (attrs::LABEL_BLUE, b.to_string()),
                (attrs::LABEL_ALPHA, a.to_string()),
            ];
            if let Some([x, y, z]) = label.xyz {
                attributes.push((attrs::LABEL_X, x.to_string()));
                attributes.push((attrs::LABEL_Y, y.to_string()));
                attributes.push((attrs::LABEL_Z, z.to_string()));
            }
            self.xml.start_element(tags::LABEL, &attributes)?;
            self.xml.write_cdata(&label.name)?;
            self.xml.end_element()?;
        }
        self.xml.end_element()
    }

    fn write_matrix(&mut self, matrix: &TransformMatrix) -> Result<()> {
        self.xml.start_element(tags::MATRIX, &[])?;
        self.xml
            .write_element_cdata(tags::MATRIX_DATA_SPACE, &matrix.data_space)?;
        self.xml
            .write_element_cdata(tags::MATRIX_TRANSFORMED_SPACE, &matrix.transformed_space)?;
        self.xml
            .write_element_characters(tags::MATRIX_DATA, &matrix.to_row_major_text())?;
        self.xml.end_element()
    }

    /// Writes one data array. Arrays without rows are skipped.
    ///
    /// With external binary encoding the array's external file name and
    /// offset are updated to where its payload was written.
    pub fn write_data_array(&mut self, array: &mut DataArray) -> Result<()> {
        if !is_writable(array) {
            tracing::debug!(intent = %array.intent(), "skipping data array without rows");
            return Ok(());
        }

        let data = if self.encoding.is_external() {
            let sink = self.external.as_mut().ok_or_else(|| {
                GiftiError::UnsupportedOperation(
                    "External binary encoding needs a destination for the binary data".to_string(),
                )
            })?;
            array.encode_external(sink)?;
            None
        } else {
            Some(array.encode_inline(self.encoding, &self.config)?)
        };

        let dimensions = written_dimensions(array.dimensions());
        let (external_name, external_offset) = if data.is_none() {
            (
                array.external_file_name().to_string(),
                array.external_file_offset().to_string(),
            )
        } else {
            (String::new(), String::new())
        };

        let dim_names: Vec<String> = (0..dimensions.len())
            .map(|i| format!("{}{}", attrs::DIM_PREFIX, i))
            .collect();
        let mut attributes = vec![
            (attrs::INTENT, array.intent().name().to_string()),
            (attrs::DATA_TYPE, array.data_type().name().to_string()),
            (attrs::INDEXING_ORDER, array.index_order().name().to_string()),
            (attrs::DIMENSIONALITY, dimensions.len().to_string()),
        ];
        for (name, dim) in dim_names.iter().zip(dimensions) {
            attributes.push((name.as_str(), dim.to_string()));
        }
        attributes.push((attrs::ENCODING, self.encoding.name().to_string()));
        attributes.push((attrs::ENDIAN, Endian::host().gifti_name().to_string()));
        attributes.push((attrs::EXTERNAL_FILE_NAME, external_name));
        attributes.push((attrs::EXTERNAL_FILE_OFFSET, external_offset));

        self.xml.start_element(tags::DATA_ARRAY, &attributes)?;
        self.write_metadata(array.metadata())?;

        if array.matrices().is_empty() && array.intent() == Intent::PointSet {
            self.write_matrix(&TransformMatrix::talairach_identity())?;
        }
        for matrix in array.matrices() {
            self.write_matrix(matrix)?;
        }

        match data {
            Some(text) => self.xml.write_element_characters(tags::DATA, &text)?,
            None => {
                self.xml.start_element(tags::DATA, &[])?;
                self.xml.end_element()?;
            }
        }
        self.xml.end_element()
    }

    /// Closes the document and flushes the external binary file, if any.
    pub fn finish(mut self) -> Result<W> {
        if let Some(sink) = self.external.as_mut() {
            sink.flush()?;
        }
        let mut inner = self.xml.finish()?;
        inner.flush().map_err(GiftiError::Write)?;
        Ok(inner)
    }
}

impl GiftiFile {
    fn write_document<W: Write, X: Write + Seek>(
        &mut self,
        out: W,
        external: Option<ExternalBinarySink<X>>,
        config: EncodeConfig,
    ) -> Result<W> {
        let count = self.data_arrays.iter().filter(|a| is_writable(a)).count();
        let mut writer = GiftiFileWriter::new(out, self.encoding_for_writing, config, external)?;
        writer.start(count, &self.metadata, &self.label_table)?;
        for array in self.data_arrays.iter_mut() {
            writer.write_data_array(array)?;
        }
        let out = writer.finish()?;

        tracing::debug!(
            arrays = count,
            encoding = %self.encoding_for_writing,
            "wrote GIFTI document"
        );
        self.clear_modified();
        Ok(out)
    }

    /// Writes the document to `path` using the process wide encode defaults.
    ///
    /// With external binary encoding the payloads go to `<path>.data`.
    pub fn write_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.write_file_with_config(path, EncodeConfig::default())
    }

    pub fn write_file_with_config<P: AsRef<Path>>(
        &mut self,
        path: P,
        config: EncodeConfig,
    ) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| GiftiError::io("create GIFTI file", path, e))?;

        let external = if self.encoding_for_writing.is_external() {
            let data_path = external_data_path(path);
            let data_file = File::create(&data_path)
                .map_err(|e| GiftiError::io("create external binary file", &data_path, e))?;
            let data_name = data_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            Some(ExternalBinarySink::new(BufWriter::new(data_file), data_name))
        } else {
            None
        };

        self.write_document(BufWriter::new(file), external, config)?;
        self.file_name = Some(path.to_path_buf());
        Ok(())
    }

    /// Writes the document to `out`. External binary encoding needs a file
    /// next to the document and is only available through [`GiftiFile::write_file`].
    pub fn write_to<W: Write>(&mut self, out: W) -> Result<W> {
        self.write_to_with_config(out, EncodeConfig::default())
    }

    pub fn write_to_with_config<W: Write>(&mut self, out: W, config: EncodeConfig) -> Result<W> {
        self.write_document::<W, BufWriter<File>>(out, None, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::ArrayBuffer;
    use crate::enums::DataType;

    #[test]
    fn trailing_unit_dimensions_are_dropped() {
        assert_eq!(written_dimensions(&[5, 1]), &[5]);
        assert_eq!(written_dimensions(&[1, 1]), &[1]);
        assert_eq!(written_dimensions(&[5, 3, 1]), &[5, 3]);
        assert_eq!(written_dimensions(&[5, 3]), &[5, 3]);
    }

    #[test]
    fn data_path() {
        assert_eq!(
            external_data_path(Path::new("/tmp/lh.shape.gii")),
            PathBuf::from("/tmp/lh.shape.gii.data")
        );
    }

    #[test]
    fn external_needs_destination() {
        let result = GiftiFileWriter::<Vec<u8>>::new(
            Vec::new(),
            Encoding::ExternalFileBinary,
            EncodeConfig::builtin(),
            None,
        );
        assert!(matches!(result, Err(GiftiError::UnsupportedOperation(_))));

        let mut file = GiftiFile::new();
        file.set_encoding_for_writing(Encoding::ExternalFileBinary);
        assert!(file.write_to(Vec::new()).is_err());
    }

    #[test]
    fn document_layout() {
        let mut file = GiftiFile::new();
        file.metadata_mut().set("Caret-Version", "5.6");
        let mut points = DataArray::with_dimensions(Intent::PointSet, DataType::Float32, &[1, 3]);
        points.set_name("pial");
        file.add_data_array(points);
        file.add_data_array(DataArray::with_dimensions(Intent::Shape, DataType::Float32, &[0]));
        file.set_encoding_for_writing(Encoding::Ascii);

        let out = file.write_to(Vec::new()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("<!DOCTYPE GIFTI SYSTEM"));
        assert!(text.contains("<GIFTI Version=\"1.0\" NumberOfDataArrays=\"1\">"));
        assert!(text.contains("<Name><![CDATA[Caret-Version]]></Name>"));
        assert!(text.contains("<Label Key=\"0\" Red=\"1\" Green=\"1\" Blue=\"1\" Alpha=\"1\"><![CDATA[???]]></Label>"));
        assert!(text.contains("Dimensionality=\"2\" Dim0=\"1\" Dim1=\"3\" Encoding=\"ASCII\""));
        assert!(text.contains("<DataSpace><![CDATA[NIFTI_XFORM_TALAIRACH]]></DataSpace>"));
        assert!(text.contains("<Data>0.000000 0.000000 0.000000 \n</Data>"));
        assert!(!file.is_modified());
    }

    #[test]
    fn vector_dimensions_written_as_rank_one() {
        let mut file = GiftiFile::new();
        file.add_data_array(DataArray::from_buffer(
            Intent::Shape,
            &[3],
            ArrayBuffer::Float32(vec![1.0, 2.0, 3.0]),
        ));
        file.set_encoding_for_writing(Encoding::Base64Binary);
        let text = String::from_utf8(file.write_to(Vec::new()).unwrap()).unwrap();
        assert!(text.contains("Dimensionality=\"1\" Dim0=\"3\" Encoding=\"Base64Binary\""));

        let back = GiftiFile::read_from(text.as_bytes()).unwrap();
        assert_eq!(back.data_array(0).unwrap().dimensions(), &[3, 1]);
        assert_eq!(back.data_array(0).unwrap().buffer(), file.data_array(0).unwrap().buffer());
    }
}
