//! Writing documents to disk and reading them back.

use std::io::{Seek, SeekFrom, Write};

use gifti_format::{
    ArrayBuffer, DataArray, DataType, EncodeConfig, Encoding, GiftiFile, Intent, Label,
    TransformMatrix,
};
use tempfile::TempDir;

/// A document with one array of each element type.
fn sample_document() -> GiftiFile {
    let mut file = GiftiFile::new();
    file.metadata_mut().set("Comment", "written by a test & read back");
    file.label_table_mut()
        .insert_label(Label::new(5, "precentral", [0.25, 0.5, 0.75, 1.0]));

    let mut coords = DataArray::from_buffer(
        Intent::PointSet,
        &[3, 3],
        ArrayBuffer::Float32(vec![
            -12.5, 0.125, 3.0, 1.0e-3, 42.0, -0.5, 7.25, 8.5, 9.75,
        ]),
    );
    let mut transform = TransformMatrix::identity();
    transform.data_space = "NIFTI_XFORM_UNKNOWN".to_string();
    transform.transformed_space = "NIFTI_XFORM_TALAIRACH".to_string();
    transform.matrix[0][3] = 10.0;
    coords.add_matrix(transform);
    coords.set_name("coordinates");
    file.add_data_array(coords);

    let mut labels = DataArray::from_buffer(
        Intent::Label,
        &[4],
        ArrayBuffer::Int32(vec![0, 5, 5, 0]),
    );
    labels.set_name("parcels");
    file.add_data_array(labels);

    // Point sets keep their stored element type.
    let mut mask = DataArray::from_buffer(
        Intent::PointSet,
        &[2, 2],
        ArrayBuffer::UInt8(vec![0, 17, 200, 255]),
    );
    mask.set_name("mask");
    file.add_data_array(mask);
    file
}

fn assert_same_document(read: &GiftiFile, written: &GiftiFile, tolerance: f32) {
    assert_eq!(read.number_of_data_arrays(), written.number_of_data_arrays());
    assert_eq!(read.metadata(), written.metadata());
    assert_eq!(read.label_table(), written.label_table());
    assert!(
        read.compare(written, tolerance).is_empty(),
        "{:?}",
        read.compare(written, tolerance)
    );

    for (a, b) in read.data_arrays().iter().zip(written.data_arrays()) {
        assert_eq!(a.intent(), b.intent());
        assert_eq!(a.data_type(), b.data_type());
        assert_eq!(a.name(), b.name());
    }

    let coords = read.data_array_with_name("coordinates").unwrap();
    assert_eq!(coords.matrices().len(), 1);
    assert_eq!(coords.matrices()[0].matrix[0][3], 10.0);
    assert_eq!(coords.matrices()[0].data_space, "NIFTI_XFORM_UNKNOWN");
}

/// Binary encodings reproduce every element exactly.
#[test]
fn binary_round_trip() {
    let temp_dir = TempDir::new().unwrap();

    for encoding in [
        Encoding::Base64Binary,
        Encoding::GZipBase64Binary,
        Encoding::ExternalFileBinary,
    ] {
        let path = temp_dir.path().join(format!("{}.surf.gii", encoding));
        let mut written = sample_document();
        written.set_encoding_for_writing(encoding);
        written.write_file(&path).unwrap();
        assert!(!written.is_modified());

        let read = GiftiFile::read_file(&path).unwrap();
        assert_eq!(read.file_name(), Some(path.as_path()));
        assert_same_document(&read, &written, 0.0);
        for (a, b) in read.data_arrays().iter().zip(written.data_arrays()) {
            assert_eq!(a.buffer(), b.buffer());
            assert_eq!(a.encoding(), encoding);
        }
    }
}

/// ASCII values survive within the configured precision.
#[test]
fn ascii_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ascii.surf.gii");

    let mut written = sample_document();
    written.set_encoding_for_writing(Encoding::Ascii);
    written
        .write_file_with_config(&path, EncodeConfig::builtin().with_float_precision(4))
        .unwrap();

    let read = GiftiFile::read_file(&path).unwrap();
    assert_same_document(&read, &written, 1.0e-4);
    assert_eq!(
        read.data_array_with_name("parcels").unwrap().buffer(),
        &ArrayBuffer::Int32(vec![0, 5, 5, 0])
    );
}

/// External payloads land in `<file>.data` at increasing offsets.
#[test]
fn external_binary_layout() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("external.func.gii");

    let mut file = sample_document();
    file.set_encoding_for_writing(Encoding::ExternalFileBinary);
    file.write_file(&path).unwrap();

    let data_path = temp_dir.path().join("external.func.gii.data");
    let data = std::fs::read(&data_path).unwrap();
    assert_eq!(data.len(), 9 * 4 + 4 * 4 + 4);

    let offsets: Vec<u64> = file
        .data_arrays()
        .iter()
        .map(|a| a.external_file_offset())
        .collect();
    assert_eq!(offsets, vec![0, 36, 52]);
    for array in file.data_arrays() {
        assert_eq!(array.external_file_name(), "external.func.gii.data");
    }

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("ExternalFileName=\"external.func.gii.data\" ExternalFileOffset=\"36\""));
}

/// A document pointing into a foreign endian binary file reads in host order.
#[test]
fn external_foreign_endian() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("values.bin");

    let values = [1.5f32, -2.0, 1024.25];
    {
        let mut data = std::fs::File::create(&data_path).unwrap();
        data.write_all(b"header!!").unwrap();
        for v in values {
            data.write_all(&v.to_be_bytes()).unwrap();
        }
        data.seek(SeekFrom::Start(0)).unwrap();
    }

    let xml = r#"<GIFTI Version="1.0">
   <DataArray Intent="NIFTI_INTENT_SHAPE" DataType="NIFTI_TYPE_FLOAT32" ArrayIndexingOrder="RowMajorOrder" Dimensionality="1" Dim0="3" Encoding="ExternalFileBinary" Endian="BigEndian" ExternalFileName="values.bin" ExternalFileOffset="8">
   </DataArray>
</GIFTI>"#;
    let path = temp_dir.path().join("shape.gii");
    std::fs::write(&path, xml).unwrap();

    let file = GiftiFile::read_file(&path).unwrap();
    let array = file.data_array(0).unwrap();
    assert_eq!(array.buffer().as_f32().unwrap(), &values);
    assert_eq!(array.data_type(), DataType::Float32);
}

#[test]
fn missing_external_file() {
    let temp_dir = TempDir::new().unwrap();
    let xml = r#"<GIFTI Version="1.0">
   <DataArray Intent="NIFTI_INTENT_SHAPE" DataType="NIFTI_TYPE_FLOAT32" ArrayIndexingOrder="RowMajorOrder" Dimensionality="1" Dim0="3" Encoding="ExternalFileBinary" Endian="LittleEndian" ExternalFileName="gone.bin" ExternalFileOffset="0">
      <Data></Data>
   </DataArray>
</GIFTI>"#;
    let path = temp_dir.path().join("shape.gii");
    std::fs::write(&path, xml).unwrap();

    match GiftiFile::read_file(&path) {
        Err(gifti_format::GiftiError::Io { path, .. }) => {
            assert_eq!(path, temp_dir.path().join("gone.bin"))
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

/// A payload file holding fewer bytes than the array needs after its offset.
#[test]
fn short_external_file() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("short.bin");
    // Three floats need 12 bytes; 10 remain after the offset.
    std::fs::write(&data_path, [0u8; 14]).unwrap();

    for offset in [4, 64] {
        let xml = format!(
            r#"<GIFTI Version="1.0">
   <DataArray Intent="NIFTI_INTENT_SHAPE" DataType="NIFTI_TYPE_FLOAT32" ArrayIndexingOrder="RowMajorOrder" Dimensionality="1" Dim0="3" Encoding="ExternalFileBinary" Endian="LittleEndian" ExternalFileName="short.bin" ExternalFileOffset="{}">
      <Data></Data>
   </DataArray>
</GIFTI>"#,
            offset
        );
        let path = temp_dir.path().join("short.gii");
        std::fs::write(&path, xml).unwrap();

        match GiftiFile::read_file(&path) {
            Err(gifti_format::GiftiError::Io { path, source, .. }) => {
                assert_eq!(path, data_path);
                assert_eq!(source.kind(), std::io::ErrorKind::UnexpectedEof);
            }
            other => panic!("unexpected result at offset {}: {:?}", offset, other),
        }
    }
}

#[test]
fn missing_document_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = GiftiFile::read_file(temp_dir.path().join("absent.gii")).unwrap_err();
    assert!(matches!(err, gifti_format::GiftiError::Io { .. }));
}
