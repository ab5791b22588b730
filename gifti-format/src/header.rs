/// Version written into new documents.
pub const CURRENT_VERSION: f32 = 1.0;
pub const MIN_SUPPORTED_VERSION: f32 = 1.0;
pub const MAX_SUPPORTED_VERSION: f32 = 2.0;

pub(crate) const XML_VERSION: &str = "1.0";
pub(crate) const XML_ENCODING: &str = "UTF-8";
pub(crate) const DOCTYPE: &str = r#"GIFTI SYSTEM "http://www.nitrc.org/frs/download.php/1594/gifti.dtd""#;

/// Extension appended to the document name for external binary payloads.
pub(crate) const EXTERNAL_DATA_EXTENSION: &str = ".data";

pub const XFORM_TALAIRACH: &str = "NIFTI_XFORM_TALAIRACH";

pub(crate) mod tags {
    pub const GIFTI: &str = "GIFTI";
    pub const METADATA: &str = "MetaData";
    pub const METADATA_ENTRY: &str = "MD";
    pub const METADATA_NAME: &str = "Name";
    pub const METADATA_VALUE: &str = "Value";
    pub const LABEL_TABLE: &str = "LabelTable";
    pub const LABEL: &str = "Label";
    pub const DATA_ARRAY: &str = "DataArray";
    pub const DATA: &str = "Data";
    pub const MATRIX: &str = "CoordinateSystemTransformMatrix";
    pub const MATRIX_DATA_SPACE: &str = "DataSpace";
    pub const MATRIX_TRANSFORMED_SPACE: &str = "TransformedSpace";
    pub const MATRIX_DATA: &str = "MatrixData";
}

pub(crate) mod attrs {
    pub const VERSION: &str = "Version";
    pub const NUMBER_OF_DATA_ARRAYS: &str = "NumberOfDataArrays";

    pub const INTENT: &str = "Intent";
    pub const DATA_TYPE: &str = "DataType";
    pub const INDEXING_ORDER: &str = "ArrayIndexingOrder";
    pub const DIMENSIONALITY: &str = "Dimensionality";
    pub const DIM_PREFIX: &str = "Dim";
    pub const ENCODING: &str = "Encoding";
    pub const ENDIAN: &str = "Endian";
    pub const EXTERNAL_FILE_NAME: &str = "ExternalFileName";
    pub const EXTERNAL_FILE_OFFSET: &str = "ExternalFileOffset";

    pub const LABEL_KEY: &str = "Key";
    pub const LABEL_RED: &str = "Red";
    pub const LABEL_GREEN: &str = "Green";
    pub const LABEL_BLUE: &str = "Blue";
    pub const LABEL_ALPHA: &str = "Alpha";
    pub const LABEL_X: &str = "X";
    pub const LABEL_Y: &str = "Y";
    pub const LABEL_Z: &str = "Z";
}

/// Well known metadata names.
pub mod metadata_names {
    pub const NAME: &str = "Name";
    pub const UNIQUE_ID: &str = "UniqueID";
    pub const COMMENT: &str = "Comment";
}

#[inline(always)]
pub fn is_supported_version(version: f32) -> bool {
    (MIN_SUPPORTED_VERSION..=MAX_SUPPORTED_VERSION).contains(&version)
}
