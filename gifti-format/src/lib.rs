//! Reading and writing of GIFTI surface data documents.
//!
//! A [`GiftiFile`] holds typed [`DataArray`]s together with document
//! [`MetaData`] and a [`LabelTable`]. Array payloads may be stored as ASCII,
//! Base64, zlib compressed Base64 or in an external binary file.

mod array;
pub mod base64;
pub mod byte_order;
pub mod compression;
pub mod config;
mod de;
mod enums;
mod error;
mod file;
pub mod header;
mod label;
mod matrix;
mod metadata;
mod ser;

pub use array::{checked_byte_len, convert_buffer, normalize_dimensions, ArrayBuffer, DataArray};
pub use byte_order::Endian;
pub use config::EncodeConfig;
pub use de::{ArrayDecodeParams, ExternalFile};
pub use enums::{DataType, Encoding, IndexOrder, Intent};
pub use error::{GiftiError, Result};
pub use file::GiftiFile;
pub use label::{Label, LabelTable};
pub use matrix::TransformMatrix;
pub use metadata::MetaData;
pub use ser::ExternalBinarySink;

#[cfg(feature = "reader")]
pub use file::reader::{parse, transition, Attributes, GiftiSaxReader, SaxHandler, State};
#[cfg(feature = "writer")]
pub use file::writer::{external_data_path, GiftiFileWriter};
