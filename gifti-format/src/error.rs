use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GiftiError {
    #[error("Malformed GIFTI document: {0}")]
    MalformedDocument(String),

    #[error("File version is {found} but only versions {min:.1} through {max:.1} are supported")]
    Version { found: f32, min: f32, max: f32 },

    #[error("Size mismatch in {what}: expected {expected}, found {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Could not {action} `{}`", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write GIFTI output")]
    Write(#[source] std::io::Error),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("XML error at byte {position}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },
}

impl GiftiError {
    #[inline(always)]
    pub(crate) fn malformed<S: Into<String>>(message: S) -> GiftiError {
        GiftiError::MalformedDocument(message.into())
    }

    #[inline(always)]
    pub(crate) fn io<P: Into<PathBuf>>(action: &'static str, path: P, source: std::io::Error) -> GiftiError {
        GiftiError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// True for every error produced by input that is not a well formed GIFTI document,
    /// including XML tokenizer failures.
    pub fn is_malformed(&self) -> bool {
        matches!(self, GiftiError::MalformedDocument(_) | GiftiError::Xml { .. })
    }
}

pub type Result<T> = std::result::Result<T, GiftiError>;
