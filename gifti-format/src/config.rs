//! Process wide encoding defaults.
//!
//! The defaults may be replaced once, before anything reads them. After the
//! first read they are fixed for the lifetime of the process.

use std::sync::OnceLock;

use crate::compression::constants::DEFAULT_COMPRESSION_LEVEL;

pub const DEFAULT_FLOAT_PRECISION: usize = 6;

static DEFAULTS: OnceLock<EncodeConfig> = OnceLock::new();

/// Options applied when array payloads are encoded for writing.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct EncodeConfig {
    /// Digits written after the decimal point for floating point `ASCII` data.
    pub float_precision: usize,
    /// Zlib level for `GZipBase64Binary` data, clamped to 0..=9.
    pub compression_level: u32,
}

impl EncodeConfig {
    pub const fn builtin() -> EncodeConfig {
        EncodeConfig {
            float_precision: DEFAULT_FLOAT_PRECISION,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    pub fn with_float_precision(mut self, digits: usize) -> EncodeConfig {
        self.float_precision = digits;
        self
    }

    pub fn with_compression_level(mut self, level: u32) -> EncodeConfig {
        self.compression_level = level;
        self
    }
}

impl Default for EncodeConfig {
    fn default() -> Self {
        defaults()
    }
}

/// Installs process wide defaults. Fails, returning `config`, if defaults were
/// already installed or read.
pub fn set_defaults(config: EncodeConfig) -> Result<(), EncodeConfig> {
    DEFAULTS.set(config)
}

pub fn defaults() -> EncodeConfig {
    *DEFAULTS.get_or_init(EncodeConfig::builtin)
}
