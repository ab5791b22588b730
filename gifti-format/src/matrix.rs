use std::fmt;

use crate::error::{GiftiError, Result};
use crate::header::XFORM_TALAIRACH;

/// A 4×4 coordinate transform attached to a data array, stored row-major.
#[derive(Clone, PartialEq)]
pub struct TransformMatrix {
    pub data_space: String,
    pub transformed_space: String,
    pub matrix: [[f64; 4]; 4],
}

const IDENTITY: [[f64; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

impl Default for TransformMatrix {
    fn default() -> Self {
        TransformMatrix::identity()
    }
}

impl TransformMatrix {
    pub fn identity() -> TransformMatrix {
        TransformMatrix {
            data_space: String::new(),
            transformed_space: String::new(),
            matrix: IDENTITY,
        }
    }

    /// Identity transform from and to Talairach space, as attached to point sets.
    pub fn talairach_identity() -> TransformMatrix {
        TransformMatrix {
            data_space: XFORM_TALAIRACH.to_string(),
            transformed_space: XFORM_TALAIRACH.to_string(),
            matrix: IDENTITY,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.matrix == IDENTITY
    }

    pub fn from_row_major(values: &[f64; 16]) -> [[f64; 4]; 4] {
        let mut matrix = [[0.0; 4]; 4];
        for (i, row) in matrix.iter_mut().enumerate() {
            row.copy_from_slice(&values[i * 4..i * 4 + 4]);
        }
        matrix
    }

    /// Parses sixteen whitespace separated values, row by row.
    pub fn parse_row_major(text: &str) -> Result<[[f64; 4]; 4]> {
        let mut values = [0.0f64; 16];
        let mut tokens = text.split_ascii_whitespace();
        for (i, value) in values.iter_mut().enumerate() {
            let token = tokens.next().ok_or_else(|| {
                GiftiError::malformed(format!("MatrixData has {} values but should have 16", i))
            })?;
            *value = token.parse().map_err(|_| {
                GiftiError::malformed(format!("MatrixData value \"{}\" is not a number", token))
            })?;
        }
        Ok(Self::from_row_major(&values))
    }

    /// Row-major text, one row per line.
    pub fn to_row_major_text(&self) -> String {
        let mut text = String::from("\n");
        for row in &self.matrix {
            for value in row {
                text.push_str(&value.to_string());
                text.push(' ');
            }
            text.push('\n');
        }
        text
    }
}

impl fmt::Debug for TransformMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformMatrix")
            .field("data_space", &self.data_space)
            .field("transformed_space", &self.transformed_space)
            .field("matrix", &self.matrix)
            .finish()
    }
}
