// ─────────────────────────────────────────────────────────────────────
// Speckle PnP — Error
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpeckleError {
    #[error("Configuration error in `{field}`: {message}")]
    Config { field: &'static str, message: String },

    #[error(
        "Shape mismatch in {context}: expected {}x{}, got {actual} elements",
        .expected.0,
        .expected.1
    )]
    ShapeMismatch {
        context: &'static str,
        expected: (usize, usize),
        actual: usize,
    },

    #[error("Reconstruction cancelled before iteration {iteration}")]
    Cancelled { iteration: usize },

    #[error("Numerical failure at iteration {iteration}: {message}")]
    Numerical { iteration: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpeckleError {
    pub fn config(field: &'static str, message: impl Into<String>) -> Self {
        SpeckleError::Config {
            field,
            message: message.into(),
        }
    }
}

pub type SpeckleResult<T> = Result<T, SpeckleError>;
