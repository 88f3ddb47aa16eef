// src/error.rs

use thiserror::Error;

/// Structural errors that abort a run.
///
/// Row-level defects (unparsable timestamps, invalid GPS fixes) never
/// surface here; the cleanser drops those rows locally.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A required sensor column carried no value in any surviving row, so
    /// gap-filling had nothing to propagate.
    #[error("required sensor column `{0}` has no values after cleansing")]
    MissingColumn(&'static str),

    /// A configured score weight was NaN or infinite.
    #[error("score weight `{0}` is not finite")]
    InvalidWeight(&'static str),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
