//! # Engine Error Types
//!
//! What callers of the engines see: either a business rule said no
//! (before any state change), or persistence failed (and the whole
//! operation was rolled back).

use thiserror::Error;

use minimart_core::{CoreError, ValidationError};
use minimart_db::DbError;

/// Errors surfaced by the engines.
///
/// ## The Two Arms
/// - `Core`: validation failures and business rule violations
///   (empty cart, unknown product, insufficient stock). Raised before
///   any write; state is untouched.
/// - `Persistence`: a storage failure inside a multi-step write. The
///   transaction was rolled back in full - the operation is never
///   partially applied. Duplicate-code and duplicate-receipt
///   rejections travel on this arm too (`DbError::DuplicateCode`,
///   `DbError::DuplicateReceipt`) and are safe to retry with
///   different input.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("persistence failure: {0}")]
    Persistence(#[from] DbError),
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Core(CoreError::Validation(err))
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
