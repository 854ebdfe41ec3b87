//! # Error Types
//!
//! Domain-specific error types for minimart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  minimart-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  minimart-db errors (separate crate)                                    │
//! │  └── DbError          - Storage failures, duplicates, corruption        │
//! │                                                                         │
//! │  minimart-engine errors                                                 │
//! │  └── EngineError      - Core ∪ Persistence, what callers see            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → caller               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (code, quantities, etc.)
//! 3. Errors are enum variants, never bare Strings
//! 4. No error here implies partial state: they are all raised before
//!    or instead of a write

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The referenced product does not exist.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// A stock delta would drive quantity below zero.
    ///
    /// The message identifies the product so the operator knows which
    /// cart line to fix.
    #[error("insufficient stock for {code}: available {available}, requested {requested}")]
    InsufficientStock {
        code: String,
        available: i64,
        requested: i64,
    },

    /// Checkout was invoked with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Input validation failed before any state change.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Numeric value must be at least 1.
    #[error("{field} must be positive")]
    NotPositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
