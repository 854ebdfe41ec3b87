//! # minimart-core: Pure Business Logic for Minimart POS
//!
//! This crate is the **heart** of Minimart POS. It contains all business
//! logic as pure functions and types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Minimart POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │              ★ minimart-core (THIS CRATE) ★                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │    │
//! │  │   │   types   │  │   money   │  │   error   │  │ validation│   │    │
//! │  │   │  Product  │  │   Money   │  │ CoreError │  │   rules   │   │    │
//! │  │   │  Receipt  │  │  TaxCalc  │  │           │  │   checks  │   │    │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO CLOCK BEYOND TYPES • PURE           │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                 minimart-db (Database Layer)                    │    │
//! │  │           SQLite queries, migrations, repositories              │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │              minimart-engine (Transactional Engines)            │    │
//! │  │        Inventory Engine, Checkout Engine, Catalog Service       │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic, same input = same output
//! 2. **No I/O**: database, clock reads, file system access are FORBIDDEN here
//! 3. **Integer Money**: all monetary values are cents (i64), never floats
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a product code.
pub const MAX_CODE_LEN: usize = 50;

/// Maximum length of a product name.
pub const MAX_NAME_LEN: usize = 200;
