//! # Minimart Engine
//!
//! Transactional engines over the Minimart stores.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         minimart-engine                                 │
//! │                                                                         │
//! │  ┌───────────────┐  ┌───────────────┐  ┌──────────────────────────┐    │
//! │  │CatalogService │  │InventoryEngine│  │     CheckoutEngine       │    │
//! │  │  validate +   │  │ stock deltas  │  │  cart -> durable sale    │    │
//! │  │  CRUD facade  │  │ + ledger, one │  │  (consumes stock via the │    │
//! │  │               │  │  transaction  │◄─┤   Inventory Engine)      │    │
//! │  └───────┬───────┘  └───────┬───────┘  └────────────┬─────────────┘    │
//! │          │                  │                       │                  │
//! │          ▼                  ▼                       ▼                  │
//! │  ┌───────────────────────────────────────────────────────────────┐    │
//! │  │                    minimart-db (sqlx / SQLite)                │    │
//! │  └───────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engines own every transaction boundary. Stores expose `*_in`
//! helpers that write through a caller-owned connection; an engine
//! method opens one transaction, drives the participating stores, and
//! commits - or rolls the whole unit back.

pub mod catalog;
pub mod checkout;
pub mod error;
pub mod inventory;
pub mod receipt;
pub mod report;

pub use catalog::CatalogService;
pub use checkout::CheckoutEngine;
pub use error::{EngineError, EngineResult};
pub use inventory::InventoryEngine;
pub use report::ReportingService;
