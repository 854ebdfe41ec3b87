//! # minimart-db: Database Layer for Minimart POS
//!
//! This crate provides database access for the Minimart POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Minimart POS Data Flow                             │
//! │                                                                         │
//! │  Engine call (adjust_stock, checkout, create_product)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   minimart-db (THIS CRATE)                      │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌──────────────┐    │    │
//! │  │   │   Database    │   │  Repositories  │   │  Migrations  │    │    │
//! │  │   │   (pool.rs)   │   │  product.rs    │   │  (embedded)  │    │    │
//! │  │   │               │   │  ledger.rs     │   │              │    │    │
//! │  │   │  SqlitePool   │◄──│  sale.rs       │   │ 001_init.sql │    │    │
//! │  │   └───────────────┘   └────────────────┘   └──────────────┘    │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                       SQLite Database (shop.db)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Discipline
//!
//! Repositories expose two kinds of methods:
//! - pool-based methods for standalone reads and single-row writes
//! - `*_in(conn, ...)` associated functions that run against a
//!   caller-owned transaction connection
//!
//! The engines open one transaction per logical operation and drive
//! every participating store through the `*_in` helpers, so a quantity
//! update and its ledger append (or a sale row and its line items)
//! commit or roll back as one unit.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{LedgerRepository, ProductRepository, SaleRepository};
