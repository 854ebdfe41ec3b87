//! # Repository Modules
//!
//! One repository per store: catalog (products), ledger (inventory
//! transactions), sales (receipts + line items). Repositories hold a
//! pool for standalone reads; multi-store writes go through the
//! `*_in` helpers against a caller-owned transaction connection.

pub mod ledger;
pub mod product;
pub mod sale;

pub use ledger::LedgerRepository;
pub use product::ProductRepository;
pub use sale::SaleRepository;
