//! # Domain Types
//!
//! Core domain types used throughout Minimart POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────────┐   ┌─────────────────┐  │
//! │  │    Product      │   │ InventoryTransaction │   │   SaleReceipt   │  │
//! │  │  ─────────────  │   │  ──────────────────  │   │  ─────────────  │  │
//! │  │  id (UUID)      │   │  id (UUID)           │   │  id (UUID)      │  │
//! │  │  code (business)│   │  product_id (FK)     │   │  receipt_number │  │
//! │  │  price_cents    │   │  kind                │   │  subtotal_cents │  │
//! │  │  quantity_on_   │   │  quantity_change     │   │  tax_cents      │  │
//! │  │    hand         │   │  (signed delta)      │   │                 │  │
//! │  └─────────────────┘   └──────────────────────┘   └─────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every persisted entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business key where one exists: `code` for products,
//!   `receipt_number` for sales

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000, so 700 bps = 7%.
/// Integer basis points keep tax math exact until the single rounding
/// point in [`Money::tax`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product Category
// =============================================================================

/// Closed set of product categories carried by the catalog.
///
/// Persisted as the variant name. Reading an unrecognized name out of
/// the store is a data-corruption condition in the db crate's error
/// taxonomy, never a silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCategory {
    Beverage,
    Snack,
    Household,
    PersonalCare,
}

impl ProductCategory {
    /// The stable name used in the database and on wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Beverage => "Beverage",
            ProductCategory::Snack => "Snack",
            ProductCategory::Household => "Household",
            ProductCategory::PersonalCare => "PersonalCare",
        }
    }

    /// All categories, in display order.
    pub const fn all() -> [ProductCategory; 4] {
        [
            ProductCategory::Beverage,
            ProductCategory::Snack,
            ProductCategory::Household,
            ProductCategory::PersonalCare,
        ]
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Beverage" => Ok(ProductCategory::Beverage),
            "Snack" => Ok(ProductCategory::Snack),
            "Household" => Ok(ProductCategory::Household),
            "PersonalCare" => Ok(ProductCategory::PersonalCare),
            other => Err(format!("unrecognized product category: {other}")),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
///
/// Owned exclusively by the Catalog Store. `quantity_on_hand` is only
/// ever mutated through the Inventory Engine; all other fields go
/// through the Catalog Service. Rows are never physically removed,
/// only soft-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4), assigned by the store on insert.
    pub id: String,

    /// Business code - unique across live AND deleted rows.
    pub code: String,

    /// Display name shown on screen and on receipts.
    pub name: String,

    /// Unit price in cents (never negative).
    pub price_cents: i64,

    /// Current stock level (never negative).
    pub quantity_on_hand: i64,

    /// Category from the closed enumeration.
    pub category: ProductCategory,

    /// Optional free-text description.
    pub description: Option<String>,

    /// Soft-delete flag; deleted rows keep their code reserved.
    pub deleted: bool,

    /// When the product was created (UTC).
    pub created_at: DateTime<Utc>,

    /// When the product was last updated (UTC, >= created_at).
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money value.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Insert payload for the Catalog Store.
///
/// Everything the store assigns is absent here: no id, no timestamps,
/// no deleted flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub price_cents: i64,
    pub quantity_on_hand: i64,
    pub category: ProductCategory,
    pub description: Option<String>,
}

// =============================================================================
// Inventory Transactions
// =============================================================================

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Stock received (positive delta).
    StockIn,
    /// Stock consumed by a sale (negative delta).
    Sale,
    /// Manual correction (either sign).
    Adjustment,
}

impl TransactionKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::StockIn => "StockIn",
            TransactionKind::Sale => "Sale",
            TransactionKind::Adjustment => "Adjustment",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "StockIn" => Ok(TransactionKind::StockIn),
            "Sale" => Ok(TransactionKind::Sale),
            "Adjustment" => Ok(TransactionKind::Adjustment),
            other => Err(format!("unrecognized transaction kind: {other}")),
        }
    }
}

/// One append-only ledger entry.
///
/// Immutable once created. The running sum of `quantity_change` for a
/// product, plus its initial quantity, equals the product's current
/// `quantity_on_hand` at all times - the ledger reconstructs stock
/// history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryTransaction {
    pub id: String,
    pub product_id: String,
    pub kind: TransactionKind,
    /// Signed delta: positive for StockIn, negative for Sale.
    pub quantity_change: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sales
// =============================================================================

/// The immutable record of a completed sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub id: String,

    /// `RCPT-YYYYMMDDHHmmss`, derived from the local clock at second
    /// resolution. Unique; same-second checkouts collide and the
    /// second one is rejected by the store.
    pub receipt_number: String,

    pub issued_at: DateTime<Utc>,
    pub store_name: String,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
}

impl SaleReceipt {
    /// Derived total: subtotal + tax.
    #[inline]
    pub fn grand_total_cents(&self) -> i64 {
        self.subtotal_cents + self.tax_cents
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    #[inline]
    pub fn grand_total(&self) -> Money {
        Money::from_cents(self.grand_total_cents())
    }
}

/// A line item belonging to exactly one receipt.
///
/// Uses the snapshot pattern: `product_name` and `unit_price_cents`
/// are frozen copies taken at the time of sale, so receipts never
/// change retroactively when the catalog is edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLineItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl SaleLineItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line total before tax (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A cart line: a product snapshot plus a requested quantity.
///
/// Transient - exists only during checkout computation and is never
/// persisted. The embedded `Product` freezes price and name at the
/// moment the item was added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: i64,
}

impl CartItem {
    pub fn new(product: Product, quantity: i64) -> Self {
        CartItem { product, quantity }
    }

    /// Line total = unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.product.price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
