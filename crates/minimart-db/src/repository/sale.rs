//! # Sale Store
//!
//! Database operations for finalized sales and their line items.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Checkout Write Path                                   │
//! │                                                                         │
//! │  Checkout Engine opens ONE transaction, then:                           │
//! │     insert_receipt_in()     1 sale row                                  │
//! │     insert_line_item_in()   N sale_items rows                           │
//! │     (stock deltas + ledger appends share the same transaction)          │
//! │  commit - or roll the whole unit back                                   │
//! │                                                                         │
//! │  A concurrent reader never observes a sale with partially               │
//! │  written line items.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Receipts and line items are immutable once persisted; there is no
//! update path in this store.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use minimart_core::{SaleLineItem, SaleReceipt};

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    receipt_number: String,
    issued_at: DateTime<Utc>,
    store_name: String,
    subtotal_cents: i64,
    tax_cents: i64,
}

impl From<SaleRow> for SaleReceipt {
    fn from(row: SaleRow) -> SaleReceipt {
        SaleReceipt {
            id: row.id,
            receipt_number: row.receipt_number,
            issued_at: row.issued_at,
            store_name: row.store_name,
            subtotal_cents: row.subtotal_cents,
            tax_cents: row.tax_cents,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    id: String,
    sale_id: String,
    product_id: String,
    product_name: String,
    unit_price_cents: i64,
    quantity: i64,
}

impl From<LineItemRow> for SaleLineItem {
    fn from(row: LineItemRow) -> SaleLineItem {
        SaleLineItem {
            id: row.id,
            sale_id: row.sale_id,
            product_id: row.product_id,
            product_name: row.product_name,
            unit_price_cents: row.unit_price_cents,
            quantity: row.quantity,
        }
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts a receipt inside a caller-owned transaction.
    ///
    /// ## Returns
    /// * `Err(DbError::DuplicateReceipt)` - another sale already holds
    ///   this receipt number (same-second checkout collision)
    pub async fn insert_receipt_in(
        conn: &mut SqliteConnection,
        receipt: &SaleReceipt,
    ) -> DbResult<()> {
        debug!(id = %receipt.id, receipt_number = %receipt.receipt_number, "inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, receipt_number, issued_at, store_name, subtotal_cents, tax_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&receipt.id)
        .bind(&receipt.receipt_number)
        .bind(receipt.issued_at)
        .bind(&receipt.store_name)
        .bind(receipt.subtotal_cents)
        .bind(receipt.tax_cents)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            let err = DbError::from(e);
            if err.is_unique_violation_on("sales.receipt_number") {
                DbError::DuplicateReceipt {
                    receipt_number: receipt.receipt_number.clone(),
                }
            } else {
                err
            }
        })?;

        Ok(())
    }

    /// Inserts one line item inside a caller-owned transaction.
    ///
    /// Product details are snapshotted on the item; this preserves the
    /// sale history even if the product is edited later.
    pub async fn insert_line_item_in(
        conn: &mut SqliteConnection,
        item: &SaleLineItem,
    ) -> DbResult<()> {
        debug!(sale_id = %item.sale_id, product_id = %item.product_id, "inserting sale item");

        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, product_id, product_name, unit_price_cents, quantity
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.unit_price_cents)
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets a sale by id. `Ok(None)` when absent.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleReceipt>> {
        let row: Option<SaleRow> = sqlx::query_as(
            r#"
            SELECT id, receipt_number, issued_at, store_name, subtotal_cents, tax_cents
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SaleReceipt::from))
    }

    /// Gets a sale by its receipt number. `Ok(None)` when absent.
    pub async fn get_by_receipt_number(
        &self,
        receipt_number: &str,
    ) -> DbResult<Option<SaleReceipt>> {
        let row: Option<SaleRow> = sqlx::query_as(
            r#"
            SELECT id, receipt_number, issued_at, store_name, subtotal_cents, tax_cents
            FROM sales
            WHERE receipt_number = ?1
            "#,
        )
        .bind(receipt_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SaleReceipt::from))
    }

    /// Gets all line items for a sale, in insertion order.
    pub async fn line_items(&self, sale_id: &str) -> DbResult<Vec<SaleLineItem>> {
        let rows: Vec<LineItemRow> = sqlx::query_as(
            r#"
            SELECT id, sale_id, product_id, product_name, unit_price_cents, quantity
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SaleLineItem::from).collect())
    }

    /// Counts persisted sales (for diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
