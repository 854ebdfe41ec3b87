//! # Ledger Store
//!
//! Append-only log of inventory transactions.
//!
//! Every change to a product's `quantity_on_hand` leaves exactly one
//! row here, written in the same database transaction as the quantity
//! update. Rows are immutable once created; there is no update or
//! delete path. Business-rule validation (non-negative resulting
//! stock) is the Inventory Engine's responsibility - this store only
//! enforces foreign-key discipline.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use minimart_core::{InventoryTransaction, TransactionKind};

#[derive(Debug, sqlx::FromRow)]
struct LedgerRow {
    id: String,
    product_id: String,
    kind: String,
    quantity_change: i64,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<LedgerRow> for InventoryTransaction {
    type Error = DbError;

    fn try_from(row: LedgerRow) -> DbResult<InventoryTransaction> {
        let kind: TransactionKind = row
            .kind
            .parse()
            .map_err(|_| DbError::corruption("inventory_transactions", "kind", &row.kind))?;

        Ok(InventoryTransaction {
            id: row.id,
            product_id: row.product_id,
            kind,
            quantity_change: row.quantity_change,
            note: row.note,
            created_at: row.created_at,
        })
    }
}

/// Repository for the inventory-transaction ledger.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Appends one ledger entry inside a caller-owned transaction.
    ///
    /// Assigns id and `created_at = now`. The foreign key on
    /// `product_id` is the only check performed here.
    pub async fn append_in(
        conn: &mut SqliteConnection,
        product_id: &str,
        kind: TransactionKind,
        quantity_change: i64,
        note: Option<&str>,
    ) -> DbResult<InventoryTransaction> {
        debug!(product_id = %product_id, %kind, quantity_change, "appending ledger entry");

        let entry = InventoryTransaction {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            kind,
            quantity_change,
            note: note.map(str::to_string),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO inventory_transactions (
                id, product_id, kind, quantity_change, note, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.product_id)
        .bind(entry.kind.as_str())
        .bind(entry.quantity_change)
        .bind(&entry.note)
        .bind(entry.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(entry)
    }

    /// Returns ledger history, newest first.
    ///
    /// Filtered to one product when `product_id` is given, otherwise
    /// the full log. Ties on `created_at` (same-second writes) fall
    /// back to reverse insertion order.
    pub async fn history(&self, product_id: Option<&str>) -> DbResult<Vec<InventoryTransaction>> {
        let filter = product_id.unwrap_or("");

        let rows: Vec<LedgerRow> = sqlx::query_as(
            r#"
            SELECT id, product_id, kind, quantity_change, note, created_at
            FROM inventory_transactions
            WHERE (?1 = '' OR product_id = ?1)
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(filter)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(InventoryTransaction::try_from).collect()
    }

    /// Net quantity change for a product: Σ quantity_change.
    ///
    /// Combined with the product's initial quantity this reconstructs
    /// the current stock level; used for reconciliation checks.
    pub async fn net_change(&self, product_id: &str) -> DbResult<i64> {
        let net: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(quantity_change), 0)
            FROM inventory_transactions
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(net)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
