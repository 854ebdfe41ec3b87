//! # Inventory Engine
//!
//! The sole path by which `Product.quantity_on_hand` changes.
//!
//! ## The Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For every product, at all times:                                       │
//! │                                                                         │
//! │    quantity_on_hand == initial quantity + Σ ledger.quantity_change      │
//! │                                                                         │
//! │  and quantity_on_hand never goes below zero.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## How a Stock Adjustment Runs
//! ```text
//! adjust_stock(product_id, delta, kind, note)
//!      │
//!      ▼
//! BEGIN ─► load product ──────────► ProductNotFound? abort, no change
//!      │
//!      ├─► quantity + delta < 0? ─► InsufficientStock, abort, no change
//!      │
//!      ├─► UPDATE quantity (guarded: refuses to go negative, re-checked
//!      │   inside this same write transaction)
//!      │
//!      ├─► APPEND ledger row (same delta, same transaction)
//!      │
//! COMMIT - or roll both writes back together
//! ```
//!
//! Concurrent adjustments to the same product serialize on SQLite's
//! single-writer lock; a transaction whose snapshot went stale fails
//! to commit and surfaces as a persistence error, never as a negative
//! quantity or an unledgered change.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use minimart_core::{validation, CoreError, InventoryTransaction, TransactionKind};
use minimart_db::{Database, DbError, LedgerRepository, ProductRepository};

/// Applies stock deltas to the catalog and the ledger as one unit.
#[derive(Debug, Clone)]
pub struct InventoryEngine {
    db: Database,
}

impl InventoryEngine {
    /// Creates a new InventoryEngine over an injected database handle.
    pub fn new(db: Database) -> Self {
        InventoryEngine { db }
    }

    /// Applies a signed stock delta in its own transaction.
    ///
    /// ## Returns
    /// The ledger entry recorded for this change.
    ///
    /// ## Errors
    /// * `CoreError::ProductNotFound` - no such product; no state change
    /// * `CoreError::InsufficientStock` - delta would drive quantity
    ///   negative; no state change
    /// * `EngineError::Persistence` - storage failure; fully rolled back
    pub async fn adjust_stock(
        &self,
        product_id: &str,
        delta: i64,
        kind: TransactionKind,
        note: Option<&str>,
    ) -> EngineResult<InventoryTransaction> {
        debug!(product_id = %product_id, delta, %kind, "adjusting stock");

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        let entry = Self::adjust_stock_in(&mut tx, product_id, delta, kind, note).await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(
            product_id = %product_id,
            delta,
            kind = %kind,
            "stock adjusted"
        );
        Ok(entry)
    }

    /// Same adjustment against a caller-owned transaction.
    ///
    /// Checkout uses this to fold every cart line's consumption into
    /// its own all-or-nothing unit. The invariant checks are identical;
    /// only the transaction ownership differs.
    pub async fn adjust_stock_in(
        conn: &mut SqliteConnection,
        product_id: &str,
        delta: i64,
        kind: TransactionKind,
        note: Option<&str>,
    ) -> EngineResult<InventoryTransaction> {
        let product = ProductRepository::get_by_id_in(conn, product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        if product.quantity_on_hand + delta < 0 {
            return Err(EngineError::Core(CoreError::InsufficientStock {
                code: product.code,
                available: product.quantity_on_hand,
                requested: delta.abs(),
            }));
        }

        let rows =
            ProductRepository::apply_stock_delta_in(conn, product_id, delta, Utc::now()).await?;
        if rows == 0 {
            // The guarded UPDATE re-checks the invariant against the
            // row as this transaction sees it; 0 rows means the
            // pre-check read went stale.
            return Err(EngineError::Core(CoreError::InsufficientStock {
                code: product.code,
                available: product.quantity_on_hand,
                requested: delta.abs(),
            }));
        }

        let entry = LedgerRepository::append_in(conn, product_id, kind, delta, note).await?;
        Ok(entry)
    }

    /// Receives stock: delta = +qty, kind = StockIn. `qty` must be >= 0.
    pub async fn add_stock(
        &self,
        product_id: &str,
        qty: i64,
        note: Option<&str>,
    ) -> EngineResult<InventoryTransaction> {
        validation::validate_quantity(qty)?;
        self.adjust_stock(product_id, qty, TransactionKind::StockIn, note)
            .await
    }

    /// Consumes stock for a sale: delta = -|qty|, kind = Sale.
    pub async fn consume_stock(
        &self,
        product_id: &str,
        qty: i64,
        note: Option<&str>,
    ) -> EngineResult<InventoryTransaction> {
        self.adjust_stock(product_id, -qty.abs(), TransactionKind::Sale, note)
            .await
    }

    /// Ledger history, newest first; unfiltered when `product_id` is None.
    pub async fn history(
        &self,
        product_id: Option<&str>,
    ) -> EngineResult<Vec<InventoryTransaction>> {
        Ok(self.db.ledger().history(product_id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use minimart_core::{NewProduct, ProductCategory};
    use minimart_db::DbConfig;

    async fn setup() -> (Database, InventoryEngine, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .insert(&NewProduct {
                code: "BV001".to_string(),
                name: "Drinking Water".to_string(),
                price_cents: 4500,
                quantity_on_hand: 20,
                category: ProductCategory::Beverage,
                description: None,
            })
            .await
            .unwrap();
        let engine = InventoryEngine::new(db.clone());
        (db, engine, product.id)
    }

    #[tokio::test]
    async fn test_consume_stock_updates_quantity_and_ledger() {
        let (db, engine, product_id) = setup().await;

        let entry = engine.consume_stock(&product_id, 3, None).await.unwrap();
        assert_eq!(entry.kind, TransactionKind::Sale);
        assert_eq!(entry.quantity_change, -3);

        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(product.quantity_on_hand, 17);

        let history = db.ledger().history(Some(&product_id)).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].quantity_change, -3);
    }

    #[tokio::test]
    async fn test_insufficient_stock_changes_nothing() {
        let (db, engine, product_id) = setup().await;
        engine.consume_stock(&product_id, 3, None).await.unwrap();

        let err = engine.consume_stock(&product_id, 999, None).await.unwrap_err();
        match err {
            EngineError::Core(CoreError::InsufficientStock {
                code,
                available,
                requested,
            }) => {
                assert_eq!(code, "BV001");
                assert_eq!(available, 17);
                assert_eq!(requested, 999);
            }
            other => panic!("expected InsufficientStock, got {other}"),
        }

        // quantity unchanged, no ledger row appended
        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(product.quantity_on_hand, 17);
        assert_eq!(db.ledger().history(Some(&product_id)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_stock_rejects_negative_qty() {
        let (_db, engine, product_id) = setup().await;

        let err = engine.add_stock(&product_id, -5, None).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let (_db, engine, _) = setup().await;

        let err = engine.add_stock("no-such-id", 5, None).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::ProductNotFound(id)) if id == "no-such-id"
        ));
    }

    #[tokio::test]
    async fn test_ledger_reconciles_after_adjustment_sequence() {
        let (db, engine, product_id) = setup().await;
        let initial = 20;

        engine.add_stock(&product_id, 10, Some("delivery")).await.unwrap();
        engine.consume_stock(&product_id, 4, None).await.unwrap();
        engine
            .adjust_stock(&product_id, -1, TransactionKind::Adjustment, Some("breakage"))
            .await
            .unwrap();
        engine.consume_stock(&product_id, 25, None).await.unwrap();
        // and one rejected attempt that must not appear in the ledger
        assert!(engine.consume_stock(&product_id, 999, None).await.is_err());

        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        let net = db.ledger().net_change(&product_id).await.unwrap();
        assert_eq!(product.quantity_on_hand, initial + net);
        assert_eq!(product.quantity_on_hand, 0);
    }

    #[tokio::test]
    async fn test_exact_depletion_to_zero_is_allowed() {
        let (db, engine, product_id) = setup().await;

        engine.consume_stock(&product_id, 20, None).await.unwrap();

        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(product.quantity_on_hand, 0);
    }

    #[tokio::test]
    async fn test_history_passthrough() {
        let (_db, engine, product_id) = setup().await;

        engine.add_stock(&product_id, 5, None).await.unwrap();
        engine.consume_stock(&product_id, 2, None).await.unwrap();

        let history = engine.history(Some(&product_id)).await.unwrap();
        assert_eq!(history.len(), 2);
        // newest first
        assert_eq!(history[0].quantity_change, -2);
    }
}
