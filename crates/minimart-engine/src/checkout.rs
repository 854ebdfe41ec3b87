//! # Checkout Engine
//!
//! Turns a cart into a durable sale, all-or-nothing.
//!
//! ## The Checkout Unit
//! ```text
//! checkout(store_name, cart, tax_rate)
//!      │
//!      ├─► cart empty?            EmptyCart, nothing touched
//!      ├─► line quantity < 1?     validation error, nothing touched
//!      ├─► compute totals         subtotal = Σ line totals
//!      │                          tax = subtotal × rate (one rounding)
//!      ├─► assign receipt number  RCPT-YYYYMMDDHHmmss (local clock)
//!      │
//!      ▼
//! BEGIN ─► for each cart line:
//!      │      consume stock + append ledger (Inventory Engine rules)
//!      ├─► insert sale row
//!      ├─► insert N line-item rows (snapshot name + unit price)
//! COMMIT
//!      │
//!      └─► best-effort receipt file export (post-commit, never undoes
//!          the sale)
//! ```
//!
//! If any line has insufficient stock, or the receipt number collides
//! with a sale finalized in the same clock second, the whole unit rolls
//! back: no sale, no line items, no stock change, no ledger rows.

use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineResult, EngineError};
use crate::inventory::InventoryEngine;
use crate::receipt;
use minimart_core::{
    validation, CartItem, CoreError, Money, SaleLineItem, SaleReceipt, TaxRate, TransactionKind,
};
use minimart_db::{Database, DbError, SaleRepository};

/// Finalizes carts into persisted sales.
#[derive(Debug, Clone)]
pub struct CheckoutEngine {
    db: Database,
    receipts_dir: Option<PathBuf>,
}

impl CheckoutEngine {
    /// Creates a new CheckoutEngine. No receipt files are written
    /// unless a directory is configured via [`with_receipts_dir`].
    ///
    /// [`with_receipts_dir`]: CheckoutEngine::with_receipts_dir
    pub fn new(db: Database) -> Self {
        CheckoutEngine {
            db,
            receipts_dir: None,
        }
    }

    /// Enables post-commit receipt export into `dir`.
    pub fn with_receipts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.receipts_dir = Some(dir.into());
        self
    }

    /// Finalizes a sale.
    ///
    /// ## Returns
    /// The persisted receipt and its line items, exactly as stored.
    ///
    /// ## Errors
    /// * `CoreError::EmptyCart` - nothing to sell
    /// * `CoreError::Validation` - a line has quantity below 1
    /// * `CoreError::InsufficientStock` - some line exceeds available
    ///   stock; no state change at all
    /// * `DbError::DuplicateReceipt` - a sale was already finalized in
    ///   this clock second; the caller may retry after it passes
    pub async fn checkout(
        &self,
        store_name: &str,
        cart: &[CartItem],
        tax_rate: TaxRate,
    ) -> EngineResult<(SaleReceipt, Vec<SaleLineItem>)> {
        let receipt_number = receipt_number_at(Local::now());
        let (sale, items) = self
            .checkout_numbered(store_name, cart, tax_rate, &receipt_number)
            .await?;

        // Export happens outside the transaction. A failed write to
        // disk logs a warning; the sale stays committed.
        if let Some(dir) = &self.receipts_dir {
            if let Err(e) = receipt::export_receipt(dir, &sale, &items) {
                warn!(
                    receipt_number = %sale.receipt_number,
                    error = %e,
                    "receipt file export failed"
                );
            }
        }

        Ok((sale, items))
    }

    /// Checkout with a caller-supplied receipt number.
    ///
    /// Split out so the collision path is testable without racing the
    /// wall clock.
    async fn checkout_numbered(
        &self,
        store_name: &str,
        cart: &[CartItem],
        tax_rate: TaxRate,
        receipt_number: &str,
    ) -> EngineResult<(SaleReceipt, Vec<SaleLineItem>)> {
        if cart.is_empty() {
            return Err(EngineError::Core(CoreError::EmptyCart));
        }
        for line in cart {
            validation::validate_cart_quantity(line.quantity)?;
        }
        validation::validate_tax_rate_bps(tax_rate.bps())?;

        let subtotal: Money = cart.iter().map(CartItem::line_total).sum();
        let tax = subtotal.tax(tax_rate);

        let sale = SaleReceipt {
            id: Uuid::new_v4().to_string(),
            receipt_number: receipt_number.to_string(),
            issued_at: Utc::now(),
            store_name: store_name.to_string(),
            subtotal_cents: subtotal.cents(),
            tax_cents: tax.cents(),
        };

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let note = format!("sale on receipt {receipt_number}");
        for line in cart {
            // quantities are validated positive above
            InventoryEngine::adjust_stock_in(
                &mut tx,
                &line.product.id,
                -line.quantity,
                TransactionKind::Sale,
                Some(&note),
            )
            .await?;
        }

        SaleRepository::insert_receipt_in(&mut tx, &sale).await?;

        let mut items = Vec::with_capacity(cart.len());
        for line in cart {
            let item = SaleLineItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                product_id: line.product.id.clone(),
                product_name: line.product.name.clone(),
                unit_price_cents: line.product.price_cents,
                quantity: line.quantity,
            };
            SaleRepository::insert_line_item_in(&mut tx, &item).await?;
            items.push(item);
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            receipt_number = %sale.receipt_number,
            lines = items.len(),
            total_cents = sale.grand_total_cents(),
            "sale finalized"
        );
        Ok((sale, items))
    }

    /// Looks a sale up by receipt number, with its line items.
    pub async fn find_sale(
        &self,
        receipt_number: &str,
    ) -> EngineResult<Option<(SaleReceipt, Vec<SaleLineItem>)>> {
        let Some(sale) = self.db.sales().get_by_receipt_number(receipt_number).await? else {
            return Ok(None);
        };
        let items = self.db.sales().line_items(&sale.id).await?;
        Ok(Some((sale, items)))
    }
}

/// Formats the receipt number for a checkout at `now`.
///
/// Second resolution by design: the store's uniqueness constraint
/// turns a same-second collision into a `DuplicateReceipt` rejection
/// rather than a silent overwrite.
fn receipt_number_at(now: DateTime<Local>) -> String {
    format!("RCPT-{}", now.format("%Y%m%d%H%M%S"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use minimart_core::{NewProduct, Product, ProductCategory};
    use minimart_db::DbConfig;

    async fn setup() -> (Database, CheckoutEngine, Product) {
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
        let engine = CheckoutEngine::new(db.clone());
        (db, engine, product)
    }

    #[test]
    fn test_receipt_number_format() {
        let now = Local.with_ymd_and_hms(2026, 8, 29, 14, 5, 9).unwrap();
        assert_eq!(receipt_number_at(now), "RCPT-20260829140509");
    }

    #[tokio::test]
    async fn test_single_line_checkout_totals() {
        let (db, engine, product) = setup().await;
        let cart = vec![CartItem::new(product.clone(), 1)];

        let (sale, items) = engine
            .checkout("Minimart", &cart, TaxRate::from_bps(700))
            .await
            .unwrap();

        assert_eq!(sale.subtotal_cents, 4500);
        assert_eq!(sale.tax_cents, 315);
        assert_eq!(sale.grand_total_cents(), 4815);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_name, "Drinking Water");
        assert_eq!(items[0].unit_price_cents, 4500);

        // stock consumed and ledgered
        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity_on_hand, 19);
        let history = db.ledger().history(Some(&product.id)).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].quantity_change, -1);
        assert_eq!(history[0].kind, TransactionKind::Sale);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let (db, engine, _) = setup().await;

        let err = engine
            .checkout("Minimart", &[], TaxRate::from_bps(700))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::EmptyCart)));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_non_positive_line_quantity_rejected() {
        let (db, engine, product) = setup().await;

        for qty in [0_i64, -2] {
            let cart = vec![CartItem::new(product.clone(), qty)];
            let err = engine
                .checkout("Minimart", &cart, TaxRate::from_bps(700))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                EngineError::Core(CoreError::Validation(_))
            ));
        }

        // nothing persisted, nothing consumed
        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity_on_hand, 20);
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert!(db.ledger().history(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_whole_cart() {
        let (db, engine, water) = setup().await;
        let soap = db
            .products()
            .insert(&NewProduct {
                code: "HH001".to_string(),
                name: "Dish Soap".to_string(),
                price_cents: 1200,
                quantity_on_hand: 2,
                category: ProductCategory::Household,
                description: None,
            })
            .await
            .unwrap();

        // first line would succeed alone; second line exceeds stock
        let cart = vec![
            CartItem::new(water.clone(), 5),
            CartItem::new(soap.clone(), 3),
        ];
        let err = engine
            .checkout("Minimart", &cart, TaxRate::from_bps(700))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::InsufficientStock { ref code, .. }) if code == "HH001"
        ));

        // neither product changed, no sale, no ledger rows
        let water = db.products().get_by_id(&water.id).await.unwrap().unwrap();
        let soap = db.products().get_by_id(&soap.id).await.unwrap().unwrap();
        assert_eq!(water.quantity_on_hand, 20);
        assert_eq!(soap.quantity_on_hand, 2);
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert!(db.ledger().history(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_same_second_receipt_collision_rejected() {
        let (db, engine, product) = setup().await;
        let cart = vec![CartItem::new(product.clone(), 1)];

        engine
            .checkout_numbered("Minimart", &cart, TaxRate::from_bps(700), "RCPT-20260829140509")
            .await
            .unwrap();
        let err = engine
            .checkout_numbered("Minimart", &cart, TaxRate::from_bps(700), "RCPT-20260829140509")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Persistence(DbError::DuplicateReceipt { .. })
        ));

        // the rejected checkout consumed nothing
        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity_on_hand, 19);
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_sale_by_receipt_number() {
        let (_db, engine, product) = setup().await;
        let cart = vec![CartItem::new(product, 2)];

        let (sale, _) = engine
            .checkout("Minimart", &cart, TaxRate::zero())
            .await
            .unwrap();

        let (found, items) = engine
            .find_sale(&sale.receipt_number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, sale);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);

        assert!(engine.find_sale("RCPT-00000000000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_tax_rate() {
        let (_db, engine, product) = setup().await;
        let cart = vec![CartItem::new(product, 3)];

        let (sale, _) = engine
            .checkout("Minimart", &cart, TaxRate::zero())
            .await
            .unwrap();
        assert_eq!(sale.subtotal_cents, 13500);
        assert_eq!(sale.tax_cents, 0);
        assert_eq!(sale.grand_total_cents(), 13500);
    }

    #[tokio::test]
    async fn test_receipt_export_writes_file() {
        let (_db, engine, product) = setup().await;
        let dir = std::env::temp_dir().join(format!("minimart-receipts-{}", Uuid::new_v4()));
        let engine = engine.with_receipts_dir(&dir);

        let cart = vec![CartItem::new(product, 1)];
        let (sale, _) = engine
            .checkout("Minimart", &cart, TaxRate::from_bps(700))
            .await
            .unwrap();

        let path = dir.join(format!("{}.pdf", sale.receipt_number));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("SALES RECEIPT"));
        assert!(contents.contains(&sale.receipt_number));
        std::fs::remove_dir_all(&dir).ok();
    }
}
