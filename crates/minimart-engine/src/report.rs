//! # Reporting
//!
//! Read-only projections over the stores. Nothing here opens a write
//! transaction.

use crate::error::EngineResult;
use minimart_core::{InventoryTransaction, Product};
use minimart_db::Database;

/// Read-only report queries.
#[derive(Debug, Clone)]
pub struct ReportingService {
    db: Database,
}

impl ReportingService {
    pub fn new(db: Database) -> Self {
        ReportingService { db }
    }

    /// One line per live product, name-ordered:
    /// `CODE | Name | on hand N | price P`
    pub async fn inventory_report(&self) -> EngineResult<Vec<String>> {
        let products = self.db.products().search("", None, false).await?;
        Ok(products.iter().map(inventory_line).collect())
    }

    /// Live products, name-ordered, for callers that want the raw rows
    /// instead of formatted lines.
    pub async fn inventory_snapshot(&self) -> EngineResult<Vec<Product>> {
        Ok(self.db.products().search("", None, false).await?)
    }

    /// Full movement history for one product, newest first.
    pub async fn product_history(
        &self,
        product_id: &str,
    ) -> EngineResult<Vec<InventoryTransaction>> {
        Ok(self.db.ledger().history(Some(product_id)).await?)
    }
}

fn inventory_line(p: &Product) -> String {
    format!(
        "{} | {} | on hand {} | price {}",
        p.code,
        p.name,
        p.quantity_on_hand,
        p.price()
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use minimart_core::{NewProduct, ProductCategory};
    use minimart_db::DbConfig;

    #[tokio::test]
    async fn test_inventory_report_lines() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for (code, name, price, qty) in [
            ("BV001", "Drinking Water", 4500_i64, 20_i64),
            ("SN001", "Potato Chips", 2500, 7),
        ] {
            db.products()
                .insert(&NewProduct {
                    code: code.to_string(),
                    name: name.to_string(),
                    price_cents: price,
                    quantity_on_hand: qty,
                    category: ProductCategory::Snack,
                    description: None,
                })
                .await
                .unwrap();
        }
        let reports = ReportingService::new(db);

        let lines = reports.inventory_report().await.unwrap();
        assert_eq!(
            lines,
            vec![
                "BV001 | Drinking Water | on hand 20 | price 45.00",
                "SN001 | Potato Chips | on hand 7 | price 25.00",
            ]
        );
    }

    #[tokio::test]
    async fn test_report_excludes_deleted() {
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
        db.products().soft_delete(&product.id).await.unwrap();
        let reports = ReportingService::new(db);

        assert!(reports.inventory_report().await.unwrap().is_empty());
        assert!(reports.inventory_snapshot().await.unwrap().is_empty());
    }
}
