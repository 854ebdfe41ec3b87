//! # Catalog Service
//!
//! Validation and query facade over the catalog store. All product
//! CRUD from the outside world passes through here; stock levels do
//! not (those belong to the Inventory Engine).

use tracing::{debug, info};

use crate::error::EngineResult;
use minimart_core::{validation, NewProduct, Product, ProductCategory};
use minimart_db::{Database, DbError};

/// Product CRUD with business-rule validation in front of the store.
#[derive(Debug, Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    /// Creates a new CatalogService over an injected database handle.
    pub fn new(db: Database) -> Self {
        CatalogService { db }
    }

    /// Creates a product.
    ///
    /// Validates the payload, then pre-checks the code against live
    /// and soft-deleted rows alike. The UNIQUE constraint backs this
    /// check, so a concurrent create of the same code still surfaces
    /// as `DbError::DuplicateCode` rather than a raw constraint error.
    pub async fn create_product(&self, payload: &NewProduct) -> EngineResult<Product> {
        validation::validate_new_product(payload)?;

        if let Some(existing) = self.db.products().get_by_code(&payload.code).await? {
            debug!(code = %existing.code, deleted = existing.deleted, "code already taken");
            return Err(DbError::DuplicateCode {
                code: payload.code.clone(),
            }
            .into());
        }

        let product = self.db.products().insert(payload).await?;
        info!(id = %product.id, code = %product.code, "product created");
        Ok(product)
    }

    /// Updates a product's descriptive fields.
    ///
    /// Re-runs the same validation as create. The store ignores the
    /// `quantity_on_hand` and `deleted` fields of the passed value;
    /// stock goes through the Inventory Engine and deletion through
    /// [`delete_product`].
    ///
    /// [`delete_product`]: CatalogService::delete_product
    pub async fn update_product(&self, product: &Product) -> EngineResult<Product> {
        validation::validate_code(&product.code)?;
        validation::validate_name(&product.name)?;
        validation::validate_price_cents(product.price_cents)?;

        self.db.products().update(product).await?;
        let updated = self
            .db
            .products()
            .get_by_id(&product.id)
            .await?
            .ok_or_else(|| DbError::not_found("product", &product.id))?;
        info!(id = %updated.id, code = %updated.code, "product updated");
        Ok(updated)
    }

    /// Soft-deletes a product. Its code stays reserved and its sale
    /// history stays intact; it just stops appearing in live queries.
    pub async fn delete_product(&self, id: &str) -> EngineResult<()> {
        self.db.products().soft_delete(id).await?;
        info!(id = %id, "product soft-deleted");
        Ok(())
    }

    /// Searches live products.
    ///
    /// Keyword matches name or code as a case-sensitive substring; an
    /// empty keyword matches everything. Results are name-ordered.
    pub async fn search_products(
        &self,
        keyword: &str,
        category: Option<ProductCategory>,
    ) -> EngineResult<Vec<Product>> {
        Ok(self.db.products().search(keyword, category, false).await?)
    }

    /// Gets a product by id. `Ok(None)` when absent.
    pub async fn get_product(&self, id: &str) -> EngineResult<Option<Product>> {
        Ok(self.db.products().get_by_id(id).await?)
    }

    /// Gets a product by business code. `Ok(None)` when absent.
    pub async fn get_product_by_code(&self, code: &str) -> EngineResult<Option<Product>> {
        Ok(self.db.products().get_by_code(code).await?)
    }

    /// Live products at or below `threshold` units on hand, for the
    /// reorder view. Name-ordered like any other catalog listing.
    pub async fn get_low_stock(&self, threshold: i64) -> EngineResult<Vec<Product>> {
        let all = self.db.products().search("", None, false).await?;
        Ok(all
            .into_iter()
            .filter(|p| p.quantity_on_hand <= threshold)
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
