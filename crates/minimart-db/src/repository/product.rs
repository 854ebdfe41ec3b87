//! # Catalog Store
//!
//! Database operations for products.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Writes What                                      │
//! │                                                                         │
//! │  Catalog Service ───► insert / update / soft_delete / search            │
//! │                       (all fields except quantity_on_hand)              │
//! │                                                                         │
//! │  Inventory Engine ──► apply_stock_delta_in                              │
//! │                       (quantity_on_hand ONLY, inside a transaction      │
//! │                        that also appends the ledger row)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Search is a case-sensitive substring match over name and code.
//! SQLite `LIKE` is case-insensitive for ASCII, so `instr()` is used
//! instead.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use minimart_core::{NewProduct, Product, ProductCategory};

/// Raw row shape; `category` stays a string until checked.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    code: String,
    name: String,
    price_cents: i64,
    quantity_on_hand: i64,
    category: String,
    description: Option<String>,
    deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Product> {
        let category: ProductCategory = row
            .category
            .parse()
            .map_err(|_| DbError::corruption("products", "category", &row.category))?;

        Ok(Product {
            id: row.id,
            code: row.code,
            name: row.name,
            price_cents: row.price_cents,
            quantity_on_hand: row.quantity_on_hand,
            category,
            description: row.description,
            deleted: row.deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, code, name, price_cents, quantity_on_hand, category, \
                              description, deleted, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
/// let product = repo.insert(&new_product).await?;
/// let found = repo.get_by_code("BV001").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product, assigning identity and timestamps.
    ///
    /// ## Returns
    /// * `Ok(Product)` - the persisted row, id and timestamps filled in
    /// * `Err(DbError::DuplicateCode)` - code already exists, live or
    ///   soft-deleted (the UNIQUE constraint spans all rows)
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        debug!(code = %new.code, "inserting product");

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            code: new.code.clone(),
            name: new.name.clone(),
            price_cents: new.price_cents,
            quantity_on_hand: new.quantity_on_hand,
            category: new.category,
            description: new.description.clone(),
            deleted: false,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (
                id, code, name, price_cents, quantity_on_hand,
                category, description, deleted, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.quantity_on_hand)
        .bind(product.category.as_str())
        .bind(&product.description)
        .bind(product.deleted)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let err = DbError::from(e);
            if err.is_unique_violation_on("products.code") {
                DbError::DuplicateCode {
                    code: product.code.clone(),
                }
            } else {
                err
            }
        })?;

        Ok(product)
    }

    /// Updates an existing product's descriptive fields by id.
    ///
    /// Bumps `updated_at`. Never touches `quantity_on_hand` (that is
    /// the Inventory Engine's column) or the `deleted` flag, so a
    /// soft-deleted row is not resurrected implicitly.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - id does not exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                code = ?2,
                name = ?3,
                price_cents = ?4,
                category = ?5,
                description = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.category.as_str())
        .bind(&product.description)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let err = DbError::from(e);
            if err.is_unique_violation_on("products.code") {
                DbError::DuplicateCode {
                    code: product.code.clone(),
                }
            } else {
                err
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("product", &product.id));
        }

        Ok(())
    }

    /// Soft-deletes a product.
    ///
    /// Idempotent: deleting an already-deleted row is a no-op apart
    /// from bumping `updated_at`. Fails with `NotFound` only when the
    /// id does not exist at all.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET deleted = 1, updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("product", id));
        }

        Ok(())
    }

    /// Searches products.
    ///
    /// ## Filter Semantics
    /// - `include_deleted = false` hides soft-deleted rows
    /// - empty keyword matches everything; otherwise a case-sensitive
    ///   substring of name OR code must match
    /// - `category = None` matches every category
    /// - ordered by name ascending, insertion order (rowid) breaking ties
    pub async fn search(
        &self,
        keyword: &str,
        category: Option<ProductCategory>,
        include_deleted: bool,
    ) -> DbResult<Vec<Product>> {
        debug!(keyword = %keyword, ?category, include_deleted, "searching products");

        let category_filter = category.map(|c| c.as_str()).unwrap_or("");

        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM products
            WHERE (?1 OR deleted = 0)
              AND (?2 = '' OR instr(name, ?2) > 0 OR instr(code, ?2) > 0)
              AND (?3 = '' OR category = ?3)
            ORDER BY name ASC, rowid ASC
            "#
        ))
        .bind(include_deleted)
        .bind(keyword)
        .bind(category_filter)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Gets a product by its id. `Ok(None)` when absent - not an error.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Gets a product by its business code, deleted rows included
    /// (codes stay reserved after soft-delete).
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE code = ?1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Counts live products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE deleted = 0")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Transaction-scoped helpers (Inventory Engine only)
    // =========================================================================

    /// Loads a product inside a caller-owned transaction.
    pub async fn get_by_id_in(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Applies a signed stock delta inside a caller-owned transaction.
    ///
    /// The UPDATE is guarded: it refuses to drive `quantity_on_hand`
    /// below zero, re-checking the invariant inside the same write
    /// transaction that the engine's pre-check ran in. Returns the
    /// number of rows changed - 0 means the guard (or the id) did not
    /// match and nothing was written.
    pub async fn apply_stock_delta_in(
        conn: &mut SqliteConnection,
        id: &str,
        delta: i64,
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        debug!(id = %id, delta = %delta, "applying stock delta");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                quantity_on_hand = quantity_on_hand + ?2,
                updated_at = ?3
            WHERE id = ?1 AND quantity_on_hand + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn water() -> NewProduct {
        NewProduct {
            code: "BV001".to_string(),
            name: "Drinking Water 600ml".to_string(),
            price_cents: 4500,
            quantity_on_hand: 20,
            category: ProductCategory::Beverage,
            description: Some("still water".to_string()),
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_identity_and_timestamps() {
        let db = db().await;
        let product = db.products().insert(&water()).await.unwrap();

        assert!(!product.id.is_empty());
        assert!(!product.deleted);
        assert_eq!(product.created_at, product.updated_at);
    }

    #[tokio::test]
    async fn test_insert_round_trips_field_for_field() {
        let db = db().await;
        let inserted = db.products().insert(&water()).await.unwrap();

        let reloaded = db.products().get_by_id(&inserted.id).await.unwrap().unwrap();
        assert_eq!(reloaded, inserted);

        let by_code = db.products().get_by_code("BV001").await.unwrap().unwrap();
        assert_eq!(by_code, inserted);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected_and_single_row_persists() {
        let db = db().await;
        db.products().insert(&water()).await.unwrap();

        let mut second = water();
        second.name = "Another Water".to_string();
        let err = db.products().insert(&second).await.unwrap_err();
        assert!(matches!(err, DbError::DuplicateCode { code } if code == "BV001"));

        assert_eq!(db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_code_stays_reserved_after_soft_delete() {
        let db = db().await;
        let product = db.products().insert(&water()).await.unwrap();
        db.products().soft_delete(&product.id).await.unwrap();

        let err = db.products().insert(&water()).await.unwrap_err();
        assert!(matches!(err, DbError::DuplicateCode { .. }));
    }

    #[tokio::test]
    async fn test_update_overwrites_and_bumps_updated_at() {
        let db = db().await;
        let mut product = db.products().insert(&water()).await.unwrap();

        product.name = "Drinking Water 1.5L".to_string();
        product.price_cents = 5500;
        db.products().update(&product).await.unwrap();

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.name, "Drinking Water 1.5L");
        assert_eq!(reloaded.price_cents, 5500);
        assert!(reloaded.updated_at >= reloaded.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let db = db().await;
        let mut product = db.products().insert(&water()).await.unwrap();
        product.id = "nonexistent".to_string();

        let err = db.products().update(&product).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_soft_delete_is_idempotent() {
        let db = db().await;
        let product = db.products().insert(&water()).await.unwrap();

        db.products().soft_delete(&product.id).await.unwrap();
        // second delete is a no-op, not an error
        db.products().soft_delete(&product.id).await.unwrap();

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert!(reloaded.deleted);

        let err = db.products().soft_delete("nonexistent").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = db().await;
        assert!(db.products().get_by_id("missing").await.unwrap().is_none());
        assert!(db.products().get_by_code("ZZ999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_filters_and_ordering() {
        let db = db().await;
        let products = db.products();

        let mut soap = water();
        soap.code = "HH001".to_string();
        soap.name = "Dish Soap".to_string();
        soap.category = ProductCategory::Household;

        let mut cola = water();
        cola.code = "BV002".to_string();
        cola.name = "Cola 330ml".to_string();

        products.insert(&water()).await.unwrap();
        products.insert(&soap).await.unwrap();
        let cola = products.insert(&cola).await.unwrap();

        // empty keyword, no category: everything, name ascending
        let all = products.search("", None, false).await.unwrap();
        let names: Vec<&str> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Cola 330ml", "Dish Soap", "Drinking Water 600ml"]);

        // keyword matches name or code, case-sensitively
        let hits = products.search("Water", None, false).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(products.search("water", None, false).await.unwrap().is_empty());
        let by_code = products.search("BV", None, false).await.unwrap();
        assert_eq!(by_code.len(), 2);

        // category filter
        let household = products
            .search("", Some(ProductCategory::Household), false)
            .await
            .unwrap();
        assert_eq!(household.len(), 1);
        assert_eq!(household[0].code, "HH001");

        // deleted rows hidden unless asked for
        products.soft_delete(&cola.id).await.unwrap();
        assert_eq!(products.search("", None, false).await.unwrap().len(), 2);
        assert_eq!(products.search("", None, true).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unrecognized_category_surfaces_as_corruption() {
        let db = db().await;
        let product = db.products().insert(&water()).await.unwrap();

        // damage the row behind the repository's back
        sqlx::query("UPDATE products SET category = 'Frozen' WHERE id = ?1")
            .bind(&product.id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.products().get_by_id(&product.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::DataCorruption { ref table, ref column, ref value }
                if table == "products" && column == "category" && value == "Frozen"
        ));

        // the search path refuses the same row instead of skipping it
        assert!(db.products().search("", None, false).await.is_err());
    }

    #[tokio::test]
    async fn test_stock_delta_guard_refuses_negative() {
        let db = db().await;
        let product = db.products().insert(&water()).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let rows =
            ProductRepository::apply_stock_delta_in(&mut tx, &product.id, -3, Utc::now())
                .await
                .unwrap();
        assert_eq!(rows, 1);

        // 20 - 3 = 17 on hand; -999 must not match the guard
        let rows =
            ProductRepository::apply_stock_delta_in(&mut tx, &product.id, -999, Utc::now())
                .await
                .unwrap();
        assert_eq!(rows, 0);
        tx.commit().await.unwrap();

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity_on_hand, 17);
    }
}
