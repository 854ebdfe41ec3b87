//! Seeds a database with sample catalog data.
//!
//! Usage: `seed [path-to-db]` (defaults to `shop.db`). Safe to re-run;
//! products that already exist are skipped.

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use minimart_core::{NewProduct, ProductCategory};
use minimart_db::{Database, DbConfig, DbError};
use minimart_engine::{CatalogService, EngineError, EngineResult};

fn sample_products() -> Vec<NewProduct> {
    vec![
        NewProduct {
            code: "BV001".to_string(),
            name: "Drinking Water 1L".to_string(),
            price_cents: 4500,
            quantity_on_hand: 20,
            category: ProductCategory::Beverage,
            description: Some("Still water, 1 liter bottle".to_string()),
        },
        NewProduct {
            code: "BV002".to_string(),
            name: "Orange Juice 500ml".to_string(),
            price_cents: 6500,
            quantity_on_hand: 12,
            category: ProductCategory::Beverage,
            description: None,
        },
        NewProduct {
            code: "SN001".to_string(),
            name: "Potato Chips".to_string(),
            price_cents: 3000,
            quantity_on_hand: 30,
            category: ProductCategory::Snack,
            description: None,
        },
        NewProduct {
            code: "SN002".to_string(),
            name: "Chocolate Bar".to_string(),
            price_cents: 2200,
            quantity_on_hand: 25,
            category: ProductCategory::Snack,
            description: None,
        },
        NewProduct {
            code: "HH001".to_string(),
            name: "Dish Soap 500ml".to_string(),
            price_cents: 5500,
            quantity_on_hand: 8,
            category: ProductCategory::Household,
            description: None,
        },
        NewProduct {
            code: "PC001".to_string(),
            name: "Toothpaste 100g".to_string(),
            price_cents: 4000,
            quantity_on_hand: 15,
            category: ProductCategory::PersonalCare,
            description: None,
        },
    ]
}

async fn seed(catalog: &CatalogService) -> EngineResult<(usize, usize)> {
    let mut created = 0;
    let mut skipped = 0;

    for payload in sample_products() {
        match catalog.create_product(&payload).await {
            Ok(product) => {
                info!(code = %product.code, name = %product.name, "seeded product");
                created += 1;
            }
            Err(EngineError::Persistence(DbError::DuplicateCode { code })) => {
                debug!(code = %code, "already present, skipping");
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok((created, skipped))
}

#[tokio::main]
async fn main() -> EngineResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "shop.db".to_string());
    info!(path = %path, "seeding database");

    let db = Database::new(DbConfig::new(&path)).await?;
    let catalog = CatalogService::new(db.clone());

    let (created, skipped) = seed(&catalog).await?;
    info!(created, skipped, "seed complete");

    db.close().await;
    Ok(())
}
