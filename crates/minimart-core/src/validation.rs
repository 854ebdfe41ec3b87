//! # Validation Module
//!
//! Input validation for catalog mutations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Catalog Service (Rust)                                        │
//! │  └── THIS MODULE: blank/negative/length checks, no state change         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  ├── UNIQUE constraint on products.code                                 │
//! │  └── Foreign key constraints                                            │
//! │                                                                         │
//! │  Defense in depth: the constraint backs the service-level check         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::NewProduct;
use crate::{MAX_CODE_LEN, MAX_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a product code.
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_CODE_LEN`] characters
///
/// ```rust
/// use minimart_core::validation::validate_code;
///
/// assert!(validate_code("BV001").is_ok());
/// assert!(validate_code("   ").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LEN,
        });
    }

    Ok(())
}

/// Validates a product name: non-blank, bounded length.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a unit price in cents: zero is allowed, negative is not.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates an on-hand quantity: zero is allowed, negative is not.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::Negative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a cart line quantity: must be at least 1.
///
/// Stricter than [`validate_quantity`]: an on-hand level of zero is a
/// valid catalog state, but selling zero (or a negative count) of
/// something is not a sale line.
pub fn validate_cart_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 1 {
        return Err(ValidationError::NotPositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

/// Validates every caller-supplied field of an insert payload.
///
/// Same rule set the Catalog Service applies on update: code and name
/// non-blank, price and quantity non-negative.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_code(&product.code)?;
    validate_name(&product.name)?;
    validate_price_cents(product.price_cents)?;
    validate_quantity(product.quantity_on_hand)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductCategory;

    fn payload() -> NewProduct {
        NewProduct {
            code: "BV001".to_string(),
            name: "Drinking Water".to_string(),
            price_cents: 4500,
            quantity_on_hand: 20,
            category: ProductCategory::Beverage,
            description: None,
        }
    }

    #[test]
    fn test_validate_code() {
        assert!(validate_code("BV001").is_ok());
        assert!(validate_code("").is_err());
        assert!(validate_code("   ").is_err());
        assert!(validate_code(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Dish Soap 500ml").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(4500).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0).is_ok());
        assert!(validate_quantity(20).is_ok());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_cart_quantity() {
        assert!(validate_cart_quantity(1).is_ok());
        assert!(validate_cart_quantity(20).is_ok());
        assert!(validate_cart_quantity(0).is_err());
        assert!(validate_cart_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(700).is_ok());
        assert!(validate_tax_rate_bps(10_000).is_ok());
        assert!(validate_tax_rate_bps(10_001).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        assert!(validate_new_product(&payload()).is_ok());

        let mut bad = payload();
        bad.code = " ".to_string();
        assert!(validate_new_product(&bad).is_err());

        let mut bad = payload();
        bad.price_cents = -100;
        assert!(validate_new_product(&bad).is_err());

        let mut bad = payload();
        bad.quantity_on_hand = -5;
        assert!(validate_new_product(&bad).is_err());
    }
}
