//! Product catalog contract.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchasable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub name: String,
    /// Unit price in the store currency.
    pub price: Decimal,
    pub is_virtual: bool,
}

/// Product lookup service.
pub trait Catalog: Send + Sync {
    /// Find a saleable product by SKU.
    fn find_by_sku(&self, sku: &str) -> Option<Product>;
}
