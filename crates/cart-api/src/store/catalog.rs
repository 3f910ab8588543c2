//! In-memory product catalog.

use std::collections::BTreeMap;

use cart_api_core::{Catalog, Product};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: BTreeMap<String, Product>,
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products
                .into_iter()
                .map(|product| (product.sku.clone(), product))
                .collect(),
        }
    }

    /// Two physical and two virtual products.
    #[must_use]
    pub fn with_defaults() -> Self {
        let product = |sku: &str, name: &str, cents: i64, is_virtual: bool| Product {
            sku: sku.to_string(),
            name: name.to_string(),
            price: Decimal::new(cents, 2),
            is_virtual,
        };

        Self::new([
            product("tee-classic", "Classic Tee", 2500, false),
            product("mug-enamel", "Enamel Mug", 1250, false),
            product("ebook-field-guide", "Field Guide (eBook)", 999, true),
            product("gift-card-25", "Gift Card $25", 2500, true),
        ])
    }
}

impl Catalog for InMemoryCatalog {
    fn find_by_sku(&self, sku: &str) -> Option<Product> {
        self.products.get(sku).cloned()
    }
}
