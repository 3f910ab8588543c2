//! In-memory cart store.

use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use cart_api_core::{
    Cart, CartId, CartItem, CartRepository, CartServiceError, CurrencyCode, SessionKey,
    ShippingRate,
};
use chrono::Utc;
use moka::sync::Cache;
use rust_decimal::Decimal;

/// Flat-rate and free-shipping carrier settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingConfig {
    /// Fee per shippable unit.
    pub flat_rate: Decimal,
    /// Subtotal from which free shipping is offered.
    pub free_shipping_threshold: Decimal,
}

/// Carts keyed by session, evicted after an idle period.
///
/// Saving assigns sequential cart ids, recollects shipping rates when the
/// shipping address asks for it, and recomputes totals.
pub struct InMemoryCartStore {
    currency: CurrencyCode,
    shipping: ShippingConfig,
    carts: Cache<SessionKey, Cart>,
    next_id: AtomicI32,
}

impl InMemoryCartStore {
    #[must_use]
    pub fn new(currency: CurrencyCode, idle: Duration, shipping: ShippingConfig) -> Self {
        let carts = Cache::builder()
            .max_capacity(100_000)
            .time_to_idle(idle)
            .build();

        Self {
            currency,
            shipping,
            carts,
            next_id: AtomicI32::new(1),
        }
    }

    fn collect_shipping_rates(&self, cart: &mut Cart) {
        let shippable_qty: u32 = cart
            .items
            .iter()
            .filter(|item| !item.is_virtual)
            .map(|item| item.qty)
            .fold(0, u32::saturating_add);
        let subtotal: Decimal = cart.items.iter().map(CartItem::row_total).sum();

        let mut rates = Vec::new();
        if shippable_qty > 0 && cart.shipping_address.country_id.is_some() {
            rates.push(ShippingRate {
                code: "flatrate_flatrate".to_string(),
                carrier_title: "Flat Rate".to_string(),
                method_title: "Fixed".to_string(),
                price: self.shipping.flat_rate * Decimal::from(shippable_qty),
            });
            if subtotal >= self.shipping.free_shipping_threshold {
                rates.push(ShippingRate {
                    code: "freeshipping_freeshipping".to_string(),
                    carrier_title: "Free Shipping".to_string(),
                    method_title: "Free".to_string(),
                    price: Decimal::ZERO,
                });
            }
        }

        tracing::debug!(cart_id = ?cart.id, rates = rates.len(), "shipping rates collected");
        cart.shipping_address.shipping_rates = rates;
        cart.shipping_address.collect_shipping_rates = false;
    }
}

impl std::fmt::Debug for InMemoryCartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCartStore")
            .field("currency", &self.currency)
            .field("shipping", &self.shipping)
            .field("carts", &self.carts.entry_count())
            .finish_non_exhaustive()
    }
}

impl CartRepository for InMemoryCartStore {
    fn load(&self, session: &SessionKey) -> Result<Cart, CartServiceError> {
        Ok(self
            .carts
            .get(session)
            .unwrap_or_else(|| Cart::new(self.currency)))
    }

    fn save(&self, session: &SessionKey, cart: &mut Cart) -> Result<(), CartServiceError> {
        if cart.id.is_none() {
            cart.id = Some(CartId::new(self.next_id.fetch_add(1, Ordering::Relaxed)));
        }
        if cart.shipping_address.collect_shipping_rates {
            self.collect_shipping_rates(cart);
        }
        cart.collect_totals();
        cart.updated_at = Some(Utc::now());

        self.carts.insert(*session, cart.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cart_api_core::Product;

    use super::*;

    fn store() -> InMemoryCartStore {
        InMemoryCartStore::new(
            CurrencyCode::USD,
            Duration::from_secs(60),
            ShippingConfig {
                flat_rate: Decimal::new(500, 2),
                free_shipping_threshold: Decimal::new(10_000, 2),
            },
        )
    }

    fn product(sku: &str, cents: i64, is_virtual: bool) -> Product {
        Product {
            sku: sku.to_string(),
            name: sku.to_string(),
            price: Decimal::new(cents, 2),
            is_virtual,
        }
    }

    #[test]
    fn test_unknown_session_loads_fresh_cart() {
        let cart = store().load(&SessionKey::generate()).unwrap();
        assert!(cart.id.is_none());
        assert!(cart.items.is_empty());
        assert_eq!(cart.currency, CurrencyCode::USD);
    }

    #[test]
    fn test_save_assigns_sequential_ids() {
        let store = store();
        let (a, b) = (SessionKey::generate(), SessionKey::generate());

        let mut first = store.load(&a).unwrap();
        store.save(&a, &mut first).unwrap();
        let mut second = store.load(&b).unwrap();
        store.save(&b, &mut second).unwrap();
        store.save(&a, &mut first).unwrap();

        assert_eq!(first.id, Some(CartId::new(1)));
        assert_eq!(second.id, Some(CartId::new(2)));
        assert_eq!(store.load(&a).unwrap().id, Some(CartId::new(1)));
        assert!(store.load(&a).unwrap().updated_at.is_some());
    }

    #[test]
    fn test_flat_rate_is_per_shippable_unit() {
        let store = store();
        let session = SessionKey::generate();
        let mut cart = store.load(&session).unwrap();
        cart.add_product(&product("tee", 2500, false), 2);
        cart.add_product(&product("ebook", 999, true), 1);
        cart.shipping_address.country_id = Some("US".to_string());
        cart.shipping_address.shipping_method = Some("flatrate_flatrate".to_string());
        cart.shipping_address.collect_shipping_rates = true;

        store.save(&session, &mut cart).unwrap();

        assert_eq!(cart.shipping_address.shipping_rates.len(), 1);
        assert_eq!(cart.totals.shipping.amount, Decimal::new(1000, 2));
        assert_eq!(cart.totals.grand_total.amount, Decimal::new(6999, 2));
        assert!(!cart.shipping_address.collect_shipping_rates);
    }

    #[test]
    fn test_large_quantities_save() {
        let store = store();
        let session = SessionKey::generate();
        let mut cart = store.load(&session).unwrap();
        cart.add_product(&product("tee", 2500, false), 3_000_000_000);
        cart.add_product(&product("mug", 1250, false), 3_000_000_000);
        cart.shipping_address.country_id = Some("US".to_string());
        cart.shipping_address.collect_shipping_rates = true;

        store.save(&session, &mut cart).unwrap();

        assert_eq!(cart.items_qty(), u32::MAX);
        assert_eq!(
            cart.shipping_address
                .shipping_rate_by_code("flatrate_flatrate")
                .map(|rate| rate.price),
            Some(Decimal::new(500, 2) * Decimal::from(u32::MAX))
        );
    }

    #[test]
    fn test_free_shipping_from_threshold() {
        let store = store();
        let session = SessionKey::generate();
        let mut cart = store.load(&session).unwrap();
        cart.add_product(&product("tee", 2500, false), 4);
        cart.shipping_address.country_id = Some("US".to_string());
        cart.shipping_address.collect_shipping_rates = true;

        store.save(&session, &mut cart).unwrap();

        assert!(
            cart.shipping_address
                .shipping_rate_by_code("freeshipping_freeshipping")
                .is_some()
        );
    }

    #[test]
    fn test_no_rates_without_country_or_for_virtual_carts() {
        let store = store();
        let session = SessionKey::generate();
        let mut cart = store.load(&session).unwrap();
        cart.add_product(&product("tee", 2500, false), 1);
        cart.shipping_address.collect_shipping_rates = true;
        store.save(&session, &mut cart).unwrap();
        assert!(cart.shipping_address.shipping_rates.is_empty());

        let mut cart = Cart::new(CurrencyCode::USD);
        cart.add_product(&product("ebook", 999, true), 1);
        cart.shipping_address.country_id = Some("US".to_string());
        cart.shipping_address.collect_shipping_rates = true;
        store.save(&session, &mut cart).unwrap();
        assert!(cart.shipping_address.shipping_rates.is_empty());
    }
}
