//! The cart aggregate and its persistence contract.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::address::{Address, AddressKind};
use super::catalog::Product;
use super::id::{CartId, ItemId, SessionKey};
use super::money::{CurrencyCode, Money};
use super::payment::Payment;
use super::scalar::{self, Attributes};

/// A cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ItemId,
    pub sku: String,
    pub name: String,
    pub qty: u32,
    /// Unit price in the cart currency.
    pub price: Decimal,
    /// Virtual products have nothing to ship.
    pub is_virtual: bool,
}

impl CartItem {
    /// Line total (`price * qty`).
    #[must_use]
    pub fn row_total(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }

    /// Export the line as an attribute bag keyed by internal codes.
    ///
    /// Amounts are exported as decimal strings.
    #[must_use]
    pub fn export_attributes(&self) -> Attributes {
        let mut out = Attributes::new();
        out.insert("item_id".into(), Value::from(self.id.as_i32()));
        out.insert("sku".into(), Value::from(self.sku.clone()));
        out.insert("name".into(), Value::from(self.name.clone()));
        out.insert("qty".into(), Value::from(self.qty));
        out.insert("price".into(), Value::from(self.price.to_string()));
        out.insert("row_total".into(), Value::from(self.row_total().to_string()));
        out.insert("is_virtual".into(), Value::Bool(self.is_virtual));
        out
    }
}

/// Derived totals snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub grand_total: Money,
}

impl CartTotals {
    #[must_use]
    pub const fn zero(currency: CurrencyCode) -> Self {
        Self {
            subtotal: Money::zero(currency),
            shipping: Money::zero(currency),
            grand_total: Money::zero(currency),
        }
    }
}

/// The in-progress order aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Assigned on first save.
    pub id: Option<CartId>,
    pub customer_email: Option<String>,
    pub currency: CurrencyCode,
    pub items: Vec<CartItem>,
    pub billing_address: Address,
    /// Ignored while the cart is virtual.
    pub shipping_address: Address,
    pub payment: Payment,
    pub totals: CartTotals,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Cart {
    /// A new, empty, unsaved cart.
    #[must_use]
    pub const fn new(currency: CurrencyCode) -> Self {
        Self {
            id: None,
            customer_email: None,
            currency,
            items: Vec::new(),
            billing_address: Address::new(AddressKind::Billing),
            shipping_address: Address::new(AddressKind::Shipping),
            payment: Payment {
                method: None,
                po_number: None,
                cc_type: None,
                cc_owner: None,
                cc_last_4: None,
                cc_exp_month: None,
                cc_exp_year: None,
                checks: super::payment::PaymentChecks::empty(),
            },
            totals: CartTotals::zero(currency),
            updated_at: None,
        }
    }

    /// A cart is virtual when it has items and none of them ship.
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| item.is_virtual)
    }

    /// Total quantity over all lines, saturating at `u32::MAX`.
    #[must_use]
    pub fn items_qty(&self) -> u32 {
        self.items
            .iter()
            .map(|item| item.qty)
            .fold(0, u32::saturating_add)
    }

    /// Borrow an address by kind.
    #[must_use]
    pub const fn address(&self, kind: AddressKind) -> &Address {
        match kind {
            AddressKind::Billing => &self.billing_address,
            AddressKind::Shipping => &self.shipping_address,
        }
    }

    /// Mutably borrow an address by kind.
    pub fn address_mut(&mut self, kind: AddressKind) -> &mut Address {
        match kind {
            AddressKind::Billing => &mut self.billing_address,
            AddressKind::Shipping => &mut self.shipping_address,
        }
    }

    /// Overwrite the shipping address's customer fields with the billing
    /// address's, keeping the shipping address flagged `same_as_billing`.
    pub fn copy_billing_to_shipping(&mut self) {
        let billing = self.billing_address.export_customer_address();
        self.shipping_address.import_customer_address(&billing);
        self.shipping_address.same_as_billing = true;
    }

    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Add `qty` of a product. An existing line for the same SKU is
    /// increased instead of adding a second line.
    ///
    /// Returns the id of the affected line.
    pub fn add_product(&mut self, product: &Product, qty: u32) -> ItemId {
        if let Some(item) = self.items.iter_mut().find(|item| item.sku == product.sku) {
            item.qty = item.qty.saturating_add(qty);
            return item.id;
        }

        let id = ItemId::new(
            self.items
                .iter()
                .map(|item| item.id.as_i32())
                .max()
                .unwrap_or(0)
                + 1,
        );
        self.items.push(CartItem {
            id,
            sku: product.sku.clone(),
            name: product.name.clone(),
            qty,
            price: product.price,
            is_virtual: product.is_virtual,
        });
        id
    }

    /// Remove a line. Returns whether a line was removed.
    pub fn remove_item(&mut self, id: ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Empty the cart, keeping its id and currency.
    pub fn clear(&mut self) {
        *self = Self {
            id: self.id,
            updated_at: self.updated_at,
            ..Self::new(self.currency)
        };
    }

    /// Recompute the totals snapshot.
    ///
    /// Shipping is the price of the computed rate matching the selected
    /// shipping method; virtual carts never pay shipping.
    pub fn collect_totals(&mut self) {
        let subtotal: Decimal = self.items.iter().map(CartItem::row_total).sum();
        let shipping = if self.is_virtual() {
            Decimal::ZERO
        } else {
            self.shipping_address
                .shipping_method
                .as_deref()
                .and_then(|code| self.shipping_address.shipping_rate_by_code(code))
                .map_or(Decimal::ZERO, |rate| rate.price)
        };

        self.totals = CartTotals {
            subtotal: Money::new(subtotal, self.currency),
            shipping: Money::new(shipping, self.currency),
            grand_total: Money::new(subtotal + shipping, self.currency),
        };
    }

    /// Export the cart-level fields as an attribute bag keyed by internal
    /// codes. Amounts are exported as decimal strings.
    #[must_use]
    pub fn export_attributes(&self) -> Attributes {
        let mut out = Attributes::new();
        out.insert(
            "entity_id".into(),
            self.id.map_or(Value::Null, |id| Value::from(id.as_i32())),
        );
        out.insert(
            "customer_email".into(),
            scalar::opt_string_value(self.customer_email.as_deref()),
        );
        out.insert("quote_currency_code".into(), Value::from(self.currency.code()));
        out.insert("is_virtual".into(), Value::Bool(self.is_virtual()));
        out.insert("items_count".into(), Value::from(self.items.len()));
        out.insert("items_qty".into(), Value::from(self.items_qty()));
        out.insert(
            "subtotal".into(),
            Value::from(self.totals.subtotal.amount.to_string()),
        );
        out.insert(
            "shipping_amount".into(),
            Value::from(self.totals.shipping.amount.to_string()),
        );
        out.insert(
            "grand_total".into(),
            Value::from(self.totals.grand_total.amount.to_string()),
        );
        out.insert(
            "updated_at".into(),
            self.updated_at
                .map_or(Value::Null, |at| Value::from(at.to_rfc3339())),
        );
        out
    }

    /// Apply the writable cart-level fields from an attribute bag keyed by
    /// internal codes.
    pub fn import_attributes(&mut self, data: &Attributes) {
        if let Some(email) = data.get("customer_email") {
            self.customer_email = scalar::to_opt_string(email);
        }
    }
}

/// Errors raised by the cart persistence and totals engine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CartServiceError {
    /// The backing store could not be reached.
    #[error("cart storage unavailable: {0}")]
    Unavailable(String),
    /// Persisting the cart failed.
    #[error("failed to save cart: {0}")]
    Save(String),
}

/// Cart persistence and computation engine.
///
/// One cart per session. `save` assigns an id to new carts, recollects
/// shipping rates when flagged, recomputes totals, persists, and binds the
/// cart to the session.
pub trait CartRepository: Send + Sync {
    /// Load the session's cart, or a fresh unsaved cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn load(&self, session: &SessionKey) -> Result<Cart, CartServiceError>;

    /// Persist the cart for the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    fn save(&self, session: &SessionKey, cart: &mut Cart) -> Result<(), CartServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::address::ShippingRate;

    fn product(sku: &str, price: i64, is_virtual: bool) -> Product {
        Product {
            sku: sku.into(),
            name: sku.to_uppercase(),
            price: Decimal::new(price, 0),
            is_virtual,
        }
    }

    #[test]
    fn test_add_product_merges_same_sku() {
        let mut cart = Cart::new(CurrencyCode::USD);
        let first = cart.add_product(&product("tee", 20, false), 1);
        let again = cart.add_product(&product("tee", 20, false), 2);
        let other = cart.add_product(&product("mug", 10, false), 1);

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items_qty(), 4);
    }

    #[test]
    fn test_items_qty_saturates() {
        let mut cart = Cart::new(CurrencyCode::USD);
        cart.add_product(&product("tee", 20, false), 3_000_000_000);
        cart.add_product(&product("mug", 10, false), 3_000_000_000);
        assert_eq!(cart.items_qty(), u32::MAX);
    }

    #[test]
    fn test_virtual_cart() {
        let mut cart = Cart::new(CurrencyCode::USD);
        assert!(!cart.is_virtual());
        cart.add_product(&product("ebook", 9, true), 1);
        assert!(cart.is_virtual());
        cart.add_product(&product("tee", 20, false), 1);
        assert!(!cart.is_virtual());
    }

    #[test]
    fn test_collect_totals_includes_selected_rate() {
        let mut cart = Cart::new(CurrencyCode::USD);
        cart.add_product(&product("tee", 20, false), 2);
        cart.shipping_address.shipping_rates = vec![ShippingRate {
            code: "flatrate_flatrate".into(),
            carrier_title: "Flat Rate".into(),
            method_title: "Fixed".into(),
            price: Decimal::new(10, 0),
        }];
        cart.shipping_address.shipping_method = Some("flatrate_flatrate".into());

        cart.collect_totals();
        assert_eq!(cart.totals.subtotal.amount, Decimal::new(40, 0));
        assert_eq!(cart.totals.shipping.amount, Decimal::new(10, 0));
        assert_eq!(cart.totals.grand_total.amount, Decimal::new(50, 0));
    }

    #[test]
    fn test_clear_keeps_identity() {
        let mut cart = Cart::new(CurrencyCode::EUR);
        cart.id = Some(CartId::new(3));
        cart.customer_email = Some("a@example.com".into());
        cart.add_product(&product("tee", 20, false), 1);

        cart.clear();
        assert_eq!(cart.id, Some(CartId::new(3)));
        assert_eq!(cart.currency, CurrencyCode::EUR);
        assert!(cart.items.is_empty());
        assert!(cart.customer_email.is_none());
    }
}
