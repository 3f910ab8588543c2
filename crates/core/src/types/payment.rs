//! Cart payment record and the payment method registry contract.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::cart::Cart;
use super::money::CurrencyCode;
use super::scalar::{self, Attributes};

bitflags::bitflags! {
    /// Bitmask of applicability checks a payment method must pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct PaymentChecks: u32 {
        /// Method allowed for the billing country.
        const USE_FOR_COUNTRY = 1;
        /// Method allowed for the cart currency.
        const USE_FOR_CURRENCY = 2;
        /// Method usable in storefront checkout.
        const USE_CHECKOUT = 4;
        /// Grand total inside the method's min/max bounds.
        const ORDER_TOTAL_MIN_MAX = 32;

        /// The checks applied when a payment is submitted through the API.
        const CHECKOUT = Self::USE_CHECKOUT.bits()
            | Self::USE_FOR_COUNTRY.bits()
            | Self::USE_FOR_CURRENCY.bits()
            | Self::ORDER_TOTAL_MIN_MAX.bits();
    }
}

impl Default for PaymentChecks {
    fn default() -> Self {
        Self::empty()
    }
}

/// The cart's payment record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment method code in the registry.
    pub method: Option<String>,
    pub po_number: Option<String>,
    pub cc_type: Option<String>,
    pub cc_owner: Option<String>,
    pub cc_last_4: Option<String>,
    pub cc_exp_month: Option<i64>,
    pub cc_exp_year: Option<i64>,
    /// Checks the method must pass for this cart.
    pub checks: PaymentChecks,
}

impl Payment {
    /// Export the payment as an attribute bag keyed by internal codes.
    #[must_use]
    pub fn export_attributes(&self) -> Attributes {
        let mut out = Attributes::new();
        out.insert("method".into(), scalar::opt_string_value(self.method.as_deref()));
        out.insert("po_number".into(), scalar::opt_string_value(self.po_number.as_deref()));
        out.insert("cc_type".into(), scalar::opt_string_value(self.cc_type.as_deref()));
        out.insert("cc_owner".into(), scalar::opt_string_value(self.cc_owner.as_deref()));
        out.insert("cc_last_4".into(), scalar::opt_string_value(self.cc_last_4.as_deref()));
        out.insert(
            "cc_exp_month".into(),
            self.cc_exp_month.map_or(Value::Null, Value::from),
        );
        out.insert(
            "cc_exp_year".into(),
            self.cc_exp_year.map_or(Value::Null, Value::from),
        );
        out.insert("checks".into(), Value::from(self.checks.bits()));
        out
    }

    /// Replace the payment wholesale from an attribute bag keyed by internal
    /// codes. Codes absent from `data` are cleared.
    pub fn import_attributes(&mut self, data: &Attributes) {
        let string = |code: &str| data.get(code).and_then(scalar::to_opt_string);
        let integer = |code: &str| data.get(code).and_then(scalar::to_i64);

        *self = Self {
            method: string("method"),
            po_number: string("po_number"),
            cc_type: string("cc_type"),
            cc_owner: string("cc_owner"),
            cc_last_4: string("cc_last_4"),
            cc_exp_month: integer("cc_exp_month"),
            cc_exp_year: integer("cc_exp_year"),
            checks: integer("checks")
                .and_then(|bits| u32::try_from(bits).ok())
                .map_or_else(PaymentChecks::empty, PaymentChecks::from_bits_truncate),
        };
    }
}

/// A live payment method implementation from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub code: String,
    pub title: String,
    pub active: bool,
    pub can_use_checkout: bool,
    /// Allowed billing countries; `None` allows all.
    pub allowed_countries: Option<Vec<String>>,
    /// Allowed currencies; `None` allows all.
    pub allowed_currencies: Option<Vec<CurrencyCode>>,
    pub min_order_total: Option<Decimal>,
    pub max_order_total: Option<Decimal>,
}

impl PaymentMethod {
    /// Whether the method can be used for `cart` under `checks`.
    ///
    /// An inactive method is never applicable; every other condition is only
    /// evaluated when its flag is set.
    #[must_use]
    pub fn is_applicable(&self, cart: &Cart, checks: PaymentChecks) -> bool {
        if !self.active {
            return false;
        }

        if checks.contains(PaymentChecks::USE_CHECKOUT) && !self.can_use_checkout {
            return false;
        }

        if checks.contains(PaymentChecks::USE_FOR_COUNTRY)
            && let Some(countries) = &self.allowed_countries
        {
            let country = cart.billing_address.country_id.as_deref();
            if !country.is_some_and(|c| countries.iter().any(|allowed| allowed == c)) {
                return false;
            }
        }

        if checks.contains(PaymentChecks::USE_FOR_CURRENCY)
            && let Some(currencies) = &self.allowed_currencies
            && !currencies.contains(&cart.currency)
        {
            return false;
        }

        if checks.contains(PaymentChecks::ORDER_TOTAL_MIN_MAX) {
            let total = cart.totals.grand_total.amount;
            if self.min_order_total.is_some_and(|min| total < min)
                || self.max_order_total.is_some_and(|max| total > max)
            {
                return false;
            }
        }

        true
    }
}

/// Errors raised by a payment method registry lookup.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PaymentMethodError {
    /// The registry could not be consulted.
    #[error("payment method registry unavailable: {0}")]
    Unavailable(String),
    /// The method exists but cannot be instantiated.
    #[error("payment method {0} is misconfigured")]
    Misconfigured(String),
}

/// Payment method registry.
pub trait PaymentMethodRegistry: Send + Sync {
    /// Resolve a method code to a live implementation.
    ///
    /// # Errors
    ///
    /// Returns an error when the registry itself fails; an unknown code is
    /// `Ok(None)`.
    fn resolve(&self, code: &str) -> Result<Option<PaymentMethod>, PaymentMethodError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::money::Money;

    fn method() -> PaymentMethod {
        PaymentMethod {
            code: "purchaseorder".into(),
            title: "Purchase Order".into(),
            active: true,
            can_use_checkout: true,
            allowed_countries: Some(vec!["US".into()]),
            allowed_currencies: Some(vec![CurrencyCode::USD]),
            min_order_total: None,
            max_order_total: Some(Decimal::new(1000, 0)),
        }
    }

    fn cart(country: &str, total: i64) -> Cart {
        let mut cart = Cart::new(CurrencyCode::USD);
        cart.billing_address.country_id = Some(country.into());
        cart.totals.grand_total = Money::new(Decimal::new(total, 0), CurrencyCode::USD);
        cart
    }

    #[test]
    fn test_checkout_mask() {
        assert_eq!(PaymentChecks::CHECKOUT.bits(), 39);
        assert!(PaymentChecks::CHECKOUT.contains(PaymentChecks::USE_FOR_CURRENCY));
        assert_eq!(
            PaymentChecks::USE_CHECKOUT | PaymentChecks::USE_FOR_COUNTRY,
            PaymentChecks::from_bits_truncate(5)
        );
    }

    #[test]
    fn test_applicability() {
        let method = method();
        assert!(method.is_applicable(&cart("US", 10), PaymentChecks::CHECKOUT));
        assert!(!method.is_applicable(&cart("DE", 10), PaymentChecks::CHECKOUT));
        assert!(!method.is_applicable(&cart("US", 5000), PaymentChecks::CHECKOUT));
        // Unflagged checks are not evaluated.
        assert!(method.is_applicable(&cart("DE", 5000), PaymentChecks::empty()));
    }

    #[test]
    fn test_inactive_method_never_applies() {
        let mut method = method();
        method.active = false;
        assert!(!method.is_applicable(&cart("US", 10), PaymentChecks::empty()));
    }

    #[test]
    fn test_import_replaces_wholesale() {
        let mut payment = Payment {
            method: Some("checkmo".into()),
            po_number: Some("PO-1".into()),
            ..Payment::default()
        };
        let data = json!({"method": "purchaseorder", "cc_exp_year": "2030", "checks": 39});
        payment.import_attributes(data.as_object().unwrap_or(&Attributes::new()));
        assert_eq!(payment.method.as_deref(), Some("purchaseorder"));
        assert_eq!(payment.po_number, None);
        assert_eq!(payment.cc_exp_year, Some(2030));
        assert_eq!(payment.checks, PaymentChecks::CHECKOUT);
    }
}
