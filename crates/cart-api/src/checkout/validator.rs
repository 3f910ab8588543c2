//! Pre-checkout cart validation.

use std::collections::BTreeMap;

use cart_api_core::{
    Attributes, Cart, PaymentChecks, PaymentMethodError, PaymentMethodRegistry, RegionDirectory,
};
use serde_json::Value;

/// Field group a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValidationGroup {
    BillingAddress,
    Payment,
    ShippingAddress,
    ShippingMethod,
}

impl ValidationGroup {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BillingAddress => "billing_address",
            Self::Payment => "payment",
            Self::ShippingAddress => "shipping_address",
            Self::ShippingMethod => "shipping_method",
        }
    }
}

/// Why the selected payment method cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum PaymentMethodUnavailable {
    #[error("no payment method selected")]
    NotSelected,
    #[error("unknown payment method {0}")]
    Unknown(String),
    #[error(transparent)]
    Lookup(#[from] PaymentMethodError),
    #[error("payment method {0} is not available for this cart")]
    NotApplicable(String),
}

const PAYMENT_MESSAGE: &str = "Please select a valid payment method.";
const SHIPPING_METHOD_MESSAGE: &str = "Please specify a valid shipping method.";

/// Field group to ordered error messages. A missing group passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport(BTreeMap<ValidationGroup, Vec<String>>);

impl ValidationReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, group: ValidationGroup) -> Option<&[String]> {
        self.0.get(&group).map(Vec::as_slice)
    }

    fn extend(&mut self, group: ValidationGroup, messages: Vec<String>) {
        if !messages.is_empty() {
            self.0.entry(group).or_default().extend(messages);
        }
    }

    /// Render as `{"group": ["message", ...]}`.
    #[must_use]
    pub fn to_attributes(&self) -> Attributes {
        self.0
            .iter()
            .map(|(group, messages)| {
                (
                    group.as_str().to_string(),
                    Value::Array(messages.iter().cloned().map(Value::String).collect()),
                )
            })
            .collect()
    }
}

/// Validate a cart for checkout.
///
/// A shipping address flagged `same_as_billing` is refreshed from the billing
/// address first, so the cart is mutated.
pub fn validate_cart(
    cart: &mut Cart,
    regions: &dyn RegionDirectory,
    payments: &dyn PaymentMethodRegistry,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !cart.is_virtual() {
        if cart.shipping_address.same_as_billing {
            cart.copy_billing_to_shipping();
        }

        let shipping = &cart.shipping_address;
        if let Err(errors) = shipping.validate(regions) {
            report.extend(ValidationGroup::ShippingAddress, errors);
        }

        let has_rate = shipping
            .shipping_method
            .as_deref()
            .and_then(|code| shipping.shipping_rate_by_code(code))
            .is_some();
        if !has_rate {
            report.extend(
                ValidationGroup::ShippingMethod,
                vec![SHIPPING_METHOD_MESSAGE.to_string()],
            );
        }
    }

    if let Err(errors) = cart.billing_address.validate(regions) {
        report.extend(ValidationGroup::BillingAddress, errors);
    }

    if let Err(error) = check_payment_method(cart, payments) {
        tracing::debug!(cart_id = ?cart.id, error = %error, "payment method rejected");
        report.extend(ValidationGroup::Payment, vec![PAYMENT_MESSAGE.to_string()]);
    }

    report
}

fn check_payment_method(
    cart: &Cart,
    payments: &dyn PaymentMethodRegistry,
) -> Result<(), PaymentMethodUnavailable> {
    let checks = if cart.payment.checks.is_empty() {
        PaymentChecks::CHECKOUT
    } else {
        cart.payment.checks
    };
    ensure_payment_method(cart, cart.payment.method.as_deref(), checks, payments)
}

/// Check that `code` names a registered method usable for `cart` under
/// `checks`.
///
/// # Errors
///
/// Returns the reason the method cannot be used.
pub fn ensure_payment_method(
    cart: &Cart,
    code: Option<&str>,
    checks: PaymentChecks,
    payments: &dyn PaymentMethodRegistry,
) -> Result<(), PaymentMethodUnavailable> {
    let code = code.ok_or(PaymentMethodUnavailable::NotSelected)?;
    let method = payments
        .resolve(code)?
        .ok_or_else(|| PaymentMethodUnavailable::Unknown(code.to_string()))?;

    if !method.is_applicable(cart, checks) {
        return Err(PaymentMethodUnavailable::NotApplicable(code.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use cart_api_core::{AddressKind, CurrencyCode, PaymentMethod, Product, ShippingRate};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::store::{InMemoryPaymentRegistry, InMemoryRegionDirectory};

    struct FailingRegistry;

    impl PaymentMethodRegistry for FailingRegistry {
        fn resolve(&self, code: &str) -> Result<Option<PaymentMethod>, PaymentMethodError> {
            Err(PaymentMethodError::Misconfigured(code.to_string()))
        }
    }

    fn product(sku: &str, is_virtual: bool) -> Product {
        Product {
            sku: sku.to_string(),
            name: sku.to_string(),
            price: Decimal::new(1000, 2),
            is_virtual,
        }
    }

    fn fill_valid(cart: &mut Cart, kind: AddressKind) {
        let data = json!({
            "firstname": "Ada",
            "lastname": "Lovelace",
            "street": ["12 Analytical Way"],
            "city": "Austin",
            "region": "Texas",
            "region_id": 57,
            "postcode": "78701",
            "country_id": "US",
            "telephone": "555-0100",
        });
        if let Value::Object(data) = data {
            cart.address_mut(kind).import_attributes(&data);
        }
    }

    fn virtual_cart() -> Cart {
        let mut cart = Cart::new(CurrencyCode::USD);
        cart.add_product(&product("ebook", true), 1);
        fill_valid(&mut cart, AddressKind::Billing);
        cart.payment.method = Some("checkmo".to_string());
        cart.collect_totals();
        cart
    }

    fn physical_cart() -> Cart {
        let mut cart = Cart::new(CurrencyCode::USD);
        cart.add_product(&product("tee", false), 1);
        fill_valid(&mut cart, AddressKind::Billing);
        cart.payment.method = Some("checkmo".to_string());
        cart.shipping_address.shipping_rates = vec![ShippingRate {
            code: "flatrate_flatrate".to_string(),
            carrier_title: "Flat Rate".to_string(),
            method_title: "Fixed".to_string(),
            price: Decimal::new(500, 2),
        }];
        cart.collect_totals();
        cart
    }

    fn validate(cart: &mut Cart) -> ValidationReport {
        validate_cart(
            cart,
            &InMemoryRegionDirectory::with_defaults(),
            &InMemoryPaymentRegistry::with_defaults(),
        )
    }

    #[test]
    fn test_valid_virtual_cart() {
        let mut cart = virtual_cart();
        let report = validate(&mut cart);
        assert!(report.is_empty(), "{report:?}");
    }

    #[test]
    fn test_same_as_billing_copies_billing_address() {
        let mut cart = physical_cart();
        cart.shipping_address.same_as_billing = true;
        cart.shipping_address.shipping_method = Some("flatrate_flatrate".to_string());

        let report = validate(&mut cart);

        assert!(report.is_empty(), "{report:?}");
        assert!(cart.shipping_address.same_as_billing);
        assert_eq!(
            cart.shipping_address.export_customer_address(),
            cart.billing_address.export_customer_address()
        );
    }

    #[test]
    fn test_missing_shipping_method_is_one_message() {
        let mut cart = physical_cart();
        fill_valid(&mut cart, AddressKind::Shipping);

        let report = validate(&mut cart);

        assert_eq!(
            report.get(ValidationGroup::ShippingMethod),
            Some(&[SHIPPING_METHOD_MESSAGE.to_string()][..])
        );
        assert_eq!(report.get(ValidationGroup::ShippingAddress), None);
    }

    #[test]
    fn test_shipping_method_without_rate() {
        let mut cart = physical_cart();
        fill_valid(&mut cart, AddressKind::Shipping);
        cart.shipping_address.shipping_method = Some("tablerate_bestway".to_string());

        let report = validate(&mut cart);
        assert_eq!(report.get(ValidationGroup::ShippingMethod).map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_missing_payment_method() {
        let mut cart = virtual_cart();
        cart.payment.method = None;

        let report = validate(&mut cart);
        assert_eq!(
            report.get(ValidationGroup::Payment),
            Some(&[PAYMENT_MESSAGE.to_string()][..])
        );
    }

    #[test]
    fn test_registry_failure_reads_as_missing_method() {
        let mut cart = virtual_cart();
        let report = validate_cart(
            &mut cart,
            &InMemoryRegionDirectory::with_defaults(),
            &FailingRegistry,
        );
        assert_eq!(
            report.get(ValidationGroup::Payment),
            Some(&[PAYMENT_MESSAGE.to_string()][..])
        );
    }

    #[test]
    fn test_report_renders_groups() {
        let mut cart = Cart::new(CurrencyCode::USD);
        cart.add_product(&product("tee", false), 1);

        let report = validate(&mut cart);
        let rendered = Value::Object(report.to_attributes());

        assert_eq!(
            rendered["shipping_method"],
            json!([SHIPPING_METHOD_MESSAGE])
        );
        assert_eq!(rendered["payment"], json!([PAYMENT_MESSAGE]));
        assert!(rendered["billing_address"].as_array().is_some_and(|m| !m.is_empty()));
        assert!(rendered["shipping_address"].as_array().is_some_and(|m| !m.is_empty()));
    }
}
