//! In-memory payment method registry.

use std::collections::BTreeMap;

use cart_api_core::{PaymentMethod, PaymentMethodError, PaymentMethodRegistry};
use rust_decimal::Decimal;

/// Payment methods keyed by code.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentRegistry {
    methods: BTreeMap<String, PaymentMethod>,
}

impl InMemoryPaymentRegistry {
    #[must_use]
    pub fn new(methods: impl IntoIterator<Item = PaymentMethod>) -> Self {
        Self {
            methods: methods
                .into_iter()
                .map(|method| (method.code.clone(), method))
                .collect(),
        }
    }

    /// Offline methods: check/money order, purchase order, bank transfer.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new([
            PaymentMethod {
                code: "checkmo".to_string(),
                title: "Check / Money order".to_string(),
                active: true,
                can_use_checkout: true,
                allowed_countries: None,
                allowed_currencies: None,
                min_order_total: None,
                max_order_total: None,
            },
            PaymentMethod {
                code: "purchaseorder".to_string(),
                title: "Purchase Order".to_string(),
                active: true,
                can_use_checkout: true,
                allowed_countries: Some(vec!["US".to_string(), "CA".to_string()]),
                allowed_currencies: None,
                min_order_total: Some(Decimal::new(5000, 2)),
                max_order_total: None,
            },
            PaymentMethod {
                code: "banktransfer".to_string(),
                title: "Bank Transfer Payment".to_string(),
                active: true,
                can_use_checkout: true,
                allowed_countries: Some(vec!["DE".to_string()]),
                allowed_currencies: None,
                min_order_total: None,
                max_order_total: Some(Decimal::new(1_000_000, 2)),
            },
        ])
    }
}

impl PaymentMethodRegistry for InMemoryPaymentRegistry {
    fn resolve(&self, code: &str) -> Result<Option<PaymentMethod>, PaymentMethodError> {
        Ok(self.methods.get(code).cloned())
    }
}
