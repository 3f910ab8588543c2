//! Per-resource attribute configuration.

use super::attributes::{AttributeMap, DuplicateMappingError};
use super::filter::{AttributeFilter, FilterRules};
use super::types::TypeMap;
use super::{PipelineContext, ResourceKind, address, cart, item, payment};

/// Visibility rules, code map and wire types of one resource.
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub kind: ResourceKind,
    pub rules: FilterRules,
    pub map: AttributeMap,
    pub types: TypeMap,
}

impl ResourceSchema {
    /// The attribute filter for a pipeline context.
    #[must_use]
    pub fn filter(&self, context: &PipelineContext) -> AttributeFilter {
        AttributeFilter::new(&self.rules, context)
    }
}

/// Schemas of every resource that renders attribute records.
///
/// Built once at startup so a non-bijective map fails before the server
/// accepts requests.
#[derive(Debug, Clone)]
pub struct Schemas {
    pub cart: ResourceSchema,
    pub billing_address: ResourceSchema,
    pub shipping_address: ResourceSchema,
    pub payment: ResourceSchema,
    pub item: ResourceSchema,
}

impl Schemas {
    /// # Errors
    ///
    /// Returns an error if a resource's attribute map is not a bijection.
    pub fn new() -> Result<Self, DuplicateMappingError> {
        Ok(Self {
            cart: cart::schema()?,
            billing_address: address::schema(ResourceKind::BillingAddress)?,
            shipping_address: address::schema(ResourceKind::ShippingAddress)?,
            payment: payment::schema()?,
            item: item::schema(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_schemas_are_bijective() {
        assert!(Schemas::new().is_ok());
    }

    #[test]
    fn test_readable_codes_are_unique() {
        let schemas = Schemas::new().unwrap_or_else(|e| panic!("{e}"));
        for schema in [
            &schemas.cart,
            &schemas.billing_address,
            &schemas.shipping_address,
            &schemas.payment,
            &schemas.item,
        ] {
            let mut codes = schema.rules.readable.to_vec();
            codes.sort_unstable();
            codes.dedup();
            assert_eq!(codes.len(), schema.rules.readable.len(), "{}", schema.kind);
        }
    }
}
