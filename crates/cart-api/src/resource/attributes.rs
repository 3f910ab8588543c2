//! Attribute code mapping between wire names and domain names.
//!
//! An [`AttributeMap`] is a fixed bijection from external (wire) attribute
//! codes to internal (domain) attribute codes. Inbound data is mapped
//! external → internal, outbound data is unmapped internal → external. Codes
//! absent from the map pass through unchanged and values are never touched.

use std::collections::BTreeMap;

use cart_api_core::Attributes;
use thiserror::Error;

/// Two codes on one side of a map collide, so the map is not a bijection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("attribute code `{code}` is mapped from both `{first}` and `{second}`")]
pub struct DuplicateMappingError {
    /// The code that appears twice as a target.
    pub code: String,
    pub first: String,
    pub second: String,
}

/// Invert a code map.
///
/// # Errors
///
/// Returns [`DuplicateMappingError`] if two keys map to the same value.
pub fn invert(
    map: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, DuplicateMappingError> {
    let mut inverse = BTreeMap::new();
    for (from, to) in map {
        if let Some(previous) = inverse.insert(to.clone(), from.clone()) {
            return Err(DuplicateMappingError {
                code: to.clone(),
                first: previous,
                second: from.clone(),
            });
        }
    }
    Ok(inverse)
}

/// Rename every key of `data` present in `map`.
///
/// Keys are visited in ascending order; if a renamed key lands on a key that
/// is already present, the later write wins.
#[must_use]
pub fn map_attributes(map: &BTreeMap<String, String>, data: Attributes) -> Attributes {
    data.into_iter()
        .map(|(key, value)| match map.get(&key) {
            Some(renamed) => (renamed.clone(), value),
            None => (key, value),
        })
        .collect()
}

/// A validated external ↔ internal attribute code bijection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    external_to_internal: BTreeMap<String, String>,
    internal_to_external: BTreeMap<String, String>,
}

impl AttributeMap {
    /// Build a map from `(external, internal)` pairs.
    ///
    /// # Errors
    ///
    /// Fails if an external code is listed twice or two external codes share
    /// an internal code.
    pub fn new<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, DuplicateMappingError> {
        let mut external_to_internal = BTreeMap::new();
        for (external, internal) in pairs {
            if let Some(previous) =
                external_to_internal.insert(external.to_string(), internal.to_string())
            {
                return Err(DuplicateMappingError {
                    code: external.to_string(),
                    first: previous,
                    second: internal.to_string(),
                });
            }
        }
        let internal_to_external = invert(&external_to_internal)?;

        Ok(Self {
            external_to_internal,
            internal_to_external,
        })
    }

    /// The identity map.
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Wire → domain.
    #[must_use]
    pub fn map_attributes(&self, data: Attributes) -> Attributes {
        map_attributes(&self.external_to_internal, data)
    }

    /// Domain → wire.
    #[must_use]
    pub fn unmap_attributes(&self, data: Attributes) -> Attributes {
        map_attributes(&self.internal_to_external, data)
    }

    /// The internal code for an external code (unmapped codes map to
    /// themselves).
    #[must_use]
    pub fn internal_code<'a>(&'a self, external: &'a str) -> &'a str {
        self.external_to_internal
            .get(external)
            .map_or(external, String::as_str)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;
    use serde_json::{Value, json};

    use super::*;

    fn attrs(value: &Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_map_renames_known_keys_only() {
        let map = AttributeMap::new([("email", "customer_email")]).unwrap();
        let data = attrs(&json!({"email": "a@example.com", "currency": "USD"}));

        let mapped = map.map_attributes(data.clone());
        assert_eq!(mapped, attrs(&json!({"customer_email": "a@example.com", "currency": "USD"})));
        assert_eq!(map.unmap_attributes(mapped), data);
    }

    #[test]
    fn test_duplicate_internal_code_is_rejected() {
        let err = AttributeMap::new([("mail", "customer_email"), ("email", "customer_email")])
            .unwrap_err();
        assert_eq!(err.code, "customer_email");
        assert_eq!(err.first, "email");
        assert_eq!(err.second, "mail");
    }

    #[test]
    fn test_duplicate_external_code_is_rejected() {
        let err = AttributeMap::new([("email", "customer_email"), ("email", "billing_email")])
            .unwrap_err();
        assert_eq!(err.code, "email");
    }

    #[test]
    fn test_values_are_not_inspected() {
        let map = AttributeMap::new([("street", "street_lines")]).unwrap();
        let data = attrs(&json!({"street": ["1 Main St", {"nested": true}]}));
        let mapped = map.map_attributes(data);
        assert_eq!(mapped.get("street_lines"), Some(&json!(["1 Main St", {"nested": true}])));
    }

    #[test]
    fn test_internal_code_lookup() {
        let map = AttributeMap::new([("cc_last4", "cc_last_4")]).unwrap();
        assert_eq!(map.internal_code("cc_last4"), "cc_last_4");
        assert_eq!(map.internal_code("method"), "method");
    }

    proptest! {
        #[test]
        fn unmap_inverts_map(
            pairs in proptest::collection::btree_map("[a-z]{1,6}", "[A-Z]{1,6}", 1..8),
            values in proptest::collection::vec(any::<i64>(), 8),
        ) {
            // Keep the internal side unique so the pairs form a bijection.
            let mut seen = std::collections::BTreeSet::new();
            let pairs: Vec<(String, String)> = pairs
                .into_iter()
                .filter(|(_, internal)| seen.insert(internal.clone()))
                .collect();
            let map =
                AttributeMap::new(pairs.iter().map(|(e, i)| (e.as_str(), i.as_str()))).unwrap();

            let data: Attributes = pairs
                .iter()
                .zip(values)
                .map(|((external, _), v)| (external.clone(), Value::from(v)))
                .collect();

            prop_assert_eq!(map.unmap_attributes(map.map_attributes(data.clone())), data);
        }
    }
}
