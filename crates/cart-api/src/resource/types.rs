//! Wire type coercion.
//!
//! The domain layer hands out loosely typed scalars (amounts as decimal
//! strings, flags that may have been stored as `"1"`). Before rendering, each
//! declared attribute is canonicalized to its wire type. Coercion is applied
//! only at the outbound boundary.

use std::collections::BTreeMap;

use cart_api_core::Attributes;
use cart_api_core::scalar;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Number, Value};

/// Declared wire type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Boolean,
    Integer,
    Decimal,
    String,
    /// Always rendered as `null`.
    Null,
}

/// Per-resource declared types, keyed by external attribute code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMap(BTreeMap<String, AttributeType>);

impl TypeMap {
    #[must_use]
    pub fn new<'a>(types: impl IntoIterator<Item = (&'a str, AttributeType)>) -> Self {
        Self(
            types
                .into_iter()
                .map(|(code, ty)| (code.to_string(), ty))
                .collect(),
        )
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<AttributeType> {
        self.0.get(code).copied()
    }
}

/// Canonicalize every declared attribute in `data`.
///
/// Undeclared codes pass through unchanged. `null` stays `null` whatever the
/// declared type, and values that cannot be read as the declared type are
/// left as they are. Applying this twice gives the same result as once.
#[must_use]
pub fn fix_types(types: &TypeMap, data: Attributes) -> Attributes {
    data.into_iter()
        .map(|(code, value)| {
            let value = match types.get(&code) {
                Some(ty) => coerce(value, ty),
                None => value,
            };
            (code, value)
        })
        .collect()
}

fn coerce(value: Value, ty: AttributeType) -> Value {
    if value.is_null() {
        return value;
    }

    match ty {
        AttributeType::Null => Value::Null,
        AttributeType::Boolean => scalar::to_bool(&value).map_or(value, Value::Bool),
        AttributeType::Integer => scalar::to_i64(&value).map_or(value, Value::from),
        AttributeType::Decimal => scalar::to_decimal(&value)
            .and_then(|d| d.to_f64())
            .and_then(Number::from_f64)
            .map_or(value, Value::Number),
        AttributeType::String => match value {
            Value::Number(_) | Value::Bool(_) => {
                scalar::to_opt_string(&value).map_or(Value::Null, Value::String)
            }
            other => other,
        },
    }
}
