//! Shared inbound and outbound pipeline stages.

use cart_api_core::{Attributes, Cart};
use serde_json::Value;

use super::hooks::{HookPoint, Hooks};
use super::schema::ResourceSchema;
use super::types::fix_types;
use super::PipelineContext;

/// Assemble one domain record for output.
///
/// `domain` is keyed by internal codes. The result holds exactly the include
/// set of the retrieve filter, with codes the record does not supply filled
/// with `null`. Runs under the retrieve operation whatever `context` says.
#[must_use]
pub fn prepare(
    schema: &ResourceSchema,
    context: PipelineContext,
    hooks: &Hooks,
    cart: &Cart,
    domain: Attributes,
) -> Attributes {
    let filter = schema.filter(&context.retrieve());

    let mut data = filter.filter_outbound(schema.map.unmap_attributes(domain));
    hooks.resource(HookPoint::Prepare(schema.kind), &mut data, &filter, cart);
    // Observers may have injected codes outside the include set.
    let data = filter.filter_outbound(data);

    let mut data = fix_types(&schema.types, data);
    for code in filter.include_set() {
        data.entry(code.clone()).or_insert(Value::Null);
    }
    data
}

/// Run the `update.before` hook and the inbound filter over a request body.
///
/// The result is still keyed by external codes.
#[must_use]
pub fn accept(
    schema: &ResourceSchema,
    context: PipelineContext,
    hooks: &Hooks,
    cart: &Cart,
    mut body: Attributes,
) -> Attributes {
    let filter = schema.filter(&context);
    hooks.resource(HookPoint::UpdateBefore(schema.kind), &mut body, &filter, cart);
    filter.filter_inbound(body)
}

/// Run the `update.after` hook over applied domain data.
pub fn applied(
    schema: &ResourceSchema,
    context: PipelineContext,
    hooks: &Hooks,
    cart: &Cart,
    data: &mut Attributes,
) {
    let filter = schema.filter(&context);
    hooks.resource(HookPoint::UpdateAfter(schema.kind), data, &filter, cart);
}

/// Merge a nested `data` object into its siblings.
///
/// Clients may wrap the payload as `{"data": {...}}`. Sibling keys win over
/// keys of the wrapper; a `data` value that is not an object is dropped.
#[must_use]
pub fn flatten_data_wrapper(mut body: Attributes) -> Attributes {
    match body.remove("data") {
        Some(Value::Object(mut nested)) => {
            nested.append(&mut body);
            nested
        }
        _ => body,
    }
}
