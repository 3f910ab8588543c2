//! Cart resource: the cart-level fields, totals and a validation summary.

use cart_api_core::{Attributes, Email, scalar};
use serde_json::Value;

use super::attributes::{AttributeMap, DuplicateMappingError};
use super::filter::FilterRules;
use super::pipeline::{accept, applied, prepare};
use super::schema::ResourceSchema;
use super::types::{AttributeType, TypeMap};
use super::{
    ActionType, Dispatch, Operation, PipelineContext, ResourceError, ResourceKind,
    ResourceRequest, ResourceResponse,
};
use crate::checkout::validate_cart;

const READABLE: &[&str] = &[
    "cart_id",
    "email",
    "currency",
    "is_virtual",
    "items_count",
    "items_qty",
    "subtotal",
    "shipping_amount",
    "grand_total",
    "updated_at",
    "validation",
];

pub(super) fn schema() -> Result<ResourceSchema, DuplicateMappingError> {
    Ok(ResourceSchema {
        kind: ResourceKind::Cart,
        rules: FilterRules {
            readable: READABLE,
            writable: &["email"],
            create_only: &[],
        },
        map: AttributeMap::new([
            ("cart_id", "entity_id"),
            ("email", "customer_email"),
            ("currency", "quote_currency_code"),
        ])?,
        types: TypeMap::new([
            ("cart_id", AttributeType::Integer),
            ("email", AttributeType::String),
            ("currency", AttributeType::String),
            ("is_virtual", AttributeType::Boolean),
            ("items_count", AttributeType::Integer),
            ("items_qty", AttributeType::Integer),
            ("subtotal", AttributeType::Decimal),
            ("shipping_amount", AttributeType::Decimal),
            ("grand_total", AttributeType::Decimal),
            ("updated_at", AttributeType::String),
        ]),
    })
}

pub(super) fn dispatch(
    dispatch: &mut Dispatch<'_>,
    context: PipelineContext,
    request: ResourceRequest,
) -> Result<ResourceResponse, ResourceError> {
    match (context.action, context.operation) {
        (ActionType::Entity, Operation::Retrieve) => render(dispatch, context),
        (ActionType::Entity, Operation::Update) => update(dispatch, context, request.body),
        (ActionType::Entity, Operation::Delete) => delete(dispatch),
        _ => Err(ResourceError::method_not_allowed(context)),
    }
}

fn render(
    dispatch: &mut Dispatch<'_>,
    context: PipelineContext,
) -> Result<ResourceResponse, ResourceError> {
    let api = dispatch.api;
    let services = &api.services;
    let cart = dispatch.load_cart()?;

    let report = validate_cart(cart, services.regions.as_ref(), services.payments.as_ref());
    let mut domain = cart.export_attributes();
    domain.insert("validation".into(), Value::Object(report.to_attributes()));

    let data = prepare(&api.schemas.cart, context, &services.hooks, cart, domain);
    Ok(ResourceResponse::Render(Value::Object(data)))
}

fn update(
    dispatch: &mut Dispatch<'_>,
    context: PipelineContext,
    body: Attributes,
) -> Result<ResourceResponse, ResourceError> {
    let api = dispatch.api;
    let session = dispatch.session;
    let schema = &api.schemas.cart;
    let services = &api.services;

    {
        let cart = dispatch.load_cart()?;
        let body = accept(schema, context, &services.hooks, cart, body);
        let mut data = schema.map.map_attributes(body);

        if let Some(email) = data.get("customer_email").and_then(scalar::to_opt_string) {
            let email = Email::parse(&email)
                .map_err(|e| ResourceError::InvalidData(format!("invalid email: {e}")))?;
            data.insert("customer_email".into(), Value::from(email.into_inner()));
        }

        cart.import_attributes(&data);
        // Clearing the email clears the billing copy too, or reconciliation
        // would restore it on save.
        if data.contains_key("customer_email") && cart.customer_email.is_none() {
            cart.billing_address.email = None;
        }
        applied(schema, context, &services.hooks, cart, &mut data);

        services.save(session, cart)?;
        tracing::info!(cart_id = ?cart.id, "cart updated");
    }

    render(dispatch, context)
}

fn delete(dispatch: &mut Dispatch<'_>) -> Result<ResourceResponse, ResourceError> {
    let api = dispatch.api;
    let session = dispatch.session;
    let cart = dispatch.load_cart()?;

    cart.clear();
    api.services.save(session, cart)?;
    tracing::info!(cart_id = ?cart.id, "cart emptied");

    Ok(ResourceResponse::NoContent)
}
