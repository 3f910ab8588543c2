//! Payment resource.
//!
//! The payment has no identity of its own, so create and update share one
//! path: the cart's payment record is replaced wholesale.

use cart_api_core::{Attributes, Payment, PaymentChecks, scalar};
use serde_json::Value;

use super::attributes::{AttributeMap, DuplicateMappingError};
use super::filter::FilterRules;
use super::pipeline::{accept, applied, flatten_data_wrapper, prepare};
use super::schema::ResourceSchema;
use super::types::{AttributeType, TypeMap};
use super::{
    ActionType, Dispatch, Operation, PipelineContext, ResourceError, ResourceKind,
    ResourceRequest, ResourceResponse,
};
use crate::checkout::ensure_payment_method;

const READABLE: &[&str] = &[
    "method",
    "po_number",
    "cc_type",
    "cc_owner",
    "cc_last4",
    "cc_exp_month",
    "cc_exp_year",
];

const WRITABLE: &[&str] = &[
    "method",
    "po_number",
    "cc_type",
    "cc_owner",
    "cc_last4",
    "cc_exp_month",
    "cc_exp_year",
    "data",
];

pub(super) fn schema() -> Result<ResourceSchema, DuplicateMappingError> {
    Ok(ResourceSchema {
        kind: ResourceKind::Payment,
        rules: FilterRules {
            readable: READABLE,
            writable: WRITABLE,
            create_only: &[],
        },
        map: AttributeMap::new([("cc_last4", "cc_last_4")])?,
        types: TypeMap::new([
            ("method", AttributeType::String),
            ("po_number", AttributeType::String),
            ("cc_type", AttributeType::String),
            ("cc_owner", AttributeType::String),
            ("cc_last4", AttributeType::String),
            ("cc_exp_month", AttributeType::Integer),
            ("cc_exp_year", AttributeType::Integer),
        ]),
    })
}

pub(super) fn dispatch(
    dispatch: &mut Dispatch<'_>,
    context: PipelineContext,
    request: ResourceRequest,
) -> Result<ResourceResponse, ResourceError> {
    match (context.action, context.operation) {
        (ActionType::Entity, Operation::Retrieve) => retrieve(dispatch, context),
        (ActionType::Entity, Operation::Create | Operation::Update) => {
            update(dispatch, context, request.body)
        }
        (ActionType::Entity, Operation::Delete) => delete(dispatch),
        _ => Err(ResourceError::method_not_allowed(context)),
    }
}

fn retrieve(
    dispatch: &mut Dispatch<'_>,
    context: PipelineContext,
) -> Result<ResourceResponse, ResourceError> {
    let api = dispatch.api;
    let cart = dispatch.load_cart()?;

    let data = prepare(
        &api.schemas.payment,
        context,
        &api.services.hooks,
        cart,
        cart.payment.export_attributes(),
    );
    Ok(ResourceResponse::Render(Value::Object(data)))
}

fn update(
    dispatch: &mut Dispatch<'_>,
    context: PipelineContext,
    body: Attributes,
) -> Result<ResourceResponse, ResourceError> {
    let api = dispatch.api;
    let session = dispatch.session;
    let schema = &api.schemas.payment;
    let services = &api.services;
    let cart = dispatch.load_cart()?;

    let body = accept(schema, context, &services.hooks, cart, body);
    let mut data = schema.map.map_attributes(flatten_data_wrapper(body));

    let method = data.get("method").and_then(scalar::to_opt_string);
    if let Err(error) = ensure_payment_method(
        cart,
        method.as_deref(),
        PaymentChecks::CHECKOUT,
        services.payments.as_ref(),
    ) {
        tracing::info!(cart_id = ?cart.id, error = %error, "payment method rejected");
        return Err(ResourceError::InvalidData(format!(
            "The requested Payment Method is not available: {error}"
        )));
    }

    if cart.is_virtual() {
        cart.billing_address.payment_method = method;
    } else {
        cart.shipping_address.payment_method = method;
        cart.shipping_address.collect_shipping_rates = true;
    }

    data.insert("checks".into(), Value::from(PaymentChecks::CHECKOUT.bits()));
    cart.payment.import_attributes(&data);
    applied(schema, context, &services.hooks, cart, &mut data);

    services.save(session, cart)?;
    tracing::info!(cart_id = ?cart.id, method = ?cart.payment.method, "payment updated");

    let data = prepare(schema, context, &services.hooks, cart, cart.payment.export_attributes());
    Ok(ResourceResponse::Render(Value::Object(data)))
}

fn delete(dispatch: &mut Dispatch<'_>) -> Result<ResourceResponse, ResourceError> {
    let api = dispatch.api;
    let session = dispatch.session;
    let cart = dispatch.load_cart()?;

    cart.payment = Payment::default();
    cart.billing_address.payment_method = None;
    cart.shipping_address.payment_method = None;
    api.services.save(session, cart)?;

    Ok(ResourceResponse::NoContent)
}
