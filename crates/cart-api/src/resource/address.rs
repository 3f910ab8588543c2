//! Billing and shipping address resources.

use cart_api_core::{AddressKind, Attributes};
use serde_json::Value;

use super::attributes::{AttributeMap, DuplicateMappingError};
use super::filter::FilterRules;
use super::pipeline::{accept, applied, prepare};
use super::schema::ResourceSchema;
use super::types::{AttributeType, TypeMap};
use super::{
    ActionType, CartApi, Dispatch, Operation, PipelineContext, ResourceError, ResourceKind,
    ResourceRequest, ResourceResponse,
};
use crate::checkout::resolve_region;

const BILLING_READABLE: &[&str] = &[
    "first_name",
    "last_name",
    "company",
    "street",
    "city",
    "region",
    "region_id",
    "postcode",
    "country_id",
    "telephone",
    "email",
];

const BILLING_WRITABLE: &[&str] = &[
    "first_name",
    "last_name",
    "company",
    "street",
    "city",
    "region",
    "postcode",
    "country_id",
    "telephone",
    "email",
];

const SHIPPING_READABLE: &[&str] = &[
    "first_name",
    "last_name",
    "company",
    "street",
    "city",
    "region",
    "region_id",
    "postcode",
    "country_id",
    "telephone",
    "email",
    "same_as_billing",
    "shipping_method",
];

const SHIPPING_WRITABLE: &[&str] = &[
    "first_name",
    "last_name",
    "company",
    "street",
    "city",
    "region",
    "postcode",
    "country_id",
    "telephone",
    "email",
    "same_as_billing",
    "shipping_method",
];

pub(super) fn schema(kind: ResourceKind) -> Result<ResourceSchema, DuplicateMappingError> {
    let rules = if kind == ResourceKind::ShippingAddress {
        FilterRules {
            readable: SHIPPING_READABLE,
            writable: SHIPPING_WRITABLE,
            create_only: &[],
        }
    } else {
        FilterRules {
            readable: BILLING_READABLE,
            writable: BILLING_WRITABLE,
            create_only: &[],
        }
    };

    Ok(ResourceSchema {
        kind,
        rules,
        map: AttributeMap::new([("first_name", "firstname"), ("last_name", "lastname")])?,
        types: TypeMap::new([
            ("first_name", AttributeType::String),
            ("last_name", AttributeType::String),
            ("company", AttributeType::String),
            ("city", AttributeType::String),
            ("region", AttributeType::String),
            ("region_id", AttributeType::Integer),
            ("postcode", AttributeType::String),
            ("country_id", AttributeType::String),
            ("telephone", AttributeType::String),
            ("email", AttributeType::String),
            ("same_as_billing", AttributeType::Boolean),
            ("shipping_method", AttributeType::String),
        ]),
    })
}

const fn address_kind(kind: ResourceKind) -> AddressKind {
    match kind {
        ResourceKind::ShippingAddress => AddressKind::Shipping,
        _ => AddressKind::Billing,
    }
}

const fn schema_for(api: &CartApi, kind: AddressKind) -> &ResourceSchema {
    match kind {
        AddressKind::Billing => &api.schemas.billing_address,
        AddressKind::Shipping => &api.schemas.shipping_address,
    }
}

pub(super) fn dispatch(
    dispatch: &mut Dispatch<'_>,
    context: PipelineContext,
    request: ResourceRequest,
) -> Result<ResourceResponse, ResourceError> {
    let kind = address_kind(context.kind);
    match (context.action, context.operation) {
        (ActionType::Entity, Operation::Retrieve) => retrieve(dispatch, context, kind),
        (ActionType::Entity, Operation::Create | Operation::Update) => {
            update(dispatch, context, kind, request.body)
        }
        (ActionType::Entity, Operation::Delete) => delete(dispatch, kind),
        _ => Err(ResourceError::method_not_allowed(context)),
    }
}

fn retrieve(
    dispatch: &mut Dispatch<'_>,
    context: PipelineContext,
    kind: AddressKind,
) -> Result<ResourceResponse, ResourceError> {
    let api = dispatch.api;
    let cart = dispatch.load_cart()?;

    let data = prepare(
        schema_for(api, kind),
        context,
        &api.services.hooks,
        cart,
        cart.address(kind).export_attributes(),
    );
    Ok(ResourceResponse::Render(Value::Object(data)))
}

fn update(
    dispatch: &mut Dispatch<'_>,
    context: PipelineContext,
    kind: AddressKind,
    body: Attributes,
) -> Result<ResourceResponse, ResourceError> {
    let api = dispatch.api;
    let session = dispatch.session;
    let schema = schema_for(api, kind);
    let services = &api.services;
    let cart = dispatch.load_cart()?;

    let body = accept(schema, context, &services.hooks, cart, body);
    let data = schema.map.map_attributes(body);

    let previous = cart.address(kind);
    let mut data = resolve_region(
        data,
        previous.country_id.as_deref(),
        previous.region_id,
        services.regions.as_ref(),
    );

    cart.address_mut(kind).import_attributes(&data);
    match kind {
        AddressKind::Shipping => {
            if cart.shipping_address.same_as_billing {
                cart.copy_billing_to_shipping();
            }
            cart.shipping_address.collect_shipping_rates = true;
        }
        AddressKind::Billing => {
            if cart.shipping_address.same_as_billing {
                cart.copy_billing_to_shipping();
                cart.shipping_address.collect_shipping_rates = true;
            }
        }
    }
    applied(schema, context, &services.hooks, cart, &mut data);

    services.save(session, cart)?;
    tracing::info!(cart_id = ?cart.id, address_type = kind.as_str(), "address updated");

    let data = prepare(
        schema,
        context,
        &services.hooks,
        cart,
        cart.address(kind).export_attributes(),
    );
    Ok(ResourceResponse::Render(Value::Object(data)))
}

fn delete(
    dispatch: &mut Dispatch<'_>,
    kind: AddressKind,
) -> Result<ResourceResponse, ResourceError> {
    let api = dispatch.api;
    let session = dispatch.session;
    let cart = dispatch.load_cart()?;

    cart.address_mut(kind).reset();
    api.services.save(session, cart)?;

    Ok(ResourceResponse::NoContent)
}
