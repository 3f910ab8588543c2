//! Cart item resources: the item list and single items by id.

use cart_api_core::{Attributes, Cart, ItemId, scalar};
use serde_json::Value;

use super::filter::FilterRules;
use super::pipeline::{accept, applied, prepare};
use super::schema::ResourceSchema;
use super::types::{AttributeType, TypeMap};
use super::{
    ActionType, AttributeMap, Dispatch, Operation, PipelineContext, ResourceError, ResourceKind,
    ResourceRequest, ResourceResponse, Services,
};

const READABLE: &[&str] = &[
    "item_id",
    "sku",
    "name",
    "qty",
    "price",
    "row_total",
    "is_virtual",
];

pub(super) fn schema() -> ResourceSchema {
    ResourceSchema {
        kind: ResourceKind::Item,
        rules: FilterRules {
            readable: READABLE,
            writable: &["qty"],
            create_only: &["sku"],
        },
        map: AttributeMap::identity(),
        types: TypeMap::new([
            ("item_id", AttributeType::Integer),
            ("sku", AttributeType::String),
            ("name", AttributeType::String),
            ("qty", AttributeType::Integer),
            ("price", AttributeType::Decimal),
            ("row_total", AttributeType::Decimal),
            ("is_virtual", AttributeType::Boolean),
        ]),
    }
}

pub(super) fn dispatch(
    dispatch: &mut Dispatch<'_>,
    context: PipelineContext,
    request: ResourceRequest,
) -> Result<ResourceResponse, ResourceError> {
    match (context.action, context.operation) {
        (ActionType::Collection, Operation::Retrieve) => list(dispatch, context),
        (ActionType::Collection, Operation::Create) => create(dispatch, context, request.body),
        (ActionType::Entity, Operation::Retrieve) => {
            let id = parse_id(request.id.as_deref())?;
            retrieve(dispatch, context, id)
        }
        (ActionType::Entity, Operation::Update) => {
            let id = parse_id(request.id.as_deref())?;
            update(dispatch, context, id, request.body)
        }
        (ActionType::Entity, Operation::Delete) => {
            let id = parse_id(request.id.as_deref())?;
            delete(dispatch, id)
        }
        _ => Err(ResourceError::method_not_allowed(context)),
    }
}

fn parse_id(id: Option<&str>) -> Result<ItemId, ResourceError> {
    let id = id.unwrap_or_default();
    id.parse()
        .map_err(|_| ResourceError::NotFound(format!("cart item {id} not found")))
}

fn not_found(id: ItemId) -> ResourceError {
    ResourceError::NotFound(format!("cart item {id} not found"))
}

/// Read a submitted quantity. `None` when the code is absent.
fn read_qty(data: &Attributes) -> Result<Option<u32>, ResourceError> {
    data.get("qty")
        .map(|value| {
            scalar::to_i64(value)
                .and_then(|qty| u32::try_from(qty).ok())
                .ok_or_else(|| {
                    ResourceError::InvalidData("qty must be a non-negative integer".to_string())
                })
        })
        .transpose()
}

fn render_item(
    services: &Services,
    schema: &ResourceSchema,
    context: PipelineContext,
    cart: &Cart,
    id: ItemId,
) -> Result<Attributes, ResourceError> {
    let item = cart.item(id).ok_or_else(|| not_found(id))?;
    Ok(prepare(schema, context, &services.hooks, cart, item.export_attributes()))
}

fn list(
    dispatch: &mut Dispatch<'_>,
    context: PipelineContext,
) -> Result<ResourceResponse, ResourceError> {
    let api = dispatch.api;
    let cart: &Cart = dispatch.load_cart()?;

    let items = cart
        .items
        .iter()
        .map(|item| {
            Value::Object(prepare(
                &api.schemas.item,
                context,
                &api.services.hooks,
                cart,
                item.export_attributes(),
            ))
        })
        .collect();
    Ok(ResourceResponse::Render(Value::Array(items)))
}

fn create(
    dispatch: &mut Dispatch<'_>,
    context: PipelineContext,
    body: Attributes,
) -> Result<ResourceResponse, ResourceError> {
    let api = dispatch.api;
    let session = dispatch.session;
    let schema = &api.schemas.item;
    let services = &api.services;
    let cart = dispatch.load_cart()?;

    let mut data = schema.map.map_attributes(accept(schema, context, &services.hooks, cart, body));

    let sku = data
        .get("sku")
        .and_then(scalar::to_opt_string)
        .ok_or_else(|| ResourceError::InvalidData("sku is required".to_string()))?;
    let qty = read_qty(&data)?.unwrap_or(1);
    if qty == 0 {
        return Err(ResourceError::InvalidData("qty must be at least 1".to_string()));
    }
    let product = services
        .catalog
        .find_by_sku(&sku)
        .ok_or_else(|| ResourceError::NotFound(format!("product {sku} not found")))?;

    let id = cart.add_product(&product, qty);
    applied(schema, context, &services.hooks, cart, &mut data);

    services.save(session, cart)?;
    tracing::info!(cart_id = ?cart.id, item_id = %id, sku = %sku, qty, "item added");

    let data = render_item(services, schema, context, cart, id)?;
    Ok(ResourceResponse::Render(Value::Object(data)))
}

fn retrieve(
    dispatch: &mut Dispatch<'_>,
    context: PipelineContext,
    id: ItemId,
) -> Result<ResourceResponse, ResourceError> {
    let api = dispatch.api;
    let cart = dispatch.load_cart()?;

    let data = render_item(&api.services, &api.schemas.item, context, cart, id)?;
    Ok(ResourceResponse::Render(Value::Object(data)))
}

fn update(
    dispatch: &mut Dispatch<'_>,
    context: PipelineContext,
    id: ItemId,
    body: Attributes,
) -> Result<ResourceResponse, ResourceError> {
    let api = dispatch.api;
    let session = dispatch.session;
    let schema = &api.schemas.item;
    let services = &api.services;
    let cart = dispatch.load_cart()?;

    if cart.item(id).is_none() {
        return Err(not_found(id));
    }

    let mut data = schema.map.map_attributes(accept(schema, context, &services.hooks, cart, body));
    let removed = match read_qty(&data)? {
        Some(0) => cart.remove_item(id),
        Some(qty) => {
            if let Some(item) = cart.item_mut(id) {
                item.qty = qty;
            }
            false
        }
        None => false,
    };
    applied(schema, context, &services.hooks, cart, &mut data);

    services.save(session, cart)?;

    if removed {
        tracing::info!(cart_id = ?cart.id, item_id = %id, "item removed");
        return Ok(ResourceResponse::NoContent);
    }

    let data = render_item(services, schema, context, cart, id)?;
    Ok(ResourceResponse::Render(Value::Object(data)))
}

fn delete(dispatch: &mut Dispatch<'_>, id: ItemId) -> Result<ResourceResponse, ResourceError> {
    let api = dispatch.api;
    let session = dispatch.session;
    let cart = dispatch.load_cart()?;

    if !cart.remove_item(id) {
        return Err(not_found(id));
    }
    api.services.save(session, cart)?;
    tracing::info!(cart_id = ?cart.id, item_id = %id, "item removed");

    Ok(ResourceResponse::NoContent)
}
