//! Checkout validation resource (retrieve only).

use serde_json::Value;

use super::{ActionType, Dispatch, Operation, PipelineContext, ResourceError, ResourceResponse};
use crate::checkout::validate_cart;

pub(super) fn dispatch(
    dispatch: &mut Dispatch<'_>,
    context: PipelineContext,
) -> Result<ResourceResponse, ResourceError> {
    if (context.action, context.operation) != (ActionType::Entity, Operation::Retrieve) {
        return Err(ResourceError::method_not_allowed(context));
    }

    let api = dispatch.api;
    let services = &api.services;
    let cart = dispatch.load_cart()?;
    let report = validate_cart(cart, services.regions.as_ref(), services.payments.as_ref());

    if !report.is_empty() {
        tracing::debug!(cart_id = ?cart.id, ?report, "cart failed validation");
    }
    Ok(ResourceResponse::Render(Value::Object(report.to_attributes())))
}
