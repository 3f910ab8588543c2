//! Cart sub-resources and the transformation pipeline around them.
//!
//! Every request is classified into a [`ResourceKind`], an [`ActionType`]
//! and an [`Operation`] and handed to [`CartApi::dispatch`]. The resource
//! controllers translate between the wire representation (external attribute
//! codes, strict types) and the typed cart domain (internal attribute codes).
//!
//! # Pipeline
//!
//! ```text
//! inbound:  hook before → filter in → map (external → internal)
//!           → field derivation → domain mutation → hook after → save
//! outbound: export → unmap (internal → external) → filter out → hook prepare
//!           → filter out → type coercion → null-fill include set
//! ```

pub mod address;
pub mod attributes;
pub mod cart;
pub mod filter;
pub mod hooks;
pub mod item;
pub mod payment;
pub mod pipeline;
pub mod schema;
pub mod types;
pub mod validation;

use std::fmt;
use std::sync::Arc;

use cart_api_core::{
    Attributes, Cart, CartRepository, CartServiceError, Catalog, PaymentMethodRegistry,
    RegionDirectory, SessionKey,
};
use serde_json::Value;
use thiserror::Error;

use crate::checkout::{CartCache, save_cart};
pub use attributes::{AttributeMap, DuplicateMappingError};
pub use filter::{AttributeFilter, FilterRules};
pub use hooks::{HookPoint, Hooks, Observer, ResourceEvent, TracingObserver};
pub use schema::{ResourceSchema, Schemas};
pub use types::{AttributeType, TypeMap, fix_types};

/// Addressable sub-resource of the session's cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Cart,
    BillingAddress,
    ShippingAddress,
    Payment,
    Item,
    Validation,
}

impl ResourceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::BillingAddress => "billing_address",
            Self::ShippingAddress => "shipping_address",
            Self::Payment => "payment",
            Self::Item => "item",
            Self::Validation => "validation",
        }
    }

    /// Prefix of the resource's hook point names. Both address kinds share
    /// `address`.
    #[must_use]
    pub const fn hook_prefix(self) -> &'static str {
        match self {
            Self::BillingAddress | Self::ShippingAddress => "address",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a request addresses one record or a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    Entity,
    Collection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Retrieve,
    Create,
    Update,
    Delete,
}

/// The logical operation a pipeline stage runs under.
///
/// Filters and hooks are configured from this value. It is passed
/// explicitly, so assembling output at the end of an update is a
/// [`PipelineContext::retrieve`] of the update's context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineContext {
    pub kind: ResourceKind,
    pub action: ActionType,
    pub operation: Operation,
}

impl PipelineContext {
    #[must_use]
    pub const fn new(kind: ResourceKind, action: ActionType, operation: Operation) -> Self {
        Self {
            kind,
            action,
            operation,
        }
    }

    /// The same resource and action under the retrieve operation.
    #[must_use]
    pub const fn retrieve(self) -> Self {
        Self {
            operation: Operation::Retrieve,
            ..self
        }
    }
}

/// A classified request for one resource.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    pub action: ActionType,
    pub operation: Operation,
    /// Entity id from the path, for resources addressed by id.
    pub id: Option<String>,
    /// Request body (external attribute codes). Empty for bodiless requests.
    pub body: Attributes,
}

impl ResourceRequest {
    #[must_use]
    pub fn new(action: ActionType, operation: Operation) -> Self {
        Self {
            action,
            operation,
            id: None,
            body: Attributes::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Attributes) -> Self {
        self.body = body;
        self
    }
}

/// Successful outcome of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceResponse {
    /// Render the value as the response body.
    Render(Value),
    /// Empty body, no-content status.
    NoContent,
}

/// Errors raised while dispatching a resource request.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The resource does not support this action type / operation pair.
    #[error("{operation:?} is not allowed on {kind} {action:?}")]
    MethodNotAllowed {
        kind: ResourceKind,
        action: ActionType,
        operation: Operation,
    },

    /// The submitted data cannot be applied.
    #[error("{0}")]
    InvalidData(String),

    /// The addressed record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The cart service failed.
    #[error(transparent)]
    Cart(#[from] CartServiceError),
}

impl ResourceError {
    #[must_use]
    pub const fn method_not_allowed(context: PipelineContext) -> Self {
        Self::MethodNotAllowed {
            kind: context.kind,
            action: context.action,
            operation: context.operation,
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed { .. } => "RESOURCE_METHOD_NOT_ALLOWED",
            Self::InvalidData(_) => "RESOURCE_DATA_INVALID",
            Self::NotFound(_) => "RESOURCE_NOT_FOUND",
            Self::Cart(_) => "INTERNAL_ERROR",
        }
    }
}

/// Collaborators the resource controllers call.
#[derive(Clone)]
pub struct Services {
    pub carts: Arc<dyn CartRepository>,
    pub regions: Arc<dyn RegionDirectory>,
    pub payments: Arc<dyn PaymentMethodRegistry>,
    pub catalog: Arc<dyn Catalog>,
    pub hooks: Hooks,
}

impl Services {
    /// Run the save boundary for the session's cart.
    fn save(&self, session: &SessionKey, cart: &mut Cart) -> Result<(), ResourceError> {
        save_cart(session, cart, self.carts.as_ref(), &self.hooks)?;
        Ok(())
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

/// Entry point of the resource layer.
#[derive(Debug)]
pub struct CartApi {
    services: Services,
    schemas: Schemas,
}

impl CartApi {
    /// Build the resource layer.
    ///
    /// # Errors
    ///
    /// Returns an error if a resource's attribute map is not a bijection.
    pub fn new(services: Services) -> Result<Self, DuplicateMappingError> {
        Ok(Self {
            services,
            schemas: Schemas::new()?,
        })
    }

    #[must_use]
    pub const fn services(&self) -> &Services {
        &self.services
    }

    /// Dispatch one request against the session's cart.
    ///
    /// Unsupported action type / operation pairs are rejected before the
    /// cart is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the pair is unsupported, the data is
    /// invalid, the record does not exist or the cart service fails.
    #[tracing::instrument(
        skip(self, cache, request),
        fields(action = ?request.action, operation = ?request.operation)
    )]
    pub fn dispatch(
        &self,
        kind: ResourceKind,
        cache: &mut CartCache,
        session: &SessionKey,
        request: ResourceRequest,
    ) -> Result<ResourceResponse, ResourceError> {
        let context = PipelineContext::new(kind, request.action, request.operation);
        let mut dispatch = Dispatch {
            api: self,
            cache,
            session,
        };

        match kind {
            ResourceKind::Cart => cart::dispatch(&mut dispatch, context, request),
            ResourceKind::BillingAddress | ResourceKind::ShippingAddress => {
                address::dispatch(&mut dispatch, context, request)
            }
            ResourceKind::Payment => payment::dispatch(&mut dispatch, context, request),
            ResourceKind::Item => item::dispatch(&mut dispatch, context, request),
            ResourceKind::Validation => validation::dispatch(&mut dispatch, context),
        }
    }
}

/// Per-dispatch view handed to the resource controllers.
struct Dispatch<'a> {
    api: &'a CartApi,
    cache: &'a mut CartCache,
    session: &'a SessionKey,
}

impl Dispatch<'_> {
    fn load_cart(&mut self) -> Result<&mut Cart, ResourceError> {
        let services = &self.api.services;
        Ok(self
            .cache
            .load(self.session, false, services.carts.as_ref(), &services.hooks)?)
    }
}
