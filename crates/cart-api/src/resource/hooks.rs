//! Extension hook points.
//!
//! Observers registered on [`Hooks`] are notified before and after each cart
//! load/save and around each resource's prepare/update stages. They receive
//! the in-flight data mutably and may change it before the pipeline
//! continues.

use std::fmt;
use std::sync::Arc;

use cart_api_core::{Attributes, Cart};

use super::ResourceKind;
use super::filter::AttributeFilter;

/// A named notification point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    CartLoadBefore,
    CartLoadAfter,
    CartSaveBefore,
    CartSaveAfter,
    Prepare(ResourceKind),
    UpdateBefore(ResourceKind),
    UpdateAfter(ResourceKind),
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CartLoadBefore => f.write_str("cart.load.before"),
            Self::CartLoadAfter => f.write_str("cart.load.after"),
            Self::CartSaveBefore => f.write_str("cart.save.before"),
            Self::CartSaveAfter => f.write_str("cart.save.after"),
            Self::Prepare(kind) => write!(f, "{}.prepare", kind.hook_prefix()),
            Self::UpdateBefore(kind) => write!(f, "{}.update.before", kind.hook_prefix()),
            Self::UpdateAfter(kind) => write!(f, "{}.update.after", kind.hook_prefix()),
        }
    }
}

/// What a resource observer sees.
pub struct ResourceEvent<'a> {
    /// In-flight attribute data (wire codes before mapping, domain codes after).
    pub data: &'a mut Attributes,
    pub filter: &'a AttributeFilter,
    /// The cart the resource belongs to.
    pub cart: &'a Cart,
}

/// Receiver for hook notifications. Both methods default to no-ops.
pub trait Observer: Send + Sync {
    fn cart_event(&self, _hook: HookPoint, _cart: &mut Cart) {}

    fn resource_event(&self, _hook: HookPoint, _event: &mut ResourceEvent<'_>) {}
}

/// Logs every notification at debug level.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn cart_event(&self, hook: HookPoint, cart: &mut Cart) {
        tracing::debug!(hook = %hook, cart_id = ?cart.id, "cart hook");
    }

    fn resource_event(&self, hook: HookPoint, event: &mut ResourceEvent<'_>) {
        tracing::debug!(
            hook = %hook,
            cart_id = ?event.cart.id,
            attributes = event.data.len(),
            "resource hook"
        );
    }
}

/// Registry of observers, notified in registration order.
#[derive(Clone, Default)]
pub struct Hooks {
    observers: Vec<Arc<dyn Observer>>,
}

impl Hooks {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    #[must_use]
    pub fn with(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn cart(&self, hook: HookPoint, cart: &mut Cart) {
        for observer in &self.observers {
            observer.cart_event(hook, cart);
        }
    }

    pub fn resource(
        &self,
        hook: HookPoint,
        data: &mut Attributes,
        filter: &AttributeFilter,
        cart: &Cart,
    ) {
        let mut event = ResourceEvent { data, filter, cart };
        for observer in &self.observers {
            observer.resource_event(hook, &mut event);
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_names() {
        assert_eq!(HookPoint::CartSaveBefore.to_string(), "cart.save.before");
        assert_eq!(
            HookPoint::Prepare(ResourceKind::Payment).to_string(),
            "payment.prepare"
        );
        assert_eq!(
            HookPoint::UpdateAfter(ResourceKind::ShippingAddress).to_string(),
            "address.update.after"
        );
    }
}
