//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::resource::{CartApi, DuplicateMappingError, Hooks, Services, TracingObserver};
use crate::store::{
    InMemoryCartStore, InMemoryCatalog, InMemoryPaymentRegistry, InMemoryRegionDirectory,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    api: CartApi,
}

impl AppState {
    /// Create application state over the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if a resource's attribute map is not a bijection.
    pub fn new(config: ApiConfig, services: Services) -> Result<Self, DuplicateMappingError> {
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api: CartApi::new(services)?,
            }),
        })
    }

    /// Create application state backed by the in-memory collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if a resource's attribute map is not a bijection.
    pub fn in_memory(config: ApiConfig) -> Result<Self, DuplicateMappingError> {
        let services = Services {
            carts: Arc::new(InMemoryCartStore::new(
                config.currency,
                config.cart_idle,
                config.shipping,
            )),
            regions: Arc::new(InMemoryRegionDirectory::with_defaults()),
            payments: Arc::new(InMemoryPaymentRegistry::with_defaults()),
            catalog: Arc::new(InMemoryCatalog::with_defaults()),
            hooks: Hooks::new().with(Arc::new(TracingObserver)),
        };

        Self::new(config, services)
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the resource layer.
    #[must_use]
    pub fn api(&self) -> &CartApi {
        &self.inner.api
    }
}
