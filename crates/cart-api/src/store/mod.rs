//! In-process collaborator implementations.
//!
//! The resource layer only sees the collaborator traits from
//! `cart_api_core`. These implementations back the standalone server and
//! the tests:
//!
//! - [`InMemoryCartStore`] - carts keyed by session, `moka` idle expiry
//! - [`InMemoryRegionDirectory`] - US, Canadian and German regions
//! - [`InMemoryPaymentRegistry`] - offline payment methods
//! - [`InMemoryCatalog`] - a small product list

mod cart;
mod catalog;
mod payment;
mod regions;

pub use cart::{InMemoryCartStore, ShippingConfig};
pub use catalog::InMemoryCatalog;
pub use payment::InMemoryPaymentRegistry;
pub use regions::InMemoryRegionDirectory;
