//! Core types for the cart API.
//!
//! This module provides the typed cart domain and type-safe wrappers for
//! common domain concepts.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod email;
pub mod id;
pub mod money;
pub mod payment;
pub mod region;
pub mod scalar;

pub use address::{Address, AddressKind, CUSTOMER_ADDRESS_FIELDS, ShippingRate};
pub use cart::{Cart, CartItem, CartRepository, CartServiceError, CartTotals};
pub use catalog::{Catalog, Product};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{CurrencyCode, Money, UnknownCurrency};
pub use payment::{
    Payment, PaymentChecks, PaymentMethod, PaymentMethodError, PaymentMethodRegistry,
};
pub use region::{Region, RegionDirectory};
pub use scalar::Attributes;
