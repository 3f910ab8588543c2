//! Cart API Core - Shared cart domain types.
//!
//! This crate provides the typed domain model used by the cart API:
//! - [`Cart`] - the in-progress order aggregate
//! - [`Address`] - billing and shipping addresses
//! - [`Payment`] - the cart's payment record
//! - [`CartItem`] - a cart line
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP. The
//! collaborators the cart API talks to (cart persistence, region directory,
//! payment method registry, product catalog) are expressed as traits here and
//! implemented elsewhere.
//!
//! # Modules
//!
//! - [`types`] - Domain records, newtype ids, and collaborator traits

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
