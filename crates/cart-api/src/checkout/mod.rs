//! Checkout-side cart logic: the load/save boundary, email reconciliation,
//! region resolution and pre-checkout validation.

pub mod cache;
pub mod reconcile;
pub mod region;
pub mod validator;

pub use cache::{CartCache, save_cart};
pub use reconcile::{Boundary, reconcile_email};
pub use region::resolve_region;
pub use validator::{
    PaymentMethodUnavailable, ValidationGroup, ValidationReport, ensure_payment_method,
    validate_cart,
};
