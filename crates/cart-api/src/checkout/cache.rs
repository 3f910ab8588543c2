//! Per-dispatch cart cache and the load/save boundary.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use cart_api_core::{Cart, CartRepository, CartServiceError, SessionKey};

use super::reconcile::{Boundary, reconcile_email};
use crate::resource::hooks::{HookPoint, Hooks};

/// Carts loaded during one unit of request processing, keyed by session.
///
/// Owned by the caller of the resource layer and dropped when the request
/// completes.
#[derive(Debug, Default)]
pub struct CartCache {
    carts: HashMap<SessionKey, Cart>,
}

impl CartCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }

    /// The session's cart, loading it on first use.
    ///
    /// `force_reload` bypasses the cached copy and replaces it.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart store cannot be read.
    pub fn load(
        &mut self,
        session: &SessionKey,
        force_reload: bool,
        repository: &dyn CartRepository,
        hooks: &Hooks,
    ) -> Result<&mut Cart, CartServiceError> {
        match self.carts.entry(*session) {
            Entry::Occupied(entry) if !force_reload => Ok(entry.into_mut()),
            entry => {
                let mut cart = repository.load(session)?;
                hooks.cart(HookPoint::CartLoadBefore, &mut cart);
                reconcile_email(&mut cart, Boundary::Load);
                hooks.cart(HookPoint::CartLoadAfter, &mut cart);

                tracing::debug!(cart_id = ?cart.id, items = cart.items.len(), "cart loaded");

                Ok(match entry {
                    Entry::Occupied(mut occupied) => {
                        occupied.insert(cart);
                        occupied.into_mut()
                    }
                    Entry::Vacant(vacant) => vacant.insert(cart),
                })
            }
        }
    }
}

/// Run the save boundary for a cart.
///
/// # Errors
///
/// Returns an error if the cart store rejects the save.
pub fn save_cart(
    session: &SessionKey,
    cart: &mut Cart,
    repository: &dyn CartRepository,
    hooks: &Hooks,
) -> Result<(), CartServiceError> {
    hooks.cart(HookPoint::CartSaveBefore, cart);
    reconcile_email(cart, Boundary::Save);
    cart.shipping_address.collect_shipping_rates = true;
    repository.save(session, cart)?;
    hooks.cart(HookPoint::CartSaveAfter, cart);

    tracing::info!(
        cart_id = ?cart.id,
        grand_total = %cart.totals.grand_total.amount,
        "cart saved"
    );
    Ok(())
}
