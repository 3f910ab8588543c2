//! Cart email / billing email convergence.
//!
//! The cart's customer email and the billing address email are two copies of
//! the same fact. They are brought back in line whenever the cart crosses a
//! load or save boundary.

use cart_api_core::Cart;

/// Which boundary the cart is crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Load,
    Save,
}

/// Converge the cart email and the billing address email.
///
/// - Only the cart has an email: copy it to the billing address.
/// - Only the billing address has one: copy it to the cart.
/// - Both present and different: on load the cart takes the billing
///   address's email; on save the billing address takes the cart's email.
///
/// NOTE: the load/save precedence asymmetry is existing behavior that the
/// store owners have not confirmed; keep it until they do.
pub fn reconcile_email(cart: &mut Cart, boundary: Boundary) {
    let cart_email = cart.customer_email.clone();
    let billing_email = cart.billing_address.email.clone();

    match (cart_email, billing_email) {
        (Some(email), None) => cart.billing_address.email = Some(email),
        (None, Some(email)) => cart.customer_email = Some(email),
        (Some(cart_email), Some(billing_email)) if cart_email != billing_email => match boundary {
            Boundary::Load => cart.customer_email = Some(billing_email),
            Boundary::Save => cart.billing_address.email = Some(cart_email),
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use cart_api_core::CurrencyCode;

    use super::*;

    fn cart(cart_email: Option<&str>, billing_email: Option<&str>) -> Cart {
        let mut cart = Cart::new(CurrencyCode::USD);
        cart.customer_email = cart_email.map(str::to_string);
        cart.billing_address.email = billing_email.map(str::to_string);
        cart
    }

    fn emails(cart: &Cart) -> (Option<&str>, Option<&str>) {
        (
            cart.customer_email.as_deref(),
            cart.billing_address.email.as_deref(),
        )
    }

    #[test]
    fn test_cart_email_fills_billing() {
        for boundary in [Boundary::Load, Boundary::Save] {
            let mut cart = cart(Some("cart@example.com"), None);
            reconcile_email(&mut cart, boundary);
            assert_eq!(emails(&cart), (Some("cart@example.com"), Some("cart@example.com")));
        }
    }

    #[test]
    fn test_billing_email_fills_cart() {
        for boundary in [Boundary::Load, Boundary::Save] {
            let mut cart = cart(None, Some("billing@example.com"));
            reconcile_email(&mut cart, boundary);
            assert_eq!(
                emails(&cart),
                (Some("billing@example.com"), Some("billing@example.com"))
            );
        }
    }

    #[test]
    fn test_conflict_on_load_takes_billing_email() {
        let mut cart = cart(Some("cart@example.com"), Some("billing@example.com"));
        reconcile_email(&mut cart, Boundary::Load);
        assert_eq!(
            emails(&cart),
            (Some("billing@example.com"), Some("billing@example.com"))
        );
    }

    #[test]
    fn test_conflict_on_save_takes_cart_email() {
        let mut cart = cart(Some("cart@example.com"), Some("billing@example.com"));
        reconcile_email(&mut cart, Boundary::Save);
        assert_eq!(emails(&cart), (Some("cart@example.com"), Some("cart@example.com")));
    }

    #[test]
    fn test_no_emails_is_a_no_op() {
        let mut cart = cart(None, None);
        reconcile_email(&mut cart, Boundary::Save);
        assert_eq!(emails(&cart), (None, None));
    }

    #[test]
    fn test_load_reconciliation_is_idempotent() {
        let cases = [
            (Some("a@example.com"), None),
            (None, Some("b@example.com")),
            (Some("a@example.com"), Some("b@example.com")),
            (Some("a@example.com"), Some("a@example.com")),
            (None, None),
        ];

        for (cart_email, billing_email) in cases {
            let mut once = cart(cart_email, billing_email);
            reconcile_email(&mut once, Boundary::Load);
            let mut twice = once.clone();
            reconcile_email(&mut twice, Boundary::Load);
            assert_eq!(emails(&once), emails(&twice));
        }
    }
}
