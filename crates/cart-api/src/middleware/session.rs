//! Session middleware configuration.
//!
//! Each browser session owns one cart. The session record holds a
//! [`SessionKey`] that the cart store is keyed by; it is created on the
//! first request that needs it.

use cart_api_core::SessionKey;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::config::ApiConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cart_api_session";

/// Session record key holding the cart's session key.
const CART_SESSION_KEY: &str = "cart_session_key";

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &ApiConfig) -> SessionManagerLayer<MemoryStore> {
    let expiry = i64::try_from(config.session_expiry.as_secs()).unwrap_or(i64::MAX);

    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(expiry),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// The session's cart key, generated and stored on first use.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn session_key(session: &Session) -> Result<SessionKey, tower_sessions::session::Error> {
    if let Some(key) = session.get::<SessionKey>(CART_SESSION_KEY).await? {
        return Ok(key);
    }

    let key = SessionKey::generate();
    session.insert(CART_SESSION_KEY, key).await?;
    tracing::debug!(session_key = %key, "new cart session");
    Ok(key)
}
