//! Loading and saving the cart from the visitor's session.

use tower_sessions::Session;

use super::store::CartStore;
use crate::models::session_keys;

/// Load the visitor's cart.
///
/// A missing cart is empty. A stored cart that no longer deserializes is
/// logged and replaced with an empty one rather than failing the request.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load_cart(session: &Session) -> Result<CartStore, tower_sessions::session::Error> {
    match session.get::<CartStore>(session_keys::CART).await {
        Ok(cart) => Ok(cart.unwrap_or_default()),
        Err(tower_sessions::session::Error::SerdeJson(e)) => {
            tracing::warn!(error = %e, "Discarding unreadable session cart");
            Ok(CartStore::default())
        }
        Err(e) => Err(e),
    }
}

/// Save the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn save_cart(
    session: &Session,
    cart: &CartStore,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;
    use crate::cart::store::tests::product;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_load_missing_cart_is_empty() {
        let session = session();
        assert!(load_cart(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let session = session();
        let mut cart = CartStore::new();
        cart.add_item(&product("1", 1000), 2, None);
        save_cart(&session, &cart).await.unwrap();
        assert_eq!(load_cart(&session).await.unwrap(), cart);
    }

    #[tokio::test]
    async fn test_corrupt_cart_is_discarded() {
        let session = session();
        session
            .insert(session_keys::CART, "not a cart")
            .await
            .unwrap();
        assert!(load_cart(&session).await.unwrap().is_empty());
    }
}
