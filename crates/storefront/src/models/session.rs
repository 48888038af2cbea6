//! Session-related types.
//!
//! Types stored in the session for identity and cart state.

use serde::{Deserialize, Serialize};

use shophub_core::{Email, UserId, UserRole};

/// Session-stored user identity.
///
/// Written by the credential service on login. The storefront never issues
/// it; it only reads it to attribute orders and gate admin operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's ID in the credential service.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Capability level.
    #[serde(default)]
    pub role: UserRole,
}

impl CurrentUser {
    /// Whether the user holds the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Proof that the current request is made by an admin.
///
/// Only obtainable from a session user whose role is admin, so every
/// privileged operation that takes one has had the role checked on the
/// server for this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminCapability {
    admin_id: UserId,
}

impl AdminCapability {
    /// Check `user`'s role and issue a capability if it is admin.
    #[must_use]
    pub const fn verify(user: &CurrentUser) -> Option<Self> {
        if user.is_admin() {
            Some(Self { admin_id: user.id })
        } else {
            None
        }
    }

    /// The admin acting.
    #[must_use]
    pub const fn admin_id(&self) -> UserId {
        self.admin_id
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the serialized cart, wishlist and applied coupon.
    pub const CART: &str = "cart";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: UserId::new(11),
            email: Email::parse("staff@example.com").unwrap(),
            role,
        }
    }

    #[test]
    fn test_admin_capability_requires_admin_role() {
        assert!(AdminCapability::verify(&user(UserRole::User)).is_none());
        let cap = AdminCapability::verify(&user(UserRole::Admin)).unwrap();
        assert_eq!(cap.admin_id(), UserId::new(11));
    }

    #[test]
    fn test_role_defaults_to_user() {
        let json = r#"{"id": 3, "email": "a@example.com"}"#;
        let user: CurrentUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, UserRole::User);
    }
}
