//! Auth provider port - the identity boundary of the booking core.
//!
//! Sign-in flows (email/password, federated redirects, session persistence)
//! live outside this crate. The booking core consumes exactly one thing from
//! them: a stable authenticated-member identity, or none.

use crate::domain::foundation::MemberId;

/// The authenticated caller as seen by the booking core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedMember {
    pub id: MemberId,
    pub email: String,
    pub display_name: Option<String>,
}

impl AuthenticatedMember {
    pub fn new(id: MemberId, email: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            id,
            email: email.into(),
            display_name,
        }
    }
}

/// Exposes the current authenticated member, if any.
///
/// # Contract
///
/// Implementations must return a stable identity for the duration of a
/// signed-in session and `None` when signed out. The booking handlers treat
/// `None` as `NotAuthenticated` without retrying.
pub trait AuthProvider: Send + Sync {
    /// Returns the currently signed-in member, or `None`.
    fn current_user(&self) -> Option<AuthenticatedMember>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_provider_trait_is_object_safe_and_send_sync() {
        fn _assert_trait_object(_: &dyn AuthProvider) {}
        fn _assert_arc_send_sync<T: Send + Sync + ?Sized>() {}
        _assert_arc_send_sync::<std::sync::Arc<dyn AuthProvider>>();
    }

    #[test]
    fn authenticated_member_carries_identity() {
        let member = AuthenticatedMember::new(
            MemberId::new("uid-1").unwrap(),
            "m@example.com",
            Some("M".to_string()),
        );
        assert_eq!(member.id.as_str(), "uid-1");
        assert_eq!(member.email, "m@example.com");
    }
}
