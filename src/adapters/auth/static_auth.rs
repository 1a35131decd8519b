//! Static auth provider: holds the current member in process memory.
//!
//! Real sign-in flows live outside this crate; tooling and tests set the
//! identity explicitly.

use std::sync::RwLock;

use crate::ports::{AuthenticatedMember, AuthProvider};

/// Auth provider backed by an in-process slot.
pub struct StaticAuthProvider {
    current: RwLock<Option<AuthenticatedMember>>,
}

impl StaticAuthProvider {
    /// Starts signed out.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Starts signed in as the given member.
    pub fn signed_in(member: AuthenticatedMember) -> Self {
        Self {
            current: RwLock::new(Some(member)),
        }
    }

    pub fn sign_in(&self, member: AuthenticatedMember) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(member);
    }

    pub fn sign_out(&self) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl Default for StaticAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthProvider for StaticAuthProvider {
    fn current_user(&self) -> Option<AuthenticatedMember> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
