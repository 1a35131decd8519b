//! SyncProfileHandler - keeps the profile document in step with auth state.
//!
//! Runs on every sign-in: creates the profile on first authentication,
//! otherwise refreshes `last_seen_at`. Idempotent; concurrent sign-ins from
//! two devices converge on the same document.

use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::profile::{MemberProfile, ProfileError, PROFILES};
use crate::ports::{AuthenticatedMember, DocumentStore};

/// Handler for profile creation and sign-in upkeep.
pub struct SyncProfileHandler {
    store: Arc<dyn DocumentStore>,
}

impl SyncProfileHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, member: &AuthenticatedMember) -> Result<MemberProfile, ProfileError> {
        match self.store.get(PROFILES, member.id.as_str()).await? {
            Some(doc) => {
                // Existing member: only the visit timestamp moves. Plan,
                // credits, and role are never touched here.
                let mut profile: MemberProfile = doc.deserialize()?;
                let now = Timestamp::now();
                self.store
                    .update(
                        PROFILES,
                        member.id.as_str(),
                        serde_json::json!({"last_seen_at": now}),
                    )
                    .await?;
                profile.last_seen_at = now;
                Ok(profile)
            }
            None => {
                let profile = MemberProfile::register(
                    member.id.clone(),
                    member.email.clone(),
                    member.display_name.clone(),
                );
                tracing::info!(member = %member.id, "registering new member profile");
                self.store
                    .put(PROFILES, member.id.as_str(), profile.clone().into_value()?)
                    .await?;
                Ok(profile)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryDocumentStore;
    use crate::domain::foundation::MemberId;
    use serde_json::json;

    fn member() -> AuthenticatedMember {
        AuthenticatedMember::new(
            MemberId::new("uid-1").unwrap(),
            "marta@example.com",
            Some("Marta".to_string()),
        )
    }

    #[tokio::test]
    async fn first_sign_in_creates_profile_with_defaults() {
        let store = Arc::new(MemoryDocumentStore::new());
        let handler = SyncProfileHandler::new(store.clone());

        let profile = handler.handle(&member()).await.unwrap();
        assert_eq!(profile.email, "marta@example.com");
        assert_eq!(profile.display_name, "Marta");
        assert_eq!(profile.remaining_credits, 0);
        assert_eq!(profile.active_plan, None);

        let doc = store.get(PROFILES, "uid-1").await.unwrap().unwrap();
        assert_eq!(doc.data["email"], json!("marta@example.com"));
    }

    #[tokio::test]
    async fn later_sign_ins_keep_plan_and_credits() {
        let store = Arc::new(MemoryDocumentStore::new());
        let handler = SyncProfileHandler::new(store.clone());

        handler.handle(&member()).await.unwrap();
        store
            .update(
                PROFILES,
                "uid-1",
                json!({"active_plan": "Elite Plan", "total_credits": 4, "remaining_credits": 3}),
            )
            .await
            .unwrap();

        let profile = handler.handle(&member()).await.unwrap();
        assert_eq!(profile.active_plan.as_deref(), Some("Elite Plan"));
        assert_eq!(profile.remaining_credits, 3);
    }

    #[tokio::test]
    async fn sign_in_advances_last_seen_only() {
        let store = Arc::new(MemoryDocumentStore::new());
        let handler = SyncProfileHandler::new(store.clone());

        let first = handler.handle(&member()).await.unwrap();
        let second = handler.handle(&member()).await.unwrap();
        assert!(!second.last_seen_at.is_before(&first.last_seen_at));
        assert_eq!(second.registered_at, first.registered_at);
        assert_eq!(store.count(PROFILES).await, 1);
    }
}
