//! Read-side profile queries and partial profile edits.

use std::sync::Arc;

use crate::domain::foundation::{MemberId, ValidationError};
use crate::domain::profile::{MemberProfile, ProfileError, PROFILES};
use crate::ports::{DocumentStore, StoreError};

/// Partial profile edit; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
}

impl ProfilePatch {
    fn is_empty(&self) -> bool {
        self.display_name.is_none()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.display_name {
            if name.trim().is_empty() {
                return Err(ValidationError::empty_field("display_name"));
            }
        }
        Ok(())
    }

    fn into_value(self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        if let Some(name) = self.display_name {
            map.insert("display_name".to_string(), name.into());
        }
        serde_json::Value::Object(map)
    }
}

/// Read-side queries over member profiles.
pub struct ProfileQueries {
    store: Arc<dyn DocumentStore>,
}

impl ProfileQueries {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The member's profile, or `None` before first sign-in.
    pub async fn get_profile(
        &self,
        member: &MemberId,
    ) -> Result<Option<MemberProfile>, ProfileError> {
        match self.store.get(PROFILES, member.as_str()).await? {
            Some(doc) => Ok(Some(doc.deserialize()?)),
            None => Ok(None),
        }
    }

    /// Applies a partial edit to the member's profile.
    pub async fn update_profile(
        &self,
        member: &MemberId,
        patch: ProfilePatch,
    ) -> Result<(), ProfileError> {
        if patch.is_empty() {
            return Ok(());
        }
        patch.validate()?;
        match self
            .store
            .update(PROFILES, member.as_str(), patch.into_value())
            .await
        {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound { .. }) => {
                Err(ProfileError::profile_not_found(member.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
