//! Trainer catalog entity.

use serde::Deserialize;

use crate::domain::foundation::TrainerId;
use crate::ports::{Document, StoreError};

/// A trainer members can book. Read-only from the booking core's
/// perspective; used to denormalize reservation display fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Trainer {
    pub id: TrainerId,
    pub name: String,
    pub role: String,
    pub specialties: Vec<String>,
    pub bio: String,
    pub photo_url: String,
    pub active: bool,
}

#[derive(Deserialize)]
struct Persisted {
    name: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    specialties: Vec<String>,
    #[serde(default)]
    bio: String,
    #[serde(default)]
    photo_url: String,
    #[serde(default)]
    active: bool,
}

impl Trainer {
    /// Reconstructs a trainer from its store document.
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let t: Persisted = doc.deserialize()?;
        let id = TrainerId::new(doc.id.clone())
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Self {
            id,
            name: t.name,
            role: t.role,
            specialties: t.specialties,
            bio: t.bio,
            photo_url: t.photo_url,
            active: t.active,
        })
    }
}
