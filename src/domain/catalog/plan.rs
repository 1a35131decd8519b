//! Plan catalog entity.

use serde::Deserialize;

use crate::domain::foundation::PlanId;
use crate::ports::{Document, StoreError};

/// A purchasable credit plan. Read-mostly, seeded; never mutated by the
/// booking core.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub description: String,
    /// Monetary values are stored as integer cents, never floats.
    pub price_cents: i64,
    pub included_credits: u32,
    pub promotional: bool,
}

#[derive(Deserialize)]
struct Persisted {
    name: String,
    #[serde(default)]
    description: String,
    price_cents: i64,
    included_credits: u32,
    #[serde(default)]
    promotional: bool,
}

impl Plan {
    /// Reconstructs a plan from its store document.
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let p: Persisted = doc.deserialize()?;
        let id =
            PlanId::new(doc.id.clone()).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Self {
            id,
            name: p.name,
            description: p.description,
            price_cents: p.price_cents,
            included_credits: p.included_credits,
            promotional: p.promotional,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plan_parses_from_document() {
        let doc = Document {
            id: "plan-elite".into(),
            version: 1,
            data: json!({
                "name": "Elite Plan",
                "description": "4 monthly sessions",
                "price_cents": 18000,
                "included_credits": 4,
                "promotional": true
            }),
        };
        let plan = Plan::from_document(&doc).unwrap();
        assert_eq!(plan.id.as_str(), "plan-elite");
        assert_eq!(plan.included_credits, 4);
        assert!(plan.promotional);
    }

    #[test]
    fn plan_defaults_optional_fields() {
        let doc = Document {
            id: "plan-basic".into(),
            version: 1,
            data: json!({
                "name": "Basic Plan",
                "price_cents": 5000,
                "included_credits": 1
            }),
        };
        let plan = Plan::from_document(&doc).unwrap();
        assert_eq!(plan.description, "");
        assert!(!plan.promotional);
    }
}
