//! ActivatePlanHandler - puts a member on a plan, replacing their credits.
//!
//! Activation is a replacement, not a top-up: unused credits from the
//! previous plan are discarded and the renewal clock restarts.

use std::sync::Arc;

use crate::config::BookingPolicy;
use crate::domain::catalog::{Plan, PLANS};
use crate::domain::foundation::{MemberId, PlanId, Timestamp};
use crate::domain::profile::{MemberProfile, ProfileError, PROFILES};
use crate::ports::DocumentStore;

/// Handler for plan activation.
pub struct ActivatePlanHandler {
    store: Arc<dyn DocumentStore>,
    policy: BookingPolicy,
}

impl ActivatePlanHandler {
    pub fn new(store: Arc<dyn DocumentStore>, policy: BookingPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn handle(
        &self,
        member: &MemberId,
        plan_id: &PlanId,
    ) -> Result<MemberProfile, ProfileError> {
        // 1. Resolve the plan from the catalog
        let plan_doc = self
            .store
            .get(PLANS, plan_id.as_str())
            .await?
            .ok_or_else(|| ProfileError::plan_not_found(plan_id.clone()))?;
        let plan = Plan::from_document(&plan_doc)?;

        // 2. Transactional credit replacement, retried on commit conflicts
        let mut attempt = 1;
        loop {
            match self.try_activate(member, &plan).await {
                Ok(profile) => return Ok(profile),
                Err(e) if e.is_retryable() && attempt < self.policy.max_txn_retries => {
                    tracing::debug!(
                        member = %member,
                        attempt,
                        error = %e,
                        "plan activation conflicted, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_activate(
        &self,
        member: &MemberId,
        plan: &Plan,
    ) -> Result<MemberProfile, ProfileError> {
        let mut txn = self.store.begin().await?;

        let doc = txn
            .get(PROFILES, member.as_str())
            .await?
            .ok_or_else(|| ProfileError::profile_not_found(member.clone()))?;
        let mut profile: MemberProfile = doc.deserialize()?;

        let renewal_at = Timestamp::now().add_days(self.policy.plan_renewal_days);
        txn.update(
            PROFILES,
            member.as_str(),
            serde_json::json!({
                "active_plan": plan.name,
                "total_credits": plan.included_credits,
                "remaining_credits": plan.included_credits,
                "renewal_at": renewal_at,
            }),
        );
        txn.commit().await?;

        profile.active_plan = Some(plan.name.clone());
        profile.total_credits = plan.included_credits;
        profile.remaining_credits = plan.included_credits;
        profile.renewal_at = Some(renewal_at);
        Ok(profile)
    }
}
