//! Profile and plan-activation error types.

use crate::domain::foundation::{ErrorCode, MemberId, PlanId, ValidationError};
use crate::ports::StoreError;

/// Failures of profile maintenance and plan activation.
#[derive(Debug)]
pub enum ProfileError {
    /// No profile document exists for the member.
    ProfileNotFound(MemberId),

    /// No plan exists under this id in the catalog.
    PlanNotFound(PlanId),

    /// A field failed value-object validation.
    Validation(ValidationError),

    /// Infrastructure failure from the document store.
    Store(StoreError),
}

impl ProfileError {
    pub fn profile_not_found(member: MemberId) -> Self {
        ProfileError::ProfileNotFound(member)
    }

    pub fn plan_not_found(plan: PlanId) -> Self {
        ProfileError::PlanNotFound(plan)
    }

    /// Returns the reason code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ProfileError::ProfileNotFound(_) => ErrorCode::ProfileNotFound,
            ProfileError::PlanNotFound(_) => ErrorCode::PlanNotFound,
            ProfileError::Validation(_) => ErrorCode::ValidationFailed,
            ProfileError::Store(e) => match e {
                StoreError::Conflict => ErrorCode::StoreConflict,
                StoreError::PermissionDenied(_) => ErrorCode::PermissionDenied,
                StoreError::Unavailable(_) => ErrorCode::StoreUnavailable,
                StoreError::NotFound { .. } | StoreError::Serialization(_) => {
                    ErrorCode::InternalError
                }
            },
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            ProfileError::ProfileNotFound(member) => {
                format!("No profile found for member {}", member)
            }
            ProfileError::PlanNotFound(plan) => format!("Plan {} not found", plan),
            ProfileError::Validation(e) => e.to_string(),
            ProfileError::Store(e) => format!("Store error: {}", e),
        }
    }

    /// Whether retrying the same request may succeed without new input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProfileError::Store(e) if e.is_retryable())
    }
}

impl std::fmt::Display for ProfileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for ProfileError {}

impl From<StoreError> for ProfileError {
    fn from(err: StoreError) -> Self {
        ProfileError::Store(err)
    }
}

impl From<ValidationError> for ProfileError {
    fn from(err: ValidationError) -> Self {
        ProfileError::Validation(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_not_found_carries_code() {
        let err = ProfileError::plan_not_found(PlanId::new("plan-x").unwrap());
        assert_eq!(err.code(), ErrorCode::PlanNotFound);
        assert!(err.message().contains("plan-x"));
    }

    #[test]
    fn lookup_failures_are_not_retryable() {
        assert!(!ProfileError::profile_not_found(MemberId::new("m1").unwrap()).is_retryable());
        assert!(!ProfileError::plan_not_found(PlanId::new("p1").unwrap()).is_retryable());
    }

    #[test]
    fn store_conflict_is_retryable() {
        assert!(ProfileError::Store(StoreError::Conflict).is_retryable());
    }
}
