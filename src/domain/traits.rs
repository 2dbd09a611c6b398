use crate::domain::error::RinthError;
use crate::domain::model::{Outcome, PayoutHistory, Project, User};
use async_trait::async_trait;
use serde_json::Value;

/// Read side of the API the analytics view depends on.
///
/// `ApiClient` is the production implementation; tests substitute canned data.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    /// Profile of the token owner, with private payout data.
    async fn current_user(&self) -> Result<User, RinthError>;

    /// Public profile by id, with the status the server answered.
    async fn user_by_id(&self, user_id: &str) -> Result<Outcome<User>, RinthError>;

    async fn user_projects(&self, user_id: &str) -> Result<Vec<Project>, RinthError>;

    /// Raw v3 balance snapshot.
    async fn payout_balance(&self) -> Result<Outcome<Value>, RinthError>;

    async fn payout_history(&self, user_id: &str) -> Result<Outcome<PayoutHistory>, RinthError>;
}
