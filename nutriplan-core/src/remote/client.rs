//! HTTP client for the remote plan store.
//!
//! The remote copy is the multi-device one, addressed by user id. There is
//! no concurrency control: the server keeps whichever save arrives last.

use std::time::Duration;

use async_trait::async_trait;

use super::error::RemoteError;
use super::protocol::{PlanRecord, SavePlanRequest};
use crate::models::WeeklyPlan;

/// Default timeout for plan requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for the reachability probe.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

/// A store holding each user's authoritative plan.
#[async_trait]
pub trait RemotePlanStore: Send + Sync {
    /// Returns the user's plan, or `None` if they have never saved one.
    async fn fetch_plan(&self, user_id: &str) -> Result<Option<WeeklyPlan>, RemoteError>;

    /// Replaces the user's plan.
    async fn save_plan(&self, user_id: &str, plan: &WeeklyPlan) -> Result<(), RemoteError>;
}

/// [`RemotePlanStore`] over the `/plans` HTTP endpoints.
#[derive(Debug, Clone)]
pub struct HttpPlanClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpPlanClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl RemotePlanStore for HttpPlanClient {
    async fn fetch_plan(&self, user_id: &str) -> Result<Option<WeeklyPlan>, RemoteError> {
        if user_id.is_empty() {
            return Err(RemoteError::MissingUserId);
        }

        let response = self
            .http
            .get(self.url("/plans"))
            .query(&[("user_id", user_id)])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RemoteError::Status(status));
        }

        let body = response.bytes().await?;
        let record: Option<PlanRecord> = serde_json::from_slice(&body)?;
        Ok(record.and_then(|r| r.plan_data))
    }

    async fn save_plan(&self, user_id: &str, plan: &WeeklyPlan) -> Result<(), RemoteError> {
        if user_id.is_empty() {
            return Err(RemoteError::MissingUserId);
        }

        let request = SavePlanRequest {
            user_id: user_id.to_string(),
            plan_data: plan.clone(),
        };
        let response = self
            .http
            .post(self.url("/plans"))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status()));
        }
        Ok(())
    }
}

/// Returns true if the plan store at `base_url` answers its health check.
pub async fn check_server(base_url: &str) -> bool {
    let url = format!("{}/health", base_url.trim_end_matches('/'));
    let client = match reqwest::Client::builder().timeout(HEALTH_TIMEOUT).build() {
        Ok(client) => client,
        Err(_) => return false,
    };
    match client.get(&url).send().await {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}
