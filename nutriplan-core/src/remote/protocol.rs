//! Wire types of the `/plans` endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{lenient, WeeklyPlan};

/// Body of `POST /plans`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavePlanRequest {
    pub user_id: String,
    pub plan_data: WeeklyPlan,
}

/// A user's stored plan, as returned by `GET /plans?user_id=...`.
///
/// The endpoint answers `null` when the user has never saved a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRecord {
    pub user_id: String,
    /// Older records may lack a plan; those count as absent.
    #[serde(default)]
    pub plan_data: Option<WeeklyPlan>,
    /// Unreadable timestamps are dropped rather than failing the record.
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of a successful `POST /plans`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavePlanResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_plan_data() {
        let record: PlanRecord = serde_json::from_str(r#"{"user_id": "u1"}"#).unwrap();
        assert!(record.plan_data.is_none());
        assert!(record.updated_at.is_none());
    }

    #[test]
    fn test_record_with_naive_timestamp_and_extra_columns() {
        let json = r#"{
            "id": 3,
            "user_id": "u1",
            "plan_data": {"Monday": {"breakfast": {"id": 7, "name": "Oats", "calories": 300}}},
            "updated_at": "2025-01-02T10:11:12.123456"
        }"#;
        let record: Option<PlanRecord> = serde_json::from_str(json).unwrap();
        let record = record.unwrap();

        let plan = record.plan_data.unwrap();
        let oats = plan.get("Monday-breakfast".parse().unwrap()).unwrap();
        assert_eq!(oats.name, "Oats");
        assert_eq!(
            record.updated_at.unwrap().to_rfc3339(),
            "2025-01-02T10:11:12.123456+00:00"
        );
    }

    #[test]
    fn test_record_with_unreadable_timestamp() {
        let json = r#"{"user_id": "u1", "plan_data": {}, "updated_at": "yesterday"}"#;
        let record: PlanRecord = serde_json::from_str(json).unwrap();
        assert!(record.plan_data.is_some());
        assert!(record.updated_at.is_none());

        let json = r#"{"user_id": "u1", "updated_at": 1735812672}"#;
        let record: PlanRecord = serde_json::from_str(json).unwrap();
        assert!(record.updated_at.is_none());
    }

    #[test]
    fn test_record_with_rfc3339_timestamp() {
        let json = r#"{"user_id": "u1", "updated_at": "2025-01-02T10:11:12+02:00"}"#;
        let record: PlanRecord = serde_json::from_str(json).unwrap();
        assert_eq!(
            record.updated_at.unwrap().to_rfc3339(),
            "2025-01-02T08:11:12+00:00"
        );
    }

    #[test]
    fn test_null_record() {
        let record: Option<PlanRecord> = serde_json::from_str("null").unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn test_save_request_shape() {
        let request = SavePlanRequest {
            user_id: "u1".to_string(),
            plan_data: WeeklyPlan::new(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["plan_data"].as_object().unwrap().len(), 7);
    }
}
