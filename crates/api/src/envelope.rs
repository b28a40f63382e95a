// ABOUTME: JSON response envelope shared by every route.
// ABOUTME: Carries success, optional data/pagination/error/details, and a generation timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page metadata for list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

/// `{ success, data?, pagination?, error?, details?, timestamp }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            pagination: None,
            error: None,
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn page(data: T, pagination: Pagination) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::ok(data)
        }
    }

    /// A failure with a stable, user-facing `error` and an optional raw cause.
    pub fn failure(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            pagination: None,
            error: Some(error.into()),
            details,
            timestamp: Utc::now(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_omits_data_and_pagination() {
        let envelope: Envelope<()> =
            Envelope::failure("Failed to fetch episodes", Some("HTTP 404: Not Found".into()));
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["success"], json!(false));
        assert_eq!(value["error"], json!("Failed to fetch episodes"));
        assert_eq!(value["details"], json!("HTTP 404: Not Found"));
        assert!(value.get("data").is_none());
        assert!(value.get("pagination").is_none());
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn page_serializes_camel_case_pagination() {
        let pagination = Pagination {
            total: 3,
            limit: 2,
            offset: 0,
            has_more: true,
        };
        let value = serde_json::to_value(Envelope::page(vec![1, 2], pagination)).unwrap();

        assert_eq!(value["success"], json!(true));
        assert_eq!(value["data"], json!([1, 2]));
        assert_eq!(
            value["pagination"],
            json!({"total": 3, "limit": 2, "offset": 0, "hasMore": true})
        );
        assert!(value.get("error").is_none());
    }
}
