//! Endpoint usage statistics

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One call to a public endpoint
#[derive(Debug, Clone, Default)]
pub struct UsageRecord {
    pub endpoint: String,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub prompt: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
    pub response_time_ms: i64,
}

/// Aggregated statistics for one endpoint
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EndpointUsage {
    pub endpoint: String,
    pub calls: i64,
    pub successes: i64,
    pub failures: i64,
    pub avg_response_time_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct UsageSummaryResponse {
    pub total_calls: i64,
    pub endpoints: Vec<EndpointUsage>,
}
