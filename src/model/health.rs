use serde::{Deserialize, Serialize};

/// Body returned by `/health` when the store is unreachable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    #[serde(rename = "dbError")]
    pub db_error: String,
}
