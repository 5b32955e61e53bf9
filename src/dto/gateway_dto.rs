use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct McqRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub disease: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqResponse {
    pub mcq: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExplainRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub disease: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub mcq: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub explanation: String,
}

/// Failure body shared by both gateway endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}
