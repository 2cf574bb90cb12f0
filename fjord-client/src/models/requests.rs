// API request models
// Wire shapes for `/api/v1/feedback/` and `/api/v1/analytics/triggerrule/match/`.

use serde::{Deserialize, Serialize};

// =========================
// Feedback
// =========================

/// Body of one feedback submission. Built by the form at submit time and never mutated after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackPayload {
    pub happy: bool,
    pub description: String,
    pub product: String,
    pub platform: String,
    pub locale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    pub url: String,
    pub user_agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
}

// =========================
// Trigger rules
// =========================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlExists {
    #[default]
    Unknown,
    Yes,
    No,
}

impl UrlExists {
    pub fn as_filter(&self) -> Option<bool> {
        match self {
            UrlExists::Unknown => None,
            UrlExists::Yes => Some(true),
            UrlExists::No => Some(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRuleMatchRequest {
    pub locales: Vec<String>,
    pub products: Vec<String>,
    pub versions: Vec<String>,
    pub keywords: Vec<String>,
    pub url_exists: Option<bool>,
}
