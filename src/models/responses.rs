use serde::{Deserialize, Serialize};
use crate::models::domain::MatchResult;

/// Response for the ranking endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankMatchesResponse {
    pub matches: Vec<MatchResult>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingLinkResponse {
    #[serde(rename = "meetingLink")]
    pub meeting_link: String,
}

/// Where a scheduled session stands relative to now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingStatusResponse {
    pub active: bool,
    #[serde(rename = "showJoinButton")]
    pub show_join_button: bool,
    pub completed: bool,
}
