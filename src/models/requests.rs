use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{CandidateFilter, UserProfile};

/// Request to rank a caller-supplied candidate pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankMatchesRequest {
    #[serde(default)]
    pub requester: Option<UserProfile>,
    #[serde(default)]
    pub candidates: Vec<UserProfile>,
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Request to find matches for a stored user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1))]
    pub limit: u16,
    #[serde(default)]
    pub teach: Option<String>,
    #[serde(default)]
    pub learn: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl FindMatchesRequest {
    pub fn filter(&self) -> CandidateFilter {
        CandidateFilter {
            teach: self.teach.clone(),
            learn: self.learn.clone(),
            location: self.location.clone(),
        }
    }
}

fn default_limit() -> u16 {
    20
}
