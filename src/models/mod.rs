// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{UserProfile, MatchResult, ScoringWeights, CandidateFilter, SessionSchedule};
pub use requests::{RankMatchesRequest, FindMatchesRequest};
pub use responses::{RankMatchesResponse, HealthResponse, ErrorResponse, MeetingLinkResponse, MeetingStatusResponse};
