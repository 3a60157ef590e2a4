//! SkillSwap Match - skill-exchange matching service for the SkillSwap app
//!
//! Finds users who can both teach the requester something and learn
//! something from them, and ranks those pairs by a compatibility score.
//! The core matcher is pure; the service layer reads profiles from the
//! hosted profile store and exposes the matcher over HTTP.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Matcher, MatchError, calculate_match_score, generate_meeting_link};
pub use models::{UserProfile, MatchResult, ScoringWeights, CandidateFilter, SessionSchedule, RankMatchesRequest, RankMatchesResponse};
pub use services::{ProfileFeed, MatchSubscription};
