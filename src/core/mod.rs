// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod meeting;
pub mod scoring;

pub use filters::{is_mutual_match, learnable_skills, locations_match, matches_browse_filter, validate_browse_filter};
pub use matcher::{Matcher, MatchError, RankedMatches};
pub use meeting::{generate_meeting_link, is_meeting_active, should_show_join_button, is_session_completed, DEFAULT_MEETING_BASE_URL};
pub use scoring::calculate_match_score;
