use thiserror::Error;
use crate::models::{UserProfile, MatchResult, ScoringWeights, CandidateFilter};
use crate::core::{
    filters::{is_mutual_match, learnable_skills, matches_browse_filter, validate_browse_filter},
    scoring::calculate_match_score,
};

/// Errors raised by the matcher
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result of a filtered, limited ranking
#[derive(Debug)]
pub struct RankedMatches {
    pub matches: Vec<MatchResult>,
    pub total_candidates: usize,
}

/// Skill-exchange matcher
///
/// Stateless apart from its scoring weights; every call is a pure function
/// of its arguments, so one instance can be shared freely across workers.
///
/// # Pipeline Stages
/// 1. Browse filter (optional, exchange-page teach/learn/location)
/// 2. Mutual compatibility filter
/// 3. Scoring
/// 4. Stable descending sort
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Keep the candidates that form a mutual exchange with `requester`
    ///
    /// Input order is preserved. The requester's own record is always
    /// dropped, and a requester missing either skill list gets nothing.
    pub fn filter_candidates<'a>(
        &self,
        requester: &UserProfile,
        candidates: &'a [UserProfile],
    ) -> Vec<&'a UserProfile> {
        candidates
            .iter()
            .filter(|candidate| is_mutual_match(requester, candidate))
            .collect()
    }

    /// Compatibility score of `user_a` with `user_b`
    pub fn score(&self, user_a: &UserProfile, user_b: &UserProfile) -> u32 {
        calculate_match_score(user_a, user_b, &self.weights)
    }

    /// Filter, score and rank candidates for `requester`
    ///
    /// Sorted by descending score. Ties keep their order from `candidates`.
    ///
    /// # Errors
    /// `InvalidArgument` if the requester has no identifier.
    pub fn rank_matches(
        &self,
        requester: &UserProfile,
        candidates: &[UserProfile],
    ) -> Result<Vec<MatchResult>, MatchError> {
        if requester.uid.is_empty() {
            return Err(MatchError::InvalidArgument(
                "requester identifier is required".to_string(),
            ));
        }

        let mut results: Vec<MatchResult> = self
            .filter_candidates(requester, candidates)
            .into_iter()
            .map(|candidate| MatchResult {
                user: candidate.clone(),
                score: self.score(requester, candidate),
                can_learn: learnable_skills(requester, candidate),
                can_teach: learnable_skills(candidate, requester),
            })
            .collect();

        // sort_by is stable: equal scores stay in input order
        results.sort_by(|a, b| b.score.cmp(&a.score));

        Ok(results)
    }

    /// Rank a store-sourced pool after applying the exchange-page filter
    ///
    /// # Arguments
    /// * `requester` - The user asking for matches
    /// * `candidates` - Candidate pool, in store order
    /// * `filter` - Browse filter applied before matching
    /// * `limit` - Maximum number of matches to return
    pub fn find_matches(
        &self,
        requester: &UserProfile,
        candidates: &[UserProfile],
        filter: &CandidateFilter,
        limit: usize,
    ) -> Result<RankedMatches, MatchError> {
        validate_browse_filter(filter)?;

        let total_candidates = candidates.len();

        let pool: Vec<UserProfile> = if filter.is_empty() {
            candidates.to_vec()
        } else {
            candidates
                .iter()
                .filter(|profile| matches_browse_filter(profile, filter))
                .cloned()
                .collect()
        };

        let mut matches = self.rank_matches(requester, &pool)?;
        matches.truncate(limit);

        Ok(RankedMatches {
            matches,
            total_candidates,
        })
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_candidate(uid: &str, teach: &[&str], learn: &[&str]) -> UserProfile {
        UserProfile::new(
            uid,
            teach.iter().map(|s| s.to_string()).collect(),
            learn.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn create_requester() -> UserProfile {
        create_candidate("u1", &["Guitar", "Chess"], &["Spanish", "Cooking"])
    }

    #[test]
    fn test_rank_matches_basic() {
        let matcher = Matcher::with_default_weights();
        let requester = create_requester();

        let candidates = vec![
            create_candidate("u2", &["Spanish"], &["Guitar"]),      // Mutual
            create_candidate("u3", &["Spanish"], &["Painting"]),    // One-sided
            create_candidate("u4", &["Cooking"], &["Chess"]),       // Mutual
            create_candidate("u5", &["Painting"], &["Guitar"]),     // One-sided
        ];

        let result = matcher.rank_matches(&requester, &candidates).unwrap();

        let ids: Vec<&str> = result.iter().map(|m| m.user.uid.as_str()).collect();
        assert_eq!(ids, vec!["u2", "u4"]);
        assert!(result.iter().all(|m| m.score == 20));
    }

    #[test]
    fn test_matches_sorted_by_score() {
        let matcher = Matcher::with_default_weights();
        let requester = create_requester();

        let candidates = vec![
            create_candidate("u2", &["Spanish"], &["Guitar"]),
            create_candidate("u3", &["Spanish", "Cooking"], &["Guitar", "Chess"]),
        ];

        let result = matcher.rank_matches(&requester, &candidates).unwrap();

        assert_eq!(result[0].user.uid, "u3");
        assert_eq!(result[0].score, 40);
        assert_eq!(result[1].score, 20);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let matcher = Matcher::with_default_weights();
        let requester = create_requester();

        let candidates = vec![
            create_candidate("u9", &["Spanish"], &["Chess"]),
            create_candidate("u2", &["Cooking"], &["Guitar"]),
            create_candidate("u5", &["Spanish"], &["Guitar"]),
        ];

        let result = matcher.rank_matches(&requester, &candidates).unwrap();

        let ids: Vec<&str> = result.iter().map(|m| m.user.uid.as_str()).collect();
        assert_eq!(ids, vec!["u9", "u2", "u5"]);
    }

    #[test]
    fn test_match_lists_skill_overlap() {
        let matcher = Matcher::with_default_weights();
        let requester = create_requester();
        let candidates = vec![create_candidate("u2", &["Cooking", "Spanish"], &["Chess"])];

        let result = matcher.rank_matches(&requester, &candidates).unwrap();

        assert_eq!(result[0].can_learn, vec!["Spanish", "Cooking"]);
        assert_eq!(result[0].can_teach, vec!["Chess"]);
    }

    #[test]
    fn test_requester_without_id_rejected() {
        let matcher = Matcher::with_default_weights();
        let requester = create_candidate("", &["Guitar"], &["Spanish"]);

        let err = matcher.rank_matches(&requester, &[]).unwrap_err();
        assert!(matches!(err, MatchError::InvalidArgument(_)));
    }

    #[test]
    fn test_find_matches_applies_filter_and_limit() {
        let matcher = Matcher::with_default_weights();
        let requester = create_requester();

        let candidates = vec![
            create_candidate("u2", &["Spanish"], &["Guitar"]),
            create_candidate("u3", &["Cooking"], &["Chess"]),
            create_candidate("u4", &["Spanish", "Cooking"], &["Chess"]),
        ];

        let filter = CandidateFilter { teach: Some("Spanish".to_string()), ..Default::default() };
        let result = matcher.find_matches(&requester, &candidates, &filter, 1).unwrap();

        assert_eq!(result.total_candidates, 3);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].user.uid, "u4");
    }

    #[test]
    fn test_find_matches_rejects_teach_and_learn_filter() {
        let matcher = Matcher::with_default_weights();
        let filter = CandidateFilter {
            teach: Some("Spanish".to_string()),
            learn: Some("Guitar".to_string()),
            location: None,
        };

        let result = matcher.find_matches(&create_requester(), &[], &filter, 10);
        assert!(result.is_err());
    }
}
