use crate::models::{UserProfile, ScoringWeights};
use crate::core::filters::locations_match;

/// Calculate the compatibility score between two users
///
/// Scoring formula:
/// score = (
///     skill_points * |a.learn ∩ b.teach| +   # a learns from b
///     skill_points * |b.learn ∩ a.teach| +   # b learns from a
///     location_bonus if same location        # case-insensitive, once
/// )
///
/// Each direction is counted over the learner's list, so a skill listed
/// twice counts twice. The score has no upper bound.
pub fn calculate_match_score(
    user_a: &UserProfile,
    user_b: &UserProfile,
    weights: &ScoringWeights,
) -> u32 {
    let a_learns = count_learnable(&user_a.skills_to_learn, &user_b.skills_to_teach);
    let b_learns = count_learnable(&user_b.skills_to_learn, &user_a.skills_to_teach);

    let skill_score = (a_learns + b_learns).saturating_mul(weights.skill_points);

    let location_score = if locations_match(user_a, user_b) {
        weights.location_bonus
    } else {
        0
    };

    skill_score.saturating_add(location_score)
}

#[inline]
fn count_learnable(learn: &[String], teach: &[String]) -> u32 {
    learn.iter().filter(|skill| teach.contains(skill)).count() as u32
}
