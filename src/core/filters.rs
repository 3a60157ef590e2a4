use crate::core::matcher::MatchError;
use crate::models::{CandidateFilter, UserProfile};

/// Check whether any skill `learner_skills` asks for appears in `teacher_skills`
#[inline]
pub fn teaches_any(learner_skills: &[String], teacher_skills: &[String]) -> bool {
    learner_skills.iter().any(|skill| teacher_skills.contains(skill))
}

/// Skills `learner` wants that `teacher` offers, in the learner's list order
pub fn learnable_skills(learner: &UserProfile, teacher: &UserProfile) -> Vec<String> {
    learner
        .skills_to_learn
        .iter()
        .filter(|skill| teacher.skills_to_teach.contains(skill))
        .cloned()
        .collect()
}

/// Check if two users form a mutually beneficial exchange
///
/// Both directions must hold: the requester can learn something from the
/// candidate, and the candidate can learn something from the requester.
/// A requester without both skill lists never matches anyone.
#[inline]
pub fn is_mutual_match(requester: &UserProfile, candidate: &UserProfile) -> bool {
    if requester.skills_to_teach.is_empty() || requester.skills_to_learn.is_empty() {
        return false;
    }

    if candidate.uid == requester.uid {
        return false;
    }

    teaches_any(&requester.skills_to_learn, &candidate.skills_to_teach)
        && teaches_any(&candidate.skills_to_learn, &requester.skills_to_teach)
}

/// Case-insensitive location equality; absent or empty locations never match
#[inline]
pub fn locations_match(a: &UserProfile, b: &UserProfile) -> bool {
    match (a.location(), b.location()) {
        (Some(left), Some(right)) => left.to_lowercase() == right.to_lowercase(),
        _ => false,
    }
}

/// Reject browse filters that constrain both teach and learn at once
pub fn validate_browse_filter(filter: &CandidateFilter) -> Result<(), MatchError> {
    if filter.teach().is_some() && filter.learn().is_some() {
        return Err(MatchError::InvalidArgument(
            "filter by either teach or learn at a time".to_string(),
        ));
    }
    Ok(())
}

/// Check if a profile passes the exchange-page browse filter
#[inline]
pub fn matches_browse_filter(profile: &UserProfile, filter: &CandidateFilter) -> bool {
    if let Some(teach) = filter.teach() {
        if !profile.skills_to_teach.iter().any(|s| s == teach) {
            return false;
        }
    }

    if let Some(learn) = filter.learn() {
        if !profile.skills_to_learn.iter().any(|s| s == learn) {
            return false;
        }
    }

    if let Some(location) = filter.location() {
        let wanted = location.to_lowercase();
        match profile.location() {
            Some(loc) if loc.to_lowercase().contains(&wanted) => {}
            _ => return false,
        }
    }

    true
}
