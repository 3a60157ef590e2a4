use serde::{Deserialize, Deserializer, Serialize};

/// User profile as stored in the profile collection
///
/// Skill lists are compared by exact, case-sensitive equality. Missing or null
/// lists deserialize as empty so a half-filled profile never fails to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(rename = "skillsToTeach", default, deserialize_with = "null_as_empty")]
    pub skills_to_teach: Vec<String>,
    #[serde(rename = "skillsToLearn", default, deserialize_with = "null_as_empty")]
    pub skills_to_learn: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl UserProfile {
    /// Minimal profile with only an identifier and skill lists
    pub fn new(
        uid: impl Into<String>,
        skills_to_teach: Vec<String>,
        skills_to_learn: Vec<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            skills_to_teach,
            skills_to_learn,
            location: None,
            photo_url: None,
            bio: None,
        }
    }

    /// Location if present and non-empty
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref().filter(|l| !l.is_empty())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A compatible candidate with its compatibility score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub user: UserProfile,
    pub score: u32,
    /// Requester learn-skills this candidate teaches
    #[serde(rename = "canLearn")]
    pub can_learn: Vec<String>,
    /// Candidate learn-skills the requester teaches
    #[serde(rename = "canTeach")]
    pub can_teach: Vec<String>,
}

/// Points awarded by the compatibility score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWeights {
    /// Per overlapping skill, counted in each direction
    pub skill_points: u32,
    /// Flat bonus when both locations match
    pub location_bonus: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skill_points: 10,
            location_bonus: 5,
        }
    }
}

/// Browse filter from the exchange page ("I can teach", "I want to learn", location)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFilter {
    #[serde(default)]
    pub teach: Option<String>,
    #[serde(default)]
    pub learn: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl CandidateFilter {
    pub fn teach(&self) -> Option<&str> {
        non_blank(&self.teach)
    }

    pub fn learn(&self) -> Option<&str> {
        non_blank(&self.learn)
    }

    pub fn location(&self) -> Option<&str> {
        non_blank(&self.location)
    }

    pub fn is_empty(&self) -> bool {
        self.teach().is_none() && self.learn().is_none() && self.location().is_none()
    }

    /// Stable key used for cache entries
    pub fn fingerprint(&self) -> String {
        format!(
            "t={}|l={}|loc={}",
            self.teach().unwrap_or(""),
            self.learn().unwrap_or(""),
            self.location().map(str::to_lowercase).unwrap_or_default()
        )
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Scheduled exchange session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSchedule {
    pub date: chrono::NaiveDate,
    pub time: chrono::NaiveTime,
    #[serde(rename = "durationMinutes")]
    pub duration_minutes: u32,
}
