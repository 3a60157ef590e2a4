use crate::models::{CandidateFilter, UserProfile};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Appwrite API client for the profile collection
///
/// The profile store owns every `UserProfile`; this client only reads
/// snapshots of them:
/// - Fetching a single profile by uid
/// - Listing the candidate pool for a requester
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: AppwriteCollections,
}

/// Collection IDs in Appwrite
#[derive(Debug, Clone)]
pub struct AppwriteCollections {
    pub user_profiles: String,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: AppwriteCollections,
        timeout_secs: u64,
    ) -> Result<Self, AppwriteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
        })
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            self.collections.user_profiles
        )
    }

    /// GET the documents endpoint with the given query strings
    async fn query_documents(&self, queries: &[String]) -> Result<Vec<Value>, AppwriteError> {
        let queries_json = serde_json::to_string(queries)
            .map_err(|e| AppwriteError::InvalidResponse(format!("Failed to encode queries: {}", e)))?;
        let encoded_queries = urlencoding::encode(&queries_json);

        let full_url = format!("{}?queries={}", self.documents_url(), encoded_queries);

        tracing::debug!("Querying profiles: {}", full_url);

        let response = self
            .client
            .get(&full_url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppwriteError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Profile query failed: {} - {}", status, body);
            return Err(AppwriteError::ApiError(format!("Failed to query profiles: {}", status)));
        }

        let json: Value = response.json().await?;

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| AppwriteError::InvalidResponse("Missing documents array".into()))?;

        Ok(documents.clone())
    }

    /// Get a single profile by uid
    pub async fn get_profile(&self, uid: &str) -> Result<UserProfile, AppwriteError> {
        tracing::debug!("Fetching profile for user: {}", uid);

        let queries = vec![equal_query("uid", uid), "limit(1)".to_string()];
        let documents = self.query_documents(&queries).await?;

        let doc = documents
            .first()
            .ok_or_else(|| AppwriteError::NotFound(format!("Profile not found for user {}", uid)))?;

        parse_profile(doc)
            .map_err(|e| AppwriteError::InvalidResponse(format!("Failed to parse profile: {}", e)))
    }

    /// List candidate profiles for a requester
    ///
    /// The requester is excluded at the store. A single teach or learn skill
    /// from the browse filter is pushed down as a `contains` query; the
    /// caller still re-applies the full filter locally.
    pub async fn list_profiles(
        &self,
        exclude_uid: &str,
        filter: &CandidateFilter,
        limit: usize,
    ) -> Result<Vec<UserProfile>, AppwriteError> {
        let mut queries = vec![format!("notEqual(\"uid\", {})", json_array(exclude_uid))];

        if let Some(teach) = filter.teach() {
            queries.push(format!("contains(\"skillsToTeach\", {})", json_array(teach)));
        } else if let Some(learn) = filter.learn() {
            queries.push(format!("contains(\"skillsToLearn\", {})", json_array(learn)));
        }

        queries.push(format!("limit({})", limit));

        let documents = self.query_documents(&queries).await?;
        let total = documents.len();

        let profiles: Vec<UserProfile> = documents
            .iter()
            .filter_map(|doc| match parse_profile(doc) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::debug!("Skipping malformed profile document: {}", e);
                    None
                }
            })
            .filter(|p| p.uid != exclude_uid)
            .collect();

        tracing::debug!("Listed {} candidate profiles ({} documents)", profiles.len(), total);

        Ok(profiles)
    }
}

/// Documents may nest fields under `data`; fall back to the uid in `$id`
fn parse_profile(doc: &Value) -> Result<UserProfile, serde_json::Error> {
    let mut data = doc.get("data").unwrap_or(doc).clone();

    if let Some(obj) = data.as_object_mut() {
        if !obj.contains_key("uid") {
            if let Some(id) = doc.get("$id").cloned() {
                obj.insert("uid".to_string(), id);
            }
        }
    }

    serde_json::from_value(data)
}

fn json_array(value: &str) -> String {
    Value::Array(vec![Value::String(value.to_string())]).to_string()
}

fn equal_query(attribute: &str, value: &str) -> String {
    format!("equal(\"{}\", {})", attribute, json_array(value))
}
