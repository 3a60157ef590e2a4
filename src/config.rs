use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub appwrite: AppwriteSettings,
    pub collection: CollectionSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub meeting: MeetingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    pub user_profiles: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// Redis L2 tier; the service runs L1-only when unset or unreachable
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            max_limit: default_max_limit(),
            pool_size: default_pool_size(),
        }
    }
}

fn default_max_limit() -> u16 { 100 }
fn default_pool_size() -> usize { 500 }

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default = "default_skill_points")]
    pub skill_points: u32,
    #[serde(default = "default_location_bonus")]
    pub location_bonus: u32,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            skill_points: default_skill_points(),
            location_bonus: default_location_bonus(),
        }
    }
}

fn default_skill_points() -> u32 { 10 }
fn default_location_bonus() -> u32 { 5 }

#[derive(Debug, Clone, Deserialize)]
pub struct MeetingSettings {
    #[serde(default = "default_meeting_base_url")]
    pub base_url: String,
}

impl Default for MeetingSettings {
    fn default() -> Self {
        Self {
            base_url: default_meeting_base_url(),
        }
    }
}

fn default_meeting_base_url() -> String { crate::core::DEFAULT_MEETING_BASE_URL.to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SKILLSWAP__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SKILLSWAP__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("SKILLSWAP")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the conventional unprefixed variables on top of the layered config
///
/// `APPWRITE_*` and `REDIS_URL` are what the hosting platform injects.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("APPWRITE_ENDPOINT", "appwrite.endpoint"),
        ("APPWRITE_API_KEY", "appwrite.api_key"),
        ("APPWRITE_PROJECT_ID", "appwrite.project_id"),
        ("APPWRITE_DATABASE_ID", "appwrite.database_id"),
        ("REDIS_URL", "cache.redis_url"),
    ];

    let mut builder = Config::builder().add_source(settings);

    for (var, key) in overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [server]
        host = "0.0.0.0"
        port = 8080

        [appwrite]
        endpoint = "https://cloud.appwrite.io/v1"
        api_key = "key"
        project_id = "project"
        database_id = "skillswap"

        [collection]
        user_profiles = "users"
    "#;

    #[test]
    fn test_default_scoring() {
        let scoring = ScoringSettings::default();
        assert_eq!(scoring.skill_points, 10);
        assert_eq!(scoring.location_bonus, 5);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_minimal_file_fills_defaults() {
        let settings: Settings = toml::from_str(MINIMAL).unwrap();

        assert_eq!(settings.server.port, 8080);
        assert!(settings.cache.redis_url.is_none());
        assert_eq!(settings.matching.max_limit, 100);
        assert_eq!(settings.matching.pool_size, 500);
        assert_eq!(settings.meeting.base_url, "https://meet.jit.si");
    }

    #[test]
    fn test_scoring_overrides() {
        let file = format!("{}\n[scoring]\nlocation_bonus = 0\n", MINIMAL);
        let settings: Settings = toml::from_str(&file).unwrap();

        assert_eq!(settings.scoring.skill_points, 10);
        assert_eq!(settings.scoring.location_bonus, 0);
    }

    #[test]
    fn test_shipped_default_config_parses() {
        let settings = Settings::load_from(concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml"))
            .unwrap();

        assert_eq!(settings.collection.user_profiles, "users");
    }

    #[test]
    fn test_load_from_applies_platform_variables() {
        std::env::set_var("APPWRITE_DATABASE_ID", "platform_db");
        let settings = Settings::load_from(concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml"));
        std::env::remove_var("APPWRITE_DATABASE_ID");

        assert_eq!(settings.unwrap().appwrite.database_id, "platform_db");
    }
}
