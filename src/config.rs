use crate::core::{ranking::BoostPolicy, Matcher};
use crate::models::{ScoringWeights, UnknownAttribute};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
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
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    #[serde(default)]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
    #[serde(default = "default_max_candidates")]
    pub max_candidates: i64,
    #[serde(default = "default_referral_boost_days")]
    pub referral_boost_days: i64,
    #[serde(default = "default_engagement_boost_days")]
    pub engagement_boost_days: i64,
    #[serde(default = "default_referral_threshold")]
    pub referral_threshold: u32,
    #[serde(default = "default_near_match_max_failures")]
    pub near_match_max_failures: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            max_candidates: default_max_candidates(),
            referral_boost_days: default_referral_boost_days(),
            engagement_boost_days: default_engagement_boost_days(),
            referral_threshold: default_referral_threshold(),
            near_match_max_failures: default_near_match_max_failures(),
        }
    }
}

fn default_limit() -> u16 { 20 }
fn default_max_limit() -> u16 { 100 }
fn default_max_candidates() -> i64 { 2000 }
fn default_referral_boost_days() -> i64 { 30 }
fn default_engagement_boost_days() -> i64 { 7 }
fn default_referral_threshold() -> u32 { 3 }
fn default_near_match_max_failures() -> usize { 3 }

impl MatchingSettings {
    pub fn boost_policy(&self) -> Result<BoostPolicy, ConfigError> {
        Ok(BoostPolicy {
            referral_window: boost_window("matching.referral_boost_days", self.referral_boost_days)?,
            engagement_window: boost_window("matching.engagement_boost_days", self.engagement_boost_days)?,
            referral_threshold: self.referral_threshold,
        })
    }

    /// Clamp a requested page size to the configured bounds
    pub fn page_limit(&self, requested: Option<u16>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1)) as usize
    }
}

fn boost_window(key: &str, days: i64) -> Result<chrono::Duration, ConfigError> {
    chrono::Duration::try_days(days)
        .filter(|_| days >= 0)
        .ok_or_else(|| ConfigError::Message(format!("{}: {} days is out of range", key, days)))
}

/// Per-attribute weight overrides keyed by attribute name
/// (`diet`, `dietaryPreference`, `age`, ...). Unlisted attributes keep their
/// built-in weight.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: HashMap<String, f64>,
}

impl ScoringSettings {
    pub fn scoring_weights(&self) -> Result<ScoringWeights, UnknownAttribute> {
        ScoringWeights::default().with_overrides(&self.weights)
    }
}

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
    /// 4. Environment variables (prefixed with MATRIMONY__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MATRIMONY__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        apply_database_url(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    /// Build the matcher described by the `matching` and `scoring` sections
    pub fn matcher(&self) -> Result<Matcher, ConfigError> {
        let weights = self
            .scoring
            .scoring_weights()
            .map_err(|e| ConfigError::Message(format!("scoring.weights: {}", e)))?;

        Ok(Matcher::new(weights)
            .with_boost_policy(self.matching.boost_policy()?)
            .with_near_match_max_failures(self.matching.near_match_max_failures))
    }
}

fn environment() -> Environment {
    Environment::with_prefix("MATRIMONY")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// `DATABASE_URL` (as used by sqlx tooling) wins over the config files
fn apply_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        Err(_) => Ok(settings),
    }
}
