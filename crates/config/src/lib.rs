//! Configuration loading, validation, and management for Kindred.
//!
//! Loads configuration from `~/.kindred/config.toml` with environment
//! variable overrides. Validates all settings at startup. None of these
//! values are caller-supplied per synthesis call; they tune the engine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.kindred/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Budget packing and fact capping limits
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Last-contact recency bands
    #[serde(default)]
    pub recency: RecencyConfig,

    /// Source read timeouts
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Companion persona settings
    #[serde(default)]
    pub companion: CompanionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Hard maximum length of the packed context, in characters.
    #[serde(default = "default_budget_chars")]
    pub budget_chars: usize,

    #[serde(default = "default_max_facts")]
    pub max_facts: usize,

    #[serde(default = "default_max_event_fragments")]
    pub max_event_fragments: usize,

    /// How many events (closest in time first) are examined at all.
    #[serde(default = "default_max_events_considered")]
    pub max_events_considered: usize,

    /// Half-width of the follow-up window around an event.
    #[serde(default = "default_event_window_hours")]
    pub event_window_hours: u32,

    #[serde(default = "default_session_summary_limit")]
    pub session_summary_limit: usize,

    #[serde(default = "default_max_emotion_tags")]
    pub max_emotion_tags: usize,

    /// Minimum current streak worth highlighting.
    #[serde(default = "default_streak_highlight_min")]
    pub streak_highlight_min: u32,

    /// How many past sessions are fetched for last-contact detection.
    #[serde(default = "default_session_fetch_limit")]
    pub session_fetch_limit: usize,
}

fn default_budget_chars() -> usize {
    800
}
fn default_max_facts() -> usize {
    60
}
fn default_max_event_fragments() -> usize {
    3
}
fn default_max_events_considered() -> usize {
    8
}
fn default_event_window_hours() -> u32 {
    12
}
fn default_session_summary_limit() -> usize {
    3
}
fn default_max_emotion_tags() -> usize {
    3
}
fn default_streak_highlight_min() -> u32 {
    3
}
fn default_session_fetch_limit() -> usize {
    5
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            budget_chars: default_budget_chars(),
            max_facts: default_max_facts(),
            max_event_fragments: default_max_event_fragments(),
            max_events_considered: default_max_events_considered(),
            event_window_hours: default_event_window_hours(),
            session_summary_limit: default_session_summary_limit(),
            max_emotion_tags: default_max_emotion_tags(),
            streak_highlight_min: default_streak_highlight_min(),
            session_fetch_limit: default_session_fetch_limit(),
        }
    }
}

/// Band edges for the time since the last session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecencyConfig {
    #[serde(default = "default_just_spoke_minutes")]
    pub just_spoke_minutes: i64,

    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: i64,

    #[serde(default = "default_gap_days")]
    pub gap_days: i64,

    #[serde(default = "default_long_absence_days")]
    pub long_absence_days: i64,
}

fn default_just_spoke_minutes() -> i64 {
    30
}
fn default_short_break_minutes() -> i64 {
    180
}
fn default_gap_days() -> i64 {
    3
}
fn default_long_absence_days() -> i64 {
    14
}

impl Default for RecencyConfig {
    fn default() -> Self {
        Self {
            just_spoke_minutes: default_just_spoke_minutes(),
            short_break_minutes: default_short_break_minutes(),
            gap_days: default_gap_days(),
            long_absence_days: default_long_absence_days(),
        }
    }
}

const MINUTES_PER_DAY: i64 = 24 * 60;

impl RecencyConfig {
    /// `gap_days` in minutes, or `None` if it does not fit an `i64`.
    pub fn gap_minutes(&self) -> Option<i64> {
        self.gap_days.checked_mul(MINUTES_PER_DAY)
    }

    /// `long_absence_days` in minutes, or `None` if it does not fit an `i64`.
    pub fn long_absence_minutes(&self) -> Option<i64> {
        self.long_absence_days.checked_mul(MINUTES_PER_DAY)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Per-read timeout. Must be shorter than `call_timeout_ms`.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Whole-call timeout applied by the caller.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

fn default_read_timeout_ms() -> u64 {
    1500
}
fn default_call_timeout_ms() -> u64 {
    5000
}

impl SourcesConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: default_read_timeout_ms(),
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanionConfig {
    /// The name the companion introduces itself with.
    #[serde(default = "default_companion_name")]
    pub name: String,

    /// User-local offset from UTC, used for day-part and event times.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_companion_name() -> String {
    "Sol".into()
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            name: default_companion_name(),
            utc_offset_minutes: 0,
        }
    }
}

/// Smallest budget that still fits the timestamp and identity lines.
pub const MIN_BUDGET_CHARS: usize = 64;

impl AppConfig {
    /// Load configuration from the default path (~/.kindred/config.toml).
    ///
    /// Also checks environment variables:
    /// - `KINDRED_COMPANION_NAME`
    /// - `KINDRED_UTC_OFFSET_MINUTES`
    /// - `KINDRED_BUDGET_CHARS`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("KINDRED_COMPANION_NAME").filter(|n| !n.trim().is_empty()) {
            self.companion.name = name.trim().to_string();
        }

        if let Some(raw) = lookup("KINDRED_UTC_OFFSET_MINUTES") {
            self.companion.utc_offset_minutes = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "KINDRED_UTC_OFFSET_MINUTES is not an integer: {raw}"
                ))
            })?;
        }

        if let Some(raw) = lookup("KINDRED_BUDGET_CHARS") {
            self.synthesis.budget_chars = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("KINDRED_BUDGET_CHARS is not a number: {raw}"))
            })?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".kindred")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.synthesis;
        if s.budget_chars < MIN_BUDGET_CHARS {
            return Err(ConfigError::ValidationError(format!(
                "synthesis.budget_chars must be at least {MIN_BUDGET_CHARS}"
            )));
        }
        if s.max_facts == 0 {
            return Err(ConfigError::ValidationError(
                "synthesis.max_facts must be > 0".into(),
            ));
        }
        if s.max_events_considered < s.max_event_fragments {
            return Err(ConfigError::ValidationError(
                "synthesis.max_events_considered must be >= max_event_fragments".into(),
            ));
        }

        let r = &self.recency;
        let (Some(gap_minutes), Some(long_minutes)) = (r.gap_minutes(), r.long_absence_minutes())
        else {
            return Err(ConfigError::ValidationError(
                "recency.gap_days and recency.long_absence_days are out of range".into(),
            ));
        };
        if !(0 < r.just_spoke_minutes
            && r.just_spoke_minutes < r.short_break_minutes
            && r.short_break_minutes < gap_minutes
            && gap_minutes < long_minutes)
        {
            return Err(ConfigError::ValidationError(
                "recency bands must be strictly increasing".into(),
            ));
        }

        if self.sources.read_timeout_ms == 0
            || self.sources.read_timeout_ms >= self.sources.call_timeout_ms
        {
            return Err(ConfigError::ValidationError(
                "sources.read_timeout_ms must be > 0 and < call_timeout_ms".into(),
            ));
        }

        if self.companion.utc_offset_minutes.abs() > 14 * 60 {
            return Err(ConfigError::ValidationError(
                "companion.utc_offset_minutes must be within ±840".into(),
            ));
        }

        if self.companion.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "companion.name must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.synthesis.budget_chars, 800);
        assert_eq!(config.synthesis.max_facts, 60);
        assert_eq!(config.synthesis.max_event_fragments, 3);
        assert_eq!(config.companion.name, "Sol");
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.synthesis.budget_chars, config.synthesis.budget_chars);
        assert_eq!(parsed.recency.gap_days, config.recency.gap_days);
    }

    #[test]
    fn tiny_budget_rejected() {
        let mut config = AppConfig::default();
        config.synthesis.budget_chars = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn read_timeout_must_be_below_call_timeout() {
        let mut config = AppConfig::default();
        config.sources.read_timeout_ms = 6000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn huge_day_bands_rejected_not_overflowed() {
        let mut config = AppConfig::default();
        config.recency.gap_days = i64::MAX / 100;
        config.recency.long_absence_days = i64::MAX / 50;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = AppConfig::default();
        config.recency.long_absence_days = i64::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn day_bands_convert_to_minutes() {
        let recency = RecencyConfig::default();
        assert_eq!(recency.gap_minutes(), Some(3 * 24 * 60));
        assert_eq!(recency.long_absence_minutes(), Some(14 * 24 * 60));
    }

    #[test]
    fn overlapping_bands_rejected() {
        let mut config = AppConfig::default();
        config.recency.gap_days = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.synthesis.budget_chars, 800);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[companion]\nname = \"Juno\"\nutc_offset_minutes = 120").unwrap();
        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.companion.name, "Juno");
        assert_eq!(config.companion.utc_offset_minutes, 120);
        assert_eq!(config.synthesis.max_facts, 60);
    }

    #[test]
    fn invalid_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[synthesis\nbudget_chars = ").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("KINDRED_COMPANION_NAME", "Ash"),
            ("KINDRED_UTC_OFFSET_MINUTES", "-300"),
            ("KINDRED_BUDGET_CHARS", "640"),
        ]);
        let mut config = AppConfig::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.companion.name, "Ash");
        assert_eq!(config.companion.utc_offset_minutes, -300);
        assert_eq!(config.synthesis.budget_chars, 640);
    }

    #[test]
    fn bad_env_number_is_validation_error() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(|k| (k == "KINDRED_BUDGET_CHARS").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("budget_chars = 800"));
        assert!(toml_str.contains("Sol"));
    }
}
