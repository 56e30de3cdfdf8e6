//! Configuration types.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the libSQL file backing the local key/value store.
    pub db_path: PathBuf,
    /// How long a dispatch stays in the "connecting" state.
    pub dispatch_delay: Duration,
    /// How long a toast stays on screen.
    pub toast_duration: Duration,
    /// Downward drag (px) past which a bottom sheet snaps to minimized.
    pub drag_threshold_px: f32,
    /// Maximum symptom description length, in characters.
    pub symptom_max_chars: usize,
    /// Kakao REST key. `None` means the map service is unavailable.
    pub kakao_api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/kok.db"),
            dispatch_delay: Duration::from_millis(3000),
            toast_duration: Duration::from_millis(2000),
            drag_threshold_px: 150.0,
            symptom_max_chars: 500,
            kakao_api_key: None,
        }
    }
}

impl AppConfig {
    /// Build a config from `KOK_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            db_path: std::env::var("KOK_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            dispatch_delay: env_parse::<u64>("KOK_DISPATCH_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.dispatch_delay),
            toast_duration: env_parse::<u64>("KOK_TOAST_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.toast_duration),
            drag_threshold_px: env_parse("KOK_DRAG_THRESHOLD_PX")?
                .unwrap_or(defaults.drag_threshold_px),
            symptom_max_chars: env_parse("KOK_SYMPTOM_MAX_CHARS")?
                .unwrap_or(defaults.symptom_max_chars),
            kakao_api_key: std::env::var("KAKAO_REST_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
        })
    }
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{raw:?}: {e}"),
    })
}
