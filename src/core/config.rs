//! Application configuration
//!
//! Everything a screen needs from the outside world (API keys, service base
//! URLs, the tile server, the user agent, where fixes come from and how
//! location permission is answered) is collected here and injected at
//! startup. Values come from defaults, then an optional JSON file, then
//! environment overrides.

use crate::core::constants::{MAX_ZOOM, OSM_ATTRIBUTION};
use crate::core::geo::GeoPosition;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the OpenWeatherMap API key
pub const ENV_WEATHER_API_KEY: &str = "MAPDEMO_WEATHER_API_KEY";
/// Fallback variable name used by most OpenWeatherMap tooling
pub const ENV_WEATHER_API_KEY_FALLBACK: &str = "OPENWEATHER_API_KEY";
/// Environment variable overriding the on-disk tile cache directory
pub const ENV_TILE_CACHE_DIR: &str = "MAPDEMO_TILE_CACHE_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// User agent sent to the tile server
    pub user_agent: String,
    pub tiles: TileConfig,
    pub weather: WeatherConfig,
    pub geocoder: GeocoderConfig,
    pub location: LocationConfig,
    pub permission: PermissionPolicy,
    /// Request timeout for weather and geocoding calls; client default when unset
    pub http_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("mapdemo/{}", env!("CARGO_PKG_VERSION")),
            tiles: TileConfig::default(),
            weather: WeatherConfig::default(),
            geocoder: GeocoderConfig::default(),
            location: LocationConfig::default(),
            permission: PermissionPolicy::default(),
            http_timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Loads defaults, then `path` if given, then environment overrides, and validates.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                log::debug!("loading configuration from {}", path.display());
                Self::from_json_str(&text)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        if config.weather.api_key.is_empty() {
            log::warn!(
                "no weather API key configured (set {} or {}); weather lookups will fail",
                ENV_WEATHER_API_KEY,
                ENV_WEATHER_API_KEY_FALLBACK
            );
        }

        Ok(config)
    }

    /// Parses a JSON document; missing fields keep their defaults
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Applies overrides from a variable lookup (the process environment in `load`)
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_WEATHER_API_KEY)
            .filter(|value| !value.is_empty())
            .or_else(|| lookup(ENV_WEATHER_API_KEY_FALLBACK).filter(|value| !value.is_empty()));
        if let Some(api_key) = api_key {
            self.weather.api_key = api_key;
        }

        if let Some(dir) = lookup(ENV_TILE_CACHE_DIR).filter(|value| !value.is_empty()) {
            self.tiles.cache_dir = Some(PathBuf::from(dir));
        }
    }

    /// Checks URLs and the tile template
    pub fn validate(&self) -> Result<()> {
        parse_base_url("weather.base_url", &self.weather.base_url)?;
        parse_base_url("geocoder.base_url", &self.geocoder.base_url)?;

        for placeholder in ["{z}", "{x}", "{y}"] {
            if !self.tiles.url_template.contains(placeholder) {
                return Err(MapError::Config(format!(
                    "tiles.url_template is missing {placeholder}"
                )));
            }
        }
        if self.tiles.url_template.contains("{s}") && self.tiles.subdomains.is_empty() {
            return Err(MapError::Config(
                "tiles.url_template uses {s} but tiles.subdomains is empty".to_string(),
            ));
        }
        if self.tiles.max_zoom as f64 > MAX_ZOOM {
            return Err(MapError::Config(format!(
                "tiles.max_zoom must be at most {MAX_ZOOM}"
            )));
        }
        if self.tiles.memory_cache_size == 0 {
            return Err(MapError::Config(
                "tiles.memory_cache_size must be positive".to_string(),
            ));
        }
        if let LocationConfig::Replay { track, .. } = &self.location {
            if track.is_empty() {
                return Err(MapError::Config("location.track is empty".to_string()));
            }
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }

    /// HTTP client shared by the tile loader and the weather lookups
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(self.user_agent.as_str());
        if let Some(timeout) = self.http_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

/// Parses a service base URL; a missing trailing slash is tolerated
pub fn parse_base_url(field: &str, value: &str) -> Result<reqwest::Url> {
    let normalized = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    };
    reqwest::Url::parse(&normalized)
        .map_err(|err| MapError::Config(format!("{field} is not a valid URL ({value}): {err}")))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// Tile URL with `{z}`, `{x}`, `{y}` and optional `{s}` placeholders
    pub url_template: String,
    pub subdomains: Vec<String>,
    /// Tiles kept in memory
    pub memory_cache_size: usize,
    /// On-disk tile cache; disabled when unset
    pub cache_dir: Option<PathBuf>,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub max_zoom: u8,
    pub attribution: String,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            subdomains: Vec::new(),
            memory_cache_size: 512,
            cache_dir: None,
            max_retries: 2,
            retry_delay_ms: 250,
            max_zoom: MAX_ZOOM as u8,
            attribution: OSM_ATTRIBUTION.to_string(),
        }
    }
}

impl TileConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5/".to_string(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    /// Nominatim rejects requests without an identifying user agent
    pub user_agent: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org/".to_string(),
            user_agent: format!("mapdemo/{} (desktop demo)", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Where location fixes come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LocationConfig {
    /// A single fix at a fixed position
    Fixed {
        lat: f64,
        lng: f64,
        #[serde(default)]
        delay_ms: u64,
    },
    /// Replays a recorded track
    Replay {
        track: Vec<GeoPosition>,
        interval_ms: u64,
        #[serde(default)]
        looped: bool,
    },
    /// No positioning available
    None,
}

impl Default for LocationConfig {
    fn default() -> Self {
        // Bacolod City, where the demo screens are centred
        Self::Fixed {
            lat: 10.6765,
            lng: 122.9509,
            delay_ms: 1500,
        }
    }
}

/// How location permission requests are answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionPolicy {
    /// Ask the user with a dialog
    #[default]
    Prompt,
    GrantAll,
    CoarseOnly,
    DenyAll,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.permission, PermissionPolicy::Prompt);
        assert!(config.http_timeout().is_none());
    }

    #[test]
    fn test_tile_zoom_above_limit_is_rejected() {
        let config = AppConfig::from_json_str(r#"{ "tiles": { "max_zoom": 70 } }"#).unwrap();
        assert!(matches!(config.validate(), Err(MapError::Config(_))));

        let config = AppConfig::from_json_str(r#"{ "tiles": { "max_zoom": 17 } }"#).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json_str(
            r#"{
                "weather": { "api_key": "abc123" },
                "location": { "mode": "replay", "track": [{"lat": 1.0, "lng": 2.0}], "interval_ms": 500 },
                "permission": "coarse_only",
                "http_timeout_secs": 10
            }"#,
        )
        .unwrap();

        assert_eq!(config.weather.api_key, "abc123");
        assert_eq!(config.weather.base_url, WeatherConfig::default().base_url);
        assert_eq!(config.permission, PermissionPolicy::CoarseOnly);
        assert_eq!(config.http_timeout(), Some(Duration::from_secs(10)));
        match config.location {
            LocationConfig::Replay { track, interval_ms, looped } => {
                assert_eq!(track, vec![GeoPosition::new(1.0, 2.0)]);
                assert_eq!(interval_ms, 500);
                assert!(!looped);
            }
            other => panic!("unexpected location config {other:?}"),
        }
    }

    #[test]
    fn test_env_overrides_prefer_primary_key() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| match key {
            ENV_WEATHER_API_KEY => Some("primary".to_string()),
            ENV_WEATHER_API_KEY_FALLBACK => Some("fallback".to_string()),
            ENV_TILE_CACHE_DIR => Some("/tmp/tiles".to_string()),
            _ => None,
        });
        assert_eq!(config.weather.api_key, "primary");
        assert_eq!(config.tiles.cache_dir, Some(PathBuf::from("/tmp/tiles")));

        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| match key {
            ENV_WEATHER_API_KEY => Some(String::new()),
            ENV_WEATHER_API_KEY_FALLBACK => Some("fallback".to_string()),
            _ => None,
        });
        assert_eq!(config.weather.api_key, "fallback");
    }

    #[test]
    fn test_validate_rejects_bad_template() {
        let mut config = AppConfig::default();
        config.tiles.url_template = "https://tiles.example/{z}/{x}.png".to_string();
        assert!(matches!(config.validate(), Err(MapError::Config(_))));

        let mut config = AppConfig::default();
        config.tiles.url_template = "https://{s}.tiles.example/{z}/{x}/{y}.png".to_string();
        assert!(config.validate().is_err());
        config.tiles.subdomains = vec!["a".to_string(), "b".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = parse_base_url("weather.base_url", "https://api.example.com/data/2.5").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/data/2.5/");
        assert!(parse_base_url("weather.base_url", "not a url").is_err());
    }
}
