//! Current weather at a position, labelled with a place name
//!
//! Two lookups run back to back: the temperature from OpenWeather, then the
//! place name from Nominatim reverse geocoding. [`flow::fetch_reading`]
//! combines them; the place lookup only runs after the weather lookup
//! succeeded.

pub mod client;
pub mod flow;
pub mod geocoder;
pub mod model;

use crate::core::geo::GeoPosition;
use async_trait::async_trait;
use std::fmt;

pub use client::OpenWeatherClient;
pub use geocoder::NominatimClient;
pub use model::{CurrentWeather, WeatherReading};

/// Which of the two lookups failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStage {
    Weather,
    Place,
}

impl LookupStage {
    /// Text of the notice shown to the user when this stage fails
    pub fn failure_notice(&self) -> &'static str {
        match self {
            LookupStage::Weather => "Failed to load weather data",
            LookupStage::Place => "Failed to load location name",
        }
    }
}

impl fmt::Display for LookupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupStage::Weather => write!(f, "weather"),
            LookupStage::Place => write!(f, "place name"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("{stage} request failed: {source}")]
    Request {
        stage: LookupStage,
        #[source]
        source: reqwest::Error,
    },

    #[error("{stage} service answered HTTP {status}")]
    Status { stage: LookupStage, status: u16 },

    #[error("{stage} response could not be decoded: {source}")]
    Decode {
        stage: LookupStage,
        #[source]
        source: serde_json::Error,
    },

    #[error("no weather API key configured")]
    MissingApiKey,
}

impl WeatherError {
    pub fn stage(&self) -> LookupStage {
        match self {
            WeatherError::Request { stage, .. }
            | WeatherError::Status { stage, .. }
            | WeatherError::Decode { stage, .. } => *stage,
            WeatherError::MissingApiKey => LookupStage::Weather,
        }
    }

    pub fn failure_notice(&self) -> &'static str {
        self.stage().failure_notice()
    }
}

/// Current conditions at a position
#[async_trait]
pub trait WeatherLookup: Send + Sync {
    async fn current(&self, at: GeoPosition) -> Result<CurrentWeather, WeatherError>;
}

/// Reverse geocoding of a position to a display name
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    async fn place_name(&self, at: GeoPosition) -> Result<String, WeatherError>;
}

/// Sends `request` and decodes a JSON body, tagging failures with `stage`
pub(crate) async fn fetch_json<T>(
    http: &reqwest::Client,
    request: reqwest::Request,
    stage: LookupStage,
) -> Result<T, WeatherError>
where
    T: serde::de::DeserializeOwned,
{
    let response = http
        .execute(request)
        .await
        .map_err(|source| WeatherError::Request { stage, source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(WeatherError::Status {
            stage,
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|source| WeatherError::Request { stage, source })?;
    serde_json::from_slice(&body).map_err(|source| WeatherError::Decode { stage, source })
}
