use super::{fetch_json, model::OpenWeatherResponse, CurrentWeather, LookupStage, WeatherError, WeatherLookup};
use crate::core::config::{parse_base_url, WeatherConfig};
use crate::core::geo::GeoPosition;
use crate::{MapError, Result};
use async_trait::async_trait;
use reqwest::Url;

/// Temperatures are always requested in Celsius; labels print `°C`
const UNITS: &str = "metric";

/// OpenWeather "current weather" client
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(http: reqwest::Client, config: &WeatherConfig) -> Result<Self> {
        let endpoint = parse_base_url("weather.base_url", &config.base_url)?
            .join("weather")
            .map_err(|err| MapError::Config(format!("weather endpoint: {err}")))?;
        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    /// `GET weather?lat=..&lon=..&appid=..&units=metric`
    pub fn build_request(&self, at: GeoPosition) -> std::result::Result<reqwest::Request, WeatherError> {
        self.http
            .get(self.endpoint.clone())
            .query(&[
                ("lat", at.lat.to_string()),
                ("lon", at.lng.to_string()),
                ("appid", self.api_key.clone()),
                ("units", UNITS.to_string()),
            ])
            .build()
            .map_err(|source| WeatherError::Request {
                stage: LookupStage::Weather,
                source,
            })
    }
}

#[async_trait]
impl WeatherLookup for OpenWeatherClient {
    async fn current(&self, at: GeoPosition) -> std::result::Result<CurrentWeather, WeatherError> {
        if self.api_key.is_empty() {
            return Err(WeatherError::MissingApiKey);
        }

        let request = self.build_request(at)?;
        log::debug!("weather lookup at {at}");
        let response: OpenWeatherResponse =
            fetch_json(&self.http, request, LookupStage::Weather).await?;
        Ok(response.into())
    }
}
