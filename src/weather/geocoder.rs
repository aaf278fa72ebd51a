use super::{fetch_json, model::NominatimResponse, LookupStage, PlaceLookup, WeatherError};
use crate::core::config::{parse_base_url, GeocoderConfig};
use crate::core::geo::GeoPosition;
use crate::{MapError, Result};
use async_trait::async_trait;
use reqwest::{header, Url};

/// Nominatim reverse geocoder
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    endpoint: Url,
    user_agent: String,
}

impl NominatimClient {
    pub fn new(http: reqwest::Client, config: &GeocoderConfig) -> Result<Self> {
        let endpoint = parse_base_url("geocoder.base_url", &config.base_url)?
            .join("reverse")
            .map_err(|err| MapError::Config(format!("geocoder endpoint: {err}")))?;
        Ok(Self {
            http,
            endpoint,
            user_agent: config.user_agent.clone(),
        })
    }

    /// `GET reverse?lat=..&lon=..&format=json` with an identifying user agent
    pub fn build_request(&self, at: GeoPosition) -> std::result::Result<reqwest::Request, WeatherError> {
        self.http
            .get(self.endpoint.clone())
            .header(header::USER_AGENT, self.user_agent.as_str())
            .query(&[
                ("lat", at.lat.to_string()),
                ("lon", at.lng.to_string()),
                ("format", "json".to_string()),
            ])
            .build()
            .map_err(|source| WeatherError::Request {
                stage: LookupStage::Place,
                source,
            })
    }
}

#[async_trait]
impl PlaceLookup for NominatimClient {
    async fn place_name(&self, at: GeoPosition) -> std::result::Result<String, WeatherError> {
        let request = self.build_request(at)?;
        log::debug!("reverse geocoding {at}");
        let response: NominatimResponse = fetch_json(&self.http, request, LookupStage::Place).await?;
        Ok(response.display_name)
    }
}
