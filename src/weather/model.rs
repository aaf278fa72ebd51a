use serde::{Deserialize, Serialize};

/// OpenWeather `weather` endpoint, only the fields we read
#[derive(Debug, Clone, Deserialize)]
pub struct OpenWeatherResponse {
    pub main: MainBlock,
    #[serde(default)]
    pub weather: Vec<ConditionBlock>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainBlock {
    pub temp: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionBlock {
    #[serde(default)]
    pub description: String,
}

/// Nominatim `reverse` endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimResponse {
    pub display_name: String,
}

/// Result of the weather lookup alone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeather {
    pub temperature_c: f64,
    pub description: Option<String>,
}

impl From<OpenWeatherResponse> for CurrentWeather {
    fn from(response: OpenWeatherResponse) -> Self {
        let description = response
            .weather
            .into_iter()
            .map(|condition| condition.description)
            .find(|description| !description.is_empty());
        Self {
            temperature_c: response.main.temp,
            description,
        }
    }
}

/// Temperature and place name for one position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReading {
    pub temperature_c: f64,
    pub place_name: String,
    pub description: Option<String>,
}

impl WeatherReading {
    pub fn new(weather: CurrentWeather, place_name: impl Into<String>) -> Self {
        Self {
            temperature_c: weather.temperature_c,
            place_name: place_name.into(),
            description: weather.description,
        }
    }

    /// Marker title, e.g. `Bacolod, Philippines: 29.5°C`
    pub fn label(&self) -> String {
        format!("{}: {}°C", self.place_name, format_temperature(self.temperature_c))
    }
}

/// Whole degrees keep one decimal (`30.0`), others print as-is (`29.5`)
pub fn format_temperature(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_openweather_body() {
        let body = r#"{
            "coord": {"lon": 122.95, "lat": 10.67},
            "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds"}],
            "main": {"temp": 29.5, "feels_like": 34.1, "humidity": 74},
            "name": "Bacolod City"
        }"#;
        let response: OpenWeatherResponse = serde_json::from_str(body).unwrap();
        let weather = CurrentWeather::from(response);
        assert_eq!(weather.temperature_c, 29.5);
        assert_eq!(weather.description.as_deref(), Some("broken clouds"));
    }

    #[test]
    fn test_missing_temperature_is_an_error() {
        let body = r#"{"weather": [], "main": {"humidity": 74}}"#;
        assert!(serde_json::from_str::<OpenWeatherResponse>(body).is_err());
    }

    #[test]
    fn test_parse_nominatim_body() {
        let body = r#"{"place_id": 1, "display_name": "Bacolod, Negros Occidental, Philippines", "lat": "10.67"}"#;
        let response: NominatimResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.display_name, "Bacolod, Negros Occidental, Philippines");
    }

    #[test]
    fn test_label_format() {
        let reading = WeatherReading::new(
            CurrentWeather {
                temperature_c: 29.5,
                description: None,
            },
            "Bacolod, Philippines",
        );
        assert_eq!(reading.label(), "Bacolod, Philippines: 29.5°C");

        assert_eq!(format_temperature(30.0), "30.0");
        assert_eq!(format_temperature(-2.25), "-2.25");
    }
}
