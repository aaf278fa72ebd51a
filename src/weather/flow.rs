use super::{PlaceLookup, WeatherError, WeatherLookup, WeatherReading};
use crate::core::geo::GeoPosition;

/// Weather at `at`, then its place name. The place lookup is never issued
/// when the weather lookup fails.
pub async fn fetch_reading(
    weather: &dyn WeatherLookup,
    places: &dyn PlaceLookup,
    at: GeoPosition,
) -> Result<WeatherReading, WeatherError> {
    let current = weather.current(at).await?;
    log::debug!("temperature at {at} is {}°C", current.temperature_c);

    let place_name = places.place_name(at).await?;
    Ok(WeatherReading::new(current, place_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::{CurrentWeather, LookupStage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Calls(Mutex<Vec<&'static str>>);

    impl Calls {
        fn push(&self, call: &'static str) {
            self.0.lock().unwrap().push(call);
        }
        fn list(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().clone()
        }
    }

    struct FakeWeather<'a> {
        calls: &'a Calls,
        temperature: Option<f64>,
    }

    #[async_trait]
    impl WeatherLookup for FakeWeather<'_> {
        async fn current(&self, _at: GeoPosition) -> Result<CurrentWeather, WeatherError> {
            self.calls.push("weather");
            match self.temperature {
                Some(temperature_c) => Ok(CurrentWeather {
                    temperature_c,
                    description: None,
                }),
                None => Err(WeatherError::Status {
                    stage: LookupStage::Weather,
                    status: 401,
                }),
            }
        }
    }

    struct FakePlaces<'a> {
        calls: &'a Calls,
        name: Option<&'static str>,
    }

    #[async_trait]
    impl PlaceLookup for FakePlaces<'_> {
        async fn place_name(&self, _at: GeoPosition) -> Result<String, WeatherError> {
            self.calls.push("place");
            self.name.map(str::to_string).ok_or(WeatherError::Status {
                stage: LookupStage::Place,
                status: 500,
            })
        }
    }

    #[tokio::test]
    async fn test_success_combines_both_lookups() {
        let calls = Calls::default();
        let reading = fetch_reading(
            &FakeWeather { calls: &calls, temperature: Some(29.5) },
            &FakePlaces { calls: &calls, name: Some("Bacolod, Philippines") },
            GeoPosition::new(10.67, 122.95),
        )
        .await
        .unwrap();

        assert_eq!(calls.list(), vec!["weather", "place"]);
        assert_eq!(reading.label(), "Bacolod, Philippines: 29.5°C");
    }

    #[tokio::test]
    async fn test_weather_failure_skips_place_lookup() {
        let calls = Calls::default();
        let error = fetch_reading(
            &FakeWeather { calls: &calls, temperature: None },
            &FakePlaces { calls: &calls, name: Some("unused") },
            GeoPosition::new(10.67, 122.95),
        )
        .await
        .unwrap_err();

        assert_eq!(calls.list(), vec!["weather"]);
        assert_eq!(error.stage(), LookupStage::Weather);
    }

    #[tokio::test]
    async fn test_place_failure_reports_place_stage() {
        let calls = Calls::default();
        let error = fetch_reading(
            &FakeWeather { calls: &calls, temperature: Some(30.0) },
            &FakePlaces { calls: &calls, name: None },
            GeoPosition::new(10.67, 122.95),
        )
        .await
        .unwrap_err();

        assert_eq!(calls.list(), vec!["weather", "place"]);
        assert_eq!(error.failure_notice(), "Failed to load location name");
    }
}
