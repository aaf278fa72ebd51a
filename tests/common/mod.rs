#![allow(dead_code)]

use async_trait::async_trait;
use mapdemo::core::config::PermissionPolicy;
use mapdemo::location::{FixedLocationProvider, LocationProvider, NoLocationProvider};
use mapdemo::permission::{PermissionGate, PolicyPermissionGate};
use mapdemo::prelude::*;
use std::sync::Mutex;
use tokio::runtime::Handle;

pub const SILAY: GeoPosition = GeoPosition::new(10.8, 122.97);

/// Which lookups ran, in order
pub type CallLog = Arc<Mutex<Vec<&'static str>>>;

pub struct FakeWeather {
    pub result: std::result::Result<f64, u16>,
    pub calls: CallLog,
}

#[async_trait]
impl WeatherLookup for FakeWeather {
    async fn current(&self, _at: GeoPosition) -> std::result::Result<CurrentWeather, WeatherError> {
        self.calls.lock().unwrap().push("weather");
        match self.result {
            Ok(temperature_c) => Ok(CurrentWeather {
                temperature_c,
                description: Some("scattered clouds".to_string()),
            }),
            Err(status) => Err(WeatherError::Status {
                stage: LookupStage::Weather,
                status,
            }),
        }
    }
}

pub struct FakePlaces {
    pub result: std::result::Result<&'static str, u16>,
    pub calls: CallLog,
}

#[async_trait]
impl PlaceLookup for FakePlaces {
    async fn place_name(&self, _at: GeoPosition) -> std::result::Result<String, WeatherError> {
        self.calls.lock().unwrap().push("place");
        match self.result {
            Ok(name) => Ok(name.to_string()),
            Err(status) => Err(WeatherError::Status {
                stage: LookupStage::Place,
                status,
            }),
        }
    }
}

pub struct Harness {
    pub services: ScreenServices,
    pub calls: CallLog,
}

/// Services with fake lookups and no tiles
pub fn harness(
    policy: PermissionPolicy,
    fix: Option<GeoPosition>,
    weather: std::result::Result<f64, u16>,
    place: std::result::Result<&'static str, u16>,
) -> Harness {
    let calls = CallLog::default();
    let location: Arc<dyn LocationProvider> = match fix {
        Some(position) => Arc::new(FixedLocationProvider::new(position, Duration::ZERO)),
        None => Arc::new(NoLocationProvider),
    };
    let permissions: Arc<dyn PermissionGate> = Arc::new(PolicyPermissionGate::new(policy));
    let services = ScreenServices::new(
        Handle::current(),
        permissions,
        location,
        Arc::new(FakeWeather {
            result: weather,
            calls: calls.clone(),
        }),
        Arc::new(FakePlaces {
            result: place,
            calls: calls.clone(),
        }),
    );
    Harness { services, calls }
}

/// Pumps `screen` until `done` holds or two seconds pass
pub async fn pump_until(screen: &mut ScreenController, done: impl Fn(&ScreenController) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        screen.pump();
        if done(screen) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

/// Pumps for a short while, for asserting that nothing happens
pub async fn settle(screen: &mut ScreenController) {
    for _ in 0..10 {
        screen.pump();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Builds, activates and lays out a screen
pub fn open(config: ScreenConfig, services: ScreenServices) -> ScreenController {
    let mut screen = ScreenController::new(config, services);
    screen.activate().unwrap();
    screen.on_layout(Point::new(2048.0, 2048.0)).unwrap();
    screen
}

pub fn render(screen: &mut ScreenController) -> RenderContext {
    let mut context = RenderContext::new(2048.0, 2048.0);
    screen.render(&mut context).unwrap();
    context
}
