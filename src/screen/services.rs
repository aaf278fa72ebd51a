use crate::{
    core::config::AppConfig,
    location::{provider_for_config, LocationProvider},
    permission::PermissionGate,
    runtime::RepaintHook,
    tiles::{TileCache, TileLayer, TileLoader, TileLoaderConfig, TileSource, UrlTemplateSource},
    weather::{NominatimClient, OpenWeatherClient, PlaceLookup, WeatherLookup},
    Result,
};
use std::sync::Arc;
use tokio::runtime::Handle;

/// What a surface needs to fetch base tiles
#[derive(Clone)]
pub struct TileServices {
    pub http: reqwest::Client,
    pub source: Arc<dyn TileSource>,
    /// Shared by every screen, so switching tabs keeps downloaded tiles
    pub cache: TileCache,
    pub loader: TileLoaderConfig,
}

impl TileServices {
    pub fn from_config(config: &AppConfig, http: reqwest::Client) -> Self {
        let mut cache = TileCache::new(config.tiles.memory_cache_size);
        if let Some(dir) = &config.tiles.cache_dir {
            cache = cache.with_disk_dir(dir);
        }
        Self {
            http,
            source: Arc::new(UrlTemplateSource::from_config(&config.tiles)),
            cache,
            loader: TileLoaderConfig::from(&config.tiles),
        }
    }

    /// A fresh loader and layer for one surface
    pub fn layer(&self, runtime: Handle, repaint: Option<RepaintHook>) -> TileLayer {
        let loader = TileLoader::new(
            runtime,
            self.http.clone(),
            self.source.clone(),
            self.cache.clone(),
            self.loader,
        )
        .with_repaint_hook(repaint);
        TileLayer::new(loader)
    }
}

/// Collaborators injected into every screen controller
#[derive(Clone)]
pub struct ScreenServices {
    /// Runtime every background task of a screen is spawned on
    pub runtime: Handle,
    pub permissions: Arc<dyn PermissionGate>,
    pub location: Arc<dyn LocationProvider>,
    pub weather: Arc<dyn WeatherLookup>,
    pub places: Arc<dyn PlaceLookup>,
    /// Base tiles; screens run without them when unset
    pub tiles: Option<TileServices>,
    pub repaint: Option<RepaintHook>,
}

impl ScreenServices {
    pub fn new(
        runtime: Handle,
        permissions: Arc<dyn PermissionGate>,
        location: Arc<dyn LocationProvider>,
        weather: Arc<dyn WeatherLookup>,
        places: Arc<dyn PlaceLookup>,
    ) -> Self {
        Self {
            runtime,
            permissions,
            location,
            weather,
            places,
            tiles: None,
            repaint: None,
        }
    }

    /// Wires the real services described by `config`
    pub fn from_config(
        config: &AppConfig,
        runtime: Handle,
        permissions: Arc<dyn PermissionGate>,
    ) -> Result<Self> {
        let http = config.http_client()?;
        let weather = OpenWeatherClient::new(http.clone(), &config.weather)?;
        let places = NominatimClient::new(http.clone(), &config.geocoder)?;

        Ok(Self::new(
            runtime,
            permissions,
            provider_for_config(&config.location),
            Arc::new(weather),
            Arc::new(places),
        )
        .with_tiles(TileServices::from_config(config, http)))
    }

    pub fn with_tiles(mut self, tiles: TileServices) -> Self {
        self.tiles = Some(tiles);
        self
    }

    pub fn with_repaint_hook(mut self, repaint: RepaintHook) -> Self {
        self.repaint = Some(repaint);
        self
    }
}
