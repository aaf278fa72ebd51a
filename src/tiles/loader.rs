use super::{cache::TileCache, source::TileSource};
use crate::core::config::TileConfig;
use crate::core::geo::TileCoord;
use crate::prelude::{HashMap, HashSet};
use crate::runtime::RepaintHook;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Result of a tile loading operation
#[derive(Debug)]
pub struct TileResult {
    pub coord: TileCoord,
    pub data: Result<Arc<Vec<u8>>, String>,
}

/// Retry policy for tile downloads
#[derive(Debug, Clone, Copy)]
pub struct TileLoaderConfig {
    /// Retries after the first failed attempt
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for TileLoaderConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay: Duration::from_millis(250),
        }
    }
}

impl From<&TileConfig> for TileLoaderConfig {
    fn from(config: &TileConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        }
    }
}

/// Downloads tiles for one map surface.
///
/// Each requested tile is fetched on the tokio runtime (disk cache first,
/// then the network) and the bytes come back over a channel drained by
/// [`TileLoader::poll_completed`] on the UI thread.
pub struct TileLoader {
    runtime: Handle,
    http: reqwest::Client,
    source: Arc<dyn TileSource>,
    cache: TileCache,
    config: TileLoaderConfig,
    result_tx: Sender<TileResult>,
    result_rx: Receiver<TileResult>,
    /// In-flight downloads
    pending: HashMap<TileCoord, JoinHandle<()>>,
    /// Tiles that exhausted their retries; not requested again
    failed: HashSet<TileCoord>,
    repaint: Option<RepaintHook>,
    paused: bool,
    shut_down: bool,
}

impl TileLoader {
    pub fn new(
        runtime: Handle,
        http: reqwest::Client,
        source: Arc<dyn TileSource>,
        cache: TileCache,
        config: TileLoaderConfig,
    ) -> Self {
        let (result_tx, result_rx) = unbounded();
        Self {
            runtime,
            http,
            source,
            cache,
            config,
            result_tx,
            result_rx,
            pending: HashMap::default(),
            failed: HashSet::default(),
            repaint: None,
            paused: false,
            shut_down: false,
        }
    }

    pub fn with_repaint_hook(mut self, repaint: Option<RepaintHook>) -> Self {
        self.repaint = repaint;
        self
    }

    pub fn source(&self) -> &dyn TileSource {
        self.source.as_ref()
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    /// Starts downloading `coord` unless it is cached, in flight, known to
    /// fail, or the loader is paused. Returns whether a download started.
    pub fn request(&mut self, coord: TileCoord) -> bool {
        if self.paused
            || self.shut_down
            || !coord.is_valid()
            || self.pending.contains_key(&coord)
            || self.failed.contains(&coord)
            || self.cache.contains(&coord)
        {
            return false;
        }

        let url = self.source.url(coord);
        let http = self.http.clone();
        let cache = self.cache.clone();
        let config = self.config;
        let result_tx = self.result_tx.clone();
        let repaint = self.repaint.clone();

        let handle = self.runtime.spawn(async move {
            let data = match cache.read_disk(coord).await {
                Some(data) => {
                    log::debug!("tile {coord} served from disk cache");
                    Ok(Arc::new(data))
                }
                None => match download_with_retries(&http, &url, coord, config).await {
                    Ok(data) => {
                        let data = Arc::new(data);
                        if let Err(err) = cache.write_disk(coord, data.clone()).await {
                            log::warn!("could not cache tile {coord} on disk: {err}");
                        }
                        Ok(data)
                    }
                    Err(err) => Err(err),
                },
            };

            let _ = result_tx.send(TileResult { coord, data });
            if let Some(repaint) = repaint {
                repaint();
            }
        });

        self.pending.insert(coord, handle);
        true
    }

    /// Moves finished downloads into the memory cache. Returns how many
    /// tiles arrived.
    pub fn poll_completed(&mut self) -> usize {
        let mut arrived = 0;
        while let Ok(result) = self.result_rx.try_recv() {
            self.pending.remove(&result.coord);
            match result.data {
                Ok(data) => {
                    self.cache.put(result.coord, data);
                    arrived += 1;
                }
                Err(err) => {
                    log::warn!("giving up on tile {}: {err}", result.coord);
                    self.failed.insert(result.coord);
                }
            }
        }
        arrived
    }

    /// Stops issuing new requests; downloads already in flight complete
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Aborts every in-flight download and refuses further requests.
    /// Returns how many downloads were aborted.
    pub fn shutdown(&mut self) -> usize {
        self.shut_down = true;
        let aborted = self.pending.len();
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
        if aborted > 0 {
            log::debug!("aborted {aborted} tile downloads");
        }
        aborted
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for TileLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn download_with_retries(
    http: &reqwest::Client,
    url: &str,
    coord: TileCoord,
    config: TileLoaderConfig,
) -> Result<Vec<u8>, String> {
    let attempts = config.max_retries + 1;
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        log::debug!("fetch tile {coord} attempt {attempt}");
        match download(http, url).await {
            Ok(data) => {
                log::debug!("downloaded tile {coord} ({} bytes)", data.len());
                return Ok(data);
            }
            Err(err) => {
                log::debug!("tile {coord} download failed on attempt {attempt}: {err}");
                last_error = err;
                if attempt < attempts {
                    tokio::time::sleep(config.retry_delay).await;
                }
            }
        }
    }
    Err(last_error)
}

async fn download(http: &reqwest::Client, url: &str) -> Result<Vec<u8>, String> {
    let response = http.get(url).send().await.map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }
    let bytes = response.bytes().await.map_err(|e| e.to_string())?;
    Ok(bytes.to_vec())
}
