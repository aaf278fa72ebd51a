use crate::core::geo::TileCoord;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(512) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// Tile bytes kept in an LRU memory cache, optionally backed by a directory
/// laid out as `<dir>/<z>/<x>/<y>.png`.
///
/// Clones share the same memory cache.
#[derive(Debug, Clone)]
pub struct TileCache {
    memory: Arc<Mutex<LruCache<TileCoord, Arc<Vec<u8>>>>>,
    disk_dir: Option<PathBuf>,
}

impl TileCache {
    /// Create a new tile cache with the given capacity
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY);
        Self {
            memory: Arc::new(Mutex::new(LruCache::new(capacity))),
            disk_dir: None,
        }
    }

    pub fn with_disk_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.disk_dir = Some(dir.into());
        self
    }

    pub fn disk_dir(&self) -> Option<&Path> {
        self.disk_dir.as_deref()
    }

    /// Get a tile from memory
    pub fn get(&self, coord: &TileCoord) -> Option<Arc<Vec<u8>>> {
        self.memory.lock().ok()?.get(coord).cloned()
    }

    pub fn put(&self, coord: TileCoord, data: Arc<Vec<u8>>) {
        if let Ok(mut memory) = self.memory.lock() {
            memory.put(coord, data);
        }
    }

    pub fn contains(&self, coord: &TileCoord) -> bool {
        self.memory
            .lock()
            .ok()
            .map(|memory| memory.contains(coord))
            .unwrap_or(false)
    }

    /// File backing `coord`, when a disk cache is configured
    pub fn disk_path(&self, coord: &TileCoord) -> Option<PathBuf> {
        self.disk_dir.as_ref().map(|dir| {
            dir.join(coord.z.to_string())
                .join(coord.x.to_string())
                .join(format!("{}.png", coord.y))
        })
    }

    /// Reads a tile from disk; missing files and I/O errors are both misses
    pub fn load_from_disk(&self, coord: &TileCoord) -> Option<Vec<u8>> {
        let path = self.disk_path(coord)?;
        match std::fs::read(&path) {
            Ok(data) if !data.is_empty() => Some(data),
            Ok(_) => None,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                log::warn!("reading cached tile {} failed: {err}", path.display());
                None
            }
        }
    }

    /// Writes a tile to disk. No-op without a disk cache.
    pub fn store_to_disk(&self, coord: &TileCoord, data: &[u8]) -> std::io::Result<()> {
        let Some(path) = self.disk_path(coord) else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, data)
    }

    /// [`load_from_disk`](Self::load_from_disk) on tokio's blocking pool
    pub async fn read_disk(&self, coord: TileCoord) -> Option<Vec<u8>> {
        self.disk_dir.as_ref()?;
        let cache = self.clone();
        match tokio::task::spawn_blocking(move || cache.load_from_disk(&coord)).await {
            Ok(data) => data,
            Err(err) => {
                log::warn!("disk read for tile {coord} did not complete: {err}");
                None
            }
        }
    }

    /// [`store_to_disk`](Self::store_to_disk) on tokio's blocking pool
    pub async fn write_disk(&self, coord: TileCoord, data: Arc<Vec<u8>>) -> std::io::Result<()> {
        if self.disk_dir.is_none() {
            return Ok(());
        }
        let cache = self.clone();
        tokio::task::spawn_blocking(move || cache.store_to_disk(&coord, &data))
            .await
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?
    }

    /// Clear all tiles from memory
    pub fn clear(&self) {
        if let Ok(mut memory) = self.memory.lock() {
            memory.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.memory.lock().ok().map(|memory| memory.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY.get())
    }
}
