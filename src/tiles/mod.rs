pub mod cache;
pub mod layer;
pub mod loader;
pub mod source;

// Re-exports for convenience
pub use cache::TileCache;
pub use layer::TileLayer;
pub use loader::{TileLoader, TileLoaderConfig};
pub use source::{TileSource, UrlTemplateSource};
