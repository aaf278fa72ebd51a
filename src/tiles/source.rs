use crate::core::config::TileConfig;
use crate::core::geo::TileCoord;

/// Anything that can produce tile URLs for a given coordinate.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;

    fn max_zoom(&self) -> u8 {
        19
    }

    fn attribution(&self) -> &str {
        ""
    }
}

/// Expands `{z}`, `{x}`, `{y}` and `{s}` in a URL template.
#[derive(Debug, Clone)]
pub struct UrlTemplateSource {
    template: String,
    subdomains: Vec<String>,
    max_zoom: u8,
    attribution: String,
}

impl UrlTemplateSource {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            subdomains: Vec::new(),
            max_zoom: 19,
            attribution: String::new(),
        }
    }

    pub fn from_config(config: &TileConfig) -> Self {
        Self {
            template: config.url_template.clone(),
            subdomains: config.subdomains.clone(),
            max_zoom: config.max_zoom,
            attribution: config.attribution.clone(),
        }
    }

    pub fn with_subdomains(mut self, subdomains: &[&str]) -> Self {
        self.subdomains = subdomains.iter().map(|s| s.to_string()).collect();
        self
    }

    fn subdomain(&self, coord: TileCoord) -> &str {
        if self.subdomains.is_empty() {
            return "";
        }
        let index = ((coord.x + coord.y) % self.subdomains.len() as u32) as usize;
        &self.subdomains[index]
    }
}

impl TileSource for UrlTemplateSource {
    fn url(&self, coord: TileCoord) -> String {
        self.template
            .replace("{s}", self.subdomain(coord))
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    fn attribution(&self) -> &str {
        &self.attribution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_osm_template() {
        let source = UrlTemplateSource::from_config(&TileConfig::default());
        assert_eq!(
            source.url(TileCoord::new(215, 119, 9)),
            "https://tile.openstreetmap.org/9/215/119.png"
        );
        assert_eq!(source.max_zoom(), 19);
        assert!(source.attribution().contains("OpenStreetMap"));
    }

    #[test]
    fn test_subdomains_rotate() {
        let source = UrlTemplateSource::new("https://{s}.tiles.example/{z}/{x}/{y}.png")
            .with_subdomains(&["a", "b", "c"]);
        assert_eq!(source.url(TileCoord::new(0, 0, 1)), "https://a.tiles.example/1/0/0.png");
        assert_eq!(source.url(TileCoord::new(1, 0, 1)), "https://b.tiles.example/1/1/0.png");
        assert_eq!(source.url(TileCoord::new(1, 1, 1)), "https://c.tiles.example/1/1/1.png");
    }
}
