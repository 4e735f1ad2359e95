use crate::models::Source;
use crate::scrapers::types::CrawlParams;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Site-specific constants the extractor matches against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// City that location strings end with ("<bairro>, <city>")
    pub city: String,
    /// State name, used as a weaker hint for location paragraphs
    pub state: String,
    /// Suffix the site appends to `og:title` (" - <site name>")
    pub site_name: String,
    /// Stock image served when a listing has no photo
    pub placeholder_image: String,
    /// Query parameter holding the numeric listing code
    pub code_param: String,
    /// Class hint of the container holding condo fee and IPTU
    pub fee_block_class: String,
    pub source: Source,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            city: "Belo Horizonte".to_string(),
            state: "Minas".to_string(),
            site_name: "Imobiliária Vitrini".to_string(),
            placeholder_image: "/_assets/images/imobiliaria-vitrini.webp".to_string(),
            code_param: "codigo".to_string(),
            fee_block_class: "valores".to_string(),
            source: Source::Vitrini,
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub site: SiteProfile,
    pub crawl: CrawlParams,
    /// Where the dataset is written
    pub output_dir: PathBuf,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            site: SiteProfile::default(),
            crawl: CrawlParams::default(),
            output_dir: PathBuf::from("dataset"),
        }
    }
}

impl ScoutConfig {
    /// Load configuration from a JSON file; missing sections keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "crawl": {{ "max_requests_per_crawl": 5 }}, "site": {{ "city": "Contagem" }} }}"#).unwrap();

        let config = ScoutConfig::from_file(file.path()).unwrap();
        assert_eq!(config.crawl.max_requests_per_crawl, 5);
        assert_eq!(config.crawl.detail_path_marker, "imovel");
        assert_eq!(config.site.city, "Contagem");
        assert_eq!(config.site.code_param, "codigo");
        assert_eq!(config.output_dir, PathBuf::from("dataset"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(ScoutConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn no_path_means_defaults() {
        let config = ScoutConfig::load(None).unwrap();
        assert_eq!(config.site.source, Source::Vitrini);
        assert_eq!(config.crawl.max_requests_per_crawl, 100);
    }
}
