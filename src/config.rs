use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::classify::{ClassifierConfig, MAX_CLASSES};
use crate::models::PropertyKeys;
use crate::routing::DEFAULT_ORS_URL;

/// Environment variable consulted when no API key is configured
pub const ORS_API_KEY_ENV: &str = "ORS_API_KEY";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub classifier: ClassifierConfig,
    pub routing: RoutingConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    /// GeoJSON FeatureCollection of municipality boundaries
    pub boundaries: Option<PathBuf>,
    /// CSV with one row per municipality and one column per indicator
    pub indicators: Option<PathBuf>,
    /// GeoJSON FeatureCollection of POI points
    pub pois: Option<PathBuf>,
    /// CSV column holding the municipality code
    pub code_column: String,
    pub properties: PropertyKeys,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            boundaries: None,
            indicators: None,
            pois: None,
            code_column: "ibge_code".to_string(),
            properties: PropertyKeys::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RoutingConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ORS_URL.to_string(),
            api_key: None,
        }
    }
}

impl RoutingConfig {
    /// Configured key, else the `ORS_API_KEY` environment variable
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(ORS_API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        if config.classifier.classes > MAX_CLASSES {
            bail!(
                "classifier.classes must be at most {} (got {})",
                MAX_CLASSES,
                config.classifier.classes
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{NumberLocale, PaletteName};
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.classifier.classes, 5);
        assert_eq!(config.classifier.skew_ratio, 10.0);
        assert_eq!(config.data.code_column, "ibge_code");
        assert_eq!(config.server.listen, "0.0.0.0:3000");
        assert_eq!(config.routing.base_url, DEFAULT_ORS_URL);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[data]
boundaries = "data/municipios.geojson"
code_column = "code"

[data.properties]
code = ["cd_mun"]

[classifier]
classes = 7
palette = "oranges"
locale = "pt-BR"

[routing]
api_key = "abc"

[server]
listen = "127.0.0.1:8080"
"#
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(
            config.data.boundaries,
            Some(PathBuf::from("data/municipios.geojson"))
        );
        assert_eq!(config.data.code_column, "code");
        assert_eq!(config.data.properties.code, vec!["cd_mun".to_string()]);
        assert_eq!(config.data.properties.name, PropertyKeys::default().name);
        assert_eq!(config.classifier.classes, 7);
        assert_eq!(config.classifier.palette, Some(PaletteName::Oranges));
        assert_eq!(config.classifier.locale, NumberLocale::PtBr);
        assert_eq!(config.classifier.log_offset, 1.0);
        assert_eq!(config.routing.api_key(), Some("abc".to_string()));
        assert_eq!(config.server.listen, "127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_file() {
        assert!(Config::from_toml("[classifier]\nclasses = \"many\"").is_err());
        assert!(Config::load_from_file("/nonexistent/choromap.toml").is_err());
    }

    #[test]
    fn test_too_many_classes() {
        assert!(Config::from_toml("[classifier]\nclasses = 13").is_err());
        assert!(Config::from_toml("[classifier]\nclasses = 10000000000").is_err());
        assert_eq!(
            Config::from_toml("[classifier]\nclasses = 12").unwrap().classifier.classes,
            MAX_CLASSES
        );
    }
}
