use crate::core::map_sync::MapSettings;
use crate::domain::model::{BaseLayer, Coordinates, Viewport};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{AtlasError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub api: ApiConfig,
    pub geocoding: GeocodingConfig,
    pub map: MapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_seconds: 10,
            user_agent: concat!("project-atlas/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub endpoint: String,
    pub region: String,
    pub limit: usize,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org/search".to_string(),
            region: "Egypt".to_string(),
            limit: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    pub base_layer: BaseLayer,
    pub fit_padding: f64,
    pub search_zoom: u8,
    pub locate_zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        let settings = MapSettings::default();
        Self {
            center_lat: settings.initial_view.center.lat,
            center_lon: settings.initial_view.center.lon,
            zoom: settings.initial_view.zoom,
            base_layer: settings.base_layer,
            fit_padding: settings.fit_padding,
            search_zoom: settings.search_zoom,
            locate_zoom: settings.locate_zoom,
        }
    }
}

impl AtlasConfig {
    /// Loads and parses a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AtlasError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AtlasError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AtlasError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_positive_number("api.timeout_seconds", self.api.timeout_seconds as usize, 1)?;
        validation::validate_non_empty_string("api.user_agent", &self.api.user_agent)?;

        validation::validate_url("geocoding.endpoint", &self.geocoding.endpoint)?;
        validation::validate_range("geocoding.limit", self.geocoding.limit, 1, 5)?;

        validation::validate_range("map.center_lat", self.map.center_lat, -90.0, 90.0)?;
        validation::validate_range("map.center_lon", self.map.center_lon, -180.0, 180.0)?;
        let max_zoom = self.map.base_layer.max_zoom();
        validation::validate_range("map.zoom", self.map.zoom, 0, max_zoom)?;
        validation::validate_range("map.search_zoom", self.map.search_zoom, 0, max_zoom)?;
        validation::validate_range("map.locate_zoom", self.map.locate_zoom, 0, max_zoom)?;
        validation::validate_range("map.fit_padding", self.map.fit_padding, 0.0, 1.0)?;

        Ok(())
    }

    pub fn map_settings(&self) -> Result<MapSettings> {
        let center = Coordinates::new(self.map.center_lat, self.map.center_lon).ok_or_else(|| {
            AtlasError::InvalidConfigValueError {
                field: "map.center".to_string(),
                value: format!("{}, {}", self.map.center_lat, self.map.center_lon),
                reason: "Not a valid latitude/longitude pair".to_string(),
            }
        })?;
        Ok(MapSettings {
            initial_view: Viewport {
                center,
                zoom: self.map.zoom,
            },
            base_layer: self.map.base_layer,
            fit_padding: self.map.fit_padding,
            search_zoom: self.map.search_zoom,
            locate_zoom: self.map.locate_zoom,
        })
    }
}

impl ConfigProvider for AtlasConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.api.timeout_seconds
    }

    fn geocoder_endpoint(&self) -> &str {
        &self.geocoding.endpoint
    }

    fn geocoder_region(&self) -> &str {
        &self.geocoding.region
    }

    fn geocoder_limit(&self) -> usize {
        self.geocoding.limit
    }

    fn user_agent(&self) -> &str {
        &self.api.user_agent
    }
}

impl Validate for AtlasConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
