use crate::domain::model::{Coordinates, SearchResult};
use crate::domain::ports::{ConfigProvider, Geocoder};
use crate::utils::error::{AtlasError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Upper bound on results requested from the place-search service.
pub const MAX_RESULTS: usize = 5;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireNumber {
    Text(String),
    Number(f64),
}

impl WireNumber {
    fn value(&self) -> Option<f64> {
        match self {
            WireNumber::Text(s) => s.trim().parse().ok(),
            WireNumber::Number(n) => Some(*n),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePlace {
    lat: WireNumber,
    lon: WireNumber,
    display_name: String,
}

/// Nominatim-compatible place search, biased to one region by suffixing it
/// to every query.
pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
    region: String,
    limit: usize,
}

impl NominatimGeocoder {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds()))
            .user_agent(config.user_agent())
            .build()?;
        Ok(Self {
            client,
            endpoint: config.geocoder_endpoint().to_string(),
            region: config.geocoder_region().to_string(),
            limit: config.geocoder_limit().clamp(1, MAX_RESULTS),
        })
    }

    fn request_url(&self, query: &str) -> Result<Url> {
        let biased = if self.region.is_empty() {
            query.to_string()
        } else {
            format!("{}, {}", query, self.region)
        };
        let limit = self.limit.to_string();
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("q", biased.as_str()),
                ("format", "json"),
                ("limit", limit.as_str()),
                ("addressdetails", "1"),
            ],
        )
        .map_err(|e| AtlasError::ConfigError {
            message: format!("Invalid geocoder endpoint {}: {}", self.endpoint, e),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = self.request_url(query)?;
        tracing::debug!("Place search request: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AtlasError::GeocodingError {
                message: format!("HTTP status {}", status),
            });
        }

        let places: Vec<WirePlace> = response.json().await?;
        let results = places
            .into_iter()
            .filter_map(|place| {
                let coordinates = Coordinates::new(place.lat.value()?, place.lon.value()?)?;
                Some(SearchResult {
                    coordinates,
                    display_name: place.display_name,
                })
            })
            .take(self.limit)
            .collect();
        Ok(results)
    }
}
