use crate::domain::model::{Coordinates, PriceRange, Project};
use crate::domain::ports::{CatalogSource, ConfigProvider};
use crate::utils::error::{AtlasError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

pub const GRID_CATALOG_PATH: &str = "/api/projects/all";
pub const MAP_CATALOG_PATH: &str = "/api/projects/map";

/// The two shapes the backend serves the catalog in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogProjection {
    /// Descriptive fields; `name` and `min_price` required.
    Grid,
    /// Coordinate-bearing; `name`, `latitude` and `longitude` required.
    Map,
}

impl CatalogProjection {
    pub fn path(&self) -> &'static str {
        match self {
            CatalogProjection::Grid => GRID_CATALOG_PATH,
            CatalogProjection::Map => MAP_CATALOG_PATH,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    projects: Vec<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(serde_json::Number),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireProject {
    id: Option<WireId>,
    name: Option<String>,
    location: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    image: Option<String>,
    description: Option<String>,
    developer: Option<String>,
    #[serde(default)]
    amenities: Option<Vec<String>>,
    payment_plans: Option<String>,
    bedrooms: Option<String>,
}

impl WireProject {
    fn into_project(self, projection: CatalogProjection) -> Option<Project> {
        let name = self.name.filter(|n| !n.trim().is_empty())?;

        let coordinates = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon),
            _ => None,
        };
        if projection == CatalogProjection::Map && coordinates.is_none() {
            return None;
        }

        let price = match self.min_price {
            Some(min) if !min.is_finite() || min < 0.0 => return None,
            Some(min) => Some(PriceRange {
                min,
                max: self.max_price.filter(|max| max.is_finite()),
            }),
            None => None,
        };
        if projection == CatalogProjection::Grid && price.is_none() {
            return None;
        }

        Some(Project {
            id: self.id.map(WireId::into_string),
            name,
            location: self.location.unwrap_or_default(),
            coordinates,
            price,
            image: self.image,
            description: self.description,
            developer: self.developer,
            amenities: self
                .amenities
                .unwrap_or_default()
                .into_iter()
                .collect::<BTreeSet<_>>(),
            payment_plans: self.payment_plans,
            bedrooms: self.bedrooms,
        })
    }
}

/// Parses a catalog response body. Malformed records are dropped one by one.
pub fn parse_catalog(body: &str, projection: CatalogProjection) -> Result<Vec<Project>> {
    let envelope: CatalogEnvelope = serde_json::from_str(body)?;
    if !envelope.success {
        return Err(AtlasError::FetchError {
            endpoint: projection.path().to_string(),
            message: envelope
                .error
                .unwrap_or_else(|| "backend reported failure".to_string()),
        });
    }

    let total = envelope.projects.len();
    let projects: Vec<Project> = envelope
        .projects
        .into_iter()
        .filter_map(|value| serde_json::from_value::<WireProject>(value).ok())
        .filter_map(|wire| wire.into_project(projection))
        .collect();

    if projects.len() < total {
        tracing::warn!(
            "Dropped {} malformed records from {}",
            total - projects.len(),
            projection.path()
        );
    }
    Ok(projects)
}

/// Joins the grid and map projections by marker key. Grid records keep their
/// order and gain coordinates; map-only records follow in map order, but only
/// when they carry a min price of their own.
pub fn merge_projections(grid: Vec<Project>, map: Vec<Project>) -> Vec<Project> {
    let mut located: HashMap<String, Project> = HashMap::with_capacity(map.len());
    let mut map_order = Vec::with_capacity(map.len());
    for project in map {
        let key = project.marker_key().0;
        if !located.contains_key(&key) {
            map_order.push(key.clone());
            located.insert(key, project);
        }
    }

    let mut merged = Vec::with_capacity(grid.len() + located.len());
    for mut project in grid {
        if let Some(counterpart) = located.remove(&project.marker_key().0) {
            if project.coordinates.is_none() {
                project.coordinates = counterpart.coordinates;
            }
        }
        merged.push(project);
    }
    let mut unpriced = 0;
    for key in map_order {
        match located.remove(&key) {
            Some(project) if project.price.is_some() => merged.push(project),
            Some(_) => unpriced += 1,
            None => {}
        }
    }
    if unpriced > 0 {
        tracing::warn!("Dropped {} map-only records without a min price", unpriced);
    }
    merged
}

pub struct HttpCatalogSource {
    client: Client,
    base_url: String,
}

impl HttpCatalogSource {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds()))
            .user_agent(config.user_agent())
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch(&self, projection: CatalogProjection) -> Result<Vec<Project>> {
        let url = format!("{}{}", self.base_url, projection.path());
        tracing::debug!("Fetching catalog from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        tracing::debug!("Catalog response status: {}", status);
        if !status.is_success() {
            return Err(AtlasError::FetchError {
                endpoint: url,
                message: format!("HTTP status {}", status),
            });
        }

        let body = response.text().await?;
        let projects = parse_catalog(&body, projection)?;
        tracing::info!("Fetched {} projects from {}", projects.len(), projection.path());
        Ok(projects)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    /// Loads both projections concurrently. A failed map projection only costs
    /// coordinates; a failed grid projection fails the load.
    async fn load(&self) -> Result<Vec<Project>> {
        let (grid, map) = tokio::join!(
            self.fetch(CatalogProjection::Grid),
            self.fetch(CatalogProjection::Map)
        );
        let map = map.unwrap_or_else(|e| {
            tracing::warn!("Map projection unavailable, continuing without coordinates: {}", e);
            Vec::new()
        });
        Ok(merge_projections(grid?, map))
    }
}
