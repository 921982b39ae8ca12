use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Returns `None` for non-finite or out-of-range pairs.
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self { lat, lon })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkerKey(pub String);

impl fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MarkerKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A catalog entry. Unknown wire fields are dropped at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Option<String>,
    pub name: String,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub price: Option<PriceRange>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub developer: Option<String>,
    pub amenities: BTreeSet<String>,
    pub payment_plans: Option<String>,
    pub bedrooms: Option<String>,
}

impl Project {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            location: location.into(),
            coordinates: None,
            price: None,
            image: None,
            description: None,
            developer: None,
            amenities: BTreeSet::new(),
            payment_plans: None,
            bedrooms: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_min_price(mut self, min: f64) -> Self {
        self.price = Some(PriceRange { min, max: None });
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.coordinates = Coordinates::new(lat, lon);
        self
    }

    /// Identity used by the map registry: id when present, else name.
    pub fn marker_key(&self) -> MarkerKey {
        MarkerKey(self.id.clone().unwrap_or_else(|| self.name.clone()))
    }

    pub fn min_price(&self) -> Option<f64> {
        self.price.map(|p| p.min)
    }

    /// Case-insensitive substring match against any token.
    pub fn location_matches_any(&self, tokens: &[String]) -> bool {
        let location = self.location.to_lowercase();
        tokens
            .iter()
            .any(|token| location.contains(&token.to_lowercase()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub preferred_locations: Vec<String>,
    #[serde(default)]
    pub average_budget: Option<f64>,
}

/// Values the user picked by hand; each one fully replaces its profile counterpart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManualFilters {
    pub locations: Vec<String>,
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveFilterCriteria {
    /// Empty means no location filtering.
    pub locations: Vec<String>,
    pub max_budget: Option<f64>,
    /// The profile's own preferences, used only for ordering.
    pub preferred_locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub coordinates: Coordinates,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Coordinates,
    pub zoom: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn covering<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinates>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let seed = Bounds {
            south: first.lat,
            west: first.lon,
            north: first.lat,
            east: first.lon,
        };
        Some(points.fold(seed, |b, p| Bounds {
            south: b.south.min(p.lat),
            west: b.west.min(p.lon),
            north: b.north.max(p.lat),
            east: b.east.max(p.lon),
        }))
    }

    /// Grows each side by `ratio` of the current span.
    pub fn pad(&self, ratio: f64) -> Self {
        let lat_pad = (self.north - self.south).abs() * ratio;
        let lon_pad = (self.east - self.west).abs() * ratio;
        Bounds {
            south: self.south - lat_pad,
            west: self.west - lon_pad,
            north: self.north + lat_pad,
            east: self.east + lon_pad,
        }
    }

    pub fn center(&self) -> Coordinates {
        Coordinates {
            lat: (self.south + self.north) / 2.0,
            lon: (self.west + self.east) / 2.0,
        }
    }

    pub fn contains(&self, point: Coordinates) -> bool {
        (self.south..=self.north).contains(&point.lat) && (self.west..=self.east).contains(&point.lon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseLayer {
    #[default]
    OpenStreetMap,
    Satellite,
    Dark,
    Light,
}

impl BaseLayer {
    pub const ALL: [BaseLayer; 4] = [
        BaseLayer::OpenStreetMap,
        BaseLayer::Satellite,
        BaseLayer::Dark,
        BaseLayer::Light,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            BaseLayer::OpenStreetMap => "openstreetmap",
            BaseLayer::Satellite => "satellite",
            BaseLayer::Dark => "dark",
            BaseLayer::Light => "light",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BaseLayer::OpenStreetMap => "Street Map",
            BaseLayer::Satellite => "Satellite",
            BaseLayer::Dark => "Dark",
            BaseLayer::Light => "Light",
        }
    }

    pub fn tile_url(&self) -> &'static str {
        match self {
            BaseLayer::OpenStreetMap => "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            BaseLayer::Satellite => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
            }
            BaseLayer::Dark => "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
            BaseLayer::Light => "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png",
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            BaseLayer::OpenStreetMap => "© OpenStreetMap contributors",
            BaseLayer::Satellite => "© Esri, DigitalGlobe, Earthstar Geographics",
            BaseLayer::Dark | BaseLayer::Light => "© CartoDB",
        }
    }

    pub fn max_zoom(&self) -> u8 {
        19
    }
}

impl fmt::Display for BaseLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for BaseLayer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BaseLayer::ALL
            .into_iter()
            .find(|layer| layer.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let valid: Vec<&str> = BaseLayer::ALL.iter().map(|l| l.id()).collect();
                format!("unknown base layer '{}', expected one of: {}", s, valid.join(", "))
            })
    }
}

/// Opaque handle issued by a map surface for an attached tile layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerHandle(pub u64);

/// Opaque handle issued by a map surface for a placed marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Project,
    Search,
    UserLocation,
}

/// Everything a surface needs to draw a marker and its popup.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub kind: MarkerKind,
    pub key: MarkerKey,
    pub position: Coordinates,
    pub title: String,
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentEvent {
    pub project: Project,
    pub requested_at: DateTime<Utc>,
}
