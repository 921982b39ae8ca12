// Adapters layer: concrete implementations for external systems (backend http, place search, map surface, agent channel)

pub mod agent;
pub mod catalog;
pub mod geocoding;
pub mod headless_map;
pub mod profile;

pub use agent::ChannelAgentSink;
pub use catalog::HttpCatalogSource;
pub use geocoding::NominatimGeocoder;
pub use headless_map::HeadlessMap;
pub use profile::HttpProfileSource;
