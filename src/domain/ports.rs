use crate::domain::model::{
    AgentEvent, BaseLayer, Bounds, LayerHandle, MarkerHandle, MarkerSpec, Project, SearchResult,
    UserProfile, Viewport,
};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load(&self) -> Result<Vec<Project>>;
}

#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self, email: &str) -> Result<Option<UserProfile>>;
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Receives fire-and-forget notifications for the conversational agent.
pub trait AgentSink {
    fn notify(&self, event: AgentEvent);
}

/// The native map the controller draws on. Calls are synchronous commands;
/// camera animation, if any, is the surface's own business.
pub trait MapSurface {
    fn create_viewport(&mut self, view: Viewport) -> Result<()>;
    fn dispose_viewport(&mut self);

    fn attach_layer(&mut self, layer: BaseLayer) -> Result<LayerHandle>;
    fn detach_layer(&mut self, handle: LayerHandle);

    fn add_marker(&mut self, spec: &MarkerSpec) -> Result<MarkerHandle>;
    fn remove_marker(&mut self, handle: MarkerHandle);
    fn set_marker_highlight(&mut self, handle: MarkerHandle, highlighted: bool);

    /// Animates the camera to show `bounds` and reports where it settled.
    fn fit_bounds(&mut self, bounds: Bounds) -> Viewport;
    fn set_view(&mut self, view: Viewport);
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn request_timeout_seconds(&self) -> u64;
    fn geocoder_endpoint(&self) -> &str;
    fn geocoder_region(&self) -> &str;
    fn geocoder_limit(&self) -> usize;
    fn user_agent(&self) -> &str;
}
