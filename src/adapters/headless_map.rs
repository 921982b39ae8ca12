use crate::domain::model::{
    BaseLayer, Bounds, LayerHandle, MarkerHandle, MarkerSpec, Viewport,
};
use crate::domain::ports::MapSurface;
use crate::utils::error::{AtlasError, Result};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// In-memory map surface. Keeps the same state a browser map would and
/// counts lifecycle calls so callers can check resource discipline.
#[derive(Debug, Default)]
pub struct HeadlessMap {
    next_handle: u64,
    viewport: Option<Viewport>,
    layers: BTreeMap<u64, BaseLayer>,
    markers: BTreeMap<MarkerHandle, MarkerSpec>,
    highlighted: BTreeSet<MarkerHandle>,
    unavailable_layers: HashSet<BaseLayer>,
    marker_limit: Option<usize>,
    viewports_created: usize,
    viewports_disposed: usize,
    markers_created: usize,
    camera_moves: usize,
}

impl HeadlessMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `attach_layer` fail for `layer`, as an unreachable tile server would.
    pub fn with_unavailable_layer(mut self, layer: BaseLayer) -> Self {
        self.unavailable_layers.insert(layer);
        self
    }

    /// Rejects markers once `limit` are on the map, as a renderer out of
    /// capacity would.
    pub fn with_marker_limit(mut self, limit: usize) -> Self {
        self.marker_limit = Some(limit);
        self
    }

    fn issue_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn live_layers(&self) -> Vec<BaseLayer> {
        self.layers.values().copied().collect()
    }

    pub fn markers(&self) -> impl Iterator<Item = (&MarkerHandle, &MarkerSpec)> {
        self.markers.iter()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn is_highlighted(&self, handle: MarkerHandle) -> bool {
        self.highlighted.contains(&handle)
    }

    pub fn highlighted_count(&self) -> usize {
        self.highlighted.len()
    }

    pub fn viewports_created(&self) -> usize {
        self.viewports_created
    }

    pub fn viewports_disposed(&self) -> usize {
        self.viewports_disposed
    }

    pub fn markers_created(&self) -> usize {
        self.markers_created
    }

    pub fn camera_moves(&self) -> usize {
        self.camera_moves
    }

    fn require_viewport(&self) -> Result<()> {
        self.viewport.map(|_| ()).ok_or(AtlasError::MapNotInitialized)
    }
}

impl MapSurface for HeadlessMap {
    fn create_viewport(&mut self, view: Viewport) -> Result<()> {
        self.viewport = Some(view);
        self.viewports_created += 1;
        Ok(())
    }

    fn dispose_viewport(&mut self) {
        self.viewport = None;
        self.layers.clear();
        self.markers.clear();
        self.highlighted.clear();
        self.viewports_disposed += 1;
    }

    fn attach_layer(&mut self, layer: BaseLayer) -> Result<LayerHandle> {
        self.require_viewport()?;
        if self.unavailable_layers.contains(&layer) {
            return Err(AtlasError::LayerAttachError {
                layer: layer.id().to_string(),
                message: format!("tile server {} unreachable", layer.tile_url()),
            });
        }
        let handle = self.issue_handle();
        self.layers.insert(handle, layer);
        Ok(LayerHandle(handle))
    }

    fn detach_layer(&mut self, handle: LayerHandle) {
        self.layers.remove(&handle.0);
    }

    fn add_marker(&mut self, spec: &MarkerSpec) -> Result<MarkerHandle> {
        self.require_viewport()?;
        if let Some(limit) = self.marker_limit {
            if self.markers.len() >= limit {
                return Err(AtlasError::MarkerError {
                    key: spec.key.to_string(),
                    message: format!("marker limit of {} reached", limit),
                });
            }
        }
        let handle = MarkerHandle(self.issue_handle());
        self.markers.insert(handle, spec.clone());
        self.markers_created += 1;
        Ok(handle)
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle);
        self.highlighted.remove(&handle);
    }

    fn set_marker_highlight(&mut self, handle: MarkerHandle, highlighted: bool) {
        if !self.markers.contains_key(&handle) {
            return;
        }
        if highlighted {
            self.highlighted.insert(handle);
        } else {
            self.highlighted.remove(&handle);
        }
    }

    fn fit_bounds(&mut self, bounds: Bounds) -> Viewport {
        let max_zoom = self
            .layers
            .values()
            .map(BaseLayer::max_zoom)
            .min()
            .unwrap_or(19);
        let view = Viewport {
            center: bounds.center(),
            zoom: zoom_for_span(&bounds, max_zoom),
        };
        self.viewport = Some(view);
        self.camera_moves += 1;
        view
    }

    fn set_view(&mut self, view: Viewport) {
        self.viewport = Some(view);
        self.camera_moves += 1;
    }
}

/// Largest web-mercator zoom whose world width still covers the span.
fn zoom_for_span(bounds: &Bounds, max_zoom: u8) -> u8 {
    let span = (bounds.north - bounds.south)
        .abs()
        .max((bounds.east - bounds.west).abs());
    if span <= f64::EPSILON {
        return max_zoom;
    }
    let zoom = (360.0 / span).log2().floor();
    zoom.clamp(0.0, f64::from(max_zoom)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Coordinates, MarkerKey, MarkerKind};

    fn spec(key: &str) -> MarkerSpec {
        MarkerSpec {
            kind: MarkerKind::Project,
            key: MarkerKey::from(key),
            position: Coordinates { lat: 30.0, lon: 31.0 },
            title: key.to_string(),
            subtitle: None,
        }
    }

    #[test]
    fn test_markers_require_viewport() {
        let mut map = HeadlessMap::new();
        assert!(map.add_marker(&spec("A")).is_err());

        map.create_viewport(Viewport {
            center: Coordinates { lat: 30.0, lon: 31.0 },
            zoom: 11,
        })
        .unwrap();
        let handle = map.add_marker(&spec("A")).unwrap();
        assert_eq!(map.marker_count(), 1);

        map.remove_marker(handle);
        assert_eq!(map.marker_count(), 0);
    }

    #[test]
    fn test_marker_limit_rejects_extra_markers() {
        let mut map = HeadlessMap::new().with_marker_limit(1);
        map.create_viewport(Viewport {
            center: Coordinates { lat: 30.0, lon: 31.0 },
            zoom: 11,
        })
        .unwrap();

        map.add_marker(&spec("A")).unwrap();
        let err = map.add_marker(&spec("B")).unwrap_err();

        assert!(matches!(err, AtlasError::MarkerError { ref key, .. } if key == "B"));
        let titles: Vec<&str> = map.markers().map(|(_, spec)| spec.title.as_str()).collect();
        assert_eq!(titles, vec!["A"]);
    }

    #[test]
    fn test_zoom_for_span() {
        let city = Bounds {
            south: 29.9,
            west: 31.0,
            north: 30.2,
            east: 31.6,
        };
        assert_eq!(zoom_for_span(&city, 19), 9);

        let point = Bounds {
            south: 30.0,
            west: 31.0,
            north: 30.0,
            east: 31.0,
        };
        assert_eq!(zoom_for_span(&point, 19), 19);
    }
}
