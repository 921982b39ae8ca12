use crate::domain::model::{
    BaseLayer, Bounds, Coordinates, LayerHandle, MarkerHandle, MarkerKey, MarkerKind, MarkerSpec,
    Project, SearchResult, Viewport,
};
use crate::domain::ports::MapSurface;
use crate::utils::error::{AtlasError, Result};
use crate::utils::format::price_label;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub initial_view: Viewport,
    pub base_layer: BaseLayer,
    pub fit_padding: f64,
    pub search_zoom: u8,
    pub locate_zoom: u8,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            initial_view: Viewport {
                center: Coordinates {
                    lat: 30.0444,
                    lon: 31.2357,
                },
                zoom: 11,
            },
            base_layer: BaseLayer::OpenStreetMap,
            fit_padding: 0.1,
            search_zoom: 14,
            locate_zoom: 13,
        }
    }
}

/// A marker the controller placed. Replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub handle: MarkerHandle,
    pub spec: MarkerSpec,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub created: Vec<MarkerKey>,
    pub removed: Vec<MarkerKey>,
    pub replaced: Vec<MarkerKey>,
    pub unchanged: usize,
    pub without_coordinates: usize,
    pub failed: Vec<MarkerKey>,
    /// Camera target after fitting, if the registry was non-empty.
    pub viewport: Option<Viewport>,
    /// True when the viewport did not exist yet and the pass was queued for `init`.
    pub deferred: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Live,
    Disposed,
}

/// Sole owner of the map viewport, its base layer and every marker on it.
pub struct MapController<S: MapSurface> {
    surface: S,
    settings: MapSettings,
    lifecycle: Lifecycle,
    viewport: Viewport,
    layer: Option<(BaseLayer, LayerHandle)>,
    markers: BTreeMap<MarkerKey, MapMarker>,
    search_marker: Option<MapMarker>,
    user_marker: Option<MapMarker>,
    highlighted: Option<MarkerKey>,
    fullscreen: bool,
    pending: Option<Vec<MarkerSpec>>,
}

impl<S: MapSurface> MapController<S> {
    pub fn new(surface: S, settings: MapSettings) -> Self {
        let viewport = settings.initial_view;
        Self {
            surface,
            settings,
            lifecycle: Lifecycle::Uninitialized,
            viewport,
            layer: None,
            markers: BTreeMap::new(),
            search_marker: None,
            user_marker: None,
            highlighted: None,
            fullscreen: false,
            pending: None,
        }
    }

    /// Creates the viewport and base layer. Repeated calls are no-ops.
    pub fn init(&mut self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Live => {
                tracing::debug!("Map already initialized, ignoring init");
                return Ok(());
            }
            Lifecycle::Disposed => {
                tracing::warn!("Map was disposed, ignoring init");
                return Ok(());
            }
            Lifecycle::Uninitialized => {}
        }

        self.surface.create_viewport(self.settings.initial_view)?;
        let layer = self.settings.base_layer;
        match self.surface.attach_layer(layer) {
            Ok(handle) => self.layer = Some((layer, handle)),
            Err(e) => {
                self.surface.dispose_viewport();
                return Err(e);
            }
        }

        self.viewport = self.settings.initial_view;
        self.lifecycle = Lifecycle::Live;
        tracing::info!("Map initialized with '{}' layer", layer);

        if let Some(desired) = self.pending.take() {
            tracing::debug!("Applying {} queued markers", desired.len());
            let mut report = ReconcileReport::default();
            self.apply(desired, &mut report);
        }
        Ok(())
    }

    /// Releases every marker, the layer and the viewport. Idempotent.
    pub fn dispose(&mut self) {
        if self.lifecycle != Lifecycle::Live {
            self.lifecycle = Lifecycle::Disposed;
            return;
        }

        let markers = std::mem::take(&mut self.markers);
        for marker in markers.into_values() {
            self.surface.remove_marker(marker.handle);
        }
        if let Some(marker) = self.search_marker.take() {
            self.surface.remove_marker(marker.handle);
        }
        if let Some(marker) = self.user_marker.take() {
            self.surface.remove_marker(marker.handle);
        }
        if let Some((_, handle)) = self.layer.take() {
            self.surface.detach_layer(handle);
        }
        self.surface.dispose_viewport();

        self.highlighted = None;
        self.pending = None;
        self.lifecycle = Lifecycle::Disposed;
        tracing::info!("Map disposed");
    }

    /// Diffs the marker registry against `projects` and refits the camera.
    ///
    /// Projects without coordinates are skipped. When two projects share a key
    /// the first one wins.
    pub fn reconcile(&mut self, projects: &[&Project]) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut seen = HashSet::new();
        let mut desired = Vec::with_capacity(projects.len());

        for project in projects {
            let Some(position) = project.coordinates else {
                report.without_coordinates += 1;
                continue;
            };
            let key = project.marker_key();
            if !seen.insert(key.clone()) {
                tracing::warn!("Duplicate marker key '{}', keeping the first project", key);
                continue;
            }
            desired.push(MarkerSpec {
                kind: MarkerKind::Project,
                key,
                position,
                title: project.name.clone(),
                subtitle: project.price.as_ref().map(price_label),
            });
        }

        if self.lifecycle != Lifecycle::Live {
            tracing::debug!("Map not live, queueing {} markers", desired.len());
            self.pending = Some(desired);
            report.deferred = true;
            return report;
        }

        self.apply(desired, &mut report);
        report
    }

    fn apply(&mut self, desired: Vec<MarkerSpec>, report: &mut ReconcileReport) {
        let stale: Vec<MarkerKey> = {
            let incoming: HashSet<&MarkerKey> = desired.iter().map(|spec| &spec.key).collect();
            self.markers
                .keys()
                .filter(|key| !incoming.contains(key))
                .cloned()
                .collect()
        };

        for key in stale {
            if let Some(marker) = self.markers.remove(&key) {
                self.surface.remove_marker(marker.handle);
            }
            if self.highlighted.as_ref() == Some(&key) {
                self.highlighted = None;
            }
            report.removed.push(key);
        }

        for spec in desired {
            match self.markers.get(&spec.key) {
                Some(existing) if existing.spec == spec => {
                    report.unchanged += 1;
                }
                Some(existing) => {
                    let old = existing.handle;
                    let key = spec.key.clone();
                    match self.surface.add_marker(&spec) {
                        Ok(handle) => {
                            self.surface.remove_marker(old);
                            let highlighted = self.highlighted.as_ref() == Some(&key);
                            if highlighted {
                                self.surface.set_marker_highlight(handle, true);
                            }
                            self.markers.insert(key.clone(), MapMarker { handle, spec });
                            report.replaced.push(key);
                        }
                        Err(e) => {
                            tracing::warn!("Keeping previous marker for '{}': {}", key, e);
                            report.failed.push(key);
                        }
                    }
                }
                None => {
                    let key = spec.key.clone();
                    match self.surface.add_marker(&spec) {
                        Ok(handle) => {
                            self.markers.insert(key.clone(), MapMarker { handle, spec });
                            report.created.push(key);
                        }
                        Err(e) => {
                            tracing::warn!("Marker for '{}' not created: {}", key, e);
                            report.failed.push(key);
                        }
                    }
                }
            }
        }

        let positions = self.markers.values().map(|m| m.spec.position);
        if let Some(bounds) = Bounds::covering(positions) {
            let target = self.surface.fit_bounds(bounds.pad(self.settings.fit_padding));
            self.viewport = target;
            report.viewport = Some(target);
        }

        tracing::debug!(
            "Reconciled markers: {} created, {} removed, {} replaced, {} unchanged",
            report.created.len(),
            report.removed.len(),
            report.replaced.len(),
            report.unchanged
        );
    }

    /// Swaps the tile layer. The old layer is detached only once the new one is attached.
    pub fn set_base_layer(&mut self, layer: BaseLayer) -> Result<()> {
        if self.lifecycle != Lifecycle::Live {
            self.settings.base_layer = layer;
            return Ok(());
        }
        if self.base_layer() == layer {
            return Ok(());
        }

        let handle = self.surface.attach_layer(layer)?;
        if let Some((previous, old)) = self.layer.replace((layer, handle)) {
            self.surface.detach_layer(old);
            tracing::info!("Base layer switched from '{}' to '{}'", previous, layer);
        }
        self.settings.base_layer = layer;
        Ok(())
    }

    /// Highlights at most one project marker; `None` clears the highlight.
    pub fn highlight(&mut self, key: Option<&MarkerKey>) {
        if self.highlighted.as_ref() == key {
            return;
        }
        if let Some(previous) = self.highlighted.take() {
            if let Some(marker) = self.markers.get(&previous) {
                self.surface.set_marker_highlight(marker.handle, false);
            }
        }
        if let Some(key) = key {
            if let Some(marker) = self.markers.get(key) {
                self.surface.set_marker_highlight(marker.handle, true);
                self.highlighted = Some(key.clone());
            }
        }
    }

    /// Recenters on a search hit and replaces the single search marker.
    pub fn show_search_result(&mut self, result: &SearchResult) -> Result<()> {
        self.ensure_live()?;
        let spec = MarkerSpec {
            kind: MarkerKind::Search,
            key: MarkerKey::from("search"),
            position: result.coordinates,
            title: result.display_name.clone(),
            subtitle: Some("Nearby projects are shown in blue".to_string()),
        };
        let handle = self.surface.add_marker(&spec)?;
        if let Some(previous) = self.search_marker.replace(MapMarker { handle, spec }) {
            self.surface.remove_marker(previous.handle);
        }
        self.move_camera(result.coordinates, self.settings.search_zoom);
        Ok(())
    }

    pub fn clear_search_marker(&mut self) {
        if let Some(marker) = self.search_marker.take() {
            self.surface.remove_marker(marker.handle);
        }
    }

    /// Marks the user's position and recenters on it. Markers are not reconciled.
    pub fn show_user_location(&mut self, position: Coordinates) -> Result<()> {
        self.ensure_live()?;
        let spec = MarkerSpec {
            kind: MarkerKind::UserLocation,
            key: MarkerKey::from("user-location"),
            position,
            title: "Your Location".to_string(),
            subtitle: None,
        };
        let handle = self.surface.add_marker(&spec)?;
        if let Some(previous) = self.user_marker.replace(MapMarker { handle, spec }) {
            self.surface.remove_marker(previous.handle);
        }
        self.move_camera(position, self.settings.locate_zoom);
        Ok(())
    }

    pub fn clear_user_location(&mut self) {
        if let Some(marker) = self.user_marker.take() {
            self.surface.remove_marker(marker.handle);
        }
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        self.fullscreen
    }

    fn move_camera(&mut self, center: Coordinates, zoom: u8) {
        let view = Viewport { center, zoom };
        self.surface.set_view(view);
        self.viewport = view;
    }

    fn ensure_live(&self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Live => Ok(()),
            _ => Err(AtlasError::MapNotInitialized),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle == Lifecycle::Live
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn base_layer(&self) -> BaseLayer {
        self.layer
            .map(|(layer, _)| layer)
            .unwrap_or(self.settings.base_layer)
    }

    pub fn marker(&self, key: &MarkerKey) -> Option<&MapMarker> {
        self.markers.get(key)
    }

    pub fn marker_keys(&self) -> impl Iterator<Item = &MarkerKey> {
        self.markers.keys()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn search_marker(&self) -> Option<&MapMarker> {
        self.search_marker.as_ref()
    }

    pub fn user_marker(&self) -> Option<&MapMarker> {
        self.user_marker.as_ref()
    }

    pub fn highlighted(&self) -> Option<&MarkerKey> {
        self.highlighted.as_ref()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn geolocation_active(&self) -> bool {
        self.user_marker.is_some()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S: MapSurface> Drop for MapController<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
