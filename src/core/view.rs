use crate::core::map_sync::{MapController, ReconcileReport};
use crate::core::preferences::resolve;
use crate::core::ranking::rank;
use crate::core::selection::SelectionBridge;
use crate::domain::model::{
    BaseLayer, Coordinates, EffectiveFilterCriteria, ManualFilters, MarkerKey, Project,
    SearchResult, UserProfile,
};
use crate::domain::ports::{AgentSink, CatalogSource, MapSurface};
use crate::utils::error::Result;

pub const LOAD_FAILED_NOTICE: &str = "Unable to load projects right now. Please try again later.";
pub const NO_MATCHES_NOTICE: &str = "No projects match your preferences.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogStatus {
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    pub visible: usize,
    pub reconcile: ReconcileReport,
}

/// Owns the inputs (catalog, profile, manual filters) and drives every
/// change through `resolve -> rank -> reconcile` before returning.
pub struct AtlasView<S: MapSurface, A: AgentSink> {
    catalog: Vec<Project>,
    status: CatalogStatus,
    profile: Option<UserProfile>,
    manual: ManualFilters,
    criteria: EffectiveFilterCriteria,
    visible: Vec<usize>,
    map: MapController<S>,
    selection: SelectionBridge<A>,
}

impl<S: MapSurface, A: AgentSink> AtlasView<S, A> {
    pub fn new(map: MapController<S>, selection: SelectionBridge<A>) -> Self {
        Self {
            catalog: Vec::new(),
            status: CatalogStatus::Loading,
            profile: None,
            manual: ManualFilters::default(),
            criteria: EffectiveFilterCriteria::default(),
            visible: Vec::new(),
            map,
            selection,
        }
    }

    pub fn mount(&mut self) -> Result<()> {
        self.map.init()
    }

    pub fn unmount(&mut self) {
        self.map.dispose();
    }

    /// Loads the catalog; a failed load leaves an empty catalog and a notice.
    pub async fn load_catalog<C>(&mut self, source: &C) -> RefreshReport
    where
        C: CatalogSource + ?Sized,
    {
        self.status = CatalogStatus::Loading;
        match source.load().await {
            Ok(projects) => self.set_catalog(projects),
            Err(e) => {
                tracing::error!("Catalog load failed: {}", e);
                self.catalog.clear();
                self.status = CatalogStatus::Failed;
                self.refresh()
            }
        }
    }

    pub fn set_catalog(&mut self, projects: Vec<Project>) -> RefreshReport {
        tracing::info!("Catalog loaded with {} projects", projects.len());
        self.catalog = projects;
        self.status = CatalogStatus::Loaded;
        self.refresh()
    }

    pub fn set_profile(&mut self, profile: Option<UserProfile>) -> RefreshReport {
        self.profile = profile;
        self.refresh()
    }

    pub fn set_manual_locations(&mut self, locations: Vec<String>) -> RefreshReport {
        self.manual.locations = locations;
        self.refresh()
    }

    pub fn set_manual_budget(&mut self, budget: Option<f64>) -> RefreshReport {
        self.manual.budget = budget;
        self.refresh()
    }

    pub fn set_manual_filters(&mut self, manual: ManualFilters) -> RefreshReport {
        self.manual = manual;
        self.refresh()
    }

    pub fn clear_manual_filters(&mut self) -> RefreshReport {
        self.set_manual_filters(ManualFilters::default())
    }

    fn refresh(&mut self) -> RefreshReport {
        self.criteria = resolve(self.profile.as_ref(), &self.manual);
        self.visible = rank(&self.catalog, &self.criteria).into_indices();

        let projects: Vec<&Project> = self.visible.iter().map(|&i| &self.catalog[i]).collect();
        let reconcile = self.map.reconcile(&projects);

        if let Some(highlighted) = self.map.highlighted().cloned() {
            if !projects.iter().any(|p| p.marker_key() == highlighted) {
                self.map.highlight(None);
            }
        }

        RefreshReport {
            visible: projects.len(),
            reconcile,
        }
    }

    pub fn visible_projects(&self) -> Vec<&Project> {
        self.visible.iter().map(|&i| &self.catalog[i]).collect()
    }

    /// Distinct non-empty locations in catalog order.
    pub fn available_locations(&self) -> Vec<&str> {
        let mut locations: Vec<&str> = Vec::new();
        for project in &self.catalog {
            let location = project.location.trim();
            if !location.is_empty() && !locations.contains(&location) {
                locations.push(location);
            }
        }
        locations
    }

    pub fn criteria(&self) -> &EffectiveFilterCriteria {
        &self.criteria
    }

    pub fn catalog_status(&self) -> CatalogStatus {
        self.status
    }

    pub fn empty_state(&self) -> Option<&'static str> {
        match self.status {
            CatalogStatus::Failed => Some(LOAD_FAILED_NOTICE),
            CatalogStatus::Loaded if self.visible.is_empty() => Some(NO_MATCHES_NOTICE),
            _ => None,
        }
    }

    /// Grid selection by position in the visible list.
    pub fn select_visible(&mut self, index: usize) -> Option<&Project> {
        let project = self.visible.get(index).map(|&i| &self.catalog[i])?;
        self.map.highlight(Some(&project.marker_key()));
        self.selection.select(project.clone());
        self.selection.selected()
    }

    /// Map selection: a click on a project marker.
    pub fn click_marker(&mut self, key: &MarkerKey) -> Option<&Project> {
        let project = self
            .visible
            .iter()
            .map(|&i| &self.catalog[i])
            .find(|p| p.coordinates.is_some() && &p.marker_key() == key)?;
        self.map.highlight(Some(key));
        self.selection.select(project.clone());
        self.selection.selected()
    }

    pub fn deselect(&mut self) {
        self.selection.deselect();
        self.map.highlight(None);
    }

    /// Sends the selected project to the agent; false when nothing is selected.
    pub fn ask_agent_about_selection(&mut self) -> bool {
        let Some(project) = self.selection.selected().cloned() else {
            return false;
        };
        self.selection.request_agent_focus(&project);
        true
    }

    pub fn show_search_result(&mut self, result: &SearchResult) -> Result<()> {
        self.map.show_search_result(result)
    }

    pub fn set_base_layer(&mut self, layer: BaseLayer) -> Result<()> {
        self.map.set_base_layer(layer)
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.map.toggle_fullscreen()
    }

    pub fn show_user_location(&mut self, position: Coordinates) -> Result<()> {
        self.map.show_user_location(position)
    }

    pub fn clear_user_location(&mut self) {
        self.map.clear_user_location()
    }

    pub fn map(&self) -> &MapController<S> {
        &self.map
    }

    pub fn selection(&self) -> &SelectionBridge<A> {
        &self.selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::agent::ChannelAgentSink;
    use crate::adapters::headless_map::HeadlessMap;
    use crate::core::map_sync::MapSettings;
    use crate::utils::error::AtlasError;
    use async_trait::async_trait;

    fn view() -> (
        AtlasView<HeadlessMap, ChannelAgentSink>,
        tokio::sync::mpsc::UnboundedReceiver<crate::domain::model::AgentEvent>,
    ) {
        let (sink, receiver) = ChannelAgentSink::new();
        let map = MapController::new(HeadlessMap::new(), MapSettings::default());
        let mut view = AtlasView::new(map, SelectionBridge::new(sink));
        view.mount().unwrap();
        (view, receiver)
    }

    fn catalog() -> Vec<Project> {
        vec![
            Project::new("Palm Hills", "New Cairo")
                .with_id("1")
                .with_min_price(3_000_000.0)
                .with_coordinates(30.02, 31.49),
            Project::new("Mountain View", "Maadi")
                .with_id("2")
                .with_min_price(8_000_000.0)
                .with_coordinates(29.96, 31.25),
            Project::new("Zed Towers", "Sheikh Zayed")
                .with_id("3")
                .with_min_price(4_500_000.0),
        ]
    }

    fn names(view: &AtlasView<HeadlessMap, ChannelAgentSink>) -> Vec<String> {
        view.visible_projects().iter().map(|p| p.name.clone()).collect()
    }

    struct FailingSource;

    #[async_trait]
    impl CatalogSource for FailingSource {
        async fn load(&self) -> Result<Vec<Project>> {
            Err(AtlasError::FetchError {
                endpoint: "/api/projects/all".to_string(),
                message: "connection refused".to_string(),
            })
        }
    }

    #[test]
    fn test_profile_drives_filter_and_markers() {
        let (mut view, _rx) = view();
        view.set_catalog(catalog());

        let report = view.set_profile(Some(UserProfile {
            preferred_locations: vec!["New Cairo".to_string()],
            average_budget: Some(5_000_000.0),
        }));

        assert_eq!(names(&view), vec!["Palm Hills"]);
        assert_eq!(report.visible, 1);
        assert_eq!(report.reconcile.removed, vec![MarkerKey::from("2")]);
        assert_eq!(view.map().marker_count(), 1);
    }

    #[test]
    fn test_manual_override_replaces_profile() {
        let (mut view, _rx) = view();
        view.set_catalog(catalog());
        view.set_profile(Some(UserProfile {
            preferred_locations: vec!["New Cairo".to_string()],
            average_budget: None,
        }));

        view.set_manual_locations(vec!["Maadi".to_string()]);
        assert_eq!(names(&view), vec!["Mountain View"]);
        assert_eq!(view.criteria().locations, vec!["Maadi".to_string()]);

        view.set_manual_budget(Some(1_000_000.0));
        assert!(view.visible_projects().is_empty());
        assert_eq!(view.empty_state(), Some(NO_MATCHES_NOTICE));

        view.clear_manual_filters();
        assert_eq!(names(&view), vec!["Palm Hills"]);
    }

    #[test]
    fn test_unlocated_projects_stay_in_grid() {
        let (mut view, _rx) = view();
        let report = view.set_catalog(catalog());

        assert_eq!(report.visible, 3);
        assert_eq!(report.reconcile.without_coordinates, 1);
        assert_eq!(view.map().marker_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_load_shows_empty_state() {
        let (mut view, _rx) = view();
        view.set_catalog(catalog());

        let report = view.load_catalog(&FailingSource).await;

        assert_eq!(report.visible, 0);
        assert_eq!(view.catalog_status(), CatalogStatus::Failed);
        assert_eq!(view.empty_state(), Some(LOAD_FAILED_NOTICE));
        assert_eq!(view.map().marker_count(), 0);
    }

    #[tokio::test]
    async fn test_marker_click_selects_and_agent_gets_event() {
        let (mut view, mut rx) = view();
        view.set_catalog(catalog());

        let selected = view.click_marker(&MarkerKey::from("2")).unwrap();
        assert_eq!(selected.name, "Mountain View");
        assert_eq!(view.map().highlighted(), Some(&MarkerKey::from("2")));
        assert!(view.selection().detail_visible());

        assert!(view.ask_agent_about_selection());
        let event = rx.recv().await.unwrap();
        assert_eq!(event.project.name, "Mountain View");

        view.deselect();
        assert!(view.map().highlighted().is_none());
        assert!(!view.ask_agent_about_selection());
    }

    #[test]
    fn test_click_on_unknown_marker_is_ignored() {
        let (mut view, _rx) = view();
        view.set_catalog(catalog());
        assert!(view.click_marker(&MarkerKey::from("3")).is_none());
        assert!(view.selection().selected().is_none());
    }

    #[test]
    fn test_grid_selection_highlights_marker() {
        let (mut view, _rx) = view();
        view.set_catalog(catalog());

        let selected = view.select_visible(0).unwrap();
        assert_eq!(selected.name, "Palm Hills");
        assert_eq!(view.map().highlighted(), Some(&MarkerKey::from("1")));

        view.set_manual_locations(vec!["Maadi".to_string()]);
        assert!(view.map().highlighted().is_none());
        assert_eq!(view.selection().selected().unwrap().name, "Palm Hills");
    }

    #[test]
    fn test_view_toggles_do_not_reconcile() {
        let (mut view, _rx) = view();
        view.set_catalog(catalog());
        let created = view.map().surface().markers_created();
        let moves = view.map().surface().camera_moves();

        view.toggle_fullscreen();
        view.set_base_layer(BaseLayer::Light).unwrap();

        assert_eq!(view.map().surface().markers_created(), created);
        assert_eq!(view.map().surface().camera_moves(), moves);
        assert!(view.map().is_fullscreen());
    }

    #[test]
    fn test_available_locations_are_distinct() {
        let (mut view, _rx) = view();
        let mut projects = catalog();
        projects.push(Project::new("Palm Hills II", "New Cairo").with_min_price(1.0));
        projects.push(Project::new("Unknown", "  ").with_min_price(1.0));
        view.set_catalog(projects);

        assert_eq!(
            view.available_locations(),
            vec!["New Cairo", "Maadi", "Sheikh Zayed"]
        );
    }
}
