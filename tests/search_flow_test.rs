use httpmock::prelude::*;
use project_atlas::adapters::{ChannelAgentSink, HeadlessMap, NominatimGeocoder};
use project_atlas::core::search::NOT_FOUND_NOTICE;
use project_atlas::domain::model::{BaseLayer, Coordinates, MarkerKind, Project};
use project_atlas::{AtlasConfig, AtlasView, MapController, MapSettings, SearchOutcome, SearchSession, SelectionBridge};
use serde_json::json;

fn session_for(server: &MockServer) -> SearchSession<NominatimGeocoder> {
    let mut config = AtlasConfig::default();
    config.geocoding.endpoint = server.url("/search");
    SearchSession::new(NominatimGeocoder::new(&config).unwrap())
}

fn mounted_view() -> AtlasView<HeadlessMap, ChannelAgentSink> {
    let (sink, _events) = ChannelAgentSink::new();
    let map = MapController::new(HeadlessMap::new(), MapSettings::default());
    let mut view = AtlasView::new(map, SelectionBridge::new(sink));
    view.mount().unwrap();
    view
}

#[tokio::test]
async fn test_search_pick_centers_map_without_touching_markers() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/search").query_param("q", "Cairo University, Egypt");
        then.status(200).json_body(json!([
            {"lat": "30.0276", "lon": "31.2101", "display_name": "Cairo University, Giza, Egypt"},
            {"lat": "30.0500", "lon": "31.2300", "display_name": "Cairo University Hospital, Cairo, Egypt"}
        ]));
    });

    let mut view = mounted_view();
    view.set_catalog(vec![Project::new("Palm Hills", "New Cairo")
        .with_id("1")
        .with_min_price(3_000_000.0)
        .with_coordinates(30.02, 31.49)]);
    let created = view.map().surface().markers_created();

    let session = session_for(&server);
    let outcome = session.search("Cairo University").await;
    assert!(matches!(outcome, SearchOutcome::Results(ref r) if r.len() == 2));
    assert!(session.results_visible());

    let picked = session.select_result(0).unwrap();
    view.show_search_result(&picked).unwrap();

    assert_eq!(session.query(), "Cairo University");
    assert!(!session.results_visible());
    assert_eq!(view.map().viewport().center, Coordinates { lat: 30.0276, lon: 31.2101 });
    assert_eq!(view.map().viewport().zoom, 14);
    assert_eq!(view.map().search_marker().unwrap().spec.kind, MarkerKind::Search);
    assert_eq!(view.map().marker_count(), 1);
    assert_eq!(view.map().surface().markers_created(), created + 1);
}

#[tokio::test]
async fn test_empty_search_reports_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(200).json_body(json!([]));
    });

    let session = session_for(&server);
    let outcome = session.search("Atlantis").await;

    assert_eq!(outcome, SearchOutcome::NoResults);
    assert_eq!(outcome.notice(), Some(NOT_FOUND_NOTICE));
    assert!(session.select_result(0).is_none());
}

#[tokio::test]
async fn test_user_location_and_layer_switch() {
    let mut view = mounted_view();

    view.set_base_layer(BaseLayer::Satellite).unwrap();
    view.show_user_location(Coordinates { lat: 30.1, lon: 31.3 }).unwrap();

    assert_eq!(view.map().base_layer(), BaseLayer::Satellite);
    assert_eq!(view.map().surface().live_layers(), vec![BaseLayer::Satellite]);
    assert_eq!(view.map().viewport().zoom, 13);
    assert!(view.map().user_marker().is_some());

    view.clear_user_location();
    assert!(view.map().user_marker().is_none());
}
