use anyhow::Context;
use clap::Parser;
use project_atlas::adapters::{
    ChannelAgentSink, HeadlessMap, HttpCatalogSource, HttpProfileSource, NominatimGeocoder,
};
use project_atlas::utils::error::{AtlasError, ErrorSeverity};
use project_atlas::utils::format::{price_label, project_count_label};
use project_atlas::utils::{logger, validation::Validate};
use project_atlas::{
    AtlasView, CliConfig, MapController, SearchOutcome, SearchSession, SelectionBridge,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting project-atlas CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(err) = run(cli).await {
        let exit_code = match err.downcast_ref::<AtlasError>() {
            Some(e) => {
                tracing::error!(
                    "❌ {:#} (Category: {:?}, Severity: {:?})",
                    err,
                    e.category(),
                    e.severity()
                );
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

                match e.severity() {
                    ErrorSeverity::Low => 0,
                    ErrorSeverity::Medium => 2,
                    ErrorSeverity::High => 1,
                    ErrorSeverity::Critical => 3,
                }
            }
            None => {
                tracing::error!("❌ {:#}", err);
                eprintln!("❌ {:#}", err);
                1
            }
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: CliConfig) -> anyhow::Result<()> {
    cli.validate().context("Invalid command-line arguments")?;
    let config = cli.atlas_config().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    let settings = config.map_settings()?;

    let profile = match cli.inline_profile() {
        Some(profile) => Some(profile),
        None => match &cli.email {
            Some(email) => HttpProfileSource::new(&config)?.fetch_or_none(email).await,
            None => None,
        },
    };
    if let Some(profile) = &profile {
        tracing::info!(
            "Using profile: locations={:?}, budget={:?}",
            profile.preferred_locations,
            profile.average_budget
        );
    }

    let (sink, mut agent_events) = ChannelAgentSink::new();
    let map = MapController::new(HeadlessMap::new(), settings);
    let mut view = AtlasView::new(map, SelectionBridge::new(sink));
    view.mount()?;

    view.set_profile(profile);
    view.set_manual_filters(cli.manual_filters());

    let catalog = HttpCatalogSource::new(&config)?;
    let report = view.load_catalog(&catalog).await;
    tracing::debug!("Marker reconciliation: {:?}", report.reconcile);

    println!("🏠 {}", project_count_label(report.visible));
    match view.empty_state() {
        Some(notice) => println!("   {}", notice),
        None => {
            for (position, project) in view.visible_projects().iter().enumerate() {
                let price = project
                    .price
                    .as_ref()
                    .map(price_label)
                    .unwrap_or_else(|| "Price on request".to_string());
                let pin = if project.coordinates.is_some() { "📍" } else { "  " };
                println!(
                    "{:>3}. {} {} | {} | {}",
                    position + 1,
                    pin,
                    project.name,
                    project.location,
                    price
                );
            }
        }
    }

    if let Some(target) = &cli.select {
        let position = view
            .visible_projects()
            .iter()
            .position(|p| p.marker_key().0 == *target || p.name == *target);
        match position.and_then(|i| view.select_visible(i)) {
            Some(project) => println!("👉 Selected: {}", project.name),
            None => println!("⚠️  No visible project matches '{}'", target),
        }
        if cli.ask_agent && !view.ask_agent_about_selection() {
            tracing::warn!("Nothing selected, agent not notified");
        }
    }

    if let Some(query) = &cli.search {
        let session = SearchSession::new(NominatimGeocoder::new(&config)?);
        match session.search(query).await {
            SearchOutcome::Results(results) => {
                for (i, result) in results.iter().enumerate() {
                    println!("🔎 [{}] {}", i, result.display_name);
                }
                match session.select_result(cli.pick) {
                    Some(result) => {
                        view.show_search_result(&result)?;
                        println!("🔎 Centered on: {}", session.query());
                    }
                    None => println!("⚠️  No search result at position {}", cli.pick),
                }
            }
            outcome => {
                if let Some(notice) = outcome.notice() {
                    println!("🔎 {}", notice);
                }
            }
        }
    }

    let map = view.map();
    let viewport = map.viewport();
    println!(
        "🗺️  {} markers on {} | center {:.4}, {:.4} @ zoom {}",
        map.marker_count(),
        map.base_layer().display_name(),
        viewport.center.lat,
        viewport.center.lon,
        viewport.zoom
    );

    view.unmount();
    drop(view);

    while let Ok(event) = agent_events.try_recv() {
        tracing::info!(
            "Agent asked about '{}' at {}",
            event.project.name,
            event.requested_at.to_rfc3339()
        );
        println!("🤖 Agent focus: {}", event.project.name);
    }

    Ok(())
}
