//! Query server for the dashboard map.
//!
//! Provides an HTTP API for municipality lookup by point, choropleth
//! classification, municipality and indicator listing, POI listing and
//! creation, and route summaries.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use clap::Parser;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use choromap::config::Config;
use choromap::data::{load_boundaries, load_indicators, load_pois};
use choromap::models::IndicatorTable;
use choromap::pip::{assign_pois, FeatureIndex};
use choromap::poi::CategoryStyleTable;
use choromap::routing::OrsClient;

mod handlers;
use handlers::AppState;

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Municipality lookup and choropleth query server")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides the config file)
    #[arg(short, long)]
    listen: Option<String>,

    /// Municipality boundaries GeoJSON (overrides the config file)
    #[arg(long)]
    boundaries: Option<PathBuf>,

    /// Indicator CSV (overrides the config file)
    #[arg(long)]
    indicators: Option<PathBuf>,

    /// POI GeoJSON (overrides the config file)
    #[arg(long)]
    pois: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    if args.boundaries.is_some() {
        config.data.boundaries = args.boundaries;
    }
    if args.indicators.is_some() {
        config.data.indicators = args.indicators;
    }
    if args.pois.is_some() {
        config.data.pois = args.pois;
    }

    info!("Choromap Query Server");

    let boundaries = match &config.data.boundaries {
        Some(path) => {
            info!("Loading boundaries from {:?}", path);
            load_boundaries(path, &config.data.properties)?
        }
        None => anyhow::bail!("No boundaries file configured (use --boundaries)"),
    };
    let features = Arc::new(boundaries.features);
    let index = FeatureIndex::build(Arc::clone(&features));

    let indicators = match &config.data.indicators {
        Some(path) => load_indicators(path, &config.data.code_column)?,
        None => {
            warn!("No indicators file configured; every municipality renders as no data");
            IndicatorTable::new()
        }
    };

    let mut pois = match &config.data.pois {
        Some(path) => load_pois(path)?,
        None => Vec::new(),
    };
    let matched = assign_pois(&mut pois, &features);
    info!("{} of {} POIs fall inside a municipality", matched, pois.len());

    let ors = match config.routing.api_key() {
        Some(key) => Some(OrsClient::new(&config.routing.base_url, key)?),
        None => {
            warn!("No OpenRouteService API key; /v1/route is disabled");
            None
        }
    };

    let state = Arc::new(AppState {
        index,
        indicators,
        pois: RwLock::new(pois),
        styles: CategoryStyleTable::default(),
        classifier: config.classifier.clone(),
        ors,
    });

    // Build router
    let app = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/v1/locate", get(handlers::locate_handler))
        .route("/v1/legend", get(handlers::legend_handler))
        .route("/v1/choropleth", get(handlers::choropleth_handler))
        .route("/v1/municipalities", get(handlers::municipalities_handler))
        .route("/v1/municipalities/{code}", get(handlers::municipality_handler))
        .route("/v1/indicators/{indicator}", get(handlers::indicator_handler))
        .route(
            "/v1/pois",
            get(handlers::pois_handler).post(handlers::create_poi_handler),
        )
        .route("/v1/pois/styles", get(handlers::poi_styles_handler))
        .route("/v1/route", get(handlers::route_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", config.server.listen);

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
