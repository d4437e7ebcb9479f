//! Command-line inspection of boundary and indicator data.
//!
//! Runs the same lookups and classifications as the query server and
//! prints the results as JSON.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use choromap::classify::{choropleth, format_indicator_value, ClassifierConfig, PaletteName};
use choromap::config::Config;
use choromap::data::{load_boundaries, load_indicators, load_pois};
use choromap::models::{FeatureCollection, GeoPoint, Indicator, IndicatorTable};
use choromap::pip::{assign_points, assign_pois, FeatureIndex};
use choromap::routing::{OrsClient, RouteProfile, RouteSummary};

#[derive(Parser, Debug)]
#[command(name = "inspect")]
#[command(about = "Inspect municipality boundaries, indicators and POIs")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Municipality boundaries GeoJSON (overrides the config file)
    #[arg(long)]
    boundaries: Option<PathBuf>,

    /// Indicator CSV (overrides the config file)
    #[arg(long)]
    indicators: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the municipality containing a point
    Locate {
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
    },
    /// Assign every row of a CSV with lon/lat columns to a municipality
    Points {
        file: PathBuf,
    },
    /// Count POIs per municipality
    Pois {
        file: PathBuf,
    },
    /// Print the legend and per-municipality colors for an indicator
    Legend {
        #[arg(short, long)]
        indicator: String,
        #[arg(long)]
        classes: Option<usize>,
        #[arg(long)]
        palette: Option<PaletteName>,
        /// Also print the color of every municipality
        #[arg(long)]
        colors: bool,
    },
    /// Route summary between two points via OpenRouteService
    Route {
        #[arg(long, required = true, num_args = 2, value_names = ["LON", "LAT"], allow_hyphen_values = true)]
        from: Vec<f64>,
        #[arg(long, required = true, num_args = 2, value_names = ["LON", "LAT"], allow_hyphen_values = true)]
        to: Vec<f64>,
        #[arg(long)]
        driving: bool,
    },
}

#[derive(Debug, Deserialize)]
struct PointRow {
    lon: f64,
    lat: f64,
}

#[derive(Serialize)]
struct PointAssignment {
    lon: f64,
    lat: f64,
    code: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if args.boundaries.is_some() {
        config.data.boundaries = args.boundaries.clone();
    }
    if args.indicators.is_some() {
        config.data.indicators = args.indicators.clone();
    }

    match args.command {
        Command::Locate { lon, lat } => {
            let boundaries = boundaries(&config)?;
            let indicators = indicators(&config)?;
            let point = GeoPoint::new(lon, lat);

            let output = match choromap::locate(point, &boundaries.features) {
                Some(feature) => {
                    let values: BTreeMap<String, String> = Indicator::known()
                        .iter()
                        .map(|indicator| {
                            let value = indicators.value(&feature.code, indicator);
                            (
                                indicator.key().to_string(),
                                format_indicator_value(&value, indicator, config.classifier.locale),
                            )
                        })
                        .collect();
                    serde_json::json!({
                        "code": feature.code,
                        "name": feature.name,
                        "indicators": values,
                    })
                }
                None => serde_json::Value::Null,
            };
            print_json(&output)?;
        }
        Command::Points { file } => {
            let boundaries = boundaries(&config)?;
            let points = read_points(&file)?;
            let index = FeatureIndex::build(std::sync::Arc::new(boundaries.features));

            let locations: Vec<GeoPoint> =
                points.iter().map(|p| GeoPoint::new(p.lon, p.lat)).collect();
            let codes = assign_points(&locations, index.features());

            let assigned = codes.iter().filter(|c| c.is_some()).count();
            info!("{} of {} points inside a municipality", assigned, points.len());

            let output: Vec<PointAssignment> = points
                .into_iter()
                .zip(codes)
                .map(|(p, code)| PointAssignment {
                    lon: p.lon,
                    lat: p.lat,
                    code,
                })
                .collect();
            print_json(&output)?;
        }
        Command::Pois { file } => {
            let boundaries = boundaries(&config)?;
            let mut pois = load_pois(&file)?;
            let matched = assign_pois(&mut pois, &boundaries.features);
            info!("{} of {} POIs inside a municipality", matched, pois.len());

            let mut counts: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
            for poi in &pois {
                let code = poi.municipality_code.as_deref().unwrap_or("outside");
                *counts
                    .entry(code.to_string())
                    .or_default()
                    .entry(poi.category.clone())
                    .or_default() += 1;
            }
            print_json(&counts)?;
        }
        Command::Legend {
            indicator,
            classes,
            palette,
            colors,
        } => {
            let boundaries = boundaries(&config)?;
            let indicators = indicators(&config)?;
            let indicator = Indicator::from_key(&indicator);

            let mut classifier: ClassifierConfig = config.classifier.clone();
            if let Some(classes) = classes {
                classifier.classes = classes;
            }
            if palette.is_some() {
                classifier.palette = palette;
            }

            let result = choropleth(&boundaries.features, &indicators, &indicator, &classifier);
            let colorizer = &result.colorizer;
            let mut output = serde_json::json!({
                "indicator": indicator,
                "method": colorizer.method(),
                "classes": colorizer.class_count(),
                "breaks": colorizer.breaks(),
                "legend": colorizer.legend(),
            });
            if colors {
                output["features"] = serde_json::to_value(&result.colors)?;
            }
            print_json(&output)?;
        }
        Command::Route { from, to, driving } => {
            let key = config
                .routing
                .api_key()
                .context("No OpenRouteService API key (set ORS_API_KEY or [routing].api_key)")?;
            let client = OrsClient::new(&config.routing.base_url, key)?;
            let profile = if driving {
                RouteProfile::DrivingCar
            } else {
                RouteProfile::FootWalking
            };

            let route = client
                .fetch_route(
                    profile,
                    GeoPoint::new(from[0], from[1]),
                    GeoPoint::new(to[0], to[1]),
                )
                .await?;
            let summary = match route.distance_m {
                Some(d) => RouteSummary::from_distance(d),
                None => RouteSummary::from_line(&route.line),
            };
            print_json(&summary)?;
        }
    }

    Ok(())
}

fn boundaries(config: &Config) -> Result<FeatureCollection> {
    let path = config
        .data
        .boundaries
        .as_ref()
        .context("No boundaries file configured (use --boundaries)")?;
    load_boundaries(path, &config.data.properties)
}

fn indicators(config: &Config) -> Result<IndicatorTable> {
    match &config.data.indicators {
        Some(path) => load_indicators(path, &config.data.code_column),
        None => Ok(IndicatorTable::new()),
    }
}

fn read_points(path: &Path) -> Result<Vec<PointRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open points file: {:?}", path))?;
    rdr.deserialize()
        .collect::<Result<Vec<PointRow>, _>>()
        .with_context(|| format!("Failed to parse points file: {:?}", path))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
