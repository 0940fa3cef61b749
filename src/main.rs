use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use ev_trip_planner::config::{load_config, TripConfig};
use ev_trip_planner::geodesic::DistanceModel;
use ev_trip_planner::mapmyindia::MapmyIndiaClient;
use ev_trip_planner::nominatim::NominatimClient;
use ev_trip_planner::openrouteservice::OrsClient;
use ev_trip_planner::osrm::OsrmClient;
use ev_trip_planner::planner::{PlannerOptions, TripPlan, TripPlanner, TripRequest};
use ev_trip_planner::segmenter::ResetPolicy;
use ev_trip_planner::throttle::Throttled;
use ev_trip_planner::traits::Router;
use ev_trip_planner::{render, report};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RouterArg {
    Ors,
    Osrm,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MetricArg {
    Vincenty,
    Haversine,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResetArg {
    Always,
    AfterStop,
}

#[derive(Debug, Parser)]
#[command(name = "ev-trip-planner")]
#[command(about = "Plan charging stops for an EV road trip")]
struct Cli {
    /// Start city.
    #[arg(long, default_value = "Nagpur")]
    from: String,

    /// Destination city.
    #[arg(long, default_value = "Pune")]
    to: String,

    /// Rated EV range in km (100-500, step 10).
    #[arg(long, default_value_t = 250, value_parser = parse_ev_range)]
    range: u32,

    #[arg(long, value_enum, default_value_t = RouterArg::Ors)]
    router: RouterArg,

    #[arg(long, value_enum, default_value_t = MetricArg::Vincenty)]
    metric: MetricArg,

    /// Whether an empty or failed charger search resets the range budget.
    #[arg(long, value_enum, default_value_t = ResetArg::Always)]
    reset_policy: ResetArg,

    /// Where to write the HTML map.
    #[arg(long, default_value = "trip.html")]
    map: PathBuf,

    /// Also write the plan as GeoJSON.
    #[arg(long)]
    geojson: Option<PathBuf>,
}

fn parse_ev_range(raw: &str) -> Result<u32, String> {
    let range: u32 = raw
        .trim()
        .parse()
        .map_err(|e| format!("'{raw}' is not a whole number of km: {e}"))?;
    if !(100..=500).contains(&range) {
        return Err(format!("{range} km is outside 100-500 km"));
    }
    if range % 10 != 0 {
        return Err(format!("{range} km is not a multiple of 10"));
    }
    Ok(range)
}

fn build_router(cli: &Cli, config: &TripConfig) -> anyhow::Result<Box<dyn Router>> {
    Ok(match cli.router {
        RouterArg::Ors => Box::new(OrsClient::new(config.openrouteservice()?)?),
        RouterArg::Osrm => Box::new(OsrmClient::new(config.osrm())?),
    })
}

fn print_plan(plan: &TripPlan) {
    print!("{}", report::trip_header(plan));
    for point in &plan.itinerary.exhaustion_points {
        println!();
        print!("{}", report::exhaustion_point_block(point));
    }
    println!();
    print!("{}", report::stop_summary(&plan.itinerary.stops));
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config().context("loading configuration")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let geocoder = NominatimClient::new(config.nominatim())?;
    let router = build_router(&cli, &config)?;
    let directory = Throttled::new(MapmyIndiaClient::new(config.mapmyindia())?, config.lookup_interval());
    let metric = match cli.metric {
        MetricArg::Vincenty => DistanceModel::Vincenty,
        MetricArg::Haversine => DistanceModel::Haversine,
    };
    let options = PlannerOptions {
        safety_margin: config.safety_margin,
        max_run: config.max_run(),
        reset_policy: match cli.reset_policy {
            ResetArg::Always => ResetPolicy::Always,
            ResetArg::AfterStop => ResetPolicy::AfterStop,
        },
        ..PlannerOptions::default()
    };

    let request = TripRequest {
        origin: cli.from.clone(),
        destination: cli.to.clone(),
        vehicle_range_km: f64::from(cli.range),
    };
    let plan = TripPlanner::new(&geocoder, router.as_ref(), &directory, &metric)
        .with_options(options)
        .plan(&request)?;

    print_plan(&plan);

    let html = render::render_leaflet_html(plan.origin, &plan.itinerary.stops, &plan.route);
    fs::write(&cli.map, html).with_context(|| format!("writing map to {}", cli.map.display()))?;
    println!("\nMap written to {}", cli.map.display());

    if let Some(path) = &cli.geojson {
        let doc = render::render_geojson(&plan.itinerary.stops, &plan.route);
        fs::write(path, serde_json::to_string_pretty(&doc)?)
            .with_context(|| format!("writing GeoJSON to {}", path.display()))?;
        println!("GeoJSON written to {}", path.display());
    }

    Ok(())
}
