//! Corridor - route generation, corridor export and flight replay.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use corridor_cli::{Config, Replay};
use corridor_core::{
    generate, load_route_csv, to_kml, write_route_csv, GeoPoint, Pattern, PatternParams, Route,
    Runway,
};

/// Route corridor tools
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the corridor polygon of each route CSV to a .kml file next to it
    Kml {
        /// Extend the polygon down to the ground
        #[arg(long)]
        extrude: bool,

        /// Route CSV files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the corridor polygon as JSON [[lat, lon, alt], ...]
    Polygon {
        /// Route CSV file
        route: PathBuf,
    },

    /// Print the route definition as JSON [[lat, lon, alt, tol], ...]
    Definition {
        /// Route CSV file
        route: PathBuf,
    },

    /// Generate a route CSV and its corridor KML for a departure pattern
    Generate {
        #[arg(value_enum)]
        pattern: PatternKind,

        /// Takeoff end of the runway as lat,lon,alt_ft
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        runway_start: GeoPoint,

        /// Far end of the runway as lat,lon,alt_ft
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        runway_end: GeoPoint,

        /// Corridor half-width on the runway in feet
        #[arg(long, default_value_t = 100.0)]
        tolerance: f64,

        /// Turn of each circuit corner in degrees, negative for left-hand
        #[arg(long, default_value_t = 90.0, allow_hyphen_values = true)]
        turn: f64,

        /// Circuit height above the runway in feet
        #[arg(long, default_value_t = 1000.0)]
        circuit_alt: f64,

        /// Ground roll length in feet
        #[arg(long, default_value_t = 1900.0)]
        ground_run: f64,

        /// Flyover leg start as lat,lon,alt_ft
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        flyover_start: Option<GeoPoint>,

        /// Flyover leg end as lat,lon,alt_ft
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        flyover_end: Option<GeoPoint>,

        /// Corridor half-width on the flyover leg in feet
        #[arg(long, default_value_t = 250.0)]
        flyover_tol: f64,

        /// Turn after the climb out before heading to the flyover leg
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        flyover_turn: f64,

        /// Output directory; files land in <out>/<name>/
        #[arg(long, default_value = "parcours")]
        out: PathBuf,

        /// Base name of the generated files, defaults to the pattern name
        #[arg(long)]
        name: Option<String>,
    },

    /// Replay recorded position polls (one JSON object per line) against a route
    Replay {
        /// Route CSV file
        route: PathBuf,

        /// Recorded polls
        polls: PathBuf,

        /// Seconds between polls
        #[arg(long)]
        poll_period: Option<f64>,

        /// Position jump in feet that starts a new flight
        #[arg(long)]
        reacquire_ft: Option<f64>,

        /// Polls after its last sample at which an entity is forgotten
        #[arg(long)]
        stale_after_polls: Option<u32>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PatternKind {
    Roll,
    Takeoff,
    Partial,
    Circuit,
    Impossible,
    Flyover,
}

impl PatternKind {
    fn name(self) -> &'static str {
        match self {
            PatternKind::Roll => "roll",
            PatternKind::Takeoff => "takeoff",
            PatternKind::Partial => "partial",
            PatternKind::Circuit => "circuit",
            PatternKind::Impossible => "impossible",
            PatternKind::Flyover => "flyover",
        }
    }
}

/// Parse `lat,lon[,alt_ft]`.
fn parse_point(value: &str) -> Result<GeoPoint, String> {
    let fields = value
        .split(',')
        .map(|field| field.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate in {value:?}: {e}"))?;
    match fields[..] {
        [lat, lon] => Ok(GeoPoint::new(lat, lon, 0.0)),
        [lat, lon, alt] => Ok(GeoPoint::new(lat, lon, alt)),
        _ => Err(format!("expected lat,lon[,alt_ft], got {value:?}")),
    }
}

fn load_route(path: &Path) -> Result<Route> {
    load_route_csv(path).with_context(|| format!("loading route {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("corridor=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Kml { extrude, files } => {
            for file in files {
                let polygon = load_route(&file)?.corridor_polygon()?;
                let kml_file = file.with_extension("kml");
                fs::write(&kml_file, to_kml(&polygon, extrude))
                    .with_context(|| format!("writing {}", kml_file.display()))?;
                tracing::info!("Wrote {}", kml_file.display());
            }
        }
        Command::Polygon { route } => {
            let polygon = load_route(&route)?.corridor_polygon()?;
            let points: Vec<[f64; 3]> = polygon
                .vertices()
                .iter()
                .map(|p| [p.lat, p.lon, p.altitude_ft])
                .collect();
            println!("{}", serde_json::to_string(&points)?);
        }
        Command::Definition { route } => {
            println!("{}", load_route(&route)?.to_definition().to_json()?);
        }
        Command::Generate {
            pattern,
            runway_start,
            runway_end,
            tolerance,
            turn,
            circuit_alt,
            ground_run,
            flyover_start,
            flyover_end,
            flyover_tol,
            flyover_turn,
            out,
            name,
        } => {
            let shape = match pattern {
                PatternKind::Roll => Pattern::Roll,
                PatternKind::Takeoff => Pattern::Takeoff,
                PatternKind::Partial => Pattern::Partial,
                PatternKind::Circuit => Pattern::Circuit,
                PatternKind::Impossible => Pattern::Impossible,
                PatternKind::Flyover => Pattern::Flyover {
                    start: flyover_start.context("flyover needs --flyover-start")?,
                    end: flyover_end.context("flyover needs --flyover-end")?,
                    tolerance_ft: flyover_tol,
                    turn_deg: flyover_turn,
                },
            };
            let params = PatternParams {
                tolerance_ft: tolerance,
                ground_run_ft: ground_run,
                circuit_altitude_ft: circuit_alt,
                turn_deg: turn,
                ..PatternParams::default()
            };
            let runway = Runway {
                start: runway_start,
                end: runway_end,
            };
            let route = generate(&runway, &shape, &params)?;

            let name = name.unwrap_or_else(|| pattern.name().to_string());
            let dir = out.join(&name);
            fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

            let csv_file = dir.join(format!("{name}.csv"));
            write_route_csv(&route, &csv_file)
                .with_context(|| format!("writing {}", csv_file.display()))?;
            let kml_file = csv_file.with_extension("kml");
            fs::write(&kml_file, to_kml(&route.corridor_polygon()?, true))
                .with_context(|| format!("writing {}", kml_file.display()))?;

            tracing::info!(
                segments = route.segment_count(),
                total_distance_ft = route.total_distance(),
                "Wrote {} and {}",
                csv_file.display(),
                kml_file.display()
            );
        }
        Command::Replay {
            route,
            polls,
            poll_period,
            reacquire_ft,
            stale_after_polls,
        } => {
            let config =
                Config::from_env().with_overrides(poll_period, reacquire_ft, stale_after_polls);
            let route = Arc::new(load_route(&route)?);
            tracing::info!(
                segments = route.segment_count(),
                total_distance_ft = route.total_distance(),
                "Replaying {}",
                polls.display()
            );

            let mut replay = Replay::new(route, config)?;
            let file =
                File::open(&polls).with_context(|| format!("opening {}", polls.display()))?;
            replay.observe_lines(BufReader::new(file))?;

            for summary in replay.finish() {
                println!("{}", serde_json::to_string(&summary)?);
            }
        }
    }

    Ok(())
}
