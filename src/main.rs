mod configuration;
mod export;
mod ingest;
mod route_model;
mod stop_cache;
mod stop_times;
mod synthesis;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::configuration::Configuration;
use crate::ingest::RouteDefaults;
use crate::synthesis::FeedSynthesizer;

#[derive(Parser, Debug)]
#[command(
    name = "shape2feed",
    version,
    about = "Synthesize a frequency based GTFS feed from route lines and stop locations"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert every route of a data directory into one feed
    Convert {
        /// Directory walked for `*.geojson` route files
        data_dir: PathBuf,

        /// Prefix of the stops file paired with each route file
        #[arg(long)]
        stops_prefix: Option<String>,

        /// JSON configuration, defaults are used for missing keys
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory receiving the csv files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Zip archive to write, `<agency_id>.zip` by default
        #[arg(short, long)]
        archive: Option<PathBuf>,

        /// Log and skip malformed routes instead of failing
        #[arg(long)]
        skip_invalid_routes: bool,
    },
    /// Print the number of rows of each table of a written feed
    Inspect {
        /// Feed directory or zip archive
        feed: PathBuf,
    },
}

struct ConvertArgs<'a> {
    data_dir: &'a Path,
    configuration: Configuration,
    output_dir: PathBuf,
    archive: PathBuf,
    skip_invalid_routes: bool,
}

fn convert(args: ConvertArgs) -> Result<()> {
    let configuration = args.configuration;
    let run_date = chrono::Local::now().date_naive();
    let defaults = RouteDefaults::from_configuration(&configuration, run_date)?;
    let mut synthesizer = FeedSynthesizer::new(
        configuration.agency.clone(),
        configuration.feed_info.clone(),
        configuration.default_speed_meter_per_second,
        run_date,
    )?;

    for source in ingest::discover(args.data_dir, &configuration.stops_prefix)? {
        info!("Reading {}", source.routes.display());
        for route in ingest::read_routes(&source, &defaults)? {
            match synthesizer.convert_route(&route) {
                Ok(_) => {}
                Err(e) if args.skip_invalid_routes => {
                    warn!("Skipping {}: {}", source.routes.display(), e)
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("in {}", source.routes.display()))
                }
            }
        }
    }
    info!("Converted {} routes", synthesizer.route_count());

    synthesizer
        .finish()
        .export(&args.output_dir, &args.archive)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Convert {
            data_dir,
            stops_prefix,
            config,
            output_dir,
            archive,
            skip_invalid_routes,
        } => {
            let mut configuration = match config {
                Some(path) => Configuration::load(&path)?,
                None => Configuration::default(),
            };
            if let Some(prefix) = stops_prefix {
                configuration.stops_prefix = prefix;
            }
            let output_dir =
                output_dir.unwrap_or_else(|| PathBuf::from(&configuration.output_dir));
            let archive = archive
                .unwrap_or_else(|| PathBuf::from(format!("{}.zip", configuration.agency.id)));

            convert(ConvertArgs {
                data_dir: &data_dir,
                configuration,
                output_dir,
                archive,
                skip_invalid_routes,
            })
        }
        Command::Inspect { feed } => {
            let feed = gtfs_records::RawFeed::from_path(&feed)
                .with_context(|| format!("impossible to read feed {}", feed.display()))?;
            feed.print_stats();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTES: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"name": "Red Line", "number": "1"},
         "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [0.02, 0.0]]}},
        {"type": "Feature", "properties": {"name": "Broken", "number": "2"},
         "geometry": {"type": "LineString", "coordinates": []}}
    ]}"#;

    const STOPS: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"name": "Central"},
         "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}},
        {"type": "Feature", "properties": {"name": "Terminal"},
         "geometry": {"type": "Point", "coordinates": [0.02, 0.0]}}
    ]}"#;

    fn run(skip_invalid_routes: bool) -> (tempfile::TempDir, Result<()>) {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir(&data_dir).unwrap();
        std::fs::write(data_dir.join("red.geojson"), ROUTES).unwrap();
        std::fs::write(data_dir.join("stops_red.geojson"), STOPS).unwrap();

        let result = convert(ConvertArgs {
            data_dir: &data_dir,
            configuration: Configuration::default(),
            output_dir: dir.path().join("out"),
            archive: dir.path().join("LaPazBus.zip"),
            skip_invalid_routes,
        });
        (dir, result)
    }

    #[test]
    fn invalid_route_fails_the_run() {
        let (dir, result) = run(false);
        assert!(result.is_err());
        assert!(!dir.path().join("LaPazBus.zip").exists());
    }

    #[test]
    fn invalid_route_is_skipped_on_demand() {
        let (dir, result) = run(true);
        result.unwrap();

        let feed = gtfs_records::RawFeed::from_path(dir.path().join("LaPazBus.zip")).unwrap();
        assert_eq!(1, feed.routes.len());
        assert_eq!("Red Line", feed.routes[0].long_name);
        assert_eq!(2, feed.stops.len());
        assert_eq!(2, feed.stop_times.len());
        assert_eq!(Some(6), feed.frequencies.map(|f| f.len()));
        // 2224 m at 5 m/s
        assert_eq!(6 * 3600 + 444, feed.stop_times[1].arrival_time);
    }
}
