use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use geo::{Closest, ClosestPoint, Distance, Haversine};
use geo_types::{Coord, LineString, Point};
use geojson::{Feature, GeoJson};
use gtfs_records::RouteType;
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::configuration::Configuration;
use crate::route_model::{FrequencyBand, RouteModel, RouteStop};

/// A route file and the stops file it is paired with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSource {
    pub routes: PathBuf,
    pub stops: PathBuf,
}

/// Values every ingested route gets from the configuration
#[derive(Debug, Clone)]
pub struct RouteDefaults {
    pub agency_id: String,
    pub weekdays: [bool; 7],
    pub runs_regularly: bool,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub frequencies: Vec<FrequencyBand>,
    pub route_type: RouteType,
}

impl RouteDefaults {
    pub fn from_configuration(configuration: &Configuration, run_date: NaiveDate) -> Result<Self> {
        Ok(Self {
            agency_id: configuration.agency.id.clone(),
            weekdays: configuration.weekdays,
            runs_regularly: configuration.runs_regularly,
            start_date: run_date,
            start_time: configuration.service_start_time()?,
            frequencies: configuration.frequency_bands()?,
            route_type: configuration.route_type(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct NamedStop {
    name: String,
    location: Point<f64>,
}

/// Finds every `*.geojson` route file under `data_dir`, in a stable order
///
/// Files whose name starts with `stops_prefix` hold stops and are never routes.
pub fn discover(data_dir: &Path, stops_prefix: &str) -> Result<Vec<RouteSource>> {
    let mut sources = vec![];
    walk(data_dir, stops_prefix, &mut sources)?;
    info!(
        "Found {} route files in {}",
        sources.len(),
        data_dir.display()
    );
    Ok(sources)
}

fn walk(dir: &Path, stops_prefix: &str, sources: &mut Vec<RouteSource>) -> Result<()> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("impossible to read directory {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()
        .with_context(|| format!("impossible to read directory {}", dir.display()))?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            walk(&path, stops_prefix, sources)?;
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|f| f.to_str()) else {
            continue;
        };
        if !file_name.ends_with(".geojson") || file_name.starts_with(stops_prefix) {
            continue;
        }
        sources.push(RouteSource {
            stops: dir.join(format!("{stops_prefix}{file_name}")),
            routes: path,
        });
    }
    Ok(())
}

fn read_features(path: &Path) -> Result<Vec<Feature>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("impossible to read {}", path.display()))?;
    let geojson: GeoJson = content
        .parse()
        .with_context(|| format!("invalid GeoJSON in {}", path.display()))?;
    Ok(match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => bail!("{} holds a bare geometry", path.display()),
    })
}

fn string_property(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn position_to_coord(position: &[f64]) -> Result<Coord<f64>> {
    match position {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => bail!("position with less than two coordinates"),
    }
}

fn read_stops(path: &Path) -> Result<Vec<NamedStop>> {
    read_features(path)?
        .iter()
        .enumerate()
        .map(|(i, feature)| -> Result<NamedStop> {
            let name = string_property(feature, "name")
                .with_context(|| format!("stop {} of {} has no name", i, path.display()))?;
            let location = match feature.geometry.as_ref().map(|g| &g.value) {
                Some(geojson::Value::Point(position)) => Point::from(position_to_coord(position)?),
                _ => bail!("stop {} of {} is not a point", name, path.display()),
            };
            Ok(NamedStop { name, location })
        })
        .collect()
}

/// Length of the line on the earth surface, in metres
pub fn line_length(line: &LineString<f64>) -> f64 {
    line.lines()
        .map(|segment| Haversine.distance(segment.start_point(), segment.end_point()))
        .sum()
}

/// Distance in metres from the start of `line` to the point of `line` closest to `point`
///
/// The closest segment is found in degrees, the distance along the line is summed on the earth
/// surface segment by segment.
pub fn distance_along(line: &LineString<f64>, point: &Point<f64>) -> f64 {
    let mut travelled = 0.0;
    let mut best: Option<(f64, f64)> = None;
    for segment in line.lines() {
        let projected = match segment.closest_point(point) {
            Closest::Intersection(p) | Closest::SinglePoint(p) => p,
            Closest::Indeterminate => segment.start_point(),
        };
        let offset = Haversine.distance(*point, projected);
        if best.map_or(true, |(best_offset, _)| offset < best_offset) {
            best = Some((
                offset,
                travelled + Haversine.distance(segment.start_point(), projected),
            ));
        }
        travelled += Haversine.distance(segment.start_point(), segment.end_point());
    }
    best.map(|(_, along)| along).unwrap_or_default()
}

/// Projects every stop on `line` and orders them along it
fn locate_stops(line: &LineString<f64>, stops: &[NamedStop]) -> Vec<RouteStop> {
    let mut located: Vec<RouteStop> = stops
        .iter()
        .map(|stop| RouteStop {
            stop_name: stop.name.clone(),
            stop_lat: stop.location.y(),
            stop_lon: stop.location.x(),
            distance: distance_along(line, &stop.location),
        })
        .collect();
    located.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    located
}

/// Builds one route per line feature of `source`, every stop of the paired file on each of them
pub fn read_routes(source: &RouteSource, defaults: &RouteDefaults) -> Result<Vec<RouteModel>> {
    let stops = read_stops(&source.stops)?;
    debug!("{} stops in {}", stops.len(), source.stops.display());

    read_features(&source.routes)?
        .iter()
        .enumerate()
        .map(|(i, feature)| -> Result<RouteModel> {
            let path = source.routes.display();
            let name = string_property(feature, "name")
                .with_context(|| format!("route {} of {} has no name", i, path))?;
            let geometry = match feature.geometry.as_ref().map(|g| &g.value) {
                Some(geojson::Value::LineString(positions)) => positions
                    .iter()
                    .map(|p| position_to_coord(p))
                    .collect::<Result<LineString<f64>>>()
                    .with_context(|| format!("route {} of {}", name, path))?,
                _ => bail!("route {} of {} is not a line string", name, path),
            };

            Ok(RouteModel {
                number: string_property(feature, "number").unwrap_or_default(),
                agency_id: defaults.agency_id.clone(),
                url: None,
                stops: locate_stops(&geometry, &stops),
                geometry,
                weekdays: defaults.weekdays,
                runs_regularly: defaults.runs_regularly,
                start_date: defaults.start_date,
                start_time: defaults.start_time,
                frequencies: defaults.frequencies.clone(),
                route_type: defaults.route_type,
                name,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::line_string;

    const ROUTES: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"name": "Red Line", "number": 12},
            "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [0.01, 0.0], [0.02, 0.0]]}
        }]
    }"#;

    const STOPS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"name": "Terminal"},
             "geometry": {"type": "Point", "coordinates": [0.02, 0.0001]}},
            {"type": "Feature", "properties": {"name": "Central"},
             "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}},
            {"type": "Feature", "properties": {"name": "Market"},
             "geometry": {"type": "Point", "coordinates": [0.005, -0.0001]}}
        ]
    }"#;

    fn defaults() -> RouteDefaults {
        RouteDefaults::from_configuration(
            &Configuration::default(),
            NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn discovery_skips_stop_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("b_district");
        std::fs::create_dir(&nested).unwrap();
        for path in [
            dir.path().join("red.geojson"),
            dir.path().join("stops_red.geojson"),
            dir.path().join("notes.txt"),
            nested.join("blue.geojson"),
            nested.join("stops_blue.geojson"),
            dir.path().join("a.geojson"),
        ] {
            std::fs::write(path, "{}").unwrap();
        }

        let sources = discover(dir.path(), "stops_").unwrap();
        assert_eq!(
            vec![
                RouteSource {
                    routes: dir.path().join("a.geojson"),
                    stops: dir.path().join("stops_a.geojson"),
                },
                RouteSource {
                    routes: nested.join("blue.geojson"),
                    stops: nested.join("stops_blue.geojson"),
                },
                RouteSource {
                    routes: dir.path().join("red.geojson"),
                    stops: dir.path().join("stops_red.geojson"),
                },
            ],
            sources
        );
    }

    #[test]
    fn stops_are_ordered_along_the_line() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("red.geojson"), ROUTES).unwrap();
        std::fs::write(dir.path().join("stops_red.geojson"), STOPS).unwrap();

        let sources = discover(dir.path(), "stops_").unwrap();
        let routes = read_routes(&sources[0], &defaults()).unwrap();
        assert_eq!(1, routes.len());

        let route = &routes[0];
        assert_eq!("Red Line", route.name);
        assert_eq!("12", route.number);
        assert_eq!("LaPazBus", route.agency_id);
        assert_eq!(RouteType::Extended(700), route.route_type);
        assert_eq!(6, route.frequencies.len());
        assert_eq!(3, route.geometry.0.len());

        let names: Vec<&str> = route.stops.iter().map(|s| s.stop_name.as_str()).collect();
        assert_eq!(vec!["Central", "Market", "Terminal"], names);
        assert_eq!(0.0, route.stops[0].distance);
        // 0.02 degrees of longitude on the equator
        assert!((route.stops[2].distance - 2224.0).abs() < 5.0);
        assert!((route.stops[1].distance - 556.0).abs() < 5.0);
        assert_eq!(0.0001, route.stops[2].stop_lat);
    }

    #[test]
    fn missing_stops_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("red.geojson"), ROUTES).unwrap();

        let sources = discover(dir.path(), "stops_").unwrap();
        let error = read_routes(&sources[0], &defaults()).unwrap_err();
        assert!(format!("{error}").contains("stops_red.geojson"));
    }

    #[test]
    fn non_line_route_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("red.geojson"), STOPS.replace("Terminal", "T")).unwrap();
        std::fs::write(dir.path().join("stops_red.geojson"), STOPS).unwrap();

        let sources = discover(dir.path(), "stops_").unwrap();
        assert!(read_routes(&sources[0], &defaults()).is_err());
    }

    #[test]
    fn distance_follows_a_bent_line() {
        let line = line_string![(x: 0.0, y: 60.0), (x: 0.0, y: 61.0), (x: 1.0, y: 61.0)];
        let corner = Point::new(0.0, 61.0);
        let first_leg: f64 = Haversine.distance(Point::new(0.0, 60.0), corner);
        assert!((first_leg - 111_195.0).abs() < 1.0, "{first_leg}");

        assert!((distance_along(&line, &corner) - first_leg).abs() < 1e-6);
        assert_eq!(0.0, distance_along(&line, &Point::new(-0.1, 59.9)));

        let halfway = Point::new(0.5, 61.0);
        let expected = first_leg + Haversine.distance(corner, halfway);
        assert!((distance_along(&line, &halfway) - expected).abs() < 1.0);

        let beyond = Point::new(1.2, 61.0);
        assert!((distance_along(&line, &beyond) - line_length(&line)).abs() < 1e-6);
        assert_eq!(0.0, distance_along(&LineString::new(vec![]), &corner));
    }

    #[test]
    fn length_on_earth() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 1.0), (x: 1.0, y: 1.0)];
        let length = line_length(&line);
        assert!((length - 222_370.0).abs() < 100.0, "{length}");
        assert_eq!(0.0, line_length(&LineString::new(vec![])));
    }
}
