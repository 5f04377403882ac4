use chrono::{NaiveDate, NaiveTime};
use geo_types::LineString;
use gtfs_records::RouteType;

/// A stop as seen from one route: where it is and how far along the route line it lies
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStop {
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
    /// Cumulative distance from the start of the route, in metres
    pub distance: f64,
}

/// Headway of the route during one time band, times in seconds since the start of the service day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyBand {
    pub start_time: u32,
    pub end_time: u32,
    pub headway_secs: u32,
}

/// Everything the synthesizer needs to know about one transit route
#[derive(Debug, Clone)]
pub struct RouteModel {
    pub name: String,
    pub number: String,
    pub agency_id: String,
    pub url: Option<String>,
    /// Ordered by ascending distance along the route
    pub stops: Vec<RouteStop>,
    /// Geographic polyline, x is the longitude and y the latitude
    pub geometry: LineString<f64>,
    /// Monday first
    pub weekdays: [bool; 7],
    pub runs_regularly: bool,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub frequencies: Vec<FrequencyBand>,
    pub route_type: RouteType,
}

impl RouteModel {
    /// Name of the last stop, shown on the vehicle
    pub fn headsign(&self) -> Option<&str> {
        self.stops.last().map(|s| s.stop_name.as_str())
    }

    /// Distance from the first to the last stop
    pub fn total_distance(&self) -> f64 {
        self.stops.last().map(|s| s.distance).unwrap_or_default()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use geo_types::line_string;

    pub fn stop(name: &str, lat: f64, lon: f64, distance: f64) -> RouteStop {
        RouteStop {
            stop_name: name.to_owned(),
            stop_lat: lat,
            stop_lon: lon,
            distance,
        }
    }

    pub fn route(name: &str, stops: Vec<RouteStop>) -> RouteModel {
        RouteModel {
            name: name.to_owned(),
            number: "1".to_owned(),
            agency_id: "LaPazBus".to_owned(),
            url: None,
            stops,
            geometry: line_string![
                (x: -68.150, y: -16.500),
                (x: -68.145, y: -16.502),
                (x: -68.140, y: -16.505),
            ],
            weekdays: [true; 7],
            runs_regularly: true,
            start_date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            start_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            frequencies: vec![],
            route_type: RouteType::Extended(700),
        }
    }

    pub fn red_line() -> RouteModel {
        route(
            "Red Line",
            vec![
                stop("Central", -16.500, -68.150, 0.0),
                stop("Market", -16.502, -68.145, 500.0),
                stop("Terminal", -16.505, -68.140, 1200.0),
            ],
        )
    }
}
