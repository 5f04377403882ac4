use chrono::{Duration, NaiveDate};
use gtfs_records::{
    Agency, BikesAllowedType, Calendar, CalendarDate, Exception, ExactTimes, FeedInfo, Frequency,
    Route, Shape, Stop, StopTime, Trip,
};
use log::{debug, info};
use thiserror::Error;

use crate::route_model::RouteModel;
use crate::stop_cache::StopCache;
use crate::stop_times::{build_stop_times, schedule, ServeAllStops, StopAccessPolicy};

/// Number of days covered by each calendar, starting on the run date
pub const SERVICE_WINDOW_DAYS: i64 = 31;

/// A route that cannot be turned into consistent rows
#[derive(Error, Debug, PartialEq)]
pub enum SynthesisError {
    #[error("route '{route}' has no stops")]
    NoStops { route: String },
    #[error("route '{route}' has an empty geometry")]
    EmptyGeometry { route: String },
    #[error("route '{route}': stop {sequence} has an invalid or decreasing distance")]
    UnorderedStops { route: String, sequence: usize },
    #[error("route '{route}': stop {sequence} is reached too late to be written as a time")]
    TimeOverflow { route: String, sequence: usize },
    #[error("the travel speed must be positive, got {0}")]
    InvalidSpeed(f64),
}

/// The ten tables of a feed, in the order they are written
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FeedTables {
    pub agencies: Vec<Agency>,
    pub feed_info: Vec<FeedInfo>,
    pub routes: Vec<Route>,
    pub trips: Vec<Trip>,
    pub frequencies: Vec<Frequency>,
    pub calendar: Vec<Calendar>,
    pub calendar_dates: Vec<CalendarDate>,
    pub stops: Vec<Stop>,
    pub stop_times: Vec<StopTime>,
    pub shapes: Vec<Shape>,
}

/// Accumulates the rows of every converted route for one run
///
/// Route ids (shared by the trip, the service and the shape of the route) and stop ids are
/// allocated in conversion order and never reused within the run.
pub struct FeedSynthesizer<P = ServeAllStops> {
    speed: f64,
    service_start: NaiveDate,
    policy: P,
    route_counter: u64,
    stop_cache: StopCache,
    tables: FeedTables,
}

impl FeedSynthesizer<ServeAllStops> {
    pub fn new(
        agency: Agency,
        feed_info: FeedInfo,
        speed: f64,
        service_start: NaiveDate,
    ) -> Result<Self, SynthesisError> {
        Self::with_policy(agency, feed_info, speed, service_start, ServeAllStops)
    }
}

impl<P: StopAccessPolicy> FeedSynthesizer<P> {
    pub fn with_policy(
        agency: Agency,
        feed_info: FeedInfo,
        speed: f64,
        service_start: NaiveDate,
        policy: P,
    ) -> Result<Self, SynthesisError> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(SynthesisError::InvalidSpeed(speed));
        }
        Ok(Self {
            speed,
            service_start,
            policy,
            route_counter: 0,
            stop_cache: StopCache::default(),
            tables: FeedTables {
                agencies: vec![agency],
                feed_info: vec![feed_info],
                ..Default::default()
            },
        })
    }

    /// Appends the rows of `route` and returns the id given to its route, trip, service and shape
    ///
    /// Nothing is appended and no id is consumed when the route is rejected.
    pub fn convert_route(&mut self, route: &RouteModel) -> Result<String, SynthesisError> {
        let times = validate(route, self.speed)?;

        self.route_counter += 1;
        let id = self.route_counter.to_string();
        debug!("Converting route {} as {}", route.name, id);

        self.tables.routes.push(Route {
            agency_id: route.agency_id.clone(),
            id: id.clone(),
            long_name: route.name.clone(),
            route_type: route.route_type,
            url: route.url.clone(),
            short_name: route.number.clone(),
        });
        self.tables.calendar.push(Calendar::from_weekdays(
            id.clone(),
            self.service_start,
            self.service_start + Duration::days(SERVICE_WINDOW_DAYS),
            route.weekdays,
        ));
        if !route.runs_regularly {
            self.tables.calendar_dates.push(CalendarDate {
                service_id: id.clone(),
                date: route.start_date,
                exception_type: Exception::Added,
            });
        }
        self.tables.trips.push(Trip {
            route_id: id.clone(),
            id: id.clone(),
            service_id: id.clone(),
            shape_id: id.clone(),
            headsign: route.headsign().unwrap_or_default().to_owned(),
            bikes_allowed: BikesAllowedType::NoBikesAllowed,
        });

        let stop_times = build_stop_times(
            &id,
            route,
            &times,
            &mut self.stop_cache,
            &self.policy,
        );
        self.tables.stop_times.extend(stop_times);

        self.tables
            .frequencies
            .extend(route.frequencies.iter().map(|band| Frequency {
                trip_id: id.clone(),
                start_time: band.start_time,
                end_time: band.end_time,
                headway_secs: band.headway_secs,
                exact_times: ExactTimes::FrequencyBased,
            }));

        self.tables
            .shapes
            .extend(route.geometry.points().enumerate().map(|(i, point)| Shape {
                id: id.clone(),
                latitude: point.y(),
                longitude: point.x(),
                sequence: i + 1,
            }));

        debug!("{} distinct stops after route {}", self.stop_cache.len(), id);
        Ok(id)
    }

    /// Number of routes converted so far
    pub fn route_count(&self) -> u64 {
        self.route_counter
    }

    /// Ends the run and hands over every table
    pub fn finish(self) -> FeedTables {
        let mut tables = self.tables;
        tables.stops = self.stop_cache.into_stops();
        info!(
            "Synthesized {} routes, {} stops, {} stop times",
            tables.routes.len(),
            tables.stops.len(),
            tables.stop_times.len()
        );
        tables
    }
}

/// Checks `route` and returns the passing time at each of its stops
fn validate(route: &RouteModel, speed: f64) -> Result<Vec<u32>, SynthesisError> {
    if route.stops.is_empty() {
        return Err(SynthesisError::NoStops {
            route: route.name.clone(),
        });
    }
    if route.geometry.0.is_empty() {
        return Err(SynthesisError::EmptyGeometry {
            route: route.name.clone(),
        });
    }
    let mut previous = 0.0;
    for (i, stop) in route.stops.iter().enumerate() {
        if !stop.distance.is_finite() || stop.distance < previous {
            return Err(SynthesisError::UnorderedStops {
                route: route.name.clone(),
                sequence: i + 1,
            });
        }
        previous = stop.distance;
    }
    schedule(route, speed).map_err(|i| SynthesisError::TimeOverflow {
        route: route.name.clone(),
        sequence: i + 1,
    })
}
