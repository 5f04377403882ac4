use chrono::{Duration, NaiveTime, Timelike};
use gtfs_records::{Id, PickupDropOffType, StopTime, TimepointType};

use crate::route_model::{RouteModel, RouteStop};
use crate::stop_cache::StopCache;

/// Decides whether riders may board or alight at the stops between the first and the last one
pub trait StopAccessPolicy {
    fn is_pickup_stop(&self, stop: &RouteStop, total_distance: f64) -> bool;
    fn is_dropoff_stop(&self, stop: &RouteStop, total_distance: f64) -> bool;
}

/// Every intermediate stop is served in both directions
#[derive(Debug, Default, Clone, Copy)]
pub struct ServeAllStops;

impl StopAccessPolicy for ServeAllStops {
    fn is_pickup_stop(&self, _stop: &RouteStop, _total_distance: f64) -> bool {
        true
    }

    fn is_dropoff_stop(&self, _stop: &RouteStop, _total_distance: f64) -> bool {
        true
    }
}

/// Time needed to cover `distance` metres at `speed` metres per second, to the millisecond
pub fn travel_time(distance: f64, speed: f64) -> Duration {
    Duration::milliseconds((distance / speed * 1000.0) as i64)
}

/// Seconds since the start of the service day, `travel` after `start`. Never wraps at midnight.
///
/// `None` when the result does not fit the `u32` seconds of a GTFS time.
pub fn offset_time(start: NaiveTime, travel: Duration) -> Option<u32> {
    let start = Duration::seconds(i64::from(start.num_seconds_from_midnight()));
    let time = start.checked_add(&travel)?;
    u32::try_from(time.num_seconds()).ok()
}

/// Passing time at each stop of `route`, in stop order
///
/// On failure the index of the first stop whose time cannot be represented is returned.
pub fn schedule(route: &RouteModel, speed: f64) -> Result<Vec<u32>, usize> {
    route
        .stops
        .iter()
        .enumerate()
        .map(|(i, stop)| {
            let travel = if i == 0 {
                Duration::zero()
            } else {
                travel_time(stop.distance, speed)
            };
            offset_time(route.start_time, travel).ok_or(i)
        })
        .collect()
}

/// One row per stop of `route`, in order, with stops resolved through `cache`
///
/// `times` comes from [schedule]. The first stop only boards and the last one only alights. A
/// route with a single stop is treated as its first stop.
pub fn build_stop_times<P: StopAccessPolicy + ?Sized>(
    trip_id: &str,
    route: &RouteModel,
    times: &[u32],
    cache: &mut StopCache,
    policy: &P,
) -> Vec<StopTime> {
    let number_of_stops = route.stops.len();
    let total_distance = route.total_distance();

    route
        .stops
        .iter()
        .zip(times)
        .enumerate()
        .map(|(i, (current_stop, &time))| {
            let (pickup_type, drop_off_type) = if i == 0 {
                (PickupDropOffType::Regular, PickupDropOffType::NotAvailable)
            } else if i == number_of_stops - 1 {
                (PickupDropOffType::NotAvailable, PickupDropOffType::Regular)
            } else {
                (
                    PickupDropOffType::served(policy.is_pickup_stop(current_stop, total_distance)),
                    PickupDropOffType::served(
                        policy.is_dropoff_stop(current_stop, total_distance),
                    ),
                )
            };
            let stop = cache.resolve(current_stop);

            StopTime {
                trip_id: trip_id.to_owned(),
                arrival_time: time,
                departure_time: time,
                stop_id: stop.id().to_owned(),
                stop_sequence: i as u32 + 1,
                pickup_type,
                drop_off_type,
                timepoint: TimepointType::Approximate,
            }
        })
        .collect()
}
