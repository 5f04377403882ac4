use gtfs_records::{Id, Stop};
use log::debug;
use rustc_hash::FxHashMap;

use crate::route_model::RouteStop;

/// Materializes each distinct stop once for the whole run
///
/// Stops are identified by their name and coordinates exactly as given, so `-16.5` and
/// `-16.50000001` are two stops. When a key is seen again the first record wins, whatever else
/// differs.
#[derive(Debug, Default)]
pub struct StopCache {
    index: FxHashMap<String, usize>,
    stops: Vec<Stop>,
    counter: u64,
}

fn stop_key(stop: &RouteStop) -> String {
    format!("{}#{}#{}", stop.stop_name, stop.stop_lat, stop.stop_lon)
}

impl StopCache {
    pub fn resolve(&mut self, stop: &RouteStop) -> &Stop {
        let key = stop_key(stop);
        let idx = match self.index.get(&key) {
            Some(&idx) => {
                debug!("Reusing {} for {}", self.stops[idx].id(), stop.stop_name);
                idx
            }
            None => {
                self.counter += 1;
                self.stops.push(Stop {
                    id: format!("stop-{}", self.counter),
                    latitude: stop.stop_lat,
                    longitude: stop.stop_lon,
                    name: stop.stop_name.clone(),
                });
                self.index.insert(key, self.stops.len() - 1);
                self.stops.len() - 1
            }
        };
        &self.stops[idx]
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// The stops in the order they were first seen
    pub fn into_stops(self) -> Vec<Stop> {
        self.stops
    }
}
