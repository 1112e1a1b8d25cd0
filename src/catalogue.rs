//! Entity store: stops, buses, and the symmetric(-ish) distance memo.
//!
//! `stops_`/`buses_` are kept in name order (`BTreeMap`, not `HashMap`)
//! because iteration order over both is load-bearing for the renderer's
//! colour cycling and the graph builder's deterministic tie-breaks.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use geo_types::Point;

use crate::geo_util::haversine_distance;
use crate::route::Route;

/// A named geographic stop.
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub name: String,
    /// `(longitude, latitude)`, matching `geo_types::Point`'s `x`/`y` order.
    pub location: Point<f64>,
}

/// A named bus line, owning its route.
#[derive(Clone, Debug)]
pub struct Bus {
    pub number: String,
    pub route: Route,
}

/// Stop/bus catalogue plus the directional distance memo that couples them.
///
/// `add_stop`/`add_bus` are the only mutators during ingestion. After
/// `Document::build_routes` runs (see [`crate::document`]), every pair this
/// crate will ever need `distance()` for has already been written by
/// `distance_or_insert`, so plain `distance()` reads during the query phase
/// never need to mutate the memo.
#[derive(Clone, Debug, Default)]
pub struct Catalogue {
    stops: BTreeMap<String, Stop>,
    buses: BTreeMap<String, Bus>,
    stop_buses: BTreeMap<String, BTreeSet<String>>,
    distance_memo: HashMap<(String, String), f64>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts a stop's location and records any per-neighbour road
    /// distances. A neighbour not yet known is inserted with a zero
    /// location, to be corrected by its own later `add_stop` call.
    pub fn add_stop(&mut self, name: &str, location: Point<f64>, distances: &[(String, f64)]) {
        self.ensure_stop(name, Some(location));

        for (neighbour, meters) in distances {
            self.ensure_stop(neighbour, None);
            self.distance_memo
                .insert((name.to_string(), neighbour.clone()), *meters);
            self.distance_memo
                .entry((neighbour.clone(), name.to_string()))
                .or_insert(*meters);
        }
    }

    fn ensure_stop(&mut self, name: &str, location: Option<Point<f64>>) {
        match self.stops.get_mut(name) {
            Some(existing) => {
                if let Some(loc) = location {
                    existing.location = loc;
                }
            }
            None => {
                self.stops.insert(
                    name.to_string(),
                    Stop {
                        name: name.to_string(),
                        location: location.unwrap_or_else(|| Point::new(0.0, 0.0)),
                    },
                );
                self.stop_buses.entry(name.to_string()).or_default();
            }
        }
    }

    /// Registers a bus and back-fills the reverse `stop -> buses` index.
    pub fn add_bus(&mut self, number: &str, route: Route) {
        for stop in route.unique_stops() {
            self.stop_buses
                .entry(stop.clone())
                .or_default()
                .insert(number.to_string());
        }
        self.buses.insert(
            number.to_string(),
            Bus {
                number: number.to_string(),
                route,
            },
        );
    }

    pub fn stop(&self, name: &str) -> Option<&Stop> {
        self.stops.get(name)
    }

    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.stops.values()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn bus(&self, number: &str) -> Option<&Bus> {
        self.buses.get(number)
    }

    pub fn buses(&self) -> impl Iterator<Item = &Bus> {
        self.buses.values()
    }

    pub fn get_bus_route(&self, number: &str) -> Option<&Route> {
        self.buses.get(number).map(|b| &b.route)
    }

    /// Distinguishes "stop unknown" (`None`) from "known stop, no buses"
    /// (`Some(empty set)`).
    pub fn get_stop_buses(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.stop_buses.get(name)
    }

    /// Great-circle distance between two stops' stored locations. Unknown
    /// stops yield 0.
    pub fn line_distance(&self, a: &str, b: &str) -> f64 {
        match (self.stops.get(a), self.stops.get(b)) {
            (Some(sa), Some(sb)) => haversine_distance(sa.location, sb.location),
            _ => 0.0,
        }
    }

    /// Memo lookup with fallback to great-circle distance. Does not mutate
    /// the memo (see `distance_or_insert` for the ingestion-time variant
    /// that does).
    pub fn distance(&self, a: &str, b: &str) -> f64 {
        if let Some(&d) = self.distance_memo.get(&(a.to_string(), b.to_string())) {
            return d;
        }
        self.line_distance(a, b)
    }

    /// Same lookup as `distance`, but on a miss materialises the fallback
    /// into the memo. Only called from `build_routes` while the memo is
    /// still allowed to grow (see module docs).
    pub fn distance_or_insert(&mut self, a: &str, b: &str) -> f64 {
        if let Some(&d) = self.distance_memo.get(&(a.to_string(), b.to_string())) {
            return d;
        }
        let d = self.line_distance(a, b);
        self.distance_memo
            .insert((a.to_string(), b.to_string()), d);
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{Route, RouteShape};

    #[test]
    fn add_stop_is_idempotent_on_location() {
        let mut cat = Catalogue::new();
        cat.add_stop("A", Point::new(1.0, 2.0), &[]);
        cat.add_stop("A", Point::new(3.0, 4.0), &[]);
        assert_eq!(cat.stop("A").unwrap().location, Point::new(3.0, 4.0));
    }

    #[test]
    fn neighbour_insertion_is_additive_only() {
        let mut cat = Catalogue::new();
        cat.add_stop("A", Point::new(0.0, 0.0), &[("B".into(), 10.0)]);
        assert_eq!(cat.stop("B").unwrap().location, Point::new(0.0, 0.0));
        cat.add_stop("B", Point::new(5.0, 5.0), &[]);
        assert_eq!(cat.stop("B").unwrap().location, Point::new(5.0, 5.0));
        // A's distance entry to B survives B's own later add_stop.
        assert_eq!(cat.distance("A", "B"), 10.0);
    }

    #[test]
    fn asymmetric_explicit_distances_are_preserved() {
        let mut cat = Catalogue::new();
        cat.add_stop("A", Point::new(0.0, 0.0), &[("B".into(), 1000.0)]);
        cat.add_stop("B", Point::new(0.0, 0.0), &[("A".into(), 1500.0)]);
        assert_eq!(cat.distance("A", "B"), 1000.0);
        assert_eq!(cat.distance("B", "A"), 1500.0);
    }

    #[test]
    fn symmetric_fallback_when_only_one_direction_set() {
        let mut cat = Catalogue::new();
        cat.add_stop("A", Point::new(0.0, 0.0), &[("B".into(), 1000.0)]);
        assert_eq!(cat.distance("A", "B"), 1000.0);
        assert_eq!(cat.distance("B", "A"), 1000.0);
    }

    #[test]
    fn unknown_stop_distance_is_zero() {
        let cat = Catalogue::new();
        assert_eq!(cat.distance("X", "Y"), 0.0);
    }

    #[test]
    fn stop_buses_distinguishes_unknown_from_empty() {
        let mut cat = Catalogue::new();
        cat.add_stop("A", Point::new(0.0, 0.0), &[]);
        assert_eq!(cat.get_stop_buses("A"), Some(&BTreeSet::new()));
        assert_eq!(cat.get_stop_buses("Z"), None);
    }

    #[test]
    fn add_bus_populates_reverse_index() {
        let mut cat = Catalogue::new();
        cat.add_stop("A", Point::new(0.0, 0.0), &[]);
        cat.add_stop("B", Point::new(0.0, 0.0), &[]);
        let route = Route::from_stops(RouteShape::TwoWay, vec!["A".into(), "B".into()]);
        cat.add_bus("B1", route);
        assert!(cat.get_stop_buses("A").unwrap().contains("B1"));
        assert!(cat.get_stop_buses("B").unwrap().contains("B1"));
    }
}
