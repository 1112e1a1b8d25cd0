//! Adjacency-based uniform-grid coordinate projection: pivot-stop
//! detection via the `bus_count` `+1`/`+10` scheme, geographic
//! interpolation of non-pivot stops between their bounding pivots, then
//! an independent per-axis sweep that only lets a stop's *route-adjacent*
//! neighbours constrain its index class.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::catalogue::Catalogue;

use super::svg::Point;

/// Maps every known stop to its projected canvas position.
pub fn project(catalogue: &Catalogue, width: f64, height: f64, padding: f64) -> BTreeMap<String, Point> {
    let adjacency = adjacency_sets(catalogue);
    let pivots = pivot_stops(catalogue);
    let geo = smoothed_geo_positions(catalogue, &pivots);

    let mut points: Vec<(String, Point)> = geo.into_iter().collect();

    compress_axis(&mut points, &adjacency, width, padding, Axis::X);
    compress_axis(&mut points, &adjacency, height, padding, Axis::Y);

    points.into_iter().collect()
}

fn adjacency_sets(catalogue: &Catalogue) -> BTreeMap<String, BTreeSet<String>> {
    let mut adjacency: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for bus in catalogue.buses() {
        for pair in bus.route.stops().windows(2) {
            adjacency.entry(pair[0].clone()).or_default().insert(pair[1].clone());
            adjacency.entry(pair[1].clone()).or_default().insert(pair[0].clone());
        }
    }
    adjacency
}

/// A stop whose geographic position is preserved verbatim rather than
/// interpolated: a route terminal, a stop visited by more than one distinct
/// bus, or a stop served by no bus at all.
fn pivot_stops(catalogue: &Catalogue) -> BTreeSet<String> {
    let mut bus_count: HashMap<String, i32> = HashMap::new();
    let mut first_bus: HashMap<String, String> = HashMap::new();
    let mut pivots = BTreeSet::new();

    for bus in catalogue.buses() {
        for stop in bus.route.stops() {
            match first_bus.get(stop) {
                None => {
                    first_bus.insert(stop.clone(), bus.number.clone());
                }
                Some(existing) if existing != &bus.number => {
                    *bus_count.entry(stop.clone()).or_insert(0) += 10;
                }
                _ => {}
            }
            *bus_count.entry(stop.clone()).or_insert(0) += 1;
        }

        let (first, last) = bus.route.edge_stops();
        pivots.insert(first.to_string());
        pivots.insert(last.to_string());
    }

    for stop in catalogue.stops() {
        let count = bus_count.get(&stop.name).copied().unwrap_or(0);
        if count == 0 || count > 2 {
            pivots.insert(stop.name.clone());
        }
    }

    pivots
}

fn smoothed_geo_positions(catalogue: &Catalogue, pivots: &BTreeSet<String>) -> BTreeMap<String, Point> {
    let mut res: BTreeMap<String, Point> = BTreeMap::new();
    for stop in catalogue.stops() {
        if pivots.contains(&stop.name) {
            res.insert(stop.name.clone(), Point::new(stop.location.x(), stop.location.y()));
        }
    }

    for bus in catalogue.buses() {
        let stops = bus.route.stops();
        if stops.is_empty() {
            continue;
        }

        let mut to_smooth: Vec<&String> = vec![&stops[0]];
        for stop in &stops[1..] {
            if !pivots.contains(stop) {
                to_smooth.push(stop);
                continue;
            }

            let n = to_smooth.len();
            if n > 1 {
                let start = res[to_smooth[0]];
                let end = res[stop];
                let lon_step = (end.x - start.x) / n as f64;
                let lat_step = (end.y - start.y) / n as f64;
                for (i, interior) in to_smooth.iter().enumerate().skip(1) {
                    res.insert(
                        (*interior).clone(),
                        Point::new(start.x + lon_step * i as f64, start.y + lat_step * i as f64),
                    );
                }
            }

            to_smooth = vec![stop];
        }
    }

    res
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

fn compress_axis(points: &mut [(String, Point)], adjacency: &BTreeMap<String, BTreeSet<String>>, canvas_dim: f64, padding: f64, axis: Axis) {
    let coord = |p: &Point| match axis {
        Axis::X => p.x,
        Axis::Y => p.y,
    };

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| coord(&points[a].1).partial_cmp(&coord(&points[b].1)).unwrap());

    let mut sorted_pos: HashMap<&str, usize> = HashMap::new();
    for (pos, &orig) in order.iter().enumerate() {
        sorted_pos.insert(points[orig].0.as_str(), pos);
    }

    let mut indexes: Vec<i64> = vec![-1; order.len()];
    for (pos, &orig) in order.iter().enumerate() {
        let name = &points[orig].0;
        let mut idx: i64 = -1;
        if let Some(neighbours) = adjacency.get(name) {
            for neighbour in neighbours {
                if let Some(&npos) = sorted_pos.get(neighbour.as_str()) {
                    idx = idx.max(indexes[npos]);
                }
            }
        }
        indexes[pos] = idx + 1;
    }

    let n = indexes.iter().copied().max().unwrap_or(0);
    let step = if n <= 0 { 0.0 } else { (canvas_dim - 2.0 * padding) / n as f64 };

    for (pos, &orig) in order.iter().enumerate() {
        let idx = indexes[pos] as f64;
        match axis {
            Axis::X => points[orig].1.x = idx * step + padding,
            Axis::Y => points[orig].1.y = canvas_dim - padding - idx * step,
        }
    }
}
