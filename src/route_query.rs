//! Decoding a [`RoutePath`]'s raw edge list into rider-facing legs.

use petgraph::graph::EdgeIndex;

use crate::graph::{Router, TransitGraph};

/// One leg of a decoded route.
#[derive(Clone, Debug, PartialEq)]
pub enum Leg {
    /// Waiting at `stop` for `time` minutes before boarding.
    Wait { stop: String, time: f64 },
    /// Riding `bus` across `span_count` stops, taking `time` minutes.
    Bus {
        bus: String,
        span_count: usize,
        time: f64,
    },
}

impl Leg {
    pub fn time(&self) -> f64 {
        match self {
            Leg::Wait { time, .. } => *time,
            Leg::Bus { time, .. } => *time,
        }
    }
}

/// A fully decoded route: total travel time plus its alternating legs.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteResult {
    pub total_time: f64,
    pub legs: Vec<Leg>,
}

/// Finds the fastest route between two stops and decodes it into legs.
/// `None` if either stop is unknown to the graph, or no path connects them.
pub fn find_route(graph: &TransitGraph, router: &Router, from: &str, to: &str) -> Option<RouteResult> {
    let from_vertex = graph.waiting_vertex_of(from)?;
    let to_vertex = graph.waiting_vertex_of(to)?;

    let path = router.build_route(graph, from_vertex, to_vertex)?;
    if path.edges.is_empty() {
        return Some(RouteResult {
            total_time: 0.0,
            legs: Vec::new(),
        });
    }

    let legs = path
        .edges
        .iter()
        .enumerate()
        .map(|(i, &edge)| decode_leg(graph, edge, i % 2 == 0))
        .collect();

    Some(RouteResult {
        total_time: path.weight,
        legs,
    })
}

fn decode_leg(graph: &TransitGraph, edge: EdgeIndex, is_wait: bool) -> Leg {
    let (weight, travel) = graph.edge_info(edge);
    if is_wait {
        let (_, target) = graph.edge_endpoints(edge);
        let stop = graph.stop_of(target).expect("wait edge targets a known stop").to_string();
        Leg::Wait { stop, time: weight }
    } else {
        let travel = travel.expect("odd-position edge is always a travel edge");
        Leg::Bus {
            bus: travel.bus.clone(),
            span_count: travel.span_count,
            time: weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::Catalogue;
    use crate::route::{Route, RouteShape};
    use geo_types::Point;

    fn built() -> (TransitGraph, Router) {
        let mut cat = Catalogue::new();
        cat.add_stop("A", Point::new(0.0, 0.0), &[("B".into(), 1000.0)]);
        cat.add_stop("B", Point::new(0.01, 0.0), &[("C".into(), 1000.0)]);
        cat.add_stop("C", Point::new(0.02, 0.0), &[]);
        cat.add_bus(
            "1",
            Route::from_stops(RouteShape::Roundtrip, vec!["A".into(), "B".into(), "C".into(), "A".into()]),
        );
        let graph = TransitGraph::build(&mut cat, 5.0, 40.0);
        let router = Router::build(&graph);
        (graph, router)
    }

    #[test]
    fn same_stop_is_free_and_legless() {
        let (graph, router) = built();
        let result = find_route(&graph, &router, "A", "A").unwrap();
        assert_eq!(result.total_time, 0.0);
        assert!(result.legs.is_empty());
    }

    #[test]
    fn unknown_stop_yields_none() {
        let (graph, router) = built();
        assert!(find_route(&graph, &router, "A", "Nowhere").is_none());
    }

    #[test]
    fn route_starts_with_wait_and_alternates() {
        let (graph, router) = built();
        let result = find_route(&graph, &router, "A", "C").unwrap();
        assert!(matches!(result.legs[0], Leg::Wait { .. }));
        for pair in result.legs.windows(2) {
            assert_ne!(
                std::mem::discriminant(&pair[0]),
                std::mem::discriminant(&pair[1])
            );
        }
        let summed: f64 = result.legs.iter().map(Leg::time).sum();
        assert!((summed - result.total_time).abs() < 1e-9);
    }
}
