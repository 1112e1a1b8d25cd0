//! Polymorphic route shapes.
//!
//! A route's shape is one of exactly two known kinds, decided once at
//! parse time, so it's expressed as a tagged enum rather than a trait
//! with per-shape implementors (see DESIGN.md).

use std::collections::BTreeSet;

use crate::catalogue::Catalogue;

/// How a route's realised stop sequence relates to its parsed stop order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteShape {
    /// Parsed order is the realised order; callers are expected to supply
    /// the closing stop themselves (the last parsed stop equals the first).
    Roundtrip,
    /// Parsed order is out-bound only; the realised sequence appends the
    /// reverse of the out-bound leg, excluding the shared pivot stop.
    TwoWay,
}

impl RouteShape {
    /// `" > "` for roundtrip routes, `" - "` for two-way routes. These are
    /// the two delimiters the legacy plain-text surface and the
    /// delimited-string encoding recognize.
    pub fn delimiter(self) -> &'static str {
        match self {
            RouteShape::Roundtrip => " > ",
            RouteShape::TwoWay => " - ",
        }
    }
}

/// An ordered stop sequence belonging to one bus.
///
/// Holds no back-reference to a [`Catalogue`]; every distance-dependent
/// operation takes one as a parameter (Design Notes §9, option (a)).
#[derive(Clone, Debug)]
pub struct Route {
    shape: RouteShape,
    unique_stops: BTreeSet<String>,
    /// The materialised stop sequence actually traversed.
    realised: Vec<String>,
    /// The shape-specific terminal stop (see `edge_stops`).
    terminal: String,
}

impl Route {
    /// Builds a route from already-tokenized stop names in parsed order
    /// (i.e. before two-way duplication is applied).
    ///
    /// # Panics
    /// Panics if `parsed` is empty, since every route has at least one stop.
    pub fn from_stops(shape: RouteShape, parsed: Vec<String>) -> Route {
        assert!(!parsed.is_empty(), "route must have at least one stop");

        let unique_stops: BTreeSet<String> = parsed.iter().cloned().collect();
        let terminal = parsed.last().unwrap().clone();

        let realised = match shape {
            RouteShape::Roundtrip => parsed,
            RouteShape::TwoWay => {
                let mut seq = parsed.clone();
                if parsed.len() >= 2 {
                    seq.extend(parsed[..parsed.len() - 1].iter().rev().cloned());
                }
                seq
            }
        };

        Route {
            shape,
            unique_stops,
            realised,
            terminal,
        }
    }

    /// Parses a delimiter-separated stop sequence (`"A > B > C"` or
    /// `"A - B - C"`), picking the shape from whichever delimiter matches.
    /// Returns `None` if neither delimiter appears.
    pub fn parse_delimited(text: &str) -> Option<Route> {
        let shape = if text.contains(RouteShape::Roundtrip.delimiter()) {
            RouteShape::Roundtrip
        } else if text.contains(RouteShape::TwoWay.delimiter()) {
            RouteShape::TwoWay
        } else {
            return None;
        };

        let parsed: Vec<String> = text.split(shape.delimiter()).map(str::to_string).collect();
        Some(Route::from_stops(shape, parsed))
    }

    pub fn shape(&self) -> RouteShape {
        self.shape
    }

    /// The realised ordered stop sequence (post two-way duplication).
    pub fn stops(&self) -> &[String] {
        &self.realised
    }

    pub fn unique_stops(&self) -> &BTreeSet<String> {
        &self.unique_stops
    }

    /// `(first, last)`: the start of the realised sequence and the
    /// shape-specific terminal stop.
    pub fn edge_stops(&self) -> (&str, &str) {
        (&self.realised[0], &self.terminal)
    }

    pub fn stop_count(&self) -> usize {
        self.realised.len()
    }

    pub fn unique_stop_count(&self) -> usize {
        self.unique_stops.len()
    }

    /// Sum of pairwise (memoised) road distances along the realised
    /// sequence.
    pub fn distance(&self, catalogue: &Catalogue) -> f64 {
        self.realised
            .windows(2)
            .map(|w| catalogue.distance(&w[0], &w[1]))
            .sum()
    }

    /// Sum of pairwise great-circle distances along the realised sequence.
    pub fn line_distance(&self, catalogue: &Catalogue) -> f64 {
        self.realised
            .windows(2)
            .map(|w| catalogue.line_distance(&w[0], &w[1]))
            .sum()
    }

    /// `route_length / line_distance()`.
    pub fn curvature(&self, catalogue: &Catalogue) -> f64 {
        self.distance(catalogue) / self.line_distance(catalogue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Point;

    fn stops(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn two_way_duplicates_reversed_minus_pivot() {
        let route = Route::from_stops(RouteShape::TwoWay, stops(&["A", "B", "C"]));
        assert_eq!(route.stops(), &["A", "B", "C", "B", "A"]);
        assert_eq!(route.edge_stops(), ("A", "C"));
    }

    #[test]
    fn roundtrip_keeps_parsed_order_verbatim() {
        let route = Route::from_stops(RouteShape::Roundtrip, stops(&["A", "B", "C", "A"]));
        assert_eq!(route.stop_count(), 4);
        assert_eq!(route.unique_stop_count(), 3);
        assert_eq!(route.edge_stops(), ("A", "A"));
    }

    #[test]
    fn parse_delimited_picks_shape_from_delimiter() {
        let r = Route::parse_delimited("A > B > C > A").unwrap();
        assert_eq!(r.shape(), RouteShape::Roundtrip);
        let r = Route::parse_delimited("A - B - C").unwrap();
        assert_eq!(r.shape(), RouteShape::TwoWay);
        assert!(Route::parse_delimited("A B C").is_none());
    }

    #[test]
    fn report_fields_use_catalogue_distances() {
        let mut cat = Catalogue::new();
        cat.add_stop("A", Point::new(37.6, 55.6), &[("B".into(), 1000.0)]);
        cat.add_stop("B", Point::new(37.7, 55.6), &[]);
        let route = Route::from_stops(RouteShape::TwoWay, stops(&["A", "B"]));
        assert_eq!(route.distance(&cat), 2000.0);
        assert!(route.curvature(&cat) > 0.0);
    }
}
