//! The legacy plain-text input surface: count-prefixed line blocks,
//! `": "`-delimited modify lines, bare-name read lines.
//!
//! Route and map queries have no plain-text parser here; this surface only
//! ever answers Stop/Bus queries, by design, not as an oversight.

use std::collections::BTreeMap;
use std::str::Lines;

use crate::document::{InputDocument, ModifyRequest, StatRequest};
use crate::error::{Error, Result};
use crate::route::RouteShape;

/// Parses a count-prefixed plain-text document: a line holding the modify
/// request count, that many modify lines, a line holding the read request
/// count, then that many read lines. Read requests have no explicit id in
/// this grammar; one is synthesized as their 1-based position.
pub fn parse_document(text: &str) -> Result<InputDocument> {
    let mut lines = text.lines();

    let modify_count = read_count(&mut lines)?;
    let mut base_requests = Vec::with_capacity(modify_count);
    for _ in 0..modify_count {
        let line = next_line(&mut lines)?;
        if let Some(request) = parse_modify_line(line) {
            base_requests.push(request);
        }
    }

    let read_count_n = read_count(&mut lines)?;
    let mut stat_requests = Vec::with_capacity(read_count_n);
    for i in 0..read_count_n {
        let line = next_line(&mut lines)?;
        if let Some(request) = parse_read_line(i as i64 + 1, line) {
            stat_requests.push(request);
        }
    }

    Ok(InputDocument {
        routing_settings: None,
        render_settings: None,
        base_requests,
        stat_requests,
    })
}

fn next_line<'a>(lines: &mut Lines<'a>) -> Result<&'a str> {
    lines.next().ok_or_else(|| Error::MalformedLine("unexpected end of input".to_string()))
}

fn read_count(lines: &mut Lines<'_>) -> Result<usize> {
    let line = next_line(lines)?;
    line.trim().parse().map_err(|_| Error::MalformedLine(line.to_string()))
}

/// A line a request type this surface doesn't support (or can't parse) is
/// dropped rather than erroring.
fn parse_modify_line(line: &str) -> Option<ModifyRequest> {
    let (kind, rest) = line.split_once(' ')?;
    match kind {
        "Stop" => parse_stop_modify(rest),
        "Bus" => parse_bus_modify(rest),
        _ => None,
    }
}

fn parse_stop_modify(rest: &str) -> Option<ModifyRequest> {
    let (name, rest) = rest.split_once(": ")?;
    let mut parts = rest.split(", ");
    let latitude: f64 = parts.next()?.trim().parse().ok()?;
    let longitude: f64 = parts.next()?.trim().parse().ok()?;

    let mut road_distances = BTreeMap::new();
    for part in parts {
        let (meters, neighbour) = part.split_once("m to ")?;
        road_distances.insert(neighbour.to_string(), meters.trim().parse().ok()?);
    }

    Some(ModifyRequest::Stop {
        name: name.to_string(),
        latitude,
        longitude,
        road_distances,
    })
}

fn parse_bus_modify(rest: &str) -> Option<ModifyRequest> {
    let (name, route_text) = rest.split_once(": ")?;

    let is_roundtrip = route_text.contains(RouteShape::Roundtrip.delimiter());
    let delimiter = if is_roundtrip {
        RouteShape::Roundtrip.delimiter()
    } else {
        RouteShape::TwoWay.delimiter()
    };
    if !route_text.contains(delimiter) {
        return None;
    }

    let stops: Vec<String> = route_text.split(delimiter).map(str::to_string).collect();
    Some(ModifyRequest::Bus { name: name.to_string(), is_roundtrip, stops })
}

fn parse_read_line(id: i64, line: &str) -> Option<StatRequest> {
    let (kind, rest) = line.split_once(' ')?;
    match kind {
        "Bus" => Some(StatRequest::Bus { id, name: rest.to_string() }),
        "Stop" => Some(StatRequest::Stop { id, name: rest.to_string() }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stop_modify_line_with_distances() {
        let request = parse_modify_line("Stop Boomerang: 55.611087, 37.20829, 1000m to B, 500m to C").unwrap();
        match request {
            ModifyRequest::Stop { name, latitude, road_distances, .. } => {
                assert_eq!(name, "Boomerang");
                assert!((latitude - 55.611087).abs() < 1e-9);
                assert_eq!(road_distances.get("B"), Some(&1000));
                assert_eq!(road_distances.get("C"), Some(&500));
            }
            other => panic!("expected Stop, got {other:?}"),
        }
    }

    #[test]
    fn parses_two_way_bus_line() {
        let request = parse_modify_line("Bus 256: A - B - C").unwrap();
        match request {
            ModifyRequest::Bus { name, is_roundtrip, stops } => {
                assert_eq!(name, "256");
                assert!(!is_roundtrip);
                assert_eq!(stops, vec!["A", "B", "C"]);
            }
            other => panic!("expected Bus, got {other:?}"),
        }
    }

    #[test]
    fn parses_roundtrip_bus_line() {
        let request = parse_modify_line("Bus 751: A > B > C > A").unwrap();
        match request {
            ModifyRequest::Bus { is_roundtrip, stops, .. } => {
                assert!(is_roundtrip);
                assert_eq!(stops.len(), 4);
            }
            other => panic!("expected Bus, got {other:?}"),
        }
    }

    #[test]
    fn read_line_name_may_contain_spaces() {
        let request = parse_read_line(1, "Stop Biryulyovo Zapadnoye").unwrap();
        match request {
            StatRequest::Stop { name, .. } => assert_eq!(name, "Biryulyovo Zapadnoye"),
            other => panic!("expected Stop, got {other:?}"),
        }
    }

    #[test]
    fn full_document_round_trip() {
        let text = "2\nStop A: 0, 0\nStop B: 0, 1, 1000m to A\n1\nStop A\n";
        let doc = parse_document(text).unwrap();
        assert_eq!(doc.base_requests.len(), 2);
        assert_eq!(doc.stat_requests.len(), 1);
    }
}
