//! The `Document` facade: the crate's one public entry point, plus the
//! `serde`-typed request/response surface a host process talks JSON through.

use std::collections::BTreeMap;

use geo_types::Point;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalogue::Catalogue;
use crate::graph::{Router, TransitGraph};
use crate::render::{Renderer, RenderSettings};
use crate::route::{Route, RouteShape};
use crate::route_query::{self, Leg, RouteResult};

/// `{bus_wait_time (minutes), bus_velocity (km/h)}`.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct RouteSettings {
    pub bus_wait_time: u32,
    pub bus_velocity: u32,
}

/// Owns the catalogue plus everything sealed in by `build_routes`. The two
/// phases (ingestion, then query) are enforced by which fields are `Some`:
/// the graph/router pair only exists after a successful `build_routes`.
pub struct Document {
    catalogue: Catalogue,
    route_settings: Option<RouteSettings>,
    renderer: Option<Renderer>,
    sealed: Option<(TransitGraph, Router)>,
}

impl Document {
    pub fn new() -> Document {
        Document {
            catalogue: Catalogue::new(),
            route_settings: None,
            renderer: None,
            sealed: None,
        }
    }

    pub fn add_stop(&mut self, name: &str, location: Point<f64>, distances: &[(String, f64)]) {
        self.catalogue.add_stop(name, location, distances);
    }

    pub fn add_bus(&mut self, number: &str, route: Route) {
        self.catalogue.add_bus(number, route);
    }

    pub fn set_route_settings(&mut self, settings: RouteSettings) {
        self.route_settings = Some(settings);
    }

    /// A no-op if render settings were already set (the reference
    /// implementation's `render_` is built exactly once, on first call).
    pub fn set_render_settings(&mut self, settings: RenderSettings) {
        if self.renderer.is_none() {
            self.renderer = Some(Renderer::new(&self.catalogue, settings));
        }
    }

    /// Seals the catalogue and builds the transit graph + router. A no-op
    /// if route settings were never set (matching the reference
    /// implementation: missing routing configuration is not an error, it
    /// just means `get_route` will report every query unreachable).
    pub fn build_routes(&mut self) {
        let Some(settings) = self.route_settings else {
            debug!("build_routes called with no route settings; leaving routes unbuilt");
            return;
        };

        info!(
            "building transit graph for {} stops, {} buses",
            self.catalogue.stop_count(),
            self.catalogue.buses().count()
        );
        let graph = TransitGraph::build(&mut self.catalogue, settings.bus_wait_time as f64, settings.bus_velocity as f64);
        let router = Router::build(&graph);
        self.sealed = Some((graph, router));
    }

    pub fn get_bus_route(&self, number: &str) -> Option<&Route> {
        self.catalogue.get_bus_route(number)
    }

    pub fn get_stop_buses(&self, name: &str) -> Option<&std::collections::BTreeSet<String>> {
        self.catalogue.get_stop_buses(name)
    }

    /// `None` before `build_routes`, when either stop is unknown, or when no
    /// path connects them.
    pub fn get_route(&self, from: &str, to: &str) -> Option<RouteResult> {
        let (graph, router) = self.sealed.as_ref()?;
        route_query::find_route(graph, router, from, to)
    }

    /// An empty document (no layers emitted) before render settings are set.
    pub fn build_map(&self) -> String {
        match &self.renderer {
            Some(renderer) => renderer.build_map(&self.catalogue).to_string(),
            None => String::new(),
        }
    }

    fn render_route_svg(&self, from: &str, to: &str, route: &RouteResult) -> Option<String> {
        let renderer = self.renderer.as_ref()?;
        Some(renderer.render_route(&self.catalogue, from, to, route).to_string())
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

// ---------------------------------------------------------------------
// serde document types (§6)
// ---------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct InputDocument {
    #[serde(default)]
    pub routing_settings: Option<RouteSettings>,
    #[serde(default)]
    pub render_settings: Option<RenderSettings>,
    #[serde(default)]
    pub base_requests: Vec<ModifyRequest>,
    #[serde(default)]
    pub stat_requests: Vec<StatRequest>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ModifyRequest {
    Stop {
        name: String,
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        road_distances: BTreeMap<String, i64>,
    },
    Bus {
        name: String,
        is_roundtrip: bool,
        stops: Vec<String>,
    },
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum StatRequest {
    Stop { id: i64, name: String },
    Bus { id: i64, name: String },
    Route { id: i64, from: String, to: String },
    Map { id: i64 },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum LegResponse {
    Wait { stop_name: String, time: f64 },
    Bus { bus: String, span_count: usize, time: f64 },
}

impl From<&Leg> for LegResponse {
    fn from(leg: &Leg) -> LegResponse {
        match leg {
            Leg::Wait { stop, time } => LegResponse::Wait { stop_name: stop.clone(), time: *time },
            Leg::Bus { bus, span_count, time } => LegResponse::Bus {
                bus: bus.clone(),
                span_count: *span_count,
                time: *time,
            },
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ResponseItem {
    Bus {
        request_id: i64,
        stop_count: usize,
        unique_stop_count: usize,
        route_length: RouteLength,
        curvature: f64,
    },
    Stop {
        request_id: i64,
        buses: Vec<String>,
    },
    Route {
        request_id: i64,
        total_time: f64,
        items: Vec<LegResponse>,
        map: String,
    },
    Map {
        request_id: i64,
        map: String,
    },
    NotFound {
        request_id: i64,
        error_message: &'static str,
    },
}

/// `route_length` serializes as a bare integer when the road distance is
/// exactly integral, and as a float otherwise.
#[derive(Clone, Copy, Debug)]
pub struct RouteLength(pub f64);

impl Serialize for RouteLength {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if self.0.fract() == 0.0 {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

pub type OutputDocument = Vec<ResponseItem>;

/// Runs the two-phase protocol end to end against a typed `InputDocument`:
/// ingests `base_requests`, seals with `build_routes`, then answers every
/// `stat_requests` entry. What the CLI binary and the integration tests
/// call; `Document`'s own methods are for a host embedding this crate
/// directly.
pub fn process_document(input: InputDocument) -> OutputDocument {
    let mut doc = Document::new();

    for request in &input.base_requests {
        match request {
            ModifyRequest::Stop { name, latitude, longitude, road_distances } => {
                let distances: Vec<(String, f64)> =
                    road_distances.iter().map(|(k, v)| (k.clone(), *v as f64)).collect();
                doc.add_stop(name, Point::new(*longitude, *latitude), &distances);
            }
            ModifyRequest::Bus { name, is_roundtrip, stops } => {
                let shape = if *is_roundtrip { RouteShape::Roundtrip } else { RouteShape::TwoWay };
                doc.add_bus(name, Route::from_stops(shape, stops.clone()));
            }
        }
    }

    if let Some(settings) = input.routing_settings {
        doc.set_route_settings(settings);
    }
    if let Some(settings) = input.render_settings {
        doc.set_render_settings(settings);
    }
    doc.build_routes();

    // Queries never mutate `doc`, so independent read requests can be
    // dispatched across threads.
    input.stat_requests.par_iter().map(|req| answer(&doc, req)).collect()
}

fn answer(doc: &Document, request: &StatRequest) -> ResponseItem {
    match request {
        StatRequest::Stop { id, name } => match doc.get_stop_buses(name) {
            Some(buses) => ResponseItem::Stop { request_id: *id, buses: buses.iter().cloned().collect() },
            None => not_found(*id),
        },
        StatRequest::Bus { id, name } => match doc.get_bus_route(name) {
            Some(route) => ResponseItem::Bus {
                request_id: *id,
                stop_count: route.stop_count(),
                unique_stop_count: route.unique_stop_count(),
                route_length: RouteLength(route.distance(doc.catalogue())),
                curvature: route.curvature(doc.catalogue()),
            },
            None => not_found(*id),
        },
        StatRequest::Route { id, from, to } => match doc.get_route(from, to) {
            Some(result) => ResponseItem::Route {
                request_id: *id,
                total_time: result.total_time,
                items: result.legs.iter().map(LegResponse::from).collect(),
                map: doc.render_route_svg(from, to, &result).unwrap_or_default(),
            },
            None => not_found(*id),
        },
        StatRequest::Map { id } => ResponseItem::Map { request_id: *id, map: doc.build_map() },
    }
}

fn not_found(request_id: i64) -> ResponseItem {
    ResponseItem::NotFound { request_id, error_message: "not found" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> InputDocument {
        serde_json::from_value(serde_json::json!({
            "routing_settings": {"bus_wait_time": 6, "bus_velocity": 60},
            "render_settings": null,
            "base_requests": [
                {"type": "Stop", "name": "A", "latitude": 55.6, "longitude": 37.6, "road_distances": {"B": 1000}},
                {"type": "Stop", "name": "B", "latitude": 55.6, "longitude": 37.7, "road_distances": {}},
                {"type": "Bus", "name": "B1", "is_roundtrip": false, "stops": ["A", "B"]}
            ],
            "stat_requests": [
                {"id": 1, "type": "Bus", "name": "B1"},
                {"id": 2, "type": "Stop", "name": "A"},
                {"id": 3, "type": "Route", "from": "A", "to": "B"},
                {"id": 4, "type": "Stop", "name": "Nowhere"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn end_to_end_two_stop_two_way_bus() {
        let output = process_document(sample_input());
        assert_eq!(output.len(), 4);

        match &output[0] {
            ResponseItem::Bus { stop_count, unique_stop_count, .. } => {
                assert_eq!(*stop_count, 3);
                assert_eq!(*unique_stop_count, 2);
            }
            other => panic!("expected Bus response, got {other:?}"),
        }

        match &output[2] {
            ResponseItem::Route { total_time, items, .. } => {
                assert_eq!(items.len(), 2);
                assert!((*total_time - 7.0).abs() < 1e-9);
            }
            other => panic!("expected Route response, got {other:?}"),
        }

        match &output[3] {
            ResponseItem::NotFound { error_message, .. } => assert_eq!(*error_message, "not found"),
            other => panic!("expected NotFound response, got {other:?}"),
        }
    }

    #[test]
    fn route_length_serializes_integral_values_without_a_decimal_point() {
        let integral = serde_json::to_string(&RouteLength(2000.0)).unwrap();
        assert_eq!(integral, "2000");
        let fractional = serde_json::to_string(&RouteLength(2000.5)).unwrap();
        assert_eq!(fractional, "2000.5");
    }
}
