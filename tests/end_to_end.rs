//! End-to-end scenarios driven entirely through `process_document`, the
//! same entry point the CLI binary uses.

use transit_db::document::{process_document, InputDocument, ResponseItem};

fn run(value: serde_json::Value) -> Vec<ResponseItem> {
    let input: InputDocument = serde_json::from_value(value).unwrap();
    process_document(input)
}

fn render_settings() -> serde_json::Value {
    serde_json::json!({
        "width": 600.0,
        "height": 400.0,
        "padding": 30.0,
        "stop_radius": 5.0,
        "line_width": 14.0,
        "stop_label_font_size": 20,
        "stop_label_offset": [7.0, -3.0],
        "underlayer_color": [255, 255, 255, 0.85],
        "underlayer_width": 3.0,
        "color_palette": ["green", [255, 160, 0], "red"],
        "bus_label_font_size": 20,
        "bus_label_offset": [7.0, 15.0],
        "layers": ["bus_lines", "bus_labels", "stop_points", "stop_labels"],
        "outer_margin": 50.0
    })
}

#[test]
fn two_stop_two_way_bus_reports_doubled_distance_and_curvature() {
    let output = run(serde_json::json!({
        "routing_settings": {"bus_wait_time": 6, "bus_velocity": 40},
        "base_requests": [
            {"type": "Stop", "name": "Tolstopaltsevo", "latitude": 55.611087, "longitude": 37.20829,
             "road_distances": {"Marushkino": 3900}},
            {"type": "Stop", "name": "Marushkino", "latitude": 55.595884, "longitude": 37.209755,
             "road_distances": {"Tolstopaltsevo": 9500}},
            {"type": "Bus", "name": "256", "is_roundtrip": false, "stops": ["Tolstopaltsevo", "Marushkino"]}
        ],
        "stat_requests": [
            {"id": 1, "type": "Bus", "name": "256"}
        ]
    }));

    match &output[0] {
        ResponseItem::Bus { stop_count, unique_stop_count, route_length, curvature, .. } => {
            assert_eq!(*stop_count, 3);
            assert_eq!(*unique_stop_count, 2);
            let serialized = serde_json::to_value(route_length).unwrap();
            assert_eq!(serialized, serde_json::json!(13400));
            assert!(*curvature > 1.0);
        }
        other => panic!("expected Bus response, got {other:?}"),
    }
}

#[test]
fn asymmetric_distance_is_honoured_in_each_direction() {
    let output = run(serde_json::json!({
        "routing_settings": {"bus_wait_time": 5, "bus_velocity": 50},
        "base_requests": [
            {"type": "Stop", "name": "A", "latitude": 0.0, "longitude": 0.0, "road_distances": {"B": 100}},
            {"type": "Stop", "name": "B", "latitude": 0.0, "longitude": 0.001, "road_distances": {"A": 300}},
            {"type": "Bus", "name": "1", "is_roundtrip": false, "stops": ["A", "B"]}
        ],
        "stat_requests": [
            {"id": 1, "type": "Route", "from": "A", "to": "B"},
            {"id": 2, "type": "Route", "from": "B", "to": "A"}
        ]
    }));

    let time_of = |item: &ResponseItem| match item {
        ResponseItem::Route { total_time, .. } => *total_time,
        other => panic!("expected Route response, got {other:?}"),
    };
    assert!(time_of(&output[0]) < time_of(&output[1]));
}

#[test]
fn transfer_route_prefers_fastest_path_over_direct_detour() {
    let output = run(serde_json::json!({
        "routing_settings": {"bus_wait_time": 2, "bus_velocity": 1000},
        "base_requests": [
            {"type": "Stop", "name": "A", "latitude": 0.0, "longitude": 0.0,
             "road_distances": {"B": 1, "C": 100000}},
            {"type": "Stop", "name": "B", "latitude": 0.0, "longitude": 0.0001, "road_distances": {"C": 1}},
            {"type": "Stop", "name": "C", "latitude": 0.0, "longitude": 0.0002, "road_distances": {}},
            {"type": "Bus", "name": "fast", "is_roundtrip": false, "stops": ["A", "B", "C"]},
            {"type": "Bus", "name": "direct", "is_roundtrip": false, "stops": ["A", "C"]}
        ],
        "stat_requests": [
            {"id": 1, "type": "Route", "from": "A", "to": "C"}
        ]
    }));

    match &output[0] {
        ResponseItem::Route { items, .. } => {
            let uses_fast = items.iter().any(|leg| {
                matches!(leg, transit_db::document::LegResponse::Bus { bus, .. } if bus == "fast")
            });
            assert!(uses_fast, "expected the transfer route through the fast bus, got {items:?}");
        }
        other => panic!("expected Route response, got {other:?}"),
    }
}

#[test]
fn route_from_a_stop_to_itself_is_free_and_legless() {
    let output = run(serde_json::json!({
        "routing_settings": {"bus_wait_time": 6, "bus_velocity": 40},
        "base_requests": [
            {"type": "Stop", "name": "A", "latitude": 0.0, "longitude": 0.0, "road_distances": {}},
            {"type": "Bus", "name": "1", "is_roundtrip": true, "stops": ["A", "A"]}
        ],
        "stat_requests": [
            {"id": 1, "type": "Route", "from": "A", "to": "A"}
        ]
    }));

    match &output[0] {
        ResponseItem::Route { total_time, items, .. } => {
            assert_eq!(*total_time, 0.0);
            assert!(items.is_empty());
        }
        other => panic!("expected Route response, got {other:?}"),
    }
}

#[test]
fn unknown_stop_queries_report_not_found() {
    let output = run(serde_json::json!({
        "routing_settings": {"bus_wait_time": 6, "bus_velocity": 40},
        "base_requests": [],
        "stat_requests": [
            {"id": 1, "type": "Stop", "name": "Nowhere"},
            {"id": 2, "type": "Bus", "name": "Nowhere"},
            {"id": 3, "type": "Route", "from": "Nowhere", "to": "Elsewhere"}
        ]
    }));

    for item in &output {
        match item {
            ResponseItem::NotFound { error_message, .. } => assert_eq!(*error_message, "not found"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}

#[test]
fn map_query_renders_an_svg_document_with_configured_layers() {
    let output = run(serde_json::json!({
        "routing_settings": {"bus_wait_time": 6, "bus_velocity": 40},
        "render_settings": render_settings(),
        "base_requests": [
            {"type": "Stop", "name": "A", "latitude": 55.6, "longitude": 37.6, "road_distances": {"B": 1000}},
            {"type": "Stop", "name": "B", "latitude": 55.61, "longitude": 37.62, "road_distances": {}},
            {"type": "Bus", "name": "1", "is_roundtrip": false, "stops": ["A", "B"]}
        ],
        "stat_requests": [
            {"id": 1, "type": "Map"}
        ]
    }));

    match &output[0] {
        ResponseItem::Map { map, .. } => {
            assert!(map.starts_with("<?xml"));
            assert!(map.contains("<svg"));
            assert!(map.contains("polyline") || map.contains("circle"));
        }
        other => panic!("expected Map response, got {other:?}"),
    }
}

#[test]
fn roundtrip_bus_counts_every_realised_stop_including_the_repeated_terminal() {
    let output = run(serde_json::json!({
        "routing_settings": {"bus_wait_time": 6, "bus_velocity": 40},
        "base_requests": [
            {"type": "Stop", "name": "A", "latitude": 0.0, "longitude": 0.0, "road_distances": {"B": 1000}},
            {"type": "Stop", "name": "B", "latitude": 0.0, "longitude": 0.001, "road_distances": {"C": 1000}},
            {"type": "Stop", "name": "C", "latitude": 0.0, "longitude": 0.002, "road_distances": {"A": 1000}},
            {"type": "Bus", "name": "loop", "is_roundtrip": true, "stops": ["A", "B", "C", "A"]}
        ],
        "stat_requests": [
            {"id": 1, "type": "Bus", "name": "loop"}
        ]
    }));

    match &output[0] {
        ResponseItem::Bus { stop_count, unique_stop_count, .. } => {
            assert_eq!(*stop_count, 4);
            assert_eq!(*unique_stop_count, 3);
        }
        other => panic!("expected Bus response, got {other:?}"),
    }
}
