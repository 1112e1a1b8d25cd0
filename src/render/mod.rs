//! Network map rendering: full map and route overlay.

pub mod projection;
pub mod svg;

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::catalogue::Catalogue;
use crate::route_query::{Leg, RouteResult};

use svg::{Circle, Color, Document, Point, Polyline, Rect, Text};

/// One of the four drawable layers, in the order configured by a document's
/// `render_settings.layers`. `#[serde(rename_all)]` means an unrecognized
/// layer name fails deserialization rather than being silently skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    BusLines,
    BusLabels,
    StopPoints,
    StopLabels,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RenderSettings {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub stop_radius: f64,
    pub line_width: f64,
    pub stop_label_font_size: u32,
    pub stop_label_offset: [f64; 2],
    pub underlayer_color: Color,
    pub underlayer_width: f64,
    pub color_palette: Vec<Color>,
    pub bus_label_font_size: u32,
    pub bus_label_offset: [f64; 2],
    pub layers: Vec<Layer>,
    pub outer_margin: f64,
}

const ROUND: &str = "round";

/// Holds the projected stop positions and per-bus colours computed once
/// when render settings are set, reused by both `build_map` and
/// `render_route`.
pub struct Renderer {
    settings: RenderSettings,
    points: BTreeMap<String, Point>,
    bus_colors: HashMap<String, Color>,
}

impl Renderer {
    pub fn new(catalogue: &Catalogue, settings: RenderSettings) -> Renderer {
        let points = projection::project(catalogue, settings.width, settings.height, settings.padding);

        let mut bus_colors = HashMap::new();
        if !settings.color_palette.is_empty() {
            let palette_len = settings.color_palette.len();
            for (i, bus) in catalogue.buses().enumerate() {
                bus_colors.insert(bus.number.clone(), settings.color_palette[i % palette_len].clone());
            }
        }

        Renderer { settings, points, bus_colors }
    }

    pub fn build_map(&self, catalogue: &Catalogue) -> Document {
        let mut doc = Document::new();
        for layer in &self.settings.layers {
            match layer {
                Layer::BusLines => self.render_all_bus_lines(&mut doc, catalogue),
                Layer::BusLabels => self.render_all_bus_labels(&mut doc, catalogue),
                Layer::StopPoints => self.render_all_stop_points(&mut doc),
                Layer::StopLabels => self.render_all_stop_labels(&mut doc, catalogue),
            }
        }
        doc
    }

    fn render_all_bus_lines(&self, doc: &mut Document, catalogue: &Catalogue) {
        for bus in catalogue.buses() {
            let mut poly = Polyline::default()
                .stroke_color(self.color_of(&bus.number))
                .stroke_width(self.settings.line_width)
                .stroke_line_cap(ROUND)
                .stroke_line_join(ROUND);
            for stop in bus.route.stops() {
                if let Some(&p) = self.points.get(stop) {
                    poly = poly.add_point(p);
                }
            }
            doc.add(poly);
        }
    }

    fn render_all_bus_labels(&self, doc: &mut Document, catalogue: &Catalogue) {
        for bus in catalogue.buses() {
            let (first, last) = bus.route.edge_stops();
            self.render_bus_label(doc, &bus.number, first);
            if first != last {
                self.render_bus_label(doc, &bus.number, last);
            }
        }
    }

    fn render_all_stop_points(&self, doc: &mut Document) {
        for &p in self.points.values() {
            self.render_stop_point_at(doc, p);
        }
    }

    fn render_all_stop_labels(&self, doc: &mut Document, catalogue: &Catalogue) {
        for stop in catalogue.stops() {
            self.render_stop_label(doc, &stop.name);
        }
    }

    /// Draws a route on top of a dimmed copy of the full map: a backdrop
    /// rectangle, then the four layers restricted to the route's own stops
    /// and legs (§4.6.3).
    pub fn render_route(&self, catalogue: &Catalogue, from: &str, to: &str, route: &RouteResult) -> Document {
        let mut doc = Document::new();
        self.render_dimming_rect(&mut doc);

        let bus_legs = bus_legs_of(from, to, route);
        let windows: Vec<(&str, Vec<String>)> = bus_legs
            .iter()
            .filter_map(|(bus, span_count, leg_from, leg_to)| {
                let bus_route = catalogue.get_bus_route(bus)?;
                find_window(bus_route.stops(), leg_from, leg_to, *span_count).map(|w| (bus.as_str(), w))
            })
            .collect();

        for layer in &self.settings.layers {
            match layer {
                Layer::BusLines => {
                    for (bus, window) in &windows {
                        let mut poly = Polyline::default()
                            .stroke_color(self.color_of(bus))
                            .stroke_width(self.settings.line_width)
                            .stroke_line_cap(ROUND)
                            .stroke_line_join(ROUND);
                        for stop in window {
                            if let Some(&p) = self.points.get(stop) {
                                poly = poly.add_point(p);
                            }
                        }
                        doc.add(poly);
                    }
                }
                Layer::BusLabels => {
                    for (bus, _, leg_from, leg_to) in &bus_legs {
                        let Some(bus_route) = catalogue.get_bus_route(bus) else { continue };
                        let (terminal_first, terminal_last) = bus_route.edge_stops();
                        if leg_from == terminal_first || leg_from == terminal_last {
                            self.render_bus_label(&mut doc, bus, leg_from);
                        }
                        if leg_to != leg_from && (leg_to == terminal_last || leg_to == terminal_first) {
                            self.render_bus_label(&mut doc, bus, leg_to);
                        }
                    }
                }
                Layer::StopPoints => {
                    for (_, window) in &windows {
                        for stop in window {
                            self.render_stop_point(&mut doc, stop);
                        }
                    }
                }
                Layer::StopLabels => {
                    for leg in &route.legs {
                        if let Leg::Wait { stop, .. } = leg {
                            self.render_stop_label(&mut doc, stop);
                        }
                    }
                }
            }
        }

        doc
    }

    fn render_dimming_rect(&self, doc: &mut Document) {
        let margin = self.settings.outer_margin;
        let rect = Rect::default()
            .top_left(Point::new(-margin, -margin))
            .bottom_right(Point::new(self.settings.width + margin, self.settings.height + margin))
            .fill_color(self.settings.underlayer_color.clone());
        doc.add(rect);
    }

    fn render_bus_label(&self, doc: &mut Document, bus: &str, stop: &str) {
        let Some(&point) = self.points.get(stop) else { return };
        let background = Text::default()
            .data(bus)
            .font_family("Verdana")
            .font_size(self.settings.bus_label_font_size)
            .font_weight("bold")
            .offset(Point::new(self.settings.bus_label_offset[0], self.settings.bus_label_offset[1]))
            .point(point)
            .stroke_line_cap(ROUND)
            .stroke_line_join(ROUND)
            .stroke_width(self.settings.underlayer_width)
            .stroke_color(self.settings.underlayer_color.clone())
            .fill_color(self.settings.underlayer_color.clone());
        let text = Text::default()
            .data(bus)
            .font_family("Verdana")
            .font_size(self.settings.bus_label_font_size)
            .font_weight("bold")
            .offset(Point::new(self.settings.bus_label_offset[0], self.settings.bus_label_offset[1]))
            .point(point)
            .fill_color(self.color_of(bus));

        doc.add(background);
        doc.add(text);
    }

    fn render_stop_point(&self, doc: &mut Document, stop: &str) {
        if let Some(&p) = self.points.get(stop) {
            self.render_stop_point_at(doc, p);
        }
    }

    fn render_stop_point_at(&self, doc: &mut Document, p: Point) {
        doc.add(
            Circle::default()
                .fill_color(Color::Named("white".to_string()))
                .radius(self.settings.stop_radius)
                .center(p),
        );
    }

    fn render_stop_label(&self, doc: &mut Document, stop: &str) {
        let Some(&point) = self.points.get(stop) else { return };
        let background = Text::default()
            .data(stop)
            .font_family("Verdana")
            .font_size(self.settings.stop_label_font_size)
            .offset(Point::new(self.settings.stop_label_offset[0], self.settings.stop_label_offset[1]))
            .point(point)
            .stroke_line_cap(ROUND)
            .stroke_line_join(ROUND)
            .stroke_width(self.settings.underlayer_width)
            .stroke_color(self.settings.underlayer_color.clone())
            .fill_color(self.settings.underlayer_color.clone());
        let text = Text::default()
            .data(stop)
            .font_family("Verdana")
            .font_size(self.settings.stop_label_font_size)
            .offset(Point::new(self.settings.stop_label_offset[0], self.settings.stop_label_offset[1]))
            .point(point)
            .fill_color(Color::Named("black".to_string()));

        doc.add(background);
        doc.add(text);
    }

    fn color_of(&self, bus: &str) -> Color {
        self.bus_colors.get(bus).cloned().unwrap_or_else(Color::none)
    }
}

/// Reduces a decoded route's legs to `(bus, span_count, from, to)` triples,
/// inferring each bus leg's boundary stops from the wait legs around it
/// (the final leg has no trailing wait, so its `to` is the route's own
/// destination).
fn bus_legs_of(from: &str, to: &str, route: &RouteResult) -> Vec<(String, usize, String, String)> {
    let mut legs = Vec::new();
    let mut current = from.to_string();

    for (i, leg) in route.legs.iter().enumerate() {
        match leg {
            Leg::Wait { stop, .. } => current = stop.clone(),
            Leg::Bus { bus, span_count, .. } => {
                let leg_to = match route.legs.get(i + 1) {
                    Some(Leg::Wait { stop, .. }) => stop.clone(),
                    _ => to.to_string(),
                };
                legs.push((bus.clone(), *span_count, current.clone(), leg_to.clone()));
                current = leg_to;
            }
        }
    }

    legs
}

/// Walks a bus's realised stop sequence looking for a contiguous run from
/// `from` to `to` of exactly `span_count + 1` stops, restarting the run
/// whenever `from` recurs (a bus can visit the same stop more than once).
fn find_window(stops: &[String], from: &str, to: &str, span_count: usize) -> Option<Vec<String>> {
    let mut window: Vec<String> = Vec::new();
    for stop in stops {
        if !window.is_empty() {
            window.push(stop.clone());
        }
        if stop == from {
            window.clear();
            window.push(stop.clone());
        } else if stop == to && !window.is_empty() && window.len() == span_count + 1 {
            return Some(window);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{Route, RouteShape};
    use geo_types::Point as GeoPoint;

    fn settings() -> RenderSettings {
        RenderSettings {
            width: 200.0,
            height: 200.0,
            padding: 10.0,
            stop_radius: 5.0,
            line_width: 2.0,
            stop_label_font_size: 10,
            stop_label_offset: [7.0, -3.0],
            underlayer_color: Color::Rgba { red: 255, green: 255, blue: 255, alpha: 0.85 },
            underlayer_width: 3.0,
            color_palette: vec![Color::Named("green".into()), Color::Rgb { red: 255, green: 160, blue: 0 }],
            bus_label_font_size: 12,
            bus_label_offset: [7.0, 15.0],
            layers: vec![Layer::BusLines, Layer::BusLabels, Layer::StopPoints, Layer::StopLabels],
            outer_margin: 6.0,
        }
    }

    fn catalogue() -> Catalogue {
        let mut cat = Catalogue::new();
        cat.add_stop("A", GeoPoint::new(0.0, 0.0), &[("B".into(), 1000.0)]);
        cat.add_stop("B", GeoPoint::new(0.01, 0.0), &[("C".into(), 1000.0)]);
        cat.add_stop("C", GeoPoint::new(0.02, 0.0), &[]);
        cat.add_bus(
            "1",
            Route::from_stops(RouteShape::Roundtrip, vec!["A".into(), "B".into(), "C".into(), "A".into()]),
        );
        cat
    }

    #[test]
    fn build_map_emits_one_layer_group_per_configured_layer() {
        let cat = catalogue();
        let renderer = Renderer::new(&cat, settings());
        let doc = renderer.build_map(&cat);
        let svg = doc.to_string();
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("<circle"));
        assert!(svg.contains("<text"));
    }

    #[test]
    fn find_window_resets_on_repeated_from_stop() {
        let stops = vec!["A".to_string(), "B".to_string(), "A".to_string(), "C".to_string()];
        let window = find_window(&stops, "A", "C", 1);
        assert_eq!(window, Some(vec!["A".to_string(), "C".to_string()]));
    }

    #[test]
    fn render_route_draws_a_dimming_rect_first() {
        let cat = catalogue();
        let renderer = Renderer::new(&cat, settings());
        let route = RouteResult {
            total_time: 7.0,
            legs: vec![
                Leg::Wait { stop: "A".to_string(), time: 5.0 },
                Leg::Bus { bus: "1".to_string(), span_count: 1, time: 2.0 },
            ],
        };
        let doc = renderer.render_route(&cat, "A", "B", &route);
        let svg = doc.to_string();
        let rect_pos = svg.find("<rect").unwrap();
        let poly_pos = svg.find("<polyline");
        if let Some(poly_pos) = poly_pos {
            assert!(rect_pos < poly_pos);
        }
    }
}
