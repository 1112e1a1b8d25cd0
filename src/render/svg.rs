//! Hand-rolled SVG element emission.
//!
//! Each element's `Display` impl reproduces its exact attribute order
//! byte-for-byte rather than routing through a generic XML/SVG crate,
//! since the ordering is part of this system's observable output, not an
//! implementation detail a library could hide.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// An SVG paint value: absent, a named CSS colour, or an explicit RGB(A).
///
/// A JSON string is a named colour, a 3-element array is RGB, a 4-element
/// array is RGBA. Deserialized by hand rather than via
/// `#[derive(Deserialize)]` since no combination of serde's built-in
/// representations maps a plain JSON array onto a tagged enum.
#[derive(Clone, Debug, PartialEq)]
pub enum Color {
    Rgba { red: u8, green: u8, blue: u8, alpha: f64 },
    Rgb { red: u8, green: u8, blue: u8 },
    Named(String),
}

impl Default for Color {
    fn default() -> Self {
        Color::Named("none".to_string())
    }
}

impl Color {
    pub fn none() -> Color {
        Color::Named("none".to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Color, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::String(s) => Ok(Color::Named(s)),
            serde_json::Value::Array(arr) if arr.len() == 3 => {
                let [r, g, b] = <[serde_json::Value; 3]>::try_from(arr).unwrap();
                Ok(Color::Rgb {
                    red: as_u8(&r).ok_or_else(|| D::Error::custom("expected integer"))?,
                    green: as_u8(&g).ok_or_else(|| D::Error::custom("expected integer"))?,
                    blue: as_u8(&b).ok_or_else(|| D::Error::custom("expected integer"))?,
                })
            }
            serde_json::Value::Array(arr) if arr.len() == 4 => {
                let [r, g, b, a] = <[serde_json::Value; 4]>::try_from(arr).unwrap();
                Ok(Color::Rgba {
                    red: as_u8(&r).ok_or_else(|| D::Error::custom("expected integer"))?,
                    green: as_u8(&g).ok_or_else(|| D::Error::custom("expected integer"))?,
                    blue: as_u8(&b).ok_or_else(|| D::Error::custom("expected integer"))?,
                    alpha: a.as_f64().ok_or_else(|| D::Error::custom("expected float alpha"))?,
                })
            }
            other => Err(D::Error::custom(format!("unsupported colour shape: {other}"))),
        }
    }
}

fn as_u8(value: &serde_json::Value) -> Option<u8> {
    value.as_u64().and_then(|v| u8::try_from(v).ok())
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Named(name) => write!(f, "{name}"),
            Color::Rgb { red, green, blue } => write!(f, "rgb({red},{green},{blue})"),
            Color::Rgba { red, green, blue, alpha } => {
                write!(f, "rgba({red},{green},{blue},{alpha})")
            }
        }
    }
}

/// The fill/stroke attributes shared by every drawable element.
#[derive(Clone, Debug, Default)]
pub struct Style {
    pub fill_color: Color,
    pub stroke_color: Color,
    pub stroke_width: f64,
    pub stroke_line_cap: Option<String>,
    pub stroke_line_join: Option<String>,
}

impl Style {
    fn write_attrs(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\" ",
            self.fill_color, self.stroke_color, self.stroke_width
        )?;
        if let Some(cap) = &self.stroke_line_cap {
            write!(f, "stroke-linecap=\"{cap}\" ")?;
        }
        if let Some(join) = &self.stroke_line_join {
            write!(f, "stroke-linejoin=\"{join}\" ")?;
        }
        Ok(())
    }
}

macro_rules! style_builder {
    ($ty:ty) => {
        impl $ty {
            pub fn fill_color(mut self, color: Color) -> Self {
                self.style.fill_color = color;
                self
            }
            pub fn stroke_color(mut self, color: Color) -> Self {
                self.style.stroke_color = color;
                self
            }
            pub fn stroke_width(mut self, width: f64) -> Self {
                self.style.stroke_width = width;
                self
            }
            pub fn stroke_line_cap(mut self, cap: &str) -> Self {
                self.style.stroke_line_cap = Some(cap.to_string());
                self
            }
            pub fn stroke_line_join(mut self, join: &str) -> Self {
                self.style.stroke_line_join = Some(join.to_string());
                self
            }
        }
    };
}

#[derive(Clone, Debug, Default)]
pub struct Circle {
    center: Point,
    radius: f64,
    style: Style,
}
style_builder!(Circle);

impl Circle {
    pub fn center(mut self, center: Point) -> Self {
        self.center = center;
        self
    }
    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }
}

impl fmt::Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" ", self.center.x, self.center.y, self.radius)?;
        self.style.write_attrs(f)?;
        write!(f, "/>")
    }
}

#[derive(Clone, Debug, Default)]
pub struct Polyline {
    points: Vec<Point>,
    style: Style,
}
style_builder!(Polyline);

impl Polyline {
    pub fn add_point(mut self, p: Point) -> Self {
        self.points.push(p);
        self
    }
}

impl fmt::Display for Polyline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<polyline points=\"")?;
        for p in &self.points {
            write!(f, "{p} ")?;
        }
        write!(f, "\" ")?;
        self.style.write_attrs(f)?;
        write!(f, "/>")
    }
}

#[derive(Clone, Debug, Default)]
pub struct Text {
    point: Point,
    offset: Point,
    font_size: u32,
    font_family: Option<String>,
    font_weight: Option<String>,
    data: String,
    style: Style,
}
style_builder!(Text);

impl Text {
    pub fn point(mut self, p: Point) -> Self {
        self.point = p;
        self
    }
    pub fn offset(mut self, p: Point) -> Self {
        self.offset = p;
        self
    }
    pub fn font_size(mut self, size: u32) -> Self {
        self.font_size = size;
        self
    }
    pub fn font_family(mut self, family: &str) -> Self {
        self.font_family = Some(family.to_string());
        self
    }
    pub fn font_weight(mut self, weight: &str) -> Self {
        self.font_weight = Some(weight.to_string());
        self
    }
    pub fn data(mut self, data: &str) -> Self {
        self.data = data.to_string();
        self
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<text x=\"{}\" y=\"{}\" dx=\"{}\" dy=\"{}\" font-size=\"{}\" ",
            self.point.x, self.point.y, self.offset.x, self.offset.y, self.font_size
        )?;
        if let Some(family) = &self.font_family {
            write!(f, "font-family=\"{family}\" ")?;
        }
        if let Some(weight) = &self.font_weight {
            write!(f, "font-weight=\"{weight}\" ")?;
        }
        self.style.write_attrs(f)?;
        write!(f, ">{}</text>", self.data)
    }
}

/// Carries the renderer's dimming backdrop, built in the same shape as
/// `Circle`/`Polyline`/`Text` and emitted as a standard SVG `<rect>`.
#[derive(Clone, Debug, Default)]
pub struct Rect {
    top_left: Point,
    bottom_right: Point,
    style: Style,
}
style_builder!(Rect);

impl Rect {
    pub fn top_left(mut self, p: Point) -> Self {
        self.top_left = p;
        self
    }
    pub fn bottom_right(mut self, p: Point) -> Self {
        self.bottom_right = p;
        self
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" ",
            self.top_left.x,
            self.top_left.y,
            self.bottom_right.x - self.top_left.x,
            self.bottom_right.y - self.top_left.y
        )?;
        self.style.write_attrs(f)?;
        write!(f, "/>")
    }
}

#[derive(Clone, Debug)]
pub enum Item {
    Circle(Circle),
    Polyline(Polyline),
    Text(Text),
    Rect(Rect),
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Circle(c) => c.fmt(f),
            Item::Polyline(p) => p.fmt(f),
            Item::Text(t) => t.fmt(f),
            Item::Rect(r) => r.fmt(f),
        }
    }
}

macro_rules! from_item {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for Item {
            fn from(value: $ty) -> Item {
                Item::$variant(value)
            }
        }
    };
}
from_item!(Circle, Circle);
from_item!(Polyline, Polyline);
from_item!(Text, Text);
from_item!(Rect, Rect);

/// An ordered bag of SVG elements; `Display` wraps them in the XML/SVG
/// envelope.
#[derive(Clone, Debug, Default)]
pub struct Document {
    items: Vec<Item>,
}

impl Document {
    pub fn new() -> Document {
        Document::default()
    }

    pub fn add(&mut self, item: impl Into<Item>) {
        self.items.push(item.into());
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>")?;
        write!(f, "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\">")?;
        for item in &self.items {
            write!(f, "{item}")?;
        }
        write!(f, "</svg>")
    }
}
