//! Value: runtime instances carried by slots and produced by node computations.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::path::PathCommand;
use crate::transform::Transform;
use crate::value_type::ValueKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    /// Point at `radius` from the origin, `degrees` counter-clockwise from +x.
    pub fn from_polar(degrees: f64, radius: f64) -> Self {
        let rad = degrees.to_radians();
        Vec2::new(rad.cos() * radius, rad.sin() * radius)
    }

    pub fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }

    pub fn mul(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x * other.x, self.y * other.y)
    }

    pub fn scale(self, s: f64) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }

    pub fn lerp(self, other: Vec2, t: f64) -> Vec2 {
        Vec2::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Angle in degrees, counter-clockwise from +x.
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x).to_degrees()
    }
}

/// RGBA color. Channels are 0..=255, alpha 0..=1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Color { r, g, b, a }
    }

    pub fn lerp(self, other: Color, t: f64) -> Color {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// `rgb(r,g,b)` with channels rounded and clamped; alpha is emitted separately.
    pub fn to_css_rgb(&self) -> String {
        let c = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        format!("rgb({},{},{})", c(self.r), c(self.g), c(self.b))
    }

    pub fn opacity(&self) -> f64 {
        self.a.clamp(0.0, 1.0)
    }
}

/// Reference to an object in the host's scene. The empty id means "no object".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        ObjectId(id.into())
    }

    pub fn empty() -> Self {
        ObjectId(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        ObjectId::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient, 0..=1.
    pub offset: f64,
    pub color: Color,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Value {
    /// Explicit "no value"; the neutral result of unsupported operations.
    #[default]
    Undefined,
    Boolean(bool),
    Scaler(f64),
    Vector2(Vec2),
    Text(String),
    PathD(Vec<PathCommand>),
    Color(Color),
    Transform(Transform),
    Object(ObjectId),
    StopList(Vec<GradientStop>),
    Array(Vec<Value>),
}

impl Value {
    /// Coarse kind of this value. `Undefined` and arrays have none of their own.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Undefined => None,
            Value::Boolean(_) => Some(ValueKind::Boolean),
            Value::Scaler(_) => Some(ValueKind::Scaler),
            Value::Vector2(_) => Some(ValueKind::Vector2),
            Value::Text(_) => Some(ValueKind::Text),
            Value::PathD(_) => Some(ValueKind::PathD),
            Value::Color(_) => Some(ValueKind::Color),
            Value::Transform(_) => Some(ValueKind::Transform),
            Value::Object(_) => Some(ValueKind::Object),
            Value::StopList(_) => Some(ValueKind::StopList),
            Value::Array(items) => items.iter().find_map(Value::kind),
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn vector2(x: f64, y: f64) -> Self {
        Value::Vector2(Vec2::new(x, y))
    }

    pub fn object(id: impl Into<String>) -> Self {
        Value::Object(ObjectId::new(id))
    }

    pub fn empty_object() -> Self {
        Value::Object(ObjectId::empty())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scaler(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Vec2> for Value {
    fn from(value: Vec2) -> Self {
        Value::Vector2(value)
    }
}

impl From<Transform> for Value {
    fn from(value: Transform) -> Self {
        Value::Transform(value)
    }
}

impl From<Color> for Value {
    fn from(value: Color) -> Self {
        Value::Color(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_roundtrips_distinct_from_missing() {
        let json = serde_json::to_value(Value::Undefined).expect("serialize");
        assert_eq!(json, serde_json::json!({ "type": "undefined" }));
        let parsed: Value = serde_json::from_value(json).expect("parse");
        assert!(parsed.is_undefined());
    }

    #[test]
    fn vector_literal_uses_tagged_form() {
        let parsed: Value =
            serde_json::from_value(serde_json::json!({ "type": "vector2", "data": { "x": 1.0, "y": 10.0 } }))
                .expect("parse");
        assert_eq!(parsed, Value::vector2(1.0, 10.0));
    }

    #[test]
    fn polar_points_follow_degrees() {
        let p = Vec2::from_polar(90.0, 2.0);
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 2.0).abs() < 1e-9);
        assert!((Vec2::new(0.0, 3.0).angle() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn css_rgb_rounds_and_clamps() {
        assert_eq!(Color::rgba(10.4, 300.0, -2.0, 1.0).to_css_rgb(), "rgb(10,255,0)");
    }
}
