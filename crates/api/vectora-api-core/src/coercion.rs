//! Coercion helpers used by node computations.
//! Every helper is total: a value of the wrong kind yields the neutral value
//! of the requested kind instead of failing.

use crate::path::PathCommand;
use crate::transform::Transform;
use crate::value::{Color, GradientStop, ObjectId, Value, Vec2};

/// Coerce a Value into a scalar.
/// - Scaler -> its value
/// - Boolean -> 1.0 / 0.0
/// - anything else -> 0.0
pub fn to_scaler(v: &Value) -> f64 {
    match v {
        Value::Scaler(f) => *f,
        Value::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Scalars and booleans pass through; non-empty text and objects are truthy.
pub fn to_bool(v: &Value) -> bool {
    match v {
        Value::Boolean(b) => *b,
        Value::Scaler(f) => *f != 0.0,
        Value::Text(s) => !s.is_empty(),
        Value::Object(id) => !id.is_empty(),
        _ => false,
    }
}

pub fn to_vector2(v: &Value) -> Vec2 {
    match v {
        Value::Vector2(p) => *p,
        Value::Scaler(f) => Vec2::new(*f, *f),
        _ => Vec2::ZERO,
    }
}

pub fn to_text(v: &Value) -> String {
    match v {
        Value::Text(s) => s.clone(),
        Value::Scaler(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Object(id) => id.to_string(),
        _ => String::new(),
    }
}

pub fn to_transform(v: &Value) -> Transform {
    match v {
        Value::Transform(t) => *t,
        _ => Transform::IDENTITY,
    }
}

pub fn to_color(v: &Value) -> Color {
    match v {
        Value::Color(c) => *c,
        _ => Color::BLACK,
    }
}

pub fn to_object_id(v: &Value) -> ObjectId {
    match v {
        Value::Object(id) => id.clone(),
        _ => ObjectId::empty(),
    }
}

pub fn to_path_d(v: &Value) -> Vec<PathCommand> {
    match v {
        Value::PathD(d) => d.clone(),
        _ => Vec::new(),
    }
}

pub fn to_stop_list(v: &Value) -> Vec<GradientStop> {
    match v {
        Value::StopList(stops) => stops.clone(),
        _ => Vec::new(),
    }
}
