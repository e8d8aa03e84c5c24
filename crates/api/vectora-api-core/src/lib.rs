//! vectora-api-core: value types and runtime values (core, engine-agnostic)

pub mod coercion;
pub mod path;
pub mod transform;
pub mod value;
pub mod value_type;

pub use path::{to_svg_d, PathCommand};
pub use transform::Transform;
pub use value::{Color, GradientStop, ObjectId, Value, Vec2};
pub use value_type::{is_same_value_type, Structure, TypeExtra, ValueKind, ValueType};
