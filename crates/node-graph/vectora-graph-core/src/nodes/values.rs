//! Literal sources and make/break nodes for structured values.

use vectora_api_core::coercion::{
    to_color, to_object_id, to_scaler, to_text, to_transform, to_vector2,
};
use vectora_api_core::{Color, Transform, Value, Vec2};

use super::{
    input_ref, keyed_output, single_output, BOOLEAN, COLOR, OBJECT, SCALER, TEXT, TRANSFORM,
    VECTOR2,
};
use crate::eval::EvalContext;
use crate::registry::{NodeInputs, NodeTypeDescriptor};
use crate::types::{GraphNode, OutputRecord};

const PRIMITIVE: &str = "#0b7a75";
const STRUCT: &str = "#7a4b0b";

pub fn descriptors() -> Vec<NodeTypeDescriptor> {
    vec![
        NodeTypeDescriptor::new("scaler", "Scaler", eval_scaler)
            .category("Primitive")
            .color(PRIMITIVE)
            .data("value", 0.0)
            .output("value", SCALER),
        NodeTypeDescriptor::new("boolean", "Boolean", eval_boolean)
            .category("Primitive")
            .color(PRIMITIVE)
            .data("value", false)
            .output("value", BOOLEAN),
        NodeTypeDescriptor::new("text", "Text", eval_text)
            .category("Primitive")
            .color(PRIMITIVE)
            .data("value", Value::Text(String::new()))
            .output("value", TEXT),
        NodeTypeDescriptor::new("color", "Color", eval_color)
            .category("Primitive")
            .color(PRIMITIVE)
            .data("value", Color::BLACK)
            .output("value", COLOR),
        NodeTypeDescriptor::new("get_object", "Get Object", eval_get_object)
            .category("Primitive")
            .color(PRIMITIVE)
            .data("object", Value::empty_object())
            .output("object", OBJECT),
        NodeTypeDescriptor::new("make_vector2", "Make Vector2", eval_make_vector2)
            .category("Struct")
            .color(STRUCT)
            .input("x", SCALER, 0.0)
            .input("y", SCALER, 0.0)
            .output("value", VECTOR2),
        NodeTypeDescriptor::new("break_vector2", "Break Vector2", eval_break_vector2)
            .category("Struct")
            .color(STRUCT)
            .input("vector", VECTOR2, Vec2::ZERO)
            .output("x", SCALER)
            .output("y", SCALER),
        NodeTypeDescriptor::new("make_transform", "Make Transform", eval_make_transform)
            .category("Struct")
            .color(STRUCT)
            .input("translate", VECTOR2, Vec2::ZERO)
            .input("rotate", SCALER, 0.0)
            .input("scale", VECTOR2, Vec2::ONE)
            .input("origin", VECTOR2, Vec2::ZERO)
            .output("value", TRANSFORM),
        NodeTypeDescriptor::new("break_transform", "Break Transform", eval_break_transform)
            .category("Struct")
            .color(STRUCT)
            .input("transform", TRANSFORM, Transform::IDENTITY)
            .output("translate", VECTOR2)
            .output("rotate", SCALER)
            .output("scale", VECTOR2)
            .output("origin", VECTOR2),
        NodeTypeDescriptor::new("make_color", "Make Color", eval_make_color)
            .category("Struct")
            .color(STRUCT)
            .input("r", SCALER, 0.0)
            .input("g", SCALER, 0.0)
            .input("b", SCALER, 0.0)
            .input("a", SCALER, 1.0)
            .output("value", COLOR),
        NodeTypeDescriptor::new("break_color", "Break Color", eval_break_color)
            .category("Struct")
            .color(STRUCT)
            .input("color", COLOR, Color::BLACK)
            .output("r", SCALER)
            .output("g", SCALER)
            .output("b", SCALER)
            .output("a", SCALER),
        NodeTypeDescriptor::new("polar_coord", "Polar Coord", eval_polar_coord)
            .category("Struct")
            .color(STRUCT)
            .input("rotate", SCALER, 0.0)
            .input("radius", SCALER, 1.0)
            .output("vector2", VECTOR2),
        NodeTypeDescriptor::new("invert_polar_coord", "Invert Polar Coord", eval_invert_polar_coord)
            .category("Struct")
            .color(STRUCT)
            .input("vector2", VECTOR2, Vec2::new(1.0, 0.0))
            .output("rotate", SCALER)
            .output("radius", SCALER),
    ]
}

fn data_or_undefined<'a>(node: &'a GraphNode, key: &str) -> &'a Value {
    static UNDEFINED: Value = Value::Undefined;
    node.data_value(key).unwrap_or(&UNDEFINED)
}

fn eval_scaler(_: &NodeInputs, node: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    single_output(Value::Scaler(to_scaler(data_or_undefined(node, "value"))))
}

fn eval_boolean(_: &NodeInputs, node: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let value = matches!(data_or_undefined(node, "value"), Value::Boolean(true));
    single_output(Value::Boolean(value))
}

fn eval_text(_: &NodeInputs, node: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    single_output(Value::Text(to_text(data_or_undefined(node, "value"))))
}

fn eval_color(_: &NodeInputs, node: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    single_output(Value::Color(to_color(data_or_undefined(node, "value"))))
}

fn eval_get_object(_: &NodeInputs, node: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    keyed_output(
        "object",
        Value::Object(to_object_id(data_or_undefined(node, "object"))),
    )
}

fn eval_make_vector2(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let x = to_scaler(input_ref(inputs, "x"));
    let y = to_scaler(input_ref(inputs, "y"));
    single_output(Value::vector2(x, y))
}

fn eval_break_vector2(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let v = to_vector2(input_ref(inputs, "vector"));
    let mut map = keyed_output("x", Value::Scaler(v.x));
    map.insert("y".to_string(), Value::Scaler(v.y));
    map
}

fn eval_make_transform(
    inputs: &NodeInputs,
    _: &GraphNode,
    _: &mut dyn EvalContext,
) -> OutputRecord {
    single_output(Value::Transform(Transform::new(
        to_vector2(input_ref(inputs, "translate")),
        to_scaler(input_ref(inputs, "rotate")),
        to_vector2(input_ref(inputs, "scale")),
        to_vector2(input_ref(inputs, "origin")),
    )))
}

fn eval_break_transform(
    inputs: &NodeInputs,
    _: &GraphNode,
    _: &mut dyn EvalContext,
) -> OutputRecord {
    let t = to_transform(input_ref(inputs, "transform"));
    let mut map = keyed_output("translate", Value::Vector2(t.translate));
    map.insert("rotate".to_string(), Value::Scaler(t.rotate));
    map.insert("scale".to_string(), Value::Vector2(t.scale));
    map.insert("origin".to_string(), Value::Vector2(t.origin));
    map
}

fn eval_make_color(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    single_output(Value::Color(Color::rgba(
        to_scaler(input_ref(inputs, "r")),
        to_scaler(input_ref(inputs, "g")),
        to_scaler(input_ref(inputs, "b")),
        to_scaler(input_ref(inputs, "a")),
    )))
}

fn eval_break_color(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let c = to_color(input_ref(inputs, "color"));
    let mut map = keyed_output("r", Value::Scaler(c.r));
    map.insert("g".to_string(), Value::Scaler(c.g));
    map.insert("b".to_string(), Value::Scaler(c.b));
    map.insert("a".to_string(), Value::Scaler(c.a));
    map
}

fn eval_polar_coord(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let rotate = to_scaler(input_ref(inputs, "rotate"));
    let radius = to_scaler(input_ref(inputs, "radius"));
    keyed_output("vector2", Value::Vector2(Vec2::from_polar(rotate, radius)))
}

fn eval_invert_polar_coord(
    inputs: &NodeInputs,
    _: &GraphNode,
    _: &mut dyn EvalContext,
) -> OutputRecord {
    let v = to_vector2(input_ref(inputs, "vector2"));
    let mut map = keyed_output("rotate", Value::Scaler(v.angle()));
    map.insert("radius".to_string(), Value::Scaler(v.length()));
    map
}
