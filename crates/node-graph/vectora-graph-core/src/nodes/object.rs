//! Scene object creation and mutation.
//!
//! Creator nodes short-circuit on `disabled` before reading anything else and
//! then create exactly one object. Mutators skip the empty object id.

use hashbrown::HashMap;
use vectora_api_core::coercion::{
    to_bool, to_color, to_object_id, to_path_d, to_scaler, to_transform,
};
use vectora_api_core::{to_svg_d, Color, ObjectId, Transform, Value};

use super::{input_ref, keyed_output, BOOLEAN, COLOR, OBJECT, PATH_D, SCALER, TRANSFORM};
use crate::eval::{EvalContext, ObjectKind, ObjectProps};
use crate::registry::{Computation, NodeInputs, NodeTypeDescriptor};
use crate::types::{GraphNode, OutputRecord};

const SCENE: &str = "#9a5a1a";

fn creator(type_tag: &'static str, label: &'static str, f: Computation) -> NodeTypeDescriptor {
    NodeTypeDescriptor::new(type_tag, label, f)
        .category("Object")
        .color(SCENE)
        .width(160.0)
        .input("disabled", BOOLEAN, false)
        .input("parent", OBJECT, Value::empty_object())
        .input("transform", TRANSFORM, Transform::IDENTITY)
}

fn shape(type_tag: &'static str, label: &'static str, f: Computation) -> NodeTypeDescriptor {
    creator(type_tag, label, f)
        .input("fill", COLOR, Color::BLACK)
        .input("stroke", COLOR, Color::TRANSPARENT)
        .input("stroke_width", SCALER, 0.0)
}

pub fn descriptors() -> Vec<NodeTypeDescriptor> {
    vec![
        shape("create_object_rect", "Rect", eval_rect)
            .input("width", SCALER, 100.0)
            .input("height", SCALER, 100.0)
            .input("radius", SCALER, 0.0)
            .output("object", OBJECT),
        shape("create_object_ellipse", "Ellipse", eval_ellipse)
            .input("rx", SCALER, 50.0)
            .input("ry", SCALER, 50.0)
            .output("object", OBJECT),
        shape("create_object_path", "Path", eval_path)
            .input("d", PATH_D, Value::PathD(Vec::new()))
            .output("object", OBJECT),
        creator("create_object_group", "Group", eval_group).output("object", OBJECT),
        NodeTypeDescriptor::new("get_transform", "Get Transform", eval_get_transform)
            .category("Object")
            .color(SCENE)
            .input("object", OBJECT, Value::empty_object())
            .output("transform", TRANSFORM),
        NodeTypeDescriptor::new("set_transform", "Set Transform", eval_set_transform)
            .category("Object")
            .color(SCENE)
            .input("object", OBJECT, Value::empty_object())
            .input("transform", TRANSFORM, Transform::IDENTITY)
            .output("object", OBJECT),
        NodeTypeDescriptor::new("set_fill", "Set Fill", eval_set_fill)
            .category("Object")
            .color(SCENE)
            .input("object", OBJECT, Value::empty_object())
            .input("color", COLOR, Color::BLACK)
            .output("object", OBJECT),
        NodeTypeDescriptor::new("set_stroke", "Set Stroke", eval_set_stroke)
            .category("Object")
            .color(SCENE)
            .input("object", OBJECT, Value::empty_object())
            .input("color", COLOR, Color::BLACK)
            .output("object", OBJECT),
    ]
}

/// Render a number for an SVG attribute.
pub(crate) fn attr_number(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        "0".to_string()
    }
}

fn object_output(id: ObjectId) -> OutputRecord {
    keyed_output("object", Value::Object(id))
}

fn disabled(inputs: &NodeInputs) -> bool {
    to_bool(input_ref(inputs, "disabled"))
}

fn base_props(inputs: &NodeInputs) -> ObjectProps {
    ObjectProps {
        transform: Some(to_transform(input_ref(inputs, "transform"))),
        ..ObjectProps::under(&to_object_id(input_ref(inputs, "parent")))
    }
}

fn create_shape(
    kind: ObjectKind,
    inputs: &NodeInputs,
    ctx: &mut dyn EvalContext,
    geometry: &[(&str, String)],
) -> OutputRecord {
    if disabled(inputs) {
        return object_output(ObjectId::empty());
    }
    let mut attributes: HashMap<String, String> = geometry
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    let stroke_width = to_scaler(input_ref(inputs, "stroke_width"));
    if stroke_width > 0.0 {
        attributes.insert("stroke-width".to_string(), attr_number(stroke_width));
    }
    let props = ObjectProps {
        fill: Some(to_color(input_ref(inputs, "fill"))),
        stroke: Some(to_color(input_ref(inputs, "stroke"))),
        attributes,
        ..base_props(inputs)
    };
    object_output(ctx.create_object(kind, props))
}

fn eval_rect(inputs: &NodeInputs, _: &GraphNode, ctx: &mut dyn EvalContext) -> OutputRecord {
    let number = |key| attr_number(to_scaler(input_ref(inputs, key)));
    let geometry = [
        ("width", number("width")),
        ("height", number("height")),
        ("rx", number("radius")),
    ];
    create_shape(ObjectKind::Rect, inputs, ctx, &geometry)
}

fn eval_ellipse(inputs: &NodeInputs, _: &GraphNode, ctx: &mut dyn EvalContext) -> OutputRecord {
    let number = |key| attr_number(to_scaler(input_ref(inputs, key)));
    let geometry = [("rx", number("rx")), ("ry", number("ry"))];
    create_shape(ObjectKind::Ellipse, inputs, ctx, &geometry)
}

fn eval_path(inputs: &NodeInputs, _: &GraphNode, ctx: &mut dyn EvalContext) -> OutputRecord {
    let d = to_svg_d(&to_path_d(input_ref(inputs, "d")));
    create_shape(ObjectKind::Path, inputs, ctx, &[("d", d)])
}

fn eval_group(inputs: &NodeInputs, _: &GraphNode, ctx: &mut dyn EvalContext) -> OutputRecord {
    if disabled(inputs) {
        return object_output(ObjectId::empty());
    }
    object_output(ctx.create_object(ObjectKind::Group, base_props(inputs)))
}

fn eval_get_transform(
    inputs: &NodeInputs,
    _: &GraphNode,
    ctx: &mut dyn EvalContext,
) -> OutputRecord {
    let id = to_object_id(input_ref(inputs, "object"));
    let transform = if id.is_empty() {
        Transform::IDENTITY
    } else {
        ctx.get_transform(&id)
    };
    keyed_output("transform", Value::Transform(transform))
}

fn eval_set_transform(
    inputs: &NodeInputs,
    _: &GraphNode,
    ctx: &mut dyn EvalContext,
) -> OutputRecord {
    let id = to_object_id(input_ref(inputs, "object"));
    if !id.is_empty() {
        ctx.set_transform(&id, to_transform(input_ref(inputs, "transform")));
    }
    object_output(id)
}

fn eval_set_fill(inputs: &NodeInputs, _: &GraphNode, ctx: &mut dyn EvalContext) -> OutputRecord {
    let id = to_object_id(input_ref(inputs, "object"));
    if !id.is_empty() {
        ctx.set_fill(&id, to_color(input_ref(inputs, "color")));
    }
    object_output(id)
}

fn eval_set_stroke(inputs: &NodeInputs, _: &GraphNode, ctx: &mut dyn EvalContext) -> OutputRecord {
    let id = to_object_id(input_ref(inputs, "object"));
    if !id.is_empty() {
        ctx.set_stroke(&id, to_color(input_ref(inputs, "color")));
    }
    object_output(id)
}
