//! Gradient stops and gradient objects.

use hashbrown::HashMap;
use vectora_api_core::coercion::{
    to_bool, to_color, to_object_id, to_scaler, to_stop_list, to_vector2,
};
use vectora_api_core::{Color, GradientStop, ObjectId, Value, Vec2};

use super::object::attr_number;
use super::{
    input_ref, keyed_output, single_output, BOOLEAN, COLOR, OBJECT, SCALER, STOP_LIST, VECTOR2,
};
use crate::eval::{EvalContext, ObjectKind, ObjectProps};
use crate::registry::{Computation, NodeInputs, NodeTypeDescriptor};
use crate::types::{GraphNode, OutputRecord};

const GRADIENT: &str = "#8a1a5a";

fn gradient(type_tag: &'static str, label: &'static str, f: Computation) -> NodeTypeDescriptor {
    NodeTypeDescriptor::new(type_tag, label, f)
        .category("Gradient")
        .color(GRADIENT)
        .width(170.0)
        .input("disabled", BOOLEAN, false)
        .input("parent", OBJECT, Value::empty_object())
        .input("stop", STOP_LIST, Value::StopList(Vec::new()))
        .input("relative", BOOLEAN, true)
}

pub fn descriptors() -> Vec<NodeTypeDescriptor> {
    vec![
        NodeTypeDescriptor::new("make_stop", "Stop", eval_make_stop)
            .category("Gradient")
            .color(GRADIENT)
            .input("offset", SCALER, 0.0)
            .input("color", COLOR, Color::BLACK)
            .output("value", STOP_LIST),
        NodeTypeDescriptor::new("join_stops", "Join Stops", eval_join_stops)
            .category("Gradient")
            .color(GRADIENT)
            .input("a", STOP_LIST, Value::StopList(Vec::new()))
            .input("b", STOP_LIST, Value::StopList(Vec::new()))
            .output("value", STOP_LIST),
        gradient("create_linear_gradient", "Linear Gradient", eval_linear)
            .input("from", VECTOR2, Vec2::ZERO)
            .input("to", VECTOR2, Vec2::new(1.0, 0.0))
            .output("gradient", OBJECT),
        gradient("create_radial_gradient", "Radial Gradient", eval_radial)
            .input("center", VECTOR2, Vec2::new(0.5, 0.5))
            .input("radius", SCALER, 0.5)
            .output("gradient", OBJECT),
    ]
}

fn eval_make_stop(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let offset = to_scaler(input_ref(inputs, "offset"));
    let stop = GradientStop {
        offset: if offset.is_finite() { offset.clamp(0.0, 1.0) } else { 0.0 },
        color: to_color(input_ref(inputs, "color")),
    };
    single_output(Value::StopList(vec![stop]))
}

/// Concatenate and order by offset. Equal offsets keep `a` before `b`.
fn eval_join_stops(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let mut stops = to_stop_list(input_ref(inputs, "a"));
    stops.extend(to_stop_list(input_ref(inputs, "b")));
    stops.sort_by(|x, y| x.offset.total_cmp(&y.offset));
    single_output(Value::StopList(stops))
}

fn attributes(pairs: &[(&str, String)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

/// Create the gradient element, then one `stop` child per stop.
fn create_gradient(
    kind: ObjectKind,
    inputs: &NodeInputs,
    ctx: &mut dyn EvalContext,
    geometry: &[(&str, String)],
) -> OutputRecord {
    if to_bool(input_ref(inputs, "disabled")) {
        return keyed_output("gradient", Value::Object(ObjectId::empty()));
    }
    let units = if to_bool(input_ref(inputs, "relative")) {
        "objectBoundingBox"
    } else {
        "userSpaceOnUse"
    };
    let mut attrs = attributes(geometry);
    attrs.insert("gradientUnits".to_string(), units.to_string());
    let props = ObjectProps {
        attributes: attrs,
        ..ObjectProps::under(&to_object_id(input_ref(inputs, "parent")))
    };
    let id = ctx.create_object(kind, props);

    for stop in to_stop_list(input_ref(inputs, "stop")) {
        let props = ObjectProps {
            attributes: attributes(&[
                ("offset", attr_number(stop.offset)),
                ("stop-color", stop.color.to_css_rgb()),
                ("stop-opacity", attr_number(stop.color.opacity())),
            ]),
            ..ObjectProps::under(&id)
        };
        ctx.create_object(ObjectKind::Stop, props);
    }
    keyed_output("gradient", Value::Object(id))
}

fn eval_linear(inputs: &NodeInputs, _: &GraphNode, ctx: &mut dyn EvalContext) -> OutputRecord {
    let from = to_vector2(input_ref(inputs, "from"));
    let to = to_vector2(input_ref(inputs, "to"));
    let geometry = [
        ("x1", attr_number(from.x)),
        ("y1", attr_number(from.y)),
        ("x2", attr_number(to.x)),
        ("y2", attr_number(to.y)),
    ];
    create_gradient(ObjectKind::LinearGradient, inputs, ctx, &geometry)
}

fn eval_radial(inputs: &NodeInputs, _: &GraphNode, ctx: &mut dyn EvalContext) -> OutputRecord {
    let center = to_vector2(input_ref(inputs, "center"));
    let radius = to_scaler(input_ref(inputs, "radius"));
    let geometry = [
        ("cx", attr_number(center.x)),
        ("cy", attr_number(center.y)),
        ("r", attr_number(radius)),
    ];
    create_gradient(ObjectKind::RadialGradient, inputs, ctx, &geometry)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{compute, compute_in, node_with};
    use super::*;
    use crate::eval::SceneStore;

    fn stop(offset: f64, color: Color) -> Value {
        let literals = [("offset", Value::Scaler(offset)), ("color", Value::Color(color))];
        compute("make_stop", &literals)["value"].clone()
    }

    #[test]
    fn make_stop_clamps_offset() {
        assert_eq!(
            stop(1.5, Color::BLACK),
            Value::StopList(vec![GradientStop {
                offset: 1.0,
                color: Color::BLACK,
            }])
        );
    }

    #[test]
    fn join_orders_by_offset() {
        let red = Color::rgba(255.0, 0.0, 0.0, 1.0);
        let out = compute("join_stops", &[("a", stop(0.8, red)), ("b", stop(0.2, Color::BLACK))]);
        let stops = to_stop_list(&out["value"]);
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].offset, 0.2);
        assert_eq!(stops[1].color, red);
    }

    #[test]
    fn linear_gradient_creates_stop_children() {
        let red = Color::rgba(255.0, 0.0, 0.0, 0.5);
        let stops = compute(
            "join_stops",
            &[("a", stop(0.0, Color::BLACK)), ("b", stop(1.0, red))],
        );
        let mut scene = SceneStore::new();
        let node = node_with(
            "create_linear_gradient",
            &[("stop", stops["value"].clone()), ("to", Value::vector2(0.0, 1.0))],
        );
        let out = compute_in(&node, &mut scene);
        let Value::Object(id) = &out["gradient"] else {
            panic!("expected object");
        };
        let gradient = scene.get(id).expect("created");
        assert_eq!(gradient.kind, ObjectKind::LinearGradient);
        assert_eq!(gradient.attributes["y2"], "1");
        assert_eq!(gradient.attributes["gradientUnits"], "objectBoundingBox");

        let children: Vec<_> = scene.children_of(id).collect();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.kind == ObjectKind::Stop));
        assert_eq!(children[1].attributes["stop-color"], "rgb(255,0,0)");
        assert_eq!(children[1].attributes["stop-opacity"], "0.5");
        assert_eq!(scene.call_count(), 3);
    }

    #[test]
    fn disabled_gradient_makes_no_calls() {
        let mut scene = SceneStore::new();
        let node = node_with(
            "create_radial_gradient",
            &[("disabled", Value::Boolean(true)), ("stop", stop(0.5, Color::BLACK))],
        );
        let out = compute_in(&node, &mut scene);
        assert_eq!(out["gradient"], Value::empty_object());
        assert_eq!(scene.call_count(), 0);
    }
}
