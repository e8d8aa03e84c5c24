//! Path data builders. Each node appends one segment to the incoming `d`.

use vectora_api_core::coercion::{to_path_d, to_vector2};
use vectora_api_core::{PathCommand, Value, Vec2};

use super::{input_ref, keyed_output, PATH_D, VECTOR2};
use crate::eval::EvalContext;
use crate::registry::{Computation, NodeInputs, NodeTypeDescriptor};
use crate::types::{GraphNode, OutputRecord};

const PATH: &str = "#4a7a1a";

fn segment(type_tag: &'static str, label: &'static str, f: Computation) -> NodeTypeDescriptor {
    NodeTypeDescriptor::new(type_tag, label, f)
        .category("Path")
        .color(PATH)
        .input("d", PATH_D, Value::PathD(Vec::new()))
}

pub fn descriptors() -> Vec<NodeTypeDescriptor> {
    vec![
        segment("make_path_m", "Move To", eval_m)
            .input("p", VECTOR2, Vec2::ZERO)
            .output("d", PATH_D),
        segment("make_path_l", "Line To", eval_l)
            .input("p", VECTOR2, Vec2::ZERO)
            .output("d", PATH_D),
        segment("make_path_q", "Quadratic To", eval_q)
            .input("c", VECTOR2, Vec2::ZERO)
            .input("p", VECTOR2, Vec2::ZERO)
            .output("d", PATH_D),
        segment("make_path_c", "Cubic To", eval_c)
            .input("c1", VECTOR2, Vec2::ZERO)
            .input("c2", VECTOR2, Vec2::ZERO)
            .input("p", VECTOR2, Vec2::ZERO)
            .output("d", PATH_D),
        segment("make_path_z", "Close Path", eval_z).output("d", PATH_D),
    ]
}

fn point(inputs: &NodeInputs, key: &str) -> Vec2 {
    to_vector2(input_ref(inputs, key))
}

fn append(inputs: &NodeInputs, command: PathCommand) -> OutputRecord {
    let mut d = to_path_d(input_ref(inputs, "d"));
    d.push(command);
    keyed_output("d", Value::PathD(d))
}

fn eval_m(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    append(inputs, PathCommand::M { p: point(inputs, "p") })
}

fn eval_l(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    append(inputs, PathCommand::L { p: point(inputs, "p") })
}

fn eval_q(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    append(
        inputs,
        PathCommand::Q {
            c: point(inputs, "c"),
            p: point(inputs, "p"),
        },
    )
}

fn eval_c(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    append(
        inputs,
        PathCommand::C {
            c1: point(inputs, "c1"),
            c2: point(inputs, "c2"),
            p: point(inputs, "p"),
        },
    )
}

fn eval_z(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    append(inputs, PathCommand::Z)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::compute;
    use super::*;
    use vectora_api_core::to_svg_d;

    #[test]
    fn segments_append_in_order() {
        let out = compute("make_path_m", &[("p", Value::vector2(0.0, 0.0))]);
        let out = compute(
            "make_path_q",
            &[
                ("d", out["d"].clone()),
                ("c", Value::vector2(10.0, 5.0)),
                ("p", Value::vector2(5.0, 5.0)),
            ],
        );
        let out = compute("make_path_z", &[("d", out["d"].clone())]);
        assert_eq!(to_svg_d(&to_path_d(&out["d"])), "M0,0 Q10,5 5,5 Z");
    }

    #[test]
    fn missing_d_starts_a_new_path() {
        let out = compute(
            "make_path_l",
            &[("d", Value::Undefined), ("p", Value::vector2(1.0, 2.0))],
        );
        assert_eq!(
            out["d"],
            Value::PathD(vec![PathCommand::L {
                p: Vec2::new(1.0, 2.0)
            }])
        );
    }
}
