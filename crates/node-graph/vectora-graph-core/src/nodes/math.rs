//! Scalar arithmetic, trigonometry, clamping and boolean logic.

use vectora_api_core::coercion::{to_bool, to_scaler};
use vectora_api_core::Value;

use super::{input_ref, single_output, BOOLEAN, SCALER};
use crate::eval::EvalContext;
use crate::registry::{Computation, NodeInputs, NodeTypeDescriptor};
use crate::types::{GraphNode, OutputRecord};

const MATH: &str = "#3a5a9a";
const LOGIC: &str = "#7a2b5a";

fn binary_scaler(
    type_tag: &'static str,
    label: &'static str,
    f: Computation,
) -> NodeTypeDescriptor {
    NodeTypeDescriptor::new(type_tag, label, f)
        .category("Math")
        .color(MATH)
        .input("a", SCALER, 0.0)
        .input("b", SCALER, 0.0)
        .output("value", SCALER)
}

fn binary_bool(type_tag: &'static str, label: &'static str, f: Computation) -> NodeTypeDescriptor {
    NodeTypeDescriptor::new(type_tag, label, f)
        .category("Logic")
        .color(LOGIC)
        .input("a", BOOLEAN, false)
        .input("b", BOOLEAN, false)
        .output("value", BOOLEAN)
}

pub fn descriptors() -> Vec<NodeTypeDescriptor> {
    vec![
        binary_scaler("add_scaler", "Add Scaler", eval_add),
        binary_scaler("sub_scaler", "Sub Scaler", eval_sub),
        binary_scaler("multi_scaler", "Multi Scaler", eval_multi),
        binary_scaler("divide_scaler", "Divide Scaler", eval_divide),
        NodeTypeDescriptor::new("sin", "Sin", eval_sin)
            .category("Math")
            .color(MATH)
            .input("rotate", SCALER, 0.0)
            .output("value", SCALER),
        NodeTypeDescriptor::new("cos", "Cos", eval_cos)
            .category("Math")
            .color(MATH)
            .input("rotate", SCALER, 0.0)
            .output("value", SCALER),
        NodeTypeDescriptor::new("clamp", "Clamp", eval_clamp)
            .category("Math")
            .color(MATH)
            .input("number", SCALER, 0.0)
            .input("from", SCALER, 0.0)
            .input("to", SCALER, 1.0)
            .input("loop", BOOLEAN, false)
            .output("value", SCALER),
        NodeTypeDescriptor::new("not", "Not", eval_not)
            .category("Logic")
            .color(LOGIC)
            .input("condition", BOOLEAN, false)
            .output("value", BOOLEAN),
        binary_bool("and", "And", eval_and),
        binary_bool("or", "Or", eval_or),
    ]
}

fn operands(inputs: &NodeInputs) -> (f64, f64) {
    (to_scaler(input_ref(inputs, "a")), to_scaler(input_ref(inputs, "b")))
}

fn eval_add(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let (a, b) = operands(inputs);
    single_output(Value::Scaler(a + b))
}

fn eval_sub(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let (a, b) = operands(inputs);
    single_output(Value::Scaler(a - b))
}

fn eval_multi(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let (a, b) = operands(inputs);
    single_output(Value::Scaler(a * b))
}

/// Division by zero yields 0 rather than an infinity leaking downstream.
fn eval_divide(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let (a, b) = operands(inputs);
    single_output(Value::Scaler(if b != 0.0 { a / b } else { 0.0 }))
}

fn eval_sin(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let rotate = to_scaler(input_ref(inputs, "rotate"));
    single_output(Value::Scaler(rotate.to_radians().sin()))
}

fn eval_cos(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let rotate = to_scaler(input_ref(inputs, "rotate"));
    single_output(Value::Scaler(rotate.to_radians().cos()))
}

/// Clamp `number` into `[from, to]`, or wrap it around that range when
/// `looped`. The bounds may be given in either order; a NaN bound leaves that
/// side open. Wrapping needs a finite range and falls back to clamping.
pub fn clamp_number(number: f64, from: f64, to: f64, looped: bool) -> f64 {
    let from = if from.is_nan() { f64::NEG_INFINITY } else { from };
    let to = if to.is_nan() { f64::INFINITY } else { to };
    let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
    let span = hi - lo;
    if !looped || !span.is_finite() || number.is_nan() {
        return number.max(lo).min(hi);
    }
    if span == 0.0 {
        return lo;
    }
    (number - lo).rem_euclid(span) + lo
}

fn eval_clamp(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let number = to_scaler(input_ref(inputs, "number"));
    let from = to_scaler(input_ref(inputs, "from"));
    let to = to_scaler(input_ref(inputs, "to"));
    let looped = to_bool(input_ref(inputs, "loop"));
    single_output(Value::Scaler(clamp_number(number, from, to, looped)))
}

fn eval_not(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    single_output(Value::Boolean(!to_bool(input_ref(inputs, "condition"))))
}

fn eval_and(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let value = to_bool(input_ref(inputs, "a")) && to_bool(input_ref(inputs, "b"));
    single_output(Value::Boolean(value))
}

fn eval_or(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let value = to_bool(input_ref(inputs, "a")) || to_bool(input_ref(inputs, "b"));
    single_output(Value::Boolean(value))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{assert_close, compute};
    use super::*;

    fn clamp(number: f64, from: f64, to: f64, looped: bool) -> Value {
        compute(
            "clamp",
            &[
                ("number", Value::Scaler(number)),
                ("from", Value::Scaler(from)),
                ("to", Value::Scaler(to)),
                ("loop", Value::Boolean(looped)),
            ],
        )["value"]
            .clone()
    }

    #[test]
    fn clamp_limits_to_range() {
        assert_eq!(clamp(-1.0, 2.0, 3.0, false), Value::Scaler(2.0));
        assert_eq!(clamp(3.5, 2.0, 3.0, false), Value::Scaler(3.0));
        assert_eq!(clamp(2.5, 2.0, 3.0, false), Value::Scaler(2.5));
    }

    #[test]
    fn clamp_loop_wraps_around() {
        assert_eq!(clamp(21.0, 0.0, 10.0, true), Value::Scaler(1.0));
        assert_eq!(clamp(-11.0, -10.0, 0.0, true), Value::Scaler(-1.0));
    }

    #[test]
    fn clamp_survives_nan_and_infinite_bounds() {
        assert_eq!(clamp(1.0, f64::NAN, 3.0, false), Value::Scaler(1.0));
        assert_eq!(clamp(5.0, f64::NAN, 3.0, true), Value::Scaler(3.0));
        assert_eq!(clamp(-5.0, 0.0, f64::NAN, false), Value::Scaler(0.0));
        assert_eq!(clamp(f64::NAN, 0.0, 2.0, false), Value::Scaler(0.0));
        assert_eq!(clamp(7.0, f64::NEG_INFINITY, 2.0, true), Value::Scaler(2.0));
        assert_eq!(clamp(f64::NAN, 1.0, 4.0, true), Value::Scaler(1.0));
    }

    #[test]
    fn clamp_accepts_reversed_bounds() {
        assert_eq!(clamp_number(5.0, 3.0, 1.0, false), 3.0);
        assert_eq!(clamp_number(5.0, 2.0, 2.0, true), 2.0);
    }

    #[test]
    fn divide_by_zero_is_neutral() {
        let out = compute("divide_scaler", &[("a", Value::Scaler(4.0)), ("b", Value::Scaler(0.0))]);
        assert_eq!(out["value"], Value::Scaler(0.0));
        let out = compute("divide_scaler", &[("a", Value::Scaler(4.0)), ("b", Value::Scaler(2.0))]);
        assert_eq!(out["value"], Value::Scaler(2.0));
    }

    #[test]
    fn trig_takes_degrees() {
        let out = compute("sin", &[("rotate", Value::Scaler(90.0))]);
        assert_close(to_scaler(&out["value"]), 1.0);
        let out = compute("cos", &[("rotate", Value::Scaler(180.0))]);
        assert_close(to_scaler(&out["value"]), -1.0);
    }

    #[test]
    fn logic_nodes() {
        let out = compute("and", &[("a", Value::Boolean(true)), ("b", Value::Boolean(false))]);
        assert_eq!(out["value"], Value::Boolean(false));
        let out = compute("or", &[("a", Value::Boolean(true)), ("b", Value::Boolean(false))]);
        assert_eq!(out["value"], Value::Boolean(true));
        let out = compute("not", &[]);
        assert_eq!(out["value"], Value::Boolean(true));
    }
}
