//! Nodes polymorphic over the type resolved on their generics chain.
//!
//! Computations branch on the resolved kind and degrade to a neutral value
//! (`undefined` or `false`) for kinds they do not handle; `get_errors` reports
//! those kinds for display.

use vectora_api_core::coercion::{to_bool, to_color, to_scaler, to_text, to_transform, to_vector2};
use vectora_api_core::{Structure, Value, ValueKind, ValueType};

use super::{input, input_ref, single_output, BOOLEAN, GENERICS, SCALER};
use crate::eval::EvalContext;
use crate::generics::{check_supported, chain_type, slots_kind, unsupported_type_error};
use crate::registry::{Computation, NodeInputs, NodeTypeDescriptor, SlotRef};
use crate::types::{GraphNode, OutputRecord};

const GENERIC: &str = "#5a3a9a";

const ARITHMETIC_CHAIN: &[(&str, bool)] = &[("a", false), ("b", false), ("value", true)];
const EQUAL_CHAIN: &[(&str, bool)] = &[("a", false), ("b", false)];
const SWITCH_CHAIN: &[(&str, bool)] = &[("if_true", false), ("if_false", false), ("value", true)];

const ADD_KINDS: &[ValueKind] = &[
    ValueKind::Scaler,
    ValueKind::Vector2,
    ValueKind::Transform,
    ValueKind::Text,
];
const SUB_KINDS: &[ValueKind] = &[ValueKind::Scaler, ValueKind::Vector2, ValueKind::Transform];
const LERP_KINDS: &[ValueKind] = &[
    ValueKind::Scaler,
    ValueKind::Vector2,
    ValueKind::Transform,
    ValueKind::Color,
];
const EQUAL_KINDS: &[ValueKind] = &[
    ValueKind::Boolean,
    ValueKind::Scaler,
    ValueKind::Vector2,
    ValueKind::Text,
    ValueKind::Color,
    ValueKind::Transform,
    ValueKind::Object,
];

pub fn descriptors() -> Vec<NodeTypeDescriptor> {
    vec![
        arithmetic("add_generics", "Add", eval_add).errors(add_errors),
        arithmetic("sub_generics", "Sub", eval_sub).errors(sub_errors),
        arithmetic("lerp_generics", "Lerp", eval_lerp)
            .input("alpha", SCALER, 0.5)
            .errors(lerp_errors),
        NodeTypeDescriptor::new("equal_generics", "Equal", eval_equal)
            .category("Generics")
            .color(GENERIC)
            .input("a", GENERICS, Value::Undefined)
            .input("b", GENERICS, Value::Undefined)
            .output("value", BOOLEAN)
            .chains(&[EQUAL_CHAIN])
            .errors(equal_errors),
        NodeTypeDescriptor::new("switch_generics", "Switch", eval_switch)
            .category("Generics")
            .color(GENERIC)
            .input("condition", BOOLEAN, false)
            .input("if_true", GENERICS, Value::Undefined)
            .input("if_false", GENERICS, Value::Undefined)
            .output("value", GENERICS)
            .chains(&[SWITCH_CHAIN]),
        NodeTypeDescriptor::new("make_array", "Make Array", eval_make_array)
            .category("Generics")
            .color(GENERIC)
            .variadic("item", GENERICS, Value::Undefined, 2)
            .derived_output("value", array_output_type)
            .dynamic_chains(item_chain)
            .accepts(unit_items)
            .errors(array_errors),
    ]
}

fn arithmetic(type_tag: &'static str, label: &'static str, f: Computation) -> NodeTypeDescriptor {
    NodeTypeDescriptor::new(type_tag, label, f)
        .category("Generics")
        .color(GENERIC)
        .input("a", GENERICS, Value::Undefined)
        .input("b", GENERICS, Value::Undefined)
        .output("value", GENERICS)
        .chains(&[ARITHMETIC_CHAIN])
}

fn eval_add(inputs: &NodeInputs, node: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let (a, b) = (input_ref(inputs, "a"), input_ref(inputs, "b"));
    let value = match slots_kind(node, ARITHMETIC_CHAIN) {
        ValueKind::Scaler => Value::Scaler(to_scaler(a) + to_scaler(b)),
        ValueKind::Vector2 => Value::Vector2(to_vector2(a).add(to_vector2(b))),
        ValueKind::Transform => Value::Transform(to_transform(a).add_pose(&to_transform(b))),
        ValueKind::Text => Value::Text(to_text(a) + &to_text(b)),
        _ => Value::Undefined,
    };
    single_output(value)
}

fn eval_sub(inputs: &NodeInputs, node: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let (a, b) = (input_ref(inputs, "a"), input_ref(inputs, "b"));
    let value = match slots_kind(node, ARITHMETIC_CHAIN) {
        ValueKind::Scaler => Value::Scaler(to_scaler(a) - to_scaler(b)),
        ValueKind::Vector2 => Value::Vector2(to_vector2(a).sub(to_vector2(b))),
        ValueKind::Transform => Value::Transform(to_transform(a).sub_pose(&to_transform(b))),
        _ => Value::Undefined,
    };
    single_output(value)
}

fn eval_lerp(inputs: &NodeInputs, node: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let (a, b) = (input_ref(inputs, "a"), input_ref(inputs, "b"));
    let t = to_scaler(input_ref(inputs, "alpha"));
    let value = match slots_kind(node, ARITHMETIC_CHAIN) {
        ValueKind::Scaler => {
            let (a, b) = (to_scaler(a), to_scaler(b));
            Value::Scaler(a + (b - a) * t)
        }
        ValueKind::Vector2 => Value::Vector2(to_vector2(a).lerp(to_vector2(b), t)),
        ValueKind::Transform => Value::Transform(to_transform(a).lerp(&to_transform(b), t)),
        ValueKind::Color => Value::Color(to_color(a).lerp(to_color(b), t)),
        _ => Value::Undefined,
    };
    single_output(value)
}

fn eval_equal(inputs: &NodeInputs, node: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let kind = slots_kind(node, EQUAL_CHAIN);
    let (a, b) = (input_ref(inputs, "a"), input_ref(inputs, "b"));
    let equal = match kind {
        ValueKind::Boolean => to_bool(a) == to_bool(b),
        ValueKind::Scaler => to_scaler(a) == to_scaler(b),
        ValueKind::Vector2 => to_vector2(a) == to_vector2(b),
        ValueKind::Text => to_text(a) == to_text(b),
        ValueKind::Color | ValueKind::Transform | ValueKind::Object => {
            a.kind() == Some(kind) && a == b
        }
        _ => false,
    };
    single_output(Value::Boolean(equal))
}

/// Pass-through; the chain only constrains what may be connected.
fn eval_switch(inputs: &NodeInputs, _: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let key = if to_bool(input_ref(inputs, "condition")) {
        "if_true"
    } else {
        "if_false"
    };
    single_output(input(inputs, key))
}

fn add_errors(node: &GraphNode) -> Option<Vec<String>> {
    check_supported(node, ARITHMETIC_CHAIN, ADD_KINDS)
}

fn sub_errors(node: &GraphNode) -> Option<Vec<String>> {
    check_supported(node, ARITHMETIC_CHAIN, SUB_KINDS)
}

fn lerp_errors(node: &GraphNode) -> Option<Vec<String>> {
    check_supported(node, ARITHMETIC_CHAIN, LERP_KINDS)
}

fn equal_errors(node: &GraphNode) -> Option<Vec<String>> {
    check_supported(node, EQUAL_CHAIN, EQUAL_KINDS)
}

fn item_keys(node: &GraphNode) -> Vec<(usize, &str)> {
    let mut keys: Vec<(usize, &str)> = node
        .inputs
        .keys()
        .filter_map(|key| {
            let index = key.strip_prefix("item_")?.parse().ok()?;
            Some((index, key.as_str()))
        })
        .collect();
    keys.sort_unstable_by_key(|(index, _)| *index);
    keys
}

/// Every `item_*` input shares one type. The array output is not a member:
/// its type is derived from the items.
fn item_chain(node: &GraphNode, key: &str, is_output: bool) -> Vec<SlotRef> {
    if is_output || !key.starts_with("item_") {
        return Vec::new();
    }
    item_keys(node)
        .into_iter()
        .map(|(_, key)| SlotRef::input(key))
        .collect()
}

fn item_type(node: &GraphNode) -> Option<&ValueType> {
    let items: Vec<SlotRef> = item_keys(node)
        .into_iter()
        .map(|(_, key)| SlotRef::input(key))
        .collect();
    chain_type(node, &items)
}

/// Arrays of arrays have no type, so array items are refused at connect time.
fn unit_items(_: &GraphNode, _: &str, producer: &ValueType) -> bool {
    producer.structure == Structure::Unit
}

/// `ARRAY(kind)` of the pinned item kind. Items pinned to an array type
/// (through a literal or a later pin upstream) leave the output unresolved.
fn array_output_type(node: &GraphNode) -> ValueType {
    let kind = item_type(node)
        .filter(|ty| ty.structure == Structure::Unit)
        .map(|ty| ty.kind)
        .unwrap_or(ValueKind::Generics);
    ValueType::array(kind)
}

fn array_errors(node: &GraphNode) -> Option<Vec<String>> {
    item_type(node)
        .filter(|ty| ty.structure == Structure::Array)
        .map(|ty| vec![unsupported_type_error(ty)])
}

fn eval_make_array(inputs: &NodeInputs, node: &GraphNode, _: &mut dyn EvalContext) -> OutputRecord {
    let items = item_keys(node)
        .into_iter()
        .map(|(_, key)| input(inputs, key))
        .collect();
    single_output(Value::Array(items))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{assert_close, compute_in, node_with};
    use super::*;
    use crate::eval::NullContext;
    use crate::types::InputSlot;
    use vectora_api_core::{Color, ObjectId, Transform, Vec2};

    fn pinned(type_tag: &str, kind: ValueKind, literals: &[(&str, Value)]) -> GraphNode {
        let mut node = node_with(type_tag, literals);
        for key in ["a", "b"] {
            if let Some(slot) = node.inputs.get_mut(key) {
                slot.generics_type = Some(ValueType::unit(kind));
            }
        }
        node
    }

    fn run(node: &GraphNode) -> Value {
        compute_in(node, &mut NullContext)["value"].clone()
    }

    fn errors(node: &GraphNode) -> Option<Vec<String>> {
        crate::registry::Registry::builtin()
            .descriptor_for(node)
            .and_then(|descriptor| descriptor.errors_for(node))
    }

    #[test]
    fn add_follows_the_resolved_kind() {
        let node = pinned(
            "add_generics",
            ValueKind::Scaler,
            &[("a", Value::Scaler(1.5)), ("b", Value::Scaler(2.0))],
        );
        assert_eq!(run(&node), Value::Scaler(3.5));

        let node = pinned(
            "add_generics",
            ValueKind::Vector2,
            &[("a", Value::vector2(1.0, 2.0)), ("b", Value::vector2(3.0, 4.0))],
        );
        assert_eq!(run(&node), Value::vector2(4.0, 6.0));
        assert_eq!(errors(&node), None);
    }

    #[test]
    fn sub_transforms_use_pose_difference() {
        let a = Transform::from_translate(Vec2::new(5.0, 5.0));
        let b = Transform::from_translate(Vec2::new(2.0, 1.0));
        let node = pinned(
            "sub_generics",
            ValueKind::Transform,
            &[("a", Value::Transform(a)), ("b", Value::Transform(b))],
        );
        match run(&node) {
            Value::Transform(t) => assert_eq!(t.translate, Vec2::new(3.0, 4.0)),
            other => panic!("expected transform, got {:?}", other),
        }
    }

    #[test]
    fn lerp_colors_by_alpha() {
        let node = pinned(
            "lerp_generics",
            ValueKind::Color,
            &[
                ("a", Value::Color(Color::rgba(0.0, 0.0, 0.0, 1.0))),
                ("b", Value::Color(Color::rgba(200.0, 100.0, 0.0, 1.0))),
                ("alpha", Value::Scaler(0.25)),
            ],
        );
        match run(&node) {
            Value::Color(c) => {
                assert_close(c.r, 50.0);
                assert_close(c.g, 25.0);
            }
            other => panic!("expected color, got {:?}", other),
        }
    }

    #[test]
    fn unsupported_kinds_are_neutral_and_reported() {
        let objects = [("a", Value::object("x")), ("b", Value::object("y"))];
        for tag in ["add_generics", "sub_generics", "lerp_generics"] {
            let node = pinned(tag, ValueKind::Object, &objects);
            assert_eq!(run(&node), Value::Undefined, "{tag}");
            let reported = errors(&node).expect("diagnostics");
            assert!(!reported.is_empty());
            assert!(reported[0].contains("OBJECT"), "{:?}", reported);
        }

        let paths = [("a", Value::PathD(Vec::new())), ("b", Value::PathD(Vec::new()))];
        let node = pinned("equal_generics", ValueKind::PathD, &paths);
        assert_eq!(run(&node), Value::Boolean(false));
        assert!(errors(&node).is_some_and(|e| !e.is_empty()));
    }

    #[test]
    fn unresolved_chain_is_neutral_without_diagnostics() {
        let node = node_with(
            "add_generics",
            &[("a", Value::Scaler(1.0)), ("b", Value::Scaler(2.0))],
        );
        assert_eq!(run(&node), Value::Undefined);
        assert_eq!(errors(&node), None);
    }

    #[test]
    fn output_stamp_alone_resolves_the_chain() {
        let mut node = node_with(
            "add_generics",
            &[("a", Value::Scaler(1.0)), ("b", Value::Scaler(2.0))],
        );
        node.output_generics
            .insert("value".to_string(), ValueType::unit(ValueKind::Scaler));
        assert_eq!(run(&node), Value::Scaler(3.0));
    }

    #[test]
    fn equal_compares_objects_by_id() {
        let node = pinned(
            "equal_generics",
            ValueKind::Object,
            &[("a", Value::Object(ObjectId::new("o1"))), ("b", Value::object("o1"))],
        );
        assert_eq!(run(&node), Value::Boolean(true));
        assert_eq!(errors(&node), None);
    }

    #[test]
    fn switch_picks_a_branch() {
        let literals = [
            ("condition", Value::Boolean(true)),
            ("if_true", Value::Text("yes".into())),
            ("if_false", Value::Text("no".into())),
        ];
        let node = node_with("switch_generics", &literals);
        assert_eq!(run(&node), Value::Text("yes".into()));
        let node = node_with("switch_generics", &literals[1..]);
        assert_eq!(run(&node), Value::Text("no".into()));
    }

    #[test]
    fn make_array_collects_items_in_index_order() {
        let mut node = node_with("make_array", &[]);
        node.inputs.clear();
        node.inputs.insert("item_2".into(), InputSlot::literal(3.0));
        node.inputs.insert("item_0".into(), InputSlot::literal(1.0));
        node.inputs.insert("item_1".into(), InputSlot::literal(2.0));
        assert_eq!(
            run(&node),
            Value::Array(vec![Value::Scaler(1.0), Value::Scaler(2.0), Value::Scaler(3.0)])
        );
    }

    #[test]
    fn make_array_chain_spans_every_item() {
        let mut node = node_with("make_array", &[]);
        node.inputs.insert("item_2".into(), InputSlot::literal(Value::Undefined));
        let chain = item_chain(&node, "item_0", false);
        assert_eq!(chain.len(), 3);
        assert!(item_chain(&node, "value", true).is_empty());
        assert_eq!(array_output_type(&node), ValueType::array(ValueKind::Generics));
    }

    #[test]
    fn make_array_reports_items_pinned_to_arrays() {
        let mut node = node_with("make_array", &[]);
        let nested = ValueType::array(ValueKind::Scaler);
        for slot in node.inputs.values_mut() {
            slot.generics_type = Some(nested.clone());
        }
        assert_eq!(array_output_type(&node), ValueType::array(ValueKind::Generics));
        assert_eq!(errors(&node), Some(vec!["Invalid type: SCALER[]".to_string()]));

        for slot in node.inputs.values_mut() {
            slot.generics_type = Some(ValueType::unit(ValueKind::Vector2));
        }
        assert_eq!(array_output_type(&node), ValueType::array(ValueKind::Vector2));
        assert_eq!(errors(&node), None);
        assert!(unit_items(&node, "item_0", &ValueType::generics()));
        assert!(!unit_items(&node, "item_0", &nested));
    }
}
