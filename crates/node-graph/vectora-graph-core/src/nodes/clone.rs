//! Clone arrangements: linear repeat, circle, grid and tornado (spiral).
//!
//! Every variant validates its parameters before touching the context. On
//! invalid input the output is the empty group and no call is made. Otherwise
//! a clone group is created next to the source and each clone's transform is
//! the source transform with a per-instance placement layered on top.

use vectora_api_core::coercion::{to_bool, to_object_id, to_scaler, to_transform};
use vectora_api_core::{ObjectId, Transform, Value, Vec2};

use super::{input_ref, keyed_output, BOOLEAN, OBJECT, SCALER, TRANSFORM};
use crate::eval::{EvalContext, ObjectProps};
use crate::registry::{Computation, NodeInputs, NodeTypeDescriptor};
use crate::types::{GraphNode, OutputRecord};

const CLONE: &str = "#1a7a5a";

fn clone_node(type_tag: &'static str, label: &'static str, f: Computation) -> NodeTypeDescriptor {
    NodeTypeDescriptor::new(type_tag, label, f)
        .category("Clone")
        .color(CLONE)
        .width(180.0)
        .input("object", OBJECT, Value::empty_object())
}

pub fn descriptors() -> Vec<NodeTypeDescriptor> {
    vec![
        clone_node("clone_object", "Clone", eval_clone)
            .input("count", SCALER, 1.0)
            .input("offset", TRANSFORM, Transform::IDENTITY)
            .output("group", OBJECT),
        clone_node("circle_clone_object", "Circle Clone", eval_circle_clone)
            .input("count", SCALER, 6.0)
            .input("radius", SCALER, 100.0)
            .input("fix_rotate", BOOLEAN, false)
            .output("group", OBJECT),
        clone_node("grid_clone_object", "Grid Clone", eval_grid_clone)
            .input("row", SCALER, 3.0)
            .input("column", SCALER, 3.0)
            .input("width", SCALER, 100.0)
            .input("height", SCALER, 100.0)
            .output("group", OBJECT),
        clone_node("tornado_clone_object", "Tornado Clone", eval_tornado_clone)
            .input("count", SCALER, 12.0)
            .input("radius", SCALER, 50.0)
            .input("rotate", SCALER, 30.0)
            .input("radius_grow", SCALER, 1.1)
            .input("scale_grow", SCALER, 1.0)
            .input("fix_rotate", BOOLEAN, false)
            .output("group", OBJECT),
    ]
}

fn scaler(inputs: &NodeInputs, key: &str) -> f64 {
    to_scaler(input_ref(inputs, key))
}

/// Most instances a single clone node may create in one pass. Larger counts
/// are treated as invalid input.
pub const MAX_INSTANCES: usize = 10_000;

/// Instance count from a user number. `None` unless it floors into
/// `1..=MAX_INSTANCES`.
fn instance_count(value: f64) -> Option<usize> {
    if !value.is_finite() {
        return None;
    }
    let floored = value.floor();
    (floored >= 1.0 && floored <= MAX_INSTANCES as f64).then_some(floored as usize)
}

fn positive(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

fn non_negative(value: f64) -> Option<f64> {
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn group_output(id: ObjectId) -> OutputRecord {
    keyed_output("group", Value::Object(id))
}

fn empty_group() -> OutputRecord {
    group_output(ObjectId::empty())
}

/// Placement of a rotated instance, dropping the rotation when `fix_rotate`.
fn polar_placement(angle: f64, radius: f64, scale: f64, fix_rotate: bool) -> Transform {
    Transform {
        translate: Vec2::from_polar(angle, radius),
        rotate: if fix_rotate { 0.0 } else { angle },
        scale: Vec2::ONE.scale(scale),
        ..Transform::IDENTITY
    }
}

/// Create the clone group, then one clone of `source` per placement.
fn arrange(
    source: &ObjectId,
    placements: impl IntoIterator<Item = Transform>,
    ctx: &mut dyn EvalContext,
) -> OutputRecord {
    let group = ctx.create_clone_group_object(source, ObjectProps::default());
    let base = ctx.get_transform(source);
    for placement in placements {
        let clone = ctx.clone_object(source, ObjectProps::under(&group), None);
        ctx.set_transform(&clone, base.add_pose(&placement));
    }
    group_output(group)
}

fn source_object(inputs: &NodeInputs) -> Option<ObjectId> {
    let id = to_object_id(input_ref(inputs, "object"));
    (!id.is_empty()).then_some(id)
}

fn eval_clone(inputs: &NodeInputs, node: &GraphNode, ctx: &mut dyn EvalContext) -> OutputRecord {
    let params = (source_object(inputs), instance_count(scaler(inputs, "count")));
    let (Some(source), Some(count)) = params else {
        log::debug!("clone node '{}' has nothing to clone", node.id);
        return empty_group();
    };
    let offset = to_transform(input_ref(inputs, "offset"));
    let placements =
        (1..=count).map(|step| Transform::add_poses(std::iter::repeat(&offset).take(step)));
    arrange(&source, placements, ctx)
}

fn eval_circle_clone(
    inputs: &NodeInputs,
    node: &GraphNode,
    ctx: &mut dyn EvalContext,
) -> OutputRecord {
    let params = (
        source_object(inputs),
        instance_count(scaler(inputs, "count")),
        positive(scaler(inputs, "radius")),
    );
    let (Some(source), Some(count), Some(radius)) = params else {
        log::debug!("circle clone '{}' skipped: invalid parameters", node.id);
        return empty_group();
    };
    let fix_rotate = to_bool(input_ref(inputs, "fix_rotate"));
    let step = 360.0 / count as f64;
    let placements = (0..count).map(|i| polar_placement(step * i as f64, radius, 1.0, fix_rotate));
    arrange(&source, placements, ctx)
}

fn eval_grid_clone(
    inputs: &NodeInputs,
    node: &GraphNode,
    ctx: &mut dyn EvalContext,
) -> OutputRecord {
    let params = (
        source_object(inputs),
        instance_count(scaler(inputs, "row")),
        instance_count(scaler(inputs, "column")),
        non_negative(scaler(inputs, "width")),
        non_negative(scaler(inputs, "height")),
    );
    let (Some(source), Some(rows), Some(columns), Some(width), Some(height)) = params else {
        log::debug!("grid clone '{}' skipped: invalid parameters", node.id);
        return empty_group();
    };
    if rows.saturating_mul(columns) > MAX_INSTANCES {
        log::debug!("grid clone '{}' skipped: {}x{} instances", node.id, rows, columns);
        return empty_group();
    }
    let placements = (0..rows).flat_map(|r| {
        (0..columns).map(move |c| {
            Transform::from_translate(Vec2::new(c as f64 * width, r as f64 * height))
        })
    });
    arrange(&source, placements, ctx)
}

fn eval_tornado_clone(
    inputs: &NodeInputs,
    node: &GraphNode,
    ctx: &mut dyn EvalContext,
) -> OutputRecord {
    let params = (
        source_object(inputs),
        instance_count(scaler(inputs, "count")),
        positive(scaler(inputs, "radius")),
        non_negative(scaler(inputs, "rotate")),
        positive(scaler(inputs, "radius_grow")),
        positive(scaler(inputs, "scale_grow")),
    );
    let (
        Some(source),
        Some(count),
        Some(radius),
        Some(rotate),
        Some(radius_grow),
        Some(scale_grow),
    ) = params
    else {
        log::debug!("tornado clone '{}' skipped: invalid parameters", node.id);
        return empty_group();
    };
    let fix_rotate = to_bool(input_ref(inputs, "fix_rotate"));
    let placements = (0..count).map(|i| {
        let n = i as f64;
        polar_placement(
            rotate * n,
            radius * radius_grow.powf(n),
            scale_grow.powf(n),
            fix_rotate,
        )
    });
    arrange(&source, placements, ctx)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{assert_close, compute_in, node_with};
    use super::*;
    use crate::eval::{ContextCall, ObjectKind, SceneObject, SceneStore};

    const SOURCE_ROTATE: f64 = 15.0;

    fn scene_with_source() -> SceneStore {
        let mut scene = SceneStore::new();
        scene.insert(
            "a",
            ObjectKind::Rect,
            Transform::new(Vec2::new(5.0, 5.0), SOURCE_ROTATE, Vec2::ONE, Vec2::ZERO),
        );
        scene
    }

    fn run(scene: &mut SceneStore, tag: &str, literals: &[(&str, Value)]) -> ObjectId {
        let out = compute_in(&node_with(tag, literals), scene);
        match &out["group"] {
            Value::Object(id) => id.clone(),
            other => panic!("expected object, got {:?}", other),
        }
    }

    fn clones<'a>(scene: &'a SceneStore, group: &'a ObjectId) -> Vec<&'a SceneObject> {
        scene.children_of(group).collect()
    }

    #[test]
    fn circle_clone_floors_count_and_spaces_evenly() {
        let mut scene = scene_with_source();
        let group = run(
            &mut scene,
            "circle_clone_object",
            &[
                ("object", Value::object("a")),
                ("count", Value::Scaler(2.9)),
                ("radius", Value::Scaler(10.0)),
                ("fix_rotate", Value::Boolean(false)),
            ],
        );
        let made = clones(&scene, &group);
        assert_eq!(made.len(), 2);

        assert_close(made[0].transform.translate.x, 15.0);
        assert_close(made[0].transform.translate.y, 5.0);
        assert_close(made[0].transform.rotate, SOURCE_ROTATE);

        assert_close(made[1].transform.translate.x, -5.0);
        assert_close(made[1].transform.translate.y, 5.0);
        assert_close(made[1].transform.rotate, SOURCE_ROTATE + 180.0);
        assert!(made.iter().all(|obj| obj.clone_of == Some(ObjectId::new("a"))));
    }

    #[test]
    fn fix_rotate_keeps_source_rotation() {
        let mut scene = scene_with_source();
        let group = run(
            &mut scene,
            "circle_clone_object",
            &[
                ("object", Value::object("a")),
                ("count", Value::Scaler(4.0)),
                ("radius", Value::Scaler(10.0)),
                ("fix_rotate", Value::Boolean(true)),
            ],
        );
        for obj in clones(&scene, &group) {
            assert_close(obj.transform.rotate, SOURCE_ROTATE);
        }
    }

    #[test]
    fn call_sequence_is_group_read_then_clone_and_place() {
        let mut scene = scene_with_source();
        run(
            &mut scene,
            "circle_clone_object",
            &[("object", Value::object("a")), ("count", Value::Scaler(1.0))],
        );
        let a = ObjectId::new("a");
        let calls = scene.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], ContextCall::CreateCloneGroup(a.clone()));
        assert_eq!(calls[1], ContextCall::GetTransform(a.clone()));
        assert_eq!(calls[2], ContextCall::CloneObject(a));
        assert!(matches!(calls[3], ContextCall::SetTransform(_)));
    }

    #[test]
    fn invalid_parameters_make_no_calls() {
        let cases: &[(&str, &[(&str, Value)])] = &[
            ("circle_clone_object", &[("count", Value::Scaler(0.0))]),
            ("circle_clone_object", &[("count", Value::Scaler(0.5))]),
            ("circle_clone_object", &[("count", Value::Scaler(-3.0))]),
            ("circle_clone_object", &[("radius", Value::Scaler(0.0))]),
            ("circle_clone_object", &[("radius", Value::Scaler(f64::NAN))]),
            ("grid_clone_object", &[("row", Value::Scaler(0.0))]),
            ("grid_clone_object", &[("width", Value::Scaler(f64::INFINITY))]),
            ("grid_clone_object", &[("width", Value::Scaler(-10.0))]),
            ("grid_clone_object", &[("height", Value::Scaler(-0.5))]),
            (
                "grid_clone_object",
                &[("row", Value::Scaler(200.0)), ("column", Value::Scaler(200.0))],
            ),
            ("circle_clone_object", &[("count", Value::Scaler(1e12))]),
            ("tornado_clone_object", &[("count", Value::Scaler(MAX_INSTANCES as f64 + 1.0))]),
            ("tornado_clone_object", &[("rotate", Value::Scaler(-1.0))]),
            ("tornado_clone_object", &[("radius_grow", Value::Scaler(0.0))]),
            ("tornado_clone_object", &[("scale_grow", Value::Scaler(-2.0))]),
            ("clone_object", &[("count", Value::Scaler(0.0))]),
        ];
        for (tag, overrides) in cases {
            let mut scene = scene_with_source();
            let mut literals = vec![("object", Value::object("a"))];
            literals.extend(overrides.iter().cloned());
            let group = run(&mut scene, tag, &literals);
            assert!(group.is_empty(), "{tag} {:?}", overrides);
            assert_eq!(scene.call_count(), 0, "{tag} {:?}", overrides);
        }
    }

    #[test]
    fn empty_source_makes_no_calls() {
        let mut scene = scene_with_source();
        for tag in [
            "clone_object",
            "circle_clone_object",
            "grid_clone_object",
            "tornado_clone_object",
        ] {
            let group = run(&mut scene, tag, &[]);
            assert!(group.is_empty());
        }
        assert_eq!(scene.call_count(), 0);
    }

    #[test]
    fn grid_clone_lays_out_rows_and_columns() {
        let mut scene = scene_with_source();
        let group = run(
            &mut scene,
            "grid_clone_object",
            &[
                ("object", Value::object("a")),
                ("row", Value::Scaler(2.0)),
                ("column", Value::Scaler(3.0)),
                ("width", Value::Scaler(10.0)),
                ("height", Value::Scaler(20.0)),
            ],
        );
        let made = clones(&scene, &group);
        assert_eq!(made.len(), 6);
        let last = made[5].transform.translate;
        assert_close(last.x, 5.0 + 20.0);
        assert_close(last.y, 5.0 + 20.0);
    }

    #[test]
    fn tornado_grows_radius_and_scale() {
        let mut scene = scene_with_source();
        let group = run(
            &mut scene,
            "tornado_clone_object",
            &[
                ("object", Value::object("a")),
                ("count", Value::Scaler(3.0)),
                ("radius", Value::Scaler(10.0)),
                ("rotate", Value::Scaler(90.0)),
                ("radius_grow", Value::Scaler(2.0)),
                ("scale_grow", Value::Scaler(0.5)),
            ],
        );
        let made = clones(&scene, &group);
        assert_eq!(made.len(), 3);
        // third clone: angle 180, radius 40, scale 0.25
        let t = made[2].transform;
        assert_close(t.translate.x, 5.0 - 40.0);
        assert_close(t.translate.y, 5.0);
        assert_close(t.rotate, SOURCE_ROTATE + 180.0);
        assert_close(t.scale.x, 0.25);
    }

    #[test]
    fn count_at_the_limit_is_accepted() {
        let mut scene = scene_with_source();
        let group = run(
            &mut scene,
            "circle_clone_object",
            &[
                ("object", Value::object("a")),
                ("count", Value::Scaler(MAX_INSTANCES as f64 + 0.5)),
            ],
        );
        assert_eq!(clones(&scene, &group).len(), MAX_INSTANCES);
    }

    #[test]
    fn zero_spacing_stacks_grid_clones() {
        let mut scene = scene_with_source();
        let group = run(
            &mut scene,
            "grid_clone_object",
            &[
                ("object", Value::object("a")),
                ("row", Value::Scaler(2.0)),
                ("column", Value::Scaler(2.0)),
                ("width", Value::Scaler(0.0)),
                ("height", Value::Scaler(0.0)),
            ],
        );
        let made = clones(&scene, &group);
        assert_eq!(made.len(), 4);
        assert!(made.iter().all(|obj| obj.transform.translate == Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn clone_object_steps_by_offset() {
        let mut scene = scene_with_source();
        let offset = Transform::from_translate(Vec2::new(10.0, 0.0));
        let group = run(
            &mut scene,
            "clone_object",
            &[
                ("object", Value::object("a")),
                ("count", Value::Scaler(2.0)),
                ("offset", Value::Transform(offset)),
            ],
        );
        let made = clones(&scene, &group);
        assert_eq!(made.len(), 2);
        assert_close(made[0].transform.translate.x, 15.0);
        assert_close(made[1].transform.translate.x, 25.0);
    }
}
