//! Capability surface through which scene-construction nodes reach the host.
//!
//! The engine never calls these methods outside a node type's computation.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use vectora_api_core::{Color, ObjectId, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Rect,
    Ellipse,
    Path,
    Group,
    LinearGradient,
    RadialGradient,
    Stop,
}

impl ObjectKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ObjectKind::Rect => "rect",
            ObjectKind::Ellipse => "ellipse",
            ObjectKind::Path => "path",
            ObjectKind::Group => "g",
            ObjectKind::LinearGradient => "linearGradient",
            ObjectKind::RadialGradient => "radialGradient",
            ObjectKind::Stop => "stop",
        }
    }
}

/// Initial properties for created or cloned objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Color>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl ObjectProps {
    /// Props placing the object under `parent` when it is not the empty id.
    pub fn under(parent: &ObjectId) -> Self {
        ObjectProps {
            parent: (!parent.is_empty()).then(|| parent.clone()),
            ..Default::default()
        }
    }
}

/// Host-implemented scene access for effectful node computations.
pub trait EvalContext {
    /// Current transform of `id`; identity for unknown objects.
    fn get_transform(&self, id: &ObjectId) -> Transform;
    fn set_transform(&mut self, id: &ObjectId, transform: Transform);
    fn create_object(&mut self, kind: ObjectKind, props: ObjectProps) -> ObjectId;
    /// Clone `source` (and its descendants). `explicit_id` pins the new id.
    fn clone_object(
        &mut self,
        source: &ObjectId,
        props: ObjectProps,
        explicit_id: Option<ObjectId>,
    ) -> ObjectId;
    /// Create a group placed alongside `source` to hold its clones.
    fn create_clone_group_object(&mut self, source: &ObjectId, props: ObjectProps) -> ObjectId;
    fn set_fill(&mut self, id: &ObjectId, color: Color);
    fn set_stroke(&mut self, id: &ObjectId, color: Color);
    /// Merge raw attributes into an existing object. Built-in nodes pass
    /// geometry through [`ObjectProps`] at creation instead; this is for host
    /// or custom node types that edit attributes afterwards.
    fn set_attributes(&mut self, id: &ObjectId, attributes: HashMap<String, String>);
}

/// Context for pure graphs. Reads return identity, writes are dropped and
/// created objects get the empty id.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullContext;

impl EvalContext for NullContext {
    fn get_transform(&self, _id: &ObjectId) -> Transform {
        Transform::IDENTITY
    }

    fn set_transform(&mut self, _id: &ObjectId, _transform: Transform) {}

    fn create_object(&mut self, _kind: ObjectKind, _props: ObjectProps) -> ObjectId {
        ObjectId::empty()
    }

    fn clone_object(
        &mut self,
        _source: &ObjectId,
        _props: ObjectProps,
        explicit_id: Option<ObjectId>,
    ) -> ObjectId {
        explicit_id.unwrap_or_default()
    }

    fn create_clone_group_object(&mut self, _source: &ObjectId, _props: ObjectProps) -> ObjectId {
        ObjectId::empty()
    }

    fn set_fill(&mut self, _id: &ObjectId, _color: Color) {}

    fn set_stroke(&mut self, _id: &ObjectId, _color: Color) {}

    fn set_attributes(&mut self, _id: &ObjectId, _attributes: HashMap<String, String>) {}
}
