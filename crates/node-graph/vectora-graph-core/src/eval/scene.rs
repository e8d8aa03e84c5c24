//! In-memory [`EvalContext`] implementation.
//!
//! Hosts with their own object model implement the trait directly; this store
//! backs tests, benchmarks and headless evaluation.

use std::cell::RefCell;

use hashbrown::HashMap;
use indexmap::IndexMap;
use vectora_api_core::{Color, ObjectId, Transform};

use super::context::{EvalContext, ObjectKind, ObjectProps};

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub parent: Option<ObjectId>,
    pub transform: Transform,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub attributes: HashMap<String, String>,
    pub clone_of: Option<ObjectId>,
}

/// One capability call, recorded in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextCall {
    GetTransform(ObjectId),
    SetTransform(ObjectId),
    CreateObject(ObjectKind),
    CloneObject(ObjectId),
    CreateCloneGroup(ObjectId),
    SetFill(ObjectId),
    SetStroke(ObjectId),
    SetAttributes(ObjectId),
}

#[derive(Debug, Default)]
pub struct SceneStore {
    objects: IndexMap<ObjectId, SceneObject>,
    calls: RefCell<Vec<ContextCall>>,
    next_id: u64,
}

impl SceneStore {
    pub fn new() -> Self {
        SceneStore::default()
    }

    /// Seed an object without recording a call.
    pub fn insert(&mut self, id: impl Into<ObjectId>, kind: ObjectKind, transform: Transform) {
        let id = id.into();
        self.objects.insert(
            id.clone(),
            SceneObject {
                id,
                kind,
                parent: None,
                transform,
                fill: None,
                stroke: None,
                attributes: HashMap::new(),
                clone_of: None,
            },
        );
    }

    pub fn get(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    /// Direct children of `parent`, in creation order.
    pub fn children_of<'a>(
        &'a self,
        parent: &'a ObjectId,
    ) -> impl Iterator<Item = &'a SceneObject> {
        self.objects
            .values()
            .filter(move |obj| obj.parent.as_ref() == Some(parent))
    }

    pub fn calls(&self) -> Vec<ContextCall> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn clear_calls(&mut self) {
        self.calls.get_mut().clear();
    }

    fn record(&self, call: ContextCall) {
        self.calls.borrow_mut().push(call);
    }

    fn allocate_id(&mut self, explicit: Option<ObjectId>) -> ObjectId {
        if let Some(id) = explicit.filter(|id| !id.is_empty()) {
            return id;
        }
        loop {
            self.next_id += 1;
            let id = ObjectId::new(format!("obj_{}", self.next_id));
            if !self.objects.contains_key(&id) {
                return id;
            }
        }
    }

    fn with_object(&mut self, id: &ObjectId, f: impl FnOnce(&mut SceneObject)) {
        match self.objects.get_mut(id) {
            Some(obj) => f(obj),
            None => log::warn!("scene object '{}' not found", id),
        }
    }
}

impl EvalContext for SceneStore {
    fn get_transform(&self, id: &ObjectId) -> Transform {
        self.record(ContextCall::GetTransform(id.clone()));
        self.objects
            .get(id)
            .map(|obj| obj.transform)
            .unwrap_or(Transform::IDENTITY)
    }

    fn set_transform(&mut self, id: &ObjectId, transform: Transform) {
        self.record(ContextCall::SetTransform(id.clone()));
        self.with_object(id, |obj| obj.transform = transform);
    }

    fn create_object(&mut self, kind: ObjectKind, props: ObjectProps) -> ObjectId {
        self.record(ContextCall::CreateObject(kind));
        let id = self.allocate_id(None);
        self.objects.insert(
            id.clone(),
            SceneObject {
                id: id.clone(),
                kind,
                parent: props.parent,
                transform: props.transform.unwrap_or_default(),
                fill: props.fill,
                stroke: props.stroke,
                attributes: props.attributes,
                clone_of: None,
            },
        );
        id
    }

    fn clone_object(
        &mut self,
        source: &ObjectId,
        props: ObjectProps,
        explicit_id: Option<ObjectId>,
    ) -> ObjectId {
        self.record(ContextCall::CloneObject(source.clone()));
        let id = self.allocate_id(explicit_id);
        let template = self.objects.get(source).cloned();
        let mut obj = match template {
            Some(template) => template,
            None => {
                log::warn!("cloning unknown scene object '{}'", source);
                SceneObject {
                    id: id.clone(),
                    kind: ObjectKind::Group,
                    parent: None,
                    transform: Transform::IDENTITY,
                    fill: None,
                    stroke: None,
                    attributes: HashMap::new(),
                    clone_of: None,
                }
            }
        };
        obj.id = id.clone();
        obj.clone_of = Some(source.clone());
        if props.parent.is_some() {
            obj.parent = props.parent;
        }
        if let Some(transform) = props.transform {
            obj.transform = transform;
        }
        obj.fill = props.fill.or(obj.fill);
        obj.stroke = props.stroke.or(obj.stroke);
        obj.attributes.extend(props.attributes);
        self.objects.insert(id.clone(), obj);
        id
    }

    fn create_clone_group_object(&mut self, source: &ObjectId, props: ObjectProps) -> ObjectId {
        self.record(ContextCall::CreateCloneGroup(source.clone()));
        let id = self.allocate_id(None);
        let parent = props
            .parent
            .or_else(|| self.objects.get(source).and_then(|obj| obj.parent.clone()));
        self.objects.insert(
            id.clone(),
            SceneObject {
                id: id.clone(),
                kind: ObjectKind::Group,
                parent,
                transform: props.transform.unwrap_or_default(),
                fill: None,
                stroke: None,
                attributes: props.attributes,
                clone_of: None,
            },
        );
        id
    }

    fn set_fill(&mut self, id: &ObjectId, color: Color) {
        self.record(ContextCall::SetFill(id.clone()));
        self.with_object(id, |obj| obj.fill = Some(color));
    }

    fn set_stroke(&mut self, id: &ObjectId, color: Color) {
        self.record(ContextCall::SetStroke(id.clone()));
        self.with_object(id, |obj| obj.stroke = Some(color));
    }

    fn set_attributes(&mut self, id: &ObjectId, attributes: HashMap<String, String>) {
        self.record(ContextCall::SetAttributes(id.clone()));
        self.with_object(id, |obj| obj.attributes.extend(attributes));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vectora_api_core::Vec2;

    #[test]
    fn clones_inherit_source_and_take_overrides() {
        let mut scene = SceneStore::new();
        let source = ObjectId::new("a");
        scene.insert(
            source.clone(),
            ObjectKind::Rect,
            Transform::from_translate(Vec2::new(1.0, 2.0)),
        );
        let group = scene.create_clone_group_object(&source, ObjectProps::default());
        let clone = scene.clone_object(&source, ObjectProps::under(&group), None);

        let obj = scene.get(&clone).expect("clone stored");
        assert_eq!(obj.kind, ObjectKind::Rect);
        assert_eq!(obj.parent.as_ref(), Some(&group));
        assert_eq!(obj.clone_of.as_ref(), Some(&source));
        assert_eq!(obj.transform.translate, Vec2::new(1.0, 2.0));
        assert_eq!(scene.children_of(&group).count(), 1);
        assert_eq!(scene.call_count(), 2);
    }

    #[test]
    fn explicit_clone_ids_are_honoured() {
        let mut scene = SceneStore::new();
        scene.insert("a", ObjectKind::Path, Transform::IDENTITY);
        let source = ObjectId::new("a");
        let id = scene.clone_object(&source, ObjectProps::default(), Some("a_copy".into()));
        assert_eq!(id.as_str(), "a_copy");
    }

    #[test]
    fn attributes_merge_over_existing_ones() {
        let mut scene = SceneStore::new();
        let id = scene.create_object(
            ObjectKind::Rect,
            ObjectProps {
                attributes: [("width".to_string(), "10".to_string())].into_iter().collect(),
                ..ObjectProps::default()
            },
        );
        let update = [
            ("width".to_string(), "20".to_string()),
            ("rx".to_string(), "4".to_string()),
        ];
        scene.set_attributes(&id, update.into_iter().collect());

        let obj = scene.get(&id).expect("created");
        assert_eq!(obj.attributes["width"], "20");
        assert_eq!(obj.attributes["rx"], "4");
        assert_eq!(scene.calls()[1], ContextCall::SetAttributes(id.clone()));
    }

    #[test]
    fn reads_are_recorded_too() {
        let scene = SceneStore::new();
        assert_eq!(scene.get_transform(&ObjectId::new("missing")), Transform::IDENTITY);
        assert_eq!(scene.calls(), vec![ContextCall::GetTransform(ObjectId::new("missing"))]);
    }
}
