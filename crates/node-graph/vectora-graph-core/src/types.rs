use hashbrown::HashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use vectora_api_core::{Value, ValueType, Vec2};

use crate::registry::Registry;

pub type NodeId = String;

/// Outputs computed for one node, keyed by output slot.
pub type OutputRecord = HashMap<String, Value>;

/// Per-pass results for every evaluated node.
pub type OutputMap = HashMap<NodeId, OutputRecord>;

/// Changed nodes produced by an edit, to be merged into the host's graph.
pub type NodePatch = IndexMap<NodeId, GraphNode>;

/// Producer side of an edge, stored on the consumer's input slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeSource {
    pub id: NodeId,
    pub key: String,
}

impl EdgeSource {
    pub fn new(id: impl Into<NodeId>, key: impl Into<String>) -> Self {
        EdgeSource {
            id: id.into(),
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSlot {
    /// Literal value. `None` means no literal; `Some(Value::Undefined)` is an
    /// explicitly set undefined literal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<EdgeSource>,
    /// Concrete type currently pinned on a generics slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generics_type: Option<ValueType>,
}

impl InputSlot {
    pub fn literal(value: impl Into<Value>) -> Self {
        InputSlot {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn connected(id: impl Into<NodeId>, key: impl Into<String>) -> Self {
        InputSlot {
            from: Some(EdgeSource::new(id, key)),
            ..Default::default()
        }
    }

    pub fn with_generics_type(mut self, ty: ValueType) -> Self {
        self.generics_type = Some(ty);
        self
    }
}

/// One node instance. Instances are replaced wholesale on edit, never mutated
/// in place by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub data: HashMap<String, Value>,
    #[serde(default)]
    pub inputs: IndexMap<String, InputSlot>,
    /// Concrete types pinned on generics output slots.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub output_generics: HashMap<String, ValueType>,
    #[serde(default)]
    pub position: Vec2,
}

impl GraphNode {
    pub fn input(&self, key: &str) -> Option<&InputSlot> {
        self.inputs.get(key)
    }

    pub fn data_value(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Generics stamp on an input (`is_output == false`) or output slot.
    pub fn stamped_type(&self, key: &str, is_output: bool) -> Option<&ValueType> {
        if is_output {
            self.output_generics.get(key)
        } else {
            self.inputs.get(key).and_then(|slot| slot.generics_type.as_ref())
        }
    }

    pub(crate) fn set_stamped_type(&mut self, key: &str, is_output: bool, ty: Option<ValueType>) {
        if is_output {
            match ty {
                Some(ty) => {
                    self.output_generics.insert(key.to_string(), ty);
                }
                None => {
                    self.output_generics.remove(key);
                }
            }
        } else if let Some(slot) = self.inputs.get_mut(key) {
            slot.generics_type = ty;
        }
    }

    /// Producer ids referenced by this node's input slots, in slot order.
    pub fn upstream_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.inputs
            .values()
            .filter_map(|slot| slot.from.as_ref().map(|from| &from.id))
    }
}

/// An edge as seen from both ends.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: EdgeSource,
    pub to_id: NodeId,
    pub to_key: String,
}

/// The host's node map. Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graph {
    pub nodes: IndexMap<NodeId, GraphNode>,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    pub fn insert(&mut self, node: GraphNode) -> Option<GraphNode> {
        self.nodes.insert(node.id.clone(), node)
    }

    pub fn get(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<GraphNode> {
        self.nodes.shift_remove(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Replace nodes wholesale with their patched versions.
    pub fn apply_patch(&mut self, patch: NodePatch) {
        for (id, node) in patch {
            self.nodes.insert(id, node);
        }
    }

    /// Drop nodes whose type tag is not registered. Returns the removed ids.
    pub fn retain_registered(&mut self, registry: &Registry) -> Vec<NodeId> {
        let mut removed = Vec::new();
        self.nodes.retain(|id, node| {
            let known = registry.lookup(&node.type_tag).is_some();
            if !known {
                log::debug!("dropping node '{}' with unregistered type '{}'", id, node.type_tag);
                removed.push(id.clone());
            }
            known
        });
        removed
    }

    /// Every edge currently stored on consumer input slots.
    pub fn edges(&self) -> Vec<Edge> {
        self.nodes
            .values()
            .flat_map(|node| {
                node.inputs.iter().filter_map(move |(key, slot)| {
                    slot.from.as_ref().map(|from| Edge {
                        from: from.clone(),
                        to_id: node.id.clone(),
                        to_key: key.clone(),
                    })
                })
            })
            .collect()
    }
}

impl FromIterator<GraphNode> for Graph {
    fn from_iter<T: IntoIterator<Item = GraphNode>>(iter: T) -> Self {
        let mut graph = Graph::new();
        for node in iter {
            graph.insert(node);
        }
        graph
    }
}
