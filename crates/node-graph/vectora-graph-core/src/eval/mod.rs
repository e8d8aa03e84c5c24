//! Evaluation pipeline for the Vectora node graph.
//!
//! The `eval` module turns a [`Graph`] into a fresh [`OutputMap`] in one
//! synchronous pass. Dependencies are resolved depth first with memoization, so
//! every node participating in the pass is computed exactly once. Submodules:
//!
//! - [`context`] defines the [`EvalContext`] capability effectful nodes call into.
//! - [`scene`] provides [`SceneStore`], an in-memory context.
//!
//! Integration code should primarily interact with [`resolve_all`].

use hashbrown::{HashMap, HashSet};

use crate::error::GraphError;
use crate::registry::{NodeInputs, Registry};
use crate::types::{Graph, InputSlot, NodeId, OutputMap};
use vectora_api_core::Value;

pub mod context;
pub mod scene;

pub use context::{EvalContext, NullContext, ObjectKind, ObjectProps};
pub use scene::{ContextCall, SceneObject, SceneStore};


/// Evaluate every node in `graph`.
///
/// Nodes are visited in graph order; each one resolves its producers first.
/// Any error aborts the pass and no partial map is returned.
pub fn resolve_all(
    registry: &Registry,
    graph: &Graph,
    ctx: &mut dyn EvalContext,
) -> Result<OutputMap, GraphError> {
    let mut outputs = OutputMap::with_capacity(graph.len());
    for id in graph.nodes.keys() {
        if outputs.contains_key(id) {
            continue;
        }
        let mut visited = HashSet::new();
        resolve_one(registry, graph, &mut outputs, id, &mut visited, ctx)?;
    }
    Ok(outputs)
}

/// Evaluate only the nodes needed to produce `targets`.
pub fn resolve_targets<'a>(
    registry: &Registry,
    graph: &Graph,
    targets: impl IntoIterator<Item = &'a str>,
    ctx: &mut dyn EvalContext,
) -> Result<OutputMap, GraphError> {
    let mut outputs = OutputMap::new();
    for id in targets {
        let mut visited = HashSet::new();
        resolve_one(registry, graph, &mut outputs, id, &mut visited, ctx)?;
    }
    Ok(outputs)
}

/// Resolve `target_id` and, transitively, everything it depends on into `outputs`.
///
/// `visited` holds the ids on the active resolution path. Sibling branches
/// never see each other's entries, so shared ancestors are not mistaken for
/// cycles. Missing targets (stale edges) are a no-op.
pub fn resolve_one(
    registry: &Registry,
    graph: &Graph,
    outputs: &mut OutputMap,
    target_id: &str,
    visited: &mut HashSet<NodeId>,
    ctx: &mut dyn EvalContext,
) -> Result<(), GraphError> {
    if visited.contains(target_id) {
        return Err(GraphError::CyclicDependency {
            node_id: target_id.to_string(),
        });
    }
    if outputs.contains_key(target_id) {
        return Ok(());
    }
    let Some(node) = graph.get(target_id) else {
        log::debug!("skipping missing node '{}'", target_id);
        return Ok(());
    };
    let descriptor =
        registry
            .descriptor_for(node)
            .ok_or_else(|| GraphError::UnknownNodeType {
                node_id: node.id.clone(),
                type_tag: node.type_tag.clone(),
            })?;

    visited.insert(node.id.clone());
    for producer in node.upstream_ids() {
        if let Err(err) = resolve_one(registry, graph, outputs, producer, visited, ctx) {
            visited.remove(&node.id);
            return Err(err);
        }
    }
    visited.remove(&node.id);

    let mut inputs = NodeInputs::with_capacity(node.inputs.len());
    for spec in &descriptor.inputs {
        if !node.inputs.contains_key(spec.key) {
            return Err(GraphError::MissingRequiredInput {
                node_id: node.id.clone(),
                key: spec.key.to_string(),
            });
        }
    }
    for key in node.inputs.keys() {
        let value = get_input(outputs, &node.inputs, key).map_err(|_| {
            GraphError::MissingRequiredInput {
                node_id: node.id.clone(),
                key: key.clone(),
            }
        })?;
        inputs.insert(key.clone(), value);
    }

    log::trace!("computing node '{}' ({})", node.id, node.type_tag);
    let record = (descriptor.computation)(&inputs, node, ctx);
    outputs.insert(node.id.clone(), record);
    Ok(())
}

/// Marker error for [`get_input`]; callers attach node context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingInput;

/// Value of input `key`: the live producer output when connected and present,
/// otherwise the slot's literal.
pub fn get_input(
    outputs: &OutputMap,
    inputs: &indexmap::IndexMap<String, InputSlot>,
    key: &str,
) -> Result<Value, MissingInput> {
    let slot = inputs.get(key).ok_or(MissingInput)?;
    if let Some(from) = &slot.from {
        if let Some(record) = outputs.get(&from.id) {
            return Ok(match record.get(&from.key) {
                Some(value) => value.clone(),
                None => {
                    log::warn!("node '{}' produced no output '{}'", from.id, from.key);
                    Value::Undefined
                }
            });
        }
        log::debug!("edge from missing node '{}' falls back to literal", from.id);
    }
    slot.value.clone().ok_or(MissingInput)
}

/// Non-fatal type diagnostics for every node that reports any.
pub fn collect_errors(registry: &Registry, graph: &Graph) -> HashMap<NodeId, Vec<String>> {
    graph
        .iter()
        .filter_map(|node| {
            let errors = registry.descriptor_for(node)?.errors_for(node)?;
            (!errors.is_empty()).then(|| (node.id.clone(), errors))
        })
        .collect()
}
