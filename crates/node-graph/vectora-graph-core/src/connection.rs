//! Edge edits that keep the graph well typed.
//!
//! Every edit is copy-on-write: the base [`Graph`] is never touched and the
//! caller receives a [`NodePatch`] holding only the nodes that changed. After
//! any edge change the generics stamps around both endpoints are re-derived
//! with [`clean_stale_generics`], so no slot keeps a type pinned by an edge
//! that no longer exists.

use std::collections::VecDeque;

use hashbrown::HashSet;
use vectora_api_core::{Value, ValueType};

use crate::error::GraphError;
use crate::generics::{pick_concrete_type, resolve_slot_type};
use crate::registry::{OutputType, Registry};
use crate::types::{Edge, EdgeSource, Graph, GraphNode, NodeId, NodePatch};

/// A slot anywhere in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SlotAddr {
    node_id: NodeId,
    key: String,
    is_output: bool,
}

impl SlotAddr {
    fn new(node_id: &str, key: &str, is_output: bool) -> Self {
        SlotAddr {
            node_id: node_id.to_string(),
            key: key.to_string(),
            is_output,
        }
    }
}

/// Base graph overlaid with pending edits. Nodes in `removed` are invisible.
struct GraphView<'a> {
    base: &'a Graph,
    patch: NodePatch,
    removed: HashSet<NodeId>,
}

impl<'a> GraphView<'a> {
    fn new(base: &'a Graph) -> Self {
        GraphView {
            base,
            patch: NodePatch::new(),
            removed: HashSet::new(),
        }
    }

    fn get(&self, id: &str) -> Option<&GraphNode> {
        if self.removed.contains(id) {
            return None;
        }
        self.patch.get(id).or_else(|| self.base.get(id))
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        if self.removed.contains(id) {
            return None;
        }
        if !self.patch.contains_key(id) {
            let node = self.base.get(id)?.clone();
            self.patch.insert(id.to_string(), node);
        }
        self.patch.get_mut(id)
    }

    fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.base.nodes.keys().filter_map(move |id| self.get(id))
    }

    /// Input slots fed by output `key` of node `id`.
    fn consumers(&self, id: &str, key: &str) -> Vec<SlotAddr> {
        self.nodes()
            .flat_map(|node| {
                node.inputs.iter().filter_map(move |(input_key, slot)| {
                    slot.from
                        .as_ref()
                        .filter(|from| from.id == id && from.key == key)
                        .map(|_| SlotAddr::new(&node.id, input_key, false))
                })
            })
            .collect()
    }

    /// Patched nodes that differ from the base graph.
    fn into_changes(self) -> NodePatch {
        let base = self.base;
        self.patch
            .into_iter()
            .filter(|(id, node)| base.get(id) != Some(node))
            .collect()
    }
}

/// Whether output `producer_key` of `producer_id` may feed input
/// `consumer_key` of `consumer_id`. Both sides are resolved through their
/// generics chains and must be compatible, after which the consumer's
/// descriptor may still refuse the producer type. Unknown nodes or slots
/// are never valid.
pub fn validate_connection(
    registry: &Registry,
    graph: &Graph,
    producer_id: &str,
    producer_key: &str,
    consumer_id: &str,
    consumer_key: &str,
) -> bool {
    validate_in(
        registry,
        &GraphView::new(graph),
        producer_id,
        producer_key,
        consumer_id,
        consumer_key,
    )
}

fn validate_in(
    registry: &Registry,
    view: &GraphView<'_>,
    producer_id: &str,
    producer_key: &str,
    consumer_id: &str,
    consumer_key: &str,
) -> bool {
    let (Some(producer), Some(consumer)) = (view.get(producer_id), view.get(consumer_id)) else {
        return false;
    };
    let (Some(producer_desc), Some(consumer_desc)) =
        (registry.descriptor_for(producer), registry.descriptor_for(consumer))
    else {
        return false;
    };
    let out_ty = resolve_slot_type(producer_desc, producer, producer_key, true);
    let in_ty = resolve_slot_type(consumer_desc, consumer, consumer_key, false);
    match (out_ty, in_ty) {
        (Some(out_ty), Some(in_ty)) => {
            out_ty.is_compatible(&in_ty)
                && consumer_desc.accepts_input(consumer, consumer_key, &out_ty)
        }
        _ => false,
    }
}

/// Connect `producer_id.producer_key` to `consumer_id.consumer_key`.
///
/// The consumer slot's literal and any previous edge are discarded. Returns
/// `None` when the connection is refused: incompatible types, unknown
/// endpoints, or an edge that would close a cycle.
pub fn connect(
    registry: &Registry,
    graph: &Graph,
    producer_id: &str,
    producer_key: &str,
    consumer_id: &str,
    consumer_key: &str,
) -> Option<NodePatch> {
    if depends_on(graph, producer_id, consumer_id) {
        log::debug!(
            "refusing connection {} -> {}: it would close a cycle",
            producer_id,
            consumer_id
        );
        return None;
    }
    if !validate_connection(registry, graph, producer_id, producer_key, consumer_id, consumer_key) {
        log::debug!(
            "refusing connection {}.{} -> {}.{}",
            producer_id,
            producer_key,
            consumer_id,
            consumer_key
        );
        return None;
    }

    let mut view = GraphView::new(graph);
    let consumer = view.node_mut(consumer_id)?;
    let slot = consumer.inputs.entry(consumer_key.to_string()).or_default();
    let replaced = slot.from.replace(EdgeSource::new(producer_id, producer_key));
    slot.value = None;

    let mut seeds = vec![
        SlotAddr::new(consumer_id, consumer_key, false),
        SlotAddr::new(producer_id, producer_key, true),
    ];
    if let Some(old) = replaced {
        seeds.push(SlotAddr::new(&old.id, &old.key, true));
    }
    if let Err(unsettled) = clean_from(registry, &mut view, seeds) {
        log::warn!("refusing connection {}.{}: {}", consumer_id, consumer_key, unsettled);
        return None;
    }
    Some(view.into_changes())
}

/// Whether `node_id` is `upstream_id` or reads from it, directly or through
/// other nodes.
fn depends_on(graph: &Graph, node_id: &str, upstream_id: &str) -> bool {
    let mut stack = vec![node_id];
    let mut seen: HashSet<&str> = HashSet::new();
    while let Some(id) = stack.pop() {
        if id == upstream_id {
            return true;
        }
        if !seen.insert(id) {
            continue;
        }
        if let Some(node) = graph.get(id) {
            stack.extend(node.upstream_ids().map(String::as_str));
        }
    }
    false
}

/// Remove the edge feeding `consumer_id.consumer_key`. The slot falls back to
/// its own literal, or to the declared default when it has none. Returns
/// `None` when the slot is not connected.
pub fn disconnect(
    registry: &Registry,
    graph: &Graph,
    consumer_id: &str,
    consumer_key: &str,
) -> Option<NodePatch> {
    let mut view = GraphView::new(graph);
    let producer = detach_input(registry, &mut view, consumer_id, consumer_key)?;
    let seeds = vec![
        SlotAddr::new(consumer_id, consumer_key, false),
        SlotAddr::new(&producer.id, &producer.key, true),
    ];
    settle_or_warn(clean_from(registry, &mut view, seeds));
    Some(view.into_changes())
}

/// Clear the `from` of one input slot inside `view`, restoring a literal.
fn detach_input(
    registry: &Registry,
    view: &mut GraphView<'_>,
    consumer_id: &str,
    consumer_key: &str,
) -> Option<EdgeSource> {
    let node = view.get(consumer_id)?;
    node.input(consumer_key)?.from.as_ref()?;
    let default = registry
        .descriptor_for(node)
        .and_then(|descriptor| descriptor.declared_input_default(consumer_key))
        .cloned()
        .unwrap_or_default();

    let slot = view.node_mut(consumer_id)?.inputs.get_mut(consumer_key)?;
    if slot.value.is_none() {
        slot.value = Some(default);
    }
    slot.from.take()
}

/// Disconnect every listed edge that is still present. Edges whose consumer
/// slot now points elsewhere are ignored.
pub fn cut_edges(registry: &Registry, graph: &Graph, edges: &[Edge]) -> NodePatch {
    let mut view = GraphView::new(graph);
    let seeds = cut_in(registry, &mut view, edges);
    settle_or_warn(clean_from(registry, &mut view, seeds));
    view.into_changes()
}

fn cut_in(registry: &Registry, view: &mut GraphView<'_>, edges: &[Edge]) -> Vec<SlotAddr> {
    let mut seeds = Vec::new();
    for edge in edges {
        let current = view
            .get(&edge.to_id)
            .and_then(|node| node.input(&edge.to_key))
            .and_then(|slot| slot.from.as_ref());
        if current != Some(&edge.from) {
            continue;
        }
        if let Some(producer) = detach_input(registry, view, &edge.to_id, &edge.to_key) {
            seeds.push(SlotAddr::new(&edge.to_id, &edge.to_key, false));
            seeds.push(SlotAddr::new(&producer.id, &producer.key, true));
        }
    }
    seeds
}

/// Disconnect every edge for which `hit` returns true, e.g. the edges a cut
/// gesture crossed.
pub fn cut_edges_hit(
    registry: &Registry,
    graph: &Graph,
    hit: impl Fn(&Edge) -> bool,
) -> NodePatch {
    let edges: Vec<Edge> = graph.edges().into_iter().filter(|edge| hit(edge)).collect();
    cut_edges(registry, graph, &edges)
}

/// Prepare removal of `ids`: disconnect every edge they feed and re-derive
/// generics on both sides of every edge touching them. The returned patch
/// never contains the removed nodes themselves.
pub fn detach_nodes<'a>(
    registry: &Registry,
    graph: &Graph,
    ids: impl IntoIterator<Item = &'a str>,
) -> NodePatch {
    let removed: HashSet<NodeId> = ids.into_iter().map(str::to_string).collect();
    let edges = graph.edges();

    let mut view = GraphView::new(graph);
    let fed: Vec<Edge> = edges
        .iter()
        .filter(|edge| removed.contains(&edge.from.id) && !removed.contains(&edge.to_id))
        .cloned()
        .collect();
    let mut seeds = cut_in(registry, &mut view, &fed);
    seeds.extend(
        edges
            .iter()
            .filter(|edge| removed.contains(&edge.to_id) && !removed.contains(&edge.from.id))
            .map(|edge| SlotAddr::new(&edge.from.id, &edge.from.key, true)),
    );

    view.removed = removed;
    settle_or_warn(clean_from(registry, &mut view, seeds));
    view.into_changes()
}

/// Re-derive the generics stamps of the chain containing slot `key` of
/// `node_id`, across node boundaries through every live edge.
///
/// Members are slots declared GENERICS reachable through same-node chains and
/// edges. Their type is the first concrete type found on the far side of an
/// edge, or on a member's own literal, in walk order; with none, every stamp
/// is cleared. Running it twice gives the same result as running it once.
///
/// Fails with [`GraphError::GenericsUnsettled`] when re-stamping keeps
/// feeding back into itself, which only a cyclic graph can do.
pub fn clean_stale_generics(
    registry: &Registry,
    graph: &Graph,
    node_id: &str,
    key: &str,
    is_output: bool,
) -> Result<NodePatch, GraphError> {
    let mut view = GraphView::new(graph);
    clean_from(registry, &mut view, vec![SlotAddr::new(node_id, key, is_output)])?;
    Ok(view.into_changes())
}

enum SlotRole {
    /// Declared GENERICS; receives the resolved stamp.
    Member,
    /// Carries a concrete type that pins any chain it touches.
    Anchor(ValueType),
    /// Neither, e.g. an unresolved derived output or an unknown slot.
    Inert,
}

fn classify(registry: &Registry, node: &GraphNode, key: &str, is_output: bool) -> SlotRole {
    let Some(descriptor) = registry.descriptor_for(node) else {
        return SlotRole::Inert;
    };
    if is_output {
        match descriptor.output_spec(key).map(|spec| &spec.ty) {
            Some(OutputType::Fixed(ty)) if ty.is_generics() => SlotRole::Member,
            Some(OutputType::Fixed(ty)) => SlotRole::Anchor(ty.clone()),
            Some(OutputType::Derived(f)) => {
                let ty = f(node);
                if ty.is_generics() {
                    SlotRole::Inert
                } else {
                    SlotRole::Anchor(ty)
                }
            }
            None => SlotRole::Inert,
        }
    } else {
        match descriptor.declared_input_type(key) {
            Some(ty) if ty.is_generics() => SlotRole::Member,
            Some(ty) => SlotRole::Anchor(ty.clone()),
            None => SlotRole::Inert,
        }
    }
}

/// Type pinned by an unconnected literal.
fn literal_type(node: &GraphNode, key: &str) -> Option<ValueType> {
    let slot = node.input(key)?;
    if slot.from.is_some() {
        return None;
    }
    match slot.value.as_ref()? {
        Value::Array(items) => items
            .iter()
            .find_map(Value::kind)
            .map(ValueType::array),
        value => value.kind().map(ValueType::unit),
    }
}

/// Walk from `seed` and return the chain members plus the anchors touching
/// them, both in walk order.
fn collect_component(
    registry: &Registry,
    view: &GraphView<'_>,
    seed: &SlotAddr,
) -> (Vec<SlotAddr>, Vec<ValueType>) {
    let mut members = Vec::new();
    let mut anchors = Vec::new();
    let mut seen: HashSet<SlotAddr> = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(seed.clone());
    queue.push_back(seed.clone());

    while let Some(slot) = queue.pop_front() {
        let Some(node) = view.get(&slot.node_id) else {
            continue;
        };
        match classify(registry, node, &slot.key, slot.is_output) {
            SlotRole::Inert => continue,
            SlotRole::Anchor(ty) => {
                anchors.push(ty);
                continue;
            }
            SlotRole::Member => {}
        }
        members.push(slot.clone());

        let mut next = Vec::new();
        if let Some(descriptor) = registry.descriptor_for(node) {
            next.extend(
                descriptor
                    .chain_at(node, &slot.key, slot.is_output)
                    .into_iter()
                    .map(|member| SlotAddr::new(&node.id, &member.key, member.is_output)),
            );
        }
        if slot.is_output {
            next.extend(view.consumers(&node.id, &slot.key));
        } else if let Some(from) = node.input(&slot.key).and_then(|input| input.from.as_ref()) {
            if view.get(&from.id).is_some() {
                next.push(SlotAddr::new(&from.id, &from.key, true));
            }
        } else if let Some(ty) = literal_type(node, &slot.key) {
            anchors.push(ty);
        }

        for addr in next {
            if seen.insert(addr.clone()) {
                queue.push_back(addr);
            }
        }
    }
    (members, anchors)
}

fn derived_output_types(registry: &Registry, node: &GraphNode) -> Vec<(&'static str, ValueType)> {
    let Some(descriptor) = registry.descriptor_for(node) else {
        return Vec::new();
    };
    descriptor
        .outputs
        .iter()
        .filter_map(|spec| match &spec.ty {
            OutputType::Derived(f) => Some((spec.key, f(node))),
            OutputType::Fixed(_) => None,
        })
        .collect()
}

/// Re-stamp one chain component. Returns derived outputs whose type changed.
fn clean_component(
    registry: &Registry,
    view: &mut GraphView<'_>,
    seed: &SlotAddr,
    done: &mut HashSet<SlotAddr>,
) -> Vec<(NodeId, &'static str)> {
    let (members, anchors) = collect_component(registry, view, seed);
    let resolved = pick_concrete_type(anchors.iter().map(Some)).cloned();

    let mut touched: Vec<(NodeId, Vec<(&'static str, ValueType)>)> = Vec::new();
    for member in members {
        done.insert(member.clone());
        let Some(node) = view.get(&member.node_id) else {
            continue;
        };
        if node.stamped_type(&member.key, member.is_output) == resolved.as_ref() {
            continue;
        }
        if !touched.iter().any(|(id, _)| *id == member.node_id) {
            touched.push((member.node_id.clone(), derived_output_types(registry, node)));
        }
        log::debug!(
            "stamping {}.{} ({}) as {}",
            member.node_id,
            member.key,
            if member.is_output { "out" } else { "in" },
            resolved
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "GENERICS".to_string())
        );
        if let Some(node) = view.node_mut(&member.node_id) {
            node.set_stamped_type(&member.key, member.is_output, resolved.clone());
        }
    }

    let mut changed = Vec::new();
    for (id, before) in touched {
        let Some(node) = view.get(&id) else {
            continue;
        };
        let after = derived_output_types(registry, node);
        for ((key, old), (_, new)) in before.iter().zip(after.iter()) {
            if old != new {
                changed.push((id.clone(), *key));
            }
        }
    }
    changed
}

/// Removing edges must go through even when the stamps around them cannot
/// settle; the patch then keeps whatever stamps the walk reached.
fn settle_or_warn(settled: Result<(), GraphError>) {
    if let Err(unsettled) = settled {
        log::warn!("{unsettled}");
    }
}

/// Re-stamp every component reachable from `seeds`, following derived outputs
/// whose type changed. Only those changes requeue work, so the budget scales
/// with how many nodes carry derived outputs.
fn clean_from(
    registry: &Registry,
    view: &mut GraphView<'_>,
    seeds: Vec<SlotAddr>,
) -> Result<(), GraphError> {
    let mut queue: VecDeque<SlotAddr> = seeds.into();
    let mut done: HashSet<SlotAddr> = HashSet::new();
    let derived = view
        .base
        .nodes
        .values()
        .filter(|node| {
            registry
                .descriptor_for(node)
                .is_some_and(|descriptor| descriptor.has_derived_outputs())
        })
        .count();
    let components = view.base.len() + queue.len();
    let mut budget = components.saturating_mul(2 * derived + 1);

    while let Some(seed) = queue.pop_front() {
        if done.contains(&seed) {
            continue;
        }
        if budget == 0 {
            return Err(GraphError::GenericsUnsettled {
                node_id: seed.node_id,
                key: seed.key,
            });
        }
        budget -= 1;
        for (id, key) in clean_component(registry, view, &seed, &mut done) {
            for consumer in view.consumers(&id, key) {
                done.remove(&consumer);
                queue.push_back(consumer);
            }
        }
    }
    Ok(())
}
