//! Generics type resolution local to one node.
//!
//! A GENERICS slot takes the first concrete type stamped on any member of its
//! chain. Walking chains across edges is the connection manager's job; here we
//! only answer "what does this slot carry right now".

use vectora_api_core::{Structure, ValueKind, ValueType};

use crate::registry::{NodeTypeDescriptor, SlotRef};
use crate::types::GraphNode;

/// First candidate that is present and not GENERICS. Order decides ties.
pub fn pick_concrete_type<'a, I>(candidates: I) -> Option<&'a ValueType>
where
    I: IntoIterator<Item = Option<&'a ValueType>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|ty| !ty.is_generics())
}

/// Concrete type shared by `chain` on `node`, if any member is pinned.
pub fn chain_type<'a>(node: &'a GraphNode, chain: &[SlotRef]) -> Option<&'a ValueType> {
    pick_concrete_type(
        chain
            .iter()
            .map(|slot| node.stamped_type(&slot.key, slot.is_output)),
    )
}

/// Concrete type shared by `slots` (`(key, is_output)` pairs). Used by
/// computations that know their own chain.
pub fn slots_type<'a>(node: &'a GraphNode, slots: &[(&str, bool)]) -> Option<&'a ValueType> {
    pick_concrete_type(
        slots
            .iter()
            .map(|(key, is_output)| node.stamped_type(key, *is_output)),
    )
}

/// Kind resolved across `slots`, GENERICS when nothing is pinned.
pub fn slots_kind(node: &GraphNode, slots: &[(&str, bool)]) -> ValueKind {
    slots_type(node, slots)
        .filter(|ty| ty.structure == Structure::Unit)
        .map(|ty| ty.kind)
        .unwrap_or(ValueKind::Generics)
}

/// Current type of a slot: its declared type, or for GENERICS slots the type
/// resolved from its chain (GENERICS while nothing in the chain is pinned).
/// `None` when the slot is not declared on the descriptor.
pub fn resolve_slot_type(
    descriptor: &NodeTypeDescriptor,
    node: &GraphNode,
    key: &str,
    is_output: bool,
) -> Option<ValueType> {
    let declared = if is_output {
        descriptor.declared_output_type(node, key)?
    } else {
        descriptor.declared_input_type(key)?.clone()
    };
    if !declared.is_generics() {
        return Some(declared);
    }
    let chain = descriptor.chain_at(node, key, is_output);
    let resolved = if chain.is_empty() {
        node.stamped_type(key, is_output)
            .filter(|ty| !ty.is_generics())
    } else {
        chain_type(node, &chain)
    };
    Some(resolved.cloned().unwrap_or(declared))
}

/// Diagnostic for a resolved generics type a node cannot handle.
pub fn unsupported_type_error(ty: &ValueType) -> String {
    format!("Invalid type: {ty}")
}

/// Diagnostics when the type pinned on `slots` is not a unit of a kind in
/// `supported`. Unpinned chains report nothing.
pub fn check_supported(
    node: &GraphNode,
    slots: &[(&str, bool)],
    supported: &[ValueKind],
) -> Option<Vec<String>> {
    let ty = slots_type(node, slots)?;
    if ty.structure != Structure::Unit || !supported.contains(&ty.kind) {
        Some(vec![unsupported_type_error(ty)])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CreateArgs, Registry};
    use crate::types::InputSlot;
    use vectora_api_core::Value;

    fn scaler() -> ValueType {
        ValueType::unit(ValueKind::Scaler)
    }

    #[test]
    fn picks_first_concrete_candidate() {
        let g = ValueType::generics();
        let s = scaler();
        let candidates = [Some(&g), None, Some(&s), Some(&g)];
        assert_eq!(pick_concrete_type(candidates), Some(&s));
    }

    #[test]
    fn all_generics_or_missing_is_unresolved() {
        let g = ValueType::generics();
        assert_eq!(pick_concrete_type([Some(&g), None, Some(&g)]), None);
        assert_eq!(pick_concrete_type(std::iter::empty()), None);
    }

    #[test]
    fn first_match_wins() {
        let s = scaler();
        let v = ValueType::unit(ValueKind::Vector2);
        assert_eq!(pick_concrete_type([None, Some(&v), Some(&s)]), Some(&v));
    }

    #[test]
    fn chain_members_share_the_pinned_type() {
        let registry = Registry::builtin();
        let descriptor = registry.lookup("add_generics").expect("registered");
        let node = descriptor.create(
            CreateArgs::with_id("add")
                .input("b", InputSlot::literal(Value::Undefined).with_generics_type(scaler())),
        );
        assert_eq!(resolve_slot_type(descriptor, &node, "a", false), Some(scaler()));
        assert_eq!(resolve_slot_type(descriptor, &node, "value", true), Some(scaler()));
    }

    #[test]
    fn unpinned_chain_stays_generics() {
        let registry = Registry::builtin();
        let descriptor = registry.lookup("add_generics").expect("registered");
        let node = descriptor.create(CreateArgs::with_id("add"));
        assert_eq!(
            resolve_slot_type(descriptor, &node, "a", false),
            Some(ValueType::generics())
        );
    }

    #[test]
    fn concrete_slots_report_declared_type() {
        let registry = Registry::builtin();
        let descriptor = registry.lookup("lerp_generics").expect("registered");
        let node = descriptor.create(CreateArgs::with_id("lerp"));
        assert_eq!(resolve_slot_type(descriptor, &node, "alpha", false), Some(scaler()));
        assert_eq!(resolve_slot_type(descriptor, &node, "nope", false), None);
    }

    #[test]
    fn derived_output_follows_items() {
        let registry = Registry::builtin();
        let descriptor = registry.lookup("make_array").expect("registered");
        let node = descriptor.create(
            CreateArgs::with_id("arr")
                .input("item_1", InputSlot::literal(1.0).with_generics_type(scaler())),
        );
        assert_eq!(
            resolve_slot_type(descriptor, &node, "value", true),
            Some(ValueType::array(ValueKind::Scaler))
        );
    }
}
