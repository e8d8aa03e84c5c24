//! Built-in node type catalog.
//!
//! Each submodule contributes descriptors for one family of nodes:
//!
//! - [`values`] literal sources and struct make/break nodes.
//! - [`math`] scalar arithmetic, trigonometry and logic.
//! - [`generics`] nodes polymorphic over their resolved generics type.
//! - [`object`] scene object creation and mutation.
//! - [`clone`] the clone / circle / grid / tornado arrangement family.
//! - [`path`] path data builders.
//! - [`gradient`] gradient stops and gradient objects.

use vectora_api_core::{Value, ValueKind, ValueType};

use crate::registry::{NodeInputs, Registry};
use crate::types::OutputRecord;

pub mod clone;
pub mod generics;
pub mod gradient;
pub mod math;
pub mod object;
pub mod path;
pub mod values;

pub(crate) const BOOLEAN: ValueType = ValueType::unit(ValueKind::Boolean);
pub(crate) const SCALER: ValueType = ValueType::unit(ValueKind::Scaler);
pub(crate) const VECTOR2: ValueType = ValueType::unit(ValueKind::Vector2);
pub(crate) const TEXT: ValueType = ValueType::unit(ValueKind::Text);
pub(crate) const PATH_D: ValueType = ValueType::unit(ValueKind::PathD);
pub(crate) const COLOR: ValueType = ValueType::unit(ValueKind::Color);
pub(crate) const TRANSFORM: ValueType = ValueType::unit(ValueKind::Transform);
pub(crate) const OBJECT: ValueType = ValueType::unit(ValueKind::Object);
pub(crate) const STOP_LIST: ValueType = ValueType::unit(ValueKind::StopList);
pub(crate) const GENERICS: ValueType = ValueType::generics();

/// Register every built-in descriptor.
pub fn register_builtin(registry: &mut Registry) {
    for descriptor in values::descriptors()
        .into_iter()
        .chain(math::descriptors())
        .chain(generics::descriptors())
        .chain(object::descriptors())
        .chain(clone::descriptors())
        .chain(path::descriptors())
        .chain(gradient::descriptors())
    {
        if let Some(previous) = registry.register(descriptor) {
            log::warn!("built-in node type '{}' registered twice", previous.type_tag);
        }
    }
}

/// Build an output record containing a single slot.
pub(crate) fn keyed_output(key: &str, value: Value) -> OutputRecord {
    let mut map = OutputRecord::with_capacity(1);
    map.insert(key.to_string(), value);
    map
}

/// Build an output record for the conventional `value` slot.
pub(crate) fn single_output(value: Value) -> OutputRecord {
    keyed_output("value", value)
}

pub(crate) fn input(inputs: &NodeInputs, key: &str) -> Value {
    inputs.get(key).cloned().unwrap_or_default()
}

static UNDEFINED: Value = Value::Undefined;

pub(crate) fn input_ref<'a>(inputs: &'a NodeInputs, key: &str) -> &'a Value {
    inputs.get(key).unwrap_or(&UNDEFINED)
}
