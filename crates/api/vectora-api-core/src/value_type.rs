//! Value types (schema) for slots on graph nodes.
//!
//! A [`ValueType`] pairs a [`ValueKind`] with a [`Structure`]. Equality only
//! looks at those two; the optional [`TypeExtra`] carries presentation hints
//! that never affect compatibility.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed vocabulary of value kinds a slot can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueKind {
    Boolean,
    Scaler,
    Vector2,
    Text,
    PathD,
    Color,
    Transform,
    Object,
    StopList,
    GraphInput,
    GraphOutput,
    /// Placeholder resolved later from the slot's generics chain.
    Generics,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Boolean => "BOOLEAN",
            ValueKind::Scaler => "SCALER",
            ValueKind::Vector2 => "VECTOR2",
            ValueKind::Text => "TEXT",
            ValueKind::PathD => "PATH_D",
            ValueKind::Color => "COLOR",
            ValueKind::Transform => "TRANSFORM",
            ValueKind::Object => "OBJECT",
            ValueKind::StopList => "STOP_LIST",
            ValueKind::GraphInput => "GRAPH_INPUT",
            ValueKind::GraphOutput => "GRAPH_OUTPUT",
            ValueKind::Generics => "GENERICS",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single value vs. array-of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Structure {
    #[default]
    Unit,
    Array,
}

/// Presentation hints attached to a type. Ignored by equality.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeExtra {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_hint: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueType {
    pub kind: ValueKind,
    #[serde(default)]
    pub structure: Structure,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<TypeExtra>,
}

impl ValueType {
    pub const fn unit(kind: ValueKind) -> Self {
        ValueType {
            kind,
            structure: Structure::Unit,
            extra: None,
        }
    }

    pub const fn array(kind: ValueKind) -> Self {
        ValueType {
            kind,
            structure: Structure::Array,
            extra: None,
        }
    }

    pub const fn generics() -> Self {
        ValueType::unit(ValueKind::Generics)
    }

    pub fn with_scale_hint(mut self, hint: f64) -> Self {
        self.extra.get_or_insert_with(TypeExtra::default).scale_hint = Some(hint);
        self
    }

    pub fn with_enum_key(mut self, key: impl Into<String>) -> Self {
        self.extra.get_or_insert_with(TypeExtra::default).enum_key = Some(key.into());
        self
    }

    #[inline]
    pub fn is_generics(&self) -> bool {
        self.kind == ValueKind::Generics
    }

    /// A GENERICS unit that nothing has pinned yet; it may still become an
    /// array.
    #[inline]
    pub fn is_unpinned_generics(&self) -> bool {
        self.is_generics() && self.structure == Structure::Unit
    }

    /// Whether a connection between slots of these two types is acceptable.
    /// An unpinned GENERICS side matches anything. Otherwise structures must
    /// agree and GENERICS only stands in for the kind, so `ARRAY(GENERICS)`
    /// never feeds a unit slot.
    pub fn is_compatible(&self, other: &ValueType) -> bool {
        if self.is_unpinned_generics() || other.is_unpinned_generics() {
            return true;
        }
        self.structure == other.structure
            && (self.is_generics() || other.is_generics() || self.kind == other.kind)
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.structure == other.structure
    }
}

impl Eq for ValueType {}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.structure {
            Structure::Unit => write!(f, "{}", self.kind),
            Structure::Array => write!(f, "{}[]", self.kind),
        }
    }
}

/// Equality over possibly-absent types: `None` only equals `None`.
pub fn is_same_value_type(a: Option<&ValueType>, b: Option<&ValueType>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        (None, None) => true,
        _ => false,
    }
}
