//! Node type contracts and the registry that maps type tags to them.
//!
//! Each node type is a plain [`NodeTypeDescriptor`] record: default data and
//! inputs, output slot types, a computation function and optional generics /
//! validation hooks. Dispatch is a map lookup followed by a direct call.

use hashbrown::HashMap;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use vectora_api_core::{Value, ValueType, Vec2};

use crate::eval::EvalContext;
use crate::types::{GraphNode, InputSlot, NodeId, OutputRecord};

/// Resolved input values handed to a computation, keyed by input slot.
pub type NodeInputs = HashMap<String, Value>;

pub type Computation = fn(&NodeInputs, &GraphNode, &mut dyn EvalContext) -> OutputRecord;
pub type ErrorsHook = fn(&GraphNode) -> Option<Vec<String>>;
pub type DerivedOutputType = fn(&GraphNode) -> ValueType;
pub type ChainFn = fn(&GraphNode, &str, bool) -> Vec<SlotRef>;
/// Extra say on an incoming connection: `(node, input key, producer type)`.
pub type AcceptsHook = fn(&GraphNode, &str, &ValueType) -> bool;

/// A slot on the same node, addressed by key and side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotRef {
    pub key: String,
    pub is_output: bool,
}

impl SlotRef {
    pub fn input(key: impl Into<String>) -> Self {
        SlotRef {
            key: key.into(),
            is_output: false,
        }
    }

    pub fn output(key: impl Into<String>) -> Self {
        SlotRef {
            key: key.into(),
            is_output: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputSpec {
    pub key: &'static str,
    pub ty: ValueType,
    pub default: Value,
}

/// Repeated inputs named `{prefix}_{index}`.
#[derive(Debug, Clone)]
pub struct VariadicSpec {
    pub prefix: &'static str,
    pub ty: ValueType,
    pub default: Value,
    pub min: usize,
}

impl VariadicSpec {
    pub fn key(&self, index: usize) -> String {
        format!("{}_{}", self.prefix, index)
    }

    pub fn matches(&self, key: &str) -> bool {
        key.strip_prefix(self.prefix)
            .and_then(|rest| rest.strip_prefix('_'))
            .is_some_and(|idx| idx.parse::<usize>().is_ok())
    }
}

#[derive(Debug, Clone)]
pub enum OutputType {
    Fixed(ValueType),
    /// Type depends on the node instance (usually its resolved generics).
    Derived(DerivedOutputType),
}

#[derive(Debug, Clone)]
pub struct OutputSpec {
    pub key: &'static str,
    pub ty: OutputType,
}

/// Which of a node's own slots must share one resolved type.
#[derive(Debug, Clone, Default)]
pub enum GenericsChains {
    #[default]
    None,
    Static(Vec<Vec<SlotRef>>),
    Dynamic(ChainFn),
}

#[derive(Debug, Clone)]
pub struct NodeTypeDescriptor {
    pub type_tag: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub color: &'static str,
    pub width: f64,
    pub data: Vec<(&'static str, Value)>,
    pub inputs: Vec<InputSpec>,
    pub variadic_inputs: Option<VariadicSpec>,
    pub outputs: Vec<OutputSpec>,
    pub computation: Computation,
    pub generics: GenericsChains,
    pub get_errors: Option<ErrorsHook>,
    pub accepts: Option<AcceptsHook>,
}

/// Overrides applied on top of a descriptor's defaults by [`NodeTypeDescriptor::create`].
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    pub id: Option<NodeId>,
    pub data: HashMap<String, Value>,
    pub inputs: IndexMap<String, InputSlot>,
    pub position: Option<Vec2>,
}

impl CreateArgs {
    pub fn with_id(id: impl Into<NodeId>) -> Self {
        CreateArgs {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn data(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn input(mut self, key: &str, slot: InputSlot) -> Self {
        self.inputs.insert(key.to_string(), slot);
        self
    }
}

impl NodeTypeDescriptor {
    pub fn new(type_tag: &'static str, label: &'static str, computation: Computation) -> Self {
        NodeTypeDescriptor {
            type_tag,
            label,
            category: "",
            color: "#4a4a4a",
            width: 140.0,
            data: Vec::new(),
            inputs: Vec::new(),
            variadic_inputs: None,
            outputs: Vec::new(),
            computation,
            generics: GenericsChains::None,
            get_errors: None,
            accepts: None,
        }
    }

    pub fn category(mut self, category: &'static str) -> Self {
        self.category = category;
        self
    }

    pub fn color(mut self, color: &'static str) -> Self {
        self.color = color;
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn data(mut self, key: &'static str, default: impl Into<Value>) -> Self {
        self.data.push((key, default.into()));
        self
    }

    pub fn input(mut self, key: &'static str, ty: ValueType, default: impl Into<Value>) -> Self {
        self.inputs.push(InputSpec {
            key,
            ty,
            default: default.into(),
        });
        self
    }

    pub fn variadic(
        mut self,
        prefix: &'static str,
        ty: ValueType,
        default: Value,
        min: usize,
    ) -> Self {
        self.variadic_inputs = Some(VariadicSpec {
            prefix,
            ty,
            default,
            min,
        });
        self
    }

    pub fn output(mut self, key: &'static str, ty: ValueType) -> Self {
        self.outputs.push(OutputSpec {
            key,
            ty: OutputType::Fixed(ty),
        });
        self
    }

    pub fn derived_output(mut self, key: &'static str, f: DerivedOutputType) -> Self {
        self.outputs.push(OutputSpec {
            key,
            ty: OutputType::Derived(f),
        });
        self
    }

    pub fn chains(mut self, groups: &[&[(&str, bool)]]) -> Self {
        let groups = groups
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|(key, is_output)| SlotRef {
                        key: key.to_string(),
                        is_output: *is_output,
                    })
                    .collect()
            })
            .collect();
        self.generics = GenericsChains::Static(groups);
        self
    }

    pub fn dynamic_chains(mut self, f: ChainFn) -> Self {
        self.generics = GenericsChains::Dynamic(f);
        self
    }

    pub fn errors(mut self, f: ErrorsHook) -> Self {
        self.get_errors = Some(f);
        self
    }

    pub fn accepts(mut self, f: AcceptsHook) -> Self {
        self.accepts = Some(f);
        self
    }

    pub fn input_spec(&self, key: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|spec| spec.key == key)
    }

    pub fn output_spec(&self, key: &str) -> Option<&OutputSpec> {
        self.outputs.iter().find(|spec| spec.key == key)
    }

    /// Declared type of an input slot, including variadic members.
    pub fn declared_input_type(&self, key: &str) -> Option<&ValueType> {
        if let Some(spec) = self.input_spec(key) {
            return Some(&spec.ty);
        }
        self.variadic_inputs
            .as_ref()
            .filter(|variadic| variadic.matches(key))
            .map(|variadic| &variadic.ty)
    }

    pub fn declared_input_default(&self, key: &str) -> Option<&Value> {
        if let Some(spec) = self.input_spec(key) {
            return Some(&spec.default);
        }
        self.variadic_inputs
            .as_ref()
            .filter(|variadic| variadic.matches(key))
            .map(|variadic| &variadic.default)
    }

    /// Declared type of an output slot on `node`. Derived types are computed
    /// from the instance.
    pub fn declared_output_type(&self, node: &GraphNode, key: &str) -> Option<ValueType> {
        self.output_spec(key).map(|spec| match &spec.ty {
            OutputType::Fixed(ty) => ty.clone(),
            OutputType::Derived(f) => f(node),
        })
    }

    pub fn has_derived_outputs(&self) -> bool {
        self.outputs
            .iter()
            .any(|spec| matches!(spec.ty, OutputType::Derived(_)))
    }

    /// Slots on `node` sharing one resolved type with `key`. Includes `key`
    /// itself when it belongs to a chain; empty otherwise.
    pub fn chain_at(&self, node: &GraphNode, key: &str, is_output: bool) -> Vec<SlotRef> {
        match &self.generics {
            GenericsChains::None => Vec::new(),
            GenericsChains::Static(groups) => groups
                .iter()
                .find(|group| {
                    group
                        .iter()
                        .any(|slot| slot.key == key && slot.is_output == is_output)
                })
                .cloned()
                .unwrap_or_default(),
            GenericsChains::Dynamic(f) => f(node, key, is_output),
        }
    }

    pub fn errors_for(&self, node: &GraphNode) -> Option<Vec<String>> {
        self.get_errors.and_then(|f| f(node))
    }

    /// Whether `key` on `node` takes a producer of type `ty`, beyond plain
    /// type compatibility. Without a hook every compatible producer is taken.
    pub fn accepts_input(&self, node: &GraphNode, key: &str, ty: &ValueType) -> bool {
        self.accepts.map_or(true, |f| f(node, key, ty))
    }

    /// Build a fresh instance: defaults first, then `args` merged on top.
    pub fn create(&self, args: CreateArgs) -> GraphNode {
        let mut data: HashMap<String, Value> = self
            .data
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        data.extend(args.data);

        let mut inputs: IndexMap<String, InputSlot> = self
            .inputs
            .iter()
            .map(|spec| (spec.key.to_string(), InputSlot::literal(spec.default.clone())))
            .collect();
        if let Some(variadic) = &self.variadic_inputs {
            for index in 0..variadic.min {
                inputs.insert(variadic.key(index), InputSlot::literal(variadic.default.clone()));
            }
        }
        for (key, slot) in args.inputs {
            inputs.insert(key, slot);
        }

        GraphNode {
            id: args
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            type_tag: self.type_tag.to_string(),
            data,
            inputs,
            output_generics: HashMap::new(),
            position: args.position.unwrap_or_default(),
        }
    }
}

static BUILTIN: Lazy<Registry> = Lazy::new(|| {
    let mut registry = Registry::new();
    crate::nodes::register_builtin(&mut registry);
    registry
});

/// Lookup table from type tag to descriptor.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    nodes: HashMap<&'static str, NodeTypeDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// The built-in catalog, assembled once on first use.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    /// Add or replace a descriptor, returning the previous one for that tag.
    pub fn register(&mut self, descriptor: NodeTypeDescriptor) -> Option<NodeTypeDescriptor> {
        self.nodes.insert(descriptor.type_tag, descriptor)
    }

    pub fn lookup(&self, type_tag: &str) -> Option<&NodeTypeDescriptor> {
        self.nodes.get(type_tag)
    }

    pub fn descriptor_for(&self, node: &GraphNode) -> Option<&NodeTypeDescriptor> {
        self.lookup(&node.type_tag)
    }

    /// Sorted type tags.
    pub fn type_tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.nodes.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn create_node(&self, type_tag: &str, args: CreateArgs) -> Option<GraphNode> {
        self.lookup(type_tag).map(|descriptor| descriptor.create(args))
    }
}
