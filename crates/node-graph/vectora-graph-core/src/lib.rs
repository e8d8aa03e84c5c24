pub mod connection;
pub mod error;
pub mod eval;
pub mod generics;
pub mod nodes;
pub mod registry;
pub mod types;

pub use connection::{
    clean_stale_generics, connect, cut_edges, cut_edges_hit, detach_nodes, disconnect,
    validate_connection,
};
pub use error::GraphError;
pub use eval::{
    collect_errors, get_input, resolve_all, resolve_one, resolve_targets, EvalContext, NullContext,
    ObjectKind, ObjectProps, SceneStore,
};
pub use generics::{pick_concrete_type, resolve_slot_type};
pub use registry::{CreateArgs, NodeTypeDescriptor, Registry};
pub use types::*;
