use thiserror::Error;

use crate::types::NodeId;

/// Errors that abort an evaluation pass or a generics repair. No partial
/// output map or patch survives them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("cyclic dependency detected at node '{node_id}'")]
    CyclicDependency { node_id: NodeId },
    #[error("node '{node_id}' input '{key}' is neither connected nor set")]
    MissingRequiredInput { node_id: NodeId, key: String },
    #[error("node '{node_id}' has unregistered type '{type_tag}'")]
    UnknownNodeType { node_id: NodeId, type_tag: String },
    #[error("generics around '{node_id}.{key}' did not settle")]
    GenericsUnsettled { node_id: NodeId, key: String },
}
