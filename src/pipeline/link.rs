//! Links: the value source behind each input slot.
//!
//! A link is either a constant captured at wiring time or a reference to an
//! output field of another node. The reference stores the node id only; it is
//! resolved through the graph's registry on every call, so links never own
//! (or keep alive) the node they point at.

use crate::pipeline::error::{PipelineResult, WiringError};
use crate::pipeline::graph::NodeGraph;
use crate::pipeline::id::NodeId;
use crate::pipeline::node::Node;
use crate::pipeline::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference to an output field of a node. Also the wire shape an editor
/// sends to request a connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub id: NodeId,
    pub name: String,
}

impl Connection {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Requested wiring for one node: input slot name → connection.
pub type Links = BTreeMap<String, Connection>;

#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    /// Constant value; returned unchanged on every call.
    Static(Value),
    /// Output field of another node, evaluated on demand.
    Connection(Connection),
}

impl Link {
    /// The default link of an unwired slot.
    pub fn null() -> Self {
        Link::Static(Value::Null)
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Link::Static(_))
    }

    pub fn connection(&self) -> Option<&Connection> {
        match self {
            Link::Connection(c) => Some(c),
            Link::Static(_) => None,
        }
    }

    /// Produce this link's value for the current frame.
    ///
    /// For a connection, runs (or reuses the cached result of) the referenced
    /// node and extracts the named field.
    pub fn run(&self, graph: &mut NodeGraph) -> PipelineResult<Value> {
        match self {
            Link::Static(value) => Ok(value.clone()),
            Link::Connection(conn) => {
                let results = graph.run_node(conn.id)?;
                results.get(&conn.name).cloned().ok_or_else(|| {
                    WiringError::MissingField {
                        node_id: conn.id,
                        field: conn.name.clone(),
                    }
                    .into()
                })
            }
        }
    }
}

impl Default for Link {
    fn default() -> Self {
        Self::null()
    }
}

/// How a requested connection becomes a concrete link.
pub trait LinkRule: Send {
    fn create_link(&self, target: &Node, slot: &str, source: &Node, field: &str) -> Link;
}

/// Default rule: a plain connection link to `source.field`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionRule;

impl LinkRule for ConnectionRule {
    fn create_link(&self, _target: &Node, _slot: &str, source: &Node, field: &str) -> Link {
        Link::Connection(Connection::new(source.id(), field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_link_is_stable() {
        let mut graph = NodeGraph::default();
        let link = Link::Static(Value::Int(42));
        for _ in 0..3 {
            assert_eq!(link.run(&mut graph).unwrap(), Value::Int(42));
        }
        assert_eq!(Link::default(), Link::null());
        assert!(Link::null().is_static());
    }

    #[test]
    fn test_connection_to_missing_node_is_wiring_fault() {
        let mut graph = NodeGraph::default();
        let missing = NodeId::from_u128(99);
        let link = Link::Connection(Connection::new(missing, "value"));

        let err = link.run(&mut graph).unwrap_err();
        assert!(!err.is_computation_fault());
        assert_eq!(err.node_id(), Some(missing));
    }

    #[test]
    fn test_connection_wire_shape() {
        let json = r#"{"id":"00000000-0000-0000-0000-000000000005","name":"img"}"#;
        let conn: Connection = serde_json::from_str(json).unwrap();
        assert_eq!(conn, Connection::new(NodeId::from_u128(5), "img"));
    }
}
