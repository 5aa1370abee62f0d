//! Pipeline-specific error types.
//!
//! Three classes of failure exist:
//! - wiring faults ([`WiringError`]): a link points at a node or field that
//!   does not exist. These are graph-construction bugs and always abort the frame.
//! - computation faults: a unit failed to start or run. Whether these abort the
//!   whole frame is decided by the active [`FrameWalk`](super::walk::FrameWalk).
//! - configuration faults: `validate_settings` rejected a settings record.

use crate::pipeline::id::NodeId;
use thiserror::Error;

/// Broken wiring. Never expected with a correctly built graph.
#[derive(Error, Debug)]
pub enum WiringError {
    #[error("Node {0} does not exist")]
    MissingNode(NodeId),

    #[error("Node {node_id} produced no output field '{field}'")]
    MissingField { node_id: NodeId, field: String },

    #[error("Node {node_id} has no input slot '{slot}'")]
    UnknownSlot { node_id: NodeId, slot: String },

    #[error("Node {node_id} declares no output '{field}'")]
    UnknownOutput { node_id: NodeId, field: String },
}

/// Errors that can occur within the pipeline system.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Wiring(#[from] WiringError),

    #[error("Node {node_id} failed: {source}")]
    Compute {
        node_id: NodeId,
        #[source]
        source: anyhow::Error,
    },

    #[error("Node {node_id} failed to start: {source}")]
    Init {
        node_id: NodeId,
        #[source]
        source: anyhow::Error,
    },

    #[error("Node {node_id} already failed this frame")]
    UpstreamFault { node_id: NodeId },

    #[error("Invalid settings for {type_name}: {source}")]
    InvalidSettings {
        type_name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),

    #[error("Node {0} already exists")]
    DuplicateNode(NodeId),

    #[error("Module already registered: {0}")]
    DuplicateModule(String),

    #[error("Channel send error")]
    ChannelSend,
}

impl PipelineError {
    /// Whether this error came from a unit's own `on_start`/`run`, as opposed
    /// to broken wiring or a configuration problem.
    pub fn is_computation_fault(&self) -> bool {
        matches!(
            self,
            PipelineError::Compute { .. }
                | PipelineError::Init { .. }
                | PipelineError::UpstreamFault { .. }
        )
    }

    /// The node the error is attributed to, if any.
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            PipelineError::Compute { node_id, .. }
            | PipelineError::Init { node_id, .. }
            | PipelineError::UpstreamFault { node_id }
            | PipelineError::DuplicateNode(node_id) => Some(*node_id),
            PipelineError::Wiring(w) => match w {
                WiringError::MissingNode(node_id) => Some(*node_id),
                WiringError::MissingField { node_id, .. }
                | WiringError::UnknownSlot { node_id, .. }
                | WiringError::UnknownOutput { node_id, .. } => Some(*node_id),
            },
            _ => None,
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_classification() {
        let id = NodeId::from_u128(1);
        let compute = PipelineError::Compute {
            node_id: id,
            source: anyhow::anyhow!("boom"),
        };
        assert!(compute.is_computation_fault());
        assert_eq!(compute.node_id(), Some(id));

        let wiring = PipelineError::from(WiringError::MissingNode(id));
        assert!(!wiring.is_computation_fault());
        assert_eq!(wiring.node_id(), Some(id));

        assert!(!PipelineError::UnknownUnitType("x/y".into()).is_computation_fault());
    }

    #[test]
    fn test_error_display() {
        let err = PipelineError::from(WiringError::MissingField {
            node_id: NodeId::from_u128(3),
            field: "img".into(),
        });
        assert!(err.to_string().contains("no output field 'img'"));
    }
}
