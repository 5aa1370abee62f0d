//! Thread boundary between the frame driver (backend) and an embedding
//! application (frontend).
//!
//! The frontend edits the graph through [`PipelineCommand`]s and observes it
//! through [`SinkMessage`]s. Both channels are bounded.

use crate::pipeline::edit::NodeTree;
use crate::pipeline::executor::FrameReport;
use crate::pipeline::graph::TopologySnapshot;
use crate::pipeline::id::NodeId;
use crate::pipeline::link::Links;
use crate::pipeline::settings::UnitSettings;
use crate::pipeline::value::Value;
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::time::Duration;

/// Cloneable summary of a completed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    pub frame: u64,
    pub entries_run: usize,
    pub nodes_evaluated: usize,
    pub faults: usize,
    pub elapsed: Duration,
    pub completed_at: DateTime<Utc>,
}

impl From<&FrameReport> for FrameSummary {
    fn from(report: &FrameReport) -> Self {
        Self {
            frame: report.frame,
            entries_run: report.entries_run,
            nodes_evaluated: report.nodes_evaluated,
            faults: report.faults.len(),
            elapsed: report.elapsed,
            completed_at: report.completed_at,
        }
    }
}

/// Messages sent from the pipeline thread to the frontend.
#[derive(Debug, Clone)]
pub enum SinkMessage {
    /// A publish unit pushed a value to an endpoint.
    Published { endpoint: String, value: Value },

    /// A frame finished.
    FrameComplete(FrameSummary),

    /// A frame stopped early on an error.
    FrameAborted { frame: u64, error: String },

    /// An entry node was skipped under the isolating fault policy.
    EntryFault {
        frame: u64,
        node_id: NodeId,
        error: String,
    },

    /// Pipeline topology snapshot (response to `RequestTopology`).
    Topology(TopologySnapshot),

    /// A graph edit command failed.
    EditError(String),

    /// Pipeline is shutting down.
    Shutdown,
}

/// Commands sent from the frontend to the pipeline thread.
#[derive(Debug, Clone)]
pub enum PipelineCommand {
    /// Reconcile the whole graph to a new node tree.
    ApplyNodeTree(NodeTree),
    CreateNode { type_name: String, id: NodeId },
    SetSettings { id: NodeId, settings: UnitSettings },
    SetStatic { id: NodeId, slot: String, value: Value },
    CreateLinks { id: NodeId, links: Links },
    /// Keep only the listed nodes.
    Prune(Vec<NodeId>),
    /// Frames per second; 0 runs frames back to back.
    SetFrameRate(u32),
    Pause,
    Resume,
    RequestTopology,
    /// Shut down the pipeline thread.
    Shutdown,
}

/// Frontend-side handle for communicating with the pipeline thread.
pub struct PipelineBridge {
    pub cmd_tx: Sender<PipelineCommand>,
    pub msg_rx: Receiver<SinkMessage>,
}

impl PipelineBridge {
    /// Create a new bridge pair: `(bridge_for_frontend, cmd_rx, msg_tx)`.
    ///
    /// The pipeline thread owns `cmd_rx` and `msg_tx`.
    pub fn new(
        command_capacity: usize,
        message_capacity: usize,
    ) -> (Self, Receiver<PipelineCommand>, Sender<SinkMessage>) {
        let (cmd_tx, cmd_rx) = bounded(command_capacity);
        let (msg_tx, msg_rx) = bounded(message_capacity);
        (Self { cmd_tx, msg_rx }, cmd_rx, msg_tx)
    }

    /// Drain all pending messages.
    pub fn drain(&self) -> Vec<SinkMessage> {
        self.msg_rx.try_iter().collect()
    }

    pub fn try_recv(&self) -> Option<SinkMessage> {
        self.msg_rx.try_recv().ok()
    }

    /// Block up to `timeout` for the next message.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<SinkMessage> {
        self.msg_rx.recv_timeout(timeout).ok()
    }

    /// Returns `false` once the pipeline thread is gone.
    pub fn send_command(&self, cmd: PipelineCommand) -> bool {
        self.cmd_tx.send(cmd).is_ok()
    }

    pub fn apply_nodetree(&self, tree: NodeTree) -> bool {
        self.send_command(PipelineCommand::ApplyNodeTree(tree))
    }

    pub fn set_frame_rate(&self, hz: u32) {
        let _ = self.cmd_tx.send(PipelineCommand::SetFrameRate(hz));
    }

    pub fn pause(&self) {
        let _ = self.cmd_tx.send(PipelineCommand::Pause);
    }

    pub fn resume(&self) {
        let _ = self.cmd_tx.send(PipelineCommand::Resume);
    }

    pub fn request_topology(&self) {
        let _ = self.cmd_tx.send(PipelineCommand::RequestTopology);
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(PipelineCommand::Shutdown);
    }
}
