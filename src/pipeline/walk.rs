//! Frame walks: which entry nodes to run each frame, and how faults spread.
//!
//! Every walk must run every entry node at least once. Order among entry
//! nodes is registry order, but units must not depend on it; ordering between
//! units is expressed through data dependencies only.

use crate::config::FaultPolicy;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::graph::NodeGraph;
use crate::pipeline::id::NodeId;

/// A computation fault contained to one entry node.
#[derive(Debug)]
pub struct EntryFault {
    pub entry: NodeId,
    pub error: PipelineError,
}

/// What a walk did this frame.
#[derive(Debug, Default)]
pub struct WalkReport {
    /// Entry nodes whose evaluation completed.
    pub entries_run: usize,
    pub faults: Vec<EntryFault>,
}

pub trait FrameWalk: Send {
    fn walk(&mut self, graph: &mut NodeGraph) -> PipelineResult<WalkReport>;
}

/// Runs every entry node once; the first error aborts the frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryWalk;

impl FrameWalk for EntryWalk {
    fn walk(&mut self, graph: &mut NodeGraph) -> PipelineResult<WalkReport> {
        let mut report = WalkReport::default();
        for id in graph.entry_ids() {
            graph.run_node(id)?;
            report.entries_run += 1;
        }
        Ok(report)
    }
}

/// Runs every entry node once, containing computation faults to the entry
/// that hit them. Wiring faults still abort the frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsolatingWalk;

impl FrameWalk for IsolatingWalk {
    fn walk(&mut self, graph: &mut NodeGraph) -> PipelineResult<WalkReport> {
        let mut report = WalkReport::default();
        for id in graph.entry_ids() {
            match graph.run_node(id) {
                Ok(_) => report.entries_run += 1,
                Err(error) if error.is_computation_fault() => {
                    tracing::warn!("Entry node {} skipped this frame: {}", id, error);
                    report.faults.push(EntryFault { entry: id, error });
                }
                Err(error) => return Err(error),
            }
        }
        Ok(report)
    }
}

/// Walk matching a configured fault policy.
pub fn walk_for_policy(policy: FaultPolicy) -> Box<dyn FrameWalk> {
    match policy {
        FaultPolicy::AbortFrame => Box::new(EntryWalk),
        FaultPolicy::IsolateEntry => Box::new(IsolatingWalk),
    }
}
