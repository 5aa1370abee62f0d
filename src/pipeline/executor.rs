//! Pipeline: the per-frame entry point and the graph-edit surface.
//!
//! Each frame:
//! 1. Reset every node's memoization state.
//! 2. Let the frame walk pull every entry node; upstream nodes run on demand,
//!    at most once each.
//!
//! Graph edits (`create_node`, `create_links`, `set_settings`,
//! `prune_nodetree`, `import_nodetree`) must happen between frames. The type
//! has no internal locking; the [`FrameDriver`](super::driver::FrameDriver)
//! serializes edits against evaluation for threaded embeddings.

use crate::config::PipelineSettings;
use crate::pipeline::bridge::SinkMessage;
use crate::pipeline::endpoint::EndpointRegistry;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::graph::NodeGraph;
use crate::pipeline::id::NodeId;
use crate::pipeline::link::{ConnectionRule, LinkRule, Links};
use crate::pipeline::node::Node;
use crate::pipeline::registry::UnitRegistry;
use crate::pipeline::settings::UnitSettings;
use crate::pipeline::unit::UnitType;
use crate::pipeline::value::Value;
use crate::pipeline::walk::{walk_for_policy, EntryFault, EntryWalk, FrameWalk};
use chrono::{DateTime, Utc};
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of one completed frame.
#[derive(Debug)]
pub struct FrameReport {
    pub frame: u64,
    pub entries_run: usize,
    /// Nodes that produced a result. Nodes unreachable from any entry stay out.
    pub nodes_evaluated: usize,
    /// Computation faults contained by an isolating walk.
    pub faults: Vec<EntryFault>,
    pub elapsed: Duration,
    pub completed_at: DateTime<Utc>,
}

pub struct Pipeline {
    graph: NodeGraph,
    registry: UnitRegistry,
    walk: Box<dyn FrameWalk>,
    link_rule: Box<dyn LinkRule>,
    frame: u64,
}

impl Pipeline {
    /// Pipeline with the abort-on-fault walk and plain connection links.
    pub fn new(registry: UnitRegistry) -> Self {
        Self {
            graph: NodeGraph::new(EndpointRegistry::new()),
            registry,
            walk: Box::new(EntryWalk),
            link_rule: Box::new(ConnectionRule),
            frame: 0,
        }
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut NodeGraph {
        &mut self.graph
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut UnitRegistry {
        &mut self.registry
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut NodeGraph, &mut UnitRegistry, &dyn LinkRule) {
        (&mut self.graph, &mut self.registry, self.link_rule.as_ref())
    }

    /// Frames started so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.graph.get(id)
    }

    // ── Frame execution ──

    /// Evaluate one frame.
    ///
    /// An error aborts the rest of the walk. Nodes that already ran keep their
    /// results until the next call.
    pub fn run(&mut self) -> PipelineResult<FrameReport> {
        let start = Instant::now();
        self.frame += 1;
        self.graph.next_frame();

        let walked = self.walk.walk(&mut self.graph);
        let nodes_evaluated = self.graph.evaluated_count();

        match walked {
            Ok(report) => {
                tracing::trace!(
                    "Frame {}: {} entries, {} nodes evaluated",
                    self.frame,
                    report.entries_run,
                    nodes_evaluated
                );
                Ok(FrameReport {
                    frame: self.frame,
                    entries_run: report.entries_run,
                    nodes_evaluated,
                    faults: report.faults,
                    elapsed: start.elapsed(),
                    completed_at: Utc::now(),
                })
            }
            Err(e) => {
                tracing::warn!("Frame {} aborted: {}", self.frame, e);
                Err(e)
            }
        }
    }

    // ── Graph building ──

    /// Create a node of a registered unit type.
    pub fn create_node(&mut self, type_name: &str, id: NodeId) -> PipelineResult<&mut Node> {
        let kind = self.registry.resolve(type_name)?;
        self.graph.create_node(kind, type_name, id)
    }

    /// Create a node from a unit type that is not in the registry.
    pub fn create_node_of(
        &mut self,
        kind: Arc<dyn UnitType>,
        type_name: impl Into<String>,
        id: NodeId,
    ) -> PipelineResult<&mut Node> {
        self.graph.create_node(kind, type_name, id)
    }

    pub fn create_links(&mut self, target: NodeId, links: &Links) -> PipelineResult<()> {
        self.graph
            .create_links(target, links, self.link_rule.as_ref())
    }

    pub fn set_settings(&mut self, id: NodeId, settings: UnitSettings) -> PipelineResult<()> {
        self.graph.set_settings(id, settings)
    }

    pub fn set_static(&mut self, id: NodeId, slot: &str, value: Value) -> PipelineResult<()> {
        self.graph.set_static(id, slot, value)
    }

    /// Keep only `keep`, dispose the rest and clear all wiring.
    pub fn prune_nodetree<I>(&mut self, keep: I) -> Vec<NodeId>
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.graph.prune_nodetree(keep)
    }

    /// Dispose every node and shut module hooks down.
    pub fn shutdown(&mut self) {
        self.graph.dispose_all();
        self.registry.shutdown();
        tracing::info!("Pipeline shut down after {} frames", self.frame);
    }
}

/// Builder for a configured pipeline.
pub struct PipelineBuilder {
    registry: Option<UnitRegistry>,
    walk: Option<Box<dyn FrameWalk>>,
    link_rule: Option<Box<dyn LinkRule>>,
    sink: Option<Sender<SinkMessage>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            registry: None,
            walk: None,
            link_rule: None,
            sink: None,
        }
    }

    /// Defaults to [`UnitRegistry::with_builtins`].
    pub fn registry(mut self, registry: UnitRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn walk(mut self, walk: Box<dyn FrameWalk>) -> Self {
        self.walk = Some(walk);
        self
    }

    pub fn link_rule(mut self, rule: Box<dyn LinkRule>) -> Self {
        self.link_rule = Some(rule);
        self
    }

    /// Forward published endpoint values over `tx`.
    pub fn sink(mut self, tx: Sender<SinkMessage>) -> Self {
        self.sink = Some(tx);
        self
    }

    /// Pick the walk from configured settings.
    pub fn settings(self, settings: &PipelineSettings) -> Self {
        self.walk(walk_for_policy(settings.fault_policy))
    }

    pub fn build(self) -> Pipeline {
        let endpoints = match self.sink {
            Some(tx) => EndpointRegistry::with_sender(tx),
            None => EndpointRegistry::new(),
        };
        Pipeline {
            graph: NodeGraph::new(endpoints),
            registry: self.registry.unwrap_or_else(UnitRegistry::with_builtins),
            walk: self.walk.unwrap_or_else(|| Box::new(EntryWalk)),
            link_rule: self.link_rule.unwrap_or_else(|| Box::new(ConnectionRule)),
            frame: 0,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
