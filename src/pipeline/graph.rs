//! The node registry and the demand-driven evaluator.
//!
//! Nodes live in one owned map indexed by id; links refer to other nodes by id
//! only. Evaluation is a recursive pull: running a node resolves each of its
//! input links, which runs the referenced upstream nodes first. Every node
//! memoizes its result for the frame, so fan-in never causes a second run.
//!
//! The graph is assumed acyclic. A cycle in the wiring recurses without bound.

use crate::pipeline::endpoint::EndpointRegistry;
use crate::pipeline::error::{PipelineError, PipelineResult, WiringError};
use crate::pipeline::id::NodeId;
use crate::pipeline::link::{Link, LinkRule, Links};
use crate::pipeline::node::{FrameState, Node};
use crate::pipeline::port::find_port;
use crate::pipeline::settings::UnitSettings;
use crate::pipeline::unit::UnitType;
use crate::pipeline::value::{Record, Value};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Bookkeeping entry for a connection installed through `create_links`.
/// Evaluation never reads these; it uses each node's own slot list.
#[derive(Debug, Clone)]
pub struct ActiveLink {
    pub target: NodeId,
    pub slot: String,
    pub link: Link,
}

/// Owned collection of nodes plus the entry set and endpoint registry.
#[derive(Default)]
pub struct NodeGraph {
    nodes: HashMap<NodeId, Node>,
    /// Registry order (creation order of the surviving nodes).
    order: Vec<NodeId>,
    links: Vec<ActiveLink>,
    entries: HashSet<NodeId>,
    endpoints: EndpointRegistry,
}

impl NodeGraph {
    pub fn new(endpoints: EndpointRegistry) -> Self {
        Self {
            endpoints,
            ..Self::default()
        }
    }

    // ── Queries ──

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Node ids in registry order.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.order
    }

    /// Nodes in registry order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(move |id| self.nodes.get(id))
    }

    /// Entry (side-effecting) node ids in registry order.
    pub fn entry_ids(&self) -> Vec<NodeId> {
        self.order
            .iter()
            .filter(|id| self.entries.contains(id))
            .copied()
            .collect()
    }

    pub fn is_entry(&self, id: NodeId) -> bool {
        self.entries.contains(&id)
    }

    pub fn links(&self) -> &[ActiveLink] {
        &self.links
    }

    pub fn endpoints(&self) -> &EndpointRegistry {
        &self.endpoints
    }

    pub fn endpoints_mut(&mut self) -> &mut EndpointRegistry {
        &mut self.endpoints
    }

    /// Number of nodes that produced a result this frame.
    pub fn evaluated_count(&self) -> usize {
        self.nodes.values().filter(|n| n.has_run()).count()
    }

    // ── Graph building ──

    /// Register a new node with null wiring and default settings.
    ///
    /// The caller wires inputs and sets settings afterwards; nothing runs until
    /// the next frame.
    pub fn create_node(
        &mut self,
        kind: Arc<dyn UnitType>,
        type_name: impl Into<String>,
        id: NodeId,
    ) -> PipelineResult<&mut Node> {
        if self.nodes.contains_key(&id) {
            return Err(PipelineError::DuplicateNode(id));
        }

        let node = Node::new(kind, type_name, id);
        if node.has_side_effect() {
            self.entries.insert(id);
        }
        tracing::info!("Created node {} ({})", id, node.type_name());

        self.order.push(id);
        Ok(self.nodes.entry(id).or_insert(node))
    }

    /// Wire `target`'s slots to the given connections.
    ///
    /// Both ends must exist and the source field must be a declared output.
    /// Cycles are not checked.
    pub fn create_links(
        &mut self,
        target: NodeId,
        links: &Links,
        rule: &dyn LinkRule,
    ) -> PipelineResult<()> {
        for (slot, conn) in links {
            let target_node = self
                .nodes
                .get(&target)
                .ok_or(WiringError::MissingNode(target))?;
            let source_node = self
                .nodes
                .get(&conn.id)
                .ok_or(WiringError::MissingNode(conn.id))?;

            if find_port(source_node.kind().outputs(), &conn.name).is_none() {
                return Err(WiringError::UnknownOutput {
                    node_id: conn.id,
                    field: conn.name.clone(),
                }
                .into());
            }

            let link = rule.create_link(target_node, slot, source_node, &conn.name);

            let target_node = self
                .nodes
                .get_mut(&target)
                .ok_or(WiringError::MissingNode(target))?;
            target_node.set_link(slot, link.clone())?;

            tracing::trace!("Linked {}.{} <- {}.{}", target, slot, conn.id, conn.name);
            self.links.push(ActiveLink {
                target,
                slot: slot.clone(),
                link,
            });
        }
        Ok(())
    }

    /// Install a constant on one of `id`'s slots.
    pub fn set_static(&mut self, id: NodeId, slot: &str, value: Value) -> PipelineResult<()> {
        self.nodes
            .get_mut(&id)
            .ok_or(WiringError::MissingNode(id))?
            .set_static(slot, value)
    }

    /// Validate and apply a settings record.
    ///
    /// A rejected record never reaches the node. A changed record disposes the
    /// live instance so the next run rebuilds it from the new settings.
    pub fn set_settings(&mut self, id: NodeId, settings: UnitSettings) -> PipelineResult<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(WiringError::MissingNode(id))?;

        let settings = node.kind().validate_settings(settings).map_err(|source| {
            PipelineError::InvalidSettings {
                type_name: node.type_name().to_string(),
                source,
            }
        })?;

        if node.replace_settings(settings) && node.is_initialized() {
            tracing::info!("Settings of node {} changed, restarting unit", id);
            node.dispose(&mut self.endpoints);
        }
        Ok(())
    }

    // ── Evaluation ──

    /// Reset every node's memoization state. Call once before each frame.
    pub fn next_frame(&mut self) {
        for node in self.nodes.values_mut() {
            node.next_frame();
        }
    }

    /// Evaluate `id` for the current frame, reusing its cached result if it
    /// already ran.
    pub fn run_node(&mut self, id: NodeId) -> PipelineResult<Arc<Record>> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(WiringError::MissingNode(id))?;

        match node.state() {
            FrameState::Done(results) => return Ok(results.clone()),
            FrameState::Faulted => return Err(PipelineError::UpstreamFault { node_id: id }),
            FrameState::Fresh => {}
        }

        if let Err(err) = node.ensure_init(&mut self.endpoints) {
            node.mark_faulted();
            return Err(err);
        }

        let links: Vec<(&'static str, Link)> = node
            .inputs()
            .iter()
            .map(|slot| (slot.name, slot.link.clone()))
            .collect();

        let mut inputs = Record::with_capacity(links.len());
        for (slot, link) in &links {
            inputs.insert(*slot, link.run(self)?);
        }

        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(WiringError::MissingNode(id))?;
        tracing::trace!("Running node {} ({})", id, node.type_name());
        node.run_unit(&inputs)
    }

    // ── Editing ──

    /// Reconcile the registry to `keep` and discard all wiring.
    ///
    /// Every remaining node gets null links on all slots, so the editor must
    /// resend the complete wiring afterwards. Removed nodes are disposed before
    /// they are dropped. Surviving nodes keep their live unit instance.
    /// Returns the removed ids in registry order.
    pub fn prune_nodetree<I>(&mut self, keep: I) -> Vec<NodeId>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let keep: HashSet<NodeId> = keep.into_iter().collect();
        let removed: Vec<NodeId> = self
            .order
            .iter()
            .filter(|id| !keep.contains(id))
            .copied()
            .collect();

        self.links.clear();
        for node in self.nodes.values_mut() {
            node.reset_io();
        }

        for id in &removed {
            if let Some(mut node) = self.nodes.remove(id) {
                node.dispose(&mut self.endpoints);
                tracing::info!("Removed node {} ({})", id, node.type_name());
            }
            self.entries.remove(id);
        }
        self.order.retain(|id| keep.contains(id));

        removed
    }

    /// Dispose and drop every node.
    pub fn dispose_all(&mut self) {
        let removed = self.prune_nodetree(std::iter::empty());
        tracing::debug!("Disposed {} nodes", removed.len());
    }

    /// Serializable view of the current topology.
    pub fn snapshot(&self) -> TopologySnapshot {
        let nodes = self
            .nodes()
            .map(|node| NodeSnapshot {
                id: node.id(),
                type_name: node.type_name().to_string(),
                entry: self.is_entry(node.id()),
                initialized: node.is_initialized(),
                inputs: node
                    .inputs()
                    .iter()
                    .map(|slot| SlotSnapshot {
                        name: slot.name.to_string(),
                        source: slot.link.connection().cloned(),
                    })
                    .collect(),
            })
            .collect();

        TopologySnapshot {
            nodes,
            endpoints: self.endpoints.names(),
        }
    }
}

/// Snapshot of one input slot.
#[derive(Debug, Clone, Serialize)]
pub struct SlotSnapshot {
    pub name: String,
    /// `None` for constant links.
    pub source: Option<crate::pipeline::link::Connection>,
}

/// Snapshot of a single node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub type_name: String,
    pub entry: bool,
    pub initialized: bool,
    pub inputs: Vec<SlotSnapshot>,
}

/// Complete topology snapshot of the pipeline graph.
#[derive(Debug, Clone, Serialize)]
pub struct TopologySnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub endpoints: Vec<String>,
}
