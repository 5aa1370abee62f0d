//! Whole-graph edits sent by an editor.
//!
//! A [`NodeTree`] describes the complete desired graph. Importing it
//! reconciles the live graph: nodes missing from the tree are disposed,
//! surviving nodes keep their unit instance (unless their settings changed),
//! and all wiring is rebuilt from scratch.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::executor::Pipeline;
use crate::pipeline::id::NodeId;
use crate::pipeline::link::{Connection, Links};
use crate::pipeline::settings::UnitSettings;
use crate::pipeline::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Desired state of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: NodeId,
    /// Qualified unit type name, e.g. `"core/Scale"`.
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "UnitSettings::is_empty")]
    pub settings: UnitSettings,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: Links,
    /// Constant values for slots that are not linked.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub statics: BTreeMap<String, Value>,
}

impl NodeSpec {
    pub fn new(id: NodeId, type_name: impl Into<String>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            settings: UnitSettings::default(),
            inputs: Links::new(),
            statics: BTreeMap::new(),
        }
    }

    pub fn with_settings(mut self, settings: UnitSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_input(mut self, slot: impl Into<String>, source: NodeId, field: impl Into<String>) -> Self {
        self.inputs
            .insert(slot.into(), Connection::new(source, field));
        self
    }

    pub fn with_static(mut self, slot: impl Into<String>, value: impl Into<Value>) -> Self {
        self.statics.insert(slot.into(), value.into());
        self
    }
}

/// The complete desired graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeTree {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

impl NodeTree {
    pub fn new(nodes: Vec<NodeSpec>) -> Self {
        Self { nodes }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// What an import changed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

impl Pipeline {
    /// Reconcile the graph to `tree`.
    ///
    /// Unknown types, invalid settings and duplicate ids are rejected before
    /// anything is touched. A node whose type changed is replaced by a fresh
    /// one. Wiring errors surface after the structural changes were applied;
    /// the graph then holds the tree's nodes with partial wiring.
    pub fn import_nodetree(&mut self, tree: &NodeTree) -> PipelineResult<ImportSummary> {
        let mut seen = HashSet::with_capacity(tree.nodes.len());
        let mut validated = Vec::with_capacity(tree.nodes.len());
        for wanted in &tree.nodes {
            if !seen.insert(wanted.id) {
                return Err(PipelineError::DuplicateNode(wanted.id));
            }
            let kind = self.registry().resolve(&wanted.type_name)?;
            let settings = kind.validate_settings(wanted.settings.clone()).map_err(|source| {
                PipelineError::InvalidSettings {
                    type_name: wanted.type_name.clone(),
                    source,
                }
            })?;
            validated.push((wanted, kind, settings));
        }

        let keep: Vec<NodeId> = tree
            .nodes
            .iter()
            .filter(|wanted| {
                self.graph()
                    .get(wanted.id)
                    .map_or(true, |node| node.type_name() == wanted.type_name)
            })
            .map(|wanted| wanted.id)
            .collect();

        let (graph, registry, rule) = self.parts_mut();
        let removed = graph.prune_nodetree(keep);

        let mut created = Vec::new();
        for (wanted, kind, settings) in validated {
            if !graph.contains(wanted.id) {
                graph.create_node(kind, wanted.type_name.as_str(), wanted.id)?;
                created.push(wanted.id);
            }
            graph.set_settings(wanted.id, settings)?;
        }

        for wanted in &tree.nodes {
            for (slot, value) in &wanted.statics {
                graph.set_static(wanted.id, slot, value.clone())?;
            }
            graph.create_links(wanted.id, &wanted.inputs, rule)?;
        }

        registry.pipeline_update(graph);

        tracing::info!(
            "Imported node tree: {} nodes ({} created, {} removed)",
            tree.nodes.len(),
            created.len(),
            removed.len()
        );
        Ok(ImportSummary { created, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::registry::UnitRegistry;

    fn id(n: u128) -> NodeId {
        NodeId::from_u128(n)
    }

    fn doubling_tree(value: i64) -> NodeTree {
        NodeTree::new(vec![
            NodeSpec::new(id(1), "core/Constant")
                .with_settings(UnitSettings::new().with("value", value)),
            NodeSpec::new(id(2), "core/Scale")
                .with_settings(UnitSettings::new().with("factor", 2.0))
                .with_input("value", id(1), "value"),
            NodeSpec::new(id(3), "core/Publish")
                .with_settings(UnitSettings::new().with("name", "out"))
                .with_input("value", id(2), "value"),
        ])
    }

    #[test]
    fn test_import_builds_and_runs() {
        let mut pipeline = Pipeline::new(UnitRegistry::with_builtins());
        let summary = pipeline.import_nodetree(&doubling_tree(21)).unwrap();
        assert_eq!(summary.created, vec![id(1), id(2), id(3)]);
        assert!(summary.removed.is_empty());

        pipeline.run().unwrap();
        assert_eq!(
            pipeline.graph().endpoints().latest("out"),
            Some(Value::Float(42.0))
        );
    }

    #[test]
    fn test_reimport_keeps_untouched_instances() {
        let mut pipeline = Pipeline::new(UnitRegistry::with_builtins());
        pipeline.import_nodetree(&doubling_tree(1)).unwrap();
        pipeline.run().unwrap();

        let summary = pipeline.import_nodetree(&doubling_tree(5)).unwrap();
        assert!(summary.created.is_empty());
        // Only the constant's settings changed.
        assert!(!pipeline.node(id(1)).unwrap().is_initialized());
        assert!(pipeline.node(id(2)).unwrap().is_initialized());
        assert!(pipeline.node(id(3)).unwrap().is_initialized());

        pipeline.run().unwrap();
        assert_eq!(
            pipeline.graph().endpoints().latest("out"),
            Some(Value::Float(10.0))
        );
    }

    #[test]
    fn test_type_change_replaces_node() {
        let mut pipeline = Pipeline::new(UnitRegistry::with_builtins());
        pipeline.import_nodetree(&doubling_tree(1)).unwrap();

        let mut tree = doubling_tree(1);
        tree.nodes[1] = NodeSpec::new(id(2), "core/Sum")
            .with_input("a", id(1), "value")
            .with_static("b", 10i64);
        tree.nodes[2] = NodeSpec::new(id(3), "core/Publish")
            .with_settings(UnitSettings::new().with("name", "out"))
            .with_input("value", id(2), "sum");

        let summary = pipeline.import_nodetree(&tree).unwrap();
        assert_eq!(summary.removed, vec![id(2)]);
        assert_eq!(summary.created, vec![id(2)]);
        assert_eq!(pipeline.node(id(2)).unwrap().type_name(), "core/Sum");

        pipeline.run().unwrap();
        assert_eq!(
            pipeline.graph().endpoints().latest("out"),
            Some(Value::Float(11.0))
        );
    }

    #[test]
    fn test_invalid_tree_leaves_graph_untouched() {
        let mut pipeline = Pipeline::new(UnitRegistry::with_builtins());
        pipeline.import_nodetree(&doubling_tree(1)).unwrap();

        let mut tree = doubling_tree(1);
        tree.nodes.push(NodeSpec::new(id(4), "vision/Blur"));
        assert!(matches!(
            pipeline.import_nodetree(&tree),
            Err(PipelineError::UnknownUnitType(_))
        ));

        let mut tree = doubling_tree(1);
        tree.nodes[1].settings = UnitSettings::new().with("factor", "two");
        assert!(matches!(
            pipeline.import_nodetree(&tree),
            Err(PipelineError::InvalidSettings { .. })
        ));

        assert_eq!(pipeline.graph().len(), 3);
        assert_eq!(pipeline.graph().links().len(), 2);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut pipeline = Pipeline::new(UnitRegistry::with_builtins());
        let tree = NodeTree::new(vec![
            NodeSpec::new(id(1), "core/Constant"),
            NodeSpec::new(id(1), "core/Constant"),
        ]);
        assert!(matches!(
            pipeline.import_nodetree(&tree),
            Err(PipelineError::DuplicateNode(_))
        ));
        assert!(pipeline.graph().is_empty());
    }

    #[test]
    fn test_json_wire_shape() {
        let json = format!(
            r#"{{
                "nodes": [
                    {{ "id": "{a}", "type": "core/Constant", "settings": {{ "value": 3 }} }},
                    {{ "id": "{b}", "type": "core/Publish",
                       "inputs": {{ "value": {{ "id": "{a}", "name": "value" }} }} }}
                ]
            }}"#,
            a = id(1),
            b = id(2)
        );
        let tree = NodeTree::from_json(&json).unwrap();
        assert_eq!(tree.nodes.len(), 2);
        assert_eq!(tree.nodes[0].type_name, "core/Constant");
        assert_eq!(tree.nodes[0].settings.get("value"), Some(&Value::Int(3)));
        assert_eq!(tree.nodes[1].inputs["value"].id, id(1));

        let back = NodeTree::from_json(&tree.to_json().unwrap()).unwrap();
        assert_eq!(back, tree);
    }
}
