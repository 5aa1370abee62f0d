//! Test graph builders

use framegraph::pipeline::{
    Connection, Links, NodeId, Pipeline, UnitRegistry, UnitSettings, UnitType, Value,
};
use std::sync::Arc;

/// Small numeric ids read better in assertions than random uuids.
pub fn id(n: u128) -> NodeId {
    NodeId::from_u128(n)
}

pub fn links(pairs: &[(&str, u128, &str)]) -> Links {
    pairs
        .iter()
        .map(|(slot, source, field)| (slot.to_string(), Connection::new(id(*source), *field)))
        .collect()
}

/// Builder for pipelines wired node by node through the public edit API
pub struct GraphBuilder {
    pipeline: Pipeline,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            pipeline: Pipeline::new(UnitRegistry::with_builtins()),
        }
    }

    pub fn on(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    pub fn constant(mut self, n: u128, value: impl Into<Value>) -> Self {
        self.pipeline.create_node("core/Constant", id(n)).unwrap();
        self.pipeline
            .set_settings(id(n), UnitSettings::new().with("value", value))
            .unwrap();
        self
    }

    pub fn scale(mut self, n: u128, factor: f64, source: u128) -> Self {
        self.pipeline.create_node("core/Scale", id(n)).unwrap();
        self.pipeline
            .set_settings(id(n), UnitSettings::new().with("factor", factor))
            .unwrap();
        self.link(n, &[("value", source, "value")])
    }

    pub fn sum(mut self, n: u128, a: u128, b: u128) -> Self {
        self.pipeline.create_node("core/Sum", id(n)).unwrap();
        self.link(n, &[("a", a, "value"), ("b", b, "value")])
    }

    pub fn publish(mut self, n: u128, name: &str, source: u128, field: &str) -> Self {
        self.pipeline.create_node("core/Publish", id(n)).unwrap();
        self.pipeline
            .set_settings(id(n), UnitSettings::new().with("name", name))
            .unwrap();
        self.link(n, &[("value", source, field)])
    }

    /// Add a node of an unregistered unit type.
    pub fn unit(mut self, n: u128, kind: Arc<dyn UnitType>, wiring: &[(&str, u128, &str)]) -> Self {
        let type_name = format!("test/{}", kind.name());
        self.pipeline.create_node_of(kind, type_name, id(n)).unwrap();
        self.link(n, wiring)
    }

    pub fn link(mut self, n: u128, wiring: &[(&str, u128, &str)]) -> Self {
        if !wiring.is_empty() {
            self.pipeline.create_links(id(n), &links(wiring)).unwrap();
        }
        self
    }

    pub fn build(self) -> Pipeline {
        self.pipeline
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Constant 5 fanned out to ×2 and ×3, summed and published as `"result"`.
pub fn diamond() -> Pipeline {
    GraphBuilder::new()
        .constant(1, 5i64)
        .scale(2, 2.0, 1)
        .scale(3, 3.0, 1)
        .sum(4, 2, 3)
        .publish(5, "result", 4, "sum")
        .build()
}
