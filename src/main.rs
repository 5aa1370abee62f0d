//! framegraph demo runner
//!
//! Loads the engine config (path as the first argument, or the default
//! location), builds a small diamond-shaped graph and drives it for a few
//! frames, logging every published value.

use framegraph::{
    config::EngineConfig,
    logging,
    pipeline::{FrameDriver, NodeId, NodeSpec, NodeTree, Pipeline, SinkMessage, UnitSettings},
    Error, ResultExt,
};
use std::time::Duration;

const DEMO_FRAMES: u64 = 10;

fn demo_tree() -> NodeTree {
    let source = NodeId::new_v4();
    let double = NodeId::new_v4();
    let triple = NodeId::new_v4();
    let sum = NodeId::new_v4();
    let publish = NodeId::new_v4();
    let unused = NodeId::new_v4();

    NodeTree::new(vec![
        NodeSpec::new(source, "core/Constant")
            .with_settings(UnitSettings::new().with("value", 5i64)),
        NodeSpec::new(double, "core/Scale")
            .with_settings(UnitSettings::new().with("factor", 2.0))
            .with_input("value", source, "value"),
        NodeSpec::new(triple, "core/Scale")
            .with_settings(UnitSettings::new().with("factor", 3.0))
            .with_input("value", source, "value"),
        NodeSpec::new(sum, "core/Sum")
            .with_input("a", double, "value")
            .with_input("b", triple, "value"),
        NodeSpec::new(publish, "core/Publish")
            .with_settings(UnitSettings::new().with("name", "result"))
            .with_input("value", sum, "sum"),
        // Nothing consumes this one, so it never runs.
        NodeSpec::new(unused, "core/Scale")
            .with_settings(UnitSettings::new().with("factor", 100.0))
            .with_input("value", source, "value"),
    ])
}

fn main() -> framegraph::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(&path).with_context(|| format!("Loading {}", path))?,
        None => EngineConfig::load_or_default(),
    };

    let _log_guard = logging::init(&config.logging)?;
    tracing::info!("Starting framegraph demo");

    let (bridge, handle) = FrameDriver::spawn(Pipeline::builder(), &config.pipeline)?;
    if !bridge.apply_nodetree(demo_tree()) {
        return Err(Error::Config("Frame driver exited before start".to_string()));
    }

    let mut frames = 0;
    while frames < DEMO_FRAMES {
        let Some(msg) = bridge.recv_timeout(Duration::from_secs(1)) else {
            tracing::warn!("No message from the frame driver for 1s");
            break;
        };
        match msg {
            SinkMessage::Published { endpoint, value } => {
                tracing::info!("{} = {:?}", endpoint, value);
            }
            SinkMessage::FrameComplete(summary) => {
                tracing::debug!(
                    "Frame {} evaluated {} nodes in {:?}",
                    summary.frame,
                    summary.nodes_evaluated,
                    summary.elapsed
                );
                frames += 1;
            }
            SinkMessage::FrameAborted { frame, error } => {
                tracing::error!("Frame {} aborted: {}", frame, error);
                frames += 1;
            }
            SinkMessage::EditError(e) => tracing::error!("Edit rejected: {}", e),
            SinkMessage::Shutdown => break,
            _ => {}
        }
    }

    tracing::info!("Shutting down...");
    bridge.shutdown();
    if handle.join().is_err() {
        tracing::error!("Frame driver thread panicked");
    }
    Ok(())
}
