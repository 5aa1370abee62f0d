//! # framegraph: frame-driven node graph engine
//!
//! Computation units (image filters, detectors, publishers, ...) are wired into
//! a directed acyclic graph and evaluated once per frame. Evaluation is
//! demand-driven: only nodes that feed a side-effecting node run, and each
//! runs at most once per frame no matter how many consumers it has.
//!
//! ## Architecture
//!
//! - **Pipeline**: owns the node graph, the unit registry and the endpoint
//!   registry; `run()` evaluates one frame
//! - **Units**: pluggable computation kinds registered under `"package/name"`
//! - **Driver**: runs frames on a dedicated thread and applies graph edits
//!   between frames
//! - **Communication**: Crossbeam channels for commands and results
//!
//! ## Configuration
//!
//! Engine settings are read from `config.toml` under `dev.framegraph` in the
//! platform config directory. See [`config`].
//!
//! ## Example
//!
//! ```no_run
//! use framegraph::pipeline::{NodeId, NodeSpec, NodeTree, Pipeline, UnitSettings};
//!
//! let source = NodeId::new_v4();
//! let publish = NodeId::new_v4();
//! let tree = NodeTree::new(vec![
//!     NodeSpec::new(source, "core/Constant")
//!         .with_settings(UnitSettings::new().with("value", 5i64)),
//!     NodeSpec::new(publish, "core/Publish")
//!         .with_settings(UnitSettings::new().with("name", "five"))
//!         .with_input("value", source, "value"),
//! ]);
//!
//! let mut pipeline = Pipeline::builder().build();
//! pipeline.import_nodetree(&tree)?;
//! pipeline.run()?;
//! assert!(pipeline.graph().endpoints().latest("five").is_some());
//! # Ok::<(), framegraph::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;

// Re-export commonly used types
pub use config::{EngineConfig, FaultPolicy, LoggingConfig, PipelineSettings};
pub use error::{Error, Result, ResultExt};
pub use pipeline::{
    FrameDriver, FrameReport, NodeId, Pipeline, PipelineBuilder, PipelineError, UnitRegistry,
};
