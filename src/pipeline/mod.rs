//! Frame-driven node graph.
//!
//! Computation units are wired into a directed acyclic graph. Each frame the
//! pipeline pulls every side-effecting (entry) node; those pull their inputs
//! recursively, so only nodes that feed an entry node ever run, and each runs
//! at most once per frame.
//!
//! # Architecture
//!
//! ```text
//! [Constant] ──► [Scale] ──► [Sum] ──► [Publish]   (entry)
//!            └─► [Scale] ──┘
//! [Constant] ──► [Scale]                           (never runs: no entry downstream)
//! ```
//!
//! # Design
//!
//! - **Arena of nodes**: [`NodeGraph`] owns every node; links hold ids only.
//! - **Per-frame memoization**: [`FrameState`] caches one result per node.
//! - **Lazy units**: instances are built on first use and disposed on prune.
//! - **Pipeline-owned endpoints**: [`EndpointRegistry`] replaces any global
//!   side-effect registry.
//! - **Dedicated thread**: [`FrameDriver`] serializes edits against frames and
//!   talks to the embedding application over [`PipelineBridge`].

pub mod bridge;
pub mod driver;
pub mod edit;
pub mod endpoint;
pub mod error;
pub mod executor;
pub mod graph;
pub mod id;
pub mod link;
pub mod node;
pub mod port;
pub mod registry;
pub mod settings;
pub mod unit;
pub mod units;
pub mod value;
pub mod walk;

pub use bridge::{FrameSummary, PipelineBridge, PipelineCommand, SinkMessage};
pub use driver::{DriverHandle, FrameDriver};
pub use edit::{ImportSummary, NodeSpec, NodeTree};
pub use endpoint::{Endpoint, EndpointRegistry};
pub use error::{PipelineError, PipelineResult, WiringError};
pub use executor::{FrameReport, Pipeline, PipelineBuilder};
pub use graph::{NodeGraph, NodeSnapshot, SlotSnapshot, TopologySnapshot};
pub use id::NodeId;
pub use link::{Connection, ConnectionRule, Link, LinkRule, Links};
pub use node::{FrameState, InputSlot, Node};
pub use port::{PortDescriptor, PortKind};
pub use registry::{ModuleEntry, ModuleHook, ModuleInfo, UnitRegistry};
pub use settings::UnitSettings;
pub use unit::{Unit, UnitContext, UnitResult, UnitType};
pub use value::{OpaqueValue, Record, Value};
pub use walk::{EntryFault, EntryWalk, FrameWalk, IsolatingWalk, WalkReport};
