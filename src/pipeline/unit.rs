//! Computation-unit abstraction.
//!
//! Two-layer design:
//! - **`UnitType`**: one shared descriptor per computation kind. Declares the
//!   slot schema, the side-effect flag and settings validation, and builds
//!   instances.
//! - **`Unit`**: one live instance per node, created lazily from the node's
//!   current settings and owned exclusively by that node.

use crate::pipeline::endpoint::EndpointRegistry;
use crate::pipeline::id::NodeId;
use crate::pipeline::port::PortDescriptor;
use crate::pipeline::settings::UnitSettings;
use crate::pipeline::value::Record;

/// Result type for unit-level code. Units report failures as `anyhow::Error`;
/// the node wraps them with its id.
pub type UnitResult<T> = anyhow::Result<T>;

/// Context passed to unit lifecycle hooks.
pub struct UnitContext<'a> {
    /// The node that owns the instance.
    pub node_id: NodeId,
    /// Pipeline-owned registry side-effecting units announce themselves in.
    pub endpoints: &'a mut EndpointRegistry,
}

/// A live computation-unit instance.
pub trait Unit: Send {
    /// Called once after construction, right before the first `run`.
    /// Acquire expensive resources (device handles etc.) here.
    fn on_start(&mut self, _ctx: &mut UnitContext<'_>) -> UnitResult<()> {
        Ok(())
    }

    /// The computation step. `inputs` holds exactly one field per declared
    /// input slot.
    fn run(&mut self, inputs: &Record) -> UnitResult<Record>;

    /// Release whatever `on_start` or construction acquired.
    fn dispose(&mut self, _ctx: &mut UnitContext<'_>) {}
}

/// Descriptor of a computation kind.
pub trait UnitType: Send + Sync {
    /// Short name, unique within its module (e.g. `"Blur"`).
    fn name(&self) -> &str;

    fn inputs(&self) -> &[PortDescriptor];

    fn outputs(&self) -> &[PortDescriptor];

    /// Side-effecting units are the roots every frame walk must reach.
    fn has_side_effect(&self) -> bool {
        false
    }

    /// Disabled types are skipped at registration.
    fn disabled(&self) -> bool {
        false
    }

    /// Normalize or reject a settings record before it reaches a node.
    fn validate_settings(&self, settings: UnitSettings) -> UnitResult<UnitSettings> {
        Ok(settings)
    }

    /// Build a new instance from validated settings.
    fn instantiate(&self, settings: &UnitSettings) -> UnitResult<Box<dyn Unit>>;
}
