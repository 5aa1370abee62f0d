//! A node: one computation-unit instance plus its wiring and per-frame cache.
//!
//! The unit instance is created lazily on the first run after creation (or
//! after disposal) and destroyed only by [`Node::dispose`]. Input wiring is a
//! list with exactly one link per slot the unit type declares; an unwired slot
//! holds a null constant.

use crate::pipeline::endpoint::EndpointRegistry;
use crate::pipeline::error::{PipelineError, PipelineResult, WiringError};
use crate::pipeline::id::NodeId;
use crate::pipeline::link::Link;
use crate::pipeline::settings::UnitSettings;
use crate::pipeline::unit::{Unit, UnitContext, UnitType};
use crate::pipeline::value::{Record, Value};
use std::fmt;
use std::sync::Arc;

/// Memoization state for the current frame.
#[derive(Debug, Clone, Default)]
pub enum FrameState {
    /// Not evaluated yet this frame.
    #[default]
    Fresh,
    /// Evaluated; every later request this frame gets the same record.
    Done(Arc<Record>),
    /// The unit failed this frame and will not be retried until the next one.
    Faulted,
}

/// One input slot and its current link.
#[derive(Debug, Clone)]
pub struct InputSlot {
    pub name: &'static str,
    pub link: Link,
}

pub struct Node {
    id: NodeId,
    type_name: String,
    kind: Arc<dyn UnitType>,
    unit: Option<Box<dyn Unit>>,
    settings: UnitSettings,
    inputs: Vec<InputSlot>,
    state: FrameState,
    evaluations: u64,
}

impl Node {
    pub fn new(kind: Arc<dyn UnitType>, type_name: impl Into<String>, id: NodeId) -> Self {
        let mut node = Self {
            id,
            type_name: type_name.into(),
            kind,
            unit: None,
            settings: UnitSettings::default(),
            inputs: Vec::new(),
            state: FrameState::Fresh,
            evaluations: 0,
        };
        node.reset_io();
        node
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Fully qualified type name, e.g. `"core/Scale"`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> &Arc<dyn UnitType> {
        &self.kind
    }

    pub fn has_side_effect(&self) -> bool {
        self.kind.has_side_effect()
    }

    pub fn settings(&self) -> &UnitSettings {
        &self.settings
    }

    /// Whether a live unit instance exists.
    pub fn is_initialized(&self) -> bool {
        self.unit.is_some()
    }

    pub fn state(&self) -> &FrameState {
        &self.state
    }

    pub fn has_run(&self) -> bool {
        matches!(self.state, FrameState::Done(_))
    }

    /// This frame's result, if the node has run.
    pub fn cached(&self) -> Option<Arc<Record>> {
        match &self.state {
            FrameState::Done(results) => Some(results.clone()),
            _ => None,
        }
    }

    /// Total number of unit `run` calls over the node's lifetime.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    pub fn inputs(&self) -> &[InputSlot] {
        &self.inputs
    }

    pub fn link(&self, slot: &str) -> Option<&Link> {
        self.inputs.iter().find(|s| s.name == slot).map(|s| &s.link)
    }

    /// Forget the previous frame's result.
    pub fn next_frame(&mut self) {
        self.state = FrameState::Fresh;
    }

    /// Replace every input link with a null constant.
    pub fn reset_io(&mut self) {
        self.inputs = self
            .kind
            .inputs()
            .iter()
            .map(|port| InputSlot {
                name: port.name,
                link: Link::null(),
            })
            .collect();
    }

    /// Install `link` on a declared slot.
    pub fn set_link(&mut self, slot: &str, link: Link) -> PipelineResult<()> {
        let id = self.id;
        let entry = self
            .inputs
            .iter_mut()
            .find(|s| s.name == slot)
            .ok_or_else(|| WiringError::UnknownSlot {
                node_id: id,
                slot: slot.to_string(),
            })?;
        entry.link = link;
        Ok(())
    }

    pub fn set_static(&mut self, slot: &str, value: impl Into<Value>) -> PipelineResult<()> {
        self.set_link(slot, Link::Static(value.into()))
    }

    pub fn set_statics<I, K>(&mut self, values: I) -> PipelineResult<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        for (slot, value) in values {
            self.set_static(slot.as_ref(), value)?;
        }
        Ok(())
    }

    /// Store already-validated settings. Returns whether they changed.
    ///
    /// Takes effect on the next instantiation; callers that want a live
    /// instance rebuilt must dispose it.
    pub(crate) fn replace_settings(&mut self, settings: UnitSettings) -> bool {
        if self.settings.same_as(&settings) {
            return false;
        }
        self.settings = settings;
        true
    }

    /// Build and start the unit instance if there is none.
    pub fn ensure_init(&mut self, endpoints: &mut EndpointRegistry) -> PipelineResult<()> {
        if self.unit.is_some() {
            return Ok(());
        }

        let id = self.id;
        let mut unit = self
            .kind
            .instantiate(&self.settings)
            .map_err(|source| PipelineError::Init { node_id: id, source })?;

        let mut ctx = UnitContext {
            node_id: id,
            endpoints,
        };
        unit.on_start(&mut ctx)
            .map_err(|source| PipelineError::Init { node_id: id, source })?;

        tracing::debug!("Started node {} ({})", id, self.type_name);
        self.unit = Some(unit);
        Ok(())
    }

    /// Dispose the unit instance, returning the node to the pre-init state.
    pub fn dispose(&mut self, endpoints: &mut EndpointRegistry) {
        if let Some(mut unit) = self.unit.take() {
            let mut ctx = UnitContext {
                node_id: self.id,
                endpoints,
            };
            unit.dispose(&mut ctx);
            tracing::debug!("Disposed node {} ({})", self.id, self.type_name);
        }
    }

    /// Run the unit on fully resolved inputs and memoize the result.
    ///
    /// Assumes `ensure_init` succeeded. Failures mark the node faulted for the
    /// rest of the frame.
    pub(crate) fn run_unit(&mut self, inputs: &Record) -> PipelineResult<Arc<Record>> {
        let id = self.id;
        let unit = match self.unit.as_mut() {
            Some(unit) => unit,
            None => {
                self.state = FrameState::Faulted;
                return Err(PipelineError::Init {
                    node_id: id,
                    source: anyhow::anyhow!("unit instance missing"),
                });
            }
        };

        self.evaluations += 1;
        match unit.run(inputs) {
            Ok(outputs) => {
                let results = Arc::new(outputs);
                self.state = FrameState::Done(results.clone());
                Ok(results)
            }
            Err(source) => {
                self.state = FrameState::Faulted;
                Err(PipelineError::Compute { node_id: id, source })
            }
        }
    }

    pub(crate) fn mark_faulted(&mut self) {
        self.state = FrameState::Faulted;
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("initialized", &self.unit.is_some())
            .field("state", &self.state)
            .finish()
    }
}
