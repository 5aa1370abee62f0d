//! Publish sink: hands its input to a named endpoint every frame.
//!
//! This is the side-effecting root of most pipelines. The endpoint is claimed
//! lazily in `on_start` and released in `dispose`, so an unused publish node
//! holds no name.

use crate::pipeline::endpoint::Endpoint;
use crate::pipeline::port::{PortDescriptor, PortKind};
use crate::pipeline::settings::UnitSettings;
use crate::pipeline::unit::{Unit, UnitContext, UnitResult, UnitType};
use crate::pipeline::value::{Record, Value};
use anyhow::{anyhow, bail};

static INPUTS: &[PortDescriptor] = &[PortDescriptor::new("value", PortKind::Any)];

pub const DEFAULT_ENDPOINT: &str = "output";

pub struct PublishType;

impl UnitType for PublishType {
    fn name(&self) -> &str {
        "Publish"
    }

    fn inputs(&self) -> &[PortDescriptor] {
        INPUTS
    }

    fn outputs(&self) -> &[PortDescriptor] {
        &[]
    }

    fn has_side_effect(&self) -> bool {
        true
    }

    /// Trims the endpoint name; empty names are rejected.
    fn validate_settings(&self, mut settings: UnitSettings) -> UnitResult<UnitSettings> {
        let name = match settings.get("name") {
            None => DEFAULT_ENDPOINT.to_string(),
            Some(Value::Text(name)) => name.trim().to_string(),
            Some(other) => bail!("name must be text, got {:?}", other),
        };
        if name.is_empty() {
            bail!("endpoint name must not be empty");
        }
        settings.set("name", name);
        Ok(settings)
    }

    fn instantiate(&self, settings: &UnitSettings) -> UnitResult<Box<dyn Unit>> {
        let name = settings.text("name").unwrap_or(DEFAULT_ENDPOINT);
        Ok(Box::new(Publish::new(name)))
    }
}

pub struct Publish {
    requested: String,
    endpoint: Option<Endpoint>,
}

impl Publish {
    pub fn new(requested: impl Into<String>) -> Self {
        Self {
            requested: requested.into(),
            endpoint: None,
        }
    }

    /// Name actually claimed (may carry a de-duplication suffix).
    pub fn endpoint_name(&self) -> Option<&str> {
        self.endpoint.as_ref().map(Endpoint::name)
    }
}

impl Unit for Publish {
    fn on_start(&mut self, ctx: &mut UnitContext<'_>) -> UnitResult<()> {
        self.endpoint = Some(ctx.endpoints.claim(&self.requested, ctx.node_id));
        Ok(())
    }

    fn run(&mut self, inputs: &Record) -> UnitResult<Record> {
        let endpoint = self
            .endpoint
            .as_ref()
            .ok_or_else(|| anyhow!("publish unit was not started"))?;
        let value = inputs.get("value").cloned().unwrap_or_default();
        endpoint.publish(value);
        Ok(Record::new())
    }

    fn dispose(&mut self, ctx: &mut UnitContext<'_>) {
        if let Some(endpoint) = self.endpoint.take() {
            ctx.endpoints.release(endpoint.name(), ctx.node_id);
        }
    }
}
