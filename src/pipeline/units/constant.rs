//! Constant source: emits its configured `value` every frame.

use crate::pipeline::port::{PortDescriptor, PortKind};
use crate::pipeline::settings::UnitSettings;
use crate::pipeline::unit::{Unit, UnitResult, UnitType};
use crate::pipeline::value::{Record, Value};

static OUTPUTS: &[PortDescriptor] = &[PortDescriptor::new("value", PortKind::Any)];

pub struct ConstantType;

impl UnitType for ConstantType {
    fn name(&self) -> &str {
        "Constant"
    }

    fn inputs(&self) -> &[PortDescriptor] {
        &[]
    }

    fn outputs(&self) -> &[PortDescriptor] {
        OUTPUTS
    }

    fn instantiate(&self, settings: &UnitSettings) -> UnitResult<Box<dyn Unit>> {
        let value = settings.get("value").cloned().unwrap_or_default();
        Ok(Box::new(Constant::new(value)))
    }
}

pub struct Constant {
    value: Value,
}

impl Constant {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl Unit for Constant {
    fn run(&mut self, _inputs: &Record) -> UnitResult<Record> {
        Ok(Record::new().with("value", self.value.clone()))
    }
}
