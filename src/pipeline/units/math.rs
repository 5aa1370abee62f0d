//! Arithmetic units.
//!
//! Null inputs propagate as null outputs, so a half-wired graph evaluates
//! without faulting. Non-numeric inputs are computation faults.

use crate::pipeline::port::{PortDescriptor, PortKind};
use crate::pipeline::settings::UnitSettings;
use crate::pipeline::unit::{Unit, UnitResult, UnitType};
use crate::pipeline::value::{Record, Value};
use anyhow::{anyhow, bail};

static SCALE_INPUTS: &[PortDescriptor] = &[PortDescriptor::new("value", PortKind::Number)];
static SCALE_OUTPUTS: &[PortDescriptor] = &[PortDescriptor::new("value", PortKind::Number)];

static SUM_INPUTS: &[PortDescriptor] = &[
    PortDescriptor::new("a", PortKind::Number),
    PortDescriptor::new("b", PortKind::Number),
];
static SUM_OUTPUTS: &[PortDescriptor] = &[PortDescriptor::new("sum", PortKind::Number)];

/// Read a numeric input. `Ok(None)` for null.
fn number(inputs: &Record, slot: &str) -> UnitResult<Option<f64>> {
    match inputs.get(slot) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_float()
            .map(Some)
            .ok_or_else(|| anyhow!("input '{}' is not a number: {:?}", slot, v)),
    }
}

/// Multiplies `value` by the `factor` setting (default 1).
pub struct ScaleType;

impl UnitType for ScaleType {
    fn name(&self) -> &str {
        "Scale"
    }

    fn inputs(&self) -> &[PortDescriptor] {
        SCALE_INPUTS
    }

    fn outputs(&self) -> &[PortDescriptor] {
        SCALE_OUTPUTS
    }

    fn validate_settings(&self, settings: UnitSettings) -> UnitResult<UnitSettings> {
        match settings.get("factor") {
            None => Ok(settings),
            Some(v) if v.as_float().is_some() => Ok(settings),
            Some(v) => bail!("factor must be a number, got {:?}", v),
        }
    }

    fn instantiate(&self, settings: &UnitSettings) -> UnitResult<Box<dyn Unit>> {
        Ok(Box::new(Scale {
            factor: settings.float("factor").unwrap_or(1.0),
        }))
    }
}

pub struct Scale {
    factor: f64,
}

impl Unit for Scale {
    fn run(&mut self, inputs: &Record) -> UnitResult<Record> {
        let value = match number(inputs, "value")? {
            Some(v) => Value::Float(v * self.factor),
            None => Value::Null,
        };
        Ok(Record::new().with("value", value))
    }
}

/// Adds inputs `a` and `b`.
pub struct SumType;

impl UnitType for SumType {
    fn name(&self) -> &str {
        "Sum"
    }

    fn inputs(&self) -> &[PortDescriptor] {
        SUM_INPUTS
    }

    fn outputs(&self) -> &[PortDescriptor] {
        SUM_OUTPUTS
    }

    fn instantiate(&self, _settings: &UnitSettings) -> UnitResult<Box<dyn Unit>> {
        Ok(Box::new(Sum))
    }
}

pub struct Sum;

impl Unit for Sum {
    fn run(&mut self, inputs: &Record) -> UnitResult<Record> {
        let sum = match (number(inputs, "a")?, number(inputs, "b")?) {
            (Some(a), Some(b)) => Value::Float(a + b),
            _ => Value::Null,
        };
        Ok(Record::new().with("sum", sum))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale() {
        let settings = ScaleType
            .validate_settings(UnitSettings::new().with("factor", 3i64))
            .unwrap();
        let mut unit = ScaleType.instantiate(&settings).unwrap();

        let out = unit.run(&Record::new().with("value", 5i64)).unwrap();
        assert_eq!(out.get("value"), Some(&Value::Float(15.0)));

        let out = unit.run(&Record::new().with("value", Value::Null)).unwrap();
        assert_eq!(out.get("value"), Some(&Value::Null));

        assert!(unit.run(&Record::new().with("value", "five")).is_err());
    }

    #[test]
    fn test_scale_rejects_non_numeric_factor() {
        assert!(ScaleType
            .validate_settings(UnitSettings::new().with("factor", "x"))
            .is_err());
    }

    #[test]
    fn test_sum() {
        let mut unit = SumType.instantiate(&UnitSettings::new()).unwrap();
        let out = unit
            .run(&Record::new().with("a", 10.0).with("b", 15.0))
            .unwrap();
        assert_eq!(out.get("sum"), Some(&Value::Float(25.0)));

        let out = unit
            .run(&Record::new().with("a", 1.0).with("b", Value::Null))
            .unwrap();
        assert_eq!(out.get("sum"), Some(&Value::Null));
    }
}
