//! Probe units and mocks
//!
//! Probe units count how often the engine starts, runs and disposes them, so
//! tests can assert on evaluation behaviour without inspecting internals.

use framegraph::pipeline::{
    ModuleHook, NodeGraph, PortDescriptor, PortKind, Record, Unit, UnitContext, UnitResult,
    UnitSettings, UnitType, Value,
};
use mockall::mock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

static NO_PORTS: &[PortDescriptor] = &[];
static VALUE_PORT: &[PortDescriptor] = &[PortDescriptor::new("value", PortKind::Any)];
static JOIN_INPUTS: &[PortDescriptor] = &[
    PortDescriptor::new("a", PortKind::Any),
    PortDescriptor::new("b", PortKind::Any),
];
static SINK_INPUTS: &[PortDescriptor] = &[
    PortDescriptor::new("value", PortKind::Any),
    PortDescriptor::new("aux", PortKind::Any),
];

/// Lifecycle counters shared between a probe type and every instance it built.
#[derive(Debug, Default)]
pub struct ProbeCounters {
    pub runs: AtomicUsize,
    pub starts: AtomicUsize,
    pub disposes: AtomicUsize,
    /// When set, `run` fails.
    pub fail: AtomicBool,
    /// Every `value` input a sink probe received.
    pub seen: Mutex<Vec<Value>>,
}

impl ProbeCounters {
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn disposes(&self) -> usize {
        self.disposes.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn seen(&self) -> Vec<Value> {
        self.seen.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeRole {
    /// No inputs; outputs `value` = number of runs so far.
    Source,
    /// `value` in, `value` out.
    Relay,
    /// `a` and `b` in, `value` = `[a, b]` out.
    Join,
    /// Side-effecting; records `value`, ignores `aux`.
    Sink,
}

pub struct ProbeType {
    role: ProbeRole,
    counters: Arc<ProbeCounters>,
}

impl ProbeType {
    pub fn new(role: ProbeRole) -> (Arc<Self>, Arc<ProbeCounters>) {
        let counters = Arc::new(ProbeCounters::default());
        let kind = Arc::new(Self {
            role,
            counters: counters.clone(),
        });
        (kind, counters)
    }
}

impl UnitType for ProbeType {
    fn name(&self) -> &str {
        match self.role {
            ProbeRole::Source => "ProbeSource",
            ProbeRole::Relay => "ProbeRelay",
            ProbeRole::Join => "ProbeJoin",
            ProbeRole::Sink => "ProbeSink",
        }
    }

    fn inputs(&self) -> &[PortDescriptor] {
        match self.role {
            ProbeRole::Source => NO_PORTS,
            ProbeRole::Relay => VALUE_PORT,
            ProbeRole::Join => JOIN_INPUTS,
            ProbeRole::Sink => SINK_INPUTS,
        }
    }

    fn outputs(&self) -> &[PortDescriptor] {
        match self.role {
            ProbeRole::Sink => NO_PORTS,
            _ => VALUE_PORT,
        }
    }

    fn has_side_effect(&self) -> bool {
        self.role == ProbeRole::Sink
    }

    fn instantiate(&self, _settings: &UnitSettings) -> UnitResult<Box<dyn Unit>> {
        Ok(Box::new(Probe {
            role: self.role,
            counters: self.counters.clone(),
        }))
    }
}

struct Probe {
    role: ProbeRole,
    counters: Arc<ProbeCounters>,
}

impl Unit for Probe {
    fn on_start(&mut self, _ctx: &mut UnitContext<'_>) -> UnitResult<()> {
        self.counters.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn run(&mut self, inputs: &Record) -> UnitResult<Record> {
        let runs = self.counters.runs.fetch_add(1, Ordering::SeqCst) + 1;
        if self.counters.fail.load(Ordering::SeqCst) {
            anyhow::bail!("probe told to fail");
        }

        let input = |name: &str| inputs.get(name).cloned().unwrap_or_default();
        let out = match self.role {
            ProbeRole::Source => Record::new().with("value", runs as i64),
            ProbeRole::Relay => Record::new().with("value", input("value")),
            ProbeRole::Join => {
                Record::new().with("value", Value::List(vec![input("a"), input("b")]))
            }
            ProbeRole::Sink => {
                if let Ok(mut seen) = self.counters.seen.lock() {
                    seen.push(input("value"));
                }
                Record::new()
            }
        };
        Ok(out)
    }

    fn dispose(&mut self, _ctx: &mut UnitContext<'_>) {
        self.counters.disposes.fetch_add(1, Ordering::SeqCst);
    }
}

mock! {
    pub Hook {}

    impl ModuleHook for Hook {
        fn startup(&mut self);
        fn pipeline_update(&mut self, graph: &NodeGraph);
        fn shutdown(&mut self);
    }
}
