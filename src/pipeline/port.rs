//! Port descriptors for the unit system.
//!
//! Each unit type declares its input and output slots via static
//! `PortDescriptor` arrays. The node uses the input list as the exact key set
//! of its wiring, and the graph checks connection targets against the outputs.

use serde::Serialize;

/// The kind of value a port carries. Informational only: the engine does not
/// type-check values, editors use it to filter compatible connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PortKind {
    Any,
    Bool,
    Number,
    Text,
    List,
    /// An external value type such as an image.
    Opaque,
}

/// Static descriptor for a unit's slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortDescriptor {
    pub name: &'static str,
    pub kind: PortKind,
}

impl PortDescriptor {
    pub const fn new(name: &'static str, kind: PortKind) -> Self {
        Self { name, kind }
    }
}

/// Find a port by name.
pub fn find_port<'a>(ports: &'a [PortDescriptor], name: &str) -> Option<&'a PortDescriptor> {
    ports.iter().find(|p| p.name == name)
}
