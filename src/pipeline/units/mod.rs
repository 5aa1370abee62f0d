//! Built-in computation units, registered under the `core` package.

pub mod constant;
pub mod math;
pub mod publish;

pub use constant::{Constant, ConstantType};
pub use math::{Scale, ScaleType, Sum, SumType};
pub use publish::{Publish, PublishType};

use crate::pipeline::registry::ModuleInfo;
use crate::pipeline::unit::UnitType;
use std::sync::Arc;

/// Package name of the built-in module.
pub const CORE_PACKAGE: &str = "core";

pub fn core_module() -> (ModuleInfo, Vec<Arc<dyn UnitType>>) {
    let info = ModuleInfo::new(CORE_PACKAGE, env!("CARGO_PKG_VERSION"));
    let units: Vec<Arc<dyn UnitType>> = vec![
        Arc::new(ConstantType),
        Arc::new(ScaleType),
        Arc::new(SumType),
        Arc::new(PublishType),
    ];
    (info, units)
}
