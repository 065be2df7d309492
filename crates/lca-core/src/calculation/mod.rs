mod density;
mod impact;

pub use density::{DensityOverrides, DensitySource, ResolvedDensity, resolve_density};
pub use impact::{
    ElementImpact, InstanceImpact, InstanceStatus, compute_element_impact, compute_instance_impact,
};
