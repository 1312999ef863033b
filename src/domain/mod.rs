// Domain layer: report models and ports (interfaces). No external dependencies beyond serde.

pub mod model;
pub mod ports;
