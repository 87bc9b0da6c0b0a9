// Domain layer: models and ports (interfaces). No pipeline logic here.

pub mod model;
pub mod ports;
