// Domain layer: run model and ports (interfaces). No process or filesystem access here.

pub mod model;
pub mod ports;
