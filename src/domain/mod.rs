// Domain layer: canonical records and the ports the workflows talk through.

pub mod model;
pub mod ports;
