// Domain layer: page-independent models and the ports controllers talk through.

pub mod model;
pub mod ports;
