// Domain layer: core models and ports (interfaces). No I/O here.

pub mod encounter;
pub mod loot;
pub mod ports;
pub mod reference;
