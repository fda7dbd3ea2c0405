// Domain layer: book models, key/command vocabulary and the ports the viewer talks through.

pub mod keys;
pub mod model;
pub mod ports;
