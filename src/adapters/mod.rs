// Adapters layer: concrete implementations of the domain ports (terminal, external programs).

pub mod launcher;
pub mod terminal;
