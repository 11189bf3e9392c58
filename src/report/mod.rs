//! Report module - ranking, rendering and exporting results

pub mod export;
pub mod importance;

pub use export::*;
pub use importance::*;
