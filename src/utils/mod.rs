//! Utility modules for terminal output and number formatting

pub mod format;
pub mod progress;
pub mod styling;

pub use format::*;
pub use progress::*;
pub use styling::*;
