//! Longbox application library
//!
//! Holds the comic-book inventory module and the wiring that turns settings
//! into a running service.

pub mod bootstrap;
pub mod modules;

/// Re-export commonly used types
pub use modules::*;
