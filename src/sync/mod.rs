//! Synchronous configuration and firing.
//!
//! Everything here runs inline on the caller's thread with no
//! suspension. For asynchronous actions see [`crate::awaitable`].

mod config;
mod machine;

pub use config::{MachineConfig, StateConfigurator};
pub use machine::Machine;
