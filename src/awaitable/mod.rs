//! Asynchronous configuration and firing.
//!
//! Two machines share the [`AwaitableConfig`] surface:
//!
//! - [`AsyncMachine`] awaits callbacks inline and requires exclusive
//!   access per fire;
//! - [`QueuedMachine`] serializes concurrent fires through a FIFO
//!   dispatch queue and hands back a [`FireHandle`] per request.

mod config;
mod machine;
mod queued;

pub use config::{AwaitableConfig, AwaitableStateConfigurator};
pub use machine::AsyncMachine;
pub use queued::{FireHandle, QueuedMachine};
