//! Fluxion - an embeddable finite-state-machine runtime.
//!
//! A machine is a transition table keyed by `(state, trigger)` plus the
//! state it currently occupies. Tables are built with fluent
//! configurators, then frozen by handing them to a machine. Three
//! firing modes cover the usual deployment shapes:
//!
//! - [`Machine`] runs every callback inline on the caller's thread;
//! - [`AsyncMachine`] awaits callbacks, one fire at a time;
//! - [`QueuedMachine`] accepts fires from any number of tasks and
//!   serializes them through a FIFO dispatch queue.
//!
//! # Example
//!
//! ```
//! use fluxion::{Machine, MachineConfig, State, Trigger};
//! use serde::Serialize;
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
//! enum Phone {
//!     Off,
//!     Ringing,
//! }
//!
//! impl State for Phone {
//!     fn name(&self) -> &str {
//!         match self {
//!             Self::Off => "Off",
//!             Self::Ringing => "Ringing",
//!         }
//!     }
//! }
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
//! enum Call {
//!     Ring,
//! }
//!
//! impl Trigger for Call {
//!     fn name(&self) -> &str {
//!         "Ring"
//!     }
//! }
//!
//! let mut config = MachineConfig::new();
//! config
//!     .for_state(Phone::Off)
//!     .permit(Call::Ring, Phone::Ringing)
//!     .unwrap();
//!
//! let mut machine = Machine::new(Phone::Off, config);
//! machine.fire(Call::Ring).unwrap();
//! assert_eq!(machine.current_state(), &Phone::Ringing);
//! ```

pub mod awaitable;
pub mod core;
pub mod error;
pub mod sync;

pub use crate::awaitable::{
    AsyncMachine, AwaitableConfig, AwaitableStateConfigurator, FireHandle, QueuedMachine,
};
pub use crate::core::{
    ParameterizedTrigger, State, Trigger, TransitionContext, TransitionLog, TransitionRecord,
};
pub use crate::error::{ActionResult, BoxError, ConfigError, FireError};
pub use crate::sync::{Machine, MachineConfig, StateConfigurator};
