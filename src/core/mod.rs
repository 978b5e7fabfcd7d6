//! Core state machine types.
//!
//! This module contains the domain vocabulary shared by every firing
//! mode:
//! - State and trigger definitions via the `State` and `Trigger` traits
//! - Typed trigger parameter handles
//! - Transition context passed to actions
//! - Immutable transition log

mod context;
mod history;
mod macros;
mod param;
mod state;

pub use context::TransitionContext;
pub use history::{TransitionLog, TransitionRecord};
pub use param::ParameterizedTrigger;
pub use state::{State, Trigger};

pub(crate) use param::{check_parameter, downcast_param, BoxedParameter, ParameterSpec};
