//! Synchronous state machine.

use chrono::Utc;
use tracing::debug;

use crate::core::{
    check_parameter, BoxedParameter, ParameterizedTrigger, State, Trigger, TransitionContext,
    TransitionLog, TransitionRecord,
};
use crate::error::FireError;
use crate::sync::config::{Destination, MachineConfig};

/// State machine driven by synchronous firing.
///
/// Holds the current state and a finalized transition table. Firing a
/// trigger executes the full transition inline on the caller's thread:
/// exit action of the source state, then the state mutation, then the
/// transition action, then the entry action of the destination.
///
/// Creating a machine consumes the configuration, so the table cannot
/// be mutated afterwards. Clone the config first if several machines
/// share one blueprint.
pub struct Machine<S: State, T: Trigger> {
    config: MachineConfig<S, T>,
    current: S,
    log: TransitionLog<S, T>,
}

impl<S: State, T: Trigger> Machine<S, T> {
    /// Create a machine bound to `initial` and a finalized table.
    pub fn new(initial: S, config: MachineConfig<S, T>) -> Self {
        Self {
            config,
            current: initial,
            log: TransitionLog::new(),
        }
    }

    /// The state the machine currently occupies.
    pub fn current_state(&self) -> &S {
        &self.current
    }

    /// Log of completed transitions.
    pub fn log(&self) -> &TransitionLog<S, T> {
        &self.log
    }

    /// Fire a bare trigger.
    ///
    /// Fails with [`FireError::InvalidTransition`] when no transition is
    /// configured for the current state, and with
    /// [`FireError::ParameterTypeMismatch`] when `trigger` has been
    /// registered as parameterized (use [`fire_with`](Machine::fire_with)).
    pub fn fire(&mut self, trigger: T) -> Result<(), FireError> {
        self.fire_erased(trigger, None)
    }

    /// Fire a parameterized trigger with its typed argument.
    pub fn fire_with<A>(
        &mut self,
        handle: &ParameterizedTrigger<T, A>,
        value: A,
    ) -> Result<(), FireError>
    where
        A: Clone + Send + Sync + 'static,
    {
        self.fire_erased(handle.trigger().clone(), Some(Box::new(value)))
    }

    pub(crate) fn fire_erased(
        &mut self,
        trigger: T,
        parameter: Option<BoxedParameter>,
    ) -> Result<(), FireError> {
        let state_config = self
            .config
            .state_configuration(&self.current)
            .ok_or_else(|| invalid_transition(&self.current, &trigger))?;
        let transition = state_config
            .transitions
            .get(&trigger)
            .ok_or_else(|| invalid_transition(&self.current, &trigger))?;

        check_parameter(
            self.config.parameter_spec(&trigger),
            parameter.as_ref(),
            &trigger,
        )?;
        let param = parameter.as_deref();

        let destination = match &transition.destination {
            Destination::Static(destination) => destination.clone(),
            Destination::Reentry => self.current.clone(),
            Destination::Dynamic(resolver) => {
                resolver(&self.current, param).map_err(FireError::Action)?
            }
        };

        debug!(
            from = %self.current.name(),
            to = %destination.name(),
            trigger = %trigger.name(),
            "firing transition"
        );

        // Exit runs before the mutation, so a failure here leaves the
        // source state in place.
        if let Some(exit) = &state_config.exit {
            exit(&self.current).map_err(FireError::Action)?;
        }

        let source = std::mem::replace(&mut self.current, destination.clone());
        self.log = self.log.record(TransitionRecord {
            from: source.clone(),
            to: destination.clone(),
            trigger: trigger.clone(),
            fired_at: Utc::now(),
        });

        let context = TransitionContext {
            source,
            destination,
        };
        if let Some(action) = &transition.action {
            action(&context, param).map_err(FireError::Action)?;
        }
        if let Some(entered) = self.config.state_configuration(&self.current) {
            if let Some(entry) = &entered.entry {
                entry(&self.current).map_err(FireError::Action)?;
            }
        }

        Ok(())
    }
}

fn invalid_transition<S: State, T: Trigger>(state: &S, trigger: &T) -> FireError {
    FireError::InvalidTransition {
        state: state.name().to_string(),
        trigger: trigger.name().to_string(),
    }
}
