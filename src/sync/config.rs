//! Transition table and fluent configuration for synchronous machines.
//!
//! A [`MachineConfig`] maps (state, trigger) pairs to transition
//! descriptors: a tagged destination variant (static, reentry, or
//! dynamic) plus an optional action. The table is populated through
//! per-state [`StateConfigurator`] builders and becomes immutable once a
//! [`Machine`](crate::sync::Machine) consumes it.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{
    downcast_param, ParameterSpec, ParameterizedTrigger, State, Trigger, TransitionContext,
};
use crate::error::{ActionResult, BoxError, ConfigError};

/// Entry/exit action attached to a state.
pub(crate) type StateAction<S> = Arc<dyn Fn(&S) -> ActionResult + Send + Sync>;

/// Action attached to a transition, invoked with the resolved context
/// and the erased trigger parameter (if any).
pub(crate) type TransitionAction<S> =
    Arc<dyn Fn(&TransitionContext<S>, Option<&(dyn Any + Send + Sync)>) -> ActionResult + Send + Sync>;

/// Dynamic destination resolver.
pub(crate) type Resolver<S> =
    Arc<dyn Fn(&S, Option<&(dyn Any + Send + Sync)>) -> Result<S, BoxError> + Send + Sync>;

/// Destination kind of a configured transition.
#[derive(Clone)]
pub(crate) enum Destination<S> {
    /// Fixed destination, known at configuration time.
    Static(S),
    /// Destination equals the source state.
    Reentry,
    /// Destination computed at fire time.
    Dynamic(Resolver<S>),
}

/// Configured rule for one (state, trigger) pair.
#[derive(Clone)]
pub(crate) struct Transition<S: State> {
    pub(crate) destination: Destination<S>,
    pub(crate) action: Option<TransitionAction<S>>,
}

/// Per-state slice of the transition table.
#[derive(Clone)]
pub(crate) struct StateConfiguration<S: State, T> {
    pub(crate) entry: Option<StateAction<S>>,
    pub(crate) exit: Option<StateAction<S>>,
    pub(crate) transitions: HashMap<T, Transition<S>>,
}

impl<S: State, T> StateConfiguration<S, T> {
    fn new() -> Self {
        Self {
            entry: None,
            exit: None,
            transitions: HashMap::new(),
        }
    }
}

/// Transition table for synchronous machines.
///
/// # Example
///
/// ```rust
/// use fluxion::{state_enum, trigger_enum, Machine, MachineConfig};
///
/// state_enum! {
///     enum Light { Red, Green }
/// }
///
/// trigger_enum! {
///     enum Switch { Go, Stop }
/// }
///
/// let mut config = MachineConfig::new();
/// config
///     .for_state(Light::Red)
///     .permit(Switch::Go, Light::Green)?;
/// config
///     .for_state(Light::Green)
///     .permit(Switch::Stop, Light::Red)?;
///
/// let mut machine = Machine::new(Light::Red, config);
/// machine.fire(Switch::Go)?;
/// assert_eq!(machine.current_state(), &Light::Green);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct MachineConfig<S: State, T: Trigger> {
    pub(crate) states: HashMap<S, StateConfiguration<S, T>>,
    pub(crate) parameters: HashMap<T, ParameterSpec>,
}

impl<S: State, T: Trigger> Default for MachineConfig<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, T: Trigger> MachineConfig<S, T> {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            parameters: HashMap::new(),
        }
    }

    /// Get a builder scoped to `state`.
    ///
    /// Calling this again for the same state continues configuring the
    /// same entry; duplicate registrations are still rejected.
    pub fn for_state(&mut self, state: S) -> StateConfigurator<'_, S, T> {
        StateConfigurator {
            config: self,
            state,
        }
    }

    /// Register `trigger` as parameterized with type `A`, returning the
    /// typed handle used for subsequent `permit_*_param` calls and for
    /// firing.
    ///
    /// Registering the same trigger with the same type again returns an
    /// equivalent handle; a different type fails with
    /// [`ConfigError::ParameterTypeConflict`].
    pub fn set_trigger_parameter<A>(
        &mut self,
        trigger: T,
    ) -> Result<ParameterizedTrigger<T, A>, ConfigError>
    where
        A: Clone + Send + Sync + 'static,
    {
        let spec = ParameterSpec::of::<A>();
        if let Some(existing) = self.parameters.get(&trigger) {
            if *existing != spec {
                return Err(ConfigError::ParameterTypeConflict {
                    trigger: trigger.name().to_string(),
                    registered: existing.type_name,
                    requested: spec.type_name,
                });
            }
        }
        self.parameters.insert(trigger.clone(), spec);
        Ok(ParameterizedTrigger::new(trigger))
    }

    pub(crate) fn state_configuration(&self, state: &S) -> Option<&StateConfiguration<S, T>> {
        self.states.get(state)
    }

    pub(crate) fn parameter_spec(&self, trigger: &T) -> Option<&ParameterSpec> {
        self.parameters.get(trigger)
    }
}

/// Fluent builder scoped to a single state.
///
/// All registration methods consume and return the builder so calls can
/// be chained with `?`, in the usual fluent style. Each registration is
/// validated immediately: duplicate (state, trigger) pairs and duplicate
/// entry/exit actions fail with a [`ConfigError`].
pub struct StateConfigurator<'a, S: State, T: Trigger> {
    config: &'a mut MachineConfig<S, T>,
    state: S,
}

impl<'a, S: State, T: Trigger> StateConfigurator<'a, S, T> {
    /// Set the action to run when this state is entered. At most one
    /// entry action per state; re-registering is a configuration error.
    pub fn on_entry<F>(self, action: F) -> Result<Self, ConfigError>
    where
        F: Fn(&S) -> ActionResult + Send + Sync + 'static,
    {
        let slot = self
            .config
            .states
            .entry(self.state.clone())
            .or_insert_with(StateConfiguration::new);
        if slot.entry.is_some() {
            return Err(ConfigError::DuplicateEntryAction {
                state: self.state.name().to_string(),
            });
        }
        slot.entry = Some(Arc::new(action));
        Ok(self)
    }

    /// Set the action to run when this state is exited. At most one
    /// exit action per state.
    pub fn on_exit<F>(self, action: F) -> Result<Self, ConfigError>
    where
        F: Fn(&S) -> ActionResult + Send + Sync + 'static,
    {
        let slot = self
            .config
            .states
            .entry(self.state.clone())
            .or_insert_with(StateConfiguration::new);
        if slot.exit.is_some() {
            return Err(ConfigError::DuplicateExitAction {
                state: self.state.name().to_string(),
            });
        }
        slot.exit = Some(Arc::new(action));
        Ok(self)
    }

    /// Permit a static transition to `destination`.
    pub fn permit(self, trigger: T, destination: S) -> Result<Self, ConfigError> {
        self.insert(trigger, Destination::Static(destination), None)
    }

    /// Permit a static transition with an action.
    pub fn permit_with<F>(self, trigger: T, destination: S, action: F) -> Result<Self, ConfigError>
    where
        F: Fn(&TransitionContext<S>) -> ActionResult + Send + Sync + 'static,
    {
        let action: TransitionAction<S> = Arc::new(move |context, _param| action(context));
        self.insert(trigger, Destination::Static(destination), Some(action))
    }

    /// Permit a reentrant transition: destination equals this state,
    /// and exit/entry actions run again.
    pub fn permit_reentry(self, trigger: T) -> Result<Self, ConfigError> {
        self.insert(trigger, Destination::Reentry, None)
    }

    /// Permit a reentrant transition with an action.
    pub fn permit_reentry_with<F>(self, trigger: T, action: F) -> Result<Self, ConfigError>
    where
        F: Fn(&TransitionContext<S>) -> ActionResult + Send + Sync + 'static,
    {
        let action: TransitionAction<S> = Arc::new(move |context, _param| action(context));
        self.insert(trigger, Destination::Reentry, Some(action))
    }

    /// Permit a transition whose destination is computed by `resolver`
    /// at fire time.
    pub fn permit_dynamic<R>(self, trigger: T, resolver: R) -> Result<Self, ConfigError>
    where
        R: Fn(&S) -> Result<S, BoxError> + Send + Sync + 'static,
    {
        let resolver: Resolver<S> = Arc::new(move |state, _param| resolver(state));
        self.insert(trigger, Destination::Dynamic(resolver), None)
    }

    /// Permit a dynamic transition with an action.
    pub fn permit_dynamic_with<R, F>(
        self,
        trigger: T,
        resolver: R,
        action: F,
    ) -> Result<Self, ConfigError>
    where
        R: Fn(&S) -> Result<S, BoxError> + Send + Sync + 'static,
        F: Fn(&TransitionContext<S>) -> ActionResult + Send + Sync + 'static,
    {
        let resolver: Resolver<S> = Arc::new(move |state, _param| resolver(state));
        let action: TransitionAction<S> = Arc::new(move |context, _param| action(context));
        self.insert(trigger, Destination::Dynamic(resolver), Some(action))
    }

    /// Permit a static transition for a parameterized trigger; the
    /// action receives the typed parameter.
    pub fn permit_param<A, F>(
        self,
        handle: &ParameterizedTrigger<T, A>,
        destination: S,
        action: F,
    ) -> Result<Self, ConfigError>
    where
        A: Clone + Send + Sync + 'static,
        F: Fn(&TransitionContext<S>, &A) -> ActionResult + Send + Sync + 'static,
    {
        let action: TransitionAction<S> = Arc::new(move |context, param| {
            let value = downcast_param::<A>(param)?;
            action(context, value)
        });
        self.insert(
            handle.trigger().clone(),
            Destination::Static(destination),
            Some(action),
        )
    }

    /// Permit a dynamic transition for a parameterized trigger; the
    /// resolver receives the current state and the typed parameter.
    pub fn permit_dynamic_param<A, R>(
        self,
        handle: &ParameterizedTrigger<T, A>,
        resolver: R,
    ) -> Result<Self, ConfigError>
    where
        A: Clone + Send + Sync + 'static,
        R: Fn(&S, &A) -> Result<S, BoxError> + Send + Sync + 'static,
    {
        let resolver: Resolver<S> = Arc::new(move |state, param| {
            let value = downcast_param::<A>(param)?;
            resolver(state, value)
        });
        self.insert(handle.trigger().clone(), Destination::Dynamic(resolver), None)
    }

    /// Permit a dynamic parameterized transition with an action.
    pub fn permit_dynamic_param_with<A, R, F>(
        self,
        handle: &ParameterizedTrigger<T, A>,
        resolver: R,
        action: F,
    ) -> Result<Self, ConfigError>
    where
        A: Clone + Send + Sync + 'static,
        R: Fn(&S, &A) -> Result<S, BoxError> + Send + Sync + 'static,
        F: Fn(&TransitionContext<S>, &A) -> ActionResult + Send + Sync + 'static,
    {
        let resolver: Resolver<S> = Arc::new(move |state, param| {
            let value = downcast_param::<A>(param)?;
            resolver(state, value)
        });
        let action: TransitionAction<S> = Arc::new(move |context, param| {
            let value = downcast_param::<A>(param)?;
            action(context, value)
        });
        self.insert(
            handle.trigger().clone(),
            Destination::Dynamic(resolver),
            Some(action),
        )
    }

    fn insert(
        self,
        trigger: T,
        destination: Destination<S>,
        action: Option<TransitionAction<S>>,
    ) -> Result<Self, ConfigError> {
        let slot = self
            .config
            .states
            .entry(self.state.clone())
            .or_insert_with(StateConfiguration::new);
        if slot.transitions.contains_key(&trigger) {
            return Err(ConfigError::DuplicateTransition {
                state: self.state.name().to_string(),
                trigger: trigger.name().to_string(),
            });
        }
        slot.transitions
            .insert(trigger, Transition { destination, action });
        Ok(self)
    }
}
