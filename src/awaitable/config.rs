//! Transition table and fluent configuration for awaitable machines.
//!
//! Mirrors [`crate::sync::MachineConfig`] but every callback may
//! suspend: actions and resolvers return futures, boxed internally as
//! [`BoxFuture`]. Callbacks receive owned values so the futures they
//! build are `'static`.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};

use crate::core::{
    downcast_param, ParameterSpec, ParameterizedTrigger, State, Trigger, TransitionContext,
};
use crate::error::{ActionResult, BoxError, ConfigError};

pub(crate) type AsyncStateAction<S> =
    Arc<dyn Fn(S) -> BoxFuture<'static, ActionResult> + Send + Sync>;

pub(crate) type AsyncTransitionAction<S> = Arc<
    dyn Fn(TransitionContext<S>, Option<&(dyn Any + Send + Sync)>) -> BoxFuture<'static, ActionResult>
        + Send
        + Sync,
>;

pub(crate) type AsyncResolver<S> = Arc<
    dyn Fn(S, Option<&(dyn Any + Send + Sync)>) -> BoxFuture<'static, Result<S, BoxError>>
        + Send
        + Sync,
>;

/// Destination kind of a configured awaitable transition.
#[derive(Clone)]
pub(crate) enum Destination<S> {
    Static(S),
    Reentry,
    Dynamic(AsyncResolver<S>),
}

#[derive(Clone)]
pub(crate) struct Transition<S: State> {
    pub(crate) destination: Destination<S>,
    pub(crate) action: Option<AsyncTransitionAction<S>>,
}

#[derive(Clone)]
pub(crate) struct StateConfiguration<S: State, T> {
    pub(crate) entry: Option<AsyncStateAction<S>>,
    pub(crate) exit: Option<AsyncStateAction<S>>,
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

/// Transition table for awaitable machines.
///
/// Consumed by [`AsyncMachine::new`](crate::awaitable::AsyncMachine::new)
/// (unserialized firing) or
/// [`QueuedMachine::new`](crate::awaitable::QueuedMachine::new)
/// (serialized firing through the dispatch queue).
#[derive(Clone)]
pub struct AwaitableConfig<S: State, T: Trigger> {
    pub(crate) states: HashMap<S, StateConfiguration<S, T>>,
    pub(crate) parameters: HashMap<T, ParameterSpec>,
}

impl<S: State, T: Trigger> Default for AwaitableConfig<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, T: Trigger> AwaitableConfig<S, T> {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            parameters: HashMap::new(),
        }
    }

    /// Get a builder scoped to `state`.
    pub fn for_state(&mut self, state: S) -> AwaitableStateConfigurator<'_, S, T> {
        AwaitableStateConfigurator {
            config: self,
            state,
        }
    }

    /// Register `trigger` as parameterized with type `A`.
    ///
    /// Same contract as
    /// [`MachineConfig::set_trigger_parameter`](crate::sync::MachineConfig::set_trigger_parameter).
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

/// Fluent builder scoped to a single state, awaitable variant.
pub struct AwaitableStateConfigurator<'a, S: State, T: Trigger> {
    config: &'a mut AwaitableConfig<S, T>,
    state: S,
}

impl<'a, S: State, T: Trigger> AwaitableStateConfigurator<'a, S, T> {
    /// Set the (possibly suspending) entry action for this state.
    pub fn on_entry<F, Fut>(self, action: F) -> Result<Self, ConfigError>
    where
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
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
        slot.entry = Some(Arc::new(move |state| action(state).boxed()));
        Ok(self)
    }

    /// Set the (possibly suspending) exit action for this state.
    pub fn on_exit<F, Fut>(self, action: F) -> Result<Self, ConfigError>
    where
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
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
        slot.exit = Some(Arc::new(move |state| action(state).boxed()));
        Ok(self)
    }

    /// Permit a static transition to `destination`.
    pub fn permit(self, trigger: T, destination: S) -> Result<Self, ConfigError> {
        self.insert(trigger, Destination::Static(destination), None)
    }

    /// Permit a static transition with an action.
    pub fn permit_with<F, Fut>(
        self,
        trigger: T,
        destination: S,
        action: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(TransitionContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        let action: AsyncTransitionAction<S> =
            Arc::new(move |context, _param| action(context).boxed());
        self.insert(trigger, Destination::Static(destination), Some(action))
    }

    /// Permit a reentrant transition.
    pub fn permit_reentry(self, trigger: T) -> Result<Self, ConfigError> {
        self.insert(trigger, Destination::Reentry, None)
    }

    /// Permit a reentrant transition with an action.
    pub fn permit_reentry_with<F, Fut>(self, trigger: T, action: F) -> Result<Self, ConfigError>
    where
        F: Fn(TransitionContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        let action: AsyncTransitionAction<S> =
            Arc::new(move |context, _param| action(context).boxed());
        self.insert(trigger, Destination::Reentry, Some(action))
    }

    /// Permit a transition whose destination is produced by an
    /// awaitable resolver.
    pub fn permit_dynamic<R, Fut>(self, trigger: T, resolver: R) -> Result<Self, ConfigError>
    where
        R: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S, BoxError>> + Send + 'static,
    {
        let resolver: AsyncResolver<S> = Arc::new(move |state, _param| resolver(state).boxed());
        self.insert(trigger, Destination::Dynamic(resolver), None)
    }

    /// Permit a dynamic transition with an action.
    pub fn permit_dynamic_with<R, RFut, F, AFut>(
        self,
        trigger: T,
        resolver: R,
        action: F,
    ) -> Result<Self, ConfigError>
    where
        R: Fn(S) -> RFut + Send + Sync + 'static,
        RFut: Future<Output = Result<S, BoxError>> + Send + 'static,
        F: Fn(TransitionContext<S>) -> AFut + Send + Sync + 'static,
        AFut: Future<Output = ActionResult> + Send + 'static,
    {
        let resolver: AsyncResolver<S> = Arc::new(move |state, _param| resolver(state).boxed());
        let action: AsyncTransitionAction<S> =
            Arc::new(move |context, _param| action(context).boxed());
        self.insert(trigger, Destination::Dynamic(resolver), Some(action))
    }

    /// Permit a static transition for a parameterized trigger; the
    /// action receives an owned copy of the typed parameter.
    pub fn permit_param<A, F, Fut>(
        self,
        handle: &ParameterizedTrigger<T, A>,
        destination: S,
        action: F,
    ) -> Result<Self, ConfigError>
    where
        A: Clone + Send + Sync + 'static,
        F: Fn(TransitionContext<S>, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        let action: AsyncTransitionAction<S> =
            Arc::new(move |context, param| match downcast_param::<A>(param) {
                Ok(value) => action(context, value.clone()).boxed(),
                Err(err) => future::ready(Err(err)).boxed(),
            });
        self.insert(
            handle.trigger().clone(),
            Destination::Static(destination),
            Some(action),
        )
    }

    /// Permit a dynamic transition for a parameterized trigger.
    pub fn permit_dynamic_param<A, R, Fut>(
        self,
        handle: &ParameterizedTrigger<T, A>,
        resolver: R,
    ) -> Result<Self, ConfigError>
    where
        A: Clone + Send + Sync + 'static,
        R: Fn(S, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S, BoxError>> + Send + 'static,
    {
        let resolver: AsyncResolver<S> =
            Arc::new(move |state, param| match downcast_param::<A>(param) {
                Ok(value) => resolver(state, value.clone()).boxed(),
                Err(err) => future::ready(Err(err)).boxed(),
            });
        self.insert(handle.trigger().clone(), Destination::Dynamic(resolver), None)
    }

    /// Permit a dynamic parameterized transition with an action.
    pub fn permit_dynamic_param_with<A, R, RFut, F, AFut>(
        self,
        handle: &ParameterizedTrigger<T, A>,
        resolver: R,
        action: F,
    ) -> Result<Self, ConfigError>
    where
        A: Clone + Send + Sync + 'static,
        R: Fn(S, A) -> RFut + Send + Sync + 'static,
        RFut: Future<Output = Result<S, BoxError>> + Send + 'static,
        F: Fn(TransitionContext<S>, A) -> AFut + Send + Sync + 'static,
        AFut: Future<Output = ActionResult> + Send + 'static,
    {
        let resolver: AsyncResolver<S> =
            Arc::new(move |state, param| match downcast_param::<A>(param) {
                Ok(value) => resolver(state, value.clone()).boxed(),
                Err(err) => future::ready(Err(err)).boxed(),
            });
        let action: AsyncTransitionAction<S> =
            Arc::new(move |context, param| match downcast_param::<A>(param) {
                Ok(value) => action(context, value.clone()).boxed(),
                Err(err) => future::ready(Err(err)).boxed(),
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
        action: Option<AsyncTransitionAction<S>>,
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
    enum TestState {
        Off,
        On,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Off => "Off",
                Self::On => "On",
            }
        }
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
    enum TestTrigger {
        Toggle,
    }

    impl Trigger for TestTrigger {
        fn name(&self) -> &str {
            "Toggle"
        }
    }

    #[test]
    fn permit_registers_transition() {
        let mut config = AwaitableConfig::new();
        config
            .for_state(TestState::Off)
            .permit(TestTrigger::Toggle, TestState::On)
            .unwrap();

        assert!(config
            .state_configuration(&TestState::Off)
            .unwrap()
            .transitions
            .contains_key(&TestTrigger::Toggle));
    }

    #[test]
    fn duplicate_transition_is_rejected() {
        let mut config = AwaitableConfig::new();
        let result = config
            .for_state(TestState::Off)
            .permit(TestTrigger::Toggle, TestState::On)
            .unwrap()
            .permit_with(TestTrigger::Toggle, TestState::Off, |_| async { Ok(()) });

        assert!(matches!(
            result,
            Err(ConfigError::DuplicateTransition { .. })
        ));
    }

    #[test]
    fn duplicate_entry_action_is_rejected() {
        let mut config: AwaitableConfig<TestState, TestTrigger> = AwaitableConfig::new();
        let result = config
            .for_state(TestState::Off)
            .on_entry(|_| async { Ok(()) })
            .unwrap()
            .on_entry(|_| async { Ok(()) });

        assert!(matches!(
            result,
            Err(ConfigError::DuplicateEntryAction { .. })
        ));
    }

    #[test]
    fn conflicting_parameter_type_is_rejected() {
        let mut config: AwaitableConfig<TestState, TestTrigger> = AwaitableConfig::new();
        config
            .set_trigger_parameter::<String>(TestTrigger::Toggle)
            .unwrap();
        let result = config.set_trigger_parameter::<u64>(TestTrigger::Toggle);

        assert!(matches!(
            result,
            Err(ConfigError::ParameterTypeConflict { .. })
        ));
    }
}
