//! Unserialized asynchronous state machine.

use chrono::Utc;
use tracing::debug;

use crate::awaitable::config::{AwaitableConfig, Destination};
use crate::core::{
    check_parameter, BoxedParameter, ParameterizedTrigger, State, Trigger, TransitionContext,
    TransitionLog, TransitionRecord,
};
use crate::error::FireError;

/// State machine whose actions and resolvers may suspend, without any
/// cross-call serialization.
///
/// `fire_async` takes `&mut self`: exclusive access is how the "caller
/// must not overlap calls" contract is expressed, so a sequence of
/// awaited fires behaves exactly like the synchronous machine while
/// individual callbacks are free to perform non-blocking waits. When
/// multiple tasks need to fire against one machine, use
/// [`QueuedMachine`](crate::awaitable::QueuedMachine) instead.
pub struct AsyncMachine<S: State, T: Trigger> {
    config: AwaitableConfig<S, T>,
    current: S,
    log: TransitionLog<S, T>,
}

impl<S: State, T: Trigger> AsyncMachine<S, T> {
    /// Create a machine bound to `initial` and a finalized table.
    pub fn new(initial: S, config: AwaitableConfig<S, T>) -> Self {
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

    /// Fire a bare trigger, awaiting each callback in turn.
    ///
    /// Completes when the entry action of the destination has finished
    /// (or with the first failure).
    pub async fn fire_async(&mut self, trigger: T) -> Result<(), FireError> {
        self.fire_erased(trigger, None).await
    }

    /// Fire a parameterized trigger with its typed argument.
    pub async fn fire_async_with<A>(
        &mut self,
        handle: &ParameterizedTrigger<T, A>,
        value: A,
    ) -> Result<(), FireError>
    where
        A: Clone + Send + Sync + 'static,
    {
        self.fire_erased(handle.trigger().clone(), Some(Box::new(value)))
            .await
    }

    pub(crate) async fn fire_erased(
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
            Destination::Dynamic(resolver) => resolver(self.current.clone(), param)
                .await
                .map_err(FireError::Action)?,
        };

        debug!(
            from = %self.current.name(),
            to = %destination.name(),
            trigger = %trigger.name(),
            "firing transition"
        );

        if let Some(exit) = &state_config.exit {
            exit(self.current.clone()).await.map_err(FireError::Action)?;
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
            destination: destination.clone(),
        };
        if let Some(action) = &transition.action {
            action(context, param).await.map_err(FireError::Action)?;
        }
        if let Some(entered) = self.config.state_configuration(&self.current) {
            if let Some(entry) = &entered.entry {
                entry(destination).await.map_err(FireError::Action)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::sync::Arc;

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
    enum Job {
        Pending,
        Running,
        Done,
    }

    impl State for Job {
        fn name(&self) -> &str {
            match self {
                Self::Pending => "Pending",
                Self::Running => "Running",
                Self::Done => "Done",
            }
        }
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
    enum JobTrigger {
        Start,
        Finish,
    }

    impl Trigger for JobTrigger {
        fn name(&self) -> &str {
            match self {
                Self::Start => "Start",
                Self::Finish => "Finish",
            }
        }
    }

    #[tokio::test]
    async fn static_transition_moves_state() {
        let mut config = AwaitableConfig::new();
        config
            .for_state(Job::Pending)
            .permit(JobTrigger::Start, Job::Running)
            .unwrap();

        let mut machine = AsyncMachine::new(Job::Pending, config);
        machine.fire_async(JobTrigger::Start).await.unwrap();

        assert_eq!(machine.current_state(), &Job::Running);
    }

    #[tokio::test]
    async fn suspending_callbacks_run_in_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut config = AwaitableConfig::new();
        let exit_order = order.clone();
        let action_order = order.clone();
        let entry_order = order.clone();
        config
            .for_state(Job::Pending)
            .on_exit(move |_| {
                let order = exit_order.clone();
                async move {
                    tokio::task::yield_now().await;
                    order.lock().unwrap().push("exit");
                    Ok(())
                }
            })
            .unwrap()
            .permit_with(JobTrigger::Start, Job::Running, move |_| {
                let order = action_order.clone();
                async move {
                    tokio::task::yield_now().await;
                    order.lock().unwrap().push("action");
                    Ok(())
                }
            })
            .unwrap();
        config
            .for_state(Job::Running)
            .on_entry(move |_| {
                let order = entry_order.clone();
                async move {
                    order.lock().unwrap().push("entry");
                    Ok(())
                }
            })
            .unwrap();

        let mut machine = AsyncMachine::new(Job::Pending, config);
        machine.fire_async(JobTrigger::Start).await.unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["exit", "action", "entry"]);
    }

    #[tokio::test]
    async fn dynamic_resolver_may_suspend() {
        let mut config = AwaitableConfig::new();
        config
            .for_state(Job::Running)
            .permit_dynamic(JobTrigger::Finish, |_state| async {
                tokio::task::yield_now().await;
                Ok(Job::Done)
            })
            .unwrap();

        let mut machine = AsyncMachine::new(Job::Running, config);
        machine.fire_async(JobTrigger::Finish).await.unwrap();

        assert_eq!(machine.current_state(), &Job::Done);
    }

    #[tokio::test]
    async fn parameterized_resolver_sees_value() {
        let mut config = AwaitableConfig::new();
        let finish = config
            .set_trigger_parameter::<bool>(JobTrigger::Finish)
            .unwrap();
        config
            .for_state(Job::Running)
            .permit_dynamic_param(&finish, |_state, success: bool| async move {
                Ok(if success { Job::Done } else { Job::Pending })
            })
            .unwrap();

        let mut machine = AsyncMachine::new(Job::Running, config);
        machine.fire_async_with(&finish, false).await.unwrap();
        assert_eq!(machine.current_state(), &Job::Pending);
    }

    #[tokio::test]
    async fn invalid_trigger_is_rejected_without_side_effects() {
        let mut config = AwaitableConfig::new();
        config
            .for_state(Job::Pending)
            .permit(JobTrigger::Start, Job::Running)
            .unwrap();

        let mut machine = AsyncMachine::new(Job::Pending, config);
        let err = machine.fire_async(JobTrigger::Finish).await.unwrap_err();

        assert!(matches!(err, FireError::InvalidTransition { .. }));
        assert_eq!(machine.current_state(), &Job::Pending);
        assert!(machine.log().is_empty());
    }

    #[tokio::test]
    async fn sequential_async_fires_match_sync_semantics() {
        let mut config = AwaitableConfig::new();
        config
            .for_state(Job::Pending)
            .permit(JobTrigger::Start, Job::Running)
            .unwrap();
        config
            .for_state(Job::Running)
            .permit(JobTrigger::Finish, Job::Done)
            .unwrap();

        let mut machine = AsyncMachine::new(Job::Pending, config);
        machine.fire_async(JobTrigger::Start).await.unwrap();
        machine.fire_async(JobTrigger::Finish).await.unwrap();

        assert_eq!(machine.current_state(), &Job::Done);
        assert_eq!(
            machine.log().path(),
            vec![&Job::Pending, &Job::Running, &Job::Done]
        );
    }
}
