//! Core `State` and `Trigger` traits.
//!
//! Both traits describe the capability set a caller-defined domain type
//! needs in order to key the transition table: equality, stable hashing,
//! cloning, and a display name for diagnostics.

use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine states.
///
/// States are opaque, comparable values from a finite, caller-defined
/// domain -- typically a plain enum. The `Eq + Hash` requirement lets
/// any such value key the transition table, whether it is a small
/// enumeration or a richer value type.
///
/// # Example
///
/// ```rust
/// use fluxion::State;
/// use serde::Serialize;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
/// enum Phone {
///     Off,
///     Ringing,
///     Connected,
/// }
///
/// impl State for Phone {
///     fn name(&self) -> &str {
///         match self {
///             Self::Off => "Off",
///             Self::Ringing => "Ringing",
///             Self::Connected => "Connected",
///         }
///     }
/// }
/// ```
pub trait State: Clone + Eq + Hash + Debug + Serialize + Send + Sync + 'static {
    /// Get the state's name for display and logging.
    fn name(&self) -> &str;
}

/// Trait for state machine triggers.
///
/// Triggers are event identities that may cause a transition from the
/// current state. A trigger is *bare* unless it has been registered as
/// parameterized via
/// [`set_trigger_parameter`](crate::sync::MachineConfig::set_trigger_parameter),
/// in which case firing it requires a value of the registered type.
pub trait Trigger: Clone + Eq + Hash + Debug + Serialize + Send + Sync + 'static {
    /// Get the trigger's name for display and logging.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
    enum TestState {
        Idle,
        Busy,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Idle => "Idle",
                Self::Busy => "Busy",
            }
        }
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
    enum TestTrigger {
        Start,
        Stop,
    }

    impl Trigger for TestTrigger {
        fn name(&self) -> &str {
            match self {
                Self::Start => "Start",
                Self::Stop => "Stop",
            }
        }
    }

    #[test]
    fn state_name_returns_variant_name() {
        assert_eq!(TestState::Idle.name(), "Idle");
        assert_eq!(TestState::Busy.name(), "Busy");
    }

    #[test]
    fn trigger_name_returns_variant_name() {
        assert_eq!(TestTrigger::Start.name(), "Start");
        assert_eq!(TestTrigger::Stop.name(), "Stop");
    }

    #[test]
    fn states_are_comparable_and_hashable() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(TestState::Idle, 1);
        map.insert(TestState::Busy, 2);

        assert_eq!(map.get(&TestState::Idle), Some(&1));
        assert_eq!(map.get(&TestState::Busy), Some(&2));
        assert_ne!(TestState::Idle, TestState::Busy);
    }

    #[test]
    fn states_serialize() {
        let json = serde_json::to_string(&TestState::Idle).unwrap();
        assert_eq!(json, "\"Idle\"");
    }
}
