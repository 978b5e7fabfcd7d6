//! Context passed to transition actions.

use serde::Serialize;

use crate::core::State;

/// Resolved endpoints of an in-flight transition.
///
/// Transition actions receive this after the state mutation commits, so
/// `destination` is also the machine's current state at that point. For
/// dynamic transitions `destination` is the resolver's result, which is
/// how an action distinguishes acceptance from rejection when a resolver
/// maps "refused" inputs to a designated fallback state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(bound = "")]
pub struct TransitionContext<S: State> {
    /// The state the machine left.
    pub source: S,
    /// The state the machine now occupies.
    pub destination: S,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
    enum TestState {
        A,
        B,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::A => "A",
                Self::B => "B",
            }
        }
    }

    #[test]
    fn context_exposes_both_endpoints() {
        let context = TransitionContext {
            source: TestState::A,
            destination: TestState::B,
        };

        assert_eq!(context.source, TestState::A);
        assert_eq!(context.destination, TestState::B);
    }
}
