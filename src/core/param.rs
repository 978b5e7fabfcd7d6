//! Typed trigger parameters.
//!
//! Registering a trigger as parameterized produces a
//! [`ParameterizedTrigger`] handle that carries the expected parameter
//! type statically, so fire-time calls are checked by the type system.
//! A `TypeId` check remains at the registration and fire boundaries to
//! catch handles that cross configurations.

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;

use crate::core::Trigger;
use crate::error::{BoxError, FireError};

/// Erased parameter value carried through the untyped internals and the
/// dispatch queue.
pub(crate) type BoxedParameter = Box<dyn Any + Send + Sync>;

/// A trigger identity bound to a required parameter type `A`.
///
/// Handles are only produced by
/// [`set_trigger_parameter`](crate::sync::MachineConfig::set_trigger_parameter)
/// (or its awaitable counterpart) and must be used for subsequent
/// `permit_*_param` calls and for firing. Firing the bare trigger
/// identity once it has been registered as parameterized fails with
/// [`FireError::ParameterTypeMismatch`].
pub struct ParameterizedTrigger<T: Trigger, A> {
    trigger: T,
    _parameter: PhantomData<fn(A)>,
}

impl<T: Trigger, A> ParameterizedTrigger<T, A> {
    pub(crate) fn new(trigger: T) -> Self {
        Self {
            trigger,
            _parameter: PhantomData,
        }
    }

    /// The underlying trigger identity.
    pub fn trigger(&self) -> &T {
        &self.trigger
    }
}

impl<T: Trigger, A> Clone for ParameterizedTrigger<T, A> {
    fn clone(&self) -> Self {
        Self::new(self.trigger.clone())
    }
}

impl<T: Trigger, A> fmt::Debug for ParameterizedTrigger<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterizedTrigger")
            .field("trigger", &self.trigger)
            .field("parameter", &std::any::type_name::<A>())
            .finish()
    }
}

/// Registered parameter type for a trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ParameterSpec {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
}

impl ParameterSpec {
    pub(crate) fn of<A: Any>() -> Self {
        Self {
            type_id: TypeId::of::<A>(),
            type_name: std::any::type_name::<A>(),
        }
    }

    pub(crate) fn matches(&self, value: &BoxedParameter) -> bool {
        (**value).type_id() == self.type_id
    }
}

/// Verify a supplied parameter against the registry entry for `trigger`.
pub(crate) fn check_parameter<T: Trigger>(
    registered: Option<&ParameterSpec>,
    supplied: Option<&BoxedParameter>,
    trigger: &T,
) -> Result<(), FireError> {
    match (registered, supplied) {
        (None, None) => Ok(()),
        (Some(spec), Some(value)) if spec.matches(value) => Ok(()),
        (Some(spec), _) => Err(FireError::ParameterTypeMismatch {
            trigger: trigger.name().to_string(),
            expected: spec.type_name,
        }),
        (None, Some(_)) => Err(FireError::ParameterTypeMismatch {
            trigger: trigger.name().to_string(),
            expected: "none",
        }),
    }
}

/// Downcast an erased parameter inside a typed action/resolver wrapper.
///
/// The machine verifies the `TypeId` against the registry before any
/// wrapper runs, so this only fails for handles forged across configs.
pub(crate) fn downcast_param<A: 'static>(
    param: Option<&(dyn Any + Send + Sync)>,
) -> Result<&A, BoxError> {
    param
        .and_then(|value| value.downcast_ref::<A>())
        .ok_or_else(|| {
            BoxError::from(format!(
                "trigger parameter is not a {}",
                std::any::type_name::<A>()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
    enum TestTrigger {
        Connect,
    }

    impl Trigger for TestTrigger {
        fn name(&self) -> &str {
            "Connect"
        }
    }

    #[test]
    fn spec_matches_same_type() {
        let spec = ParameterSpec::of::<String>();
        let value: BoxedParameter = Box::new("Alice".to_string());
        assert!(spec.matches(&value));
    }

    #[test]
    fn spec_rejects_other_type() {
        let spec = ParameterSpec::of::<String>();
        let value: BoxedParameter = Box::new(42u32);
        assert!(!spec.matches(&value));
    }

    #[test]
    fn bare_trigger_with_no_parameter_passes() {
        assert!(check_parameter(None, None, &TestTrigger::Connect).is_ok());
    }

    #[test]
    fn registered_trigger_requires_parameter() {
        let spec = ParameterSpec::of::<String>();
        let err = check_parameter(Some(&spec), None, &TestTrigger::Connect).unwrap_err();
        assert!(matches!(err, FireError::ParameterTypeMismatch { .. }));
    }

    #[test]
    fn wrong_parameter_type_is_rejected() {
        let spec = ParameterSpec::of::<String>();
        let value: BoxedParameter = Box::new(42u32);
        let err = check_parameter(Some(&spec), Some(&value), &TestTrigger::Connect).unwrap_err();
        assert!(matches!(err, FireError::ParameterTypeMismatch { .. }));
    }

    #[test]
    fn parameter_for_unregistered_trigger_is_rejected() {
        let value: BoxedParameter = Box::new("Alice".to_string());
        let err = check_parameter(None, Some(&value), &TestTrigger::Connect).unwrap_err();
        assert!(matches!(
            err,
            FireError::ParameterTypeMismatch { expected: "none", .. }
        ));
    }

    #[test]
    fn downcast_recovers_typed_value() {
        let value: BoxedParameter = Box::new("Alice".to_string());
        let name = downcast_param::<String>(Some(&*value)).unwrap();
        assert_eq!(name, "Alice");
    }

    #[test]
    fn handle_keeps_trigger_identity() {
        let handle: ParameterizedTrigger<TestTrigger, String> =
            ParameterizedTrigger::new(TestTrigger::Connect);
        assert_eq!(handle.trigger(), &TestTrigger::Connect);

        let cloned = handle.clone();
        assert_eq!(cloned.trigger(), &TestTrigger::Connect);
    }
}
