//! Macros for declaring state and trigger enums.

/// Generate a [`State`](crate::State) implementation for a plain enum.
///
/// # Example
///
/// ```
/// use fluxion::state_enum;
///
/// state_enum! {
///     pub enum Phone {
///         Off,
///         Ringing,
///         Connected,
///         Talking,
///     }
/// }
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

/// Generate a [`Trigger`](crate::Trigger) implementation for a plain enum.
///
/// # Example
///
/// ```
/// use fluxion::trigger_enum;
///
/// trigger_enum! {
///     pub enum PhoneTrigger {
///         TurnOff,
///         Ring,
///         Connect,
///         Talk,
///     }
/// }
/// ```
#[macro_export]
macro_rules! trigger_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::Trigger for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{State, Trigger};

    state_enum! {
        enum TestState {
            Initial,
            Complete,
        }
    }

    trigger_enum! {
        enum TestTrigger {
            Advance,
        }
    }

    #[test]
    fn state_enum_macro_generates_trait() {
        assert_eq!(TestState::Initial.name(), "Initial");
        assert_eq!(TestState::Complete.name(), "Complete");
    }

    #[test]
    fn trigger_enum_macro_generates_trait() {
        assert_eq!(TestTrigger::Advance.name(), "Advance");
    }

    #[test]
    fn macro_supports_visibility() {
        state_enum! {
            pub enum PublicState {
                A,
                B,
            }
        }

        let _state = PublicState::A;
    }
}
