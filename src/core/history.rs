//! Transition log tracking.
//!
//! Provides immutable tracking of completed transitions over time. The
//! log is an in-memory diagnostic surface only; it is serializable for
//! inspection, not for restoring a machine.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::core::{State, Trigger};

/// Record of a single completed transition.
#[derive(Clone, Debug, Serialize)]
#[serde(bound = "")]
pub struct TransitionRecord<S: State, T: Trigger> {
    /// The state the machine left.
    pub from: S,
    /// The state the machine entered.
    pub to: S,
    /// The trigger that caused the transition.
    pub trigger: T,
    /// When the state mutation committed.
    pub fired_at: DateTime<Utc>,
}

/// Ordered log of completed transitions.
///
/// The log is immutable -- [`record`](TransitionLog::record) returns a
/// new log with the record appended, leaving the original unchanged.
///
/// # Example
///
/// ```rust
/// use fluxion::{State, Trigger, TransitionLog, TransitionRecord};
/// use chrono::Utc;
/// use serde::Serialize;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
/// enum Step { A, B }
///
/// impl State for Step {
///     fn name(&self) -> &str {
///         match self { Self::A => "A", Self::B => "B" }
///     }
/// }
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
/// enum Go { Next }
///
/// impl Trigger for Go {
///     fn name(&self) -> &str { "Next" }
/// }
///
/// let log = TransitionLog::new();
/// let log = log.record(TransitionRecord {
///     from: Step::A,
///     to: Step::B,
///     trigger: Go::Next,
///     fired_at: Utc::now(),
/// });
///
/// assert_eq!(log.records().len(), 1);
/// assert_eq!(log.path(), vec![&Step::A, &Step::B]);
/// ```
#[derive(Clone, Debug, Serialize)]
#[serde(bound = "")]
pub struct TransitionLog<S: State, T: Trigger> {
    records: Vec<TransitionRecord<S, T>>,
}

impl<S: State, T: Trigger> Default for TransitionLog<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, T: Trigger> TransitionLog<S, T> {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a record, returning a new log.
    pub fn record(&self, record: TransitionRecord<S, T>) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// Get the path of states traversed: the first record's `from`,
    /// then the `to` state of each record in order.
    pub fn path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            path.push(&first.from);
        }
        for record in &self.records {
            path.push(&record.to);
        }
        path
    }

    /// Total duration from first to last recorded transition, or `None`
    /// if the log is empty.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            let duration = last.fired_at.signed_duration_since(first.fired_at);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// All records in order.
    pub fn records(&self) -> &[TransitionRecord<S, T>] {
        &self.records
    }

    /// Whether the log has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of recorded transitions.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}
