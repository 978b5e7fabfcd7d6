//! Serialized (queued) asynchronous firing.
//!
//! A [`QueuedMachine`] owns a FIFO dispatch queue drained by exactly one
//! worker task, which is the sole owner of the machine state. Each
//! `fire_async` call enqueues an entry and returns a [`FireHandle`]
//! that resolves once the worker has fully processed that entry, so at
//! most one transition is ever in flight and entries complete in strict
//! submission order.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::awaitable::config::AwaitableConfig;
use crate::awaitable::machine::AsyncMachine;
use crate::core::{BoxedParameter, ParameterizedTrigger, State, Trigger};
use crate::error::FireError;

/// A pending fire request travelling through the dispatch queue.
struct QueueEntry<T: Trigger> {
    id: Uuid,
    trigger: T,
    parameter: Option<BoxedParameter>,
    completion: oneshot::Sender<Result<(), FireError>>,
    cancelled: Arc<AtomicBool>,
}

/// Completion handle for a queued fire request.
///
/// Resolves with the entry's outcome once the worker has fully
/// processed it. Dropping the handle does not cancel the entry; use
/// [`cancel`](FireHandle::cancel) for that.
pub struct FireHandle {
    receiver: oneshot::Receiver<Result<(), FireError>>,
    cancelled: Arc<AtomicBool>,
}

impl FireHandle {
    /// Request cancellation of this entry.
    ///
    /// Honored only if the worker has not started processing the entry,
    /// in which case the handle resolves with [`FireError::Cancelled`].
    /// A transition already executing runs to completion or failure.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl Future for FireHandle {
    type Output = Result<(), FireError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.receiver).poll(cx).map(|received| {
            match received {
                Ok(result) => result,
                // Worker dropped the sender without responding.
                Err(_) => Err(FireError::QueueClosed),
            }
        })
    }
}

enum QueueSender<T: Trigger> {
    Bounded(mpsc::Sender<QueueEntry<T>>),
    Unbounded(mpsc::UnboundedSender<QueueEntry<T>>),
}

enum QueueReceiver<T: Trigger> {
    Bounded(mpsc::Receiver<QueueEntry<T>>),
    Unbounded(mpsc::UnboundedReceiver<QueueEntry<T>>),
}

impl<T: Trigger> QueueReceiver<T> {
    async fn recv(&mut self) -> Option<QueueEntry<T>> {
        match self {
            Self::Bounded(receiver) => receiver.recv().await,
            Self::Unbounded(receiver) => receiver.recv().await,
        }
    }
}

/// State machine whose fires are serialized through a dispatch queue.
///
/// Unlike [`AsyncMachine`], `fire_async` takes `&self`, so any number
/// of tasks may fire concurrently against one machine; the worker
/// guarantees FIFO processing and isolation between transitions.
///
/// The queue is unbounded by default. [`with_capacity`]
/// (QueuedMachine::with_capacity) bounds it, making `fire_async` fail
/// fast with [`FireError::QueueCapacityExceeded`] when full.
///
/// Dropping the machine closes the queue: the worker drains entries
/// already accepted, then exits. No timeout is imposed on callbacks; a
/// hung action stalls this machine's queue indefinitely.
pub struct QueuedMachine<S: State, T: Trigger> {
    sender: QueueSender<T>,
    current: Arc<RwLock<S>>,
    worker: JoinHandle<()>,
}

impl<S: State, T: Trigger> QueuedMachine<S, T> {
    /// Create a machine with an unbounded dispatch queue.
    ///
    /// Must be called from within a tokio runtime; the worker task is
    /// spawned immediately.
    pub fn new(initial: S, config: AwaitableConfig<S, T>) -> Self {
        Self::spawn(initial, config, None)
    }

    /// Create a machine whose queue holds at most `capacity` pending
    /// entries.
    pub fn with_capacity(initial: S, config: AwaitableConfig<S, T>, capacity: usize) -> Self {
        Self::spawn(initial, config, Some(capacity))
    }

    fn spawn(initial: S, config: AwaitableConfig<S, T>, capacity: Option<usize>) -> Self {
        let current = Arc::new(RwLock::new(initial.clone()));
        let machine = AsyncMachine::new(initial, config);

        let (sender, receiver) = match capacity {
            Some(capacity) => {
                let (tx, rx) = mpsc::channel(capacity);
                (QueueSender::Bounded(tx), QueueReceiver::Bounded(rx))
            }
            None => {
                let (tx, rx) = mpsc::unbounded_channel();
                (QueueSender::Unbounded(tx), QueueReceiver::Unbounded(rx))
            }
        };

        let mirror = current.clone();
        let worker = tokio::spawn(dispatch_loop(machine, receiver, mirror));

        Self {
            sender,
            current,
            worker,
        }
    }

    /// Snapshot of the state the machine currently occupies.
    ///
    /// The worker may commit further transitions immediately after this
    /// returns; the snapshot is exact only once the queue has drained.
    pub fn current_state(&self) -> S {
        self.current.read().clone()
    }

    /// Enqueue a bare trigger; returns immediately with a handle that
    /// resolves once the entry has been fully processed.
    pub fn fire_async(&self, trigger: T) -> Result<FireHandle, FireError> {
        self.enqueue(trigger, None)
    }

    /// Enqueue a parameterized trigger with its typed argument.
    pub fn fire_async_with<A>(
        &self,
        handle: &ParameterizedTrigger<T, A>,
        value: A,
    ) -> Result<FireHandle, FireError>
    where
        A: Clone + Send + Sync + 'static,
    {
        self.enqueue(handle.trigger().clone(), Some(Box::new(value)))
    }

    /// Close the queue and wait for the worker to finish the entries it
    /// already accepted.
    pub async fn shutdown(self) {
        let Self { sender, worker, .. } = self;
        drop(sender);
        let _ = worker.await;
    }

    fn enqueue(
        &self,
        trigger: T,
        parameter: Option<BoxedParameter>,
    ) -> Result<FireHandle, FireError> {
        let (completion, receiver) = oneshot::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let entry = QueueEntry {
            id: Uuid::new_v4(),
            trigger,
            parameter,
            completion,
            cancelled: cancelled.clone(),
        };

        match &self.sender {
            QueueSender::Unbounded(sender) => {
                sender.send(entry).map_err(|_| FireError::QueueClosed)?;
            }
            QueueSender::Bounded(sender) => {
                sender.try_send(entry).map_err(|err| match err {
                    TrySendError::Full(_) => FireError::QueueCapacityExceeded,
                    TrySendError::Closed(_) => FireError::QueueClosed,
                })?;
            }
        }

        Ok(FireHandle {
            receiver,
            cancelled,
        })
    }
}

/// Sole consumer of a machine's dispatch queue.
///
/// Processes entries strictly in arrival order, one at a time, to
/// completion. A failing entry resolves its handle with the error and
/// never stops the loop; the next entry runs against whatever state the
/// failure left behind.
async fn dispatch_loop<S: State, T: Trigger>(
    mut machine: AsyncMachine<S, T>,
    mut receiver: QueueReceiver<T>,
    mirror: Arc<RwLock<S>>,
) {
    while let Some(entry) = receiver.recv().await {
        if entry.cancelled.load(Ordering::SeqCst) {
            let _ = entry.completion.send(Err(FireError::Cancelled));
            continue;
        }

        debug!(id = %entry.id, trigger = %entry.trigger.name(), "processing queued fire");
        let result = machine.fire_erased(entry.trigger, entry.parameter).await;
        *mirror.write() = machine.current_state().clone();

        if let Err(err) = &result {
            debug!(id = %entry.id, %err, "queued fire failed");
        }
        // The caller may have dropped its handle; that is not an error.
        let _ = entry.completion.send(result);
    }
    debug!("dispatch queue closed, worker exiting");
}
