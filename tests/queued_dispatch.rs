//! Concurrency tests for the serialized dispatch queue.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fluxion::{state_enum, trigger_enum, AwaitableConfig, QueuedMachine};

state_enum! {
    enum Counter {
        Counting,
    }
}

trigger_enum! {
    enum Tick {
        Bump,
    }
}

#[tokio::test]
async fn concurrent_fires_never_overlap() {
    let in_flight = Arc::new(AtomicBool::new(false));
    let overlaps = Arc::new(AtomicUsize::new(0));
    let processed = Arc::new(AtomicUsize::new(0));

    let mut config = AwaitableConfig::new();
    let action_in_flight = in_flight.clone();
    let action_overlaps = overlaps.clone();
    let action_processed = processed.clone();
    config
        .for_state(Counter::Counting)
        .permit_reentry_with(Tick::Bump, move |_| {
            let in_flight = action_in_flight.clone();
            let overlaps = action_overlaps.clone();
            let processed = action_processed.clone();
            async move {
                if in_flight.swap(true, Ordering::SeqCst) {
                    overlaps.fetch_add(1, Ordering::SeqCst);
                }
                tokio::task::yield_now().await;
                in_flight.store(false, Ordering::SeqCst);
                processed.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .unwrap();

    let machine = Arc::new(QueuedMachine::new(Counter::Counting, config));

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let machine = machine.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..25 {
                machine.fire_async(Tick::Bump).unwrap().await.unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(processed.load(Ordering::SeqCst), 200);
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn handles_resolve_in_submission_order_from_one_task() {
    let seen = Arc::new(Mutex::new(Vec::new()));

    let mut config = AwaitableConfig::new();
    let connect = config.set_trigger_parameter::<usize>(Tick::Bump).unwrap();
    let action_seen = seen.clone();
    config
        .for_state(Counter::Counting)
        .permit_param(&connect, Counter::Counting, move |_context, index: usize| {
            let seen = action_seen.clone();
            async move {
                // Suspend so later entries would overtake if the queue
                // were not FIFO.
                tokio::time::sleep(Duration::from_millis(1)).await;
                seen.lock().unwrap().push(index);
                Ok(())
            }
        })
        .unwrap();

    let machine = QueuedMachine::new(Counter::Counting, config);

    let handles: Vec<_> = (0..20)
        .map(|index| machine.fire_async_with(&connect, index).unwrap())
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(*seen.lock().unwrap(), (0..20).collect::<Vec<_>>());
    machine.shutdown().await;
}
