//! Phone call walkthrough using the serialized (queued) machine:
//! several tasks fire concurrently and the dispatch queue keeps the
//! transitions strictly ordered.
//!
//! Run with: cargo run --example phone_call_queued

use fluxion::{state_enum, trigger_enum, AwaitableConfig, QueuedMachine};

state_enum! {
    pub enum Phone {
        Off,
        Ringing,
        Connected,
    }
}

trigger_enum! {
    pub enum Call {
        TurnOff,
        Ring,
        Connect,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AwaitableConfig::new();
    let connect = config.set_trigger_parameter::<String>(Call::Connect)?;

    config
        .for_state(Phone::Off)
        .on_entry(|_| async {
            println!("Phone is off");
            Ok(())
        })?
        .permit(Call::Ring, Phone::Ringing)?;

    config
        .for_state(Phone::Ringing)
        .on_entry(|_| async {
            println!("Phone is ringing");
            Ok(())
        })?
        .permit_dynamic_param(&connect, |_state, caller: String| async move {
            println!("Incoming call from {caller}");
            if caller == "Alice" {
                Ok(Phone::Connected)
            } else {
                Ok(Phone::Off)
            }
        })?;

    config
        .for_state(Phone::Connected)
        .on_entry(|_| async {
            println!("Connected");
            Ok(())
        })?
        .permit(Call::TurnOff, Phone::Off)?;

    let machine = QueuedMachine::new(Phone::Off, config);

    // Fires submitted from one task complete in submission order even
    // though processing happens on the worker.
    let ring = machine.fire_async(Call::Ring)?;
    let answer = machine.fire_async_with(&connect, "Alice".to_string())?;
    let hang_up = machine.fire_async(Call::TurnOff)?;

    ring.await?;
    answer.await?;
    hang_up.await?;

    // A queued entry can be cancelled while it is still waiting.
    let pending = machine.fire_async(Call::Ring)?;
    pending.cancel();
    match pending.await {
        Err(err) => println!("Second ring cancelled: {err}"),
        Ok(()) => println!("Second ring was already being processed"),
    }

    println!("\nFinal state: {:?}", machine.current_state());

    machine.shutdown().await;
    Ok(())
}
