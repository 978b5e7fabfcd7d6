//! Phone call walkthrough using the synchronous machine.
//!
//! Run with: cargo run --example phone_call

use fluxion::{state_enum, trigger_enum, Machine, MachineConfig};

state_enum! {
    pub enum Phone {
        Off,
        Ringing,
        Connected,
        Talking,
    }
}

trigger_enum! {
    pub enum Call {
        TurnOff,
        Ring,
        Connect,
        Talk,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = MachineConfig::new();
    let connect = config.set_trigger_parameter::<String>(Call::Connect)?;

    config
        .for_state(Phone::Ringing)
        .on_entry(|_| {
            println!("Phone is ringing");
            Ok(())
        })?
        .on_exit(|_| {
            println!("Phone stopped ringing");
            Ok(())
        })?
        .permit(Call::Talk, Phone::Talking)?
        .permit_dynamic_param(&connect, |_state, caller: &String| {
            println!("Incoming call from {caller}");
            if caller == "Alice" {
                Ok(Phone::Connected)
            } else {
                Ok(Phone::Off)
            }
        })?;

    config
        .for_state(Phone::Talking)
        .on_entry(|_| {
            println!("Talking");
            Ok(())
        })?
        .permit(Call::Ring, Phone::Ringing)?;

    config
        .for_state(Phone::Connected)
        .on_entry(|_| {
            println!("Connected");
            Ok(())
        })?
        .permit(Call::TurnOff, Phone::Off)?;

    config
        .for_state(Phone::Off)
        .on_entry(|_| {
            println!("Phone is off");
            Ok(())
        })?
        .permit(Call::Ring, Phone::Ringing)?;

    let mut machine = Machine::new(Phone::Ringing, config);

    machine.fire(Call::Talk)?;
    machine.fire(Call::Ring)?;
    machine.fire_with(&connect, "Alice".to_string())?;
    machine.fire(Call::TurnOff)?;
    machine.fire(Call::Ring)?;
    machine.fire_with(&connect, "Bob".to_string())?;

    println!("\nFinal state: {:?}", machine.current_state());
    println!(
        "Path: {:?}",
        machine
            .log()
            .path()
            .iter()
            .map(|state| format!("{state:?}"))
            .collect::<Vec<_>>()
    );

    Ok(())
}
