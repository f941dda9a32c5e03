//! Narrated teleportation of |+⟩ through each Bell state, step by step

use qteleport::core::{EntangledPair, QuantumMemory, RECEIVER_EPR_MEMORY, SENDER_EPR_MEMORY, SENDER_UNKNOWN_MEMORY};
use qteleport::protocol::{ProtocolEvent, TeleportationMessage};
use qteleport::simulation::{ChannelTransport, ClassicalChannel, Scheduler, Timeline};
use qteleport::{
    resolve, BellStateKind, MeasurementOutcome, NodeId, OutcomeSampler, QuantumStateTag, Receiver, Sender, SimTime,
    TeleportError,
};

fn teleport(bell: BellStateKind, seed: u64) -> Result<(), TeleportError> {
    let alice = NodeId::from("alice");
    let bob = NodeId::from("bob");
    let unknown = QuantumStateTag::Plus;

    println!("--- Teleporting {} through {} ---", unknown, bell);

    // 1. Pre-share the Bell pair and load the unknown state
    let (alice_half, bob_half) = EntangledPair::create(bell, SENDER_EPR_MEMORY, RECEIVER_EPR_MEMORY);
    let mut sender = Sender::new(
        alice.clone(),
        bob.clone(),
        QuantumMemory::with_state(SENDER_UNKNOWN_MEMORY, unknown),
        alice_half,
    );
    let mut receiver = Receiver::new(bob.clone(), bob_half, SimTime::new(150));
    println!("  Step 1: {} holds {}", alice, sender.memory_unknown());

    // 2. Classical channel with a 100 ps latency
    let channel = ClassicalChannel::new("cc_alice_bob", alice, bob, SimTime::new(100));
    let mut timeline: Timeline<ProtocolEvent> = Timeline::new();
    let mut sampler = OutcomeSampler::seeded(seed);

    // 3. Bell measurement; the result goes onto the channel
    let outcome = {
        let mut transport = ChannelTransport::new(&channel, &mut timeline, &mut receiver);
        sender.start(SimTime::ZERO, &mut sampler, &mut transport)?
    };
    println!("  Step 2: Bell measurement gave {}; {} is now {}", outcome, sender.id(), sender.phase());
    println!("          receiver's half collapsed to {:?}", receiver.memory_epr().collapsed_state());

    // 4. Drive the timeline: delivery, then the delayed correction
    timeline.run(|tl, event| match event {
        ProtocolEvent::DeliverMessage(message) => {
            println!("  Step 3: {} arrives at {}", describe(&message), tl.now());
            receiver.on_message(message, tl)
        }
        ProtocolEvent::ApplyCorrections { .. } => {
            let teleported = receiver.apply_corrections(tl.now())?;
            println!("  Step 4: {}", teleported);
            Ok(())
        }
        ProtocolEvent::StartTeleportation { .. } => Ok(()),
    })?;

    let expected = resolve(bell, outcome);
    let teleported = receiver
        .teleported_state()
        .ok_or_else(|| TeleportError::protocol_state("receiver", receiver.phase(), "never corrected"))?;
    println!(
        "  Result: {} (corrections {}, expected {}), fidelity {:.3}\n",
        teleported.state,
        teleported.corrections,
        expected,
        unknown.fidelity(teleported.state)
    );
    Ok(())
}

fn describe(message: &TeleportationMessage) -> String {
    format!("{} -> {} with {}", message.sender, message.receiver, message.measurement_results)
}

fn main() -> Result<(), TeleportError> {
    println!("Correction table:");
    for bell in BellStateKind::ALL {
        let row: Vec<String> = MeasurementOutcome::ALL
            .iter()
            .map(|o| format!("{} {}", o, resolve(bell, *o)))
            .collect();
        println!("  {}: {}", bell.label(), row.join("  "));
    }
    println!();

    for (i, bell) in BellStateKind::ALL.into_iter().enumerate() {
        teleport(bell, 7 + i as u64)?;
    }
    Ok(())
}
