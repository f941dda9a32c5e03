// src/simulation/transport.rs

//! Classical channel between the two nodes.

use crate::core::{NodeId, SimTime, TeleportError, TeleportResult};
use crate::protocol::{ProtocolEvent, Receiver, TeleportationMessage};
use crate::simulation::timeline::Scheduler;
use tracing::debug;

/// Hands a classical message on towards its addressee.
///
/// The sender only sees this seam, so it can be exercised against a recording
/// transport with no receiver behind it.
pub trait Transport {
    fn deliver(&mut self, message: TeleportationMessage) -> TeleportResult<()>;
}

/// A reliable, ordered one-way link with a fixed latency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassicalChannel {
    name: String,
    sender: NodeId,
    receiver: NodeId,
    delay: SimTime,
}

impl ClassicalChannel {
    pub fn new(name: impl Into<String>, sender: NodeId, receiver: NodeId, delay: SimTime) -> Self {
        Self { name: name.into(), sender, receiver, delay }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sender(&self) -> &NodeId {
        &self.sender
    }

    pub fn receiver(&self) -> &NodeId {
        &self.receiver
    }

    pub fn delay(&self) -> SimTime {
        self.delay
    }

    /// Rejects messages this channel has no route for.
    pub fn check_route(&self, message: &TeleportationMessage) -> TeleportResult<()> {
        if message.receiver != self.receiver {
            return Err(TeleportError::Delivery {
                target: message.receiver.clone(),
                message: format!("channel {} only reaches {}", self.name, self.receiver),
            });
        }
        if message.sender != self.sender {
            return Err(TeleportError::Delivery {
                target: message.receiver.clone(),
                message: format!("channel {} carries traffic from {}, not {}", self.name, self.sender, message.sender),
            });
        }
        Ok(())
    }
}

/// Hands an arriving message to the receiver at the scheduler's current time.
pub fn hand_over<S>(receiver: &mut Receiver, message: TeleportationMessage, scheduler: &mut S) -> TeleportResult<()>
where
    S: Scheduler<Event = ProtocolEvent> + ?Sized,
{
    if &message.receiver != receiver.id() {
        return Err(TeleportError::Delivery {
            target: message.receiver.clone(),
            message: "no receiver with that name is attached".to_string(),
        });
    }
    receiver.on_message(message, scheduler)
}

/// A channel wired to a live receiver and the session's timeline.
///
/// Zero latency delivers synchronously in the same instant; otherwise a
/// `DeliverMessage` event is scheduled for `now + delay`.
pub struct ChannelTransport<'a, S: ?Sized> {
    channel: &'a ClassicalChannel,
    scheduler: &'a mut S,
    receiver: &'a mut Receiver,
}

impl<'a, S> ChannelTransport<'a, S>
where
    S: Scheduler<Event = ProtocolEvent> + ?Sized,
{
    pub fn new(channel: &'a ClassicalChannel, scheduler: &'a mut S, receiver: &'a mut Receiver) -> Self {
        Self { channel, scheduler, receiver }
    }
}

impl<S> Transport for ChannelTransport<'_, S>
where
    S: Scheduler<Event = ProtocolEvent> + ?Sized,
{
    fn deliver(&mut self, message: TeleportationMessage) -> TeleportResult<()> {
        self.channel.check_route(&message)?;
        if self.channel.delay().is_zero() {
            debug!(channel = self.channel.name(), "delivering in the same instant");
            hand_over(&mut *self.receiver, message, &mut *self.scheduler)
        } else {
            let arrives_at = self
                .scheduler
                .schedule_after(self.channel.delay(), ProtocolEvent::DeliverMessage(message))?;
            debug!(channel = self.channel.name(), %arrives_at, "message in flight");
            Ok(())
        }
    }
}
