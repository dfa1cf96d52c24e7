//! Reassembly of command responses that the server splits over several packets.
//!
//! The protocol has no "more data follows" marker. The default strategy sends
//! an empty probe packet whenever a fragment is large enough that another one
//! may follow; the server answers requests in order, so the probe's echo marks
//! the end of the response. The idle-gap strategy instead waits for a quiet
//! period on the socket.

use std::time::Duration;

use crate::{
    common::{ID_AUTH_FAILED, ID_TERM, MIN_PACKET_SIZE, MULTI_PACKET_THRESHOLD, SERVERDATA_RESPONSE_VALUE},
    errors::RconError,
    packet::Packet,
};

/// What the session should do after a packet has been handed to a [`Reassembly`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Step {
    /// Keep reading.
    Pending,
    /// Send a termination probe, then keep reading.
    Probe,
    /// The response is complete.
    Complete,
}

/// Accumulates the packets of one command response.
pub trait Reassembly: Send {
    fn accept(&mut self, packet: &Packet) -> Result<Step, RconError>;

    /// Quiet period after which [`Reassembly::on_idle`] is consulted. `None`
    /// means reads only end with the session timeout.
    fn idle_window(&self) -> Option<Duration> {
        None
    }

    fn on_idle(&mut self) -> Step {
        Step::Complete
    }

    /// Consumes the aggregator and decodes the collected body bytes.
    fn finish(self: Box<Self>) -> Result<String, RconError>;
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum ResponseStrategy {
    #[default]
    TerminationProbe,
    IdleGap(Duration),
}

impl ResponseStrategy {
    pub fn aggregator(&self, command_id: i32) -> Box<dyn Reassembly> {
        match *self {
            ResponseStrategy::TerminationProbe => Box::new(ProbeAggregator::new(command_id)),
            ResponseStrategy::IdleGap(window) => Box::new(IdleGapAggregator::new(command_id, window)),
        }
    }
}

fn validate(packet: &Packet) -> Result<(), RconError> {
    if packet.size() < MIN_PACKET_SIZE {
        return Err(RconError::MalformedPacket(format!("declared size {} is below {}", packet.size(), MIN_PACKET_SIZE)));
    }
    if packet.id() == ID_AUTH_FAILED {
        return Err(RconError::AuthenticationFailed);
    }
    Ok(())
}

#[derive(Debug)]
pub struct ProbeAggregator {
    command_id: i32,
    buffer: Vec<u8>,
    pending_probes: usize,
}

impl ProbeAggregator {
    pub fn new(command_id: i32) -> Self {
        Self { command_id, buffer: Vec::new(), pending_probes: 0 }
    }
}

impl Reassembly for ProbeAggregator {
    fn accept(&mut self, packet: &Packet) -> Result<Step, RconError> {
        validate(packet)?;

        if packet.id() == ID_TERM {
            if self.pending_probes == 0 {
                log::debug!("Discarding probe echo with no probe outstanding: {:?}", packet);
                return Ok(Step::Pending);
            }
            self.pending_probes -= 1;
            return Ok(if self.pending_probes == 0 { Step::Complete } else { Step::Pending });
        }

        if packet.kind() != SERVERDATA_RESPONSE_VALUE || packet.id() != self.command_id {
            log::debug!("Received packet with id {} while waiting for command {}, ignoring", packet.id(), self.command_id);
            return Ok(Step::Pending);
        }

        self.buffer.extend_from_slice(packet.body());

        if packet.size() > MULTI_PACKET_THRESHOLD {
            self.pending_probes += 1;
            Ok(Step::Probe)
        } else if self.pending_probes == 0 {
            Ok(Step::Complete)
        } else {
            Ok(Step::Pending)
        }
    }

    fn finish(self: Box<Self>) -> Result<String, RconError> {
        Ok(String::from_utf8(self.buffer)?)
    }
}

#[derive(Debug)]
pub struct IdleGapAggregator {
    command_id: i32,
    buffer: Vec<u8>,
    window: Duration,
}

impl IdleGapAggregator {
    pub fn new(command_id: i32, window: Duration) -> Self {
        Self { command_id, buffer: Vec::new(), window }
    }
}

impl Reassembly for IdleGapAggregator {
    fn accept(&mut self, packet: &Packet) -> Result<Step, RconError> {
        validate(packet)?;

        if packet.kind() == SERVERDATA_RESPONSE_VALUE && packet.id() == self.command_id {
            self.buffer.extend_from_slice(packet.body());
        } else {
            log::debug!("Received packet with id {} while waiting for command {}, ignoring", packet.id(), self.command_id);
        }
        Ok(Step::Pending)
    }

    fn idle_window(&self) -> Option<Duration> {
        Some(self.window)
    }

    fn finish(self: Box<Self>) -> Result<String, RconError> {
        Ok(String::from_utf8(self.buffer)?)
    }
}
