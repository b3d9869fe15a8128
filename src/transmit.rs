//! Transmitter: carrier selection, per-protocol emitters, raw replay.
//!
//! The pulse sink is the hardware boundary: it takes a carrier
//! configuration (Hz + duty fraction, active-high) and pulse buffers, and
//! its `send` blocks until the hardware signals completion or its 1 second
//! watchdog expires. Concurrent transmissions are not supported; callers
//! serialise.

use std::time::Duration;

use crate::catalog::{self, Protocol};
use crate::code::IrCode;
use crate::error::{Error, Result};
use crate::protocols::synthesize_frame;
use crate::pulse::PulseBuffer;

/// How long a sink may block in `send` before reporting a fault.
pub const TX_WATCHDOG: Duration = Duration::from_secs(1);

/// Fallback hold-repeat period when the catalogue has none.
pub const DEFAULT_REPEAT_PERIOD_MS: u32 = 110;

/// Hardware output boundary. Carrier polarity is active-high by contract.
pub trait PulseSink: Send {
    /// Configure carrier frequency (Hz) and duty cycle fraction in [0, 1].
    fn set_carrier(&mut self, freq_hz: u32, duty: f32) -> Result<()>;

    /// Emit the buffer, blocking until hardware completion or the watchdog.
    fn send(&mut self, buf: &PulseBuffer) -> Result<()>;
}

/// Protocol-aware emitter.
pub struct Transmitter;

impl Transmitter {
    pub fn new() -> Self {
        Self
    }

    /// Carrier -> encode -> send. The carrier comes from the code's field,
    /// else the catalogue, else 38 kHz.
    pub fn transmit(&self, sink: &mut dyn PulseSink, code: &IrCode) -> Result<()> {
        let carrier = code.effective_carrier_hz();
        let duty = code.effective_duty_pct() as f32 / 100.0;
        sink.set_carrier(carrier, duty)?;

        let buf = self.encode(code)?;
        tracing::debug!(
            "transmitting {} ({} pairs at {} Hz)",
            code.describe(),
            buf.len(),
            carrier
        );
        sink.send(&buf)
    }

    /// Symbol emission for a code. Codes that carry a raw buffer (Raw
    /// captures and AC encoder output) replay it verbatim.
    pub fn encode(&self, code: &IrCode) -> Result<PulseBuffer> {
        if let Some(raw) = &code.raw {
            if raw.is_empty() {
                return Err(Error::invalid("raw code with empty buffer"));
            }
            return Ok(raw.clone());
        }

        match code.protocol {
            Protocol::Raw => Err(Error::invalid("raw code without buffer")),
            Protocol::Unknown => Err(Error::unsupported("cannot encode Unknown protocol")),
            Protocol::Nec | Protocol::Apple | Protocol::Onkyo => {
                Ok(synthesize_frame(&catalog::NEC, code.data, code.bits))
            }
            Protocol::Samsung | Protocol::SamsungLg => {
                Ok(synthesize_frame(&catalog::SAMSUNG, code.data, code.bits))
            }
            Protocol::Samsung48 => Ok(synthesize_frame(&catalog::SAMSUNG48, code.data, code.bits)),
            // Compatibility fallback: every other decoded protocol replays
            // its packed word through the NEC emitter at its own carrier.
            _ => Ok(synthesize_frame(&catalog::NEC, code.data, code.bits)),
        }
    }

    /// Hold-repeat cadence for a protocol.
    pub fn repeat_period_ms(protocol: Protocol) -> u32 {
        catalog::spec_for(protocol)
            .map(|s| s.repeat_period_ms)
            .filter(|&ms| ms > 0)
            .unwrap_or(DEFAULT_REPEAT_PERIOD_MS)
    }
}

impl Default for Transmitter {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory sink: records carrier requests and emitted buffers. Stands in
/// for the PWM driver in tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub carriers: Vec<(u32, f32)>,
    pub sent: Vec<PulseBuffer>,
    /// When set, `send` reports this fault instead of recording.
    pub fail_with: Option<&'static str>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PulseSink for RecordingSink {
    fn set_carrier(&mut self, freq_hz: u32, duty: f32) -> Result<()> {
        self.carriers.push((freq_hz, duty));
        Ok(())
    }

    fn send(&mut self, buf: &PulseBuffer) -> Result<()> {
        if let Some(msg) = self.fail_with {
            return Err(Error::HardwareFault(msg.to_string()));
        }
        self.sent.push(buf.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pulse::PulsePair;

    #[test]
    fn carrier_requests_follow_the_codes() {
        let mut sink = RecordingSink::new();
        let tx = Transmitter::new();
        tx.transmit(&mut sink, &IrCode::decoded(Protocol::Sony, 0xA90, 12))
            .unwrap();
        tx.transmit(&mut sink, &IrCode::decoded(Protocol::Nec, 0x00FF_E01F, 32))
            .unwrap();
        let hz: Vec<u32> = sink.carriers.iter().map(|c| c.0).collect();
        assert_eq!(hz, vec![40_000, 38_000]);
        assert_eq!(sink.sent.len(), 2);
    }

    #[test]
    fn nec_frame_has_header_stop_and_32_bit_pairs() {
        let buf = Transmitter::new()
            .encode(&IrCode::decoded(Protocol::Nec, 0x00FF_E01F, 32))
            .unwrap();
        assert_eq!(buf.len(), 1 + 32 + 1);
        assert_eq!(buf[0], PulsePair::new(9000, 4500));
        assert_eq!(buf[33].mark_us, 560);
    }

    #[test]
    fn raw_codes_replay_verbatim() {
        let pairs = vec![PulsePair::new(700, 900); 14];
        let code = IrCode::raw(PulseBuffer::from_pairs(pairs.clone()));
        let buf = Transmitter::new().encode(&code).unwrap();
        assert_eq!(buf.as_slice(), pairs.as_slice());
    }

    #[test]
    fn undecodable_codes_are_refused() {
        let tx = Transmitter::new();
        assert!(matches!(
            tx.encode(&IrCode::decoded(Protocol::Unknown, 0, 0)),
            Err(Error::Unsupported(_))
        ));
        let broken = IrCode {
            protocol: Protocol::Raw,
            ..IrCode::default()
        };
        assert!(tx.encode(&broken).is_err());
    }

    #[test]
    fn sink_faults_propagate() {
        let mut sink = RecordingSink {
            fail_with: Some("no completion signal"),
            ..RecordingSink::new()
        };
        let err = Transmitter::new()
            .transmit(&mut sink, &IrCode::decoded(Protocol::Nec, 0x1, 32))
            .unwrap_err();
        assert!(matches!(err, Error::HardwareFault(_)));
    }

    #[test]
    fn repeat_period_prefers_the_catalogue() {
        assert_eq!(Transmitter::repeat_period_ms(Protocol::Sony), 45);
        assert_eq!(Transmitter::repeat_period_ms(Protocol::Raw), 110);
    }
}
