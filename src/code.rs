//! The ir-code artifact: what a decoder produces and an encoder consumes.

use serde::{Deserialize, Serialize};

use crate::catalog::{spec_for, Protocol};
use crate::pulse::PulseBuffer;

/// Default emitter duty cycle, percent.
pub const DEFAULT_DUTY_PCT: u8 = 33;

/// Fallback carrier when neither the code nor the catalogue knows one.
pub const DEFAULT_CARRIER_HZ: u32 = 38_000;

/// Flag bitset carried by every code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFlags {
    /// This frame is an abbreviated hold-repeat (NEC 9000/2250).
    #[serde(default)]
    pub repeat: bool,
    /// Protocol re-sends the full frame on hold (Denon inverted pair, Sony).
    #[serde(default)]
    pub auto_repeat: bool,
    /// A protocol checksum did not verify; the code is still delivered.
    #[serde(default)]
    pub parity_failed: bool,
    /// RC5/RC6 toggle bit state.
    #[serde(default)]
    pub toggle: bool,
    /// Decoder stashed protocol-specific extra information (RC6 mode bits).
    #[serde(default)]
    pub extra_info: bool,
    /// NEC frame used the 16-bit extended address form.
    #[serde(default)]
    pub extended_address: bool,
    /// The receive queue overflowed before this code was accepted.
    #[serde(default)]
    pub overflow: bool,
    /// Stored data word is wire-order MSB-first.
    #[serde(default)]
    pub msb_first: bool,
}

/// Learn-verification metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyMeta {
    /// Consecutive agreeing frames observed (3 = commercial grade, 2 = minimum).
    #[serde(default)]
    pub frames_matched: u8,
    #[serde(default)]
    pub noise_filtered: bool,
    #[serde(default)]
    pub gap_trimmed: bool,
    #[serde(default)]
    pub carrier_detected: bool,
}

/// A learned or decoded IR code.
///
/// When `protocol` is [`Protocol::Raw`] the raw buffer is present and
/// non-empty and `data` has no meaning. Short-frame protocols carry no raw
/// buffer; long AC frames may carry one produced by their encoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IrCode {
    pub protocol: Protocol,
    /// Packed data word, up to 64 bits, first-received bit in the MSB.
    pub data: u64,
    pub bits: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<PulseBuffer>,
    /// Semantic device address where the protocol exposes one.
    #[serde(default)]
    pub address: u16,
    /// Semantic command where the protocol exposes one.
    #[serde(default)]
    pub command: u16,
    #[serde(default)]
    pub flags: CodeFlags,
    /// Carrier in Hz; 0 = look up the catalogue.
    #[serde(default)]
    pub carrier_hz: u32,
    #[serde(default)]
    pub duty_pct: u8,
    #[serde(default)]
    pub verify: VerifyMeta,
}

impl IrCode {
    /// A decoded fixed-protocol code with catalogue carrier.
    pub fn decoded(protocol: Protocol, data: u64, bits: u16) -> Self {
        Self {
            protocol,
            data,
            bits,
            carrier_hz: spec_for(protocol).map_or(0, |s| s.carrier_khz as u32 * 1000),
            duty_pct: DEFAULT_DUTY_PCT,
            ..Self::default()
        }
    }

    /// A raw capture. Caller guarantees the buffer is non-empty.
    pub fn raw(buf: PulseBuffer) -> Self {
        debug_assert!(!buf.is_empty());
        Self {
            protocol: Protocol::Raw,
            bits: buf.len() as u16,
            raw: Some(buf),
            carrier_hz: DEFAULT_CARRIER_HZ,
            duty_pct: DEFAULT_DUTY_PCT,
            ..Self::default()
        }
    }

    pub fn is_raw(&self) -> bool {
        self.protocol == Protocol::Raw
    }

    /// Carrier resolution order: the code's own field, the catalogue, 38 kHz.
    pub fn effective_carrier_hz(&self) -> u32 {
        if self.carrier_hz != 0 {
            return self.carrier_hz;
        }
        spec_for(self.protocol)
            .map(|s| s.carrier_khz as u32 * 1000)
            .unwrap_or(DEFAULT_CARRIER_HZ)
    }

    pub fn effective_duty_pct(&self) -> u8 {
        if self.duty_pct != 0 {
            self.duty_pct
        } else {
            DEFAULT_DUTY_PCT
        }
    }

    /// Data word as zero-padded hex, sized to the bit count.
    pub fn data_hex(&self) -> String {
        if self.bits == 0 {
            return "-".to_string();
        }
        let nibbles = (self.bits as usize + 3) / 4;
        format!("{:0width$X}", self.data, width = nibbles)
    }

    /// Agreement check used by learn verification: identity of the symbolic
    /// triple for fixed codes; handled separately for raw codes.
    pub fn same_symbol(&self, other: &IrCode) -> bool {
        self.protocol == other.protocol && self.data == other.data && self.bits == other.bits
    }

    /// One-line description for logs.
    pub fn describe(&self) -> String {
        match self.protocol {
            Protocol::Raw => format!(
                "Raw ({} pairs, {} Hz)",
                self.raw.as_ref().map_or(0, |r| r.len()),
                self.effective_carrier_hz()
            ),
            _ => format!(
                "{} 0x{} ({} bits, addr 0x{:02X}, cmd 0x{:02X})",
                self.protocol.name(),
                self.data_hex(),
                self.bits,
                self.address,
                self.command
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pulse::PulsePair;

    #[test]
    fn carrier_resolution_falls_back_in_order() {
        let mut code = IrCode::decoded(Protocol::Sony, 0x123, 12);
        assert_eq!(code.effective_carrier_hz(), 40_000);
        code.carrier_hz = 0;
        assert_eq!(code.effective_carrier_hz(), 40_000); // catalogue
        code.protocol = Protocol::Raw;
        assert_eq!(code.effective_carrier_hz(), 38_000); // default
    }

    #[test]
    fn raw_codes_own_their_buffer() {
        let buf = PulseBuffer::from_pairs(vec![PulsePair::new(500, 500); 12]);
        let code = IrCode::raw(buf.clone());
        assert!(code.is_raw());
        assert_eq!(code.raw.as_ref().unwrap(), &buf);
        assert_eq!(code.bits, 12);
    }

    #[test]
    fn data_hex_pads_to_bit_width() {
        let code = IrCode::decoded(Protocol::Nec, 0x00FF_E01F, 32);
        assert_eq!(code.data_hex(), "00FFE01F");
        let short = IrCode::decoded(Protocol::Sony, 0x1, 12);
        assert_eq!(short.data_hex(), "001");
    }

    #[test]
    fn serde_round_trip_preserves_every_field() {
        let mut code = IrCode::decoded(Protocol::Nec, 0x00FF_E01F, 32);
        code.address = 0x00;
        code.command = 0x07;
        code.flags.extended_address = true;
        code.verify.frames_matched = 3;
        let json = serde_json::to_vec(&code).unwrap();
        let back: IrCode = serde_json::from_slice(&json).unwrap();
        assert_eq!(back, code);
    }
}
