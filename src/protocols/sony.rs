//! Sony SIRC decoder: 12, 15, or 20 bits, pulse-width encoded.
//!
//! 2400/600 header, marks of 1200 (one) or 600 (zero) with a constant
//! 600 us space, no stop mark. Seven command bits arrive first, LSB-first,
//! then the 5/8/13 address bits. Carrier is 40 kHz.

use super::{decode_frame, FrameDecoder};
use crate::catalog::{self, Protocol};
use crate::code::IrCode;
use crate::pulse::PulseBuffer;

/// Value of an LSB-first wire field: `first` is the arrival index of the
/// field's least significant bit inside the packed word.
fn field_lsb(data: u64, total: u16, first: u16, len: u16) -> u16 {
    let mut v = 0u16;
    for i in 0..len {
        let bit = (data >> (total - 1 - (first + i))) & 1;
        v |= (bit as u16) << i;
    }
    v
}

pub struct SonyDecoder;

impl SonyDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for SonyDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::Sony
    }

    fn decode(&self, buf: &PulseBuffer) -> Option<IrCode> {
        let spec = catalog::spec_for(Protocol::Sony)?;
        let (data, bits) = decode_frame(buf, spec)?;
        if !matches!(bits, 12 | 15 | 20) {
            return None;
        }
        let mut code = IrCode::decoded(Protocol::Sony, data, bits);
        code.command = field_lsb(data, bits, 0, 7);
        code.address = field_lsb(data, bits, 7, bits - 7);
        // SIRC remotes always send each press at least three times.
        code.flags.auto_repeat = true;
        Some(code)
    }
}

impl Default for SonyDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::synthesize_frame;

    #[test]
    fn twelve_bit_frame_decodes_at_40khz() {
        let buf = synthesize_frame(&catalog::SONY, 0xA90, 12);
        let code = SonyDecoder::new().decode(&buf).unwrap();
        assert_eq!(code.protocol, Protocol::Sony);
        assert_eq!(code.bits, 12);
        assert_eq!(code.data, 0xA90);
        assert_eq!(code.effective_carrier_hz(), 40_000);
    }

    #[test]
    fn fifteen_and_twenty_bit_variants_decode() {
        for bits in [15u16, 20] {
            let data = 0x5A5A & ((1u64 << bits) - 1);
            let buf = synthesize_frame(&catalog::SONY, data, bits);
            let code = SonyDecoder::new().decode(&buf).unwrap();
            assert_eq!(code.bits, bits);
            assert_eq!(code.data, data);
        }
    }

    #[test]
    fn odd_bit_counts_are_refused() {
        let buf = synthesize_frame(&catalog::SONY, 0x1FF, 13);
        assert!(SonyDecoder::new().decode(&buf).is_none());
    }

    #[test]
    fn command_field_is_lsb_first_off_the_wire() {
        // Command 1 on the wire: first bit one, six zeros.
        let data = 0b1000000_00001u64; // cmd bits then 5 address bits
        let buf = synthesize_frame(&catalog::SONY, data, 12);
        let code = SonyDecoder::new().decode(&buf).unwrap();
        assert_eq!(code.command, 1);
    }
}
