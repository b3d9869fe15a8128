//! LG decoder: 28 bits MSB-first, two header variants.
//!
//! The classic remote uses an 8000/4000 header, the LG2 form (also the AC
//! frame shape) 3200/9900. Layout: 8-bit address, 16-bit command, 4-bit
//! checksum = sum of the six data nibbles. A checksum mismatch flags
//! parity_failed but still delivers the code.

use super::{decode_frame, FrameDecoder};
use crate::catalog::{self, Protocol};
use crate::code::IrCode;
use crate::pulse::PulseBuffer;

/// Sum of the six data nibbles of a 28-bit LG word, truncated to 4 bits.
pub(crate) fn lg_nibble_sum(data: u64) -> u8 {
    let mut sum = 0u32;
    for i in 0..6 {
        sum += ((data >> (28 - 4 * (i + 1))) & 0xF) as u32;
    }
    (sum & 0xF) as u8
}

pub struct LgDecoder;

impl LgDecoder {
    pub fn new() -> Self {
        Self
    }

    fn finish(&self, protocol: Protocol, data: u64, bits: u16) -> IrCode {
        let mut code = IrCode::decoded(protocol, data, bits);
        code.flags.msb_first = true;
        code.address = ((data >> 20) & 0xFF) as u16;
        code.command = ((data >> 4) & 0xFFFF) as u16;
        if lg_nibble_sum(data) != (data & 0xF) as u8 {
            code.flags.parity_failed = true;
            tracing::warn!(
                "{} frame 0x{data:07X} failed its nibble-sum checksum",
                protocol.name()
            );
        }
        code
    }
}

impl FrameDecoder for LgDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::Lg
    }

    fn decode(&self, buf: &PulseBuffer) -> Option<IrCode> {
        if let Some((data, bits)) = decode_frame(buf, &catalog::LG) {
            return Some(self.finish(Protocol::Lg, data, bits));
        }
        if let Some((data, bits)) = decode_frame(buf, &catalog::LG2) {
            return Some(self.finish(Protocol::Lg2, data, bits));
        }
        None
    }
}

impl Default for LgDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::synthesize_frame;

    // Address 0x88, command 0xC005, checksum 8+8+C+0+0+5 = 0x21 -> 1.
    const WORD: u64 = 0x88C0051;

    #[test]
    fn classic_header_labels_lg() {
        let buf = synthesize_frame(&catalog::LG, WORD, 28);
        let code = LgDecoder::new().decode(&buf).unwrap();
        assert_eq!(code.protocol, Protocol::Lg);
        assert_eq!(code.address, 0x88);
        assert_eq!(code.command, 0xC005);
        assert!(!code.flags.parity_failed);
    }

    #[test]
    fn lg2_header_labels_lg2() {
        let buf = synthesize_frame(&catalog::LG2, WORD, 28);
        let code = LgDecoder::new().decode(&buf).unwrap();
        assert_eq!(code.protocol, Protocol::Lg2);
    }

    #[test]
    fn checksum_mismatch_flags_parity_and_still_delivers() {
        let buf = synthesize_frame(&catalog::LG, 0x88C0052, 28);
        let code = LgDecoder::new().decode(&buf).unwrap();
        assert!(code.flags.parity_failed);
        assert_eq!(code.data, 0x88C0052);
    }
}
