//! Denon/Sharp decoder: 15 bits, headerless pulse distance.
//!
//! Five address bits, eight command bits, two frame bits, LSB-first on the
//! wire. Frame bits 00 mark the primary frame; a non-zero frame field is
//! the inverted re-send Sharp emits for every press, labelled Sharp with
//! the auto-repeat flag.

use super::{decode_frame, FrameDecoder};
use crate::catalog::{self, Protocol};
use crate::code::IrCode;
use crate::pulse::PulseBuffer;

fn field_lsb(data: u64, total: u16, first: u16, len: u16) -> u16 {
    let mut v = 0u16;
    for i in 0..len {
        v |= (((data >> (total - 1 - (first + i))) & 1) as u16) << i;
    }
    v
}

pub struct DenonDecoder;

impl DenonDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for DenonDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::Denon
    }

    fn decode(&self, buf: &PulseBuffer) -> Option<IrCode> {
        let spec = catalog::spec_for(Protocol::Denon)?;
        let (data, bits) = decode_frame(buf, spec)?;
        let frame_field = (data & 0x3) as u8;
        let protocol = if frame_field == 0 {
            Protocol::Denon
        } else {
            Protocol::Sharp
        };
        let mut code = IrCode::decoded(protocol, data, bits);
        code.address = field_lsb(data, bits, 0, 5);
        code.command = field_lsb(data, bits, 5, 8);
        code.flags.auto_repeat = frame_field != 0;
        Some(code)
    }
}

impl Default for DenonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::synthesize_frame;

    #[test]
    fn primary_frame_is_denon() {
        let buf = synthesize_frame(&catalog::DENON, 0x12A4, 15);
        let code = DenonDecoder::new().decode(&buf).unwrap();
        assert_eq!(code.protocol, Protocol::Denon);
        assert_eq!(code.data, 0x12A4);
        assert!(!code.flags.auto_repeat);
    }

    #[test]
    fn inverted_resend_is_sharp() {
        let buf = synthesize_frame(&catalog::DENON, 0x12A7, 15);
        let code = DenonDecoder::new().decode(&buf).unwrap();
        assert_eq!(code.protocol, Protocol::Sharp);
        assert!(code.flags.auto_repeat);
    }
}
