//! JVC decoder: 16 bits, 8400/4200 header, pulse distance.
//!
//! Eight address bits then eight command bits, LSB-first on the wire.
//! Holds repeat the data block without the header; only headered frames are
//! accepted here, the repeat block is below the length gate.

use super::{decode_frame, frame_bytes, FrameDecoder};
use crate::catalog::{self, Protocol};
use crate::code::IrCode;
use crate::pulse::PulseBuffer;

pub struct JvcDecoder;

impl JvcDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for JvcDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::Jvc
    }

    fn decode(&self, buf: &PulseBuffer) -> Option<IrCode> {
        let spec = catalog::spec_for(Protocol::Jvc)?;
        let (data, bits) = decode_frame(buf, spec)?;
        let b = frame_bytes(data, bits);
        let mut code = IrCode::decoded(Protocol::Jvc, data, bits);
        code.address = b[0].reverse_bits() as u16;
        code.command = b[1].reverse_bits() as u16;
        Some(code)
    }
}

impl Default for JvcDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::synthesize_frame;

    #[test]
    fn sixteen_bit_frame_decodes() {
        let buf = synthesize_frame(&catalog::JVC, 0xC2B8, 16);
        let code = JvcDecoder::new().decode(&buf).unwrap();
        assert_eq!(code.protocol, Protocol::Jvc);
        assert_eq!(code.data, 0xC2B8);
        assert_eq!(code.address, 0xC2u8.reverse_bits() as u16);
        assert_eq!(code.command, 0xB8u8.reverse_bits() as u16);
    }

    #[test]
    fn headerless_repeat_block_is_refused() {
        let mut buf = synthesize_frame(&catalog::JVC, 0xC2B8, 16);
        buf.pairs_mut().remove(0);
        assert!(JvcDecoder::new().decode(&buf).is_none());
    }
}
