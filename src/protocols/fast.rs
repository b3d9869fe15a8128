//! FAST decoder: 16 bits, headerless pulse distance.
//!
//! A command byte and its inverse, LSB-first, with tight 215/891/313
//! timings for low-latency links. Broken inverse flags parity_failed.

use super::{decode_frame, frame_bytes, FrameDecoder};
use crate::catalog::{self, Protocol};
use crate::code::IrCode;
use crate::pulse::PulseBuffer;

pub struct FastDecoder;

impl FastDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for FastDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::Fast
    }

    fn decode(&self, buf: &PulseBuffer) -> Option<IrCode> {
        let spec = catalog::spec_for(Protocol::Fast)?;
        let (data, bits) = decode_frame(buf, spec)?;
        let b = frame_bytes(data, bits);
        let mut code = IrCode::decoded(Protocol::Fast, data, bits);
        code.command = b[0].reverse_bits() as u16;
        if b[1] != !b[0] {
            code.flags.parity_failed = true;
            tracing::warn!("FAST frame 0x{data:04X} failed its inverse-byte check");
        }
        Some(code)
    }
}

impl Default for FastDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::synthesize_frame;

    #[test]
    fn inverse_pair_decodes_clean() {
        let buf = synthesize_frame(&catalog::FAST, 0x2BD4, 16);
        let code = FastDecoder::new().decode(&buf).unwrap();
        assert_eq!(code.protocol, Protocol::Fast);
        assert_eq!(code.command, 0x2Bu8.reverse_bits() as u16);
        assert!(!code.flags.parity_failed);
    }
}
