//! Whynter decoder: 32 bits, 2850/2850 header, pulse distance.

use super::{decode_frame, FrameDecoder};
use crate::catalog::{self, Protocol};
use crate::code::IrCode;
use crate::pulse::PulseBuffer;

pub struct WhynterDecoder;

impl WhynterDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for WhynterDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::Whynter
    }

    fn decode(&self, buf: &PulseBuffer) -> Option<IrCode> {
        let spec = catalog::spec_for(Protocol::Whynter)?;
        let (data, bits) = decode_frame(buf, spec)?;
        let mut code = IrCode::decoded(Protocol::Whynter, data, bits);
        code.flags.msb_first = true;
        Some(code)
    }
}

impl Default for WhynterDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::synthesize_frame;

    #[test]
    fn thirty_two_bit_frame_round_trips() {
        let buf = synthesize_frame(&catalog::WHYNTER, 0x1234_ABCD, 32);
        let code = WhynterDecoder::new().decode(&buf).unwrap();
        assert_eq!(code.protocol, Protocol::Whynter);
        assert_eq!(code.data, 0x1234_ABCD);
        assert_eq!(code.bits, 32);
    }
}
