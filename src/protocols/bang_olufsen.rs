//! Bang & Olufsen decoder: 16 bits on a 455 kHz carrier.
//!
//! Datalink framing reduced to its pulse-distance core: short 200 us marks,
//! a 200/3125 header, spaces of 1562 (zero) or 4687 (one). The same-as-
//! previous space of the full datalink coding is not produced by this
//! decoder; remotes that use it re-learn as Raw.

use super::{decode_frame, FrameDecoder};
use crate::catalog::{self, Protocol};
use crate::code::IrCode;
use crate::pulse::PulseBuffer;

pub struct BangOlufsenDecoder;

impl BangOlufsenDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for BangOlufsenDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::BangOlufsen
    }

    fn decode(&self, buf: &PulseBuffer) -> Option<IrCode> {
        let spec = catalog::spec_for(Protocol::BangOlufsen)?;
        let (data, bits) = decode_frame(buf, spec)?;
        let mut code = IrCode::decoded(Protocol::BangOlufsen, data, bits);
        code.flags.msb_first = true;
        code.address = ((data >> 8) & 0xFF) as u16;
        code.command = (data & 0xFF) as u16;
        Some(code)
    }
}

impl Default for BangOlufsenDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::synthesize_frame;

    #[test]
    fn datalink_frame_decodes_at_455khz() {
        let buf = synthesize_frame(&catalog::BANG_OLUFSEN, 0x1642, 16);
        let code = BangOlufsenDecoder::new().decode(&buf).unwrap();
        assert_eq!(code.protocol, Protocol::BangOlufsen);
        assert_eq!(code.effective_carrier_hz(), 455_000);
        assert_eq!(code.address, 0x16);
        assert_eq!(code.command, 0x42);
    }
}
