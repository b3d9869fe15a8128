//! BoseWave decoder: 16 bits, 1060/1425 header, pulse distance.
//!
//! One command byte followed by its inverse, LSB-first on the wire. A
//! broken inverse flags parity_failed but still delivers.

use super::{decode_frame, frame_bytes, FrameDecoder};
use crate::catalog::{self, Protocol};
use crate::code::IrCode;
use crate::pulse::PulseBuffer;

pub struct BoseWaveDecoder;

impl BoseWaveDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for BoseWaveDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::BoseWave
    }

    fn decode(&self, buf: &PulseBuffer) -> Option<IrCode> {
        let spec = catalog::spec_for(Protocol::BoseWave)?;
        let (data, bits) = decode_frame(buf, spec)?;
        let b = frame_bytes(data, bits);
        let mut code = IrCode::decoded(Protocol::BoseWave, data, bits);
        code.command = b[0].reverse_bits() as u16;
        if b[1] != !b[0] {
            code.flags.parity_failed = true;
            tracing::warn!("BoseWave frame 0x{data:04X} failed its inverse-byte check");
        }
        Some(code)
    }
}

impl Default for BoseWaveDecoder {
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
        let buf = synthesize_frame(&catalog::BOSE_WAVE, 0x4DB2, 16);
        let code = BoseWaveDecoder::new().decode(&buf).unwrap();
        assert_eq!(code.protocol, Protocol::BoseWave);
        assert!(!code.flags.parity_failed);
    }

    #[test]
    fn broken_inverse_flags_parity() {
        let buf = synthesize_frame(&catalog::BOSE_WAVE, 0x4D4D, 16);
        let code = BoseWaveDecoder::new().decode(&buf).unwrap();
        assert!(code.flags.parity_failed);
    }
}
