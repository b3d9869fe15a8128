//! Samsung family: Samsung 32-bit, the SamsungLG variant, Samsung48.
//!
//! 4500/4500 header, NEC bit timings. The 32-bit frame repeats the address
//! byte and pairs the command with its inverse; when the command pair is not
//! inverse the frame is the SamsungLG form, which defines no inverse byte.

use super::{decode_frame, frame_bytes, FrameDecoder};
use crate::catalog::{self, Protocol};
use crate::code::IrCode;
use crate::pulse::PulseBuffer;

pub struct SamsungDecoder;

impl SamsungDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for SamsungDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::Samsung
    }

    fn decode(&self, buf: &PulseBuffer) -> Option<IrCode> {
        let spec = catalog::spec_for(Protocol::Samsung)?;
        let (data, bits) = decode_frame(buf, spec)?;
        let b = frame_bytes(data, bits);

        let mut code = IrCode::decoded(Protocol::Samsung, data, bits);
        code.address = b[0].reverse_bits() as u16;
        code.command = b[2].reverse_bits() as u16;
        if b[3] != !b[2] {
            code.protocol = Protocol::SamsungLg;
            code.command = b[2].reverse_bits() as u16 | (b[3].reverse_bits() as u16) << 8;
        }
        Some(code)
    }
}

impl Default for SamsungDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// 48-bit Samsung frame: same header and bit timings, 16-bit address then a
/// 32-bit payload. Also the shape the Samsung48 AC profile emits.
pub struct Samsung48Decoder;

impl Samsung48Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for Samsung48Decoder {
    fn protocol(&self) -> Protocol {
        Protocol::Samsung48
    }

    fn decode(&self, buf: &PulseBuffer) -> Option<IrCode> {
        let spec = catalog::spec_for(Protocol::Samsung48)?;
        let (data, bits) = decode_frame(buf, spec)?;
        let b = frame_bytes(data, bits);
        let mut code = IrCode::decoded(Protocol::Samsung48, data, bits);
        code.address = b[0].reverse_bits() as u16 | (b[1].reverse_bits() as u16) << 8;
        code.command = b[2].reverse_bits() as u16;
        Some(code)
    }
}

impl Default for Samsung48Decoder {
    fn default() -> Self {
        Self::new()
    }
}
