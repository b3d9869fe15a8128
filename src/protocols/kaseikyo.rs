//! Panasonic/Kaseikyo decoder: 48 bits, 3456/1728 header.
//!
//! Arrival-order bytes: 16-bit vendor id, device, sub-device, function,
//! and a final XOR byte over bytes 2..4. A failed XOR flags parity_failed
//! but still delivers the code.

use super::{decode_frame, frame_bytes, FrameDecoder};
use crate::catalog::{self, Protocol};
use crate::code::IrCode;
use crate::pulse::PulseBuffer;

/// Panasonic's vendor id in arrival-order bytes.
const VENDOR_PANASONIC: [u8; 2] = [0x20, 0x02];

pub struct KaseikyoDecoder;

impl KaseikyoDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for KaseikyoDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::Panasonic
    }

    fn decode(&self, buf: &PulseBuffer) -> Option<IrCode> {
        let spec = catalog::spec_for(Protocol::Panasonic)?;
        let (data, bits) = decode_frame(buf, spec)?;
        let b = frame_bytes(data, bits);

        let mut code = IrCode::decoded(Protocol::Panasonic, data, bits);
        code.address = b[2].reverse_bits() as u16 | (b[3].reverse_bits() as u16) << 8;
        code.command = b[4].reverse_bits() as u16;
        if b[0] != VENDOR_PANASONIC[0] || b[1] != VENDOR_PANASONIC[1] {
            // Other Kaseikyo vendors ride the same framing.
            code.flags.extra_info = true;
        }
        if b[5] != b[2] ^ b[3] ^ b[4] {
            code.flags.parity_failed = true;
            tracing::warn!("Kaseikyo frame 0x{data:012X} failed its XOR check");
        }
        Some(code)
    }
}

impl Default for KaseikyoDecoder {
    fn default() -> Self {
        Self::new()
    }
}
