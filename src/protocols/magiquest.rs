//! MagiQuest wand decoder: 56 bits, headerless pulse width.
//!
//! Marks of 576 (one) or 288 (zero) with the space filling each symbol to a
//! constant period. Eight zero bits of padding, a 31-bit wand id, a 9-bit
//! magnitude, and an 8-bit checksum nobody verifies.

use super::{decode_frame, FrameDecoder};
use crate::catalog::{self, Protocol};
use crate::code::IrCode;
use crate::pulse::PulseBuffer;

pub struct MagiQuestDecoder;

impl MagiQuestDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for MagiQuestDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::MagiQuest
    }

    fn decode(&self, buf: &PulseBuffer) -> Option<IrCode> {
        let spec = catalog::spec_for(Protocol::MagiQuest)?;
        let (data, bits) = decode_frame(buf, spec)?;
        // Wands pad the top byte with zeros; anything else is noise that
        // happened to have the right length.
        if (data >> 48) & 0xFF != 0 {
            return None;
        }
        let mut code = IrCode::decoded(Protocol::MagiQuest, data, bits);
        code.flags.msb_first = true;
        code.command = ((data >> 8) & 0x1FF) as u16; // swing magnitude
        Some(code)
    }
}

impl Default for MagiQuestDecoder {
    fn default() -> Self {
        Self::new()
    }
}
