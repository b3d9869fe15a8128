//! NEC family decoder: NEC, NEC extended-address, Apple, Onkyo.
//!
//! Frame: 9000/4500 header, 32 pulse-distance bits, 560 stop mark. Wire
//! order is LSB-first per byte; the packed word keeps arrival order, so the
//! classic example frame reads 0x00FFE01F (address 0x00, inverse 0xFF,
//! command byte 0xE0, inverse 0x1F).
//!
//! Byte-pair validation decides the label:
//! - both pairs inverse        -> NEC
//! - address pair not inverse  -> NEC with extended 16-bit address
//! - neither pair inverse      -> Onkyo (16-bit address + 16-bit command)
//! - address inverse, command not -> rejected (stray or corrupt frame)
//!
//! Apple frames carry the 0x87EE vendor prefix and are matched before the
//! inverse rules. The abbreviated 9000/2250 hold-repeat decodes to a code
//! with the repeat flag; gating it to 200 ms since the last full frame is
//! the orchestrator's transition.

use super::{decode_frame, frame_bytes, FrameDecoder};
use crate::catalog::{self, Protocol};
use crate::code::IrCode;
use crate::pulse::{PulseBuffer, TOLERANCE_PCT};

/// Space of the abbreviated hold-repeat frame.
const REPEAT_SPACE: u32 = 2250;

/// A repeat qualifies only within this window after a full frame.
pub const NEC_REPEAT_GATE_MS: u64 = 200;

/// Apple's vendor prefix in arrival-order bytes.
const APPLE_VENDOR: [u8; 2] = [0x87, 0xEE];

/// True when the buffer is the abbreviated NEC hold-repeat: a 9000/2250
/// header pair, optionally followed by the stop mark, nothing else.
pub fn is_nec_repeat(buf: &PulseBuffer) -> bool {
    let spec = &catalog::NEC;
    if buf.is_empty() || buf.len() > 2 {
        return false;
    }
    let h = buf[0];
    if !h.match_mark(spec.header_mark, TOLERANCE_PCT) || !h.match_space(REPEAT_SPACE, TOLERANCE_PCT)
    {
        return false;
    }
    buf.len() == 1 || buf[1].match_mark(spec.bit_mark, TOLERANCE_PCT)
}

pub struct NecDecoder;

impl NecDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for NecDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::Nec
    }

    fn decode(&self, buf: &PulseBuffer) -> Option<IrCode> {
        if is_nec_repeat(buf) {
            let mut code = IrCode::decoded(Protocol::Nec, 0, 0);
            code.flags.repeat = true;
            return Some(code);
        }

        let spec = catalog::spec_for(Protocol::Nec)?;
        let (data, bits) = decode_frame(buf, spec)?;
        let b = frame_bytes(data, bits);
        let (addr, addr_inv, cmd, cmd_inv) = (b[0], b[1], b[2], b[3]);

        let addr_paired = addr_inv == !addr;
        let cmd_paired = cmd_inv == !cmd;

        let mut code = IrCode::decoded(Protocol::Nec, data, bits);
        if b[0] == APPLE_VENDOR[0] && b[1] == APPLE_VENDOR[1] {
            code.protocol = Protocol::Apple;
            code.carrier_hz = spec.carrier_khz as u32 * 1000;
            code.address = u16::from_be_bytes(APPLE_VENDOR);
            code.command = cmd.reverse_bits() as u16;
            return Some(code);
        }

        if cmd_paired {
            code.command = cmd.reverse_bits() as u16;
            if addr_paired {
                code.address = addr.reverse_bits() as u16;
            } else {
                // Extended form: 16-bit address, low byte first on the wire.
                code.flags.extended_address = true;
                code.address =
                    addr.reverse_bits() as u16 | (addr_inv.reverse_bits() as u16) << 8;
            }
            return Some(code);
        }

        if !addr_paired {
            // Neither pair inverse: Onkyo's 16-bit address + 16-bit command.
            code.protocol = Protocol::Onkyo;
            code.address = addr.reverse_bits() as u16 | (addr_inv.reverse_bits() as u16) << 8;
            code.command = cmd.reverse_bits() as u16 | (cmd_inv.reverse_bits() as u16) << 8;
            return Some(code);
        }

        // Plain address pair with a broken command pair: corrupt frame.
        tracing::debug!("NEC frame 0x{data:08X} failed the inverse-command check");
        None
    }
}

impl Default for NecDecoder {
    fn default() -> Self {
        Self::new()
    }
}
