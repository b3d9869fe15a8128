//! RC5 biphase decoder: 14 bits at an 889 us half-bit unit.
//!
//! Every bit is two half-units; logic 1 is space-then-mark, logic 0 is
//! mark-then-space. The first half of the start bit merges with the idle
//! line, and trailing space halves merge with the inter-frame gap, so the
//! decode reconstructs the half stream from the pulse durations (one or two
//! units each) and pads both ends.
//!
//! Frame: S1 (always 1), S2 (inverted command bit 6 in extended RC5),
//! toggle, 5 address bits, 6 command bits, all MSB-first.

use super::FrameDecoder;
use crate::catalog::Protocol;
use crate::code::IrCode;
use crate::pulse::{matches_within, PulseBuffer, TOLERANCE_PCT};

const UNIT_US: u32 = 889;
const HALF_BITS: usize = 28;

/// Duration as a whole number of half-bit units (1 or 2), or None.
fn units(duration_us: u32, unit: u32) -> Option<usize> {
    let n = ((duration_us + unit / 2) / unit) as usize;
    if (1..=2).contains(&n) && matches_within(duration_us, n as u32 * unit, TOLERANCE_PCT) {
        Some(n)
    } else {
        None
    }
}

/// Expand pulse pairs into a half-bit level stream, leading idle half
/// included, trailing space halves padded.
fn half_stream(buf: &PulseBuffer, unit: u32, expected: usize) -> Option<Vec<bool>> {
    let mut halves = vec![false]; // idle-merged first half of the start bit
    for (i, p) in buf.iter().enumerate() {
        let n = units(p.mark_us, unit)?;
        halves.extend(std::iter::repeat(true).take(n));
        if halves.len() > expected {
            return None;
        }
        let last = i == buf.len() - 1;
        match units(p.space_us, unit) {
            Some(n) => halves.extend(std::iter::repeat(false).take(n)),
            // Trailing gap (or end-of-burst zero): pad below.
            None if last => break,
            None => return None,
        }
    }
    if halves.len() > expected {
        return None;
    }
    halves.resize(expected, false);
    Some(halves)
}

/// Collapse a half stream into bits: (first, second) must be complementary.
fn bits_of(halves: &[bool], one_is_space_mark: bool) -> Option<u64> {
    let mut data = 0u64;
    for pair in halves.chunks(2) {
        let bit = match (pair[0], pair[1]) {
            (false, true) => one_is_space_mark,
            (true, false) => !one_is_space_mark,
            _ => return None,
        };
        data = (data << 1) | bit as u64;
    }
    Some(data)
}

/// Test/encoder helper: the canonical pulse train for a 14-bit RC5 word.
#[allow(dead_code)]
pub(crate) fn synthesize_rc5(data: u64) -> PulseBuffer {
    let mut halves = Vec::with_capacity(HALF_BITS);
    for i in (0..14).rev() {
        let one = (data >> i) & 1 == 1;
        halves.push(!one);
        halves.push(one);
    }
    halves_to_pairs(&halves, UNIT_US)
}

#[allow(dead_code)]
pub(crate) fn halves_to_pairs(halves: &[bool], unit: u32) -> PulseBuffer {
    let mut buf = PulseBuffer::new();
    let mut idx = 0;
    // Leading space halves merge with idle.
    while idx < halves.len() && !halves[idx] {
        idx += 1;
    }
    while idx < halves.len() {
        let mut mark = 0u32;
        while idx < halves.len() && halves[idx] {
            mark += unit;
            idx += 1;
        }
        let mut space = 0u32;
        while idx < halves.len() && !halves[idx] {
            space += unit;
            idx += 1;
        }
        buf.push_pair(mark, space);
    }
    buf
}

pub struct Rc5Decoder;

impl Rc5Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for Rc5Decoder {
    fn protocol(&self) -> Protocol {
        Protocol::Rc5
    }

    fn decode(&self, buf: &PulseBuffer) -> Option<IrCode> {
        if buf.len() < 8 || buf.len() > HALF_BITS {
            return None;
        }
        let halves = half_stream(buf, UNIT_US, HALF_BITS)?;
        let data = bits_of(&halves, true)?;
        if (data >> 13) & 1 != 1 {
            return None; // S1 must be 1
        }
        let s2 = (data >> 12) & 1;
        let mut code = IrCode::decoded(Protocol::Rc5, data, 14);
        code.flags.msb_first = true;
        code.flags.toggle = (data >> 11) & 1 == 1;
        code.address = ((data >> 6) & 0x1F) as u16;
        // Extended RC5: the inverted S2 supplies command bit 6.
        code.command = ((data & 0x3F) | ((1 - s2) << 6)) as u16;
        Some(code)
    }
}

impl Default for Rc5Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // S1=1, S2=1, T=0, address 0x05, command 0x35.
    const WORD: u64 = 0b11_0_00101_110101;

    #[test]
    fn frame_round_trips_through_the_half_stream() {
        let buf = synthesize_rc5(WORD);
        let code = Rc5Decoder::new().decode(&buf).unwrap();
        assert_eq!(code.protocol, Protocol::Rc5);
        assert_eq!(code.data, WORD);
        assert_eq!(code.bits, 14);
        assert_eq!(code.address, 0x05);
        assert_eq!(code.command, 0x35);
        assert!(!code.flags.toggle);
    }

    #[test]
    fn toggle_bit_is_surfaced() {
        let word = WORD | (1 << 11);
        let code = Rc5Decoder::new().decode(&synthesize_rc5(word)).unwrap();
        assert!(code.flags.toggle);
    }

    #[test]
    fn skewed_half_units_reject() {
        let buf = synthesize_rc5(WORD);
        let stretched = PulseBuffer::from_pairs(
            buf.iter()
                .map(|p| crate::pulse::PulsePair::new(p.mark_us * 150 / 100, p.space_us * 150 / 100))
                .collect(),
        );
        assert!(Rc5Decoder::new().decode(&stretched).is_none());
    }
}
