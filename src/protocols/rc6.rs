//! RC6 biphase decoder: 2666/889 leader, 444 us half-bit unit.
//!
//! Opposite polarity to RC5: logic 1 is mark-then-space. After the leader
//! come a start bit that must be 1, three mode bits, the double-length
//! trailer (toggle) bit, then 8 address and 8 command bits MSB-first.

use super::FrameDecoder;
use crate::catalog::Protocol;
use crate::code::IrCode;
use crate::pulse::{matches_within, PulseBuffer, TOLERANCE_PCT};

const UNIT_US: u32 = 444;
const LEADER_MARK: u32 = 2666;
const LEADER_SPACE: u32 = 889;
/// start(2) + mode(6) + toggle(4) + 16 data bits(32).
const UNITS: usize = 44;

fn units(duration_us: u32, max: usize) -> Option<usize> {
    let n = ((duration_us + UNIT_US / 2) / UNIT_US) as usize;
    if (1..=max).contains(&n) && matches_within(duration_us, n as u32 * UNIT_US, TOLERANCE_PCT) {
        Some(n)
    } else {
        None
    }
}

/// Unit-level levels after the leader; trailing space units padded.
fn unit_stream(buf: &PulseBuffer) -> Option<Vec<bool>> {
    let leader = buf[0];
    if !leader.match_mark(LEADER_MARK, TOLERANCE_PCT)
        || !leader.match_space(LEADER_SPACE, TOLERANCE_PCT)
    {
        return None;
    }
    let mut stream = Vec::with_capacity(UNITS);
    for (i, p) in buf.iter().enumerate().skip(1) {
        let n = units(p.mark_us, 3)?;
        stream.extend(std::iter::repeat(true).take(n));
        if stream.len() > UNITS {
            return None;
        }
        let last = i == buf.len() - 1;
        match units(p.space_us, 3) {
            Some(n) => stream.extend(std::iter::repeat(false).take(n)),
            None if last => break,
            None => return None,
        }
    }
    if stream.len() > UNITS {
        return None;
    }
    stream.resize(UNITS, false);
    Some(stream)
}

/// A single-width bit at unit offset `at`: mark-then-space = 1.
fn bit_at(stream: &[bool], at: usize) -> Option<bool> {
    match (stream[at], stream[at + 1]) {
        (true, false) => Some(true),
        (false, true) => Some(false),
        _ => None,
    }
}

/// Test/encoder helper: canonical RC6 pulse train.
#[allow(dead_code)]
pub(crate) fn synthesize_rc6(mode: u8, toggle: bool, data: u16) -> PulseBuffer {
    let mut stream = Vec::with_capacity(UNITS);
    let mut push_bit = |one: bool| {
        stream.push(one);
        stream.push(!one);
    };
    push_bit(true); // start
    for i in (0..3).rev() {
        push_bit((mode >> i) & 1 == 1);
    }
    // Double-length trailer.
    stream.extend([toggle, toggle, !toggle, !toggle]);
    for i in (0..16).rev() {
        let one = (data >> i) & 1 == 1;
        stream.push(one);
        stream.push(!one);
    }

    let mut buf = PulseBuffer::new();
    buf.push_pair(LEADER_MARK, LEADER_SPACE);
    let mut idx = 0;
    while idx < stream.len() {
        let mut mark = 0u32;
        while idx < stream.len() && stream[idx] {
            mark += UNIT_US;
            idx += 1;
        }
        let mut space = 0u32;
        while idx < stream.len() && !stream[idx] {
            space += UNIT_US;
            idx += 1;
        }
        buf.push_pair(mark, space);
    }
    buf
}

pub struct Rc6Decoder;

impl Rc6Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for Rc6Decoder {
    fn protocol(&self) -> Protocol {
        Protocol::Rc6
    }

    fn decode(&self, buf: &PulseBuffer) -> Option<IrCode> {
        if buf.len() < 10 || buf.len() > UNITS + 1 {
            return None;
        }
        let stream = unit_stream(buf)?;

        if !bit_at(&stream, 0)? {
            return None; // start bit must be 1
        }
        let mut mode = 0u8;
        for i in 0..3 {
            mode = (mode << 1) | bit_at(&stream, 2 + 2 * i)? as u8;
        }
        // Trailer halves are double length.
        let toggle = match (stream[8], stream[9], stream[10], stream[11]) {
            (true, true, false, false) => true,
            (false, false, true, true) => false,
            _ => return None,
        };
        let mut data = 0u64;
        for i in 0..16 {
            data = (data << 1) | bit_at(&stream, 12 + 2 * i)? as u64;
        }

        let mut code = IrCode::decoded(Protocol::Rc6, data, 16);
        code.flags.msb_first = true;
        code.flags.toggle = toggle;
        code.flags.extra_info = mode != 0;
        code.address = ((data >> 8) & 0xFF) as u16;
        code.command = (data & 0xFF) as u16;
        Some(code)
    }
}

impl Default for Rc6Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode0_frame_round_trips() {
        let buf = synthesize_rc6(0, false, 0x7B34);
        let code = Rc6Decoder::new().decode(&buf).unwrap();
        assert_eq!(code.protocol, Protocol::Rc6);
        assert_eq!(code.data, 0x7B34);
        assert_eq!(code.bits, 16);
        assert_eq!(code.address, 0x7B);
        assert_eq!(code.command, 0x34);
        assert!(!code.flags.toggle);
        assert!(!code.flags.extra_info);
    }

    #[test]
    fn trailer_carries_the_toggle() {
        let code = Rc6Decoder::new()
            .decode(&synthesize_rc6(0, true, 0x7B34))
            .unwrap();
        assert!(code.flags.toggle);
    }

    #[test]
    fn nonzero_mode_sets_extra_info() {
        let code = Rc6Decoder::new()
            .decode(&synthesize_rc6(0b110, false, 0x7B34))
            .unwrap();
        assert!(code.flags.extra_info);
    }

    #[test]
    fn missing_leader_rejects() {
        let mut buf = synthesize_rc6(0, false, 0x7B34);
        buf.pairs_mut().remove(0);
        assert!(Rc6Decoder::new().decode(&buf).is_none());
    }
}
