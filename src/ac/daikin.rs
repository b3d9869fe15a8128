//! Daikin frame profile: a 20-byte leader frame, a ~29 ms gap, then the
//! 19-byte state frame.
//!
//! State frame: 0x11 0xDA 0x27 0x00 0xC5 header, power and mode in byte 5,
//! doubled temperature in byte 6, fan in the high nibble of byte 8, the
//! 0xF0/0xF1 swing sentinel at byte 9, byte-sum checksum over bytes 0..17
//! in byte 18. The comfort preset rides in the leader frame.

use crate::catalog::Protocol;

use super::layout::{byte_sum, AcProfile, FieldId, FieldSpec, LeaderSpec, TempCoding, ValueMaps};
use super::{AcMode, FanSpeed, SwingMode};

/// Gap between the leader and the state frame.
pub(super) const FRAME_GAP_US: u32 = 29_000;

fn mode(m: AcMode) -> u8 {
    match m {
        AcMode::Off | AcMode::Auto => 0,
        AcMode::Dry => 2,
        AcMode::Cool => 3,
        AcMode::Heat => 4,
        AcMode::Fan => 6,
    }
}

fn mode_rev(v: u8) -> Option<AcMode> {
    Some(match v {
        0 => AcMode::Auto,
        2 => AcMode::Dry,
        3 => AcMode::Cool,
        4 => AcMode::Heat,
        6 => AcMode::Fan,
        _ => return None,
    })
}

fn fan(f: FanSpeed) -> u8 {
    match f {
        FanSpeed::Auto => 3,
        FanSpeed::Low => 4,
        FanSpeed::Med => 5,
        FanSpeed::High => 6,
        FanSpeed::Quiet => 2,
        FanSpeed::Turbo => 7,
    }
}

fn fan_rev(v: u8) -> Option<FanSpeed> {
    Some(match v {
        3 => FanSpeed::Auto,
        4 => FanSpeed::Low,
        5 => FanSpeed::Med,
        6 => FanSpeed::High,
        2 => FanSpeed::Quiet,
        7 => FanSpeed::Turbo,
        _ => return None,
    })
}

// Vertical-swing machines: byte 9 is 0xF0 off, 0xF1 swinging.
fn swing(s: SwingMode) -> u8 {
    (s != SwingMode::Off) as u8
}

fn swing_rev(v: u8) -> Option<SwingMode> {
    Some(if v == 0 {
        SwingMode::Off
    } else {
        SwingMode::Vertical
    })
}

fn checksum(frame: &mut [u8]) {
    frame[18] = byte_sum(frame, 0, 17);
}

fn checksum_ok(frame: &[u8]) -> bool {
    frame.len() == 19 && frame[18] == byte_sum(frame, 0, 17)
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec { id: FieldId::Power, byte: 5, bit: 0, width: 1 },
    FieldSpec { id: FieldId::Mode, byte: 5, bit: 4, width: 3 },
    FieldSpec { id: FieldId::Temp, byte: 6, bit: 0, width: 8 },
    FieldSpec { id: FieldId::Fan, byte: 8, bit: 4, width: 4 },
    FieldSpec { id: FieldId::Swing, byte: 9, bit: 0, width: 1 },
    FieldSpec { id: FieldId::Turbo, byte: 13, bit: 0, width: 1 },
    FieldSpec { id: FieldId::Quiet, byte: 13, bit: 5, width: 1 },
    FieldSpec { id: FieldId::Sleep, byte: 15, bit: 0, width: 1 },
    FieldSpec { id: FieldId::Econo, byte: 16, bit: 2, width: 1 },
];

static LEADER: LeaderSpec = LeaderSpec {
    len: 20,
    fixed: &[(0, 0x11), (1, 0xDA), (2, 0x27), (3, 0x00), (4, 0xC5)],
    checksum_at: Some(19),
    comfort: Some(FieldSpec { id: FieldId::Comfort, byte: 6, bit: 4, width: 1 }),
    gap_us: FRAME_GAP_US,
};

pub(super) static PROFILE: AcProfile = AcProfile {
    protocol: Protocol::Daikin,
    frame_len: 19,
    frame_bits: 152,
    total_bits: 312, // 160-bit leader + 152-bit state frame
    fixed: &[(0, 0x11), (1, 0xDA), (2, 0x27), (3, 0x00), (4, 0xC5), (9, 0xF0)],
    fields: FIELDS,
    temp: TempCoding::Double,
    maps: ValueMaps {
        mode,
        mode_rev,
        fan,
        fan_rev,
        swing,
        swing_rev,
    },
    checksum,
    checksum_ok,
    leader: Some(&LEADER),
};
