//! Haier frame profile: 13 bytes.
//!
//! 0xA6 prologue, `temp - 16` in byte 4, byte-sum checksum over bytes
//! 0..11 in byte 12.

use crate::catalog::Protocol;

use super::layout::{byte_sum, AcProfile, FieldId, FieldSpec, TempCoding, ValueMaps};
use super::{AcMode, FanSpeed, SwingMode};

fn mode(m: AcMode) -> u8 {
    match m {
        AcMode::Off | AcMode::Auto => 0,
        AcMode::Cool => 1,
        AcMode::Dry => 2,
        AcMode::Heat => 3,
        AcMode::Fan => 4,
    }
}

fn mode_rev(v: u8) -> Option<AcMode> {
    Some(match v {
        0 => AcMode::Auto,
        1 => AcMode::Cool,
        2 => AcMode::Dry,
        3 => AcMode::Heat,
        4 => AcMode::Fan,
        _ => return None,
    })
}

fn fan(f: FanSpeed) -> u8 {
    match f {
        FanSpeed::Auto => 0,
        FanSpeed::Low => 1,
        FanSpeed::Med => 2,
        FanSpeed::High => 3,
        FanSpeed::Quiet => 4,
        FanSpeed::Turbo => 5,
    }
}

fn fan_rev(v: u8) -> Option<FanSpeed> {
    Some(match v {
        0 => FanSpeed::Auto,
        1 => FanSpeed::Low,
        2 => FanSpeed::Med,
        3 => FanSpeed::High,
        4 => FanSpeed::Quiet,
        5 => FanSpeed::Turbo,
        _ => return None,
    })
}

fn swing(s: SwingMode) -> u8 {
    match s {
        SwingMode::Off => 0,
        SwingMode::Vertical => 1,
        SwingMode::Horizontal => 2,
        SwingMode::Both | SwingMode::Auto => 3,
    }
}

fn swing_rev(v: u8) -> Option<SwingMode> {
    Some(match v {
        0 => SwingMode::Off,
        1 => SwingMode::Vertical,
        2 => SwingMode::Horizontal,
        _ => SwingMode::Both,
    })
}

fn checksum(frame: &mut [u8]) {
    frame[12] = byte_sum(frame, 0, 11);
}

fn checksum_ok(frame: &[u8]) -> bool {
    frame.len() == 13 && frame[12] == byte_sum(frame, 0, 11)
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec { id: FieldId::Power, byte: 1, bit: 0, width: 1 },
    FieldSpec { id: FieldId::Mode, byte: 1, bit: 4, width: 3 },
    FieldSpec { id: FieldId::Temp, byte: 4, bit: 0, width: 8 },
    FieldSpec { id: FieldId::Fan, byte: 5, bit: 0, width: 3 },
    FieldSpec { id: FieldId::Swing, byte: 6, bit: 0, width: 2 },
    FieldSpec { id: FieldId::AntiFungal, byte: 7, bit: 0, width: 1 },
    FieldSpec { id: FieldId::Sleep, byte: 7, bit: 1, width: 1 },
    FieldSpec { id: FieldId::Quiet, byte: 7, bit: 2, width: 1 },
];

pub(super) static PROFILE: AcProfile = AcProfile {
    protocol: Protocol::Haier,
    frame_len: 13,
    frame_bits: 104,
    total_bits: 104,
    fixed: &[(0, 0xA6)],
    fields: FIELDS,
    temp: TempCoding::OffsetFrom16,
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
    leader: None,
};
