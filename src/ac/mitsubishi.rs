//! Mitsubishi frame profile: 19 bytes, inverted temperature.
//!
//! 0x23 0xCB 0x26 0x01 0x00 header, power at bit 5 of byte 5,
//! `31 - temp` in byte 7, byte-sum checksum over bytes 0..17 in byte 18.

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
        FanSpeed::Quiet => 5,
        FanSpeed::Turbo => 6,
    }
}

fn fan_rev(v: u8) -> Option<FanSpeed> {
    Some(match v {
        0 => FanSpeed::Auto,
        1 => FanSpeed::Low,
        2 => FanSpeed::Med,
        3 => FanSpeed::High,
        5 => FanSpeed::Quiet,
        6 => FanSpeed::Turbo,
        _ => return None,
    })
}

fn swing(s: SwingMode) -> u8 {
    match s {
        SwingMode::Off => 0,
        SwingMode::Vertical => 1,
        SwingMode::Horizontal => 2,
        SwingMode::Both => 3,
        SwingMode::Auto => 4,
    }
}

fn swing_rev(v: u8) -> Option<SwingMode> {
    Some(match v {
        0 => SwingMode::Off,
        1 => SwingMode::Vertical,
        2 => SwingMode::Horizontal,
        3 => SwingMode::Both,
        4 => SwingMode::Auto,
        _ => return None,
    })
}

fn checksum(frame: &mut [u8]) {
    frame[18] = byte_sum(frame, 0, 17);
}

fn checksum_ok(frame: &[u8]) -> bool {
    frame.len() == 19 && frame[18] == byte_sum(frame, 0, 17)
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec { id: FieldId::Power, byte: 5, bit: 5, width: 1 },
    FieldSpec { id: FieldId::Mode, byte: 6, bit: 0, width: 3 },
    FieldSpec { id: FieldId::Temp, byte: 7, bit: 0, width: 8 },
    FieldSpec { id: FieldId::Fan, byte: 9, bit: 0, width: 3 },
    FieldSpec { id: FieldId::Swing, byte: 9, bit: 3, width: 3 },
    FieldSpec { id: FieldId::Econo, byte: 14, bit: 0, width: 1 },
    FieldSpec { id: FieldId::Sleep, byte: 14, bit: 1, width: 1 },
];

pub(super) static PROFILE: AcProfile = AcProfile {
    protocol: Protocol::Mitsubishi,
    frame_len: 19,
    frame_bits: 152,
    total_bits: 152,
    fixed: &[(0, 0x23), (1, 0xCB), (2, 0x26), (3, 0x01), (4, 0x00)],
    fields: FIELDS,
    temp: TempCoding::InvertFrom31,
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
