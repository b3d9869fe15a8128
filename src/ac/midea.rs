//! Midea frame profile: 6 bytes, XOR checksum.
//!
//! 0xB2 0x4D header, power and mode in byte 2, `temp - 17` in the low
//! nibble of byte 3 with the fan in the high nibble, XOR of bytes 0..4 in
//! byte 5. The temperature floor is 17 C on this hardware.

use crate::catalog::Protocol;

use super::layout::{xor_bytes, AcProfile, FieldId, FieldSpec, TempCoding, ValueMaps};
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
    frame[5] = xor_bytes(frame, 0, 4);
}

fn checksum_ok(frame: &[u8]) -> bool {
    frame.len() == 6 && frame[5] == xor_bytes(frame, 0, 4)
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec { id: FieldId::Mode, byte: 2, bit: 0, width: 3 },
    FieldSpec { id: FieldId::Power, byte: 2, bit: 5, width: 1 },
    FieldSpec { id: FieldId::Temp, byte: 3, bit: 0, width: 4 },
    FieldSpec { id: FieldId::Fan, byte: 3, bit: 4, width: 4 },
    FieldSpec { id: FieldId::Swing, byte: 4, bit: 0, width: 2 },
    FieldSpec { id: FieldId::Sleep, byte: 4, bit: 2, width: 1 },
    FieldSpec { id: FieldId::Turbo, byte: 4, bit: 3, width: 1 },
    FieldSpec { id: FieldId::Display, byte: 4, bit: 4, width: 1 },
];

pub(super) static PROFILE: AcProfile = AcProfile {
    protocol: Protocol::Midea,
    frame_len: 6,
    frame_bits: 48,
    total_bits: 48,
    fixed: &[(0, 0xB2), (1, 0x4D)],
    fields: FIELDS,
    temp: TempCoding::OffsetFrom17,
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
