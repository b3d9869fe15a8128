//! Samsung48 AC frame profile: 6 bytes on the Samsung 48-bit framing.
//!
//! `temp - 16` in byte 3, XOR of bytes 0..4 in byte 5.

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
    frame[5] = xor_bytes(frame, 0, 4);
}

fn checksum_ok(frame: &[u8]) -> bool {
    frame.len() == 6 && frame[5] == xor_bytes(frame, 0, 4)
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec { id: FieldId::Power, byte: 2, bit: 0, width: 1 },
    FieldSpec { id: FieldId::Mode, byte: 2, bit: 1, width: 3 },
    FieldSpec { id: FieldId::Fan, byte: 2, bit: 4, width: 3 },
    FieldSpec { id: FieldId::Swing, byte: 2, bit: 7, width: 1 },
    FieldSpec { id: FieldId::Temp, byte: 3, bit: 0, width: 8 },
    FieldSpec { id: FieldId::Turbo, byte: 4, bit: 0, width: 1 },
    FieldSpec { id: FieldId::Sleep, byte: 4, bit: 1, width: 1 },
    FieldSpec { id: FieldId::Display, byte: 4, bit: 2, width: 1 },
    FieldSpec { id: FieldId::Beep, byte: 4, bit: 3, width: 1 },
];

pub(super) static PROFILE: AcProfile = AcProfile {
    protocol: Protocol::Samsung48,
    frame_len: 6,
    frame_bits: 48,
    total_bits: 48,
    fixed: &[(0, 0x01), (1, 0xD2)],
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
