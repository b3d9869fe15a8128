//! LG2 frame profile: a single 28-bit word.
//!
//! 0x88 signature in the top byte, power/mode/feature bits next,
//! `temp - 15` in bits 8..11, fan in bits 4..7, and a 4-bit nibble-sum
//! checksum in bits 0..3. The frame is packed into 4 bytes but only 28
//! bits transmit, MSB-first; the low nibble of the last byte never leaves
//! the device.

use crate::catalog::Protocol;

use super::layout::{nibble_sum, AcProfile, FieldId, FieldSpec, TempCoding, ValueMaps};
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

/// Sum of the six transmitted data nibbles into the high nibble of the
/// last byte (word bits 0..3).
fn checksum(frame: &mut [u8]) {
    frame[3] = (nibble_sum(frame, 0, 2) & 0xF) << 4;
}

fn checksum_ok(frame: &[u8]) -> bool {
    frame.len() == 4 && frame[3] >> 4 == nibble_sum(frame, 0, 2) & 0xF
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec { id: FieldId::Power, byte: 1, bit: 7, width: 1 },
    FieldSpec { id: FieldId::Mode, byte: 1, bit: 4, width: 3 },
    FieldSpec { id: FieldId::Swing, byte: 1, bit: 3, width: 1 },
    FieldSpec { id: FieldId::Turbo, byte: 1, bit: 2, width: 1 },
    FieldSpec { id: FieldId::Light, byte: 1, bit: 1, width: 1 },
    FieldSpec { id: FieldId::Quiet, byte: 1, bit: 0, width: 1 },
    FieldSpec { id: FieldId::Temp, byte: 2, bit: 4, width: 4 },
    FieldSpec { id: FieldId::Fan, byte: 2, bit: 0, width: 4 },
];

pub(super) static PROFILE: AcProfile = AcProfile {
    protocol: Protocol::Lg2,
    frame_len: 4,
    frame_bits: 28,
    total_bits: 28,
    fixed: &[(0, 0x88)],
    fields: FIELDS,
    temp: TempCoding::OffsetFrom15,
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
