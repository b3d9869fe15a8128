//! Carrier frame profile: 16 bytes, nibble-sum checksum.
//!
//! The full-feature layout: every comfort flag and the sleep timer have a
//! bit. Temperature is `temp - 16` in byte 4; the checksum is the nibble
//! sum of bytes 0..14 placed in byte 15.

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
    frame[15] = nibble_sum(frame, 0, 14);
}

fn checksum_ok(frame: &[u8]) -> bool {
    frame.len() == 16 && frame[15] == nibble_sum(frame, 0, 14)
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec { id: FieldId::Temp, byte: 4, bit: 0, width: 8 },
    FieldSpec { id: FieldId::Power, byte: 5, bit: 0, width: 1 },
    FieldSpec { id: FieldId::Mode, byte: 6, bit: 0, width: 3 },
    FieldSpec { id: FieldId::Fan, byte: 6, bit: 4, width: 3 },
    FieldSpec { id: FieldId::Swing, byte: 7, bit: 0, width: 3 },
    FieldSpec { id: FieldId::Turbo, byte: 8, bit: 0, width: 1 },
    FieldSpec { id: FieldId::Quiet, byte: 8, bit: 1, width: 1 },
    FieldSpec { id: FieldId::Econo, byte: 8, bit: 2, width: 1 },
    FieldSpec { id: FieldId::Clean, byte: 8, bit: 3, width: 1 },
    FieldSpec { id: FieldId::Sleep, byte: 8, bit: 4, width: 1 },
    FieldSpec { id: FieldId::Display, byte: 8, bit: 5, width: 1 },
    FieldSpec { id: FieldId::Beep, byte: 8, bit: 6, width: 1 },
    FieldSpec { id: FieldId::Filter, byte: 8, bit: 7, width: 1 },
    FieldSpec { id: FieldId::Light, byte: 9, bit: 0, width: 1 },
    FieldSpec { id: FieldId::AntiFungal, byte: 9, bit: 1, width: 1 },
    FieldSpec { id: FieldId::AutoClean, byte: 9, bit: 2, width: 1 },
    FieldSpec { id: FieldId::Comfort, byte: 9, bit: 3, width: 1 },
    FieldSpec { id: FieldId::SleepTimer, byte: 10, bit: 0, width: 8 },
];

pub(super) static PROFILE: AcProfile = AcProfile {
    protocol: Protocol::Carrier,
    frame_len: 16,
    frame_bits: 128,
    total_bits: 128,
    fixed: &[(0, 0x4F), (1, 0xB0), (2, 0xC0), (3, 0x3F)],
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
