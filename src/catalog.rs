//! Protocol catalogue: the closed id set and the static timing table.
//!
//! Lookup is allocation-free; [`spec_for`] hands back a reference into a
//! static table or nothing for the ids that have no fixed timing (Unknown,
//! PulseDistance, PulseWidth, Raw).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed protocol id set. `Unknown` is the zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Protocol {
    #[default]
    Unknown,
    Nec,
    Samsung,
    Sony,
    Jvc,
    Rc5,
    Rc6,
    Lg,
    Lg2,
    Denon,
    Sharp,
    Panasonic,
    Apple,
    Onkyo,
    Samsung48,
    SamsungLg,
    Whynter,
    LegoPf,
    MagiQuest,
    BoseWave,
    BangOlufsen,
    Fast,
    Mitsubishi,
    Daikin,
    Fujitsu,
    Haier,
    Midea,
    Carrier,
    Hitachi,
    PulseDistance,
    PulseWidth,
    Raw,
}

impl Protocol {
    /// Stable short name for logs and the control surface.
    pub fn name(&self) -> &'static str {
        match self {
            Protocol::Unknown => "Unknown",
            Protocol::Nec => "NEC",
            Protocol::Samsung => "Samsung",
            Protocol::Sony => "Sony",
            Protocol::Jvc => "JVC",
            Protocol::Rc5 => "RC5",
            Protocol::Rc6 => "RC6",
            Protocol::Lg => "LG",
            Protocol::Lg2 => "LG2",
            Protocol::Denon => "Denon",
            Protocol::Sharp => "Sharp",
            Protocol::Panasonic => "Panasonic",
            Protocol::Apple => "Apple",
            Protocol::Onkyo => "Onkyo",
            Protocol::Samsung48 => "Samsung48",
            Protocol::SamsungLg => "SamsungLG",
            Protocol::Whynter => "Whynter",
            Protocol::LegoPf => "LegoPF",
            Protocol::MagiQuest => "MagiQuest",
            Protocol::BoseWave => "BoseWave",
            Protocol::BangOlufsen => "BangOlufsen",
            Protocol::Fast => "FAST",
            Protocol::Mitsubishi => "Mitsubishi",
            Protocol::Daikin => "Daikin",
            Protocol::Fujitsu => "Fujitsu",
            Protocol::Haier => "Haier",
            Protocol::Midea => "Midea",
            Protocol::Carrier => "Carrier",
            Protocol::Hitachi => "Hitachi",
            Protocol::PulseDistance => "PulseDistance",
            Protocol::PulseWidth => "PulseWidth",
            Protocol::Raw => "Raw",
        }
    }

    /// The AC subset: ids the AC state machine may be configured with.
    pub fn is_ac(&self) -> bool {
        matches!(
            self,
            Protocol::Carrier
                | Protocol::Daikin
                | Protocol::Hitachi
                | Protocol::Mitsubishi
                | Protocol::Midea
                | Protocol::Haier
                | Protocol::Samsung48
                | Protocol::Panasonic
                | Protocol::Fujitsu
                | Protocol::Lg2
        )
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Protocol {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        const ALL: [Protocol; 32] = [
            Protocol::Unknown,
            Protocol::Nec,
            Protocol::Samsung,
            Protocol::Sony,
            Protocol::Jvc,
            Protocol::Rc5,
            Protocol::Rc6,
            Protocol::Lg,
            Protocol::Lg2,
            Protocol::Denon,
            Protocol::Sharp,
            Protocol::Panasonic,
            Protocol::Apple,
            Protocol::Onkyo,
            Protocol::Samsung48,
            Protocol::SamsungLg,
            Protocol::Whynter,
            Protocol::LegoPf,
            Protocol::MagiQuest,
            Protocol::BoseWave,
            Protocol::BangOlufsen,
            Protocol::Fast,
            Protocol::Mitsubishi,
            Protocol::Daikin,
            Protocol::Fujitsu,
            Protocol::Haier,
            Protocol::Midea,
            Protocol::Carrier,
            Protocol::Hitachi,
            Protocol::PulseDistance,
            Protocol::PulseWidth,
            Protocol::Raw,
        ];
        ALL.iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or(())
    }
}

/// Symbol encoding scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Constant mark, the space length carries the bit.
    PulseDistance,
    /// Constant space, the mark length carries the bit.
    PulseWidth,
    /// Manchester: the bit is the direction of the mid-bit transition.
    Biphase,
}

/// Static timing constants for one named protocol.
#[derive(Debug, Clone, Copy)]
pub struct ProtocolSpec {
    pub carrier_khz: u16,
    /// Leading mark/space; 0 for headerless protocols. For biphase the
    /// header is the leader pulse (RC6) or absent (RC5), and `bit_mark` is
    /// the half-bit unit.
    pub header_mark: u32,
    pub header_space: u32,
    /// Data mark for pulse-distance; the ZERO mark for pulse-width; the
    /// half-bit unit for biphase.
    pub bit_mark: u32,
    /// The ONE mark for pulse-width protocols; 0 otherwise.
    pub one_mark: u32,
    pub one_space: u32,
    pub zero_space: u32,
    pub encoding: Encoding,
    /// Wire bit order for the semantic address/command fields.
    pub lsb_first: bool,
    pub stop_bit: bool,
    /// 0 = variable length.
    pub nominal_bits: u16,
    /// Nominal frame-to-frame period while a button is held; 0 = none.
    pub repeat_period_ms: u32,
}

macro_rules! spec {
    ($carrier:expr, $hm:expr, $hs:expr, $bm:expr, $om:expr, $os:expr, $zs:expr,
     $enc:expr, $lsb:expr, $stop:expr, $bits:expr, $rep:expr) => {
        ProtocolSpec {
            carrier_khz: $carrier,
            header_mark: $hm,
            header_space: $hs,
            bit_mark: $bm,
            one_mark: $om,
            one_space: $os,
            zero_space: $zs,
            encoding: $enc,
            lsb_first: $lsb,
            stop_bit: $stop,
            nominal_bits: $bits,
            repeat_period_ms: $rep,
        }
    };
}

use Encoding::{Biphase, PulseDistance as PD, PulseWidth as PW};

pub const NEC: ProtocolSpec = spec!(38, 9000, 4500, 560, 0, 1690, 560, PD, true, true, 32, 110);
pub const SAMSUNG: ProtocolSpec = spec!(38, 4500, 4500, 560, 0, 1690, 560, PD, true, true, 32, 110);
pub const SAMSUNG48: ProtocolSpec =
    spec!(38, 4500, 4500, 560, 0, 1690, 560, PD, true, true, 48, 110);
pub const SONY: ProtocolSpec = spec!(40, 2400, 600, 600, 1200, 600, 600, PW, true, false, 0, 45);
pub const JVC: ProtocolSpec = spec!(38, 8400, 4200, 526, 0, 1574, 526, PD, true, true, 16, 55);
pub const RC5: ProtocolSpec = spec!(36, 0, 0, 889, 0, 0, 0, Biphase, false, false, 14, 114);
pub const RC6: ProtocolSpec = spec!(36, 2666, 889, 444, 0, 0, 0, Biphase, false, false, 16, 107);
pub const LG: ProtocolSpec = spec!(38, 8000, 4000, 600, 0, 1600, 550, PD, false, true, 28, 110);
pub const LG2: ProtocolSpec = spec!(38, 3200, 9900, 600, 0, 1600, 550, PD, false, true, 28, 110);
pub const DENON: ProtocolSpec = spec!(38, 0, 0, 230, 0, 1780, 745, PD, true, true, 15, 65);
pub const PANASONIC: ProtocolSpec =
    spec!(38, 3456, 1728, 432, 0, 1296, 432, PD, true, true, 48, 130);
pub const WHYNTER: ProtocolSpec = spec!(38, 2850, 2850, 750, 0, 2150, 750, PD, false, true, 32, 110);
pub const LEGO_PF: ProtocolSpec = spec!(38, 158, 1026, 158, 0, 553, 263, PD, false, true, 16, 110);
pub const MAGIQUEST: ProtocolSpec =
    spec!(38, 0, 0, 288, 576, 574, 862, PW, false, false, 56, 110);
pub const BOSE_WAVE: ProtocolSpec =
    spec!(38, 1060, 1425, 534, 0, 1435, 468, PD, true, true, 16, 75);
pub const BANG_OLUFSEN: ProtocolSpec =
    spec!(455, 200, 3125, 200, 0, 4687, 1562, PD, false, true, 16, 115);
pub const FAST: ProtocolSpec = spec!(38, 0, 0, 215, 0, 891, 313, PD, true, true, 16, 50);

// AC protocols: long pulse-distance frames, always 38 kHz, no hold-repeat.
pub const MITSUBISHI_AC: ProtocolSpec =
    spec!(38, 3400, 1750, 450, 0, 1300, 420, PD, true, true, 152, 0);
pub const DAIKIN_AC: ProtocolSpec =
    spec!(38, 3500, 1750, 430, 0, 1320, 430, PD, true, true, 312, 0);
pub const FUJITSU_AC: ProtocolSpec =
    spec!(38, 3324, 1574, 448, 0, 1182, 390, PD, true, true, 0, 0);
pub const HAIER_AC: ProtocolSpec =
    spec!(38, 3000, 3000, 520, 0, 1650, 650, PD, true, true, 104, 0);
pub const MIDEA_AC: ProtocolSpec =
    spec!(38, 4480, 4480, 560, 0, 1680, 560, PD, true, true, 48, 0);
pub const CARRIER_AC: ProtocolSpec =
    spec!(38, 8940, 4556, 503, 0, 1736, 615, PD, true, true, 128, 0);
pub const HITACHI_AC: ProtocolSpec =
    spec!(38, 3300, 1700, 400, 0, 1250, 500, PD, true, true, 264, 0);

/// Timing constants for a protocol id, or nothing for ids without fixed
/// timing (Unknown, the universal classifications, Raw).
pub fn spec_for(protocol: Protocol) -> Option<&'static ProtocolSpec> {
    match protocol {
        Protocol::Nec | Protocol::Apple | Protocol::Onkyo => Some(&NEC),
        Protocol::Samsung | Protocol::SamsungLg => Some(&SAMSUNG),
        Protocol::Samsung48 => Some(&SAMSUNG48),
        Protocol::Sony => Some(&SONY),
        Protocol::Jvc => Some(&JVC),
        Protocol::Rc5 => Some(&RC5),
        Protocol::Rc6 => Some(&RC6),
        Protocol::Lg => Some(&LG),
        Protocol::Lg2 => Some(&LG2),
        Protocol::Denon | Protocol::Sharp => Some(&DENON),
        Protocol::Panasonic => Some(&PANASONIC),
        Protocol::Whynter => Some(&WHYNTER),
        Protocol::LegoPf => Some(&LEGO_PF),
        Protocol::MagiQuest => Some(&MAGIQUEST),
        Protocol::BoseWave => Some(&BOSE_WAVE),
        Protocol::BangOlufsen => Some(&BANG_OLUFSEN),
        Protocol::Fast => Some(&FAST),
        Protocol::Mitsubishi => Some(&MITSUBISHI_AC),
        Protocol::Daikin => Some(&DAIKIN_AC),
        Protocol::Fujitsu => Some(&FUJITSU_AC),
        Protocol::Haier => Some(&HAIER_AC),
        Protocol::Midea => Some(&MIDEA_AC),
        Protocol::Carrier => Some(&CARRIER_AC),
        Protocol::Hitachi => Some(&HITACHI_AC),
        Protocol::Unknown | Protocol::PulseDistance | Protocol::PulseWidth | Protocol::Raw => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_fixed_protocol_has_constants() {
        for p in [
            Protocol::Nec,
            Protocol::Samsung,
            Protocol::Sony,
            Protocol::Jvc,
            Protocol::Rc5,
            Protocol::Rc6,
            Protocol::Lg,
            Protocol::Lg2,
            Protocol::Denon,
            Protocol::Sharp,
            Protocol::Panasonic,
            Protocol::Apple,
            Protocol::Onkyo,
            Protocol::Samsung48,
            Protocol::SamsungLg,
            Protocol::Whynter,
            Protocol::LegoPf,
            Protocol::MagiQuest,
            Protocol::BoseWave,
            Protocol::BangOlufsen,
            Protocol::Fast,
            Protocol::Mitsubishi,
            Protocol::Daikin,
            Protocol::Fujitsu,
            Protocol::Haier,
            Protocol::Midea,
            Protocol::Carrier,
            Protocol::Hitachi,
        ] {
            assert!(spec_for(p).is_some(), "{p} missing from the catalogue");
        }
        assert!(spec_for(Protocol::Raw).is_none());
        assert!(spec_for(Protocol::Unknown).is_none());
    }

    #[test]
    fn supported_carriers_only() {
        for p in [Protocol::Rc5, Protocol::Nec, Protocol::Sony, Protocol::BangOlufsen] {
            let khz = spec_for(p).unwrap().carrier_khz;
            assert!(matches!(khz, 36 | 38 | 40 | 455), "{p}: {khz} kHz");
        }
    }

    #[test]
    fn name_round_trips_through_from_str() {
        for p in [Protocol::Nec, Protocol::SamsungLg, Protocol::BangOlufsen, Protocol::Raw] {
            assert_eq!(p.name().parse::<Protocol>().unwrap(), p);
        }
        assert!("NotAProtocol".parse::<Protocol>().is_err());
    }

    #[test]
    fn ac_subset_is_exactly_the_ten_encoders() {
        let ac: Vec<Protocol> = [
            Protocol::Carrier,
            Protocol::Daikin,
            Protocol::Hitachi,
            Protocol::Mitsubishi,
            Protocol::Midea,
            Protocol::Haier,
            Protocol::Samsung48,
            Protocol::Panasonic,
            Protocol::Fujitsu,
            Protocol::Lg2,
        ]
        .into_iter()
        .collect();
        for p in &ac {
            assert!(p.is_ac());
        }
        assert!(!Protocol::Nec.is_ac());
        assert!(!Protocol::Raw.is_ac());
    }
}
