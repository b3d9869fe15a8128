//! Logical actions: (device, action) -> stored code.
//!
//! Cloud-facing surfaces address codes by stable (device, action) pairs
//! while the underlying IR representation may be re-learned at any time.
//! Bindings persist in the `ir_actions` namespace under
//! `<devprefix>_<ordinal>`; Raw codes keep their pulse buffer under the
//! `_raw` sibling key and reallocate it on load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Protocol;
use crate::code::{CodeFlags, IrCode, VerifyMeta};
use crate::error::{Error, Result};
use crate::pulse::PulseBuffer;
use crate::store::{SharedStore, NS_ACTIONS};
use crate::transmit::{PulseSink, Transmitter};

/// Logical device classes and their storage prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    Tv,
    Ac,
    Stb,
    Speaker,
    Fan,
    Custom,
}

impl DeviceType {
    pub fn prefix(&self) -> &'static str {
        match self {
            DeviceType::Tv => "tv",
            DeviceType::Ac => "ac",
            DeviceType::Stb => "stb",
            DeviceType::Speaker => "spk",
            DeviceType::Fan => "fan",
            DeviceType::Custom => "cst",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DeviceType::Tv => "TV",
            DeviceType::Ac => "AC",
            DeviceType::Stb => "STB",
            DeviceType::Speaker => "Speaker",
            DeviceType::Fan => "Fan",
            DeviceType::Custom => "Custom",
        }
    }

    pub const ALL: [DeviceType; 6] = [
        DeviceType::Tv,
        DeviceType::Ac,
        DeviceType::Stb,
        DeviceType::Speaker,
        DeviceType::Fan,
        DeviceType::Custom,
    ];

    /// Which tags a device exposes.
    pub fn supports(&self, action: Action) -> bool {
        use Action::*;
        match self {
            DeviceType::Tv => matches!(
                action,
                Power | VolUp | VolDown | Mute | ChUp | ChDown | Input | Menu | Ok | Back
                    | Num0 | Num1 | Num2 | Num3 | Num4 | Num5 | Num6 | Num7 | Num8 | Num9
                    | Guide | Info | Exit | Home | Up | Down | Left | Right
            ),
            DeviceType::Ac => matches!(action, Power),
            DeviceType::Stb => matches!(
                action,
                Power | ChUp | ChDown | PlayPause | StopPlayback | Rewind | FastForward
                    | Record | Guide | Menu | Ok | Back | Num0 | Num1 | Num2 | Num3 | Num4
                    | Num5 | Num6 | Num7 | Num8 | Num9 | Info | Exit | Up | Down | Left | Right
            ),
            DeviceType::Speaker => matches!(
                action,
                Power | VolUp | VolDown | Mute | Input | PlayPause | BassUp | BassDown
                    | TrebleUp | TrebleDown
            ),
            DeviceType::Fan => matches!(
                action,
                Power | FanSpeed1 | FanSpeed2 | FanSpeed3 | FanSpeed4 | FanSpeed5 | FanSwing
                    | FanTimer
            ),
            DeviceType::Custom => matches!(
                action,
                Power | Custom1 | Custom2 | Custom3 | Custom4 | Custom5 | Custom6 | Custom7
                    | Custom8 | Custom9 | Custom10 | Custom11 | Custom12
            ),
        }
    }
}

/// Action tags. Ordinals are storage keys; never renumber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum Action {
    Power = 0,
    VolUp = 1,
    VolDown = 2,
    Mute = 3,
    ChUp = 4,
    ChDown = 5,
    Input = 6,
    Menu = 7,
    Ok = 8,
    Back = 9,
    Num0 = 10,
    Num1 = 11,
    Num2 = 12,
    Num3 = 13,
    Num4 = 14,
    Num5 = 15,
    Num6 = 16,
    Num7 = 17,
    Num8 = 18,
    Num9 = 19,
    Guide = 20,
    Record = 21,
    PlayPause = 22,
    StopPlayback = 23,
    Rewind = 24,
    FastForward = 25,
    Info = 26,
    Exit = 27,
    Home = 28,
    Up = 29,
    Down = 30,
    Left = 31,
    Right = 32,
    BassUp = 33,
    BassDown = 34,
    TrebleUp = 35,
    TrebleDown = 36,
    FanSpeed1 = 37,
    FanSpeed2 = 38,
    FanSpeed3 = 39,
    FanSpeed4 = 40,
    FanSpeed5 = 41,
    FanSwing = 42,
    FanTimer = 43,
    Custom1 = 44,
    Custom2 = 45,
    Custom3 = 46,
    Custom4 = 47,
    Custom5 = 48,
    Custom6 = 49,
    Custom7 = 50,
    Custom8 = 51,
    Custom9 = 52,
    Custom10 = 53,
    Custom11 = 54,
    Custom12 = 55,
}

impl Action {
    pub const ALL: [Action; 56] = [
        Action::Power,
        Action::VolUp,
        Action::VolDown,
        Action::Mute,
        Action::ChUp,
        Action::ChDown,
        Action::Input,
        Action::Menu,
        Action::Ok,
        Action::Back,
        Action::Num0,
        Action::Num1,
        Action::Num2,
        Action::Num3,
        Action::Num4,
        Action::Num5,
        Action::Num6,
        Action::Num7,
        Action::Num8,
        Action::Num9,
        Action::Guide,
        Action::Record,
        Action::PlayPause,
        Action::StopPlayback,
        Action::Rewind,
        Action::FastForward,
        Action::Info,
        Action::Exit,
        Action::Home,
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::BassUp,
        Action::BassDown,
        Action::TrebleUp,
        Action::TrebleDown,
        Action::FanSpeed1,
        Action::FanSpeed2,
        Action::FanSpeed3,
        Action::FanSpeed4,
        Action::FanSpeed5,
        Action::FanSwing,
        Action::FanTimer,
        Action::Custom1,
        Action::Custom2,
        Action::Custom3,
        Action::Custom4,
        Action::Custom5,
        Action::Custom6,
        Action::Custom7,
        Action::Custom8,
        Action::Custom9,
        Action::Custom10,
        Action::Custom11,
        Action::Custom12,
    ];

    pub fn ordinal(&self) -> u16 {
        *self as u16
    }

    /// Display name, also the string the control surface writes.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Power => "Power",
            Action::VolUp => "Vol+",
            Action::VolDown => "Vol-",
            Action::Mute => "Mute",
            Action::ChUp => "Ch+",
            Action::ChDown => "Ch-",
            Action::Input => "Input",
            Action::Menu => "Menu",
            Action::Ok => "OK",
            Action::Back => "Back",
            Action::Num0 => "Num0",
            Action::Num1 => "Num1",
            Action::Num2 => "Num2",
            Action::Num3 => "Num3",
            Action::Num4 => "Num4",
            Action::Num5 => "Num5",
            Action::Num6 => "Num6",
            Action::Num7 => "Num7",
            Action::Num8 => "Num8",
            Action::Num9 => "Num9",
            Action::Guide => "Guide",
            Action::Record => "Record",
            Action::PlayPause => "Play/Pause",
            Action::StopPlayback => "Stop",
            Action::Rewind => "Rewind",
            Action::FastForward => "FastForward",
            Action::Info => "Info",
            Action::Exit => "Exit",
            Action::Home => "Home",
            Action::Up => "Up",
            Action::Down => "Down",
            Action::Left => "Left",
            Action::Right => "Right",
            Action::BassUp => "BassUp",
            Action::BassDown => "BassDown",
            Action::TrebleUp => "TrebleUp",
            Action::TrebleDown => "TrebleDown",
            Action::FanSpeed1 => "FanSpeed1",
            Action::FanSpeed2 => "FanSpeed2",
            Action::FanSpeed3 => "FanSpeed3",
            Action::FanSpeed4 => "FanSpeed4",
            Action::FanSpeed5 => "FanSpeed5",
            Action::FanSwing => "FanSwing",
            Action::FanTimer => "FanTimer",
            Action::Custom1 => "Button_1",
            Action::Custom2 => "Button_2",
            Action::Custom3 => "Button_3",
            Action::Custom4 => "Button_4",
            Action::Custom5 => "Button_5",
            Action::Custom6 => "Button_6",
            Action::Custom7 => "Button_7",
            Action::Custom8 => "Button_8",
            Action::Custom9 => "Button_9",
            Action::Custom10 => "Button_10",
            Action::Custom11 => "Button_11",
            Action::Custom12 => "Button_12",
        }
    }

    pub fn from_name(s: &str) -> Option<Action> {
        Action::ALL
            .iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .copied()
    }
}

/// `"TV Vol+"` style label for logs.
pub fn display_name(device: DeviceType, action: Action) -> String {
    format!("{} {}", device.name(), action.name())
}

fn key(device: DeviceType, action: Action) -> String {
    format!("{}_{}", device.prefix(), action.ordinal())
}

fn raw_key(device: DeviceType, action: Action) -> String {
    format!("{}_{}_raw", device.prefix(), action.ordinal())
}

/// The persisted shape of a binding, raw buffer excluded.
#[derive(Serialize, Deserialize)]
struct StoredCode {
    protocol: Protocol,
    data: u64,
    bits: u16,
    address: u16,
    command: u16,
    flags: CodeFlags,
    carrier_hz: u32,
    duty_pct: u8,
    verify: VerifyMeta,
    learned_at: DateTime<Utc>,
}

/// Persistent (device, action) -> code bindings plus execution.
pub struct ActionStore {
    store: SharedStore,
    tx: Transmitter,
}

impl ActionStore {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            tx: Transmitter::new(),
        }
    }

    /// Persist a binding. The raw buffer, when present, goes under the
    /// sibling key; a stale sibling from a previous binding is erased.
    pub fn save(&self, device: DeviceType, action: Action, code: &IrCode) -> Result<()> {
        if !device.supports(action) {
            return Err(Error::invalid(format!(
                "{} does not expose {}",
                device.name(),
                action.name()
            )));
        }
        let record = StoredCode {
            protocol: code.protocol,
            data: code.data,
            bits: code.bits,
            address: code.address,
            command: code.command,
            flags: code.flags,
            carrier_hz: code.carrier_hz,
            duty_pct: code.duty_pct,
            verify: code.verify,
            learned_at: Utc::now(),
        };
        let blob = serde_json::to_vec(&record).map_err(|e| Error::Storage(e.to_string()))?;

        let mut guard = self.store.lock().unwrap();
        let h = guard.open(NS_ACTIONS)?;
        guard.set(h, &key(device, action), &blob)?;
        match &code.raw {
            Some(raw) => {
                let raw_blob =
                    serde_json::to_vec(raw).map_err(|e| Error::Storage(e.to_string()))?;
                guard.set(h, &raw_key(device, action), &raw_blob)?;
            }
            None => guard.erase(h, &raw_key(device, action))?,
        }
        guard.commit()?;
        tracing::info!("saved {} = {}", display_name(device, action), code.describe());
        Ok(())
    }

    /// Rehydrate a binding; Raw codes reallocate their buffer.
    pub fn load(&self, device: DeviceType, action: Action) -> Result<IrCode> {
        let mut guard = self.store.lock().unwrap();
        let h = guard.open(NS_ACTIONS)?;
        let blob = guard
            .get(h, &key(device, action))?
            .ok_or_else(|| Error::not_found(display_name(device, action)))?;
        let record: StoredCode =
            serde_json::from_slice(&blob).map_err(|e| Error::Storage(e.to_string()))?;
        let raw = match guard.get(h, &raw_key(device, action))? {
            Some(bytes) => Some(
                serde_json::from_slice::<PulseBuffer>(&bytes)
                    .map_err(|e| Error::Storage(e.to_string()))?,
            ),
            None => None,
        };
        drop(guard);

        if record.protocol == Protocol::Raw && raw.as_ref().map_or(true, |r| r.is_empty()) {
            return Err(Error::Storage(format!(
                "{} lost its raw buffer",
                display_name(device, action)
            )));
        }
        Ok(IrCode {
            protocol: record.protocol,
            data: record.data,
            bits: record.bits,
            raw,
            address: record.address,
            command: record.command,
            flags: record.flags,
            carrier_hz: record.carrier_hz,
            duty_pct: record.duty_pct,
            verify: record.verify,
        })
    }

    /// Load and transmit. Not-found is distinct from a transmit failure.
    pub fn execute(&self, sink: &mut dyn PulseSink, device: DeviceType, action: Action) -> Result<()> {
        let code = self.load(device, action)?;
        tracing::info!("executing {}", display_name(device, action));
        self.tx.transmit(sink, &code)
    }

    /// Transmit the stored code `count` times, `interval_ms` apart; 0 uses
    /// the protocol's repeat period.
    pub fn execute_repeat(
        &self,
        sink: &mut dyn PulseSink,
        device: DeviceType,
        action: Action,
        count: u32,
        interval_ms: u32,
    ) -> Result<()> {
        if count == 0 {
            return Err(Error::invalid("repeat count must be at least 1"));
        }
        let code = self.load(device, action)?;
        let interval = if interval_ms > 0 {
            interval_ms
        } else {
            Transmitter::repeat_period_ms(code.protocol)
        };
        for i in 0..count {
            if i > 0 {
                std::thread::sleep(std::time::Duration::from_millis(interval as u64));
            }
            self.tx.transmit(sink, &code)?;
        }
        Ok(())
    }

    pub fn clear(&self, device: DeviceType, action: Action) -> Result<()> {
        let mut guard = self.store.lock().unwrap();
        let h = guard.open(NS_ACTIONS)?;
        guard.erase(h, &key(device, action))?;
        guard.erase(h, &raw_key(device, action))?;
        guard.commit()?;
        tracing::info!("cleared {}", display_name(device, action));
        Ok(())
    }

    pub fn clear_device(&self, device: DeviceType) -> Result<()> {
        let mut guard = self.store.lock().unwrap();
        let h = guard.open(NS_ACTIONS)?;
        for action in Action::ALL {
            guard.erase(h, &key(device, action))?;
            guard.erase(h, &raw_key(device, action))?;
        }
        guard.commit()?;
        tracing::info!("cleared all {} bindings", device.name());
        Ok(())
    }

    pub fn clear_all(&self) -> Result<()> {
        let mut guard = self.store.lock().unwrap();
        let h = guard.open(NS_ACTIONS)?;
        guard.erase_all(h)?;
        guard.commit()?;
        tracing::info!("cleared every action binding");
        Ok(())
    }
}
