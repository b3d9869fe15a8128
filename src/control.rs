//! Device-facing controller surface.
//!
//! Each logical device exposes a write-only channel of parameter
//! mutations; a write maps to an action execution, an AC state mutation,
//! or learner arming. Writing a non-"None" string to `Learn_Mode` (or the
//! AC's `Learn_Protocol`) arms the learner for the named action;
//! "Auto-Detect" arms an AC capture whose accepted code is fed through
//! [`apply_learned_ac`].

use crate::ac::{self, AcController, AcMode, FanSpeed, SwingMode};
use crate::actions::{Action, DeviceType};
use crate::catalog::Protocol;
use crate::code::IrCode;
use crate::engine::IrEngine;
use crate::error::{Error, Result};
use crate::transmit::PulseSink;

/// A parameter write. Triggers carry no payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Trigger,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl ParamValue {
    fn as_bool(&self) -> Result<bool> {
        match self {
            ParamValue::Bool(b) => Ok(*b),
            ParamValue::Int(i) => Ok(*i != 0),
            other => Err(Error::invalid(format!("expected a boolean, got {other:?}"))),
        }
    }

    fn as_int(&self) -> Result<i64> {
        match self {
            ParamValue::Int(i) => Ok(*i),
            other => Err(Error::invalid(format!("expected an integer, got {other:?}"))),
        }
    }

    fn as_text(&self) -> Result<&str> {
        match self {
            ParamValue::Text(s) => Ok(s),
            other => Err(Error::invalid(format!("expected a string, got {other:?}"))),
        }
    }
}

/// Maps parameter writes onto the engine and the AC controller.
pub struct ControlSurface<'a> {
    engine: &'a IrEngine,
    ac: &'a AcController,
}

impl<'a> ControlSurface<'a> {
    pub fn new(engine: &'a IrEngine, ac: &'a AcController) -> Self {
        Self { engine, ac }
    }

    /// Apply one parameter write for a device.
    pub fn write(
        &self,
        sink: &mut dyn PulseSink,
        device: DeviceType,
        param: &str,
        value: ParamValue,
    ) -> Result<()> {
        if param.eq_ignore_ascii_case("Learn_Mode") {
            return self.write_learn_mode(device, value.as_text()?);
        }

        if device == DeviceType::Ac {
            return self.write_ac(sink, param, value);
        }

        // Fan speed is the one numeric parameter on the trigger devices.
        if device == DeviceType::Fan && param.eq_ignore_ascii_case("Speed") {
            let n = value.as_int()?;
            let action = match n {
                1 => Action::FanSpeed1,
                2 => Action::FanSpeed2,
                3 => Action::FanSpeed3,
                4 => Action::FanSpeed4,
                5 => Action::FanSpeed5,
                _ => return Err(Error::invalid(format!("fan speed {n} outside 1..5"))),
            };
            return self.engine.actions().execute(sink, device, action);
        }

        let action = action_for_param(param)
            .ok_or_else(|| Error::invalid(format!("unknown parameter {param}")))?;
        if !device.supports(action) {
            return Err(Error::invalid(format!(
                "{} does not expose {}",
                device.name(),
                action.name()
            )));
        }
        self.engine.actions().execute(sink, device, action)
    }

    fn write_learn_mode(&self, device: DeviceType, target: &str) -> Result<()> {
        if target.eq_ignore_ascii_case("None") {
            self.engine.learn_stop();
            return Ok(());
        }
        let action = action_for_param(target)
            .ok_or_else(|| Error::invalid(format!("unknown action {target}")))?;
        self.engine.learn(device, action, None)
    }

    fn write_ac(&self, sink: &mut dyn PulseSink, param: &str, value: ParamValue) -> Result<()> {
        match param {
            "Power" => self.ac.set_power(sink, value.as_bool()?),
            "Mode" => self.ac.set_mode(sink, parse_mode(value.as_text()?)?),
            "Temperature" => {
                let t = value.as_int()?;
                if !(0..=255).contains(&t) {
                    return Err(Error::invalid(format!("temperature {t} out of range")));
                }
                self.ac.set_temperature(sink, t as u8)
            }
            "Fan_Speed" => self.ac.set_fan(sink, parse_fan(value.as_text()?)?),
            "Swing" => {
                let swing = if value.as_bool()? {
                    SwingMode::Vertical
                } else {
                    SwingMode::Off
                };
                self.ac.set_swing(sink, swing)
            }
            "Learn_Protocol" => {
                let text = value.as_text()?;
                if text.eq_ignore_ascii_case("None") {
                    self.engine.learn_stop();
                    Ok(())
                } else if text.eq_ignore_ascii_case("Auto-Detect") {
                    // The accepted capture flows back through
                    // `apply_learned_ac` in the embedder's success callback.
                    self.engine.learn(DeviceType::Ac, Action::Power, None)
                } else {
                    let protocol: Protocol = text
                        .parse()
                        .map_err(|_| Error::invalid(format!("unknown protocol {text}")))?;
                    self.ac.set_protocol(protocol, 0)
                }
            }
            other => Err(Error::invalid(format!("unknown AC parameter {other}"))),
        }
    }
}

/// Auto-detect path: identify the AC protocol of a learned capture and
/// configure the controller with it.
pub fn apply_learned_ac(ac: &AcController, code: &IrCode) -> Result<()> {
    let protocol = ac::identify(code)
        .ok_or_else(|| Error::unsupported("capture does not match any AC protocol"))?;
    ac.set_protocol(protocol, 0)
}

/// Parameter strings of the controller surface, including the spellings
/// that differ from the action display names.
fn action_for_param(param: &str) -> Option<Action> {
    if param.eq_ignore_ascii_case("Play_Pause") {
        return Some(Action::PlayPause);
    }
    Action::from_name(param)
}

fn parse_mode(s: &str) -> Result<AcMode> {
    for m in [
        AcMode::Off,
        AcMode::Auto,
        AcMode::Cool,
        AcMode::Heat,
        AcMode::Dry,
        AcMode::Fan,
    ] {
        if m.name().eq_ignore_ascii_case(s) {
            return Ok(m);
        }
    }
    Err(Error::invalid(format!("unknown AC mode {s}")))
}

fn parse_fan(s: &str) -> Result<FanSpeed> {
    for f in [
        FanSpeed::Auto,
        FanSpeed::Low,
        FanSpeed::Med,
        FanSpeed::High,
        FanSpeed::Quiet,
        FanSpeed::Turbo,
    ] {
        if f.name().eq_ignore_ascii_case(s) {
            return Ok(f);
        }
    }
    Err(Error::invalid(format!("unknown fan speed {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Protocol;
    use crate::config::EngineConfig;
    use crate::store::{shared, MemoryStore};
    use crate::transmit::RecordingSink;

    fn fixture() -> (IrEngine, AcController) {
        let store = shared(MemoryStore::new());
        (
            IrEngine::new(store.clone(), &EngineConfig::default()),
            AcController::new(store),
        )
    }

    #[test]
    fn tv_trigger_executes_the_stored_binding() {
        let (engine, ac) = fixture();
        let code = IrCode::decoded(Protocol::Nec, 0x00FF_E01F, 32);
        engine
            .actions()
            .save(DeviceType::Tv, Action::VolUp, &code)
            .unwrap();

        let surface = ControlSurface::new(&engine, &ac);
        let mut sink = RecordingSink::new();
        surface
            .write(&mut sink, DeviceType::Tv, "Vol+", ParamValue::Trigger)
            .unwrap();
        assert_eq!(sink.sent.len(), 1);
    }

    #[test]
    fn ac_parameters_route_to_the_state_machine() {
        let (engine, ac) = fixture();
        ac.set_protocol(Protocol::Daikin, 0).unwrap();
        let surface = ControlSurface::new(&engine, &ac);
        let mut sink = RecordingSink::new();

        surface
            .write(&mut sink, DeviceType::Ac, "Power", ParamValue::Bool(true))
            .unwrap();
        surface
            .write(&mut sink, DeviceType::Ac, "Temperature", ParamValue::Int(21))
            .unwrap();
        surface
            .write(
                &mut sink,
                DeviceType::Ac,
                "Mode",
                ParamValue::Text("Cool".into()),
            )
            .unwrap();

        let state = ac.state();
        assert!(state.power);
        assert_eq!(state.temperature, 21);
        assert_eq!(state.mode, AcMode::Cool);
        assert_eq!(sink.sent.len(), 3);
    }

    #[test]
    fn learn_mode_arms_and_disarms_the_learner() {
        let (engine, ac) = fixture();
        let surface = ControlSurface::new(&engine, &ac);
        let mut sink = RecordingSink::new();
        surface
            .write(
                &mut sink,
                DeviceType::Tv,
                "Learn_Mode",
                ParamValue::Text("Power".into()),
            )
            .unwrap();
        assert!(engine.is_learning());
        surface
            .write(
                &mut sink,
                DeviceType::Tv,
                "Learn_Mode",
                ParamValue::Text("None".into()),
            )
            .unwrap();
        assert!(!engine.is_learning());
    }

    #[test]
    fn learn_protocol_accepts_names_and_auto_detect() {
        let (engine, ac) = fixture();
        let surface = ControlSurface::new(&engine, &ac);
        let mut sink = RecordingSink::new();

        surface
            .write(
                &mut sink,
                DeviceType::Ac,
                "Learn_Protocol",
                ParamValue::Text("Midea".into()),
            )
            .unwrap();
        assert_eq!(ac.state().protocol, Protocol::Midea);
        assert!(ac.state().learned);

        surface
            .write(
                &mut sink,
                DeviceType::Ac,
                "Learn_Protocol",
                ParamValue::Text("Auto-Detect".into()),
            )
            .unwrap();
        assert!(engine.is_learning());
    }

    #[test]
    fn auto_detect_helper_configures_the_identified_protocol() {
        let (_, ac) = fixture();
        let raw = IrCode {
            protocol: Protocol::PulseDistance,
            bits: 28,
            ..IrCode::default()
        };
        apply_learned_ac(&ac, &raw).unwrap();
        assert_eq!(ac.state().protocol, Protocol::Lg2);
    }

    #[test]
    fn fan_speed_writes_map_to_the_numbered_actions() {
        let (engine, ac) = fixture();
        let code = IrCode::decoded(Protocol::Nec, 0x20DF_10EF, 32);
        engine
            .actions()
            .save(DeviceType::Fan, Action::FanSpeed3, &code)
            .unwrap();
        let surface = ControlSurface::new(&engine, &ac);
        let mut sink = RecordingSink::new();
        surface
            .write(&mut sink, DeviceType::Fan, "Speed", ParamValue::Int(3))
            .unwrap();
        assert_eq!(sink.sent.len(), 1);
        assert!(matches!(
            surface.write(&mut sink, DeviceType::Fan, "Speed", ParamValue::Int(9)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn unknown_parameters_reject_without_side_effects() {
        let (engine, ac) = fixture();
        let surface = ControlSurface::new(&engine, &ac);
        let mut sink = RecordingSink::new();
        assert!(matches!(
            surface.write(&mut sink, DeviceType::Tv, "Warp", ParamValue::Trigger),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            surface.write(&mut sink, DeviceType::Speaker, "Guide", ParamValue::Trigger),
            Err(Error::InvalidArgument(_))
        ));
        assert!(sink.sent.is_empty());
    }
}
