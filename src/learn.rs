//! Learner pipeline: noise filtering, gap trimming, and multi-frame
//! agreement before a code is accepted as learned.
//!
//! State machine: Idle -> Armed(device, action, deadline), then per pulse
//! buffer Filter -> Trim -> Decode -> Verify -> {Learned | Armed | Failed}.
//! A deadline timer fails the learn; an external stop returns to Idle
//! without firing callbacks. Decoding itself lives in the orchestrator;
//! this module owns the cleanup passes and the agreement counter.

use std::time::{Duration, Instant};

use crate::actions::{Action, DeviceType};
use crate::code::IrCode;
use crate::pulse::{PulseBuffer, RAW_VERIFY_TOLERANCE_PCT};

/// Default arming deadline.
pub const DEFAULT_LEARN_TIMEOUT: Duration = Duration::from_secs(30);

/// Consecutive agreeing frames for commercial-grade acceptance.
pub const COMMERCIAL_FRAMES: u8 = 3;

/// Floor for a minimally acceptable code.
pub const MINIMUM_FRAMES: u8 = 2;

/// Marks below this are receiver noise.
const NOISE_MARK_US: u32 = 100;

/// Idle gaps above this are trimmed off the burst ends.
const GAP_US: u32 = 50_000;

/// Buffers outside this pair-count window classify as noise and are dropped
/// silently.
pub const MIN_LEARN_PAIRS: usize = 10;
pub const MAX_LEARN_PAIRS: usize = crate::pulse::MAX_PAIRS;

/// Noise gate: too short or too long to be a remote frame.
pub fn is_noise(buf: &PulseBuffer) -> bool {
    buf.len() < MIN_LEARN_PAIRS || buf.len() > MAX_LEARN_PAIRS
}

/// Remove sub-100 us marks, absorbing their time into the previous pair's
/// space. Returns whether anything was removed. Idempotent.
pub fn filter_noise(buf: &mut PulseBuffer) -> bool {
    let pairs = buf.pairs_mut();
    let mut removed = false;
    let mut i = 0;
    while i < pairs.len() {
        if pairs[i].mark_us < NOISE_MARK_US {
            let absorbed = pairs[i].mark_us + pairs[i].space_us;
            pairs.remove(i);
            removed = true;
            if i > 0 {
                // End-of-burst zero spaces stay zero.
                if pairs[i - 1].space_us > 0 {
                    pairs[i - 1].space_us += absorbed;
                }
            }
        } else {
            i += 1;
        }
    }
    removed
}

/// Drop leading idle and clamp a trailing gap above 50 ms to the
/// end-of-burst marker. Returns whether anything changed. Idempotent.
pub fn trim_gaps(buf: &mut PulseBuffer) -> bool {
    let pairs = buf.pairs_mut();
    let mut trimmed = false;
    while pairs.first().is_some_and(|p| p.mark_us == 0) {
        pairs.remove(0);
        trimmed = true;
    }
    if let Some(last) = pairs.last_mut() {
        if last.space_us > GAP_US {
            last.space_us = 0;
            trimmed = true;
        }
    }
    trimmed
}

/// What an offered frame did to the armed learner.
#[derive(Debug)]
pub enum LearnOutcome {
    /// Agreement threshold reached; the code carries its frame count.
    Accepted(IrCode),
    /// Frame agreed with the pending candidate; more needed.
    Pending(u8),
    /// Frame disagreed; it replaced the candidate and the count restarted.
    Restarted,
    /// Learner is not armed.
    NotArmed,
}

#[derive(Debug, Clone)]
struct Armed {
    device: DeviceType,
    action: Action,
    deadline: Instant,
}

/// Multi-frame verification state. One per engine.
pub struct Learner {
    armed: Option<Armed>,
    pending: Option<IrCode>,
    agreed: u8,
    frames_required: u8,
    raw_tolerance_pct: u32,
}

impl Learner {
    /// `frames_required` is clamped to at least [`MINIMUM_FRAMES`].
    pub fn new(frames_required: u8) -> Self {
        Self::with_raw_tolerance(frames_required, RAW_VERIFY_TOLERANCE_PCT)
    }

    pub fn with_raw_tolerance(frames_required: u8, raw_tolerance_pct: u32) -> Self {
        Self {
            armed: None,
            pending: None,
            agreed: 0,
            frames_required: frames_required.max(MINIMUM_FRAMES),
            raw_tolerance_pct,
        }
    }

    pub fn arm(&mut self, device: DeviceType, action: Action, timeout: Duration) {
        tracing::info!(
            "learning armed for {} / {} ({}s deadline)",
            device.name(),
            action.name(),
            timeout.as_secs()
        );
        self.armed = Some(Armed {
            device,
            action,
            deadline: Instant::now() + timeout,
        });
        self.pending = None;
        self.agreed = 0;
    }

    /// External stop: back to Idle, no callbacks. Idempotent.
    pub fn stop(&mut self) {
        if self.armed.take().is_some() {
            tracing::info!("learning stopped");
        }
        self.pending = None;
        self.agreed = 0;
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn target(&self) -> Option<(DeviceType, Action)> {
        self.armed.as_ref().map(|a| (a.device, a.action))
    }

    /// Disarm if the deadline elapsed, returning the failed target so the
    /// caller can fire the fail callback. Idempotent.
    pub fn expire(&mut self, now: Instant) -> Option<(DeviceType, Action)> {
        if self.armed.as_ref().is_some_and(|a| now >= a.deadline) {
            let a = self.armed.take().unwrap();
            self.pending = None;
            self.agreed = 0;
            tracing::warn!(
                "learn deadline elapsed for {} / {}",
                a.device.name(),
                a.action.name()
            );
            return Some((a.device, a.action));
        }
        None
    }

    /// Feed one decoded (or raw-fallback) frame into verification.
    pub fn offer(&mut self, code: IrCode) -> LearnOutcome {
        let Some(armed) = self.armed.clone() else {
            return LearnOutcome::NotArmed;
        };

        let agrees = match &self.pending {
            Some(pending) => frames_agree(pending, &code, self.raw_tolerance_pct),
            None => false,
        };

        if agrees {
            self.agreed += 1;
        } else {
            let restarted = self.pending.is_some();
            self.pending = Some(code);
            self.agreed = 1;
            if restarted {
                tracing::debug!("learn frame disagreed; candidate replaced");
                return LearnOutcome::Restarted;
            }
            return LearnOutcome::Pending(1);
        }

        if self.agreed >= self.frames_required {
            let mut accepted = self.pending.take().unwrap();
            accepted.verify.frames_matched = self.agreed;
            self.armed = None;
            self.agreed = 0;
            tracing::info!(
                "learned {} for {} / {}",
                accepted.describe(),
                armed.device.name(),
                armed.action.name()
            );
            LearnOutcome::Accepted(accepted)
        } else {
            LearnOutcome::Pending(self.agreed)
        }
    }
}

/// Agreement: symbolic identity for fixed codes; equal length and a
/// per-timing percent window (20 by default) for raw codes.
fn frames_agree(pending: &IrCode, fresh: &IrCode, raw_pct: u32) -> bool {
    if pending.is_raw() != fresh.is_raw() {
        return false;
    }
    if pending.is_raw() {
        match (&pending.raw, &fresh.raw) {
            (Some(a), Some(b)) => a.matches(b, raw_pct),
            _ => false,
        }
    } else {
        pending.same_symbol(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Protocol;
    use crate::pulse::PulsePair;

    fn nec_code() -> IrCode {
        IrCode::decoded(Protocol::Nec, 0x00FF_E01F, 32)
    }

    fn armed_learner(frames: u8) -> Learner {
        let mut l = Learner::new(frames);
        l.arm(DeviceType::Tv, Action::Power, DEFAULT_LEARN_TIMEOUT);
        l
    }

    #[test]
    fn three_identical_frames_raise_success() {
        let mut l = armed_learner(COMMERCIAL_FRAMES);
        assert!(matches!(l.offer(nec_code()), LearnOutcome::Pending(1)));
        assert!(matches!(l.offer(nec_code()), LearnOutcome::Pending(2)));
        match l.offer(nec_code()) {
            LearnOutcome::Accepted(code) => {
                assert_eq!(code.verify.frames_matched, 3);
                assert!(!l.is_armed());
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[test]
    fn three_distinct_frames_never_succeed() {
        let mut l = armed_learner(COMMERCIAL_FRAMES);
        for data in [0x11u64, 0x22, 0x33] {
            let code = IrCode::decoded(Protocol::Nec, data, 32);
            assert!(!matches!(l.offer(code), LearnOutcome::Accepted(_)));
        }
        assert!(l.is_armed());
    }

    #[test]
    fn disagreement_keeps_the_newest_candidate() {
        let mut l = armed_learner(MINIMUM_FRAMES);
        l.offer(nec_code());
        let other = IrCode::decoded(Protocol::Nec, 0x1234_5678, 32);
        assert!(matches!(l.offer(other.clone()), LearnOutcome::Restarted));
        // The replacement is now the candidate: one agreement completes.
        match l.offer(other) {
            LearnOutcome::Accepted(code) => assert_eq!(code.data, 0x1234_5678),
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[test]
    fn raw_frames_agree_within_twenty_percent() {
        let mut l = armed_learner(MINIMUM_FRAMES);
        let a = IrCode::raw(PulseBuffer::from_pairs(vec![PulsePair::new(1000, 500); 12]));
        let b = IrCode::raw(PulseBuffer::from_pairs(vec![PulsePair::new(1150, 560); 12]));
        l.offer(a);
        assert!(matches!(l.offer(b), LearnOutcome::Accepted(_)));
    }

    #[test]
    fn raw_frames_outside_tolerance_restart() {
        let mut l = armed_learner(MINIMUM_FRAMES);
        let a = IrCode::raw(PulseBuffer::from_pairs(vec![PulsePair::new(1000, 500); 12]));
        let b = IrCode::raw(PulseBuffer::from_pairs(vec![PulsePair::new(1400, 500); 12]));
        l.offer(a);
        assert!(matches!(l.offer(b), LearnOutcome::Restarted));
    }

    #[test]
    fn stop_returns_to_idle_silently() {
        let mut l = armed_learner(COMMERCIAL_FRAMES);
        l.offer(nec_code());
        l.stop();
        assert!(!l.is_armed());
        assert!(matches!(l.offer(nec_code()), LearnOutcome::NotArmed));
        l.stop(); // idempotent
    }

    #[test]
    fn deadline_expiry_reports_the_target_once() {
        let mut l = Learner::new(COMMERCIAL_FRAMES);
        l.arm(DeviceType::Tv, Action::Mute, Duration::from_secs(0));
        let now = Instant::now() + Duration::from_millis(1);
        assert_eq!(l.expire(now), Some((DeviceType::Tv, Action::Mute)));
        assert_eq!(l.expire(now), None);
    }

    #[test]
    fn noise_filter_is_idempotent() {
        let mut buf = PulseBuffer::from_pairs(vec![
            PulsePair::new(560, 560),
            PulsePair::new(40, 300),
            PulsePair::new(560, 1690),
            PulsePair::new(80, 80),
            PulsePair::new(560, 0),
        ]);
        assert!(filter_noise(&mut buf));
        let once = buf.clone();
        assert!(!filter_noise(&mut buf));
        assert_eq!(buf, once);
        assert_eq!(buf.len(), 3);
        // First glitch's 340 us got absorbed into the previous space.
        assert_eq!(buf[0].space_us, 560 + 40 + 300);
    }

    #[test]
    fn gap_trim_is_idempotent() {
        let mut buf = PulseBuffer::from_pairs(vec![
            PulsePair::new(0, 120_000),
            PulsePair::new(560, 560),
            PulsePair::new(560, 90_000),
        ]);
        assert!(trim_gaps(&mut buf));
        let once = buf.clone();
        assert!(!trim_gaps(&mut buf));
        assert_eq!(buf, once);
        assert_eq!(buf.len(), 2);
        assert_eq!(buf[1].space_us, 0);
    }

    #[test]
    fn noise_gate_bounds() {
        assert!(is_noise(&PulseBuffer::from_pairs(vec![
            PulsePair::new(560, 560);
            9
        ])));
        assert!(!is_noise(&PulseBuffer::from_pairs(vec![
            PulsePair::new(560, 560);
            10
        ])));
        assert!(is_noise(&PulseBuffer::from_pairs(vec![
            PulsePair::new(560, 560);
            257
        ])));
    }
}
