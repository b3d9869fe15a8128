//! Learning/transmit orchestrator.
//!
//! Owns the decoder cascade, arbitrates learner versus normal receive, and
//! keeps the legacy button-index table in sync with the action store. The
//! pulse source hands completed buffers through a bounded queue
//! ([`PulseQueue`], capacity 10 by default); a queue overflow is recorded
//! on the next accepted code's overflow flag and otherwise discarded. The
//! receive task blocks on the queue, runs filter/trim/decode, and invokes
//! callbacks inline - callbacks must return within one inter-frame gap
//! (about 100 ms) or repeat frames get dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::actions::{display_name, Action, ActionStore, DeviceType};
use crate::catalog::Protocol;
use crate::code::IrCode;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::learn::{self, LearnOutcome, Learner};
use crate::protocols::{DecoderCascade, NEC_REPEAT_GATE_MS};
use crate::pulse::PulseBuffer;
use crate::store::{SharedStore, NS_CODES};

type LearnSuccessFn = dyn Fn(DeviceType, Action, &IrCode) + Send + Sync;
type LearnFailFn = dyn Fn(DeviceType, Action) + Send + Sync;
type ReceiveFn = dyn Fn(&IrCode) + Send + Sync;

#[derive(Default)]
struct Callbacks {
    on_learn_success: Option<Box<LearnSuccessFn>>,
    on_learn_fail: Option<Box<LearnFailFn>>,
    on_receive: Option<Box<ReceiveFn>>,
}

/// Producer half of the bounded receive queue. Clone freely; `offer` never
/// blocks the edge-driven source.
#[derive(Clone)]
pub struct PulseQueue {
    tx: SyncSender<PulseBuffer>,
    overflow: Arc<AtomicBool>,
}

impl PulseQueue {
    /// Enqueue a completed burst. On a full queue the buffer is discarded
    /// and the overflow marker set for the next accepted code.
    pub fn offer(&self, buf: PulseBuffer) -> bool {
        match self.tx.try_send(buf) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.overflow.store(true, Ordering::SeqCst);
                tracing::warn!("pulse queue overflow; burst discarded");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// The legacy button-index table, kept in sync with the action store for
/// backward compatibility. Blobs live in `ir_codes` as `btn_<i>`/`raw_<i>`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LegacyMap {
    entries: Vec<(u16, DeviceType, Action)>,
}

const LEGACY_MAP_KEY: &str = "btn_map";

/// The engine: decoder cascade, learner, callbacks, queue.
pub struct IrEngine {
    cascade: DecoderCascade,
    learner: Mutex<Learner>,
    actions: ActionStore,
    store: SharedStore,
    callbacks: Mutex<Callbacks>,
    queue: PulseQueue,
    receiver: Mutex<Option<Receiver<PulseBuffer>>>,
    running: AtomicBool,
    overflow: Arc<AtomicBool>,
    /// Last full (non-repeat) frame and when it arrived; gates NEC repeats.
    last_full: Mutex<Option<(IrCode, Instant)>>,
    learn_timeout: Duration,
}

impl IrEngine {
    pub fn new(store: SharedStore, config: &EngineConfig) -> Self {
        let (tx, rx) = sync_channel(config.queue_capacity.max(1));
        let overflow = Arc::new(AtomicBool::new(false));
        Self {
            cascade: DecoderCascade::new(),
            learner: Mutex::new(Learner::with_raw_tolerance(
                config.frames_required,
                config.raw_tolerance_pct,
            )),
            actions: ActionStore::new(store.clone()),
            store,
            callbacks: Mutex::new(Callbacks::default()),
            queue: PulseQueue {
                tx,
                overflow: overflow.clone(),
            },
            receiver: Mutex::new(Some(rx)),
            running: AtomicBool::new(false),
            overflow,
            last_full: Mutex::new(None),
            learn_timeout: Duration::from_secs(config.learn_timeout_secs),
        }
    }

    /// The producer handle for the pulse source.
    pub fn queue(&self) -> PulseQueue {
        self.queue.clone()
    }

    pub fn actions(&self) -> &ActionStore {
        &self.actions
    }

    pub fn on_learn_success(&self, f: impl Fn(DeviceType, Action, &IrCode) + Send + Sync + 'static) {
        self.callbacks.lock().unwrap().on_learn_success = Some(Box::new(f));
    }

    pub fn on_learn_fail(&self, f: impl Fn(DeviceType, Action) + Send + Sync + 'static) {
        self.callbacks.lock().unwrap().on_learn_fail = Some(Box::new(f));
    }

    pub fn on_receive(&self, f: impl Fn(&IrCode) + Send + Sync + 'static) {
        self.callbacks.lock().unwrap().on_receive = Some(Box::new(f));
    }

    /// Arm the learner for a (device, action) binding.
    pub fn learn(&self, device: DeviceType, action: Action, timeout: Option<Duration>) -> Result<()> {
        if !device.supports(action) {
            return Err(Error::invalid(format!(
                "{} does not expose {}",
                device.name(),
                action.name()
            )));
        }
        self.learner
            .lock()
            .unwrap()
            .arm(device, action, timeout.unwrap_or(self.learn_timeout));
        Ok(())
    }

    /// Disarm without callbacks. Idempotent.
    pub fn learn_stop(&self) {
        self.learner.lock().unwrap().stop();
    }

    pub fn is_learning(&self) -> bool {
        self.learner.lock().unwrap().is_armed()
    }

    /// The single receive task: blocks on the queue until [`shutdown`].
    /// Decode is CPU-bound and runs inline; callbacks too.
    pub fn run(&self) {
        let rx = match self.receiver.lock().unwrap().take() {
            Some(rx) => rx,
            None => {
                tracing::warn!("receive task already running");
                return;
            }
        };
        self.running.store(true, Ordering::SeqCst);
        tracing::info!("receive task started");
        while self.running.load(Ordering::SeqCst) {
            match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(buf) => {
                    self.handle_buffer(buf);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            self.tick(Instant::now());
        }
        *self.receiver.lock().unwrap() = Some(rx);
        tracing::info!("receive task stopped");
    }

    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Drive the learner deadline. Called from the receive loop; exposed so
    /// embedders without the loop can pump it.
    pub fn tick(&self, now: Instant) {
        let expired = self.learner.lock().unwrap().expire(now);
        if let Some((device, action)) = expired {
            let cbs = self.callbacks.lock().unwrap();
            if let Some(cb) = &cbs.on_learn_fail {
                cb(device, action);
            }
        }
    }

    /// Process one completed burst: filter, trim, decode, then learner or
    /// on-receive. Returns what was delivered, for callers that poll.
    pub fn handle_buffer(&self, mut buf: PulseBuffer) -> Option<IrCode> {
        let filtered = learn::filter_noise(&mut buf);
        let trimmed = learn::trim_gaps(&mut buf);

        let decoded = self.cascade.decode(&buf).and_then(|mut code| {
            code.verify.noise_filtered = filtered;
            code.verify.gap_trimmed = trimmed;
            self.resolve_repeat(code)
        });

        let learning = self.learner.lock().unwrap().is_armed();
        if learning {
            let offer = match decoded {
                Some(code) => Some(code),
                // Raw fallback: undecodable but plausible bursts learn as Raw.
                None if !learn::is_noise(&buf) => Some(IrCode::raw(buf)),
                None => None, // noise, dropped silently
            };
            let mut offer = offer?;
            if self.overflow.swap(false, Ordering::SeqCst) {
                offer.flags.overflow = true;
            }
            let (target, outcome) = {
                let mut learner = self.learner.lock().unwrap();
                let target = learner.target();
                (target, learner.offer(offer))
            };
            return self.finish_learn(target?, outcome);
        }

        let mut code = decoded?;
        if self.overflow.swap(false, Ordering::SeqCst) {
            code.flags.overflow = true;
        }
        let cbs = self.callbacks.lock().unwrap();
        if let Some(cb) = &cbs.on_receive {
            cb(&code);
        }
        Some(code)
    }

    /// NEC repeat frames only qualify within 200 ms of a full frame; inside
    /// the window they re-deliver the last code with the repeat flag, past
    /// it they are stray and dropped.
    fn resolve_repeat(&self, code: IrCode) -> Option<IrCode> {
        let mut last = self.last_full.lock().unwrap();
        if !code.flags.repeat {
            *last = Some((code.clone(), Instant::now()));
            return Some(code);
        }
        match &*last {
            Some((full, at))
                if code.protocol == Protocol::Nec
                    && at.elapsed() <= Duration::from_millis(NEC_REPEAT_GATE_MS) =>
            {
                let mut repeat = full.clone();
                repeat.flags.repeat = true;
                Some(repeat)
            }
            _ => {
                tracing::debug!("stray repeat frame outside the gate; dropped");
                None
            }
        }
    }

    fn finish_learn(
        &self,
        (device, action): (DeviceType, Action),
        outcome: LearnOutcome,
    ) -> Option<IrCode> {
        let LearnOutcome::Accepted(code) = outcome else {
            return None;
        };
        // The learner disarmed itself; bind, sync the legacy table, notify.
        if let Err(e) = self.actions.save(device, action, &code) {
            tracing::warn!("failed to persist {}: {e}", display_name(device, action));
            let cbs = self.callbacks.lock().unwrap();
            if let Some(cb) = &cbs.on_learn_fail {
                cb(device, action);
            }
            return None;
        }
        if let Err(e) = self.sync_legacy(device, action, &code) {
            tracing::warn!("legacy table out of sync: {e}");
        }
        let cbs = self.callbacks.lock().unwrap();
        if let Some(cb) = &cbs.on_learn_success {
            cb(device, action, &code);
        }
        Some(code)
    }

    /// Mirror a binding into the legacy `btn_<i>` table.
    fn sync_legacy(&self, device: DeviceType, action: Action, code: &IrCode) -> Result<()> {
        let mut guard = self.store.lock().unwrap();
        let h = guard.open(NS_CODES)?;
        let mut map: LegacyMap = guard
            .get(h, LEGACY_MAP_KEY)?
            .and_then(|b| serde_json::from_slice(&b).ok())
            .unwrap_or_default();

        let index = match map
            .entries
            .iter()
            .find(|(_, d, a)| *d == device && *a == action)
        {
            Some((i, _, _)) => *i,
            None => {
                let next = map.entries.iter().map(|(i, _, _)| i + 1).max().unwrap_or(0);
                map.entries.push((next, device, action));
                let blob =
                    serde_json::to_vec(&map).map_err(|e| Error::Storage(e.to_string()))?;
                guard.set(h, LEGACY_MAP_KEY, &blob)?;
                next
            }
        };

        let mut stripped = code.clone();
        let raw = stripped.raw.take();
        let blob = serde_json::to_vec(&stripped).map_err(|e| Error::Storage(e.to_string()))?;
        guard.set(h, &format!("btn_{index}"), &blob)?;
        match raw {
            Some(raw) => {
                let raw_blob =
                    serde_json::to_vec(&raw).map_err(|e| Error::Storage(e.to_string()))?;
                guard.set(h, &format!("raw_{index}"), &raw_blob)?;
            }
            None => guard.erase(h, &format!("raw_{index}"))?,
        }
        guard.commit()
    }

    /// Load a code from the legacy table by button index.
    pub fn legacy_code(&self, index: u16) -> Result<IrCode> {
        let mut guard = self.store.lock().unwrap();
        let h = guard.open(NS_CODES)?;
        let blob = guard
            .get(h, &format!("btn_{index}"))?
            .ok_or_else(|| Error::not_found(format!("button {index}")))?;
        let mut code: IrCode =
            serde_json::from_slice(&blob).map_err(|e| Error::Storage(e.to_string()))?;
        if let Some(raw_blob) = guard.get(h, &format!("raw_{index}"))? {
            code.raw = serde_json::from_slice(&raw_blob)
                .map_err(|e| Error::Storage(e.to_string()))?;
        }
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::protocols::synthesize_frame;
    use crate::pulse::PulsePair;
    use crate::store::{shared, MemoryStore};
    use crate::transmit::RecordingSink;

    fn engine() -> IrEngine {
        IrEngine::new(shared(MemoryStore::new()), &EngineConfig::default())
    }

    fn nec_frame() -> PulseBuffer {
        synthesize_frame(&catalog::NEC, 0x00FF_E01F, 32)
    }

    #[test]
    fn s7_three_frame_learn_binds_and_replays() {
        let eng = engine();
        let seen: Arc<Mutex<Vec<(DeviceType, Action, u8)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink_log = seen.clone();
        eng.on_learn_success(move |d, a, code| {
            sink_log.lock().unwrap().push((d, a, code.verify.frames_matched));
        });

        eng.learn(DeviceType::Tv, Action::Power, None).unwrap();
        for _ in 0..3 {
            eng.handle_buffer(nec_frame());
        }

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], (DeviceType::Tv, Action::Power, 3));
        assert!(!eng.is_learning());
        drop(events);

        // The binding replays through the sink at 38 kHz.
        let mut sink = RecordingSink::new();
        eng.actions()
            .execute(&mut sink, DeviceType::Tv, Action::Power)
            .unwrap();
        assert_eq!(sink.carriers, vec![(38_000, 0.33)]);
        assert_eq!(sink.sent.len(), 1);

        // And the legacy table mirrors it under button 0.
        let legacy = eng.legacy_code(0).unwrap();
        assert_eq!(legacy.data, 0x00FF_E01F);
    }

    #[test]
    fn distinct_frames_keep_the_learner_armed() {
        let eng = engine();
        eng.learn(DeviceType::Tv, Action::Mute, None).unwrap();
        for data in [0x00FF_E01Fu64, 0x00FF_629D, 0x00FF_A857] {
            eng.handle_buffer(synthesize_frame(&catalog::NEC, data, 32));
        }
        assert!(eng.is_learning());
    }

    #[test]
    fn raw_fallback_learns_undecodable_bursts() {
        let eng = engine();
        let learned: Arc<Mutex<Option<IrCode>>> = Arc::new(Mutex::new(None));
        let log = learned.clone();
        eng.on_learn_success(move |_, _, code| {
            *log.lock().unwrap() = Some(code.clone());
        });
        eng.learn(DeviceType::Custom, Action::Custom1, None).unwrap();

        // 14 pairs of nothing any decoder accepts.
        let burst = || PulseBuffer::from_pairs(vec![PulsePair::new(420, 6000); 14]);
        for _ in 0..3 {
            eng.handle_buffer(burst());
        }
        let code = learned.lock().unwrap().clone().expect("raw learn");
        assert_eq!(code.protocol, Protocol::Raw);
        assert_eq!(code.raw.as_ref().unwrap().len(), 14);
    }

    #[test]
    fn short_noise_is_dropped_silently_while_learning() {
        let eng = engine();
        eng.learn(DeviceType::Tv, Action::Power, None).unwrap();
        let noise = PulseBuffer::from_pairs(vec![PulsePair::new(300, 300); 5]);
        assert!(eng.handle_buffer(noise).is_none());
        assert!(eng.is_learning());
    }

    #[test]
    fn learn_timeout_fires_the_fail_callback_once() {
        let eng = engine();
        let failed: Arc<Mutex<Vec<(DeviceType, Action)>>> = Arc::new(Mutex::new(Vec::new()));
        let log = failed.clone();
        eng.on_learn_fail(move |d, a| log.lock().unwrap().push((d, a)));

        eng.learn(DeviceType::Stb, Action::Guide, Some(Duration::from_secs(0)))
            .unwrap();
        let later = Instant::now() + Duration::from_millis(5);
        eng.tick(later);
        eng.tick(later);
        assert_eq!(failed.lock().unwrap().as_slice(), &[(DeviceType::Stb, Action::Guide)]);
        assert!(!eng.is_learning());
    }

    #[test]
    fn gated_repeat_redelivers_the_last_full_code() {
        let eng = engine();
        let received: Arc<Mutex<Vec<IrCode>>> = Arc::new(Mutex::new(Vec::new()));
        let log = received.clone();
        eng.on_receive(move |code| log.lock().unwrap().push(code.clone()));

        eng.handle_buffer(nec_frame());
        let mut repeat = PulseBuffer::new();
        repeat.push_pair(9000, 2250);
        repeat.push_pair(560, 0);
        eng.handle_buffer(repeat);

        let seen = received.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].data, 0x00FF_E01F);
        assert!(seen[1].flags.repeat);
        assert!(!seen[0].flags.repeat);
    }

    #[test]
    fn stray_repeat_without_a_prior_frame_is_dropped() {
        let eng = engine();
        let mut repeat = PulseBuffer::new();
        repeat.push_pair(9000, 2250);
        repeat.push_pair(560, 0);
        assert!(eng.handle_buffer(repeat).is_none());
    }

    #[test]
    fn queue_overflow_marks_the_next_accepted_code() {
        let mut config = EngineConfig::default();
        config.queue_capacity = 2;
        let eng = IrEngine::new(shared(MemoryStore::new()), &config);
        let q = eng.queue();
        assert!(q.offer(nec_frame()));
        assert!(q.offer(nec_frame()));
        assert!(!q.offer(nec_frame())); // full: discarded, overflow latched

        let code = eng.handle_buffer(nec_frame()).unwrap();
        assert!(code.flags.overflow);
        // The marker is consumed by one code only.
        let next = eng.handle_buffer(nec_frame()).unwrap();
        assert!(!next.flags.overflow);
    }

    #[test]
    fn learn_rejects_actions_the_device_does_not_expose() {
        let eng = engine();
        assert!(matches!(
            eng.learn(DeviceType::Fan, Action::Guide, None),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn receive_task_runs_and_shuts_down() {
        let eng = Arc::new(engine());
        let received: Arc<Mutex<Vec<IrCode>>> = Arc::new(Mutex::new(Vec::new()));
        let log = received.clone();
        eng.on_receive(move |code| log.lock().unwrap().push(code.clone()));

        let q = eng.queue();
        let runner = eng.clone();
        let handle = std::thread::spawn(move || runner.run());
        q.offer(nec_frame());

        // Give the receive task a moment to drain the queue.
        for _ in 0..50 {
            if !received.lock().unwrap().is_empty() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        eng.shutdown();
        handle.join().unwrap();
        assert_eq!(received.lock().unwrap().len(), 1);
    }
}
