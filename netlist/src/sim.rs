//! The simulation: arenas of nets and devices, the event loop, and
//! the host-facing surface.
//!
//! The host drives the simulation by injecting external stimuli and
//! calling [`Simulation::run_until`] once per host iteration.  There
//! is exactly one active computation at any simulated instant; the
//! kernel performs no real-time sleeping and returns control whenever
//! the queue is drained up to the requested boundary.
use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use tracing::{event, span, Level as LogLevel};

use logic::Level;

use super::device::{Device, PendingWrite, Reaction};
use super::error::StimulusError;
use super::net::Net;
use super::sched::{EventKey, EventQueue};
use super::types::{DeviceId, NetId};

/// How many consecutive same-instant events we apply before logging a
/// warning.  A device whose zero-delay outputs feed back onto its own
/// trigger shows up as simulated time failing to advance; the kernel
/// does not loop-detect, but it leaves a breadcrumb.
const SAME_INSTANT_WARN_THRESHOLD: usize = 10_000;

/// One committed net transition, recorded when commit tracing is
/// enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub at: Duration,
    pub net: NetId,
    pub level: Level,
}

/// A built, runnable network.  Constructed by
/// [`crate::NetlistBuilder::build`].
#[derive(Debug)]
pub struct Simulation {
    nets: Vec<Net>,
    devices: Vec<Device>,
    net_index: BTreeMap<String, NetId>,
    device_index: BTreeMap<String, DeviceId>,
    queue: EventQueue,
    now: Duration,
    skip_idle_outputs: bool,
    trace: Option<Vec<Transition>>,
}

impl Simulation {
    pub(crate) fn new(
        nets: Vec<Net>,
        devices: Vec<Device>,
        net_index: BTreeMap<String, NetId>,
        device_index: BTreeMap<String, DeviceId>,
    ) -> Simulation {
        Simulation {
            nets,
            devices,
            net_index,
            device_index,
            queue: EventQueue::new(),
            now: Duration::ZERO,
            skip_idle_outputs: false,
            trace: None,
        }
    }

    /// The current simulated time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of scheduled events not yet applied.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Looks up a net by its declared name.
    #[must_use]
    pub fn net_named(&self, name: &str) -> Option<NetId> {
        self.net_index.get(name).copied()
    }

    /// Looks up a device by its declared name.
    #[must_use]
    pub fn device_named(&self, name: &str) -> Option<DeviceId> {
        self.device_index.get(name).copied()
    }

    #[must_use]
    pub fn net_name(&self, net: NetId) -> &str {
        &self.nets[net.0].name
    }

    /// The last committed level of a net.  Reading never triggers
    /// recomputation.
    #[must_use]
    pub fn net_level(&self, net: NetId) -> Level {
        self.nets[net.0].level
    }

    /// The last committed level driven by a named output pin, or
    /// `None` if the device has no output with that name.
    #[must_use]
    pub fn output_level(&self, device: DeviceId, pin: &str) -> Option<Level> {
        let device = &self.devices[device.0];
        device
            .output_named(pin)
            .map(|output| device.outputs[output].driven)
    }

    /// Enables or disables recording of committed transitions.
    /// Recording affects nothing the scheduler does; it exists for
    /// telemetry and for equivalence testing.
    pub fn trace_commits(&mut self, enabled: bool) {
        match (enabled, self.trace.is_some()) {
            (true, false) => self.trace = Some(Vec::new()),
            (false, true) => self.trace = None,
            _ => (),
        }
    }

    /// Drains the transitions committed since the last drain.
    pub fn take_trace(&mut self) -> Vec<Transition> {
        match self.trace.as_mut() {
            Some(trace) => std::mem::take(trace),
            None => Vec::new(),
        }
    }

    /// Enables skipping of writes from output pins whose net has no
    /// subscribed input pins.  Off by default; a pure optimization
    /// for hosts which do not sample such nets through read-back.
    pub fn skip_idle_outputs(&mut self, enabled: bool) {
        self.skip_idle_outputs = enabled;
    }

    /// Schedules the external driver of `net` to commit `level` at
    /// simulated time `at`.  A later call for the same net before the
    /// event fires supersedes it.
    pub fn set_external(
        &mut self,
        net: NetId,
        level: Level,
        at: Duration,
    ) -> Result<(), StimulusError> {
        if at < self.now {
            return Err(StimulusError::PastTime { at, now: self.now });
        }
        if self.nets[net.0].driver.is_some() {
            return Err(StimulusError::DrivenNet {
                net: self.nets[net.0].name.clone(),
            });
        }
        event!(
            LogLevel::DEBUG,
            "external driver of '{}' set to {} at {:?}",
            self.nets[net.0].name,
            level,
            at
        );
        self.nets[net.0].pending_external = Some(PendingWrite { level, due: at });
        self.queue.schedule(EventKey::External(net), at);
        Ok(())
    }

    /// Applies every event due at or before `limit`, in (time,
    /// insertion) order, then advances simulated time to `limit`.
    /// Returns the due time of the next pending event, if any, so
    /// the host can pace itself.
    pub fn run_until(&mut self, limit: Duration) -> Option<Duration> {
        let run_span = span!(LogLevel::DEBUG, "run", until = ?limit);
        let _enter = run_span.enter();
        let mut same_instant: usize = 0;
        loop {
            let due = match self.queue.peek_due() {
                None => {
                    self.now = self.now.max(limit);
                    return None;
                }
                Some(due) => due,
            };
            if due > limit {
                self.now = self.now.max(limit);
                return Some(due);
            }
            let (key, rank) = match self.queue.pop() {
                Some(item) => item,
                None => unreachable!("queue emptied between peek and pop"),
            };
            assert!(rank.due >= self.now);
            if rank.due == self.now {
                same_instant += 1;
                if same_instant == SAME_INSTANT_WARN_THRESHOLD {
                    event!(
                        LogLevel::WARN,
                        "{} events applied at {:?} without time advancing; \
                         a device may be retriggering itself with zero delay",
                        same_instant,
                        self.now
                    );
                }
            } else {
                same_instant = 0;
            }
            self.now = rank.due;
            self.apply(key);
        }
    }

    /// Evaluates every device once, in registration order.  Called by
    /// the builder so that models which resolve defined outputs from
    /// an all-undefined network settle at time zero.
    pub(crate) fn settle_all(&mut self) {
        for index in 0..self.devices.len() {
            self.evaluate(DeviceId(index), None);
        }
    }

    fn apply(&mut self, key: EventKey) {
        let (net, level) = match key {
            EventKey::Driver(device, output) => {
                let pin = &mut self.devices[device.0].outputs[output];
                match pin.pending.take() {
                    Some(write) => {
                        pin.driven = write.level;
                        match pin.net {
                            Some(net) => (net, write.level),
                            None => {
                                unreachable!("driver events are only scheduled for attached pins")
                            }
                        }
                    }
                    None => unreachable!("popped a driver event with no pending write"),
                }
            }
            EventKey::External(net) => match self.nets[net.0].pending_external.take() {
                Some(write) => (net, write.level),
                None => unreachable!("popped an external event with no pending write"),
            },
        };
        self.commit(net, level);
    }

    /// Commits a level to a net.  Committing the value the net
    /// already holds is a no-op; otherwise every subscriber cache is
    /// refreshed first, and then each affected device is re-evaluated
    /// exactly once.
    fn commit(&mut self, net_id: NetId, level: Level) {
        {
            let net = &mut self.nets[net_id.0];
            if net.level == level {
                return;
            }
            event!(
                LogLevel::TRACE,
                "t={:?} net '{}': {} -> {}",
                self.now,
                net.name,
                net.level,
                level
            );
            net.level = level;
        }
        if let Some(trace) = self.trace.as_mut() {
            trace.push(Transition {
                at: self.now,
                net: net_id,
                level,
            });
        }
        let subscribers = self.nets[net_id.0].subscribers.clone();
        let mut affected: Vec<(DeviceId, Option<usize>)> = Vec::new();
        for sub in subscribers {
            let pin = &mut self.devices[sub.device.0].inputs[sub.input];
            if pin.seen == level {
                continue;
            }
            pin.seen = level;
            match affected.iter_mut().find(|(device, _)| *device == sub.device) {
                // More than one changed pin: there is no single
                // changed input to test a don't-care against.
                Some((_, changed)) => *changed = None,
                None => affected.push((sub.device, Some(sub.input))),
            }
        }
        for (device, changed) in affected {
            self.evaluate(device, changed);
        }
    }

    fn evaluate(&mut self, device_id: DeviceId, changed: Option<usize>) {
        let writes = {
            let device = &mut self.devices[device_id.0];
            let inputs = device.input_levels();
            if let Some(changed) = changed {
                if device.model.skip_input_change(&inputs, changed) {
                    event!(
                        LogLevel::TRACE,
                        "'{}': change on input {} is masked, skipping reaction",
                        device.name,
                        device.inputs[changed].name
                    );
                    return;
                }
            }
            let mut outcome = Reaction::default();
            device.model.react(&inputs, &mut outcome);
            outcome.take_writes()
        };
        for (output, level, delay) in writes {
            self.drive(device_id, output, level, delay);
        }
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self, device: DeviceId, output: usize) -> usize {
        self.devices[device.0].outputs[output].listeners
    }

    /// Schedules one output write, unless it is redundant.  A write
    /// equal to the pin's effective level (its pending write if one
    /// exists, else the last driven level) schedules nothing; a write
    /// differing from a pending one supersedes it.
    fn drive(&mut self, device_id: DeviceId, output: usize, level: Level, delay: Duration) {
        let due = self.now + delay;
        {
            let device = &mut self.devices[device_id.0];
            let pin = &mut device.outputs[output];
            if pin.net.is_none() {
                event!(
                    LogLevel::TRACE,
                    "'{}' output '{}' is unconnected; write dropped",
                    device.name,
                    pin.name
                );
                return;
            }
            if self.skip_idle_outputs && pin.listeners == 0 {
                event!(
                    LogLevel::TRACE,
                    "'{}' output '{}' has no listeners; write skipped",
                    device.name,
                    pin.name
                );
                return;
            }
            if pin.effective() == level {
                return;
            }
            pin.pending = Some(PendingWrite { level, due });
        }
        self.queue.schedule(EventKey::Driver(device_id, output), due);
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::NetlistBuilder;
    use crate::device::Model;
    use crate::device::PinLayout;
    use crate::devices::{counter, gates, seven_seg};

    use super::*;

    fn ns(n: u64) -> Duration {
        Duration::from_nanos(n)
    }

    /// `in -> inverter -> out`, with `in` externally driven.
    fn inverter_network() -> (Simulation, NetId, NetId) {
        let mut builder = NetlistBuilder::new();
        builder.device("inv", gates::inverter()).expect("declare");
        let input = builder.net("in").expect("declare");
        let output = builder.net("out").expect("declare");
        builder.connect("inv", "A", "in").expect("wire");
        builder.connect("inv", "Q", "out").expect("wire");
        (builder.build(), input, output)
    }

    #[test]
    fn test_stimulus_propagates_with_delay() {
        let (mut sim, input, output) = inverter_network();
        sim.set_external(input, Level::Low, ns(100)).expect("legal");
        // Before the stimulus fires nothing has changed.
        assert_eq!(sim.run_until(ns(50)), Some(ns(100)));
        assert_eq!(sim.net_level(input), Level::Undefined);
        assert_eq!(sim.net_level(output), Level::Undefined);
        // At the boundary the input has committed but the inverter's
        // 12ns rise is still pending.
        assert_eq!(sim.run_until(ns(100)), Some(ns(112)));
        assert_eq!(sim.net_level(input), Level::Low);
        assert_eq!(sim.net_level(output), Level::Undefined);
        assert_eq!(sim.run_until(ns(112)), None);
        assert_eq!(sim.net_level(output), Level::High);
        assert_eq!(sim.now(), ns(112));
    }

    #[test]
    fn test_redundant_stimulus_is_idempotent() {
        let (mut sim, input, _) = inverter_network();
        sim.trace_commits(true);
        sim.set_external(input, Level::High, ns(10)).expect("legal");
        sim.run_until(ns(1000));
        let first = sim.take_trace();
        assert_eq!(first.len(), 2); // the input and the inverter's answer
        sim.set_external(input, Level::High, ns(2000)).expect("legal");
        sim.run_until(ns(3000));
        // Recommitting the value the net already holds wakes nobody.
        assert_eq!(sim.take_trace(), vec![]);
        assert_eq!(sim.pending_events(), 0);
    }

    #[test]
    fn test_earlier_events_are_fully_applied_before_later_ones() {
        let mut builder = NetlistBuilder::new();
        builder.device("g", gates::nand2()).expect("declare");
        let a = builder.net("a").expect("declare");
        let b = builder.net("b").expect("declare");
        builder.net("y").expect("declare");
        builder.connect("g", "A", "a").expect("wire");
        builder.connect("g", "B", "b").expect("wire");
        builder.connect("g", "Q", "y").expect("wire");
        let mut sim = builder.build();
        sim.set_external(a, Level::High, ns(10)).expect("legal");
        sim.set_external(b, Level::High, ns(20)).expect("legal");
        sim.run_until(ns(15));
        assert_eq!(sim.net_level(a), Level::High);
        assert_eq!(sim.net_level(b), Level::Undefined);
        sim.run_until(ns(1000));
        let y = sim.net_named("y").expect("declared");
        assert_eq!(sim.net_level(y), Level::Low);
    }

    #[test]
    fn test_output_writes_coalesce_to_the_later_value() {
        let (mut sim, input, output) = inverter_network();
        sim.trace_commits(true);
        // The input pulses high for 5ns, shorter than the 8ns fall
        // delay, so the pending low write is superseded before it
        // commits and the output never glitches.
        sim.set_external(input, Level::High, ns(100)).expect("legal");
        sim.run_until(ns(100));
        sim.set_external(input, Level::Low, ns(105)).expect("legal");
        sim.run_until(ns(1000));
        let transitions: Vec<Transition> = sim
            .take_trace()
            .into_iter()
            .filter(|transition| transition.net == output)
            .collect();
        assert_eq!(
            transitions,
            vec![Transition {
                at: ns(117), // 105 + the 12ns rise
                net: output,
                level: Level::High,
            }]
        );
    }

    #[test]
    fn test_superseded_external_write_commits_once() {
        let (mut sim, input, _) = inverter_network();
        sim.trace_commits(true);
        sim.set_external(input, Level::High, ns(100)).expect("legal");
        sim.set_external(input, Level::Low, ns(100)).expect("legal");
        sim.run_until(ns(200));
        let input_transitions: Vec<Transition> = sim
            .take_trace()
            .into_iter()
            .filter(|transition| transition.net == input)
            .collect();
        assert_eq!(input_transitions.len(), 1);
        assert_eq!(input_transitions[0].level, Level::Low);
    }

    #[test]
    fn test_stimulus_validation() {
        let (mut sim, input, output) = inverter_network();
        sim.run_until(ns(500));
        assert_eq!(
            sim.set_external(input, Level::High, ns(100)),
            Err(StimulusError::PastTime {
                at: ns(100),
                now: ns(500),
            })
        );
        assert_eq!(
            sim.set_external(output, Level::High, ns(600)),
            Err(StimulusError::DrivenNet {
                net: "out".to_string(),
            })
        );
    }

    /// A zero-delay buffer, for exercising same-instant cascades.
    struct Wire;

    impl Model for Wire {
        fn type_name(&self) -> &str {
            "wire"
        }

        fn layout(&self) -> PinLayout {
            PinLayout::new(&["A"], &["Q"])
        }

        fn react(&mut self, inputs: &[Level], outcome: &mut Reaction) {
            outcome.drive(0, inputs[0], Duration::ZERO);
        }
    }

    #[test]
    fn test_zero_delay_cascades_apply_in_order_within_one_instant() {
        let mut builder = NetlistBuilder::new();
        builder.device("w1", Wire).expect("declare");
        builder.device("w2", Wire).expect("declare");
        let a = builder.net("a").expect("declare");
        let b = builder.net("b").expect("declare");
        let c = builder.net("c").expect("declare");
        builder.connect("w1", "A", "a").expect("wire");
        builder.connect("w1", "Q", "b").expect("wire");
        builder.connect("w2", "A", "b").expect("wire");
        builder.connect("w2", "Q", "c").expect("wire");
        let mut sim = builder.build();
        sim.trace_commits(true);
        sim.set_external(a, Level::High, ns(40)).expect("legal");
        sim.run_until(ns(40));
        let trace = sim.take_trace();
        assert_eq!(
            trace
                .iter()
                .map(|transition| (transition.net, transition.at))
                .collect::<Vec<_>>(),
            vec![(a, ns(40)), (b, ns(40)), (c, ns(40))]
        );
        assert_eq!(sim.net_level(c), Level::High);
    }

    #[test]
    fn test_identical_runs_replay_identically() {
        let run = || {
            let (mut sim, input, _) = inverter_network();
            sim.trace_commits(true);
            sim.set_external(input, Level::High, ns(10)).expect("legal");
            sim.run_until(ns(50));
            sim.set_external(input, Level::Low, ns(60)).expect("legal");
            sim.run_until(ns(200));
            sim.take_trace()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_skip_idle_outputs_is_off_by_default_and_skips_when_on() {
        let (mut sim, input, output) = inverter_network();
        // "out" has no subscribed input pins.
        let inv = sim.device_named("inv").expect("declared");
        assert_eq!(sim.listener_count(inv, 0), 0);
        sim.set_external(input, Level::Low, ns(10)).expect("legal");
        sim.run_until(ns(100));
        assert_eq!(sim.net_level(output), Level::High);

        let (mut sim, input, output) = inverter_network();
        sim.skip_idle_outputs(true);
        sim.set_external(input, Level::Low, ns(10)).expect("legal");
        sim.run_until(ns(100));
        // The write to the listener-less net was skipped entirely.
        assert_eq!(sim.net_level(output), Level::Undefined);
        assert_eq!(sim.pending_events(), 0);
    }

    fn decoder_nets() -> [&'static str; 7] {
        ["in_a", "in_b", "in_c", "in_d", "ltq", "biq", "rbiq"]
    }

    const SEGMENT_NETS: [&str; 7] = [
        "seg_a", "seg_b", "seg_c", "seg_d", "seg_e", "seg_f", "seg_g",
    ];

    /// Builds a decoder network with role-named nets; `wire` attaches
    /// the device pins for the variant under test.
    fn decoder_sim(wire: impl FnOnce(&mut NetlistBuilder)) -> Simulation {
        let mut builder = NetlistBuilder::new();
        for name in decoder_nets() {
            builder.net(name).expect("declare");
        }
        for name in SEGMENT_NETS {
            builder.net(name).expect("declare");
        }
        wire(&mut builder);
        builder.build()
    }

    fn base_decoder_sim() -> Simulation {
        decoder_sim(|builder| {
            builder.device("u1", seven_seg::Bcd7Seg::new()).expect("declare");
            for (pin, net) in ["A", "B", "C", "D", "LTQ", "BIQ", "RBIQ"]
                .iter()
                .zip(decoder_nets())
            {
                builder.connect("u1", pin, net).expect("wire");
            }
            for (pin, net) in ["a", "b", "c", "d", "e", "f", "g"].iter().zip(SEGMENT_NETS) {
                builder.connect("u1", pin, net).expect("wire");
            }
        })
    }

    fn dip_decoder_sim() -> Simulation {
        decoder_sim(|builder| {
            builder.device("u1", seven_seg::bcd_7seg_dip()).expect("declare");
            for (pin, net) in [
                ("7", "in_a"),
                ("1", "in_b"),
                ("2", "in_c"),
                ("6", "in_d"),
                ("3", "ltq"),
                ("4", "biq"),
                ("5", "rbiq"),
            ] {
                builder.connect("u1", pin, net).expect("wire");
            }
            for (pin, net) in [
                ("13", "seg_a"),
                ("12", "seg_b"),
                ("11", "seg_c"),
                ("10", "seg_d"),
                ("9", "seg_e"),
                ("15", "seg_f"),
                ("14", "seg_g"),
            ] {
                builder.connect("u1", pin, net).expect("wire");
            }
        })
    }

    fn drive_code(sim: &mut Simulation, value: usize, overrides: [Level; 3], at: Duration) {
        let [ltq, biq, rbiq] = overrides;
        for (bit, net) in ["in_a", "in_b", "in_c", "in_d"].iter().enumerate() {
            let net = sim.net_named(net).expect("declared");
            sim.set_external(net, Level::from_bool(value & (1 << bit) != 0), at)
                .expect("legal");
        }
        for (net, level) in [("ltq", ltq), ("biq", biq), ("rbiq", rbiq)] {
            let net = sim.net_named(net).expect("declared");
            sim.set_external(net, level, at).expect("legal");
        }
    }

    fn segment_pattern(sim: &Simulation) -> u8 {
        let mut pattern = 0u8;
        for (segment, net) in SEGMENT_NETS.iter().enumerate() {
            let net = sim.net_named(net).expect("declared");
            if sim.net_level(net).is_high() {
                pattern |= 1 << segment;
            }
        }
        pattern
    }

    const PATTERN_ZERO: u8 = 0b0111111;
    const PATTERN_ALL_ON: u8 = 0b1111111;

    #[test]
    fn test_decoder_ripple_blanks_zero_after_its_delay() {
        let mut sim = base_decoder_sim();
        sim.trace_commits(true);
        // Show a digit first so blanking is an observable change.
        drive_code(&mut sim, 5, [Level::High; 3], Duration::ZERO);
        sim.run_until(Duration::from_micros(1));
        sim.take_trace();

        let at = Duration::from_micros(2);
        drive_code(&mut sim, 0, [Level::High, Level::High, Level::Low], at);
        sim.run_until(at);
        // The inputs have committed; the segments settle 100ns later.
        assert_ne!(segment_pattern(&sim), 0);
        sim.run_until(at + Duration::from_nanos(100));
        assert_eq!(segment_pattern(&sim), 0);
    }

    #[test]
    fn test_decoder_shows_zero_when_ripple_blank_deasserted() {
        let mut sim = base_decoder_sim();
        drive_code(&mut sim, 0, [Level::High; 3], Duration::ZERO);
        sim.run_until(Duration::from_micros(1));
        assert_eq!(segment_pattern(&sim), PATTERN_ZERO);
    }

    #[test]
    fn test_lamp_test_dominates_and_bcd_changes_are_silent() {
        let mut sim = base_decoder_sim();
        drive_code(
            &mut sim,
            2,
            [Level::Low, Level::High, Level::Low],
            Duration::ZERO,
        );
        sim.run_until(Duration::from_micros(1));
        assert_eq!(segment_pattern(&sim), PATTERN_ALL_ON);

        sim.trace_commits(true);
        for (step, value) in [9usize, 0, 15].into_iter().enumerate() {
            let at = Duration::from_micros(2 + step as u64);
            drive_code(&mut sim, value, [Level::Low, Level::High, Level::Low], at);
            sim.run_until(at + Duration::from_nanos(500));
        }
        sim.run_until(Duration::from_micros(10));
        // The BCD nets themselves transition, the segments never do.
        let segment_ids: Vec<NetId> = SEGMENT_NETS
            .iter()
            .map(|name| sim.net_named(name).expect("declared"))
            .collect();
        assert!(sim
            .take_trace()
            .into_iter()
            .all(|transition| !segment_ids.contains(&transition.net)));
        assert_eq!(segment_pattern(&sim), PATTERN_ALL_ON);
    }

    #[test]
    fn test_packaging_variant_is_trace_identical_to_the_base_type() {
        let stimulate = |sim: &mut Simulation| {
            sim.trace_commits(true);
            let mut at = Duration::ZERO;
            for (value, overrides) in [
                (3, [Level::High, Level::High, Level::High]),
                (0, [Level::High, Level::High, Level::Low]),
                (0, [Level::High, Level::High, Level::High]),
                (7, [Level::Low, Level::High, Level::High]),
                (7, [Level::High, Level::Low, Level::High]),
                (9, [Level::High, Level::High, Level::High]),
            ] {
                drive_code(sim, value, overrides, at);
                sim.run_until(at + Duration::from_micros(1));
                at += Duration::from_micros(1);
            }
            sim.take_trace()
        };
        let mut base = base_decoder_sim();
        let mut dip = dip_decoder_sim();
        let base_trace = stimulate(&mut base);
        let dip_trace = stimulate(&mut dip);
        assert!(!base_trace.is_empty());
        assert_eq!(base_trace, dip_trace);
    }

    #[test_strategy::proptest]
    fn property_identical_stimulus_schedules_replay_identically(
        #[strategy(proptest::collection::vec(
            (0u8..2, proptest::bool::ANY, 1u64..2000),
            1..25,
        ))]
        steps: Vec<(u8, bool, u64)>,
    ) {
        let run = |steps: &[(u8, bool, u64)]| {
            let mut builder = NetlistBuilder::new();
            builder.device("g", gates::nand2()).expect("declare");
            let a = builder.net("a").expect("declare");
            let b = builder.net("b").expect("declare");
            builder.net("y").expect("declare");
            builder.connect("g", "A", "a").expect("wire");
            builder.connect("g", "B", "b").expect("wire");
            builder.connect("g", "Q", "y").expect("wire");
            let mut sim = builder.build();
            sim.trace_commits(true);
            let mut at = Duration::ZERO;
            for (which, level, advance) in steps {
                at += ns(*advance);
                let net = if *which == 0 { a } else { b };
                sim.set_external(net, Level::from_bool(*level), at)
                    .expect("time only moves forward");
                sim.run_until(at);
            }
            sim.run_until(at + Duration::from_micros(1));
            sim.take_trace()
        };
        assert_eq!(run(&steps), run(&steps));
    }

    #[test]
    fn test_counter_drives_decoder_end_to_end() {
        let mut builder = NetlistBuilder::new();
        builder
            .device("u1", counter::RippleCounter4::new())
            .expect("declare");
        builder.device("u2", seven_seg::Bcd7Seg::new()).expect("declare");
        for name in ["clk", "reset", "qa", "qb", "qc", "qd", "pullup"] {
            builder.net(name).expect("declare");
        }
        for name in SEGMENT_NETS {
            builder.net(name).expect("declare");
        }
        builder.connect("u1", "CLK", "clk").expect("wire");
        builder.connect("u1", "R1", "reset").expect("wire");
        builder.connect("u1", "R2", "reset").expect("wire");
        for (pin, net) in [("QA", "qa"), ("QB", "qb"), ("QC", "qc"), ("QD", "qd")] {
            builder.connect("u1", pin, net).expect("wire");
        }
        for (pin, net) in [("A", "qa"), ("B", "qb"), ("C", "qc"), ("D", "qd")] {
            builder.connect("u2", pin, net).expect("wire");
        }
        for pin in ["LTQ", "BIQ", "RBIQ"] {
            builder.connect("u2", pin, "pullup").expect("wire");
        }
        for (pin, net) in ["a", "b", "c", "d", "e", "f", "g"].iter().zip(SEGMENT_NETS) {
            builder.connect("u2", pin, net).expect("wire");
        }
        let mut sim = builder.build();

        let clk = sim.net_named("clk").expect("declared");
        let reset = sim.net_named("reset").expect("declared");
        let pullup = sim.net_named("pullup").expect("declared");
        sim.set_external(pullup, Level::High, Duration::ZERO)
            .expect("legal");
        sim.set_external(reset, Level::High, Duration::ZERO)
            .expect("legal");
        sim.run_until(Duration::from_nanos(200));
        sim.set_external(reset, Level::Low, Duration::from_nanos(300))
            .expect("legal");
        sim.run_until(Duration::from_nanos(400));

        // Three full clock cycles: falling edges at 1.5us, 2.5us, 3.5us.
        for cycle in 0..3u64 {
            let high_at = Duration::from_micros(1 + cycle);
            let low_at = high_at + Duration::from_nanos(500);
            sim.set_external(clk, Level::High, high_at).expect("legal");
            sim.run_until(high_at);
            sim.set_external(clk, Level::Low, low_at).expect("legal");
            sim.run_until(low_at);
        }
        sim.run_until(Duration::from_micros(5));

        let qa = sim.net_named("qa").expect("declared");
        let qb = sim.net_named("qb").expect("declared");
        assert_eq!(sim.net_level(qa), Level::High);
        assert_eq!(sim.net_level(qb), Level::High);
        // Segment pattern for the digit 3.
        assert_eq!(segment_pattern(&sim), 0b1001111);
    }
}
