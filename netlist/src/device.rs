//! Devices and the model trait they are built from.
//!
//! A [`Device`] is one placed instance in a network: a name, a boxed
//! [`Model`] carrying the behavior and the instance's private state,
//! and the instance's pins.  Pin bookkeeping (what is attached where,
//! what was last seen or driven) belongs to the kernel; models only
//! ever see a snapshot of their input levels and emit writes through
//! a [`Reaction`].
use std::time::Duration;

use logic::Level;

use super::types::NetId;

/// The declared pin arrangement of a device type: input and output
/// names, each list in its fixed declared order.  The input order is
/// also the packing order for table-driven types.
#[derive(Debug, Clone)]
pub struct PinLayout {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

impl PinLayout {
    /// Convenience constructor from static name lists.
    #[must_use]
    pub fn new(inputs: &[&str], outputs: &[&str]) -> PinLayout {
        PinLayout {
            inputs: inputs.iter().map(|name| name.to_string()).collect(),
            outputs: outputs.iter().map(|name| name.to_string()).collect(),
        }
    }
}

/// Collects the output writes emitted by one reaction.  The kernel
/// applies them after the model returns; a model never touches the
/// scheduler directly.
#[derive(Debug, Default)]
pub struct Reaction {
    writes: Vec<(usize, Level, Duration)>,
}

impl Reaction {
    /// Requests that output `output` settle to `level` after `delay`.
    /// A zero delay means the same simulated instant, applied after
    /// everything already scheduled for that instant.
    pub fn drive(&mut self, output: usize, level: Level, delay: Duration) {
        self.writes.push((output, level, delay));
    }

    pub(crate) fn take_writes(&mut self) -> Vec<(usize, Level, Duration)> {
        std::mem::take(&mut self.writes)
    }
}

/// The behavior of a device type, plus any per-instance state.
///
/// Models must be pure in the sense of the kernel contract: the
/// reaction may depend only on the private state and the input
/// snapshot it is handed, and redundant notifications must be
/// harmless.  The kernel already guarantees a model is only called
/// when at least one input level it previously saw has changed.
pub trait Model {
    /// A short name for the device type, used in diagnostics.
    fn type_name(&self) -> &str;

    /// The pin arrangement.  Called once, when the instance is
    /// registered with a network.
    fn layout(&self) -> PinLayout;

    /// React to an input change.  `inputs` holds the current level of
    /// every input pin in declared order.
    fn react(&mut self, inputs: &[Level], outcome: &mut Reaction);

    /// True when a change on input `changed` is known not to affect
    /// the outputs given the other current levels, so the reaction
    /// can be skipped entirely.  Purely an optimization; the default
    /// never skips.
    fn skip_input_change(&self, _inputs: &[Level], _changed: usize) -> bool {
        false
    }
}

/// A write which has been scheduled but not yet committed.  At most
/// one exists per output pin; a later write supersedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingWrite {
    pub(crate) level: Level,
    pub(crate) due: Duration,
}

#[derive(Debug)]
pub(crate) struct InputPin {
    pub(crate) name: String,
    pub(crate) net: Option<NetId>,
    /// The level this device last observed on the pin.  Change
    /// detection against this cache is what makes notification
    /// idempotent.
    pub(crate) seen: Level,
}

#[derive(Debug)]
pub(crate) struct OutputPin {
    pub(crate) name: String,
    pub(crate) net: Option<NetId>,
    /// The last level actually committed from this pin.
    pub(crate) driven: Level,
    pub(crate) pending: Option<PendingWrite>,
    /// Number of input pins subscribed to the attached net; kept for
    /// the skip-idle-outputs capability.
    pub(crate) listeners: usize,
}

impl OutputPin {
    /// The level this pin will have driven once any pending write
    /// commits.  New writes are compared against this, so a write
    /// that matches what is already on the way schedules nothing.
    pub(crate) fn effective(&self) -> Level {
        match &self.pending {
            Some(write) => write.level,
            None => self.driven,
        }
    }
}

pub(crate) struct Device {
    pub(crate) name: String,
    pub(crate) model: Box<dyn Model>,
    pub(crate) inputs: Vec<InputPin>,
    pub(crate) outputs: Vec<OutputPin>,
}

impl Device {
    pub(crate) fn new(name: String, model: Box<dyn Model>) -> Device {
        let layout = model.layout();
        let inputs = layout
            .inputs
            .into_iter()
            .map(|name| InputPin {
                name,
                net: None,
                seen: Level::Undefined,
            })
            .collect();
        let outputs = layout
            .outputs
            .into_iter()
            .map(|name| OutputPin {
                name,
                net: None,
                driven: Level::Undefined,
                pending: None,
                listeners: 0,
            })
            .collect();
        Device {
            name,
            model,
            inputs,
            outputs,
        }
    }

    pub(crate) fn input_named(&self, pin: &str) -> Option<usize> {
        self.inputs.iter().position(|p| p.name == pin)
    }

    pub(crate) fn output_named(&self, pin: &str) -> Option<usize> {
        self.outputs.iter().position(|p| p.name == pin)
    }

    /// Snapshot of the current input levels, in declared order.
    pub(crate) fn input_levels(&self) -> Vec<Level> {
        self.inputs.iter().map(|pin| pin.seen).collect()
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.name)
            .field("type", &self.model.type_name())
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}
