//! Network construction and stimulus errors.
//!
//! Configuration errors are structural: a malformed topology is fatal
//! to network construction and is never deferred to run time.  An
//! undefined signal, by contrast, is not an error at all; it is a
//! value (see [`logic::Level::Undefined`]).
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

/// A structural violation detected while declaring or wiring the
/// network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Two devices were declared with the same name.
    DuplicateDevice(String),
    /// Two nets were declared with the same name.
    DuplicateNet(String),
    /// A connection referenced a device that was never declared.
    UnknownDevice(String),
    /// A connection referenced a net that was never declared.
    UnknownNet(String),
    /// A connection referenced a pin the device type does not have.
    UnknownPin { device: String, pin: String },
    /// A pin may be attached to exactly one net.
    PinAlreadyConnected { device: String, pin: String },
    /// A net may have at most one driving output pin.
    NetAlreadyDriven { net: String, driver: String },
    /// A packaging variant referenced a pin its inner device type
    /// does not have.
    RepackUnknownPin { pin: String },
    /// A packaging variant must map every pin of its inner device
    /// type exactly once.
    RepackIncomplete { pin: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ConfigError::DuplicateDevice(name) => {
                write!(f, "device '{name}' is declared twice")
            }
            ConfigError::DuplicateNet(name) => write!(f, "net '{name}' is declared twice"),
            ConfigError::UnknownDevice(name) => write!(f, "device '{name}' is not declared"),
            ConfigError::UnknownNet(name) => write!(f, "net '{name}' is not declared"),
            ConfigError::UnknownPin { device, pin } => {
                write!(f, "device '{device}' has no pin named '{pin}'")
            }
            ConfigError::PinAlreadyConnected { device, pin } => {
                write!(f, "pin '{pin}' of device '{device}' is already attached to a net")
            }
            ConfigError::NetAlreadyDriven { net, driver } => {
                write!(f, "net '{net}' is already driven by '{driver}'")
            }
            ConfigError::RepackUnknownPin { pin } => {
                write!(f, "packaging variant maps '{pin}' which the inner type lacks")
            }
            ConfigError::RepackIncomplete { pin } => {
                write!(f, "packaging variant leaves inner pin '{pin}' unmapped")
            }
        }
    }
}

impl Error for ConfigError {}

/// Host misuse of the external stimulus interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StimulusError {
    /// Only a net without an output-pin driver accepts an external
    /// driver.
    DrivenNet { net: String },
    /// Events cannot be scheduled before the current simulated time.
    PastTime { at: Duration, now: Duration },
}

impl Display for StimulusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            StimulusError::DrivenNet { net } => {
                write!(f, "net '{net}' has an output-pin driver and cannot be driven externally")
            }
            StimulusError::PastTime { at, now } => {
                write!(f, "cannot schedule at {at:?}, simulated time is already {now:?}")
            }
        }
    }
}

impl Error for StimulusError {}
