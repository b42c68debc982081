//! Nets: the named signal lines joining device pins.
use logic::Level;

use super::device::PendingWrite;
use super::types::DeviceId;

/// A subscribed input pin: input `input` of device `device`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Subscriber {
    pub(crate) device: DeviceId,
    pub(crate) input: usize,
}

/// The output pin driving a net.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Driver {
    pub(crate) device: DeviceId,
    pub(crate) output: usize,
}

/// A named signal line.  The committed level only ever changes inside
/// the scheduler loop; reads between events observe the last commit.
#[derive(Debug)]
pub(crate) struct Net {
    pub(crate) name: String,
    pub(crate) level: Level,
    /// Input pins reading this net, in subscription order.  The net
    /// does not own its subscribers; detaching a device must
    /// deregister them here.
    pub(crate) subscribers: Vec<Subscriber>,
    /// The single output pin allowed to drive this net, if any.
    pub(crate) driver: Option<Driver>,
    /// Pending write from the external driver, when the host has one
    /// scheduled.  Mutually exclusive with `driver`.
    pub(crate) pending_external: Option<PendingWrite>,
}

impl Net {
    pub(crate) fn new(name: String) -> Net {
        Net {
            name,
            level: Level::Undefined,
            subscribers: Vec::new(),
            driver: None,
            pending_external: None,
        }
    }
}
