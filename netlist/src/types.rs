//! Index types naming the entities of a built network.
//!
//! Nets and devices live in arenas owned by the simulation; the rest
//! of the kernel (and the host) refers to them by index.  The
//! newtypes keep a net index from being used where a device index is
//! expected.
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// Names a net within one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NetId(pub(crate) usize);

impl Display for NetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "net#{}", self.0)
    }
}

/// Names a device instance within one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DeviceId(pub(crate) usize);

impl Display for DeviceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "device#{}", self.0)
    }
}
