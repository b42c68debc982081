//! A discrete-event simulator for small digital logic networks.
//!
//! Device instances are wired into named nets, and a global
//! scheduler advances simulated time by committing scheduled net
//! writes in (time, insertion) order.  Devices react to input
//! changes by scheduling delayed output writes, so a built network
//! reproduces the propagation behavior of the real parts it models.
#![crate_name = "netlist"]

mod builder;
mod device;
mod error;
mod net;
mod sched;
mod sim;
mod types;

pub mod devices;

pub use builder::NetlistBuilder;
pub use device::{Model, PinLayout, Reaction};
pub use error::{ConfigError, StimulusError};
pub use sim::{Simulation, Transition};
pub use types::{DeviceId, NetId};
