//! Network construction.
//!
//! A host declares device instances and nets by name, attaches named
//! pins to named nets, and then builds the runnable [`Simulation`].
//! Structural violations are rejected eagerly, at the call that
//! introduces them; an output pin left unconnected is legal and only
//! warned about, and an unconnected input simply reads undefined.
use std::collections::BTreeMap;

use tracing::{event, Level as LogLevel};

use super::device::{Device, Model};
use super::error::ConfigError;
use super::net::{Driver, Net, Subscriber};
use super::sim::Simulation;
use super::types::{DeviceId, NetId};

#[derive(Debug, Default)]
pub struct NetlistBuilder {
    nets: Vec<Net>,
    devices: Vec<Device>,
    net_index: BTreeMap<String, NetId>,
    device_index: BTreeMap<String, DeviceId>,
}

impl NetlistBuilder {
    #[must_use]
    pub fn new() -> NetlistBuilder {
        NetlistBuilder::default()
    }

    /// Declares a device instance.
    pub fn device<M: Model + 'static>(
        &mut self,
        name: &str,
        model: M,
    ) -> Result<DeviceId, ConfigError> {
        if self.device_index.contains_key(name) {
            return Err(ConfigError::DuplicateDevice(name.to_string()));
        }
        let id = DeviceId(self.devices.len());
        self.devices
            .push(Device::new(name.to_string(), Box::new(model)));
        self.device_index.insert(name.to_string(), id);
        Ok(id)
    }

    /// Declares a net.
    pub fn net(&mut self, name: &str) -> Result<NetId, ConfigError> {
        if self.net_index.contains_key(name) {
            return Err(ConfigError::DuplicateNet(name.to_string()));
        }
        let id = NetId(self.nets.len());
        self.nets.push(Net::new(name.to_string()));
        self.net_index.insert(name.to_string(), id);
        Ok(id)
    }

    /// Attaches the named pin of a declared device to a declared net.
    /// A pin attaches to exactly one net; a net accepts at most one
    /// output pin as its driver.
    pub fn connect(&mut self, device: &str, pin: &str, net: &str) -> Result<(), ConfigError> {
        let device_id = match self.device_index.get(device) {
            Some(id) => *id,
            None => return Err(ConfigError::UnknownDevice(device.to_string())),
        };
        let net_id = match self.net_index.get(net) {
            Some(id) => *id,
            None => return Err(ConfigError::UnknownNet(net.to_string())),
        };
        if let Some(input) = self.devices[device_id.0].input_named(pin) {
            return self.attach_input(device_id, input, net_id);
        }
        if let Some(output) = self.devices[device_id.0].output_named(pin) {
            return self.attach_output(device_id, output, net_id);
        }
        Err(ConfigError::UnknownPin {
            device: device.to_string(),
            pin: pin.to_string(),
        })
    }

    fn attach_input(
        &mut self,
        device_id: DeviceId,
        input: usize,
        net_id: NetId,
    ) -> Result<(), ConfigError> {
        {
            let device = &mut self.devices[device_id.0];
            let pin = &mut device.inputs[input];
            if pin.net.is_some() {
                return Err(ConfigError::PinAlreadyConnected {
                    device: device.name.clone(),
                    pin: pin.name.clone(),
                });
            }
            pin.net = Some(net_id);
            // A pin subscribing to a live net immediately reflects
            // the net's committed value; nothing else is notified.
            pin.seen = self.nets[net_id.0].level;
        }
        self.nets[net_id.0].subscribers.push(Subscriber {
            device: device_id,
            input,
        });
        self.refresh_listener_count(net_id);
        Ok(())
    }

    fn attach_output(
        &mut self,
        device_id: DeviceId,
        output: usize,
        net_id: NetId,
    ) -> Result<(), ConfigError> {
        {
            let device = &self.devices[device_id.0];
            let pin = &device.outputs[output];
            if pin.net.is_some() {
                return Err(ConfigError::PinAlreadyConnected {
                    device: device.name.clone(),
                    pin: pin.name.clone(),
                });
            }
        }
        if let Some(driver) = self.nets[net_id.0].driver {
            let holder = &self.devices[driver.device.0];
            return Err(ConfigError::NetAlreadyDriven {
                net: self.nets[net_id.0].name.clone(),
                driver: format!("{}.{}", holder.name, holder.outputs[driver.output].name),
            });
        }
        self.nets[net_id.0].driver = Some(Driver {
            device: device_id,
            output,
        });
        self.devices[device_id.0].outputs[output].net = Some(net_id);
        self.refresh_listener_count(net_id);
        Ok(())
    }

    /// Keeps the driving output pin's live-subscriber count in step
    /// with the net's subscriber list.
    fn refresh_listener_count(&mut self, net_id: NetId) {
        let (driver, count) = {
            let net = &self.nets[net_id.0];
            (net.driver, net.subscribers.len())
        };
        if let Some(driver) = driver {
            self.devices[driver.device.0].outputs[driver.output].listeners = count;
        }
    }

    /// Builds the runnable simulation.  Unconnected output pins are
    /// warned about; every device is then evaluated once at time
    /// zero so the network starts settled.
    #[must_use]
    pub fn build(self) -> Simulation {
        for device in &self.devices {
            for pin in &device.outputs {
                if pin.net.is_none() {
                    event!(
                        LogLevel::WARN,
                        "output pin '{}' of device '{}' is not attached to any net",
                        pin.name,
                        device.name
                    );
                }
            }
        }
        let mut sim = Simulation::new(self.nets, self.devices, self.net_index, self.device_index);
        sim.settle_all();
        sim
    }
}
