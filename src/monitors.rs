//! Sampling probes that record the per-cycle history of monitored device outputs.

use std::collections::BTreeMap;

use crate::devices::{DeviceId, Devices, OutputPort, PortRef, SignalLevel};
use crate::error::SemanticError;
use crate::names::Names;

/// A monitored `(device, output port)` pair and its sampled signal history.
#[derive(Debug, Clone)]
pub struct Monitor {
    pub device_id: DeviceId,
    pub port: OutputPort,
    history: Vec<SignalLevel>,
}

impl Monitor {
    #[must_use]
    pub fn history(&self) -> &[SignalLevel] {
        &self.history
    }
}

/// All monitors declared for one circuit.
#[derive(Debug, Default)]
pub struct Monitors {
    points: BTreeMap<(DeviceId, OutputPort), Monitor>,
    order: Vec<(DeviceId, OutputPort)>,
}

impl Monitors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a monitor on `device_id.port`, prefixed with `starting_cycle` BLANK samples.
    pub fn make_monitor(
        &mut self,
        devices: &Devices,
        device_id: DeviceId,
        port: OutputPort,
        starting_cycle: usize,
    ) -> Result<(), SemanticError> {
        let device = devices.get(device_id).ok_or(SemanticError::DeviceAbsent)?;
        if !device.has_output(port) {
            return Err(SemanticError::NotOutput);
        }
        let key = (device_id, port);
        if self.points.contains_key(&key) {
            return Err(SemanticError::MonitorPresent);
        }
        self.points.insert(
            key,
            Monitor { device_id, port, history: vec![SignalLevel::Blank; starting_cycle] },
        );
        self.order.push(key);
        Ok(())
    }

    /// Resolves a qualified name (`NAME` or `NAME.PORT`) and adds a monitor on it.
    pub fn add_by_name(
        &mut self,
        names: &Names,
        devices: &Devices,
        qualified: &str,
        starting_cycle: usize,
    ) -> Result<(), SemanticError> {
        let (device_id, port_ref) = devices.get_signal_ids(names, qualified)?;
        let port = match port_ref {
            Some(PortRef::Out(p)) => p,
            Some(PortRef::In(_)) => return Err(SemanticError::NotOutput),
            None => OutputPort::Out,
        };
        self.make_monitor(devices, device_id, port, starting_cycle)
    }

    pub fn remove_monitor(&mut self, device_id: DeviceId, port: OutputPort) -> Result<(), SemanticError> {
        let key = (device_id, port);
        if self.points.remove(&key).is_none() {
            return Err(SemanticError::DeviceAbsent);
        }
        self.order.retain(|k| *k != key);
        Ok(())
    }

    /// Samples every monitor's current output level. Call after a successful cycle.
    pub fn record_signals(&mut self, devices: &Devices) {
        for key in &self.order {
            if let Some(monitor) = self.points.get_mut(key) {
                if let Some(device) = devices.get(monitor.device_id) {
                    if let Some(level) = device.output_level(monitor.port) {
                        monitor.history.push(level);
                    }
                }
            }
        }
    }

    /// Clears every monitor's recorded history (the monitors themselves remain declared).
    pub fn reset_monitors(&mut self) {
        for monitor in self.points.values_mut() {
            monitor.history.clear();
        }
    }

    #[must_use]
    pub fn history(&self, device_id: DeviceId, port: OutputPort) -> Option<&[SignalLevel]> {
        self.points.get(&(device_id, port)).map(Monitor::history)
    }

    #[must_use]
    pub fn is_monitored(&self, device_id: DeviceId, port: OutputPort) -> bool {
        self.points.contains_key(&(device_id, port))
    }

    /// Returns (monitored, unmonitored) qualified names for every output in `devices`.
    #[must_use]
    pub fn get_signal_names(&self, names: &Names, devices: &Devices) -> (Vec<String>, Vec<String>) {
        let mut monitored = Vec::new();
        let mut unmonitored = Vec::new();
        for id in devices.order() {
            let device = devices.get(*id).expect("id from order() must resolve");
            let device_name = names.string_of(*id).unwrap_or("?");
            for port in device_output_ports(device) {
                let qualified = if port.as_string().is_empty() {
                    device_name.to_string()
                } else {
                    format!("{device_name}.{}", port.as_string())
                };
                if self.is_monitored(*id, port) {
                    monitored.push(qualified);
                } else {
                    unmonitored.push(qualified);
                }
            }
        }
        (monitored, unmonitored)
    }

    /// Length of the longest monitored qualified name, for display alignment.
    #[must_use]
    pub fn get_margin(&self, names: &Names) -> usize {
        self.order
            .iter()
            .map(|(id, port)| {
                let device_name = names.string_of(*id).unwrap_or("?");
                if port.as_string().is_empty() {
                    device_name.len()
                } else {
                    device_name.len() + 1 + port.as_string().len()
                }
            })
            .max()
            .unwrap_or(0)
    }
}

fn device_output_ports(device: &crate::devices::Device) -> Vec<OutputPort> {
    [OutputPort::Out, OutputPort::Q, OutputPort::Qbar]
        .into_iter()
        .filter(|p| device.has_output(*p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{DeviceKind, Qualifier};

    #[test]
    fn make_monitor_prefixes_blank_history() {
        let mut names = Names::new();
        let id = names.intern_one("SW1").unwrap();
        let mut devices = Devices::new();
        devices.make_device(id, DeviceKind::Switch, Qualifier::SwitchInitial(true)).unwrap();
        let mut monitors = Monitors::new();
        monitors.make_monitor(&devices, id, OutputPort::Out, 2).unwrap();
        assert_eq!(monitors.history(id, OutputPort::Out), Some(&[SignalLevel::Blank, SignalLevel::Blank][..]));
    }

    #[test]
    fn duplicate_monitor_rejected() {
        let mut names = Names::new();
        let id = names.intern_one("SW1").unwrap();
        let mut devices = Devices::new();
        devices.make_device(id, DeviceKind::Switch, Qualifier::SwitchInitial(true)).unwrap();
        let mut monitors = Monitors::new();
        monitors.make_monitor(&devices, id, OutputPort::Out, 0).unwrap();
        assert_eq!(
            monitors.make_monitor(&devices, id, OutputPort::Out, 0),
            Err(SemanticError::MonitorPresent)
        );
    }

    #[test]
    fn monitoring_an_input_port_is_rejected() {
        let mut names = Names::new();
        let id = names.intern_one("D1").unwrap();
        let mut devices = Devices::new();
        devices.make_device(id, DeviceKind::Dtype, Qualifier::Absent).unwrap();
        let mut monitors = Monitors::new();
        assert_eq!(monitors.add_by_name(&names, &devices, "D1.CLK", 0), Err(SemanticError::NotOutput));
    }

    #[test]
    fn record_signals_grows_history_by_one_per_call() {
        let mut names = Names::new();
        let id = names.intern_one("SW1").unwrap();
        let mut devices = Devices::new();
        devices.make_device(id, DeviceKind::Switch, Qualifier::SwitchInitial(true)).unwrap();
        devices.cold_startup();
        let mut monitors = Monitors::new();
        monitors.make_monitor(&devices, id, OutputPort::Out, 0).unwrap();
        monitors.record_signals(&devices);
        monitors.record_signals(&devices);
        assert_eq!(monitors.history(id, OutputPort::Out).unwrap().len(), 2);
        monitors.reset_monitors();
        assert_eq!(monitors.history(id, OutputPort::Out).unwrap().len(), 0);
    }
}
