//! Connections between device outputs and inputs, and the per-cycle propagation engine.

use std::collections::HashMap;

use crate::devices::{DeviceId, Devices, InputPort, OutputPort, PortRef, SignalLevel};
use crate::error::SemanticError;

/// Owns the device store for one circuit and the wiring between them.
#[derive(Debug, Default)]
pub struct Network {
    pub devices: Devices,
    max_settle_iterations: usize,
}

impl Network {
    #[must_use]
    pub fn new(max_settle_iterations: usize) -> Self {
        Self { devices: Devices::default(), max_settle_iterations }
    }

    /// Wires a source endpoint to a sink endpoint.
    ///
    /// `src_port`/`dst_port` of `None` mean "the device's sole anonymous output" — only valid
    /// for device kinds that have exactly one output. Both are resolved generically (rather
    /// than statically typed as output/input by the grammar) so that a source which turns out
    /// to name an input, or a sink which turns out to name an output, is reported with the
    /// dedicated `INPUT_TO_INPUT`/`OUTPUT_TO_OUTPUT` codes instead of a generic mismatch.
    pub fn make_connection(
        &mut self,
        src_id: DeviceId,
        src_port: Option<PortRef>,
        dst_id: DeviceId,
        dst_port: Option<PortRef>,
    ) -> Result<(), SemanticError> {
        let src = self.devices.get(src_id).ok_or(SemanticError::DeviceAbsent)?;
        let dst = self.devices.get(dst_id).ok_or(SemanticError::DeviceAbsent)?;

        if matches!(src_port, Some(PortRef::In(_))) {
            return Err(SemanticError::InputToInput);
        }
        if matches!(dst_port, Some(PortRef::Out(_))) {
            return Err(SemanticError::OutputToOutput);
        }

        let resolved_src_port = match src_port {
            Some(PortRef::Out(p)) => p,
            Some(PortRef::In(_)) => unreachable!("rejected above"),
            None => OutputPort::Out,
        };
        if !src.has_output(resolved_src_port) {
            return Err(SemanticError::PortAbsent);
        }

        let resolved_dst_port = match dst_port {
            Some(PortRef::In(p)) => p,
            Some(PortRef::Out(_)) => unreachable!("rejected above"),
            None => return Err(SemanticError::PortAbsent),
        };
        if !dst.has_input(resolved_dst_port) {
            return Err(SemanticError::PortAbsent);
        }
        if dst.input_driver(resolved_dst_port).is_some() {
            return Err(SemanticError::InputConnected);
        }
        if !self.devices.set_input_driver(dst_id, resolved_dst_port, (src_id, resolved_src_port)) {
            return Err(SemanticError::InputConnected);
        }
        Ok(())
    }

    /// True iff every declared device input currently has a driver.
    #[must_use]
    pub fn check_network(&self) -> bool {
        self.devices.order().iter().all(|id| {
            let device = &self.devices.get(*id).expect("id from order() must resolve");
            device.inputs().all(|(_, driver)| driver.is_some())
        })
    }

    /// Runs one simulation cycle: iterates all devices to a fixed point, then resolves
    /// transient RISING/FALLING levels. Returns `false` if the network fails to settle
    /// within the iteration cap (oscillation).
    pub fn execute_network(&mut self) -> bool {
        self.devices.reset_cycle_flags();
        let order: Vec<DeviceId> = self.devices.order().to_vec();
        let mut settled = false;
        for _ in 0..self.max_settle_iterations {
            let mut changed = false;
            for id in &order {
                let input_levels = self.gather_input_levels(*id);
                if self.devices.evaluate_device(*id, &input_levels) {
                    changed = true;
                }
            }
            if !changed {
                settled = true;
                break;
            }
        }
        if settled {
            self.devices.resolve_all_outputs();
        }
        settled
    }

    fn gather_input_levels(&self, id: DeviceId) -> HashMap<InputPort, SignalLevel> {
        let device = self.devices.get(id).expect("id from order() must resolve");
        device
            .inputs()
            .filter_map(|(port, driver)| {
                let (driver_id, driver_port) = driver?;
                let level = self.devices.get(driver_id)?.output_level(driver_port)?;
                Some((port, level))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{DeviceKind, Qualifier};

    fn port_in(n: u8) -> Option<PortRef> {
        Some(PortRef::In(InputPort::I(n)))
    }

    fn two_switches_into_and(network: &mut Network) {
        network.devices.make_device(0, DeviceKind::Switch, Qualifier::SwitchInitial(true)).unwrap();
        network.devices.make_device(1, DeviceKind::Switch, Qualifier::SwitchInitial(false)).unwrap();
        network.devices.make_device(2, DeviceKind::And, Qualifier::GateInputs(2)).unwrap();
    }

    #[test]
    fn make_connection_rejects_missing_device() {
        let mut network = Network::new(1000);
        network.devices.make_device(0, DeviceKind::Switch, Qualifier::SwitchInitial(true)).unwrap();
        assert_eq!(
            network.make_connection(99, None, 0, port_in(1)),
            Err(SemanticError::DeviceAbsent)
        );
    }

    #[test]
    fn make_connection_rejects_double_drive() {
        let mut network = Network::new(1000);
        two_switches_into_and(&mut network);
        network.make_connection(0, None, 2, port_in(1)).unwrap();
        assert_eq!(
            network.make_connection(1, None, 2, port_in(1)),
            Err(SemanticError::InputConnected)
        );
    }

    #[test]
    fn make_connection_rejects_output_as_sink() {
        let mut network = Network::new(1000);
        network.devices.make_device(0, DeviceKind::Switch, Qualifier::SwitchInitial(true)).unwrap();
        network.devices.make_device(1, DeviceKind::Dtype, Qualifier::Absent).unwrap();
        assert_eq!(
            network.make_connection(0, None, 1, Some(PortRef::Out(OutputPort::Q))),
            Err(SemanticError::OutputToOutput)
        );
    }

    #[test]
    fn check_network_false_until_all_inputs_driven() {
        let mut network = Network::new(1000);
        two_switches_into_and(&mut network);
        network.make_connection(0, None, 2, port_in(1)).unwrap();
        assert!(!network.check_network());
        network.make_connection(1, None, 2, port_in(2)).unwrap();
        assert!(network.check_network());
    }

    #[test]
    fn execute_network_propagates_and_gate() {
        let mut network = Network::new(1000);
        two_switches_into_and(&mut network);
        network.make_connection(0, None, 2, port_in(1)).unwrap();
        network.make_connection(1, None, 2, port_in(2)).unwrap();
        network.devices.cold_startup();
        assert!(network.execute_network());
        assert_eq!(network.devices.get(2).unwrap().output_level(OutputPort::Out), Some(SignalLevel::Low));
        network.devices.set_switch(1, true).unwrap();
        assert!(network.execute_network());
        assert_eq!(network.devices.get(2).unwrap().output_level(OutputPort::Out), Some(SignalLevel::High));
    }

    #[test]
    fn self_feeding_nand_oscillates() {
        let mut network = Network::new(1000);
        network.devices.make_device(0, DeviceKind::Nand, Qualifier::GateInputs(1)).unwrap();
        network.make_connection(0, None, 0, port_in(1)).unwrap();
        network.devices.cold_startup();
        assert!(!network.execute_network());
    }
}
