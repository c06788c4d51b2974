//! Device catalogue: device records, per-kind qualifier rules, and per-cycle evaluation.

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::error::SemanticError;
use crate::names::{NameId, Names};

pub type DeviceId = NameId;

/// One of the ten device primitives this language can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Dtype,
    Switch,
    Clock,
    Rc,
    Siggen,
}

impl DeviceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceKind::And => "AND",
            DeviceKind::Nand => "NAND",
            DeviceKind::Or => "OR",
            DeviceKind::Nor => "NOR",
            DeviceKind::Xor => "XOR",
            DeviceKind::Dtype => "DTYPE",
            DeviceKind::Switch => "SWITCH",
            DeviceKind::Clock => "CLOCK",
            DeviceKind::Rc => "RC",
            DeviceKind::Siggen => "SIGGEN",
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "AND" => DeviceKind::And,
            "NAND" => DeviceKind::Nand,
            "OR" => DeviceKind::Or,
            "NOR" => DeviceKind::Nor,
            "XOR" => DeviceKind::Xor,
            "DTYPE" => DeviceKind::Dtype,
            "SWITCH" => DeviceKind::Switch,
            "CLOCK" => DeviceKind::Clock,
            "RC" => DeviceKind::Rc,
            "SIGGEN" => DeviceKind::Siggen,
            _ => return None,
        })
    }

    #[must_use]
    pub fn is_gate(self) -> bool {
        matches!(self, DeviceKind::And | DeviceKind::Nand | DeviceKind::Or | DeviceKind::Nor)
    }

    #[must_use]
    pub fn is_sequential(self) -> bool {
        matches!(self, DeviceKind::Clock | DeviceKind::Rc | DeviceKind::Siggen | DeviceKind::Dtype)
    }
}

/// The qualifier supplied (or not) in an `InitStmt`'s `QualifierClause`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualifier {
    Absent,
    GateInputs(u8),
    SwitchInitial(bool),
    Period(u32),
    Pattern(Vec<bool>),
}

/// A logic signal level. `Rising`/`Falling` are transient, resolved to `High`/`Low` at the
/// end of each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalLevel {
    Low,
    High,
    Rising,
    Falling,
    Blank,
}

impl SignalLevel {
    /// Whether this level reads as a logical 1 for combinational purposes.
    #[must_use]
    pub fn is_high(self) -> bool {
        matches!(self, SignalLevel::High | SignalLevel::Rising)
    }

    #[must_use]
    pub fn is_rising(self) -> bool {
        matches!(self, SignalLevel::Rising)
    }

    /// Collapses a transient level to its steady-state value for the next cycle.
    #[must_use]
    pub fn resolve(self) -> SignalLevel {
        match self {
            SignalLevel::Rising => SignalLevel::High,
            SignalLevel::Falling => SignalLevel::Low,
            other => other,
        }
    }
}

/// An input port name: numbered gate inputs, or one of a DTYPE's four named inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputPort {
    I(u8),
    Data,
    Clk,
    Set,
    Clear,
}

impl InputPort {
    #[must_use]
    pub fn as_string(self) -> String {
        match self {
            InputPort::I(n) => format!("I{n}"),
            InputPort::Data => "DATA".to_string(),
            InputPort::Clk => "CLK".to_string(),
            InputPort::Set => "SET".to_string(),
            InputPort::Clear => "CLEAR".to_string(),
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "DATA" => InputPort::Data,
            "CLK" => InputPort::Clk,
            "SET" => InputPort::Set,
            "CLEAR" => InputPort::Clear,
            _ => {
                let digits = s.strip_prefix('I')?;
                let n: u8 = digits.parse().ok()?;
                InputPort::I(n)
            }
        })
    }
}

/// An output port name: the single anonymous gate output, or one of a DTYPE's two outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputPort {
    Out,
    Q,
    Qbar,
}

impl OutputPort {
    #[must_use]
    pub fn as_string(self) -> String {
        match self {
            OutputPort::Out => String::new(),
            OutputPort::Q => "Q".to_string(),
            OutputPort::Qbar => "QBAR".to_string(),
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Q" => Some(OutputPort::Q),
            "QBAR" => Some(OutputPort::Qbar),
            _ => None,
        }
    }
}

/// Either an input or an output port, as resolved from a qualified name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRef {
    In(InputPort),
    Out(OutputPort),
}

#[derive(Debug, Clone)]
enum SequentialState {
    None,
    Clock { half_period: u32, phase: u32 },
    Rc { length: u32, elapsed: u32 },
    Siggen { pattern: Vec<bool>, step: usize },
    Dtype,
}

/// A single device instance: identity, kind, qualifier, wiring, and per-cycle state.
#[derive(Debug, Clone)]
pub struct Device {
    pub id: DeviceId,
    pub kind: DeviceKind,
    pub qualifier: Qualifier,
    inputs: BTreeMap<InputPort, Option<(DeviceId, OutputPort)>>,
    outputs: BTreeMap<OutputPort, SignalLevel>,
    state: SequentialState,
    advanced_this_cycle: bool,
}

impl Device {
    fn new(id: DeviceId, kind: DeviceKind, qualifier: Qualifier) -> Self {
        let mut inputs = BTreeMap::new();
        let mut outputs = BTreeMap::new();
        match kind {
            DeviceKind::And | DeviceKind::Nand | DeviceKind::Or | DeviceKind::Nor => {
                let n = match qualifier {
                    Qualifier::GateInputs(n) => n,
                    _ => 1,
                };
                for i in 1..=n {
                    inputs.insert(InputPort::I(i), None);
                }
                outputs.insert(OutputPort::Out, SignalLevel::Low);
            }
            DeviceKind::Xor => {
                inputs.insert(InputPort::I(1), None);
                inputs.insert(InputPort::I(2), None);
                outputs.insert(OutputPort::Out, SignalLevel::Low);
            }
            DeviceKind::Dtype => {
                inputs.insert(InputPort::Data, None);
                inputs.insert(InputPort::Clk, None);
                inputs.insert(InputPort::Set, None);
                inputs.insert(InputPort::Clear, None);
                outputs.insert(OutputPort::Q, SignalLevel::Low);
                outputs.insert(OutputPort::Qbar, SignalLevel::Low);
            }
            DeviceKind::Switch | DeviceKind::Clock | DeviceKind::Rc | DeviceKind::Siggen => {
                outputs.insert(OutputPort::Out, SignalLevel::Low);
            }
        }
        let state = match (kind, &qualifier) {
            (DeviceKind::Clock, Qualifier::Period(p)) => SequentialState::Clock { half_period: *p, phase: 0 },
            (DeviceKind::Rc, Qualifier::Period(p)) => SequentialState::Rc { length: *p, elapsed: 0 },
            (DeviceKind::Siggen, Qualifier::Pattern(bits)) => {
                SequentialState::Siggen { pattern: bits.clone(), step: 0 }
            }
            (DeviceKind::Dtype, _) => SequentialState::Dtype,
            _ => SequentialState::None,
        };
        Device { id, kind, qualifier, inputs, outputs, state, advanced_this_cycle: false }
    }

    #[must_use]
    pub fn has_input(&self, port: InputPort) -> bool {
        self.inputs.contains_key(&port)
    }

    #[must_use]
    pub fn has_output(&self, port: OutputPort) -> bool {
        self.outputs.contains_key(&port)
    }

    #[must_use]
    pub fn input_driver(&self, port: InputPort) -> Option<(DeviceId, OutputPort)> {
        self.inputs.get(&port).copied().flatten()
    }

    #[must_use]
    pub fn inputs(&self) -> impl Iterator<Item = (InputPort, Option<(DeviceId, OutputPort)>)> + '_ {
        self.inputs.iter().map(|(p, d)| (*p, *d))
    }

    #[must_use]
    pub fn output_level(&self, port: OutputPort) -> Option<SignalLevel> {
        self.outputs.get(&port).copied()
    }

    fn set_input_driver(&mut self, port: InputPort, driver: (DeviceId, OutputPort)) -> bool {
        match self.inputs.get_mut(&port) {
            Some(slot) if slot.is_none() => {
                *slot = Some(driver);
                true
            }
            _ => false,
        }
    }

    fn reset_cycle_flag(&mut self) {
        self.advanced_this_cycle = false;
    }

    /// Recomputes this device's outputs given the current levels driving each input.
    ///
    /// Sequential devices (CLOCK, RC, SIGGEN, DTYPE) only advance their internal counters the
    /// first time this is called within a cycle; later calls in the same cycle (a later
    /// propagation pass) recompute from the already-advanced state.
    fn evaluate(&mut self, input_levels: &HashMap<InputPort, SignalLevel>) -> bool {
        let mut changed = false;
        match self.kind {
            DeviceKind::And | DeviceKind::Nand | DeviceKind::Or | DeviceKind::Nor | DeviceKind::Xor => {
                let levels: Vec<SignalLevel> =
                    self.inputs.keys().map(|p| input_levels.get(p).copied().unwrap_or(SignalLevel::Low)).collect();
                let new_level = match self.kind {
                    DeviceKind::And => bool_to_level(levels.iter().all(|l| l.is_high())),
                    DeviceKind::Nand => bool_to_level(!levels.iter().all(|l| l.is_high())),
                    DeviceKind::Or => bool_to_level(levels.iter().any(|l| l.is_high())),
                    DeviceKind::Nor => bool_to_level(!levels.iter().any(|l| l.is_high())),
                    DeviceKind::Xor => {
                        bool_to_level(levels.iter().filter(|l| l.is_high()).count() % 2 == 1)
                    }
                    _ => unreachable!(),
                };
                changed |= self.set_output(OutputPort::Out, new_level);
            }
            DeviceKind::Switch => {
                // Static: output only changes via `Devices::set_switch`/cold-startup.
            }
            DeviceKind::Clock => {
                if !self.advanced_this_cycle {
                    if let SequentialState::Clock { half_period, phase } = &mut self.state {
                        *phase += 1;
                        if *phase >= *half_period {
                            *phase = 0;
                            let current = self.outputs.get(&OutputPort::Out).copied().unwrap_or(SignalLevel::Low);
                            let next = if current.is_high() { SignalLevel::Falling } else { SignalLevel::Rising };
                            changed |= self.set_output(OutputPort::Out, next);
                        }
                    }
                }
            }
            DeviceKind::Rc => {
                if !self.advanced_this_cycle {
                    if let SequentialState::Rc { length, elapsed } = &mut self.state {
                        if *elapsed < *length {
                            *elapsed += 1;
                            if *elapsed == *length {
                                changed |= self.set_output(OutputPort::Out, SignalLevel::Falling);
                            }
                        } else {
                            changed |= self.set_output(OutputPort::Out, SignalLevel::Low);
                        }
                    }
                }
            }
            DeviceKind::Siggen => {
                if !self.advanced_this_cycle {
                    if let SequentialState::Siggen { pattern, step } = &mut self.state {
                        if !pattern.is_empty() {
                            let bit = pattern[*step % pattern.len()];
                            *step += 1;
                            changed |= self.set_output(OutputPort::Out, bool_to_level(bit));
                        }
                    }
                }
            }
            DeviceKind::Dtype => {
                let set = input_levels.get(&InputPort::Set).copied().unwrap_or(SignalLevel::Low).is_high();
                let clear = input_levels.get(&InputPort::Clear).copied().unwrap_or(SignalLevel::Low).is_high();
                if set && !clear {
                    changed |= self.set_output(OutputPort::Q, SignalLevel::High);
                    changed |= self.set_output(OutputPort::Qbar, SignalLevel::Low);
                } else if clear && !set {
                    changed |= self.set_output(OutputPort::Q, SignalLevel::Low);
                    changed |= self.set_output(OutputPort::Qbar, SignalLevel::High);
                } else if !self.advanced_this_cycle {
                    let clk = input_levels.get(&InputPort::Clk).copied().unwrap_or(SignalLevel::Low);
                    if clk.is_rising() {
                        let data = input_levels.get(&InputPort::Data).copied().unwrap_or(SignalLevel::Low).is_high();
                        changed |= self.set_output(OutputPort::Q, bool_to_level(data));
                        changed |= self.set_output(OutputPort::Qbar, bool_to_level(!data));
                    }
                }
            }
        }
        self.advanced_this_cycle = true;
        changed
    }

    fn set_output(&mut self, port: OutputPort, level: SignalLevel) -> bool {
        let slot = self.outputs.entry(port).or_insert(level);
        if *slot == level {
            false
        } else {
            *slot = level;
            true
        }
    }

    /// Resolves transient RISING/FALLING outputs to HIGH/LOW at end-of-cycle.
    fn resolve_outputs(&mut self) {
        for level in self.outputs.values_mut() {
            *level = level.resolve();
        }
    }

    fn cold_start(&mut self, initial_switch: Option<bool>) {
        self.advanced_this_cycle = false;
        match &mut self.state {
            SequentialState::Clock { phase, .. } => *phase = 0,
            SequentialState::Rc { elapsed, .. } => *elapsed = 0,
            SequentialState::Siggen { step, .. } => *step = 0,
            SequentialState::Dtype | SequentialState::None => {}
        }
        match self.kind {
            DeviceKind::Clock => {
                self.outputs.insert(OutputPort::Out, SignalLevel::Low);
            }
            DeviceKind::Rc => {
                self.outputs.insert(OutputPort::Out, SignalLevel::High);
            }
            DeviceKind::Siggen => {
                if let SequentialState::Siggen { pattern, .. } = &self.state {
                    let first = pattern.first().copied().unwrap_or(false);
                    self.outputs.insert(OutputPort::Out, bool_to_level(first));
                }
            }
            DeviceKind::Dtype => {
                self.outputs.insert(OutputPort::Q, SignalLevel::Low);
                self.outputs.insert(OutputPort::Qbar, SignalLevel::Low);
            }
            DeviceKind::Switch => {
                if let Some(initial) = initial_switch {
                    self.outputs.insert(OutputPort::Out, bool_to_level(initial));
                }
            }
            DeviceKind::And | DeviceKind::Nand | DeviceKind::Or | DeviceKind::Nor | DeviceKind::Xor => {
                self.outputs.insert(OutputPort::Out, SignalLevel::Low);
            }
        }
    }
}

fn bool_to_level(b: bool) -> SignalLevel {
    if b {
        SignalLevel::High
    } else {
        SignalLevel::Low
    }
}

/// The set of all devices declared in one circuit description.
#[derive(Debug, Default)]
pub struct Devices {
    order: Vec<DeviceId>,
    records: HashMap<DeviceId, Device>,
}

impl Devices {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a new device. See the per-kind qualifier table in the module design docs.
    pub fn make_device(&mut self, id: DeviceId, kind: DeviceKind, qualifier: Qualifier) -> Result<(), SemanticError> {
        if self.records.contains_key(&id) {
            return Err(SemanticError::DevicePresent);
        }
        match kind {
            DeviceKind::And | DeviceKind::Nand | DeviceKind::Or | DeviceKind::Nor => match qualifier {
                Qualifier::GateInputs(n) if (1..=16).contains(&n) => {}
                Qualifier::GateInputs(_) => return Err(SemanticError::InvalidQualifier),
                Qualifier::Absent => return Err(SemanticError::NoQualifier),
                _ => return Err(SemanticError::BadDevice),
            },
            DeviceKind::Xor | DeviceKind::Dtype => match qualifier {
                Qualifier::Absent => {}
                _ => return Err(SemanticError::QualifierPresent),
            },
            DeviceKind::Switch => match qualifier {
                Qualifier::SwitchInitial(_) => {}
                Qualifier::Absent => return Err(SemanticError::NoQualifier),
                _ => return Err(SemanticError::BadDevice),
            },
            DeviceKind::Clock | DeviceKind::Rc => match qualifier {
                Qualifier::Period(p) if p > 0 => {}
                Qualifier::Period(_) => return Err(SemanticError::InvalidQualifier),
                Qualifier::Absent => return Err(SemanticError::NoQualifier),
                _ => return Err(SemanticError::BadDevice),
            },
            DeviceKind::Siggen => match &qualifier {
                Qualifier::Pattern(bits) if !bits.is_empty() => {}
                Qualifier::Pattern(_) => return Err(SemanticError::InvalidQualifier),
                Qualifier::Absent => return Err(SemanticError::NoQualifier),
                _ => return Err(SemanticError::BadDevice),
            },
        }
        self.order.push(id);
        self.records.insert(id, Device::new(id, kind, qualifier));
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: DeviceId) -> Option<&mut Device> {
        self.records.get_mut(&id)
    }

    #[must_use]
    pub fn contains(&self, id: DeviceId) -> bool {
        self.records.contains_key(&id)
    }

    /// Declaration order; used by Network for deterministic propagation-pass iteration.
    #[must_use]
    pub fn order(&self) -> &[DeviceId] {
        &self.order
    }

    #[must_use]
    pub fn find_devices(&self, kind: DeviceKind) -> Vec<DeviceId> {
        self.order.iter().copied().filter(|id| self.records[id].kind == kind).collect()
    }

    /// Resolves `NAME` or `NAME.PORT` to a device id and optional port.
    pub fn get_signal_ids(&self, names: &Names, qualified: &str) -> Result<(DeviceId, Option<PortRef>), SemanticError> {
        let (name_part, port_part) = match qualified.split_once('.') {
            Some((n, p)) => (n, Some(p)),
            None => (qualified, None),
        };
        let id = names.query(name_part).ok_or(SemanticError::DeviceAbsent)?;
        let device = self.records.get(&id).ok_or(SemanticError::DeviceAbsent)?;
        let port = match port_part {
            None => None,
            Some(p) => {
                if let Some(out) = OutputPort::from_str(p) {
                    if device.has_output(out) {
                        Some(PortRef::Out(out))
                    } else {
                        return Err(SemanticError::PortAbsent);
                    }
                } else if let Some(input) = InputPort::from_str(p) {
                    if device.has_input(input) {
                        Some(PortRef::In(input))
                    } else {
                        return Err(SemanticError::PortAbsent);
                    }
                } else {
                    return Err(SemanticError::PortAbsent);
                }
            }
        };
        Ok((id, port))
    }

    /// Re-initialises every device's mutable state to cold-startup conditions. Switches are
    /// reset to the initial value they were declared with, discarding interim toggles.
    pub fn cold_startup(&mut self) {
        for id in &self.order {
            let device = self.records.get_mut(id).expect("device in `order` must be in `records`");
            let initial_switch = match device.qualifier {
                Qualifier::SwitchInitial(b) => Some(b),
                _ => None,
            };
            device.cold_start(initial_switch);
        }
    }

    /// Changes a SWITCH device's output. Takes effect on the next `execute_network` call.
    pub fn set_switch(&mut self, id: DeviceId, level: bool) -> Result<(), SemanticError> {
        let device = self.records.get_mut(&id).ok_or(SemanticError::DeviceAbsent)?;
        if device.kind != DeviceKind::Switch {
            return Err(SemanticError::BadDevice);
        }
        device.outputs.insert(OutputPort::Out, bool_to_level(level));
        Ok(())
    }

    pub(crate) fn set_input_driver(
        &mut self,
        dst: DeviceId,
        dst_port: InputPort,
        driver: (DeviceId, OutputPort),
    ) -> bool {
        self.records.get_mut(&dst).map(|d| d.set_input_driver(dst_port, driver)).unwrap_or(false)
    }

    pub(crate) fn reset_cycle_flags(&mut self) {
        for device in self.records.values_mut() {
            device.reset_cycle_flag();
        }
    }

    pub(crate) fn evaluate_device(&mut self, id: DeviceId, input_levels: &HashMap<InputPort, SignalLevel>) -> bool {
        self.records.get_mut(&id).map(|d| d.evaluate(input_levels)).unwrap_or(false)
    }

    pub(crate) fn resolve_all_outputs(&mut self) {
        for device in self.records.values_mut() {
            device.resolve_outputs();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_input_count_out_of_range_is_rejected() {
        let mut devices = Devices::new();
        assert_eq!(
            devices.make_device(0, DeviceKind::And, Qualifier::GateInputs(0)),
            Err(SemanticError::InvalidQualifier)
        );
        assert_eq!(
            devices.make_device(1, DeviceKind::And, Qualifier::GateInputs(17)),
            Err(SemanticError::InvalidQualifier)
        );
        assert!(devices.make_device(2, DeviceKind::And, Qualifier::GateInputs(16)).is_ok());
    }

    #[test]
    fn duplicate_device_id_is_rejected() {
        let mut devices = Devices::new();
        devices.make_device(0, DeviceKind::Switch, Qualifier::SwitchInitial(false)).unwrap();
        assert_eq!(
            devices.make_device(0, DeviceKind::Switch, Qualifier::SwitchInitial(true)),
            Err(SemanticError::DevicePresent)
        );
    }

    #[test]
    fn xor_rejects_a_qualifier() {
        let mut devices = Devices::new();
        assert_eq!(
            devices.make_device(0, DeviceKind::Xor, Qualifier::GateInputs(2)),
            Err(SemanticError::QualifierPresent)
        );
    }

    #[test]
    fn and_gate_all_high_outputs_high() {
        let mut devices = Devices::new();
        devices.make_device(0, DeviceKind::And, Qualifier::GateInputs(2)).unwrap();
        let mut levels = HashMap::new();
        levels.insert(InputPort::I(1), SignalLevel::High);
        levels.insert(InputPort::I(2), SignalLevel::High);
        devices.evaluate_device(0, &levels);
        assert_eq!(devices.get(0).unwrap().output_level(OutputPort::Out), Some(SignalLevel::High));
    }

    #[test]
    fn clock_toggles_after_half_period() {
        let mut devices = Devices::new();
        devices.make_device(0, DeviceKind::Clock, Qualifier::Period(2)).unwrap();
        devices.cold_startup();
        let empty = HashMap::new();
        devices.reset_cycle_flags();
        devices.evaluate_device(0, &empty); // phase 1
        assert_eq!(devices.get(0).unwrap().output_level(OutputPort::Out), Some(SignalLevel::Low));
        devices.resolve_all_outputs();
        devices.reset_cycle_flags();
        devices.evaluate_device(0, &empty); // phase 2: half-period reached
        assert_eq!(devices.get(0).unwrap().output_level(OutputPort::Out), Some(SignalLevel::Rising));
    }

    #[test]
    fn rc_goes_low_after_length_elapses() {
        let mut devices = Devices::new();
        devices.make_device(0, DeviceKind::Rc, Qualifier::Period(1)).unwrap();
        devices.cold_startup();
        assert_eq!(devices.get(0).unwrap().output_level(OutputPort::Out), Some(SignalLevel::High));
        let empty = HashMap::new();
        devices.reset_cycle_flags();
        devices.evaluate_device(0, &empty);
        assert_eq!(devices.get(0).unwrap().output_level(OutputPort::Out), Some(SignalLevel::Falling));
    }

    #[test]
    fn dtype_copies_data_on_rising_clk() {
        let mut devices = Devices::new();
        devices.make_device(0, DeviceKind::Dtype, Qualifier::Absent).unwrap();
        let mut levels = HashMap::new();
        levels.insert(InputPort::Data, SignalLevel::High);
        levels.insert(InputPort::Clk, SignalLevel::Rising);
        devices.evaluate_device(0, &levels);
        assert_eq!(devices.get(0).unwrap().output_level(OutputPort::Q), Some(SignalLevel::High));
        assert_eq!(devices.get(0).unwrap().output_level(OutputPort::Qbar), Some(SignalLevel::Low));
    }

    #[test]
    fn get_signal_ids_resolves_bare_name_and_port() {
        let mut names = Names::new();
        let id = names.intern_one("D1").unwrap();
        let mut devices = Devices::new();
        devices.make_device(id, DeviceKind::Dtype, Qualifier::Absent).unwrap();
        let (resolved, port) = devices.get_signal_ids(&names, "D1.Q").unwrap();
        assert_eq!(resolved, id);
        assert_eq!(port, Some(PortRef::Out(OutputPort::Q)));
    }

    #[test]
    fn get_signal_ids_rejects_unknown_port() {
        let mut names = Names::new();
        let id = names.intern_one("D1").unwrap();
        let mut devices = Devices::new();
        devices.make_device(id, DeviceKind::Dtype, Qualifier::Absent).unwrap();
        assert_eq!(devices.get_signal_ids(&names, "D1.I1"), Err(SemanticError::PortAbsent));
    }
}
