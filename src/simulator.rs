//! Aggregate façade: owns one compiled circuit's [`Names`], [`Network`] (and its [`Devices`]),
//! and [`Monitors`], and exposes the operations a UI, REPL, or CLI front end drives a circuit
//! through. It introduces no domain behaviour of its own — every method delegates to the
//! sibling module that actually owns the relevant state.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::devices::{DeviceKind, OutputPort, PortRef, SignalLevel};
use crate::error::{ErrorLog, SemanticError};
use crate::monitors::Monitors;
use crate::names::Names;
use crate::network::Network;
use crate::parser;

/// Why [`Simulator::compile`] or [`Simulator::compile_source`] did not produce a simulator.
#[derive(Debug, Error)]
pub enum CompileOutcome {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("compilation failed: {syntax} syntax error(s), {semantic} semantic error(s)")]
    Diagnostics { errors: ErrorLog, syntax: usize, semantic: usize },
}

impl CompileOutcome {
    /// The rendered diagnostic blocks plus summary, for printing. Empty for an `Io` failure
    /// (there is no source to point a caret at).
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            CompileOutcome::Io { .. } => String::new(),
            CompileOutcome::Diagnostics { errors, .. } => errors.render_summary(),
        }
    }
}

/// One compiled circuit description, ready to be cold-started and cycled.
#[derive(Debug)]
pub struct Simulator {
    names: Names,
    network: Network,
    monitors: Monitors,
}

impl Simulator {
    /// Reads `path`, compiles it, and returns a ready simulator or the reason it failed.
    pub fn compile(path: &Path, max_settle_iterations: usize) -> Result<Self, CompileOutcome> {
        let source = std::fs::read_to_string(path)
            .map_err(|source| CompileOutcome::Io { path: path.to_path_buf(), source })?;
        Self::compile_source(source, max_settle_iterations)
    }

    /// Compiles already-in-memory source text. Used directly by tests and by [`Self::compile`].
    pub fn compile_source(source: String, max_settle_iterations: usize) -> Result<Self, CompileOutcome> {
        let mut names = Names::new();
        let mut network = Network::new(max_settle_iterations);
        let mut monitors = Monitors::new();
        let outcome = parser::parse(source, &mut names, &mut network, &mut monitors);
        if !outcome.success {
            let syntax = outcome.errors.syntax_count();
            let semantic = outcome.errors.semantic_count();
            return Err(CompileOutcome::Diagnostics { errors: outcome.errors, syntax, semantic });
        }
        tracing::info!(
            devices = network.devices.order().len(),
            switches = network.devices.find_devices(DeviceKind::Switch).len(),
            "circuit compiled"
        );
        Ok(Self { names, network, monitors })
    }

    /// Qualified names of every declared SWITCH device.
    #[must_use]
    pub fn switches(&self) -> Vec<String> {
        self.network
            .devices
            .find_devices(DeviceKind::Switch)
            .into_iter()
            .filter_map(|id| self.names.string_of(id).map(str::to_string))
            .collect()
    }

    /// Sets a SWITCH's output by its qualified name. Takes effect on the next cycle.
    pub fn set_switch(&mut self, name: &str, level: bool) -> Result<(), SemanticError> {
        let id = self.names.query(name).ok_or(SemanticError::DeviceAbsent)?;
        self.network.devices.set_switch(id, level)
    }

    /// Qualified names of every monitored, then every unmonitored, output in the circuit.
    #[must_use]
    pub fn monitored_signals(&self) -> Vec<String> {
        self.monitors.get_signal_names(&self.names, &self.network.devices).0
    }

    #[must_use]
    pub fn unmonitored_signals(&self) -> Vec<String> {
        self.monitors.get_signal_names(&self.names, &self.network.devices).1
    }

    /// Length of the longest monitored qualified name, for display alignment.
    #[must_use]
    pub fn margin(&self) -> usize {
        self.monitors.get_margin(&self.names)
    }

    /// Re-initialises every device to its declared cold-start state (switches to their
    /// `initially_at` value, sequential counters to zero).
    pub fn cold_startup(&mut self) {
        self.network.devices.cold_startup();
    }

    /// Runs one simulation cycle and records monitor samples on success. Returns `false` if
    /// the network fails to settle within the iteration cap (oscillation).
    pub fn execute_cycle(&mut self) -> bool {
        let settled = self.network.execute_network();
        if settled {
            self.monitors.record_signals(&self.network.devices);
        } else {
            tracing::warn!("circuit failed to settle within the iteration cap");
        }
        settled
    }

    /// Clears every monitor's recorded history; the monitors themselves remain declared.
    pub fn reset_monitors(&mut self) {
        self.monitors.reset_monitors();
    }

    /// Adds a monitor on a qualified name (`NAME` or `NAME.PORT`) beyond those the source
    /// file's own `MONITOR` block declared.
    pub fn add_monitor(&mut self, qualified: &str) -> Result<(), SemanticError> {
        self.monitors.add_by_name(&self.names, &self.network.devices, qualified, 0)
    }

    pub fn remove_monitor(&mut self, qualified: &str) -> Result<(), SemanticError> {
        let (id, port) = self.resolve_output(qualified)?;
        self.monitors.remove_monitor(id, port)
    }

    /// The recorded history of a monitored qualified name, oldest sample first.
    pub fn monitor_history(&self, qualified: &str) -> Result<&[SignalLevel], SemanticError> {
        let (id, port) = self.resolve_output(qualified)?;
        self.monitors.history(id, port).ok_or(SemanticError::DeviceAbsent)
    }

    fn resolve_output(&self, qualified: &str) -> Result<(crate::devices::DeviceId, OutputPort), SemanticError> {
        let (id, port_ref) = self.network.devices.get_signal_ids(&self.names, qualified)?;
        let port = match port_ref {
            Some(PortRef::Out(p)) => p,
            Some(PortRef::In(_)) => return Err(SemanticError::NotOutput),
            None => OutputPort::Out,
        };
        Ok((id, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AND_GATE: &str = "\
INIT;
SW1 is SWITCH initially_at 1;
SW2 is SWITCH initially_at 0;
A1 is AND with 2 inputs;
CONNECT;
SW1 connect_to A1.I1;
SW2 connect_to A1.I2;
MONITOR;
Initial_monitor_at A1;
";

    #[test]
    fn compiles_and_runs_cycles_matching_the_switch_states() {
        let mut sim = Simulator::compile_source(AND_GATE.to_string(), 1000).unwrap();
        sim.cold_startup();
        for _ in 0..3 {
            assert!(sim.execute_cycle());
        }
        assert_eq!(sim.monitor_history("A1").unwrap(), &[SignalLevel::Low, SignalLevel::Low, SignalLevel::Low]);

        sim.set_switch("SW2", true).unwrap();
        for _ in 0..2 {
            assert!(sim.execute_cycle());
        }
        assert_eq!(
            sim.monitor_history("A1").unwrap(),
            &[SignalLevel::Low, SignalLevel::Low, SignalLevel::Low, SignalLevel::High, SignalLevel::High]
        );
    }

    #[test]
    fn switches_lists_every_declared_switch() {
        let sim = Simulator::compile_source(AND_GATE.to_string(), 1000).unwrap();
        let mut names = sim.switches();
        names.sort();
        assert_eq!(names, vec!["SW1".to_string(), "SW2".to_string()]);
    }

    #[test]
    fn compile_failure_reports_diagnostic_counts() {
        let source = "INIT; SW1 is SWITCH initially_at 2; A1 is AND with 1 inputs; CONNECT; SW1 connect_to A1.I1;";
        let err = Simulator::compile_source(source.to_string(), 1000).unwrap_err();
        match err {
            CompileOutcome::Diagnostics { syntax, semantic, .. } => {
                assert_eq!(syntax, 1);
                assert_eq!(semantic, 0);
            }
            CompileOutcome::Io { .. } => panic!("expected a diagnostics failure"),
        }
    }

    #[test]
    fn compile_missing_file_reports_io_error() {
        let err = Simulator::compile(Path::new("/nonexistent/path/to/circuit.txt"), 1000).unwrap_err();
        assert!(matches!(err, CompileOutcome::Io { .. }));
    }

    #[test]
    fn reset_monitors_clears_history_without_forgetting_the_monitor() {
        let mut sim = Simulator::compile_source(AND_GATE.to_string(), 1000).unwrap();
        sim.cold_startup();
        sim.execute_cycle();
        assert_eq!(sim.monitor_history("A1").unwrap().len(), 1);
        sim.reset_monitors();
        assert_eq!(sim.monitor_history("A1").unwrap().len(), 0);
    }

    #[test]
    fn add_and_remove_monitor_round_trip() {
        let mut sim = Simulator::compile_source(AND_GATE.to_string(), 1000).unwrap();
        assert!(sim.unmonitored_signals().iter().any(|n| n == "SW1"));
        sim.add_monitor("SW1").unwrap();
        assert!(sim.monitored_signals().iter().any(|n| n == "SW1"));
        sim.remove_monitor("SW1").unwrap();
        assert!(sim.unmonitored_signals().iter().any(|n| n == "SW1"));
    }
}
