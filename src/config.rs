//! Process-wide knobs, sourced from environment variables.
//!
//! Grounded on the teacher crate's `Config::from_env()` (`melsec_mc_core::config`), but unlike
//! its `static GLOBAL_CONFIG: Lazy<Config>`, this `Config` is constructed explicitly by the
//! caller (the CLI binary) and threaded into the `Simulator`/`Network` it configures. A library
//! that may host more than one simulator in one process should not force a single global
//! iteration cap on all of them.

/// Iteration cap, default cycle count, and log filter, each overridable by an environment
/// variable with a `CIRCUIT_SIM_` prefix.
#[derive(Debug, Clone)]
pub struct Config {
    /// Propagation passes `Network::execute_network` allows before declaring oscillation.
    pub max_settle_iterations: usize,
    /// Cycles the CLI runs when `--cycles` is not given.
    pub default_cycles: usize,
    /// `tracing-subscriber` `EnvFilter` directive the CLI installs.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self { max_settle_iterations: 1000, default_cycles: 10, log_filter: "info".to_string() }
    }
}

impl Config {
    /// Builds a `Config`, starting from [`Config::default`] and overriding each field whose
    /// environment variable is set and parses cleanly; an unparsable value falls back to the
    /// default rather than failing startup.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_settle_iterations = std::env::var("CIRCUIT_SIM_MAX_SETTLE_ITERATIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_settle_iterations);
        let default_cycles = std::env::var("CIRCUIT_SIM_DEFAULT_CYCLES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.default_cycles);
        let log_filter = std::env::var("CIRCUIT_SIM_LOG").unwrap_or(defaults.log_filter);
        Self { max_settle_iterations, default_cycles, log_filter }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_values() {
        let config = Config::default();
        assert_eq!(config.max_settle_iterations, 1000);
        assert_eq!(config.default_cycles, 10);
        assert_eq!(config.log_filter, "info");
    }
}
