#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::doc_markdown,
    clippy::too_long_first_doc_paragraph
)]

//! circuit_sim
//!
//! Compiler and cycle-accurate simulator for a small textual digital-logic description
//! language: gates, a D-type flip-flop, switches, clocks, RC pulses, and signal generators,
//! wired together and driven cycle by cycle with sampling probes on any output.
//!
//! Pipeline, leaves first: [`names`] interns device/signal identifiers; [`error`] catalogues
//! every syntax/semantic diagnostic; [`devices`] and [`network`] model the circuit itself;
//! [`monitors`] records signal histories; [`scanner`] turns source text into tokens; [`parser`]
//! runs the three-phase grammar over them. [`simulator`] is the aggregate façade a consumer
//! (the `circuit-sim` binary, or any other front end) actually drives.
//!
//! ```no_run
//! use circuit_sim::simulator::Simulator;
//!
//! let mut sim = Simulator::compile_source(
//!     "INIT; SW1 is SWITCH initially_at 1; A1 is AND with 1 inputs; \
//!      CONNECT; SW1 connect_to A1.I1; MONITOR; Initial_monitor_at A1;".to_string(),
//!     1000,
//! ).expect("compiles");
//! sim.cold_startup();
//! sim.execute_cycle();
//! assert_eq!(sim.monitor_history("A1").unwrap().len(), 1);
//! ```

pub mod config;
pub mod devices;
pub mod error;
pub mod monitors;
pub mod names;
pub mod network;
pub mod parser;
pub mod scanner;
pub mod simulator;

pub use config::Config;
pub use simulator::{CompileOutcome, Simulator};
