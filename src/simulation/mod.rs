// src/simulation/mod.rs

pub mod csv;
pub mod diagnostics;
pub mod framework;
pub mod load_parameters;

pub use diagnostics::{DiagnosticSample, DiagnosticSeries, EnergySummary};
pub use framework::{Integrator, RunFailure, RunReport, RunState};
