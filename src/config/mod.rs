// src/config/mod.rs

pub mod parameters;
pub mod scenario;

pub use parameters::{Corrector, SimulationParameters};
pub use scenario::{InitialCondition, Scenario, SpectralTable};
