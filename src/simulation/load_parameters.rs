// src/simulation/load_parameters.rs

use std::fs::File;
use std::path::Path;

use serde_yaml::from_reader;

use crate::config::{parameters::SimulationParameters, scenario::Scenario};
use crate::math::error::SimError;

/// シミュレーションパラメータの読み込み
pub fn load_parameters(path: impl AsRef<Path>) -> Result<SimulationParameters, SimError> {
    let file = File::open(path)?;
    let params: SimulationParameters = from_reader(file)?;
    params.validate()?;
    Ok(params)
}

/// シナリオの読み込み
pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario, SimError> {
    let file = File::open(path)?;
    let scenario: Scenario = from_reader(file)?;
    Ok(scenario)
}
