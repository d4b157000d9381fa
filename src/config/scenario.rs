// src/config/scenario.rs

use serde::Deserialize;

use crate::config::parameters::SimulationParameters;
use crate::math::error::SimError;
use crate::models::field::FieldState;
use crate::models::spectral::SpectralSeries;

/// 初期条件と指数表からなるシナリオ
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Scenario {
    pub initial_condition: InitialCondition,
    pub spectral_table: SpectralTable,
}

/// 初期条件 `x -> Φ0(x)`
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialCondition {
    /// `amplitude·exp(-width_coeff·(x - center)²) + offset`（`center` 省略時は L/2）
    Gaussian {
        amplitude: f64,
        width_coeff: f64,
        #[serde(default)]
        center: Option<f64>,
        #[serde(default)]
        offset: f64,
    },
    Constant {
        value: f64,
    },
    /// 格子点ごとの値（長さは Nx と一致すること）
    Samples {
        values: Vec<f64>,
    },
}

impl Default for InitialCondition {
    // 真空揺らぎ: 0.75·exp(-0.08(x - L/2)²) + 0.15
    fn default() -> Self {
        InitialCondition::Gaussian {
            amplitude: 0.75,
            width_coeff: 0.08,
            center: None,
            offset: 0.15,
        }
    }
}

impl InitialCondition {
    /// パラメータの格子上に場を構築する
    ///
    /// # 引数
    /// - `params`: 検証済みのシミュレーションパラメータ
    ///
    /// # 戻り値
    /// - 初速度ゼロの `FieldState`
    pub fn build_field(&self, params: &SimulationParameters) -> Result<FieldState, SimError> {
        let (dx, dt) = (params.dx(), params.dt());
        match self {
            InitialCondition::Gaussian {
                amplitude,
                width_coeff,
                center,
                offset,
            } => {
                let x0 = center.unwrap_or(params.length / 2.0);
                FieldState::new(params.nx, dx, dt, |x| {
                    amplitude * (-width_coeff * (x - x0).powi(2)).exp() + offset
                })
            }
            InitialCondition::Constant { value } => FieldState::new(params.nx, dx, dt, |_| *value),
            InitialCondition::Samples { values } => {
                if values.len() != params.nx {
                    return Err(SimError::config(format!(
                        "初期値の個数が格子点数と一致しません ({} != {})",
                        values.len(),
                        params.nx
                    )));
                }
                FieldState::from_samples(values.clone(), dx, dt)
            }
        }
    }
}

/// 複素指数表の指定
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpectralTable {
    /// 組み込みの50項ゼータ零点表
    #[default]
    RiemannZeros,
    /// `ρ_k = 0.5 + i·t_k` の虚部を列挙
    Ordinates { values: Vec<f64> },
}

impl SpectralTable {
    pub fn build(&self) -> Result<SpectralSeries, SimError> {
        match self {
            SpectralTable::RiemannZeros => Ok(SpectralSeries::riemann_zeros()),
            SpectralTable::Ordinates { values } => SpectralSeries::from_ordinates(values),
        }
    }
}
