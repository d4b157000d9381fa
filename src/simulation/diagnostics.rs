// src/simulation/diagnostics.rs

use crate::config::parameters::SimulationParameters;
use crate::math::error::SimError;
use crate::math::stencil::centered_gradient;
use crate::models::field::FieldState;
use crate::models::force::ForceEvaluator;

/// 1回分の診断量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagnosticSample {
    pub time: f64,
    pub total_energy: f64,
    pub center_amplitude: f64,
    pub kinetic: f64,
    pub gradient: f64,
    pub mass: f64,
    pub potential: f64,
}

/// 診断量の時系列（追記のみ）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosticSeries {
    samples: Vec<DiagnosticSample>,
}

/// エネルギー時系列の要約
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergySummary {
    pub final_energy: f64,
    pub mean_energy: f64,
    /// 標準偏差 / 平均（平均がゼロなら NaN）
    pub relative_std: f64,
}

impl DiagnosticSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, sample: DiagnosticSample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[DiagnosticSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&DiagnosticSample> {
        self.samples.last()
    }

    pub fn energies(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.total_energy).collect()
    }

    /// 最終エネルギーと相対標準偏差
    ///
    /// # 戻り値
    /// - 系列が空なら `None`
    pub fn summary(&self) -> Option<EnergySummary> {
        let last = self.samples.last()?;
        let n = self.samples.len() as f64;
        let mean = self.samples.iter().map(|s| s.total_energy).sum::<f64>() / n;
        let variance = self
            .samples
            .iter()
            .map(|s| (s.total_energy - mean).powi(2))
            .sum::<f64>()
            / n;
        let relative_std = if mean == 0.0 {
            f64::NAN
        } else {
            variance.sqrt() / mean
        };

        Some(EnergySummary {
            final_energy: last.total_energy,
            mean_energy: mean,
            relative_std,
        })
    }
}

/// 現在の場からエネルギー各成分と中央振幅を計算する
///
/// # 引数
/// - `field`: 入れ替え済みの場（`previous` は1ステップ前）
/// - `evaluator`: ポテンシャル評価に使う評価器
/// - `params`: m0², λ を参照する
/// - `time`: 記録する時刻
///
/// # 戻り値
/// - `(time, K+G+M+V, Φ[Nx/2])` とその内訳
pub fn sample(
    field: &FieldState,
    evaluator: &ForceEvaluator<'_>,
    params: &SimulationParameters,
    time: f64,
) -> Result<DiagnosticSample, SimError> {
    let (dx, dt) = (field.dx(), field.dt());
    let current = field.current();

    let kinetic = 0.5
        * current
            .iter()
            .zip(field.previous())
            .map(|(c, p)| ((c - p) / dt).powi(2))
            .sum::<f64>()
        * dx;
    let gradient = 0.5
        * centered_gradient(current, dx)
            .iter()
            .map(|g| g * g)
            .sum::<f64>()
        * dx;
    let mass = 0.5 * params.m0_sq * current.iter().map(|c| c * c).sum::<f64>() * dx;
    let potential = evaluator.potential_energy(current, params.lambda_c, dx)?;

    Ok(DiagnosticSample {
        time,
        total_energy: kinetic + gradient + mass + potential,
        center_amplitude: field.center(),
        kinetic,
        gradient,
        mass,
        potential,
    })
}
