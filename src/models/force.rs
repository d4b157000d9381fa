// src/models/force.rs

use crate::math::error::{InstabilityStage, SimError};
use crate::models::spectral::SpectralSeries;

/// 非線形項を評価する場の下限値 ε
pub const FIELD_FLOOR: f64 = 1e-12;

/// 対数を取れる格子点なら `Some(ln Φ)`、下限以下なら `None`
///
/// 非線形項は正の場でのみ定義されるため、`Φ <= ε` の点は寄与ゼロとする。
/// これはエラーではない。
pub fn masked_log(value: f64) -> Option<f64> {
    if value > FIELD_FLOOR {
        Some(value.ln())
    } else {
        None
    }
}

/// スペクトル級数による非線形力とポテンシャルの評価器
#[derive(Debug, Clone, Copy)]
pub struct ForceEvaluator<'a> {
    series: &'a SpectralSeries,
}

impl<'a> ForceEvaluator<'a> {
    pub fn new(series: &'a SpectralSeries) -> Self {
        ForceEvaluator { series }
    }

    pub fn series(&self) -> &'a SpectralSeries {
        self.series
    }

    /// 非線形力 `-λ·Σ_k Re Φ^(ρ_k - 1)`
    ///
    /// # 引数
    /// - `field`: 場の値
    /// - `coupling`: 結合定数 λ
    ///
    /// # 戻り値
    /// - 各格子点の力（`field` と同じ長さ）
    pub fn force(&self, field: &[f64], coupling: f64) -> Result<Vec<f64>, SimError> {
        let mut out = vec![0.0; field.len()];
        self.force_into(field, coupling, &mut out)?;
        Ok(out)
    }

    /// [`ForceEvaluator::force`] の書き込み先指定版
    pub fn force_into(&self, field: &[f64], coupling: f64, out: &mut [f64]) -> Result<(), SimError> {
        debug_assert_eq!(field.len(), out.len());

        for (i, (&phi, slot)) in field.iter().zip(out.iter_mut()).enumerate() {
            let value = match masked_log(phi) {
                Some(log_phi) => {
                    let sum: f64 = self
                        .series
                        .iter()
                        .map(|&rho| ((rho - 1.0) * log_phi).exp().re)
                        .sum();
                    -coupling * sum
                }
                None => 0.0,
            };

            if !value.is_finite() {
                return Err(SimError::NumericalInstability {
                    stage: InstabilityStage::Force,
                    index: i,
                });
            }
            *slot = value;
        }
        Ok(())
    }

    /// ポテンシャルエネルギー `λ·dx·Σ_i Σ_k Re(Φ_i^ρ_k / ρ_k)`
    ///
    /// # 引数
    /// - `field`: 場の値
    /// - `coupling`: 結合定数 λ
    /// - `dx`: 格子間隔
    pub fn potential_energy(&self, field: &[f64], coupling: f64, dx: f64) -> Result<f64, SimError> {
        let mut total = 0.0;
        for (i, &phi) in field.iter().enumerate() {
            if let Some(log_phi) = masked_log(phi) {
                total += self
                    .series
                    .iter()
                    .map(|&rho| ((rho * log_phi).exp() / rho).re)
                    .sum::<f64>();
                if !total.is_finite() {
                    return Err(SimError::NumericalInstability {
                        stage: InstabilityStage::Potential,
                        index: i,
                    });
                }
            }
        }

        let energy = total * coupling * dx;
        if !energy.is_finite() {
            return Err(SimError::NumericalInstability {
                stage: InstabilityStage::Potential,
                index: field.len().saturating_sub(1),
            });
        }
        Ok(energy)
    }
}
