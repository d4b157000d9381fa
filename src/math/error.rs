// src/math/error.rs

use std::fmt;

use thiserror::Error;

use crate::simulation::framework::RunState;

/// 非有限値が検出された計算段階
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstabilityStage {
    /// 非線形力の評価
    Force,
    /// ポテンシャルエネルギーの評価
    Potential,
    /// 三重対角系の求解
    Solve,
}

impl fmt::Display for InstabilityStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstabilityStage::Force => "force",
            InstabilityStage::Potential => "potential",
            InstabilityStage::Solve => "solve",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error("設定が不正です: {0}")]
    Configuration(String),
    #[error("数値が発散しました (段階: {stage}, 格子点: {index})")]
    NumericalInstability {
        stage: InstabilityStage,
        index: usize,
    },
    #[error("この状態ではステップを進められません: {0:?}")]
    InvalidState(RunState),
    #[error("入出力エラー: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAMLの読み込みに失敗しました: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SimError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        SimError::Configuration(message.into())
    }

    /// 数値不安定エラーかどうか
    pub fn is_instability(&self) -> bool {
        matches!(self, SimError::NumericalInstability { .. })
    }
}

/// スライス中で最初に見つかった非有限値の位置を返す
pub(crate) fn first_non_finite(values: &[f64]) -> Option<usize> {
    values.iter().position(|v| !v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_non_finite() {
        assert_eq!(first_non_finite(&[0.0, 1.0, 2.0]), None);
        assert_eq!(first_non_finite(&[0.0, f64::NAN, f64::INFINITY]), Some(1));
    }

    #[test]
    fn test_instability_message_names_stage() {
        let error = SimError::NumericalInstability {
            stage: InstabilityStage::Solve,
            index: 3,
        };
        assert!(error.is_instability());
        assert!(error.to_string().contains("solve"));
    }
}
