// src/config/parameters.rs

use serde::Deserialize;

use crate::math::error::SimError;
use crate::math::stencil::BoundaryPolicy;

/// 修正子の形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corrector {
    /// 予測子と現在値のラプラシアンを平均した右辺を `A = I - dt²·D2` で解く
    #[default]
    Averaged,
    /// n-1, n, n+1 の空間演算子を 1/4, 1/2, 1/4 で重み付けする対称形
    /// （`A = I - (dt²/4)·D2`）。線形部分のエネルギーを保存する。
    Newmark,
}

impl Corrector {
    /// `(dt/dx)²` に掛ける陰的部分の重み
    pub fn implicit_weight(&self) -> f64 {
        match self {
            Corrector::Averaged => 1.0,
            Corrector::Newmark => 0.25,
        }
    }
}

/// シミュレーションパラメータ
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationParameters {
    pub length: f64,              // 領域長 L
    pub total_time: f64,          // 総時間 T
    pub nx: usize,                // 格子点数
    pub nt: usize,                // 時間ステップ数
    pub m0_sq: f64,               // 質量項 m0²
    pub lambda_c: f64,            // 非線形力の結合定数 λ
    pub gamma: f64,               // 減衰率 γ
    pub diagnostic_stride: usize, // 診断量を記録するステップ間隔
    pub boundary: BoundaryPolicy,
    pub corrector: Corrector,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        SimulationParameters {
            length: 40.0,
            total_time: 120.0,
            nx: 1024,
            nt: 30_000,
            m0_sq: 0.08,
            lambda_c: 0.018,
            gamma: 0.2,
            diagnostic_stride: 100,
            boundary: BoundaryPolicy::ZeroGradient,
            corrector: Corrector::Averaged,
        }
    }
}

impl SimulationParameters {
    /// 格子間隔 `L / Nx`
    pub fn dx(&self) -> f64 {
        self.length / self.nx as f64
    }

    /// 時間刻み `T / Nt`
    pub fn dt(&self) -> f64 {
        self.total_time / self.nt as f64
    }

    /// 陰的行列の係数 `w·(dt/dx)²`
    pub fn alpha(&self) -> f64 {
        let ratio = self.dt() / self.dx();
        self.corrector.implicit_weight() * ratio * ratio
    }

    /// 求解後に割る減衰の除数 `1 + γ·dt/2`
    pub fn damping_divisor(&self) -> f64 {
        1.0 + self.gamma * self.dt() / 2.0
    }

    /// ステップ開始前の検証
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.length.is_finite() && self.length > 0.0) {
            return Err(SimError::config(format!(
                "L は正の有限値が必要です (L = {})",
                self.length
            )));
        }
        if !(self.total_time.is_finite() && self.total_time > 0.0) {
            return Err(SimError::config(format!(
                "T は正の有限値が必要です (T = {})",
                self.total_time
            )));
        }
        if self.nx < 3 {
            return Err(SimError::config(format!(
                "格子点数は3以上が必要です (Nx = {})",
                self.nx
            )));
        }
        if self.nt < 1 {
            return Err(SimError::config("ステップ数は1以上が必要です (Nt = 0)"));
        }
        if !self.m0_sq.is_finite() || !self.lambda_c.is_finite() {
            return Err(SimError::config("m0_sq と lambda_c は有限値が必要です"));
        }
        if !(self.gamma.is_finite() && self.gamma >= 0.0) {
            return Err(SimError::config(format!(
                "減衰率は0以上が必要です (gamma = {})",
                self.gamma
            )));
        }
        if self.diagnostic_stride < 1 {
            return Err(SimError::config("診断間隔は1以上が必要です"));
        }

        let (dx, dt) = (self.dx(), self.dt());
        if !(dx > 0.0 && dt > 0.0) {
            return Err(SimError::config(format!(
                "dx, dt は正の値が必要です (dx = {dx}, dt = {dt})"
            )));
        }
        Ok(())
    }
}
