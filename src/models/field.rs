// src/models/field.rs

use std::mem;

use crate::math::error::{first_non_finite, SimError};

/// 2時刻分の離散化された場
///
/// `current` と `previous` は常に長さ `Nx` で、`previous` は `current` の
/// 1ステップ前の値を保持する。バッファは構築時に一度だけ確保し、
/// 以後は入れ替えのみで更新する。
#[derive(Debug, Clone, PartialEq)]
pub struct FieldState {
    current: Vec<f64>,
    previous: Vec<f64>,
    dx: f64,
    dt: f64,
}

impl FieldState {
    /// 初期条件関数を格子点 `x_i = i·dx` で評価して構築する（初速度ゼロ）
    ///
    /// # 引数
    /// - `nx`: 格子点数
    /// - `dx`: 格子間隔
    /// - `dt`: 時間刻み
    /// - `initial`: 初期条件 `x -> Φ0(x)`
    pub fn new<F>(nx: usize, dx: f64, dt: f64, initial: F) -> Result<Self, SimError>
    where
        F: Fn(f64) -> f64,
    {
        let values = (0..nx).map(|i| initial(i as f64 * dx)).collect();
        Self::from_samples(values, dx, dt)
    }

    /// 格子点上の値から直接構築する（初速度ゼロ）
    pub fn from_samples(values: Vec<f64>, dx: f64, dt: f64) -> Result<Self, SimError> {
        let nx = values.len();
        if nx < 3 {
            return Err(SimError::config(format!(
                "格子点数は3以上が必要です (Nx = {nx})"
            )));
        }
        if !(dx.is_finite() && dx > 0.0) {
            return Err(SimError::config(format!("dx は正の有限値が必要です (dx = {dx})")));
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::config(format!("dt は正の有限値が必要です (dt = {dt})")));
        }
        if let Some(i) = first_non_finite(&values) {
            return Err(SimError::config(format!(
                "初期条件が格子点 {i} で有限ではありません"
            )));
        }

        Ok(FieldState {
            previous: values.clone(),
            current: values,
            dx,
            dt,
        })
    }

    pub fn nx(&self) -> usize {
        self.current.len()
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn current(&self) -> &[f64] {
        &self.current
    }

    pub fn previous(&self) -> &[f64] {
        &self.previous
    }

    /// 中央の格子点 `Nx/2` の値
    pub fn center(&self) -> f64 {
        self.current[self.nx() / 2]
    }

    /// 格子点の座標 `i·dx`
    pub fn coordinates(&self) -> Vec<f64> {
        (0..self.nx()).map(|i| i as f64 * self.dx).collect()
    }

    /// バッファを1ステップ進める
    ///
    /// `previous := current`, `current := next`。呼び出し後の `next` には
    /// 不要になった旧 `previous` が入り、次ステップの作業領域として再利用できる。
    pub(crate) fn advance(&mut self, next: &mut Vec<f64>) {
        debug_assert_eq!(next.len(), self.current.len());
        mem::swap(&mut self.previous, &mut self.current);
        mem::swap(&mut self.current, next);
    }
}
