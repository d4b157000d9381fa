// src/math/tridiagonal.rs

use crate::math::error::{first_non_finite, InstabilityStage, SimError};
use crate::math::stencil::BoundaryPolicy;

/// 周期境界の角要素を扱う Sherman-Morrison 補正
///
/// 行列が一定なので補正ベクトル `z` は構築時に一度だけ解いておく。
#[derive(Debug, Clone)]
struct CyclicCorrection {
    gamma: f64,
    corner: f64,
    z: Vec<f64>,
    scale: f64,
}

/// 陰的ステップ用の定数三重対角行列 `A = I - α·D2`
///
/// 対角 `1+2α`、非対角 `-α`。端の行は境界方針に従う:
/// - `ZeroGradient`: 鏡像ゴースト点により端の非対角が `-2α`
/// - `Periodic`: 角要素 `A[0][N-1] = A[N-1][0] = -α`
///
/// `α >= 0` なので対角優位であり、ピボットなしの消去で安定に解ける。
#[derive(Debug, Clone)]
pub struct TridiagonalOperator {
    alpha: f64,
    policy: BoundaryPolicy,
    sub: Vec<f64>,
    diag: Vec<f64>,
    sup: Vec<f64>,
    // 前進消去の係数（周期境界では修正済み対角に対する値）
    denom: Vec<f64>,
    c_prime: Vec<f64>,
    cyclic: Option<CyclicCorrection>,
}

impl TridiagonalOperator {
    /// 行列を構築する
    ///
    /// # 引数
    /// - `n`: 格子点数（3以上）
    /// - `alpha`: `(dt/dx)^2` に陰的重みを掛けた値（0以上）
    /// - `policy`: 境界の扱い
    pub fn new(n: usize, alpha: f64, policy: BoundaryPolicy) -> Result<Self, SimError> {
        if n < 3 {
            return Err(SimError::config(format!(
                "格子点数は3以上が必要です (Nx = {n})"
            )));
        }
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(SimError::config(format!(
                "α は0以上の有限値が必要です (α = {alpha})"
            )));
        }

        let diag = vec![1.0 + 2.0 * alpha; n];
        let mut sub = vec![-alpha; n - 1];
        let mut sup = vec![-alpha; n - 1];

        let mut banded = diag.clone();
        let cyclic_terms = match policy {
            BoundaryPolicy::ZeroGradient => {
                sup[0] = -2.0 * alpha;
                sub[n - 2] = -2.0 * alpha;
                None
            }
            BoundaryPolicy::Periodic => {
                let corner = -alpha;
                let gamma = -diag[0];
                banded[0] -= gamma;
                banded[n - 1] -= corner * corner / gamma;
                Some((gamma, corner))
            }
        };

        let (denom, c_prime) = factor(&sub, &banded, &sup);
        let mut operator = TridiagonalOperator {
            alpha,
            policy,
            sub,
            diag,
            sup,
            denom,
            c_prime,
            cyclic: None,
        };

        if let Some((gamma, corner)) = cyclic_terms {
            let mut u = vec![0.0; n];
            u[0] = gamma;
            u[n - 1] = corner;
            let mut z = vec![0.0; n];
            operator.thomas_into(&u, &mut z);
            let scale = 1.0 + z[0] + corner * z[n - 1] / gamma;
            operator.cyclic = Some(CyclicCorrection {
                gamma,
                corner,
                z,
                scale,
            });
        }

        Ok(operator)
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    pub fn sub(&self) -> &[f64] {
        &self.sub
    }

    pub fn diag(&self) -> &[f64] {
        &self.diag
    }

    pub fn sup(&self) -> &[f64] {
        &self.sup
    }

    /// 求解直前に右辺へ境界方針を適用する
    ///
    /// 勾配ゼロ境界では `rhs[0] := rhs[1]`, `rhs[N-1] := rhs[N-2]`。
    /// 周期境界では何もしない。
    pub fn apply_boundary(&self, rhs: &mut [f64]) {
        if self.policy == BoundaryPolicy::ZeroGradient {
            let n = rhs.len();
            rhs[0] = rhs[1];
            rhs[n - 1] = rhs[n - 2];
        }
    }

    /// `A·x` を計算する
    pub fn apply(&self, x: &[f64]) -> Vec<f64> {
        let n = self.len();
        let mut y = vec![0.0; n];
        for i in 0..n {
            let mut acc = self.diag[i] * x[i];
            if i > 0 {
                acc += self.sub[i - 1] * x[i - 1];
            }
            if i < n - 1 {
                acc += self.sup[i] * x[i + 1];
            }
            y[i] = acc;
        }
        if let Some(cyclic) = &self.cyclic {
            y[0] += cyclic.corner * x[n - 1];
            y[n - 1] += cyclic.corner * x[0];
        }
        y
    }

    pub fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>, SimError> {
        let mut out = vec![0.0; self.len()];
        self.solve_into(rhs, &mut out)?;
        Ok(out)
    }

    /// `A·x = rhs` を解いて `out` に書き込む
    ///
    /// # 戻り値
    /// - 解に非有限値が含まれる場合は `NumericalInstability`
    pub fn solve_into(&self, rhs: &[f64], out: &mut [f64]) -> Result<(), SimError> {
        let n = self.len();
        if rhs.len() != n || out.len() != n {
            return Err(SimError::config(format!(
                "右辺の長さが行列と一致しません (rhs = {}, out = {}, N = {n})",
                rhs.len(),
                out.len()
            )));
        }

        self.thomas_into(rhs, out);

        if let Some(cyclic) = &self.cyclic {
            let fact = (out[0] + cyclic.corner * out[n - 1] / cyclic.gamma) / cyclic.scale;
            for (x, z) in out.iter_mut().zip(&cyclic.z) {
                *x -= fact * z;
            }
        }

        match first_non_finite(out) {
            Some(index) => Err(SimError::NumericalInstability {
                stage: InstabilityStage::Solve,
                index,
            }),
            None => Ok(()),
        }
    }

    // 前進消去と後退代入
    fn thomas_into(&self, rhs: &[f64], out: &mut [f64]) {
        let n = self.len();
        out[0] = rhs[0] / self.denom[0];
        for i in 1..n {
            out[i] = (rhs[i] - self.sub[i - 1] * out[i - 1]) / self.denom[i];
        }
        for i in (0..n - 1).rev() {
            out[i] -= self.c_prime[i] * out[i + 1];
        }
    }
}

/// 三重対角行列の前進消去係数
fn factor(sub: &[f64], diag: &[f64], sup: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = diag.len();
    let mut denom = vec![0.0; n];
    let mut c_prime = vec![0.0; n - 1];

    denom[0] = diag[0];
    c_prime[0] = sup[0] / denom[0];
    for i in 1..n {
        denom[i] = diag[i] - sub[i - 1] * c_prime[i - 1];
        if i < n - 1 {
            c_prime[i] = sup[i] / denom[i];
        }
    }
    (denom, c_prime)
}
