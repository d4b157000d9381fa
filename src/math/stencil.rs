// src/math/stencil.rs

use serde::Deserialize;

/// 空間境界の扱い
///
/// 1回の計算ではラプラシアン・陰的行列・右辺のすべてが同じ方針に従う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// 端点で勾配ゼロ（鏡像ゴースト点 Φ[-1] = Φ[1], Φ[N] = Φ[N-2]）
    #[default]
    ZeroGradient,
    /// 周期境界（添字を N で巡回）
    Periodic,
}

/// 2階中心差分ラプラシアン
///
/// # 引数
/// - `field`: 場の値（長さ3以上）
/// - `dx`: 格子間隔
/// - `policy`: 境界の扱い
/// - `out`: 結果の書き込み先（`field` と同じ長さ）
pub fn laplacian_into(field: &[f64], dx: f64, policy: BoundaryPolicy, out: &mut [f64]) {
    let n = field.len();
    debug_assert!(n >= 3);
    debug_assert_eq!(out.len(), n);
    let inv_dx2 = 1.0 / (dx * dx);

    for i in 1..n - 1 {
        out[i] = (field[i + 1] - 2.0 * field[i] + field[i - 1]) * inv_dx2;
    }

    match policy {
        BoundaryPolicy::ZeroGradient => {
            out[0] = 2.0 * (field[1] - field[0]) * inv_dx2;
            out[n - 1] = 2.0 * (field[n - 2] - field[n - 1]) * inv_dx2;
        }
        BoundaryPolicy::Periodic => {
            out[0] = (field[1] - 2.0 * field[0] + field[n - 1]) * inv_dx2;
            out[n - 1] = (field[0] - 2.0 * field[n - 1] + field[n - 2]) * inv_dx2;
        }
    }
}

pub fn laplacian(field: &[f64], dx: f64, policy: BoundaryPolicy) -> Vec<f64> {
    let mut out = vec![0.0; field.len()];
    laplacian_into(field, dx, policy, &mut out);
    out
}

/// 1階微分（内部は中心差分、両端は片側差分）
///
/// # 引数
/// - `field`: 場の値（長さ2以上）
/// - `dx`: 格子間隔
///
/// # 戻り値
/// - 各格子点の勾配
pub fn centered_gradient(field: &[f64], dx: f64) -> Vec<f64> {
    let n = field.len();
    let mut grad = vec![0.0; n];
    if n < 2 {
        return grad;
    }

    grad[0] = (field[1] - field[0]) / dx;
    grad[n - 1] = (field[n - 1] - field[n - 2]) / dx;
    for i in 1..n - 1 {
        grad[i] = (field[i + 1] - field[i - 1]) / (2.0 * dx);
    }
    grad
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_laplacian_single_peak() {
        let field = [0.0, 0.0, 1.0, 0.0, 0.0];
        for policy in [BoundaryPolicy::ZeroGradient, BoundaryPolicy::Periodic] {
            let lap = laplacian(&field, 1.0, policy);
            assert_eq!(lap, vec![0.0, 1.0, -2.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn test_laplacian_edges_differ_by_policy() {
        let field = [1.0, 2.0, 3.0, 4.0];

        // 鏡像: 2(Φ1-Φ0), 2(Φ2-Φ3)
        let mirrored = laplacian(&field, 1.0, BoundaryPolicy::ZeroGradient);
        assert_eq!(mirrored, vec![2.0, 0.0, 0.0, -2.0]);

        // 周期: Φ1-2Φ0+Φ3, Φ0-2Φ3+Φ2
        let periodic = laplacian(&field, 1.0, BoundaryPolicy::Periodic);
        assert_eq!(periodic, vec![4.0, 0.0, 0.0, -4.0]);
    }

    #[test]
    fn test_laplacian_of_uniform_field_is_zero() {
        let field = vec![0.3; 6];
        for policy in [BoundaryPolicy::ZeroGradient, BoundaryPolicy::Periodic] {
            assert!(laplacian(&field, 0.5, policy).iter().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn test_centered_gradient_linear_ramp() {
        let field = [0.0, 0.5, 1.0, 1.5];
        let grad = centered_gradient(&field, 0.5);
        for g in grad {
            assert!((g - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_centered_gradient_one_sided_edges() {
        let field = [0.0, 1.0, 4.0, 9.0];
        let grad = centered_gradient(&field, 1.0);
        assert_eq!(grad, vec![1.0, 2.0, 4.0, 5.0]);
    }
}
