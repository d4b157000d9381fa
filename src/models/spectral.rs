// src/models/spectral.rs

use num_complex::Complex64;

use crate::math::error::SimError;

/// 非自明なリーマンゼータ零点の虚部（最初の50個）
pub const RIEMANN_ZERO_ORDINATES: [f64; 50] = [
    14.134725141734693, 21.022039638771555, 25.010857580145688,
    30.424876125859513, 32.935061587739189, 37.586178158825671,
    40.918719012147495, 43.327073280914999, 48.005150881167159,
    49.773832477672302, 52.970321477714460, 56.446247697624132,
    59.347044002602353, 60.831778524609719, 65.112544048081606,
    67.079810529494173, 69.546401711173524, 72.067157674481907,
    75.704690699083933, 77.144840068874805, 79.337375020249427,
    82.910380854086030, 84.735492980515550, 87.425274613125167,
    88.809111207634522, 92.491899270558484, 94.651344040519885,
    95.870634228245066, 98.831194218193692, 101.31785100618667,
    104.35609779, 106.5228753, 108.871803, 111.029535543, 113.144549,
    115.226680321, 117.336, 119.449, 121.551, 123.642, 125.731, 127.818,
    129.903, 131.986, 134.067, 136.147, 138.225, 140.302, 142.378, 144.453,
];

/// 非線形力を定める複素指数 `ρ_k` の順序付き集合
///
/// 構築後は変更できない。積分器は参照として借用する。
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralSeries {
    exponents: Box<[Complex64]>,
}

impl SpectralSeries {
    /// 複素指数から直接構築する
    ///
    /// # 引数
    /// - `exponents`: 空でない、有限値のみの指数列
    pub fn new(exponents: Vec<Complex64>) -> Result<Self, SimError> {
        if exponents.is_empty() {
            return Err(SimError::config("スペクトル表が空です"));
        }
        if let Some(k) = exponents.iter().position(|rho| !rho.is_finite()) {
            return Err(SimError::config(format!(
                "スペクトル表の {k} 番目の指数が有限ではありません"
            )));
        }
        Ok(SpectralSeries {
            exponents: exponents.into_boxed_slice(),
        })
    }

    /// 虚部 `t_k` の表から `ρ_k = 0.5 + i·t_k` を構築する
    ///
    /// # 引数
    /// - `ordinates`: 狭義単調増加の `t_k`
    pub fn from_ordinates(ordinates: &[f64]) -> Result<Self, SimError> {
        if let Some(k) = ordinates.windows(2).position(|w| w[0] >= w[1]) {
            return Err(SimError::config(format!(
                "スペクトル表は狭義単調増加である必要があります (位置 {})",
                k + 1
            )));
        }
        Self::new(
            ordinates
                .iter()
                .map(|&t| Complex64::new(0.5, t))
                .collect(),
        )
    }

    /// 既定の50項のゼータ零点表
    pub fn riemann_zeros() -> Self {
        SpectralSeries {
            exponents: RIEMANN_ZERO_ORDINATES
                .iter()
                .map(|&t| Complex64::new(0.5, t))
                .collect(),
        }
    }

    pub fn exponents(&self) -> &[Complex64] {
        &self.exponents
    }

    pub fn len(&self) -> usize {
        self.exponents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exponents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Complex64> {
        self.exponents.iter()
    }
}
