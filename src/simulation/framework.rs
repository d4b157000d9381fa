// src/simulation/framework.rs

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::parameters::{Corrector, SimulationParameters};
use crate::math::error::SimError;
use crate::math::stencil::laplacian_into;
use crate::math::tridiagonal::TridiagonalOperator;
use crate::models::field::FieldState;
use crate::models::force::ForceEvaluator;
use crate::models::spectral::SpectralSeries;
use crate::simulation::diagnostics::{self, DiagnosticSeries};

/// 積分器の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Uninitialized,
    Running,
    Completed,
    Failed,
    Cancelled,
}

/// 正常終了（または中断）した計算の結果
#[derive(Debug, Clone)]
pub struct RunReport {
    pub state: RunState,
    pub steps_completed: usize,
    pub field: Vec<f64>,
    pub diagnostics: DiagnosticSeries,
}

/// 失敗した計算。途中までの診断量を含む。
#[derive(Debug, Error)]
#[error("ステップ {step} で計算に失敗しました: {source}")]
pub struct RunFailure {
    #[source]
    pub source: SimError,
    pub step: usize,
    pub field: Vec<f64>,
    pub diagnostics: DiagnosticSeries,
}

/// 予測子・Crank-Nicolson 修正子による時間積分器
///
/// 場のバッファ、作業領域、診断量の時系列をすべて自身で所有する。
/// スペクトル級数のみ呼び出し側から借用する。
pub struct Integrator<'a> {
    params: SimulationParameters,
    field: FieldState,
    evaluator: ForceEvaluator<'a>,
    operator: TridiagonalOperator,
    diagnostics: DiagnosticSeries,
    state: RunState,
    steps_completed: usize,
    // 作業領域
    lap: Vec<f64>,
    force: Vec<f64>,
    predicted: Vec<f64>,
    lap_pred: Vec<f64>,
    force_pred: Vec<f64>,
    lap_prev: Vec<f64>,
    force_prev: Vec<f64>,
    rhs: Vec<f64>,
    next: Vec<f64>,
}

impl<'a> Integrator<'a> {
    /// 初期条件関数から積分器を構築する
    ///
    /// # 引数
    /// - `params`: シミュレーションパラメータ
    /// - `series`: 非線形力の指数表
    /// - `initial`: 初期条件 `x -> Φ0(x)`
    pub fn new<F>(
        params: &SimulationParameters,
        series: &'a SpectralSeries,
        initial: F,
    ) -> Result<Self, SimError>
    where
        F: Fn(f64) -> f64,
    {
        params.validate()?;
        let field = FieldState::new(params.nx, params.dx(), params.dt(), initial)?;
        Self::with_field(params, series, field)
    }

    /// 構築済みの場から積分器を構築する
    pub fn with_field(
        params: &SimulationParameters,
        series: &'a SpectralSeries,
        field: FieldState,
    ) -> Result<Self, SimError> {
        params.validate()?;
        if series.is_empty() {
            return Err(SimError::config("スペクトル表が空です"));
        }
        if field.nx() != params.nx {
            return Err(SimError::config(format!(
                "場の格子点数がパラメータと一致しません ({} != {})",
                field.nx(),
                params.nx
            )));
        }
        if field.dx() != params.dx() || field.dt() != params.dt() {
            return Err(SimError::config(format!(
                "場の dx, dt がパラメータと一致しません (dx = {}, dt = {})",
                field.dx(),
                field.dt()
            )));
        }

        let n = params.nx;
        let operator = TridiagonalOperator::new(n, params.alpha(), params.boundary)?;

        Ok(Integrator {
            params: params.clone(),
            field,
            evaluator: ForceEvaluator::new(series),
            operator,
            diagnostics: DiagnosticSeries::new(),
            state: RunState::Uninitialized,
            steps_completed: 0,
            lap: vec![0.0; n],
            force: vec![0.0; n],
            predicted: vec![0.0; n],
            lap_pred: vec![0.0; n],
            force_pred: vec![0.0; n],
            lap_prev: vec![0.0; n],
            force_prev: vec![0.0; n],
            rhs: vec![0.0; n],
            next: vec![0.0; n],
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn field(&self) -> &FieldState {
        &self.field
    }

    pub fn operator(&self) -> &TridiagonalOperator {
        &self.operator
    }

    pub fn diagnostics(&self) -> &DiagnosticSeries {
        &self.diagnostics
    }

    pub fn steps_completed(&self) -> usize {
        self.steps_completed
    }

    /// 直近のステップで求解に渡した右辺（境界処理済み）
    pub fn last_rhs(&self) -> &[f64] {
        &self.rhs
    }

    /// 直近のステップの予測子
    pub fn last_predictor(&self) -> &[f64] {
        &self.predicted
    }

    /// 1ステップ進める
    ///
    /// `Nt` ステップ目を終えると `Completed` になる。
    /// 数値が発散した場合は `Failed` に遷移し、以後のステップは拒否される。
    pub fn step(&mut self) -> Result<(), SimError> {
        match self.state {
            RunState::Uninitialized => {
                info!(
                    nx = self.params.nx,
                    nt = self.params.nt,
                    dx = self.field.dx(),
                    dt = self.field.dt(),
                    alpha = self.operator.alpha(),
                    boundary = ?self.params.boundary,
                    corrector = ?self.params.corrector,
                    "時間積分を開始します"
                );
                self.state = RunState::Running;
            }
            RunState::Running => {}
            other => return Err(SimError::InvalidState(other)),
        }

        if let Err(err) = self.advance() {
            error!(step = self.steps_completed, %err, "数値が発散したため計算を中止します");
            self.state = RunState::Failed;
            return Err(err);
        }

        self.steps_completed += 1;
        if self.steps_completed >= self.params.nt {
            self.state = RunState::Completed;
        }
        Ok(())
    }

    /// 残りのステップをすべて実行する
    pub fn run(self) -> Result<RunReport, RunFailure> {
        self.run_with_checkpoint(|_| true)
    }

    /// 各ステップの先頭で `checkpoint(step)` を呼び、`false` なら中断する
    pub fn run_with_checkpoint<C>(mut self, mut checkpoint: C) -> Result<RunReport, RunFailure>
    where
        C: FnMut(usize) -> bool,
    {
        while self.steps_completed < self.params.nt {
            if !checkpoint(self.steps_completed) {
                warn!(step = self.steps_completed, "呼び出し側の要求により中断しました");
                self.state = RunState::Cancelled;
                break;
            }
            if let Err(source) = self.step() {
                return Err(RunFailure {
                    source,
                    step: self.steps_completed,
                    field: self.field.current().to_vec(),
                    diagnostics: self.diagnostics,
                });
            }
        }

        if let Some(summary) = self.diagnostics.summary() {
            info!(
                steps = self.steps_completed,
                samples = self.diagnostics.len(),
                final_energy = summary.final_energy,
                relative_std = summary.relative_std,
                "時間積分を終了しました"
            );
        }

        Ok(RunReport {
            state: self.state,
            steps_completed: self.steps_completed,
            field: self.field.current().to_vec(),
            diagnostics: self.diagnostics,
        })
    }

    // 予測子・修正子・求解・減衰・入れ替え・診断
    fn advance(&mut self) -> Result<(), SimError> {
        let dx = self.field.dx();
        let dt = self.field.dt();
        let dt2 = dt * dt;
        let m0_sq = self.params.m0_sq;
        let coupling = self.params.lambda_c;
        let policy = self.params.boundary;

        let current = self.field.current();
        let previous = self.field.previous();

        // 予測子（陽的 leapfrog）
        laplacian_into(current, dx, policy, &mut self.lap);
        self.evaluator.force_into(current, coupling, &mut self.force)?;
        for i in 0..current.len() {
            self.force[i] -= m0_sq * current[i];
            self.predicted[i] =
                2.0 * current[i] - previous[i] + dt2 * (self.lap[i] + self.force[i]);
        }

        laplacian_into(&self.predicted, dx, policy, &mut self.lap_pred);
        self.evaluator
            .force_into(&self.predicted, coupling, &mut self.force_pred)?;
        for i in 0..current.len() {
            self.force_pred[i] -= m0_sq * self.predicted[i];
        }

        // 修正子の右辺
        match self.params.corrector {
            Corrector::Averaged => {
                for i in 0..current.len() {
                    self.rhs[i] = 2.0 * current[i] - previous[i]
                        + 0.5
                            * dt2
                            * (self.lap[i] + self.lap_pred[i] + self.force[i] + self.force_pred[i]);
                }
            }
            Corrector::Newmark => {
                laplacian_into(previous, dx, policy, &mut self.lap_prev);
                self.evaluator
                    .force_into(previous, coupling, &mut self.force_prev)?;
                for i in 0..current.len() {
                    self.force_prev[i] -= m0_sq * previous[i];
                    let spatial = 0.5 * self.lap[i] + 0.25 * self.lap_prev[i];
                    let forcing =
                        0.25 * self.force_prev[i] + 0.5 * self.force[i] + 0.25 * self.force_pred[i];
                    self.rhs[i] = 2.0 * current[i] - previous[i] + dt2 * (spatial + forcing);
                }
            }
        }
        self.operator.apply_boundary(&mut self.rhs);

        self.operator.solve_into(&self.rhs, &mut self.next)?;

        // 減衰: γ∂Φ/∂t 項を陰的系に含めず、求解後に一様に割る（演算子分割の近似）
        let divisor = self.params.damping_divisor();
        for value in self.next.iter_mut() {
            *value /= divisor;
        }

        self.field.advance(&mut self.next);

        if self.steps_completed % self.params.diagnostic_stride == 0 {
            let time = (self.steps_completed + 1) as f64 * dt;
            let sample = diagnostics::sample(&self.field, &self.evaluator, &self.params, time)?;
            debug!(
                step = self.steps_completed,
                time,
                energy = sample.total_energy,
                center = sample.center_amplitude,
                "診断量"
            );
            self.diagnostics.push(sample);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::error::InstabilityStage;
    use crate::math::stencil::BoundaryPolicy;
    use approx::assert_relative_eq;

    fn five_point_params() -> SimulationParameters {
        SimulationParameters {
            length: 5.0,
            total_time: 0.1,
            nx: 5,
            nt: 1,
            m0_sq: 0.0,
            lambda_c: 0.0,
            gamma: 0.0,
            diagnostic_stride: 1,
            ..Default::default()
        }
    }

    fn five_point_field(params: &SimulationParameters) -> FieldState {
        FieldState::from_samples(vec![0.0, 0.0, 1.0, 0.0, 0.0], params.dx(), params.dt()).unwrap()
    }

    #[test]
    fn test_single_step_hand_computed() {
        let params = five_point_params();
        let series = SpectralSeries::riemann_zeros();
        let mut integrator =
            Integrator::with_field(&params, &series, five_point_field(&params)).unwrap();
        assert_eq!(integrator.state(), RunState::Uninitialized);

        integrator.step().unwrap();
        assert_eq!(integrator.state(), RunState::Completed);

        // 予測子 = [0,0,1,0,0] + 0.01·[0,1,-2,1,0]
        let expected_pred = [0.0, 0.01, 0.98, 0.01, 0.0];
        for (a, b) in integrator.last_predictor().iter().zip(expected_pred) {
            assert_relative_eq!(*a, b, epsilon = 1e-12);
        }

        // 右辺: 内部は 2Φ - Φprev + 0.005·(lap + lapPred)、端は隣の値
        let expected_rhs = [0.0098, 0.0098, 0.9803, 0.0098, 0.0098];
        for (a, b) in integrator.last_rhs().iter().zip(expected_rhs) {
            assert_relative_eq!(*a, b, epsilon = 1e-12);
        }

        // 解は A·x = rhs を満たす
        let field = integrator.field();
        let residual = integrator.operator().apply(field.current());
        for (a, b) in residual.iter().zip(expected_rhs) {
            assert_relative_eq!(*a, b, epsilon = 1e-12);
        }
        assert_relative_eq!(field.current()[2], 0.9614535633484161, epsilon = 1e-12);
        assert_relative_eq!(field.current()[1], 0.01913173076923077, epsilon = 1e-12);
        assert_relative_eq!(field.current()[0], 0.009982975113122173, epsilon = 1e-12);
        assert_eq!(field.previous(), &[0.0, 0.0, 1.0, 0.0, 0.0]);

        assert_eq!(integrator.diagnostics().len(), 1);
        let sample = integrator.diagnostics().samples()[0];
        assert_relative_eq!(sample.time, 0.1, epsilon = 1e-15);
        assert_relative_eq!(sample.center_amplitude, 0.9614535633484161, epsilon = 1e-12);
        assert_relative_eq!(sample.total_energy, 0.3472674501595424, epsilon = 1e-10);
    }

    #[test]
    fn test_single_step_periodic() {
        let params = SimulationParameters {
            boundary: BoundaryPolicy::Periodic,
            ..five_point_params()
        };
        let series = SpectralSeries::riemann_zeros();
        let mut integrator =
            Integrator::with_field(&params, &series, five_point_field(&params)).unwrap();
        integrator.step().unwrap();

        // 周期境界では右辺の上書きは行わない
        let rhs = integrator.last_rhs();
        assert_relative_eq!(rhs[0], 5e-5, epsilon = 1e-12);
        assert_relative_eq!(rhs[4], 5e-5, epsilon = 1e-12);
        assert_relative_eq!(
            integrator.field().current()[2],
            0.9614516896715849,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_nx_two_rejected_before_stepping() {
        let params = SimulationParameters {
            nx: 2,
            ..five_point_params()
        };
        let series = SpectralSeries::riemann_zeros();
        let result = Integrator::new(&params, &series, |_| 0.0);
        assert!(matches!(result, Err(SimError::Configuration(_))));
    }

    #[test]
    fn test_mismatched_field_rejected() {
        let params = five_point_params();
        let series = SpectralSeries::riemann_zeros();
        let field = FieldState::from_samples(vec![0.0; 6], 1.0, 0.1).unwrap();
        assert!(Integrator::with_field(&params, &series, field).is_err());
    }

    #[test]
    fn test_boundary_override_every_step() {
        let params = SimulationParameters {
            length: 10.0,
            total_time: 1.0,
            nx: 20,
            nt: 50,
            m0_sq: 0.08,
            lambda_c: 0.018,
            gamma: 0.2,
            diagnostic_stride: 5,
            ..Default::default()
        };
        let series = SpectralSeries::riemann_zeros();
        let mut integrator =
            Integrator::new(&params, &series, |x| 0.75 * (-0.08 * (x - 5.0).powi(2)).exp() + 0.15)
                .unwrap();

        while integrator.state() != RunState::Completed {
            integrator.step().unwrap();
            let rhs = integrator.last_rhs();
            let n = rhs.len();
            assert_eq!(rhs[0], rhs[1]);
            assert_eq!(rhs[n - 1], rhs[n - 2]);
        }
        assert_eq!(integrator.steps_completed(), 50);
        assert_eq!(integrator.diagnostics().len(), 10);
    }

    #[test]
    fn test_step_after_completion_rejected() {
        let params = five_point_params();
        let series = SpectralSeries::riemann_zeros();
        let mut integrator =
            Integrator::with_field(&params, &series, five_point_field(&params)).unwrap();
        integrator.step().unwrap();
        assert!(matches!(
            integrator.step(),
            Err(SimError::InvalidState(RunState::Completed))
        ));
    }

    #[test]
    fn test_damping_shrinks_uniform_field() {
        let params = SimulationParameters {
            length: 4.0,
            total_time: 0.25,
            nx: 8,
            nt: 25,
            m0_sq: 0.0,
            lambda_c: 0.0,
            gamma: 0.5,
            diagnostic_stride: 1,
            ..Default::default()
        };
        let series = SpectralSeries::riemann_zeros();
        let report = Integrator::new(&params, &series, |_| 1.0)
            .unwrap()
            .run()
            .unwrap();

        let centers: Vec<f64> = report
            .diagnostics
            .samples()
            .iter()
            .map(|s| s.center_amplitude)
            .collect();
        assert_eq!(centers.len(), 25);
        assert!(centers[0] < 1.0);
        for pair in centers.windows(2) {
            assert!(pair[1].abs() <= pair[0].abs() + 1e-12);
        }
    }

    #[test]
    fn test_overflowing_force_fails_run() {
        let params = SimulationParameters {
            lambda_c: f64::MAX,
            ..five_point_params()
        };
        let series = SpectralSeries::new(vec![num_complex::Complex64::new(0.5, 0.0)]).unwrap();
        let integrator = Integrator::new(&params, &series, |_| 0.01).unwrap();

        let failure = integrator.run().unwrap_err();
        assert_eq!(failure.step, 0);
        assert!(failure.diagnostics.is_empty());
        assert!(matches!(
            failure.source,
            SimError::NumericalInstability {
                stage: InstabilityStage::Force,
                ..
            }
        ));
    }

    #[test]
    fn test_failed_run_rejects_further_steps() {
        let params = SimulationParameters {
            lambda_c: f64::MAX,
            ..five_point_params()
        };
        let series = SpectralSeries::new(vec![num_complex::Complex64::new(0.5, 0.0)]).unwrap();
        let mut integrator = Integrator::new(&params, &series, |_| 0.01).unwrap();

        assert!(integrator.step().is_err());
        assert_eq!(integrator.state(), RunState::Failed);
        assert!(matches!(
            integrator.step(),
            Err(SimError::InvalidState(RunState::Failed))
        ));
    }

    #[test]
    fn test_checkpoint_cancels_between_steps() {
        let params = SimulationParameters {
            nt: 10,
            total_time: 1.0,
            ..five_point_params()
        };
        let series = SpectralSeries::riemann_zeros();
        let integrator = Integrator::with_field(&params, &series, five_point_field(&params)).unwrap();

        let mut seen = Vec::new();
        let report = integrator
            .run_with_checkpoint(|step| {
                seen.push(step);
                step < 3
            })
            .unwrap();
        assert_eq!(report.state, RunState::Cancelled);
        assert_eq!(report.steps_completed, 3);
        assert_eq!(report.diagnostics.len(), 3);
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }
}
