// src/lib.rs

//! 非線形スカラー場方程式 `Φ_tt = Φ_xx - m0²Φ - F(Φ)` の1次元時間積分。
//!
//! 陽的予測子と Crank-Nicolson 修正子を組み合わせ、毎ステップ定数三重対角系を解く。

pub mod config;
pub mod math;
pub mod models;
pub mod simulation;

pub use config::{Corrector, InitialCondition, Scenario, SimulationParameters, SpectralTable};
pub use math::{BoundaryPolicy, InstabilityStage, SimError, TridiagonalOperator};
pub use models::{FieldState, ForceEvaluator, SpectralSeries};
pub use simulation::{
    DiagnosticSample, DiagnosticSeries, EnergySummary, Integrator, RunFailure, RunReport, RunState,
};
