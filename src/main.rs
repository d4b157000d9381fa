// src/main.rs

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fieldsim::simulation::csv::{setup_csv_output, write_diagnostics};
use fieldsim::simulation::load_parameters::{load_parameters, load_scenario};
use fieldsim::{DiagnosticSeries, Integrator};

/// 非線形スカラー場の時間積分
#[derive(Debug, Parser)]
#[command(name = "fieldsim", version)]
struct Args {
    /// シミュレーションパラメータ (YAML)
    #[arg(long, default_value = "config/parameters.yaml")]
    parameters: PathBuf,

    /// 初期条件と指数表 (YAML)
    #[arg(long, default_value = "config/scenario.yaml")]
    scenario: PathBuf,

    /// 診断量の出力先 (CSV)
    #[arg(long, default_value = "output/diagnostics.csv")]
    output: PathBuf,

    /// 指定したステップ数で打ち切る
    #[arg(long)]
    steps: Option<usize>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // 設定とシナリオの読み込み
    let params = load_parameters(&args.parameters)?;
    let scenario = load_scenario(&args.scenario)?;

    // 場と指数表の初期化
    let series = scenario.spectral_table.build()?;
    let field = scenario.initial_condition.build_field(&params)?;
    let integrator = Integrator::with_field(&params, &series, field)?;

    // シミュレーションのメインループ
    let limit = args.steps.unwrap_or(params.nt);
    let outcome = integrator.run_with_checkpoint(|step| step < limit);

    let diagnostics: &DiagnosticSeries = match &outcome {
        Ok(report) => &report.diagnostics,
        Err(failure) => &failure.diagnostics,
    };

    // CSV出力（失敗時も途中までを書き出す）
    let mut writer = setup_csv_output(&args.output)?;
    write_diagnostics(&mut writer, diagnostics)?;
    writer.flush()?;
    info!(path = %args.output.display(), samples = diagnostics.len(), "診断量を書き出しました");

    if let Some(summary) = diagnostics.summary() {
        info!(
            final_energy = summary.final_energy,
            relative_std_percent = summary.relative_std * 100.0,
            "エネルギー要約"
        );
    }

    match outcome {
        Ok(report) => {
            info!(state = ?report.state, steps = report.steps_completed, "完了しました");
            Ok(())
        }
        Err(failure) => {
            error!(%failure, "計算に失敗しました");
            Err(failure.into())
        }
    }
}
