// src/simulation/csv.rs

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::math::error::SimError;
use crate::simulation::diagnostics::{DiagnosticSample, DiagnosticSeries};

pub const CSV_HEADER: &str =
    "time,total_energy,kinetic,gradient,mass,potential,center_amplitude\n";

/// CSV出力の設定とヘッダーの書き込み
///
/// 出力先のディレクトリが無ければ作成する。
pub fn setup_csv_output(path: impl AsRef<Path>) -> Result<BufWriter<File>, SimError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_csv_header(&mut writer)?;
    Ok(writer)
}

pub fn write_csv_header<W: Write>(writer: &mut W) -> Result<(), std::io::Error> {
    writer.write_all(CSV_HEADER.as_bytes())
}

/// CSV行の作成
pub fn create_csv_row(sample: &DiagnosticSample) -> String {
    format!(
        "{},{},{},{},{},{},{}\n",
        sample.time,
        sample.total_energy,
        sample.kinetic,
        sample.gradient,
        sample.mass,
        sample.potential,
        sample.center_amplitude
    )
}

/// 時系列全体を書き出す
pub fn write_diagnostics<W: Write>(
    writer: &mut W,
    series: &DiagnosticSeries,
) -> Result<(), std::io::Error> {
    for sample in series.samples() {
        writer.write_all(create_csv_row(sample).as_bytes())?;
    }
    writer.flush()
}
