pub mod csv;
pub mod pdf;
pub mod png;
pub mod zip;

use crate::error::Result;
use std::path::{Path, PathBuf};
use teavision_common::ReportTable;

pub const PREDICTIONS_STEM: &str = "tea_region_predictions";
pub const POLYPHENOL_STEM: &str = "polyphenol_predictions";
pub const COMPARISON_STEM: &str = "tea_model_comparison_predictions";
pub const CROPPED_ZIP_NAME: &str = "cropped_images.zip";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Pdf,
    Png,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            "png" | "image" => Ok(ExportFormat::Png),
            _ => Err(format!("Unknown format: {}. Use csv, pdf, or png", s)),
        }
    }
}

/// 出力先がディレクトリ（または拡張子なし）なら既定のファイル名を付ける
pub fn output_path_for_format(output: &Path, stem: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", stem, extension))
    } else {
        output.to_path_buf()
    }
}

/// 表を指定形式で書き出し、書き出したパスを返す
pub fn export_table(
    table: &ReportTable,
    format: ExportFormat,
    output: &Path,
    stem: &str,
) -> Result<PathBuf> {
    let path = output_path_for_format(output, stem, format.extension());
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    match format {
        ExportFormat::Csv => csv::write_csv(table, &path)?,
        ExportFormat::Pdf => pdf::generate_pdf(table, &path)?,
        ExportFormat::Png => png::generate_png(table, &path)?,
    }
    tracing::info!(path = %path.display(), rows = table.rows.len(), "exported");
    Ok(path)
}

/// 組込みフォント・ビットマップフォントで描けない文字を置き換える
pub(crate) fn ascii_cell(cell: &str) -> String {
    let cell = cell
        .replace('—', "-")
        .replace("✅ ", "")
        .replace("❌ ", "")
        .replace("⏳ ", "");
    cell.chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect()
}

/// 幅を超えるセルを "..." で切り詰める
pub(crate) fn truncate(cell: &str, max_chars: usize) -> String {
    if cell.chars().count() <= max_chars {
        return cell.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = cell.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// 行の状態（Status / Result 列）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowTone {
    Plain,
    Good,
    Bad,
}

pub(crate) fn row_tone(table: &ReportTable, row: &[String]) -> RowTone {
    let column = table
        .headers
        .iter()
        .position(|h| h == "Status" || h == "Result");
    match column.and_then(|i| row.get(i)).map(String::as_str) {
        Some("Done") | Some("✅ Correct") => RowTone::Good,
        Some("Failed") | Some("❌ Failed") => RowTone::Bad,
        _ => RowTone::Plain,
    }
}
