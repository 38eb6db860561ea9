//! 出力用の表データ
//!
//! CSV/PDF/PNGの各出力はすべてこの表を描画する。

use crate::batch::{ComparisonRow, ImageBatch, PolyphenolTable};
use crate::error::Result;
use crate::model::ModelVariant;
use crate::types::{format_confidence, PLACEHOLDER};

/// 表（ヘッダー + 文字列セル）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn new(title: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            title: title.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// CSV文字列（必要な箇所のみ引用符で囲む）
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| crate::error::Error::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// 各列の最大文字数（描画の列幅計算用）
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }
}

/// 複数画像予測の表
pub fn prediction_table(batch: &ImageBatch) -> ReportTable {
    let mut table = ReportTable::new(
        "Tea Region Predictions",
        &["Image Name", "Prediction", "Confidence", "Status"],
    );
    for entry in batch.entries() {
        let (prediction, confidence) = match &entry.result {
            Some(r) => (r.prediction_label(), r.confidence_label()),
            None => (PLACEHOLDER.to_string(), PLACEHOLDER.to_string()),
        };
        table.push_row(vec![
            entry.item.file_name.clone(),
            prediction,
            confidence,
            entry.status().as_str().to_string(),
        ]);
    }
    table
}

/// ポリフェノール予測の表
///
/// 地域・グレードが空の行は空セルで出力する（再取込で同じ値に戻る）。
pub fn polyphenol_table(table: &PolyphenolTable) -> ReportTable {
    let mut report = ReportTable::new(
        "Polyphenol Predictions",
        &[
            "Region",
            "Grade",
            "Sample",
            "Absorbance",
            "Concentration",
            "Prediction",
            "Confidence",
            "Result",
        ],
    );
    for (i, entry) in table.entries().iter().enumerate() {
        let row = &entry.row;
        let (prediction, confidence) = match &entry.result {
            Some(r) => (r.prediction_label(), r.confidence_label()),
            None => (PLACEHOLDER.to_string(), PLACEHOLDER.to_string()),
        };
        let verdict = match entry.is_correct() {
            Some(true) => "✅ Correct",
            Some(false) => "❌ Failed",
            None => PLACEHOLDER,
        };
        report.push_row(vec![
            row.region.clone().unwrap_or_default(),
            row.grade.clone().unwrap_or_default(),
            row.sample
                .clone()
                .unwrap_or_else(|| format!("Sample-{}", i + 1)),
            row.absorbance.to_string(),
            row.concentration.to_string(),
            prediction,
            confidence,
            verdict.to_string(),
        ]);
    }
    report
}

/// モデル比較の表
pub fn comparison_table(rows: &[ComparisonRow]) -> ReportTable {
    let mut headers = vec!["Image Name".to_string()];
    for model in ModelVariant::ALL {
        headers.push(format!("{} Prediction", model.label()));
        headers.push(format!("{} Confidence", model.label()));
    }
    let mut table = ReportTable {
        title: "Tea Model Comparison".into(),
        headers,
        rows: Vec::new(),
    };
    for row in rows {
        let mut cells = vec![row.file_name.clone()];
        for model in ModelVariant::ALL {
            match row.result(model) {
                Some(r) => {
                    cells.push(r.prediction_label());
                    cells.push(format_confidence(r.confidence));
                }
                None => {
                    cells.push(PLACEHOLDER.to_string());
                    cells.push(PLACEHOLDER.to_string());
                }
            }
        }
        table.push_row(cells);
    }
    table
}
