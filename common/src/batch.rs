//! バッチ（画像・ポリフェノール行）の保持
//!
//! 予測結果は入力と同じエントリに格納し、添字の対応関係を
//! 別配列で管理しない。

use crate::error::{Error, Result};
use crate::model::ModelVariant;
use crate::types::{PredictionResult, RowStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// 重複判定キー（ファイル名 + サイズ）
///
/// 内容ハッシュではないため、同名同サイズの別ファイルは同一扱いになる。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageKey {
    pub file_name: String,
    pub file_size: u64,
}

/// 既存にないキーの要素だけを末尾に追加し、追加件数を返す
pub fn merge_unique<T, F>(existing: &mut Vec<T>, incoming: Vec<T>, key: F) -> usize
where
    F: Fn(&T) -> ImageKey,
{
    let mut seen: HashSet<ImageKey> = existing.iter().map(&key).collect();
    let before = existing.len();
    for item in incoming {
        if seen.insert(key(&item)) {
            existing.push(item);
        }
    }
    existing.len() - before
}

/// アップロード画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageItem {
    pub file_name: String,
    pub file_size: u64,
    pub bytes: Vec<u8>,
    pub mime: String,
    /// プレビュー参照（CLIはパス、WebはオブジェクトURL）
    pub preview: Option<String>,
}

impl ImageItem {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            file_size: bytes.len() as u64,
            bytes,
            mime: mime.into(),
            preview: None,
        }
    }

    pub fn key(&self) -> ImageKey {
        ImageKey {
            file_name: self.file_name.clone(),
            file_size: self.file_size,
        }
    }
}

/// 画像バッチの1行
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub item: ImageItem,
    pub result: Option<PredictionResult>,
}

impl BatchEntry {
    pub fn status(&self) -> RowStatus {
        RowStatus::of(self.result.as_ref())
    }
}

/// 順序付き画像バッチ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageBatch {
    entries: Vec<BatchEntry>,
}

impl ImageBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// 画像を追加（重複は無視）し、追加件数を返す
    pub fn add(&mut self, items: Vec<ImageItem>) -> usize {
        let incoming = items
            .into_iter()
            .map(|item| BatchEntry { item, result: None })
            .collect();
        merge_unique(&mut self.entries, incoming, |e| e.item.key())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn items(&self) -> Vec<&ImageItem> {
        self.entries.iter().map(|e| &e.item).collect()
    }

    pub fn remove(&mut self, index: usize) -> Option<BatchEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn set_result(&mut self, index: usize, result: PredictionResult) -> Result<()> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or_else(|| Error::Validation(format!("no image at index {}", index)))?;
        entry.result = Some(result);
        Ok(())
    }

    /// 入力順の結果をまとめて反映
    pub fn apply_results(&mut self, results: Vec<PredictionResult>) -> Result<()> {
        if results.len() != self.entries.len() {
            return Err(Error::Schema(format!(
                "expected {} results, got {}",
                self.entries.len(),
                results.len()
            )));
        }
        for (entry, result) in self.entries.iter_mut().zip(results) {
            entry.result = Some(result);
        }
        Ok(())
    }

    pub fn statuses(&self) -> Vec<RowStatus> {
        self.entries.iter().map(BatchEntry::status).collect()
    }
}

/// ポリフェノール測定行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolyphenolRow {
    pub region: Option<String>,
    pub grade: Option<String>,
    pub sample: Option<String>,
    pub absorbance: f64,
    pub concentration: f64,
}

/// 行と結果の組
#[derive(Debug, Clone, PartialEq)]
pub struct PolyphenolEntry {
    id: u64,
    pub row: PolyphenolRow,
    pub result: Option<PredictionResult>,
}

impl PolyphenolEntry {
    /// 表内で一意な行ID（削除・置換後も再利用しない）
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 予測と入力地域の一致（予測が無ければNone）
    pub fn is_correct(&self) -> Option<bool> {
        let prediction = self.result.as_ref()?.prediction.as_ref()?;
        Some(self.row.region.as_deref() == Some(prediction.as_str()))
    }
}

/// ポリフェノール表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolyphenolTable {
    entries: Vec<PolyphenolEntry>,
    next_id: u64,
}

impl PolyphenolTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, row: PolyphenolRow) -> PolyphenolEntry {
        let id = self.next_id;
        self.next_id += 1;
        PolyphenolEntry {
            id,
            row,
            result: None,
        }
    }

    /// CSV取込: 既存の行と結果を置き換える
    pub fn replace(&mut self, rows: Vec<PolyphenolRow>) {
        let entries: Vec<_> = rows.into_iter().map(|row| self.entry(row)).collect();
        self.entries = entries;
    }

    /// 手入力行を追加（サンプル名は `Sample-N`）
    pub fn push_manual(
        &mut self,
        region: Option<String>,
        grade: Option<String>,
        absorbance: f64,
        concentration: f64,
    ) -> Result<()> {
        if !absorbance.is_finite() || !concentration.is_finite() {
            return Err(Error::Validation(
                "Absorbance and Concentration must be numbers".into(),
            ));
        }
        let sample = format!("Sample-{}", self.entries.len() + 1);
        let entry = self.entry(PolyphenolRow {
            region: region.filter(|s| !s.trim().is_empty()),
            grade: grade.filter(|s| !s.trim().is_empty()),
            sample: Some(sample),
            absorbance,
            concentration,
        });
        self.entries.push(entry);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<PolyphenolEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PolyphenolEntry] {
        &self.entries
    }

    pub fn rows(&self) -> Vec<&PolyphenolRow> {
        self.entries.iter().map(|e| &e.row).collect()
    }

    pub fn ids(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn has_results(&self) -> bool {
        self.entries.iter().any(|e| e.result.is_some())
    }

    /// 送信時点の行IDに対応する結果を反映
    ///
    /// 送信後に置換・削除された行には書き込まない。反映した件数を返す。
    pub fn apply_results_to(&mut self, ids: &[u64], results: Vec<PredictionResult>) -> Result<usize> {
        if results.len() != ids.len() {
            return Err(Error::Schema(format!(
                "expected {} results, got {}",
                ids.len(),
                results.len()
            )));
        }
        let mut applied = 0;
        for (id, result) in ids.iter().zip(results) {
            if let Some(entry) = self.entries.iter_mut().find(|e| e.id == *id) {
                entry.result = Some(result);
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// 指定IDの行だけ失敗扱いにする
    pub fn mark_failed(&mut self, ids: &[u64]) {
        for entry in self.entries.iter_mut().filter(|e| ids.contains(&e.id)) {
            entry.result = Some(PredictionResult::failed());
        }
    }

    /// 位置対応の結果を反映
    pub fn apply_results(&mut self, results: Vec<PredictionResult>) -> Result<()> {
        if results.len() != self.entries.len() {
            return Err(Error::Schema(format!(
                "expected {} results, got {}",
                self.entries.len(),
                results.len()
            )));
        }
        for (entry, result) in self.entries.iter_mut().zip(results) {
            entry.result = Some(result);
        }
        Ok(())
    }

    /// 全行を失敗扱いにする（一括リクエスト自体の失敗時）
    pub fn mark_all_failed(&mut self) {
        for entry in &mut self.entries {
            entry.result = Some(PredictionResult::failed());
        }
    }
}

/// モデル比較の1行
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonRow {
    pub file_name: String,
    pub results: BTreeMap<ModelVariant, PredictionResult>,
}

impl ComparisonRow {
    pub fn result(&self, model: ModelVariant) -> Option<&PredictionResult> {
        self.results.get(&model)
    }

    fn prediction(&self, model: ModelVariant) -> Option<&str> {
        self.result(model)?.prediction.as_deref()
    }
}

/// 2モデル間の一致件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgreementSummary {
    pub agree: usize,
    pub disagree: usize,
}

impl AgreementSummary {
    /// 両モデルとも予測がある行のみ数える
    pub fn between(rows: &[ComparisonRow], a: ModelVariant, b: ModelVariant) -> Self {
        rows.iter()
            .filter_map(|row| Some((row.prediction(a)?, row.prediction(b)?)))
            .fold(Self::default(), |mut acc, (pa, pb)| {
                if pa == pb {
                    acc.agree += 1;
                } else {
                    acc.disagree += 1;
                }
                acc
            })
    }

    pub fn total(&self) -> usize {
        self.agree + self.disagree
    }
}

/// 画像ごとのモデル別信頼度（%）。予測の無いモデルは0。
pub fn confidence_series(rows: &[ComparisonRow]) -> Vec<(String, Vec<(ModelVariant, f64)>)> {
    rows.iter()
        .map(|row| {
            let series = ModelVariant::ALL
                .iter()
                .map(|m| {
                    let pct = row
                        .result(*m)
                        .and_then(|r| r.confidence)
                        .map(|c| c * 100.0)
                        .unwrap_or(0.0);
                    (*m, pct)
                })
                .collect();
            (row.file_name.clone(), series)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str, size: usize) -> ImageItem {
        ImageItem::new(name, vec![0u8; size], "image/jpeg")
    }

    fn predicted(label: &str, confidence: f64) -> PredictionResult {
        PredictionResult {
            prediction: Some(label.to_string()),
            confidence: Some(confidence),
            ..Default::default()
        }
    }

    #[test]
    fn test_same_name_and_size_twice_yields_one_item() {
        let mut batch = ImageBatch::new();
        assert_eq!(batch.add(vec![image("leaf.jpg", 10)]), 1);
        assert_eq!(batch.add(vec![image("leaf.jpg", 10)]), 0);
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_duplicates_within_one_upload() {
        let mut batch = ImageBatch::new();
        let added = batch.add(vec![image("a.jpg", 3), image("a.jpg", 3), image("a.jpg", 4)]);
        assert_eq!(added, 2);
        assert_eq!(batch.items()[1].file_size, 4);
    }

    #[test]
    fn test_apply_results_preserves_order() {
        let mut batch = ImageBatch::new();
        batch.add(vec![image("a.jpg", 1), image("b.jpg", 2)]);
        batch
            .apply_results(vec![predicted("Central", 0.9), PredictionResult::failed()])
            .unwrap();
        assert_eq!(batch.statuses(), vec![RowStatus::Done, RowStatus::Failed]);
        assert!(batch.apply_results(vec![]).is_err());
    }

    #[test]
    fn test_set_result_out_of_range() {
        let mut batch = ImageBatch::new();
        assert!(batch.set_result(0, PredictionResult::failed()).is_err());
    }

    #[test]
    fn test_polyphenol_manual_sample_names() {
        let mut table = PolyphenolTable::new();
        table.push_manual(Some("Dimbula Region".into()), Some("OP".into()), 0.5, 10.0).unwrap();
        table.push_manual(None, Some(" ".into()), 0.6, 11.0).unwrap();
        assert_eq!(table.entries()[1].row.sample.as_deref(), Some("Sample-2"));
        assert_eq!(table.entries()[1].row.grade, None);
        assert!(table.push_manual(None, None, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_polyphenol_remove_keeps_pairing() {
        let mut table = PolyphenolTable::new();
        for (i, region) in ["A", "B", "C"].iter().enumerate() {
            table.push_manual(Some(region.to_string()), None, i as f64, 1.0).unwrap();
        }
        table
            .apply_results(vec![predicted("A", 0.9), predicted("X", 0.8), predicted("C", 0.7)])
            .unwrap();
        table.remove(1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[1].row.region.as_deref(), Some("C"));
        assert_eq!(table.entries()[1].is_correct(), Some(true));
    }

    #[test]
    fn test_polyphenol_replace_clears_results() {
        let mut table = PolyphenolTable::new();
        table.push_manual(None, None, 1.0, 1.0).unwrap();
        table.mark_all_failed();
        assert!(table.has_results());
        table.replace(vec![PolyphenolRow {
            region: None,
            grade: None,
            sample: None,
            absorbance: 0.1,
            concentration: 0.2,
        }]);
        assert!(!table.has_results());
    }

    fn row(region: &str, absorbance: f64) -> PolyphenolRow {
        PolyphenolRow {
            region: Some(region.into()),
            grade: None,
            sample: None,
            absorbance,
            concentration: 1.0,
        }
    }

    #[test]
    fn test_results_for_replaced_rows_are_dropped() {
        let mut table = PolyphenolTable::new();
        table.push_manual(Some("Dimbula Region".into()), None, 0.6, 1.0).unwrap();
        let in_flight = table.ids();

        // 応答前にCSVを読み直した
        table.replace(vec![row("Ruhuna Region", 0.1)]);
        let applied = table
            .apply_results_to(&in_flight, vec![predicted("Dimbula Region", 0.9)])
            .unwrap();

        assert_eq!(applied, 0);
        assert_eq!(table.entries()[0].row.absorbance, 0.1);
        assert!(table.entries()[0].result.is_none());
    }

    #[test]
    fn test_row_added_in_flight_keeps_earlier_results() {
        let mut table = PolyphenolTable::new();
        table.replace(vec![row("Dimbula Region", 0.6), row("Ruhuna Region", 0.1)]);
        let in_flight = table.ids();

        table.push_manual(Some("Sabaragamuwa Region".into()), None, 0.3, 1.0).unwrap();
        table.remove(0);
        let applied = table
            .apply_results_to(
                &in_flight,
                vec![predicted("Dimbula Region", 0.9), predicted("Ruhuna Region", 0.8)],
            )
            .unwrap();

        assert_eq!(applied, 1);
        assert_eq!(table.entries()[0].is_correct(), Some(true));
        assert!(table.entries()[1].result.is_none());
        assert!(table
            .apply_results_to(&in_flight, vec![predicted("Dimbula Region", 0.9)])
            .is_err());
    }

    #[test]
    fn test_mark_failed_only_touches_sent_rows() {
        let mut table = PolyphenolTable::new();
        table.replace(vec![row("Dimbula Region", 0.6)]);
        let in_flight = table.ids();
        table.push_manual(None, None, 0.2, 1.0).unwrap();

        table.mark_failed(&in_flight);
        assert!(table.entries()[0].result.as_ref().is_some_and(|r| r.is_failed()));
        assert!(table.entries()[1].result.is_none());
        assert_ne!(table.entries()[0].id(), table.entries()[1].id());
    }

    #[test]
    fn test_agreement_summary_counts_only_complete_rows() {
        let mut rows = Vec::new();
        for (name, a, b) in [("1", Some("Central"), Some("Central")), ("2", Some("Central"), Some("Southern")), ("3", Some("Central"), None)] {
            let mut row = ComparisonRow { file_name: name.into(), ..Default::default() };
            if let Some(a) = a {
                row.results.insert(ModelVariant::ResNet18, predicted(a, 0.9));
            }
            match b {
                Some(b) => row.results.insert(ModelVariant::ResNet4, predicted(b, 0.8)),
                None => row.results.insert(ModelVariant::ResNet4, PredictionResult::failed()),
            };
            rows.push(row);
        }
        let summary = AgreementSummary::between(&rows, ModelVariant::ResNet18, ModelVariant::ResNet4);
        assert_eq!(summary, AgreementSummary { agree: 1, disagree: 1 });
        assert_eq!(summary.total(), 2);

        let series = confidence_series(&rows);
        assert_eq!(series.len(), 3);
        assert_eq!(series[2].1[1], (ModelVariant::ResNet4, 0.0));
    }
}
