//! バックエンドAPIの型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - PredictionResult: `/predict` と `/predict_polyphenol_region` の1件分
//! - HealthStatus: `/health` の出力
//! - CropResponse: `/crop_reflection` の出力

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 予測失敗時にビューへ表示する固定文言
pub const PREDICTION_FAILED: &str = "Prediction failed";

/// 表示用の欠損値
pub const PLACEHOLDER: &str = "—";

/// 前処理の種別（クエリパラメータ `type`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    /// バックエンド側で自動クロップ
    #[default]
    Raw,
    /// クロップ済み画像
    Preprocessed,
}

impl ImageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Raw => "raw",
            ImageType::Preprocessed => "preprocessed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImageType::Raw => "Raw Image (Auto Crop)",
            ImageType::Preprocessed => "Preprocessed (Already Cropped)",
        }
    }
}

impl std::str::FromStr for ImageType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" => Ok(ImageType::Raw),
            "preprocessed" | "cropped" => Ok(ImageType::Preprocessed),
            _ => Err(format!("Unknown image type: {}. Use raw or preprocessed", s)),
        }
    }
}

impl std::fmt::Display for ImageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// バックエンドが返す地域情報
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionInfo {
    pub description: String,
    pub origin: String,
    pub flavor_notes: Vec<String>,
}

/// 予測結果（1画像または1行分）
///
/// `None` のフィールドはレスポンスに含まれなかったことを表す。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<BTreeMap<String, f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<RegionInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cropped_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictionResult {
    /// `{error: "Prediction failed"}`
    pub fn failed() -> Self {
        Self {
            error: Some(PREDICTION_FAILED.to_string()),
            ..Default::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// 受信時の検証
    ///
    /// confidence と各確率は 0..=1、prediction か error のどちらかが必要。
    pub fn validate(self) -> Result<Self> {
        if self.prediction.is_none() && self.error.is_none() {
            return Err(Error::Schema(
                "response has neither prediction nor error".into(),
            ));
        }
        if let Some(c) = self.confidence {
            if !(0.0..=1.0).contains(&c) {
                return Err(Error::Schema(format!("confidence out of range: {}", c)));
            }
        }
        if let Some(probs) = &self.probabilities {
            if let Some((label, p)) = probs.iter().find(|(_, p)| !(0.0..=1.0).contains(*p)) {
                return Err(Error::Schema(format!(
                    "probability for {} out of range: {}",
                    label, p
                )));
            }
        }
        Ok(self)
    }

    /// 予測ラベル（なければ "—"）
    pub fn prediction_label(&self) -> String {
        self.prediction
            .clone()
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    /// 信頼度のパーセント表記（例: "95.00%"、なければ "—"）
    pub fn confidence_label(&self) -> String {
        format_confidence(self.confidence)
    }
}

/// 信頼度を "xx.xx%" に整形
pub fn format_confidence(confidence: Option<f64>) -> String {
    match confidence {
        Some(c) if c > 0.0 => format!("{:.2}%", c * 100.0),
        _ => PLACEHOLDER.to_string(),
    }
}

/// 行ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Waiting,
    Done,
    Failed,
}

impl RowStatus {
    pub fn of(result: Option<&PredictionResult>) -> Self {
        match result {
            None => RowStatus::Waiting,
            Some(r) if r.is_failed() => RowStatus::Failed,
            Some(_) => RowStatus::Done,
        }
    }

    /// CSV用
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Waiting => "Waiting",
            RowStatus::Done => "Done",
            RowStatus::Failed => "Failed",
        }
    }

    /// 画面表示用
    pub fn badge(&self) -> &'static str {
        match self {
            RowStatus::Waiting => "⏳ Waiting",
            RowStatus::Done => "✅ Done",
            RowStatus::Failed => "❌ Failed",
        }
    }
}

/// `/health` のレスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_loaded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<f64>,
}

impl HealthStatus {
    pub fn model_indicator(&self) -> ModelIndicator {
        if self.model_loaded == Some(true) {
            ModelIndicator::Loaded
        } else {
            ModelIndicator::Missing
        }
    }

    /// "CPU: 12% | Memory: 40%"（cpu未報告ならNone）
    pub fn resource_line(&self) -> Option<String> {
        let cpu = self.cpu?;
        let memory = self
            .memory
            .map(|m| m.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        Some(format!("CPU: {}% | Memory: {}%", cpu, memory))
    }
}

/// モデル読込状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelIndicator {
    Loaded,
    Missing,
}

impl ModelIndicator {
    pub fn label(&self) -> &'static str {
        match self {
            ModelIndicator::Loaded => "Model Loaded",
            ModelIndicator::Missing => "Model Missing",
        }
    }
}

/// バックエンド接続状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Checking,
    Connected,
    /// 応答はあるが2xx以外
    Unreachable,
    /// 通信自体が失敗
    Offline,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Checking => "Checking...",
            ConnectionStatus::Connected => "🟢 Connected",
            ConnectionStatus::Unreachable => "🔴 Unreachable",
            ConnectionStatus::Offline => "🔴 Offline",
        }
    }
}

/// `/crop_reflection` のレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropResponse {
    pub cropped_image: String,
}

/// `/predict_polyphenol_region` のリクエスト1行
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolyphenolSample {
    #[serde(rename = "Absorbance")]
    pub absorbance: f64,
    #[serde(rename = "Concentration")]
    pub concentration: f64,
}

/// `/predict_polyphenol_region` のリクエスト本体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolyphenolRequest {
    pub data: Vec<PolyphenolSample>,
}

/// 位置対応のレスポンスを検証
pub fn align_polyphenol_results(
    expected: usize,
    results: Vec<PredictionResult>,
) -> Result<Vec<PredictionResult>> {
    if results.len() != expected {
        return Err(Error::Schema(format!(
            "expected {} results, got {}",
            expected,
            results.len()
        )));
    }
    // 行単位のレスポンスは prediction も error も無いことがある
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_result_deserialize_full() {
        let json = r#"{
            "prediction": "Central",
            "confidence": 0.93,
            "probabilities": {"Central": 0.93, "Southern": 0.05, "Sabaragamuwa": 0.02},
            "info": {"description": "Balanced", "origin": "Central highlands", "flavorNotes": ["Floral"]},
            "croppedImage": "data:image/png;base64,AAAA"
        }"#;
        let result: PredictionResult = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(result.prediction.as_deref(), Some("Central"));
        assert_eq!(result.probabilities.as_ref().map(|p| p.len()), Some(3));
        assert_eq!(result.info.as_ref().map(|i| i.flavor_notes.len()), Some(1));
        assert!(result.cropped_image.is_some());
        assert!(result.validate().is_ok());
    }

    #[test]
    fn test_prediction_result_failed_serializes_error_only() {
        let json = serde_json::to_string(&PredictionResult::failed()).unwrap();
        assert_eq!(json, r#"{"error":"Prediction failed"}"#);
    }

    #[test]
    fn test_validate_rejects_empty_body() {
        let err = PredictionResult::default().validate().unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_validate_rejects_out_of_range_confidence() {
        let result = PredictionResult {
            prediction: Some("Central".into()),
            confidence: Some(93.0),
            ..Default::default()
        };
        assert!(result.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_probability() {
        let mut probs = BTreeMap::new();
        probs.insert("Central".to_string(), 1.5);
        let result = PredictionResult {
            prediction: Some("Central".into()),
            probabilities: Some(probs),
            ..Default::default()
        };
        assert!(result.validate().is_err());
    }

    #[test]
    fn test_confidence_label() {
        assert_eq!(format_confidence(Some(0.9512)), "95.12%");
        assert_eq!(format_confidence(None), "—");
        // 0は元の画面と同じく欠損扱い
        assert_eq!(format_confidence(Some(0.0)), "—");
    }

    #[test]
    fn test_row_status() {
        assert_eq!(RowStatus::of(None), RowStatus::Waiting);
        assert_eq!(RowStatus::of(Some(&PredictionResult::failed())), RowStatus::Failed);
        let ok = PredictionResult {
            prediction: Some("Southern".into()),
            ..Default::default()
        };
        assert_eq!(RowStatus::of(Some(&ok)), RowStatus::Done);
        assert_eq!(RowStatus::Failed.badge(), "❌ Failed");
    }

    #[test]
    fn test_health_model_missing() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"status": "ok", "model_loaded": false}"#).unwrap();
        assert_eq!(health.model_indicator(), ModelIndicator::Missing);
        assert_eq!(health.model_indicator().label(), "Model Missing");
        assert!(health.resource_line().is_none());
    }

    #[test]
    fn test_health_resource_line() {
        let health: HealthStatus = serde_json::from_str(
            r#"{"status": "ok", "model_loaded": true, "cpu": 12.5, "memory": 40}"#,
        )
        .unwrap();
        assert_eq!(health.model_indicator(), ModelIndicator::Loaded);
        assert_eq!(health.resource_line().as_deref(), Some("CPU: 12.5% | Memory: 40%"));
    }

    #[test]
    fn test_polyphenol_request_field_names() {
        let request = PolyphenolRequest {
            data: vec![PolyphenolSample { absorbance: 0.53, concentration: 12.4 }],
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"data":[{"Absorbance":0.53,"Concentration":12.4}]}"#);
    }

    #[test]
    fn test_align_polyphenol_results_length_mismatch() {
        let err = align_polyphenol_results(2, vec![PredictionResult::failed()]).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_image_type_parse() {
        assert_eq!("raw".parse::<ImageType>().unwrap(), ImageType::Raw);
        assert_eq!("Preprocessed".parse::<ImageType>().unwrap(), ImageType::Preprocessed);
        assert!("jpeg".parse::<ImageType>().is_err());
    }
}
