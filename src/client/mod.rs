//! バックエンドAPIクライアント
//!
//! エンドポイント:
//! - `GET  /health`
//! - `POST /predict?type=&model=`（multipart、フィールド名 `file`）
//! - `POST /crop_reflection`（multipart）
//! - `POST /predict_polyphenol_region`（JSON）

mod fallback;

pub use fallback::OriginFallback;

use crate::error::{Result, TeaVisionError};
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;
use teavision_common::types::{align_polyphenol_results, PolyphenolRequest, PolyphenolSample};
use teavision_common::{
    ConnectionStatus, CropResponse, HealthStatus, ImageItem, ImageType, ModelVariant,
    PolyphenolRow, PredictionResult,
};
use tracing::{debug, warn};

/// `/predict` のクエリ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PredictParams {
    pub image_type: Option<ImageType>,
    pub model: Option<ModelVariant>,
}

impl PredictParams {
    pub fn with_type(image_type: ImageType) -> Self {
        Self {
            image_type: Some(image_type),
            model: None,
        }
    }

    pub fn with_model(model: ModelVariant, image_type: ImageType) -> Self {
        Self {
            image_type: Some(image_type),
            model: Some(model),
        }
    }

    fn query(&self) -> Vec<(&'static str, &'static str)> {
        let mut query = Vec::new();
        if let Some(t) = self.image_type {
            query.push(("type", t.as_str()));
        }
        if let Some(m) = self.model {
            query.push(("model", m.model_name()));
        }
        query
    }
}

/// 1つのオリジンに対するクライアント
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: reqwest::Client,
    origin: String,
}

impl PredictionClient {
    pub fn new(origin: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            origin: origin.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self.http.get(self.url("/health")).send().await?;
        parse_json(response).await
    }

    /// ヘルスチェック結果を接続状態に畳む
    ///
    /// 2xx以外は Unreachable、通信自体の失敗は Offline。
    pub async fn check_connection(&self) -> (ConnectionStatus, Option<HealthStatus>) {
        match self.health().await {
            Ok(health) => (ConnectionStatus::Connected, Some(health)),
            Err(TeaVisionError::BackendStatus { status, .. }) => {
                debug!(status, origin = %self.origin, "health check non-2xx");
                (ConnectionStatus::Unreachable, None)
            }
            Err(TeaVisionError::ApiParse(msg)) => {
                debug!(%msg, origin = %self.origin, "health body unparseable");
                (ConnectionStatus::Connected, None)
            }
            Err(e) => {
                debug!(error = %e, origin = %self.origin, "health check failed");
                (ConnectionStatus::Offline, None)
            }
        }
    }

    pub async fn predict(&self, image: &ImageItem, params: &PredictParams) -> Result<PredictionResult> {
        debug!(file = %image.file_name, ?params, origin = %self.origin, "predict");
        let response = self
            .http
            .post(self.url("/predict"))
            .query(&params.query())
            .multipart(image_form(image)?)
            .send()
            .await?;
        let result: PredictionResult = parse_json(response).await?;
        result
            .validate()
            .map_err(|e| TeaVisionError::ApiParse(e.to_string()))
    }

    /// 失敗を `PredictionResult::failed()` に畳む（バッチ用）
    pub async fn predict_or_failed(&self, image: &ImageItem, params: &PredictParams) -> PredictionResult {
        match self.predict(image, params).await {
            Ok(result) => result,
            Err(e) => {
                warn!(file = %image.file_name, error = %e, "prediction failed");
                PredictionResult::failed()
            }
        }
    }

    /// 反射部分の切り出し。`data:` URLを返す
    pub async fn crop_reflection(&self, image: &ImageItem) -> Result<String> {
        debug!(file = %image.file_name, "crop_reflection");
        let response = self
            .http
            .post(self.url("/crop_reflection"))
            .multipart(image_form(image)?)
            .send()
            .await?;
        let crop: CropResponse = parse_json(response).await?;
        Ok(crop.cropped_image)
    }

    /// 吸光度・濃度から産地を一括予測（入力と同じ順序・件数）
    pub async fn predict_polyphenol(&self, rows: &[&PolyphenolRow]) -> Result<Vec<PredictionResult>> {
        let request = PolyphenolRequest {
            data: rows
                .iter()
                .map(|r| PolyphenolSample {
                    absorbance: r.absorbance,
                    concentration: r.concentration,
                })
                .collect(),
        };
        let response = self
            .http
            .post(self.url("/predict_polyphenol_region"))
            .json(&request)
            .send()
            .await?;
        let results: Vec<PredictionResult> = parse_json(response).await?;
        Ok(align_polyphenol_results(rows.len(), results)?)
    }
}

fn image_form(image: &ImageItem) -> Result<Form> {
    let part = Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.mime)?;
    Ok(Form::new().part("file", part))
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(TeaVisionError::BackendStatus {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|e| TeaVisionError::ApiParse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_omits_unset_params() {
        assert!(PredictParams::default().query().is_empty());
        let params = PredictParams::with_model(ModelVariant::SqueezeNet, ImageType::Raw);
        assert_eq!(
            params.query(),
            vec![("type", "raw"), ("model", "squeezenet_tea_region")]
        );
    }

    #[test]
    fn test_origin_trailing_slash_trimmed() {
        let client = PredictionClient::new("http://localhost:5000/", None).unwrap();
        assert_eq!(client.url("/health"), "http://localhost:5000/health");
    }
}
