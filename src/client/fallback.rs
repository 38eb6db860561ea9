//! 複数オリジンへの順次フォールバック
//!
//! 最後に成功したオリジンを覚えておき、次回はそこから試す。

use super::{PredictParams, PredictionClient};
use crate::error::{Result, TeaVisionError};
use std::time::Duration;
use teavision_common::{ImageItem, PredictionResult};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct OriginFallback {
    origins: Vec<String>,
    active: Option<usize>,
    timeout: Option<Duration>,
}

impl OriginFallback {
    /// 重複と空文字を除いた候補を保持する
    pub fn new<I, S>(origins: I, timeout: Option<Duration>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for origin in origins {
            let origin = origin.as_ref().trim().trim_end_matches('/').to_string();
            if !origin.is_empty() && !unique.contains(&origin) {
                unique.push(origin);
            }
        }
        Self {
            origins: unique,
            active: None,
            timeout,
        }
    }

    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    pub fn active(&self) -> Option<&str> {
        self.active.and_then(|i| self.origins.get(i)).map(String::as_str)
    }

    /// 試行順: 有効なオリジン → 残りを登録順
    fn attempt_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = self.active.into_iter().collect();
        order.extend((0..self.origins.len()).filter(|i| Some(*i) != self.active));
        order
    }

    pub async fn predict(&mut self, image: &ImageItem, params: &PredictParams) -> Result<PredictionResult> {
        let mut last_error = String::from("no backend origins configured");

        for index in self.attempt_order() {
            let origin = &self.origins[index];
            let client = PredictionClient::new(origin, self.timeout)?;
            match client.predict(image, params).await {
                Ok(result) => {
                    if self.active != Some(index) {
                        info!(%origin, "backend origin selected");
                    }
                    self.active = Some(index);
                    return Ok(result);
                }
                Err(e) => {
                    warn!(%origin, error = %e, "backend origin failed, trying next");
                    last_error = e.to_string();
                }
            }
        }

        Err(TeaVisionError::AllOriginsFailed(last_error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_and_trim() {
        let fallback = OriginFallback::new(["http://a/", "http://a", " ", "http://b"], None);
        assert_eq!(fallback.origins(), &["http://a".to_string(), "http://b".to_string()]);
        assert_eq!(fallback.active(), None);
    }

    #[test]
    fn test_attempt_order_prefers_active() {
        let mut fallback = OriginFallback::new(["http://a", "http://b", "http://c"], None);
        assert_eq!(fallback.attempt_order(), vec![0, 1, 2]);
        fallback.active = Some(2);
        assert_eq!(fallback.attempt_order(), vec![2, 0, 1]);
    }
}
