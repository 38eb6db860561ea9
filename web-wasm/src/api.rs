//! バックエンドAPI呼び出し（gloo::net）

use gloo::net::http::{Request, Response};
use js_sys::{Array, Uint8Array};
use serde::de::DeserializeOwned;
use teavision_common::types::{align_polyphenol_results, PolyphenolRequest, PolyphenolSample};
use teavision_common::{
    ConnectionStatus, CropResponse, HealthStatus, ImageItem, ImageType, ModelVariant,
    PolyphenolRow, PredictionResult,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, FormData};

/// 設定画面で未指定のときの接続先
pub const DEFAULT_BACKEND: &str = "http://localhost:5000";

/// 画面に出すエラー文字列
pub type ApiResult<T> = Result<T, String>;

async fn parse_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    if !response.ok() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("HTTP {}: {}", response.status(), body));
    }
    response.json::<T>().await.map_err(|e| e.to_string())
}

fn bytes_to_blob(bytes: &[u8], mime: &str) -> ApiResult<Blob> {
    let parts = Array::of1(&Uint8Array::from(bytes).into());
    let bag = BlobPropertyBag::new();
    bag.set_type(mime);
    Blob::new_with_u8_array_sequence_and_options(&parts, &bag)
        .map_err(|_| "failed to build upload blob".to_string())
}

fn image_form(image: &ImageItem) -> ApiResult<FormData> {
    let form = FormData::new().map_err(|_| "FormData is not available".to_string())?;
    let blob = bytes_to_blob(&image.bytes, &image.mime)?;
    form.append_with_blob_and_filename("file", &blob, &image.file_name)
        .map_err(|_| "failed to attach file".to_string())?;
    Ok(form)
}

/// `/predict` のURL。指定のないパラメータはクエリに付けない
pub fn predict_url(origin: &str, image_type: Option<ImageType>, model: Option<ModelVariant>) -> String {
    let mut query = Vec::new();
    if let Some(t) = image_type {
        query.push(format!("type={}", t.as_str()));
    }
    if let Some(m) = model {
        query.push(format!("model={}", m.model_name()));
    }
    if query.is_empty() {
        format!("{}/predict", origin)
    } else {
        format!("{}/predict?{}", origin, query.join("&"))
    }
}

/// 単一予測で試す接続先: 設定済みの接続先 → 既定の接続先
pub fn candidate_origins(endpoint: &str) -> Vec<String> {
    let mut origins: Vec<String> = Vec::new();
    for origin in [endpoint, DEFAULT_BACKEND] {
        let origin = origin.trim().trim_end_matches('/').to_string();
        if !origin.is_empty() && !origins.contains(&origin) {
            origins.push(origin);
        }
    }
    origins
}

/// `POST /predict[?type=&model=]`
pub async fn predict(
    origin: &str,
    image: &ImageItem,
    image_type: Option<ImageType>,
    model: Option<ModelVariant>,
) -> ApiResult<PredictionResult> {
    let response = Request::post(&predict_url(origin, image_type, model))
        .body(image_form(image)?)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let result: PredictionResult = parse_json(response).await?;
    result.validate().map_err(|e| e.to_string())
}

/// 候補を順に試し、最初に応答した接続先と結果を返す
pub async fn predict_first(
    origins: &[String],
    image: &ImageItem,
    image_type: Option<ImageType>,
    model: Option<ModelVariant>,
) -> ApiResult<(String, PredictionResult)> {
    let mut last_error = String::from("no backend origins configured");
    for origin in origins {
        match predict(origin, image, image_type, model).await {
            Ok(result) => return Ok((origin.clone(), result)),
            Err(e) => {
                gloo::console::warn!(format!("{} failed, trying next: {}", origin, e));
                last_error = e;
            }
        }
    }
    Err(last_error)
}

/// 失敗を `PredictionResult::failed()` に畳む（バッチ用）
pub async fn predict_or_failed(
    origin: &str,
    image: &ImageItem,
    image_type: Option<ImageType>,
    model: Option<ModelVariant>,
) -> PredictionResult {
    match predict(origin, image, image_type, model).await {
        Ok(result) => result,
        Err(e) => {
            gloo::console::warn!(format!("prediction failed for {}: {}", image.file_name, e));
            PredictionResult::failed()
        }
    }
}

/// `POST /crop_reflection` → 切り出し画像の data URL
pub async fn crop_reflection(origin: &str, image: &ImageItem) -> ApiResult<String> {
    let response = Request::post(&format!("{}/crop_reflection", origin))
        .body(image_form(image)?)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let body: CropResponse = parse_json(response).await?;
    Ok(body.cropped_image)
}

/// data URL のMIMEタイプ（base64 でなければ None）
pub fn data_url_mime(data_url: &str) -> Option<&str> {
    let (header, _) = data_url.split_once(',')?;
    let header = header.strip_prefix("data:")?.strip_suffix(";base64")?;
    Some(header.split(';').next().filter(|m| !m.is_empty()).unwrap_or("image/png"))
}

/// 切り出し画像を予測用の `ImageItem` に戻す（元のファイル名を引き継ぐ）
pub async fn image_from_data_url(file_name: &str, data_url: &str) -> ApiResult<ImageItem> {
    let invalid = || format!("invalid cropped image for {}", file_name);
    let mime = data_url_mime(data_url).ok_or_else(invalid)?.to_string();
    let window = web_sys::window().ok_or_else(|| "window is not available".to_string())?;

    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(data_url))
        .await
        .map_err(|_| invalid())?
        .dyn_into()
        .map_err(|_| invalid())?;
    let buffer = JsFuture::from(response.array_buffer().map_err(|_| invalid())?)
        .await
        .map_err(|_| invalid())?;
    Ok(ImageItem::new(file_name, Uint8Array::new(&buffer).to_vec(), mime))
}

/// `GET /health` を接続状態に畳む
pub async fn check_connection(origin: &str) -> (ConnectionStatus, Option<HealthStatus>) {
    let response = match Request::get(&format!("{}/health", origin)).send().await {
        Ok(response) => response,
        Err(_) => return (ConnectionStatus::Offline, None),
    };
    if !response.ok() {
        return (ConnectionStatus::Unreachable, None);
    }
    match response.json::<HealthStatus>().await {
        Ok(health) => (ConnectionStatus::Connected, Some(health)),
        Err(_) => (ConnectionStatus::Connected, None),
    }
}

/// `POST /predict_polyphenol_region`（位置対応の配列）
pub async fn predict_polyphenol(
    origin: &str,
    rows: &[&PolyphenolRow],
) -> ApiResult<Vec<PredictionResult>> {
    let body = PolyphenolRequest {
        data: rows
            .iter()
            .map(|r| PolyphenolSample {
                absorbance: r.absorbance,
                concentration: r.concentration,
            })
            .collect(),
    };
    let response = Request::post(&format!("{}/predict_polyphenol_region", origin))
        .json(&body)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let results: Vec<PredictionResult> = parse_json(response).await?;
    align_polyphenol_results(rows.len(), results).map_err(|e| e.to_string())
}

/// リンクを作ってクリックし、`href` をダウンロードさせる
fn click_download(file_name: &str, href: &str) -> ApiResult<()> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| "document is not available".to_string())?;
    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")
        .map_err(|_| "failed to create link".to_string())?
        .dyn_into()
        .map_err(|_| "failed to create link".to_string())?;
    anchor.set_href(href);
    anchor.set_download(file_name);
    anchor.click();
    Ok(())
}

pub fn download_bytes(file_name: &str, mime: &str, bytes: &[u8]) -> ApiResult<()> {
    let blob = bytes_to_blob(bytes, mime)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)
        .map_err(|_| "failed to create download URL".to_string())?;
    let result = click_download(file_name, &url);
    let _ = web_sys::Url::revoke_object_url(&url);
    result
}

/// テキストをファイルとしてダウンロードさせる
pub fn download_text(file_name: &str, mime: &str, text: &str) -> ApiResult<()> {
    download_bytes(file_name, mime, text.as_bytes())
}

pub fn download_data_url(file_name: &str, data_url: &str) -> ApiResult<()> {
    click_download(file_name, data_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_url_omits_unset_params() {
        assert_eq!(predict_url("http://h:5000", None, None), "http://h:5000/predict");
        assert_eq!(
            predict_url("http://h:5000", Some(ImageType::Preprocessed), None),
            "http://h:5000/predict?type=preprocessed"
        );
        assert_eq!(
            predict_url("http://h:5000", Some(ImageType::Raw), Some(ModelVariant::ResNet18)),
            format!("http://h:5000/predict?type=raw&model={}", ModelVariant::ResNet18.model_name())
        );
    }

    #[test]
    fn test_candidate_origins_dedup_default() {
        assert_eq!(candidate_origins("http://localhost:5000/"), vec![DEFAULT_BACKEND]);
        assert_eq!(
            candidate_origins("http://10.215.59.186:5000"),
            vec!["http://10.215.59.186:5000", DEFAULT_BACKEND]
        );
    }

    #[test]
    fn test_data_url_mime() {
        assert_eq!(data_url_mime("data:image/jpeg;base64,aGVsbG8="), Some("image/jpeg"));
        assert_eq!(data_url_mime("data:;base64,aGVsbG8="), Some("image/png"));
        assert_eq!(data_url_mime("data:image/png,plain"), None);
        assert_eq!(data_url_mime("not a data url"), None);
    }
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn wasm_image_from_data_url_keeps_name_and_bytes() {
        let item = image_from_data_url("leaf.jpg", "data:image/jpeg;base64,aGVsbG8=")
            .await
            .expect("data URL decode failed");
        assert_eq!(item.file_name, "leaf.jpg");
        assert_eq!(item.mime, "image/jpeg");
        assert_eq!(item.bytes, b"hello");
    }
}
