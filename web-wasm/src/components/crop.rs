//! 茶液画像の切り出しと予測
//!
//! `/crop_reflection` で切り出した画像を `type=preprocessed` で予測する。

use crate::api::{self, ApiResult};
use crate::app::AppContext;
use crate::components::upload_area::UploadArea;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::io::{Cursor, Write};
use teavision_common::batch::{merge_unique, ImageKey};
use teavision_common::types::PLACEHOLDER;
use teavision_common::{run_batch, ImageItem, ImageType, PredictionResult};
use zip::write::FileOptions;
use zip::ZipWriter;

const CROPPED_ZIP: &str = "cropped_images.zip";

/// 切り出し画面の1行
#[derive(Debug, Clone)]
struct CropRow {
    original: ImageItem,
    cropped_url: Option<String>,
    cropped: Option<ImageItem>,
    result: Option<PredictionResult>,
    error: Option<String>,
}

impl CropRow {
    fn new(original: ImageItem) -> Self {
        Self {
            original,
            cropped_url: None,
            cropped: None,
            result: None,
            error: None,
        }
    }
}

fn entry_name(file_name: &str) -> String {
    format!("cropped_{}", file_name)
}

/// 切り出し画像を `cropped_<元ファイル名>` でZIPにまとめる
fn cropped_zip(images: &[&ImageItem]) -> ApiResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();
    for image in images {
        zip.start_file(entry_name(&image.file_name), options)
            .map_err(|e| e.to_string())?;
        zip.write_all(&image.bytes).map_err(|e| e.to_string())?;
    }
    let cursor = zip.finish().map_err(|e| e.to_string())?;
    Ok(cursor.into_inner())
}

#[component]
pub fn CropPage() -> impl IntoView {
    let ctx = AppContext::current();
    let (rows, set_rows) = signal(Vec::<CropRow>::new());
    let (cropping, set_cropping) = signal(false);
    let (predicting, set_predicting) = signal(false);
    let busy = move || cropping.get() || predicting.get();

    let on_images_added = move |items: Vec<ImageItem>| {
        set_rows.update(|rows| {
            let incoming = items.into_iter().map(CropRow::new).collect();
            merge_unique(rows, incoming, |r: &CropRow| r.original.key());
        });
    };

    let on_crop_all = move |_| {
        let items: Vec<ImageItem> = rows.get_untracked().into_iter().map(|r| r.original).collect();
        if items.is_empty() {
            gloo::dialogs::alert("Please upload images first!");
            return;
        }
        let origin = ctx.endpoint();
        set_cropping.set(true);

        spawn_local(async move {
            let origin = origin.as_str();
            let outcomes = run_batch(&items, |_, item| async move {
                let data_url = api::crop_reflection(origin, item).await?;
                let cropped = api::image_from_data_url(&item.file_name, &data_url).await?;
                Ok::<_, String>((data_url, cropped))
            })
            .await;

            set_rows.update(|rows| {
                for (item, outcome) in items.iter().zip(outcomes) {
                    let key = item.key();
                    let Some(row) = rows.iter_mut().find(|r| r.original.key() == key) else {
                        continue;
                    };
                    row.result = None;
                    match outcome {
                        Ok((data_url, cropped)) => {
                            row.cropped_url = Some(data_url);
                            row.cropped = Some(cropped);
                            row.error = None;
                        }
                        Err(e) => {
                            gloo::console::warn!(format!("cropping failed for {}: {}", item.file_name, e));
                            row.cropped_url = None;
                            row.cropped = None;
                            row.error = Some("Cropping failed".to_string());
                        }
                    }
                }
            });
            set_cropping.set(false);
        });
    };

    let on_predict_all = move |_| {
        let targets: Vec<(ImageKey, ImageItem)> = rows
            .get_untracked()
            .into_iter()
            .filter_map(|r| Some((r.original.key(), r.cropped?)))
            .collect();
        if targets.is_empty() {
            gloo::dialogs::alert("No cropped images to predict!");
            return;
        }
        let origin = ctx.endpoint();
        set_predicting.set(true);

        spawn_local(async move {
            let origin = origin.as_str();
            let results = run_batch(&targets, |_, (_, cropped)| {
                api::predict_or_failed(origin, cropped, Some(ImageType::Preprocessed), None)
            })
            .await;

            set_rows.update(|rows| {
                for ((key, _), result) in targets.iter().zip(results) {
                    if let Some(row) = rows.iter_mut().find(|r| &r.original.key() == key) {
                        row.error = result.is_failed().then(|| "Prediction failed".to_string());
                        row.result = Some(result);
                    }
                }
            });
            set_predicting.set(false);
        });
    };

    let on_download_zip = move |_| {
        let rows = rows.get_untracked();
        let images: Vec<&ImageItem> = rows.iter().filter_map(|r| r.cropped.as_ref()).collect();
        if images.is_empty() {
            gloo::dialogs::alert("No cropped images available!");
            return;
        }
        let result = cropped_zip(&images)
            .and_then(|bytes| api::download_bytes(CROPPED_ZIP, "application/zip", &bytes));
        if let Err(e) = result {
            gloo::dialogs::alert(&e);
        }
    };

    view! {
        <section class="crop-page">
            <h2>"Tea Liquor Image Cropper & Predictor"</h2>
            <p class="text-muted">{move || format!("Backend: {}", ctx.endpoint())}</p>

            <UploadArea multiple=true on_images_added=on_images_added />

            <div class="export-buttons">
                <button class="btn btn-primary" disabled=busy on:click=on_crop_all>
                    {move || if cropping.get() { "Cropping..." } else { "Crop All" }}
                </button>
                <button class="btn btn-secondary" disabled=busy on:click=on_predict_all>
                    {move || if predicting.get() { "Predicting..." } else { "Predict All" }}
                </button>
                <button class="btn btn-tertiary" disabled=busy on:click=move |_| set_rows.set(Vec::new())>
                    "Clear All"
                </button>
                <Show when=move || rows.get().iter().any(|r| r.cropped.is_some())>
                    <button class="btn btn-secondary" on:click=on_download_zip>"Download All ZIP"</button>
                </Show>
            </div>

            <table class="results-table">
                <thead>
                    <tr>
                        <th>"File Name"</th>
                        <th>"Original"</th>
                        <th>"Cropped"</th>
                        <th>"Prediction"</th>
                        <th>"Confidence"</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    {move || rows.get().into_iter().map(|row| view! { <CropRowView row=row /> }).collect_view()}
                </tbody>
            </table>
        </section>
    }
}

#[component]
fn CropRowView(row: CropRow) -> impl IntoView {
    let (prediction, confidence) = match &row.result {
        Some(r) => (r.prediction_label(), r.confidence_label()),
        None => (PLACEHOLDER.to_string(), PLACEHOLDER.to_string()),
    };
    let row_class = if row.error.is_some() { "row-failed" } else { "" };
    let file_name = row.original.file_name.clone();
    let cropped_cell = match (row.cropped_url.clone(), row.error.clone()) {
        (Some(src), _) => view! { <img class="thumb" src=src /> }.into_any(),
        (None, Some(e)) => view! { <span class="text-muted">{e}</span> }.into_any(),
        (None, None) => view! { <span>{PLACEHOLDER}</span> }.into_any(),
    };
    let download = row.cropped_url.clone().map(|data_url| {
        let name = entry_name(&file_name);
        view! {
            <button
                class="btn btn-tertiary btn-small"
                on:click=move |_| {
                    if let Err(e) = api::download_data_url(&name, &data_url) {
                        gloo::dialogs::alert(&e);
                    }
                }
            >
                "Download"
            </button>
        }
    });

    view! {
        <tr class=row_class>
            <td>{file_name}</td>
            <td>{row.original.preview.clone().map(|src| view! { <img class="thumb" src=src /> })}</td>
            <td>{cropped_cell}</td>
            <td>{prediction}</td>
            <td>{confidence}</td>
            <td>{download}</td>
        </tr>
    }
}
