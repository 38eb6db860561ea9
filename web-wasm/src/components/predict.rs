//! 画像予測画面（単一・複数）

use crate::api;
use crate::app::AppContext;
use crate::components::progress_bar::ProgressBar;
use crate::components::results_table::ResultsTable;
use crate::components::upload_area::UploadArea;
use leptos::prelude::*;
use leptos::task::spawn_local;
use teavision_common::{
    prediction_table, run_batch, ImageBatch, ImageItem, ImageType, ModelVariant, PredictionResult,
    Route,
};

const PREDICTIONS_CSV: &str = "tea_region_predictions.csv";

#[component]
pub fn PredictPage(multi: bool) -> impl IntoView {
    let ctx = AppContext::current();
    let (batch, set_batch) = signal(ImageBatch::new());
    // 単一予測は既定で種別を送らない
    let (image_type, set_image_type) = signal(multi.then_some(ImageType::Raw));
    let (model, set_model) = signal(None::<ModelVariant>);
    let (busy, set_busy) = signal(false);
    let (done, set_done) = signal(0usize);
    let (total, set_total) = signal(0usize);

    let on_images_added = move |items: Vec<ImageItem>| {
        let offered = items.len();
        set_batch.update(|b| {
            if !multi {
                b.clear();
            }
            let added = b.add(items);
            if added < offered {
                gloo::console::log!(format!("skipped {} duplicate image(s)", offered - added));
            }
        });
    };

    let on_remove = move |index: usize| {
        set_batch.update(|b| {
            b.remove(index);
        });
    };

    let on_predict = move |_| {
        let snapshot = batch.get_untracked();
        if snapshot.is_empty() {
            gloo::dialogs::alert("Please upload at least one image!");
            return;
        }
        let origin = ctx.endpoint();
        let (image_type, model) = (image_type.get_untracked(), model.get_untracked());
        let items: Vec<ImageItem> = snapshot.items().into_iter().cloned().collect();
        set_busy.set(true);
        set_done.set(0);
        set_total.set(items.len());

        spawn_local(async move {
            let results = if multi {
                let origin = origin.as_str();
                run_batch(&items, |_, item| async move {
                    let result = api::predict_or_failed(origin, item, image_type, model).await;
                    set_done.update(|d| *d += 1);
                    result
                })
                .await
            } else {
                // 単一予測は候補の接続先を順に試す
                let origins = api::candidate_origins(&origin);
                let mut results = Vec::with_capacity(items.len());
                for item in &items {
                    let result = match api::predict_first(&origins, item, image_type, model).await {
                        Ok((used, result)) => {
                            gloo::console::log!(format!("predicted via {}", used));
                            result
                        }
                        Err(e) => {
                            gloo::dialogs::alert(&format!("Prediction failed: {}", e));
                            PredictionResult::failed()
                        }
                    };
                    set_done.update(|d| *d += 1);
                    results.push(result);
                }
                results
            };

            // 実行中に行が削除されていてもキーで書き戻す
            set_batch.update(|b| {
                for (item, result) in items.iter().zip(&results) {
                    let key = item.key();
                    if let Some(index) = b.entries().iter().position(|e| e.item.key() == key) {
                        let _ = b.set_result(index, result.clone());
                    }
                }
            });
            set_busy.set(false);

            if !multi {
                if let Some(result) = results.into_iter().next().filter(|r| !r.is_failed()) {
                    ctx.last_result.set(Some(result));
                    ctx.navigate(Route::Results);
                }
            }
        });
    };

    let on_download = move |_| {
        let table = prediction_table(&batch.get_untracked());
        let result = table
            .to_csv()
            .map_err(|e| e.to_string())
            .and_then(|csv| api::download_text(PREDICTIONS_CSV, "text/csv", &csv));
        if let Err(e) = result {
            gloo::dialogs::alert(&e);
        }
    };

    let has_results = move || batch.get().entries().iter().any(|e| e.result.is_some());

    view! {
        <section class="predict-page">
            <h2>{if multi { "Multi Predict" } else { "Single Predict" }}</h2>

            <div class="settings-grid">
                <div class="form-group">
                    <label for="image-type">"Image Type"</label>
                    <select
                        id="image-type"
                        on:change=move |ev| set_image_type.set(event_target_value(&ev).parse::<ImageType>().ok())
                    >
                        <option value="" selected=move || image_type.get().is_none()>"Default"</option>
                        {[ImageType::Raw, ImageType::Preprocessed]
                            .into_iter()
                            .map(|t| {
                                view! {
                                    <option value=t.as_str() selected=move || image_type.get() == Some(t)>
                                        {t.label()}
                                    </option>
                                }
                            })
                            .collect_view()}
                    </select>
                </div>
                <div class="form-group">
                    <label for="model">"Model"</label>
                    <select
                        id="model"
                        on:change=move |ev| set_model.set(event_target_value(&ev).parse::<ModelVariant>().ok())
                    >
                        <option value="">"Default"</option>
                        {ModelVariant::ALL
                            .iter()
                            .map(|m| view! { <option value=m.model_name()>{m.label()}</option> })
                            .collect_view()}
                    </select>
                </div>
            </div>

            <UploadArea multiple=multi on_images_added=on_images_added />

            <Show when=move || !batch.get().is_empty()>
                <ResultsTable batch=batch on_remove=on_remove />
            </Show>

            <Show when=move || busy.get()>
                <ProgressBar done=done total=total />
            </Show>

            <div class="export-buttons">
                <button
                    class="btn btn-primary"
                    disabled=move || batch.get().is_empty() || busy.get()
                    on:click=on_predict
                >
                    {move || if busy.get() { "Predicting..." } else { "Predict" }}
                </button>
                <button class="btn btn-secondary" disabled=move || !has_results() on:click=on_download>
                    "Download CSV"
                </button>
                <button
                    class="btn btn-tertiary"
                    disabled=move || busy.get()
                    on:click=move |_| set_batch.update(|b| b.clear())
                >
                    "Clear"
                </button>
            </div>
        </section>
    }
}
