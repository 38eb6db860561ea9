//! 全モデルでの予測比較

use crate::api;
use crate::app::AppContext;
use crate::components::progress_bar::ProgressBar;
use crate::components::upload_area::UploadArea;
use futures::future::join_all;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::collections::BTreeMap;
use teavision_common::{
    comparison_table, confidence_series, run_batch, AgreementSummary, ComparisonRow, ImageBatch,
    ImageItem, ImageType, ModelVariant,
};

const COMPARISON_CSV: &str = "tea_model_comparison_predictions.csv";

/// 1枚の画像を全モデルへ同時に投げる
async fn compare_one(origin: &str, item: &ImageItem, image_type: ImageType) -> ComparisonRow {
    let results = join_all(ModelVariant::ALL.iter().map(|model| async move {
        let result = api::predict_or_failed(origin, item, Some(image_type), Some(*model)).await;
        (*model, result)
    }))
    .await;
    ComparisonRow {
        file_name: item.file_name.clone(),
        results: results.into_iter().collect::<BTreeMap<_, _>>(),
    }
}

/// 一致・不一致の割合（%）。比較できる行が無ければ None
fn agreement_percent(summary: AgreementSummary) -> Option<(f64, f64)> {
    let total = summary.total();
    (total > 0).then(|| {
        let agree = summary.agree as f64 * 100.0 / total as f64;
        (agree, 100.0 - agree)
    })
}

#[component]
pub fn ComparisonPage() -> impl IntoView {
    let ctx = AppContext::current();
    let (batch, set_batch) = signal(ImageBatch::new());
    let (rows, set_rows) = signal(Vec::<ComparisonRow>::new());
    let (image_type, set_image_type) = signal(ImageType::Raw);
    let (busy, set_busy) = signal(false);
    let (done, set_done) = signal(0usize);
    let (total, set_total) = signal(0usize);

    let on_images_added = move |items: Vec<ImageItem>| {
        set_batch.update(|b| {
            b.add(items);
        });
    };

    let on_remove = move |index: usize| {
        set_batch.update(|b| {
            b.remove(index);
        });
    };

    let on_compare = move |_| {
        let items: Vec<ImageItem> = batch.get_untracked().items().into_iter().cloned().collect();
        if items.is_empty() {
            gloo::dialogs::alert("Please upload at least one image!");
            return;
        }
        let origin = ctx.endpoint();
        let image_type = image_type.get_untracked();
        set_busy.set(true);
        set_done.set(0);
        set_total.set(items.len());

        spawn_local(async move {
            let origin = origin.as_str();
            let compared = run_batch(&items, |_, item| async move {
                let row = compare_one(origin, item, image_type).await;
                set_done.update(|d| *d += 1);
                row
            })
            .await;
            set_rows.set(compared);
            set_busy.set(false);
        });
    };

    let on_download = move |_| {
        let result = comparison_table(&rows.get_untracked())
            .to_csv()
            .map_err(|e| e.to_string())
            .and_then(|csv| api::download_text(COMPARISON_CSV, "text/csv", &csv));
        if let Err(e) = result {
            gloo::dialogs::alert(&e);
        }
    };

    let report = move || comparison_table(&rows.get());
    let agreement = move || {
        AgreementSummary::between(&rows.get(), ModelVariant::ResNet18, ModelVariant::ResNet4)
    };

    view! {
        <section class="comparison-page">
            <h2>"Model Comparison"</h2>

            <div class="form-group">
                <label for="comparison-type">"Image Type"</label>
                <select
                    id="comparison-type"
                    on:change=move |ev| {
                        if let Ok(t) = event_target_value(&ev).parse::<ImageType>() {
                            set_image_type.set(t);
                        }
                    }
                >
                    {[ImageType::Raw, ImageType::Preprocessed]
                        .into_iter()
                        .map(|t| {
                            view! {
                                <option value=t.as_str() selected=move || image_type.get() == t>
                                    {t.label()}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
            </div>

            <UploadArea multiple=true on_images_added=on_images_added />

            <ul class="file-list">
                {move || {
                    batch
                        .get()
                        .entries()
                        .iter()
                        .enumerate()
                        .map(|(index, entry)| {
                            view! {
                                <li>
                                    {entry.item.file_name.clone()}
                                    <button
                                        class="btn btn-tertiary btn-small"
                                        disabled=move || busy.get()
                                        on:click=move |_| on_remove(index)
                                    >
                                        "✕"
                                    </button>
                                </li>
                            }
                        })
                        .collect_view()
                }}
            </ul>

            <Show when=move || busy.get()>
                <ProgressBar done=done total=total />
            </Show>

            <div class="export-buttons">
                <button
                    class="btn btn-primary"
                    disabled=move || batch.get().is_empty() || busy.get()
                    on:click=on_compare
                >
                    {move || if busy.get() { "Comparing..." } else { "Compare Models" }}
                </button>
                <button
                    class="btn btn-secondary"
                    disabled=move || rows.get().is_empty() || busy.get()
                    on:click=on_download
                >
                    "Download CSV"
                </button>
                <button
                    class="btn btn-tertiary"
                    disabled=move || busy.get()
                    on:click=move |_| {
                        set_batch.update(|b| b.clear());
                        set_rows.set(Vec::new());
                    }
                >
                    "Clear"
                </button>
            </div>

            <Show when=move || !rows.get().is_empty()>
                <table class="results-table">
                    <thead>
                        <tr>{move || report().headers.into_iter().map(|h| view! { <th>{h}</th> }).collect_view()}</tr>
                    </thead>
                    <tbody>
                        {move || {
                            report()
                                .rows
                                .into_iter()
                                .map(|cells| {
                                    view! {
                                        <tr>{cells.into_iter().map(|c| view! { <td>{c}</td> }).collect_view()}</tr>
                                    }
                                })
                                .collect_view()
                        }}
                    </tbody>
                </table>

                <div class="agreement">
                    <h3>"ResNet18 vs ResNet4"</h3>
                    {move || match agreement_percent(agreement()) {
                        Some((agree, disagree)) => {
                            let summary = agreement();
                            view! {
                                <div class="agreement-bars">
                                <div class="bar-row">
                                    <span class="bar-label">{format!("Agree ({})", summary.agree)}</span>
                                    <div class="bar">
                                        <div class="bar-fill" style=format!("width: {:.1}%", agree) />
                                    </div>
                                    <span class="bar-value">{format!("{:.1}%", agree)}</span>
                                </div>
                                <div class="bar-row">
                                    <span class="bar-label">{format!("Disagree ({})", summary.disagree)}</span>
                                    <div class="bar">
                                        <div class="bar-fill bar-fill-alt" style=format!("width: {:.1}%", disagree) />
                                    </div>
                                    <span class="bar-value">{format!("{:.1}%", disagree)}</span>
                                </div>
                                </div>
                            }
                                .into_any()
                        }
                        None => view! { <p class="text-muted">"No images with predictions from both models"</p> }
                            .into_any(),
                    }}
                </div>

                <div class="confidence-chart">
                    <h3>"Confidence by Model"</h3>
                    {move || {
                        confidence_series(&rows.get())
                            .into_iter()
                            .map(|(file_name, series)| {
                                view! {
                                    <div class="probability-chart">
                                        <h4>{file_name}</h4>
                                        {series
                                            .into_iter()
                                            .map(|(model, pct)| {
                                                view! {
                                                    <div class="bar-row">
                                                        <span class="bar-label">{model.label()}</span>
                                                        <div class="bar">
                                                            <div class="bar-fill" style=format!("width: {:.1}%", pct) />
                                                        </div>
                                                        <span class="bar-value">{format!("{:.1}%", pct)}</span>
                                                    </div>
                                                }
                                            })
                                            .collect_view()}
                                    </div>
                                }
                            })
                            .collect_view()
                    }}
                </div>
            </Show>
        </section>
    }
}
