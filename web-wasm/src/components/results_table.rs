//! 予測結果テーブルと詳細カード

use leptos::prelude::*;
use teavision_common::{probability_bars, region_info, BatchEntry, ImageBatch, PredictionResult, RowStatus};

#[component]
pub fn ResultsTable<FR>(batch: ReadSignal<ImageBatch>, on_remove: FR) -> impl IntoView
where
    FR: Fn(usize) + 'static + Clone + Send + Sync,
{
    view! {
        <table class="results-table">
            <thead>
                <tr>
                    <th>"Preview"</th>
                    <th>"Image Name"</th>
                    <th>"Prediction"</th>
                    <th>"Confidence"</th>
                    <th>"Status"</th>
                    <th></th>
                </tr>
            </thead>
            <tbody>
                {move || {
                    batch
                        .get()
                        .entries()
                        .iter()
                        .cloned()
                        .enumerate()
                        .map(|(index, entry)| {
                            let on_remove = on_remove.clone();
                            view! { <ResultRow index=index entry=entry on_remove=on_remove /> }
                        })
                        .collect_view()
                }}
            </tbody>
        </table>
    }
}

#[component]
fn ResultRow<FR>(index: usize, entry: BatchEntry, on_remove: FR) -> impl IntoView
where
    FR: Fn(usize) + 'static + Clone + Send + Sync,
{
    let status = entry.status();
    let (prediction, confidence) = match &entry.result {
        Some(r) => (r.prediction_label(), r.confidence_label()),
        None => ("—".to_string(), "—".to_string()),
    };
    let row_class = match status {
        RowStatus::Done => "row-done",
        RowStatus::Failed => "row-failed",
        RowStatus::Waiting => "row-waiting",
    };

    view! {
        <tr class=row_class>
            <td>
                {entry.item.preview.clone().map(|src| view! { <img class="thumb" src=src /> })}
            </td>
            <td>{entry.item.file_name.clone()}</td>
            <td>{prediction}</td>
            <td>{confidence}</td>
            <td>{status.badge()}</td>
            <td>
                <button class="btn btn-tertiary btn-small" on:click=move |_| on_remove(index)>"✕"</button>
            </td>
        </tr>
    }
}

/// 1件の予測の詳細（確率バーと地域情報）
#[component]
pub fn PredictionDetail(result: PredictionResult) -> impl IntoView {
    let bars = result
        .probabilities
        .as_ref()
        .map(probability_bars)
        .unwrap_or_default();
    let info = result
        .info
        .clone()
        .or_else(|| result.prediction.as_deref().and_then(region_info));

    view! {
        <div class="prediction-detail">
            <h3>{result.prediction_label()}</h3>
            <p class="text-muted">{format!("Confidence: {}", result.confidence_label())}</p>
            <div class="probability-chart">
                {bars
                    .into_iter()
                    .map(|bar| {
                        view! {
                            <div class="bar-row">
                                <span class="bar-label">{bar.label.clone()}</span>
                                <div class="bar">
                                    <div class="bar-fill" style=format!("width: {:.1}%", bar.percent) />
                                </div>
                                <span class="bar-value">{format!("{:.1}%", bar.percent)}</span>
                            </div>
                        }
                    })
                    .collect_view()}
            </div>
            {info.map(|info| {
                view! {
                    <div class="region-info">
                        <p>{info.description}</p>
                        <p class="text-muted">{info.origin}</p>
                        <ul>
                            {info
                                .flavor_notes
                                .into_iter()
                                .map(|note| view! { <li>{note}</li> })
                                .collect_view()}
                        </ul>
                    </div>
                }
            })}
        </div>
    }
}
