//! ポリフェノール値による地域予測

use crate::api;
use crate::app::AppContext;
use leptos::prelude::*;
use leptos::task::spawn_local;
use teavision_common::region::{GRADES, POLYPHENOL_REGIONS};
use teavision_common::{parse_polyphenol_csv, polyphenol_table, PolyphenolTable};
use web_sys::HtmlInputElement;

const POLYPHENOL_CSV: &str = "polyphenol_predictions.csv";

#[component]
pub fn PolyphenolPage() -> impl IntoView {
    let ctx = AppContext::current();
    let (table, set_table) = signal(PolyphenolTable::new());
    let (busy, set_busy) = signal(false);

    let (region, set_region) = signal(String::new());
    let (grade, set_grade) = signal(String::new());
    let (absorbance, set_absorbance) = signal(String::new());
    let (concentration, set_concentration) = signal(String::new());

    let on_csv = move |ev: leptos::ev::Event| {
        let input = event_target::<HtmlInputElement>(&ev);
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        input.set_value("");
        spawn_local(async move {
            let file = gloo::file::File::from(file);
            let parsed = gloo::file::futures::read_as_text(&file)
                .await
                .map_err(|e| e.to_string())
                .and_then(|text| parse_polyphenol_csv(&text).map_err(|e| e.to_string()));
            match parsed {
                Ok(rows) => set_table.update(|t| t.replace(rows)),
                Err(e) => gloo::dialogs::alert(&e),
            }
        });
    };

    let on_add = move |_| {
        let values = (
            absorbance.get_untracked().trim().parse::<f64>(),
            concentration.get_untracked().trim().parse::<f64>(),
        );
        let (Ok(a), Ok(c)) = values else {
            gloo::dialogs::alert("Absorbance and Concentration must be numbers");
            return;
        };
        let mut result = Ok(());
        set_table.update(|t| {
            result = t.push_manual(Some(region.get_untracked()), Some(grade.get_untracked()), a, c);
        });
        match result {
            Ok(()) => {
                set_absorbance.set(String::new());
                set_concentration.set(String::new());
            }
            Err(e) => gloo::dialogs::alert(&e.to_string()),
        }
    };

    let on_predict = move |_| {
        let snapshot = table.get_untracked();
        if snapshot.is_empty() {
            gloo::dialogs::alert("Please add at least one row!");
            return;
        }
        let origin = ctx.endpoint();
        let ids = snapshot.ids();
        set_busy.set(true);
        spawn_local(async move {
            let response = api::predict_polyphenol(&origin, &snapshot.rows()).await;
            set_table.update(|t| {
                // 送信した行にだけ反映する。一括リクエストの失敗・件数不一致は送信行すべて失敗
                match response.and_then(|results| {
                    t.apply_results_to(&ids, results).map_err(|e| e.to_string())
                }) {
                    Ok(applied) if applied < ids.len() => gloo::console::log!(format!(
                        "{} polyphenol result(s) dropped for rows changed in flight",
                        ids.len() - applied
                    )),
                    Ok(_) => {}
                    Err(e) => {
                        gloo::console::warn!(format!("polyphenol prediction failed: {}", e));
                        t.mark_failed(&ids);
                    }
                }
            });
            set_busy.set(false);
        });
    };

    let on_download = move |_| {
        let report = polyphenol_table(&table.get_untracked());
        let result = report
            .to_csv()
            .map_err(|e| e.to_string())
            .and_then(|csv| api::download_text(POLYPHENOL_CSV, "text/csv", &csv));
        if let Err(e) = result {
            gloo::dialogs::alert(&e);
        }
    };

    let report = move || polyphenol_table(&table.get());

    view! {
        <section class="polyphenol-page">
            <h2>"Polyphenol Based Predict"</h2>

            <div class="form-group">
                <label for="polyphenol-csv">"Upload CSV (Region, Grade, Absorbance, Concentration)"</label>
                <input
                    type="file"
                    id="polyphenol-csv"
                    accept=".csv,text/csv"
                    disabled=move || busy.get()
                    on:change=on_csv
                />
            </div>

            <div class="settings-grid">
                <select on:change=move |ev| set_region.set(event_target_value(&ev))>
                    <option value="">"Region"</option>
                    {POLYPHENOL_REGIONS.iter().map(|r| view! { <option value=*r>{*r}</option> }).collect_view()}
                </select>
                <select on:change=move |ev| set_grade.set(event_target_value(&ev))>
                    <option value="">"Grade"</option>
                    {GRADES.iter().map(|g| view! { <option value=*g>{*g}</option> }).collect_view()}
                </select>
                <input
                    type="number"
                    step="any"
                    placeholder="Absorbance"
                    prop:value=move || absorbance.get()
                    on:input=move |ev| set_absorbance.set(event_target_value(&ev))
                />
                <input
                    type="number"
                    step="any"
                    placeholder="Concentration"
                    prop:value=move || concentration.get()
                    on:input=move |ev| set_concentration.set(event_target_value(&ev))
                />
                <button
                    class="btn btn-secondary btn-small"
                    disabled=move || busy.get()
                    on:click=on_add
                >
                    "Add Row"
                </button>
            </div>

            <table class="results-table">
                <thead>
                    <tr>
                        {move || report().headers.into_iter().map(|h| view! { <th>{h}</th> }).collect_view()}
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        report()
                            .rows
                            .into_iter()
                            .enumerate()
                            .map(|(index, cells)| {
                                view! {
                                    <tr>
                                        {cells.into_iter().map(|c| view! { <td>{c}</td> }).collect_view()}
                                        <td>
                                            <button
                                                class="btn btn-tertiary btn-small"
                                                disabled=move || busy.get()
                                                on:click=move |_| set_table.update(|t| { t.remove(index); })
                                            >
                                                "✕"
                                            </button>
                                        </td>
                                    </tr>
                                }
                            })
                            .collect_view()
                    }}
                </tbody>
            </table>

            <div class="export-buttons">
                <button
                    class="btn btn-primary"
                    disabled=move || table.get().is_empty() || busy.get()
                    on:click=on_predict
                >
                    {move || if busy.get() { "Predicting..." } else { "Predict" }}
                </button>
                <button
                    class="btn btn-secondary"
                    disabled=move || !table.get().has_results()
                    on:click=on_download
                >
                    "Download CSV"
                </button>
                <button
                    class="btn btn-tertiary"
                    disabled=move || busy.get()
                    on:click=move |_| set_table.update(|t| t.clear())
                >
                    "Clear"
                </button>
            </div>
        </section>
    }
}
