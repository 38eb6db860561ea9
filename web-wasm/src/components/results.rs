//! 単一予測の結果画面

use crate::app::AppContext;
use crate::components::results_table::PredictionDetail;
use leptos::prelude::*;
use teavision_common::DEFAULT_AUTHENTICATED_ROUTE;

#[component]
pub fn ResultsPage() -> impl IntoView {
    let ctx = AppContext::current();

    view! {
        <section class="results-page">
            <h2>"Prediction Result"</h2>
            {move || match ctx.last_result.get() {
                Some(result) => view! { <PredictionDetail result=result /> }.into_any(),
                None => view! { <p class="text-muted">"No prediction yet. Upload an image on the dashboard."</p> }
                    .into_any(),
            }}
            <button class="btn btn-primary" on:click=move |_| ctx.navigate(DEFAULT_AUTHENTICATED_ROUTE)>
                "Back to Dashboard"
            </button>
        </section>
    }
}
