use crate::app::AppContext;
use leptos::prelude::*;
use teavision_common::Route;

#[component]
pub fn HomePage() -> impl IntoView {
    let ctx = AppContext::current();
    let start = move |_| {
        let target = if ctx.session.get_untracked().signed_in {
            Route::Dashboard
        } else {
            Route::Login
        };
        ctx.navigate(target);
    };

    view! {
        <section class="hero">
            <h2>"Identify the origin of your tea"</h2>
            <p class="text-muted">
                "Upload or capture a photo of tea leaves and TeaVision predicts the growing region."
            </p>
            <button class="btn btn-primary" on:click=start>"Get Started"</button>
        </section>
    }
}
