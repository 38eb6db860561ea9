//! ヘッダーコンポーネント（ナビゲーション・ログアウト）

use crate::app::AppContext;
use crate::storage::sessions;
use leptos::prelude::*;
use teavision_common::Route;

const NAV: [Route; 7] = [
    Route::Dashboard,
    Route::Multi,
    Route::Crop,
    Route::Comparison,
    Route::Polyphenol,
    Route::Settings,
    Route::Super,
];

#[component]
pub fn Header() -> impl IntoView {
    let ctx = AppContext::current();

    let on_logout = move |_| {
        if let Err(e) = sessions().logout() {
            gloo::dialogs::alert(&e.to_string());
            return;
        }
        ctx.refresh_session();
        ctx.navigate(Route::Login);
    };

    view! {
        <header class="header">
            <h1 on:click=move |_| ctx.navigate(Route::Home)>"🍃 TeaVision"</h1>
            <Show
                when=move || ctx.session.get().signed_in
                fallback=move || view! {
                    <nav>
                        <button class="btn btn-tertiary" on:click=move |_| ctx.navigate(Route::Login)>"Login"</button>
                        <button class="btn btn-tertiary" on:click=move |_| ctx.navigate(Route::Register)>"Register"</button>
                    </nav>
                }
            >
                <nav>
                    {NAV
                        .iter()
                        .copied()
                        .filter(move |r| !r.is_admin_only() || ctx.session.get_untracked().is_admin())
                        .map(|r| {
                            view! {
                                <button
                                    class=move || if ctx.route.get() == r { "btn btn-primary" } else { "btn btn-tertiary" }
                                    on:click=move |_| ctx.navigate(r)
                                >
                                    {r.title()}
                                </button>
                            }
                        })
                        .collect_view()}
                    <span class="user-email">
                        {move || ctx.session.get().email().unwrap_or_default().to_string()}
                    </span>
                    <button class="btn btn-secondary" on:click=on_logout>"Logout"</button>
                </nav>
            </Show>
        </header>
    }
}
