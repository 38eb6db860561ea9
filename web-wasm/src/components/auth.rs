//! ログイン・登録フォーム

use crate::app::AppContext;
use crate::storage::sessions;
use leptos::prelude::*;
use teavision_common::{Route, DEFAULT_AUTHENTICATED_ROUTE};

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = AppContext::current();
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let (email, password) = (email.get_untracked(), password.get_untracked());
        if email.trim().is_empty() || password.is_empty() {
            gloo::dialogs::alert("Please fill in all fields!");
            return;
        }
        // 失敗時は遷移しない
        match sessions().login(&email, &password) {
            Ok(_) => {
                ctx.refresh_session();
                ctx.navigate(DEFAULT_AUTHENTICATED_ROUTE);
            }
            Err(e) => gloo::dialogs::alert(&e.to_string()),
        }
    };

    view! {
        <form class="auth-form" on:submit=on_submit>
            <h2>"Login"</h2>
            <input
                type="email"
                placeholder="Email"
                prop:value=move || email.get()
                on:input=move |ev| set_email.set(event_target_value(&ev))
            />
            <input
                type="password"
                placeholder="Password"
                prop:value=move || password.get()
                on:input=move |ev| set_password.set(event_target_value(&ev))
            />
            <button class="btn btn-primary" type="submit">"Login"</button>
            <p class="text-muted">
                "No account? "
                <a href="#" on:click=move |ev| {
                    ev.prevent_default();
                    ctx.navigate(Route::Register);
                }>"Register"</a>
            </p>
        </form>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let ctx = AppContext::current();
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let (email, password) = (email.get_untracked(), password.get_untracked());
        if password != confirm.get_untracked() {
            gloo::dialogs::alert("Passwords do not match!");
            return;
        }
        match sessions().register(&email, &password) {
            Ok(_) => {
                gloo::dialogs::alert("Registration successful! Please log in.");
                ctx.navigate(Route::Login);
            }
            Err(e) => gloo::dialogs::alert(&e.to_string()),
        }
    };

    view! {
        <form class="auth-form" on:submit=on_submit>
            <h2>"Register"</h2>
            <input
                type="email"
                placeholder="Email"
                prop:value=move || email.get()
                on:input=move |ev| set_email.set(event_target_value(&ev))
            />
            <input
                type="password"
                placeholder="Password"
                prop:value=move || password.get()
                on:input=move |ev| set_password.set(event_target_value(&ev))
            />
            <input
                type="password"
                placeholder="Confirm Password"
                prop:value=move || confirm.get()
                on:input=move |ev| set_confirm.set(event_target_value(&ev))
            />
            <button class="btn btn-primary" type="submit">"Register"</button>
        </form>
    }
}
