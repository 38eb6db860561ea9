//! 接続先設定（管理者）

use crate::app::AppContext;
use crate::storage::sessions;
use leptos::prelude::*;

#[component]
pub fn SettingsPage() -> impl IntoView {
    let ctx = AppContext::current();
    let (url, set_url) = signal(ctx.endpoint());
    let (status, set_status) = signal(String::new());

    let on_save = move |_| match sessions().set_backend_url(&url.get_untracked()) {
        Ok(saved) => {
            set_url.set(saved.clone());
            set_status.set(format!("✅ Saved: {}", saved));
        }
        Err(e) => gloo::dialogs::alert(&e.to_string()),
    };

    let on_reset = move |_| match sessions().clear_backend_url() {
        Ok(()) => {
            set_url.set(ctx.endpoint());
            set_status.set("Reset to default".to_string());
        }
        Err(e) => gloo::dialogs::alert(&e.to_string()),
    };

    view! {
        <div class="settings-panel">
            <h2>"API Settings"</h2>
            <div class="form-group">
                <label for="backend-url">"Backend URL"</label>
                <input
                    type="text"
                    id="backend-url"
                    placeholder="http://localhost:5000"
                    prop:value=move || url.get()
                    on:input=move |ev| set_url.set(event_target_value(&ev))
                />
            </div>
            <div class="api-actions">
                <button class="btn btn-primary btn-small" on:click=on_save>"Save"</button>
                <button class="btn btn-tertiary btn-small" on:click=on_reset>"Reset"</button>
            </div>
            <div class="api-key-status">{move || status.get()}</div>
        </div>
    }
}
