//! 管理者向け: バックエンド状態の監視

use crate::api;
use crate::app::AppContext;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::time::Duration;
use teavision_common::{ConnectionStatus, HealthStatus};

const POLL_INTERVAL: Duration = Duration::from_secs(10);

#[component]
pub fn SuperDashboard() -> impl IntoView {
    let ctx = AppContext::current();
    let (status, set_status) = signal(ConnectionStatus::Checking);
    let (health, set_health) = signal(None::<HealthStatus>);

    let poll = move || {
        let origin = ctx.endpoint();
        spawn_local(async move {
            let (connection, body) = api::check_connection(&origin).await;
            set_status.set(connection);
            set_health.set(body);
        });
    };

    poll();
    match set_interval_with_handle(poll, POLL_INTERVAL) {
        Ok(handle) => on_cleanup(move || handle.clear()),
        Err(_) => gloo::console::error!("failed to start health polling"),
    }

    view! {
        <section class="super-dashboard">
            <h2>"Super Dashboard"</h2>
            <p class="text-muted">{move || ctx.endpoint()}</p>
            <div class="status-card">
                <span class="status">{move || status.get().label()}</span>
                {move || {
                    // 接続できないときはモデル状態を出さない
                    health
                        .get()
                        .filter(|_| status.get() == ConnectionStatus::Connected)
                        .map(|h| {
                            view! {
                                <div>
                                    <p>{h.model_indicator().label()}</p>
                                    {h.message.clone().map(|m| view! { <p class="text-muted">{m}</p> })}
                                    {h.resource_line().map(|line| view! { <p>{line}</p> })}
                                </div>
                            }
                        })
                }}
            </div>
        </section>
    }
}
