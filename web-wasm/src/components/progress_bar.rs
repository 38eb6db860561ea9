//! プログレスバーコンポーネント

use leptos::prelude::*;

/// `done / total` の進捗
#[component]
pub fn ProgressBar(done: ReadSignal<usize>, total: ReadSignal<usize>) -> impl IntoView {
    let ratio = move || {
        let total = total.get();
        if total == 0 {
            0.0
        } else {
            done.get() as f32 / total as f32
        }
    };

    view! {
        <div class="progress-container">
            <div class="progress-bar">
                <div
                    class="progress-fill"
                    style=move || format!("width: {}%", ratio() * 100.0)
                />
            </div>
            <p class="progress-text">
                {move || format!("Predicting... {}/{}", done.get(), total.get())}
            </p>
        </div>
    }
}
