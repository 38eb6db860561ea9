//! メインアプリケーションコンポーネント
//!
//! 画面遷移はすべて `navigate` を通り、共通のルートガードで判定する。

use crate::api::DEFAULT_BACKEND;
use crate::components::{
    auth::{LoginPage, RegisterPage},
    comparison::ComparisonPage,
    crop::CropPage,
    header::Header,
    home::HomePage,
    polyphenol::PolyphenolPage,
    predict::PredictPage,
    results::ResultsPage,
    settings_panel::SettingsPage,
    super_dashboard::SuperDashboard,
};
use crate::storage::sessions;
use gloo::events::EventListener;
use leptos::prelude::*;
use teavision_common::{guard, resolve, PredictionResult, Route, Session};
use wasm_bindgen::JsValue;

/// 画面全体で共有する状態
#[derive(Clone, Copy)]
pub struct AppContext {
    pub session: RwSignal<Session>,
    pub route: RwSignal<Route>,
    /// 単一予測の直近の結果（結果画面で表示）
    pub last_result: RwSignal<Option<PredictionResult>>,
}

impl AppContext {
    pub fn current() -> Self {
        expect_context::<AppContext>()
    }

    /// ストアから読み直す（ログイン・ログアウト後）
    pub fn refresh_session(&self) {
        self.session.set(sessions().load());
    }

    /// 現在の接続先
    pub fn endpoint(&self) -> String {
        sessions().endpoint(DEFAULT_BACKEND)
    }

    /// ガードを通して遷移し、履歴に積む
    pub fn navigate(&self, route: Route) {
        let target = guard(route, &self.session.get_untracked()).target();
        if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(target.path()));
        }
        self.route.set(target);
    }
}

fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let session = RwSignal::new(sessions().load());
    let initial = Route::from_path(&current_path()).unwrap_or(Route::Home);
    let route = RwSignal::new(initial);
    let ctx = AppContext {
        session,
        route,
        last_result: RwSignal::new(None),
    };
    provide_context(ctx);

    // 初回表示もガードを通す（URLを書き換える）
    ctx.navigate(initial);

    // 戻る・進む
    if let Some(window) = web_sys::window() {
        EventListener::new(&window, "popstate", move |_| {
            route.set(resolve(&current_path(), &session.get_untracked()).target());
        })
        .forget();
    }

    // ガード判定後の画面
    let page = move || {
        let current = guard(route.get(), &session.get()).target();
        match current {
            Route::Home => view! { <HomePage /> }.into_any(),
            Route::Login => view! { <LoginPage /> }.into_any(),
            Route::Register => view! { <RegisterPage /> }.into_any(),
            Route::Dashboard => view! { <PredictPage multi=false /> }.into_any(),
            Route::Results => view! { <ResultsPage /> }.into_any(),
            Route::Multi => view! { <PredictPage multi=true /> }.into_any(),
            Route::Crop => view! { <CropPage /> }.into_any(),
            Route::Comparison => view! { <ComparisonPage /> }.into_any(),
            Route::Polyphenol => view! { <PolyphenolPage /> }.into_any(),
            Route::Settings => view! { <SettingsPage /> }.into_any(),
            Route::Super => view! { <SuperDashboard /> }.into_any(),
        }
    };

    view! {
        <div class="container">
            <Header />
            <main>{page}</main>
        </div>
    }
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use teavision_common::{Role, User};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn context(session: Session) -> AppContext {
        AppContext {
            session: RwSignal::new(session),
            route: RwSignal::new(Route::Home),
            last_result: RwSignal::new(None),
        }
    }

    fn signed_in(role: Role) -> Session {
        Session {
            signed_in: true,
            user: Some(User {
                email: "user@example.com".into(),
                password: "secret".into(),
                role,
            }),
        }
    }

    #[wasm_bindgen_test]
    fn wasm_navigate_rewrites_protected_route_to_login() {
        let owner = Owner::new();
        owner.with(|| {
            let ctx = context(Session::default());
            ctx.navigate(Route::Super);
            assert_eq!(ctx.route.get_untracked(), Route::Login);
            assert_eq!(current_path(), "/login");
        });
    }

    #[wasm_bindgen_test]
    fn wasm_navigate_sends_non_admin_to_dashboard() {
        let owner = Owner::new();
        owner.with(|| {
            let ctx = context(signed_in(Role::User));
            ctx.navigate(Route::Settings);
            assert_eq!(ctx.route.get_untracked(), Route::Dashboard);
            assert_eq!(current_path(), "/dashboard");

            ctx.navigate(Route::Comparison);
            assert_eq!(ctx.route.get_untracked(), Route::Comparison);
        });
    }

    #[wasm_bindgen_test]
    fn wasm_admin_reaches_admin_routes() {
        let owner = Owner::new();
        owner.with(|| {
            let ctx = context(signed_in(Role::Admin));
            ctx.navigate(Route::Super);
            assert_eq!(ctx.route.get_untracked(), Route::Super);
            assert_eq!(current_path(), "/super");
        });
    }
}
