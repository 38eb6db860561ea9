//! ルートガード
//!
//! 保護されたビューへの遷移を許可・リダイレクトする単一の判定関数。
//! CLIのサブコマンドとWeb版の画面遷移の両方がここを通る。

use crate::session::Session;

/// アプリケーションの画面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    Dashboard,
    Results,
    Multi,
    Crop,
    Comparison,
    Polyphenol,
    Settings,
    Super,
}

/// ログイン済みユーザーの既定画面
pub const DEFAULT_AUTHENTICATED_ROUTE: Route = Route::Dashboard;

impl Route {
    pub const ALL: [Route; 11] = [
        Route::Home,
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::Results,
        Route::Multi,
        Route::Crop,
        Route::Comparison,
        Route::Polyphenol,
        Route::Settings,
        Route::Super,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Results => "/results",
            Route::Multi => "/multi",
            Route::Crop => "/crop",
            Route::Comparison => "/comparison",
            Route::Polyphenol => "/polyphenol",
            Route::Settings => "/settings",
            Route::Super => "/super",
        }
    }

    /// パスから画面を引く（末尾スラッシュ・クエリは無視）
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        Route::ALL.iter().copied().find(|r| r.path() == normalized)
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Home | Route::Login | Route::Register)
    }

    pub fn is_admin_only(&self) -> bool {
        matches!(self, Route::Super | Route::Settings)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Login => "Login",
            Route::Register => "Register",
            Route::Dashboard => "Single Predict",
            Route::Results => "Results",
            Route::Multi => "Multi Predict",
            Route::Crop => "Crop & Predict Tool",
            Route::Comparison => "Model Comparison",
            Route::Polyphenol => "Polyphenol Based Predict",
            Route::Settings => "API Settings",
            Route::Super => "Super Dashboard",
        }
    }
}

/// ガードの判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render(Route),
    RedirectToLogin,
    RedirectToDefault(Route),
}

impl GuardDecision {
    /// 実際に表示する画面
    pub fn target(&self) -> Route {
        match self {
            GuardDecision::Render(route) => *route,
            GuardDecision::RedirectToLogin => Route::Login,
            GuardDecision::RedirectToDefault(route) => *route,
        }
    }

    pub fn is_render(&self) -> bool {
        matches!(self, GuardDecision::Render(_))
    }
}

/// 遷移判定
///
/// - 未ログイン: 保護画面はすべてログインへ
/// - 管理者専用画面: role が admin 以外は既定画面へ
/// - 管理者は他の保護画面へも通常どおり遷移できる
pub fn guard(route: Route, session: &Session) -> GuardDecision {
    if !route.is_protected() {
        return GuardDecision::Render(route);
    }
    if !session.signed_in {
        return GuardDecision::RedirectToLogin;
    }
    if route.is_admin_only() && !session.is_admin() {
        return GuardDecision::RedirectToDefault(DEFAULT_AUTHENTICATED_ROUTE);
    }
    GuardDecision::Render(route)
}

/// パス文字列で判定（未知のパスはHome）
pub fn resolve(path: &str, session: &Session) -> GuardDecision {
    guard(Route::from_path(path).unwrap_or(Route::Home), session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Role, User};

    fn signed_in(role: Role) -> Session {
        Session {
            signed_in: true,
            user: Some(User {
                email: "a@x.com".into(),
                password: "p".into(),
                role,
            }),
        }
    }

    #[test]
    fn test_unauthenticated_never_renders_protected() {
        let anonymous = Session::default();
        // 過去に登録だけしたユーザーも同じ
        let registered = Session {
            signed_in: false,
            user: signed_in(Role::Admin).user,
        };
        for session in [anonymous, registered] {
            for route in Route::ALL.iter().filter(|r| r.is_protected()) {
                assert_eq!(guard(*route, &session), GuardDecision::RedirectToLogin, "{:?}", route);
            }
        }
    }

    #[test]
    fn test_public_routes_always_render() {
        let session = Session::default();
        for route in [Route::Home, Route::Login, Route::Register] {
            assert_eq!(guard(route, &session), GuardDecision::Render(route));
        }
    }

    #[test]
    fn test_admin_only_redirects_regular_user() {
        let session = signed_in(Role::User);
        assert_eq!(
            guard(Route::Super, &session),
            GuardDecision::RedirectToDefault(Route::Dashboard)
        );
        assert_eq!(guard(Route::Settings, &session).target(), Route::Dashboard);
        assert_eq!(guard(Route::Multi, &session), GuardDecision::Render(Route::Multi));
    }

    #[test]
    fn test_admin_is_not_force_redirected() {
        let session = signed_in(Role::Admin);
        for route in Route::ALL {
            assert_eq!(guard(route, &session), GuardDecision::Render(route));
        }
    }

    #[test]
    fn test_resolve_paths() {
        let session = signed_in(Role::User);
        assert_eq!(resolve("/multi/", &session), GuardDecision::Render(Route::Multi));
        assert_eq!(resolve("/polyphenol?x=1", &session), GuardDecision::Render(Route::Polyphenol));
        assert_eq!(resolve("/nowhere", &session), GuardDecision::Render(Route::Home));
        assert_eq!(resolve("", &session), GuardDecision::Render(Route::Home));
        assert_eq!(resolve("/super", &Session::default()).target(), Route::Login);
    }

    #[test]
    fn test_path_roundtrip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }
}
