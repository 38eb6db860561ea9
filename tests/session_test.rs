//! セッションとガードの統合テスト（ファイルストア経由）

use teavision::commands::Context;
use teavision::config::Config;
use teavision::error::TeaVisionError;
use teavision::storage::FileStore;
use teavision_common::{resolve, GuardDecision, Route};
use tempfile::tempdir;

fn context(dir: &std::path::Path, admin: Option<&str>) -> Context {
    let mut config = Config::default();
    config.admin_email = admin.map(str::to_string);
    Context::new(config, FileStore::open(&dir.join("storage.json")), None)
}

#[test]
fn test_register_then_wrong_password_stays_signed_out() {
    let dir = tempdir().unwrap();
    let mut ctx = context(dir.path(), None);
    ctx.sessions.register("grower@tea.lk", "leaf").unwrap();

    let err = ctx.sessions.login("grower@tea.lk", "wrong").unwrap_err();
    assert_eq!(err.to_string(), "Invalid Credentials");

    // 別プロセス相当で読み直しても未ログイン
    let reopened = context(dir.path(), None);
    assert!(!reopened.session().signed_in);
    assert!(matches!(
        reopened.authorize(Route::Dashboard),
        Err(TeaVisionError::NotSignedIn)
    ));
    assert_eq!(resolve("/dashboard", &reopened.session()), GuardDecision::RedirectToLogin);
}

#[test]
fn test_second_registration_replaces_first() {
    let dir = tempdir().unwrap();
    let mut ctx = context(dir.path(), None);
    ctx.sessions.register("first@tea.lk", "one").unwrap();
    ctx.sessions.register("second@tea.lk", "two").unwrap();
    assert!(ctx.sessions.login("first@tea.lk", "one").is_err());
    assert!(ctx.sessions.login("second@tea.lk", "two").is_ok());
}

#[test]
fn test_admin_flow_persists_role() {
    let dir = tempdir().unwrap();
    let mut ctx = context(dir.path(), Some("boss@tea.lk"));
    ctx.sessions.register("boss@tea.lk", "pw").unwrap();
    ctx.sessions.login("boss@tea.lk", "pw").unwrap();

    // 設定から管理者メールを外しても、登録時の権限が残る
    let reopened = context(dir.path(), None);
    assert!(reopened.session().is_admin());
    assert!(reopened.authorize(Route::Settings).is_ok());
    assert!(reopened.authorize(Route::Polyphenol).is_ok());
}

#[test]
fn test_logout_clears_access() {
    let dir = tempdir().unwrap();
    let mut ctx = context(dir.path(), None);
    ctx.sessions.register("a@tea.lk", "pw").unwrap();
    ctx.sessions.login("a@tea.lk", "pw").unwrap();
    assert!(ctx.authorize(Route::Multi).is_ok());

    ctx.sessions.logout().unwrap();
    let reopened = context(dir.path(), None);
    assert!(reopened.authorize(Route::Multi).is_err());
    assert!(reopened.authorize(Route::Login).is_ok());
}

#[test]
fn test_backend_url_shared_across_commands() {
    let dir = tempdir().unwrap();
    let mut ctx = context(dir.path(), None);
    ctx.sessions.set_backend_url("https://tea.example.com/").unwrap();
    let reopened = context(dir.path(), None);
    assert_eq!(reopened.endpoint(), "https://tea.example.com");
    assert!(ctx.sessions.set_backend_url("ftp://nope").is_err());
}
