//! ローカルセッションストア
//!
//! ブラウザの localStorage 相当のキーバリューストアを抽象化し、
//! ログイン状態・ユーザー情報・バックエンドURLを保持する。
//! 暗号化も有効期限もない。認証境界としては扱わないこと。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const KEY_SIGNED_IN: &str = "isSignedIn";
pub const KEY_USER: &str = "user";
pub const KEY_BACKEND_URL: &str = "backend_url";

/// 永続キーバリューストア
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// メモリ上のストア（テスト・一時利用）
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// ユーザー権限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// 登録ユーザー（1件のみ保持される）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

/// 読み出したセッション
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub signed_in: bool,
    pub user: Option<User>,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.signed_in && self.user.as_ref().is_some_and(|u| u.role == Role::Admin)
    }

    pub fn email(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.email.as_str())
    }
}

/// セッション操作
///
/// 管理者判定はハードコードせず、登録時に `admin_email` と比較して
/// ユーザーレコードの `role` に書き込む。
#[derive(Debug, Clone)]
pub struct SessionStore<S: KeyValueStore> {
    store: S,
    admin_email: Option<String>,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            admin_email: None,
        }
    }

    pub fn with_admin_email(mut self, admin_email: Option<String>) -> Self {
        self.admin_email = admin_email.filter(|e| !e.trim().is_empty());
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 現在のセッションを読み出す
    ///
    /// フラグが "true" でもユーザーレコードが読めなければ未ログイン扱い。
    pub fn load(&self) -> Session {
        let user = self.stored_user();
        let flag = self.store.get(KEY_SIGNED_IN).as_deref() == Some("true");
        Session {
            signed_in: flag && user.is_some(),
            user,
        }
    }

    fn stored_user(&self) -> Option<User> {
        let raw = self.store.get(KEY_USER)?;
        serde_json::from_str(&raw).ok()
    }

    /// 新規登録（既存ユーザーは上書き、ログインはしない）
    pub fn register(&mut self, email: &str, password: &str) -> Result<User> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "Email and password are required".into(),
            ));
        }

        let role = match &self.admin_email {
            Some(admin) if admin.trim().eq_ignore_ascii_case(email) => Role::Admin,
            _ => Role::User,
        };
        let user = User {
            email: email.to_string(),
            password: password.to_string(),
            role,
        };
        let json = serde_json::to_string(&user)?;
        self.store.set(KEY_USER, &json)?;
        Ok(user)
    }

    /// ログイン
    ///
    /// 失敗時は `isSignedIn` に触れない。
    pub fn login(&mut self, email: &str, password: &str) -> Result<User> {
        let user = self.stored_user().ok_or(Error::InvalidCredentials)?;
        if user.email != email.trim() || user.password != password {
            return Err(Error::InvalidCredentials);
        }
        self.store.set(KEY_SIGNED_IN, "true")?;
        Ok(user)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.store.remove(KEY_SIGNED_IN)
    }

    pub fn backend_url(&self) -> Option<String> {
        self.store
            .get(KEY_BACKEND_URL)
            .filter(|url| !url.trim().is_empty())
    }

    /// バックエンドURLを保存（http/httpsのみ、末尾スラッシュ除去）
    pub fn set_backend_url(&mut self, url: &str) -> Result<String> {
        let normalized = normalize_origin(url)?;
        self.store.set(KEY_BACKEND_URL, &normalized)?;
        Ok(normalized)
    }

    pub fn clear_backend_url(&mut self) -> Result<()> {
        self.store.remove(KEY_BACKEND_URL)
    }

    /// 保存済みURL、なければ既定値
    pub fn endpoint(&self, default: &str) -> String {
        self.backend_url()
            .unwrap_or_else(|| default.trim_end_matches('/').to_string())
    }
}

/// オリジン文字列を正規化
pub fn normalize_origin(url: &str) -> Result<String> {
    let trimmed = url.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::Validation(format!(
            "Backend URL must start with http:// or https://: {}",
            trimmed
        )));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_user(email: &str, password: &str) -> SessionStore<MemoryStore> {
        let mut sessions = SessionStore::new(MemoryStore::new());
        sessions.register(email, password).expect("登録失敗");
        sessions
    }

    #[test]
    fn test_register_does_not_sign_in() {
        let sessions = store_with_user("a@x.com", "p");
        let session = sessions.load();
        assert!(!session.signed_in);
        assert_eq!(session.email(), Some("a@x.com"));
    }

    #[test]
    fn test_register_rejects_empty_fields() {
        let mut sessions = SessionStore::new(MemoryStore::new());
        assert!(matches!(sessions.register("", "p"), Err(Error::Validation(_))));
        assert!(matches!(sessions.register("a@x.com", ""), Err(Error::Validation(_))));
        assert!(sessions.store().get(KEY_USER).is_none());
    }

    #[test]
    fn test_login_success_sets_flag() {
        let mut sessions = store_with_user("a@x.com", "p");
        sessions.login("a@x.com", "p").expect("ログイン失敗");
        assert_eq!(sessions.store().get(KEY_SIGNED_IN).as_deref(), Some("true"));
        assert!(sessions.load().signed_in);
    }

    #[test]
    fn test_login_wrong_password_leaves_flag_unset() {
        let mut sessions = store_with_user("a@x.com", "p");
        let err = sessions.login("a@x.com", "wrong").unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
        assert!(sessions.store().get(KEY_SIGNED_IN).is_none());
        assert!(!sessions.load().signed_in);
    }

    #[test]
    fn test_login_without_registration() {
        let mut sessions = SessionStore::new(MemoryStore::new());
        assert!(matches!(sessions.login("a@x.com", "p"), Err(Error::InvalidCredentials)));
    }

    #[test]
    fn test_second_registration_replaces_first() {
        let mut sessions = store_with_user("a@x.com", "p");
        sessions.register("b@x.com", "q").unwrap();
        assert!(sessions.login("a@x.com", "p").is_err());
        assert!(sessions.login("b@x.com", "q").is_ok());
    }

    #[test]
    fn test_flag_without_user_is_signed_out() {
        let mut store = MemoryStore::new();
        store.set(KEY_SIGNED_IN, "true").unwrap();
        let sessions = SessionStore::new(store);
        assert!(!sessions.load().signed_in);
    }

    #[test]
    fn test_logout_clears_flag_keeps_user() {
        let mut sessions = store_with_user("a@x.com", "p");
        sessions.login("a@x.com", "p").unwrap();
        sessions.logout().unwrap();
        let session = sessions.load();
        assert!(!session.signed_in);
        assert!(session.user.is_some());
    }

    #[test]
    fn test_admin_role_from_configured_email() {
        let mut sessions = SessionStore::new(MemoryStore::new())
            .with_admin_email(Some("Admin@Tea.lk".to_string()));
        let user = sessions.register("admin@tea.lk", "secret").unwrap();
        assert_eq!(user.role, Role::Admin);
        sessions.login("admin@tea.lk", "secret").unwrap();
        assert!(sessions.load().is_admin());
    }

    #[test]
    fn test_legacy_user_record_without_role() {
        let mut store = MemoryStore::new();
        store.set(KEY_USER, r#"{"email":"a@x.com","password":"p"}"#).unwrap();
        store.set(KEY_SIGNED_IN, "true").unwrap();
        let session = SessionStore::new(store).load();
        assert!(session.signed_in);
        assert!(!session.is_admin());
    }

    #[test]
    fn test_backend_url_override() {
        let mut sessions = SessionStore::new(MemoryStore::new());
        assert_eq!(sessions.endpoint("http://localhost:5000/"), "http://localhost:5000");
        let saved = sessions.set_backend_url(" http://10.0.0.5:5000/ ").unwrap();
        assert_eq!(saved, "http://10.0.0.5:5000");
        assert_eq!(sessions.endpoint("http://localhost:5000"), "http://10.0.0.5:5000");
        sessions.clear_backend_url().unwrap();
        assert!(sessions.backend_url().is_none());
    }

    #[test]
    fn test_backend_url_rejects_non_http() {
        let mut sessions = SessionStore::new(MemoryStore::new());
        assert!(sessions.set_backend_url("ftp://host").is_err());
        assert!(sessions.backend_url().is_none());
    }
}
