//! localStorage をキーバリューストアとして使う

use teavision_common::session::{KeyValueStore, SessionStore};
use teavision_common::{Error, Result};

/// 登録時に管理者権限を付与するメールアドレス（ビルド時に指定）
pub fn admin_email() -> Option<String> {
    option_env!("TEAVISION_ADMIN_EMAIL").map(str::to_string)
}

/// `window.localStorage`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStore;

impl BrowserStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

fn unavailable() -> Error {
    Error::Config("localStorage is not available".into())
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        Self::storage()
            .ok_or_else(unavailable)?
            .set_item(key, value)
            .map_err(|_| Error::Config(format!("failed to write {}", key)))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        Self::storage()
            .ok_or_else(unavailable)?
            .remove_item(key)
            .map_err(|_| Error::Config(format!("failed to remove {}", key)))
    }
}

/// ブラウザのセッションストア
pub fn sessions() -> SessionStore<BrowserStore> {
    SessionStore::new(BrowserStore).with_admin_email(admin_email())
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use teavision_common::session::KEY_BACKEND_URL;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const KEY: &str = "teavision_test_key";

    #[wasm_bindgen_test]
    fn wasm_browser_store_round_trip() {
        let mut store = BrowserStore;
        store.set(KEY, "value").unwrap();
        assert_eq!(store.get(KEY).as_deref(), Some("value"));
        store.remove(KEY).unwrap();
        assert_eq!(store.get(KEY), None);
    }

    #[wasm_bindgen_test]
    fn wasm_sessions_persist_in_local_storage() {
        let mut store = SessionStore::new(BrowserStore).with_admin_email(Some("admin@example.com".into()));
        store.logout().unwrap();
        store.register("admin@example.com", "secret").unwrap();
        store.login("admin@example.com", "secret").unwrap();

        // 別インスタンスからも同じ状態が見える
        let reloaded = SessionStore::new(BrowserStore).load();
        assert!(reloaded.signed_in);
        assert!(reloaded.is_admin());

        let saved = store.set_backend_url("http://10.0.0.5:5000/").unwrap();
        assert_eq!(BrowserStore.get(KEY_BACKEND_URL), Some(saved));
        store.clear_backend_url().unwrap();
        store.logout().unwrap();
        assert!(!SessionStore::new(BrowserStore).load().signed_in);
    }
}
