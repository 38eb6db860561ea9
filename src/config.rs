use crate::error::{Result, TeaVisionError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 設定ディレクトリを差し替える環境変数
pub const CONFIG_DIR_ENV: &str = "TEAVISION_CONFIG_DIR";
/// バックエンドURLを上書きする環境変数
pub const BACKEND_URL_ENV: &str = "TEAVISION_BACKEND_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 登録時にこのメールアドレスなら admin 権限を付与
    pub admin_email: Option<String>,
    /// 単一予測・一括予測の既定バックエンド
    pub default_backend: String,
    /// 単一予測で順に試すオリジン
    pub candidate_origins: Vec<String>,
    /// 未設定なら無制限
    pub timeout_seconds: Option<u64>,
    /// シェルが最初に開くURL
    pub shell_url: String,
    /// カメラ撮影コマンド（`{output}` が保存先に置換される）
    pub capture_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_email: None,
            default_backend: "http://localhost:5000".into(),
            candidate_origins: vec![
                "http://localhost:5000".into(),
                "http://10.215.59.186:5000".into(),
            ],
            timeout_seconds: None,
            shell_url: "http://10.100.128.90:5173/".into(),
            capture_command: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_dir()?)
    }

    pub fn load_from(dir: &Path) -> Result<Self> {
        let config_path = dir.join("config.json");

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_dir()?)
    }

    pub fn save_to(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(dir.join("config.json"), content)?;
        Ok(())
    }

    /// `TEAVISION_CONFIG_DIR`、なければ `~/.config/teavision`
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            if !dir.trim().is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }
        let home = dirs::home_dir()
            .ok_or_else(|| TeaVisionError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("teavision"))
    }

    /// キーバリューストアの保存先
    pub fn storage_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("storage.json"))
    }

    /// 撮影ファイルの置き場
    pub fn cache_dir() -> PathBuf {
        dirs::cache_dir()
            .map(|d| d.join("teavision"))
            .unwrap_or_else(std::env::temp_dir)
    }

    /// 環境変数の上書き
    pub fn backend_override() -> Option<String> {
        std::env::var(BACKEND_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }

    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_seconds.map(std::time::Duration::from_secs)
    }
}
