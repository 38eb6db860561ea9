//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(String),

    /// 入力チェック（空欄・数値でないCSVなど）
    #[error("{0}")]
    Validation(String),

    #[error("Invalid Credentials")]
    InvalidCredentials,

    /// バックエンドのレスポンス形式が想定外
    #[error("Schema error: {0}")]
    Schema(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_display_validation_is_plain_message() {
        let error = Error::Validation("CSV must contain at least one data row!".to_string());
        assert_eq!(error.to_string(), "CSV must contain at least one data row!");
    }

    #[test]
    fn test_error_display_credentials() {
        assert_eq!(Error::InvalidCredentials.to_string(), "Invalid Credentials");
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_error_debug() {
        let error = Error::Schema("confidence out of range".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("Schema"));
        assert!(debug.contains("confidence"));
    }
}
