//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use std::path::{Path, PathBuf};
use teavision::error::TeaVisionError;
use teavision::scanner;
use teavision_common::session::{MemoryStore, SessionStore};
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"));
    assert!(matches!(result.unwrap_err(), TeaVisionError::FileNotFound(_)));
}

/// 画像のないフォルダ
#[test]
fn test_load_images_folder_without_images() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("test.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    let items = scanner::load_images(&[dir.path().to_path_buf()]).unwrap();
    assert!(items.is_empty());
}

/// 存在しないファイルを直接指定した場合
#[test]
fn test_load_missing_file() {
    let err = scanner::load_images(&[PathBuf::from("/nonexistent/leaf.jpg")]).unwrap_err();
    assert!(err.to_string().contains("leaf.jpg"));
}

/// ログイン失敗は共通エラーがそのまま表示される
#[test]
fn test_invalid_credentials_message() {
    let mut sessions = SessionStore::new(MemoryStore::new());
    sessions.register("a@x.com", "right").unwrap();
    let err: TeaVisionError = sessions.login("a@x.com", "wrong").unwrap_err().into();
    assert_eq!(err.to_string(), "Invalid Credentials");
    assert!(!sessions.load().signed_in);
}

/// Display実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        TeaVisionError::Config("テスト設定エラー".to_string()),
        TeaVisionError::FileNotFound("test.jpg".to_string()),
        TeaVisionError::NoImagesFound("/tmp/empty".to_string()),
        TeaVisionError::BackendStatus {
            status: 502,
            body: "bad gateway".to_string(),
        },
        TeaVisionError::AllOriginsFailed("connection refused".to_string()),
        TeaVisionError::AccessDenied("Super Dashboard".to_string()),
        TeaVisionError::NotSignedIn,
        TeaVisionError::ZipGeneration("a.jpg".to_string()),
    ];

    for err in errors {
        let msg = err.to_string();
        assert!(!msg.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}
