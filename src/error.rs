use thiserror::Error;

#[derive(Error, Debug)]
pub enum TeaVisionError {
    /// 共通ライブラリ（セッション・CSV・スキーマ）
    #[error(transparent)]
    Common(#[from] teavision_common::Error),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("通信エラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("バックエンドがステータス {status} を返しました: {body}")]
    BackendStatus { status: u16, body: String },

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("すべてのバックエンドに接続できません: {0}")]
    AllOriginsFailed(String),

    #[error("この画面にはアクセスできません: {0}")]
    AccessDenied(String),

    #[error("ログインが必要です")]
    NotSignedIn,

    #[error("PDF生成エラー: {0}")]
    PdfGeneration(String),

    #[error("PNG生成エラー: {0}")]
    PngGeneration(String),

    #[error("ZIP生成エラー: {0}")]
    ZipGeneration(String),

    #[error("シェルエラー: {0}")]
    Shell(String),

    #[error("入力エラー: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TeaVisionError>;
