use crate::export::ExportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use teavision_common::{ImageType, Route};

#[derive(Parser)]
#[command(name = "teavision")]
#[command(about = "茶葉の産地判別クライアント", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// バックエンドURL（保存済みの設定より優先）
    #[arg(long, global = true)]
    pub backend_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ユーザー登録（ログインはしない）
    Register {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// ログイン
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// ログアウト
    Logout,

    /// ログイン状態とバックエンドを表示
    Status,

    /// 1枚の画像を予測（候補オリジンを順に試す）
    Predict {
        /// 画像ファイル（省略時はチューザーを開く）
        image: Option<PathBuf>,

        /// 前処理の種別 (raw/preprocessed)
        #[arg(short = 't', long = "type")]
        image_type: Option<ImageType>,
    },

    /// 複数画像を一括予測
    Multi {
        /// 画像ファイルまたはフォルダ
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// 出力形式 (csv/pdf/png)、複数指定可
        #[arg(short, long, value_delimiter = ',')]
        format: Vec<ExportFormat>,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 6モデルの予測を比較
    Compare {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(short = 't', long = "type", default_value = "raw")]
        image_type: ImageType,

        #[arg(short, long, value_delimiter = ',')]
        format: Vec<ExportFormat>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 反射部分を切り出す
    Crop {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// 切り出し後に予測（type=preprocessed）
        #[arg(long)]
        predict: bool,

        /// 切り出し画像をZIPに保存
        #[arg(long)]
        zip: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 吸光度・濃度から産地を予測
    Polyphenol {
        /// 測定値CSV（Absorbance, Concentration 列が必須）
        csv: Option<PathBuf>,

        /// 手入力行 "地域,グレード,吸光度,濃度"（地域・グレードは空でもよい）
        #[arg(long = "row")]
        rows: Vec<String>,

        #[arg(short, long, value_delimiter = ',')]
        format: Vec<ExportFormat>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// バックエンドURLの設定（管理者）
    Settings {
        /// 新しいURL（省略時は入力を求める）
        url: Option<String>,

        /// 保存済みURLを削除して既定値に戻す
        #[arg(long)]
        reset: bool,
    },

    /// バックエンドの状態（管理者）
    Health {
        /// 定期的に確認し続ける
        #[arg(short, long)]
        watch: bool,

        /// 確認間隔（秒）
        #[arg(long, default_value = "10")]
        interval: u64,
    },

    /// ビューシェルを起動
    Shell {
        /// 読み込むURL（省略時は設定値）
        #[arg(long)]
        url: Option<String>,
    },
}

impl Commands {
    /// ガード判定に使う画面
    pub fn route(&self) -> Route {
        match self {
            Commands::Register { .. } => Route::Register,
            Commands::Login { .. } | Commands::Logout | Commands::Status => Route::Login,
            Commands::Predict { .. } => Route::Dashboard,
            Commands::Multi { .. } => Route::Multi,
            Commands::Compare { .. } => Route::Comparison,
            Commands::Crop { .. } => Route::Crop,
            Commands::Polyphenol { .. } => Route::Polyphenol,
            Commands::Settings { .. } => Route::Settings,
            Commands::Health { .. } => Route::Super,
            Commands::Shell { .. } => Route::Home,
        }
    }
}
