//! TeaVision CLI Library
//!
//! 茶葉画像・ポリフェノール測定値から産地を判別するバックエンドの
//! クライアント。予測・一括予測・出力・ビューシェルを提供する。

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod scanner;
pub mod shell;
pub mod storage;

pub use client::{OriginFallback, PredictParams, PredictionClient};
pub use error::{Result, TeaVisionError};
