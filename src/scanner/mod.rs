//! 画像の取込
//!
//! ファイル・フォルダ・Data URLから `ImageItem` を作る。

use crate::error::{Result, TeaVisionError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::{Path, PathBuf};
use teavision_common::ImageItem;
use tracing::debug;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

/// 拡張子からMIMEタイプを推定
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// フォルダ直下の画像パス（ファイル名順）
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.exists() {
        return Err(TeaVisionError::FileNotFound(folder.display().to_string()));
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| is_image_extension(&ext.to_string_lossy()))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect();

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// 1ファイルを読み込む
pub fn load_image(path: &Path) -> Result<ImageItem> {
    if !path.is_file() {
        return Err(TeaVisionError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let mut item = ImageItem::new(file_name, bytes, mime_for(path));
    item.preview = Some(path.display().to_string());
    Ok(item)
}

/// ファイルとフォルダの混在指定を展開して読み込む
///
/// 指定順を保ち、フォルダの中身はファイル名順で挿入する。
/// 重複除去は `ImageBatch::add` 側で行う。
pub fn load_images(inputs: &[PathBuf]) -> Result<Vec<ImageItem>> {
    let mut items = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let paths = scan_folder(input)?;
            debug!(folder = %input.display(), count = paths.len(), "scanned folder");
            for path in paths {
                items.push(load_image(&path)?);
            }
        } else {
            items.push(load_image(input)?);
        }
    }
    Ok(items)
}

/// `data:image/png;base64,...` を分解してバイト列を得る
pub fn decode_data_url(data_url: &str) -> Option<(String, Vec<u8>)> {
    let (header, payload) = data_url.split_once(',')?;
    let mime = header
        .strip_prefix("data:")
        .and_then(|s| s.split(';').next())
        .filter(|s| !s.is_empty())
        .unwrap_or("image/png");
    if !header.ends_with(";base64") {
        return None;
    }
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some((mime.to_string(), bytes))
}

/// 切り出し済み画像を予測用の `ImageItem` にする（元のファイル名を引き継ぐ）
pub fn image_from_data_url(file_name: &str, data_url: &str) -> Result<ImageItem> {
    let (mime, bytes) = decode_data_url(data_url).ok_or_else(|| {
        TeaVisionError::ApiParse(format!("invalid cropped image for {}", file_name))
    })?;
    Ok(ImageItem::new(file_name, bytes, mime))
}
