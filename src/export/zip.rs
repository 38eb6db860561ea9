use crate::error::{Result, TeaVisionError};
use crate::scanner::decode_data_url;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::ZipWriter;

/// 切り出し画像1枚分（元ファイル名 + data URL）
#[derive(Debug, Clone)]
pub struct CroppedImage {
    pub file_name: String,
    pub data_url: String,
}

pub fn entry_name(file_name: &str) -> String {
    format!("cropped_{}", file_name)
}

/// 切り出し画像を `cropped_<元ファイル名>` としてZIPに書き込む
pub fn write_cropped_zip<W: Write + Seek>(images: &[CroppedImage], writer: W) -> Result<usize> {
    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default();

    for image in images {
        let (_, bytes) = decode_data_url(&image.data_url).ok_or_else(|| {
            TeaVisionError::ZipGeneration(format!("画像データを復元できません: {}", image.file_name))
        })?;
        zip.start_file(entry_name(&image.file_name), options)
            .map_err(|e| TeaVisionError::ZipGeneration(e.to_string()))?;
        zip.write_all(&bytes)?;
    }

    zip.finish()
        .map_err(|e| TeaVisionError::ZipGeneration(e.to_string()))?;
    Ok(images.len())
}

pub fn generate_zip(images: &[CroppedImage], output_path: &Path) -> Result<usize> {
    let file = File::create(output_path)?;
    write_cropped_zip(images, file)
}
