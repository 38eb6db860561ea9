//! ファイル版キーバリューストア
//!
//! ブラウザの localStorage の代わりに `storage.json` へ保存する。
//! 書き込みのたびにファイル全体を書き直す。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use teavision_common::session::KeyValueStore;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StorageFile {
    entries: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    data: StorageFile,
}

impl FileStore {
    /// 読み込み（無い・壊れている場合は空から始める）
    pub fn open(path: &Path) -> Self {
        let data = File::open(path)
            .ok()
            .and_then(|f| serde_json::from_reader(BufReader::new(f)).ok())
            .unwrap_or_else(|| {
                if path.exists() {
                    tracing::warn!(path = %path.display(), "storage file unreadable, starting empty");
                }
                StorageFile::default()
            });
        Self {
            path: path.to_path_buf(),
            data,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> teavision_common::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(writer, &self.data)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.data.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> teavision_common::Result<()> {
        self.data.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> teavision_common::Result<()> {
        if self.data.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
