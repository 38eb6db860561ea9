//! 端末版のホスト
//!
//! 撮影は設定の外部コマンドで行う。`{output}` は保存先パスを指す
//! 位置引数 `"$1"` に置き換えて `sh -c` に渡す。

use super::{ActivityResult, ChooserRequest, HostPlatform};
use crate::error::{Result, TeaVisionError};
use dialoguer::{Confirm, Input, Select};
use std::path::PathBuf;
use std::process::Command;
use teavision_common::session::normalize_origin;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct TerminalPlatform {
    capture_command: Option<String>,
    camera_granted: bool,
    current_url: Option<String>,
    request: Option<ChooserRequest>,
}

impl TerminalPlatform {
    pub fn new(capture_command: Option<String>) -> Self {
        Self {
            capture_command: capture_command.filter(|c| !c.trim().is_empty()),
            ..Default::default()
        }
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// 開いているチューザーを対話的に処理して結果を返す
    pub fn run_chooser(&mut self) -> Result<ActivityResult> {
        let Some(request) = self.request.take() else {
            return Ok(ActivityResult::cancelled());
        };

        let can_capture = self.camera_granted && self.capture_command.is_some();
        let mut items = vec!["Pick a file"];
        if can_capture {
            items.insert(0, "Take photo");
        }
        items.push("Cancel");

        let choice = Select::new()
            .with_prompt(&request.title)
            .items(&items)
            .default(0)
            .interact()?;

        match items[choice] {
            "Take photo" => {
                self.capture(&request)?;
                Ok(ActivityResult::captured())
            }
            "Pick a file" => {
                let input: String = Input::new()
                    .with_prompt("File path")
                    .allow_empty(true)
                    .interact_text()?;
                let path = PathBuf::from(input.trim());
                if input.trim().is_empty() || !path.is_file() {
                    println!("⚠ ファイルが見つかりません: {}", path.display());
                    return Ok(ActivityResult::cancelled());
                }
                Ok(ActivityResult::picked(path))
            }
            _ => Ok(ActivityResult::cancelled()),
        }
    }

    fn capture(&self, request: &ChooserRequest) -> Result<()> {
        let template = self
            .capture_command
            .as_deref()
            .ok_or_else(|| TeaVisionError::Shell("capture command is not configured".into()))?;
        let command = template.replace("{output}", "\"$1\"");
        debug!(%command, path = %request.capture_path.display(), "running capture command");

        let status = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .arg("sh")
            .arg(&request.capture_path)
            .status()?;
        if !status.success() {
            return Err(TeaVisionError::Shell(format!(
                "capture command exited with {}",
                status
            )));
        }
        Ok(())
    }
}

impl HostPlatform for TerminalPlatform {
    fn has_camera_permission(&self) -> bool {
        self.camera_granted
    }

    fn request_camera_permission(&mut self) -> Result<bool> {
        if self.capture_command.is_none() {
            info!("no capture command configured, camera disabled");
            return Ok(false);
        }
        self.camera_granted = Confirm::new()
            .with_prompt("Allow TeaVision to use the camera?")
            .default(true)
            .interact()?;
        Ok(self.camera_granted)
    }

    fn load_url(&mut self, url: &str) -> Result<()> {
        let url = normalize_origin(url).map_err(|e| TeaVisionError::Shell(e.to_string()))?;
        println!("🌐 {}", url);
        self.current_url = Some(url);
        Ok(())
    }

    fn launch_chooser(&mut self, request: &ChooserRequest) -> Result<()> {
        self.request = Some(request.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ShellHost;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_load_url_rejects_non_http() {
        let mut platform = TerminalPlatform::new(None);
        assert!(platform.load_url("file:///etc/passwd").is_err());
        platform.load_url("http://10.100.128.90:5173/").unwrap();
        assert_eq!(platform.current_url(), Some("http://10.100.128.90:5173"));
    }

    #[test]
    fn test_camera_disabled_without_command() {
        let mut platform = TerminalPlatform::new(Some("  ".into()));
        assert!(!platform.request_camera_permission().unwrap());
        assert!(!platform.has_camera_permission());
    }

    #[test]
    fn test_capture_command_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let platform = TerminalPlatform::new(Some("printf jpeg > {output}".into()));
        let request = ChooserRequest {
            title: "t".into(),
            accept: "*/*".into(),
            capture_path: dir.path().join("shot.jpg"),
        };
        platform.capture(&request).unwrap();
        assert_eq!(std::fs::read(dir.path().join("shot.jpg")).unwrap(), b"jpeg");
    }

    #[test]
    fn test_capture_path_with_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("my photos");
        std::fs::create_dir(&folder).unwrap();
        let platform = TerminalPlatform::new(Some("printf jpeg > {output}".into()));
        let request = ChooserRequest {
            title: "t".into(),
            accept: "*/*".into(),
            capture_path: folder.join("tea leaf.jpg"),
        };
        platform.capture(&request).unwrap();
        assert_eq!(std::fs::read(folder.join("tea leaf.jpg")).unwrap(), b"jpeg");
    }

    #[test]
    fn test_failed_capture_cancels_pending_chooser() {
        let dir = tempfile::tempdir().unwrap();
        let platform = TerminalPlatform::new(Some("exit 3".into()));
        let mut host = ShellHost::new(platform, "http://x/", dir.path());
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        host.on_show_file_chooser(Box::new(move |path: Option<PathBuf>| sink.lock().unwrap().push(path)))
            .unwrap();

        let request = host.platform_mut().request.take().unwrap();
        let outcome = host
            .platform()
            .capture(&request)
            .map(|_| ActivityResult::captured());
        let err = host.complete_chooser(outcome).unwrap_err();

        assert!(err.to_string().contains("capture command exited"));
        assert_eq!(*received.lock().unwrap(), vec![None]);
        assert!(!host.has_pending_chooser());
    }

    #[test]
    fn test_run_chooser_without_request_cancels() {
        let mut platform = TerminalPlatform::new(None);
        assert_eq!(platform.run_chooser().unwrap(), ActivityResult::cancelled());
    }
}
