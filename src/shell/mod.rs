//! ビューシェル（埋め込みWebビューのホスト）
//!
//! ページのファイル選択要求を「撮影」と「ファイル選択」を合わせた
//! チューザーに置き換え、選ばれた方をページへ返す。
//! プラットフォーム固有の処理は `HostPlatform` に分離する。

mod terminal;

pub use terminal::TerminalPlatform;

use crate::error::{Result, TeaVisionError};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, info, warn};

pub const CHOOSER_TITLE: &str = "Select or take a photo";
pub const CHOOSER_ACCEPT: &str = "*/*";

/// ページ側のファイル入力へ結果を返すコールバック（キャンセル時は None）
pub type FileCallback = Box<dyn FnOnce(Option<PathBuf>) + Send>;

/// チューザー起動要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChooserRequest {
    pub title: String,
    pub accept: String,
    /// 撮影時の書き込み先
    pub capture_path: PathBuf,
}

/// チューザーから戻った結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityResult {
    /// ユーザーが操作を完了したか
    pub ok: bool,
    /// 選択されたファイル（撮影時は None）
    pub picked: Option<PathBuf>,
}

impl ActivityResult {
    pub fn picked(path: impl Into<PathBuf>) -> Self {
        Self {
            ok: true,
            picked: Some(path.into()),
        }
    }

    pub fn captured() -> Self {
        Self {
            ok: true,
            picked: None,
        }
    }

    pub fn cancelled() -> Self {
        Self::default()
    }
}

/// プラットフォーム側の機能
pub trait HostPlatform {
    fn has_camera_permission(&self) -> bool;

    /// 許可ダイアログを出す。許可されたら true
    fn request_camera_permission(&mut self) -> Result<bool>;

    fn load_url(&mut self, url: &str) -> Result<()>;

    /// チューザーを開く。結果は後で `ShellHost::on_activity_result` に渡される
    fn launch_chooser(&mut self, request: &ChooserRequest) -> Result<()>;
}

pub struct ShellHost<P: HostPlatform> {
    platform: P,
    url: String,
    cache_dir: PathBuf,
    pending: Option<FileCallback>,
    capture: Option<TempPath>,
    permission_requested: bool,
    url_editor_visible: bool,
    last_error: Option<String>,
}

impl<P: HostPlatform> ShellHost<P> {
    pub fn new(platform: P, url: &str, cache_dir: &Path) -> Self {
        Self {
            platform,
            url: url.trim().to_string(),
            cache_dir: cache_dir.to_path_buf(),
            pending: None,
            capture: None,
            permission_requested: false,
            url_editor_visible: false,
            last_error: None,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_url_editor_visible(&self) -> bool {
        self.url_editor_visible
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn has_pending_chooser(&self) -> bool {
        self.pending.is_some()
    }

    /// カメラ権限が無ければ1度だけ要求する
    pub fn ensure_camera_permission(&mut self) -> Result<()> {
        if !self.permission_requested && !self.platform.has_camera_permission() {
            self.permission_requested = true;
            let granted = self.platform.request_camera_permission()?;
            info!(granted, "camera permission requested");
        }
        Ok(())
    }

    /// 起動時: 権限を確認してからページを読み込む
    pub fn start(&mut self) -> Result<()> {
        self.ensure_camera_permission()?;
        let url = self.url.clone();
        self.load(&url)
    }

    /// ページ読込。失敗したらURL編集欄を出す
    pub fn load(&mut self, url: &str) -> Result<()> {
        self.url = url.trim().to_string();
        match self.platform.load_url(&self.url) {
            Ok(()) => {
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "page load failed");
                self.last_error = Some(e.to_string());
                self.url_editor_visible = true;
                Err(e)
            }
        }
    }

    pub fn toggle_url_editor(&mut self) {
        self.url_editor_visible = !self.url_editor_visible;
    }

    /// 編集欄からURLを確定して読み直す
    pub fn submit_url(&mut self, url: &str) -> Result<()> {
        let url = url.trim();
        if url.is_empty() {
            return Err(TeaVisionError::Shell("URL is empty".into()));
        }
        self.url_editor_visible = false;
        self.load(url)
    }

    /// ページのファイル入力が押された
    ///
    /// 前回のコールバックが残っていれば None で解決してから置き換える。
    pub fn on_show_file_chooser(&mut self, callback: FileCallback) -> Result<()> {
        if let Some(previous) = self.pending.take() {
            debug!("resolving stale file chooser callback");
            previous(None);
        }

        std::fs::create_dir_all(&self.cache_dir)?;
        let capture = tempfile::Builder::new()
            .prefix("camera_photo")
            .suffix(".jpg")
            .tempfile_in(&self.cache_dir)?
            .into_temp_path();

        let request = ChooserRequest {
            title: CHOOSER_TITLE.to_string(),
            accept: CHOOSER_ACCEPT.to_string(),
            capture_path: capture.to_path_buf(),
        };

        if let Err(e) = self.platform.launch_chooser(&request) {
            callback(None);
            return Err(e);
        }

        self.capture = Some(capture);
        self.pending = Some(callback);
        Ok(())
    }

    /// チューザーの結果をページへ返す
    ///
    /// 選択ファイル → 撮影写真（空でなければ）→ なし の順。
    pub fn on_activity_result(&mut self, result: ActivityResult) {
        let Some(callback) = self.pending.take() else {
            debug!("activity result without pending chooser");
            return;
        };

        let value = if result.ok {
            result.picked.or_else(|| {
                self.capture
                    .as_ref()
                    .map(|p| p.to_path_buf())
                    .filter(|p| std::fs::metadata(p).map(|m| m.len() > 0).unwrap_or(false))
            })
        } else {
            None
        };
        callback(value);
    }

    /// チューザー処理の結果でコールバックを解決する
    ///
    /// 処理自体が失敗した場合も待機中のコールバックは None で解決し、エラーを返す。
    pub fn complete_chooser(&mut self, outcome: Result<ActivityResult>) -> Result<()> {
        match outcome {
            Ok(result) => {
                self.on_activity_result(result);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "file chooser failed");
                self.last_error = Some(e.to_string());
                self.on_activity_result(ActivityResult::cancelled());
                Err(e)
            }
        }
    }

    /// ページからの権限要求（要求どおり許可）
    pub fn on_permission_request(&self, resources: &[String]) -> Vec<String> {
        debug!(?resources, "granting page permissions");
        resources.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[derive(Default)]
    struct FakePlatform {
        camera: bool,
        permission_requests: usize,
        loaded: Vec<String>,
        fail_load: bool,
        requests: Vec<ChooserRequest>,
    }

    impl HostPlatform for FakePlatform {
        fn has_camera_permission(&self) -> bool {
            self.camera
        }

        fn request_camera_permission(&mut self) -> Result<bool> {
            self.permission_requests += 1;
            Ok(false)
        }

        fn load_url(&mut self, url: &str) -> Result<()> {
            if self.fail_load {
                return Err(TeaVisionError::Shell(format!("cannot load {}", url)));
            }
            self.loaded.push(url.to_string());
            Ok(())
        }

        fn launch_chooser(&mut self, request: &ChooserRequest) -> Result<()> {
            self.requests.push(request.clone());
            Ok(())
        }
    }

    type Received = Arc<Mutex<Vec<Option<PathBuf>>>>;

    fn recorder() -> (Received, impl Fn() -> FileCallback) {
        let received: Received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let make = move || -> FileCallback {
            let sink = sink.clone();
            Box::new(move |value| sink.lock().unwrap().push(value))
        };
        (received, make)
    }

    #[test]
    fn test_start_requests_permission_once() {
        let dir = tempdir().unwrap();
        let mut host = ShellHost::new(FakePlatform::default(), "http://10.0.0.1:5173/", dir.path());
        host.start().unwrap();
        host.start().unwrap();
        assert_eq!(host.platform().permission_requests, 1);
        assert_eq!(host.platform().loaded.len(), 2);
    }

    #[test]
    fn test_no_request_when_already_granted() {
        let dir = tempdir().unwrap();
        let platform = FakePlatform {
            camera: true,
            ..Default::default()
        };
        let mut host = ShellHost::new(platform, "http://x/", dir.path());
        host.start().unwrap();
        assert_eq!(host.platform().permission_requests, 0);
    }

    #[test]
    fn test_load_error_shows_url_editor() {
        let dir = tempdir().unwrap();
        let platform = FakePlatform {
            fail_load: true,
            ..Default::default()
        };
        let mut host = ShellHost::new(platform, "http://x/", dir.path());
        assert!(!host.is_url_editor_visible());
        assert!(host.start().is_err());
        assert!(host.is_url_editor_visible());
        assert!(host.last_error().unwrap().contains("http://x/"));

        host.platform_mut().fail_load = false;
        host.submit_url("http://y/").unwrap();
        assert!(!host.is_url_editor_visible());
        assert_eq!(host.url(), "http://y/");
        assert!(host.last_error().is_none());
    }

    #[test]
    fn test_chooser_request_shape() {
        let dir = tempdir().unwrap();
        let (_, make) = recorder();
        let mut host = ShellHost::new(FakePlatform::default(), "http://x/", dir.path());
        host.on_show_file_chooser(make()).unwrap();

        let request = &host.platform().requests[0];
        assert_eq!(request.title, "Select or take a photo");
        assert_eq!(request.accept, "*/*");
        assert!(request.capture_path.starts_with(dir.path()));
        assert!(request.capture_path.exists());
        assert!(host.has_pending_chooser());
    }

    #[test]
    fn test_picked_file_wins_over_capture() {
        let dir = tempdir().unwrap();
        let (received, make) = recorder();
        let mut host = ShellHost::new(FakePlatform::default(), "http://x/", dir.path());
        host.on_show_file_chooser(make()).unwrap();
        let capture = host.platform().requests[0].capture_path.clone();
        std::fs::write(&capture, b"jpeg").unwrap();

        host.on_activity_result(ActivityResult::picked("/tmp/leaf.png"));
        assert_eq!(*received.lock().unwrap(), vec![Some(PathBuf::from("/tmp/leaf.png"))]);
        assert!(!host.has_pending_chooser());
    }

    #[test]
    fn test_captured_photo_returned_when_non_empty() {
        let dir = tempdir().unwrap();
        let (received, make) = recorder();
        let mut host = ShellHost::new(FakePlatform::default(), "http://x/", dir.path());

        // 空の撮影ファイルは返さない
        host.on_show_file_chooser(make()).unwrap();
        host.on_activity_result(ActivityResult::captured());

        host.on_show_file_chooser(make()).unwrap();
        let capture = host.platform().requests[1].capture_path.clone();
        std::fs::write(&capture, b"jpeg").unwrap();
        host.on_activity_result(ActivityResult::captured());

        assert_eq!(*received.lock().unwrap(), vec![None, Some(capture)]);
    }

    #[test]
    fn test_cancel_and_stale_callbacks_resolve_with_none() {
        let dir = tempdir().unwrap();
        let (received, make) = recorder();
        let mut host = ShellHost::new(FakePlatform::default(), "http://x/", dir.path());

        host.on_show_file_chooser(make()).unwrap();
        // 結果が来ないまま次の要求
        host.on_show_file_chooser(make()).unwrap();
        host.on_activity_result(ActivityResult::cancelled());
        // 待機中のコールバックが無ければ何もしない
        host.on_activity_result(ActivityResult::picked("/tmp/x.jpg"));

        assert_eq!(*received.lock().unwrap(), vec![None, None]);
    }

    #[test]
    fn test_failed_chooser_resolves_callback_with_none() {
        let dir = tempdir().unwrap();
        let (received, make) = recorder();
        let mut host = ShellHost::new(FakePlatform::default(), "http://x/", dir.path());
        host.on_show_file_chooser(make()).unwrap();
        let capture = host.platform().requests[0].capture_path.clone();
        std::fs::write(&capture, b"partial").unwrap();

        let outcome = Err(TeaVisionError::Shell("capture command exited with 1".into()));
        assert!(host.complete_chooser(outcome).is_err());
        assert_eq!(*received.lock().unwrap(), vec![None]);
        assert!(!host.has_pending_chooser());
        assert!(host.last_error().unwrap().contains("capture command"));

        // 失敗後も次の要求を受け付ける
        host.on_show_file_chooser(make()).unwrap();
        host.complete_chooser(Ok(ActivityResult::picked("/tmp/leaf.png"))).unwrap();
        assert_eq!(received.lock().unwrap()[1], Some(PathBuf::from("/tmp/leaf.png")));
    }

    #[test]
    fn test_page_permissions_granted_as_requested() {
        let dir = tempdir().unwrap();
        let host = ShellHost::new(FakePlatform::default(), "http://x/", dir.path());
        let resources = vec!["android.webkit.resource.VIDEO_CAPTURE".to_string()];
        assert_eq!(host.on_permission_request(&resources), resources);
    }
}
