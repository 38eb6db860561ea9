//! サブコマンドの処理
//!
//! 各コマンドはガードを通過してから実行される。一括処理は
//! `run_batch` で全件を同時に投げ、入力順で結果を受け取る。

use crate::client::{OriginFallback, PredictParams, PredictionClient};
use crate::config::Config;
use crate::error::{Result, TeaVisionError};
use crate::export::zip::CroppedImage;
use crate::export::{self, ExportFormat};
use crate::scanner;
use crate::shell::{ShellHost, TerminalPlatform};
use crate::storage::FileStore;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use teavision_common::batch::AgreementSummary;
use teavision_common::region::{GRADES, POLYPHENOL_REGIONS};
use teavision_common::{
    comparison_table, guard, parse_polyphenol_csv, polyphenol_table, prediction_table,
    probability_bars, region_info, run_batch, ComparisonRow, ConnectionStatus, GuardDecision,
    ImageBatch, ImageItem, ImageType, ModelVariant, PolyphenolTable, PredictionResult,
    ReportTable, Route, Session, SessionStore,
};
use tracing::{debug, info, warn};

/// コマンド実行に必要な状態
pub struct Context {
    pub config: Config,
    pub sessions: SessionStore<FileStore>,
    /// `--backend-url` または環境変数
    pub backend_override: Option<String>,
}

impl Context {
    pub fn new(config: Config, store: FileStore, backend_override: Option<String>) -> Self {
        let sessions = SessionStore::new(store).with_admin_email(config.admin_email.clone());
        Self {
            config,
            sessions,
            backend_override,
        }
    }

    pub fn session(&self) -> Session {
        self.sessions.load()
    }

    /// 上書き → 保存済み → 設定の既定値
    pub fn endpoint(&self) -> String {
        match &self.backend_override {
            Some(url) => url.trim().trim_end_matches('/').to_string(),
            None => self.sessions.endpoint(&self.config.default_backend),
        }
    }

    pub fn client(&self) -> Result<PredictionClient> {
        PredictionClient::new(&self.endpoint(), self.config.timeout())
    }

    /// 単一予測のフォールバック候補
    pub fn fallback(&self) -> OriginFallback {
        let origins: Vec<String> = match &self.backend_override {
            Some(url) => vec![url.clone()],
            None => self
                .sessions
                .backend_url()
                .into_iter()
                .chain(self.config.candidate_origins.iter().cloned())
                .collect(),
        };
        OriginFallback::new(origins, self.config.timeout())
    }

    /// ガード判定。表示不可ならエラー
    pub fn authorize(&self, route: Route) -> Result<()> {
        match guard(route, &self.session()) {
            GuardDecision::Render(_) => Ok(()),
            GuardDecision::RedirectToLogin => Err(TeaVisionError::NotSignedIn),
            GuardDecision::RedirectToDefault(fallback) => Err(TeaVisionError::AccessDenied(format!(
                "{} is restricted to admins (use {} instead)",
                route.title(),
                fallback.title()
            ))),
        }
    }
}

fn progress_bar(len: usize, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    pb.set_style(style);
    pb.set_message(label.to_string());
    pb
}

fn prompt_text(label: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(dialoguer::Input::<String>::new()
            .with_prompt(label)
            .interact_text()?),
    }
}

fn prompt_password(value: Option<String>) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(dialoguer::Password::new()
            .with_prompt("Password")
            .interact()?),
    }
}

// ---- セッション ----

pub fn register(ctx: &mut Context, email: Option<String>, password: Option<String>) -> Result<()> {
    let email = prompt_text("Email", email)?;
    let password = prompt_password(password)?;
    let user = ctx.sessions.register(&email, &password)?;
    info!(email = %user.email, role = ?user.role, "registered");
    println!("✔ Registration successful! Please log in. ({})", user.email);
    Ok(())
}

pub fn login(ctx: &mut Context, email: Option<String>, password: Option<String>) -> Result<()> {
    let email = prompt_text("Email", email)?;
    let password = prompt_password(password)?;
    let user = ctx.sessions.login(&email, &password)?;
    let session = ctx.session();
    let landing = if session.is_admin() {
        Route::Super
    } else {
        teavision_common::DEFAULT_AUTHENTICATED_ROUTE
    };
    println!("✔ Welcome, {}", user.email);
    println!("  → {}", landing.title());
    Ok(())
}

pub fn logout(ctx: &mut Context) -> Result<()> {
    ctx.sessions.logout()?;
    println!("✔ Logged out");
    Ok(())
}

pub fn status(ctx: &Context) {
    let session = ctx.session();
    println!("TeaVision");
    match (session.signed_in, session.email()) {
        (true, Some(email)) => println!(
            "  User: {} ({})",
            email,
            if session.is_admin() { "admin" } else { "user" }
        ),
        (_, Some(email)) => println!("  User: {} (signed out)", email),
        _ => println!("  User: (not registered)"),
    }
    println!("  Backend: {}", ctx.endpoint());
}

// ---- 単一予測 ----

/// 予測結果を端末に表示
pub fn print_prediction(file_name: &str, result: &PredictionResult) {
    if let Some(error) = &result.error {
        println!("❌ {}: {}", file_name, error);
        return;
    }
    println!(
        "✔ {}: {} ({})",
        file_name,
        result.prediction_label(),
        result.confidence_label()
    );
    if let Some(probabilities) = &result.probabilities {
        for bar in probability_bars(probabilities) {
            let filled = (bar.percent / 5.0).round().clamp(0.0, 20.0) as usize;
            println!(
                "  {:<14} {:<20} {:>6.2}%",
                bar.label,
                "█".repeat(filled),
                bar.percent
            );
        }
    }
    let info = result
        .info
        .clone()
        .or_else(|| result.prediction.as_deref().and_then(region_info));
    if let Some(info) = info {
        println!("  {}", info.description);
        println!("  Origin: {}", info.origin);
        if !info.flavor_notes.is_empty() {
            println!("  Flavor notes: {}", info.flavor_notes.join(", "));
        }
    }
}

/// ビューシェル経由で画像を1枚選ぶ
fn choose_image(config: &Config) -> Result<Option<PathBuf>> {
    let platform = TerminalPlatform::new(config.capture_command.clone());
    let mut host = ShellHost::new(platform, &config.shell_url, &Config::cache_dir());
    let chosen: Arc<Mutex<Option<PathBuf>>> = Arc::new(Mutex::new(None));
    let sink = chosen.clone();
    host.ensure_camera_permission()?;
    host.on_show_file_chooser(Box::new(move |path: Option<PathBuf>| {
        if let Ok(mut slot) = sink.lock() {
            *slot = path;
        }
    }))?;
    let outcome = host.platform_mut().run_chooser();
    if let Err(e) = host.complete_chooser(outcome) {
        println!("⚠ {}", e);
    }

    let path = chosen.lock().ok().and_then(|mut slot| slot.take());
    // 撮影ファイルはホストと一緒に消えるので退避する
    match path {
        Some(p) if p.starts_with(Config::cache_dir()) => {
            let kept = std::env::temp_dir().join(format!(
                "teavision_capture_{}.jpg",
                std::process::id()
            ));
            std::fs::copy(&p, &kept)?;
            Ok(Some(kept))
        }
        other => Ok(other),
    }
}

pub async fn predict(ctx: &Context, image: Option<PathBuf>, image_type: Option<ImageType>) -> Result<()> {
    let path = match image {
        Some(p) => p,
        None => match choose_image(&ctx.config)? {
            Some(p) => p,
            None => {
                println!("Please upload or capture an image first!");
                return Ok(());
            }
        },
    };
    let item = scanner::load_image(&path)?;
    let params = PredictParams {
        image_type,
        model: None,
    };

    let mut fallback = ctx.fallback();
    let result = fallback.predict(&item, &params).await?;
    if let Some(origin) = fallback.active() {
        debug!(%origin, "prediction served");
    }

    if result.prediction.is_none() {
        println!(
            "❌ Prediction failed: {}",
            result.error.as_deref().unwrap_or("Unknown error")
        );
        return Ok(());
    }
    print_prediction(&item.file_name, &result);
    Ok(())
}

// ---- 一括予測 ----

/// バッチ内の全画像を同時に予測し、入力順で結果を格納する
pub async fn predict_batch(
    client: &PredictionClient,
    batch: &mut ImageBatch,
    params: PredictParams,
    progress: Option<&ProgressBar>,
) -> Result<()> {
    let items: Vec<ImageItem> = batch.items().into_iter().cloned().collect();
    let results = run_batch(&items, |_, item| async move {
        let result = client.predict_or_failed(item, &params).await;
        if let Some(pb) = progress {
            pb.inc(1);
        }
        result
    })
    .await;
    batch.apply_results(results)?;
    Ok(())
}

fn export_all(
    table: &ReportTable,
    formats: &[ExportFormat],
    output: Option<&Path>,
    stem: &str,
) -> Result<Vec<PathBuf>> {
    let formats = if formats.is_empty() {
        vec![ExportFormat::Csv]
    } else {
        formats.to_vec()
    };
    let output = output.unwrap_or_else(|| Path::new("."));
    let mut written = Vec::new();
    for format in formats {
        let path = export::export_table(table, format, output, stem)?;
        println!("✔ {} saved: {}", format.extension().to_uppercase(), path.display());
        written.push(path);
    }
    Ok(written)
}

fn load_batch(paths: &[PathBuf]) -> Result<ImageBatch> {
    let items = scanner::load_images(paths)?;
    if items.is_empty() {
        return Err(TeaVisionError::NoImagesFound(
            paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        ));
    }
    let total = items.len();
    let mut batch = ImageBatch::new();
    let added = batch.add(items);
    if added < total {
        println!("- Skipped {} duplicate image(s)", total - added);
    }
    Ok(batch)
}

pub async fn multi(
    ctx: &Context,
    paths: &[PathBuf],
    formats: &[ExportFormat],
    output: Option<&Path>,
) -> Result<()> {
    println!("🍃 TeaVision - Multi Predict\n");
    let mut batch = load_batch(paths)?;
    println!("✔ Loaded {} image(s)\n", batch.len());

    let client = ctx.client()?;
    let pb = progress_bar(batch.len(), "Predicting");
    predict_batch(&client, &mut batch, PredictParams::default(), Some(&pb)).await?;
    pb.finish_and_clear();

    for entry in batch.entries() {
        println!(
            "  {} {:<30} {:<14} {}",
            entry.status().badge(),
            entry.item.file_name,
            entry
                .result
                .as_ref()
                .map(|r| r.prediction_label())
                .unwrap_or_default(),
            entry
                .result
                .as_ref()
                .map(|r| r.confidence_label())
                .unwrap_or_default()
        );
    }
    println!();

    export_all(&prediction_table(&batch), formats, output, export::PREDICTIONS_STEM)?;
    println!("\n✅ Done");
    Ok(())
}

// ---- モデル比較 ----

/// 1枚の画像を全モデルで予測
pub async fn compare_one(
    client: &PredictionClient,
    item: &ImageItem,
    image_type: ImageType,
) -> ComparisonRow {
    let results = join_all(ModelVariant::ALL.iter().map(|model| async move {
        let params = PredictParams::with_model(*model, image_type);
        (*model, client.predict_or_failed(item, &params).await)
    }))
    .await;
    ComparisonRow {
        file_name: item.file_name.clone(),
        results: results.into_iter().collect::<BTreeMap<_, _>>(),
    }
}

pub async fn compare_models(
    client: &PredictionClient,
    items: &[ImageItem],
    image_type: ImageType,
) -> Vec<ComparisonRow> {
    run_batch(items, |_, item| compare_one(client, item, image_type)).await
}

pub async fn compare(
    ctx: &Context,
    paths: &[PathBuf],
    image_type: ImageType,
    formats: &[ExportFormat],
    output: Option<&Path>,
) -> Result<()> {
    println!("🍃 TeaVision - Model Comparison ({})\n", image_type.label());
    let batch = load_batch(paths)?;
    let items: Vec<ImageItem> = batch.items().into_iter().cloned().collect();
    let client = ctx.client()?;

    let rows = compare_models(&client, &items, image_type).await;

    for row in &rows {
        println!("{}", row.file_name);
        for model in ModelVariant::ALL {
            let cell = row
                .result(model)
                .map(|r| format!("{} ({})", r.prediction_label(), r.confidence_label()))
                .unwrap_or_default();
            println!("  {:<16} {}", model.label(), cell);
        }
    }

    let summary = AgreementSummary::between(&rows, ModelVariant::ResNet18, ModelVariant::ResNet4);
    println!(
        "\nResNet18 vs ResNet4: {} agree / {} disagree\n",
        summary.agree, summary.disagree
    );

    export_all(&comparison_table(&rows), formats, output, export::COMPARISON_STEM)?;
    Ok(())
}

// ---- 切り出し ----

/// 切り出し（と予測）の結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CropOutcome {
    pub file_name: String,
    pub cropped_image: Option<String>,
    pub error: Option<String>,
    pub result: Option<PredictionResult>,
}

pub async fn crop_all(client: &PredictionClient, items: &[ImageItem]) -> Vec<CropOutcome> {
    run_batch(items, |_, item| async move {
        match client.crop_reflection(item).await {
            Ok(data_url) => CropOutcome {
                file_name: item.file_name.clone(),
                cropped_image: Some(data_url),
                ..Default::default()
            },
            Err(e) => {
                warn!(file = %item.file_name, error = %e, "cropping failed");
                CropOutcome {
                    file_name: item.file_name.clone(),
                    error: Some("Cropping failed".into()),
                    ..Default::default()
                }
            }
        }
    })
    .await
}

/// 切り出し済みの画像を `type=preprocessed` で予測
pub async fn predict_cropped(client: &PredictionClient, outcomes: &mut [CropOutcome]) {
    let params = PredictParams::with_type(ImageType::Preprocessed);
    let results = run_batch(&*outcomes, |_, outcome| async move {
        let Some(data_url) = outcome.cropped_image.as_deref() else {
            return None;
        };
        let item = match scanner::image_from_data_url(&outcome.file_name, data_url) {
            Ok(item) => item,
            Err(e) => {
                warn!(file = %outcome.file_name, error = %e, "cropped image undecodable");
                return Some(PredictionResult::failed());
            }
        };
        Some(client.predict_or_failed(&item, &params).await)
    })
    .await;
    for (outcome, result) in outcomes.iter_mut().zip(results) {
        if result.is_some() {
            outcome.result = result;
        }
    }
}

pub async fn crop(
    ctx: &Context,
    paths: &[PathBuf],
    with_predict: bool,
    with_zip: bool,
    output: Option<&Path>,
) -> Result<()> {
    println!("🍃 TeaVision - Crop & Predict\n");
    let batch = load_batch(paths)?;
    let items: Vec<ImageItem> = batch.items().into_iter().cloned().collect();
    let client = ctx.client()?;

    let mut outcomes = crop_all(&client, &items).await;
    let cropped = outcomes.iter().filter(|o| o.cropped_image.is_some()).count();
    println!("✔ Cropped {}/{} image(s)", cropped, outcomes.len());

    if with_predict {
        if cropped == 0 {
            println!("No cropped images to predict!");
        } else {
            predict_cropped(&client, &mut outcomes).await;
        }
    }

    for outcome in &outcomes {
        match (&outcome.error, &outcome.result) {
            (Some(error), _) => println!("  ❌ {}: {}", outcome.file_name, error),
            (None, Some(result)) => print_prediction(&outcome.file_name, result),
            (None, None) => println!("  ✔ {}", outcome.file_name),
        }
    }

    if with_zip {
        let images: Vec<CroppedImage> = outcomes
            .iter()
            .filter_map(|o| {
                Some(CroppedImage {
                    file_name: o.file_name.clone(),
                    data_url: o.cropped_image.clone()?,
                })
            })
            .collect();
        if images.is_empty() {
            println!("No cropped images available!");
        } else {
            let dir = output.unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)?;
            let path = dir.join(export::CROPPED_ZIP_NAME);
            let count = export::zip::generate_zip(&images, &path)?;
            println!("✔ ZIP saved: {} ({} images)", path.display(), count);
        }
    }
    Ok(())
}

// ---- ポリフェノール ----

/// "地域,グレード,吸光度,濃度" を解釈して表に追加
pub fn push_manual_row(table: &mut PolyphenolTable, line: &str) -> Result<()> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    let [region, grade, absorbance, concentration] = parts.as_slice() else {
        return Err(TeaVisionError::Common(teavision_common::Error::Validation(format!(
            "row must be \"region,grade,absorbance,concentration\": {}",
            line
        ))));
    };
    let number = |s: &str| -> Result<f64> {
        s.parse::<f64>().map_err(|_| {
            TeaVisionError::Common(teavision_common::Error::Validation(
                "Please enter valid Absorbance and Concentration values!".into(),
            ))
        })
    };
    if !region.is_empty() && !POLYPHENOL_REGIONS.contains(region) {
        debug!(%region, "region outside the preset list");
    }
    if !grade.is_empty() && !GRADES.contains(grade) {
        debug!(%grade, "grade outside the preset list");
    }
    table.push_manual(
        Some(region.to_string()),
        Some(grade.to_string()),
        number(*absorbance)?,
        number(*concentration)?,
    )?;
    Ok(())
}

/// 全行を1リクエストで予測。リクエスト自体が失敗したら全行失敗扱い
pub async fn predict_polyphenol_table(client: &PredictionClient, table: &mut PolyphenolTable) {
    let response = {
        let rows = table.rows();
        client.predict_polyphenol(&rows).await
    };
    match response {
        Ok(results) => {
            if let Err(e) = table.apply_results(results) {
                warn!(error = %e, "polyphenol results misaligned");
                table.mark_all_failed();
            }
        }
        Err(e) => {
            warn!(error = %e, "polyphenol prediction failed");
            table.mark_all_failed();
        }
    }
}

pub async fn polyphenol(
    ctx: &Context,
    csv: Option<&Path>,
    rows: &[String],
    formats: &[ExportFormat],
    output: Option<&Path>,
) -> Result<()> {
    println!("🍃 TeaVision - Polyphenol Based Predict\n");
    let mut table = PolyphenolTable::new();
    if let Some(path) = csv {
        let text = std::fs::read_to_string(path)
            .map_err(|_| TeaVisionError::FileNotFound(path.display().to_string()))?;
        table.replace(parse_polyphenol_csv(&text)?);
        println!("✔ Loaded {} row(s)", table.len());
    }
    for line in rows {
        push_manual_row(&mut table, line)?;
    }
    if table.is_empty() {
        println!("No data to predict!");
        return Ok(());
    }

    let client = ctx.client()?;
    predict_polyphenol_table(&client, &mut table).await;

    let report = polyphenol_table(&table);
    for row in &report.rows {
        println!("  {}", row.join(" | "));
    }
    println!();
    export_all(&report, formats, output, export::POLYPHENOL_STEM)?;
    Ok(())
}

// ---- 管理者 ----

pub fn settings(ctx: &mut Context, url: Option<String>, reset: bool) -> Result<()> {
    if reset {
        ctx.sessions.clear_backend_url()?;
        println!("✔ Backend URL reset: {}", ctx.endpoint());
        return Ok(());
    }
    let current = ctx.sessions.endpoint(&ctx.config.default_backend);
    let url = match url {
        Some(u) => u,
        None => dialoguer::Input::<String>::new()
            .with_prompt("Backend API URL")
            .default(current)
            .interact_text()?,
    };
    let saved = ctx.sessions.set_backend_url(&url)?;
    println!("✔ Saved: {}", saved);
    Ok(())
}

pub fn print_health(client: &PredictionClient, status: ConnectionStatus, health: Option<&teavision_common::HealthStatus>) {
    println!("{}  {}", status.label(), client.origin());
    if let Some(health) = health {
        println!("  {}", health.model_indicator().label());
        if let Some(message) = &health.message {
            println!("  {}", message);
        }
        if let Some(line) = health.resource_line() {
            println!("  {}", line);
        }
    }
}

pub async fn health(ctx: &Context, watch: bool, interval: u64) -> Result<()> {
    let client = ctx.client()?;
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval.max(1)));
    loop {
        ticker.tick().await;
        let (status, health) = client.check_connection().await;
        print_health(&client, status, health.as_ref());
        if !watch {
            return Ok(());
        }
    }
}

// ---- シェル ----

pub fn shell(ctx: &Context, url: Option<String>) -> Result<()> {
    let platform = TerminalPlatform::new(ctx.config.capture_command.clone());
    let start_url = url.unwrap_or_else(|| ctx.config.shell_url.clone());
    let mut host = ShellHost::new(platform, &start_url, &Config::cache_dir());

    if let Err(e) = host.start() {
        println!("⚠ {}", e);
    }

    let actions = ["Choose file", "Edit URL", "Reload", "Quit"];
    loop {
        if host.is_url_editor_visible() {
            let input: String = dialoguer::Input::new()
                .with_prompt("URL")
                .default(host.url().to_string())
                .interact_text()?;
            if let Err(e) = host.submit_url(&input) {
                println!("⚠ {}", e);
            }
            continue;
        }

        let choice = dialoguer::Select::new()
            .with_prompt(host.platform().current_url().unwrap_or(host.url()))
            .items(&actions)
            .default(0)
            .interact()?;
        match choice {
            0 => {
                host.on_show_file_chooser(Box::new(|path: Option<PathBuf>| match path {
                    Some(p) => println!("✔ Selected: {}", p.display()),
                    None => println!("- No file selected"),
                }))?;
                let outcome = host.platform_mut().run_chooser();
                if let Err(e) = host.complete_chooser(outcome) {
                    println!("⚠ {}", e);
                }
            }
            1 => host.toggle_url_editor(),
            2 => {
                let current = host.url().to_string();
                if let Err(e) = host.load(&current) {
                    println!("⚠ {}", e);
                }
            }
            _ => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_manual_row() {
        let mut table = PolyphenolTable::new();
        push_manual_row(&mut table, "Dimbula Region, OP, 0.53, 12.4").unwrap();
        push_manual_row(&mut table, ",,0.6,13").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[0].row.region.as_deref(), Some("Dimbula Region"));
        assert_eq!(table.entries()[1].row.region, None);
        assert_eq!(table.entries()[1].row.sample.as_deref(), Some("Sample-2"));

        assert!(push_manual_row(&mut table, "a,b,c").is_err());
        assert!(push_manual_row(&mut table, "a,b,x,1").is_err());
    }

    #[test]
    fn test_context_endpoint_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("storage.json"));
        let mut ctx = Context::new(Config::default(), store, None);
        assert_eq!(ctx.endpoint(), "http://localhost:5000");

        ctx.sessions.set_backend_url("http://10.0.0.5:5000/").unwrap();
        assert_eq!(ctx.endpoint(), "http://10.0.0.5:5000");
        assert_eq!(ctx.fallback().origins()[0], "http://10.0.0.5:5000");

        ctx.backend_override = Some("http://override:1/".into());
        assert_eq!(ctx.endpoint(), "http://override:1");
        assert_eq!(ctx.fallback().origins().len(), 1);
    }

    #[test]
    fn test_authorize() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("storage.json"));
        let mut config = Config::default();
        config.admin_email = Some("admin@tea.lk".into());
        let mut ctx = Context::new(config, store, None);

        assert!(matches!(ctx.authorize(Route::Multi), Err(TeaVisionError::NotSignedIn)));
        assert!(ctx.authorize(Route::Register).is_ok());

        ctx.sessions.register("user@tea.lk", "pw").unwrap();
        ctx.sessions.login("user@tea.lk", "pw").unwrap();
        assert!(ctx.authorize(Route::Multi).is_ok());
        assert!(matches!(ctx.authorize(Route::Super), Err(TeaVisionError::AccessDenied(_))));

        ctx.sessions.register("Admin@tea.lk", "pw").unwrap();
        ctx.sessions.login("Admin@tea.lk", "pw").unwrap();
        assert!(ctx.authorize(Route::Super).is_ok());
    }
}
