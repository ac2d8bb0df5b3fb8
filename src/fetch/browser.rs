use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::{FetchStrategy, ScraperConfig};
use crate::error::ScraperError;
use crate::review::{selectors, ProductId};
use crate::traits::PageFetcher;

use super::FetchedPage;

/// PATH 上で探す Chrome 実行ファイル名
const CHROME_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// レビュー要素の出現確認間隔（ミリ秒）
const FRAGMENT_POLL_INTERVAL_MS: u64 = 500;

/// Chrome 実行ファイルを解決する
///
/// 設定値（`CHROME_PATH`）を優先し、無ければ PATH から探す。
pub fn resolve_chrome(config: &ScraperConfig) -> Result<PathBuf, ScraperError> {
    if let Some(path) = &config.chrome_path {
        if path.is_file() {
            return Ok(path.clone());
        }
        return which::which(path).map_err(|_| {
            ScraperError::Environment(format!("Chrome not found at {}", path.display()))
        });
    }

    CHROME_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or_else(|| {
            ScraperError::Environment(format!(
                "Google Chrome is not installed (looked for {})",
                CHROME_CANDIDATES.join(", ")
            ))
        })
}

/// 1回の取得専用のブラウザセッション
///
/// `launch` で確保し、必ず `close` で解放する。
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: PathBuf,
}

impl BrowserSession {
    pub async fn launch(config: &ScraperConfig, chrome: &Path) -> Result<Self, ScraperError> {
        info!("Launching browser: {}", chrome.display());

        // セッションごとに独立したユーザーデータディレクトリ
        let unique_id = format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let user_data_dir = std::env::temp_dir().join(format!("review-scraper-{}", unique_id));

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome)
            .user_data_dir(&user_data_dir)
            .window_size(1280, 800);

        if !config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .no_sandbox()
            .request_timeout(config.timeout.max(Duration::from_secs(30)))
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--user-agent={}", config.user_agent));

        if config.debug {
            builder = builder.arg("--enable-logging=stderr").arg("--v=1");
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(format!("ブラウザ設定エラー: {}", e)))?;

        let (browser, mut handler) = match Browser::launch(browser_config).await {
            Ok(pair) => pair,
            Err(e) => {
                remove_user_data_dir(&user_data_dir);
                return Err(ScraperError::BrowserInit(e.to_string()));
            }
        };

        // ブラウザイベントハンドラをバックグラウンドで実行
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
        });

        info!("Browser session started");
        Ok(Self {
            browser,
            handler,
            user_data_dir,
        })
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// ブラウザを終了してリソースを解放（エラーはログのみ）
    pub async fn close(mut self) {
        info!("Closing browser session...");

        if let Err(e) = self.browser.close().await {
            debug!("Browser close failed: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Browser wait failed: {}", e);
        }
        self.handler.abort();
        remove_user_data_dir(&self.user_data_dir);

        info!("Browser session closed");
    }
}

fn remove_user_data_dir(dir: &Path) {
    if dir.exists() {
        if let Err(e) = std::fs::remove_dir_all(dir) {
            debug!("Failed to remove {:?}: {}", dir, e);
        }
    }
}

/// ヘッドレスChromeでページを描画して取得する
pub struct RenderedFetcher {
    config: ScraperConfig,
}

impl RenderedFetcher {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    /// レビュー要素が現れるまで待機（見つからなくても続行）
    async fn wait_for_fragments(&self, page: &Page) -> bool {
        let css = selectors::FRAGMENT.combined_css();
        let start = Instant::now();

        loop {
            // CDP 呼び出し1回でも残り時間を超えない
            let remaining = self.config.render_wait.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return false;
            }
            match timeout(remaining, page.find_element(css.as_str())).await {
                Ok(Ok(_)) => {
                    info!("Review elements present after {:?}", start.elapsed());
                    return true;
                }
                Ok(Err(e)) => debug!("Review elements not yet present: {}", e),
                Err(_) => return false,
            }
            let remaining = self.config.render_wait.saturating_sub(start.elapsed());
            sleep(remaining.min(Duration::from_millis(FRAGMENT_POLL_INTERVAL_MS))).await;
        }
    }

    async fn render(&self, session: &BrowserSession, url: &str) -> Result<FetchedPage, ScraperError> {
        let page = session
            .browser()
            .new_page(url)
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;

        if !self.wait_for_fragments(&page).await {
            warn!(
                "Reviews not loaded within {}s. Checking for CAPTCHA or no reviews.",
                self.config.render_wait.as_secs()
            );
        }

        let html = page
            .content()
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;

        let result = FetchedPage::inspect(url, FetchStrategy::Rendered, None, html);

        // デバッグスクリーンショット
        if self.config.debug && matches!(result, Err(ScraperError::Blocked { .. })) {
            if let Ok(screenshot) = page
                .screenshot(ScreenshotParams::builder().full_page(true).build())
                .await
            {
                use base64::Engine;
                let encoded = base64::engine::general_purpose::STANDARD.encode(&screenshot);
                debug!("CAPTCHA screenshot: data:image/png;base64,{}", encoded);
            }
        }

        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }

        result
    }
}

#[async_trait]
impl PageFetcher for RenderedFetcher {
    async fn fetch(&self, product_id: &ProductId) -> Result<FetchedPage, ScraperError> {
        let chrome = resolve_chrome(&self.config)?;
        let url = self.config.target_url(product_id.as_str());
        info!("Fetching {} via headless browser", url);

        let session = BrowserSession::launch(&self.config, &chrome).await?;
        let result = self.render(&session, &url).await;
        session.close().await;

        result
    }
}
