//! ページ取得モジュール
//!
//! - `StaticFetcher`: reqwest による単一GET
//! - `RenderedFetcher`: chromiumoxide でヘッドレスChromeを起動して取得
//!
//! どちらも取得後に CAPTCHA 検出とタイトル取得のガードチェックを行う。

mod browser;
mod http;

use std::sync::Arc;

use scraper::Html;
use tracing::{debug, warn};

use crate::config::{FetchStrategy, ScraperConfig};
use crate::error::ScraperError;
use crate::review::selectors;
use crate::traits::PageFetcher;

pub use browser::{resolve_chrome, BrowserSession, RenderedFetcher};
pub use http::StaticFetcher;

/// 取得済みページと診断情報
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub strategy: FetchStrategy,
    /// HTTPステータス（ブラウザ取得時は不明）
    pub status: Option<u16>,
    pub bytes: usize,
    pub title: Option<String>,
    pub html: String,
}

impl FetchedPage {
    /// ガードチェックを通してページを作成
    ///
    /// CAPTCHAフォームがあれば `Blocked` を返す。タイトルが空でもエラーにはしない。
    pub fn inspect(
        url: impl Into<String>,
        strategy: FetchStrategy,
        status: Option<u16>,
        html: String,
    ) -> Result<Self, ScraperError> {
        let url = url.into();
        let document = Html::parse_document(&html);

        if document.select(&selectors::CAPTCHA_FORM).next().is_some() {
            warn!("CAPTCHA form detected at {}", url);
            return Err(ScraperError::Blocked { url });
        }

        let title = document
            .select(&selectors::TITLE)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());
        if title.is_none() {
            warn!("No page title found at {}", url);
        }

        debug!(
            "Fetched page: url={}, status={:?}, bytes={}, title={:?}",
            url,
            status,
            html.len(),
            title
        );

        Ok(Self {
            url,
            strategy,
            status,
            bytes: html.len(),
            title,
            html,
        })
    }

    /// 抽出用にHTMLを解析
    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// 設定に応じた取得方式を作成
pub fn fetcher_for(config: &ScraperConfig) -> Result<Arc<dyn PageFetcher>, ScraperError> {
    Ok(match config.strategy {
        FetchStrategy::Static => Arc::new(StaticFetcher::new(config.clone())?),
        FetchStrategy::Rendered => Arc::new(RenderedFetcher::new(config.clone())),
    })
}
