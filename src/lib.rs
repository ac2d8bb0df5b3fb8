//! 商品レビュー抽出ライブラリ
//!
//! - 商品ページ（レビュー一覧）をHTTPまたはヘッドレスChromeで取得
//! - レビュー要素を優先順のセレクタで探して正規化
//! - Gemini で感情分類し、CSVに書き出す
//!
//! # 使用例
//!
//! ```rust,ignore
//! use review_scraper::{FetchStrategy, ReviewRequest, ReviewService, ScraperConfig};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ScraperConfig::from_env().unwrap();
//!     let mut service = ReviewService::new(config);
//!
//!     let request = ReviewRequest::new("B0CW1LJXKN")
//!         .with_strategy(FetchStrategy::Rendered)
//!         .with_download_path("./downloads");
//!
//!     let report = service.call(request).await.unwrap();
//!     println!("reviews: {}", report.records.len());
//! }
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod pipeline;
pub mod report;
pub mod review;
pub mod sentiment;
pub mod service;
pub mod traits;

// 主要な型をリエクスポート
pub use config::{FetchStrategy, ScraperConfig};
pub use error::{NetworkError, ScraperError};
pub use export::CsvExporter;
pub use fetch::{FetchedPage, RenderedFetcher, StaticFetcher};
pub use pipeline::{PageSummary, ReviewPipeline, ReviewReport};
pub use report::{CollectingReporter, DiagnosticLevel, TracingReporter};
pub use review::{ExtractionStatus, ProductId, ReviewRecord, Sentiment};
pub use sentiment::{GeminiLabeler, NeutralLabeler};
pub use service::{ReviewRequest, ReviewService};
pub use traits::{PageFetcher, ProgressReporter, ReviewExporter, SentimentLabeler};
