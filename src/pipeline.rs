//! レビュー抽出パイプライン
//!
//! 商品ID検証 → 取得 → 抽出 → 感情分類 → エクスポート を順番に実行する。
//! 失敗はすべてこの境界で診断メッセージに変換してから `Err` として返す。

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tracing::info;

use crate::config::{FetchStrategy, ScraperConfig};
use crate::error::ScraperError;
use crate::export::{review_filename, CsvExporter};
use crate::fetch::{self, FetchedPage};
use crate::report::{DiagnosticLevel, TracingReporter};
use crate::review::{self, ExtractionStatus, ProductId, ReviewRecord};
use crate::sentiment::{GeminiLabeler, NeutralLabeler};
use crate::traits::{PageFetcher, ProgressReporter, ReviewExporter, SentimentLabeler};

/// 取得ページの診断情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub url: String,
    pub strategy: FetchStrategy,
    pub status: Option<u16>,
    pub bytes: usize,
    pub title: Option<String>,
}

impl From<&FetchedPage> for PageSummary {
    fn from(page: &FetchedPage) -> Self {
        Self {
            url: page.url.clone(),
            strategy: page.strategy,
            status: page.status,
            bytes: page.bytes,
            title: page.title.clone(),
        }
    }
}

/// 1回の実行結果
#[derive(Debug, Clone)]
pub struct ReviewReport {
    pub product_id: ProductId,
    pub page: PageSummary,
    pub status: ExtractionStatus,
    pub records: Vec<ReviewRecord>,
    /// 感情分類に失敗して Neutral にしたレコード数
    pub degraded_labels: usize,
    pub export_path: Option<PathBuf>,
}

pub struct ReviewPipeline {
    fetcher: Arc<dyn PageFetcher>,
    labeler: Arc<dyn SentimentLabeler>,
    exporter: Option<Arc<dyn ReviewExporter>>,
    reporter: Arc<dyn ProgressReporter>,
}

impl ReviewPipeline {
    /// 設定から標準の構成を作る
    pub fn from_config(config: &ScraperConfig) -> Result<Self, ScraperError> {
        let reporter: Arc<dyn ProgressReporter> = Arc::new(TracingReporter);
        let labeler: Arc<dyn SentimentLabeler> = match GeminiLabeler::from_config(config)? {
            Some(gemini) => Arc::new(gemini),
            None => {
                reporter.report(
                    DiagnosticLevel::Warning,
                    "GEMINI_API_KEY is not set; every review will be labeled Neutral.",
                );
                Arc::new(NeutralLabeler)
            }
        };
        let exporter: Option<Arc<dyn ReviewExporter>> = if config.export {
            Some(Arc::new(CsvExporter::new(&config.download_path)))
        } else {
            None
        };

        Ok(Self {
            fetcher: fetch::fetcher_for(config)?,
            labeler,
            exporter,
            reporter,
        })
    }

    /// 任意の構成で作る（エクスポートなし・tracing 出力）
    pub fn new(fetcher: Arc<dyn PageFetcher>, labeler: Arc<dyn SentimentLabeler>) -> Self {
        Self {
            fetcher,
            labeler,
            exporter: None,
            reporter: Arc::new(TracingReporter),
        }
    }

    pub fn with_exporter(mut self, exporter: Arc<dyn ReviewExporter>) -> Self {
        self.exporter = Some(exporter);
        self
    }

    pub fn without_exporter(mut self) -> Self {
        self.exporter = None;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// パイプラインを実行
    pub async fn run(&self, raw_product_id: &str) -> Result<ReviewReport, ScraperError> {
        let result = self.run_inner(raw_product_id).await;
        if let Err(e) = &result {
            self.reporter.report(
                DiagnosticLevel::Error,
                &format!("{} ({})", e, e.kind()),
            );
            if let Some(hint) = e.remediation() {
                self.reporter.report(DiagnosticLevel::Error, hint);
            }
        }
        result
    }

    async fn run_inner(&self, raw_product_id: &str) -> Result<ReviewReport, ScraperError> {
        let product_id = ProductId::parse(raw_product_id)?;

        self.reporter.report(
            DiagnosticLevel::Progress,
            &format!("Extracting reviews for ASIN {}...", product_id),
        );
        let page = self.fetcher.fetch(&product_id).await?;
        let summary = PageSummary::from(&page);
        self.report_page(&summary);

        // Html は Send ではないので await をまたがない
        let extraction = {
            let document = page.document();
            review::extract(&document, &product_id)
        };
        drop(page);

        let status = extraction.status();
        let level = if status.is_empty() {
            DiagnosticLevel::Warning
        } else {
            DiagnosticLevel::Success
        };
        self.reporter.report(level, &status.message());

        let (records, degraded_labels) = self.label_records(extraction.records).await;

        let export_path = match (&self.exporter, records.is_empty()) {
            (Some(exporter), false) => {
                let filename = review_filename(product_id.as_str(), Local::now());
                // 書き出し失敗でも抽出結果は返す
                match exporter.export(&records, &filename) {
                    Ok(path) => {
                        self.reporter.report(
                            DiagnosticLevel::Success,
                            &format!("Exported reviews to {}", path.display()),
                        );
                        Some(path)
                    }
                    Err(e) => {
                        self.reporter.report(
                            DiagnosticLevel::Error,
                            &format!("Failed to export reviews: {} ({})", e, e.kind()),
                        );
                        None
                    }
                }
            }
            _ => None,
        };

        info!(
            "Pipeline finished for {}: {} records, {} degraded labels",
            product_id,
            records.len(),
            degraded_labels
        );

        Ok(ReviewReport {
            product_id,
            page: summary,
            status,
            records,
            degraded_labels,
            export_path,
        })
    }

    fn report_page(&self, page: &PageSummary) {
        self.reporter.report(
            DiagnosticLevel::Progress,
            &format!("Scraping URL: {}", page.url),
        );
        let status = page
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "n/a".to_string());
        self.reporter.report(
            DiagnosticLevel::Progress,
            &format!(
                "Fetched {} bytes via {} strategy (status {})",
                page.bytes, page.strategy, status
            ),
        );
        match &page.title {
            Some(title) => self
                .reporter
                .report(DiagnosticLevel::Progress, &format!("Page title: {}", title)),
            None => self
                .reporter
                .report(DiagnosticLevel::Warning, "Page title: No title found"),
        }
    }

    /// 1件ずつ順番に分類。失敗したものは Neutral にして警告のみ出す
    async fn label_records(&self, records: Vec<ReviewRecord>) -> (Vec<ReviewRecord>, usize) {
        let mut labeled = Vec::with_capacity(records.len());
        let mut degraded = 0;

        for record in records {
            let sentiment = match self.labeler.classify(&record.body).await {
                Ok(sentiment) => sentiment,
                Err(e) => {
                    degraded += 1;
                    self.reporter.report(
                        DiagnosticLevel::Warning,
                        &format!("Error analyzing sentiment: {}", e),
                    );
                    Default::default()
                }
            };
            labeled.push(record.with_sentiment(sentiment));
        }

        (labeled, degraded)
    }
}
