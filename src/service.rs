use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::config::{FetchStrategy, ScraperConfig};
use crate::error::ScraperError;
use crate::pipeline::{ReviewPipeline, ReviewReport};

/// レビュー抽出リクエスト
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub product_id: String,
    pub strategy: Option<FetchStrategy>,
    pub download_path: Option<PathBuf>,
    pub export: Option<bool>,
}

impl ReviewRequest {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            strategy: None,
            download_path: None,
            export: None,
        }
    }

    pub fn with_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_download_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.download_path = Some(path.into());
        self
    }

    pub fn with_export(mut self, export: bool) -> Self {
        self.export = Some(export);
        self
    }

    /// 基本設定にリクエストの上書きを適用
    pub fn apply(&self, base: &ScraperConfig) -> ScraperConfig {
        let mut config = base.clone();
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(path) = &self.download_path {
            config.download_path = path.clone();
        }
        if let Some(export) = self.export {
            config.export = export;
        }
        config
    }
}

/// tower::Serviceを実装したレビュー抽出サービス
///
/// リクエストごとに独立したパイプライン（ブラウザセッションも別）を作る。
#[derive(Debug, Clone, Default)]
pub struct ReviewService {
    config: ScraperConfig,
}

impl ReviewService {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }
}

impl Service<ReviewRequest> for ReviewService {
    type Response = ReviewReport;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ReviewRequest) -> Self::Future {
        info!("レビュー抽出リクエスト受信: product_id={}", req.product_id);
        let config = req.apply(&self.config);

        Box::pin(async move {
            let pipeline = ReviewPipeline::from_config(&config)?;
            let report = pipeline.run(&req.product_id).await?;

            info!(
                "レビュー抽出完了: product_id={}, records={}, export={:?}",
                report.product_id,
                report.records.len(),
                report.export_path
            );

            Ok(report)
        })
    }
}
