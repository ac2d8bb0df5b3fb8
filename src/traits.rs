use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::ScraperError;
use crate::fetch::FetchedPage;
use crate::report::DiagnosticLevel;
use crate::review::{ProductId, ReviewRecord, Sentiment};

/// レビューページの取得
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// ページを取得してガードチェック（CAPTCHA検出）まで行う
    async fn fetch(&self, product_id: &ProductId) -> Result<FetchedPage, ScraperError>;
}

/// 感情分類
#[async_trait]
pub trait SentimentLabeler: Send + Sync {
    /// テキストを分類（内部エラーはそのまま返す）
    async fn classify(&self, text: &str) -> Result<Sentiment, ScraperError>;

    /// 失敗時は Neutral を返す（呼び出し元にエラーを伝播しない）
    async fn label(&self, text: &str) -> Sentiment {
        self.classify(text).await.unwrap_or_default()
    }
}

/// 表形式エクスポート
pub trait ReviewExporter: Send + Sync {
    /// レコードを書き出して保存先を返す
    fn export(&self, records: &[ReviewRecord], filename: &str) -> Result<PathBuf, ScraperError>;
}

/// 進捗・警告メッセージの受け手（制御フローには影響しない）
pub trait ProgressReporter: Send + Sync {
    fn report(&self, level: DiagnosticLevel, message: &str);
}
