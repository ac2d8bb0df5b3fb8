//! CSVエクスポート

use std::path::PathBuf;

use chrono::{DateTime, Local};
use tracing::info;

use crate::error::ScraperError;
use crate::review::ReviewRecord;
use crate::traits::ReviewExporter;

/// `{subject}_{kind}_{timestamp}` 形式のファイル名（拡張子なし）
pub fn export_stem(subject: &str, kind: &str, at: DateTime<Local>) -> String {
    format!("{}_{}_{}", subject, kind, at.format("%Y%m%d_%H%M%S"))
}

/// 商品レビュー用のファイル名
pub fn review_filename(product_id: &str, at: DateTime<Local>) -> String {
    format!(
        "{}.csv",
        export_stem(&format!("amazon_book_{}", product_id), "reviews", at)
    )
}

/// 指定ディレクトリにCSVを書き出す
#[derive(Debug, Clone)]
pub struct CsvExporter {
    download_path: PathBuf,
}

impl CsvExporter {
    pub fn new(download_path: impl Into<PathBuf>) -> Self {
        Self {
            download_path: download_path.into(),
        }
    }
}

impl ReviewExporter for CsvExporter {
    fn export(&self, records: &[ReviewRecord], filename: &str) -> Result<PathBuf, ScraperError> {
        std::fs::create_dir_all(&self.download_path)?;
        let path = self.download_path.join(filename);

        let mut writer = csv::Writer::from_path(&path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!("Exported {} reviews to {:?}", records.len(), path);
        Ok(path)
    }
}
