//! レビュー抽出モジュール
//!
//! 取得済みのレビューページからレビューを抽出・正規化する

mod extractor;
pub mod selectors;
mod types;

pub use extractor::{extract, normalize_rating, normalize_text, Extraction, ExtractionStatus};
pub use types::{ProductId, ReviewRecord, Sentiment, ANONYMOUS, NOT_AVAILABLE};
