//! レビュー抽出
//!
//! 解析済みHTMLからレビュー要素を探し、項目ごとに独立したフォールバックで
//! [`ReviewRecord`] へ正規化する。

use scraper::{ElementRef, Html};
use tracing::{debug, info};

use super::selectors::{self, SelectorChain};
use super::types::{ProductId, ReviewRecord, ANONYMOUS, NOT_AVAILABLE};

/// 抽出結果の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStatus {
    /// 1件以上のレビューを取得
    Found(usize),
    /// どのセレクタ段でもレビュー要素が見つからない
    NoFragments,
    /// 要素はあったが本文を持つものが無い
    NoValidBodies { fragments: usize },
}

impl ExtractionStatus {
    pub fn is_empty(&self) -> bool {
        !matches!(self, ExtractionStatus::Found(_))
    }

    /// 利用者向けメッセージ
    pub fn message(&self) -> String {
        match self {
            ExtractionStatus::Found(n) => format!("Found {} reviews.", n),
            ExtractionStatus::NoFragments => {
                "No review elements found with any selector. The page layout may have changed or the product has no reviews.".to_string()
            }
            ExtractionStatus::NoValidBodies { fragments } => format!(
                "Found {} review elements but none had review text. Possible reasons: page requires further interaction or body markup changed.",
                fragments
            ),
        }
    }
}

/// 1ページ分の抽出結果
#[derive(Debug, Clone)]
pub struct Extraction {
    pub records: Vec<ReviewRecord>,
    /// 採用したセレクタ段（0始まり）
    pub tier: Option<usize>,
    pub fragments: usize,
}

impl Extraction {
    pub fn status(&self) -> ExtractionStatus {
        match (self.fragments, self.records.len()) {
            (0, _) => ExtractionStatus::NoFragments,
            (fragments, 0) => ExtractionStatus::NoValidBodies { fragments },
            (_, n) => ExtractionStatus::Found(n),
        }
    }
}

/// 連続する空白（改行含む）を1つのスペースにまとめ、前後を除去
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// "4.5 out of 5 stars" → "4.5"
pub fn normalize_rating(text: &str) -> Option<String> {
    text.split_whitespace().next().map(str::to_string)
}

/// 最初にヒットした段の要素だけを返す（段をまたいだ結合はしない）
fn discover_fragments(document: &Html) -> (Option<usize>, Vec<ElementRef<'_>>) {
    for (tier, css, selector) in selectors::FRAGMENT.tiers() {
        let found: Vec<ElementRef<'_>> = document.select(selector).collect();
        if !found.is_empty() {
            debug!("Selector tier {} ({}) matched {} fragments", tier, css, found.len());
            return (Some(tier), found);
        }
        debug!("Selector tier {} ({}) matched nothing", tier, css);
    }
    (None, Vec::new())
}

/// 要素内で最初に空でないテキストを返すフィールド探索
fn field_text(fragment: &ElementRef<'_>, chain: &SelectorChain) -> Option<String> {
    chain.tiers().find_map(|(_, _, selector)| {
        fragment
            .select(selector)
            .map(|el| normalize_text(&el.text().collect::<String>()))
            .find(|text| !text.is_empty())
    })
}

fn record_from_fragment(fragment: &ElementRef<'_>, product_id: &ProductId) -> Option<ReviewRecord> {
    let body = field_text(fragment, &selectors::BODY)?;

    let author = field_text(fragment, &selectors::AUTHOR).unwrap_or_else(|| ANONYMOUS.to_string());
    let rating = field_text(fragment, &selectors::RATING)
        .and_then(|r| normalize_rating(&r))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let date = field_text(fragment, &selectors::DATE).unwrap_or_else(|| NOT_AVAILABLE.to_string());

    Some(ReviewRecord {
        author,
        body,
        rating,
        date,
        product_id: product_id.to_string(),
        sentiment: None,
    })
}

/// ドキュメントからレビューを抽出
pub fn extract(document: &Html, product_id: &ProductId) -> Extraction {
    let (tier, fragments) = discover_fragments(document);

    let records: Vec<ReviewRecord> = fragments
        .iter()
        .filter_map(|fragment| {
            let record = record_from_fragment(fragment, product_id);
            if record.is_none() {
                debug!("Skipping fragment without review text");
            }
            record
        })
        .collect();

    let extraction = Extraction {
        records,
        tier,
        fragments: fragments.len(),
    };

    info!(
        "Extracted {} records from {} fragments (tier={:?}) for {}",
        extraction.records.len(),
        extraction.fragments,
        extraction.tier,
        product_id
    );

    extraction
}
