//! レビュー関連の型定義

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ScraperError;

/// 作成者が取得できなかった場合の値
pub const ANONYMOUS: &str = "Anonymous";
/// 評価・日付が取得できなかった場合の値
pub const NOT_AVAILABLE: &str = "N/A";

static PRODUCT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{10}$").expect("valid product id pattern"));

/// 商品ID（ASIN、英大文字・数字10桁）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    /// 書式を検証してIDを作成（前後の空白も不可）
    pub fn parse(raw: &str) -> Result<Self, ScraperError> {
        if PRODUCT_ID_PATTERN.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ScraperError::Validation(format!(
                "invalid ASIN {:?}: expected 10 upper-case alphanumeric characters",
                raw
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProductId {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProductId {
    type Error = ScraperError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

/// 感情ラベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }

    /// モデル応答テキストからラベルを読み取る
    ///
    /// 完全一致（大文字小文字無視）を優先し、次に単語単位で最初に現れたラベルを採用する。
    /// どれにも該当しなければ `None`。
    pub fn from_model_text(text: &str) -> Option<Self> {
        let cleaned = text
            .trim()
            .trim_matches(|c: char| c == '\'' || c == '"' || c == '.' || c == '*');
        if let Some(exact) = Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(cleaned))
        {
            return Some(exact);
        }

        cleaned
            .split(|c: char| !c.is_ascii_alphabetic())
            .filter(|word| !word.is_empty())
            .find_map(|word| {
                Self::ALL
                    .into_iter()
                    .find(|s| s.as_str().eq_ignore_ascii_case(word))
            })
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 抽出したレビュー1件
///
/// 抽出時には `sentiment` は空で、パイプラインが一度だけ付与する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(rename = "Username")]
    pub author: String,
    #[serde(rename = "Comment")]
    pub body: String,
    #[serde(rename = "Rating")]
    pub rating: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "ASIN")]
    pub product_id: String,
    #[serde(rename = "Sentiment")]
    pub sentiment: Option<Sentiment>,
}

impl ReviewRecord {
    pub fn with_sentiment(self, sentiment: Sentiment) -> Self {
        Self {
            sentiment: Some(sentiment),
            ..self
        }
    }
}
