//! レビューページのCSSセレクタ
//!
//! マークアップ変更時はここを更新する。各チェーンは優先順に試行され、
//! 最初にヒットしたものだけが使われる。

use std::sync::LazyLock;

use scraper::Selector;

fn parse(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}

/// 優先順のセレクタ列
pub struct SelectorChain {
    pub name: &'static str,
    tiers: Vec<(&'static str, Selector)>,
}

impl SelectorChain {
    fn new(name: &'static str, css: &[&'static str]) -> Self {
        Self {
            name,
            tiers: css.iter().map(|c| (*c, parse(c))).collect(),
        }
    }

    pub fn tiers(&self) -> impl Iterator<Item = (usize, &'static str, &Selector)> {
        self.tiers
            .iter()
            .enumerate()
            .map(|(i, (css, sel))| (i, *css, sel))
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// 全段を1つにまとめたCSS（ブラウザ側の出現待ち用）
    pub fn combined_css(&self) -> String {
        self.tiers
            .iter()
            .map(|(css, _)| *css)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// レビュー要素の探索順
pub static FRAGMENT: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new(
        "review",
        &[
            r#"div[data-hook="review"]"#,
            r#"li[data-hook="review"]"#,
            "div.a-section.review, div.review",
        ],
    )
});

pub static AUTHOR: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new(
        "author",
        &["span.a-profile-name", "div.a-profile-content span"],
    )
});

pub static BODY: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new(
        "body",
        &[r#"span[data-hook="review-body"]"#, "div.review-text"],
    )
});

pub static RATING: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new(
        "rating",
        &[
            r#"i[data-hook="review-star-rating"] span.a-icon-alt"#,
            "i.review-rating span",
        ],
    )
});

pub static DATE: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new(
        "date",
        &[r#"span[data-hook="review-date"]"#, "span.review-date"],
    )
});

/// CAPTCHA（ボット検証）フォーム
pub static CAPTCHA_FORM: LazyLock<Selector> =
    LazyLock::new(|| parse(r#"form[action="/errors/validateCaptcha"]"#));

pub static TITLE: LazyLock<Selector> = LazyLock::new(|| parse("title"));
