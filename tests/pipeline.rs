use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use review_scraper::{
    CollectingReporter, DiagnosticLevel, ExtractionStatus, FetchStrategy, FetchedPage, PageFetcher,
    ProductId, ReviewPipeline, ScraperError, Sentiment, SentimentLabeler,
};

const REVIEW_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Amazon.com: Customer reviews: Example Book</title></head>
<body>
  <div id="cm_cr-review_list">
    <div data-hook="review" id="R1">
      <div class="a-profile-content"><span class="a-profile-name">Jane   Reader</span></div>
      <span data-hook="review-date">Reviewed in the United States on March 3, 2024</span>
      <span data-hook="review-body">
        <span>  great   book

         really</span>
      </span>
    </div>
    <div data-hook="review" id="R2">
      <span class="a-profile-name">Sam</span>
      <i data-hook="review-star-rating"><span class="a-icon-alt">2.0 out of 5 stars</span></i>
      <span data-hook="review-body"><span>Pages fell out after a week.</span></span>
    </div>
    <div data-hook="review" id="R3">
      <span class="a-profile-name">Kim</span>
      <i data-hook="review-star-rating"><span class="a-icon-alt">4.5 out of 5 stars</span></i>
      <span data-hook="review-date">Reviewed in Canada on January 9, 2024</span>
      <span data-hook="review-body"><span>It was fine.</span></span>
    </div>
  </div>
</body>
</html>"#;

struct MockFetcher {
    html: &'static str,
    calls: AtomicUsize,
}

impl MockFetcher {
    fn new(html: &'static str) -> Arc<Self> {
        Arc::new(Self {
            html,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, product_id: &ProductId) -> Result<FetchedPage, ScraperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        FetchedPage::inspect(
            format!("https://www.amazon.com/product-reviews/{}", product_id),
            FetchStrategy::Static,
            Some(200),
            self.html.to_string(),
        )
    }
}

/// 本文のキーワードで決め打ちするラベラー
struct KeywordLabeler;

#[async_trait]
impl SentimentLabeler for KeywordLabeler {
    async fn classify(&self, text: &str) -> Result<Sentiment, ScraperError> {
        Ok(if text.contains("great") {
            Sentiment::Positive
        } else if text.contains("fell out") {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        })
    }
}

#[tokio::test]
async fn test_end_to_end_three_fragments() {
    let fetcher = MockFetcher::new(REVIEW_PAGE);
    let reporter = Arc::new(CollectingReporter::new());
    let pipeline =
        ReviewPipeline::new(fetcher.clone(), Arc::new(KeywordLabeler)).with_reporter(reporter.clone());

    let report = pipeline.run("B0CW1LJXKN").await.unwrap();

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(report.status, ExtractionStatus::Found(3));
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.degraded_labels, 0);
    assert!(report.export_path.is_none());

    // 評価なし
    let first = &report.records[0];
    assert_eq!(first.author, "Jane Reader");
    assert_eq!(first.body, "great book really");
    assert_eq!(first.rating, "N/A");
    assert_eq!(first.date, "Reviewed in the United States on March 3, 2024");
    assert_eq!(first.sentiment, Some(Sentiment::Positive));

    // 日付なし
    let second = &report.records[1];
    assert_eq!(second.rating, "2.0");
    assert_eq!(second.date, "N/A");
    assert_eq!(second.sentiment, Some(Sentiment::Negative));

    // 全項目あり
    let third = &report.records[2];
    assert_eq!(third.author, "Kim");
    assert_eq!(third.rating, "4.5");
    assert_eq!(third.date, "Reviewed in Canada on January 9, 2024");
    assert_eq!(third.sentiment, Some(Sentiment::Neutral));

    for record in &report.records {
        assert_eq!(record.product_id, "B0CW1LJXKN");
        assert!(Sentiment::ALL.contains(&record.sentiment.unwrap()));
    }

    assert_eq!(
        report.page.title.as_deref(),
        Some("Amazon.com: Customer reviews: Example Book")
    );
    assert_eq!(reporter.messages(DiagnosticLevel::Success), ["Found 3 reviews."]);
}

#[tokio::test]
async fn test_invalid_identifiers_never_fetch() {
    let fetcher = MockFetcher::new(REVIEW_PAGE);
    let pipeline = ReviewPipeline::new(fetcher.clone(), Arc::new(KeywordLabeler));

    for raw in [
        "B0CW1LJXK", "b0cw1ljxkn", "B0CW1LJXKN!", "ASIN B0CW1", "１２３４５６７８９０",
        " B0CW1LJXKN", "B0CW1LJXKN\n", "\tB0CW1LJXKN ",
    ] {
        let err = pipeline.run(raw).await.unwrap_err();
        assert_eq!(err.kind(), "ValidationError", "{raw}");
    }
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_captcha_blocks_extraction() {
    const CAPTCHA_PAGE: &str = r#"<html><head><title>Amazon.com</title></head><body>
        <h4>Enter the characters you see below</h4>
        <form method="get" action="/errors/validateCaptcha" name="">
            <input type="text" id="captchacharacters" name="field-keywords">
        </form></body></html>"#;

    let fetcher = MockFetcher::new(CAPTCHA_PAGE);
    let pipeline = ReviewPipeline::new(fetcher.clone(), Arc::new(KeywordLabeler));

    let err = pipeline.run("B0CW1LJXKN").await.unwrap_err();
    assert!(matches!(err, ScraperError::Blocked { .. }));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fallback_tier_used_alone() {
    const LEGACY_PAGE: &str = r#"<html><head><title>Reviews</title></head><body>
        <div class="a-section review">
            <span class="a-profile-name">Old Layout</span>
            <i class="review-rating"><span>5.0 out of 5 stars</span></i>
            <span class="review-date">May 1, 2019</span>
            <div class="review-text">Classic markup still works.</div>
        </div>
        <div class="review"><div class="review-text">Second legacy review</div></div>
    </body></html>"#;

    let pipeline = ReviewPipeline::new(MockFetcher::new(LEGACY_PAGE), Arc::new(KeywordLabeler));
    let report = pipeline.run("0123456789").await.unwrap();

    assert_eq!(report.status, ExtractionStatus::Found(2));
    assert_eq!(report.records[0].author, "Old Layout");
    assert_eq!(report.records[0].rating, "5.0");
    assert_eq!(report.records[0].date, "May 1, 2019");
    assert_eq!(report.records[1].author, "Anonymous");
}
