use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ScraperError;

/// レビューページURLのテンプレート（`{id}` を商品IDで置換）
pub const DEFAULT_URL_TEMPLATE: &str = "https://www.amazon.com/product-reviews/{id}";

/// 実ブラウザに近い User-Agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// ページ取得方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    /// 単一のHTTP GET
    #[default]
    Static,
    /// ヘッドレスブラウザでJavaScriptを実行して取得
    Rendered,
}

impl FromStr for FetchStrategy {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" | "http" => Ok(FetchStrategy::Static),
            "rendered" | "browser" | "headless" => Ok(FetchStrategy::Rendered),
            other => Err(ScraperError::Validation(format!(
                "unknown fetch strategy: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStrategy::Static => f.write_str("static"),
            FetchStrategy::Rendered => f.write_str("rendered"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub strategy: FetchStrategy,
    pub url_template: String,
    pub user_agent: String,
    /// HTTP GET のタイムアウト
    pub timeout: Duration,
    /// レビュー要素の出現待ち上限（rendered のみ）
    pub render_wait: Duration,
    pub headless: bool,
    /// デバッグモード（CAPTCHA検出時にスクリーンショットをログ出力）
    pub debug: bool,
    /// Chrome 実行ファイル（未指定なら PATH から探索）
    pub chrome_path: Option<PathBuf>,
    pub download_path: PathBuf,
    pub export: bool,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_endpoint: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            strategy: FetchStrategy::Static,
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(15),
            render_wait: Duration::from_secs(15),
            headless: true,
            debug: false,
            chrome_path: None,
            download_path: PathBuf::from("./downloads"),
            export: true,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
        }
    }
}

impl ScraperConfig {
    pub fn new(strategy: FetchStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ScraperError> {
        let mut config = Self::default();

        if let Ok(strategy) = std::env::var("REVIEW_FETCH_STRATEGY") {
            config.strategy = strategy.parse()?;
        }
        if let Some(path) = std::env::var("CHROME_PATH")
            .or_else(|_| std::env::var("CHROMIUM_PATH"))
            .ok()
            .filter(|p| !p.is_empty())
        {
            config.chrome_path = Some(PathBuf::from(path));
        }
        if let Ok(dir) = std::env::var("REVIEW_EXPORT_DIR") {
            config.download_path = PathBuf::from(dir);
        }
        config.gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.gemini_model = model;
        }
        if let Ok(endpoint) = std::env::var("GEMINI_ENDPOINT") {
            config.gemini_endpoint = endpoint;
        }
        if let Ok(v) = std::env::var("REVIEW_HEADLESS") {
            config.headless = parse_flag(&v);
        }
        if let Ok(v) = std::env::var("REVIEW_DEBUG") {
            config.debug = parse_flag(&v);
        }

        Ok(config)
    }

    /// 商品IDを埋め込んだ取得先URL
    pub fn target_url(&self, product_id: &str) -> String {
        self.url_template.replace("{id}", product_id)
    }

    pub fn with_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    pub fn with_download_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.download_path = path.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_render_wait(mut self, wait: Duration) -> Self {
        self.render_wait = wait;
        self
    }

    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    pub fn with_export(mut self, export: bool) -> Self {
        self.export = export;
        self
    }

    pub fn with_gemini_api_key(mut self, key: impl Into<String>) -> Self {
        self.gemini_api_key = Some(key.into());
        self
    }

    pub fn with_gemini_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.gemini_endpoint = endpoint.into();
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScraperConfig::new(FetchStrategy::Rendered)
            .with_headless(false)
            .with_download_path("/tmp/reviews")
            .with_timeout(Duration::from_secs(10))
            .with_export(false);

        assert_eq!(config.strategy, FetchStrategy::Rendered);
        assert!(!config.headless);
        assert_eq!(config.download_path, PathBuf::from("/tmp/reviews"));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.render_wait, Duration::from_secs(15));
        assert!(!config.export);
    }

    #[test]
    fn test_target_url() {
        let config = ScraperConfig::default();
        assert_eq!(
            config.target_url("B0CW1LJXKN"),
            "https://www.amazon.com/product-reviews/B0CW1LJXKN"
        );

        let config = config.with_url_template("http://127.0.0.1:9000/reviews/{id}?page=1");
        assert_eq!(
            config.target_url("B0CW1LJXKN"),
            "http://127.0.0.1:9000/reviews/B0CW1LJXKN?page=1"
        );
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("static".parse::<FetchStrategy>().unwrap(), FetchStrategy::Static);
        assert_eq!(" Browser ".parse::<FetchStrategy>().unwrap(), FetchStrategy::Rendered);
        assert!("selenium".parse::<FetchStrategy>().is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
