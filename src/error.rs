use thiserror::Error;

/// 通信レイヤーのエラー
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("HTTPステータス異常: {status} ({url})")]
    Status { status: u16, url: String },

    #[error("通信エラー: {0}")]
    Transport(String),

    #[error("タイムアウト: {0}")]
    Timeout(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return NetworkError::Timeout(e.to_string());
        }
        match e.status() {
            Some(status) => NetworkError::Status {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None => NetworkError::Transport(e.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("入力値エラー: {0}")]
    Validation(String),

    #[error("実行環境エラー: {0}")]
    Environment(String),

    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("ネットワークエラー: {0}")]
    Network(#[from] NetworkError),

    #[error("アクセスがブロックされました (CAPTCHA): {url}")]
    Blocked { url: String },

    #[error("感情分析エラー: {0}")]
    Labeling(String),

    #[error("エクスポートエラー: {0}")]
    Export(String),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),
}

impl ScraperError {
    /// エラー分類名
    pub fn kind(&self) -> &'static str {
        match self {
            ScraperError::Validation(_) => "ValidationError",
            ScraperError::Environment(_) | ScraperError::BrowserInit(_) => "EnvironmentError",
            ScraperError::Navigation(_) | ScraperError::Network(_) => "NetworkError",
            ScraperError::Blocked { .. } => "BlockedError",
            ScraperError::Labeling(_) => "LabelingDegraded",
            ScraperError::Export(_) | ScraperError::FileIO(_) => "ExportError",
        }
    }

    /// ユーザー向けの対処方法
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            ScraperError::Validation(_) => Some("Please enter a valid 10-character ASIN."),
            ScraperError::Environment(_) => Some(
                "Install Google Chrome (e.g. apt-get install -y google-chrome-stable) or set CHROME_PATH.",
            ),
            ScraperError::Blocked { .. } => Some(
                "Amazon is blocking the request. Try manually visiting the URL or use a proxy.",
            ),
            _ => None,
        }
    }

    /// ネットワーク到達前に検出されたか
    pub fn is_pre_flight(&self) -> bool {
        matches!(self, ScraperError::Validation(_))
    }
}

impl From<csv::Error> for ScraperError {
    fn from(e: csv::Error) -> Self {
        ScraperError::Export(e.to_string())
    }
}
