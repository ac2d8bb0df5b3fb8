use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use review_scraper::{FetchStrategy, ReviewPipeline, ReviewReport, ScraperConfig, ScraperError};

/// 入力不正（通信前に中止）の終了コード
const EXIT_USAGE: u8 = 2;

#[derive(Parser)]
#[command(name = "review-scraper", about = "Extract product reviews by ASIN and export them to CSV")]
struct Cli {
    /// 10-character ASIN (e.g. B0CW1LJXKN)
    asin: String,

    /// Render the page in headless Chrome instead of a plain HTTP request
    #[arg(long)]
    rendered: bool,

    /// Show the browser window (rendered mode only)
    #[arg(long)]
    headed: bool,

    /// Directory for the exported CSV
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Skip writing the CSV file
    #[arg(long)]
    no_export: bool,
}

/// エラーに対応する終了コード
fn failure_code(e: &ScraperError) -> u8 {
    if e.is_pre_flight() {
        EXIT_USAGE
    } else {
        1
    }
}

fn print_report(report: &ReviewReport) {
    println!();
    println!("=== Reviews for ASIN {} ===", report.product_id);
    println!(
        "Page: {} ({} bytes, title: {})",
        report.page.url,
        report.page.bytes,
        report.page.title.as_deref().unwrap_or("No title found")
    );
    println!("{}", report.status.message());

    for (i, record) in report.records.iter().enumerate() {
        let sentiment = record
            .sentiment
            .map(|s| s.to_string())
            .unwrap_or_default();
        println!(
            "{:>3}. [{}] {} | {} | {}",
            i + 1,
            record.rating,
            record.author,
            record.date,
            sentiment
        );
        println!("     {}", record.body);
    }

    if let Some(path) = &report.export_path {
        println!();
        println!("CSV saved: {}", path.display());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // .envがあれば読み込む
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ScraperConfig::from_env()?;
    if cli.rendered {
        config = config.with_strategy(FetchStrategy::Rendered);
    }
    if cli.headed {
        config = config.with_headless(false);
    }
    if let Some(dir) = cli.export_dir {
        config = config.with_download_path(dir);
    }
    if cli.no_export {
        config = config.with_export(false);
    }

    let pipeline = ReviewPipeline::from_config(&config)?;

    match pipeline.run(&cli.asin).await {
        Ok(report) => {
            print_report(&report);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("エラー: {}", e);
            if let Some(hint) = e.remediation() {
                eprintln!("{}", hint);
            }
            if e.is_pre_flight() {
                eprintln!("No request was sent. Usage: review-scraper <ASIN>");
            }
            Ok(ExitCode::from(failure_code(&e)))
        }
    }
}
