use anyhow::{Context, Result};
use racetimes::{
    fetch::HttpPageSource,
    pipeline::{self, render_chart},
    RunConfig,
};
use reqwest::Client;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,racetimes=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // ─── 2) resolve configuration ────────────────────────────────────
    let config = RunConfig::from_env().context("loading run configuration")?;
    let base = config.source_url()?;
    info!(
        url = %base,
        max_pages = config.max_pages,
        cutoff_minutes = config.cutoff_minutes,
        "configured"
    );

    // ─── 3) collect, clean, summarise ────────────────────────────────
    let client = Client::builder()
        .cookie_store(true)
        .gzip(true)
        .build()
        .context("building HTTP client")?;
    let source = HttpPageSource::new(client, base);
    let report = pipeline::run(&source, &config).await?;

    // ─── 4) chart ────────────────────────────────────────────────────
    let chart = match render_chart(&report, &config) {
        Ok(path) => path,
        Err(e) => {
            error!("chart failed: {:#}", e);
            None
        }
    };

    // ─── 5) summary to stdout ────────────────────────────────────────
    let out = serde_json::json!({
        "race": report.race_name,
        "raw_rows": report.raw_rows,
        "cleaning": report.cleaning,
        "summary": report.summary,
        "target_percentile": report.target_percentile,
        "percentiles": report.curve,
        "chart": chart,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);

    info!("all done");
    Ok(())
}
