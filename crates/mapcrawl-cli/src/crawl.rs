//! `crawl` and `targets` command handlers.

use anyhow::Context;
use mapcrawl_core::{AppConfig, LatLng, Targets};
use mapcrawl_crawl::{Accumulator, CrawlController, CrawlSettings, LogReporter, RunState};
use mapcrawl_gemini::GeminiClient;
use mapcrawl_store::JsonSlot;

fn load_targets(config: &AppConfig) -> anyhow::Result<Targets> {
    mapcrawl_core::load_targets(&config.targets_path)
        .with_context(|| format!("loading targets from {}", config.targets_path.display()))
}

/// Run one full traversal against the Gemini backend.
///
/// Records already in the backup slot are restored first, so an interrupted
/// crawl continues to grow the same collection. Ctrl-C requests a stop; the
/// controller finishes at its next checkpoint and the run ends normally.
///
/// # Errors
///
/// Returns an error if the API key is missing, the targets file is invalid,
/// the client cannot be built, or the backend fails with a non-quota error.
pub(crate) async fn run_crawl(config: &AppConfig, location: Option<LatLng>) -> anyhow::Result<()> {
    let api_key = config
        .require_gemini_api_key()
        .context("cannot run crawl")?;
    let targets = load_targets(config)?;

    let client = GeminiClient::with_base_url(
        api_key,
        &config.gemini_model,
        config.request_timeout_secs,
        &config.gemini_base_url,
    )
    .map_err(|e| anyhow::anyhow!("failed to build Gemini client: {e}"))?;

    let accumulator = Accumulator::restore(JsonSlot::new(&config.data_dir, &config.slot_name));
    let mut controller = CrawlController::new(
        client,
        LogReporter,
        targets,
        CrawlSettings::from_config(config),
        accumulator,
    );

    let stop = controller.stop_signal();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("stop requested; finishing at the next checkpoint");
            stop.stop();
        }
    });

    let result = controller.start(location).await;
    ctrl_c.abort();
    let summary = result?;

    let verb = if summary.state == RunState::Stopped {
        "stopped"
    } else {
        "finished"
    };
    println!(
        "crawl {verb}: {} tuples completed, {} new records, {} total",
        summary.tuples_completed, summary.records_added, summary.total_records
    );
    Ok(())
}

/// Print the traversal order without contacting the backend.
///
/// # Errors
///
/// Returns an error if the targets file cannot be loaded.
pub(crate) fn run_targets(config: &AppConfig) -> anyhow::Result<()> {
    let targets = load_targets(config)?;
    println!(
        "{} cities x 2 zones x {} categories = {} tuples",
        targets.cities.len(),
        targets.categories.len(),
        targets.tuple_count()
    );
    for (i, tuple) in targets.tuples().iter().enumerate() {
        println!("{:>5}  {tuple}", i + 1);
    }
    Ok(())
}
