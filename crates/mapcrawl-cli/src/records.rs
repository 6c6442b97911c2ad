//! Handlers for commands that only touch the stored collection.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Context;
use mapcrawl_core::{AppConfig, Record};
use mapcrawl_store::JsonSlot;

fn slot(config: &AppConfig) -> JsonSlot {
    JsonSlot::new(&config.data_dir, &config.slot_name)
}

/// Count records per city, keeping cities sorted by name.
pub(crate) fn per_city(records: &[Record]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.city.as_str()).or_insert(0) += 1;
    }
    counts
}

/// `true` when the answer to a yes/no prompt is an affirmative.
pub(crate) fn confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Write every stored record to `businesses_<n>_records.csv` under `out_dir`.
///
/// # Errors
///
/// Returns an error if the backup cannot be read or the CSV cannot be written.
pub(crate) fn run_export(config: &AppConfig, out_dir: &Path) -> anyhow::Result<()> {
    let slot = slot(config);
    let records = slot
        .try_load()
        .with_context(|| format!("reading {}", slot.path().display()))?
        .unwrap_or_default();

    if records.is_empty() {
        println!("no records collected yet; run `mapcrawl crawl` first");
        return Ok(());
    }

    let path = mapcrawl_store::export_csv(out_dir, &records)?;
    println!("exported {} records to {}", records.len(), path.display());
    Ok(())
}

/// Print the record count and a per-city breakdown.
///
/// # Errors
///
/// Returns an error if the backup exists but cannot be read.
pub(crate) fn run_status(config: &AppConfig) -> anyhow::Result<()> {
    let slot = slot(config);
    let records = slot
        .try_load()
        .with_context(|| format!("reading {}", slot.path().display()))?
        .unwrap_or_default();

    println!("{} records in {}", records.len(), slot.path().display());
    if records.is_empty() {
        return Ok(());
    }

    let counts = per_city(&records);
    let width = counts.keys().map(|c| c.chars().count()).max().unwrap_or(4).max(4);
    println!("{:<width$}  RECORDS", "CITY");
    for (city, count) in counts {
        println!("{city:<width$}  {count}");
    }
    Ok(())
}

/// Delete the backup slot after confirmation.
///
/// Decided by the file's presence rather than its record count, so a corrupt
/// backup that loads as empty is still removed.
///
/// # Errors
///
/// Returns an error if the confirmation prompt cannot be read or the backup
/// cannot be removed.
pub(crate) fn run_reset(config: &AppConfig, yes: bool) -> anyhow::Result<()> {
    let slot = slot(config);
    if !slot.path().exists() {
        println!("nothing to reset");
        return Ok(());
    }

    let held = slot.load().len();
    if !yes {
        print!(
            "delete {held} collected records in {}? this cannot be undone [y/N] ",
            slot.path().display()
        );
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;
        if !confirmed(&answer) {
            println!("reset cancelled");
            return Ok(());
        }
    }

    slot.clear()
        .with_context(|| format!("removing {}", slot.path().display()))?;
    tracing::info!(path = %slot.path().display(), records = held, "record collection reset");
    println!("removed {held} records");
    Ok(())
}
