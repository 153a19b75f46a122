//! CLI command execution.
//!
//! Results go to the supplied writer (stdout in the binary); progress and
//! diagnostics go through the logger.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::DateTime;

use crate::app::validate_domain;
use crate::config::{Command, Config, FetchArgs};
use crate::dedup::sort_records;
use crate::export::DataFormat;
use crate::filter;
use crate::ingest::{Ingestor, LogProgress};
use crate::models::UrlRecord;
use crate::storage::DomainStore;

const SECONDS_PER_DAY: u64 = 86_400;

/// Runs one CLI command against the store at `config.db_path`.
///
/// # Errors
///
/// Any library error, with context naming the failed step.
pub async fn execute(command: &Command, config: &Config, out: &mut dyn Write) -> Result<()> {
    let store = DomainStore::open(&config.db_path)
        .await
        .with_context(|| format!("Failed to open store at {}", config.db_path.display()))?;

    match command {
        Command::Fetch(args) => fetch(args, config, store, out).await,
        Command::List { sort, search } => {
            let listings = store.list_domains(*sort, search.as_deref()).await?;
            if listings.is_empty() {
                writeln!(out, "No stored domains")?;
            }
            for listing in listings {
                writeln!(
                    out,
                    "{:<40} {:>8} URLs  updated {}",
                    listing.domain,
                    listing.url_count,
                    format_millis(listing.last_updated)
                )?;
            }
            Ok(())
        }
        Command::Show {
            domain,
            filter: filter_args,
            order,
            limit,
            facets,
        } => {
            let domain = domain_arg(domain)?;
            let dataset = store.get_required(&domain).await?;

            if *facets {
                let facets = filter::facets(&dataset.records);
                let extensions: Vec<&str> = facets.extensions.iter().map(String::as_str).collect();
                let statuses: Vec<String> =
                    facets.status_codes.iter().map(u16::to_string).collect();
                writeln!(out, "extensions: {}", extensions.join(", "))?;
                writeln!(out, "status codes: {}", statuses.join(", "))?;
                return Ok(());
            }

            let mut records = filter::apply(&dataset.records, &filter_args.criteria());
            sort_records(&mut records, *order);
            let shown = limit.unwrap_or(records.len()).min(records.len());
            for record in &records[..shown] {
                write_record(out, record)?;
            }
            log::info!(
                "{} of {} stored URLs match for {domain}",
                records.len(),
                dataset.count
            );
            Ok(())
        }
        Command::Delete { domain } => {
            let domain = domain_arg(domain)?;
            if store.delete(&domain).await? {
                writeln!(out, "Deleted dataset for {domain}")?;
            } else {
                writeln!(out, "No dataset stored for {domain}")?;
            }
            Ok(())
        }
        Command::Evict { days } => {
            let removed = store
                .evict_older_than(Duration::from_secs(days.saturating_mul(SECONDS_PER_DAY)))
                .await?;
            writeln!(out, "Evicted {removed} dataset(s) older than {days} days")?;
            Ok(())
        }
        Command::Export {
            domain,
            format,
            filter: filter_args,
            output,
        } => {
            let domain = domain_arg(domain)?;
            let content = store
                .export_filtered(&domain, *format, &filter_args.criteria())
                .await?;
            match output {
                Some(path) => {
                    tokio::fs::write(path, content)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    log::info!("Exported {domain} to {}", path.display());
                }
                None => writeln!(out, "{content}")?,
            }
            Ok(())
        }
        Command::Import {
            domain,
            file,
            format,
        } => {
            let domain = domain_arg(domain)?;
            let format = match format {
                Some(format) => *format,
                None => DataFormat::from_path(file).ok_or_else(|| {
                    anyhow!(
                        "Cannot tell the format of {}; pass --format json|txt|csv",
                        file.display()
                    )
                })?,
            };
            let data = read_file(file).await?;
            let imported = store.import_domain(&domain, &data, format).await?;
            writeln!(out, "Imported {imported} URLs for {domain}")?;
            Ok(())
        }
        Command::Stats => {
            let metadata = store.metadata().await?;
            let usage = store.usage().await?;
            writeln!(out, "Domains:  {}", metadata.total_domains)?;
            writeln!(out, "URLs:     {}", metadata.total_urls)?;
            writeln!(out, "Storage:  {:.1} KiB", usage.bytes_used as f64 / 1024.0)?;
            writeln!(out, "Created:  {}", format_millis(metadata.created))?;
            for (domain, summary) in &metadata.domains {
                writeln!(
                    out,
                    "  {:<38} {:>8} URLs  updated {}",
                    domain,
                    summary.url_count,
                    format_millis(summary.last_updated)
                )?;
            }
            Ok(())
        }
        Command::Clear { yes } => {
            if !yes {
                bail!("Refusing to delete every dataset without --yes");
            }
            let removed = store.clear_all().await?;
            writeln!(out, "Deleted {removed} dataset(s)")?;
            Ok(())
        }
        Command::Backup { output } => {
            let backup = store.export_all().await?;
            match output {
                Some(path) => {
                    tokio::fs::write(path, backup)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    log::info!("Backup written to {}", path.display());
                }
                None => writeln!(out, "{backup}")?,
            }
            Ok(())
        }
        Command::Restore { file } => {
            let data = read_file(file).await?;
            let restored = store.import_all(&data).await?;
            writeln!(out, "Restored {restored} dataset(s)")?;
            Ok(())
        }
    }
}

async fn fetch(
    args: &FetchArgs,
    config: &Config,
    store: DomainStore,
    out: &mut dyn Write,
) -> Result<()> {
    let ingestor = Ingestor::new(config, store).context("Failed to initialize ingestion")?;
    let options = args.query_options();

    if args.preview {
        let records = ingestor.preview(&args.domain, &options).await?;
        for record in &records {
            write_record(out, record)?;
        }
        log::info!("{} URLs found for {} (not stored)", records.len(), args.domain);
        return Ok(());
    }

    let report = ingestor.ingest(&args.domain, &options, &LogProgress).await?;
    if report.stored {
        writeln!(
            out,
            "✅ Stored {} URL{} for {} ({} rows, {} dropped, {} asset{} skipped)",
            report.url_count,
            if report.url_count == 1 { "" } else { "s" },
            report.domain,
            report.rows_seen,
            report.rows_dropped,
            report.assets_skipped,
            if report.assets_skipped == 1 { "" } else { "s" },
        )?;
    } else {
        writeln!(out, "No archived URLs found for {}", report.domain)?;
    }
    Ok(())
}

fn write_record(out: &mut dyn Write, record: &UrlRecord) -> std::io::Result<()> {
    writeln!(out, "{}  {:>3}  {}", record.observed_at, record.status_code, record.url)
}

fn domain_arg(raw: &str) -> Result<String> {
    validate_domain(raw).ok_or_else(|| anyhow!("Invalid domain format: {raw:?}"))
}

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn format_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}
