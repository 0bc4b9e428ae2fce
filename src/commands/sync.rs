use anyhow::Result;
use colored::Colorize;
use std::time::Duration;
use tracing::warn;

use trending_sync::enrich::{ChatSummarizer, ReadmeFetcher};
use trending_sync::pipeline::{Collaborators, DryRunSink, RecordSink, Summarizer};
use trending_sync::schema::CandidateLabels;
use trending_sync::trending::{Period, TrendingClient};
use trending_sync::{Config, Orchestrator, RunSettings};

const README_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SyncOptions {
    pub period: Option<Period>,
    pub limit: Option<usize>,
    pub database: Option<String>,
    pub dry_run: bool,
    pub no_enrich: bool,
}

/// Built-in labels plus `[fields.aliases]`, warning about unknown keys.
pub(crate) fn candidates(config: &Config) -> CandidateLabels {
    let (labels, unknown) = CandidateLabels::with_aliases(&config.fields.aliases);
    for id in unknown {
        warn!("ignoring aliases for unknown field key `{}`", id);
        println!("{} unknown field key in [fields.aliases]: {}", "⚠️ ".yellow(), id);
    }
    labels
}

pub fn execute(config: &Config, options: SyncOptions) -> Result<()> {
    let database_id = config.database_id(options.database.as_deref())?;
    let notion = super::notion_client(config)?;

    let network = &config.network;
    let listing = TrendingClient::new(
        Some(config.github.trending_url.as_str()),
        network.timeout(),
        network.proxy.as_deref(),
    )?;

    let summarizer = if options.no_enrich {
        None
    } else {
        build_summarizer(config)?
    };

    let dry_run = DryRunSink::new();
    let sink: &dyn RecordSink = if options.dry_run { &dry_run } else { &notion };

    let mut settings = RunSettings::new(database_id);
    settings.period = options.period.unwrap_or(config.github.period);
    settings.limit = options.limit.unwrap_or(config.github.limit);
    settings.write_delay = network.write_delay();
    settings.enrich_delay = network.enrich_delay();

    println!("🚀 Syncing GitHub trending ({}) → {}", settings.period, database_id);
    if options.dry_run {
        println!("   {}", "dry run: nothing will be written".dimmed());
    }

    let collaborators = Collaborators {
        schema: &notion,
        listing: &listing,
        summarizer: summarizer.as_ref().map(|s| s as &dyn Summarizer),
        sink,
    };
    let mut orchestrator = Orchestrator::new(settings, collaborators).with_candidates(candidates(config));

    let report = orchestrator.run()?;
    if report.failed() > 0 {
        println!("{} {} record(s) failed", "⚠️ ".yellow(), report.failed());
    }
    Ok(())
}

fn build_summarizer(config: &Config) -> Result<Option<ChatSummarizer>> {
    let Some(api_key) = config.enrichment.api_key.as_deref() else {
        return Ok(None);
    };

    let readme = ReadmeFetcher::new(
        config.github.token.clone(),
        README_TIMEOUT,
        config.network.proxy.as_deref(),
    )?;
    let summarizer = ChatSummarizer::new(
        Some(config.enrichment.api_url.as_str()),
        api_key,
        config.enrichment.model.as_str(),
        readme,
        config.network.timeout(),
    )?;
    Ok(Some(summarizer))
}
