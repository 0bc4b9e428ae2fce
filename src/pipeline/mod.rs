//! Run orchestration: schema → mapping → listing → enrich → write.
//!
//! "Do X": Sync one trending listing into the target database.
//!
//! # Design
//!
//! - Collaborators (schema source, listing source, summarizer, sink) are
//!   traits so runs can be driven by fakes in tests.
//! - Schema and field mapping are computed once, before any record is
//!   touched, and live in a per-run [`RunContext`].
//! - Records are processed sequentially. A record's failure is recorded in
//!   its outcome and never affects its siblings; only schema, title-field
//!   and listing failures abort the run.

mod dry_run;

pub use dry_run::DryRunSink;

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use colored::Colorize;
use std::collections::HashMap;
use std::fmt;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::listing::RecordExtractor;
use crate::properties::{self, Payload};
use crate::repository::{FieldKey, Repository};
use crate::schema::{self, CandidateLabels, FieldMapping, Schema};
use crate::trending::Period;

/// Discovers the target schema.
pub trait SchemaSource {
    fn fetch_schema(&self, database_id: &str) -> Result<Schema>;
}

/// Fetches the raw listing document.
pub trait ListingSource {
    fn fetch_listing(&self, period: Period) -> Result<String>;
}

/// Produces a short summary for a repository. Errors mean "unavailable".
pub trait Summarizer {
    fn summarize(&self, owner: &str, name: &str, description: &str) -> Result<String>;
}

/// Creates one record in the target database.
pub trait RecordSink {
    fn create_record(&self, database_id: &str, payload: &Payload) -> Result<(), SyncError>;
}

/// Orchestrator progress through a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    SchemaDiscovered,
    FieldsMatched,
    RecordsExtracted,
    Enriching,
    Serializing,
    Writing,
    Done,
}

/// Knobs for a single run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub database_id: String,
    pub period: Period,
    pub limit: usize,
    /// Pause between consecutive writes.
    pub write_delay: Duration,
    /// Pause between consecutive summarizer calls.
    pub enrich_delay: Duration,
}

impl RunSettings {
    pub fn new(database_id: impl Into<String>) -> Self {
        Self {
            database_id: database_id.into(),
            period: Period::Daily,
            limit: crate::listing::DEFAULT_LIMIT,
            write_delay: Duration::from_millis(300),
            enrich_delay: Duration::from_millis(500),
        }
    }
}

/// External services a run talks to.
pub struct Collaborators<'a> {
    pub schema: &'a dyn SchemaSource,
    pub listing: &'a dyn ListingSource,
    pub summarizer: Option<&'a dyn Summarizer>,
    pub sink: &'a dyn RecordSink,
}

/// Read-only facts of a run plus its enrichment cache.
#[derive(Debug)]
pub struct RunContext {
    pub observed_at: NaiveDateTime,
    pub schema: Schema,
    pub mapping: FieldMapping,
    summaries: HashMap<String, String>,
}

impl RunContext {
    pub fn new(observed_at: NaiveDateTime, schema: Schema, mapping: FieldMapping) -> Self {
        Self {
            observed_at,
            schema,
            mapping,
            summaries: HashMap::new(),
        }
    }

    pub fn cached_summary(&self, full_name: &str) -> Option<&str> {
        self.summaries.get(full_name).map(String::as_str)
    }
}

/// Result of one record's write attempt.
#[derive(Debug)]
pub struct RecordOutcome {
    pub full_name: String,
    pub result: Result<(), SyncError>,
}

/// Final tally of a run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub succeeded: usize,
    pub total: usize,
    pub outcomes: Vec<RecordOutcome>,
}

impl RunReport {
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    fn record(&mut self, outcome: RecordOutcome) {
        self.total += 1;
        if outcome.result.is_ok() {
            self.succeeded += 1;
        }
        self.outcomes.push(outcome);
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.succeeded, self.total)
    }
}

/// Drives a run through its states.
pub struct Orchestrator<'a> {
    settings: RunSettings,
    collaborators: Collaborators<'a>,
    candidates: CandidateLabels,
    state: RunState,
}

impl<'a> Orchestrator<'a> {
    pub fn new(settings: RunSettings, collaborators: Collaborators<'a>) -> Self {
        Self {
            settings,
            collaborators,
            candidates: CandidateLabels::default(),
            state: RunState::Idle,
        }
    }

    /// Replace the built-in candidate labels (e.g. with configured aliases).
    pub fn with_candidates(mut self, candidates: CandidateLabels) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run with the current local time as the observation timestamp.
    pub fn run(&mut self) -> Result<RunReport, SyncError> {
        self.run_at(Local::now().naive_local())
    }

    /// Run with an explicit observation timestamp shared by every record.
    pub fn run_at(&mut self, observed_at: NaiveDateTime) -> Result<RunReport, SyncError> {
        println!("\n[1/4] Discovering database schema...");
        let schema = self.discover_schema()?;

        println!("\n[2/4] Matching repository fields to columns...");
        let mapping = self.match_fields(&schema)?;

        println!("\n[3/4] Fetching trending repositories ({})...", self.settings.period);
        let repos = self.extract_records(observed_at)?;

        let mut ctx = RunContext::new(observed_at, schema, mapping);
        let report = self.process_records(&mut ctx, repos);

        self.transition(RunState::Done);
        println!("\n✅ Done: {} repositories written", report);
        Ok(report)
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "run state");
        self.state = next;
    }

    fn discover_schema(&mut self) -> Result<Schema, SyncError> {
        let schema = self
            .collaborators
            .schema
            .fetch_schema(&self.settings.database_id)
            .map_err(|e| SyncError::SchemaUnavailable(format!("{:#}", e)))?;

        println!("📊 {} columns", schema.len());
        for column in schema.columns() {
            println!("  [{:13}] {}", column.kind, column.name);
        }
        self.transition(RunState::SchemaDiscovered);
        Ok(schema)
    }

    fn match_fields(&mut self, schema: &Schema) -> Result<FieldMapping, SyncError> {
        let mapping = schema::match_fields(schema, &FieldKey::ALL, &self.candidates);

        for key in FieldKey::ALL {
            match mapping.get(key).and_then(|c| schema.get(c)) {
                Some(column) => println!("  ✓ {:15} → {} ({})", key.id(), column.name, column.kind),
                None => println!("  - {:15} → (no matching column)", key.id()),
            }
        }

        if let Err(e) = schema::validate(&mapping) {
            println!("{}", "⚠️  No title column found; the database needs a title property".yellow());
            return Err(e);
        }
        self.transition(RunState::FieldsMatched);
        Ok(mapping)
    }

    fn extract_records(&mut self, observed_at: NaiveDateTime) -> Result<Vec<Repository>, SyncError> {
        let document = self
            .collaborators
            .listing
            .fetch_listing(self.settings.period)
            .map_err(|e| SyncError::ListingUnavailable(format!("{:#}", e)))?;

        let repos = RecordExtractor::new(observed_at).extract_all(&document, self.settings.limit);
        if repos.is_empty() {
            // sign-in walls and layout changes parse to nothing
            return Err(SyncError::ListingUnavailable(
                "no repositories found in listing".to_string(),
            ));
        }
        println!("✓ {} trending repositories", repos.len());
        self.transition(RunState::RecordsExtracted);
        Ok(repos)
    }

    fn process_records(&mut self, ctx: &mut RunContext, repos: Vec<Repository>) -> RunReport {
        let summarizer = self.enrichment_target(ctx);
        let mut report = RunReport::default();

        println!("\n[4/4] Writing to the database...");
        for (i, repo) in repos.into_iter().enumerate() {
            if i > 0 && !self.settings.write_delay.is_zero() {
                thread::sleep(self.settings.write_delay);
            }

            let repo = match summarizer {
                Some(summarizer) => self.enrich(ctx, summarizer, repo),
                None => repo,
            };

            self.transition(RunState::Serializing);
            let payload = properties::serialize(&repo, &ctx.mapping, &ctx.schema);

            self.transition(RunState::Writing);
            let result = if payload.is_empty() {
                Err(SyncError::SerializationEmpty {
                    repo: repo.full_name.clone(),
                })
            } else {
                self.collaborators
                    .sink
                    .create_record(&self.settings.database_id, &payload)
            };

            print_outcome(&repo, &result);
            report.record(RecordOutcome {
                full_name: repo.full_name,
                result,
            });
        }

        info!(succeeded = report.succeeded, total = report.total, "run finished");
        report
    }

    // Enrichment only runs when a summarizer is configured and a column takes it.
    fn enrichment_target(&self, ctx: &RunContext) -> Option<&'a dyn Summarizer> {
        match self.collaborators.summarizer {
            None => {
                println!("  (summaries skipped: no summarizer configured)");
                None
            }
            Some(_) if !ctx.mapping.contains(FieldKey::Summary) => {
                println!("  (summaries skipped: no column for summaries)");
                None
            }
            Some(summarizer) => Some(summarizer),
        }
    }

    fn enrich(&mut self, ctx: &mut RunContext, summarizer: &dyn Summarizer, repo: Repository) -> Repository {
        self.transition(RunState::Enriching);

        if let Some(summary) = ctx.cached_summary(&repo.full_name) {
            return repo.with_summary(summary);
        }

        println!("  🤖 Summarising {}...", repo.full_name);
        let result = summarizer.summarize(&repo.owner, &repo.name, &repo.description);
        if !self.settings.enrich_delay.is_zero() {
            thread::sleep(self.settings.enrich_delay);
        }

        match result {
            Ok(summary) => {
                ctx.summaries.insert(repo.full_name.clone(), summary.clone());
                repo.with_summary(summary)
            }
            Err(e) => {
                let err = SyncError::EnrichmentUnavailable {
                    repo: repo.full_name.clone(),
                    reason: format!("{:#}", e),
                };
                warn!("{}", err);
                println!("    {} {}", "✗".red(), err);
                repo
            }
        }
    }
}

fn print_outcome(repo: &Repository, result: &Result<(), SyncError>) {
    match result {
        Ok(()) => {
            let today = if repo.today_stars > 0 {
                format!(" | today +{}", repo.today_stars)
            } else {
                String::new()
            };
            let name = properties::truncate(&repo.full_name, 40);
            println!("  {} {:40} ⭐ {}{}", "✓".green(), name, repo.stars, today);
        }
        Err(e) => println!("  {} {}: {}", "✗".red(), repo.full_name, e),
    }
}
