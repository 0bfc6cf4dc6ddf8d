use std::fmt;
use std::sync::Mutex;

use crate::config::RunConfig;
use crate::error::RunError;
use crate::rename_engine::{
    EpisodeAssignment, RenameEngine, duplicate_episodes, ensure_season_directory,
};
use crate::transfer::{self, TransferJob, TransferMode, TransferOutcome};

/// Title of the notification sent when a run finishes.
pub const NOTIFICATION_TITLE: &str = "强制整理成功";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEvent {
    pub level: EventLevel,
    pub message: String,
}

impl RunEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: EventLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: EventLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub media_name: String,
    pub season: u32,
    pub mode: TransferMode,
    pub total_attempted: usize,
    pub total_succeeded: usize,
}

impl RunSummary {
    pub fn notification_text(&self) -> String {
        format!(
            "{}\n共处理: {} 个文件\n方式: {}",
            self.media_name, self.total_succeeded, self.mode
        )
    }
}

/// Receives per-file log lines and the end-of-run summary.
pub trait RunSink {
    fn record_event(&self, event: &RunEvent);
    fn record_summary(&self, summary: &RunSummary);
}

/// Sends everything to the `tracing` subscriber.
#[derive(Debug, Default)]
pub struct TracingSink;

impl RunSink for TracingSink {
    fn record_event(&self, event: &RunEvent) {
        match event.level {
            EventLevel::Info => tracing::info!("{}", event.message),
            EventLevel::Error => tracing::error!("{}", event.message),
        }
    }

    fn record_summary(&self, summary: &RunSummary) {
        tracing::info!(
            title = NOTIFICATION_TITLE,
            attempted = summary.total_attempted,
            succeeded = summary.total_succeeded,
            "{}",
            summary.notification_text()
        );
    }
}

/// Keeps events and summaries for later inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<RunEvent>>,
    summaries: Mutex<Vec<RunSummary>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn summaries(&self) -> Vec<RunSummary> {
        self.summaries.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl RunSink for MemorySink {
    fn record_event(&self, event: &RunEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn record_summary(&self, summary: &RunSummary) {
        if let Ok(mut summaries) = self.summaries.lock() {
            summaries.push(summary.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Validating,
    Processing,
    Reporting,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Processing => "processing",
            Self::Reporting => "reporting",
        };
        f.write_str(name)
    }
}

/// What a run would do, computed without touching the target.
#[derive(Debug)]
pub struct RunPlan {
    pub assignments: Vec<EpisodeAssignment>,
    pub jobs: Vec<TransferJob>,
}

#[derive(Debug)]
pub struct RunReport {
    pub summary: RunSummary,
    pub assignments: Vec<EpisodeAssignment>,
    pub outcomes: Vec<TransferOutcome>,
}

pub struct RunCoordinator<'a> {
    config: RunConfig,
    sink: &'a dyn RunSink,
}

impl<'a> RunCoordinator<'a> {
    pub fn new(config: RunConfig, sink: &'a dyn RunSink) -> Self {
        Self { config, sink }
    }

    /// Runs the whole pipeline once.
    ///
    /// Only validation and directory setup can fail the run; individual
    /// transfer failures are counted in the summary instead.
    pub fn run(&self) -> Result<RunReport, RunError> {
        enter(RunPhase::Validating);
        if let Err(err) = validate(&self.config) {
            self.sink.record_event(&RunEvent::error(err.to_string()));
            enter(RunPhase::Idle);
            return Err(err);
        }

        let result = self.process();
        enter(RunPhase::Idle);
        result
    }

    /// Validates and lists the source, returning the jobs a run would execute.
    pub fn plan(&self) -> Result<RunPlan, RunError> {
        let record_error =
            |err: &RunError| self.sink.record_event(&RunEvent::error(err.to_string()));
        validate(&self.config).inspect_err(record_error)?;
        let engine = RenameEngine::new(self.config.clone());
        let files = engine.scan_directory().inspect_err(record_error)?;
        let assignments = engine.assign_episodes(files);
        let jobs = engine.plan_jobs(&assignments);

        let inferred = assignments.iter().filter(|a| a.inferred).count();
        self.sink.record_event(&RunEvent::info(format!(
            "{} file(s) planned for season {}, {} numbered by position",
            jobs.len(),
            self.config.season,
            inferred
        )));
        Ok(RunPlan { assignments, jobs })
    }

    fn process(&self) -> Result<RunReport, RunError> {
        enter(RunPhase::Processing);
        let engine = RenameEngine::new(self.config.clone());
        self.sink.record_event(&RunEvent::info(format!(
            "organizing {} into season {}",
            self.config.media_name, self.config.season
        )));

        ensure_season_directory(
            &self.config.target_path,
            &self.config.media_name,
            self.config.season,
        )
        .inspect_err(|err| self.sink.record_event(&RunEvent::error(err.to_string())))?;
        let files = engine
            .scan_directory()
            .inspect_err(|err| self.sink.record_event(&RunEvent::error(err.to_string())))?;

        let assignments = engine.assign_episodes(files);
        let duplicates = duplicate_episodes(&assignments);
        if !duplicates.is_empty() {
            tracing::warn!(?duplicates, "episode numbers assigned to more than one file");
        }

        let jobs = engine.plan_jobs(&assignments);
        let mut outcomes = Vec::with_capacity(jobs.len());
        for (assignment, job) in assignments.iter().zip(&jobs) {
            tracing::debug!(
                episode = assignment.episode,
                inferred = assignment.inferred,
                destination = %job.destination.display(),
                "transferring {}",
                assignment.source.name
            );
            let outcome = transfer::execute(job);
            self.sink.record_event(&describe(assignment, &outcome));
            outcomes.push(outcome);
        }

        enter(RunPhase::Reporting);
        let summary = RunSummary {
            media_name: self.config.media_name.clone(),
            season: self.config.season,
            mode: self.config.mode,
            total_attempted: outcomes.len(),
            total_succeeded: outcomes.iter().filter(|o| o.succeeded()).count(),
        };
        self.sink.record_summary(&summary);

        Ok(RunReport {
            summary,
            assignments,
            outcomes,
        })
    }
}

fn enter(phase: RunPhase) {
    tracing::debug!(%phase, "run phase");
}

/// Rejects empty required fields and a missing or non-directory source.
pub fn validate(config: &RunConfig) -> Result<(), RunError> {
    if config.source_path.as_os_str().is_empty() {
        return Err(RunError::MissingField("source_path"));
    }
    if config.target_path.as_os_str().is_empty() {
        return Err(RunError::MissingField("target_path"));
    }
    if config.media_name.trim().is_empty() {
        return Err(RunError::MissingField("media_name"));
    }
    if !config.source_path.exists() {
        return Err(RunError::SourceMissing(config.source_path.clone()));
    }
    if !config.source_path.is_dir() {
        return Err(RunError::SourceNotDirectory(config.source_path.clone()));
    }
    Ok(())
}

fn describe(assignment: &EpisodeAssignment, outcome: &TransferOutcome) -> RunEvent {
    match &outcome.error {
        None => {
            let new_name = outcome
                .job
                .destination
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            RunEvent::info(format!("{} -> {}", assignment.source.name, new_name))
        }
        Some(err) => RunEvent::error(format!(
            "failed to process {}: {}",
            assignment.source.name, err
        )),
    }
}
