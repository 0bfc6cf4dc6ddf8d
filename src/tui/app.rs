use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use ratatui::widgets::{ListState, ScrollbarState};

use crate::config::{RunConfig, coerce_season};
use crate::coordinator::{MemorySink, RunCoordinator, RunReport, RunSummary};
use crate::error::RunError;
use crate::transfer::TransferMode;

use super::models::{ConfigInputMode, FileItem, ProcessingStats, ProcessingStatus};

const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(4);

#[derive(Debug)]
pub struct App {
    pub files: Vec<FileItem>,
    pub list_state: ListState,
    pub scroll_state: ScrollbarState,
    pub show_help: bool,
    pub show_preview: bool,
    pub show_config: bool,
    pub config_input_mode: ConfigInputMode,
    pub source_input: String,
    pub target_input: String,
    pub name_input: String,
    pub season_input: String,
    pub mode: TransferMode,
    pub finished: bool,
    pub stats: ProcessingStats,
    pub summary: Option<RunSummary>,
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
}

impl App {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            list_state: ListState::default(),
            scroll_state: ScrollbarState::default(),
            show_help: false,
            show_preview: true,
            show_config: true,
            config_input_mode: ConfigInputMode::Source,
            source_input: String::new(),
            target_input: String::new(),
            name_input: String::new(),
            season_input: "1".to_string(),
            mode: TransferMode::default(),
            finished: false,
            stats: ProcessingStats::default(),
            summary: None,
            status_message: None,
            status_message_time: None,
        }
    }

    /// Pre-fills the form from an already resolved configuration.
    pub fn with_config(config: &RunConfig) -> Self {
        Self {
            source_input: config.source_path.to_string_lossy().to_string(),
            target_input: config.target_path.to_string_lossy().to_string(),
            name_input: config.media_name.clone(),
            season_input: config.season.to_string(),
            mode: config.mode,
            ..Self::new()
        }
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            source_path: PathBuf::from(self.source_input.trim()),
            target_path: PathBuf::from(self.target_input.trim()),
            media_name: self.name_input.trim().to_string(),
            season: coerce_season(&self.season_input),
            mode: self.mode,
        }
    }

    pub fn next(&mut self) {
        if self.files.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.files.len() => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.select(i);
    }

    pub fn previous(&mut self) {
        if self.files.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.files.len() - 1,
            Some(i) => i - 1,
        };
        self.select(i);
    }

    fn select(&mut self, i: usize) {
        self.list_state.select(Some(i));
        self.scroll_state = self.scroll_state.position(i);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_preview(&mut self) {
        self.show_preview = !self.show_preview;
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_message_time = Some(Instant::now());
    }

    pub fn clear_status_message_if_expired(&mut self) {
        if let Some(set_at) = self.status_message_time {
            if set_at.elapsed() >= STATUS_MESSAGE_TTL {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    fn active_input(&mut self) -> Option<&mut String> {
        match self.config_input_mode {
            ConfigInputMode::Source => Some(&mut self.source_input),
            ConfigInputMode::Target => Some(&mut self.target_input),
            ConfigInputMode::MediaName => Some(&mut self.name_input),
            ConfigInputMode::Season => Some(&mut self.season_input),
            ConfigInputMode::TransferType | ConfigInputMode::Confirm => None,
        }
    }

    pub fn handle_config_input(&mut self, c: char) {
        if self.config_input_mode == ConfigInputMode::Season && !c.is_ascii_digit() {
            return;
        }
        if let Some(input) = self.active_input() {
            input.push(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(input) = self.active_input() {
            input.pop();
        } else {
            self.go_back_config_step();
        }
    }

    pub fn advance_config_step(&mut self) {
        self.config_input_mode = self.config_input_mode.next();
    }

    pub fn go_back_config_step(&mut self) {
        self.config_input_mode = self.config_input_mode.previous();
    }

    pub fn handle_config_navigation(&mut self, key: KeyCode) {
        match key {
            KeyCode::Down | KeyCode::Tab => self.advance_config_step(),
            KeyCode::Up | KeyCode::BackTab => self.go_back_config_step(),
            KeyCode::Left if self.config_input_mode == ConfigInputMode::TransferType => {
                self.cycle_mode(false)
            }
            KeyCode::Right if self.config_input_mode == ConfigInputMode::TransferType => {
                self.cycle_mode(true)
            }
            _ => {}
        }
    }

    pub fn cycle_mode(&mut self, forward: bool) {
        let modes = TransferMode::ALL;
        let current = modes.iter().position(|m| *m == self.mode).unwrap_or(0);
        let next = if forward {
            (current + 1) % modes.len()
        } else {
            (current + modes.len() - 1) % modes.len()
        };
        self.mode = modes[next];
    }

    /// Lists the source and shows what a run would do.
    pub fn load_preview(&mut self, sink: &MemorySink) -> Result<(), RunError> {
        let plan = RunCoordinator::new(self.run_config(), sink).plan()?;

        self.files = plan
            .assignments
            .iter()
            .zip(&plan.jobs)
            .map(|(assignment, job)| FileItem {
                original_name: assignment.source.name.clone(),
                new_name: file_name(&job.destination),
                episode_number: assignment.episode,
                inferred: assignment.inferred,
                status: ProcessingStatus::Pending,
                error_message: None,
            })
            .collect();
        self.after_file_list_change();
        self.finished = false;
        self.summary = None;
        self.show_config = false;
        Ok(())
    }

    pub fn apply_report(&mut self, report: RunReport) {
        self.files = report
            .assignments
            .iter()
            .zip(&report.outcomes)
            .map(|(assignment, outcome)| FileItem {
                original_name: assignment.source.name.clone(),
                new_name: file_name(&outcome.job.destination),
                episode_number: assignment.episode,
                inferred: assignment.inferred,
                status: if outcome.succeeded() {
                    ProcessingStatus::Success
                } else {
                    ProcessingStatus::Error
                },
                error_message: outcome.error.as_ref().map(|err| err.to_string()),
            })
            .collect();
        self.after_file_list_change();
        self.stats.successful = report.summary.total_succeeded;
        self.stats.failed = report.summary.total_attempted - report.summary.total_succeeded;
        self.summary = Some(report.summary);
        self.finished = true;
    }

    /// Share of listed files that made it to the library.
    pub fn success_ratio(&self) -> f64 {
        if self.stats.total == 0 {
            return 0.0;
        }
        self.stats.successful as f64 / self.stats.total as f64
    }

    fn after_file_list_change(&mut self) {
        self.stats = ProcessingStats {
            total: self.files.len(),
            ..Default::default()
        };
        self.scroll_state = ScrollbarState::new(self.files.len());
        if self.files.is_empty() {
            self.list_state.select(None);
        } else {
            self.select(0);
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
