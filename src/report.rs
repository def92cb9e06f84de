//! Accumulated outcome of a run.

use crate::check::CheckOutcome;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The stages of a verification run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ResetStorage,
    Navigate,
    AgeGate,
    Content,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ResetStorage => "reset_storage",
            Self::Navigate => "navigate",
            Self::AgeGate => "age_gate",
            Self::Content => "content",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Passed,
    Failed,
    Skipped,
}

/// What happened in one stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub status: StageStatus,
    /// Error message for a failed stage, or the swallowed condition for a
    /// skipped one.
    pub message: Option<String>,
    pub screenshots: Vec<PathBuf>,
    pub checks: Vec<CheckOutcome>,
    pub duration_ms: u64,
}

impl StageReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            status: StageStatus::Passed,
            message: None,
            screenshots: Vec::new(),
            checks: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = StageStatus::Failed;
        self.message = Some(message.into());
    }

    pub fn skip(&mut self, message: impl Into<String>) {
        self.status = StageStatus::Skipped;
        self.message = Some(message.into());
    }

    /// Passed, with every check passing.
    pub fn is_clean(&self) -> bool {
        self.status != StageStatus::Failed && self.checks.iter().all(|c| c.passed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Console,
    Error,
}

/// One console message or uncaught page error seen during the run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleEntry {
    pub kind: EntryKind,
    pub level: String,
    pub text: String,
}

/// Result of a full run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub stages: Vec<StageReport>,
    /// Set when the run stopped before reaching the verification stages.
    pub aborted: Option<String>,
    /// Everything the page logged or threw, in order. Informational only.
    pub console: Vec<ConsoleEntry>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started_at: Utc::now(),
            stages: Vec::new(),
            aborted: None,
            console: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn push(&mut self, stage: StageReport) {
        self.stages.push(stage);
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    pub fn checks(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.stages.iter().flat_map(|s| s.checks.iter())
    }

    /// Uncaught errors and `console.error` calls.
    pub fn browser_errors(&self) -> impl Iterator<Item = &ConsoleEntry> {
        self.console
            .iter()
            .filter(|e| e.kind == EntryKind::Error || e.level == "error")
    }

    pub fn success(&self) -> bool {
        self.aborted.is_none() && self.stages.iter().all(StageReport::is_clean)
    }

    /// 0 on success, 1 when a stage or check failed, 2 when aborted.
    pub fn exit_code(&self) -> i32 {
        if self.aborted.is_some() {
            2
        } else if self.success() {
            0
        } else {
            1
        }
    }

    /// Write the report as pretty JSON to `dir/report.json`.
    pub fn write_json(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join("report.json");
        std::fs::write(&path, serde_json::to_vec_pretty(self)?)?;
        Ok(path)
    }
}
