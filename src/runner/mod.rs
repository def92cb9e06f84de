mod artifacts;
mod console;
mod session;
mod stages;

pub use artifacts::Artifacts;
pub use session::Session;

use crate::config::Config;
use crate::report::{RunReport, Stage, StageReport, StageStatus};
use crate::Result;
use console::ConsoleLog;
use eoka::Page;
use std::time::Instant;
use tracing::{error, info, warn};

/// Screenshot file stems, in the order a clean run writes them.
pub mod screenshots {
    pub use super::artifacts::{AGE_GATE, ERROR_HOME, ERROR_MODAL, HOME_HERO, VIDEO_GRID};
}

/// Drives one verification run.
pub struct Runner {
    config: Config,
    artifacts: Artifacts,
}

impl Runner {
    pub fn new(config: Config) -> Self {
        let artifacts = Artifacts::new(&config.artifacts.dir);
        Self { config, artifacts }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    /// Launch the browser, run every stage, and close the browser.
    ///
    /// Only a launch failure is returned as `Err`. A failed primary
    /// navigation ends the run early and is recorded in
    /// [`RunReport::aborted`]; the browser is closed either way.
    pub async fn run(&self) -> Result<RunReport> {
        let start = Instant::now();
        let mut report = RunReport::new(&self.config.name);

        let session = Session::launch(&self.config.browser).await?;
        let outcome = self.drive(&session, &mut report).await;
        if let Err(e) = session.close().await {
            warn!("Failed to close browser: {}", e);
        }

        if let Err(e) = outcome {
            error!("Run aborted: {}", e);
            report.aborted = Some(e.to_string());
        }
        report.duration_ms = start.elapsed().as_millis() as u64;

        if self.config.artifacts.report {
            match report.write_json(self.artifacts.dir()) {
                Ok(path) => info!("report: {}", path.display()),
                Err(e) => warn!("Failed to write report: {}", e),
            }
        }

        Ok(report)
    }

    async fn drive(&self, session: &Session, report: &mut RunReport) -> Result<()> {
        let mut console = ConsoleLog::default();
        let outcome = self.run_stages(session.page(), &mut console, report).await;
        report.console = console.into_entries();
        outcome
    }

    async fn run_stages(
        &self,
        page: &Page,
        console: &mut ConsoleLog,
        report: &mut RunReport,
    ) -> Result<()> {
        report.push(stages::reset_storage(page, &self.config.target).await);
        console.flush(page).await;

        let start = Instant::now();
        let mut nav = StageReport::new(Stage::Navigate);
        let navigated = stages::navigate(page, &self.config.target).await;
        nav.duration_ms = start.elapsed().as_millis() as u64;
        console.flush(page).await;
        if let Err(ref e) = navigated {
            nav.fail(e.to_string());
        }
        report.push(nav);
        navigated?;

        let gate_cfg = &self.config.age_gate;
        let mut gate = stages::age_gate(page, gate_cfg, &self.artifacts, console).await;
        let content =
            stages::content(page, &self.config.content, &self.artifacts, console).await;
        if gate.status == StageStatus::Passed {
            gate.checks
                .push(stages::gate_stays_dismissed(page, gate_cfg).await);
        }
        console.flush(page).await;

        report.push(gate);
        report.push(content);
        Ok(())
    }
}
