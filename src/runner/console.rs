//! Passive observers for in-page console output and uncaught errors.
//!
//! The hook is registered with the browser before the first navigation and
//! runs ahead of page scripts in every new document. It buffers `console.*`
//! calls, `error` events and unhandled rejections on `window`. The runner
//! drains the buffer after each navigation and after every waiting step, so
//! `Browser Console:` lines land next to the step that produced them. Each
//! drained entry is re-emitted through `tracing` and kept for the report.
//! Nothing here ever fails a stage.

use crate::report::{ConsoleEntry, EntryKind};
use crate::Result;
use eoka::Page;
use tracing::{debug, info, warn};

pub(crate) const INSTALL_JS: &str = r#"(() => {
    if (window.__premiumUiVerifyLog) return false;
    const log = window.__premiumUiVerifyLog = [];
    const fmt = (v) => {
        if (typeof v === 'string') return v;
        if (v instanceof Error) return String(v);
        try { return JSON.stringify(v); } catch (_) { return String(v); }
    };
    for (const level of ['log', 'info', 'warn', 'error', 'debug']) {
        const orig = console[level].bind(console);
        console[level] = (...args) => {
            log.push({ kind: 'console', level, text: args.map(fmt).join(' ') });
            orig(...args);
        };
    }
    window.addEventListener('error', (e) => {
        log.push({ kind: 'error', level: 'error', text: e.error ? String(e.error) : String(e.message) });
    });
    window.addEventListener('unhandledrejection', (e) => {
        log.push({ kind: 'error', level: 'error', text: 'Unhandled rejection: ' + fmt(e.reason) });
    });
    return true;
})()"#;

const DRAIN_JS: &str =
    "JSON.stringify(window.__premiumUiVerifyLog ? window.__premiumUiVerifyLog.splice(0) : [])";

fn emit(entry: &ConsoleEntry) {
    match (entry.kind, entry.level.as_str()) {
        (EntryKind::Error, _) => warn!("Browser Error: {}", entry.text),
        (EntryKind::Console, "error" | "warn") => warn!("Browser Console: {}", entry.text),
        (EntryKind::Console, _) => info!("Browser Console: {}", entry.text),
    }
}

/// Decode the drained buffer.
pub fn parse_entries(json: &str) -> Result<Vec<ConsoleEntry>> {
    Ok(serde_json::from_str(json)?)
}

/// Register the hook for every document the page loads from now on.
pub async fn register(page: &Page) {
    match page
        .session()
        .add_script_to_evaluate_on_new_document(INSTALL_JS)
        .await
    {
        Ok(id) => debug!("console observer registered ({})", id),
        Err(e) => warn!("console observer not registered: {}", e),
    }
}

/// Entries drained so far, in page order.
#[derive(Debug, Default)]
pub struct ConsoleLog {
    entries: Vec<ConsoleEntry>,
}

impl ConsoleLog {
    /// Drain the page buffer, emit each entry, and keep it.
    pub async fn flush(&mut self, page: &Page) {
        match drain(page).await {
            Ok(entries) => self.extend(entries),
            Err(e) => debug!("console drain failed: {}", e),
        }
    }

    fn extend(&mut self, entries: Vec<ConsoleEntry>) {
        entries.iter().for_each(emit);
        self.entries.extend(entries);
    }

    pub fn into_entries(self) -> Vec<ConsoleEntry> {
        self.entries
    }
}

async fn drain(page: &Page) -> Result<Vec<ConsoleEntry>> {
    let json: String = page.evaluate(DRAIN_JS).await?;
    parse_entries(&json)
}
