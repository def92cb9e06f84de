use super::artifacts::{Artifacts, AGE_GATE, ERROR_HOME, ERROR_MODAL, HOME_HERO, VIDEO_GRID};
use super::console::ConsoleLog;
use crate::check::{CheckOutcome, Expectation};
use crate::config::{AgeGateConfig, ContentConfig, TargetConfig};
use crate::report::{Stage, StageReport};
use crate::{Error, Result};
use eoka::Page;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

const POLL: Duration = Duration::from_millis(100);

const READY_JS: &str = "document.readyState === 'complete'";

/// Quote a string as a JS literal.
fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Click an element inside a host's open shadow root by calling its
/// `click()` directly. Returns false when the host, root or element is missing.
fn click_in_shadow_js(host: &str, id: &str) -> String {
    format!(
        r#"(() => {{
            const host = document.querySelector({host});
            const el = host && host.shadowRoot && host.shadowRoot.getElementById({id});
            if (!el) return false;
            el.click();
            return true;
        }})()"#,
        host = js_str(host),
        id = js_str(id),
    )
}

fn shadow_placeholder_js(host: &str) -> String {
    format!(
        r#"(() => {{
            const host = document.querySelector({host});
            const input = host && host.shadowRoot && host.shadowRoot.querySelector('input');
            return input ? input.placeholder : null;
        }})()"#,
        host = js_str(host),
    )
}

fn inner_text_js(selector: &str) -> String {
    format!(
        "(() => {{ const el = document.querySelector({}); return el ? el.innerText : null; }})()",
        js_str(selector)
    )
}

/// Wait until `selector` is attached and has a rendered box.
async fn wait_for_visible(page: &Page, selector: &str, timeout_ms: u64) -> Result<()> {
    page.wait_for_visible(selector, timeout_ms)
        .await
        .map_err(|e| {
            Error::Timeout(format!(
                "'{}' not visible within {}ms: {}",
                selector, timeout_ms, e
            ))
        })?;
    Ok(())
}

/// Evaluate a boolean expression every [`POLL`] until it holds. Returns
/// false if the deadline passes first.
async fn poll_until(page: &Page, js: &str, timeout_ms: u64) -> Result<bool> {
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        let done: bool = page.evaluate(js).await?;
        if done {
            return Ok(true);
        }
        if Instant::now() >= deadline {
            return Ok(false);
        }
        tokio::time::sleep(POLL).await;
    }
}

/// `goto` returns once the navigation commits; wait for the load event so
/// subresources and inline scripts have run.
async fn wait_for_load(page: &Page, timeout_ms: u64) -> Result<()> {
    if poll_until(page, READY_JS, timeout_ms).await? {
        Ok(())
    } else {
        Err(Error::Timeout(format!(
            "page did not finish loading within {}ms",
            timeout_ms
        )))
    }
}

/// Hidden means detached, `display: none`, `visibility: hidden`, or an
/// empty box.
fn is_hidden_js(selector: &str) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector({});
            if (!el) return true;
            const style = getComputedStyle(el);
            const rect = el.getBoundingClientRect();
            return style.display === 'none'
                || style.visibility === 'hidden'
                || (rect.width === 0 && rect.height === 0);
        }})()"#,
        js_str(selector)
    )
}

async fn wait_for_hidden(page: &Page, selector: &str, timeout_ms: u64) -> Result<()> {
    if poll_until(page, &is_hidden_js(selector), timeout_ms).await? {
        Ok(())
    } else {
        Err(Error::Timeout(format!(
            "'{}' still visible after {}ms",
            selector, timeout_ms
        )))
    }
}

/// Load a throwaway same-origin page and clear `localStorage`, so the next
/// load behaves like a first visit. Failures are swallowed.
pub async fn reset_storage(page: &Page, target: &TargetConfig) -> StageReport {
    let start = Instant::now();
    let mut report = StageReport::new(Stage::ResetStorage);
    if let Err(e) = try_reset_storage(page, target).await {
        debug!("storage reset skipped: {}", e);
        report.skip(e.to_string());
    }
    report.duration_ms = start.elapsed().as_millis() as u64;
    report
}

async fn try_reset_storage(page: &Page, target: &TargetConfig) -> Result<()> {
    let url = target.reset_url()?;
    debug!("reset: {}", url);
    page.goto(&url).await?;
    wait_for_load(page, target.load_timeout_ms).await?;
    page.execute("localStorage.clear()").await?;
    Ok(())
}

/// Navigate to the entry page. Errors propagate: there is nothing to verify
/// without it.
pub async fn navigate(page: &Page, target: &TargetConfig) -> Result<()> {
    let url = target.entry_url()?;
    info!("Navigating to {}...", url);
    page.goto(&url).await?;
    wait_for_load(page, target.load_timeout_ms).await?;

    // Chrome reports some failed loads as a committed error page rather
    // than a navigation error.
    let landed = page.url().await?;
    let expected = target.origin_url()?.origin();
    match Url::parse(&landed) {
        Ok(u) if u.origin() == expected => Ok(()),
        _ => Err(Error::ActionFailed(format!(
            "navigation to {} landed on {}",
            url, landed
        ))),
    }
}

/// Dismiss the age gate through its confirm control.
pub async fn age_gate(
    page: &Page,
    cfg: &AgeGateConfig,
    artifacts: &Artifacts,
    console: &mut ConsoleLog,
) -> StageReport {
    let start = Instant::now();
    let mut report = StageReport::new(Stage::AgeGate);
    info!("Waiting for age verification modal...");

    if let Err(e) = run_age_gate(page, cfg, artifacts, console, &mut report).await {
        warn!("Modal verification failed or skipped: {}", e);
        report.fail(e.to_string());
        if let Some(path) = artifacts.capture_failure(page, ERROR_MODAL).await {
            report.screenshots.push(path);
        }
    }

    report.duration_ms = start.elapsed().as_millis() as u64;
    report
}

async fn run_age_gate(
    page: &Page,
    cfg: &AgeGateConfig,
    artifacts: &Artifacts,
    console: &mut ConsoleLog,
    report: &mut StageReport,
) -> Result<()> {
    let appeared = wait_for_visible(page, &cfg.selector, cfg.appear_timeout_ms).await;
    console.flush(page).await;
    appeared?;
    info!("Age verification modal found.");
    report
        .screenshots
        .push(artifacts.capture(page, AGE_GATE).await?);

    let clicked: bool = page
        .evaluate(&click_in_shadow_js(&cfg.selector, &cfg.confirm_id))
        .await?;
    if !clicked {
        return Err(Error::ActionFailed(format!(
            "'#{}' not found in the shadow root of '{}'",
            cfg.confirm_id, cfg.selector
        )));
    }
    info!("Clicked verify button.");

    let dismissed = wait_for_hidden(page, &cfg.selector, cfg.dismiss_timeout_ms).await;
    console.flush(page).await;
    dismissed?;
    info!("Modal dismissed.");
    Ok(())
}

/// Re-check, after the content stage, that the dismissed gate has not come
/// back. Recorded as a check; an evaluation error counts as a mismatch.
pub async fn gate_stays_dismissed(page: &Page, cfg: &AgeGateConfig) -> CheckOutcome {
    let hidden: eoka::Result<bool> = page.evaluate(&is_hidden_js(&cfg.selector)).await;
    let actual = match hidden {
        Ok(true) => "hidden".to_string(),
        Ok(false) => "visible".to_string(),
        Err(e) => format!("unknown ({})", e),
    };
    let check = CheckOutcome::evaluate(
        "age gate dismissed",
        Expectation::Exact("hidden".into()),
        &actual,
    );
    check.log("Age gate stayed dismissed.");
    check
}

/// Check that mock data rendered: cards, search placeholder, first title.
pub async fn content(
    page: &Page,
    cfg: &ContentConfig,
    artifacts: &Artifacts,
    console: &mut ConsoleLog,
) -> StageReport {
    let start = Instant::now();
    let mut report = StageReport::new(Stage::Content);
    info!("Verifying home page mock data...");

    if let Err(e) = run_content(page, cfg, artifacts, console, &mut report).await {
        warn!("Home page verification failed: {}", e);
        report.fail(e.to_string());
        if let Some(path) = artifacts.capture_failure(page, ERROR_HOME).await {
            report.screenshots.push(path);
        }
    }

    report.duration_ms = start.elapsed().as_millis() as u64;
    report
}

async fn run_content(
    page: &Page,
    cfg: &ContentConfig,
    artifacts: &Artifacts,
    console: &mut ConsoleLog,
    report: &mut StageReport,
) -> Result<()> {
    let found = wait_for_visible(page, &cfg.card_selector, cfg.card_timeout_ms).await;
    console.flush(page).await;
    found?;
    info!("Video cards found.");
    report
        .screenshots
        .push(artifacts.capture(page, HOME_HERO).await?);

    let placeholder: Option<String> = page
        .evaluate(&shadow_placeholder_js(&cfg.search_host))
        .await?;
    let placeholder = placeholder.ok_or_else(|| {
        Error::ActionFailed(format!(
            "no input in the shadow root of '{}'",
            cfg.search_host
        ))
    })?;
    info!("Search placeholder: '{}'", placeholder);
    let check = CheckOutcome::evaluate(
        "search placeholder",
        Expectation::Exact(cfg.expected_placeholder.clone()),
        &placeholder,
    );
    check.log("Fallback translation working for search.");
    report.checks.push(check);

    page.execute(&format!("window.scrollTo(0, {})", cfg.scroll_y))
        .await?;
    page.wait(cfg.settle_ms).await;
    console.flush(page).await;
    report
        .screenshots
        .push(artifacts.capture(page, VIDEO_GRID).await?);

    let title: Option<String> = page.evaluate(&inner_text_js(&cfg.title_selector)).await?;
    let title = title.ok_or_else(|| {
        Error::ActionFailed(format!("no element matches '{}'", cfg.title_selector))
    })?;
    info!("First video title: '{}'", title);
    let check = CheckOutcome::evaluate(
        "video title",
        Expectation::Contains(cfg.expected_title_fragment.clone()),
        &title,
    );
    check.log("Mock data loaded correctly.");
    report.checks.push(check);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_str_escapes() {
        assert_eq!(js_str("search-bar"), r#""search-bar""#);
        assert_eq!(js_str(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn test_click_in_shadow_js() {
        let js = click_in_shadow_js("age-verification-modal", "confirm-btn");
        assert!(js.contains(r#"document.querySelector("age-verification-modal")"#));
        assert!(js.contains(r#"getElementById("confirm-btn")"#));
        assert!(js.contains("el.click()"));
    }

    #[test]
    fn test_shadow_placeholder_js() {
        let js = shadow_placeholder_js("search-bar");
        assert!(js.contains(r#"document.querySelector("search-bar")"#));
        assert!(js.contains("shadowRoot.querySelector('input')"));
    }

    #[test]
    fn test_is_hidden_js() {
        let js = is_hidden_js("age-verification-modal");
        assert!(js.contains(r#"document.querySelector("age-verification-modal")"#));
        assert!(js.contains("if (!el) return true"));
    }

    #[test]
    fn test_inner_text_js() {
        let js = inner_text_js(".video-card h3");
        assert!(js.contains(r#"document.querySelector(".video-card h3")"#));
        assert!(js.contains("innerText"));
    }
}
