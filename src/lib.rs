//! # premium-ui-verify
//!
//! Headless browser smoke check for the premium video site. Clears local
//! state, loads the entry page, dismisses the age gate, and checks that mock
//! data rendered. Screenshots and a JSON report are written as evidence.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use premium_ui_verify::{Config, Runner};
//!
//! # #[tokio::main]
//! # async fn main() -> premium_ui_verify::Result<()> {
//! let config = Config::load("configs/premium-ui.yaml")?;
//! let report = Runner::new(config).run().await?;
//! println!("Success: {}", report.success());
//! # Ok(())
//! # }
//! ```

pub mod check;
mod config;
pub mod report;
mod runner;

pub use check::{CheckOutcome, Expectation};
pub use config::{
    AgeGateConfig, ArtifactsConfig, BrowserConfig, Config, ContentConfig, TargetConfig, Viewport,
};
pub use report::{ConsoleEntry, EntryKind, RunReport, Stage, StageReport, StageStatus};
pub use runner::{screenshots, Artifacts, Runner, Session};

/// Result type for premium-ui-verify operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during config loading or a run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("action failed: {0}")]
    ActionFailed(String),

    #[error("timeout: {0}")]
    Timeout(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_stock_run() {
        let config = Config::default();
        assert!(config.browser.headless);
        assert_eq!(config.browser.viewport, Some(Viewport { width: 1280, height: 800 }));
        assert_eq!(
            config.target.entry_url().unwrap(),
            "http://localhost:8080/index.html"
        );
        assert_eq!(
            config.target.reset_url().unwrap(),
            "http://localhost:8080/404.html"
        );
        assert_eq!(config.target.load_timeout_ms, 30000);
        assert_eq!(config.age_gate.selector, "age-verification-modal");
        assert_eq!(config.age_gate.confirm_id, "confirm-btn");
        assert_eq!(config.age_gate.appear_timeout_ms, 5000);
        assert_eq!(config.age_gate.dismiss_timeout_ms, 3000);
        assert_eq!(config.content.card_selector, ".video-card");
        assert_eq!(config.content.card_timeout_ms, 10000);
        assert_eq!(config.content.expected_placeholder, "Search videos...");
        assert_eq!(config.content.scroll_y, 800);
        assert_eq!(config.content.settle_ms, 1000);
        assert_eq!(config.content.title_selector, ".video-card h3");
        assert_eq!(config.content.expected_title_fragment, "Mock Video");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_empty_document() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.name, "Premium UI verification");
        assert_eq!(config.target.origin, "http://localhost:8080");
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
name: "Staging"
target:
  origin: "http://127.0.0.1:9000"
content:
  expected_placeholder: "Buscar videos..."
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.name, "Staging");
        assert_eq!(
            config.target.entry_url().unwrap(),
            "http://127.0.0.1:9000/index.html"
        );
        assert_eq!(config.content.expected_placeholder, "Buscar videos...");
        // untouched fields keep their defaults
        assert_eq!(config.content.card_selector, ".video-card");
        assert_eq!(config.age_gate.appear_timeout_ms, 5000);
    }

    #[test]
    fn test_parse_browser_config() {
        let yaml = r#"
browser:
  headless: false
  proxy: "http://localhost:3128"
  user_agent: "Custom UA"
  viewport:
    width: 1920
    height: 1080
"#;
        let config = Config::parse(yaml).unwrap();
        assert!(!config.browser.headless);
        assert_eq!(config.browser.proxy, Some("http://localhost:3128".into()));
        assert_eq!(config.browser.user_agent, Some("Custom UA".into()));
        let viewport = config.browser.viewport.unwrap();
        assert_eq!(viewport.width, 1920);
        assert_eq!(viewport.height, 1080);
    }

    #[test]
    fn test_parse_artifacts_config() {
        let yaml = r#"
artifacts:
  dir: "out/verification"
  report: false
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(
            config.artifacts.dir,
            std::path::PathBuf::from("out/verification")
        );
        assert!(!config.artifacts.report);
    }

    #[test]
    fn test_validation_empty_name() {
        let result = Config::parse(r#"name: """#);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("name is required"));
    }

    #[test]
    fn test_validation_bad_origin() {
        let result = Config::parse(
            r#"
target:
  origin: "not a url"
"#,
        );
        assert!(matches!(result, Err(Error::Config(_))));

        let result = Config::parse(
            r#"
target:
  origin: "file:///srv/site"
"#,
        );
        assert!(result.unwrap_err().to_string().contains("http(s)"));
    }

    #[test]
    fn test_validation_relative_entry() {
        let result = Config::parse(
            r#"
target:
  entry: "index.html"
"#,
        );
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("target.entry must start with '/'"));
    }

    #[test]
    fn test_validation_zero_timeout() {
        let result = Config::parse(
            r#"
age_gate:
  appear_timeout_ms: 0
"#,
        );
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("age_gate.appear_timeout_ms must be at least 1"));
    }

    #[test]
    fn test_validation_zero_load_timeout() {
        let result = Config::parse(
            r#"
target:
  load_timeout_ms: 0
"#,
        );
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("target.load_timeout_ms must be at least 1"));
    }

    #[test]
    fn test_validation_zero_viewport() {
        let result = Config::parse(
            r#"
browser:
  viewport:
    width: 0
    height: 800
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_unknown_yaml_type() {
        let result = Config::parse("content: \"nope\"");
        assert!(matches!(result, Err(Error::Yaml(_))));
    }

    #[test]
    fn test_load_example_config() {
        let config = Config::load("configs/premium-ui.yaml").unwrap();
        assert_eq!(config.name, "Premium UI verification");
        assert_eq!(config.target.origin, "http://localhost:8080");
        assert_eq!(config.content.expected_title_fragment, "Mock Video");
    }
}
