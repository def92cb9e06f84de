use clap::Parser;
use premium_ui_verify::{Config, Runner, StageStatus};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "premium-ui-verify")]
#[command(about = "Headless smoke check for the premium video site")]
#[command(version)]
struct Cli {
    /// Config file (defaults reproduce the stock check against localhost:8080)
    config: Option<PathBuf>,

    /// Origin of the running site, e.g. http://localhost:8080 (overrides config)
    #[arg(long)]
    origin: Option<String>,

    /// Screenshot and report directory (overrides config)
    #[arg(long, value_name = "DIR")]
    artifacts: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Validate config without running
    #[arg(long)]
    check: bool,

    /// Exit 0 after a completed run even if checks failed
    #[arg(long)]
    report_only: bool,

    /// Verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let builder = FmtSubscriber::builder()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    // RUST_LOG wins when set
    match EnvFilter::try_from_default_env() {
        Ok(filter) => builder.with_env_filter(filter).init(),
        Err(_) => builder.with_max_level(level).init(),
    }
}

fn load_config(cli: &Cli) -> premium_ui_verify::Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(ref origin) = cli.origin {
        config.target.origin = origin.clone();
    }
    if let Some(ref dir) = cli.artifacts {
        config.artifacts.dir = dir.clone();
    }
    if cli.headed {
        config.browser.headless = false;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> premium_ui_verify::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = load_config(&cli)?;

    if cli.check {
        println!("Config valid: {}", config.name);
        println!("  Entry: {}", config.target.entry_url()?);
        println!("  Reset: {}", config.target.reset_url()?);
        println!("  Artifacts: {}", config.artifacts.dir.display());
        println!("  Headless: {}", config.browser.headless);
        println!(
            "  Age gate: {} (#{})",
            config.age_gate.selector, config.age_gate.confirm_id
        );
        println!("  Cards: {}", config.content.card_selector);
        println!(
            "  Expect placeholder: '{}'",
            config.content.expected_placeholder
        );
        println!(
            "  Expect title containing: '{}'",
            config.content.expected_title_fragment
        );
        return Ok(());
    }

    println!("Running: {}", config.name);

    let runner = Runner::new(config);
    let report = match runner.run().await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("✗ Could not start: {}", e);
            std::process::exit(2);
        }
    };

    println!();
    for stage in &report.stages {
        let mark = match stage.status {
            StageStatus::Passed if stage.is_clean() => "✓",
            StageStatus::Skipped => "-",
            _ => "✗",
        };
        println!("{} {} ({}ms)", mark, stage.stage, stage.duration_ms);
        if let Some(ref message) = stage.message {
            println!("    {}", message);
        }
        for check in &stage.checks {
            let mark = if check.passed { "✓" } else { "✗" };
            println!(
                "    {} {} {} (got '{}')",
                mark, check.name, check.expectation, check.actual
            );
        }
    }
    if let Some(ref reason) = report.aborted {
        println!("✗ Aborted: {}", reason);
    }
    println!(
        "  Browser console: {} entries, {} errors",
        report.console.len(),
        report.browser_errors().count()
    );
    println!("  Duration: {}ms", report.duration_ms);

    let code = if cli.report_only && report.aborted.is_none() {
        0
    } else {
        report.exit_code()
    };
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
