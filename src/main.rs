// Trade assistant entry point.
//
// Startup sequence:
// 1. Parse command-line arguments
// 2. Initialize tracing (log to file, not terminal)
// 3. Load config
// 4. Load reference tables
// 5. Run the interactive session
// 6. Render the report

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use trade_assistant::config;
use trade_assistant::report;
use trade_assistant::session::{Session, SessionError};
use trade_assistant::store::ReferenceStore;

/// Evaluate a fantasy football trade against projections, last season's
/// points, bye weeks and injury risk.
#[derive(Parser, Debug)]
#[command(name = "trade-assistant", version, about)]
struct Cli {
    /// Directory containing config/ (or defaults/) and the data files
    #[arg(short, long, default_value = ".")]
    base_dir: PathBuf,

    /// Current NFL week; prompted for when omitted
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=17))]
    week: Option<u8>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    // 1. Parse command-line arguments
    let cli = Cli::parse();

    // 2. Initialize tracing
    init_tracing(&cli.base_dir)?;
    info!("Trade assistant starting up");

    // 3. Load config
    let config = config::load_config(&cli.base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, season {}, {} bye-week entries",
        config.league.name,
        config.league.season,
        config.league.bye_weeks.len()
    );

    // 4. Load reference tables
    let store = ReferenceStore::load(&config).context("failed to load reference data")?;
    info!(
        "Loaded {} projections, {} statistics rows",
        store.projection_count(),
        store.statistics_count()
    );

    // 5. Run the interactive session
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(&store, stdin.lock(), stdout.lock());
    let report = match session.run(&config, cli.week) {
        Ok(report) => report,
        Err(SessionError::InputClosed) => {
            info!("Input closed before the trade was complete");
            return Ok(());
        }
        Err(e) => {
            error!("Session failed: {}", e);
            return Err(e).context("trade evaluation failed");
        }
    };
    drop(session);

    // 6. Render the report
    let mut out = io::stdout().lock();
    if cli.json {
        report::render_json(&report, &mut out).context("failed to write JSON report")?;
    } else {
        report::render(&report, &mut out).context("failed to write report")?;
    }
    out.flush()?;

    info!(
        "Trade assistant finished: acquired {:.1}, departed {:.1}",
        report.value.acquired, report.value.departed
    );
    Ok(())
}

/// Initialize tracing to log to a file (stdout carries the conversation).
fn init_tracing(base_dir: &std::path::Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = base_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("trade-assistant.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("trade_assistant=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
