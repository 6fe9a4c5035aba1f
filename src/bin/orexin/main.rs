//! Orexin CLI - run the self-test battery in a terminal
//!
//! Commands:
//! - run: Verify the data directory, then loop menu → test → menu (default)
//! - doctor: Diagnose the data directory and stored results
//! - history: Print stored Session Results for one test

mod terminal;

use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use orexin::battery::{run_battery, show_setup_error, RngFactory};
use orexin::storage::{DataStore, LayoutPolicy};
use orexin::{BatteryConfig, DataError, RunError, TestKind, APP_NAME, OREXIN_VERSION};

use terminal::TerminalFrontend;

/// Orexin - battery of short cognitive self-tests
#[derive(Parser)]
#[command(name = "orexin")]
#[command(version = OREXIN_VERSION)]
#[command(about = "Reaction time, memory, coding, sleepiness and mood self-tests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    options: GlobalOptions,
}

#[derive(clap::Args)]
struct GlobalOptions {
    /// Data directory (defaults to ~/orexin_data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Extra folder of older per-session files to include in history
    #[arg(long, global = true, default_value = "data")]
    legacy_dir: PathBuf,

    /// Frame rate of the test loop
    #[arg(long, global = true, default_value = "60")]
    fps: u32,

    /// Completed PVT trials required to finish
    #[arg(long, global = true, default_value = "10")]
    pvt_trials: u32,

    /// Shortest PVT pre-stimulus delay in seconds
    #[arg(long, global = true, default_value = "1.0")]
    pvt_min_delay: f64,

    /// Longest PVT pre-stimulus delay in seconds
    #[arg(long, global = true, default_value = "3.0")]
    pvt_max_delay: f64,

    /// Length of the symbol substitution test in seconds
    #[arg(long, global = true, default_value = "90")]
    dsst_seconds: u64,

    /// How Session Results are laid out on disk
    #[arg(long, global = true, default_value = "legacy")]
    layout: Layout,

    /// Log filter written to orexin.log (e.g. "info", "orexin=debug")
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Seed for reproducible stimulus sequences
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive battery (default)
    Run,

    /// Diagnose the data directory and stored results
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print stored Session Results for one test
    History {
        /// Test name: pvt, digit_span, dsst, sss, feelings (or its test_type)
        test: String,

        /// Pretty-print as a JSON array instead of one record per line
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Layout {
    /// Append PVT, DSST and feelings; one file per digit span / sleepiness session
    Legacy,
    /// Append every test into its own file
    Append,
}

impl From<Layout> for LayoutPolicy {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Legacy => LayoutPolicy::Legacy,
            Layout::Append => LayoutPolicy::Append,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), OrexinCliError> {
    let config = build_config(&cli.options)?;
    let command = cli.command.unwrap_or(Commands::Run);
    let store = match open_store(&cli.options) {
        Ok(store) => store,
        Err(e) if needs_setup_screen(&command, &e) => {
            return report_setup_failure(&config, e);
        }
        Err(e) => return Err(e.into()),
    };

    match command {
        Commands::Run => cmd_run(&config, &store, &cli.options),
        Commands::Doctor { json } => cmd_doctor(&store, json),
        Commands::History { test, pretty } => cmd_history(&store, &test, pretty),
    }
}

/// Setup failures on an interactive run are shown full screen, not as JSON
fn needs_setup_screen(command: &Commands, e: &DataError) -> bool {
    matches!(command, Commands::Run) && e.is_setup_failure()
}

fn build_config(options: &GlobalOptions) -> Result<BatteryConfig, OrexinCliError> {
    if options.fps == 0 {
        return Err(OrexinCliError::InvalidConfig("--fps must be positive".to_string()));
    }
    if !(options.pvt_min_delay >= 0.0 && options.pvt_min_delay <= options.pvt_max_delay)
        || !options.pvt_max_delay.is_finite()
    {
        return Err(OrexinCliError::InvalidConfig(format!(
            "PVT delay range {}..{} s is not valid",
            options.pvt_min_delay, options.pvt_max_delay
        )));
    }

    let mut config = BatteryConfig {
        frame_rate: options.fps,
        ..BatteryConfig::default()
    };
    config.pvt.max_trials = options.pvt_trials;
    config.pvt.min_delay = seconds_flag("--pvt-min-delay", options.pvt_min_delay)?;
    config.pvt.max_delay = seconds_flag("--pvt-max-delay", options.pvt_max_delay)?;
    config.dsst.duration = Duration::from_secs(options.dsst_seconds);
    Ok(config)
}

fn seconds_flag(flag: &str, seconds: f64) -> Result<Duration, OrexinCliError> {
    Duration::try_from_secs_f64(seconds)
        .map_err(|e| OrexinCliError::InvalidConfig(format!("{flag} {seconds}: {e}")))
}

fn open_store(options: &GlobalOptions) -> Result<DataStore, DataError> {
    let policy = LayoutPolicy::from(options.layout);
    let store = match &options.data_dir {
        Some(dir) => DataStore::open(dir, policy),
        None => DataStore::from_home(policy)?,
    };
    Ok(store.with_legacy_dir(&options.legacy_dir))
}

/// File logging into the data directory. The terminal belongs to the UI.
fn init_logging(dir: &Path, filter: &str) -> Option<WorkerGuard> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(dir).ok()?;
    let file_appender = tracing_appender::rolling::never(dir, "orexin.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = tracing_subscriber::EnvFilter::try_new(filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_line_number(true)
                .with_ansi(false),
        )
        .try_init()
        .ok()?;

    Some(guard)
}

fn require_terminal() -> Result<(), OrexinCliError> {
    if !atty::is(atty::Stream::Stdout) || !atty::is(atty::Stream::Stdin) {
        return Err(OrexinCliError::NotATerminal);
    }
    Ok(())
}

/// Hold the setup error on screen until acknowledged, then fail
fn report_setup_failure(config: &BatteryConfig, e: DataError) -> Result<(), OrexinCliError> {
    require_terminal()?;
    let mut frontend = TerminalFrontend::new(config.viewport, config.frame_rate)?;
    show_setup_error(config, &e.to_string(), &mut frontend)?;
    drop(frontend);
    Err(OrexinCliError::Data(e))
}

fn cmd_run(config: &BatteryConfig, store: &DataStore, options: &GlobalOptions) -> Result<(), OrexinCliError> {
    require_terminal()?;

    let setup = store.verify_writable();
    let _guard = match setup {
        Ok(()) => init_logging(store.dir(), &options.log_level),
        Err(_) => None,
    };
    info!(version = OREXIN_VERSION, app = APP_NAME, data_dir = %store.dir().display(), "starting");

    if let Err(e) = setup {
        return report_setup_failure(config, e);
    }

    let mut frontend = TerminalFrontend::new(config.viewport, config.frame_rate)?;

    let mut rngs = RngFactory::new(options.seed);
    let history = run_battery(config, store, &mut frontend, &mut rngs);
    drop(frontend);

    let history = history.map_err(|e| {
        error!(error = %e, "frame loop failed");
        e
    })?;
    for summary in &history {
        println!("{}", summary.status_line());
        if let Some(path) = &summary.saved_to {
            println!("  saved to {}", path.display());
        }
    }
    Ok(())
}

fn cmd_doctor(store: &DataStore, json: bool) -> Result<(), OrexinCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "orexin_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Orexin version {}", OREXIN_VERSION),
    });

    checks.push(DoctorCheck {
        name: "data_directory".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} ({:?} layout)", store.dir().display(), store.policy()),
    });

    let writable = store.verify_writable();
    checks.push(match &writable {
        Ok(()) => DoctorCheck {
            name: "write_probe".to_string(),
            status: CheckStatus::Ok,
            message: "Data directory is writable".to_string(),
        },
        Err(e) => DoctorCheck {
            name: "write_probe".to_string(),
            status: CheckStatus::Error,
            message: e.to_string(),
        },
    });

    if writable.is_ok() {
        for kind in TestKind::ALL {
            let check = match store.load_records(kind) {
                Ok(records) if records.is_empty() => DoctorCheck {
                    name: kind.file_stem().to_string(),
                    status: CheckStatus::Ok,
                    message: "No results stored yet".to_string(),
                },
                Ok(records) => DoctorCheck {
                    name: kind.file_stem().to_string(),
                    status: CheckStatus::Ok,
                    message: format!("{} results stored", records.len()),
                },
                Err(e) => DoctorCheck {
                    name: kind.file_stem().to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                },
            };
            checks.push(check);
        }
    }

    let terminal_check = if atty::is(atty::Stream::Stdout) {
        DoctorCheck {
            name: "terminal".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a TTY (interactive battery available)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "terminal".to_string(),
            status: CheckStatus::Warning,
            message: "stdout is not a TTY; 'orexin run' will refuse to start".to_string(),
        }
    };
    checks.push(terminal_check);

    let report = DoctorReport {
        app: APP_NAME.to_string(),
        version: OREXIN_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Orexin Doctor Report");
        println!("====================");
        println!("App:     {}", report.app);
        println!("Version: {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(OrexinCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_history(store: &DataStore, test: &str, pretty: bool) -> Result<(), OrexinCliError> {
    let kind = TestKind::from_name(test).ok_or_else(|| OrexinCliError::UnknownTest(test.to_string()))?;
    let records = store.load_records(kind)?;

    if pretty {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for record in &records {
            println!("{}", serde_json::to_string(record)?);
        }
    }
    Ok(())
}

// Error handling

#[derive(Debug)]
enum OrexinCliError {
    Io(io::Error),
    Data(DataError),
    Run(RunError),
    Json(serde_json::Error),
    InvalidConfig(String),
    UnknownTest(String),
    NotATerminal,
    DoctorFailed,
}

impl From<io::Error> for OrexinCliError {
    fn from(e: io::Error) -> Self {
        OrexinCliError::Io(e)
    }
}

impl From<DataError> for OrexinCliError {
    fn from(e: DataError) -> Self {
        OrexinCliError::Data(e)
    }
}

impl From<RunError> for OrexinCliError {
    fn from(e: RunError) -> Self {
        OrexinCliError::Run(e)
    }
}

impl From<serde_json::Error> for OrexinCliError {
    fn from(e: serde_json::Error) -> Self {
        OrexinCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<OrexinCliError> for CliError {
    fn from(e: OrexinCliError) -> Self {
        match e {
            OrexinCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check that the terminal supports raw mode".to_string()),
            },
            OrexinCliError::Data(e) if e.is_setup_failure() => CliError {
                code: "DATA_SETUP_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Pass --data-dir with a writable directory".to_string()),
            },
            OrexinCliError::Data(e) => CliError {
                code: "DATA_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'orexin doctor' for details".to_string()),
            },
            OrexinCliError::Run(e) => CliError {
                code: "FRONTEND_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("See orexin.log in the data directory".to_string()),
            },
            OrexinCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            OrexinCliError::InvalidConfig(msg) => CliError {
                code: "INVALID_CONFIG".to_string(),
                message: msg,
                hint: Some("Run 'orexin --help' for valid options".to_string()),
            },
            OrexinCliError::UnknownTest(name) => CliError {
                code: "UNKNOWN_TEST".to_string(),
                message: format!("No test named '{}'", name),
                hint: Some("Use one of: pvt, digit_span, dsst, sss, feelings".to_string()),
            },
            OrexinCliError::NotATerminal => CliError {
                code: "NOT_A_TERMINAL".to_string(),
                message: "The battery needs an interactive terminal".to_string(),
                hint: Some("Run from a terminal, or use 'doctor' / 'history'".to_string()),
            },
            OrexinCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    app: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
