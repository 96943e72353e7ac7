//! IMU Recorder - Main Entry Point
//!
//! Headless shell around the recording worker. It drives one session against
//! the configured sensor source, inspects exported files, and manages the
//! config file.

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use imu_recorder::{
    backend::{
        describe_sensors, MockSensorSource, RecorderBackend, RecorderHandle, RecorderMessage,
        SystemClock, WritableDirGate,
    },
    config::{self, AppConfig},
    export::{self, CsvSummary, FsSink},
    session::{ExportOutcome, SessionRecorder, SessionSummary, StartOutcome, StopOutcome},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How long to wait for the worker to answer a stop
const STOP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Parent directory for exports, overriding the config
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Record one session and export it
    Record {
        /// Recording length in seconds
        #[arg(short, long, default_value_t = 10.0)]
        duration: f64,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Summarize an exported CSV file
    Inspect {
        /// Exported file
        file: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },
}

#[derive(Subcommand, Debug, Clone)]
enum ConfigCommand {
    /// Print the effective config
    Show,
    /// Write the default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let _log_guard = init_logging(args.log_file.as_deref())?;

    let config_path = args.config.clone().or_else(config::default_config_path);
    let mut config = match &config_path {
        Some(path) => AppConfig::load_or_default(path),
        None => AppConfig::default(),
    };
    if let Some(output) = &args.output {
        config.export.root_dir = Some(output.clone());
    }

    match args.cmd {
        Commands::Record { duration, json } => record(config, recording_length(duration)?, json),
        Commands::Inspect { file, json } => inspect(&file, json),
        Commands::Config { cmd } => match cmd {
            ConfigCommand::Show => {
                print!("{}", config.to_toml()?);
                Ok(())
            }
            ConfigCommand::Init { force } => {
                let path = config_path.ok_or_else(|| anyhow!("could not determine config path"))?;
                if path.exists() && !force {
                    bail!("{} already exists (use --force to overwrite)", path.display());
                }
                AppConfig::default().save(&path)?;
                println!("Wrote {}", path.display());
                Ok(())
            }
        },
    }
}

/// Validate the `--duration` argument
fn recording_length(secs: f64) -> anyhow::Result<Duration> {
    let duration = Duration::try_from_secs_f64(secs)
        .map_err(|e| anyhow!("invalid duration {}: {}", secs, e))?;
    if Instant::now().checked_add(duration).is_none() {
        bail!("duration {} is too long", secs);
    }
    Ok(duration)
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,imu_recorder=debug"));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    let Some(path) = log_file else {
        registry.init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("invalid log file path {}", path.display()))?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    registry
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();
    Ok(Some(guard))
}

fn record(config: AppConfig, duration: Duration, json: bool) -> anyhow::Result<()> {
    let clock = Arc::new(SystemClock::new());
    let export_dir = config.export_dir();
    tracing::info!("Exports go to {:?}", export_dir);

    let recorder = SessionRecorder::new(
        clock.clone(),
        Box::new(WritableDirGate),
        Box::new(FsSink),
        export_dir,
    );
    let source = MockSensorSource::new(config.mock.clone(), clock);
    let (backend, handle) =
        RecorderBackend::new(recorder, Box::new(source), config.recording.clone());

    let worker = std::thread::Builder::new()
        .name("recorder".to_string())
        .spawn(move || backend.run())
        .context("Failed to spawn recorder thread")?;

    let result = run_session(&handle, duration, json);

    handle.shutdown();
    if worker.join().is_err() {
        tracing::error!("Recorder thread panicked");
    }

    let summary = result?;
    report_summary(&summary, json)?;
    if let ExportOutcome::Failed { error } = &summary.export {
        bail!("export failed: {}", error);
    }
    Ok(())
}

/// Start, record for `duration`, stop, and return the summary
fn run_session(
    handle: &RecorderHandle,
    duration: Duration,
    json: bool,
) -> anyhow::Result<SessionSummary> {
    handle.request_sensors();
    handle.start();

    let deadline = Instant::now()
        .checked_add(duration)
        .ok_or_else(|| anyhow!("duration {:?} is too long", duration))?;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        let Some(msg) = handle.recv_timeout(remaining) else {
            continue;
        };
        match msg {
            RecorderMessage::Sensors(sensors) => {
                if !json {
                    print!("{}", describe_sensors(&sensors));
                }
            }
            RecorderMessage::Start(Ok(StartOutcome::Started { .. })) => {
                tracing::info!("Recording for {:.1} s", duration.as_secs_f64());
            }
            RecorderMessage::Start(Ok(StartOutcome::AlreadyRecording)) => {}
            RecorderMessage::Start(Err(e)) => {
                return Err(anyhow!(e).context("Recording could not start"));
            }
            RecorderMessage::Live(live) => {
                if !json {
                    println!("{}", live.record.display_text(live.record_count));
                }
            }
            RecorderMessage::Shutdown => bail!("recorder stopped unexpectedly"),
            other => tracing::debug!("Ignoring {:?}", other),
        }
    }

    handle.stop();
    let stop_deadline = Instant::now() + STOP_TIMEOUT;
    while let Some(msg) =
        handle.recv_timeout(stop_deadline.saturating_duration_since(Instant::now()))
    {
        match msg {
            RecorderMessage::Stop(StopOutcome::Stopped(summary)) => return Ok(summary),
            RecorderMessage::Stop(StopOutcome::NotRecording) => {
                bail!("recorder was not recording")
            }
            _ => {}
        }
    }
    bail!("timed out waiting for the recorder to stop")
}

fn report_summary(summary: &SessionSummary, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("Recording finished: {} records", summary.record_count);
    match &summary.export {
        ExportOutcome::Written { path } => println!("Data saved to: {}", path.display()),
        ExportOutcome::EmptySession => println!("No data to save"),
        ExportOutcome::Failed { error } => println!("Save failed: {}", error),
    }
    Ok(())
}

fn inspect(file: &Path, json: bool) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let records =
        export::decode(&bytes).with_context(|| format!("Failed to parse {}", file.display()))?;
    let summary = CsvSummary::from_records(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", file.display());
        println!("  records:  {}", summary.record_count);
        println!("  first:    {:.3} ms", summary.first_ms);
        println!("  last:     {:.3} ms", summary.last_ms);
        println!("  duration: {:.3} ms", summary.duration_ms);
    }
    Ok(())
}
