//! Cold-Chain Monitor CLI
//!
//! Runs the telemetry pipeline against a line source and serves the
//! dashboard, or produces offline reports from recorded data.

use clap::{Parser, Subcommand};
use coldchain_monitor::counters::{create_shared_counters, SharedCounters};
use coldchain_monitor::ingest::{
    IngestPipeline, LineSource, ProcessedRecord, ReaderLineSource, RiskThresholds,
};
use coldchain_monitor::monitor::{
    run_consumer, summarize, AlertDispatcher, AnalysisClient, CloudUploader, HttpUploadTransport,
    LogNotifier, NoopNotifier, Notifier, SharedHistory,
};
use coldchain_monitor::server::{self, DashboardConfig, DashboardState};
use coldchain_monitor::{Config, VERSION};
use crossbeam_channel::Sender;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "coldchain-monitor")]
#[command(version = VERSION)]
#[command(about = "Cold-chain telemetry monitor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: ingest, monitor, dashboard
    Run {
        /// Line source to read from (serial device node or file); stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,

        /// Keep polling the source after end-of-stream
        #[arg(long)]
        follow: bool,

        /// Dashboard port (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Disable outbound notifications
        #[arg(long)]
        no_alerts: bool,

        /// Disable cloud uploads
        #[arg(long)]
        no_upload: bool,
    },

    /// Print a statistics report over a file of recorded readings
    Report {
        /// Path to a file of processed records, one JSON object per line
        input: PathBuf,
    },

    /// Show the effective configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            follow,
            port,
            no_alerts,
            no_upload,
        } => {
            cmd_run(input, follow, port, no_alerts, no_upload);
        }
        Commands::Report { input } => {
            cmd_report(&input);
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

fn cmd_run(
    input: Option<PathBuf>,
    follow: bool,
    port: Option<u16>,
    no_alerts: bool,
    no_upload: bool,
) {
    let config = Config::load().unwrap_or_default();

    println!("Cold-Chain Monitor v{VERSION}");
    println!();
    println!(
        "  Thresholds: HIGH > {}C, MEDIUM > {}C",
        config.thresholds.high, config.thresholds.medium
    );
    println!("  Filter window: {} samples", config.filter_window);
    println!("  History capacity: {} records", config.history_capacity);

    // Opening the line source is the one startup failure that is fatal.
    let source: Box<dyn LineSource + Send> = match input {
        Some(ref path) => match ReaderLineSource::open(path) {
            Ok(source) => {
                println!("  Source: {}", path.display());
                Box::new(source)
            }
            Err(e) => {
                eprintln!("Error: could not open {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => {
            println!("  Source: stdin");
            Box::new(ReaderLineSource::new(BufReader::new(std::io::stdin())))
        }
    };

    let counters = create_shared_counters();
    let history = SharedHistory::new(config.history_capacity);

    // Optional capabilities are decided once, up front.
    let notifier: Box<dyn Notifier> = if no_alerts || !config.alerts.enabled {
        println!("  Alerts: disabled");
        Box::new(NoopNotifier)
    } else {
        println!(
            "  Alerts: enabled (cooldown: {}s)",
            config.alerts.cooldown.as_secs()
        );
        Box::new(LogNotifier)
    };
    let dispatcher =
        AlertDispatcher::with_settings(notifier, config.alerts.critical_temp, config.alerts.cooldown);

    let uploader = if no_upload || !config.upload.is_configured() {
        println!("  Cloud upload: disabled");
        None
    } else {
        match HttpUploadTransport::new(config.upload.url.clone(), config.upload.api_key.clone()) {
            Ok(transport) => {
                println!(
                    "  Cloud upload: enabled (interval: {}s)",
                    config.upload.interval.as_secs()
                );
                Some(CloudUploader::with_settings(
                    Box::new(transport),
                    config.upload.interval,
                    config.upload.buffer_capacity,
                ))
            }
            Err(e) => {
                eprintln!("Warning: cloud upload initialization failed: {e}");
                eprintln!("Continuing without uploads.");
                None
            }
        }
    };

    let analysis = if config.analysis.is_configured() {
        println!("  Analysis: enabled ({})", config.analysis.model);
        Some(AnalysisClient::new(&config.analysis))
    } else {
        println!("  Analysis: disabled");
        None
    };

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    let (sender, receiver) = crossbeam_channel::unbounded::<ProcessedRecord>();

    // Consumer thread: history, alerts, uploads.
    let consumer = {
        let history = history.clone();
        let counters = counters.clone();
        let running = running.clone();
        thread::spawn(move || {
            run_consumer(receiver, history, dispatcher, uploader, counters, running)
        })
    };

    // Reader thread: line source through the pipeline into the channel.
    let reader = {
        let counters = counters.clone();
        let running = running.clone();
        let thresholds = config.thresholds;
        let filter_window = config.filter_window;
        let sampling_interval = config.sampling_interval;
        thread::spawn(move || {
            run_reader(
                source,
                filter_window,
                thresholds,
                sender,
                counters,
                running,
                follow,
                sampling_interval,
            )
        })
    };

    // Dashboard runs on this thread's runtime until shutdown.
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: could not create async runtime: {e}");
            std::process::exit(1);
        }
    };

    let dashboard_port = port.unwrap_or(config.dashboard.port);
    let dashboard_enabled = config.dashboard.enabled;
    let flag = running.clone();

    runtime.block_on(async {
        let shutdown = if dashboard_enabled {
            let state = DashboardState::new(history.clone(), analysis, counters.clone());
            match server::run(DashboardConfig { port: dashboard_port }, state).await {
                Ok((addr, shutdown_tx)) => {
                    println!();
                    println!("Dashboard: http://{addr}");
                    Some(shutdown_tx)
                }
                Err(e) => {
                    eprintln!("Error: could not start dashboard: {e}");
                    std::process::exit(1);
                }
            }
        } else {
            None
        };

        println!("Press Ctrl+C to stop");
        println!();

        while flag.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }

        if let Some(shutdown_tx) = shutdown {
            let _ = shutdown_tx.send(());
        }
    });

    println!();
    println!("Stopping...");
    // The reader may be blocked on a pending read; it is torn down with
    // the process rather than joined.
    drop(reader);
    let _ = consumer.join();

    println!();
    println!("{}", counters.summary());
}

/// Read-driven context: pull lines, run the pipeline, publish records.
#[allow(clippy::too_many_arguments)]
fn run_reader(
    mut source: Box<dyn LineSource + Send>,
    filter_window: usize,
    thresholds: RiskThresholds,
    sender: Sender<ProcessedRecord>,
    counters: SharedCounters,
    running: Arc<AtomicBool>,
    follow: bool,
    sampling_interval: Duration,
) {
    let mut pipeline = IngestPipeline::new(filter_window, thresholds, counters);

    while running.load(Ordering::SeqCst) {
        let line = match source.next_line() {
            Ok(Some(line)) => line,
            Ok(None) => {
                // End of stream: no reading this cycle.
                if follow {
                    thread::sleep(sampling_interval);
                    continue;
                }
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "read error, retrying");
                thread::sleep(sampling_interval);
                continue;
            }
        };

        if let Some(record) = pipeline.process_line(&line) {
            print_record(&record);
            if sender.send(record).is_err() {
                break;
            }
        }
    }
}

/// Console status line, one per accepted record.
fn print_record(record: &ProcessedRecord) {
    println!(
        "[{}] Temp: {}C (raw: {}C) | Light: {} | Door: {} | Risk: {}",
        record.timestamp,
        record.temp_filtered,
        record.temp_raw,
        record.light,
        if record.door { "OPEN" } else { "CLOSED" },
        record.risk
    );
}

fn cmd_report(input: &Path) {
    let content = match std::fs::read_to_string(input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error: could not read {}: {e}", input.display());
            std::process::exit(1);
        }
    };

    let records: Vec<ProcessedRecord> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();

    match summarize(&records) {
        Ok(report) => println!("{report}"),
        Err(empty) => println!("{empty}"),
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
