use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};

use replset_doctor::report::{export_json, render_elections, render_text};
use replset_doctor::{
    FileSource, ReplSetStatusDoc, Settings, SnapshotSource, StatusData, StreamSource, Thresholds,
    Timeline,
};

#[derive(Parser, Debug)]
#[command(name = "replset-doctor")]
#[command(about = "Decode replica-set status snapshots and report lag, health and elections")]
struct Args {
    /// Snapshot file (single snapshot, JSON array or newline-delimited JSON)
    #[arg(short, long, default_value = "replset.json", conflicts_with = "connect")]
    file: PathBuf,

    /// Read newline-delimited snapshots from a TCP endpoint (host:port)
    #[arg(short, long)]
    connect: Option<String>,

    /// Config file (TOML, YAML or JSON); REPLSET_DOCTOR_* variables override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replication lag warning threshold (e.g., "10s", "1m")
    #[arg(long)]
    lag_warn: Option<String>,

    /// Replication lag critical threshold (e.g., "60s", "5m")
    #[arg(long)]
    lag_crit: Option<String>,

    /// Reject data-bearing members whose optime cannot be read
    #[arg(long)]
    strict: bool,

    /// Export a JSON summary to this file instead of printing reports
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut settings = Settings::load(args.config.as_deref())
        .context("Failed to load settings")?;
    if let Some(ref lag) = args.lag_warn {
        settings.lag_warning = lag.clone();
    }
    if let Some(ref lag) = args.lag_crit {
        settings.lag_critical = lag.clone();
    }
    if args.strict {
        settings.strict_optime = true;
    }
    let thresholds = settings.thresholds()?;

    let mut report = Report::new(thresholds, settings.history, args.export.is_none());

    if let Some(ref addr) = args.connect {
        run_with_tcp(addr, &settings, &mut report)?;
    } else {
        run_with_file(&args.file, &settings, &mut report)?;
    }

    if let Some(export_path) = args.export {
        return report.export_to_file(&export_path);
    }

    print!("{}", render_elections(&report.timeline.elections()));
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Run with a file-based data source
fn run_with_file(path: &Path, settings: &Settings, report: &mut Report) -> Result<()> {
    let mut source = FileSource::new(path).with_validator(settings.validator());
    info!(source = source.description(), "Reading snapshots");

    while let Some(doc) = source.poll() {
        report.record(doc);
    }

    if let Some(err) = source.error() {
        if report.timeline.is_empty() {
            anyhow::bail!("{}: {}", source.description(), err);
        }
        warn!(source = source.description(), error = %err, "Some snapshots were skipped");
    }
    Ok(())
}

/// Run with a TCP stream data source until the peer closes the connection
fn run_with_tcp(addr: &str, settings: &Settings, report: &mut Report) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        use tokio::net::TcpStream;

        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("Failed to connect to {}", addr))?;
        info!(addr, "Connected");

        let mut source = StreamSource::spawn(stream, addr, settings.validator());
        while let Some(doc) = source.next().await {
            report.record(doc);
        }
        if let Some(err) = source.error() {
            warn!(source = source.description(), error = %err, "Stream ended with an error");
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// Accumulates snapshots and prints per-snapshot reports as they arrive.
struct Report {
    thresholds: Thresholds,
    timeline: Timeline,
    latest: Option<StatusData>,
    print: bool,
}

impl Report {
    fn new(thresholds: Thresholds, history: usize, print: bool) -> Self {
        Self {
            thresholds,
            timeline: Timeline::with_capacity(history),
            latest: None,
            print,
        }
    }

    fn record(&mut self, doc: ReplSetStatusDoc) {
        let status = StatusData::from_doc(&doc, &self.thresholds);
        if let Err(e) = self.timeline.push(doc) {
            warn!(error = %e, "Dropping snapshot");
            return;
        }
        if self.print {
            print!("{}", render_text(&status));
        }
        self.latest = Some(status);
    }

    /// Export the summary to a JSON file
    fn export_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&export_json(self.latest.as_ref(), &self.timeline))?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        println!("Exported replica-set summary to: {}", path.display());
        Ok(())
    }
}
