//! sysglance: print a one-shot system status report.
//!
//! Reports CPU, memory, disk, battery, uptime and the default network
//! interface with its current throughput. `--watch` repeats until Ctrl-C.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use sysglance::config::GlanceConfig;
use sysglance::report::{render_report, write_report};
use sysglance::system::throughput::interval_from_secs;
use sysglance::{Collector, OsSystemInfo, SystemInfo};

#[derive(Parser, Debug)]
#[command(name = "sysglance", version, about = "Point-in-time system status")]
struct Cli {
    /// Seconds between the two network counter reads
    #[arg(short, long)]
    interval: Option<f64>,

    /// Keep printing snapshots until interrupted
    #[arg(short, long)]
    watch: bool,

    /// Extra pause between snapshots in watch mode, in seconds
    #[arg(long)]
    every: Option<f64>,

    /// Mount point reported in the disk line
    #[arg(short, long)]
    mount: Option<PathBuf>,

    /// Skip the battery line
    #[arg(long)]
    no_battery: bool,

    /// Config file (default: platform config dir)
    #[arg(short, long, env = "SYSGLANCE_CONFIG")]
    config: Option<PathBuf>,

    /// Write the effective settings to the config file and exit
    #[arg(long)]
    save_config: bool,

    /// Emit snapshots as JSON
    #[arg(long)]
    json: bool,

    /// Log filter, e.g. "debug" or "sysglance=trace" (default: RUST_LOG or "warn")
    #[arg(long, env = "SYSGLANCE_LOG")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    let mut cfg = GlanceConfig::load(cli.config.as_deref());
    if let Some(secs) = cli.interval {
        cfg.override_interval(secs)?;
    }
    if let Some(secs) = cli.every {
        cfg.watch_every_secs = secs;
    }
    if let Some(mount) = cli.mount {
        cfg.mount_point = mount;
    }
    if cli.no_battery {
        cfg.show_battery = false;
    }
    debug!(?cfg, "effective config");

    if cli.save_config {
        let path = cfg.save(cli.config.as_deref()).context("saving config")?;
        info!(path = %path.display(), "config saved");
        println!("{}", path.display());
        return Ok(());
    }

    let interval = interval_from_secs(cfg.interval_secs)?;
    let mut collector = Collector::new(OsSystemInfo::new(), interval, cfg.mount_point.clone())
        .with_battery(cfg.show_battery);

    loop {
        let snapshot = collector.collect()?;

        if cli.json {
            println!("{}", serde_json::to_string(&snapshot)?);
        } else {
            let mut stdout = io::stdout();
            write_report(&mut stdout, &render_report(&snapshot))?;
        }

        if !cli.watch {
            return Ok(());
        }
        if !cli.json {
            println!();
        }
        match Duration::try_from_secs_f64(cfg.watch_every_secs) {
            Ok(pause) if !pause.is_zero() => collector.provider_mut().sleep(pause),
            _ => {}
        }
    }
}

fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).context("invalid log filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}
