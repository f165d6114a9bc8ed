mod cli;
mod error_fmt;
mod hardware;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use smartbin_config::{Config, Logging};
use smartbin_core::{ControlLoop, Distance, bring_up};
use smartbin_traits::MonotonicClock;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{StartupError, exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("warning: could not install error hooks: {e}");
    }

    let code = match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "smartbin failed");
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            exit_code_for_error(&e)
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> eyre::Result<()> {
    let cfg = smartbin_config::load_path(&cli.config)
        .map_err(|e| eyre::Report::new(StartupError::Config(e.to_string())))?;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging);
    tracing::debug!(config = %cli.config.display(), "configuration loaded");

    match cli.cmd {
        Commands::Run { max_ticks, port } => run_loop(&cfg, max_ticks, port, cli.json),
        Commands::SelfCheck => self_check(&cfg, cli.json),
    }
}

fn run_loop(cfg: &Config, max_ticks: Option<u64>, port: Option<u16>, json: bool) -> eyre::Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
        .wrap_err("install Ctrl-C handler")?;

    let hardware::Assembled { builder, mut link } = hardware::assemble(cfg, port)?;
    let mut control = builder.try_build()?;

    let network: smartbin_core::NetworkCfg = (&cfg.network).into();
    let status = bring_up(&mut *link, &network, &MonotonicClock::new());
    let addr = control.startup(status);
    if json {
        println!(
            "{}",
            serde_json::json!({
                "event": "ready",
                "server": addr.map(|a| a.to_string()),
            })
        );
    } else {
        match addr {
            Some(a) => println!("smart bin ready, status page on port {}", a.port()),
            None => println!("smart bin ready (sensor-only)"),
        }
    }

    let summary = control.run(&shutdown, max_ticks);
    if json {
        println!(
            "{}",
            serde_json::json!({
                "event": "stopped",
                "ticks": summary.ticks,
                "faults": summary.faults,
            })
        );
    } else {
        println!(
            "stopped after {} ticks ({} faults)",
            summary.ticks, summary.faults
        );
    }
    Ok(())
}

fn self_check(cfg: &Config, json: bool) -> eyre::Result<()> {
    let hardware::Assembled { builder, .. } = hardware::assemble(cfg, None)?;
    let mut control: ControlLoop = builder.try_build()?;
    let sample = control.sample();
    control.shutdown();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "lid_cm": sample.lid_distance.cm(),
                "fill_cm": sample.fill_distance.cm(),
                "fill_percentage": sample.fill_pct,
                "status": sample.tier,
            })
        );
    } else {
        println!("lid: {}", describe(sample.lid_distance));
        println!("fill: {}", describe(sample.fill_distance));
        println!("fill level: {:.1}% ({})", sample.fill_pct, sample.tier);
        println!("self-check ok");
    }
    Ok(())
}

fn describe(d: Distance) -> String {
    match d.cm() {
        Some(cm) => format!("{cm:.2} cm"),
        None => "no reading".to_string(),
    }
}

/// Console layer (pretty or JSON) on stderr, plus an optional JSON file sink.
fn init_tracing(json: bool, cli_level: Option<&str>, logging: &Logging) {
    let level = cli_level
        .or(logging.level.as_deref())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (pretty, json_layer) = if json {
        (
            None,
            Some(fmt::layer().json().with_writer(std::io::stderr)),
        )
    } else {
        (
            Some(fmt::layer().with_target(false).with_writer(std::io::stderr)),
            None,
        )
    };

    let file_layer = logging.file.as_deref().map(|file| {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "smartbin.log".to_string());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        fmt::layer().json().with_ansi(false).with_writer(writer)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json_layer)
        .with(file_layer)
        .try_init();
}
