mod cli;
mod error_fmt;
mod session;

use std::io::Write;
use std::path::Path;
use std::sync::atomic::Ordering;

use clap::Parser;
use eyre::{Result, WrapErr};
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::cli::{Cli, Commands, FILE_GUARD};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::session::{Session, go_program};
use plotter_core::{Axis, Command, Limit, PlotterError};

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "command failed");
        if json {
            println!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn run(cli: Cli) -> Result<()> {
    let cfg = load_config(&cli.config)?;
    init_tracing(cli.json, &cli.log_level, &cfg.logging)?;
    tracing::info!(config = %cli.config.display(), command = cli.cmd.name(), "start");

    // UI screens go to stderr when stdout carries JSON
    let ui_out: Box<dyn Write> = if cli.json {
        Box::new(std::io::stderr())
    } else {
        Box::new(std::io::stdout())
    };
    let mut session = Session::from_config(&cfg, ui_out);

    let button = session.button();
    ctrlc::set_handler(move || button.store(true, Ordering::Release))
        .wrap_err("install Ctrl-C handler")?;

    match cli.cmd {
        Commands::SelfCheck => {
            let line = session.plotter().status_line()?;
            if cli.json {
                let missing: Vec<&str> = session
                    .plotter()
                    .disconnected_axes()
                    .into_iter()
                    .map(Axis::label)
                    .collect();
                println!("{}", json!({ "status": line, "disconnected": missing }));
            } else {
                println!("status: {line}");
            }
            session.ensure_connected()?;
            if !cli.json {
                println!("OK");
            }
        }
        Commands::Home => {
            session.ensure_connected()?;
            session.run_program(vec![Command::Home])?;
            let b = session
                .bounds()
                .ok_or_else(|| eyre::eyre!("homing finished without bounds"))?;
            if cli.json {
                let limits: serde_json::Map<String, serde_json::Value> = Limit::ALL
                    .into_iter()
                    .map(|l| (l.name().to_owned(), json!(b.get(l).get())))
                    .collect();
                println!("{}", serde_json::Value::Object(limits));
            } else {
                print!("{}", b.report());
                println!("Homing complete.");
            }
        }
        Commands::Go {
            x,
            y,
            z,
            relative,
            inches,
        } => {
            session.ensure_connected()?;
            session.run_program(go_program(x, y, z, relative, inches))?;
            let p = session.plotter();
            if cli.json {
                println!(
                    "{}",
                    json!({
                        "tool": p.read_axis(Axis::Tool)?.get(),
                        "x": p.read_axis(Axis::X)?.get(),
                        "y": p.read_axis(Axis::Y)?.get(),
                    })
                );
            } else {
                println!("position {}", p.status_line()?);
                println!("Move complete.");
            }
        }
    }
    Ok(())
}

/// Read and validate the TOML config; a missing file yields the defaults.
fn load_config(path: &Path) -> Result<plotter_config::Config> {
    let cfg = if path.exists() {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("read config {}", path.display()))?;
        plotter_config::load_toml(&text).map_err(|e| {
            PlotterError::Config(format!("parse {}: {}", path.display(), e.message()))
        })?
    } else {
        plotter_config::Config::default()
    };
    cfg.validate().map_err(|e| PlotterError::Config(e.to_string()))?;
    Ok(cfg)
}

fn init_tracing(json: bool, level: &str, logging: &plotter_config::Logging) -> Result<()> {
    // RUST_LOG wins over --log-level
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;

    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(console_filter)
            .boxed()
    };

    let mut layers = vec![console];
    if let Some(path) = logging.file.as_deref() {
        let path = Path::new(path);
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("logging.file has no file name"))?;
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        let file_filter = EnvFilter::try_new(logging.level.as_deref().unwrap_or("info"))
            .wrap_err("invalid logging.level")?;
        layers.push(
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(file_filter)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(())
}
