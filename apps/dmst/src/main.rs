use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use selection_engine::{handle_request, HostSurface, MemoryHost, SelectionSetEngine};
use shared::{
    domain::{OptionEntry, OptionPool, OptionValue},
    error::{ApiError, ApiException, ErrorCode},
    protocol::{WidgetRequest, WidgetResponse},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_pool, load_settings, Settings};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "dmst.toml")]
    config: PathBuf,
    /// Pool file (JSON or TOML); overrides `pool_path` from settings.
    #[arg(long)]
    pool: Option<PathBuf>,
    /// Check engine invariants after every request.
    #[arg(long)]
    verify: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute newline-delimited JSON requests and print one response per line.
    Run { script: PathBuf },
    /// Walk through picking, exhausting and clearing a three-option pool.
    Demo,
    /// Print the effective option pool.
    Pool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli.config)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Run { script } => {
            let pool = resolve_pool(&cli, &settings)?;
            let engine = new_engine(&settings, pool);
            let stdout = io::stdout();
            run_script(engine, script, cli.verify, &mut stdout.lock())
        }
        Command::Demo => run_demo(&settings, cli.verify),
        Command::Pool => {
            let pool = resolve_pool(&cli, &settings)?;
            println!("{}", serde_json::to_string_pretty(&pool)?);
            Ok(())
        }
    }
}

fn resolve_pool(cli: &Cli, settings: &Settings) -> Result<OptionPool> {
    match cli.pool.as_ref().or(settings.pool_path.as_ref()) {
        Some(path) => {
            let pool = load_pool(path)?;
            info!(path = %path.display(), options = pool.len(), "loaded option pool");
            Ok(pool)
        }
        None => {
            warn!("no pool file configured; controls will only offer the non-value");
            Ok(OptionPool::default())
        }
    }
}

fn new_engine(settings: &Settings, pool: OptionPool) -> SelectionSetEngine<MemoryHost> {
    let mut host = MemoryHost::new();
    let container = host.create_container();
    SelectionSetEngine::new(host, container, settings.engine_config(pool))
}

fn dispatch(
    engine: &mut SelectionSetEngine<MemoryHost>,
    request: WidgetRequest,
    verify: bool,
) -> std::result::Result<WidgetResponse, ApiError> {
    let response = handle_request(engine, request)?;
    if verify {
        engine
            .check_invariants()
            .map_err(|violation| ApiError::new(ErrorCode::Internal, violation.to_string()))?;
    }
    Ok(response)
}

fn run_script(
    mut engine: SelectionSetEngine<MemoryHost>,
    script: &Path,
    verify: bool,
    out: &mut impl Write,
) -> Result<()> {
    let raw = fs::read_to_string(script)
        .with_context(|| format!("failed to read script '{}'", script.display()))?;

    for (line_no, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let response = match serde_json::from_str::<WidgetRequest>(line) {
            Ok(request) => {
                dispatch(&mut engine, request, verify).unwrap_or_else(WidgetResponse::Error)
            }
            Err(err) => WidgetResponse::Error(ApiError::new(
                ErrorCode::Validation,
                format!("line {}: {err}", line_no + 1),
            )),
        };
        writeln!(out, "{}", serde_json::to_string(&response)?)?;
    }

    info!(controls = engine.controls().len(), "script finished");
    Ok(())
}

fn demo_pool() -> OptionPool {
    OptionPool::new([
        OptionEntry::new("A", "1"),
        OptionEntry::new("B", "2"),
        OptionEntry::new("C", "3"),
    ])
}

fn run_demo(settings: &Settings, verify: bool) -> Result<()> {
    let mut host = MemoryHost::new();
    let container = host.create_container();
    let config = settings
        .engine_config(OptionPool::default())
        .with_loader(|_| demo_pool());
    let mut engine = SelectionSetEngine::new(host, container, config);
    let non_value = engine.non_value().value.clone();

    print_controls("start", &engine);
    let steps = [
        ("pick A on control 1", 0, OptionValue::from("1")),
        ("pick B on control 2", 1, OptionValue::from("2")),
        ("pick C on control 3", 2, OptionValue::from("3")),
        ("clear control 2", 1, non_value),
    ];
    for (title, position, value) in steps {
        dispatch(
            &mut engine,
            WidgetRequest::Select { position, value },
            verify,
        )
        .map_err(ApiException::from)?;
        print_controls(title, &engine);
    }

    let pairs = engine.selected_name_value_pairs();
    println!("selected: {}", serde_json::to_string(&pairs)?);
    Ok(())
}

fn print_controls(title: &str, engine: &SelectionSetEngine<MemoryHost>) {
    println!("== {title}");
    for control in engine.controls() {
        let selected = engine.host().get_selected_value(&control);
        let options: Vec<String> = engine
            .host()
            .list_option_entries(&control)
            .into_iter()
            .map(|entry| {
                if Some(&entry.value) == selected.as_ref() {
                    format!("[{}]", entry.label)
                } else {
                    entry.label
                }
            })
            .collect();
        println!("  {:?}: {}", control, options.join(" "));
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
