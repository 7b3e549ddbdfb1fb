use std::{fs::read_to_string, path::PathBuf};

use clap::Parser;
use common::config::{Settings, TimeUnit};
use eyre::{Result, WrapErr};
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

mod plot;

const MODULES: &[&str] = &["common", "engine_compare"];

/// Plot storage engine benchmark logs side by side
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// JSON log file(s) to use
    files: Vec<PathBuf>,
    /// Write rendered plots to this file [default: results.html]
    #[arg(short = 'O', long)]
    output: Option<PathBuf>,
    /// Location of the ECharts assets
    #[arg(long)]
    assets: Option<String>,
    /// Unit of the time axis: ms, s or min
    #[arg(long)]
    time_unit: Option<TimeUnit>,
    /// Page title
    #[arg(long)]
    title: Option<String>,
    /// YAML settings file, flags take precedence over it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Extra tracing directives, e.g. `common=debug`
    #[arg(short, long)]
    log: Vec<String>,
    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let _guard = init_tracing(&args)?;

    let settings = settings(&args)?;
    if let Err(err) = plot::plot(&args.files, &settings) {
        error!("{err:#?}");
        return Err(err);
    }
    Ok(())
}

fn init_tracing(args: &Cli) -> Result<Option<WorkerGuard>> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("warn".to_owned());
    let mut env_filter = EnvFilter::new(format!("engine_plot={log_level}"));

    for log in &args.log {
        env_filter = env_filter.add_directive(log.parse()?);
    }

    for module in MODULES {
        if !args.log.iter().any(|x| x.starts_with(module)) {
            env_filter = env_filter.add_directive(format!("{module}={log_level}").parse()?);
        }
    }

    let (file_layer, guard) = match &args.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(std::path::Path::new("."));
            let name = path.file_name().ok_or_else(|| eyre::eyre!("Invalid log file {path:?}"))?;
            let (non_blocking, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (
                Some(layer().with_writer(non_blocking).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn settings(args: &Cli) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::from_yaml(
            &read_to_string(path).wrap_err_with(|| format!("Read config {}", path.display()))?,
        )
        .wrap_err_with(|| format!("Parse config {}", path.display()))?,
        None => Settings::default(),
    };

    if let Some(output) = &args.output {
        settings.output = output.clone();
    }
    if let Some(assets) = &args.assets {
        settings.assets = assets.clone();
    }
    if let Some(time_unit) = args.time_unit {
        settings.time_unit = time_unit;
    }
    if let Some(title) = &args.title {
        settings.page_title = title.clone();
    }
    Ok(settings)
}
