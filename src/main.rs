use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use multisite_plugins::model::config::{AppConfig, OutputFormat};
use multisite_plugins::{AdminContext, App, Invocation, ReportError};

#[derive(Parser)]
#[command(
    name = "ms-plugins",
    version,
    about = "Report which plugins are active on which sites of a multisite network"
)]
struct Cli {
    /// Config file layered over the built-in defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Network snapshot to report on
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,
    /// Login to request the report as
    #[arg(long)]
    user: Option<String>,
    /// Admin screen the request comes from
    #[arg(long, value_enum, default_value_t = AdminContext::Network)]
    context: AdminContext,
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// Write the report here instead of stdout
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ReportError>() {
                Some(ReportError::AccessDenied) => eprintln!("Access denied."),
                _ => eprintln!("ms-plugins error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);

    // Logs go to a file; stdout carries the report.
    let log_dir = directories::ProjectDirs::from("", "", "ms-plugins")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("ms-plugins"));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "ms-plugins.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();

    tracing::info!("ms-plugins starting");

    let invocation = Invocation {
        login: config.general.user.clone(),
        context: cli.context,
    };
    App::new(config).run(&invocation)
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(snapshot) = &cli.snapshot {
        config.general.snapshot_path = snapshot.to_string_lossy().into_owned();
    }
    if let Some(user) = &cli.user {
        config.general.user = user.clone();
    }
    if let Some(format) = cli.format {
        config.report.format = format;
    }
    if let Some(output) = &cli.output {
        config.general.output_path = Some(output.to_string_lossy().into_owned());
    }
}
