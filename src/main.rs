use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use launchpad::launcher::{InvocationRequest, Launcher, DEFAULT_ENTRY_METHOD};
use launchpad::resolve::repository::LocalRepository;

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(
    version,
    about = "Resolve a component and its dependencies, then run its entry point in this process"
)]
struct Cli {
    /// group:name:version of the component containing the entry to execute
    #[arg(value_name = "G:N:V")]
    coordinate: String,

    /// Entry type to execute (for artifacts whose manifest names none)
    #[arg(short = 'c', long = "entry-type")]
    entry_type: Option<String>,

    /// Entry method to execute
    #[arg(short = 'm', long = "entry-method", default_value = DEFAULT_ENTRY_METHOD)]
    entry_method: String,

    /// Return the captured exit status instead of terminating the process
    #[arg(short = 'N', long = "no-exit")]
    no_exit: bool,

    /// Define a runtime property before launching (repeatable)
    #[arg(short = 'P', long = "property", value_name = "KEY=VALUE", value_parser = parse_property)]
    properties: Vec<(String, String)>,

    /// Root directory of the local component repository
    #[arg(
        short = 'r',
        long = "repository",
        default_value = "repository",
        env = "LAUNCHPAD_REPOSITORY"
    )]
    repository: PathBuf,

    #[arg(short, long)]
    verbose: bool,

    /// Arguments handed to the component's entry point, after `--`
    #[arg(last = true, value_name = "ARGS")]
    arguments: Vec<String>,
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("launchpad=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("launchpad=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let launcher = Launcher::with_repository(LocalRepository::new(&cli.repository));

    let mut request = InvocationRequest::new()
        .with_entry_method(&cli.entry_method)
        .with_arguments(cli.arguments.clone());
    if let Some(entry_type) = &cli.entry_type {
        request = request.with_entry_type(entry_type);
    }
    for (key, value) in &cli.properties {
        request = request.with_property(key, value);
    }

    match launcher.run(&cli.coordinate, &request) {
        Ok(status) => {
            if !cli.no_exit {
                // Interception is disarmed by the time run() returns, so
                // this terminates the process for real.
                launchpad::exit::request_exit(status);
            }
            ExitCode::from(u8::try_from(status.rem_euclid(256)).unwrap_or(1))
        }
        Err(e) => {
            eprintln!("error[{}]: {}", e.stage(), e);
            ExitCode::FAILURE
        }
    }
}
