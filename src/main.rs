//! `cv-update`: run the content view lifecycle against a Katello server

use std::process;
use std::sync::Arc;

use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use cv_lifecycle::cli::{self, Invocation};
use cv_lifecycle::config::{env_layer, resolve_config_path, EffectiveConfig};
use cv_lifecycle::console::{timestamp, Console, TerminalConsole};
use cv_lifecycle::{ExitCode, HttpTransport, KatelloClient, LifecyclePipeline, ThreadSleeper};

fn main() {
    let cli = match cli::parse_args(std::env::args()) {
        Invocation::Run(cli) => cli,
        Invocation::Help(text) => {
            print!("{}", text);
            process::exit(ExitCode::Success.code());
        }
        Invocation::Invalid { args, message } => {
            eprintln!("{}", message.trim_end());
            println!("{}", cli::usage());
            println!("Invalid argument(s) detected \"{}\" !!!", args.join(" "));
            process::exit(ExitCode::Usage.code());
        }
    };

    init_logging();

    let lookup = |key: &str| std::env::var(key).ok();
    let config_path = resolve_config_path(cli.config.as_deref(), lookup);
    let config = match EffectiveConfig::build(config_path.as_deref(), env_layer(lookup)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(ExitCode::Config.code());
        }
    };
    if let Ok(json) = config.to_json() {
        debug!(config = %json, "effective configuration");
    }

    let http = config.settings.http_config();
    let base_url = http.base_url.clone();
    let transport = match HttpTransport::new(http) {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(ExitCode::Config.code());
        }
    };

    let client = KatelloClient::new(Arc::new(transport), base_url);
    let console = TerminalConsole::new();
    let sleeper = ThreadSleeper;
    let pipeline = LifecyclePipeline::new(&client, &console, &sleeper, config.settings.pipeline_config());

    match pipeline.run(cli.mode()) {
        Ok(report) => {
            for line in report.summary_lines() {
                console.persistent(&line);
            }
            process::exit(ExitCode::Success.code());
        }
        Err(e) => {
            error!(error = %e, "lifecycle run aborted");
            eprintln!("{} {}", timestamp(), e);
            process::exit(e.exit_code().code());
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default: warn)
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
