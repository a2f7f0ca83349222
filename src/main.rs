//! breathwork binary entry point.

use std::process::ExitCode;

use breathwork::api::{serve_with_state, AppState};
use breathwork::cli::{self, Args};
use breathwork::config::Config;
use breathwork::logging;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run 'breathwork --help' for usage.");
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }

    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(args)?;

    if let Err(e) = logging::init_with_filter(config.log_filter()) {
        eprintln!("warning: logging not initialized: {}", e);
    }

    info!("breathwork v{}", env!("CARGO_PKG_VERSION"));

    let server_config = config.to_server_config()?;
    let state = AppState::with_defaults(config.session_defaults());

    serve_with_state(server_config, state).await?;
    Ok(())
}
