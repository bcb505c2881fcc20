use fmig::cli::{AppConfig, Args};
use fmig::logging::{init_logging, LogOptions};
use fmig::organizer::Organizer;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse_args();

    // Keep the guard alive so the log file is flushed on exit
    let _log_guard = match init_logging(LogOptions {
        verbose: args.verbose,
        log_file: args.log_file.as_deref(),
    }) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = match args
        .load_user_config()
        .and_then(|user_config| AppConfig::resolve(&args, &user_config))
    {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match Organizer::new(config).run() {
        Ok(stats) => ExitCode::from(stats.exit_code()),
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
