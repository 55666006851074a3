use nativeflow::cli::{handle_build, handle_devices, CliArgs, Commands};
use nativeflow::observability::{init_tracing, parse_level, LogFormat};
use nativeflow::VERSION;

use clap::Parser;
use std::env;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("nativeflow v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match args.command {
        Commands::Build(build_args) => handle_build(build_args).await,
        Commands::Devices(devices_args) => handle_devices(devices_args).await,
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        let level_str = env::var("NATIVEFLOW_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        parse_level(&level_str)
    };

    let format = args.log_format.parse().unwrap_or_else(|e: String| {
        eprintln!("{e}, defaulting to human");
        LogFormat::Human
    });

    init_tracing(level, format);
}
