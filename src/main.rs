use std::process::ExitCode;
use std::sync::Arc;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod report;
mod server;

use crate::config::args::{self, USAGE};
use crate::config::{AppState, CliAction, CliOverrides, Config};
use crate::error::ServerError;
use crate::logger::LogWriter;
use crate::report::CommandValidator;

fn main() -> ExitCode {
    let overrides = match args::parse(std::env::args().skip(1)) {
        Ok(CliAction::Run(overrides)) => overrides,
        Ok(CliAction::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(&overrides) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(overrides: &CliOverrides) -> Result<(), ServerError> {
    let cfg = Config::load(overrides)?;
    let log = logger::init(&cfg).map_err(ServerError::Logger)?;

    // One runtime worker per validation worker
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cfg.server.threads)
        .enable_all()
        .build()
        .map_err(ServerError::Runtime)?;

    let result = runtime.block_on(async_main(cfg, log));
    // Validations still running are abandoned, not awaited
    runtime.shutdown_background();
    result
}

async fn async_main(cfg: Config, log: Arc<LogWriter>) -> Result<(), ServerError> {
    logger::log_starting(&cfg.server.host, cfg.server.port);
    let listener = server::bind(&cfg.server.host, cfg.server.port).await?;
    let addr = listener.local_addr().map_err(ServerError::Runtime)?;
    logger::log_server_start(&addr, &cfg);

    let validator = Arc::new(CommandValidator::from_config(&cfg.validator));
    let state = Arc::new(AppState::new(cfg, validator, log));
    server::serve(listener, state).await;
    Ok(())
}
