use std::env;
use std::sync::Arc;
use tracing::{error, info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};
use txn_sheet_sync_core::prettyprint::PrettyFormatter;

mod application_service_factory;
mod cli_adapter;

use application_service_factory::ApplicationServiceFactory;
use cli_adapter::CliAdapter;

const LOG_FILE: &str = "txn_sheet_sync.log";

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing()?;
    setup_panic_hook();

    let args: Vec<String> = env::args().collect();

    // Reject bad arguments before touching config, database or credentials
    let command = CliAdapter::parse_args(&args)?;

    info!("Starting txn-sheet-sync");

    let app_service = ApplicationServiceFactory::create().await?;
    let cli_adapter = Arc::new(CliAdapter::new(app_service));

    match cli_adapter.run(command).await {
        Ok(_) => {
            info!("CLI execution completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("CLI execution failed: {:?}", e);
            Err(e)
        }
    }
}

fn setup_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let stdout_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true))
        .with_writer(std::io::stderr);

    let log_file_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(false))
        .with_writer(std::fs::File::create(LOG_FILE)?)
        .with_ansi(false);

    Registry::default()
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_target("txn_sheet_sync", tracing::Level::TRACE)
                .with_target("txn_sheet_sync_core", tracing::Level::TRACE),
        )
        .with(log_file_layer)
        .with(stdout_layer)
        .init();

    Ok(())
}

fn setup_panic_hook() {
    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
    }));
}
