use error_stack::report;
use std::sync::Arc;
use tracing::{error, info, instrument};
use txn_sheet_sync_core::application::append_sync::APPEND_SYNC_ROUTINE;
use txn_sheet_sync_core::application::snapshot_sync::SNAPSHOT_SYNC_ROUTINE;
use txn_sheet_sync_core::ports::application_service::ApplicationService;
use txn_sheet_sync_core::ports::command_handler::{Command, CommandError, CommandHandler};

pub const USAGE: &str = "usage: txn-sheet-sync <append|snapshot|list|health>
  append    append unverified, not yet pushed transactions and mark them as pushed
  snapshot  overwrite the snapshot range with every verified transaction
  list      list available routines
  health    report service health";

pub struct CliAdapter {
    application_service: Arc<dyn ApplicationService>,
}

impl std::fmt::Debug for CliAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliAdapter")
            .field("application_service", &"<ApplicationService>")
            .finish()
    }
}

impl CliAdapter {
    pub fn new(application_service: Arc<dyn ApplicationService>) -> Self {
        Self {
            application_service,
        }
    }

    #[instrument]
    pub async fn run(&self, command: Command) -> Result<(), Box<dyn std::error::Error>> {
        match self.handle(command).await {
            Ok(result) => {
                info!("{}", result);
                Ok(())
            }
            Err(report) => {
                error!("Command failed: {:?}", report);
                Err(format!("Command failed: {:?}", report).into())
            }
        }
    }

    pub fn parse_args(args: &[String]) -> Result<Command, CommandError> {
        let command = match args.get(1).map(|s| s.as_str()) {
            Some("append") => Command::RunRoutine {
                name: APPEND_SYNC_ROUTINE.to_string(),
            },
            Some("snapshot") => Command::RunRoutine {
                name: SNAPSHOT_SYNC_ROUTINE.to_string(),
            },
            Some("list") => Command::ListRoutines,
            Some("health") => Command::HealthCheck,
            Some(other) => {
                return Err(CommandError::InvalidCommand {
                    details: format!("unknown command '{}'\n{}", other, USAGE),
                })
            }
            None => {
                return Err(CommandError::InvalidCommand {
                    details: USAGE.to_string(),
                })
            }
        };

        if let Some(extra) = args.get(2) {
            return Err(CommandError::InvalidCommand {
                details: format!("unexpected argument '{}'\n{}", extra, USAGE),
            });
        }

        Ok(command)
    }
}

#[async_trait::async_trait]
impl CommandHandler for CliAdapter {
    #[instrument]
    async fn handle(&self, command: Command) -> error_stack::Result<String, CommandError> {
        match command {
            Command::RunRoutine { name } => {
                self.application_service
                    .run_routine_by_name(&name)
                    .await
                    .map_err(|e| {
                        report!(CommandError::ExecutionFailed {
                            details: format!("Failed to run routine {}: {:?}", name, e),
                        })
                    })?;

                Ok(format!("✅ Routine '{}' completed successfully", name))
            }
            Command::ListRoutines => {
                let routines = self.application_service.list_available_routines().await;
                Ok(format!("Available routines:\n{}", routines.join("\n")))
            }
            Command::HealthCheck => {
                let health = self.application_service.health_check().await.map_err(|e| {
                    report!(CommandError::ExecutionFailed {
                        details: format!("Health check failed: {:?}", e),
                    })
                })?;

                Ok(health)
            }
        }
    }
}
