use crate::ports::application_service::{ApplicationService, ApplicationServiceError};
use crate::ports::routine::Routine;
use error_stack::{report, ResultExt};
use tracing::{error, info, instrument, Instrument};

/// Runs one sync routine per invocation, picked by name.
pub struct SyncApplicationService {
    routines: Vec<Box<dyn Routine>>,
}

impl SyncApplicationService {
    pub fn new(routines: Vec<Box<dyn Routine>>) -> Self {
        Self { routines }
    }
}

#[async_trait::async_trait]
impl ApplicationService for SyncApplicationService {
    #[instrument(skip(self))]
    async fn run_routine_by_name(
        &self,
        name: &str,
    ) -> error_stack::Result<(), ApplicationServiceError> {
        let routine = self
            .routines
            .iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| {
                report!(ApplicationServiceError::RoutineNotFound {
                    name: name.to_string(),
                })
            })?;

        let result = routine
            .run()
            .instrument(tracing::span!(
                tracing::Level::INFO,
                "routine",
                routine = routine.name()
            ))
            .await;

        match &result {
            Ok(()) => info!("✅ {}: OK", routine.name()),
            Err(report) => error!("❌ {}: {:?}", routine.name(), report),
        }

        result.change_context(ApplicationServiceError::RoutineExecutionFailed {
            details: format!("Routine '{}' failed", name),
        })
    }

    async fn list_available_routines(&self) -> Vec<String> {
        self.routines.iter().map(|r| r.name().to_string()).collect()
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> error_stack::Result<String, ApplicationServiceError> {
        let routine_names: Vec<String> = self.list_available_routines().await;

        Ok(format!(
            "🟢 Transaction Sheet Sync - Healthy\n\
             Routines available: {}\n\
             Routine names: {}",
            routine_names.len(),
            routine_names.join(", ")
        ))
    }
}
