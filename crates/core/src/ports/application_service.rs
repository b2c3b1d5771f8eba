use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplicationServiceError {
    #[error("Routine not found: {name}")]
    RoutineNotFound { name: String },
    #[error("Routine execution failed: {details}")]
    RoutineExecutionFailed { details: String },
}

#[async_trait::async_trait]
pub trait ApplicationService: Send + Sync {
    async fn run_routine_by_name(
        &self,
        name: &str,
    ) -> error_stack::Result<(), ApplicationServiceError>;

    async fn list_available_routines(&self) -> Vec<String>;

    async fn health_check(&self) -> error_stack::Result<String, ApplicationServiceError>;
}
