use txn_sheet_sync_core::{
    adapters::{
        config::app_config::AppConfig, ledger::sqlite_ledger::SqliteLedger,
        sheets::spreadsheet_manager::SpreadsheetManager, sheets::worksheet_sink::WorksheetSink,
    },
    application::{
        append_sync::AppendSyncRoutine, service::SyncApplicationService,
        snapshot_sync::SnapshotSyncRoutine,
    },
    ports::{application_service::ApplicationService, routine::Routine, sheet_sink::SheetSink},
};

use std::sync::Arc;

pub struct ApplicationServiceFactory;

impl ApplicationServiceFactory {
    pub async fn create() -> Result<Arc<dyn ApplicationService>, Box<dyn std::error::Error>> {
        let config =
            AppConfig::load().map_err(|report| format!("Failed to load config: {:?}", report))?;
        let routines = Self::create_routines(config).await?;
        let app_service = SyncApplicationService::new(routines);
        Ok(Arc::new(app_service))
    }

    async fn create_routines(
        config: AppConfig,
    ) -> Result<Vec<Box<dyn Routine>>, Box<dyn std::error::Error>> {
        let ledger = SqliteLedger::new(config.database.clone());

        let spreadsheet_manager = Arc::new(
            SpreadsheetManager::new(config.sheets.clone())
                .await
                .map_err(|report| format!("Failed to set up Google Sheets: {:?}", report))?,
        );

        let append_sheet: Arc<dyn SheetSink> = Arc::new(
            WorksheetSink::new(Arc::clone(&spreadsheet_manager), &config.sheets.append)
                .map_err(|report| format!("Invalid append target: {:?}", report))?,
        );
        let snapshot_sheet: Arc<dyn SheetSink> = Arc::new(
            WorksheetSink::new(Arc::clone(&spreadsheet_manager), &config.sheets.snapshot)
                .map_err(|report| format!("Invalid snapshot target: {:?}", report))?,
        );

        Ok(vec![
            Box::new(AppendSyncRoutine::new(ledger.clone(), append_sheet)),
            Box::new(SnapshotSyncRoutine::new(ledger, snapshot_sheet)),
        ])
    }
}
