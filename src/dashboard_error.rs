use crate::importers::WorkbookImportError;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("no workbook loaded")]
    NoWorkbookLoaded,
    #[error(transparent)]
    Import(#[from] WorkbookImportError),
    #[error("Workbook parsing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
