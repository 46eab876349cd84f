use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::analysis::{self, aggregates, FilterCriteria};
use crate::dashboard_error::DashboardError;
use crate::importers::{load_dataset_from_bytes, load_dataset_from_path};
use crate::models::{
    ConsumptionReport, DashboardView, Dataset, DatasetOverview, FilterOptions, RecordTable, Source,
};

/// Holds the currently loaded workbook and answers dashboard queries over it
///
/// Every query re-derives its view from the dataset and the request's
/// filters; the only shared state is the dataset slot, swapped on upload.
#[derive(Clone)]
pub struct DashboardService {
    dataset: Arc<RwLock<Option<Arc<Dataset>>>>,
    ranking_size: usize,
}

impl DashboardService {
    pub fn new(ranking_size: usize) -> Self {
        Self {
            dataset: Arc::new(RwLock::new(None)),
            ranking_size,
        }
    }

    /// Parse an uploaded workbook and make it the current dataset
    ///
    /// On error the previously loaded dataset stays in place.
    #[instrument(skip(self, bytes), fields(file_name = %file_name, size = bytes.len()))]
    pub async fn load_workbook_bytes(
        &self,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<DatasetOverview, DashboardError> {
        // calamine is synchronous
        let dataset =
            tokio::task::spawn_blocking(move || load_dataset_from_bytes(file_name, bytes))
                .await??;
        Ok(self.replace_dataset(dataset).await)
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn load_workbook_path(&self, path: PathBuf) -> Result<DatasetOverview, DashboardError> {
        let dataset = tokio::task::spawn_blocking(move || load_dataset_from_path(path)).await??;
        Ok(self.replace_dataset(dataset).await)
    }

    async fn replace_dataset(&self, dataset: Dataset) -> DatasetOverview {
        let overview = dataset.overview();
        *self.dataset.write().await = Some(Arc::new(dataset));
        info!(
            "Loaded workbook {}: {} internal and {} external records",
            overview.file_name, overview.internal.rows_kept, overview.external.rows_kept
        );
        overview
    }

    /// The current dataset, or `NoWorkbookLoaded` before the first upload
    pub async fn current(&self) -> Result<Arc<Dataset>, DashboardError> {
        self.dataset
            .read()
            .await
            .clone()
            .ok_or(DashboardError::NoWorkbookLoaded)
    }

    pub async fn overview(&self) -> Result<DatasetOverview, DashboardError> {
        Ok(self.current().await?.overview())
    }

    pub async fn filter_options(&self) -> Result<FilterOptions, DashboardError> {
        let dataset = self.current().await?;
        Ok(aggregates::filter_options(
            dataset.internal.iter().chain(dataset.external.iter()),
        ))
    }

    #[instrument(skip(self))]
    pub async fn dashboard(&self, criteria: &FilterCriteria) -> Result<DashboardView, DashboardError> {
        let dataset = self.current().await?;
        Ok(analysis::build_dashboard(&dataset, criteria, self.ranking_size))
    }

    #[instrument(skip(self))]
    pub async fn records(
        &self,
        source: Source,
        criteria: &FilterCriteria,
    ) -> Result<RecordTable, DashboardError> {
        let dataset = self.current().await?;
        Ok(analysis::record_table(&dataset, source, criteria))
    }

    #[instrument(skip(self))]
    pub async fn consumption(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<ConsumptionReport, DashboardError> {
        let dataset = self.current().await?;
        Ok(analysis::consumption_report(&dataset, criteria))
    }
}
