use crate::core::analytics;
use crate::models::{SalaryRecord, SeriesPoint};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading the salary dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Dataset file '{0}' not found")]
    NotFound(PathBuf),

    #[error("Failed to read dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is empty")]
    Empty,
}

/// Read-only salary records backing the charts
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<SalaryRecord>,
}

impl Dataset {
    pub fn new(records: Vec<SalaryRecord>) -> Self {
        Self { records }
    }

    /// Load the cleaned CSV export
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DatasetError::NotFound(path.to_path_buf()));
        }

        let reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
        let dataset = Self::from_reader(reader)?;

        tracing::info!("Loaded {} salary records from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    pub fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self, DatasetError> {
        let records = reader
            .deserialize::<SalaryRecord>()
            .collect::<Result<Vec<_>, _>>()?;

        if records.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SalaryRecord] {
        &self.records
    }

    pub fn job_titles(&self) -> Vec<String> {
        analytics::job_titles(&self.records)
    }

    pub fn top_locations_for_title(&self, title: &str, n: usize) -> Vec<SeriesPoint> {
        analytics::top_locations_for_title(&self.records, title, n)
    }

    pub fn salary_by_experience(&self) -> Vec<SeriesPoint> {
        analytics::salary_by_experience(&self.records)
    }

    pub fn salary_by_company_size(&self) -> Vec<SeriesPoint> {
        analytics::salary_by_company_size(&self.records)
    }

    pub fn top_locations(&self, n: usize) -> Vec<SeriesPoint> {
        analytics::top_locations(&self.records, n)
    }

    pub fn top_job_titles_by_median(&self, n: usize) -> Vec<SeriesPoint> {
        analytics::top_job_titles_by_median(&self.records, n)
    }
}
