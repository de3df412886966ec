use crate::error::Result;
use crate::schema::{FinancialRecord, ParsedReport};
use chrono::NaiveDateTime;
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A parsed report as the dashboard keeps it between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportDataset {
    pub records: Vec<FinancialRecord>,
    pub segments: Vec<String>,
    pub categories: Vec<String>,
    pub dataset_name: String,
    pub last_updated: NaiveDateTime,
}

impl ReportDataset {
    pub fn from_report(report: ParsedReport, file_name: &str, loaded_at: NaiveDateTime) -> Self {
        Self {
            records: report.records,
            segments: report.active_business_units,
            categories: report.categories,
            dataset_name: dataset_name_from_file(file_name),
            last_updated: loaded_at,
        }
    }

    /// Same dataset without the retained raw rows.
    pub fn without_source_rows(mut self) -> Self {
        for record in &mut self.records {
            record.source_row = None;
        }
        self
    }

    pub fn last_updated_label(&self) -> String {
        self.last_updated.format("%d de %b, %Y %H:%M").to_string()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, &json)?;
        info!(
            "Saved dataset '{}' ({} records, {} bytes) to {}",
            self.dataset_name,
            self.records.len(),
            json.len(),
            path.display()
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let dataset = Self::from_json(&std::fs::read_to_string(path)?)?;
        debug!(
            "Loaded dataset '{}' from {}",
            dataset.dataset_name,
            path.display()
        );
        Ok(dataset)
    }
}

/// File name without directories and without a trailing `.csv`.
pub fn dataset_name_from_file(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);

    let lower = base.to_ascii_lowercase();
    match lower.strip_suffix(".csv") {
        Some(stem) => base[..stem.len()].to_string(),
        None => base.to_string(),
    }
}
