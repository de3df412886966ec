//! # Financial Dashboard Builder
//!
//! A library for turning a messy Spanish-language accounting CSV export
//! (Latin-1 encoded, inconsistent headers, accounting number notation) into a
//! normalized, per-business-unit record set ready for filtering and charts.
//!
//! ## Core Concepts
//!
//! - **Text repair**: mis-decoded accents, byte-order marks and stray quotes are fixed before anything is matched
//! - **Normalized keys**: headers are matched by a diacritic-, case- and punctuation-insensitive key
//! - **Active business units**: vocabulary entries whose column exists in the file, in vocabulary order
//! - **Segment attribution**: each line item belongs to the unit with the largest absolute amount
//! - **Rule chain**: placeholder concepts, summary lines and unclassified zero rows are dropped
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_dashboard_builder::*;
//!
//! let bytes = std::fs::read("reporte.csv")?;
//! let report = parse_financial_csv(&bytes, &IngestOptions::default(), &ExtractorConfig::default())?;
//!
//! for record in &report.records {
//!     println!("{} [{}] {}", record.concept, record.segment, format_currency(record.total));
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod currency;
pub mod dataset;
pub mod error;
pub mod extractor;
pub mod headers;
pub mod ingestion;
pub mod rules;
pub mod schema;
pub mod text;
pub mod utils;

pub use analytics::{
    category_counts, display_value, segment_breakdown, sort_by_magnitude, summarize, KpiSummary,
    RecordFilter, UnitTotal,
};
pub use config::{ExtractorConfig, DEFAULT_BUSINESS_UNITS};
pub use currency::{clean_currency, clean_currency_str};
pub use dataset::{dataset_name_from_file, ReportDataset};
pub use error::{ReportError, Result};
pub use extractor::{attribute_segment, extract_records, FinancialRowExtractor, SegmentAttribution};
pub use headers::{find_field, reconcile_headers, FieldAliases, HeaderMatch, HeaderReconciliation};
pub use ingestion::*;
pub use rules::RowOutcome;
pub use schema::*;
pub use text::{normalize_key, repair_text};
pub use utils::*;

use log::{debug, info};
use std::path::Path;

pub struct FinancialReportProcessor;

impl FinancialReportProcessor {
    pub fn process(table: &RawTable, config: &ExtractorConfig) -> Result<ParsedReport> {
        info!(
            "Processing report with {} rows and {} columns",
            table.rows.len(),
            table.headers.len()
        );

        let report = FinancialRowExtractor::new(config).extract(table)?;

        for warning in &report.diagnostics.warnings {
            debug!("Extraction warning: {:?}", warning);
        }

        Ok(report)
    }

    pub fn process_file(
        path: impl AsRef<Path>,
        options: &IngestOptions,
        config: &ExtractorConfig,
    ) -> Result<ParsedReport> {
        let path = path.as_ref();
        debug!("Reading report from {}", path.display());
        let table = read_raw_table_from_path(path, options)?;
        Self::process(&table, config)
    }
}

pub fn process_report(table: &RawTable, config: &ExtractorConfig) -> Result<ParsedReport> {
    FinancialReportProcessor::process(table, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> RawTable {
        let headers: Vec<String> = ["Asunto", "Tipo", "Impacto", "Liverpool", "Suburbia", "Boutiques"]
            .iter()
            .map(|h| h.to_string())
            .collect();

        let row = |asunto: &str, tipo: &str, liverpool: &str, suburbia: &str, boutiques: &str| {
            RawRecord::new()
                .with_cell("Asunto", asunto)
                .with_cell("Tipo", tipo)
                .with_cell("Impacto", "ER")
                .with_cell("Liverpool", liverpool)
                .with_cell("Suburbia", suburbia)
                .with_cell("Boutiques", boutiques)
        };

        RawTable::new(
            headers,
            vec![
                row("Ventas", "Ingreso", "(1,000)", "(200)", ""),
                row("Total Ingresos", "", "(1,000)", "(200)", ""),
                row("Renta oficina", "", "0", "0", "0"),
                row("Mantenimiento", "mmm", "", "", "45.5"),
                row("Sin descripción", "Gasto", "10", "", ""),
            ],
        )
    }

    #[test]
    fn test_end_to_end_processing() {
        let config = ExtractorConfig::default();
        let report = process_report(&sample_table(), &config).unwrap();

        assert_eq!(
            report.active_business_units,
            vec!["Liverpool", "Boutiques", "Suburbia"]
        );
        assert_eq!(report.records.len(), 2);

        let ventas = &report.records[0];
        assert_eq!(ventas.id, "row-0");
        assert_eq!(ventas.segment, "Liverpool");
        assert!((ventas.total - -1200.0).abs() < 1e-9);

        let mantenimiento = &report.records[1];
        assert_eq!(mantenimiento.id, "row-3");
        assert_eq!(mantenimiento.category, "-");
        assert_eq!(mantenimiento.segment, "Boutiques");
        assert_eq!(mantenimiento.impact_kind, "ER");

        assert_eq!(report.categories, vec!["Ingreso"]);
        assert_eq!(report.diagnostics.total_rows, 5);
        assert_eq!(report.diagnostics.excluded_count(), 3);
    }

    #[test]
    fn test_per_unit_keys_match_active_units() {
        let config = ExtractorConfig::default();
        let report = process_report(&sample_table(), &config).unwrap();

        for record in &report.records {
            let keys: Vec<&String> = record.per_unit_amounts.keys().collect();
            let mut expected: Vec<&String> = report.active_business_units.iter().collect();
            expected.sort();
            assert_eq!(keys, expected);
        }
    }
}
