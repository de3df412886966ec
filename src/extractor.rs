use crate::config::ExtractorConfig;
use crate::currency::clean_currency;
use crate::error::{ReportError, Result};
use crate::headers::{reconcile_headers, FieldAliases};
use crate::rules::{
    is_credit_note_exception, normalize_category, reject_summary_row, reject_zero_value_noise,
    require_concept, RowOutcome,
};
use crate::schema::{
    CellValue, ExclusionReason, ExtractionDiagnostics, FinancialRecord, ParsedReport, RawRecord,
    RawTable,
};
use crate::text::repair_text;
use log::{debug, info, trace};
use std::collections::{BTreeMap, BTreeSet};

/// Result of scanning the active business-unit columns of one row.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentAttribution {
    pub per_unit_amounts: BTreeMap<String, f64>,
    /// Signed sum of all unit amounts.
    pub row_total: f64,
    /// Unit with the largest absolute amount; the earliest unit wins ties.
    pub selected_unit: Option<String>,
}

/// Cleans every active unit cell of `row` and picks the unit that owns it.
pub fn attribute_segment(row: &RawRecord, units: &[String]) -> SegmentAttribution {
    let mut per_unit_amounts = BTreeMap::new();
    let mut row_total = 0.0;
    let mut max_val: f64 = 0.0;
    let mut selected_unit = None;

    for unit in units {
        let value = row.get(unit).map(clean_currency).unwrap_or(0.0);
        per_unit_amounts.insert(unit.clone(), value);
        row_total += value;

        if value.abs() > max_val.abs() {
            max_val = value;
            selected_unit = Some(unit.clone());
        }
    }

    SegmentAttribution {
        per_unit_amounts,
        row_total,
        selected_unit,
    }
}

/// Synonym sets resolved once per parse.
struct FieldSet {
    concept: FieldAliases,
    category: FieldAliases,
    impact: FieldAliases,
    total: FieldAliases,
}

impl FieldSet {
    fn new(config: &ExtractorConfig) -> Self {
        Self {
            concept: FieldAliases::new(&config.concept_fields),
            category: FieldAliases::new(&config.category_fields),
            impact: FieldAliases::new(&config.impact_fields),
            total: FieldAliases::new(&config.total_fields),
        }
    }
}

fn text_or(value: Option<&CellValue>, default: &str) -> String {
    match value {
        Some(v) if !v.is_blank() => v.as_text(),
        _ => default.to_string(),
    }
}

/// Accumulator threaded through the row pass.
#[derive(Debug, Default)]
struct ExtractionState {
    records: Vec<FinancialRecord>,
    categories: BTreeSet<String>,
    excluded: BTreeMap<ExclusionReason, usize>,
}

impl ExtractionState {
    fn absorb(mut self, outcome: RowOutcome) -> Self {
        match outcome {
            RowOutcome::Included(record) => {
                self.categories.insert(record.category.clone());
                self.records.push(*record);
            }
            RowOutcome::Excluded(reason) => {
                *self.excluded.entry(reason).or_insert(0) += 1;
            }
        }
        self
    }
}

pub struct FinancialRowExtractor<'a> {
    config: &'a ExtractorConfig,
}

impl<'a> FinancialRowExtractor<'a> {
    pub fn new(config: &'a ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, table: &RawTable) -> Result<ParsedReport> {
        self.config.validate()?;

        if table.rows.is_empty() {
            return Err(ReportError::EmptyInput);
        }

        let reconciliation = reconcile_headers(&self.config.business_units, &table.headers);
        let units = reconciliation.active_units();
        let fields = FieldSet::new(self.config);

        debug!(
            "Detected {} active business units: {:?}",
            units.len(),
            units
        );

        let state = table
            .rows
            .iter()
            .enumerate()
            .fold(ExtractionState::default(), |state, (index, row)| {
                state.absorb(self.process_row(index, row, &units, &fields))
            });

        for (reason, count) in &state.excluded {
            debug!("Excluded {} rows: {}", count, reason);
        }

        info!(
            "Extracted {} of {} rows across {} business units",
            state.records.len(),
            table.rows.len(),
            units.len()
        );

        if state.records.is_empty() {
            return Err(ReportError::NoValidRecords {
                expected: self.config.expected_units_hint(),
            });
        }

        let categories = state
            .categories
            .into_iter()
            .filter(|category| !self.config.is_unclassified(category))
            .collect();

        Ok(ParsedReport {
            records: state.records,
            active_business_units: units,
            categories,
            diagnostics: ExtractionDiagnostics {
                total_rows: table.rows.len(),
                excluded: state.excluded,
                warnings: reconciliation.warnings,
            },
        })
    }

    fn process_row(
        &self,
        index: usize,
        row: &RawRecord,
        units: &[String],
        fields: &FieldSet,
    ) -> RowOutcome {
        let outcome: RowOutcome = self.evaluate_row(index, row, units, fields).into();
        if let Some(reason) = outcome.exclusion_reason() {
            trace!("Row {} excluded: {}", index, reason);
        }
        outcome
    }

    fn evaluate_row(
        &self,
        index: usize,
        row: &RawRecord,
        units: &[String],
        fields: &FieldSet,
    ) -> std::result::Result<FinancialRecord, ExclusionReason> {
        let config = self.config;

        let concept = repair_text(&text_or(fields.concept.lookup(row), ""));
        let category = repair_text(&text_or(
            fields.category.lookup(row),
            &config.missing_category,
        ));
        let impact_kind = repair_text(&text_or(fields.impact.lookup(row), ""));

        require_concept(&concept, config)?;
        reject_summary_row(&concept, config)?;

        let credit_note_exception = is_credit_note_exception(&concept, config);
        let category = normalize_category(category, config);

        let attribution = attribute_segment(row, units);

        reject_zero_value_noise(
            &category,
            attribution.row_total,
            credit_note_exception,
            config,
        )?;

        let total = fields
            .total
            .lookup(row)
            .map(clean_currency)
            .unwrap_or(attribution.row_total);

        let segment = match attribution.selected_unit {
            Some(unit) => unit,
            None if attribution.row_total != 0.0 => config.fallback_unit.clone(),
            None => config.unattributed_segment.clone(),
        };

        Ok(FinancialRecord {
            id: format!("row-{}", index),
            concept,
            category,
            segment,
            impact_kind,
            total,
            per_unit_amounts: attribution.per_unit_amounts,
            source_row: config.retain_source_rows.then(|| row.clone()),
        })
    }
}

pub fn extract_records(table: &RawTable, config: &ExtractorConfig) -> Result<ParsedReport> {
    FinancialRowExtractor::new(config).extract(table)
}
