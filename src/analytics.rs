use crate::schema::FinancialRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Below this magnitude a unit amount counts as "not touching" the unit.
const SEGMENT_PRESENCE_EPSILON: f64 = 0.001;

/// Unit totals smaller than this are left out of the breakdown chart.
const BREAKDOWN_EPSILON: f64 = 0.1;

/// Dashboard filter selection. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub segment: Option<String>,
    pub category: Option<String>,
}

impl RecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn matches(&self, record: &FinancialRecord) -> bool {
        let category_ok = self
            .category
            .as_ref()
            .map_or(true, |c| record.category == *c);
        let segment_ok = self
            .segment
            .as_ref()
            .map_or(true, |s| record.amount_for(s).abs() > SEGMENT_PRESENCE_EPSILON);
        category_ok && segment_ok
    }

    pub fn apply<'r>(&self, records: &'r [FinancialRecord]) -> Vec<&'r FinancialRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Amount shown for a record: its total, or one unit's share of it.
pub fn display_value(record: &FinancialRecord, segment: Option<&str>) -> f64 {
    match segment {
        Some(unit) => record.amount_for(unit),
        None => record.total,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTotal {
    pub unit: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total: f64,
    /// Sum of negative values; the source report books income as credits.
    pub income: f64,
    /// Sum of non-negative values.
    pub expense: f64,
    pub count: usize,
    pub unit_totals: Vec<UnitTotal>,
}

/// Headline figures for the filtered records.
pub fn summarize(
    records: &[&FinancialRecord],
    units: &[String],
    segment: Option<&str>,
) -> KpiSummary {
    let mut unit_totals: Vec<UnitTotal> = units
        .iter()
        .map(|unit| UnitTotal {
            unit: unit.clone(),
            value: 0.0,
        })
        .collect();

    let mut total = 0.0;
    let mut income = 0.0;
    let mut expense = 0.0;

    for record in records {
        let value = display_value(record, segment);
        total += value;
        if value < 0.0 {
            income += value;
        } else {
            expense += value;
        }

        for entry in unit_totals.iter_mut() {
            match segment {
                None => entry.value += record.amount_for(&entry.unit),
                Some(selected) if selected == entry.unit => entry.value += value,
                Some(_) => {}
            }
        }
    }

    KpiSummary {
        total,
        income,
        expense,
        count: records.len(),
        unit_totals,
    }
}

/// Chart series of amounts per unit.
pub fn segment_breakdown(summary: &KpiSummary, segment: Option<&str>) -> Vec<UnitTotal> {
    match segment {
        Some(selected) => vec![UnitTotal {
            unit: selected.to_string(),
            value: summary
                .unit_totals
                .iter()
                .find(|t| t.unit == selected)
                .map_or(0.0, |t| t.value),
        }],
        None => summary
            .unit_totals
            .iter()
            .filter(|t| t.value.abs() > BREAKDOWN_EPSILON)
            .cloned()
            .collect(),
    }
}

/// Number of records per category, most frequent first, ties by name.
pub fn category_counts(records: &[&FinancialRecord]) -> Vec<(String, usize)> {
    let mut grouped: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *grouped.entry(record.category.as_str()).or_insert(0) += 1;
    }

    let mut counts: Vec<(String, usize)> = grouped
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Orders records by descending absolute display value.
pub fn sort_by_magnitude(records: &mut [&FinancialRecord], segment: Option<&str>) {
    records.sort_by(|a, b| {
        display_value(b, segment)
            .abs()
            .total_cmp(&display_value(a, segment).abs())
    });
}
