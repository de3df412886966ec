use crate::config::ExtractorConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single raw cell as handed over by the CSV collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[schemars(description = "Numeric cell that was already typed by the parser")]
    Number(f64),

    #[schemars(description = "Textual cell, possibly mis-decoded, possibly using accounting notation")]
    Text(String),

    #[default]
    #[schemars(description = "Absent cell")]
    Empty,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Treats empty text, zero and absence alike as "no value".
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Number(n) => *n == 0.0 || n.is_nan(),
            Self::Text(s) => s.is_empty(),
            Self::Empty => true,
        }
    }

    /// Text form used for free-text fields; absent cells render as empty.
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Empty => String::new(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawCell {
    #[schemars(description = "Header string exactly as it appeared in the file (after header repair)")]
    pub header: String,

    pub value: CellValue,
}

/// One input row: ordered header/value pairs in file column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct RawRecord {
    pub cells: Vec<RawCell>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cell(mut self, header: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.push(header, value);
        self
    }

    pub fn push(&mut self, header: impl Into<String>, value: impl Into<CellValue>) {
        self.cells.push(RawCell {
            header: header.into(),
            value: value.into(),
        });
    }

    /// Exact-header lookup. Matching by meaning goes through
    /// [`crate::headers::find_field`] instead.
    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|cell| cell.header == header)
            .map(|cell| &cell.value)
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|cell| cell.header.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Parsed table: the header list in file order plus every data row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<RawRecord>) -> Self {
        Self { headers, rows }
    }

    /// Builds a table whose header list is taken from the first row, for
    /// callers that only have records.
    pub fn from_rows(rows: Vec<RawRecord>) -> Self {
        let headers = rows
            .first()
            .map(|row| row.headers().map(str::to_string).collect())
            .unwrap_or_default();
        Self { headers, rows }
    }
}

/// A validated line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    #[schemars(description = "Positional identifier, `row-<input index>`")]
    pub id: String,

    #[schemars(description = "Cleaned line item description; never empty")]
    pub concept: String,

    #[schemars(description = "Cleaned classification label, or the unclassified sentinel")]
    pub category: String,

    #[schemars(description = "Active business unit owning the row, the fallback unit, or the unattributed sentinel")]
    pub segment: String,

    #[schemars(description = "Balance-sheet / income-statement marker, passed through cleaned")]
    pub impact_kind: String,

    #[schemars(description = "Explicit Total column when present, otherwise the sum of per-unit amounts")]
    pub total: f64,

    #[schemars(description = "Cleaned amount per active business unit, zero-filled")]
    pub per_unit_amounts: BTreeMap<String, f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_row: Option<RawRecord>,
}

impl FinancialRecord {
    pub fn amount_for(&self, unit: &str) -> f64 {
        self.per_unit_amounts.get(unit).copied().unwrap_or(0.0)
    }
}

/// Why a row did not become a [`FinancialRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    #[schemars(description = "Concept missing or a 'no description' placeholder")]
    EmptyConcept,

    #[schemars(description = "Subtotal or grand-total line of the source report")]
    SummaryRow,

    #[schemars(description = "Unclassified row carrying no money")]
    ZeroValueNoise,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::EmptyConcept => "empty concept",
            Self::SummaryRow => "summary row",
            Self::ZeroValueNoise => "zero-value noise",
        };
        f.write_str(label)
    }
}

/// Non-fatal problems noticed while extracting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionWarning {
    /// No header matched the business-unit vocabulary.
    NoBusinessUnits { headers: Vec<String> },

    /// Two or more headers share a normalized key; the first one is used.
    DuplicateHeader { kept: String, ignored: String },

    /// A vocabulary entry resolved to a header another entry already claimed.
    SharedUnitHeader { vocabulary_entry: String, header: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct ExtractionDiagnostics {
    pub total_rows: usize,
    pub excluded: BTreeMap<ExclusionReason, usize>,
    pub warnings: Vec<ExtractionWarning>,
}

impl ExtractionDiagnostics {
    pub fn excluded_count(&self) -> usize {
        self.excluded.values().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedReport {
    pub records: Vec<FinancialRecord>,

    #[schemars(description = "Business-unit headers found in the file, in vocabulary order")]
    pub active_business_units: Vec<String>,

    #[schemars(description = "Sorted distinct categories, without the unclassified sentinel or its aliases")]
    pub categories: Vec<String>,

    #[serde(default)]
    pub diagnostics: ExtractionDiagnostics,
}

impl ParsedReport {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ParsedReport)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }

    pub fn config_schema_as_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&schemars::schema_for!(ExtractorConfig))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_generation() {
        let schema_json = ParsedReport::schema_as_json().unwrap();
        assert!(schema_json.contains("records"));
        assert!(schema_json.contains("activeBusinessUnits"));
        assert!(schema_json.contains("perUnitAmounts"));
    }

    #[test]
    fn test_cell_value_deserializes_untagged() {
        let row: RawRecord = serde_json::from_str(
            r#"{"cells":[{"header":"Liverpool","value":12.5},{"header":"Asunto","value":"Renta"},{"header":"Tipo","value":null}]}"#,
        )
        .unwrap();

        assert_eq!(row.get("Liverpool"), Some(&CellValue::Number(12.5)));
        assert_eq!(row.get("Asunto"), Some(&CellValue::text("Renta")));
        assert_eq!(row.get("Tipo"), Some(&CellValue::Empty));
        assert_eq!(row.get("Suburbia"), None);
    }

    #[test]
    fn test_table_from_rows_takes_headers_from_first_row() {
        let table = RawTable::from_rows(vec![
            RawRecord::new().with_cell("Asunto", "Renta").with_cell("Liverpool", "10"),
            RawRecord::new().with_cell("Asunto", "Ventas"),
        ]);
        assert_eq!(table.headers, vec!["Asunto", "Liverpool"]);
        assert_eq!(table.rows.len(), 2);

        assert!(RawTable::from_rows(vec![]).headers.is_empty());
    }

    #[test]
    fn test_cell_blankness() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::text("").is_blank());
        assert!(CellValue::Number(0.0).is_blank());
        assert!(!CellValue::text("0").is_blank());
        assert_eq!(CellValue::Number(42.0).as_text(), "42");
    }

    #[test]
    fn test_record_serializes_camel_case_without_source_row() {
        let record = FinancialRecord {
            id: "row-0".to_string(),
            concept: "Renta".to_string(),
            category: "Gasto".to_string(),
            segment: "Liverpool".to_string(),
            impact_kind: "ER".to_string(),
            total: 10.0,
            per_unit_amounts: BTreeMap::from([("Liverpool".to_string(), 10.0)]),
            source_row: None,
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("impactKind"));
        assert!(json.contains("perUnitAmounts"));
        assert!(!json.contains("sourceRow"));
    }
}
