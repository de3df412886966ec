use crate::error::{ReportError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Business-unit column names of the Liverpool group accounting export.
pub const DEFAULT_BUSINESS_UNITS: &[&str] = &[
    "Liverpool",
    "Boutiques",
    "Automotriz",
    "Suburbia",
    "Galerias",
    "Crédito",
    "Seguros",
    "Servicios Compartidos",
    "Financiera",
    "Logistica",
    "Logística",
    "Tesoreria",
    "Tesorería",
    "Inmobiliaria",
    "Sfera",
    "Arco Norte",
];

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Tunables of the extraction pipeline.
///
/// Every field has a default, so a JSON override file only needs the keys
/// it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExtractorConfig {
    #[schemars(description = "Ordered business-unit vocabulary matched against the file headers")]
    pub business_units: Vec<String>,

    #[schemars(description = "Segment given to rows that carry money but no unit could be selected")]
    pub fallback_unit: String,

    #[schemars(description = "Segment given to rows with no money and no unit")]
    pub unattributed_segment: String,

    #[schemars(description = "Canonical category for degenerate or missing classifications")]
    pub unclassified_category: String,

    #[schemars(description = "Category literals folded into the unclassified sentinel")]
    pub degenerate_categories: Vec<String>,

    #[schemars(description = "Category a row takes when its category cell is missing or blank")]
    pub missing_category: String,

    #[schemars(description = "Header synonyms for the concept field")]
    pub concept_fields: Vec<String>,

    #[schemars(description = "Header synonyms for the category field")]
    pub category_fields: Vec<String>,

    #[schemars(description = "Header synonyms for the impact kind field")]
    pub impact_fields: Vec<String>,

    #[schemars(description = "Header names of an explicit row total column")]
    pub total_fields: Vec<String>,

    #[schemars(description = "Concept values meaning 'no description'")]
    pub empty_concept_placeholders: Vec<String>,

    #[schemars(description = "Lower-case prefixes marking subtotal / total lines")]
    pub summary_prefixes: Vec<String>,

    #[schemars(description = "Lower-case prefix of credit-note concepts")]
    pub credit_note_prefix: String,

    #[schemars(description = "Substrings that cancel the credit-note exemption")]
    pub credit_note_markers: Vec<String>,

    #[schemars(description = "Keep the raw input row on every emitted record")]
    pub retain_source_rows: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            business_units: strings(DEFAULT_BUSINESS_UNITS),
            fallback_unit: "Liverpool".to_string(),
            unattributed_segment: "N/A".to_string(),
            unclassified_category: "-".to_string(),
            degenerate_categories: strings(&["mmm", "N/A"]),
            missing_category: "N/A".to_string(),
            concept_fields: strings(&["asunto", "descripcion", "concepto"]),
            category_fields: strings(&["tipo", "categoria"]),
            impact_fields: strings(&["impacto", "impacto bg/er"]),
            total_fields: strings(&["total"]),
            empty_concept_placeholders: strings(&["Sin descripción"]),
            summary_prefixes: strings(&["total", "suma"]),
            credit_note_prefix: "nota".to_string(),
            credit_note_markers: strings(&["credito", "crédito"]),
            retain_source_rows: true,
        }
    }
}

impl ExtractorConfig {
    pub fn with_business_units<I, S>(mut self, units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.business_units = units.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fallback_unit(mut self, unit: impl Into<String>) -> Self {
        self.fallback_unit = unit.into();
        self
    }

    pub fn with_source_rows(mut self, retain: bool) -> Self {
        self.retain_source_rows = retain;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// True for the sentinel and every literal alias of it.
    pub fn is_unclassified(&self, category: &str) -> bool {
        category == self.unclassified_category
            || self.degenerate_categories.iter().any(|c| c == category)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concept_fields.is_empty() {
            return Err(ReportError::InvalidConfig(
                "concept_fields must name at least one header".to_string(),
            ));
        }

        for (name, value) in [
            ("fallback_unit", &self.fallback_unit),
            ("unattributed_segment", &self.unattributed_segment),
            ("unclassified_category", &self.unclassified_category),
            ("missing_category", &self.missing_category),
        ] {
            if value.trim().is_empty() {
                return Err(ReportError::InvalidConfig(format!(
                    "{} must not be empty",
                    name
                )));
            }
        }

        if self.fallback_unit == self.unattributed_segment {
            return Err(ReportError::InvalidConfig(format!(
                "fallback_unit and unattributed_segment must differ (both are '{}')",
                self.fallback_unit
            )));
        }

        Ok(())
    }

    /// Short list of expected unit names used in error hints.
    pub fn expected_units_hint(&self) -> String {
        let mut hint = self
            .business_units
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        if self.business_units.len() > 3 {
            hint.push_str(", ...");
        }
        hint
    }
}
