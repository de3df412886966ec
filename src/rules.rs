//! Inclusion rules for a single row, applied in a fixed order by the
//! extractor. Each guard either lets the row continue or names the reason
//! it is dropped.

use crate::config::ExtractorConfig;
use crate::schema::{ExclusionReason, FinancialRecord};

pub type RuleResult = std::result::Result<(), ExclusionReason>;

/// Final fate of one input row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Included(Box<FinancialRecord>),
    Excluded(ExclusionReason),
}

impl RowOutcome {
    pub fn is_included(&self) -> bool {
        matches!(self, Self::Included(_))
    }

    pub fn exclusion_reason(&self) -> Option<ExclusionReason> {
        match self {
            Self::Excluded(reason) => Some(*reason),
            Self::Included(_) => None,
        }
    }
}

impl From<std::result::Result<FinancialRecord, ExclusionReason>> for RowOutcome {
    fn from(result: std::result::Result<FinancialRecord, ExclusionReason>) -> Self {
        match result {
            Ok(record) => Self::Included(Box::new(record)),
            Err(reason) => Self::Excluded(reason),
        }
    }
}

/// Rule 1: the concept must be present and not a placeholder.
pub fn require_concept(concept: &str, config: &ExtractorConfig) -> RuleResult {
    if concept.is_empty() || config.empty_concept_placeholders.iter().any(|p| p == concept) {
        return Err(ExclusionReason::EmptyConcept);
    }
    Ok(())
}

/// Rule 2: subtotal and total lines of the source report are not line items.
pub fn reject_summary_row(concept: &str, config: &ExtractorConfig) -> RuleResult {
    let lower = concept.to_lowercase();
    if config
        .summary_prefixes
        .iter()
        .any(|prefix| lower.starts_with(&prefix.to_lowercase()))
    {
        return Err(ExclusionReason::SummaryRow);
    }
    Ok(())
}

/// Rule 3: a concept starting with the credit-note prefix that does *not*
/// mention any credit marker is exempt from the zero-value filter.
pub fn is_credit_note_exception(concept: &str, config: &ExtractorConfig) -> bool {
    let lower = concept.to_lowercase();
    lower.starts_with(&config.credit_note_prefix.to_lowercase())
        && !config
            .credit_note_markers
            .iter()
            .any(|marker| lower.contains(&marker.to_lowercase()))
}

/// Folds degenerate category labels into the unclassified sentinel.
pub fn normalize_category(category: String, config: &ExtractorConfig) -> String {
    if config.is_unclassified(&category) {
        config.unclassified_category.clone()
    } else {
        category
    }
}

/// Rule 4: an unclassified row with no money is report noise.
pub fn reject_zero_value_noise(
    category: &str,
    row_total: f64,
    credit_note_exception: bool,
    config: &ExtractorConfig,
) -> RuleResult {
    if config.is_unclassified(category) && row_total == 0.0 && !credit_note_exception {
        return Err(ExclusionReason::ZeroValueNoise);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_concept() {
        let config = ExtractorConfig::default();
        assert_eq!(require_concept("", &config), Err(ExclusionReason::EmptyConcept));
        assert_eq!(
            require_concept("Sin descripción", &config),
            Err(ExclusionReason::EmptyConcept)
        );
        assert!(require_concept("Renta oficina", &config).is_ok());
    }

    #[test]
    fn test_reject_summary_row() {
        let config = ExtractorConfig::default();
        assert_eq!(
            reject_summary_row("Total Gastos", &config),
            Err(ExclusionReason::SummaryRow)
        );
        assert_eq!(
            reject_summary_row("SUMA de ingresos", &config),
            Err(ExclusionReason::SummaryRow)
        );
        assert!(reject_summary_row("Subtotal", &config).is_ok());
        assert!(reject_summary_row("Gastos totales", &config).is_ok());
    }

    #[test]
    fn test_credit_note_condition_is_literal() {
        let config = ExtractorConfig::default();
        assert!(is_credit_note_exception("Nota de cargo 15", &config));
        assert!(!is_credit_note_exception("Nota de crédito 15", &config));
        assert!(!is_credit_note_exception("NOTA DE CREDITO", &config));
        assert!(!is_credit_note_exception("Cargo nota", &config));
    }

    #[test]
    fn test_normalize_category() {
        let config = ExtractorConfig::default();
        assert_eq!(normalize_category("mmm".to_string(), &config), "-");
        assert_eq!(normalize_category("N/A".to_string(), &config), "-");
        assert_eq!(normalize_category("Gasto".to_string(), &config), "Gasto");
        assert_eq!(normalize_category(String::new(), &config), "");
    }

    #[test]
    fn test_reject_zero_value_noise() {
        let config = ExtractorConfig::default();
        assert_eq!(
            reject_zero_value_noise("-", 0.0, false, &config),
            Err(ExclusionReason::ZeroValueNoise)
        );
        assert!(reject_zero_value_noise("-", 0.0, true, &config).is_ok());
        assert!(reject_zero_value_noise("-", 10.0, false, &config).is_ok());
        assert!(reject_zero_value_noise("Gasto", 0.0, false, &config).is_ok());
    }

    #[test]
    fn test_outcome_from_result() {
        let outcome: RowOutcome = Err(ExclusionReason::SummaryRow).into();
        assert!(!outcome.is_included());
        assert_eq!(outcome.exclusion_reason(), Some(ExclusionReason::SummaryRow));
    }
}
