use crate::schema::{CellValue, ExtractionWarning, RawRecord};
use crate::text::normalize_key;
use log::warn;
use std::collections::HashMap;

/// A vocabulary entry paired with the header that carries it in this file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    pub vocabulary_entry: String,
    /// Header as spelled in the file; cell lookups use this string.
    pub header: String,
}

#[derive(Debug, Clone, Default)]
pub struct HeaderReconciliation {
    pub matches: Vec<HeaderMatch>,
    pub warnings: Vec<ExtractionWarning>,
}

impl HeaderReconciliation {
    /// Active business units, in vocabulary order.
    pub fn active_units(&self) -> Vec<String> {
        self.matches.iter().map(|m| m.header.clone()).collect()
    }
}

/// Matches every vocabulary entry against the file headers by normalized key.
///
/// When several headers share a key the first one in file order is used.
/// A header is claimed by at most one vocabulary entry, so a column is
/// never counted twice even when two entries are spelling variants.
pub fn reconcile_headers(vocabulary: &[String], headers: &[String]) -> HeaderReconciliation {
    let mut warnings = Vec::new();
    let mut by_key: HashMap<String, &String> = HashMap::new();

    for header in headers {
        let key = normalize_key(header);
        if key.is_empty() {
            continue;
        }
        match by_key.get(&key) {
            Some(kept) => {
                warn!(
                    "Headers '{}' and '{}' normalize to the same key; using '{}'",
                    kept, header, kept
                );
                warnings.push(ExtractionWarning::DuplicateHeader {
                    kept: (*kept).clone(),
                    ignored: header.clone(),
                });
            }
            None => {
                by_key.insert(key, header);
            }
        }
    }

    let mut matches: Vec<HeaderMatch> = Vec::new();
    for entry in vocabulary {
        let Some(header) = by_key.get(&normalize_key(entry)) else {
            continue;
        };

        if matches.iter().any(|m| &m.header == *header) {
            warn!(
                "Business unit '{}' resolves to header '{}', which is already active",
                entry, header
            );
            warnings.push(ExtractionWarning::SharedUnitHeader {
                vocabulary_entry: entry.clone(),
                header: (*header).clone(),
            });
            continue;
        }

        matches.push(HeaderMatch {
            vocabulary_entry: entry.clone(),
            header: (*header).clone(),
        });
    }

    if matches.is_empty() {
        warn!(
            "No business-unit columns detected. Headers: {:?}",
            headers
        );
        warnings.push(ExtractionWarning::NoBusinessUnits {
            headers: headers.to_vec(),
        });
    }

    HeaderReconciliation { matches, warnings }
}

/// Candidate field names reduced to their normalized keys once, so they can
/// be matched against many rows.
#[derive(Debug, Clone)]
pub struct FieldAliases {
    keys: Vec<String>,
}

impl FieldAliases {
    pub fn new(candidates: &[String]) -> Self {
        Self {
            keys: candidates.iter().map(|c| normalize_key(c)).collect(),
        }
    }

    pub fn matches(&self, header: &str) -> bool {
        let key = normalize_key(header);
        self.keys.iter().any(|k| *k == key)
    }

    /// Value of the first row header (in column order) matching any alias.
    pub fn lookup<'r>(&self, row: &'r RawRecord) -> Option<&'r CellValue> {
        row.cells
            .iter()
            .find(|cell| self.matches(&cell.header))
            .map(|cell| &cell.value)
    }
}

/// Looks a field up by any of its synonym names; `Empty` when none match.
pub fn find_field(row: &RawRecord, candidates: &[String]) -> CellValue {
    FieldAliases::new(candidates)
        .lookup(row)
        .cloned()
        .unwrap_or_default()
}
