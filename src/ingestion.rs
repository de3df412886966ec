use crate::config::ExtractorConfig;
use crate::error::Result;
use crate::extractor::FinancialRowExtractor;
use crate::schema::{CellValue, ParsedReport, RawRecord, RawTable};
use crate::text::repair_text;
use csv::ReaderBuilder;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

const CANDIDATE_DELIMITERS: &[u8] = b",;\t|";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// ISO-8859-1, the encoding spreadsheet tools use for Spanish CSV exports.
    #[default]
    Latin1,
    Utf8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IngestOptions {
    pub encoding: TextEncoding,
    /// Field delimiter; sniffed from the first line when absent.
    pub delimiter: Option<u8>,
}

pub fn decode_bytes(bytes: &[u8], encoding: TextEncoding) -> String {
    match encoding {
        TextEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Picks the candidate delimiter that occurs most often outside quotes in
/// the first non-empty line. Defaults to `,`.
pub fn detect_delimiter(text: &str) -> u8 {
    let Some(first_line) = text.lines().find(|line| !line.trim().is_empty()) else {
        return b',';
    };

    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;
    for c in first_line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(idx) = CANDIDATE_DELIMITERS.iter().position(|&d| d as char == c) {
            counts[idx] += 1;
        }
    }

    let best = counts
        .iter()
        .enumerate()
        .fold(0, |best, (idx, &count)| if count > counts[best] { idx } else { best });

    CANDIDATE_DELIMITERS[best]
}

/// Parses decoded CSV text into a [`RawTable`].
///
/// Headers are repaired with [`repair_text`]; rows whose every field is
/// blank are skipped; short rows leave their trailing cells absent.
pub fn parse_csv_text(text: &str, delimiter: Option<u8>) -> Result<RawTable> {
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(text));

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(repair_text).collect();

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            skipped += 1;
            continue;
        }

        let mut row = RawRecord::new();
        for (header, field) in headers.iter().zip(record.iter()) {
            row.push(header.clone(), CellValue::text(field));
        }
        rows.push(row);
    }

    debug!(
        "Parsed {} rows ({} blank rows skipped) with {} columns, delimiter {:?}",
        rows.len(),
        skipped,
        headers.len(),
        delimiter as char
    );

    Ok(RawTable::new(headers, rows))
}

pub fn read_raw_table(bytes: &[u8], options: &IngestOptions) -> Result<RawTable> {
    let text = decode_bytes(bytes, options.encoding);
    parse_csv_text(&text, options.delimiter)
}

pub fn read_raw_table_from_path(path: impl AsRef<Path>, options: &IngestOptions) -> Result<RawTable> {
    let bytes = std::fs::read(path)?;
    read_raw_table(&bytes, options)
}

/// Reads a CSV export and runs the full extraction over it.
pub fn parse_financial_csv(
    bytes: &[u8],
    options: &IngestOptions,
    config: &ExtractorConfig,
) -> Result<ParsedReport> {
    let table = read_raw_table(bytes, options)?;
    FinancialRowExtractor::new(config).extract(&table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_latin1_maps_bytes_to_code_points() {
        assert_eq!(decode_bytes(b"Cr\xe9dito", TextEncoding::Latin1), "Crédito");
        assert_eq!(decode_bytes("Crédito".as_bytes(), TextEncoding::Latin1), "CrÃ©dito");
        assert_eq!(decode_bytes("Crédito".as_bytes(), TextEncoding::Utf8), "Crédito");
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("Asunto;Liverpool;Suburbia\n1;2;3"), b';');
        assert_eq!(detect_delimiter("Asunto\tLiverpool\n"), b'\t');
        assert_eq!(detect_delimiter("\n\nAsunto,Liverpool"), b',');
        assert_eq!(detect_delimiter("\"a;b;c\",d,e"), b',');
        assert_eq!(detect_delimiter("a;b|c"), b';');
        assert_eq!(detect_delimiter(""), b',');
    }

    #[test]
    fn test_parse_skips_blank_rows_and_repairs_headers() {
        let text = "\u{FEFF}Asunto,Cr\u{c3}\u{a9}dito,Liverpool\nRenta,10,\"(1,200)\"\n , ,\nVentas,5\n";
        let table = parse_csv_text(text, None).unwrap();

        assert_eq!(table.headers, vec!["Asunto", "Crédito", "Liverpool"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("Liverpool"), Some(&CellValue::text("(1,200)")));
        assert_eq!(table.rows[1].len(), 2);
        assert_eq!(table.rows[1].get("Liverpool"), None);
    }
}
