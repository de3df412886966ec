use unicode_normalization::UnicodeNormalization;

/// Known UTF-8-read-as-Latin-1 sequences and their intended characters.
///
/// Entries are applied in order. The bare `Ã` entry must stay last: it catches
/// `í` whose second byte (a soft hyphen) was dropped by the exporting tool.
const MOJIBAKE_TABLE: &[(&str, &str)] = &[
    ("Ã¡", "á"),
    ("Ã©", "é"),
    ("Ã\u{AD}", "í"),
    ("Ã³", "ó"),
    ("Ãº", "ú"),
    ("Ã±", "ñ"),
    ("Ã¼", "ü"),
    ("Ã\u{81}", "Á"),
    ("Ã\u{89}", "É"),
    ("Ã‰", "É"),
    ("Ã\u{8D}", "Í"),
    ("Ã\u{93}", "Ó"),
    ("Ã“", "Ó"),
    ("Ã\u{9A}", "Ú"),
    ("Ãš", "Ú"),
    ("Ã\u{91}", "Ñ"),
    ("Ã‘", "Ñ"),
    ("ÃÑ", "Ñ"),
    ("Ã", "í"),
];

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// A UTF-8 byte-order mark read as Latin-1.
const MISDECODED_BYTE_ORDER_MARK: &str = "\u{EF}\u{BB}\u{BF}";

/// Repairs a header or cell string exported by a Latin-1 spreadsheet tool.
///
/// Steps run in a fixed order: mojibake repair, byte-order-mark removal,
/// one stray quote stripped from each end, then whitespace trim. Mojibake must
/// be repaired first because broken sequences can hide a BOM or quote.
pub fn repair_text(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let mut repaired = input.to_string();
    for (broken, fixed) in MOJIBAKE_TABLE {
        if repaired.contains(broken) {
            repaired = repaired.replace(broken, fixed);
        }
    }

    let mut view = repaired.as_str();
    view = view.strip_prefix(BYTE_ORDER_MARK).unwrap_or(view);
    view = view.strip_prefix(MISDECODED_BYTE_ORDER_MARK).unwrap_or(view);
    view = view.strip_prefix('"').unwrap_or(view);
    view = view.strip_suffix('"').unwrap_or(view);

    view.trim().to_string()
}

/// Reduces a string to its matching key: lower-case ASCII letters and digits
/// with every diacritic removed. Two headers name the same field iff their
/// keys are equal.
pub fn normalize_key(input: &str) -> String {
    input
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repair_spanish_mojibake() {
        assert_eq!(repair_text("CrÃ©dito"), "Crédito");
        assert_eq!(repair_text("LogÃ­stica"), "Logística");
        assert_eq!(repair_text("TesorerÃ\u{AD}a"), "Tesorería");
        assert_eq!(repair_text("CompaÃ±ia"), "Compañia");
        assert_eq!(repair_text("DescripciÃ³n"), "Descripción");
        assert_eq!(repair_text("Ã\u{91}ANDU"), "ÑANDU");
    }

    #[test]
    fn test_repair_bare_a_tilde_falls_back_to_i_acute() {
        assert_eq!(repair_text("CategorÃa"), "Categoría");
    }

    #[test]
    fn test_repair_strips_bom_and_quotes() {
        assert_eq!(repair_text("\u{FEFF}Asunto"), "Asunto");
        assert_eq!(repair_text("\u{EF}\u{BB}\u{BF}Asunto"), "Asunto");
        assert_eq!(repair_text("\"Liverpool\""), "Liverpool");
        assert_eq!(repair_text("\"Liverpool"), "Liverpool");
        assert_eq!(repair_text("  Suburbia  "), "Suburbia");
    }

    #[test]
    fn test_repair_keeps_bom_bytes_inside_text() {
        assert_eq!(
            repair_text("Asunto \u{EF}\u{BB}\u{BF}x"),
            "Asunto \u{EF}\u{BB}\u{BF}x"
        );
    }

    #[test]
    fn test_repair_only_strips_one_quote_per_side() {
        assert_eq!(repair_text("\"\"Sfera\"\""), "\"Sfera\"");
    }

    #[test]
    fn test_repair_is_idempotent_on_clean_ascii() {
        for sample in ["Renta oficina", "Total Gastos", "1,234.50", "", "Arco Norte"] {
            let once = repair_text(sample);
            assert_eq!(repair_text(&once), once);
        }
    }

    #[test]
    fn test_normalize_key_ignores_accents_case_and_punctuation() {
        assert_eq!(normalize_key("Logística"), "logistica");
        assert_eq!(normalize_key("LOGISTICA"), "logistica");
        assert_eq!(normalize_key("Lo-gís tica!"), "logistica");
        assert_eq!(normalize_key("Impacto BG/ER"), "impactobger");
        assert_eq!(normalize_key("Servicios Compartidos"), "servicioscompartidos");
        assert_eq!(normalize_key("Tesorería"), normalize_key("tesoreria"));
        assert_eq!(normalize_key("Año 2024"), "ano2024");
    }

    #[test]
    fn test_normalize_key_drops_non_ascii_letters() {
        assert_eq!(normalize_key("€ Total ß"), "total");
        assert_eq!(normalize_key(""), "");
    }
}
