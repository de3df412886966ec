use chrono::Local;
use financial_dashboard_builder::*;

const SAMPLE_EXPORT: &[u8] = b"Asunto;Tipo;Impacto BG/ER;Liverpool;Suburbia;Boutiques;Cr\xe9dito\n\
Ventas mostrador;Ingreso;ER;(12,500.00);(3,100.00);(450.00);0\n\
N\xf3mina operativa;Gasto;ER;4,200;1,150;300;80\n\
Comisiones tarjeta;Gasto;ER;0;0;0;$ 615\n\
Total general;;ER;(8,300.00);(1,950.00);(150.00);695\n";

fn main() -> Result<()> {
    pretty_env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let (bytes, file_name) = match args.get(1) {
        Some(path) => (std::fs::read(path)?, path.clone()),
        None => (SAMPLE_EXPORT.to_vec(), "demo.csv".to_string()),
    };

    let report = parse_financial_csv(&bytes, &IngestOptions::default(), &ExtractorConfig::default())?;

    println!("Business units: {}", report.active_business_units.join(", "));
    println!("Categories:     {}", report.categories.join(", "));
    println!(
        "Rows kept:      {} of {}\n",
        report.records.len(),
        report.diagnostics.total_rows
    );

    let mut rows: Vec<&FinancialRecord> = report.records.iter().collect();
    sort_by_magnitude(&mut rows, None);
    for record in &rows {
        println!(
            "{:<28} {:<10} {:<12} {:>18}",
            record.concept,
            record.category,
            record.segment,
            format_currency(record.total)
        );
    }

    let summary = summarize(&rows, &report.active_business_units, None);
    println!("\nNet:     {}", format_currency(summary.total));
    println!("Income:  {}", format_currency(summary.income));
    println!("Expense: {}", format_currency(summary.expense));
    for unit in segment_breakdown(&summary, None) {
        println!("  {:<12} {:>8}", unit.unit, format_short_number(unit.value));
    }

    let dataset = ReportDataset::from_report(report, &file_name, Local::now().naive_local());
    println!(
        "\nDataset '{}' updated {}",
        dataset.dataset_name,
        dataset.last_updated_label()
    );

    Ok(())
}
