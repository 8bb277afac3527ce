use sales_roi_model::*;

const PASTED: &str = "# Northwind Wholesale ROI Model

| KPI | Estimate | Notes |
|---|---|---|
| **Win Rate** | ~28% | blended |
| **Average Deal Size (ASP)** | $1.2M | strategic |
| **Annual Piped Opptys** | ~4,800 | |
| **Number of Sales Reps** | 120 | |
| **Sales Cycle Duration** | 210 Days | |

Fully loaded cost per rep: $230,000
";

fn main() -> Result<()> {
    env_logger::init();

    println!("📋 Paste & Compare Demo\n");

    let mut session = KpiSession::new();
    let applied = session.apply_results_from_text(PASTED);
    println!("Applied: {}\n", applied_labels(&applied).join(", "));

    let record = session.record();
    println!("Scenario: {}", record.company_name());
    for field in KpiField::NUMERIC {
        if let Some(value) = record.numeric(field) {
            println!("  {:<22} {}", field.label(), value);
        }
    }

    println!("\n📊 Dashboard");
    let metrics = session.metrics();
    for card in metrics.summary_cards(&Drivers::from(record)) {
        println!("  {:<18} {:>14}   {}", card.title, card.value, card.trend);
    }

    println!("\n📈 Win-rate sensitivity");
    for point in session.sensitivity() {
        let marker = if point.is_current { "◀ current" } else { "" };
        println!(
            "  {:>5}  {:>8}  {}",
            point.name,
            format_currency(point.revenue),
            marker
        );
    }

    println!("\n🚀 Enablement impact");
    let impact = session.impact(&ImpactComparator::default());
    for card in impact.summary_cards() {
        println!("  {:<18} {:>14}   {}", card.title, card.value, card.trend);
    }
    println!(
        "  Platform investment: {}/yr",
        format_currency(impact.platform_annual_cost)
    );
    for row in impact.kpi_rows.iter().chain(&impact.financial_rows) {
        let shown = if row.unit == "$" {
            format!(
                "{} -> {}",
                format_currency(row.baseline),
                format_currency(row.displayed)
            )
        } else {
            format!("{:.1}{} -> {:.1}{}", row.baseline, row.unit, row.displayed, row.unit)
        };
        println!("  {:<18} {}", row.name, shown);
    }

    println!("\n📝 Same scenario as a bullet list:\n");
    print!("{}", render_document(session.record(), DocumentShape::Bullets));

    println!("\nRecord as JSON:\n{}", session.record().to_json()?);

    Ok(())
}
