//! Writes a record back out as text in the shapes the extractor reads.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schema::KpiRecord;
use crate::utils::group_thousands;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentShape {
    /// Markdown KPI table. Cost per rep and the company have no table row
    /// the extractor reads, so they go on labelled lines around the table.
    Table,
    /// `- Label: value` bullet list.
    Bullets,
    /// Plain `Label: value` lines.
    Inline,
}

impl DocumentShape {
    pub const ALL: [DocumentShape; 3] = [
        DocumentShape::Table,
        DocumentShape::Bullets,
        DocumentShape::Inline,
    ];
}

/// Renders `record` as a document in the given shape.
///
/// The `Company:` line is left out when the name is empty. The name reader
/// stops at `.`, `,` and line breaks, so a name containing those comes back
/// cut short.
pub fn render_document(record: &KpiRecord, shape: DocumentShape) -> String {
    let win_rate = format!("{}%", record.win_rate());
    let deal_size = format!("${}", group_thousands(record.deal_size().round() as u64));
    let opptys = group_thousands(record.opptys());
    let reps = group_thousands(record.reps() as u64);
    let cost_per_rep = format!("${}", group_thousands(record.cost_per_rep().round() as u64));

    let mut out = String::new();
    if !record.company_name().trim().is_empty() {
        out.push_str(&format!("Company: {}\n\n", record.company_name()));
    }

    match shape {
        DocumentShape::Table => {
            out.push_str("| Metric | Value |\n|---|---|\n");
            out.push_str(&format!("| **Win Rate** | {} |\n", win_rate));
            out.push_str(&format!("| **Average Deal Size (ASP)** | {} |\n", deal_size));
            out.push_str(&format!("| **Annual Piped Opptys** | {} |\n", opptys));
            out.push_str(&format!("| **Number of Sales Reps** | {} |\n", reps));
            out.push_str(&format!(
                "| **Sales Cycle Duration** | {} Days |\n",
                record.cycle()
            ));
            out.push_str(&format!("\nCost per rep: {}\n", cost_per_rep));
        }
        DocumentShape::Bullets | DocumentShape::Inline => {
            let marker = if shape == DocumentShape::Bullets { "- " } else { "" };
            let lines = [
                format!("Win rate: {}", win_rate),
                format!("Average deal size: {}", deal_size),
                format!("Annual piped opportunities: {}", opptys),
                format!("Sales reps: {}", reps),
                format!("Sales cycle: {} days", record.cycle()),
                format!("Cost per rep: {}", cost_per_rep),
            ];
            for line in lines {
                out.push_str(&format!("{}{}\n", marker, line));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shape() {
        let doc = render_document(&KpiRecord::default(), DocumentShape::Table);
        assert!(doc.starts_with("Company: Enterprise scenario\n"));
        assert!(doc.contains("| **Win Rate** | 32% |"));
        assert!(doc.contains("| **Average Deal Size (ASP)** | $350,000 |"));
        assert!(doc.contains("| **Sales Cycle Duration** | 165 Days |"));
        assert!(doc.ends_with("Cost per rep: $185,000\n"));
    }

    #[test]
    fn test_bullet_shape() {
        let doc = render_document(&KpiRecord::default(), DocumentShape::Bullets);
        assert!(doc.contains("- Annual piped opportunities: 15,000\n"));
        assert!(doc.contains("- Sales reps: 500\n"));
    }

    #[test]
    fn test_inline_shape_has_no_markers() {
        let doc = render_document(&KpiRecord::default(), DocumentShape::Inline);
        assert!(doc.lines().all(|l| !l.starts_with("- ") && !l.starts_with('|')));
        assert!(doc.contains("Sales cycle: 165 days\n"));
    }

    #[test]
    fn test_empty_name_has_no_company_line() {
        let mut record = KpiRecord::default();
        record.set_company_name("");
        for shape in DocumentShape::ALL {
            let doc = render_document(&record, shape);
            assert!(!doc.contains("Company:"), "{:?}", shape);
        }
    }
}
