//! Pulls KPI values out of free-form pasted documents.
//!
//! Each field owns an ordered pattern table, most structured shape first
//! (markdown table row, then bullet line, then inline `Label: value`, then a
//! bare number next to a unit word). The first pattern whose capture passes the
//! field's validity check wins; later patterns are never consulted, so the
//! order of every table is part of the observable behavior.
//!
//! All patterns run on the linear-time `regex` engine, so arbitrarily large or
//! hostile input cannot trigger catastrophic backtracking.

use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::{KpiField, PartialKpiRecord, MAX_COMPANY_NAME_CHARS};
use crate::utils::{parse_decimal, parse_number, truncate_chars};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Magnitude {
    Units,
    Thousands,
    Millions,
}

impl Magnitude {
    pub fn factor(self) -> f64 {
        match self {
            Magnitude::Units => 1.0,
            Magnitude::Thousands => 1_000.0,
            Magnitude::Millions => 1_000_000.0,
        }
    }
}

#[derive(Debug)]
pub struct FieldPattern {
    regex: Regex,
    magnitude: Magnitude,
    rejects_millions_suffix: bool,
}

impl FieldPattern {
    fn new(pattern: &str) -> Self {
        Self::scaled(pattern, Magnitude::Units)
    }

    fn scaled(pattern: &str, magnitude: Magnitude) -> Self {
        Self {
            regex: Regex::new(pattern).expect("extraction patterns are valid"),
            magnitude,
            rejects_millions_suffix: false,
        }
    }

    /// The match is discarded when the captured amount is directly followed
    /// by an `M`, leaving it to the millions patterns.
    fn without_millions_suffix(mut self) -> Self {
        self.rejects_millions_suffix = true;
        self
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn magnitude(&self) -> Magnitude {
        self.magnitude
    }

    /// Leftmost match of this pattern, returning capture group 1.
    ///
    /// For patterns that refuse a trailing `M`, a refused amount is first
    /// shortened by one character, then the search moves on to the next
    /// amount in the same table cell, then to the next matching row.
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        if !self.rejects_millions_suffix {
            return Some(self.regex.captures(text)?.get(1)?.as_str());
        }

        let mut from = 0;
        while let Some(caps) = self.regex.captures_at(text, from) {
            let (whole, group) = (caps.get(0)?, caps.get(1)?);
            if let Some(amount) = amount_without_millions_suffix(text, group.start(), group.end()) {
                return Some(amount);
            }
            from = whole.start() + 1;
        }
        None
    }
}

fn amount_without_millions_suffix(text: &str, mut start: usize, mut end: usize) -> Option<&str> {
    loop {
        if !MILLIONS_SUFFIX.is_match(&text[end..]) {
            return Some(&text[start..end]);
        }
        if end - start > 1 {
            // the shorter amount is followed by a digit or comma, never an `M`
            return Some(&text[start..end - 1]);
        }
        let rest = start + 1;
        let next = NEXT_AMOUNT_IN_CELL.captures(&text[rest..])?.get(1)?;
        start = rest + next.start();
        end = rest + next.end();
    }
}

static MILLIONS_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*M").expect("extraction patterns are valid"));
static NEXT_AMOUNT_IN_CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^|]*?([0-9,]+)").expect("extraction patterns are valid"));

static WIN_RATE_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    vec![
        FieldPattern::new(r"(?i)\|\s*\*?\*?Win\s*Rate\*?\*?\s*\|\s*[^|]*?~?([0-9]+(?:\.[0-9]+)?)\s*%?"),
        FieldPattern::new(r"(?im)(?:^|\n)\s*[-*•]\s*(?:win\s*rate|winrate)[:\s\-]+([0-9]+(?:\.[0-9]+)?)\s*%?"),
        FieldPattern::new(r"(?i)(?:win\s*rate|winrate)[:\s\-]+([0-9]+(?:\.[0-9]+)?)\s*%?"),
        FieldPattern::new(r"(?i)(?:win\s*rate|winrate)[:\s\-]+([0-9]+(?:\.[0-9]+)?)"),
        FieldPattern::new(r"(?i)([0-9]+(?:\.[0-9]+)?)\s*%\s*win\s*rate"),
        FieldPattern::new(r"(?i)([0-9]+(?:\.[0-9]+)?)\s*%\s*win"),
        FieldPattern::new(r"(?i)win\s*rate\s*(?:is\s*)?(?:at\s*)?~?([0-9]+(?:\.[0-9]+)?)\s*%?"),
        FieldPattern::new(r"(?i)\*\*Win\s*Rate\*\*[:\s]*~?([0-9]+(?:\.[0-9]+)?)\s*%?"),
    ]
});

static DEAL_SIZE_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    use Magnitude::*;
    vec![
        FieldPattern::scaled(r"(?i)\|\s*\*?\*?Average\s*Deal\s*Size\s*\(ASP\)\*?\*?\s*\|\s*[^|]*?\$?([0-9]+(?:\.[0-9]+)?)\s*M", Millions),
        FieldPattern::scaled(r"(?i)\|\s*\*?\*?Average\s*Deal\s*Size\*?\*?\s*\|\s*[^|]*?\$?([0-9]+(?:\.[0-9]+)?)\s*M", Millions),
        FieldPattern::scaled(r"(?i)\|\s*\*?\*?Deal\s*Size\*?\*?\s*\|\s*[^|]*?\$?([0-9,]+(?:\.[0-9]+)?)\s*M", Millions),
        FieldPattern::new(r"(?i)\|\s*\*?\*?Average\s*Deal\s*Size\s*\(ASP\)\*?\*?\s*\|\s*[^|]*?\$?([0-9,]+)")
            .without_millions_suffix(),
        FieldPattern::scaled(r"(?im)(?:^|\n)\s*[-*•]\s*(?:average\s*)?deal\s*size[:\s\-]+\$?([0-9]+(?:\.[0-9]+)?)\s*M", Millions),
        FieldPattern::scaled(r"(?i)(?:average\s*)?deal\s*size\s*(?:\(asp\))?[:\s\-]+\$?([0-9]+(?:\.[0-9]+)?)\s*M", Millions),
        FieldPattern::scaled(r"(?i)(?:average\s*)?deal\s*size\s*(?:\(asp\))?[:\s\-]+\$?([0-9,]+)\s*k", Thousands),
        FieldPattern::new(r"(?i)(?:average\s*)?deal\s*size\s*(?:\(asp\))?[:\s\-]+\$?([0-9,]+)"),
        FieldPattern::scaled(r"(?i)asp[:\s\-]+\$?([0-9]+(?:\.[0-9]+)?)\s*M", Millions),
        FieldPattern::scaled(r"(?i)asp[:\s\-]+\$?([0-9,]+)\s*k", Thousands),
        FieldPattern::scaled(r"(?i)\*\*Average\s*Deal\s*Size\*\*[:\s]*\$?([0-9]+(?:\.[0-9]+)?)\s*M", Millions),
        // case-sensitive: a lowercase "m" after a dollar figure is usually "minutes" or "months"
        FieldPattern::scaled(r"\$([0-9]+(?:\.[0-9]+)?)\s*M(?-u:\b)", Millions),
        FieldPattern::scaled(r"(?i)\$([0-9,]+)\s*k(?-u:\b)", Thousands),
    ]
});

static OPPTYS_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    vec![
        FieldPattern::new(r"(?i)\|\s*\*?\*?Annual\s*Piped\s*Opptys?\*?\*?\s*\|\s*[^|]*?~?([0-9,]+)"),
        FieldPattern::new(r"(?i)\|\s*\*?\*?Pipeline\s*Opportunities\*?\*?\s*\|\s*[^|]*?~?([0-9,]+)"),
        FieldPattern::new(r"(?im)(?:^|\n)\s*[-*•]\s*(?:annual\s*)?(?:piped\s*)?(?:pipeline\s*)?opportunit(?:y|ies)[:\s\-]+([0-9,]+)"),
        FieldPattern::new(r"(?i)(?:annual\s*)?(?:piped\s*)?(?:pipeline\s*)?opportunit(?:y|ies)[:\s\-]+([0-9,]+)"),
        FieldPattern::new(r"(?i)(?:annual\s*)?(?:piped\s*)?opptys?[:\s\-]+([0-9,]+)"),
        FieldPattern::new(r"(?i)(?:pipeline|opportunities)[:\s\-]+([0-9,]+)"),
        FieldPattern::new(r"(?i)([0-9,]+)\s*(?:annual\s*)?(?:piped\s*)?opportunit"),
        FieldPattern::new(r"(?i)\*\*Annual\s*Piped\s*Opptys?\*\*[:\s]*~?([0-9,]+)"),
    ]
});

static REPS_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    vec![
        FieldPattern::new(r"(?i)\|\s*\*?\*?Number\s*of\s*Sales\s*Reps?\*?\*?\s*\|\s*[^|]*?~?([0-9,]+)"),
        FieldPattern::new(r"(?i)\|\s*\*?\*?Sales\s*Reps?\*?\*?\s*\|\s*[^|]*?~?([0-9,]+)"),
        FieldPattern::new(r"(?im)(?:^|\n)\s*[-*•]\s*(?:number\s*of\s*)?(?:sales\s*)?reps?[:\s\-]+([0-9,]+)"),
        FieldPattern::new(r"(?i)(?:number\s*of\s*)?(?:sales\s*)?reps?[:\s\-]+([0-9,]+)"),
        FieldPattern::new(r"(?i)([0-9,]+)\s*(?:sales\s*)?reps?(?-u:\b)"),
        FieldPattern::new(r"(?i)\*\*Number\s*of\s*Sales\s*Reps?\*\*[:\s]*~?([0-9,]+)"),
    ]
});

static CYCLE_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    vec![
        FieldPattern::new(r"(?i)\|\s*\*?\*?Sales\s*Cycle\s*Duration\*?\*?\s*\|\s*[^|]*?([0-9]+)\s*Days?"),
        FieldPattern::new(r"(?i)\|\s*\*?\*?Sales\s*Cycle\*?\*?\s*\|\s*[^|]*?([0-9]+)\s*Days?"),
        FieldPattern::new(r"(?im)(?:^|\n)\s*[-*•]\s*(?:sales\s*)?cycle\s*(?:duration)?[:\s\-]+([0-9]+)\s*days?"),
        FieldPattern::new(r"(?i)(?:sales\s*)?cycle\s*(?:duration)?[:\s\-]+([0-9]+)\s*days?"),
        FieldPattern::new(r"(?i)(?:sales\s*)?cycle[:\s\-]+([0-9]+)"),
        FieldPattern::new(r"(?i)([0-9]+)\s*days?\s*(?:sales\s*)?cycle"),
        FieldPattern::new(r"(?i)cycle[:\s\-]+([0-9]+)\s*days?"),
        FieldPattern::new(r"(?i)\*\*Sales\s*Cycle\s*Duration\*\*[:\s]*([0-9]+)\s*Days?"),
    ]
});

static COST_PER_REP_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    vec![
        FieldPattern::new(r"(?i)cost\s*per\s*rep[:\s\-]+\$?([0-9,]+)"),
        FieldPattern::new(r"(?i)(?:per\s*rep\s*)?cost[:\s\-]+\$?([0-9,]+)"),
        FieldPattern::new(r"(?i)(?:fully\s*loaded\s*)?cost\s*per\s*rep[:\s\-]+\$?([0-9,]+)"),
    ]
});

static COMPANY_NAME_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    vec![
        FieldPattern::new(r"(?i)([A-Za-z0-9\&\s]+)\s+(?:Wholesale|Enterprise|Strategic|B2B|DTC)\s+ROI\s+Model"),
        FieldPattern::new(r"(?i)(?:general\s+)?(?:enterprise\s+)?model\s+for\s+([A-Za-z0-9\&\s]+)"),
        FieldPattern::new(r"(?i)([A-Za-z0-9\&\s]+)\s+Enterprise\s+ROI\s+Model"),
        FieldPattern::new(r"(?i)(?:company|scenario|client|organization)[:\s]+([^\n.,]+)"),
        FieldPattern::new(r"(?i)(?:company|scenario|model)[:\s]*([^\n.,]+)"),
    ]
});

static WHOLESALE_ROI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+Wholesale\s+ROI").expect("extraction patterns are valid"));
static ENTERPRISE_ROI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+Enterprise\s+ROI").expect("extraction patterns are valid"));

/// The ordered pattern table consulted for `field`.
pub fn pattern_table(field: KpiField) -> &'static [FieldPattern] {
    match field {
        KpiField::CompanyName => COMPANY_NAME_PATTERNS.as_slice(),
        KpiField::WinRate => WIN_RATE_PATTERNS.as_slice(),
        KpiField::DealSize => DEAL_SIZE_PATTERNS.as_slice(),
        KpiField::Opptys => OPPTYS_PATTERNS.as_slice(),
        KpiField::Reps => REPS_PATTERNS.as_slice(),
        KpiField::Cycle => CYCLE_PATTERNS.as_slice(),
        KpiField::CostPerRep => COST_PER_REP_PATTERNS.as_slice(),
    }
}

/// Scans `text` for every field and returns the ones it recognized.
pub fn extract(text: &str) -> PartialKpiRecord {
    let partial = PartialKpiRecord {
        company_name: extract_company_name(text),
        win_rate: extract_value(text, KpiField::WinRate),
        deal_size: extract_value(text, KpiField::DealSize),
        opptys: extract_value(text, KpiField::Opptys).map(|v| v as u64),
        reps: extract_value(text, KpiField::Reps).map(|v| v as u32),
        cycle: extract_value(text, KpiField::Cycle).map(|v| v as u32),
        cost_per_rep: extract_value(text, KpiField::CostPerRep),
    };

    debug!(
        "Recognized {} of {} fields in {} bytes of text",
        partial.len(),
        KpiField::ALL.len(),
        text.len()
    );

    partial
}

/// First valid value for a numeric field, rounded and clamped to its bounds.
/// Always `None` for [`KpiField::CompanyName`].
pub fn extract_value(text: &str, field: KpiField) -> Option<f64> {
    first_valid_match(text, field).map(|(_, value)| value)
}

/// Index of the winning pattern together with its rounded, clamped value.
pub(crate) fn first_valid_match(text: &str, field: KpiField) -> Option<(usize, f64)> {
    let bounds = field.bounds()?;

    for (idx, pattern) in pattern_table(field).iter().enumerate() {
        let Some(raw) = pattern.capture(text) else {
            continue;
        };

        let value = parse_capture(field, raw) * pattern.magnitude().factor();
        if !is_acceptable(field, value) {
            trace!("{} pattern #{} captured {:?}, rejected", field, idx, raw);
            continue;
        }

        let clamped = bounds.clamp_rounded(value);
        debug!(
            "{} pattern #{} captured {:?} -> {}",
            field, idx, raw, clamped
        );
        return Some((idx, clamped));
    }

    None
}

fn parse_capture(field: KpiField, raw: &str) -> f64 {
    match field {
        KpiField::WinRate | KpiField::DealSize => parse_decimal(raw),
        _ => parse_number(raw),
    }
}

fn is_acceptable(field: KpiField, value: f64) -> bool {
    match field {
        KpiField::WinRate => (0.0..=100.0).contains(&value),
        _ => value > 0.0,
    }
}

/// First non-empty company or scenario title, with `**` emphasis removed,
/// capped at 80 characters and qualified by the deal type the document
/// announces.
pub fn extract_company_name(text: &str) -> Option<String> {
    let (idx, name) = first_name_match(text)?;
    debug!("companyName pattern #{} captured {:?}", idx, name);
    Some(qualify_name(text, name))
}

/// Index of the winning name pattern and the cleaned, unqualified name.
pub(crate) fn first_name_match(text: &str) -> Option<(usize, String)> {
    for (idx, pattern) in pattern_table(KpiField::CompanyName).iter().enumerate() {
        let Some(raw) = pattern.capture(text) else {
            continue;
        };

        let name = truncate_chars(&raw.trim().replace("**", ""), MAX_COMPANY_NAME_CHARS);
        if name.is_empty() {
            continue;
        }

        return Some((idx, name));
    }

    None
}

fn qualify_name(text: &str, name: String) -> String {
    let lower = name.to_lowercase();
    let qualified = if WHOLESALE_ROI.is_match(text) {
        if lower.contains("wholesale") {
            name
        } else {
            format!("{} Wholesale", name)
        }
    } else if ENTERPRISE_ROI.is_match(text) && !lower.contains("enterprise") {
        format!("{} Enterprise", name)
    } else {
        name
    };

    truncate_chars(&qualified, MAX_COMPANY_NAME_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pattern_tables_compile_in_order() {
        let sizes: Vec<usize> = KpiField::ALL
            .iter()
            .map(|f| pattern_table(*f).len())
            .collect();
        assert_eq!(sizes, vec![5, 8, 13, 8, 6, 8, 3]);

        // most structured shape first
        assert!(pattern_table(KpiField::WinRate)[0].as_str().contains(r"\|"));
        assert_eq!(
            pattern_table(KpiField::DealSize)[6].magnitude(),
            Magnitude::Thousands
        );
    }

    #[test]
    fn test_every_pattern_wins_for_its_own_shape() {
        use KpiField::*;
        // (field, text, winning pattern index, value)
        let cases: &[(KpiField, &str, usize, f64)] = &[
            (WinRate, "| Win Rate | ~28% |", 0, 28.0),
            (WinRate, "- Win rate: 30%", 1, 30.0),
            (WinRate, "Win rate: 27%", 2, 27.0),
            (WinRate, "Closing at 35% win rate", 4, 35.0),
            (WinRate, "A 41% win in Q3", 5, 41.0),
            (WinRate, "Win rate is at ~33%", 6, 33.0),
            (WinRate, "**Win Rate**: ~31%", 7, 31.0),
            (DealSize, "| Average Deal Size (ASP) | $1.2M |", 0, 1_200_000.0),
            (DealSize, "| Average Deal Size | $2.5M |", 1, 2_500_000.0),
            (DealSize, "| Deal Size | $1,500M |", 2, 50_000_000.0),
            (DealSize, "| Average Deal Size (ASP) | $350,000 |", 3, 350_000.0),
            (DealSize, "- Deal size: $1.5M", 4, 1_500_000.0),
            (DealSize, "Average deal size (ASP): $2M", 5, 2_000_000.0),
            (DealSize, "Deal size: $450k", 6, 450_000.0),
            (DealSize, "Deal size: 85,000", 7, 85_000.0),
            (DealSize, "ASP: $1.5M", 8, 1_500_000.0),
            (DealSize, "asp - 450k", 9, 450_000.0),
            (DealSize, "**Average Deal Size**: $1.2M", 10, 1_200_000.0),
            (DealSize, "Closed a $2.5M contract", 11, 2_500_000.0),
            (DealSize, "typical $40k deals", 12, 40_000.0),
            (Opptys, "| Annual Piped Opptys | ~6,500 |", 0, 6_500.0),
            (Opptys, "| Pipeline Opportunities | 8,000 |", 1, 8_000.0),
            (Opptys, "- Annual opportunities: 9,000", 2, 9_000.0),
            (Opptys, "Pipeline opportunities: 12,000", 3, 12_000.0),
            (Opptys, "Opptys: 9,000", 4, 9_000.0),
            (Opptys, "Pipeline: 12,345", 5, 12_345.0),
            (Opptys, "Works 25,000 opportunities a year", 6, 25_000.0),
            (Opptys, "**Annual Piped Opptys**: 7,000", 7, 7_000.0),
            (Reps, "| Number of Sales Reps | 210 |", 0, 210.0),
            (Reps, "| Sales Reps | 40 |", 1, 40.0),
            (Reps, "- Sales reps: 80", 2, 80.0),
            (Reps, "Number of sales reps: 65", 3, 65.0),
            (Reps, "Team of 75 reps", 4, 75.0),
            (Reps, "**Number of Sales Reps** ~90", 5, 90.0),
            (Cycle, "| Sales Cycle Duration | 190 Days |", 0, 190.0),
            (Cycle, "| Sales Cycle | 60 Days |", 1, 60.0),
            (Cycle, "- Sales cycle: 45 days", 2, 45.0),
            (Cycle, "Sales cycle duration: 120 days", 3, 120.0),
            (Cycle, "Cycle: 45", 4, 45.0),
            (Cycle, "A 90 day sales cycle", 5, 90.0),
            (Cycle, "**Sales Cycle Duration** 150 Days", 7, 150.0),
            (CostPerRep, "Cost per rep: $185,000", 0, 185_000.0),
            (CostPerRep, "Total cost: 92,500,000", 1, 500_000.0),
        ];
        for &(field, text, idx, value) in cases {
            assert_eq!(first_valid_match(text, field), Some((idx, value)), "{}", text);
        }

        let names = [
            ("Northwind Wholesale ROI Model", 0, "Northwind"),
            ("Enterprise model for Globex Industries.", 1, "Globex Industries"),
            ("Client: Hooli", 3, "Hooli"),
            ("Model Acme Corp", 4, "Acme Corp"),
        ];
        for (text, idx, name) in names {
            assert_eq!(first_name_match(text), Some((idx, name.to_string())), "{}", text);
        }
    }

    #[test]
    fn test_shadowed_patterns_capture_but_never_win() {
        use KpiField::*;
        // (field, text, shadowed index, its capture, winning index)
        let cases = [
            (WinRate, "Quoted winrate 44", 3, "44", 2),
            (Cycle, "Cycle - 40 days", 6, "40", 3),
            (CostPerRep, "Fully loaded cost per rep: $210,000", 2, "210,000", 0),
            (CompanyName, "Initech Enterprise ROI Model", 2, "Initech", 0),
        ];
        for (field, text, shadowed, raw, winner) in cases {
            assert_eq!(pattern_table(field)[shadowed].capture(text), Some(raw), "{}", text);
            let won = match field {
                CompanyName => first_name_match(text).map(|(idx, _)| idx),
                _ => first_valid_match(text, field).map(|(idx, _)| idx),
            };
            assert_eq!(won, Some(winner), "{}", text);
        }
    }

    #[test]
    fn test_millions_guard_keeps_searching_the_cell() {
        let table = pattern_table(KpiField::DealSize);
        let text = "| Average Deal Size (ASP) | $0M typically $350,000 |";
        assert_eq!(table[3].capture(text), Some("350,000"));
        assert_eq!(first_valid_match(text, KpiField::DealSize), Some((3, 350_000.0)));

        // a comma is an amount character, so it is the next candidate here
        let text = "| Average Deal Size (ASP) | $0M, typically $350,000 |";
        assert_eq!(table[3].capture(text), Some(","));
        assert_eq!(extract_value(text, KpiField::DealSize), None);

        assert_eq!(table[3].capture("| Average Deal Size (ASP) | $12M |"), Some("1"));
        assert_eq!(table[3].capture("| Average Deal Size (ASP) | $0 M or $5 M |"), None);

        let text = "| Average Deal Size (ASP) | $0M |\n| Average Deal Size (ASP) | $90,000 |";
        assert_eq!(table[3].capture(text), Some("90,000"));
    }

    #[test]
    fn test_word_boundaries_are_ascii() {
        assert_eq!(extract_value("5 repsé", KpiField::Reps), Some(5.0));
        assert_eq!(extract_value("Paid $40ké", KpiField::DealSize), Some(40_000.0));
        assert_eq!(extract_value("Paid $2Mé", KpiField::DealSize), Some(2_000_000.0));
    }

    #[test]
    fn test_bare_millions_needs_uppercase_m() {
        let bare_millions = &pattern_table(KpiField::DealSize)[11];
        assert_eq!(bare_millions.capture("Closed a $2M deal"), Some("2"));
        assert_eq!(bare_millions.capture("Closed a $2m deal"), None);
    }

    #[test]
    fn test_markdown_table_document() {
        let text = indoc! {"
            # Northwind Wholesale ROI Model

            | KPI | Estimate | Notes |
            |---|---|---|
            | **Win Rate** | ~28% | blended |
            | **Average Deal Size (ASP)** | $1.2M | strategic |
            | **Annual Piped Opptys** | ~4,800 | |
            | **Number of Sales Reps** | 120 | |
            | **Sales Cycle Duration** | 210 Days | |
        "};

        let partial = extract(text);
        assert_eq!(
            partial,
            PartialKpiRecord {
                company_name: Some("Northwind Wholesale".to_string()),
                win_rate: Some(28.0),
                deal_size: Some(1_200_000.0),
                opptys: Some(4_800),
                reps: Some(120),
                cycle: Some(210),
                cost_per_rep: None,
            }
        );
    }

    #[test]
    fn test_prose_document() {
        let text = "Our team of 1,200 sales reps works 25,000 opportunities a year at a 42% win rate, with deals averaging $450k and a 90 day sales cycle.";
        let partial = extract(text);
        assert_eq!(partial.win_rate, Some(42.0));
        assert_eq!(partial.deal_size, Some(450_000.0));
        assert_eq!(partial.opptys, Some(25_000));
        assert_eq!(partial.reps, Some(1_200));
        assert_eq!(partial.cycle, Some(90));
        assert_eq!(partial.cost_per_rep, None);
        assert_eq!(partial.company_name, None);
    }

    #[test]
    fn test_unrecognized_text_yields_nothing() {
        let partial = extract("Quarterly notes: nothing quantitative here.");
        assert!(partial.is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_decimal_win_rate_is_rounded() {
        assert_eq!(extract_value("Win rate: 27.6%", KpiField::WinRate), Some(28.0));
        assert_eq!(extract_value("**Win Rate**: ~31%", KpiField::WinRate), Some(31.0));
        assert_eq!(extract_value("- Win rate 30%", KpiField::WinRate), Some(30.0));
        assert_eq!(extract_value("The winrate - 55", KpiField::WinRate), Some(55.0));
    }

    #[test]
    fn test_values_are_clamped_to_bounds() {
        let partial = extract("Win rate: 0.4%\nSales cycle: 2 days\nAverage deal size: $75M");
        assert_eq!(partial.win_rate, Some(1.0));
        assert_eq!(partial.cycle, Some(7));
        assert_eq!(partial.deal_size, Some(50_000_000.0));

        assert_eq!(
            extract_value("Total cost: 92,500,000", KpiField::CostPerRep),
            Some(500_000.0)
        );
    }

    #[test]
    fn test_invalid_capture_falls_through_to_next_pattern() {
        let text = "Win rate: 150% (typo); realistic 35% win rate";
        assert_eq!(extract_value(text, KpiField::WinRate), Some(35.0));

        let text = "Pipeline opportunities: 0\n4,000 opportunities next year";
        assert_eq!(extract_value(text, KpiField::Opptys), Some(4_000.0));
    }

    #[test]
    fn test_table_row_outranks_earlier_bullet() {
        let text = "- Win rate: 25%\n\n| Win Rate | 40% |";
        assert_eq!(extract_value(text, KpiField::WinRate), Some(40.0));
    }

    #[test]
    fn test_deal_size_magnitudes() {
        let cases = [
            ("ASP: $1.5M", 1_500_000.0),
            ("Deal size: $450k", 450_000.0),
            ("Closed a $2.5M contract last quarter", 2_500_000.0),
            ("| Deal Size | $3M |", 3_000_000.0),
            ("| Average Deal Size | $2.25 M |", 2_250_000.0),
            ("| Average Deal Size (ASP) | $350,000 |", 350_000.0),
            ("| Average Deal Size (ASP) | $1,200M |", 50_000_000.0),
        ];
        for (text, expected) in cases {
            assert_eq!(
                extract_value(text, KpiField::DealSize),
                Some(expected),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_unit_adjacent_numbers() {
        assert_eq!(extract_value("Headcount is 75 reps", KpiField::Reps), Some(75.0));
        assert_eq!(extract_value("Our 120 day sales cycle", KpiField::Cycle), Some(120.0));
        assert_eq!(extract_value("Cycle: 45", KpiField::Cycle), Some(45.0));
        assert_eq!(extract_value("Pipeline: 12,345", KpiField::Opptys), Some(12_345.0));
        assert_eq!(extract_value("Opptys: 9,000", KpiField::Opptys), Some(9_000.0));
    }

    #[test]
    fn test_company_name_patterns() {
        let cases = [
            ("Enterprise model for Globex Industries.", "Globex Industries"),
            ("Initech Enterprise ROI Model", "Initech Enterprise"),
            ("Umbrella Corp Wholesale ROI Model", "Umbrella Corp Wholesale"),
            ("Scenario: **Contoso Retail**", "Contoso Retail"),
            ("Client: Hooli\nWin rate: 20%", "Hooli"),
            (
                "Organization: Massive Dynamic Holdings, a subsidiary",
                "Massive Dynamic Holdings",
            ),
        ];
        for (text, expected) in cases {
            assert_eq!(extract_company_name(text).as_deref(), Some(expected), "{}", text);
        }
    }

    #[test]
    fn test_company_name_is_truncated() {
        let text = format!("Company: {}", "A".repeat(120));
        let name = extract_company_name(&text).unwrap();
        assert_eq!(name.chars().count(), 80);
    }

    #[test]
    fn test_existing_qualifier_is_not_repeated() {
        let text = "Company: Wholesale Partners\nAcme Wholesale ROI overview";
        assert_eq!(
            extract_company_name(text).as_deref(),
            Some("Wholesale Partners")
        );
    }

    #[test]
    fn test_name_field_has_no_numeric_value() {
        assert_eq!(extract_value("Company: Acme", KpiField::CompanyName), None);
    }
}
