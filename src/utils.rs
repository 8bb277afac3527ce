const COMPACT_UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Strips thousands separators and parses the leading run of digits.
/// Returns 0 when there are no digits, which every count field rejects.
pub fn parse_number(raw: &str) -> f64 {
    let cleaned = raw.replace(',', "");
    let digits: String = cleaned
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<f64>().unwrap_or(0.0)
}

/// Strips thousands separators and parses an integer or decimal.
pub fn parse_decimal(raw: &str) -> f64 {
    raw.replace(',', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// `1234567` -> `"1,234,567"`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// USD with no cents. Values above 999,999 switch to compact notation with
/// whole units only ("$2B", "$93M").
pub fn format_currency(value: f64) -> String {
    if value > 999_999.0 {
        return format!("${}", compact(value, true));
    }
    let rounded = value.round();
    if rounded < 0.0 {
        format!("-${}", group_thousands(-rounded as u64))
    } else {
        format!("${}", group_thousands(rounded as u64))
    }
}

/// Short compact notation with two significant digits ("1.7B", "350K", "93M").
pub fn format_compact(value: f64) -> String {
    compact(value, false)
}

/// One decimal place and a percent sign.
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

fn compact(value: f64, whole_only: bool) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    let mut unit_idx = COMPACT_UNITS.iter().position(|(unit, _)| abs >= *unit);
    let mut scaled = round_compact(scale(abs, unit_idx), whole_only);

    // 999,999 rounds up to 1000K, which reads as 1M
    if scaled >= 1000.0 {
        let promoted = match unit_idx {
            Some(0) => None,
            Some(i) => Some(i - 1),
            None => Some(COMPACT_UNITS.len() - 1),
        };
        if promoted.is_some() {
            unit_idx = promoted;
            scaled = round_compact(scale(abs, unit_idx), whole_only);
        }
    }

    let suffix = unit_idx.map(|i| COMPACT_UNITS[i].1).unwrap_or("");
    format!("{}{}{}", sign, scaled, suffix)
}

fn scale(abs: f64, unit_idx: Option<usize>) -> f64 {
    match unit_idx {
        Some(i) => abs / COMPACT_UNITS[i].0,
        None => abs,
    }
}

fn round_compact(scaled: f64, whole_only: bool) -> f64 {
    if whole_only || scaled >= 10.0 {
        scaled.round()
    } else {
        (scaled * 10.0).round() / 10.0
    }
}
