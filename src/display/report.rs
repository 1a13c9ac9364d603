//! Monthly summary formatting
//!
//! Shares of spending and budget use are percentages in `0.0..=100.0`.

/// Percentage with one decimal below 10%, whole numbers above
pub fn format_percentage(pct: f64) -> String {
    match pct {
        p if p <= 0.0 => "0%".to_string(),
        p if p < 10.0 => format!("{:.1}%", p),
        p => format!("{:.0}%", p),
    }
}

/// Budget usage bar of `width` cells; values above 100% fill the bar
pub fn format_usage_bar(used_percent: f64, width: usize) -> String {
    let filled = if used_percent > 0.0 {
        ((used_percent.min(100.0) / 100.0) * width as f64).round() as usize
    } else {
        0
    };

    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

/// Rule under the category table header
pub fn separator(width: usize) -> String {
    "─".repeat(width)
}
