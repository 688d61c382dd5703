use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::scoring::ScoreResult;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a detail string to fit available width, accounting for Unicode
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width <= 1 {
        "…".to_string()
    } else {
        let mut out: String = chars[..max_width - 1].iter().collect();
        out.push('…');
        out
    }
}

/// Format a score value, trimming a trailing ".00" etc. when the fraction
/// is zero (so snow-day odds print "65", GPA prints "3.58").
pub fn format_value(value: f64, decimals: usize) -> String {
    let rounded = round_to(value, decimals);
    let formatted = format!("{:.*}", decimals, rounded);
    if decimals > 0 && formatted.ends_with(&format!(".{}", "0".repeat(decimals))) {
        format!("{:.0}", rounded)
    } else {
        formatted
    }
}

/// Render a fixed-width progress bar for a score in [0, max].
pub fn format_score_bar(total: f64, max: f64, width: usize) -> String {
    let ratio = if max > 0.0 {
        (total / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Format the headline line: bar, total, and tier message.
pub fn format_headline(
    result: &ScoreResult,
    max: f64,
    decimals: usize,
    use_colors: bool,
) -> String {
    if result.no_data {
        let note = "No data entered — nothing to score yet.";
        return if use_colors {
            note.yellow().to_string()
        } else {
            note.to_string()
        };
    }

    let bar = format_score_bar(result.total, max, 20);
    let total = format_value(result.total, decimals);
    let max_str = format_value(max, decimals);

    if use_colors {
        format!(
            "{} {} / {}  {}\n{}",
            bar,
            total.bold(),
            max_str,
            result.tier.label.bold(),
            result.tier.message
        )
    } else {
        format!(
            "{} {} / {}  {}\n{}",
            bar, total, max_str, result.tier.label, result.tier.message
        )
    }
}

/// Format the per-factor breakdown as an aligned table. `show_weights` adds
/// a WEIGHT column (weighted-average policies); contributions are colored
/// green/red by sign.
pub fn format_breakdown_table(
    result: &ScoreResult,
    show_weights: bool,
    decimals: usize,
    use_colors: bool,
) -> String {
    let name_width = result
        .breakdown
        .iter()
        .map(|f| f.name.chars().count())
        .max()
        .unwrap_or(6)
        .max("FACTOR".len());

    let detail_width = get_terminal_width()
        .map(|w| w.saturating_sub(name_width + 24).max(10))
        .unwrap_or(60);

    let mut lines = Vec::with_capacity(result.breakdown.len() + 2);
    if show_weights {
        lines.push(format!(
            "{:<name_width$}  {:>8}  {:>7}  DETAIL",
            "FACTOR", "POINTS", "WEIGHT"
        ));
    } else {
        lines.push(format!("{:<name_width$}  {:>8}  DETAIL", "FACTOR", "POINTS"));
    }

    for factor in &result.breakdown {
        // Pad before coloring: ANSI escapes would throw off the alignment.
        let points = format!("{:>8}", format!("{:+}", round_to(factor.contribution, decimals)));
        let points = if use_colors {
            if factor.contribution < 0.0 {
                points.red().to_string()
            } else {
                points.green().to_string()
            }
        } else {
            points
        };

        let detail = truncate(&factor.detail, detail_width);
        if show_weights {
            lines.push(format!(
                "{:<name_width$}  {}  {:>7}  {}",
                factor.name,
                points,
                format_value(factor.weight, 1),
                detail
            ));
        } else {
            lines.push(format!(
                "{:<name_width$}  {}  {}",
                factor.name, points, detail
            ));
        }
    }

    // Raw vs clamped: only worth a line when the clamp actually bit.
    if result.raw_total != result.total && !result.no_data {
        lines.push(format!(
            "{:<name_width$}  {:>8}  clamped from {}",
            "TOTAL",
            format_value(result.total, decimals),
            format_value(result.raw_total, decimals)
        ));
    }

    lines.join("\n")
}

/// Plain-text summary block for copy/print/export. No colors, no
/// terminal-width dependence.
pub fn format_summary(title: &str, result: &ScoreResult, max: f64, decimals: usize) -> String {
    let mut lines = vec![title.to_string(), "=".repeat(title.chars().count())];

    if result.no_data {
        lines.push("No data entered.".to_string());
        return lines.join("\n");
    }

    lines.push(format!(
        "Score: {} / {} ({})",
        format_value(result.total, decimals),
        format_value(max, decimals),
        result.tier.label
    ));
    lines.push(result.tier.message.clone());
    lines.push(String::new());
    for factor in &result.breakdown {
        lines.push(format!(
            "  {}: {:+} ({})",
            factor.name,
            round_to(factor.contribution, decimals),
            factor.detail
        ));
    }
    lines.join("\n")
}

/// JSON export of a full score result.
pub fn to_json(result: &ScoreResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

fn round_to(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    // Sums like 3.3 + 3.0 land a hair under the .5 boundary in binary;
    // nudge before rounding so 3.575 reports as 3.58, not 3.57.
    ((scaled + scaled.signum() * 1e-9).round()) / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Classification, FactorContribution};

    fn result(total: f64, raw: f64, no_data: bool) -> ScoreResult {
        ScoreResult {
            total,
            raw_total: raw,
            no_data,
            tier: Classification {
                label: "likely".to_string(),
                message: "Likely.".to_string(),
                threshold_low: 65.0,
            },
            breakdown: vec![
                FactorContribution {
                    name: "snowfall".to_string(),
                    contribution: 40.0,
                    weight: 1.0,
                    detail: "5 × 8".to_string(),
                },
                FactorContribution {
                    name: "district".to_string(),
                    contribution: -10.0,
                    weight: 1.0,
                    detail: "aggressive → -10".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_format_value_trims_whole_numbers() {
        assert_eq!(format_value(65.0, 2), "65");
        assert_eq!(format_value(3.575, 2), "3.58");
        assert_eq!(format_value(3.5, 2), "3.50");
    }

    #[test]
    fn test_score_bar_bounds() {
        assert_eq!(format_score_bar(0.0, 100.0, 10), "[----------]");
        assert_eq!(format_score_bar(100.0, 100.0, 10), "[##########]");
        assert_eq!(format_score_bar(50.0, 100.0, 10), "[#####-----]");
        // Out-of-range totals don't overflow the bar
        assert_eq!(format_score_bar(250.0, 100.0, 10), "[##########]");
    }

    #[test]
    fn test_headline_no_data() {
        let headline = format_headline(&result(0.0, 0.0, true), 100.0, 0, false);
        assert!(headline.contains("No data entered"));
        assert!(!headline.contains("0 / 100"));
    }

    #[test]
    fn test_headline_includes_tier() {
        let headline = format_headline(&result(65.0, 65.0, false), 100.0, 0, false);
        assert!(headline.contains("65 / 100"));
        assert!(headline.contains("likely"));
    }

    #[test]
    fn test_breakdown_table_includes_all_factors() {
        let table = format_breakdown_table(&result(30.0, 30.0, false), false, 0, false);
        assert!(table.contains("snowfall"));
        assert!(table.contains("district"));
        assert!(table.contains("+40"));
        assert!(table.contains("-10"));
    }

    #[test]
    fn test_breakdown_table_shows_clamp() {
        let table = format_breakdown_table(&result(100.0, 130.0, false), false, 0, false);
        assert!(table.contains("clamped from 130"));

        let unclamped = format_breakdown_table(&result(30.0, 30.0, false), false, 0, false);
        assert!(!unclamped.contains("clamped"));
    }

    #[test]
    fn test_summary_is_plain() {
        let summary = format_summary("Snow day odds", &result(65.0, 65.0, false), 100.0, 0);
        assert!(summary.starts_with("Snow day odds\n============="));
        assert!(summary.contains("Score: 65 / 100 (likely)"));
        assert!(summary.contains("snowfall: +40"));
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate("héllo wörld", 20), "héllo wörld");
        assert_eq!(truncate("héllo wörld", 6), "héllo…");
    }

    #[test]
    fn test_json_export() {
        let json = to_json(&result(65.0, 65.0, false)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["total"], 65.0);
        assert_eq!(parsed["breakdown"][0]["name"], "snowfall");
    }
}
