use anyhow::{bail, Result};
use serde::Serialize;
use std::fmt;

use crate::scoring::Band;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Parse a hex color: `#RRGGBB`, `#RGB`, with or without the leading `#`.
pub fn parse_hex(s: &str) -> Result<Rgb> {
    let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());

    let expanded = match hex.len() {
        6 => hex.to_string(),
        // Shorthand: each digit doubles, e.g. #abc -> #aabbcc
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        _ => bail!("Hex color must be 3 or 6 digits: '{}'", s),
    };

    let channel = |range: std::ops::Range<usize>| -> Result<u8> {
        u8::from_str_radix(&expanded[range], 16)
            .map_err(|_| anyhow::anyhow!("Invalid hex color: '{}'", s))
    };

    Ok(Rgb {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}

/// WCAG relative luminance, 0.0 (black) to 1.0 (white).
pub fn relative_luminance(color: Rgb) -> f64 {
    fn linearize(channel: u8) -> f64 {
        let c = channel as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    0.2126 * linearize(color.r) + 0.7152 * linearize(color.g) + 0.0722 * linearize(color.b)
}

/// WCAG contrast ratio between two colors, 1.0 (equal) to 21.0
/// (black on white). Symmetric in its arguments.
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// WCAG conformance bands for a contrast ratio, classified with the same
/// band machinery the scoring policies use.
pub fn wcag_bands() -> Vec<Band> {
    vec![
        Band {
            threshold_low: 7.0,
            label: "AAA".to_string(),
            message: "Passes AAA for normal text.".to_string(),
        },
        Band {
            threshold_low: 4.5,
            label: "AA".to_string(),
            message: "Passes AA for normal text, AAA for large text.".to_string(),
        },
        Band {
            threshold_low: 3.0,
            label: "AA-large".to_string(),
            message: "Passes AA for large text only.".to_string(),
        },
        Band {
            threshold_low: 0.0,
            label: "fail".to_string(),
            message: "Fails WCAG contrast requirements.".to_string(),
        },
    ]
}
