use anyhow::{bail, Result};
use serde::Serialize;

/// Duration of one beat (quarter note) in milliseconds.
pub fn beat_ms(bpm: f64) -> Result<f64> {
    if !bpm.is_finite() || bpm <= 0.0 {
        bail!("BPM must be a positive number, got {}", bpm);
    }
    Ok(60_000.0 / bpm)
}

/// Straight, dotted and triplet durations for one note value.
#[derive(Debug, Clone, Serialize)]
pub struct NoteTiming {
    pub note: &'static str,
    pub ms: f64,
    pub dotted_ms: f64,
    pub triplet_ms: f64,
}

/// Note duration table for a tempo, whole note down to 1/32.
pub fn note_timings(bpm: f64) -> Result<Vec<NoteTiming>> {
    let beat = beat_ms(bpm)?;
    // (label, length in beats)
    let notes: [(&'static str, f64); 6] = [
        ("1/1", 4.0),
        ("1/2", 2.0),
        ("1/4", 1.0),
        ("1/8", 0.5),
        ("1/16", 0.25),
        ("1/32", 0.125),
    ];

    Ok(notes
        .iter()
        .map(|(note, beats)| {
            let ms = beat * beats;
            NoteTiming {
                note,
                ms,
                dotted_ms: ms * 1.5,
                triplet_ms: ms * 2.0 / 3.0,
            }
        })
        .collect())
}

/// Tempo-synced reverb settings: pre-delay plus decay adding up to a whole
/// number of bars, so the tail lands on the grid.
#[derive(Debug, Clone, Serialize)]
pub struct ReverbPreset {
    pub name: &'static str,
    pub bars: f64,
    pub pre_delay_ms: f64,
    pub decay_ms: f64,
    pub total_ms: f64,
}

pub fn reverb_presets(bpm: f64) -> Result<Vec<ReverbPreset>> {
    let bar = beat_ms(bpm)? * 4.0;
    // Pre-delay is a 1/64 bar: long enough to separate the dry hit,
    // short enough to stay inside the same grid slot.
    let pre_delay = bar / 64.0;

    let presets: [(&'static str, f64); 3] = [("tight", 0.5), ("room", 1.0), ("hall", 2.0)];

    Ok(presets
        .iter()
        .map(|(name, bars)| {
            let total = bar * bars;
            ReverbPreset {
                name,
                bars: *bars,
                pre_delay_ms: pre_delay,
                decay_ms: total - pre_delay,
                total_ms: total,
            }
        })
        .collect())
}
