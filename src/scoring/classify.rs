use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A threshold band mapping a score range to a qualitative outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub threshold_low: f64,
    pub label: String,
    pub message: String,
}

/// The qualitative outcome for one total score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub message: String,
    pub threshold_low: f64,
}

impl From<&Band> for Classification {
    fn from(band: &Band) -> Self {
        Classification {
            label: band.label.clone(),
            message: band.message.clone(),
            threshold_low: band.threshold_low,
        }
    }
}

/// Map a total score to its band.
///
/// Bands are evaluated highest threshold first; the first band whose
/// `threshold_low <= total` wins. Totals below every threshold fall to the
/// lowest band, so a policy with a valid fallback band classifies every
/// total. Returns None only for an empty band list (callers validate that
/// up front).
pub fn classify(total: f64, bands: &[Band]) -> Option<Classification> {
    let mut ordered: Vec<&Band> = bands.iter().collect();
    ordered.sort_by(|a, b| {
        b.threshold_low
            .partial_cmp(&a.threshold_low)
            .unwrap_or(Ordering::Equal)
    });

    ordered
        .iter()
        .find(|band| band.threshold_low <= total)
        .or_else(|| ordered.last())
        .map(|band| Classification::from(*band))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bands() -> Vec<Band> {
        vec![
            Band {
                threshold_low: 85.0,
                label: "very-likely".to_string(),
                message: "Very likely".to_string(),
            },
            Band {
                threshold_low: 65.0,
                label: "likely".to_string(),
                message: "Likely".to_string(),
            },
            Band {
                threshold_low: 40.0,
                label: "possible".to_string(),
                message: "Possible".to_string(),
            },
            Band {
                threshold_low: 0.0,
                label: "unlikely".to_string(),
                message: "Unlikely".to_string(),
            },
        ]
    }

    #[test]
    fn test_highest_matching_band_wins() {
        assert_eq!(classify(90.0, &bands()).unwrap().label, "very-likely");
        assert_eq!(classify(65.0, &bands()).unwrap().label, "likely");
        assert_eq!(classify(64.9, &bands()).unwrap().label, "possible");
    }

    #[test]
    fn test_fallback_band_covers_zero() {
        assert_eq!(classify(0.0, &bands()).unwrap().label, "unlikely");
    }

    #[test]
    fn test_below_every_threshold_falls_to_lowest_band() {
        assert_eq!(classify(-5.0, &bands()).unwrap().label, "unlikely");
    }

    #[test]
    fn test_order_of_declaration_does_not_matter() {
        let mut shuffled = bands();
        shuffled.reverse();
        assert_eq!(classify(70.0, &shuffled).unwrap().label, "likely");
    }

    #[test]
    fn test_empty_bands() {
        assert!(classify(50.0, &[]).is_none());
    }
}
