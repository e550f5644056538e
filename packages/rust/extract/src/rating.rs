//! Rating extraction from text like "6.9/10" or "4 out of 5".

use std::sync::LazyLock;

use regex::Regex;

/// Denominators accepted as rating scales. Anything else (dates, fractions
/// like "1/2") is not a rating.
const SCALES: &[u32] = &[5, 10, 100];

/// A score on a fixed scale, e.g. 6.9 on 10.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rating {
    pub value: f64,
    pub scale: u32,
}

impl Rating {
    /// The score as a fraction of the scale: 6.9/10 → 0.69.
    pub fn fraction(&self) -> f64 {
        self.value / f64::from(self.scale)
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.value, self.scale)
    }
}

/// Find the first rating in `text`.
///
/// Both the `N/D` and `N out of D` forms are matched in one left-to-right scan,
/// so whichever appears first wins. Matches that are part of a longer
/// slash-separated run ("12/10/2024") or exceed their scale are skipped.
pub fn extract_rating(text: &str) -> Option<Rating> {
    static RATING_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)\b(\d{1,3}(?:[.,]\d{1,2})?)\s*(?:/|out\s+of)\s*(\d{1,3})\b")
            .expect("valid regex")
    });

    RATING_RE.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        if text[..whole.start()].ends_with('/') || text[whole.end()..].starts_with('/') {
            return None;
        }

        let value: f64 = caps[1].replace(',', ".").parse().ok()?;
        let scale: u32 = caps[2].parse().ok()?;

        (SCALES.contains(&scale) && value <= f64::from(scale)).then_some(Rating { value, scale })
    })
}
