//! The "trending" filter: issues created in a window of days, in repositories with at least some stars.

use chrono::{DateTime, Duration, Utc};

/// Oldest start of the window, in days ago.
pub const MAX_FROM_DAYS: u16 = 365;
/// Highest accepted star threshold.
pub const MAX_MIN_STARS: u32 = 1_000_000;

/// Star thresholds offered as one-click presets.
pub const STAR_PRESETS: [u32; 4] = [100, 500, 1000, 5000];

/// Windows offered as one-click presets: (label, from, to).
pub const WINDOW_PRESETS: [(&str, u16, u16); 5] = [
    ("1w", 7, 0),
    ("1mo", 30, 0),
    ("3mo", 90, 0),
    ("6mo", 180, 0),
    ("1y", 365, 0),
];

/// A window of days (counted backwards from today) and a star threshold.
///
/// The window is `from_days` ago to `to_days` ago. A window whose end is not after its start
/// is kept as is and matches nothing; the slider panel never produces one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrendingWindow {
    from_days: u16,
    to_days: u16,
    min_stars: u32,
}

impl Default for TrendingWindow {
    fn default() -> Self {
        Self {
            from_days: 30,
            to_days: 0,
            min_stars: 1000,
        }
    }
}

impl TrendingWindow {
    /// Build a window, clamping every value into its bounds.
    pub fn new(from_days: u16, to_days: u16, min_stars: u32) -> Self {
        Self {
            from_days: from_days.clamp(1, MAX_FROM_DAYS),
            to_days: to_days.min(MAX_FROM_DAYS),
            min_stars: min_stars.min(MAX_MIN_STARS),
        }
    }

    pub fn from_days(&self) -> u16 {
        self.from_days
    }

    pub fn to_days(&self) -> u16 {
        self.to_days
    }

    pub fn min_stars(&self) -> u32 {
        self.min_stars
    }

    /// Oldest and newest creation dates accepted by this window.
    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            now - Duration::days(self.from_days.into()),
            now - Duration::days(self.to_days.into()),
        )
    }

    /// Short description, as shown on the trending button.
    pub fn label(&self) -> String {
        let stars = stars_label(self.min_stars);
        if self.to_days == 0 {
            format!("Last {}d · {stars}", self.from_days)
        } else {
            format!("{}d ago ~ {}d ago · {stars}", self.from_days, self.to_days)
        }
    }
}

/// `1000` -> `1k+`, `500` -> `500+`.
pub fn stars_label(min_stars: u32) -> String {
    if min_stars >= 1000 {
        format!("{}k+", min_stars / 1000)
    } else {
        format!("{min_stars}+")
    }
}
