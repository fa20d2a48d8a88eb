use serde::{Deserialize, Serialize};

use crate::model::Telemetry;

/// Points lost per correction keystroke.
pub const CORRECTION_PENALTY: u32 = 2;
/// Seconds of elapsed time that cost one point of time bonus.
pub const SECONDS_PER_POINT: u32 = 10;

const MAX_SCORE: u32 = 100;

/// Completion score in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompletionScore(u8);

impl CompletionScore {
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for CompletionScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Converts attempt telemetry into a completion score.
///
/// The score averages a code-quality component (`100 - 2 * corrections`) with a
/// time bonus (`100 - elapsed / 10`), each floored at zero, rounding halves up.
/// Work happens in tenths of a point so no floating point is involved.
///
/// # Examples
///
/// ```
/// # use practice_core::model::Telemetry;
/// # use practice_core::scoring::score;
/// assert_eq!(score(Telemetry::default()).value(), 100);
/// assert_eq!(score(Telemetry { elapsed_seconds: 120, correction_count: 5 }).value(), 89);
/// ```
#[must_use]
pub fn score(telemetry: Telemetry) -> CompletionScore {
    let quality = MAX_SCORE.saturating_sub(telemetry.correction_count.saturating_mul(CORRECTION_PENALTY));
    let quality_tenths = quality * SECONDS_PER_POINT;
    let time_tenths = (MAX_SCORE * SECONDS_PER_POINT).saturating_sub(telemetry.elapsed_seconds);

    // (quality + time) / 2, in tenths, rounded half up.
    let sum_tenths = quality_tenths + time_tenths;
    let halved = (sum_tenths + SECONDS_PER_POINT) / (2 * SECONDS_PER_POINT);

    CompletionScore(u8::try_from(halved.min(MAX_SCORE)).unwrap_or(u8::MAX))
}
