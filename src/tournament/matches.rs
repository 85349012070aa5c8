// Expected match-count models.
//
// Bracket formats use a geometric round-survival estimate scaled by a
// format-specific volume multiplier. The swiss stage gets an exact
// closed-form model over the finite "first to 3 wins or 3 losses, capped at
// 5 matches" outcome space.

use crate::tournament::format::{FormatDescriptor, FormatKind};

/// A swiss run ends after at most this many matches.
pub const SWISS_ROUND_CAP: u32 = 5;

/// Tolerance on the swiss outcome-probability total before renormalizing.
const SWISS_DRIFT_TOLERANCE: f64 = 1e-8;

// ---------------------------------------------------------------------------
// Bracket formats
// ---------------------------------------------------------------------------

/// Expected round count for a bracket format with `entrants` competitors.
/// Double elimination and group+playoff add one extra round.
pub fn bracket_rounds(kind: FormatKind, entrants: usize) -> u32 {
    let base = (entrants.max(2) as f64).log2().ceil() as u32;
    match kind {
        FormatKind::Double | FormatKind::GroupPlayoff => base + 1,
        _ => base,
    }
}

/// Expected matches played over `rounds` rounds with constant per-round win
/// probability `p`: the finite geometric sum `(1 - p^R) / (1 - p)`.
///
/// The first match is always played, so the estimate is defined as 1 when
/// `p <= 0`; a guaranteed winner plays all `rounds`.
pub fn expected_matches_bracket(p: f64, rounds: u32) -> f64 {
    if p <= 0.0 {
        1.0
    } else if p >= 1.0 {
        rounds as f64
    } else {
        (1.0 - p.powi(rounds as i32)) / (1.0 - p)
    }
}

// ---------------------------------------------------------------------------
// Swiss stage
// ---------------------------------------------------------------------------

/// Exact finish probabilities of a first-to-3 swiss run, conditioned on the
/// number of matches played (3, 4, or 5) and on finishing as a qualifier
/// (3 wins) or being eliminated (3 losses).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwissOutcomes {
    pub p3_win: f64,
    pub p3_loss: f64,
    pub p4_win: f64,
    pub p4_loss: f64,
    pub p5_win: f64,
    pub p5_loss: f64,
}

impl SwissOutcomes {
    /// Build the outcome distribution for per-match win probability `p`.
    ///
    /// A 3-match finish is a clean 3-0 or 0-3; a 4-match finish inserts
    /// exactly one extra loss/win before the deciding result; the 5-match
    /// finishes are the remaining combinatorial paths. The six
    /// sub-probabilities sum to 1; if floating drift exceeds tolerance the
    /// distribution is renormalized.
    pub fn from_win_prob(p: f64) -> Self {
        let p = p.clamp(0.0, 1.0);
        let q = 1.0 - p;
        let mut outcomes = Self {
            p3_win: p.powi(3),
            p3_loss: q.powi(3),
            p4_win: 3.0 * p.powi(3) * q,
            p4_loss: 3.0 * q.powi(3) * p,
            p5_win: 6.0 * p.powi(3) * q * q,
            p5_loss: 6.0 * q.powi(3) * p * p,
        };

        let total = outcomes.total();
        if (total - 1.0).abs() > SWISS_DRIFT_TOLERANCE && total > 0.0 {
            outcomes.p3_win /= total;
            outcomes.p3_loss /= total;
            outcomes.p4_win /= total;
            outcomes.p4_loss /= total;
            outcomes.p5_win /= total;
            outcomes.p5_loss /= total;
        }

        outcomes
    }

    pub fn total(&self) -> f64 {
        self.p3_win + self.p3_loss + self.p4_win + self.p4_loss + self.p5_win + self.p5_loss
    }

    /// Probability-weighted expected number of matches played.
    pub fn expected_matches(&self) -> f64 {
        3.0 * (self.p3_win + self.p3_loss)
            + 4.0 * (self.p4_win + self.p4_loss)
            + 5.0 * (self.p5_win + self.p5_loss)
    }
}

// ---------------------------------------------------------------------------
// Format dispatch
// ---------------------------------------------------------------------------

/// Expected matches for one entrant under the given format.
///
/// Bracket formats use the geometric estimate times the format's volume
/// multiplier; swiss uses the exact outcome model (already exact, so no
/// multiplier applies).
pub fn expected_matches(format: FormatDescriptor, entrants: usize, win_prob: f64) -> f64 {
    match format.kind {
        FormatKind::Swiss => SwissOutcomes::from_win_prob(win_prob).expected_matches(),
        kind => {
            let rounds = bracket_rounds(kind, entrants);
            expected_matches_bracket(win_prob, rounds) * kind.volume_multiplier()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
