// Expected-points scoring: folds match-count expectation, win probability,
// and rating-derived points into a per-player expected total, with a
// popularity-penalty adjustment and a diagnostic tie-break score.
//
// All derived fields are recomputed fresh per (profile, format) pass and
// never mutated incrementally.

use crate::config::{ModelParams, Profile};
use crate::ingest::Player;
use crate::scoring::strength::{compute_strengths, StrengthScore, TeamAggregates};
use crate::tournament::format::{FormatDescriptor, FormatKind};
use crate::tournament::matches::{
    bracket_rounds, expected_matches_bracket, SwissOutcomes, SWISS_ROUND_CAP,
};
use crate::tournament::winprob::elo_win_prob;

// ---------------------------------------------------------------------------
// Scored player
// ---------------------------------------------------------------------------

/// A player plus every derived scoring field for one (profile, format) pass.
#[derive(Debug, Clone)]
pub struct ScoredPlayer {
    pub player: Player,
    pub strength: StrengthScore,
    /// First-match win probability.
    pub win_prob: f64,
    pub expected_matches: f64,
    pub base_points_per_match: f64,
    pub team_points_per_match: f64,
    pub expected_total: f64,
    /// Popularity penalty factor, clamped to [0.5, 1.0].
    pub penalty_factor: f64,
    /// The optimizer's primary objective.
    pub adjusted_points: f64,
    /// Profile-weighted diagnostic score; tie-break only.
    pub heuristic_score: f64,
}

// ---------------------------------------------------------------------------
// Point formulas
// ---------------------------------------------------------------------------

/// Individual base points per match. Negative for below-average ratings.
pub fn base_points_per_match(rating: f64) -> f64 {
    (rating - 100.0) / 2.0
}

/// Team-outcome points per match as an expectation: a win pays +6, a loss
/// pays -3, so `9p - 3`.
pub fn team_points_per_match(win_prob: f64) -> f64 {
    9.0 * win_prob - 3.0
}

/// Popularity penalty factor `max(0.5, 1 - pick_rate * lambda)`: a player
/// never loses more than half their expected value for being popular.
pub fn penalty_factor(pick_rate: f64, lambda: f64) -> f64 {
    (1.0 - pick_rate * lambda).max(0.5)
}

/// Scenario-weighted swiss total. Qualifiers keep earning base points
/// through the full round cap; eliminated players only earn for the rounds
/// they actually played. Team-outcome points accrue per match played.
fn swiss_expected_total(outcomes: &SwissOutcomes, base: f64, team: f64) -> f64 {
    let cap = SWISS_ROUND_CAP as f64;
    let win_scenarios = outcomes.p3_win * (cap * base + 3.0 * team)
        + outcomes.p4_win * (cap * base + 4.0 * team)
        + outcomes.p5_win * (cap * base + 5.0 * team);
    let loss_scenarios = outcomes.p3_loss * 3.0 * (base + team)
        + outcomes.p4_loss * 4.0 * (base + team)
        + outcomes.p5_loss * 5.0 * (base + team);
    win_scenarios + loss_scenarios
}

// ---------------------------------------------------------------------------
// Scoring pass
// ---------------------------------------------------------------------------

/// Score the whole pool for one (profile, format) pass.
///
/// `entrants` is the number of competing teams, used for the bracket round
/// count. Seeded players use their seed group's mean points for the Elo
/// differential; a missing first-opponent seed assumes an evenly matched
/// opener.
pub fn score_players(
    players: &[Player],
    format: FormatDescriptor,
    entrants: usize,
    model: &ModelParams,
    profile: &Profile,
) -> Vec<ScoredPlayer> {
    let strengths = compute_strengths(players, model);
    let teams = TeamAggregates::build(players, &strengths);
    let max_rating = players
        .iter()
        .map(|p| p.rating)
        .fold(0.0_f64, f64::max);

    players
        .iter()
        .zip(&strengths)
        .map(|(player, &strength)| {
            score_one(player, strength, &teams, format, entrants, model, profile, max_rating)
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn score_one(
    player: &Player,
    strength: StrengthScore,
    teams: &TeamAggregates,
    format: FormatDescriptor,
    entrants: usize,
    model: &ModelParams,
    profile: &Profile,
    max_rating: f64,
) -> ScoredPlayer {
    // Group aggregates where available, own scores otherwise.
    let (own_points, own_power) = match player.seed.and_then(|s| teams.get(s)) {
        Some(aggregate) => (aggregate.mean_points, aggregate.mean_power),
        None => (strength.points, strength.power),
    };
    // No known first opponent: assume an evenly matched opener.
    let opp_points = player
        .first_opponent_seed
        .and_then(|s| teams.get(s))
        .map(|a| a.mean_points)
        .unwrap_or(own_points);

    let win_prob = elo_win_prob(own_points, opp_points, model.elo_scale);
    let base = base_points_per_match(player.rating);
    let team = team_points_per_match(win_prob);

    let (expected_matches, expected_total) = match format.kind {
        FormatKind::Swiss => {
            let outcomes = SwissOutcomes::from_win_prob(win_prob);
            (
                outcomes.expected_matches(),
                swiss_expected_total(&outcomes, base, team),
            )
        }
        kind => {
            let rounds = bracket_rounds(kind, entrants);
            let matches =
                expected_matches_bracket(win_prob, rounds) * kind.volume_multiplier();
            (matches, matches * (base + team))
        }
    };

    let penalty_factor = penalty_factor(player.pick_rate, profile.lambda);
    let adjusted_points = expected_total * penalty_factor;

    let norm_rating = if max_rating > 0.0 {
        player.rating / max_rating
    } else {
        0.0
    };
    let high_seed = player
        .seed
        .is_some_and(|s| s <= profile.high_seed_cutoff);
    let heuristic_score = profile.w_rating * norm_rating
        + profile.w_power * own_power
        + profile.w_winprob * win_prob
        + profile.w_seed * f64::from(high_seed)
        - profile.pick_penalty * player.pick_rate;

    ScoredPlayer {
        player: player.clone(),
        strength,
        win_prob,
        expected_matches,
        base_points_per_match: base,
        team_points_per_match: team,
        expected_total,
        penalty_factor,
        adjusted_points,
        heuristic_score,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
