// Constrained roster optimization: exhaustive enumeration of fixed-size
// subsets under budget and per-team cardinality constraints.

use std::cmp::Ordering;
use std::collections::HashMap;

use itertools::Itertools;
use tracing::debug;

use crate::config::RosterRules;
use crate::scoring::expected::ScoredPlayer;

/// Primary scores within this distance count as tied and fall through to
/// the heuristic tie-break.
const TIE_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// One feasible candidate roster. `players` holds indices into the scored
/// slice the optimizer ran over.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    pub players: Vec<usize>,
    pub total_cost: u32,
    pub total_adjusted: f64,
    pub total_heuristic: f64,
}

/// Ranking order: primary key is the summed adjusted points; the summed
/// heuristic score only decides ties within `TIE_EPSILON`.
fn ranking(a: &Roster, b: &Roster) -> Ordering {
    if (a.total_adjusted - b.total_adjusted).abs() <= TIE_EPSILON {
        a.total_heuristic
            .partial_cmp(&b.total_heuristic)
            .unwrap_or(Ordering::Equal)
    } else {
        a.total_adjusted
            .partial_cmp(&b.total_adjusted)
            .unwrap_or(Ordering::Equal)
    }
}

// ---------------------------------------------------------------------------
// Constraint checks
// ---------------------------------------------------------------------------

/// Evaluate one subset against the hard constraints. Both checks
/// short-circuit as soon as violated. Returns `None` for infeasible subsets.
fn evaluate(indices: &[usize], scored: &[ScoredPlayer], rules: &RosterRules) -> Option<Roster> {
    let mut total_cost: u32 = 0;
    for &i in indices {
        total_cost = total_cost.saturating_add(scored[i].player.cost);
        if total_cost > rules.budget {
            return None;
        }
    }

    let mut team_counts: HashMap<&str, usize> = HashMap::new();
    for &i in indices {
        let count = team_counts
            .entry(scored[i].player.team.as_str())
            .or_insert(0);
        *count += 1;
        if *count > rules.max_per_team {
            return None;
        }
    }

    let mut total_adjusted = 0.0;
    let mut total_heuristic = 0.0;
    for &i in indices {
        total_adjusted += scored[i].adjusted_points;
        total_heuristic += scored[i].heuristic_score;
    }

    Some(Roster {
        players: indices.to_vec(),
        total_cost,
        total_adjusted,
        total_heuristic,
    })
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Find the feasible roster maximizing summed adjusted points (heuristic
/// tie-break). `None` means no subset survived the constraints -- a normal
/// empty result, not an error.
pub fn best_roster(scored: &[ScoredPlayer], rules: &RosterRules) -> Option<Roster> {
    let mut best: Option<Roster> = None;
    let mut feasible = 0usize;

    for combo in (0..scored.len()).combinations(rules.roster_size) {
        let Some(candidate) = evaluate(&combo, scored, rules) else {
            continue;
        };
        feasible += 1;
        // Strictly-greater keeps the first-enumerated roster on exact ties,
        // so results are deterministic.
        match &best {
            Some(current) if ranking(&candidate, current) != Ordering::Greater => {}
            _ => best = Some(candidate),
        }
    }

    debug!("roster search: {feasible} feasible candidates");
    best
}

/// Ranked list of the best `limit` feasible rosters under the same ordering
/// as `best_roster`. Memory stays bounded by `limit`; candidates are never
/// materialized wholesale.
pub fn top_rosters(scored: &[ScoredPlayer], rules: &RosterRules, limit: usize) -> Vec<Roster> {
    let mut ranked: Vec<Roster> = Vec::with_capacity(limit + 1);
    if limit == 0 {
        return ranked;
    }

    for combo in (0..scored.len()).combinations(rules.roster_size) {
        let Some(candidate) = evaluate(&combo, scored, rules) else {
            continue;
        };
        if ranked.len() == limit {
            match ranked.last() {
                Some(last) if ranking(&candidate, last) != Ordering::Greater => continue,
                _ => {}
            }
        }
        let pos = ranked
            .iter()
            .position(|r| ranking(&candidate, r) == Ordering::Greater)
            .unwrap_or(ranked.len());
        ranked.insert(pos, candidate);
        ranked.truncate(limit);
    }

    ranked
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
