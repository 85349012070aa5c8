// Exclusive-resource assignment: boosters and roles matched to agents by
// expected value, either by exact bijection enumeration or greedily.

use itertools::Itertools;
use thiserror::Error;

use crate::ingest::{BoosterTable, RoleTable};

// ---------------------------------------------------------------------------
// EV formulas
// ---------------------------------------------------------------------------

/// Booster EV: linear reward for mission success, `percent * 5 / 100`.
pub fn booster_ev(percent: f64) -> f64 {
    percent * 5.0 / 100.0
}

/// Role EV over three outcomes: a big win pays +5, a small win +2, and
/// missing both costs -2.
pub fn role_ev(big_pct: f64, small_pct: f64) -> f64 {
    let p_big = big_pct / 100.0;
    let p_small = small_pct / 100.0;
    let p_miss = 1.0 - p_big - p_small;
    5.0 * p_big + 2.0 * p_small - 2.0 * p_miss
}

// ---------------------------------------------------------------------------
// EV table
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum AssignError {
    #[error("EV table shape mismatch: row {row} has {found} cells, expected {expected}")]
    ShapeMismatch {
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// Per-(resource, agent) expected values. Rows are resources, columns are
/// agents.
#[derive(Debug, Clone)]
pub struct EvTable {
    pub agents: Vec<String>,
    pub resources: Vec<String>,
    evs: Vec<Vec<f64>>,
}

impl EvTable {
    pub fn new(
        agents: Vec<String>,
        resources: Vec<String>,
        evs: Vec<Vec<f64>>,
    ) -> Result<Self, AssignError> {
        for (row, cells) in evs.iter().enumerate() {
            if cells.len() != agents.len() {
                return Err(AssignError::ShapeMismatch {
                    row,
                    found: cells.len(),
                    expected: agents.len(),
                });
            }
        }
        Ok(Self {
            agents,
            resources,
            evs,
        })
    }

    pub fn from_boosters(table: &BoosterTable) -> Result<Self, AssignError> {
        let evs = table
            .percents
            .iter()
            .map(|row| row.iter().map(|&pct| booster_ev(pct)).collect())
            .collect();
        Self::new(table.agents.clone(), table.resources.clone(), evs)
    }

    pub fn from_roles(table: &RoleTable) -> Result<Self, AssignError> {
        let evs = table
            .percents
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&(big, small)| role_ev(big, small))
                    .collect()
            })
            .collect();
        Self::new(table.agents.clone(), table.resources.clone(), evs)
    }

    pub fn ev(&self, resource: usize, agent: usize) -> f64 {
        self.evs[resource][agent]
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    pub fn num_resources(&self) -> usize {
        self.resources.len()
    }
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// Which resolution strategy to run. Neither is authoritative; the caller
/// chooses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Exact,
    Greedy,
}

/// A resolved assignment: `(agent, resource)` index pairs, each resource
/// used at most once, plus the summed EV.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub pairs: Vec<(usize, usize)>,
    pub total_ev: f64,
}

/// Exact optimum: enumerate every bijection of agents onto resources and
/// keep the maximum summed EV. Returns `None` when there are fewer
/// resources than agents (no full bijection exists) or no agents at all.
pub fn best_assignment_exact(table: &EvTable) -> Option<Assignment> {
    let num_agents = table.num_agents();
    if num_agents == 0 || table.num_resources() < num_agents {
        return None;
    }

    let mut best: Option<Assignment> = None;
    for perm in (0..table.num_resources()).permutations(num_agents) {
        let total_ev: f64 = perm
            .iter()
            .enumerate()
            .map(|(agent, &resource)| table.ev(resource, agent))
            .sum();
        // Strictly-greater keeps the first-enumerated permutation on ties.
        if best.as_ref().map_or(true, |b| total_ev > b.total_ev) {
            best = Some(Assignment {
                pairs: perm
                    .iter()
                    .enumerate()
                    .map(|(agent, &resource)| (agent, resource))
                    .collect(),
                total_ev,
            });
        }
    }
    best
}

/// Greedy matching: sort all (agent, resource) EVs descending and assign in
/// that order, skipping resources already consumed and agents at their cap.
/// Agents may receive multiple resources up to `caps[agent]`.
pub fn best_assignment_greedy(table: &EvTable, caps: &[usize]) -> Assignment {
    let mut cells: Vec<(usize, usize, f64)> = Vec::new();
    for resource in 0..table.num_resources() {
        for agent in 0..table.num_agents() {
            cells.push((agent, resource, table.ev(resource, agent)));
        }
    }
    // EV descending; index order breaks ties so the result is deterministic.
    cells.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| (a.0, a.1).cmp(&(b.0, b.1)))
    });

    let mut resource_used = vec![false; table.num_resources()];
    let mut agent_counts = vec![0usize; table.num_agents()];
    let mut pairs = Vec::new();
    let mut total_ev = 0.0;

    for (agent, resource, ev) in cells {
        if resource_used[resource] {
            continue;
        }
        let cap = caps.get(agent).copied().unwrap_or(0);
        if agent_counts[agent] >= cap {
            continue;
        }
        resource_used[resource] = true;
        agent_counts[agent] += 1;
        pairs.push((agent, resource));
        total_ev += ev;
    }

    pairs.sort_unstable();
    Assignment { pairs, total_ev }
}

/// Per-agent assignment caps: the ceiling of each agent's expected
/// opportunity count (e.g. expected matches from their own strength
/// ranking).
pub fn caps_from_expected_matches(expected: &[f64]) -> Vec<usize> {
    expected
        .iter()
        .map(|&m| m.max(0.0).ceil() as usize)
        .collect()
}

/// Dispatch on the chosen strategy. Greedy needs `caps`; exact ignores it.
pub fn best_assignment(
    table: &EvTable,
    strategy: Strategy,
    caps: &[usize],
) -> Option<Assignment> {
    match strategy {
        Strategy::Exact => best_assignment_exact(table),
        Strategy::Greedy => Some(best_assignment_greedy(table, caps)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn table(agents: usize, resources: usize, evs: Vec<Vec<f64>>) -> EvTable {
        EvTable::new(
            (0..agents).map(|i| format!("agent{i}")).collect(),
            (0..resources).map(|i| format!("res{i}")).collect(),
            evs,
        )
        .unwrap()
    }

    // -- EV formulas --

    #[test]
    fn booster_ev_linear() {
        assert!(approx_eq(booster_ev(100.0), 5.0, 1e-12));
        assert!(approx_eq(booster_ev(0.0), 0.0, 1e-12));
        assert!(approx_eq(booster_ev(55.0), 2.75, 1e-12));
    }

    #[test]
    fn role_ev_three_outcomes() {
        // Certain big win.
        assert!(approx_eq(role_ev(100.0, 0.0), 5.0, 1e-12));
        // Certain small win.
        assert!(approx_eq(role_ev(0.0, 100.0), 2.0, 1e-12));
        // Certain miss.
        assert!(approx_eq(role_ev(0.0, 0.0), -2.0, 1e-12));
        // Mixed: 40/25 -> 0.4*5 + 0.25*2 - 0.35*2 = 1.8
        assert!(approx_eq(role_ev(40.0, 25.0), 1.8, 1e-12));
    }

    // -- EvTable --

    #[test]
    fn ev_table_shape_checked() {
        let err = EvTable::new(
            vec!["a".into(), "b".into()],
            vec!["r".into()],
            vec![vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AssignError::ShapeMismatch {
                row: 0,
                found: 1,
                expected: 2
            }
        ));
    }

    #[test]
    fn ev_table_from_boosters() {
        let boosters = crate::ingest::BoosterTable {
            agents: vec!["p1".into(), "p2".into()],
            resources: vec!["B1".into()],
            percents: vec![vec![60.0, 20.0]],
        };
        let table = EvTable::from_boosters(&boosters).unwrap();
        assert!(approx_eq(table.ev(0, 0), 3.0, 1e-12));
        assert!(approx_eq(table.ev(0, 1), 1.0, 1e-12));
    }

    // -- Exact strategy --

    #[test]
    fn exact_two_by_two_matches_manual_enumeration() {
        // Pairings: (a0->r0, a1->r1) = 3 + 1 = 4; (a0->r1, a1->r0) = 2 + 5 = 7.
        let t = table(2, 2, vec![vec![3.0, 5.0], vec![2.0, 1.0]]);
        let best = best_assignment_exact(&t).unwrap();
        assert!(approx_eq(best.total_ev, 7.0, 1e-12));
        assert_eq!(best.pairs, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn exact_uses_best_subset_of_resources() {
        // 3 resources, 2 agents: the optimum may leave a resource unused.
        let t = table(
            2,
            3,
            vec![vec![1.0, 1.0], vec![10.0, 0.0], vec![0.0, 10.0]],
        );
        let best = best_assignment_exact(&t).unwrap();
        assert!(approx_eq(best.total_ev, 20.0, 1e-12));
        assert_eq!(best.pairs, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn exact_fewer_resources_than_agents_is_none() {
        let t = table(3, 2, vec![vec![1.0; 3], vec![1.0; 3]]);
        assert!(best_assignment_exact(&t).is_none());
    }

    #[test]
    fn exact_deterministic_on_ties() {
        let t = table(2, 2, vec![vec![1.0, 1.0], vec![1.0, 1.0]]);
        let best = best_assignment_exact(&t).unwrap();
        // First-enumerated permutation wins the tie.
        assert_eq!(best.pairs, vec![(0, 0), (1, 1)]);
    }

    // -- Greedy strategy --

    #[test]
    fn greedy_descending_ev_assignment() {
        let t = table(2, 3, vec![vec![5.0, 4.0], vec![3.0, 6.0], vec![2.0, 1.0]]);
        // Caps of 1 each: agent1 takes res1 (6), agent0 takes res0 (5).
        let result = best_assignment_greedy(&t, &[1, 1]);
        assert_eq!(result.pairs, vec![(0, 0), (1, 1)]);
        assert!(approx_eq(result.total_ev, 11.0, 1e-12));
    }

    #[test]
    fn greedy_respects_caps() {
        // One agent, cap 2, three resources: takes the two best.
        let t = table(1, 3, vec![vec![3.0], vec![5.0], vec![1.0]]);
        let result = best_assignment_greedy(&t, &[2]);
        assert_eq!(result.pairs, vec![(0, 0), (0, 1)]);
        assert!(approx_eq(result.total_ev, 8.0, 1e-12));
    }

    #[test]
    fn greedy_skips_consumed_resources() {
        // Both agents prefer res0; only one can have it.
        let t = table(2, 2, vec![vec![9.0, 8.0], vec![1.0, 2.0]]);
        let result = best_assignment_greedy(&t, &[1, 1]);
        assert_eq!(result.pairs, vec![(0, 0), (1, 1)]);
        assert!(approx_eq(result.total_ev, 11.0, 1e-12));
    }

    #[test]
    fn greedy_zero_cap_gets_nothing() {
        let t = table(2, 2, vec![vec![9.0, 8.0], vec![1.0, 2.0]]);
        let result = best_assignment_greedy(&t, &[0, 1]);
        assert_eq!(result.pairs, vec![(1, 0)]);
        assert!(approx_eq(result.total_ev, 8.0, 1e-12));
    }

    #[test]
    fn greedy_can_be_suboptimal() {
        // Classic greedy trap: taking the single largest cell first loses.
        // Exact: a0->r1 (4) + a1->r0 (4) = 8; greedy takes a0->r0 (5) then
        // a1->r1 (1) = 6.
        let t = table(2, 2, vec![vec![5.0, 4.0], vec![4.0, 1.0]]);
        let greedy = best_assignment_greedy(&t, &[1, 1]);
        let exact = best_assignment_exact(&t).unwrap();
        assert!(approx_eq(greedy.total_ev, 6.0, 1e-12));
        assert!(approx_eq(exact.total_ev, 8.0, 1e-12));
        assert!(exact.total_ev > greedy.total_ev);
    }

    // -- Caps helper --

    #[test]
    fn caps_are_ceilings() {
        assert_eq!(caps_from_expected_matches(&[1.0, 2.3, 3.875]), vec![1, 3, 4]);
        assert_eq!(caps_from_expected_matches(&[-1.0, 0.0]), vec![0, 0]);
    }

    // -- Dispatch --

    #[test]
    fn dispatch_selects_strategy() {
        let t = table(2, 2, vec![vec![5.0, 4.0], vec![4.0, 1.0]]);
        let exact = best_assignment(&t, Strategy::Exact, &[]).unwrap();
        let greedy = best_assignment(&t, Strategy::Greedy, &[1, 1]).unwrap();
        assert!(approx_eq(exact.total_ev, 8.0, 1e-12));
        assert!(approx_eq(greedy.total_ev, 6.0, 1e-12));
    }
}
