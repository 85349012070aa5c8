// Console report rendering: scored-player diagnostics, ranked rosters, and
// assignment results. Pure string builders so callers decide where output
// goes.

use crate::optimizer::assign::{Assignment, EvTable};
use crate::optimizer::roster::Roster;
use crate::scoring::expected::ScoredPlayer;

/// Flat diagnostic table of every scored player, sorted descending by
/// adjusted expected points.
pub fn scored_table(scored: &[ScoredPlayer]) -> String {
    let mut order: Vec<usize> = (0..scored.len()).collect();
    order.sort_by(|&a, &b| {
        scored[b]
            .adjusted_points
            .partial_cmp(&scored[a].adjusted_points)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut out = String::new();
    out.push_str(&format!(
        "{:<18} {:<14} {:>5} {:>7} {:>6} {:>7} {:>9} {:>9} {:>7}\n",
        "player", "team", "cost", "rating", "p_win", "matches", "expected", "adjusted", "heur"
    ));
    for &i in &order {
        let s = &scored[i];
        out.push_str(&format!(
            "{:<18} {:<14} {:>5} {:>7.1} {:>6.3} {:>7.2} {:>9.2} {:>9.2} {:>7.3}\n",
            s.player.name,
            s.player.team,
            s.player.cost,
            s.player.rating,
            s.win_prob,
            s.expected_matches,
            s.expected_total,
            s.adjusted_points,
            s.heuristic_score,
        ));
    }
    out
}

/// Ranked roster candidates. `scored` must be the slice the optimizer ran
/// over.
pub fn roster_table(rosters: &[Roster], scored: &[ScoredPlayer]) -> String {
    let mut out = String::new();
    for (rank, roster) in rosters.iter().enumerate() {
        let names: Vec<&str> = roster
            .players
            .iter()
            .map(|&i| scored[i].player.name.as_str())
            .collect();
        out.push_str(&format!(
            "#{:<3} {:>9.2} pts  (cost {:>5}, heur {:>7.3})  {}\n",
            rank + 1,
            roster.total_adjusted,
            roster.total_cost,
            roster.total_heuristic,
            names.join(", "),
        ));
    }
    out
}

/// One resolved assignment, named per agent and resource.
pub fn assignment_table(assignment: &Assignment, table: &EvTable) -> String {
    let mut out = String::new();
    for &(agent, resource) in &assignment.pairs {
        out.push_str(&format!(
            "{:<18} -> {:<18} (EV {:>6.2})\n",
            table.agents[agent],
            table.resources[resource],
            table.ev(resource, agent),
        ));
    }
    out.push_str(&format!("total EV: {:.2}\n", assignment.total_ev));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelParams, Profile};
    use crate::ingest::Player;
    use crate::optimizer::roster::best_roster;
    use crate::scoring::expected::score_players;
    use crate::tournament::format::{FormatDescriptor, FormatKind};

    fn sample_scored() -> Vec<ScoredPlayer> {
        let players = vec![
            Player {
                name: "alpha".into(),
                team: "T1".into(),
                cost: 300,
                rating: 125.0,
                team_rank: 1,
                points_a: 800.0,
                points_b: 700.0,
                pick_rate: 0.5,
                seed: Some(1),
                first_opponent_seed: None,
            },
            Player {
                name: "beta".into(),
                team: "T2".into(),
                cost: 200,
                rating: 108.0,
                team_rank: 4,
                points_a: 400.0,
                points_b: 350.0,
                pick_rate: 0.1,
                seed: Some(4),
                first_opponent_seed: None,
            },
        ];
        let format = FormatDescriptor {
            kind: FormatKind::Single,
            best_of_five: false,
        };
        score_players(
            &players,
            format,
            8,
            &ModelParams::default(),
            &Profile::default(),
        )
    }

    #[test]
    fn scored_table_sorted_by_adjusted() {
        let scored = sample_scored();
        let table = scored_table(&scored);
        let alpha_pos = table.find("alpha").unwrap();
        let beta_pos = table.find("beta").unwrap();
        let (first, second) = if scored[0].adjusted_points >= scored[1].adjusted_points {
            (alpha_pos, beta_pos)
        } else {
            (beta_pos, alpha_pos)
        };
        assert!(first < second, "higher adjusted points should print first");
        assert!(table.starts_with("player"));
    }

    #[test]
    fn roster_table_lists_names() {
        let scored = sample_scored();
        let rules = crate::config::RosterRules {
            budget: 1000,
            roster_size: 2,
            max_per_team: 2,
            top_candidates: 5,
        };
        let best = best_roster(&scored, &rules).unwrap();
        let out = roster_table(std::slice::from_ref(&best), &scored);
        assert!(out.contains("#1"));
        assert!(out.contains("alpha"));
        assert!(out.contains("beta"));
    }

    #[test]
    fn assignment_table_names_pairs() {
        let table = EvTable::new(
            vec!["p1".into(), "p2".into()],
            vec!["Entry".into(), "Anchor".into()],
            vec![vec![3.0, 1.0], vec![0.5, 2.5]],
        )
        .unwrap();
        let assignment = Assignment {
            pairs: vec![(0, 0), (1, 1)],
            total_ev: 5.5,
        };
        let out = assignment_table(&assignment, &table);
        assert!(out.contains("p1"));
        assert!(out.contains("Anchor"));
        assert!(out.contains("total EV: 5.50"));
    }
}
