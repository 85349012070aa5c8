// Strength aggregation: per-player power/points scores and seed-keyed team
// aggregates.

use std::collections::HashMap;

use crate::config::ModelParams;
use crate::ingest::Player;

// ---------------------------------------------------------------------------
// Per-player strength
// ---------------------------------------------------------------------------

/// Derived strength of one player: an absolute points score (weighted blend
/// of the two external ranking-point systems) and a power score normalized
/// against the strongest player in the pool.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StrengthScore {
    pub points: f64,
    pub power: f64,
}

/// Weighted blend of the two external ranking-point inputs.
pub fn absolute_points(player: &Player, model: &ModelParams) -> f64 {
    model.points_weight_a * player.points_a + model.points_weight_b * player.points_b
}

/// Compute strength scores for the whole pool. Power is points divided by
/// the pool maximum, or 0 when nobody has any points.
pub fn compute_strengths(players: &[Player], model: &ModelParams) -> Vec<StrengthScore> {
    let points: Vec<f64> = players
        .iter()
        .map(|p| absolute_points(p, model))
        .collect();
    let max_points = points.iter().copied().fold(0.0_f64, f64::max);

    points
        .into_iter()
        .map(|pts| StrengthScore {
            points: pts,
            power: if max_points > 0.0 { pts / max_points } else { 0.0 },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Seed-keyed team aggregates
// ---------------------------------------------------------------------------

/// Mean strength of all players sharing a seed. Players sharing a seed are
/// assumed to belong to the same competitive group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedAggregate {
    pub mean_power: f64,
    pub mean_points: f64,
}

/// Seed-keyed lookup of group aggregates.
#[derive(Debug, Clone, Default)]
pub struct TeamAggregates {
    by_seed: HashMap<u32, SeedAggregate>,
}

impl TeamAggregates {
    pub fn build(players: &[Player], strengths: &[StrengthScore]) -> Self {
        let mut sums: HashMap<u32, (f64, f64, usize)> = HashMap::new();
        for (player, strength) in players.iter().zip(strengths) {
            if let Some(seed) = player.seed {
                let entry = sums.entry(seed).or_insert((0.0, 0.0, 0));
                entry.0 += strength.power;
                entry.1 += strength.points;
                entry.2 += 1;
            }
        }

        let by_seed = sums
            .into_iter()
            .map(|(seed, (power_sum, points_sum, count))| {
                let n = count as f64;
                (
                    seed,
                    SeedAggregate {
                        mean_power: power_sum / n,
                        mean_points: points_sum / n,
                    },
                )
            })
            .collect();

        Self { by_seed }
    }

    pub fn get(&self, seed: u32) -> Option<SeedAggregate> {
        self.by_seed.get(&seed).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.by_seed.is_empty()
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

    fn player(name: &str, points_a: f64, points_b: f64, seed: Option<u32>) -> Player {
        Player {
            name: name.into(),
            team: "TST".into(),
            cost: 200,
            rating: 110.0,
            team_rank: 1,
            points_a,
            points_b,
            pick_rate: 0.0,
            seed,
            first_opponent_seed: None,
        }
    }

    fn even_weights() -> ModelParams {
        ModelParams {
            elo_scale: 400.0,
            points_weight_a: 0.5,
            points_weight_b: 0.5,
        }
    }

    #[test]
    fn absolute_points_blend() {
        let model = ModelParams {
            elo_scale: 400.0,
            points_weight_a: 0.7,
            points_weight_b: 0.3,
        };
        let p = player("a", 1000.0, 500.0, None);
        assert!(approx_eq(absolute_points(&p, &model), 850.0, 1e-12));
    }

    #[test]
    fn power_normalized_to_pool_max() {
        let players = vec![
            player("top", 800.0, 800.0, None),
            player("mid", 400.0, 400.0, None),
            player("zero", 0.0, 0.0, None),
        ];
        let strengths = compute_strengths(&players, &even_weights());

        assert!(approx_eq(strengths[0].power, 1.0, 1e-12));
        assert!(approx_eq(strengths[1].power, 0.5, 1e-12));
        assert!(approx_eq(strengths[2].power, 0.0, 1e-12));
        assert!(approx_eq(strengths[0].points, 800.0, 1e-12));
    }

    #[test]
    fn all_zero_points_gives_zero_power() {
        let players = vec![player("a", 0.0, 0.0, None), player("b", 0.0, 0.0, None)];
        let strengths = compute_strengths(&players, &even_weights());
        for s in strengths {
            assert!(approx_eq(s.power, 0.0, 1e-12));
        }
    }

    #[test]
    fn seed_aggregates_are_means() {
        let players = vec![
            player("a", 600.0, 600.0, Some(1)),
            player("b", 400.0, 400.0, Some(1)),
            player("c", 200.0, 200.0, Some(2)),
        ];
        let strengths = compute_strengths(&players, &even_weights());
        let teams = TeamAggregates::build(&players, &strengths);

        let seed1 = teams.get(1).unwrap();
        assert!(approx_eq(seed1.mean_points, 500.0, 1e-12));
        // Powers: 1.0 and 400/600 -> mean 5/6.
        assert!(approx_eq(seed1.mean_power, 5.0 / 6.0, 1e-12));

        let seed2 = teams.get(2).unwrap();
        assert!(approx_eq(seed2.mean_points, 200.0, 1e-12));

        assert!(teams.get(3).is_none());
    }

    #[test]
    fn unseeded_players_not_aggregated() {
        let players = vec![player("a", 600.0, 600.0, None)];
        let strengths = compute_strengths(&players, &even_weights());
        let teams = TeamAggregates::build(&players, &strengths);
        assert!(teams.is_empty());
    }
}
