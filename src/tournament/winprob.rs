// Elo-style single-match win probability.

/// Logistic transform of an aggregate-points differential:
/// `1 / (1 + 10^(-(own - opp) / scale))`.
///
/// Larger `scale` flattens the curve so rating gaps matter less.
pub fn elo_win_prob(own_points: f64, opp_points: f64, scale: f64) -> f64 {
    let diff = own_points - opp_points;
    1.0 / (1.0 + 10f64.powf(-diff / scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn even_matchup_is_coin_flip() {
        assert!(approx_eq(elo_win_prob(1500.0, 1500.0, 400.0), 0.5, 1e-12));
    }

    #[test]
    fn symmetry() {
        let pairs = [
            (1500.0, 1400.0),
            (800.0, 1200.0),
            (0.0, 650.0),
            (123.4, 567.8),
        ];
        for (a, b) in pairs {
            let sum = elo_win_prob(a, b, 400.0) + elo_win_prob(b, a, 400.0);
            assert!(approx_eq(sum, 1.0, 1e-12), "f({a},{b}) + f({b},{a}) != 1");
        }
    }

    #[test]
    fn known_elo_reference() {
        // A 400-point gap at scale 400 gives 10/11.
        let p = elo_win_prob(1800.0, 1400.0, 400.0);
        assert!(approx_eq(p, 10.0 / 11.0, 1e-12));
    }

    #[test]
    fn larger_scale_flattens_the_curve() {
        let sharp = elo_win_prob(1600.0, 1400.0, 100.0);
        let flat = elo_win_prob(1600.0, 1400.0, 1000.0);
        assert!(sharp > flat);
        assert!(flat > 0.5);
    }

    #[test]
    fn result_is_a_probability() {
        for diff in [-5000.0, -100.0, 0.0, 100.0, 5000.0] {
            let p = elo_win_prob(diff, 0.0, 400.0);
            assert!((0.0..=1.0).contains(&p));
        }
    }
}
