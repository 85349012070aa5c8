// Scoring engine: strength aggregation and expected-points computation.

pub mod expected;
pub mod strength;
