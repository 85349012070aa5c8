// Tournament-format modeling: classification, match-count expectation,
// win probability.

pub mod format;
pub mod matches;
pub mod winprob;
