// Free-text tournament-format classification.

use crate::tournament::matches;

/// The closed set of supported tournament formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    Single,
    Double,
    Swiss,
    GroupPlayoff,
}

impl FormatKind {
    /// Extra expected match volume from bracket structure (lower-bracket
    /// rematches, group deciders). Applied on top of the geometric
    /// round-survival estimate for bracket formats. The swiss entry is
    /// defined but never applied: the swiss path uses the exact outcome
    /// model, which supersedes this heuristic scaling.
    pub fn volume_multiplier(self) -> f64 {
        match self {
            FormatKind::Single => 1.0,
            FormatKind::Double => 1.25,
            FormatKind::Swiss => 1.15,
            FormatKind::GroupPlayoff => 1.2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormatKind::Single => "single elimination",
            FormatKind::Double => "double elimination",
            FormatKind::Swiss => "swiss",
            FormatKind::GroupPlayoff => "group + playoff",
        }
    }
}

/// A classified tournament format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub kind: FormatKind,
    pub best_of_five: bool,
}

impl FormatDescriptor {
    /// Derived expected round count: closed form for bracket formats, the
    /// fixed round cap for swiss.
    pub fn expected_rounds(&self, entrants: usize) -> u32 {
        match self.kind {
            FormatKind::Swiss => matches::SWISS_ROUND_CAP,
            kind => matches::bracket_rounds(kind, entrants),
        }
    }
}

/// Classify a free-text format description.
///
/// Substring match with fixed precedence: "swiss" beats "double" beats
/// "group"/"winners advance"; anything else defaults to single elimination.
/// There is no error case -- the permissive default is deliberate.
pub fn classify(text: &str) -> FormatDescriptor {
    let lower = text.to_lowercase();
    let kind = if lower.contains("swiss") {
        FormatKind::Swiss
    } else if lower.contains("double") {
        FormatKind::Double
    } else if lower.contains("group") || lower.contains("winners advance") {
        FormatKind::GroupPlayoff
    } else {
        FormatKind::Single
    };
    FormatDescriptor {
        kind,
        best_of_five: lower.contains("bo5"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
