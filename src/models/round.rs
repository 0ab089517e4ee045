//! Round identifiers and phase labels.

use serde::{Deserialize, Serialize};

/// Which part of a bracket a round belongs to.
///
/// Variant order is also topological order: a match only ever references
/// feeders from an earlier round under the derived `Ord`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(tag = "kind", content = "number", rename_all = "snake_case")]
pub enum Round {
    /// Round robin, group stage, and Americano rounds (1-based).
    Group(u32),
    /// Elimination rounds played after the group stage (1-based).
    Playoff(u32),
    /// Single elimination and the double-elimination upper bracket (1-based).
    Upper(u32),
    /// Double-elimination lower bracket (1-based).
    Lower(u32),
    GrandFinal,
}

impl Round {
    /// Flat numeric code used for display and grouping.
    ///
    /// Group and upper rounds keep their number, playoff rounds start at 10,
    /// lower-bracket rounds at 101 and the grand final is 200.
    pub fn code(&self) -> u32 {
        match *self {
            Round::Group(n) | Round::Upper(n) => n,
            Round::Playoff(n) => 9 + n,
            Round::Lower(n) => 100 + n,
            Round::GrandFinal => 200,
        }
    }

    pub fn is_lower(&self) -> bool {
        matches!(self, Round::Lower(_))
    }
}

/// Competitive stage label of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseType {
    GroupStage,
    RoundOf32,
    RoundOf16,
    Quarterfinals,
    Semifinals,
    Final,
    LowerBracket,
    GrandFinal,
}

impl PhaseType {
    /// Label for an elimination round that is `distance` rounds away from the final.
    pub fn for_distance_to_final(distance: u32) -> Self {
        match distance {
            0 => PhaseType::Final,
            1 => PhaseType::Semifinals,
            2 => PhaseType::Quarterfinals,
            3 => PhaseType::RoundOf16,
            4 => PhaseType::RoundOf32,
            _ => PhaseType::GroupStage,
        }
    }
}
