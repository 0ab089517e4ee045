//! Match, its two slots, status machine, and set scores.

use crate::models::round::{PhaseType, Round};
use crate::models::team::TeamId;
use crate::models::tournament::{CategoryId, TournamentId};
use crate::models::zone::ZoneId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// One of the two team slots of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::One, Side::Two];
}

/// Lifecycle of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Walkover,
    Cancelled,
}

impl MatchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MatchStatus::Completed | MatchStatus::Walkover | MatchStatus::Cancelled
        )
    }

    /// Whether the match counts as decided for standings and progression.
    pub fn is_decided(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Walkover)
    }

    pub fn can_transition_to(self, next: MatchStatus) -> bool {
        use MatchStatus::*;
        match (self, next) {
            (Scheduled, InProgress) => true,
            (Scheduled | InProgress, Completed | Walkover | Cancelled) => true,
            _ => false,
        }
    }
}

/// Games won by each side in one set.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SetScore {
    pub team_1_games: u32,
    pub team_2_games: u32,
}

impl SetScore {
    pub fn new(team_1_games: u32, team_2_games: u32) -> Self {
        Self {
            team_1_games,
            team_2_games,
        }
    }

    /// Side that won the set, None for a level set.
    pub fn winner(&self) -> Option<Side> {
        match self.team_1_games.cmp(&self.team_2_games) {
            std::cmp::Ordering::Greater => Some(Side::One),
            std::cmp::Ordering::Less => Some(Side::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// A team position in a match.
///
/// At creation a slot is seeded (team, no edge), fed by an earlier match
/// (edge, no team), open (neither) or a bye (never receives a team).
/// Progression fills the team of a fed slot; loser routing and
/// classification fill open slots.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub team_id: Option<TeamId>,
    /// Match whose winner advances into this slot.
    pub from_match: Option<MatchId>,
    /// No team will ever arrive here; the opponent advances unplayed.
    #[serde(default)]
    pub bye: bool,
}

impl Slot {
    pub fn seeded(team_id: TeamId) -> Self {
        Self {
            team_id: Some(team_id),
            ..Self::default()
        }
    }

    pub fn fed_by(match_id: MatchId) -> Self {
        Self {
            from_match: Some(match_id),
            ..Self::default()
        }
    }

    pub fn open() -> Self {
        Self::default()
    }

    pub fn bye() -> Self {
        Self {
            bye: true,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.team_id.is_none()
    }

    /// Empty slot without an edge, waiting for a routed loser or a qualifier.
    pub fn is_open_and_empty(&self) -> bool {
        self.team_id.is_none() && self.from_match.is_none() && !self.bye
    }
}

/// A single match between two teams.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub category_id: CategoryId,
    pub round: Round,
    /// 1-based position within the round.
    pub match_number: u32,
    pub phase: PhaseType,
    pub team_1: Slot,
    pub team_2: Slot,
    pub status: MatchStatus,
    pub winner: Option<TeamId>,
    /// Set for group-stage matches.
    pub zone_id: Option<ZoneId>,
    pub sets: Vec<SetScore>,
    /// Optimistic lock counter, bumped by every store write.
    pub version: u64,
}

impl Match {
    pub fn slot(&self, side: Side) -> &Slot {
        match side {
            Side::One => &self.team_1,
            Side::Two => &self.team_2,
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut Slot {
        match side {
            Side::One => &mut self.team_1,
            Side::Two => &mut self.team_2,
        }
    }

    /// Side currently holding `team_id`.
    pub fn side_of(&self, team_id: TeamId) -> Option<Side> {
        Side::BOTH
            .into_iter()
            .find(|&side| self.slot(side).team_id == Some(team_id))
    }

    pub fn team(&self, side: Side) -> Option<TeamId> {
        self.slot(side).team_id
    }

    /// The opponent of `team_id`, if both slots are filled.
    pub fn opponent_of(&self, team_id: TeamId) -> Option<TeamId> {
        match self.side_of(team_id)? {
            Side::One => self.team_2.team_id,
            Side::Two => self.team_1.team_id,
        }
    }

    pub fn has_both_teams(&self) -> bool {
        self.team_1.team_id.is_some() && self.team_2.team_id.is_some()
    }

    /// A walkover decided by a bye slot rather than by a result.
    pub fn is_bye(&self) -> bool {
        self.status == MatchStatus::Walkover && !self.has_both_teams()
    }

    /// The single team of a match whose other slot is a bye.
    pub fn lone_team(&self) -> Option<TeamId> {
        match (self.team_1, self.team_2) {
            (Slot { team_id: Some(t), .. }, Slot { bye: true, .. })
            | (Slot { bye: true, .. }, Slot { team_id: Some(t), .. }) => Some(t),
            _ => None,
        }
    }

    /// Sets won by each side.
    pub fn sets_won(&self) -> (u32, u32) {
        self.sets.iter().fold((0, 0), |(one, two), set| match set.winner() {
            Some(Side::One) => (one + 1, two),
            Some(Side::Two) => (one, two + 1),
            None => (one, two),
        })
    }

    /// Games won by each side, summed over all sets.
    pub fn games_won(&self) -> (u32, u32) {
        self.sets.iter().fold((0, 0), |(one, two), set| {
            (one + set.team_1_games, two + set.team_2_games)
        })
    }
}
