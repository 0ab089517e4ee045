//! Zones (groups) and their memberships.

use crate::models::round::PhaseType;
use crate::models::team::TeamId;
use crate::models::tournament::{CategoryId, TournamentId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a zone.
pub type ZoneId = Uuid;

/// A round-robin group of the group stage.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub tournament_id: TournamentId,
    pub category_id: CategoryId,
    /// "Group A", "Group B", ...
    pub name: String,
    pub phase: PhaseType,
}

impl Zone {
    /// Zone named after its 0-based index: 0 is "Group A".
    pub fn new(tournament_id: TournamentId, category_id: CategoryId, index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            category_id,
            name: format!("Group {}", group_letter(index)),
            phase: PhaseType::GroupStage,
        }
    }
}

fn group_letter(index: usize) -> String {
    // A..Z, then AA, AB, ... for very large categories.
    let mut n = index;
    let mut letters = Vec::new();
    loop {
        letters.push(char::from(b'A' + (n % 26) as u8));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Membership of a team in a zone.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ZoneTeam {
    pub zone_id: ZoneId,
    pub team_id: TeamId,
    /// Standings position, None until standings are calculated.
    pub position: Option<u32>,
}

impl ZoneTeam {
    pub fn new(zone_id: ZoneId, team_id: TeamId) -> Self {
        Self {
            zone_id,
            team_id,
            position: None,
        }
    }
}
