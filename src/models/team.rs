//! Team and player registration data structures.

use crate::models::tournament::{CategoryId, TournamentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in match slots and standings).
pub type TeamId = Uuid;

/// Registration status of one player of a team.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

/// A player's registration in a team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub player_name: String,
    pub status: RegistrationStatus,
}

impl Registration {
    pub fn new(player_name: impl Into<String>, status: RegistrationStatus) -> Self {
        Self {
            player_name: player_name.into(),
            status,
        }
    }

    /// Registration with status CONFIRMED.
    pub fn confirmed(player_name: impl Into<String>) -> Self {
        Self::new(player_name, RegistrationStatus::Confirmed)
    }
}

/// A pair of players entered in one category.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub tournament_id: TournamentId,
    pub category_id: CategoryId,
    /// Rank for bracket placement (1 is the strongest). Either every team of a
    /// category carries one or none does.
    pub seed: Option<u32>,
    pub player_1: Registration,
    pub player_2: Registration,
    pub registered_at: DateTime<Utc>,
}

impl Team {
    /// Create an unseeded team registered now.
    pub fn new(
        tournament_id: TournamentId,
        category_id: CategoryId,
        player_1: Registration,
        player_2: Registration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            category_id,
            seed: None,
            player_1,
            player_2,
            registered_at: Utc::now(),
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Both players have confirmed their registration.
    pub fn is_eligible(&self) -> bool {
        self.player_1.status == RegistrationStatus::Confirmed
            && self.player_2.status == RegistrationStatus::Confirmed
    }

    /// Display name, e.g. "Ana / Bea".
    pub fn name(&self) -> String {
        format!("{} / {}", self.player_1.player_name, self.player_2.player_name)
    }
}
