//! Tournament, Category, and their status/format enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Unique identifier for a category within a tournament.
pub type CategoryId = Uuid;

/// Lifecycle of a tournament.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStatus {
    /// Being set up; nothing published.
    #[default]
    Draft,
    RegistrationOpen,
    RegistrationClosed,
    /// Matches are being played; brackets are frozen.
    InProgress,
    Finished,
    Cancelled,
}

impl TournamentStatus {
    /// Whether brackets may be (re)generated in this status.
    pub fn allows_generation(self) -> bool {
        matches!(
            self,
            TournamentStatus::Draft
                | TournamentStatus::RegistrationOpen
                | TournamentStatus::RegistrationClosed
        )
    }
}

/// Shape of the bracket generated for a category.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BracketFormat {
    #[default]
    SingleElimination,
    DoubleElimination,
    RoundRobin,
    GroupStageElimination,
    Americano,
}

impl BracketFormat {
    /// Fewest eligible teams the format can be generated for.
    pub fn min_teams(self) -> usize {
        match self {
            BracketFormat::GroupStageElimination => 8,
            BracketFormat::Americano => 4,
            _ => 2,
        }
    }
}

impl std::fmt::Display for BracketFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BracketFormat::SingleElimination => "single elimination",
            BracketFormat::DoubleElimination => "double elimination",
            BracketFormat::RoundRobin => "round robin",
            BracketFormat::GroupStageElimination => "group stage + elimination",
            BracketFormat::Americano => "americano",
        };
        f.write_str(name)
    }
}

/// A tournament holding one or more categories.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub status: TournamentStatus,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a new tournament in Draft status.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            status: TournamentStatus::Draft,
            created_at: Utc::now(),
        }
    }
}

/// A division of a tournament (e.g. "Men A") with its own bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub tournament_id: TournamentId,
    pub name: String,
    pub format: BracketFormat,
}

impl Category {
    pub fn new(
        tournament_id: TournamentId,
        name: impl Into<String>,
        format: BracketFormat,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.into(),
            format,
        }
    }
}
