//! Errors raised by bracket operations.

use crate::models::game::{MatchId, MatchStatus};
use crate::models::tournament::{BracketFormat, CategoryId, TournamentId, TournamentStatus};
use crate::models::zone::ZoneId;
use crate::store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a [`BracketError`], used to pick an HTTP status.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Invariant,
    State,
    Storage,
}

/// Errors that can occur during bracket operations.
#[derive(Debug, Error)]
pub enum BracketError {
    #[error("{format} needs at least {required} eligible teams, found {found}")]
    NotEnoughTeams {
        format: BracketFormat,
        required: usize,
        found: usize,
    },

    #[error("Brackets cannot be generated while the tournament is {0:?}")]
    GenerationLocked(TournamentStatus),

    #[error("Invalid result: {0}")]
    InvalidResult(String),

    #[error("Match cannot go from {from:?} to {to:?}")]
    InvalidTransition { from: MatchStatus, to: MatchStatus },

    #[error("Invalid team: {0}")]
    InvalidTeam(String),

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Group configuration needs at least 8 teams, got {0}")]
    TooFewTeamsForGroups(usize),

    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("Zone not found: {0}")]
    ZoneNotFound(ZoneId),

    /// Either every eligible team carries a seed or none does.
    #[error("Teams are partially seeded: {seeded} seeded, {unseeded} without seed")]
    PartialSeeding { seeded: usize, unseeded: usize },

    /// A planned match references a feeder that was not created before it.
    #[error("Bracket plan references unknown match {0}")]
    UnresolvedEdge(String),

    #[error("Standings not calculated for {0}")]
    StandingsPending(String),

    #[error("Classification needs a group stage category, this one is {0}")]
    NotAGroupStage(BracketFormat),

    #[error("Elimination phase already started")]
    EliminationStarted,

    #[error("Not enough qualifiers: expected {expected}, found {found}")]
    MissingQualifiers { expected: usize, found: usize },

    #[error("Playoff skeleton has {found} first-round matches, expected {expected}")]
    SkeletonMismatch { expected: usize, found: usize },

    /// Reversal would strand a team in a match that has started or finished.
    #[error("Downstream match {0} has already started or finished")]
    DownstreamPlayed(MatchId),

    #[error("Match {0} is a bye and takes no result")]
    ByeMatch(MatchId),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl BracketError {
    pub fn kind(&self) -> ErrorKind {
        use BracketError::*;
        match self {
            NotEnoughTeams { .. }
            | GenerationLocked(_)
            | InvalidResult(_)
            | InvalidTransition { .. }
            | InvalidTeam(_)
            | Csv(_)
            | TooFewTeamsForGroups(_) => ErrorKind::Validation,
            TournamentNotFound(_) | CategoryNotFound(_) | MatchNotFound(_) | ZoneNotFound(_) => {
                ErrorKind::NotFound
            }
            PartialSeeding { .. } | UnresolvedEdge(_) => ErrorKind::Invariant,
            StandingsPending(_)
            | NotAGroupStage(_)
            | EliminationStarted
            | MissingQualifiers { .. }
            | SkeletonMismatch { .. }
            | DownstreamPlayed(_)
            | ByeMatch(_) => ErrorKind::State,
            Store(_) => ErrorKind::Storage,
        }
    }
}

/// Result type for bracket operations.
pub type BracketResult<T> = Result<T, BracketError>;
