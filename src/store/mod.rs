//! Persistence boundary of the bracket engine.
//!
//! Every method is one atomic operation. The conditional slot writes
//! (`fill_slot_if_empty`, `clear_slot_if_holds`) and the versioned
//! `save_match` are what keep concurrent progression from two sibling
//! matches from corrupting a shared downstream slot.

mod memory;

pub use memory::MemoryStore;

use crate::models::{
    Category, CategoryId, Match, MatchId, Side, Team, TeamId, Tournament, TournamentId,
    TournamentStatus, Zone, ZoneId, ZoneTeam,
};
use thiserror::Error;
use uuid::Uuid;

/// Storage failures.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum StoreError {
    /// Optimistic lock failure: the match changed since it was read.
    #[error(
        "Match {match_id} was modified concurrently (expected version {expected}, found {found})"
    )]
    Conflict {
        match_id: MatchId,
        expected: u64,
        found: u64,
    },

    #[error("{entity} {id} does not exist")]
    MissingRow { entity: &'static str, id: Uuid },

    #[error("Slot {side:?} of match {match_id} is fed by another match")]
    NotOpen { match_id: MatchId, side: Side },

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Everything generated for one (tournament, category) pair.
#[derive(Clone, Debug, Default)]
pub struct BracketSkeleton {
    pub matches: Vec<Match>,
    pub zones: Vec<Zone>,
    pub zone_teams: Vec<ZoneTeam>,
}

/// One team placed into an open slot by classification.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SlotAssignment {
    pub match_id: MatchId,
    pub side: Side,
    pub team_id: TeamId,
}

/// Storage collaborator consumed by the engine.
pub trait BracketStore: Send + Sync {
    fn insert_tournament(&self, tournament: Tournament) -> StoreResult<()>;

    fn tournament(&self, id: TournamentId) -> StoreResult<Option<Tournament>>;

    fn set_tournament_status(&self, id: TournamentId, status: TournamentStatus) -> StoreResult<()>;

    fn insert_category(&self, category: Category) -> StoreResult<()>;

    fn category(
        &self,
        tournament_id: TournamentId,
        category_id: CategoryId,
    ) -> StoreResult<Option<Category>>;

    fn insert_team(&self, team: Team) -> StoreResult<()>;

    /// Teams of a category in registration order.
    fn teams(&self, tournament_id: TournamentId, category_id: CategoryId) -> StoreResult<Vec<Team>>;

    /// Matches of a category ordered by (round, match number).
    fn matches(&self, tournament_id: TournamentId, category_id: CategoryId)
        -> StoreResult<Vec<Match>>;

    fn find_match(&self, id: MatchId) -> StoreResult<Option<Match>>;

    /// Zones of a category in creation order.
    fn zones(&self, tournament_id: TournamentId, category_id: CategoryId) -> StoreResult<Vec<Zone>>;

    fn find_zone(&self, id: ZoneId) -> StoreResult<Option<Zone>>;

    fn zone_teams(&self, zone_id: ZoneId) -> StoreResult<Vec<ZoneTeam>>;

    /// Delete every match, zone and zone membership of the pair and insert
    /// `skeleton` in their place, as one transaction.
    fn replace_bracket(
        &self,
        tournament_id: TournamentId,
        category_id: CategoryId,
        skeleton: BracketSkeleton,
    ) -> StoreResult<()>;

    /// Write `m` if the stored version still equals `m.version`. Returns the
    /// stored match with its bumped version.
    fn save_match(&self, m: &Match) -> StoreResult<Match>;

    /// Set the team of a slot only if it is currently empty. Returns whether
    /// the write happened.
    fn fill_slot_if_empty(&self, match_id: MatchId, side: Side, team_id: TeamId)
        -> StoreResult<bool>;

    /// Empty a slot only if it currently holds `team_id`. Returns whether the
    /// write happened.
    fn clear_slot_if_holds(&self, match_id: MatchId, side: Side, team_id: TeamId)
        -> StoreResult<bool>;

    /// Place teams into open slots in one transaction, replacing whatever a
    /// previous classification put there.
    fn seed_open_slots(&self, assignments: &[SlotAssignment]) -> StoreResult<()>;

    fn set_zone_positions(&self, zone_id: ZoneId, positions: &[(TeamId, u32)]) -> StoreResult<()>;
}
