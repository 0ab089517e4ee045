//! Data structures for the bracket engine: tournaments, teams, matches, zones.

mod error;
mod game;
mod round;
mod team;
mod tournament;
mod zone;

pub use error::{BracketError, BracketResult, ErrorKind};
pub use game::{Match, MatchId, MatchStatus, SetScore, Side, Slot};
pub use round::{PhaseType, Round};
pub use team::{Registration, RegistrationStatus, Team, TeamId};
pub use tournament::{
    BracketFormat, Category, CategoryId, Tournament, TournamentId, TournamentStatus,
};
pub use zone::{Zone, ZoneId, ZoneTeam};
