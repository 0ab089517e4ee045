//! Padel bracket engine: library with models, storage boundary and bracket logic.

pub mod config;
pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    calculate_group_standings, calculate_optimal_group_configuration, cancel_match,
    check_existing_matches, classify_teams_to_elimination_phase, clear_match_result,
    generate_bracket, get_bracket, import_teams_csv, progress_winner, record_match_result,
    register_team, start_match, unprogress, validate_bracket_generation, BracketView,
    ClassificationReport, GenerationSummary, GroupConfiguration, MatchCounts, MatchResult, NewTeam,
    ProgressionReport, TeamStanding, ValidationReport,
};
pub use models::{
    BracketError, BracketFormat, BracketResult, Category, CategoryId, ErrorKind, Match, MatchId,
    MatchStatus, PhaseType, Registration, RegistrationStatus, Round, SetScore, Side, Slot, Team,
    TeamId, Tournament, TournamentId, TournamentStatus, Zone, ZoneId, ZoneTeam,
};
pub use store::{BracketStore, MemoryStore, StoreError};
