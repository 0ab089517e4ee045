//! Bracket engine: topology generation, progression, standings, classification.

mod bracket;
mod classification;
mod generation;
mod groups;
mod pairing;
mod progression;
mod registration;
mod seeding;
mod standings;
mod topology;

pub use bracket::{
    assemble_bracket, check_existing_matches, get_bracket, validate_bracket_generation,
    BracketView, MatchCounts, ValidationReport,
};
pub use classification::{classify_teams_to_elimination_phase, ClassificationReport, Qualifier};
pub use generation::{generate_bracket, plan_bracket, GenerationSummary};
pub use groups::{
    calculate_optimal_group_configuration, snake_distribution, GroupConfiguration, MAX_GROUP_SIZE,
};
pub use pairing::circle_pairings;
pub use progression::{
    cancel_match, clear_match_result, progress_winner, record_match_result, start_match,
    unprogress, MatchResult, ProgressionReport, SlotRef,
};
pub use registration::{import_teams_csv, register_team, NewTeam};
pub use seeding::{distribute_byes, order_by_seed, standard_seed_order};
pub use standings::{
    calculate_group_standings, rank_group, TeamStanding, POINTS_LOSS, POINTS_WALKOVER_LOSS,
    POINTS_WIN,
};
pub use topology::{
    loser_destination, materialize, rounds_for, BracketPlan, MatchKey, PlannedMatch, PlannedSlot,
    AMERICANO_MAX_ROUNDS,
};
