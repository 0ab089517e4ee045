//! Read side: bracket view, pre-generation validation, and match counts.

use crate::logic::generation::{generation_errors, load_input};
use crate::models::{BracketResult, CategoryId, ErrorKind, Match, MatchStatus, TournamentId};
use crate::store::BracketStore;
use serde::Serialize;
use std::collections::BTreeMap;

/// Matches of a category grouped by round code.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct BracketView {
    pub matches: Vec<Match>,
    pub rounds_by_number: BTreeMap<u32, Vec<Match>>,
    pub total_rounds: usize,
    pub total_matches: usize,
}

/// Group matches by round; pure and safe to run alongside anything else.
pub fn assemble_bracket(mut matches: Vec<Match>) -> BracketView {
    matches.sort_by_key(|m| (m.round, m.match_number));
    let mut rounds_by_number: BTreeMap<u32, Vec<Match>> = BTreeMap::new();
    for m in &matches {
        rounds_by_number.entry(m.round.code()).or_default().push(m.clone());
    }
    BracketView {
        total_rounds: rounds_by_number.len(),
        total_matches: matches.len(),
        matches,
        rounds_by_number,
    }
}

pub fn get_bracket<S: BracketStore + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
    category_id: CategoryId,
) -> BracketResult<BracketView> {
    Ok(assemble_bracket(store.matches(tournament_id, category_id)?))
}

/// Outcome of a dry-run generation check.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub eligible_teams: usize,
}

/// Run every generation check without writing anything.
pub fn validate_bracket_generation<S: BracketStore + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
    category_id: CategoryId,
) -> BracketResult<ValidationReport> {
    let input = match load_input(store, tournament_id, category_id) {
        Ok(input) => input,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(ValidationReport {
                valid: false,
                errors: vec![e.to_string()],
                eligible_teams: 0,
            })
        }
        Err(e) => return Err(e),
    };
    let errors: Vec<String> = generation_errors(&input).iter().map(ToString::to_string).collect();
    Ok(ValidationReport {
        valid: errors.is_empty(),
        errors,
        eligible_teams: input.eligible.len(),
    })
}

/// Number of matches per status.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct MatchCounts {
    pub total: usize,
    pub scheduled: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub walkover: usize,
    pub cancelled: usize,
}

impl MatchCounts {
    pub fn from_matches(matches: &[Match]) -> Self {
        let mut counts = Self {
            total: matches.len(),
            ..Default::default()
        };
        for m in matches {
            match m.status {
                MatchStatus::Scheduled => counts.scheduled += 1,
                MatchStatus::InProgress => counts.in_progress += 1,
                MatchStatus::Completed => counts.completed += 1,
                MatchStatus::Walkover => counts.walkover += 1,
                MatchStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }
}

/// Counts by status of the matches a regeneration would delete.
pub fn check_existing_matches<S: BracketStore + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
    category_id: CategoryId,
) -> BracketResult<MatchCounts> {
    Ok(MatchCounts::from_matches(&store.matches(tournament_id, category_id)?))
}
