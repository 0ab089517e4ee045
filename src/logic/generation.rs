//! Bracket (re)generation for one category.

use crate::logic::groups::GroupConfiguration;
use crate::logic::seeding::{check_seeding, order_by_seed};
use crate::logic::topology::{self, materialize, BracketPlan};
use crate::models::{
    BracketError, BracketFormat, BracketResult, Category, CategoryId, Team, TeamId, Tournament,
    TournamentId,
};
use crate::store::BracketStore;
use serde::Serialize;
use std::collections::BTreeSet;

/// What a generation produced.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GenerationSummary {
    pub tournament_id: TournamentId,
    pub category_id: CategoryId,
    pub format: BracketFormat,
    pub teams: usize,
    pub total_matches: usize,
    pub total_rounds: usize,
    pub byes: usize,
    pub zones: usize,
    pub group_configuration: Option<GroupConfiguration>,
}

/// Tournament, category and eligible teams of a generation request.
pub(crate) struct GenerationInput {
    pub tournament: Tournament,
    pub category: Category,
    pub eligible: Vec<Team>,
}

pub(crate) fn load_input<S: BracketStore + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
    category_id: CategoryId,
) -> BracketResult<GenerationInput> {
    let tournament = store
        .tournament(tournament_id)?
        .ok_or(BracketError::TournamentNotFound(tournament_id))?;
    let category = store
        .category(tournament_id, category_id)?
        .ok_or(BracketError::CategoryNotFound(category_id))?;
    let eligible = store
        .teams(tournament_id, category_id)?
        .into_iter()
        .filter(Team::is_eligible)
        .collect();
    Ok(GenerationInput {
        tournament,
        category,
        eligible,
    })
}

/// Every reason the input cannot be generated, in check order.
pub(crate) fn generation_errors(input: &GenerationInput) -> Vec<BracketError> {
    let mut errors = Vec::new();
    if !input.tournament.status.allows_generation() {
        errors.push(BracketError::GenerationLocked(input.tournament.status));
    }
    let format = input.category.format;
    if input.eligible.len() < format.min_teams() {
        errors.push(BracketError::NotEnoughTeams {
            format,
            required: format.min_teams(),
            found: input.eligible.len(),
        });
    }
    if let Err(e) = check_seeding(&input.eligible) {
        errors.push(e);
    }
    errors
}

/// Topology for `format` over seed-ordered teams.
pub fn plan_bracket(
    tournament_id: TournamentId,
    category_id: CategoryId,
    format: BracketFormat,
    teams: &[TeamId],
) -> BracketResult<BracketPlan> {
    Ok(match format {
        BracketFormat::SingleElimination => topology::single_elimination(teams),
        BracketFormat::DoubleElimination => topology::double_elimination(teams),
        BracketFormat::RoundRobin => topology::round_robin(teams),
        BracketFormat::GroupStageElimination => {
            topology::group_stage_elimination(tournament_id, category_id, teams)?
        }
        BracketFormat::Americano => topology::americano(teams),
    })
}

/// Rebuild the bracket of a category from its eligible teams.
///
/// Any previous matches, zones and zone memberships of the category are
/// replaced in one store transaction.
pub fn generate_bracket<S: BracketStore + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
    category_id: CategoryId,
) -> BracketResult<GenerationSummary> {
    let input = load_input(store, tournament_id, category_id)?;
    if let Some(e) = generation_errors(&input).into_iter().next() {
        return Err(e);
    }
    let format = input.category.format;
    let teams = order_by_seed(input.eligible)?;
    let team_ids: Vec<TeamId> = teams.iter().map(|t| t.id).collect();

    let plan = plan_bracket(tournament_id, category_id, format, &team_ids)?;
    let group_configuration = plan.group_configuration.clone();
    let skeleton = materialize(tournament_id, category_id, plan)?;

    let summary = GenerationSummary {
        tournament_id,
        category_id,
        format,
        teams: team_ids.len(),
        total_matches: skeleton.matches.len(),
        total_rounds: skeleton
            .matches
            .iter()
            .map(|m| m.round)
            .collect::<BTreeSet<_>>()
            .len(),
        byes: skeleton.matches.iter().filter(|m| m.is_bye()).count(),
        zones: skeleton.zones.len(),
        group_configuration,
    };
    store.replace_bracket(tournament_id, category_id, skeleton)?;

    log::info!(
        "Generated {} bracket for category {}: {} teams, {} matches in {} rounds",
        format,
        category_id,
        summary.teams,
        summary.total_matches,
        summary.total_rounds
    );
    Ok(summary)
}
