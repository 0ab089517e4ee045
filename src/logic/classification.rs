//! Group qualifiers into the first playoff round.

use crate::logic::groups::{calculate_optimal_group_configuration, GroupConfiguration};
use crate::logic::seeding::standard_seed_order;
use crate::logic::standings::{compare_standings, rank_group, TeamStanding};
use crate::models::{
    BracketError, BracketFormat, BracketResult, CategoryId, Round, Side, Team, TeamId,
    TournamentId, ZoneId,
};
use crate::store::{BracketStore, SlotAssignment};
use serde::Serialize;
use std::collections::HashMap;

/// A team admitted to the elimination phase.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Qualifier {
    pub team_id: TeamId,
    pub zone_id: ZoneId,
    /// Final position in its group.
    pub group_position: u32,
    pub wildcard: bool,
    /// 1-based elimination seed.
    pub seed: u32,
    /// First-round playoff match the team was placed in.
    pub match_number: u32,
    pub side: Side,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub configuration: GroupConfiguration,
    pub qualifiers: Vec<Qualifier>,
}

struct Candidate {
    team_id: TeamId,
    zone_id: ZoneId,
    position: u32,
    wildcard: bool,
}

/// Seed group qualifiers into the playoff skeleton.
///
/// Every group needs its standings calculated first. Direct qualifiers come
/// position by position across groups (all group winners, then all runners-up,
/// ...), followed by the best next-placed teams as wildcards. Seed i meets
/// seed `total - 1 - i` in round one.
pub fn classify_teams_to_elimination_phase<S: BracketStore + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
    category_id: CategoryId,
) -> BracketResult<ClassificationReport> {
    store
        .tournament(tournament_id)?
        .ok_or(BracketError::TournamentNotFound(tournament_id))?;
    let category = store
        .category(tournament_id, category_id)?
        .ok_or(BracketError::CategoryNotFound(category_id))?;
    if category.format != BracketFormat::GroupStageElimination {
        return Err(BracketError::NotAGroupStage(category.format));
    }

    let zones = store.zones(tournament_id, category_id)?;
    if zones.is_empty() {
        return Err(BracketError::StandingsPending("category (no groups generated)".to_string()));
    }
    let mut positions: Vec<(ZoneId, HashMap<u32, TeamId>)> = Vec::with_capacity(zones.len());
    let mut member_count = 0;
    for zone in &zones {
        let memberships = store.zone_teams(zone.id)?;
        member_count += memberships.len();
        let mut by_position = HashMap::with_capacity(memberships.len());
        for zt in memberships {
            let position = zt
                .position
                .ok_or_else(|| BracketError::StandingsPending(zone.name.clone()))?;
            by_position.insert(position, zt.team_id);
        }
        positions.push((zone.id, by_position));
    }

    let configuration = calculate_optimal_group_configuration(member_count)?;
    let matches = store.matches(tournament_id, category_id)?;
    let playoff_started = matches
        .iter()
        .any(|m| matches!(m.round, Round::Playoff(_)) && m.status.is_terminal());
    if playoff_started {
        return Err(BracketError::EliminationStarted);
    }

    let mut qualified: Vec<Candidate> = Vec::with_capacity(configuration.total_qualified);
    for position in 1..=configuration.qualified_per_group as u32 {
        for (zone_id, by_position) in &positions {
            if let Some(&team_id) = by_position.get(&position) {
                qualified.push(Candidate {
                    team_id,
                    zone_id: *zone_id,
                    position,
                    wildcard: false,
                });
            }
        }
    }

    if configuration.wildcard_slots > 0 {
        let teams = store.teams(tournament_id, category_id)?;
        let wildcard_position = configuration.qualified_per_group as u32 + 1;
        let mut candidates: Vec<(TeamStanding, ZoneId)> = Vec::new();
        for (zone_id, by_position) in &positions {
            let Some(&team_id) = by_position.get(&wildcard_position) else {
                continue;
            };
            let members: Vec<Team> = by_position
                .values()
                .filter_map(|id| teams.iter().find(|t| t.id == *id).cloned())
                .collect();
            if let Some(row) = rank_group(&members, &matches)
                .into_iter()
                .find(|row| row.team_id == team_id)
            {
                candidates.push((row, *zone_id));
            }
        }
        let by_id: HashMap<TeamId, &Team> = teams.iter().map(|t| (t.id, t)).collect();
        candidates.sort_by(|(a, _), (b, _)| compare_standings(a, b, &by_id));
        qualified.extend(
            candidates
                .into_iter()
                .take(configuration.wildcard_slots)
                .map(|(row, zone_id)| Candidate {
                    team_id: row.team_id,
                    zone_id,
                    position: wildcard_position,
                    wildcard: true,
                }),
        );
    }

    if qualified.len() != configuration.total_qualified {
        return Err(BracketError::MissingQualifiers {
            expected: configuration.total_qualified,
            found: qualified.len(),
        });
    }

    let first_round: Vec<_> = matches
        .iter()
        .filter(|m| m.round == Round::Playoff(1))
        .collect();
    if first_round.len() * 2 != configuration.total_qualified {
        return Err(BracketError::SkeletonMismatch {
            expected: configuration.total_qualified / 2,
            found: first_round.len(),
        });
    }

    let order = standard_seed_order(configuration.total_qualified);
    let mut assignments = Vec::with_capacity(order.len());
    let mut placements: HashMap<usize, (u32, Side)> = HashMap::with_capacity(order.len());
    for (m, pair) in first_round.iter().zip(order.chunks(2)) {
        for (side, &seed) in Side::BOTH.into_iter().zip(pair) {
            assignments.push(SlotAssignment {
                match_id: m.id,
                side,
                team_id: qualified[seed].team_id,
            });
            placements.insert(seed, (m.match_number, side));
        }
    }
    store.seed_open_slots(&assignments)?;

    let qualifiers = qualified
        .into_iter()
        .enumerate()
        .map(|(seed, c)| {
            let (match_number, side) = placements.get(&seed).copied().unwrap_or_default();
            Qualifier {
                team_id: c.team_id,
                zone_id: c.zone_id,
                group_position: c.position,
                wildcard: c.wildcard,
                seed: seed as u32 + 1,
                match_number,
                side,
            }
        })
        .collect();

    log::info!(
        "Classified {} teams into the elimination phase of category {}",
        configuration.total_qualified,
        category_id
    );
    Ok(ClassificationReport {
        configuration,
        qualifiers,
    })
}
