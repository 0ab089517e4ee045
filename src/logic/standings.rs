//! Group standings: per-team statistics and ranking.

use crate::models::{
    BracketError, BracketResult, Match, MatchStatus, Side, Team, TeamId, ZoneId,
};
use crate::store::BracketStore;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Points for winning a match.
pub const POINTS_WIN: u32 = 2;
/// Points for losing a match that was played.
pub const POINTS_LOSS: u32 = 1;
/// Points for losing by walkover.
pub const POINTS_WALKOVER_LOSS: u32 = 0;

/// One row of a group table.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct TeamStanding {
    pub team_id: TeamId,
    /// 1-based rank within the group.
    pub position: u32,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub points: u32,
}

impl TeamStanding {
    fn new(team_id: TeamId) -> Self {
        Self {
            team_id,
            ..Default::default()
        }
    }

    pub fn set_diff(&self) -> i64 {
        i64::from(self.sets_won) - i64::from(self.sets_lost)
    }

    pub fn game_diff(&self) -> i64 {
        i64::from(self.games_won) - i64::from(self.games_lost)
    }

    /// Ranking tuple, higher is better.
    pub fn ranking_key(&self) -> (u32, i64, i64, u32) {
        (self.points, self.set_diff(), self.game_diff(), self.sets_won)
    }
}

/// Seed ascending (unseeded last), then registration order.
pub(crate) fn fallback_order(a: Option<&Team>, b: Option<&Team>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let seed = match (a.seed, b.seed) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            seed.then(a.registered_at.cmp(&b.registered_at))
                .then(a.id.cmp(&b.id))
        }
        _ => Ordering::Equal,
    }
}

/// Compare two rows: better ranking tuple first, then the fallback order.
pub(crate) fn compare_standings(
    a: &TeamStanding,
    b: &TeamStanding,
    teams: &HashMap<TeamId, &Team>,
) -> Ordering {
    b.ranking_key()
        .cmp(&a.ranking_key())
        .then_with(|| {
            fallback_order(teams.get(&a.team_id).copied(), teams.get(&b.team_id).copied())
        })
        .then(a.team_id.cmp(&b.team_id))
}

fn apply(row: &mut TeamStanding, m: &Match, side: Side) {
    let (sets_1, sets_2) = m.sets_won();
    let (games_1, games_2) = m.games_won();
    let (sets_for, sets_against, games_for, games_against) = match side {
        Side::One => (sets_1, sets_2, games_1, games_2),
        Side::Two => (sets_2, sets_1, games_2, games_1),
    };
    row.played += 1;
    row.sets_won += sets_for;
    row.sets_lost += sets_against;
    row.games_won += games_for;
    row.games_lost += games_against;
    if m.winner == m.team(side) {
        row.won += 1;
        row.points += POINTS_WIN;
    } else {
        row.lost += 1;
        row.points += if m.status == MatchStatus::Walkover {
            POINTS_WALKOVER_LOSS
        } else {
            POINTS_LOSS
        };
    }
}

/// Rank `members` on the decided matches among them.
///
/// Ties on (points, set diff, game diff, sets won) between exactly two teams
/// go to the head-to-head winner; anything still level falls back to seed and
/// then registration order.
pub fn rank_group(members: &[Team], matches: &[Match]) -> Vec<TeamStanding> {
    let mut rows: HashMap<TeamId, TeamStanding> =
        members.iter().map(|t| (t.id, TeamStanding::new(t.id))).collect();

    let relevant: Vec<&Match> = matches
        .iter()
        .filter(|m| m.status.is_decided() && m.winner.is_some())
        .filter(|m| match (m.team_1.team_id, m.team_2.team_id) {
            (Some(a), Some(b)) => rows.contains_key(&a) && rows.contains_key(&b),
            _ => false,
        })
        .collect();

    for m in &relevant {
        for side in Side::BOTH {
            if let Some(row) = m.team(side).and_then(|id| rows.get_mut(&id)) {
                apply(row, m, side);
            }
        }
    }

    let teams: HashMap<TeamId, &Team> = members.iter().map(|t| (t.id, t)).collect();
    let mut table: Vec<TeamStanding> = rows.into_values().collect();
    table.sort_by(|a, b| compare_standings(a, b, &teams));

    let mut i = 0;
    while i + 1 < table.len() {
        let key = table[i].ranking_key();
        let mut end = i + 1;
        while end < table.len() && table[end].ranking_key() == key {
            end += 1;
        }
        if end - i == 2 {
            let (first, second) = (table[i].team_id, table[i + 1].team_id);
            let second_won = relevant.iter().any(|m| {
                m.has_both_teams()
                    && m.opponent_of(first) == Some(second)
                    && m.winner == Some(second)
            });
            if second_won {
                table.swap(i, i + 1);
            }
        }
        i = end;
    }

    for (index, row) in table.iter_mut().enumerate() {
        row.position = index as u32 + 1;
    }
    table
}

/// Members of a zone (as teams, in membership order) and the category's matches.
pub(crate) fn zone_context<S: BracketStore + ?Sized>(
    store: &S,
    zone_id: ZoneId,
) -> BracketResult<(Vec<Team>, Vec<Match>)> {
    let zone = store
        .find_zone(zone_id)?
        .ok_or(BracketError::ZoneNotFound(zone_id))?;
    let memberships = store.zone_teams(zone_id)?;
    let teams = store.teams(zone.tournament_id, zone.category_id)?;
    let members: Vec<Team> = memberships
        .iter()
        .filter_map(|zt| teams.iter().find(|t| t.id == zt.team_id).cloned())
        .collect();
    let matches = store.matches(zone.tournament_id, zone.category_id)?;
    Ok((members, matches))
}

/// Compute the table of a zone and persist the positions on its memberships.
pub fn calculate_group_standings<S: BracketStore + ?Sized>(
    store: &S,
    zone_id: ZoneId,
) -> BracketResult<Vec<TeamStanding>> {
    let (members, matches) = zone_context(store, zone_id)?;
    let table = rank_group(&members, &matches);
    let positions: Vec<(TeamId, u32)> = table.iter().map(|r| (r.team_id, r.position)).collect();
    store.set_zone_positions(zone_id, &positions)?;
    log::info!("Calculated standings for zone {} ({} teams)", zone_id, table.len());
    Ok(table)
}
