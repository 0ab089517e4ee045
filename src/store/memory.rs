//! In-memory store: all data behind a single `RwLock`.

use super::{BracketSkeleton, BracketStore, SlotAssignment, StoreError, StoreResult};
use crate::models::{
    Category, CategoryId, Match, MatchId, Side, Team, TeamId, Tournament, TournamentId,
    TournamentStatus, Zone, ZoneId, ZoneTeam,
};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Data {
    tournaments: HashMap<TournamentId, Tournament>,
    categories: HashMap<CategoryId, Category>,
    /// Registration order.
    teams: Vec<Team>,
    matches: HashMap<MatchId, Match>,
    /// Creation order.
    zones: Vec<Zone>,
    zone_teams: Vec<ZoneTeam>,
}

impl Data {
    fn match_mut(&mut self, id: MatchId) -> StoreResult<&mut Match> {
        self.matches
            .get_mut(&id)
            .ok_or(StoreError::MissingRow { entity: "match", id })
    }
}

/// Thread-safe in-memory [`BracketStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Data>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Data>> {
        self.data.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Data>> {
        self.data.write().map_err(|_| StoreError::Poisoned)
    }
}

impl BracketStore for MemoryStore {
    fn insert_tournament(&self, tournament: Tournament) -> StoreResult<()> {
        self.write()?.tournaments.insert(tournament.id, tournament);
        Ok(())
    }

    fn tournament(&self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        Ok(self.read()?.tournaments.get(&id).cloned())
    }

    fn set_tournament_status(&self, id: TournamentId, status: TournamentStatus) -> StoreResult<()> {
        let mut g = self.write()?;
        let t = g
            .tournaments
            .get_mut(&id)
            .ok_or(StoreError::MissingRow { entity: "tournament", id })?;
        t.status = status;
        Ok(())
    }

    fn insert_category(&self, category: Category) -> StoreResult<()> {
        let mut g = self.write()?;
        if !g.tournaments.contains_key(&category.tournament_id) {
            return Err(StoreError::MissingRow {
                entity: "tournament",
                id: category.tournament_id,
            });
        }
        g.categories.insert(category.id, category);
        Ok(())
    }

    fn category(
        &self,
        tournament_id: TournamentId,
        category_id: CategoryId,
    ) -> StoreResult<Option<Category>> {
        Ok(self
            .read()?
            .categories
            .get(&category_id)
            .filter(|c| c.tournament_id == tournament_id)
            .cloned())
    }

    fn insert_team(&self, team: Team) -> StoreResult<()> {
        let mut g = self.write()?;
        if !g.categories.contains_key(&team.category_id) {
            return Err(StoreError::MissingRow {
                entity: "category",
                id: team.category_id,
            });
        }
        g.teams.push(team);
        Ok(())
    }

    fn teams(
        &self,
        tournament_id: TournamentId,
        category_id: CategoryId,
    ) -> StoreResult<Vec<Team>> {
        Ok(self
            .read()?
            .teams
            .iter()
            .filter(|t| t.tournament_id == tournament_id && t.category_id == category_id)
            .cloned()
            .collect())
    }

    fn matches(
        &self,
        tournament_id: TournamentId,
        category_id: CategoryId,
    ) -> StoreResult<Vec<Match>> {
        let mut matches: Vec<Match> = self
            .read()?
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id && m.category_id == category_id)
            .cloned()
            .collect();
        matches.sort_by_key(|m| (m.round, m.match_number));
        Ok(matches)
    }

    fn find_match(&self, id: MatchId) -> StoreResult<Option<Match>> {
        Ok(self.read()?.matches.get(&id).cloned())
    }

    fn zones(
        &self,
        tournament_id: TournamentId,
        category_id: CategoryId,
    ) -> StoreResult<Vec<Zone>> {
        Ok(self
            .read()?
            .zones
            .iter()
            .filter(|z| z.tournament_id == tournament_id && z.category_id == category_id)
            .cloned()
            .collect())
    }

    fn find_zone(&self, id: ZoneId) -> StoreResult<Option<Zone>> {
        Ok(self.read()?.zones.iter().find(|z| z.id == id).cloned())
    }

    fn zone_teams(&self, zone_id: ZoneId) -> StoreResult<Vec<ZoneTeam>> {
        Ok(self
            .read()?
            .zone_teams
            .iter()
            .filter(|zt| zt.zone_id == zone_id)
            .cloned()
            .collect())
    }

    fn replace_bracket(
        &self,
        tournament_id: TournamentId,
        category_id: CategoryId,
        skeleton: BracketSkeleton,
    ) -> StoreResult<()> {
        let mut g = self.write()?;
        let data = &mut *g;
        data.matches
            .retain(|_, m| !(m.tournament_id == tournament_id && m.category_id == category_id));
        let stale_zones: Vec<ZoneId> = data
            .zones
            .iter()
            .filter(|z| z.tournament_id == tournament_id && z.category_id == category_id)
            .map(|z| z.id)
            .collect();
        data.zones.retain(|z| !stale_zones.contains(&z.id));
        data.zone_teams.retain(|zt| !stale_zones.contains(&zt.zone_id));

        data.matches
            .extend(skeleton.matches.into_iter().map(|m| (m.id, m)));
        data.zones.extend(skeleton.zones);
        data.zone_teams.extend(skeleton.zone_teams);
        Ok(())
    }

    fn save_match(&self, m: &Match) -> StoreResult<Match> {
        let mut g = self.write()?;
        let stored = g.match_mut(m.id)?;
        if stored.version != m.version {
            return Err(StoreError::Conflict {
                match_id: m.id,
                expected: m.version,
                found: stored.version,
            });
        }
        *stored = m.clone();
        stored.version += 1;
        Ok(stored.clone())
    }

    fn fill_slot_if_empty(
        &self,
        match_id: MatchId,
        side: Side,
        team_id: TeamId,
    ) -> StoreResult<bool> {
        let mut g = self.write()?;
        let m = g.match_mut(match_id)?;
        let slot = m.slot_mut(side);
        if slot.team_id.is_some() {
            return Ok(false);
        }
        slot.team_id = Some(team_id);
        m.version += 1;
        Ok(true)
    }

    fn clear_slot_if_holds(
        &self,
        match_id: MatchId,
        side: Side,
        team_id: TeamId,
    ) -> StoreResult<bool> {
        let mut g = self.write()?;
        let m = g.match_mut(match_id)?;
        let slot = m.slot_mut(side);
        if slot.team_id != Some(team_id) {
            return Ok(false);
        }
        slot.team_id = None;
        m.version += 1;
        Ok(true)
    }

    fn seed_open_slots(&self, assignments: &[SlotAssignment]) -> StoreResult<()> {
        let mut g = self.write()?;
        // Validate everything first so a bad assignment leaves no partial write.
        for a in assignments {
            let m = g.match_mut(a.match_id)?;
            if m.slot(a.side).from_match.is_some() {
                return Err(StoreError::NotOpen {
                    match_id: a.match_id,
                    side: a.side,
                });
            }
        }
        for a in assignments {
            let m = g.match_mut(a.match_id)?;
            m.slot_mut(a.side).team_id = Some(a.team_id);
            m.version += 1;
        }
        Ok(())
    }

    fn set_zone_positions(&self, zone_id: ZoneId, positions: &[(TeamId, u32)]) -> StoreResult<()> {
        let mut g = self.write()?;
        if !g.zones.iter().any(|z| z.id == zone_id) {
            return Err(StoreError::MissingRow {
                entity: "zone",
                id: zone_id,
            });
        }
        for zt in g.zone_teams.iter_mut().filter(|zt| zt.zone_id == zone_id) {
            zt.position = positions
                .iter()
                .find(|(team_id, _)| *team_id == zt.team_id)
                .map(|&(_, position)| position);
        }
        Ok(())
    }
}
