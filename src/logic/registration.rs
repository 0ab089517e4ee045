//! Team registration, one at a time or in bulk from CSV.

use crate::models::{
    BracketError, BracketResult, CategoryId, Registration, RegistrationStatus, Team, TournamentId,
};
use crate::store::BracketStore;
use serde::Deserialize;
use std::io::Read;

/// A team as submitted for registration.
#[derive(Clone, Debug, Deserialize)]
pub struct NewTeam {
    pub player_1: String,
    pub player_2: String,
    #[serde(default)]
    pub seed: Option<u32>,
    /// Registration status of both players.
    #[serde(default = "confirmed")]
    pub status: RegistrationStatus,
}

fn confirmed() -> RegistrationStatus {
    RegistrationStatus::Confirmed
}

/// One CSV row: `player_1,player_2,seed` (seed may be empty).
#[derive(Debug, Deserialize)]
struct CsvRow {
    player_1: String,
    player_2: String,
    seed: Option<u32>,
}

pub fn register_team<S: BracketStore + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
    category_id: CategoryId,
    new_team: NewTeam,
) -> BracketResult<Team> {
    store
        .category(tournament_id, category_id)?
        .ok_or(BracketError::CategoryNotFound(category_id))?;
    let (player_1, player_2) = (new_team.player_1.trim(), new_team.player_2.trim());
    if player_1.is_empty() || player_2.is_empty() {
        return Err(BracketError::InvalidTeam("both player names are required".to_string()));
    }
    let mut team = Team::new(
        tournament_id,
        category_id,
        Registration::new(player_1, new_team.status),
        Registration::new(player_2, new_team.status),
    );
    team.seed = new_team.seed;
    store.insert_team(team.clone())?;
    log::debug!("Registered team {} ({})", team.id, team.name());
    Ok(team)
}

/// Register every row of a CSV document; nothing is inserted if a row is bad.
pub fn import_teams_csv<S: BracketStore + ?Sized, R: Read>(
    store: &S,
    tournament_id: TournamentId,
    category_id: CategoryId,
    reader: R,
) -> BracketResult<Vec<Team>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let rows: Vec<CsvRow> = rdr.deserialize().collect::<Result<_, _>>()?;
    let new_teams: Vec<NewTeam> = rows
        .into_iter()
        .map(|row| NewTeam {
            player_1: row.player_1,
            player_2: row.player_2,
            seed: row.seed,
            status: RegistrationStatus::Confirmed,
        })
        .collect();
    if let Some(bad) = new_teams
        .iter()
        .position(|t| t.player_1.trim().is_empty() || t.player_2.trim().is_empty())
    {
        return Err(BracketError::InvalidTeam(format!("row {} is missing a player name", bad + 1)));
    }

    let teams = new_teams
        .into_iter()
        .map(|t| register_team(store, tournament_id, category_id, t))
        .collect::<BracketResult<Vec<_>>>()?;
    log::info!("Imported {} teams into category {}", teams.len(), category_id);
    Ok(teams)
}
