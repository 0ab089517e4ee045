//! Seed ordering, bye placement, and "1 vs N" bracket order.

use crate::models::{BracketError, BracketResult, Team, TeamId};

/// Sort eligible teams by seed ascending, falling back to registration order.
///
/// Either every team carries a seed or none does.
pub fn order_by_seed(mut teams: Vec<Team>) -> BracketResult<Vec<Team>> {
    check_seeding(&teams)?;
    teams.sort_by(|a, b| {
        a.seed
            .cmp(&b.seed)
            .then(a.registered_at.cmp(&b.registered_at))
            .then(a.id.cmp(&b.id))
    });
    Ok(teams)
}

pub(crate) fn check_seeding(teams: &[Team]) -> BracketResult<()> {
    let seeded = teams.iter().filter(|t| t.seed.is_some()).count();
    if seeded != 0 && seeded != teams.len() {
        return Err(BracketError::PartialSeeding {
            seeded,
            unseeded: teams.len() - seeded,
        });
    }
    Ok(())
}

/// Lay seed-ordered teams out over `bracket_size` round-one positions.
///
/// Byes (None) take every other position among the first `2 * byes`
/// positions, so each bye faces a team and the top seeds receive them.
pub fn distribute_byes(teams: &[TeamId], bracket_size: usize) -> Vec<Option<TeamId>> {
    debug_assert!(teams.len() <= bracket_size);
    debug_assert!(2 * (bracket_size - teams.len()) <= bracket_size);
    let byes = bracket_size.saturating_sub(teams.len());
    let mut remaining = teams.iter().copied();
    (0..bracket_size)
        .map(|position| {
            if position < 2 * byes && position % 2 == 0 {
                None
            } else {
                remaining.next()
            }
        })
        .collect()
}

/// Bracket order of 0-based seeds for a power-of-two `size`.
///
/// Consecutive pairs are (i, size - 1 - i) and the pairs are ordered so the
/// two best seeds can only meet in the final: for 8 this is
/// `[0, 7, 3, 4, 1, 6, 2, 5]`.
pub fn standard_seed_order(size: usize) -> Vec<usize> {
    debug_assert!(size.is_power_of_two());
    let mut order = vec![0];
    let mut len = 1;
    while len < size {
        len *= 2;
        order = order
            .into_iter()
            .flat_map(|seed| [seed, len - 1 - seed])
            .collect();
    }
    order
}
