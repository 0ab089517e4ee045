//! Bracket topology per format, built as an in-memory plan and materialized
//! into match rows.
//!
//! Matches in a plan reference each other by [`MatchKey`] (round, number).
//! [`materialize`] inserts them in topological order and resolves every key
//! to the id already given to its feeder.

use crate::logic::groups::{
    calculate_optimal_group_configuration, snake_distribution, GroupConfiguration,
};
use crate::logic::pairing::circle_pairings;
use crate::logic::seeding::distribute_byes;
use crate::models::{
    BracketError, BracketResult, CategoryId, Match, MatchId, MatchStatus, PhaseType, Round, Slot,
    TeamId, TournamentId, Zone, ZoneId, ZoneTeam,
};
use crate::store::BracketSkeleton;
use std::collections::HashMap;
use uuid::Uuid;

/// Round cap for Americano rotations.
pub const AMERICANO_MAX_ROUNDS: usize = 10;

/// Symbolic position of a planned match.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MatchKey {
    pub round: Round,
    pub number: u32,
}

impl MatchKey {
    pub fn new(round: Round, number: u32) -> Self {
        Self { round, number }
    }
}

impl std::fmt::Display for MatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "round {} match {}", self.round.code(), self.number)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlannedSlot {
    Team(TeamId),
    WinnerOf(MatchKey),
    Open,
    /// Never filled: the other side advances without playing.
    Bye,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlannedMatch {
    pub key: MatchKey,
    pub phase: PhaseType,
    pub zone_id: Option<ZoneId>,
    pub team_1: PlannedSlot,
    pub team_2: PlannedSlot,
    /// Set for a round-one bye: the match is created as a walkover won by
    /// this team.
    pub bye_winner: Option<TeamId>,
}

impl PlannedMatch {
    fn new(key: MatchKey, phase: PhaseType, team_1: PlannedSlot, team_2: PlannedSlot) -> Self {
        Self {
            key,
            phase,
            zone_id: None,
            team_1,
            team_2,
            bye_winner: None,
        }
    }
}

/// Everything a generation writes for one category, before ids are resolved.
#[derive(Clone, Debug, Default)]
pub struct BracketPlan {
    pub matches: Vec<PlannedMatch>,
    pub zones: Vec<Zone>,
    pub zone_teams: Vec<ZoneTeam>,
    /// Present for group stage plans.
    pub group_configuration: Option<GroupConfiguration>,
}

/// Number of rounds needed for `n` teams: ⌈log2 n⌉.
pub fn rounds_for(n: usize) -> u32 {
    n.max(2).next_power_of_two().trailing_zeros()
}

/// Knockout tree whose first round is `first_round` (a power-of-two count of
/// pairs). Later rounds are fed by matches 2j-1 and 2j of the round before.
fn knockout(
    first_round: Vec<(PlannedSlot, PlannedSlot)>,
    round_of: fn(u32) -> Round,
) -> Vec<PlannedMatch> {
    let total_rounds = first_round.len().trailing_zeros() + 1;
    let phase = |round: u32| PhaseType::for_distance_to_final(total_rounds - round);

    let mut matches: Vec<PlannedMatch> = first_round
        .into_iter()
        .enumerate()
        .map(|(i, (team_1, team_2))| {
            let mut planned = PlannedMatch::new(
                MatchKey::new(round_of(1), i as u32 + 1),
                phase(1),
                team_1,
                team_2,
            );
            planned.bye_winner = match (team_1, team_2) {
                (PlannedSlot::Team(t), PlannedSlot::Bye)
                | (PlannedSlot::Bye, PlannedSlot::Team(t)) => Some(t),
                _ => None,
            };
            planned
        })
        .collect();

    let mut in_round = matches.len() as u32;
    for round in 2..=total_rounds {
        in_round /= 2;
        for j in 1..=in_round {
            matches.push(PlannedMatch::new(
                MatchKey::new(round_of(round), j),
                phase(round),
                PlannedSlot::WinnerOf(MatchKey::new(round_of(round - 1), 2 * j - 1)),
                PlannedSlot::WinnerOf(MatchKey::new(round_of(round - 1), 2 * j)),
            ));
        }
    }
    matches
}

/// Round-one pairs after bye distribution.
fn first_round_with_byes(teams: &[TeamId]) -> Vec<(PlannedSlot, PlannedSlot)> {
    let bracket_size = 1usize << rounds_for(teams.len());
    distribute_byes(teams, bracket_size)
        .chunks(2)
        .map(|pair| {
            let slot = |t: Option<TeamId>| t.map_or(PlannedSlot::Bye, PlannedSlot::Team);
            (slot(pair[0]), slot(pair[1]))
        })
        .collect()
}

/// Single elimination over seed-ordered teams.
pub fn single_elimination(teams: &[TeamId]) -> BracketPlan {
    BracketPlan {
        matches: knockout(first_round_with_byes(teams), Round::Upper),
        ..Default::default()
    }
}

/// Lower-bracket round that receives the loser of upper round `upper_round`.
///
/// Round-one losers start the lower bracket; the loser of upper round r ≥ 2
/// enters the even lower round 2(r - 1). Without a lower bracket (a single
/// upper round) the loser goes straight to the grand final.
pub fn loser_destination(upper_round: u32, upper_rounds: u32) -> Round {
    if upper_rounds < 2 {
        Round::GrandFinal
    } else if upper_round <= 1 {
        Round::Lower(1)
    } else {
        Round::Lower(2 * (upper_round - 1))
    }
}

/// Double elimination: upper bracket, lower bracket and grand final.
pub fn double_elimination(teams: &[TeamId]) -> BracketPlan {
    let upper_rounds = rounds_for(teams.len());
    let bracket_size = 1u32 << upper_rounds;
    let mut matches = knockout(first_round_with_byes(teams), Round::Upper);

    // Upper byes produce no loser, so lower round one only has a slot per
    // real loser and its trailing empty matches are never created.
    let round_one_losers = (teams.len() as u32).saturating_sub(bracket_size / 2);
    let lower_rounds = 2 * (upper_rounds - 1);
    for k in 1..=lower_rounds {
        let in_round = bracket_size >> (k.div_ceil(2) + 1);
        for j in 1..=in_round {
            let (team_1, team_2) = if k == 1 {
                match round_one_losers.saturating_sub(2 * (j - 1)) {
                    0 => continue,
                    1 => (PlannedSlot::Open, PlannedSlot::Bye),
                    _ => (PlannedSlot::Open, PlannedSlot::Open),
                }
            } else if k % 2 == 0 {
                // Survivor of the previous lower round meets a dropped upper loser.
                let survivor = if k == 2 && 2 * j - 1 > round_one_losers {
                    PlannedSlot::Bye
                } else {
                    PlannedSlot::WinnerOf(MatchKey::new(Round::Lower(k - 1), j))
                };
                (survivor, PlannedSlot::Open)
            } else {
                (
                    PlannedSlot::WinnerOf(MatchKey::new(Round::Lower(k - 1), 2 * j - 1)),
                    PlannedSlot::WinnerOf(MatchKey::new(Round::Lower(k - 1), 2 * j)),
                )
            };
            matches.push(PlannedMatch::new(
                MatchKey::new(Round::Lower(k), j),
                PhaseType::LowerBracket,
                team_1,
                team_2,
            ));
        }
    }

    let lower_champion = if lower_rounds > 0 {
        PlannedSlot::WinnerOf(MatchKey::new(Round::Lower(lower_rounds), 1))
    } else {
        PlannedSlot::Open
    };
    matches.push(PlannedMatch::new(
        MatchKey::new(Round::GrandFinal, 1),
        PhaseType::GrandFinal,
        PlannedSlot::WinnerOf(MatchKey::new(Round::Upper(upper_rounds), 1)),
        lower_champion,
    ));

    BracketPlan {
        matches,
        ..Default::default()
    }
}

/// Both sides of a group pairing and the zone it belongs to.
type GroupPairing = (PlannedSlot, PlannedSlot, Option<ZoneId>);

/// Circle-method rounds over `teams`, numbered from 1 as group rounds.
fn rotation(
    teams: &[TeamId],
    max_rounds: usize,
    zone_id: Option<ZoneId>,
) -> Vec<Vec<GroupPairing>> {
    circle_pairings(teams.len(), max_rounds)
        .into_iter()
        .map(|round| {
            round
                .into_iter()
                .map(|(a, b)| (PlannedSlot::Team(teams[a]), PlannedSlot::Team(teams[b]), zone_id))
                .collect()
        })
        .collect()
}

/// Number group rounds: match numbers run across all pairings of a round.
fn number_group_rounds(rounds: Vec<Vec<GroupPairing>>) -> Vec<PlannedMatch> {
    let mut matches = Vec::new();
    for (r, pairs) in rounds.into_iter().enumerate() {
        for (i, (team_1, team_2, zone_id)) in pairs.into_iter().enumerate() {
            let mut planned = PlannedMatch::new(
                MatchKey::new(Round::Group(r as u32 + 1), i as u32 + 1),
                PhaseType::GroupStage,
                team_1,
                team_2,
            );
            planned.zone_id = zone_id;
            matches.push(planned);
        }
    }
    matches
}

/// Every team meets every other team once.
pub fn round_robin(teams: &[TeamId]) -> BracketPlan {
    BracketPlan {
        matches: number_group_rounds(rotation(teams, teams.len(), None)),
        ..Default::default()
    }
}

/// Americano rotation: min(n - 1, 10) rounds of distinct pairings.
pub fn americano(teams: &[TeamId]) -> BracketPlan {
    let rounds = teams.len().saturating_sub(1).min(AMERICANO_MAX_ROUNDS);
    BracketPlan {
        matches: number_group_rounds(rotation(teams, rounds, None)),
        ..Default::default()
    }
}

/// Groups dealt in a snake, a round robin per group, and an empty playoff
/// tree for the qualifiers.
pub fn group_stage_elimination(
    tournament_id: TournamentId,
    category_id: CategoryId,
    teams: &[TeamId],
) -> BracketResult<BracketPlan> {
    let config = calculate_optimal_group_configuration(teams.len())?;
    let groups = snake_distribution(teams, &config.group_sizes);

    let mut zones = Vec::with_capacity(groups.len());
    let mut zone_teams = Vec::with_capacity(teams.len());
    let mut rounds: Vec<Vec<GroupPairing>> = Vec::new();
    for (index, members) in groups.iter().enumerate() {
        let zone = Zone::new(tournament_id, category_id, index);
        zone_teams.extend(members.iter().map(|&team| ZoneTeam::new(zone.id, team)));
        for (r, pairs) in rotation(members, members.len(), Some(zone.id)).into_iter().enumerate() {
            if rounds.len() <= r {
                rounds.push(Vec::new());
            }
            rounds[r].extend(pairs);
        }
        zones.push(zone);
    }

    let mut matches = number_group_rounds(rounds);
    let open_pairs = vec![(PlannedSlot::Open, PlannedSlot::Open); config.total_qualified / 2];
    matches.extend(knockout(open_pairs, Round::Playoff));

    Ok(BracketPlan {
        matches,
        zones,
        zone_teams,
        group_configuration: Some(config),
    })
}

/// Turn a plan into match rows.
///
/// Matches are created in (round, number) order, so every `WinnerOf` edge
/// resolves to an id assigned earlier. Bye walkovers are decided here and
/// their winners already sit in the next round.
pub fn materialize(
    tournament_id: TournamentId,
    category_id: CategoryId,
    plan: BracketPlan,
) -> BracketResult<BracketSkeleton> {
    let mut planned = plan.matches;
    planned.sort_by_key(|p| p.key);

    let mut ids: HashMap<MatchKey, MatchId> = HashMap::with_capacity(planned.len());
    let mut matches: Vec<Match> = Vec::with_capacity(planned.len());
    for p in planned {
        let resolve = |slot: PlannedSlot| -> BracketResult<Slot> {
            Ok(match slot {
                PlannedSlot::Team(team) => Slot::seeded(team),
                PlannedSlot::Open => Slot::open(),
                PlannedSlot::Bye => Slot::bye(),
                PlannedSlot::WinnerOf(key) => Slot::fed_by(
                    *ids.get(&key)
                        .ok_or_else(|| BracketError::UnresolvedEdge(key.to_string()))?,
                ),
            })
        };
        let team_1 = resolve(p.team_1)?;
        let team_2 = resolve(p.team_2)?;
        let id = Uuid::new_v4();
        if ids.insert(p.key, id).is_some() {
            return Err(BracketError::UnresolvedEdge(format!("duplicate {}", p.key)));
        }
        matches.push(Match {
            id,
            tournament_id,
            category_id,
            round: p.key.round,
            match_number: p.key.number,
            phase: p.phase,
            team_1,
            team_2,
            status: if p.bye_winner.is_some() {
                MatchStatus::Walkover
            } else {
                MatchStatus::Scheduled
            },
            winner: p.bye_winner,
            zone_id: p.zone_id,
            sets: Vec::new(),
            version: 0,
        });
    }

    let byes: Vec<(MatchId, TeamId)> = matches
        .iter()
        .filter_map(|m| m.winner.map(|w| (m.id, w)))
        .collect();
    for (source, winner) in byes {
        for m in matches.iter_mut() {
            for slot in [&mut m.team_1, &mut m.team_2] {
                if slot.from_match == Some(source) && slot.team_id.is_none() {
                    slot.team_id = Some(winner);
                }
            }
        }
    }

    Ok(BracketSkeleton {
        matches,
        zones: plan.zones,
        zone_teams: plan.zone_teams,
    })
}
