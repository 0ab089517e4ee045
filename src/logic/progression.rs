//! Winner/loser propagation between matches, its reversal, and the result
//! recording that drives it.

use crate::logic::topology::loser_destination;
use crate::models::{
    BracketError, BracketResult, Match, MatchId, MatchStatus, Round, SetScore, Side, TeamId,
};
use crate::store::BracketStore;
use serde::{Deserialize, Serialize};

/// A slot of a specific match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct SlotRef {
    pub match_id: MatchId,
    pub side: Side,
}

/// What a progression (or its reversal) changed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ProgressionReport {
    /// Winner slots filled, or cleared by `unprogress`.
    pub winner_slots: Vec<SlotRef>,
    /// Where the loser was routed (or removed from).
    pub loser_slot: Option<SlotRef>,
    /// Matches decided (or reopened) because their other slot is a bye.
    pub walkovers: Vec<MatchId>,
    /// Downstream targets that should exist but were not found.
    pub missing: Vec<String>,
}

/// Result submitted for a match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchResult {
    /// Played to completion; the side with more sets wins.
    Played { sets: Vec<SetScore> },
    /// Awarded without play.
    Walkover { winner: TeamId },
}

fn load_match<S: BracketStore + ?Sized>(store: &S, match_id: MatchId) -> BracketResult<Match> {
    store
        .find_match(match_id)?
        .ok_or(BracketError::MatchNotFound(match_id))
}

/// Whether a match in `round` should feed some later match of `matches`.
fn expects_successor(round: Round, matches: &[Match]) -> bool {
    let exists = |wanted: Round| matches.iter().any(|m| m.round == wanted);
    match round {
        Round::Group(_) | Round::GrandFinal => false,
        Round::Playoff(n) => exists(Round::Playoff(n + 1)),
        Round::Upper(n) => exists(Round::Upper(n + 1)) || exists(Round::GrandFinal),
        Round::Lower(n) => exists(Round::Lower(n + 1)) || exists(Round::GrandFinal),
    }
}

/// Target round for the loser of `source`, when the category has a lower
/// bracket to drop into.
fn loser_round(source: &Match, matches: &[Match]) -> Option<Round> {
    let Round::Upper(round) = source.round else {
        return None;
    };
    if !matches.iter().any(|m| m.round == Round::GrandFinal) {
        return None;
    }
    let upper_rounds = matches
        .iter()
        .filter_map(|m| match m.round {
            Round::Upper(n) => Some(n),
            _ => None,
        })
        .max()
        .unwrap_or(round);
    Some(loser_destination(round, upper_rounds))
}

/// Advance `winner_id` out of `match_id`, and in double elimination drop
/// `loser_id` into the lower bracket.
///
/// Only empty slots are written, and each write is conditional on the slot
/// still being empty, so calling this twice changes nothing the second time.
/// A team that lands opposite a bye is walked over and advanced in turn.
pub fn progress_winner<S: BracketStore + ?Sized>(
    store: &S,
    match_id: MatchId,
    winner_id: TeamId,
    loser_id: Option<TeamId>,
) -> BracketResult<ProgressionReport> {
    let source = load_match(store, match_id)?;
    let matches = store.matches(source.tournament_id, source.category_id)?;
    let mut report = ProgressionReport::default();

    let mut edges = 0;
    for m in &matches {
        for side in Side::BOTH {
            let slot = m.slot(side);
            if slot.from_match != Some(match_id) {
                continue;
            }
            edges += 1;
            if slot.team_id.is_some() {
                log::debug!("Slot {:?} of match {} already filled, leaving it", side, m.id);
                continue;
            }
            if store.fill_slot_if_empty(m.id, side, winner_id)? {
                log::debug!(
                    "Advanced team {} from match {} into match {}",
                    winner_id,
                    match_id,
                    m.id
                );
                report.winner_slots.push(SlotRef { match_id: m.id, side });
            }
        }
    }
    if edges == 0 && expects_successor(source.round, &matches) {
        log::warn!("No downstream match found for winner of match {}", match_id);
        report.missing.push(format!("winner of match {}", match_id));
    }

    if let (Some(loser), Some(target)) = (loser_id, loser_round(&source, &matches)) {
        let already_placed = matches
            .iter()
            .filter(|m| m.round == target)
            .any(|m| Side::BOTH.into_iter().any(|side| {
                let slot = m.slot(side);
                slot.from_match.is_none() && slot.team_id == Some(loser)
            }));
        if !already_placed {
            let mut placed = None;
            'candidates: for m in matches.iter().filter(|m| m.round == target) {
                for side in Side::BOTH {
                    // A lost race leaves the slot taken; try the next one.
                    if m.slot(side).is_open_and_empty()
                        && store.fill_slot_if_empty(m.id, side, loser)?
                    {
                        placed = Some(SlotRef { match_id: m.id, side });
                        break 'candidates;
                    }
                }
            }
            match placed {
                Some(slot) => {
                    log::debug!("Dropped team {} into {:?} match {}", loser, target, slot.match_id);
                    report.loser_slot = Some(slot);
                }
                None => {
                    log::warn!(
                        "No open lower-bracket slot in {:?} for loser of match {}",
                        target,
                        match_id
                    );
                    report.missing.push(format!("loser of match {}", match_id));
                }
            }
        }
    }

    let filled: Vec<MatchId> = report
        .winner_slots
        .iter()
        .chain(&report.loser_slot)
        .map(|slot| slot.match_id)
        .collect();
    for target in filled {
        advance_lone_team(store, target, &mut report)?;
    }
    Ok(report)
}

/// Whether `m` was decided by its bye slot in favour of the team facing it.
fn advanced_unplayed(m: &Match) -> bool {
    m.status == MatchStatus::Walkover && m.lone_team().is_some_and(|t| m.winner == Some(t))
}

/// Walk over a scheduled match whose only team faces a bye, and progress it.
fn advance_lone_team<S: BracketStore + ?Sized>(
    store: &S,
    match_id: MatchId,
    report: &mut ProgressionReport,
) -> BracketResult<()> {
    let mut m = load_match(store, match_id)?;
    let Some(team) = m.lone_team() else {
        return Ok(());
    };
    if m.status != MatchStatus::Scheduled {
        return Ok(());
    }
    m.status = MatchStatus::Walkover;
    m.winner = Some(team);
    let saved = store.save_match(&m)?;
    log::debug!("Team {} advances unplayed from match {}", team, saved.id);
    report.walkovers.push(saved.id);

    let nested = progress_winner(store, saved.id, team, None)?;
    report.walkovers.extend(nested.walkovers);
    report.missing.extend(nested.missing);
    Ok(())
}

/// Slots downstream of a source match that hold its winner or its loser.
struct Downstream<'a> {
    winner_slots: Vec<(&'a Match, Side)>,
    loser_slot: Option<(&'a Match, Side, TeamId)>,
}

impl<'a> Downstream<'a> {
    fn find(source: &Match, winner: TeamId, matches: &'a [Match]) -> Self {
        let mut winner_slots = Vec::new();
        for m in matches {
            for side in Side::BOTH {
                let slot = m.slot(side);
                if slot.from_match == Some(source.id) && slot.team_id == Some(winner) {
                    winner_slots.push((m, side));
                }
            }
        }

        let loser_slot = match (source.opponent_of(winner), loser_round(source, matches)) {
            (Some(loser), Some(target)) => matches
                .iter()
                .filter(|m| m.round == target)
                .find_map(|m| {
                    Side::BOTH.into_iter().find_map(|side| {
                        let slot = m.slot(side);
                        (slot.from_match.is_none() && slot.team_id == Some(loser))
                            .then_some((m, side, loser))
                    })
                }),
            _ => None,
        };
        Self {
            winner_slots,
            loser_slot,
        }
    }

    fn touched(&self) -> impl Iterator<Item = &'a Match> + '_ {
        self.winner_slots
            .iter()
            .map(|&(m, _)| m)
            .chain(self.loser_slot.iter().map(|&(m, _, _)| m))
    }
}

/// First match that stops the progression of `source` from being reversed.
///
/// Walkovers against a bye are looked through, since they reopen along with
/// their source.
fn reversal_blocker(source: &Match, winner: TeamId, matches: &[Match]) -> Option<MatchId> {
    let next = Downstream::find(source, winner, matches);
    let blocker = next.touched().find_map(|m| {
        if advanced_unplayed(m) {
            m.winner.and_then(|w| reversal_blocker(m, w, matches))
        } else if m.status.is_terminal() || m.status == MatchStatus::InProgress {
            Some(m.id)
        } else {
            None
        }
    });
    blocker
}

/// Undo [`progress_winner`] for `match_id`.
///
/// `winner_id` defaults to the recorded winner; the loser is the other team of
/// the match. Refuses if a match holding either team downstream has started
/// or finished. Walkovers that only happened because of a bye are reopened.
pub fn unprogress<S: BracketStore + ?Sized>(
    store: &S,
    match_id: MatchId,
    winner_id: Option<TeamId>,
) -> BracketResult<ProgressionReport> {
    let source = load_match(store, match_id)?;
    let mut report = ProgressionReport::default();
    let Some(winner) = winner_id.or(source.winner) else {
        return Ok(report);
    };
    let matches = store.matches(source.tournament_id, source.category_id)?;
    if let Some(blocker) = reversal_blocker(&source, winner, &matches) {
        return Err(BracketError::DownstreamPlayed(blocker));
    }

    let next = Downstream::find(&source, winner, &matches);
    for m in next.touched().filter(|m| advanced_unplayed(m)) {
        reopen(store, m, &mut report)?;
    }
    for &(m, side) in &next.winner_slots {
        if store.clear_slot_if_holds(m.id, side, winner)? {
            report.winner_slots.push(SlotRef { match_id: m.id, side });
        }
    }
    if let Some((m, side, loser)) = next.loser_slot {
        if store.clear_slot_if_holds(m.id, side, loser)? {
            report.loser_slot = Some(SlotRef { match_id: m.id, side });
        }
    }
    log::debug!("Reversed progression of match {}", match_id);
    Ok(report)
}

/// Reverse a walkover against a bye and schedule the match again.
fn reopen<S: BracketStore + ?Sized>(
    store: &S,
    m: &Match,
    report: &mut ProgressionReport,
) -> BracketResult<()> {
    let nested = unprogress(store, m.id, m.winner)?;
    report.walkovers.extend(nested.walkovers);

    let mut fresh = load_match(store, m.id)?;
    fresh.status = MatchStatus::Scheduled;
    fresh.winner = None;
    store.save_match(&fresh)?;
    log::debug!("Reopened match {} after its only team was withdrawn", m.id);
    report.walkovers.push(m.id);
    Ok(())
}

/// Group-round matches feed standings, not other matches.
fn feeds_downstream(m: &Match) -> bool {
    m.zone_id.is_none() && !matches!(m.round, Round::Group(_))
}

/// Record a result and progress the winner.
///
/// A match that already has a result is corrected: its old progression is
/// reversed before the new one is applied.
pub fn record_match_result<S: BracketStore + ?Sized>(
    store: &S,
    match_id: MatchId,
    result: MatchResult,
) -> BracketResult<Match> {
    let mut m = load_match(store, match_id)?;
    if m.is_bye() {
        return Err(BracketError::ByeMatch(match_id));
    }
    let (Some(team_1), Some(team_2)) = (m.team_1.team_id, m.team_2.team_id) else {
        return Err(BracketError::InvalidResult(
            "both teams must be known before a result is recorded".to_string(),
        ));
    };

    let (status, winner, sets) = match result {
        MatchResult::Played { sets } => {
            if sets.is_empty() {
                return Err(BracketError::InvalidResult("no sets given".to_string()));
            }
            let scored = Match { sets, ..m.clone() };
            let (one, two) = scored.sets_won();
            let winner = match one.cmp(&two) {
                std::cmp::Ordering::Greater => team_1,
                std::cmp::Ordering::Less => team_2,
                std::cmp::Ordering::Equal => {
                    return Err(BracketError::InvalidResult(format!(
                        "sets are level at {one}-{two}"
                    )))
                }
            };
            (MatchStatus::Completed, winner, scored.sets)
        }
        MatchResult::Walkover { winner } => {
            if winner != team_1 && winner != team_2 {
                return Err(BracketError::InvalidResult(format!(
                    "team {winner} does not play in this match"
                )));
            }
            (MatchStatus::Walkover, winner, Vec::new())
        }
    };

    if m.status.is_decided() {
        if feeds_downstream(&m) {
            unprogress(store, match_id, m.winner)?;
        }
        m = load_match(store, match_id)?;
    } else if !m.status.can_transition_to(status) {
        return Err(BracketError::InvalidTransition {
            from: m.status,
            to: status,
        });
    }

    m.status = status;
    m.winner = Some(winner);
    m.sets = sets;
    let saved = store.save_match(&m)?;
    log::info!("Recorded {:?} for match {} (winner {})", status, match_id, winner);

    if feeds_downstream(&saved) {
        let loser = saved.opponent_of(winner);
        progress_winner(store, match_id, winner, loser)?;
    }
    Ok(saved)
}

/// Remove a recorded result, reversing its progression.
///
/// A bye has no result to remove and is refused.
pub fn clear_match_result<S: BracketStore + ?Sized>(
    store: &S,
    match_id: MatchId,
) -> BracketResult<Match> {
    let m = load_match(store, match_id)?;
    if m.is_bye() {
        return Err(BracketError::ByeMatch(match_id));
    }
    if m.status.is_decided() && feeds_downstream(&m) {
        unprogress(store, match_id, m.winner)?;
    }
    let mut m = load_match(store, match_id)?;
    m.status = MatchStatus::Scheduled;
    m.winner = None;
    m.sets.clear();
    let saved = store.save_match(&m)?;
    log::info!("Cleared result of match {}", match_id);
    Ok(saved)
}

fn transition<S: BracketStore + ?Sized>(
    store: &S,
    match_id: MatchId,
    next: MatchStatus,
) -> BracketResult<Match> {
    let mut m = load_match(store, match_id)?;
    if !m.status.can_transition_to(next) {
        return Err(BracketError::InvalidTransition {
            from: m.status,
            to: next,
        });
    }
    m.status = next;
    Ok(store.save_match(&m)?)
}

/// Mark a match as being played.
pub fn start_match<S: BracketStore + ?Sized>(
    store: &S,
    match_id: MatchId,
) -> BracketResult<Match> {
    let m = load_match(store, match_id)?;
    if !m.has_both_teams() {
        return Err(BracketError::InvalidResult(
            "both teams must be known before the match starts".to_string(),
        ));
    }
    transition(store, match_id, MatchStatus::InProgress)
}

/// Cancel a match that has not been decided.
pub fn cancel_match<S: BracketStore + ?Sized>(
    store: &S,
    match_id: MatchId,
) -> BracketResult<Match> {
    transition(store, match_id, MatchStatus::Cancelled)
}
