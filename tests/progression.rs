//! Integration tests for result recording and winner/loser propagation.

mod common;

use common::{straight_sets, Fixture};
use padel_bracket::{
    cancel_match, clear_match_result, generate_bracket, progress_winner, record_match_result,
    start_match, unprogress, BracketError, BracketFormat, BracketStore, ErrorKind, MatchResult,
    MatchStatus, Round, SetScore, Side, StoreError, TeamId,
};
use std::collections::HashSet;
use std::thread;

fn single_elimination(n: usize) -> Fixture {
    let f = Fixture::new(BracketFormat::SingleElimination, n);
    generate_bracket(&f.store, f.tournament_id, f.category_id).unwrap();
    f
}

fn double_elimination(n: usize) -> Fixture {
    let f = Fixture::new(BracketFormat::DoubleElimination, n);
    generate_bracket(&f.store, f.tournament_id, f.category_id).unwrap();
    f
}

fn played(team_1_wins: bool) -> MatchResult {
    MatchResult::Played {
        sets: straight_sets(team_1_wins),
    }
}

/// Play every match that is ready, side one always winning, until none are left.
fn play_out(f: &Fixture) {
    for _ in 0..4 * f.teams.len() {
        let ready: Vec<_> = f
            .matches()
            .into_iter()
            .filter(|m| m.status == MatchStatus::Scheduled && m.has_both_teams())
            .collect();
        if ready.is_empty() {
            return;
        }
        for m in ready {
            record_match_result(&f.store, m.id, played(true)).unwrap();
        }
    }
}

#[test]
fn result_advances_winner() {
    let f = single_elimination(4);
    let semi = f.match_at(Round::Upper(1), 1);
    let saved = record_match_result(&f.store, semi.id, played(true)).unwrap();
    assert_eq!(saved.status, MatchStatus::Completed);
    assert_eq!(saved.winner, Some(f.teams[0].id));
    assert_eq!(saved.sets_won(), (2, 0));

    let final_match = f.match_at(Round::Upper(2), 1);
    assert_eq!(final_match.team_1.team_id, Some(f.teams[0].id));
    assert!(final_match.team_2.is_empty());
}

#[test]
fn progress_is_idempotent() {
    let f = single_elimination(4);
    let semi = f.match_at(Round::Upper(1), 1);
    let (winner, loser) = (f.teams[0].id, f.teams[1].id);

    let first = progress_winner(&f.store, semi.id, winner, Some(loser)).unwrap();
    assert_eq!(first.winner_slots.len(), 1);
    assert_eq!(first.winner_slots[0].side, Side::One);
    let final_before = f.match_at(Round::Upper(2), 1);

    let second = progress_winner(&f.store, semi.id, winner, Some(loser)).unwrap();
    assert!(second.winner_slots.is_empty());
    assert!(second.missing.is_empty());
    assert_eq!(f.match_at(Round::Upper(2), 1), final_before);
}

#[test]
fn unprogress_restores_the_empty_slot() {
    let f = single_elimination(4);
    let semi = f.match_at(Round::Upper(1), 2);
    let winner = f.teams[3].id;
    progress_winner(&f.store, semi.id, winner, Some(f.teams[2].id)).unwrap();
    assert_eq!(f.match_at(Round::Upper(2), 1).team_2.team_id, Some(winner));

    let report = unprogress(&f.store, semi.id, Some(winner)).unwrap();
    assert_eq!(report.winner_slots.len(), 1);
    let final_match = f.match_at(Round::Upper(2), 1);
    assert!(final_match.team_2.is_empty());
    assert_eq!(final_match.team_2.from_match, Some(semi.id));

    progress_winner(&f.store, semi.id, winner, None).unwrap();
    assert_eq!(f.match_at(Round::Upper(2), 1).team_2.team_id, Some(winner));
}

#[test]
fn final_has_no_successor() {
    let f = single_elimination(2);
    let final_match = f.match_at(Round::Upper(1), 1);
    let report =
        progress_winner(&f.store, final_match.id, f.teams[0].id, Some(f.teams[1].id)).unwrap();
    assert!(report.winner_slots.is_empty());
    assert!(report.missing.is_empty());
    assert!(report.loser_slot.is_none());
}

#[test]
fn correction_reroutes_the_new_winner() {
    let f = single_elimination(4);
    let semi = f.match_at(Round::Upper(1), 1);
    record_match_result(&f.store, semi.id, played(true)).unwrap();
    let corrected = record_match_result(&f.store, semi.id, played(false)).unwrap();
    assert_eq!(corrected.winner, Some(f.teams[1].id));
    assert_eq!(f.match_at(Round::Upper(2), 1).team_1.team_id, Some(f.teams[1].id));
}

#[test]
fn correction_is_refused_once_downstream_is_played() {
    let f = single_elimination(4);
    let semi_1 = f.match_at(Round::Upper(1), 1);
    let semi_2 = f.match_at(Round::Upper(1), 2);
    record_match_result(&f.store, semi_1.id, played(true)).unwrap();
    record_match_result(&f.store, semi_2.id, played(true)).unwrap();
    let final_match = f.match_at(Round::Upper(2), 1);
    record_match_result(&f.store, final_match.id, played(true)).unwrap();

    let err = record_match_result(&f.store, semi_1.id, played(false)).unwrap_err();
    assert!(matches!(err, BracketError::DownstreamPlayed(id) if id == final_match.id));
    assert_eq!(f.reload(semi_1.id).winner, Some(f.teams[0].id));
    assert_eq!(f.reload(final_match.id).team_1.team_id, Some(f.teams[0].id));
}

#[test]
fn correction_is_refused_once_downstream_has_started() {
    let f = single_elimination(4);
    let semi_1 = f.match_at(Round::Upper(1), 1);
    record_match_result(&f.store, semi_1.id, played(true)).unwrap();
    record_match_result(&f.store, f.match_at(Round::Upper(1), 2).id, played(true)).unwrap();
    let final_match = f.match_at(Round::Upper(2), 1);
    start_match(&f.store, final_match.id).unwrap();

    let err = record_match_result(&f.store, semi_1.id, played(false)).unwrap_err();
    assert!(matches!(err, BracketError::DownstreamPlayed(id) if id == final_match.id));
    assert_eq!(err.kind(), ErrorKind::State);
    assert!(matches!(
        unprogress(&f.store, semi_1.id, None),
        Err(BracketError::DownstreamPlayed(_))
    ));
    let final_match = f.reload(final_match.id);
    assert_eq!(final_match.status, MatchStatus::InProgress);
    assert_eq!(final_match.team_1.team_id, Some(f.teams[0].id));
}

#[test]
fn clearing_a_result_reverses_it() {
    let f = single_elimination(4);
    let semi = f.match_at(Round::Upper(1), 1);
    record_match_result(&f.store, semi.id, played(true)).unwrap();

    let cleared = clear_match_result(&f.store, semi.id).unwrap();
    assert_eq!(cleared.status, MatchStatus::Scheduled);
    assert!(cleared.winner.is_none());
    assert!(cleared.sets.is_empty());
    assert!(f.match_at(Round::Upper(2), 1).team_1.is_empty());
}

#[test]
fn byes_have_no_result_to_change() {
    let f = single_elimination(3);
    let bye = f
        .in_round(Round::Upper(1))
        .into_iter()
        .find(|m| m.is_bye())
        .unwrap();
    let final_before = f.match_at(Round::Upper(2), 1);

    let err = clear_match_result(&f.store, bye.id).unwrap_err();
    assert!(matches!(err, BracketError::ByeMatch(id) if id == bye.id));
    assert_eq!(err.kind(), ErrorKind::State);
    let winner = bye.winner.unwrap();
    assert!(matches!(
        record_match_result(&f.store, bye.id, MatchResult::Walkover { winner }),
        Err(BracketError::ByeMatch(_))
    ));

    assert_eq!(f.reload(bye.id), bye);
    assert_eq!(f.match_at(Round::Upper(2), 1), final_before);
}

#[test]
fn level_sets_are_rejected() {
    let f = single_elimination(4);
    let semi = f.match_at(Round::Upper(1), 1);
    let result = MatchResult::Played {
        sets: vec![SetScore::new(6, 3), SetScore::new(3, 6)],
    };
    assert!(matches!(
        record_match_result(&f.store, semi.id, result),
        Err(BracketError::InvalidResult(_))
    ));
    assert!(matches!(
        record_match_result(&f.store, semi.id, MatchResult::Played { sets: vec![] }),
        Err(BracketError::InvalidResult(_))
    ));
    assert_eq!(f.reload(semi.id).status, MatchStatus::Scheduled);
}

#[test]
fn result_needs_both_teams() {
    let f = single_elimination(4);
    let final_match = f.match_at(Round::Upper(2), 1);
    assert!(matches!(
        record_match_result(&f.store, final_match.id, played(true)),
        Err(BracketError::InvalidResult(_))
    ));
}

#[test]
fn walkover_result() {
    let f = single_elimination(4);
    let semi = f.match_at(Round::Upper(1), 2);
    let outsider = f.teams[0].id;
    assert!(matches!(
        record_match_result(&f.store, semi.id, MatchResult::Walkover { winner: outsider }),
        Err(BracketError::InvalidResult(_))
    ));

    let saved = record_match_result(
        &f.store,
        semi.id,
        MatchResult::Walkover {
            winner: f.teams[3].id,
        },
    )
    .unwrap();
    assert_eq!(saved.status, MatchStatus::Walkover);
    assert!(saved.sets.is_empty());
    assert_eq!(f.match_at(Round::Upper(2), 1).team_2.team_id, Some(f.teams[3].id));
}

#[test]
fn status_transitions() {
    let f = single_elimination(4);
    let final_match = f.match_at(Round::Upper(2), 1);
    assert!(matches!(
        start_match(&f.store, final_match.id),
        Err(BracketError::InvalidResult(_))
    ));

    let semi = f.match_at(Round::Upper(1), 1);
    assert_eq!(start_match(&f.store, semi.id).unwrap().status, MatchStatus::InProgress);
    assert!(matches!(
        start_match(&f.store, semi.id),
        Err(BracketError::InvalidTransition { .. })
    ));
    record_match_result(&f.store, semi.id, played(true)).unwrap();
    assert!(matches!(
        cancel_match(&f.store, semi.id),
        Err(BracketError::InvalidTransition { .. })
    ));

    let other = f.match_at(Round::Upper(1), 2);
    assert_eq!(cancel_match(&f.store, other.id).unwrap().status, MatchStatus::Cancelled);
    assert!(matches!(
        record_match_result(&f.store, other.id, played(true)),
        Err(BracketError::InvalidTransition {
            from: MatchStatus::Cancelled,
            to: MatchStatus::Completed
        })
    ));
}

#[test]
fn stale_writes_conflict() {
    let f = single_elimination(4);
    let stale = f.match_at(Round::Upper(1), 1);
    start_match(&f.store, stale.id).unwrap();
    assert!(matches!(
        f.store.save_match(&stale),
        Err(StoreError::Conflict { expected: 0, found: 1, .. })
    ));
}

#[test]
fn unknown_match() {
    let f = single_elimination(4);
    let id = uuid::Uuid::new_v4();
    assert!(matches!(
        record_match_result(&f.store, id, played(true)),
        Err(BracketError::MatchNotFound(_))
    ));
}

#[test]
fn sibling_results_progress_concurrently() {
    for _ in 0..50 {
        let f = single_elimination(4);
        let semi_1 = f.match_at(Round::Upper(1), 1);
        let semi_2 = f.match_at(Round::Upper(1), 2);
        thread::scope(|s| {
            s.spawn(|| record_match_result(&f.store, semi_1.id, played(true)).unwrap());
            s.spawn(|| record_match_result(&f.store, semi_2.id, played(false)).unwrap());
        });
        let final_match = f.match_at(Round::Upper(2), 1);
        assert_eq!(final_match.team_1.team_id, semi_1.team_1.team_id);
        assert_eq!(final_match.team_2.team_id, semi_2.team_2.team_id);
    }
}

#[test]
fn concurrent_losers_take_distinct_lower_slots() {
    for _ in 0..20 {
        let f = double_elimination(8);
        let first_round = f.in_round(Round::Upper(1));
        thread::scope(|s| {
            for m in &first_round {
                let store = &f.store;
                s.spawn(move || record_match_result(store, m.id, played(true)).unwrap());
            }
        });
        let expected: HashSet<TeamId> =
            first_round.iter().filter_map(|m| m.team_2.team_id).collect();
        let placed: HashSet<TeamId> = f
            .in_round(Round::Lower(1))
            .iter()
            .flat_map(|m| [m.team_1.team_id, m.team_2.team_id])
            .flatten()
            .collect();
        assert_eq!(placed, expected);
        assert_eq!(placed.len(), 4);
    }
}

#[test]
fn double_elimination_routes_losers() {
    let f = double_elimination(4);
    let t = f.team_ids();

    let upper_1 = f.match_at(Round::Upper(1), 1);
    record_match_result(&f.store, upper_1.id, played(true)).unwrap();
    let lower_1 = f.match_at(Round::Lower(1), 1);
    assert_eq!(lower_1.team_1.team_id, Some(t[1]));

    record_match_result(&f.store, f.match_at(Round::Upper(1), 2).id, played(true)).unwrap();
    assert_eq!(f.match_at(Round::Lower(1), 1).team_2.team_id, Some(t[3]));

    // Upper final: loser drops into the open slot of lower round two.
    record_match_result(&f.store, f.match_at(Round::Upper(2), 1).id, played(true)).unwrap();
    let lower_2 = f.match_at(Round::Lower(2), 1);
    assert!(lower_2.team_1.is_empty());
    assert_eq!(lower_2.team_2.team_id, Some(t[2]));

    record_match_result(&f.store, lower_1.id, played(true)).unwrap();
    assert_eq!(f.match_at(Round::Lower(2), 1).team_1.team_id, Some(t[1]));

    record_match_result(&f.store, lower_2.id, played(false)).unwrap();
    let grand_final = f.match_at(Round::GrandFinal, 1);
    assert_eq!(grand_final.team_1.team_id, Some(t[0]));
    assert_eq!(grand_final.team_2.team_id, Some(t[2]));
}

#[test]
fn double_elimination_correction_moves_the_loser() {
    let f = double_elimination(4);
    let t = f.team_ids();
    let upper_1 = f.match_at(Round::Upper(1), 1);

    record_match_result(&f.store, upper_1.id, played(true)).unwrap();
    record_match_result(&f.store, upper_1.id, played(false)).unwrap();

    assert_eq!(f.match_at(Round::Upper(2), 1).team_1.team_id, Some(t[1]));
    let lower_1 = f.match_at(Round::Lower(1), 1);
    assert_eq!(lower_1.team_1.team_id, Some(t[0]));
    assert!(lower_1.team_2.is_empty());
}

#[test]
fn double_elimination_unprogress_restores_the_loser_slot() {
    let f = double_elimination(4);
    let t = f.team_ids();
    let upper_1 = f.match_at(Round::Upper(1), 1);
    record_match_result(&f.store, upper_1.id, played(true)).unwrap();

    let report = unprogress(&f.store, upper_1.id, None).unwrap();
    assert_eq!(report.winner_slots.len(), 1);
    let lower_1 = f.match_at(Round::Lower(1), 1);
    assert_eq!(report.loser_slot.map(|slot| slot.match_id), Some(lower_1.id));
    assert!(lower_1.team_1.is_open_and_empty());
    assert!(f.match_at(Round::Upper(2), 1).team_1.is_empty());

    progress_winner(&f.store, upper_1.id, t[0], Some(t[1])).unwrap();
    assert_eq!(f.match_at(Round::Lower(1), 1).team_1.team_id, Some(t[1]));
    assert_eq!(f.match_at(Round::Upper(2), 1).team_1.team_id, Some(t[0]));
}

#[test]
fn lone_lower_team_advances_past_a_bye() {
    let f = double_elimination(3);
    let played_first = f
        .in_round(Round::Upper(1))
        .into_iter()
        .find(|m| m.has_both_teams())
        .unwrap();
    let loser = played_first.team_2.team_id.unwrap();
    assert_eq!(f.in_round(Round::Lower(1)).len(), 1);

    let winner = played_first.team_1.team_id.unwrap();
    let report = progress_winner(&f.store, played_first.id, winner, Some(loser)).unwrap();
    let lower_1 = f.match_at(Round::Lower(1), 1);
    assert_eq!(report.walkovers, vec![lower_1.id]);
    assert_eq!(lower_1.status, MatchStatus::Walkover);
    assert_eq!(lower_1.winner, Some(loser));
    assert_eq!(f.match_at(Round::Lower(2), 1).team_1.team_id, Some(loser));

    // Reversal reopens the walkover and empties what it fed.
    let report = unprogress(&f.store, played_first.id, Some(winner)).unwrap();
    assert_eq!(report.walkovers, vec![lower_1.id]);
    let lower_1 = f.reload(lower_1.id);
    assert_eq!(lower_1.status, MatchStatus::Scheduled);
    assert!(lower_1.winner.is_none());
    assert!(lower_1.team_1.is_empty());
    assert!(f.match_at(Round::Lower(2), 1).team_1.is_empty());
}

#[test]
fn correction_reopens_a_lower_walkover() {
    let f = double_elimination(6);
    let playable: Vec<_> = f
        .in_round(Round::Upper(1))
        .into_iter()
        .filter(|m| m.has_both_teams())
        .collect();
    assert_eq!(playable.len(), 2);
    for m in &playable {
        record_match_result(&f.store, m.id, played(true)).unwrap();
    }
    // Lower round two: the first match waits for a lower winner, the second
    // only ever gets one upper loser.
    record_match_result(&f.store, f.match_at(Round::Upper(2), 1).id, played(true)).unwrap();
    let upper_2 = f.match_at(Round::Upper(2), 2);
    record_match_result(&f.store, upper_2.id, played(true)).unwrap();
    let bye_lower = f.match_at(Round::Lower(2), 2);
    assert!(bye_lower.team_1.bye);
    assert_eq!(bye_lower.status, MatchStatus::Walkover);
    assert_eq!(bye_lower.winner, upper_2.team_2.team_id);

    record_match_result(&f.store, upper_2.id, played(false)).unwrap();
    let bye_lower = f.match_at(Round::Lower(2), 2);
    assert_eq!(bye_lower.status, MatchStatus::Walkover);
    assert_eq!(bye_lower.team_2.team_id, upper_2.team_1.team_id);
    assert_eq!(bye_lower.winner, upper_2.team_1.team_id);
    assert_eq!(f.match_at(Round::Lower(3), 1).team_2.team_id, upper_2.team_1.team_id);
}

#[test]
fn double_elimination_with_byes_plays_to_the_grand_final() {
    for n in [3, 5, 6] {
        let f = double_elimination(n);
        play_out(&f);
        let grand_final = f.match_at(Round::GrandFinal, 1);
        assert_eq!(grand_final.status, MatchStatus::Completed, "{n} teams");
        assert!(grand_final.winner.is_some());
        assert!(f.matches().iter().all(|m| m.status.is_decided()), "{n} teams");
    }
}

#[test]
fn every_double_elimination_size_finishes() {
    for n in 2..=17 {
        let f = double_elimination(n);
        play_out(&f);
        let matches = f.matches();
        assert!(matches.iter().all(|m| m.status.is_decided()), "{n} teams");
        // The upper champion never loses; everyone else goes out after two losses.
        let completed = matches
            .iter()
            .filter(|m| m.status == MatchStatus::Completed)
            .count();
        assert_eq!(completed, 2 * (n - 1), "{n} teams");
        assert_eq!(f.match_at(Round::GrandFinal, 1).status, MatchStatus::Completed);
    }
}

#[test]
fn two_team_double_elimination_sends_loser_to_grand_final() {
    let f = double_elimination(2);
    record_match_result(&f.store, f.match_at(Round::Upper(1), 1).id, played(false)).unwrap();
    let grand_final = f.match_at(Round::GrandFinal, 1);
    assert_eq!(grand_final.team_1.team_id, Some(f.teams[1].id));
    assert_eq!(grand_final.team_2.team_id, Some(f.teams[0].id));
}

#[test]
fn round_robin_results_do_not_propagate() {
    let f = Fixture::new(BracketFormat::RoundRobin, 4);
    generate_bracket(&f.store, f.tournament_id, f.category_id).unwrap();
    let before = f.matches();
    let first = &before[0];
    record_match_result(&f.store, first.id, played(true)).unwrap();
    record_match_result(&f.store, first.id, played(false)).unwrap();

    let after = f.matches();
    for (b, a) in before.iter().zip(&after).skip(1) {
        assert_eq!(b, a);
    }
    assert_eq!(after[0].winner, first.team_2.team_id);
}
