//! Shared fixtures for integration tests.
#![allow(dead_code)]

use padel_bracket::{
    BracketFormat, BracketStore, Category, CategoryId, Match, MatchId, MemoryStore, Registration,
    Round, SetScore, Team, TeamId, Tournament, TournamentId,
};

pub struct Fixture {
    pub store: MemoryStore,
    pub tournament_id: TournamentId,
    pub category_id: CategoryId,
    /// In seed order: `teams[0]` has seed 1.
    pub teams: Vec<Team>,
}

impl Fixture {
    /// Tournament with one category of `n` confirmed teams seeded 1..=n.
    pub fn new(format: BracketFormat, n: usize) -> Self {
        let store = MemoryStore::new();
        let tournament = Tournament::new("Club Open");
        let category = Category::new(tournament.id, "Mixed A", format);
        let (tournament_id, category_id) = (tournament.id, category.id);
        store.insert_tournament(tournament).unwrap();
        store.insert_category(category).unwrap();
        let teams: Vec<Team> = (0..n)
            .map(|i| {
                Team::new(
                    tournament_id,
                    category_id,
                    Registration::confirmed(format!("P{}a", i + 1)),
                    Registration::confirmed(format!("P{}b", i + 1)),
                )
                .with_seed(i as u32 + 1)
            })
            .collect();
        for t in &teams {
            store.insert_team(t.clone()).unwrap();
        }
        Self {
            store,
            tournament_id,
            category_id,
            teams,
        }
    }

    pub fn team_ids(&self) -> Vec<TeamId> {
        self.teams.iter().map(|t| t.id).collect()
    }

    pub fn matches(&self) -> Vec<Match> {
        self.store.matches(self.tournament_id, self.category_id).unwrap()
    }

    pub fn in_round(&self, round: Round) -> Vec<Match> {
        self.matches().into_iter().filter(|m| m.round == round).collect()
    }

    pub fn match_at(&self, round: Round, number: u32) -> Match {
        self.matches()
            .into_iter()
            .find(|m| m.round == round && m.match_number == number)
            .unwrap_or_else(|| panic!("no match {number} in {round:?}"))
    }

    pub fn reload(&self, id: MatchId) -> Match {
        self.store.find_match(id).unwrap().unwrap()
    }
}

/// Two-set win for the given side: 6-3 6-4 or 3-6 4-6.
pub fn straight_sets(team_1_wins: bool) -> Vec<SetScore> {
    if team_1_wins {
        vec![SetScore::new(6, 3), SetScore::new(6, 4)]
    } else {
        vec![SetScore::new(3, 6), SetScore::new(4, 6)]
    }
}
