//! Group-stage sizing and snake distribution of teams over groups.

use crate::models::{BracketError, BracketResult, TeamId};
use serde::{Deserialize, Serialize};

/// Largest number of teams in one group.
pub const MAX_GROUP_SIZE: usize = 4;

/// How a group stage is split and how many teams advance.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupConfiguration {
    pub num_groups: usize,
    pub group_sizes: Vec<usize>,
    /// Direct qualifiers per group (positions 1..=qualified_per_group).
    pub qualified_per_group: usize,
    /// Best next-placed teams across groups that also advance.
    pub wildcard_slots: usize,
    /// Always a power of two.
    pub total_qualified: usize,
}

/// Group layout for `team_count` teams (at least 8).
///
/// Groups hold at most four teams, the remainder going to the first groups.
/// The elimination phase takes the largest power of two that is at most two
/// qualifiers per group, which gives:
///
/// | teams | groups | direct per group | wildcards | qualified |
/// |-------|--------|------------------|-----------|-----------|
/// | 8     | 2      | 2                | 0         | 4         |
/// | 9-12  | 3      | 1                | 1         | 4         |
/// | 13-16 | 4      | 2                | 0         | 8         |
/// | 17-28 | 5-7    | 1                | 3-1       | 8         |
/// | 29-32 | 8      | 2                | 0         | 16        |
/// | 33-60 | 9-15   | 1                | 7-1       | 16        |
/// | 61-64 | 16     | 2                | 0         | 32        |
///
/// Beyond 64 teams the same rule keeps going (64, 128, ... qualifiers).
pub fn calculate_optimal_group_configuration(
    team_count: usize,
) -> BracketResult<GroupConfiguration> {
    if team_count < 8 {
        return Err(BracketError::TooFewTeamsForGroups(team_count));
    }
    let num_groups = team_count.div_ceil(MAX_GROUP_SIZE);
    let base = team_count / num_groups;
    let remainder = team_count % num_groups;
    let group_sizes = (0..num_groups)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect();

    let total_qualified = largest_power_of_two_at_most(2 * num_groups);
    let qualified_per_group = total_qualified / num_groups;
    let wildcard_slots = total_qualified - qualified_per_group * num_groups;

    Ok(GroupConfiguration {
        num_groups,
        group_sizes,
        qualified_per_group,
        wildcard_slots,
        total_qualified,
    })
}

fn largest_power_of_two_at_most(n: usize) -> usize {
    1 << (usize::BITS - 1 - n.leading_zeros())
}

/// Deal seed-ordered teams over groups in a snake: left to right, then right
/// to left, skipping groups that are already full.
pub fn snake_distribution(teams: &[TeamId], group_sizes: &[usize]) -> Vec<Vec<TeamId>> {
    let mut groups: Vec<Vec<TeamId>> = group_sizes.iter().map(|&s| Vec::with_capacity(s)).collect();
    let mut remaining = teams.iter().copied();
    let mut forward = true;
    loop {
        let order: Vec<usize> = if forward {
            (0..groups.len()).collect()
        } else {
            (0..groups.len()).rev().collect()
        };
        let mut placed = false;
        for g in order {
            if groups[g].len() >= group_sizes[g] {
                continue;
            }
            match remaining.next() {
                Some(team) => {
                    groups[g].push(team);
                    placed = true;
                }
                None => return groups,
            }
        }
        if !placed {
            return groups;
        }
        forward = !forward;
    }
}
