//! Round-robin pairings with the circle method.

/// Pairings of `n` teams (by index) for up to `max_rounds` rounds.
///
/// An odd field gets a virtual bye seat; pairs touching it are dropped.
/// Seat 0 stays fixed while the others rotate one position per round, so no
/// pairing repeats until all `n - 1` opponents have been met.
pub fn circle_pairings(n: usize, max_rounds: usize) -> Vec<Vec<(usize, usize)>> {
    if n < 2 {
        return Vec::new();
    }
    let mut seats: Vec<Option<usize>> = (0..n).map(Some).collect();
    if n % 2 == 1 {
        seats.push(None);
    }
    let m = seats.len();
    let rounds = max_rounds.min(m - 1);

    let mut schedule = Vec::with_capacity(rounds);
    for _ in 0..rounds {
        let pairs = (0..m / 2)
            .filter_map(|i| match (seats[i], seats[m - 1 - i]) {
                (Some(a), Some(b)) => Some((a, b)),
                _ => None,
            })
            .collect();
        schedule.push(pairs);

        let moved = seats.remove(1);
        seats.push(moved);
    }
    schedule
}
