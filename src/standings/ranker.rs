use crate::types::{Player, PlayerStanding};

/// Sort `(player, points)` pairs into display order and assign positions.
///
/// Order is points descending, then player name ascending (id settles exact
/// name clashes so the output is fully deterministic). Tied players share a
/// position and the next distinct score resumes at its rank, so
/// `[10, 10, 8, 5, 5, 5]` becomes `[1, 1, 3, 4, 4, 4]`.
pub fn rank(entries: impl IntoIterator<Item = (Player, i32)>) -> Vec<PlayerStanding> {
    let mut standings: Vec<PlayerStanding> = entries
        .into_iter()
        .map(|(player, points)| PlayerStanding { player, position: 0, points })
        .collect();

    standings.sort_by(|a, b| a.display_order(b));

    let mut position = 0u32;
    let mut last_points: Option<i32> = None;
    for (above, standing) in standings.iter_mut().enumerate() {
        if last_points != Some(standing.points) {
            position = above as u32 + 1;
            last_points = Some(standing.points);
        }
        standing.position = position;
    }

    standings
}
