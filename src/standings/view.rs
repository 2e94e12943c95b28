use crate::types::{PersonalisedStanding, Player, PlayerStanding};

/// The top of the standings, sized to `max_count`, with `viewer` always on it.
///
/// When the viewer is already among the first `max_count` entries those are
/// returned unchanged apart from the highlight. Otherwise the last visible row
/// is given up for the viewer's own standing, or an unranked placeholder if the
/// viewer has no standing at all. `max_count` below 1 is treated as 1.
pub fn abbreviated(standings: &[PlayerStanding], viewer: &Player, max_count: usize) -> Vec<PersonalisedStanding> {
    let max_count = max_count.max(1);
    let is_viewer = |s: &PlayerStanding| s.player.id == viewer.id;

    if standings.iter().take(max_count).any(is_viewer) {
        return standings
            .iter()
            .take(max_count)
            .map(|s| PersonalisedStanding::new(s.clone(), is_viewer(s)))
            .collect();
    }

    let mut view: Vec<PersonalisedStanding> = standings
        .iter()
        .take(max_count - 1)
        .map(|s| PersonalisedStanding::new(s.clone(), false))
        .collect();

    let own = match standings.iter().find(|s| is_viewer(*s)) {
        Some(standing) => PersonalisedStanding::new(standing.clone(), true),
        None => PersonalisedStanding {
            standing: PlayerStanding::unranked(viewer.clone()),
            highlighted: true,
            ranked: false,
        },
    };
    view.push(own);
    view
}

/// Every standing, with the viewer's row highlighted if present.
pub fn full(standings: &[PlayerStanding], viewer: &Player) -> Vec<PersonalisedStanding> {
    standings
        .iter()
        .map(|s| PersonalisedStanding::new(s.clone(), s.player.id == viewer.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standings::ranker::rank;

    fn player(id: i64) -> Player {
        Player { id, name: format!("p{id:02}") }
    }

    /// Players 1..=n, player 1 top, strictly decreasing points.
    fn table(n: i64) -> Vec<PlayerStanding> {
        rank((1..=n).map(|id| (player(id), (100 - id) as i32)))
    }

    fn highlighted(view: &[PersonalisedStanding]) -> Vec<i64> {
        view.iter().filter(|s| s.highlighted).map(|s| s.standing.player.id).collect()
    }

    fn ids(view: &[PersonalisedStanding]) -> Vec<i64> {
        view.iter().map(|s| s.standing.player.id).collect()
    }

    #[test]
    fn viewer_inside_window_keeps_top_entries() {
        let view = abbreviated(&table(10), &player(3), 5);
        assert_eq!(ids(&view), vec![1, 2, 3, 4, 5]);
        assert_eq!(highlighted(&view), vec![3]);
    }

    #[test]
    fn viewer_on_last_visible_row_is_not_duplicated() {
        let view = abbreviated(&table(10), &player(5), 5);
        assert_eq!(ids(&view), vec![1, 2, 3, 4, 5]);
        assert_eq!(highlighted(&view), vec![5]);
    }

    #[test]
    fn viewer_outside_window_replaces_last_row() {
        let view = abbreviated(&table(10), &player(8), 5);
        assert_eq!(ids(&view), vec![1, 2, 3, 4, 8]);
        assert_eq!(highlighted(&view), vec![8]);
        assert_eq!(view[4].standing.position, 8);
        assert!(view[..4].iter().all(|s| !s.highlighted));
    }

    #[test]
    fn short_table_returns_everyone() {
        let view = abbreviated(&table(3), &player(2), 5);
        assert_eq!(ids(&view), vec![1, 2, 3]);
        assert_eq!(highlighted(&view), vec![2]);
    }

    #[test]
    fn unranked_viewer_gets_placeholder() {
        let stranger = Player { id: 99, name: "new".to_string() };
        let view = abbreviated(&table(10), &stranger, 5);
        assert_eq!(ids(&view), vec![1, 2, 3, 4, 99]);

        let last = view.last().unwrap();
        assert!(last.highlighted);
        assert!(!last.ranked);
        assert_eq!(last.standing.position, 0);
        assert_eq!(last.standing.points, 0);
        assert_eq!(view.iter().filter(|s| s.standing.player.id == 99).count(), 1);
    }

    #[test]
    fn unranked_viewer_with_empty_table() {
        let view = abbreviated(&[], &player(1), 5);
        assert_eq!(ids(&view), vec![1]);
        assert!(!view[0].ranked);
    }

    #[test]
    fn zero_max_still_shows_viewer() {
        let view = abbreviated(&table(4), &player(4), 0);
        assert_eq!(ids(&view), vec![4]);
        assert!(view[0].highlighted);
    }

    #[test]
    fn length_is_min_of_max_and_players_when_ranked() {
        for max in 1..=12 {
            for viewer in 1..=8 {
                let view = abbreviated(&table(8), &player(viewer), max);
                assert_eq!(view.len(), max.min(8), "max={max} viewer={viewer}");
                assert_eq!(highlighted(&view), vec![viewer]);
            }
        }
    }

    #[test]
    fn full_view_highlights_viewer_only() {
        let view = full(&table(4), &player(2));
        assert_eq!(ids(&view), vec![1, 2, 3, 4]);
        assert_eq!(highlighted(&view), vec![2]);
        assert!(full(&table(4), &player(42)).iter().all(|s| !s.highlighted));
    }
}
