use std::collections::HashSet;

use chrono::NaiveDate;

use crate::types::Fixture;

/// At least `min_count` items from the front of `items`, extended so that no
/// calendar day is cut in half.
///
/// `items` must already be in chronological order (either direction). Once
/// `min_count` items are taken the walk stops at the first item on a day not
/// yet seen. A list no longer than `min_count` comes back untouched.
pub fn select_relevant<T>(items: Vec<T>, min_count: usize, date_of: impl Fn(&T) -> NaiveDate) -> Vec<T> {
    if items.len() <= min_count {
        return items;
    }

    let mut seen = HashSet::new();
    let mut selected = Vec::with_capacity(min_count);

    for item in items {
        let date = date_of(&item);
        if !seen.contains(&date) {
            if selected.len() >= min_count {
                break;
            }
            seen.insert(date);
        }
        selected.push(item);
    }

    selected
}

pub fn relevant_fixtures(fixtures: Vec<Fixture>, min_count: usize) -> Vec<Fixture> {
    select_relevant(fixtures, min_count, Fixture::match_date)
}
