use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::standings::ranker::rank;
use crate::types::{League, LeagueId, PlayerStanding, Subscription};

/// Ranked standings for every configured prize of one league.
/// Immutable once built; a recompute swaps in a fresh value.
#[derive(Debug, Default)]
struct LeagueStandings {
    /// prize code → standings in display order
    by_prize: HashMap<String, Arc<[PlayerStanding]>>,
}

// ---------------------------------------------------------------------------
// StandingsCache
// ---------------------------------------------------------------------------

/// Process-lifetime cache of ranked standings keyed by (league, prize code).
///
/// Each league's entry is replaced wholesale, so a reader sees either the
/// previous standings for every prize of that league or the new ones, never a
/// mix. Entries are never evicted.
pub struct StandingsCache {
    /// league_id → standings for all of that league's prizes
    leagues: DashMap<LeagueId, Arc<LeagueStandings>>,
}

impl StandingsCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Rank every configured prize slot of `league` from the subscriptions'
    /// running totals and swap the result in.
    pub fn recompute(&self, league: &League, subscriptions: &[Subscription]) {
        let mut by_prize = HashMap::new();

        for (slot, code) in league.configured_prizes() {
            let standings = rank(
                subscriptions
                    .iter()
                    .filter(|s| s.league_id == league.id)
                    .map(|s| (s.player.clone(), s.points(slot))),
            );
            debug!(
                league_id = league.id,
                prize_code = code,
                count = standings.len(),
                "Caching {} standings for league {} prize {}",
                standings.len(),
                league.code,
                code,
            );
            by_prize.insert(code.to_string(), Arc::from(standings));
        }

        self.leagues.insert(league.id, Arc::new(LeagueStandings { by_prize }));
    }

    /// Cached standings, or an empty list if none were ever computed.
    pub fn read(&self, league_id: LeagueId, prize_code: &str) -> Arc<[PlayerStanding]> {
        self.leagues
            .get(&league_id)
            .and_then(|entry| entry.by_prize.get(prize_code).cloned())
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    pub fn contains(&self, league_id: LeagueId) -> bool {
        self.leagues.contains_key(&league_id)
    }

    pub fn league_count(&self) -> usize {
        self.leagues.len()
    }

    pub fn clear(&self) {
        self.leagues.clear();
    }
}

impl Default for StandingsCache {
    fn default() -> Self {
        Self { leagues: DashMap::new() }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
