use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::scorer::PrizeCatalog;
use crate::standings::view;
use crate::state::StandingsCache;
use crate::types::{CompetitionId, League, LeagueId, PersonalisedStanding, Player, PlayerId, PlayerStanding, PrizeSlot};

/// A league's prize as shown to players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaguePrize {
    pub slot: u8,
    pub code: String,
    pub name: String,
}

/// Owns the standings lifecycle: rebuilding cached standings from stored
/// totals and serving personalised views of them.
pub struct StandingsService {
    store: Store,
    cache: Arc<StandingsCache>,
    catalog: Arc<PrizeCatalog>,
    max_standings: usize,
}

impl StandingsService {
    pub fn new(store: Store, cache: Arc<StandingsCache>, catalog: Arc<PrizeCatalog>, max_standings: usize) -> Self {
        Self { store, cache, catalog, max_standings }
    }

    pub async fn recalculate_league_standings(&self, league_id: LeagueId) -> Result<()> {
        let league = self.league(league_id).await?;
        self.recompute(&league).await
    }

    /// Returns the number of leagues recomputed.
    pub async fn recalculate_competition_standings(&self, competition_id: CompetitionId) -> Result<usize> {
        let leagues = self.store.leagues_for_competition(competition_id).await?;
        for league in &leagues {
            self.recompute(league).await?;
        }
        Ok(leagues.len())
    }

    /// Rebuild standings for every league of every active competition.
    pub async fn recalculate_all_standings(&self) -> Result<usize> {
        let mut leagues = 0;
        for competition in self.store.active_competitions().await? {
            let count = self.recalculate_competition_standings(competition.id).await?;
            info!(competition_id = competition.id, leagues = count, "Standings rebuilt for {}", competition.name);
            leagues += count;
        }
        Ok(leagues)
    }

    async fn recompute(&self, league: &League) -> Result<()> {
        let subscriptions = self.store.subscriptions_for_league(league.id).await?;
        self.cache.recompute(league, &subscriptions);
        Ok(())
    }

    /// Every standing for one prize slot, viewer highlighted. An unconfigured
    /// slot yields an empty list.
    pub async fn full_standings(
        &self,
        league_id: LeagueId,
        slot: PrizeSlot,
        viewer: PlayerId,
    ) -> Result<Vec<PersonalisedStanding>> {
        let league = self.league(league_id).await?;
        let Some(code) = league.prize_code(slot) else {
            return Ok(Vec::new());
        };
        let viewer = self.viewer(viewer).await?;
        Ok(view::full(&self.cached(&league, code), &viewer))
    }

    /// The top of one prize's standings, always including the viewer.
    pub async fn abbreviated_standings(
        &self,
        league_id: LeagueId,
        slot: PrizeSlot,
        viewer: PlayerId,
    ) -> Result<Vec<PersonalisedStanding>> {
        let league = self.league(league_id).await?;
        let Some(code) = league.prize_code(slot) else {
            return Ok(Vec::new());
        };
        let viewer = self.viewer(viewer).await?;
        Ok(view::abbreviated(&self.cached(&league, code), &viewer, self.max_standings))
    }

    pub async fn league_prizes(&self, league_id: LeagueId) -> Result<Vec<LeaguePrize>> {
        let league = self.league(league_id).await?;
        Ok(self
            .catalog
            .league_prizes(&league)
            .into_iter()
            .map(|(slot, prize)| LeaguePrize {
                slot: slot.number(),
                code: prize.code().to_string(),
                name: prize.name().to_string(),
            })
            .collect())
    }

    fn cached(&self, league: &League, code: &str) -> Arc<[PlayerStanding]> {
        if !self.cache.contains(league.id) {
            debug!(league_id = league.id, "No standings cached yet for league {}", league.code);
        }
        self.cache.read(league.id, code)
    }

    async fn league(&self, league_id: LeagueId) -> Result<League> {
        self.store.league(league_id).await?.ok_or_else(|| {
            warn!(league_id, "Unknown league requested");
            AppError::NotFound(format!("league {league_id}"))
        })
    }

    async fn viewer(&self, player_id: PlayerId) -> Result<Player> {
        self.store
            .player(player_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("player {player_id}")))
    }
}
