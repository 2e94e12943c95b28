use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::clock::Clock;
use crate::db::Store;
use crate::error::Result;
use crate::fixtures::FixtureService;
use crate::points::{ScoreRecorder, SubscriptionPointsAggregator};
use crate::scorer::PrizeCatalog;
use crate::standings::StandingsService;
use crate::state::StandingsCache;
use crate::types::{parse_result_text, CompetitionId, Fixture, FixtureId};

/// Outcome of entering (or clearing) a fixture result.
#[derive(Debug, Clone, Serialize)]
pub struct ResultEntry {
    pub fixture: Fixture,
    /// "H - A", or empty when the result was cleared.
    pub result: String,
    pub rows_scored: usize,
    pub leagues_refreshed: usize,
}

/// Wires the scoring, aggregation and standings services together.
pub struct LeagueEngine {
    pub recorder: ScoreRecorder,
    pub aggregator: SubscriptionPointsAggregator,
    pub standings: StandingsService,
    pub fixtures: FixtureService,
}

impl LeagueEngine {
    pub fn new(
        store: Store,
        catalog: Arc<PrizeCatalog>,
        cache: Arc<StandingsCache>,
        clock: Arc<dyn Clock>,
        min_fixtures: usize,
        max_standings: usize,
    ) -> Self {
        Self {
            recorder: ScoreRecorder::new(store.clone(), Arc::clone(&catalog)),
            aggregator: SubscriptionPointsAggregator::new(store.clone()),
            standings: StandingsService::new(store.clone(), cache, catalog, max_standings),
            fixtures: FixtureService::new(store, clock, min_fixtures),
        }
    }

    /// Recompute totals for every league of a competition, then their
    /// standings. Returns the number of leagues.
    pub async fn refresh_competition(&self, competition_id: CompetitionId) -> Result<usize> {
        let leagues = self.aggregator.recalculate_competition_totals(competition_id).await?;
        self.standings.recalculate_competition_standings(competition_id).await?;
        Ok(leagues)
    }

    /// Parse `text`, store it as the fixture's result, rescore the fixture and
    /// refresh its competition. Blank text clears the result.
    pub async fn enter_result(&self, fixture_id: FixtureId, text: &str) -> Result<ResultEntry> {
        let result = parse_result_text(text)?;
        let (fixture, rows_scored) = self.recorder.save_result(fixture_id, result).await?;
        let leagues_refreshed = self.refresh_competition(fixture.competition_id).await?;

        let result = fixture.result.map(|r| r.to_string()).unwrap_or_default();
        info!(
            fixture_id,
            rows_scored,
            leagues_refreshed,
            "Result entered for {} v {}: '{}'",
            fixture.home_team,
            fixture.away_team,
            result,
        );
        Ok(ResultEntry { fixture, result, rows_scored, leagues_refreshed })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::clock::FixedTimeClock;
    use crate::error::AppError;
    use crate::scorer::catalog::default_definitions;
    use crate::scorer::StrategyRegistry;
    use crate::types::{MatchResult, PlayerId, PrizeSlot};

    struct World {
        engine: LeagueEngine,
        league: i64,
        fixture: FixtureId,
        players: Vec<PlayerId>,
    }

    /// A predicts 2-1, B predicts 1-0, C predicts nothing.
    async fn world() -> World {
        let store = Store::in_memory().await.unwrap();
        let comp = store.insert_competition("Euro").await.unwrap();
        let kickoff = Utc.with_ymd_and_hms(2024, 6, 14, 19, 0, 0).unwrap();
        let fixture = store.insert_fixture(comp, "GER", "SCO", kickoff, false).await.unwrap();
        let league = store.insert_league("pub", comp, [Some("O"), Some("SO"), None]).await.unwrap();

        let mut players = Vec::new();
        for (name, prediction) in [("A", Some(MatchResult::new(2, 1))), ("B", Some(MatchResult::new(1, 0))), ("C", None)] {
            let player = store.insert_player(name).await.unwrap();
            store.subscribe(league, player).await.unwrap();
            if let Some(predicted) = prediction {
                store.save_prediction(player, fixture, predicted).await.unwrap();
            }
            players.push(player);
        }

        let catalog =
            Arc::new(PrizeCatalog::from_definitions(&StrategyRegistry::with_defaults(), &default_definitions()).unwrap());
        let clock: Arc<dyn Clock> = Arc::new(FixedTimeClock::new(kickoff + chrono::TimeDelta::hours(3)));
        let engine = LeagueEngine::new(store, catalog, StandingsCache::new(), clock, 10, 10);
        World { engine, league, fixture, players }
    }

    fn table(view: &[crate::types::PersonalisedStanding]) -> Vec<(&str, u32, i32)> {
        view.iter()
            .map(|s| (s.standing.player.name.as_str(), s.standing.position, s.standing.points))
            .collect()
    }

    #[tokio::test]
    async fn two_one_result_flows_through_to_standings() {
        let w = world().await;

        let entry = w.engine.enter_result(w.fixture, "2-1").await.unwrap();
        assert_eq!(entry.result, "2 - 1");
        assert_eq!(entry.rows_scored, 6);
        assert_eq!(entry.leagues_refreshed, 1);

        let overall = w.engine.standings.full_standings(w.league, PrizeSlot::First, w.players[2]).await.unwrap();
        assert_eq!(table(&overall), vec![("A", 1, 11), ("B", 2, 6), ("C", 3, -3)]);
        assert!(overall[2].highlighted);

        let spot_on = w.engine.standings.full_standings(w.league, PrizeSlot::Second, w.players[0]).await.unwrap();
        assert_eq!(table(&spot_on), vec![("A", 1, 1), ("B", 2, 0), ("C", 2, 0)]);
    }

    #[tokio::test]
    async fn correcting_a_result_replaces_earlier_points() {
        let w = world().await;
        w.engine.enter_result(w.fixture, "0 0").await.unwrap();
        w.engine.enter_result(w.fixture, "2v1").await.unwrap();

        let overall = w.engine.standings.full_standings(w.league, PrizeSlot::First, w.players[0]).await.unwrap();
        assert_eq!(table(&overall)[0], ("A", 1, 11));
    }

    #[tokio::test]
    async fn blank_result_clears_and_zeroes_everyone() {
        let w = world().await;
        w.engine.enter_result(w.fixture, "2-1").await.unwrap();
        let entry = w.engine.enter_result(w.fixture, "   ").await.unwrap();

        assert_eq!(entry.result, "");
        assert_eq!(entry.fixture.result, None);
        let overall = w.engine.standings.full_standings(w.league, PrizeSlot::First, w.players[0]).await.unwrap();
        assert!(overall.iter().all(|s| s.standing.points == 0 && s.standing.position == 1));

        let waiting = w.engine.fixtures.awaiting_result(entry.fixture.competition_id).await.unwrap();
        assert_eq!(waiting.len(), 1);
    }

    #[tokio::test]
    async fn malformed_result_is_rejected_before_anything_is_written() {
        let w = world().await;
        assert!(matches!(w.engine.enter_result(w.fixture, "two-one").await, Err(AppError::InvalidResult(_))));
        let overall = w.engine.standings.full_standings(w.league, PrizeSlot::First, w.players[0]).await.unwrap();
        assert!(overall.is_empty());
    }
}
