use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::scorer::{Prize, PrizeCatalog};
use crate::types::{Fixture, FixtureId, MatchResult, PlayerId, PrizePoints, PrizeSlot, Subscription};

/// Writes per-fixture prize points for every subscription that could have
/// predicted the fixture. Totals and cached standings are left alone.
pub struct ScoreRecorder {
    store: Store,
    catalog: Arc<PrizeCatalog>,
}

impl ScoreRecorder {
    pub fn new(store: Store, catalog: Arc<PrizeCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Score `fixture` for every league of its competition and upsert the
    /// points in one transaction. Safe to rerun. Returns the rows written.
    pub async fn record_fixture(&self, fixture: &Fixture) -> Result<usize> {
        let predictions: HashMap<PlayerId, MatchResult> = self
            .store
            .predictions_for_fixture(fixture.id)
            .await?
            .into_iter()
            .filter_map(|p| p.predicted.map(|predicted| (p.predictor, predicted)))
            .collect();

        let mut rows = Vec::new();
        for league in self.store.leagues_for_competition(fixture.competition_id).await? {
            let prizes = self.catalog.league_prizes(&league);
            if prizes.is_empty() {
                continue;
            }
            let subscriptions = self.store.subscriptions_for_league(league.id).await?;
            let before = rows.len();
            rows.extend(score_subscriptions(fixture, &prizes, &subscriptions, &predictions));
            debug!(
                fixture_id = fixture.id,
                league_id = league.id,
                rows = rows.len() - before,
                "Scored league {}",
                league.code,
            );
        }

        self.store.upsert_prize_points(&rows).await?;
        info!(
            fixture_id = fixture.id,
            rows = rows.len(),
            "Recorded points for {} v {} ({})",
            fixture.home_team,
            fixture.away_team,
            fixture.actual_result(),
        );
        Ok(rows.len())
    }

    /// Store a fixture's result (or clear it with `None`) and rescore it.
    pub async fn save_result(&self, fixture_id: FixtureId, result: Option<MatchResult>) -> Result<(Fixture, usize)> {
        self.store.set_fixture_result(fixture_id, result).await?;
        let fixture = self
            .store
            .fixture(fixture_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("fixture {fixture_id}")))?;
        let rows = self.record_fixture(&fixture).await?;
        Ok((fixture, rows))
    }
}

/// One points row per (subscription, prize). Players missing from
/// `predictions` go through the prize's missing-prediction path.
pub fn score_subscriptions(
    fixture: &Fixture,
    prizes: &[(PrizeSlot, Arc<Prize>)],
    subscriptions: &[Subscription],
    predictions: &HashMap<PlayerId, MatchResult>,
) -> Vec<PrizePoints> {
    subscriptions
        .iter()
        .flat_map(|subscription| {
            let predicted = predictions.get(&subscription.player.id);
            prizes.iter().map(move |(_, prize)| PrizePoints {
                subscription_id: subscription.id,
                fixture_id: fixture.id,
                prize_code: prize.code().to_string(),
                points: prize.calculate_points(fixture, predicted),
            })
        })
        .collect()
}
