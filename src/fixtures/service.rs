use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::clock::Clock;
use crate::db::Store;
use crate::error::Result;
use crate::fixtures::relevant::relevant_fixtures;
use crate::types::{CompetitionId, Fixture, MatchResult, PlayerId};

/// A fixture alongside one player's prediction for it, if any.
#[derive(Debug, Clone, Serialize)]
pub struct FixturePrediction {
    #[serde(flatten)]
    pub fixture: Fixture,
    pub predicted: Option<MatchResult>,
    /// Predictions are locked once this is true.
    pub started: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingFixtures {
    /// Every fixture that has not kicked off yet, before windowing.
    pub editable: usize,
    pub fixtures: Vec<FixturePrediction>,
}

/// Clock-aware fixture windows for a competition.
pub struct FixtureService {
    store: Store,
    clock: Arc<dyn Clock>,
    min_fixtures: usize,
}

impl FixtureService {
    pub fn new(store: Store, clock: Arc<dyn Clock>, min_fixtures: usize) -> Self {
        Self { store, clock, min_fixtures }
    }

    /// Next fixtures to kick off, soonest first, cut to whole days.
    pub async fn upcoming_fixtures(
        &self,
        competition_id: CompetitionId,
        player: Option<PlayerId>,
    ) -> Result<UpcomingFixtures> {
        let all = self.store.fixtures_after(competition_id, self.clock.now()).await?;
        let editable = all.len();
        let fixtures = relevant_fixtures(all, self.min_fixtures);
        debug!(competition_id, editable, shown = fixtures.len(), "Selected upcoming fixtures");

        Ok(UpcomingFixtures { editable, fixtures: self.with_predictions(fixtures, player).await? })
    }

    /// Fixtures with a result, newest first. `recent` cuts to whole days.
    pub async fn results(
        &self,
        competition_id: CompetitionId,
        recent: bool,
        player: Option<PlayerId>,
    ) -> Result<Vec<FixturePrediction>> {
        let mut results = self.store.fixtures_with_result(competition_id).await?;
        if recent {
            results = relevant_fixtures(results, self.min_fixtures);
        }
        debug!(competition_id, recent, count = results.len(), "Selected results");
        self.with_predictions(results, player).await
    }

    /// Started fixtures still waiting for a result, longest-waiting first.
    pub async fn awaiting_result(&self, competition_id: CompetitionId) -> Result<Vec<Fixture>> {
        self.store.started_fixtures_without_result(competition_id, self.clock.now()).await
    }

    async fn with_predictions(&self, fixtures: Vec<Fixture>, player: Option<PlayerId>) -> Result<Vec<FixturePrediction>> {
        let now = self.clock.now();
        let mut out = Vec::with_capacity(fixtures.len());
        for fixture in fixtures {
            let predicted = match player {
                Some(player) => self.store.prediction(player, fixture.id).await?.and_then(|p| p.predicted),
                None => None,
            };
            let started = fixture.has_started(now);
            out.push(FixturePrediction { fixture, predicted, started });
        }
        Ok(out)
    }
}
