use tracing::{debug, info};

use crate::db::Store;
use crate::error::Result;
use crate::types::{CompetitionId, League};

/// Rolls per-fixture prize points up into each subscription's running totals.
pub struct SubscriptionPointsAggregator {
    store: Store,
}

impl SubscriptionPointsAggregator {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Recompute every subscription's totals for `league`. Unconfigured slots
    /// are stored as 0.
    pub async fn recalculate_league_totals(&self, league: &League) -> Result<()> {
        let subscriptions = self.store.subscriptions_for_league(league.id).await?;

        let mut totals = Vec::with_capacity(subscriptions.len());
        for subscription in &subscriptions {
            let mut slots = [0i32; 3];
            for (slot, code) in league.configured_prizes() {
                slots[slot.index()] = self.store.total_points(subscription.id, code).await?;
            }
            totals.push((subscription.id, slots));
        }

        self.store.save_subscription_totals(&totals).await?;
        debug!(league_id = league.id, subscriptions = totals.len(), "Recalculated totals for league {}", league.code);
        Ok(())
    }

    /// Totals for every league of a competition. Returns the number of leagues.
    pub async fn recalculate_competition_totals(&self, competition_id: CompetitionId) -> Result<usize> {
        let leagues = self.store.leagues_for_competition(competition_id).await?;
        for league in &leagues {
            self.recalculate_league_totals(league).await?;
        }
        info!(competition_id, leagues = leagues.len(), "Recalculated subscription totals");
        Ok(leagues.len())
    }
}
