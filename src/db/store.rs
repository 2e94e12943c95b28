use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::models::{
    CompetitionRow, FixtureRow, LeagueRow, PredictionRow, SubscriptionRow,
};
use crate::error::{AppError, Result};
use crate::types::{
    Competition, CompetitionId, Fixture, FixtureId, League, LeagueId, MatchResult, Player, PlayerId,
    Prediction, PrizePoints, Subscription, SubscriptionId,
};

const FIXTURE_COLUMNS: &str =
    "id, competition_id, home_team, away_team, match_time, home_score, away_score, knockout";

const LEAGUE_COLUMNS: &str =
    "id, name, code, competition_id, state, prize_one_code, prize_two_code, prize_three_code";

/// SQLite-backed access to the league data the engine reads and the points it
/// writes. Cheap to clone; all clones share one pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if needed) the database file and apply migrations.
    pub async fn connect(db_path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database ready at {db_path}");
        Ok(Self { pool })
    }

    // -----------------------------------------------------------------------
    // Competitions and fixtures
    // -----------------------------------------------------------------------

    pub async fn active_competitions(&self) -> Result<Vec<Competition>> {
        let rows = sqlx::query_as::<_, CompetitionRow>(
            "SELECT id, name, active FROM competitions WHERE active = 1 ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Competition::from).collect())
    }

    pub async fn fixture(&self, fixture_id: FixtureId) -> Result<Option<Fixture>> {
        let row = sqlx::query_as::<_, FixtureRow>(&format!("SELECT {FIXTURE_COLUMNS} FROM fixtures WHERE id = ?"))
            .bind(fixture_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Fixture::try_from).transpose()
    }

    /// `None` clears the result.
    pub async fn set_fixture_result(&self, fixture_id: FixtureId, result: Option<MatchResult>) -> Result<()> {
        let result = result.unwrap_or_default();
        let updated = sqlx::query("UPDATE fixtures SET home_score = ?, away_score = ? WHERE id = ?")
            .bind(result.home)
            .bind(result.away)
            .bind(fixture_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(AppError::NotFound(format!("fixture {fixture_id}")));
        }
        Ok(())
    }

    /// Fixtures with a result, most recent first.
    pub async fn fixtures_with_result(&self, competition_id: CompetitionId) -> Result<Vec<Fixture>> {
        self.fetch_fixtures(
            &format!(
                "SELECT {FIXTURE_COLUMNS} FROM fixtures \
                 WHERE competition_id = ? AND home_score IS NOT NULL AND away_score IS NOT NULL \
                 ORDER BY match_time DESC, id DESC"
            ),
            competition_id,
            None,
        )
        .await
    }

    /// Fixtures kicking off after `now`, soonest first.
    pub async fn fixtures_after(&self, competition_id: CompetitionId, now: DateTime<Utc>) -> Result<Vec<Fixture>> {
        self.fetch_fixtures(
            &format!(
                "SELECT {FIXTURE_COLUMNS} FROM fixtures \
                 WHERE competition_id = ? AND match_time > ? \
                 ORDER BY match_time ASC, id ASC"
            ),
            competition_id,
            Some(now),
        )
        .await
    }

    /// Fixtures that kicked off before `now` and still have no complete
    /// result, longest-waiting first.
    pub async fn started_fixtures_without_result(
        &self,
        competition_id: CompetitionId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Fixture>> {
        self.fetch_fixtures(
            &format!(
                "SELECT {FIXTURE_COLUMNS} FROM fixtures \
                 WHERE competition_id = ? AND match_time < ? \
                   AND (home_score IS NULL OR away_score IS NULL) \
                 ORDER BY match_time ASC, id ASC"
            ),
            competition_id,
            Some(now),
        )
        .await
    }

    async fn fetch_fixtures(
        &self,
        sql: &str,
        competition_id: CompetitionId,
        cutoff: Option<DateTime<Utc>>,
    ) -> Result<Vec<Fixture>> {
        let mut query = sqlx::query_as::<_, FixtureRow>(sql).bind(competition_id);
        if let Some(cutoff) = cutoff {
            query = query.bind(cutoff.timestamp());
        }
        let rows = query.fetch_all(&self.pool).await?;
        debug!(competition_id, count = rows.len(), "Fetched fixtures");
        rows.into_iter().map(Fixture::try_from).collect()
    }

    // -----------------------------------------------------------------------
    // Leagues, players and subscriptions
    // -----------------------------------------------------------------------

    pub async fn league(&self, league_id: LeagueId) -> Result<Option<League>> {
        let row = sqlx::query_as::<_, LeagueRow>(&format!("SELECT {LEAGUE_COLUMNS} FROM leagues WHERE id = ?"))
            .bind(league_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(League::try_from).transpose()
    }

    pub async fn leagues_for_competition(&self, competition_id: CompetitionId) -> Result<Vec<League>> {
        let rows = sqlx::query_as::<_, LeagueRow>(&format!(
            "SELECT {LEAGUE_COLUMNS} FROM leagues WHERE competition_id = ? ORDER BY id ASC"
        ))
        .bind(competition_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(League::try_from).collect()
    }

    pub async fn player(&self, player_id: PlayerId) -> Result<Option<Player>> {
        let row: Option<(i64, String)> = sqlx::query_as("SELECT id, name FROM players WHERE id = ?")
            .bind(player_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(id, name)| Player { id, name }))
    }

    pub async fn subscriptions_for_league(&self, league_id: LeagueId) -> Result<Vec<Subscription>> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT s.id, s.league_id, s.player_id, p.name AS player_name,
                   s.prize_one_points, s.prize_two_points, s.prize_three_points
            FROM subscriptions s
            JOIN players p ON p.id = s.player_id
            WHERE s.league_id = ?
            ORDER BY s.id ASC
            "#,
        )
        .bind(league_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    /// Writes all running totals in one transaction.
    pub async fn save_subscription_totals(&self, totals: &[(SubscriptionId, [i32; 3])]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for (subscription_id, [one, two, three]) in totals {
            sqlx::query(
                "UPDATE subscriptions \
                 SET prize_one_points = ?, prize_two_points = ?, prize_three_points = ? \
                 WHERE id = ?",
            )
            .bind(one)
            .bind(two)
            .bind(three)
            .bind(subscription_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Predictions and points
    // -----------------------------------------------------------------------

    pub async fn prediction(&self, player_id: PlayerId, fixture_id: FixtureId) -> Result<Option<Prediction>> {
        let row = sqlx::query_as::<_, PredictionRow>(
            "SELECT player_id, fixture_id, home_score, away_score FROM predictions \
             WHERE player_id = ? AND fixture_id = ?",
        )
        .bind(player_id)
        .bind(fixture_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Prediction::from))
    }

    /// Every prediction made on a fixture.
    pub async fn predictions_for_fixture(&self, fixture_id: FixtureId) -> Result<Vec<Prediction>> {
        let rows = sqlx::query_as::<_, PredictionRow>(
            "SELECT player_id, fixture_id, home_score, away_score FROM predictions WHERE fixture_id = ?",
        )
        .bind(fixture_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Prediction::from).collect())
    }

    /// Insert or overwrite points keyed by (subscription, fixture, prize code),
    /// all in one transaction.
    pub async fn upsert_prize_points(&self, rows: &[PrizePoints]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO prize_points (subscription_id, fixture_id, prize_code, points)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(subscription_id, fixture_id, prize_code) DO UPDATE SET
                    points = excluded.points
                "#,
            )
            .bind(row.subscription_id)
            .bind(row.fixture_id)
            .bind(&row.prize_code)
            .bind(row.points)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Sum of all points for a subscription in one prize; 0 with no rows.
    pub async fn total_points(&self, subscription_id: SubscriptionId, prize_code: &str) -> Result<i32> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(points), 0) FROM prize_points WHERE subscription_id = ? AND prize_code = ?",
        )
        .bind(subscription_id)
        .bind(prize_code)
        .fetch_one(&self.pool)
        .await?;
        Ok(total as i32)
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

#[cfg(test)]
impl Store {
    /// Private in-memory database on a single, never-recycled connection.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn prize_points(
        &self,
        subscription_id: SubscriptionId,
        fixture_id: FixtureId,
        prize_code: &str,
    ) -> Result<Option<i32>> {
        let points: Option<i32> = sqlx::query_scalar(
            "SELECT points FROM prize_points WHERE subscription_id = ? AND fixture_id = ? AND prize_code = ?",
        )
        .bind(subscription_id)
        .bind(fixture_id)
        .bind(prize_code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(points)
    }

    pub async fn prize_points_count(&self, subscription_id: SubscriptionId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prize_points WHERE subscription_id = ?")
            .bind(subscription_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn insert_competition(&self, name: &str) -> Result<CompetitionId> {
        let id = sqlx::query("INSERT INTO competitions (name, active) VALUES (?, 1)")
            .bind(name)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        Ok(id)
    }

    pub async fn insert_player(&self, name: &str) -> Result<PlayerId> {
        let id = sqlx::query("INSERT INTO players (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        Ok(id)
    }

    pub async fn insert_fixture(
        &self,
        competition_id: CompetitionId,
        home_team: &str,
        away_team: &str,
        match_time: DateTime<Utc>,
        knockout: bool,
    ) -> Result<FixtureId> {
        let id = sqlx::query(
            "INSERT INTO fixtures (competition_id, home_team, away_team, match_time, knockout) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(competition_id)
        .bind(home_team)
        .bind(away_team)
        .bind(match_time.timestamp())
        .bind(knockout)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn insert_league(
        &self,
        name: &str,
        competition_id: CompetitionId,
        prize_codes: [Option<&str>; 3],
    ) -> Result<LeagueId> {
        let [one, two, three] = prize_codes;
        let id = sqlx::query(
            "INSERT INTO leagues (name, code, competition_id, state, prize_one_code, prize_two_code, prize_three_code) \
             VALUES (?, ?, ?, 'active', ?, ?, ?)",
        )
        .bind(name)
        .bind(name.to_uppercase())
        .bind(competition_id)
        .bind(one.unwrap_or_default())
        .bind(two)
        .bind(three)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn subscribe(&self, league_id: LeagueId, player_id: PlayerId) -> Result<SubscriptionId> {
        let id = sqlx::query("INSERT INTO subscriptions (league_id, player_id) VALUES (?, ?)")
            .bind(league_id)
            .bind(player_id)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        Ok(id)
    }

    pub async fn save_prediction(&self, player_id: PlayerId, fixture_id: FixtureId, predicted: MatchResult) -> Result<()> {
        sqlx::query(
            "INSERT INTO predictions (player_id, fixture_id, home_score, away_score) VALUES (?, ?, ?, ?) \
             ON CONFLICT(player_id, fixture_id) DO UPDATE SET \
                 home_score = excluded.home_score, away_score = excluded.away_score",
        )
        .bind(player_id)
        .bind(fixture_id)
        .bind(predicted.home)
        .bind(predicted.away)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[tokio::test]
    async fn upsert_overwrites_instead_of_duplicating() {
        let store = Store::in_memory().await.unwrap();
        let comp = store.insert_competition("Euro").await.unwrap();
        let player = store.insert_player("ann").await.unwrap();
        let league = store.insert_league("pub", comp, [Some("O"), None, None]).await.unwrap();
        let sub = store.subscribe(league, player).await.unwrap();
        let kickoff = Utc.with_ymd_and_hms(2024, 6, 14, 19, 0, 0).unwrap();
        let fixture = store.insert_fixture(comp, "GER", "SCO", kickoff, false).await.unwrap();

        let row = |points| PrizePoints { subscription_id: sub, fixture_id: fixture, prize_code: "O".into(), points };
        store.upsert_prize_points(&[row(4)]).await.unwrap();
        store.upsert_prize_points(&[row(-2)]).await.unwrap();

        assert_eq!(store.prize_points(sub, fixture, "O").await.unwrap(), Some(-2));
        assert_eq!(store.prize_points_count(sub).await.unwrap(), 1);
        assert_eq!(store.total_points(sub, "O").await.unwrap(), -2);
        assert_eq!(store.total_points(sub, "SO").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn fixture_queries_respect_clock_and_ordering() {
        let store = Store::in_memory().await.unwrap();
        let comp = store.insert_competition("Euro").await.unwrap();
        let t = |day| Utc.with_ymd_and_hms(2024, 6, day, 19, 0, 0).unwrap();
        let early = store.insert_fixture(comp, "A", "B", t(14), false).await.unwrap();
        let middle = store.insert_fixture(comp, "C", "D", t(15), false).await.unwrap();
        let late = store.insert_fixture(comp, "E", "F", t(20), true).await.unwrap();
        store.set_fixture_result(middle, Some(MatchResult::new(1, 0))).await.unwrap();

        let now = t(16);
        let upcoming: Vec<_> = store.fixtures_after(comp, now).await.unwrap().iter().map(|f| f.id).collect();
        assert_eq!(upcoming, vec![late]);

        let waiting: Vec<_> =
            store.started_fixtures_without_result(comp, now).await.unwrap().iter().map(|f| f.id).collect();
        assert_eq!(waiting, vec![early]);

        let results = store.fixtures_with_result(comp).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].result, Some(MatchResult::new(1, 0)));

        assert!(store.fixture(late).await.unwrap().unwrap().knockout);
        assert!(store.fixture(9999).await.unwrap().is_none());
        assert!(matches!(
            store.set_fixture_result(9999, None).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn predictions_with_blank_scores_have_no_result() {
        let store = Store::in_memory().await.unwrap();
        let comp = store.insert_competition("Euro").await.unwrap();
        let ann = store.insert_player("ann").await.unwrap();
        let ben = store.insert_player("ben").await.unwrap();
        let kickoff = Utc.with_ymd_and_hms(2024, 6, 14, 19, 0, 0).unwrap();
        let fixture = store.insert_fixture(comp, "GER", "SCO", kickoff, false).await.unwrap();

        store.save_prediction(ann, fixture, MatchResult::new(2, 1)).await.unwrap();
        store.save_prediction(ben, fixture, MatchResult::default()).await.unwrap();

        let ann_prediction = store.prediction(ann, fixture).await.unwrap().unwrap();
        assert_eq!(ann_prediction.predicted, Some(MatchResult::new(2, 1)));
        assert_eq!(store.prediction(ben, fixture).await.unwrap().unwrap().predicted, None);
        assert_eq!(store.predictions_for_fixture(fixture).await.unwrap().len(), 2);
    }
}
