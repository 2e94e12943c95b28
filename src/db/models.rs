//! Database row types matching `migrations/`. Converted into the domain types
//! in `types.rs` before leaving the `db` module.

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::types::{Competition, Fixture, League, MatchResult, Player, Prediction, Subscription};

#[derive(Debug, sqlx::FromRow)]
pub struct CompetitionRow {
    pub id: i64,
    pub name: String,
    pub active: bool,
}

impl From<CompetitionRow> for Competition {
    fn from(row: CompetitionRow) -> Self {
        Competition { id: row.id, name: row.name, active: row.active }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct FixtureRow {
    pub id: i64,
    pub competition_id: i64,
    pub home_team: String,
    pub away_team: String,
    pub match_time: i64,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub knockout: bool,
}

impl TryFrom<FixtureRow> for Fixture {
    type Error = AppError;

    fn try_from(row: FixtureRow) -> Result<Self> {
        let match_time = DateTime::<Utc>::from_timestamp(row.match_time, 0).ok_or_else(|| {
            AppError::Database(sqlx::Error::Decode(
                format!("fixture {} has out-of-range match_time {}", row.id, row.match_time).into(),
            ))
        })?;
        Ok(Fixture {
            id: row.id,
            competition_id: row.competition_id,
            home_team: row.home_team,
            away_team: row.away_team,
            match_time,
            result: result_from_columns(row.home_score, row.away_score),
            knockout: row.knockout,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct LeagueRow {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub competition_id: i64,
    pub state: String,
    pub prize_one_code: String,
    pub prize_two_code: Option<String>,
    pub prize_three_code: Option<String>,
}

impl TryFrom<LeagueRow> for League {
    type Error = AppError;

    fn try_from(row: LeagueRow) -> Result<Self> {
        Ok(League {
            id: row.id,
            name: row.name,
            code: row.code,
            competition_id: row.competition_id,
            state: row.state.parse()?,
            prize_codes: [Some(row.prize_one_code), row.prize_two_code, row.prize_three_code],
        })
    }
}

/// Subscription joined with its player's name.
#[derive(Debug, sqlx::FromRow)]
pub struct SubscriptionRow {
    pub id: i64,
    pub league_id: i64,
    pub player_id: i64,
    pub player_name: String,
    pub prize_one_points: i32,
    pub prize_two_points: i32,
    pub prize_three_points: i32,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Subscription {
            id: row.id,
            league_id: row.league_id,
            player: Player { id: row.player_id, name: row.player_name },
            totals: [row.prize_one_points, row.prize_two_points, row.prize_three_points],
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PredictionRow {
    pub player_id: i64,
    pub fixture_id: i64,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

impl From<PredictionRow> for Prediction {
    fn from(row: PredictionRow) -> Self {
        Prediction {
            predictor: row.player_id,
            fixture: row.fixture_id,
            predicted: result_from_columns(row.home_score, row.away_score),
        }
    }
}

/// A row with both score columns NULL means "no result".
pub fn result_from_columns(home: Option<i32>, away: Option<i32>) -> Option<MatchResult> {
    match (home, away) {
        (None, None) => None,
        (home, away) => Some(MatchResult { home, away }),
    }
}
