use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub type CompetitionId = i64;
pub type FixtureId = i64;
pub type LeagueId = i64;
pub type PlayerId = i64;
pub type SubscriptionId = i64;

// ---------------------------------------------------------------------------
// MatchResult
// ---------------------------------------------------------------------------

/// A score line. Either side may be missing while a result is being entered,
/// and a missing side makes the whole result unusable for scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchResult {
    pub home: Option<i32>,
    pub away: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl MatchResult {
    pub const fn new(home: i32, away: i32) -> Self {
        Self { home: Some(home), away: Some(away) }
    }

    /// Both scores, if both are present.
    pub fn scores(&self) -> Option<(i32, i32)> {
        Some((self.home?, self.away?))
    }

    pub fn is_complete(&self) -> bool {
        self.scores().is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        let (home, away) = self.scores()?;
        Some(match home.cmp(&away) {
            Ordering::Greater => Outcome::HomeWin,
            Ordering::Equal => Outcome::Draw,
            Ordering::Less => Outcome::AwayWin,
        })
    }

    /// False unless both results are complete and agree on win/draw/loss.
    pub fn is_same_outcome(&self, other: &MatchResult) -> bool {
        match (self.outcome(), other.outcome()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let side = |s: Option<i32>| s.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string());
        write!(f, "{} - {}", side(self.home), side(self.away))
    }
}

impl FromStr for MatchResult {
    type Err = AppError;

    /// Accepts "2-1", "2 - 1", "2v1", "2 1", "2+1", "2*1", "2#1".
    /// Scores are one to three digits.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AppError::InvalidResult(s.to_string());
        let text = s.trim();

        let digits_end = |t: &str| t.find(|c: char| !c.is_ascii_digit()).unwrap_or(t.len());
        let parse_score = |t: &str| -> Result<i32> {
            if t.is_empty() || t.len() > 3 {
                return Err(invalid());
            }
            t.parse::<i32>().map_err(|_| invalid())
        };

        let split = digits_end(text);
        let home = parse_score(&text[..split])?;

        let rest = text[split..].trim_start_matches(' ');
        let mut chars = rest.chars();
        let rest = match chars.next() {
            Some('v' | '-' | '+' | '*' | '#') => chars.as_str().trim_start_matches(' '),
            // A bare space separator was already consumed above.
            Some(c) if c.is_ascii_digit() && rest.len() < text[split..].len() => rest,
            _ => return Err(invalid()),
        };

        let split = digits_end(rest);
        if split != rest.len() {
            return Err(invalid());
        }
        let away = parse_score(rest)?;

        Ok(MatchResult::new(home, away))
    }
}

/// Parse user-entered result text. Blank text means "no result".
pub fn parse_result_text(text: &str) -> Result<Option<MatchResult>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    text.parse().map(Some)
}

// ---------------------------------------------------------------------------
// Competitions and fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competition {
    pub id: CompetitionId,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    pub competition_id: CompetitionId,
    pub home_team: String,
    pub away_team: String,
    pub match_time: DateTime<Utc>,
    pub result: Option<MatchResult>,
    /// Eligibility attribute read by the knockout-stage filter.
    pub knockout: bool,
}

impl Fixture {
    /// Calendar day the fixture is played on, used for day-boundary windowing.
    pub fn match_date(&self) -> NaiveDate {
        self.match_time.date_naive()
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.match_time < now
    }

    /// The actual result, or an empty one when none has been entered.
    pub fn actual_result(&self) -> MatchResult {
        self.result.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub predictor: PlayerId,
    pub fixture: FixtureId,
    pub predicted: Option<MatchResult>,
}

// ---------------------------------------------------------------------------
// Leagues and subscriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeagueState {
    Open,
    Active,
    Closed,
}

impl std::fmt::Display for LeagueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LeagueState::Open => "open",
            LeagueState::Active => "active",
            LeagueState::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

impl FromStr for LeagueState {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(LeagueState::Open),
            "active" => Ok(LeagueState::Active),
            "closed" => Ok(LeagueState::Closed),
            other => Err(AppError::Config(format!("unknown league state '{other}'"))),
        }
    }
}

/// Position of a prize code within a league's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrizeSlot {
    First,
    Second,
    Third,
}

impl PrizeSlot {
    pub const ALL: [PrizeSlot; 3] = [PrizeSlot::First, PrizeSlot::Second, PrizeSlot::Third];

    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn index(self) -> usize {
        match self {
            PrizeSlot::First => 0,
            PrizeSlot::Second => 1,
            PrizeSlot::Third => 2,
        }
    }

    pub fn from_number(n: u8) -> Result<Self> {
        match n {
            1 => Ok(PrizeSlot::First),
            2 => Ok(PrizeSlot::Second),
            3 => Ok(PrizeSlot::Third),
            _ => Err(AppError::InvalidSlot(n)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub name: String,
    pub code: String,
    pub competition_id: CompetitionId,
    pub state: LeagueState,
    /// Slot 1 is mandatory; slots 2 and 3 may be unconfigured.
    pub prize_codes: [Option<String>; 3],
}

impl League {
    pub fn prize_code(&self, slot: PrizeSlot) -> Option<&str> {
        self.prize_codes[slot.index()].as_deref().filter(|code| !code.is_empty())
    }

    /// Configured slots in slot order.
    pub fn configured_prizes(&self) -> impl Iterator<Item = (PrizeSlot, &str)> + '_ {
        PrizeSlot::ALL
            .into_iter()
            .filter_map(|slot| self.prize_code(slot).map(|code| (slot, code)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub league_id: LeagueId,
    pub player: Player,
    /// Running totals indexed by prize slot.
    pub totals: [i32; 3],
}

impl Subscription {
    pub fn points(&self, slot: PrizeSlot) -> i32 {
        self.totals[slot.index()]
    }
}

// ---------------------------------------------------------------------------
// Points and standings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizePoints {
    pub subscription_id: SubscriptionId,
    pub fixture_id: FixtureId,
    pub prize_code: String,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStanding {
    pub player: Player,
    /// 1 = leader. 0 only on the unranked placeholder.
    pub position: u32,
    pub points: i32,
}

impl PlayerStanding {
    pub fn unranked(player: Player) -> Self {
        Self { player, position: 0, points: 0 }
    }

    /// Points desc, then name asc, then id asc.
    pub fn display_order(&self, other: &Self) -> Ordering {
        other
            .points
            .cmp(&self.points)
            .then_with(|| self.player.name.cmp(&other.player.name))
            .then_with(|| self.player.id.cmp(&other.player.id))
    }
}

/// A cached standing decorated for one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonalisedStanding {
    #[serde(flatten)]
    pub standing: PlayerStanding,
    pub highlighted: bool,
    pub ranked: bool,
}

impl PersonalisedStanding {
    pub fn new(standing: PlayerStanding, highlighted: bool) -> Self {
        Self { standing, highlighted, ranked: true }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
