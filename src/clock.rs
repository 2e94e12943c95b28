use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{AppError, Result};

/// Source of "now" for deciding which fixtures have started.
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeClock;

impl Clock for RealTimeClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeClock {
    instant: DateTime<Utc>,
}

impl FixedTimeClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

impl Clock for FixedTimeClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// Starts at a configured instant and runs forward in real time from the
/// moment it was built. Used to replay a past tournament.
#[derive(Debug, Clone, Copy)]
pub struct ElapsedTimeClock {
    start: DateTime<Utc>,
    created: Instant,
}

impl ElapsedTimeClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { start, created: Instant::now() }
    }
}

impl Clock for ElapsedTimeClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = TimeDelta::from_std(self.created.elapsed()).unwrap_or_else(|_| TimeDelta::zero());
        self.start.checked_add_signed(elapsed).unwrap_or(self.start)
    }
}

// ---------------------------------------------------------------------------
// ClockMode
// ---------------------------------------------------------------------------

/// Parsed from `CLOCK_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockMode {
    #[default]
    Live,
    Fixed,
    Elapsed,
}

impl ClockMode {
    /// Build the clock. `start` is required for `fixed` and `elapsed`.
    pub fn build(self, start: Option<DateTime<Utc>>) -> Result<Arc<dyn Clock>> {
        let missing_start = || AppError::Config(format!("CLOCK_START is required when CLOCK_MODE={self}"));
        let clock: Arc<dyn Clock> = match self {
            ClockMode::Live => Arc::new(RealTimeClock),
            ClockMode::Fixed => Arc::new(FixedTimeClock::new(start.ok_or_else(missing_start)?)),
            ClockMode::Elapsed => Arc::new(ElapsedTimeClock::new(start.ok_or_else(missing_start)?)),
        };
        Ok(clock)
    }
}

impl fmt::Display for ClockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClockMode::Live => "live",
            ClockMode::Fixed => "fixed",
            ClockMode::Elapsed => "elapsed",
        })
    }
}

impl FromStr for ClockMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" | "real" => Ok(ClockMode::Live),
            "fixed" => Ok(ClockMode::Fixed),
            "elapsed" => Ok(ClockMode::Elapsed),
            other => Err(AppError::Config(format!(
                "CLOCK_MODE must be one of live, fixed, elapsed (got '{other}')"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn kickoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 14, 19, 0, 0).unwrap()
    }

    #[test]
    fn fixed_clock_never_moves() {
        let clock = FixedTimeClock::new(kickoff());
        assert_eq!(clock.now(), kickoff());
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn elapsed_clock_starts_at_start_and_runs_forward() {
        let clock = ElapsedTimeClock::new(kickoff());
        let first = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = clock.now();

        assert!(first >= kickoff());
        assert!(first < kickoff() + TimeDelta::seconds(5));
        assert!(second > first);
    }

    #[test]
    fn real_clock_tracks_wall_time() {
        let before = Utc::now();
        let now = RealTimeClock.now();
        assert!(now >= before);
    }

    #[test]
    fn modes_parse_case_insensitively() {
        assert_eq!("LIVE".parse::<ClockMode>().unwrap(), ClockMode::Live);
        assert_eq!(" fixed ".parse::<ClockMode>().unwrap(), ClockMode::Fixed);
        assert_eq!("elapsed".parse::<ClockMode>().unwrap(), ClockMode::Elapsed);
        assert!("sundial".parse::<ClockMode>().is_err());
    }

    #[test]
    fn fixed_and_elapsed_require_a_start() {
        assert!(ClockMode::Live.build(None).is_ok());
        assert!(matches!(ClockMode::Fixed.build(None), Err(AppError::Config(_))));
        assert!(matches!(ClockMode::Elapsed.build(None), Err(AppError::Config(_))));
        assert_eq!(ClockMode::Fixed.build(Some(kickoff())).unwrap().now(), kickoff());
    }
}
