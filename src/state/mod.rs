pub mod standings_cache;

pub use standings_cache::StandingsCache;
