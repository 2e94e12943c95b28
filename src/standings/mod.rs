pub mod ranker;
pub mod service;
pub mod view;

pub use service::StandingsService;
