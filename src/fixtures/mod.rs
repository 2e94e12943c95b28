pub mod relevant;
pub mod service;

pub use service::FixtureService;
