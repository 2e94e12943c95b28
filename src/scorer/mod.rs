pub mod catalog;
pub mod filters;
pub mod models;
pub mod prize;
pub mod registry;

pub use catalog::{PrizeCatalog, PrizeDefinition};
pub use prize::Prize;
pub use registry::StrategyRegistry;
