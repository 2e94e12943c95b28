use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::scorer::filters::{FixtureFilter, KnockoutStage};
use crate::scorer::models::{Livermore, ScoringModel, SpotOn};

pub type ScorerCtor = fn() -> Arc<dyn ScoringModel>;
pub type FilterCtor = fn() -> Arc<dyn FixtureFilter>;

pub const LIVERMORE: &str = "livermore";
pub const SPOT_ON: &str = "spot_on";
pub const KNOCKOUT: &str = "knockout";

/// Name → constructor lookup for scoring models and fixture filters. Prize
/// definitions refer to strategies by name only, so a new model or filter is
/// one `register_*` call away from being usable in configuration.
#[derive(Debug, Clone, Default)]
pub struct StrategyRegistry {
    scorers: HashMap<String, ScorerCtor>,
    filters: HashMap<String, FilterCtor>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in strategies.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_scorer(LIVERMORE, || Arc::new(Livermore));
        registry.register_scorer(SPOT_ON, || Arc::new(SpotOn));
        registry.register_filter(KNOCKOUT, || Arc::new(KnockoutStage));
        registry
    }

    /// Later registrations under the same name replace earlier ones.
    pub fn register_scorer(&mut self, name: &str, ctor: ScorerCtor) {
        self.scorers.insert(name.to_string(), ctor);
    }

    pub fn register_filter(&mut self, name: &str, ctor: FilterCtor) {
        self.filters.insert(name.to_string(), ctor);
    }

    pub fn scorer(&self, name: &str) -> Result<Arc<dyn ScoringModel>> {
        self.scorers
            .get(name)
            .map(|ctor| ctor())
            .ok_or_else(|| AppError::UnknownStrategy { kind: "scorer", name: name.to_string() })
    }

    pub fn filter(&self, name: &str) -> Result<Arc<dyn FixtureFilter>> {
        self.filters
            .get(name)
            .map(|ctor| ctor())
            .ok_or_else(|| AppError::UnknownStrategy { kind: "filter", name: name.to_string() })
    }
}
