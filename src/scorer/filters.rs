use std::fmt;

use crate::types::Fixture;

/// Decides whether a fixture counts towards a prize at all.
pub trait FixtureFilter: fmt::Debug + Send + Sync {
    fn accept(&self, fixture: &Fixture) -> bool;
}

/// Accepts knockout-stage fixtures only.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnockoutStage;

impl FixtureFilter for KnockoutStage {
    fn accept(&self, fixture: &Fixture) -> bool {
        fixture.knockout
    }
}
