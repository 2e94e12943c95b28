use std::sync::Arc;

use serde::Serialize;

use crate::scorer::filters::FixtureFilter;
use crate::scorer::models::ScoringModel;
use crate::types::{Fixture, MatchResult};

/// A scoring category played within a league: which fixtures count and how
/// each prediction (or missing prediction) is scored.
#[derive(Debug, Clone, Serialize)]
pub struct Prize {
    code: String,
    name: String,
    #[serde(skip)]
    scorer: Arc<dyn ScoringModel>,
    #[serde(skip)]
    filters: Vec<Arc<dyn FixtureFilter>>,
    #[serde(skip)]
    missing_prediction_scorer: Option<Arc<dyn ScoringModel>>,
}

impl Prize {
    pub fn new(code: impl Into<String>, name: impl Into<String>, scorer: Arc<dyn ScoringModel>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            scorer,
            filters: Vec::new(),
            missing_prediction_scorer: None,
        }
    }

    /// Filters run in the given order; the first rejection excludes the fixture.
    pub fn with_filters(mut self, filters: Vec<Arc<dyn FixtureFilter>>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_missing_prediction_scorer(mut self, scorer: Arc<dyn ScoringModel>) -> Self {
        self.missing_prediction_scorer = Some(scorer);
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accepts(&self, fixture: &Fixture) -> bool {
        self.filters.iter().all(|f| f.accept(fixture))
    }

    /// Points earned on `fixture` by `predicted`, which is `None` when the
    /// player never entered a prediction.
    pub fn calculate_points(&self, fixture: &Fixture, predicted: Option<&MatchResult>) -> i32 {
        if !self.accepts(fixture) {
            return 0;
        }

        let actual = fixture.actual_result();
        match (predicted, &self.missing_prediction_scorer) {
            (Some(predicted), _) => self.scorer.compute(predicted, &actual),
            (None, Some(missing)) => missing.compute(&MatchResult::default(), &actual),
            (None, None) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::scorer::filters::KnockoutStage;
    use crate::scorer::models::{Livermore, MissingPrediction, SpotOn};

    fn fixture(knockout: bool, result: Option<MatchResult>) -> Fixture {
        Fixture {
            id: 1,
            competition_id: 1,
            home_team: "Home".to_string(),
            away_team: "Away".to_string(),
            match_time: Utc.with_ymd_and_hms(2024, 6, 14, 19, 0, 0).unwrap(),
            result,
            knockout,
        }
    }

    fn overall() -> Prize {
        let livermore: Arc<dyn ScoringModel> = Arc::new(Livermore);
        Prize::new("O", "Overall", livermore.clone())
            .with_missing_prediction_scorer(Arc::new(MissingPrediction::new(livermore)))
    }

    #[derive(Debug, Default)]
    struct Counting {
        verdict: bool,
        calls: AtomicUsize,
    }

    impl FixtureFilter for Counting {
        fn accept(&self, _fixture: &Fixture) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.verdict
        }
    }

    #[test]
    fn primary_scorer_handles_real_predictions() {
        let f = fixture(false, Some(MatchResult::new(2, 1)));
        assert_eq!(overall().calculate_points(&f, Some(&MatchResult::new(2, 1))), 11);
    }

    #[test]
    fn missing_prediction_goes_through_fallback_scorer() {
        let f = fixture(false, Some(MatchResult::new(2, 1)));
        assert_eq!(overall().calculate_points(&f, None), -3);
    }

    #[test]
    fn missing_prediction_without_fallback_scores_zero() {
        let f = fixture(false, Some(MatchResult::new(0, 0)));
        let spot_on = Prize::new("SO", "Spot-on", Arc::new(SpotOn));
        assert_eq!(spot_on.calculate_points(&f, None), 0);
    }

    #[test]
    fn no_result_yet_scores_zero() {
        let f = fixture(false, None);
        assert_eq!(overall().calculate_points(&f, Some(&MatchResult::new(1, 0))), 0);
        assert_eq!(overall().calculate_points(&f, None), 0);
    }

    #[test]
    fn rejected_fixture_scores_zero_even_for_missing_prediction() {
        let knockout = overall().with_filters(vec![Arc::new(KnockoutStage) as Arc<dyn FixtureFilter>]);
        let group_game = fixture(false, Some(MatchResult::new(2, 1)));
        assert_eq!(knockout.calculate_points(&group_game, Some(&MatchResult::new(2, 1))), 0);
        assert_eq!(knockout.calculate_points(&group_game, None), 0);

        let final_game = fixture(true, Some(MatchResult::new(2, 1)));
        assert_eq!(knockout.calculate_points(&final_game, Some(&MatchResult::new(2, 1))), 11);
    }

    #[test]
    fn filters_short_circuit_on_first_rejection() {
        let reject = Arc::new(Counting { verdict: false, ..Default::default() });
        let never_reached = Arc::new(Counting { verdict: true, ..Default::default() });
        let prize = overall().with_filters(vec![
            reject.clone() as Arc<dyn FixtureFilter>,
            never_reached.clone() as Arc<dyn FixtureFilter>,
        ]);

        prize.calculate_points(&fixture(true, Some(MatchResult::new(1, 1))), None);

        assert_eq!(reject.calls.load(Ordering::SeqCst), 1);
        assert_eq!(never_reached.calls.load(Ordering::SeqCst), 0);
    }
}
