use std::fmt;
use std::sync::Arc;

use crate::types::MatchResult;

/// Points for a prediction against an actual result. Implementations must be
/// pure: same inputs, same points, no side effects.
pub trait ScoringModel: fmt::Debug + Send + Sync {
    fn compute(&self, predicted: &MatchResult, actual: &MatchResult) -> i32;
}

// ---------------------------------------------------------------------------
// Livermore
// ---------------------------------------------------------------------------

/// Rewards the right outcome, the right margin and each exact score, and
/// subtracts the distance of each wrong score.
#[derive(Debug, Clone, Copy, Default)]
pub struct Livermore;

impl Livermore {
    pub const POINTS_FOR_CORRECT_OUTCOME: i32 = 7;
}

impl ScoringModel for Livermore {
    fn compute(&self, predicted: &MatchResult, actual: &MatchResult) -> i32 {
        let (Some((p_home, p_away)), Some((a_home, a_away))) = (predicted.scores(), actual.scores())
        else {
            return 0;
        };

        let mut points = 0;

        if predicted.is_same_outcome(actual) {
            points += Self::POINTS_FOR_CORRECT_OUTCOME;
        }

        let predicted_margin = p_home - p_away;
        if predicted_margin == a_home - a_away {
            points += predicted_margin.abs();
        }

        points += score_component(p_home, a_home);
        points += score_component(p_away, a_away);

        points
    }
}

/// The score itself when exact, otherwise minus the distance.
fn score_component(predicted: i32, actual: i32) -> i32 {
    if predicted == actual {
        predicted
    } else {
        -(predicted - actual).abs()
    }
}

// ---------------------------------------------------------------------------
// SpotOn
// ---------------------------------------------------------------------------

/// One point for an exact score line, nothing otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpotOn;

impl SpotOn {
    pub const POINTS_FOR_EXACT_SCORE: i32 = 1;
}

impl ScoringModel for SpotOn {
    fn compute(&self, predicted: &MatchResult, actual: &MatchResult) -> i32 {
        match (predicted.scores(), actual.scores()) {
            (Some(p), Some(a)) if p == a => Self::POINTS_FOR_EXACT_SCORE,
            _ => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// MissingPrediction
// ---------------------------------------------------------------------------

/// Scores an absent prediction as if the player had forecast 0-0, using the
/// delegate model. The `predicted` argument is ignored.
#[derive(Debug, Clone)]
pub struct MissingPrediction {
    delegate: Arc<dyn ScoringModel>,
}

impl MissingPrediction {
    pub const IMPOSED_PREDICTION: MatchResult = MatchResult::new(0, 0);

    pub fn new(delegate: Arc<dyn ScoringModel>) -> Self {
        Self { delegate }
    }
}

impl ScoringModel for MissingPrediction {
    fn compute(&self, _predicted: &MatchResult, actual: &MatchResult) -> i32 {
        if !actual.is_complete() {
            return 0;
        }
        self.delegate.compute(&Self::IMPOSED_PREDICTION, actual)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn r(home: i32, away: i32) -> MatchResult {
        MatchResult::new(home, away)
    }

    fn incomplete() -> Vec<MatchResult> {
        vec![
            MatchResult::default(),
            MatchResult { home: Some(1), away: None },
            MatchResult { home: None, away: Some(2) },
        ]
    }

    #[test]
    fn livermore_exact_match_adds_outcome_margin_and_goals() {
        assert_eq!(Livermore.compute(&r(2, 1), &r(2, 1)), 7 + 1 + 2 + 1);
        assert_eq!(Livermore.compute(&r(0, 0), &r(0, 0)), 7);
        assert_eq!(Livermore.compute(&r(3, 3), &r(3, 3)), 7 + 3 + 3);
    }

    #[test]
    fn livermore_exact_draw_is_seven_plus_goals() {
        // margin 0 adds nothing, so a perfect draw is 7 + home + away
        for (h, a) in [(0, 0), (1, 1), (4, 4)] {
            assert_eq!(Livermore.compute(&r(h, a), &r(h, a)), 7 + h + a);
        }
    }

    #[test]
    fn livermore_perfect_non_draw_includes_margin() {
        // 7 for outcome, |margin| for matching margin, then both scores
        assert_eq!(Livermore.compute(&r(3, 0), &r(3, 0)), 7 + 3 + 3 + 0);
    }

    #[test]
    fn livermore_penalises_score_distance() {
        assert_eq!(Livermore.compute(&r(1, 0), &r(2, 1)), 7 + 1 - 1 - 1);
        assert_eq!(Livermore.compute(&r(0, 2), &r(2, 1)), -2 - 1);
    }

    #[test]
    fn livermore_right_margin_wrong_scores() {
        // outcome 7, margin 1, home off by 1, away off by 1
        assert_eq!(Livermore.compute(&r(2, 1), &r(3, 2)), 7 + 1 - 1 - 1);
    }

    #[test]
    fn livermore_is_symmetric_under_home_away_swap() {
        let cases = [(r(2, 1), r(1, 0)), (r(0, 3), r(1, 1)), (r(2, 2), r(2, 2)), (r(4, 1), r(0, 5))];
        for (p, a) in cases {
            let swapped_p = MatchResult { home: p.away, away: p.home };
            let swapped_a = MatchResult { home: a.away, away: a.home };
            assert_eq!(Livermore.compute(&p, &a), Livermore.compute(&swapped_p, &swapped_a));
        }
    }

    #[test]
    fn spot_on_only_scores_exact_lines() {
        assert_eq!(SpotOn.compute(&r(2, 1), &r(2, 1)), 1);
        assert_eq!(SpotOn.compute(&r(1, 2), &r(2, 1)), 0);
        assert_eq!(SpotOn.compute(&r(3, 2), &r(2, 1)), 0);
    }

    #[test]
    fn every_model_scores_incomplete_input_as_zero() {
        let missing = MissingPrediction::new(Arc::new(Livermore));
        for bad in incomplete() {
            assert_eq!(Livermore.compute(&bad, &r(1, 0)), 0);
            assert_eq!(Livermore.compute(&r(1, 0), &bad), 0);
            assert_eq!(SpotOn.compute(&bad, &r(1, 0)), 0);
            assert_eq!(SpotOn.compute(&r(1, 0), &bad), 0);
            assert_eq!(missing.compute(&r(1, 0), &bad), 0);
        }
        assert_eq!(SpotOn.compute(&MatchResult::default(), &MatchResult::default()), 0);
    }

    #[test]
    fn missing_prediction_scores_as_nil_nil() {
        let missing = MissingPrediction::new(Arc::new(Livermore));
        assert_eq!(missing.compute(&MatchResult::default(), &r(2, 1)), -3);
        assert_eq!(missing.compute(&MatchResult::default(), &r(0, 0)), 7);

        let spot_on = MissingPrediction::new(Arc::new(SpotOn));
        assert_eq!(spot_on.compute(&r(5, 5), &r(0, 0)), 1);
    }
}
