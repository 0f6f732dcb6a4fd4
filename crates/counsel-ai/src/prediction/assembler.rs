use std::cmp::Ordering;

use tracing::{debug, warn};

use super::config::AssemblyLimits;
use super::domain::{
    College, FinancialProfile, HistoricalCutoff, NormalizedScore, Prediction, ScoreInput,
};
use super::history::CollegeDirectory;
use super::probability::{ProbabilityEstimate, ProbabilityModel, Quota};
use super::scorer::{CompositeScorer, ScoreBreakdown};

/// Turns matched historical rows into a sorted, capped prediction list.
#[derive(Debug, Clone, Default)]
pub struct RecommendationAssembler {
    probability: ProbabilityModel,
    scorer: CompositeScorer,
    limits: AssemblyLimits,
}

impl RecommendationAssembler {
    pub fn new(
        probability: ProbabilityModel,
        scorer: CompositeScorer,
        limits: AssemblyLimits,
    ) -> Self {
        Self {
            probability,
            scorer,
            limits,
        }
    }

    pub fn limits(&self) -> &AssemblyLimits {
        &self.limits
    }

    pub fn assemble<C>(
        &self,
        input: &ScoreInput,
        normalized: &NormalizedScore,
        rows: &[HistoricalCutoff],
        colleges: &C,
        profile: &FinancialProfile,
    ) -> Vec<Prediction>
    where
        C: CollegeDirectory + ?Sized,
    {
        let mut predictions = Vec::new();

        for row in rows {
            let college = match colleges.college(&row.college_id) {
                Ok(Some(college)) => college,
                Ok(None) => {
                    debug!(college_id = %row.college_id, "cutoff references unknown college");
                    continue;
                }
                Err(error) => {
                    warn!(college_id = %row.college_id, %error, "college lookup failed");
                    continue;
                }
            };

            if row.state_quota && !domicile_matches(input, &college) {
                continue;
            }

            let estimate = self.probability.estimate(
                normalized.adjusted_rank,
                row.closing_rank,
                Quota {
                    state_quota: row.state_quota,
                },
                college.college_type,
            );
            if estimate.probability <= self.limits.min_probability {
                continue;
            }

            let breakdown = self.scorer.score(estimate.probability, &college, profile);
            let reasoning = self.reasoning(normalized, row, &college, &estimate, &breakdown);

            predictions.push(Prediction {
                college,
                exam_year: row.exam_year,
                admission_probability: estimate.probability,
                predicted_cutoff_rank: row.closing_rank,
                rank_difference: estimate.rank_difference,
                round: row.round_number,
                state_quota: row.state_quota,
                overall_score: breakdown.overall,
                financial_feasibility: breakdown.financial_feasibility,
                reasoning,
            });
        }

        sort_predictions(&mut predictions);
        predictions.truncate(self.limits.internal_limit);
        predictions
    }

    fn reasoning(
        &self,
        normalized: &NormalizedScore,
        row: &HistoricalCutoff,
        college: &College,
        estimate: &ProbabilityEstimate,
        breakdown: &ScoreBreakdown,
    ) -> String {
        let position = match estimate.rank_difference {
            difference if difference < 0 => format!("{} ranks ahead of", -difference),
            0 => "level with".to_string(),
            difference => format!("{difference} ranks behind"),
        };

        let config = self.probability.config();
        let mut adjustments = Vec::new();
        if estimate.state_quota_applied {
            adjustments.push(format!("state quota x{}", config.state_quota_multiplier));
        }
        if estimate.government_applied {
            adjustments.push(format!("government seat x{}", config.government_multiplier));
        }
        let adjustments = if adjustments.is_empty() {
            String::new()
        } else {
            format!(" ({})", adjustments.join(", "))
        };

        format!(
            "Adjusted rank {} is {} the {} round {} closing rank {} at {}. \
Base chance {:.0}%{}, final {:.0}%. Safety {:.1}/10, placement {:.1}/10, \
annual fee Rs {} against a Rs {} budget (feasibility {:.1}). Overall score {:.2}.",
            normalized.adjusted_rank,
            position,
            row.exam_year,
            row.round_number,
            row.closing_rank,
            college.name,
            estimate.base_probability * 100.0,
            adjustments,
            estimate.probability * 100.0,
            college.safety_score,
            college.placement_score,
            breakdown.annual_fee,
            breakdown.fee_threshold,
            breakdown.financial_feasibility,
            breakdown.overall,
        )
    }
}

/// State-quota seats are reserved for the college's own domicile.
fn domicile_matches(input: &ScoreInput, college: &College) -> bool {
    input
        .state
        .as_deref()
        .map(|state| state.eq_ignore_ascii_case(college.state.trim()))
        .unwrap_or(false)
}

/// Sort by (overall desc, probability desc) with identity fields as a stable tiebreak.
pub(crate) fn sort_predictions(predictions: &mut [Prediction]) {
    predictions.sort_by(|a, b| {
        b.overall_score
            .partial_cmp(&a.overall_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.admission_probability
                    .partial_cmp(&a.admission_probability)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.college.id.cmp(&b.college.id))
            .then_with(|| b.exam_year.cmp(&a.exam_year))
            .then_with(|| a.round.cmp(&b.round))
    });

    debug_assert!(predictions.windows(2).all(|w| {
        let (a, b) = (&w[0], &w[1]);
        a.overall_score > b.overall_score
            || (a.overall_score == b.overall_score
                && a.admission_probability >= b.admission_probability)
    }));
}
