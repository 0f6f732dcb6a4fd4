use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use super::assembler::RecommendationAssembler;
use super::cache::{CacheKey, Clock, ResultCache, SystemClock};
use super::calibration::CalibrationError;
use super::config::EngineConfig;
use super::domain::{FinancialProfile, NormalizedScore, Prediction, ScoreInput, ValidationError};
use super::history::{CollegeDirectory, CutoffQuery, HistoricalPatternStore, StoreError};
use super::normalizer::ScoreNormalizer;
use super::probability::ProbabilityModel;
use super::report::{ConfidenceIntervals, PredictionReport, PredictionRequest};
use super::scorer::CompositeScorer;
use crate::config::PredictionSettings;

/// Cached outcome of one recommendation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendations {
    pub normalized: NormalizedScore,
    /// Sorted, capped at the internal limit.
    pub predictions: Vec<Prediction>,
    /// Historical rows the store returned before filtering.
    pub matched_rows: usize,
}

impl Recommendations {
    pub fn data_available(&self) -> bool {
        self.matched_rows > 0
    }
}

/// Service composing the normalizer, historical store, and assembler behind two caches.
pub struct PredictionService<S, C> {
    store: Arc<S>,
    colleges: Arc<C>,
    normalizer: ScoreNormalizer,
    assembler: RecommendationAssembler,
    normalized_cache: ResultCache<CacheKey, NormalizedScore>,
    recommendation_cache: ResultCache<CacheKey, Recommendations>,
    lookback_years: u16,
    store_timeout: Duration,
}

impl<S, C> PredictionService<S, C>
where
    S: HistoricalPatternStore + 'static,
    C: CollegeDirectory + 'static,
{
    pub fn new(store: Arc<S>, colleges: Arc<C>, settings: &PredictionSettings) -> Self {
        Self::from_parts(
            store,
            colleges,
            ScoreNormalizer::default(),
            RecommendationAssembler::default(),
            settings,
            Arc::new(SystemClock),
        )
    }

    /// Service over a custom engine configuration; the calibration is validated first.
    pub fn with_config(
        store: Arc<S>,
        colleges: Arc<C>,
        config: EngineConfig,
        settings: &PredictionSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CalibrationError> {
        let EngineConfig {
            calibration,
            probability,
            weights,
            affordability,
            limits,
        } = config;

        let normalizer = ScoreNormalizer::new(calibration)?;
        let assembler = RecommendationAssembler::new(
            ProbabilityModel::new(probability),
            CompositeScorer::new(weights, affordability),
            limits,
        );
        Ok(Self::from_parts(
            store, colleges, normalizer, assembler, settings, clock,
        ))
    }

    fn from_parts(
        store: Arc<S>,
        colleges: Arc<C>,
        normalizer: ScoreNormalizer,
        assembler: RecommendationAssembler,
        settings: &PredictionSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            colleges,
            normalizer,
            assembler,
            normalized_cache: ResultCache::with_clock(settings.cache_ttl, Arc::clone(&clock)),
            recommendation_cache: ResultCache::with_clock(settings.cache_ttl, clock),
            lookback_years: settings.lookback_years,
            store_timeout: settings.store_timeout,
        }
    }

    pub fn normalize(&self, input: &ScoreInput) -> Result<Arc<NormalizedScore>, ValidationError> {
        let key = CacheKey::new(input, &FinancialProfile::default());
        self.normalized_cache
            .try_get_or_compute(key, || self.normalizer.normalize(input))
    }

    /// Internal prediction list for an input with the default financial profile.
    pub fn recommend(&self, input: &ScoreInput) -> Result<Vec<Prediction>, ValidationError> {
        self.recommend_for(input, &FinancialProfile::default())
            .map(|recommendations| recommendations.predictions.clone())
    }

    /// Recommendations for an input; store failures degrade to an empty, uncached result.
    pub fn recommend_for(
        &self,
        input: &ScoreInput,
        profile: &FinancialProfile,
    ) -> Result<Arc<Recommendations>, ValidationError> {
        let normalized = self.normalize(input)?;
        let key = CacheKey::new(input, profile);

        let query = CutoffQuery::new(
            input.exam(),
            input.category,
            input.year.saturating_sub(self.lookback_years)..=input.year,
        )
        .with_deadline(Utc::now() + self.store_timeout);

        let computed = self.recommendation_cache.try_get_or_compute(key, || {
            let rows = self.store.query(&query)?;
            debug!(rows = rows.len(), "historical cutoffs matched");
            let predictions = self.assembler.assemble(
                input,
                &normalized,
                &rows,
                self.colleges.as_ref(),
                profile,
            );
            Ok::<_, StoreError>(Recommendations {
                normalized: (*normalized).clone(),
                predictions,
                matched_rows: rows.len(),
            })
        });

        match computed {
            Ok(recommendations) => Ok(recommendations),
            Err(error) => {
                warn!(
                    %error,
                    exam = %input.exam(),
                    "historical store failed, returning no predictions"
                );
                Ok(Arc::new(Recommendations {
                    normalized: (*normalized).clone(),
                    predictions: Vec::new(),
                    matched_rows: 0,
                }))
            }
        }
    }

    /// Full request/response cycle for the wire shape.
    pub fn predict(&self, request: PredictionRequest) -> Result<PredictionReport, ValidationError> {
        let (input, profile) = request.into_input()?;
        let recommendations = self.recommend_for(&input, &profile)?;

        let display_limit = self.assembler.limits().display_limit;
        let predictions: Vec<Prediction> = recommendations
            .predictions
            .iter()
            .take(display_limit)
            .cloned()
            .collect();
        let confidence_intervals = ConfidenceIntervals::from_predictions(&predictions);

        info!(
            exam = %input.exam(),
            category = input.category.label(),
            year = input.year,
            adjusted_rank = recommendations.normalized.adjusted_rank,
            returned = predictions.len(),
            "prediction served"
        );

        Ok(PredictionReport {
            low_confidence: recommendations.normalized.is_low_confidence(),
            normalized_score: recommendations.normalized.clone(),
            predictions,
            confidence_intervals,
            data_available: recommendations.data_available(),
        })
    }

    pub fn clear_cache(&self) {
        self.normalized_cache.clear();
        self.recommendation_cache.clear();
    }

    pub fn normalizer(&self) -> &ScoreNormalizer {
        &self.normalizer
    }
}
