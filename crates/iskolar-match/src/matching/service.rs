use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::{ScholarshipId, ScholarshipMatch, ScholarshipSnapshot};
use super::features::FeatureExtractor;
use super::profile::{ProfileResolver, RawStudentRecord};
use super::MatchEngine;
use crate::config::MatchingConfig;
use crate::model::{
    DecisionHistory, DecisionOutcome, ModelScope, ModelStore, ModelTrainer, Prediction,
    PredictionService, PredictorConfig, RetrainCoordinator, RetrainPolicy, RetrainStatus,
    TrainerConfig, TrainingLogEntry, TrainingTrigger, WeightCache,
};

/// Combined rule-engine and model verdict for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAssessment {
    pub eligibility: ScholarshipMatch,
    pub prediction: Prediction,
}

/// Service facade composing profile resolution, the rule engine, the
/// prediction layer, and the retrain coordinator. This is the only type the
/// HTTP router and the API crate interact with.
pub struct MatchingService<S, H> {
    resolver: ProfileResolver,
    engine: MatchEngine,
    predictor: PredictionService<S>,
    coordinator: Arc<RetrainCoordinator<S, H>>,
}

impl<S, H> MatchingService<S, H>
where
    S: ModelStore + 'static,
    H: DecisionHistory + 'static,
{
    pub fn new(store: Arc<S>, history: Arc<H>, config: MatchingConfig) -> Self {
        let cache = Arc::new(WeightCache::new(config.cache_ttl_seconds));

        let predictor = PredictionService::new(
            store.clone(),
            cache.clone(),
            FeatureExtractor::new(config.income_fallback_ceiling),
            PredictorConfig {
                probability_floor: config.probability_floor,
                probability_ceiling: config.probability_ceiling,
            },
        );

        let trainer = ModelTrainer::new(TrainerConfig {
            learning_rate: config.learning_rate,
            max_iterations: config.max_iterations,
            l2_penalty: config.l2_penalty,
            convergence_threshold: config.convergence_threshold,
            min_samples: config.min_training_samples,
        });

        let coordinator = Arc::new(RetrainCoordinator::new(
            trainer,
            store,
            history,
            cache,
            RetrainPolicy {
                global_refresh_every: config.global_refresh_every,
                ..RetrainPolicy::default()
            },
        ));

        Self {
            resolver: ProfileResolver,
            engine: MatchEngine::new(config.income_fallback_ceiling),
            predictor,
            coordinator,
        }
    }

    /// Rule-engine verdict only.
    pub fn match_student(
        &self,
        raw: RawStudentRecord,
        scholarship: &ScholarshipSnapshot,
    ) -> Result<ScholarshipMatch, MatchingServiceError> {
        let student = self.resolver.resolve(raw);
        Ok(self.engine.evaluate(&student, scholarship)?)
    }

    /// Model verdict only.
    pub fn predict(
        &self,
        raw: RawStudentRecord,
        scholarship: &ScholarshipSnapshot,
    ) -> Result<Prediction, MatchingServiceError> {
        scholarship.validate()?;
        let student = self.resolver.resolve(raw);
        Ok(self.predictor.predict(
            &student,
            &scholarship.scholarship_id,
            &scholarship.criteria,
        ))
    }

    /// Both layers over one resolved profile, the way screeners consume it.
    pub fn assess(
        &self,
        raw: RawStudentRecord,
        scholarship: &ScholarshipSnapshot,
    ) -> Result<CandidateAssessment, MatchingServiceError> {
        let student = self.resolver.resolve(raw);
        let eligibility = self.engine.evaluate(&student, scholarship)?;
        let prediction = self.predictor.predict(
            &student,
            &scholarship.scholarship_id,
            &scholarship.criteria,
        );
        Ok(CandidateAssessment {
            eligibility,
            prediction,
        })
    }

    /// Record an application decision and schedule retraining.
    pub fn record_decision(
        &self,
        application_id: &str,
        scholarship_id: &ScholarshipId,
        outcome: DecisionOutcome,
        actor: &str,
    ) {
        Arc::clone(&self.coordinator).on_decision(application_id, scholarship_id, outcome, actor);
    }

    /// Manual, synchronous training trigger.
    pub fn train(&self, scope: ModelScope) -> TrainingLogEntry {
        self.coordinator
            .train_scope(scope, TrainingTrigger::Manual)
    }

    pub fn training_status(&self) -> RetrainStatus {
        self.coordinator.status()
    }

    pub fn training_log(&self) -> Vec<TrainingLogEntry> {
        self.coordinator.log()
    }
}

/// Error raised by the matching service facade.
#[derive(Debug, thiserror::Error)]
pub enum MatchingServiceError {
    #[error(transparent)]
    Criteria(#[from] super::domain::CriteriaError),
}
