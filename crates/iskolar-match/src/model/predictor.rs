//! Approval-probability prediction with explainable factors.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::cache::WeightCache;
use super::defaults::{default_weight_map, DEFAULT_BIAS};
use super::store::ModelStore;
use super::trainer::sigmoid;
use super::{ModelScope, ResolvedWeights, WeightSource};
use crate::matching::{
    EligibilityCriteria, FeatureExtractor, FeatureKind, ScholarshipId, StudentProfile,
};

/// Bounds applied to every reported probability so the service never claims
/// certainty either way.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorConfig {
    pub probability_floor: f64,
    pub probability_ceiling: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            probability_floor: 0.05,
            probability_ceiling: 0.95,
        }
    }
}

/// Qualitative read of how far the probability sits from the coin flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    Low,
    Medium,
    Moderate,
    High,
}

impl ConfidenceBand {
    /// Fixed breakpoints on `|probability - 0.5|`.
    pub fn from_probability(probability: f64) -> Self {
        let distance = (probability - 0.5).abs();
        if distance < 0.10 {
            ConfidenceBand::Low
        } else if distance < 0.20 {
            ConfidenceBand::Medium
        } else if distance < 0.30 {
            ConfidenceBand::Moderate
        } else {
            ConfidenceBand::High
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ConfidenceBand::Low => "low",
            ConfidenceBand::Medium => "medium",
            ConfidenceBand::Moderate => "moderate",
            ConfidenceBand::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalOutlook {
    LikelyApproval,
    UnlikelyApproval,
}

impl ApprovalOutlook {
    pub const fn label(self) -> &'static str {
        match self {
            ApprovalOutlook::LikelyApproval => "likely_approval",
            ApprovalOutlook::UnlikelyApproval => "unlikely_approval",
        }
    }
}

/// One feature's contribution to the decision score, for explanations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionFactor {
    pub feature: FeatureKind,
    pub value: f64,
    pub weight: f64,
    pub contribution: f64,
    /// Fraction of the total absolute contribution, in [0, 1].
    pub share: f64,
    pub description: String,
}

/// Probabilistic assessment of one student/scholarship pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub probability: f64,
    pub percentage: u8,
    pub outlook: ApprovalOutlook,
    pub confidence: ConfidenceBand,
    pub factors: Vec<PredictionFactor>,
    pub source: WeightSource,
}

/// Computes bounded approval probabilities from the active weight set.
pub struct PredictionService<S> {
    store: Arc<S>,
    cache: Arc<WeightCache>,
    extractor: FeatureExtractor,
    config: PredictorConfig,
}

impl<S: ModelStore> PredictionService<S> {
    pub fn new(
        store: Arc<S>,
        cache: Arc<WeightCache>,
        extractor: FeatureExtractor,
        config: PredictorConfig,
    ) -> Self {
        Self {
            store,
            cache,
            extractor,
            config,
        }
    }

    /// Resolve the weight set for a scholarship: scholarship-specific model,
    /// then the global model, then built-in defaults.
    ///
    /// Model-backed resolutions are cached under the scholarship's scope and
    /// dropped when that scope retrains. Default resolutions and store
    /// failures are never cached; the store is retried on the next call.
    pub fn resolve_weights(&self, scholarship_id: &ScholarshipId) -> ResolvedWeights {
        let scope = ModelScope::Scholarship(scholarship_id.clone());
        if let Some(cached) = self.cache.get(&scope) {
            return cached;
        }

        let resolved = match self.lookup(&scope) {
            Ok(resolved) => resolved,
            Err(error) => {
                warn!(
                    scope = %scope.key(),
                    %error,
                    "model store unreachable; predicting with default coefficients"
                );
                return default_resolution();
            }
        };

        if resolved.source != WeightSource::Defaults {
            self.cache.put(&scope, resolved.clone());
        }
        resolved
    }

    fn lookup(&self, scope: &ModelScope) -> Result<ResolvedWeights, super::StoreError> {
        if let Some(model) = self.store.find_active(scope)? {
            return Ok(ResolvedWeights {
                weights: model.weights,
                bias: model.bias,
                source: WeightSource::Scholarship {
                    version: model.version,
                },
            });
        }

        if let Some(model) = self.store.find_active(&ModelScope::Global)? {
            return Ok(ResolvedWeights {
                weights: model.weights,
                bias: model.bias,
                source: WeightSource::Global {
                    version: model.version,
                },
            });
        }

        Ok(default_resolution())
    }

    /// Score one student against one scholarship. Total: every input that
    /// reaches this point produces a prediction.
    pub fn predict(
        &self,
        student: &StudentProfile,
        scholarship_id: &ScholarshipId,
        criteria: &EligibilityCriteria,
    ) -> Prediction {
        let features = self.extractor.extract(student, criteria);
        let resolved = self.resolve_weights(scholarship_id);

        let mut z = resolved.bias;
        let mut factors: Vec<PredictionFactor> = Vec::with_capacity(FeatureKind::ORDER.len());
        for kind in FeatureKind::ORDER {
            let value = features.get(kind);
            let weight = resolved.weights.get(&kind).copied().unwrap_or(0.0);
            let contribution = weight * value;
            z += contribution;
            factors.push(PredictionFactor {
                feature: kind,
                value,
                weight,
                contribution,
                share: 0.0,
                description: String::new(),
            });
        }

        let probability = sigmoid(z).clamp(
            self.config.probability_floor,
            self.config.probability_ceiling,
        );

        let total_magnitude: f64 = factors
            .iter()
            .map(|factor| factor.contribution.abs())
            .sum();
        for factor in &mut factors {
            factor.share = if total_magnitude > 0.0 {
                factor.contribution.abs() / total_magnitude
            } else {
                0.0
            };
            factor.description = describe_factor(factor);
        }
        factors.sort_by(|a, b| {
            b.contribution
                .abs()
                .partial_cmp(&a.contribution.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let outlook = if probability >= 0.5 {
            ApprovalOutlook::LikelyApproval
        } else {
            ApprovalOutlook::UnlikelyApproval
        };

        Prediction {
            probability,
            percentage: (probability * 100.0).round() as u8,
            outlook,
            confidence: ConfidenceBand::from_probability(probability),
            factors,
            source: resolved.source,
        }
    }
}

fn default_resolution() -> ResolvedWeights {
    ResolvedWeights {
        weights: default_weight_map(),
        bias: DEFAULT_BIAS,
        source: WeightSource::Defaults,
    }
}

fn describe_factor(factor: &PredictionFactor) -> String {
    let direction = if factor.contribution >= 0.0 {
        "supports approval"
    } else {
        "weighs against approval"
    };

    let subject = match factor.feature {
        FeatureKind::GwaStrength => "Scholastic standing",
        FeatureKind::YearStanding => "Year of standing",
        FeatureKind::FinancialNeed => "Assessed financial need",
        FeatureKind::BracketNeed => "Socialized-tuition bracket",
        FeatureKind::HouseholdLoad => "Household size",
        FeatureKind::UnitsProgress => "Academic load progress",
        FeatureKind::EligibilityRatio => "Fit with the published criteria",
    };

    format!("{subject} ({:.2}) {direction}", factor.value)
}
