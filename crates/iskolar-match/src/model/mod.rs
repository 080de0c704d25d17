//! Logistic-regression approval model: training, storage seams, weight
//! caching, prediction, and retrain coordination.

pub mod cache;
pub mod defaults;
pub mod predictor;
pub mod retrain;
pub mod store;
pub mod trainer;

pub use cache::WeightCache;
pub use predictor::{
    ApprovalOutlook, ConfidenceBand, Prediction, PredictionFactor, PredictionService,
    PredictorConfig,
};
pub use retrain::{
    DecisionOutcome, RetrainCoordinator, RetrainPolicy, RetrainStatus, TrainingLogEntry,
    TrainingLogOutcome,
};
pub use store::{DecisionHistory, ModelStore, StoreError};
pub use trainer::{
    ModelTrainer, TrainerConfig, TrainingExample, TrainingOutcome, TrainingReport,
};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matching::{FeatureKind, ScholarshipId};

/// Granularity at which a model is trained and cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelScope {
    Global,
    Scholarship(ScholarshipId),
}

impl ModelScope {
    /// Stable key used for cache entries, advisory locks, and log lines.
    pub fn key(&self) -> String {
        match self {
            ModelScope::Global => "global".to_string(),
            ModelScope::Scholarship(id) => format!("scholarship:{}", id.0),
        }
    }
}

/// Provenance of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingTrigger {
    Manual,
    StatusChange,
    GlobalRefresh,
}

impl TrainingTrigger {
    pub const fn label(self) -> &'static str {
        match self {
            TrainingTrigger::Manual => "manual",
            TrainingTrigger::StatusChange => "auto_status_change",
            TrainingTrigger::GlobalRefresh => "auto_global_refresh",
        }
    }
}

/// Immutable snapshot of a fitted model. A retrain of the same scope
/// produces a new version; existing snapshots are never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub version: String,
    pub scope: ModelScope,
    pub trigger: TrainingTrigger,
    pub weights: BTreeMap<FeatureKind, f64>,
    pub bias: f64,
    pub trained: bool,
    pub trained_at: DateTime<Utc>,
    pub training_size: usize,
    pub metrics: ModelMetrics,
}

/// Fit quality measured on the training set itself (in-sample, not held
/// out).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion: ConfusionMatrix,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    pub fn f1(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl ModelMetrics {
    pub fn from_confusion(confusion: ConfusionMatrix) -> Self {
        Self {
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1: confusion.f1(),
            confusion,
        }
    }
}

/// Where a resolved weight set came from, reported with every prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightSource {
    Scholarship { version: String },
    Global { version: String },
    Defaults,
}

impl WeightSource {
    pub fn describe(&self) -> String {
        match self {
            WeightSource::Scholarship { version } => {
                format!("scholarship-specific model {version}")
            }
            WeightSource::Global { version } => format!("global model {version}"),
            WeightSource::Defaults => "built-in default coefficients".to_string(),
        }
    }
}

/// Weight set actually used for a prediction, after scope resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedWeights {
    pub weights: BTreeMap<FeatureKind, f64>,
    pub bias: f64,
    pub source: WeightSource,
}
