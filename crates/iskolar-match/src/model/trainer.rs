//! Batch gradient-descent trainer for the logistic approval model.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::defaults::{DEFAULT_BIAS, DEFAULT_WEIGHTS, INITIALIZATION_SCALE};
use super::{ConfusionMatrix, ModelMetrics, ModelScope, TrainedModel, TrainingTrigger};
use crate::matching::{FeatureKind, FeatureVector, FEATURE_COUNT};

/// Keeps predicted probabilities away from exact 0/1 inside the loss.
const PROBABILITY_EPSILON: f64 = 1e-12;

/// Classification threshold used for the in-sample metrics.
const DECISION_THRESHOLD: f64 = 0.5;

static MODEL_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_version(scope: &ModelScope) -> String {
    let sequence = MODEL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}-{sequence:04}", scope.key())
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// One historical application: the feature snapshot taken at decision time
/// and whether the scholarship was granted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub features: FeatureVector,
    pub approved: bool,
}

/// Gradient-descent hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    pub learning_rate: f64,
    pub max_iterations: usize,
    pub l2_penalty: f64,
    pub convergence_threshold: f64,
    pub min_samples: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_iterations: 500,
            l2_penalty: 0.01,
            convergence_threshold: 1e-6,
            min_samples: 10,
        }
    }
}

/// Result of a training request. Too few samples is an expected outcome,
/// not an error; the active model is left untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingOutcome {
    Trained(Box<TrainingReport>),
    InsufficientSamples { available: usize, required: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub model: TrainedModel,
    pub iterations: usize,
    pub final_loss: f64,
    pub converged: bool,
}

/// Fits logistic-regression weights from labeled history.
#[derive(Debug, Clone, Default)]
pub struct ModelTrainer {
    config: TrainerConfig,
}

impl ModelTrainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn train(
        &self,
        scope: ModelScope,
        trigger: TrainingTrigger,
        examples: &[TrainingExample],
    ) -> TrainingOutcome {
        if examples.len() < self.config.min_samples {
            return TrainingOutcome::InsufficientSamples {
                available: examples.len(),
                required: self.config.min_samples,
            };
        }

        let inputs: Vec<[f64; FEATURE_COUNT]> = examples
            .iter()
            .map(|example| example.features.to_array())
            .collect();
        let targets: Vec<f64> = examples
            .iter()
            .map(|example| if example.approved { 1.0 } else { 0.0 })
            .collect();

        let fit = descend(&self.config, &inputs, &targets);

        let confusion = confusion_matrix(&fit, &inputs, &targets);
        let metrics = ModelMetrics::from_confusion(confusion);

        let weights = FeatureKind::ORDER
            .into_iter()
            .zip(fit.weights)
            .collect();

        let model = TrainedModel {
            version: next_version(&scope),
            scope,
            trigger,
            weights,
            bias: fit.bias,
            trained: true,
            trained_at: Utc::now(),
            training_size: examples.len(),
            metrics,
        };

        TrainingOutcome::Trained(Box::new(TrainingReport {
            model,
            iterations: fit.iterations,
            final_loss: fit.losses.last().copied().unwrap_or(f64::INFINITY),
            converged: fit.converged,
        }))
    }
}

pub(crate) struct FitResult {
    pub(crate) weights: [f64; FEATURE_COUNT],
    pub(crate) bias: f64,
    pub(crate) iterations: usize,
    pub(crate) losses: Vec<f64>,
    pub(crate) converged: bool,
}

/// Full-batch gradient descent with L2 regularization on the weights and
/// early stop once the loss delta falls under the convergence threshold.
pub(crate) fn descend(
    config: &TrainerConfig,
    inputs: &[[f64; FEATURE_COUNT]],
    targets: &[f64],
) -> FitResult {
    let count = inputs.len() as f64;

    let mut weights = [0.0; FEATURE_COUNT];
    for (slot, (_, default)) in weights.iter_mut().zip(DEFAULT_WEIGHTS) {
        *slot = default * INITIALIZATION_SCALE;
    }
    let mut bias = DEFAULT_BIAS * INITIALIZATION_SCALE;

    let mut losses = Vec::new();
    let mut converged = false;
    let mut iterations = 0;

    for _ in 0..config.max_iterations {
        iterations += 1;

        let predictions: Vec<f64> = inputs
            .iter()
            .map(|row| sigmoid(bias + dot(&weights, row)))
            .collect();

        let loss = cross_entropy(&predictions, targets);
        let previous = losses.last().copied();
        losses.push(loss);

        if let Some(previous) = previous {
            if (previous - loss).abs() < config.convergence_threshold {
                converged = true;
                break;
            }
        }

        let mut weight_gradients = [0.0; FEATURE_COUNT];
        let mut bias_gradient = 0.0;
        for (row, (prediction, target)) in
            inputs.iter().zip(predictions.iter().zip(targets.iter()))
        {
            let error = prediction - target;
            for (gradient, value) in weight_gradients.iter_mut().zip(row) {
                *gradient += error * value;
            }
            bias_gradient += error;
        }

        for (weight, gradient) in weights.iter_mut().zip(weight_gradients) {
            let regularized = gradient / count + config.l2_penalty * *weight;
            *weight -= config.learning_rate * regularized;
        }
        bias -= config.learning_rate * (bias_gradient / count);
    }

    FitResult {
        weights,
        bias,
        iterations,
        losses,
        converged,
    }
}

fn dot(weights: &[f64; FEATURE_COUNT], row: &[f64; FEATURE_COUNT]) -> f64 {
    weights
        .iter()
        .zip(row)
        .map(|(weight, value)| weight * value)
        .sum()
}

/// Mean binary cross-entropy with probabilities clamped away from {0, 1}.
fn cross_entropy(predictions: &[f64], targets: &[f64]) -> f64 {
    let total: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(prediction, target)| {
            let p = prediction.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
            -(target * p.ln() + (1.0 - target) * (1.0 - p).ln())
        })
        .sum();
    total / predictions.len() as f64
}

fn confusion_matrix(
    fit: &FitResult,
    inputs: &[[f64; FEATURE_COUNT]],
    targets: &[f64],
) -> ConfusionMatrix {
    let mut confusion = ConfusionMatrix::default();
    for (row, target) in inputs.iter().zip(targets) {
        let predicted = sigmoid(fit.bias + dot(&fit.weights, row)) >= DECISION_THRESHOLD;
        let actual = *target >= DECISION_THRESHOLD;
        match (predicted, actual) {
            (true, true) => confusion.true_positive += 1,
            (true, false) => confusion.false_positive += 1,
            (false, true) => confusion.false_negative += 1,
            (false, false) => confusion.true_negative += 1,
        }
    }
    confusion
}
