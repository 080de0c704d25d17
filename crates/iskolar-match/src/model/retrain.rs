//! Retrain coordination: decision-triggered, fire-and-forget, serialized
//! per scope.
//!
//! `on_decision` returns immediately; the actual run happens on a spawned
//! task. A scope with a run already in flight skips the new trigger (logged,
//! not an error). Failures never reach the caller that recorded the
//! decision; they land in the bounded training log instead.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::cache::WeightCache;
use super::store::{DecisionHistory, ModelStore};
use super::trainer::{ModelTrainer, TrainingOutcome};
use super::{ModelScope, TrainingTrigger};
use crate::matching::ScholarshipId;

/// Cadence and bookkeeping knobs for automatic retraining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrainPolicy {
    /// A global retrain is scheduled every this many recorded decisions.
    pub global_refresh_every: u64,
    /// Entries retained in the training log ring.
    pub log_capacity: usize,
}

impl Default for RetrainPolicy {
    fn default() -> Self {
        Self {
            global_refresh_every: 25,
            log_capacity: 20,
        }
    }
}

/// Terminal application statuses that feed the training history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    Approved,
    Rejected,
}

/// What happened to one training attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum TrainingLogOutcome {
    Trained {
        version: String,
        iterations: usize,
        accuracy: f64,
        converged: bool,
    },
    Skipped {
        reason: String,
    },
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingLogEntry {
    pub scope: String,
    pub trigger: TrainingTrigger,
    pub finished_at: DateTime<Utc>,
    pub outcome: TrainingLogOutcome,
}

/// Read-only snapshot for the introspection endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrainStatus {
    pub decisions_seen: u64,
    pub scopes_in_flight: Vec<String>,
    pub recent: Vec<TrainingLogEntry>,
}

/// Owns the advisory locks, decision counter, and training log.
pub struct RetrainCoordinator<S, H> {
    trainer: ModelTrainer,
    store: Arc<S>,
    history: Arc<H>,
    cache: Arc<WeightCache>,
    policy: RetrainPolicy,
    decisions: AtomicU64,
    in_flight: Mutex<HashSet<String>>,
    log: Mutex<VecDeque<TrainingLogEntry>>,
}

impl<S, H> RetrainCoordinator<S, H>
where
    S: ModelStore + 'static,
    H: DecisionHistory + 'static,
{
    pub fn new(
        trainer: ModelTrainer,
        store: Arc<S>,
        history: Arc<H>,
        cache: Arc<WeightCache>,
        policy: RetrainPolicy,
    ) -> Self {
        Self {
            trainer,
            store,
            history,
            cache,
            policy,
            decisions: AtomicU64::new(0),
            in_flight: Mutex::new(HashSet::new()),
            log: Mutex::new(VecDeque::new()),
        }
    }

    /// Entry point for application-decision events. Schedules retraining of
    /// the scholarship scope and, on the configured cadence, the global
    /// scope; never blocks and never fails.
    pub fn on_decision(
        self: Arc<Self>,
        application_id: &str,
        scholarship_id: &ScholarshipId,
        outcome: DecisionOutcome,
        actor: &str,
    ) {
        let seen = self.decisions.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            application_id,
            scholarship_id = %scholarship_id.0,
            ?outcome,
            actor,
            seen,
            "application decision recorded; scheduling retrain"
        );

        let refresh_due = seen % self.policy.global_refresh_every == 0;

        Arc::clone(&self).schedule(
            ModelScope::Scholarship(scholarship_id.clone()),
            TrainingTrigger::StatusChange,
        );

        if refresh_due {
            self.schedule(ModelScope::Global, TrainingTrigger::GlobalRefresh);
        }
    }

    /// Spawn a training run on the next scheduler tick.
    pub fn schedule(self: Arc<Self>, scope: ModelScope, trigger: TrainingTrigger) {
        tokio::spawn(async move {
            self.train_scope(scope, trigger);
        });
    }

    /// Run one training attempt synchronously, honoring the per-scope
    /// advisory lock. Used directly for manual triggers so the caller gets
    /// the log entry back.
    pub fn train_scope(&self, scope: ModelScope, trigger: TrainingTrigger) -> TrainingLogEntry {
        let key = scope.key();

        if !self.begin(&key) {
            warn!(scope = %key, "training already in flight; skipping trigger");
            let entry = TrainingLogEntry {
                scope: key,
                trigger,
                finished_at: Utc::now(),
                outcome: TrainingLogOutcome::Skipped {
                    reason: "training already in flight for this scope".to_string(),
                },
            };
            self.push_log(entry.clone());
            return entry;
        }

        let outcome = self.run(&scope, trigger);
        self.finish(&key);

        let entry = TrainingLogEntry {
            scope: key,
            trigger,
            finished_at: Utc::now(),
            outcome,
        };
        self.push_log(entry.clone());
        entry
    }

    /// Fetch history, fit, persist, invalidate. Every failure is converted
    /// into a log outcome here at the task boundary.
    fn run(&self, scope: &ModelScope, trigger: TrainingTrigger) -> TrainingLogOutcome {
        let examples = match self.history.labeled_examples(scope) {
            Ok(examples) => examples,
            Err(error) => {
                warn!(scope = %scope.key(), %error, "decision history unavailable");
                return TrainingLogOutcome::Failed {
                    message: format!("decision history unavailable: {error}"),
                };
            }
        };

        match self.trainer.train(scope.clone(), trigger, &examples) {
            TrainingOutcome::InsufficientSamples {
                available,
                required,
            } => {
                info!(
                    scope = %scope.key(),
                    available,
                    required,
                    "not enough labeled decisions to train"
                );
                TrainingLogOutcome::Skipped {
                    reason: format!(
                        "{available} labeled decision(s) available, {required} required"
                    ),
                }
            }
            TrainingOutcome::Trained(report) => {
                let iterations = report.iterations;
                let converged = report.converged;
                let accuracy = report.model.metrics.accuracy;

                match self.store.save(report.model) {
                    Ok(version) => {
                        self.cache.invalidate(scope);
                        info!(
                            scope = %scope.key(),
                            version,
                            iterations,
                            accuracy,
                            "model trained and activated"
                        );
                        TrainingLogOutcome::Trained {
                            version,
                            iterations,
                            accuracy,
                            converged,
                        }
                    }
                    Err(error) => {
                        warn!(scope = %scope.key(), %error, "trained model could not be saved");
                        TrainingLogOutcome::Failed {
                            message: format!("model store rejected the new model: {error}"),
                        }
                    }
                }
            }
        }
    }

    pub fn status(&self) -> RetrainStatus {
        let mut scopes_in_flight: Vec<String> = self
            .in_flight
            .lock()
            .expect("in-flight mutex poisoned")
            .iter()
            .cloned()
            .collect();
        scopes_in_flight.sort();

        RetrainStatus {
            decisions_seen: self.decisions.load(Ordering::Relaxed),
            scopes_in_flight,
            recent: self.log(),
        }
    }

    /// Most recent training attempts, newest first.
    pub fn log(&self) -> Vec<TrainingLogEntry> {
        self.log
            .lock()
            .expect("training log mutex poisoned")
            .iter()
            .rev()
            .cloned()
            .collect()
    }

    fn begin(&self, key: &str) -> bool {
        self.in_flight
            .lock()
            .expect("in-flight mutex poisoned")
            .insert(key.to_string())
    }

    fn finish(&self, key: &str) {
        self.in_flight
            .lock()
            .expect("in-flight mutex poisoned")
            .remove(key);
    }

    fn push_log(&self, entry: TrainingLogEntry) {
        let mut guard = self.log.lock().expect("training log mutex poisoned");
        if guard.len() == self.policy.log_capacity {
            guard.pop_front();
        }
        guard.push_back(entry);
    }
}
