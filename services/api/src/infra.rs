use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use iskolar_match::history::HistoricalDecision;
use iskolar_match::matching::ScholarshipId;
use iskolar_match::model::{
    DecisionHistory, ModelScope, ModelStore, StoreError, TrainedModel, TrainingExample,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory model store keeping every version per scope; the newest
/// trained model is the active one.
#[derive(Default)]
pub(crate) struct InMemoryModelStore {
    models: Mutex<HashMap<String, Vec<TrainedModel>>>,
}

impl ModelStore for InMemoryModelStore {
    fn find_active(&self, scope: &ModelScope) -> Result<Option<TrainedModel>, StoreError> {
        let guard = self.models.lock().expect("model store mutex poisoned");
        Ok(guard
            .get(&scope.key())
            .and_then(|versions| versions.last().cloned()))
    }

    fn save(&self, model: TrainedModel) -> Result<String, StoreError> {
        let version = model.version.clone();
        let mut guard = self.models.lock().expect("model store mutex poisoned");
        guard.entry(model.scope.key()).or_default().push(model);
        Ok(version)
    }
}

/// In-memory labeled-decision ledger. Production deployments replace this
/// with the application database; the demo and tests feed it directly.
#[derive(Default)]
pub(crate) struct InMemoryDecisionLedger {
    examples: Mutex<HashMap<String, Vec<TrainingExample>>>,
}

impl InMemoryDecisionLedger {
    pub(crate) fn record(&self, scholarship_id: &ScholarshipId, example: TrainingExample) {
        let scope = ModelScope::Scholarship(scholarship_id.clone());
        let mut guard = self.examples.lock().expect("ledger mutex poisoned");
        guard.entry(scope.key()).or_default().push(example);
    }

    pub(crate) fn ingest(&self, decisions: Vec<HistoricalDecision>) -> usize {
        let count = decisions.len();
        for decision in decisions {
            self.record(&decision.scholarship_id, decision.example);
        }
        count
    }

    pub(crate) fn len(&self) -> usize {
        self.examples
            .lock()
            .expect("ledger mutex poisoned")
            .values()
            .map(Vec::len)
            .sum()
    }
}

impl DecisionHistory for InMemoryDecisionLedger {
    fn labeled_examples(&self, scope: &ModelScope) -> Result<Vec<TrainingExample>, StoreError> {
        let guard = self.examples.lock().expect("ledger mutex poisoned");
        Ok(match scope {
            ModelScope::Global => guard.values().flatten().cloned().collect(),
            scoped => guard.get(&scoped.key()).cloned().unwrap_or_default(),
        })
    }
}
