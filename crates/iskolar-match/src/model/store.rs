use super::{ModelScope, TrainedModel};
use crate::model::trainer::TrainingExample;

/// Persistence seam for trained models so the engine can run against any
/// backing store (and entirely in memory for tests and demos).
pub trait ModelStore: Send + Sync {
    /// Most recent trained model for the scope, if any.
    fn find_active(&self, scope: &ModelScope) -> Result<Option<TrainedModel>, StoreError>;

    /// Persist a new model snapshot, returning the stored version.
    fn save(&self, model: TrainedModel) -> Result<String, StoreError>;
}

/// Source of labeled historical decisions used as training input. Owned by
/// the application service; this crate only reads from it.
pub trait DecisionHistory: Send + Sync {
    fn labeled_examples(&self, scope: &ModelScope) -> Result<Vec<TrainingExample>, StoreError>;
}

/// Error enumeration for model persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("model store unavailable: {0}")]
    Unavailable(String),
    #[error("model payload rejected: {0}")]
    Rejected(String),
}
