//! Built-in coefficients used before any model has been trained, and as the
//! initialization seed for gradient descent.
//!
//! The values encode the scholarship office's prior: scholastic standing and
//! overall rubric fit dominate, financial need matters, household size and
//! year level nudge.

use std::collections::BTreeMap;

use crate::matching::{FeatureKind, FEATURE_COUNT};

pub const DEFAULT_BIAS: f64 = -1.5;

pub const DEFAULT_WEIGHTS: [(FeatureKind, f64); FEATURE_COUNT] = [
    (FeatureKind::GwaStrength, 2.0),
    (FeatureKind::YearStanding, 0.4),
    (FeatureKind::FinancialNeed, 1.4),
    (FeatureKind::BracketNeed, 0.9),
    (FeatureKind::HouseholdLoad, 0.4),
    (FeatureKind::UnitsProgress, 0.7),
    (FeatureKind::EligibilityRatio, 2.4),
];

/// Fraction of the default vector used to seed gradient descent.
pub(crate) const INITIALIZATION_SCALE: f64 = 0.1;

pub fn default_weight_map() -> BTreeMap<FeatureKind, f64> {
    DEFAULT_WEIGHTS.into_iter().collect()
}
