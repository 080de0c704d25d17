//! Numeric feature extraction for the prediction model.
//!
//! Every feature is normalized into [0, 1] with an explicit neutral default
//! for missing data, so the downstream model never sees NaN or out-of-range
//! coordinates. The declared order in [`FeatureKind::ORDER`] is the wire
//! order everywhere a vector form is needed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{EligibilityCriteria, StudentProfile};
use super::rules;

/// Model features in their fixed declared order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    GwaStrength,
    YearStanding,
    FinancialNeed,
    BracketNeed,
    HouseholdLoad,
    UnitsProgress,
    EligibilityRatio,
}

pub const FEATURE_COUNT: usize = 7;

impl FeatureKind {
    pub const ORDER: [FeatureKind; FEATURE_COUNT] = [
        FeatureKind::GwaStrength,
        FeatureKind::YearStanding,
        FeatureKind::FinancialNeed,
        FeatureKind::BracketNeed,
        FeatureKind::HouseholdLoad,
        FeatureKind::UnitsProgress,
        FeatureKind::EligibilityRatio,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            FeatureKind::GwaStrength => "gwa_strength",
            FeatureKind::YearStanding => "year_standing",
            FeatureKind::FinancialNeed => "financial_need",
            FeatureKind::BracketNeed => "bracket_need",
            FeatureKind::HouseholdLoad => "household_load",
            FeatureKind::UnitsProgress => "units_progress",
            FeatureKind::EligibilityRatio => "eligibility_ratio",
        }
    }

    /// Value substituted when the underlying profile data is missing.
    pub const fn neutral_default(self) -> f64 {
        match self {
            FeatureKind::HouseholdLoad => 0.3,
            FeatureKind::EligibilityRatio => 0.7,
            _ => 0.5,
        }
    }
}

/// Dense feature map keyed by [`FeatureKind`]; always carries all features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: BTreeMap<FeatureKind, f64>,
}

impl FeatureVector {
    pub(crate) fn from_map(values: BTreeMap<FeatureKind, f64>) -> Self {
        Self { values }
    }

    pub fn get(&self, kind: FeatureKind) -> f64 {
        self.values
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.neutral_default())
    }

    /// Dense array form in the declared feature order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        let mut array = [0.0; FEATURE_COUNT];
        for (slot, kind) in array.iter_mut().zip(FeatureKind::ORDER) {
            *slot = self.get(kind);
        }
        array
    }
}

/// Extracts the normalized feature vector for one student/scholarship pair.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    /// Income ceiling assumed when the scholarship declares none.
    pub income_fallback_ceiling: f64,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            income_fallback_ceiling: 500_000.0,
        }
    }
}

impl FeatureExtractor {
    pub fn new(income_fallback_ceiling: f64) -> Self {
        let sanitized = if income_fallback_ceiling.is_finite() && income_fallback_ceiling > 0.0 {
            income_fallback_ceiling
        } else {
            Self::default().income_fallback_ceiling
        };
        Self {
            income_fallback_ceiling: sanitized,
        }
    }

    pub fn extract(
        &self,
        student: &StudentProfile,
        criteria: &EligibilityCriteria,
    ) -> FeatureVector {
        let mut values = BTreeMap::new();
        values.insert(FeatureKind::GwaStrength, gwa_strength(student));
        values.insert(FeatureKind::YearStanding, year_standing(student));
        values.insert(
            FeatureKind::FinancialNeed,
            self.financial_need(student, criteria),
        );
        values.insert(FeatureKind::BracketNeed, bracket_need(student));
        values.insert(FeatureKind::HouseholdLoad, household_load(student));
        values.insert(FeatureKind::UnitsProgress, units_progress(student));
        values.insert(
            FeatureKind::EligibilityRatio,
            eligibility_ratio(student, criteria),
        );
        FeatureVector::from_map(values)
    }

    /// `1 - income/ceiling`, clamped; a family at or above the ceiling has
    /// zero assessed need.
    fn financial_need(&self, student: &StudentProfile, criteria: &EligibilityCriteria) -> f64 {
        let ceiling = criteria
            .income_ceiling()
            .unwrap_or(self.income_fallback_ceiling);
        match student.annual_family_income {
            Some(income) => (1.0 - income / ceiling).clamp(0.0, 1.0),
            None => FeatureKind::FinancialNeed.neutral_default(),
        }
    }
}

/// `(5 - gwa) / 4` maps the 1.0-best scale onto [0, 1].
fn gwa_strength(student: &StudentProfile) -> f64 {
    match student.gwa {
        Some(gwa) => ((5.0 - gwa) / 4.0).clamp(0.0, 1.0),
        None => FeatureKind::GwaStrength.neutral_default(),
    }
}

fn year_standing(student: &StudentProfile) -> f64 {
    student
        .year_level
        .map(|level| level.standing_weight())
        .unwrap_or_else(|| FeatureKind::YearStanding.neutral_default())
}

fn bracket_need(student: &StudentProfile) -> f64 {
    student
        .st_bracket
        .map(|bracket| bracket.need_weight())
        .unwrap_or_else(|| FeatureKind::BracketNeed.neutral_default())
}

/// `size / 10`, capped; a ten-person household saturates the feature.
fn household_load(student: &StudentProfile) -> f64 {
    match student.household_size {
        Some(size) => (f64::from(size) / 10.0).clamp(0.0, 1.0),
        None => FeatureKind::HouseholdLoad.neutral_default(),
    }
}

/// Units passed relative to the cumulative units expected at the student's
/// standing, capped at 1.0.
fn units_progress(student: &StudentProfile) -> f64 {
    match (student.units_passed, student.year_level) {
        (Some(passed), Some(level)) => {
            (f64::from(passed) / f64::from(level.expected_units())).clamp(0.0, 1.0)
        }
        _ => FeatureKind::UnitsProgress.neutral_default(),
    }
}

/// Fraction of the explicitly declared criteria the student satisfies. A
/// scholarship that declares no criteria gets the documented 0.7 default.
fn eligibility_ratio(student: &StudentProfile, criteria: &EligibilityCriteria) -> f64 {
    match rules::declared_satisfaction(student, criteria) {
        Some((satisfied, declared)) => (satisfied as f64 / declared as f64).clamp(0.0, 1.0),
        None => FeatureKind::EligibilityRatio.neutral_default(),
    }
}
