//! Scholarship matching: profile resolution, rule evaluation, scoring, and
//! the service facade tying the rule engine to the prediction layer.

pub mod domain;
pub mod features;
pub mod profile;
pub mod router;
pub(crate) mod rules;
pub(crate) mod scorer;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CheckImportance, CheckResult, CriteriaError, Criterion, EligibilityCriteria, ScholarshipId,
    ScholarshipMatch, ScholarshipSnapshot, StBracket, StudentProfile, YearLevel,
};
pub use features::{FeatureExtractor, FeatureKind, FeatureVector, FEATURE_COUNT};
pub use profile::{ProfileResolver, RawStudentRecord};
pub use router::matching_router;
pub use service::{CandidateAssessment, MatchingService, MatchingServiceError};

/// Stateless rule engine evaluating one student against one scholarship.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    income_fallback_ceiling: f64,
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self {
            income_fallback_ceiling: 500_000.0,
        }
    }
}

impl MatchEngine {
    pub fn new(income_fallback_ceiling: f64) -> Self {
        Self {
            income_fallback_ceiling,
        }
    }

    /// Run both rule stages and compose the compatibility score.
    ///
    /// The only failure mode is an incoherent scholarship rubric; student
    /// data never causes an error, only failed checks.
    pub fn evaluate(
        &self,
        student: &StudentProfile,
        scholarship: &ScholarshipSnapshot,
    ) -> Result<ScholarshipMatch, CriteriaError> {
        scholarship.validate()?;

        let hard = rules::hard_checks(student, &scholarship.criteria);
        let conditional = rules::conditional_checks(student, &scholarship.criteria);

        let eligible = hard.iter().all(|evaluated| evaluated.check.passed);
        let compatibility = scorer::compatibility_score(
            student,
            &scholarship.criteria,
            &hard,
            &conditional,
            self.income_fallback_ceiling,
        );

        let checks = hard
            .into_iter()
            .chain(conditional)
            .map(|evaluated| evaluated.check)
            .collect();

        Ok(ScholarshipMatch {
            scholarship_id: scholarship.scholarship_id.clone(),
            eligible,
            compatibility,
            checks,
        })
    }
}
