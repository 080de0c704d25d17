use crate::matching::domain::{
    EligibilityCriteria, ScholarshipId, ScholarshipSnapshot, StBracket, StudentProfile, YearLevel,
};
use crate::matching::profile::{ProfileResolver, RawStudentRecord};
use crate::matching::MatchEngine;

pub(super) fn engine() -> MatchEngine {
    MatchEngine::default()
}

/// Junior biology student with a strong GWA and deep financial need.
pub(super) fn strong_student() -> StudentProfile {
    StudentProfile {
        student_number: "2021-00042".to_string(),
        gwa: Some(1.25),
        year_level: Some(YearLevel::Junior),
        college: Some("CAS".to_string()),
        course: Some("BS Biology".to_string()),
        major: Some("Genetics".to_string()),
        annual_family_income: Some(50_000.0),
        household_size: Some(6),
        st_bracket: Some(StBracket::FullDiscountWithStipend),
        units_enrolled: Some(18),
        units_passed: Some(92),
        has_approved_thesis: false,
        has_disciplinary_action: false,
        has_existing_scholarship: false,
        profile_completed: true,
    }
}

/// Student with every optional field unreported.
pub(super) fn blank_student() -> StudentProfile {
    ProfileResolver.resolve(RawStudentRecord::default())
}

/// Rubric used by the academic-excellence scenarios: GWA cap 2.00, income
/// cap 500k, CAS only.
pub(super) fn excellence_criteria() -> EligibilityCriteria {
    EligibilityCriteria {
        max_gwa: Some(2.0),
        eligible_colleges: vec!["CAS".to_string()],
        max_annual_family_income: Some(500_000.0),
        forbids_other_scholarship: true,
        forbids_disciplinary_action: true,
        ..EligibilityCriteria::default()
    }
}

pub(super) fn scholarship(criteria: EligibilityCriteria) -> ScholarshipSnapshot {
    ScholarshipSnapshot {
        scholarship_id: ScholarshipId("SCH-001".to_string()),
        name: "Academic Excellence Grant".to_string(),
        criteria,
    }
}
