use super::common::*;
use crate::matching::domain::{
    CheckImportance, Criterion, EligibilityCriteria, StBracket, YearLevel,
};

#[test]
fn undeclared_criteria_pass_automatically() {
    let outcome = engine()
        .evaluate(&strong_student(), &scholarship(EligibilityCriteria::default()))
        .expect("valid rubric");

    assert!(outcome.eligible);
    assert!(outcome
        .checks
        .iter()
        .filter(|check| check.importance == CheckImportance::Required)
        .all(|check| check.passed));
    assert!(outcome
        .checks
        .iter()
        .any(|check| check.required_value == "no requirement"));
}

#[test]
fn single_college_mismatch_disqualifies_regardless_of_strengths() {
    let mut student = strong_student();
    student.college = Some("CEM".to_string());

    let outcome = engine()
        .evaluate(&student, &scholarship(excellence_criteria()))
        .expect("valid rubric");

    assert!(!outcome.eligible);
    assert_eq!(outcome.compatibility, 0);

    let college = outcome
        .checks
        .iter()
        .find(|check| check.criterion == Criterion::College)
        .expect("college check present");
    assert!(!college.passed);
    assert_eq!(college.student_value, "CEM");
    assert_eq!(college.required_value, "CAS");
}

#[test]
fn missing_data_fails_an_active_requirement() {
    let mut student = strong_student();
    student.gwa = None;

    let outcome = engine()
        .evaluate(&student, &scholarship(excellence_criteria()))
        .expect("valid rubric");

    assert!(!outcome.eligible);
    let gwa = outcome
        .checks
        .iter()
        .find(|check| check.criterion == Criterion::GwaCeiling)
        .expect("gwa check present");
    assert!(!gwa.passed);
    assert_eq!(gwa.student_value, "not reported");
}

#[test]
fn existing_scholarship_fails_the_exclusivity_requirement() {
    let mut student = strong_student();
    student.has_existing_scholarship = true;

    let outcome = engine()
        .evaluate(&student, &scholarship(excellence_criteria()))
        .expect("valid rubric");

    assert!(!outcome.eligible);
    let check = outcome
        .checks
        .iter()
        .find(|check| check.criterion == Criterion::OtherScholarship)
        .expect("exclusivity check present");
    assert!(!check.passed);
}

#[test]
fn uncollected_fields_pass_but_stay_visible() {
    let criteria = EligibilityCriteria {
        filipino_only: true,
        forbids_thesis_grant: true,
        eligible_provinces: vec!["Laguna".to_string()],
        ..excellence_criteria()
    };

    let outcome = engine()
        .evaluate(&strong_student(), &scholarship(criteria))
        .expect("valid rubric");

    assert!(outcome.eligible);
    for criterion in [
        Criterion::Citizenship,
        Criterion::ThesisGrant,
        Criterion::Province,
    ] {
        let check = outcome
            .checks
            .iter()
            .find(|check| check.criterion == criterion)
            .expect("uncollected check present");
        assert!(check.passed);
        assert_eq!(check.student_value, "not collected");
    }
}

#[test]
fn required_bracket_and_year_level_gate_membership() {
    let criteria = EligibilityCriteria {
        required_year_levels: vec![YearLevel::Junior, YearLevel::Senior],
        required_st_brackets: vec![StBracket::FullDiscountWithStipend, StBracket::FullDiscount],
        ..EligibilityCriteria::default()
    };

    let outcome = engine()
        .evaluate(&strong_student(), &scholarship(criteria.clone()))
        .expect("valid rubric");
    assert!(outcome.eligible);

    let mut sophomore = strong_student();
    sophomore.year_level = Some(YearLevel::Sophomore);
    let outcome = engine()
        .evaluate(&sophomore, &scholarship(criteria))
        .expect("valid rubric");
    assert!(!outcome.eligible);
}

#[test]
fn conditional_failures_never_disqualify() {
    let criteria = EligibilityCriteria {
        eligible_majors: vec!["Microbiology".to_string()],
        preferred_st_brackets: vec![StBracket::NoDiscount],
        ..EligibilityCriteria::default()
    };

    let outcome = engine()
        .evaluate(&strong_student(), &scholarship(criteria))
        .expect("valid rubric");

    assert!(outcome.eligible);
    assert!(outcome.compatibility > 0);

    let failed_preferred: Vec<_> = outcome
        .checks
        .iter()
        .filter(|check| !check.passed)
        .collect();
    assert!(!failed_preferred.is_empty());
    assert!(failed_preferred
        .iter()
        .all(|check| check.importance == CheckImportance::Preferred));
}

#[test]
fn check_order_is_stable_across_evaluations() {
    let first = engine()
        .evaluate(&strong_student(), &scholarship(excellence_criteria()))
        .expect("valid rubric");
    let second = engine()
        .evaluate(&strong_student(), &scholarship(excellence_criteria()))
        .expect("valid rubric");

    let first_order: Vec<Criterion> = first.checks.iter().map(|check| check.criterion).collect();
    let second_order: Vec<Criterion> = second.checks.iter().map(|check| check.criterion).collect();
    assert_eq!(first_order, second_order);
    assert_eq!(first_order[0], Criterion::GwaCeiling);
    assert_eq!(
        *first_order.last().expect("non-empty"),
        Criterion::ProfileCompleteness
    );
}

#[test]
fn incoherent_rubrics_are_rejected_up_front() {
    let criteria = EligibilityCriteria {
        max_gwa: Some(7.5),
        ..EligibilityCriteria::default()
    };

    let error = engine()
        .evaluate(&strong_student(), &scholarship(criteria))
        .expect_err("rubric rejected");
    assert!(error.to_string().contains("7.5"));
}
