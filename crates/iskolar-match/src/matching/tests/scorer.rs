use super::common::*;
use crate::matching::domain::EligibilityCriteria;

#[test]
fn excellent_candidate_saturates_the_score() {
    // GWA 1.25 against a 2.00 cap (margin bonus 7.5), income 50k against a
    // 500k ceiling (+10), complete profile (+5): base 100 clamps back to 100.
    let outcome = engine()
        .evaluate(&strong_student(), &scholarship(excellence_criteria()))
        .expect("valid rubric");

    assert!(outcome.eligible);
    assert_eq!(outcome.compatibility, 100);
}

#[test]
fn hard_failure_zeroes_the_score_even_with_excellent_numbers() {
    let mut student = strong_student();
    student.college = Some("CEM".to_string());

    let outcome = engine()
        .evaluate(&student, &scholarship(excellence_criteria()))
        .expect("valid rubric");

    assert!(!outcome.eligible);
    assert_eq!(outcome.compatibility, 0);
}

#[test]
fn conditional_penalties_and_bonuses_compose_arithmetically() {
    let criteria = EligibilityCriteria {
        eligible_majors: vec!["Microbiology".to_string()],
        max_annual_family_income: Some(500_000.0),
        ..EligibilityCriteria::default()
    };

    let mut student = strong_student();
    student.major = Some("Genetics".to_string()); // fails alignment: -20
    student.annual_family_income = Some(300_000.0); // ratio 0.6: +5
    student.units_passed = Some(50); // 50/99 expected: -15
    student.profile_completed = false; // -10, and no completeness bonus

    let outcome = engine()
        .evaluate(&student, &scholarship(criteria))
        .expect("valid rubric");

    assert!(outcome.eligible);
    assert_eq!(outcome.compatibility, 60);
}

#[test]
fn gwa_margin_bonus_is_capped() {
    let criteria = EligibilityCriteria {
        max_gwa: Some(5.0),
        eligible_majors: vec!["Microbiology".to_string()],
        ..EligibilityCriteria::default()
    };

    let mut student = strong_student();
    student.gwa = Some(1.0); // raw margin 40, capped at 15
    student.major = Some("Genetics".to_string()); // -20
    student.annual_family_income = None;
    student.units_passed = None; // soft check passes without data
    student.profile_completed = false; // -10

    let outcome = engine()
        .evaluate(&student, &scholarship(criteria))
        .expect("valid rubric");

    assert!(outcome.eligible);
    // 100 - 20 - 10 + 15; an uncapped margin would have clamped to 100.
    assert_eq!(outcome.compatibility, 85);
}

#[test]
fn mid_need_income_earns_the_smaller_bonus() {
    let criteria = EligibilityCriteria {
        max_annual_family_income: Some(400_000.0),
        eligible_majors: vec!["Microbiology".to_string()],
        ..EligibilityCriteria::default()
    };

    let mut student = strong_student();
    student.major = Some("Genetics".to_string()); // -20
    student.profile_completed = false; // -10
    student.annual_family_income = Some(280_000.0); // ratio 0.7: +5

    let outcome = engine()
        .evaluate(&student, &scholarship(criteria))
        .expect("valid rubric");

    assert_eq!(outcome.compatibility, 75);
}

#[test]
fn scoring_is_deterministic() {
    let first = engine()
        .evaluate(&strong_student(), &scholarship(excellence_criteria()))
        .expect("valid rubric");
    let second = engine()
        .evaluate(&strong_student(), &scholarship(excellence_criteria()))
        .expect("valid rubric");

    assert_eq!(first, second);
}

#[test]
fn score_zero_exactly_when_ineligible() {
    let mut disqualified = strong_student();
    disqualified.has_disciplinary_action = true;

    for (student, criteria) in [
        (strong_student(), excellence_criteria()),
        (disqualified, excellence_criteria()),
        (blank_student(), EligibilityCriteria::default()),
    ] {
        let outcome = engine()
            .evaluate(&student, &scholarship(criteria))
            .expect("valid rubric");
        assert_eq!(outcome.eligible, outcome.compatibility > 0);
        assert!(outcome.compatibility <= 100);
    }
}
