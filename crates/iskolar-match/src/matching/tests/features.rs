use super::common::*;
use crate::matching::domain::EligibilityCriteria;
use crate::matching::features::{FeatureExtractor, FeatureKind, FEATURE_COUNT};
use crate::matching::profile::{ProfileResolver, RawStudentRecord};

#[test]
fn every_feature_stays_in_the_unit_interval() {
    let extractor = FeatureExtractor::default();
    let criteria = excellence_criteria();

    let extremes = [
        strong_student(),
        blank_student(),
        ProfileResolver.resolve(RawStudentRecord {
            gwa: Some(5.0),
            annual_family_income: Some(9_000_000.0),
            household_size: Some(30),
            units_passed: Some(300.0),
            year_level: Some("Freshman".to_string()),
            ..RawStudentRecord::default()
        }),
    ];

    for student in &extremes {
        let features = extractor.extract(student, &criteria);
        for value in features.to_array() {
            assert!(
                (0.0..=1.0).contains(&value),
                "feature escaped [0,1]: {value}"
            );
            assert!(value.is_finite());
        }
    }
}

#[test]
fn array_form_follows_the_declared_order() {
    let extractor = FeatureExtractor::default();
    let features = extractor.extract(&strong_student(), &excellence_criteria());

    let array = features.to_array();
    assert_eq!(array.len(), FEATURE_COUNT);
    for (index, kind) in FeatureKind::ORDER.into_iter().enumerate() {
        assert_eq!(array[index], features.get(kind));
    }
}

#[test]
fn gwa_strength_follows_the_linear_map() {
    let extractor = FeatureExtractor::default();
    let features = extractor.extract(&strong_student(), &excellence_criteria());
    // (5 - 1.25) / 4
    assert!((features.get(FeatureKind::GwaStrength) - 0.9375).abs() < 1e-12);
}

#[test]
fn financial_need_uses_the_declared_ceiling() {
    let extractor = FeatureExtractor::default();
    let features = extractor.extract(&strong_student(), &excellence_criteria());
    // 1 - 50_000 / 500_000
    assert!((features.get(FeatureKind::FinancialNeed) - 0.9).abs() < 1e-12);
}

#[test]
fn income_at_or_above_the_ceiling_zeroes_the_need() {
    let extractor = FeatureExtractor::default();
    let mut student = strong_student();
    student.annual_family_income = Some(600_000.0);

    let features = extractor.extract(&student, &excellence_criteria());
    assert_eq!(features.get(FeatureKind::FinancialNeed), 0.0);
}

#[test]
fn fallback_income_ceiling_applies_when_undeclared() {
    let extractor = FeatureExtractor::new(500_000.0);
    let student = strong_student();

    let features = extractor.extract(&student, &EligibilityCriteria::default());
    assert!((features.get(FeatureKind::FinancialNeed) - 0.9).abs() < 1e-12);
}

#[test]
fn missing_fields_use_the_documented_neutral_defaults() {
    let extractor = FeatureExtractor::default();
    let features = extractor.extract(&blank_student(), &EligibilityCriteria::default());

    assert_eq!(features.get(FeatureKind::GwaStrength), 0.5);
    assert_eq!(features.get(FeatureKind::YearStanding), 0.5);
    assert_eq!(features.get(FeatureKind::FinancialNeed), 0.5);
    assert_eq!(features.get(FeatureKind::BracketNeed), 0.5);
    assert_eq!(features.get(FeatureKind::HouseholdLoad), 0.3);
    assert_eq!(features.get(FeatureKind::UnitsProgress), 0.5);
    // No declared criteria at all: documented 0.7 default.
    assert_eq!(features.get(FeatureKind::EligibilityRatio), 0.7);
}

#[test]
fn units_progress_caps_at_one() {
    let extractor = FeatureExtractor::default();
    let mut student = strong_student();
    student.units_passed = Some(250);

    let features = extractor.extract(&student, &excellence_criteria());
    assert_eq!(features.get(FeatureKind::UnitsProgress), 1.0);
}

#[test]
fn eligibility_ratio_reflects_declared_criteria_satisfaction() {
    let extractor = FeatureExtractor::default();
    let criteria = excellence_criteria();

    let all_satisfied = extractor.extract(&strong_student(), &criteria);
    assert_eq!(all_satisfied.get(FeatureKind::EligibilityRatio), 1.0);

    let mut failing = strong_student();
    failing.college = Some("CEM".to_string());
    failing.annual_family_income = Some(700_000.0);
    let partial = extractor.extract(&failing, &criteria);
    let ratio = partial.get(FeatureKind::EligibilityRatio);
    assert!(ratio < 1.0);
    assert!(ratio > 0.0);
}
