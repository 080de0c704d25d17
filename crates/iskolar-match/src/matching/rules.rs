//! Hard (disqualifying) and conditional (score-penalty) eligibility checks.
//!
//! Check order is fixed so evaluations are reproducible for audits. A
//! criterion the scholarship does not declare passes automatically; a
//! student missing the data behind an active hard requirement fails that
//! check. Conditional checks never disqualify and never penalize missing
//! data.

use super::domain::{
    CheckImportance, CheckResult, Criterion, EligibilityCriteria, StBracket, StudentProfile,
    YearLevel,
};
use super::profile::tokens_match;

/// Score penalty weights for the conditional checks, in evaluation order.
pub(crate) const MAJOR_ALIGNMENT_WEIGHT: f64 = 0.20;
pub(crate) const PREFERRED_BRACKET_WEIGHT: f64 = 0.15;
pub(crate) const UNITS_PROGRESS_WEIGHT: f64 = 0.15;
pub(crate) const PROFILE_COMPLETENESS_WEIGHT: f64 = 0.10;

/// A student is "on track" when they have passed at least this share of the
/// units expected at their standing.
const UNITS_PROGRESS_FLOOR: f64 = 0.75;

const NOT_REPORTED: &str = "not reported";
const NOT_COLLECTED: &str = "not collected";
const NO_REQUIREMENT: &str = "no requirement";

pub(crate) struct Evaluated {
    pub(crate) check: CheckResult,
    /// Whether the scholarship explicitly declared this criterion. Feeds the
    /// eligibility-ratio meta-feature.
    pub(crate) declared: bool,
    /// Score penalty applied when a conditional check fails; 0 for hard checks.
    pub(crate) weight: f64,
}

/// Evaluate the hard checks in their fixed order.
pub(crate) fn hard_checks(
    student: &StudentProfile,
    criteria: &EligibilityCriteria,
) -> Vec<Evaluated> {
    vec![
        gwa_ceiling(student, criteria),
        gwa_floor(student, criteria),
        year_level(student, criteria),
        college(student, criteria),
        course(student, criteria),
        income_ceiling(student, criteria),
        st_bracket(student, criteria),
        units_enrolled(student, criteria),
        citizenship(criteria),
        approved_thesis(student, criteria),
        other_scholarship(student, criteria),
        thesis_grant(criteria),
        disciplinary_action(student, criteria),
        province(criteria),
    ]
}

/// Evaluate the conditional checks in their fixed order.
pub(crate) fn conditional_checks(
    student: &StudentProfile,
    criteria: &EligibilityCriteria,
) -> Vec<Evaluated> {
    vec![
        major_alignment(student, criteria),
        preferred_st_bracket(student, criteria),
        units_progress(student),
        profile_completeness(student),
    ]
}

/// `(satisfied, declared)` over the explicitly declared criteria, or `None`
/// when the scholarship declares none at all.
pub(crate) fn declared_satisfaction(
    student: &StudentProfile,
    criteria: &EligibilityCriteria,
) -> Option<(usize, usize)> {
    let declared: Vec<Evaluated> = hard_checks(student, criteria)
        .into_iter()
        .chain(conditional_checks(student, criteria))
        .filter(|evaluated| evaluated.declared)
        .collect();

    if declared.is_empty() {
        return None;
    }

    let satisfied = declared
        .iter()
        .filter(|evaluated| evaluated.check.passed)
        .count();
    Some((satisfied, declared.len()))
}

fn pass(
    criterion: Criterion,
    importance: CheckImportance,
    student_value: String,
    required_value: String,
    weight: f64,
) -> Evaluated {
    Evaluated {
        check: CheckResult {
            criterion,
            passed: true,
            student_value,
            required_value,
            importance,
        },
        declared: true,
        weight,
    }
}

fn fail(
    criterion: Criterion,
    importance: CheckImportance,
    student_value: String,
    required_value: String,
    weight: f64,
) -> Evaluated {
    Evaluated {
        check: CheckResult {
            criterion,
            passed: false,
            student_value,
            required_value,
            importance,
        },
        declared: true,
        weight,
    }
}

/// Criterion the scholarship did not declare: automatic pass, not counted
/// toward the eligibility ratio.
fn no_requirement(
    criterion: Criterion,
    importance: CheckImportance,
    student_value: String,
) -> Evaluated {
    Evaluated {
        check: CheckResult {
            criterion,
            passed: true,
            student_value,
            required_value: NO_REQUIREMENT.to_string(),
            importance,
        },
        declared: false,
        weight: 0.0,
    }
}

fn display_gwa(gwa: Option<f64>) -> String {
    gwa.map(|value| format!("{value:.2}"))
        .unwrap_or_else(|| NOT_REPORTED.to_string())
}

fn display_text(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| NOT_REPORTED.to_string())
}

fn join_labels<T, F: Fn(&T) -> String>(items: &[T], label: F) -> String {
    items.iter().map(label).collect::<Vec<_>>().join(", ")
}

fn gwa_ceiling(student: &StudentProfile, criteria: &EligibilityCriteria) -> Evaluated {
    let Some(cap) = criteria.max_gwa else {
        return no_requirement(
            Criterion::GwaCeiling,
            CheckImportance::Required,
            display_gwa(student.gwa),
        );
    };

    let required = format!("GWA of {cap:.2} or better");
    match student.gwa {
        Some(gwa) if gwa <= cap => pass(
            Criterion::GwaCeiling,
            CheckImportance::Required,
            display_gwa(Some(gwa)),
            required,
            0.0,
        ),
        other => fail(
            Criterion::GwaCeiling,
            CheckImportance::Required,
            display_gwa(other),
            required,
            0.0,
        ),
    }
}

fn gwa_floor(student: &StudentProfile, criteria: &EligibilityCriteria) -> Evaluated {
    let Some(floor) = criteria.min_gwa else {
        return no_requirement(
            Criterion::GwaFloor,
            CheckImportance::Required,
            display_gwa(student.gwa),
        );
    };

    let required = format!("GWA of at least {floor:.2}");
    match student.gwa {
        Some(gwa) if gwa >= floor => pass(
            Criterion::GwaFloor,
            CheckImportance::Required,
            display_gwa(Some(gwa)),
            required,
            0.0,
        ),
        other => fail(
            Criterion::GwaFloor,
            CheckImportance::Required,
            display_gwa(other),
            required,
            0.0,
        ),
    }
}

fn year_level(student: &StudentProfile, criteria: &EligibilityCriteria) -> Evaluated {
    let student_value = student
        .year_level
        .map(YearLevel::label)
        .unwrap_or(NOT_REPORTED)
        .to_string();

    if criteria.required_year_levels.is_empty() {
        return no_requirement(Criterion::YearLevel, CheckImportance::Required, student_value);
    }

    let required = join_labels(&criteria.required_year_levels, |level| {
        level.label().to_string()
    });
    match student.year_level {
        Some(level) if criteria.required_year_levels.contains(&level) => pass(
            Criterion::YearLevel,
            CheckImportance::Required,
            student_value,
            required,
            0.0,
        ),
        _ => fail(
            Criterion::YearLevel,
            CheckImportance::Required,
            student_value,
            required,
            0.0,
        ),
    }
}

fn membership_check(
    criterion: Criterion,
    student_value: &Option<String>,
    allowed: &[String],
) -> Evaluated {
    let display = display_text(student_value);
    if allowed.is_empty() {
        return no_requirement(criterion, CheckImportance::Required, display);
    }

    let required = allowed.join(", ");
    match student_value {
        Some(value) if allowed.iter().any(|entry| tokens_match(entry, value)) => pass(
            criterion,
            CheckImportance::Required,
            display,
            required,
            0.0,
        ),
        _ => fail(criterion, CheckImportance::Required, display, required, 0.0),
    }
}

fn college(student: &StudentProfile, criteria: &EligibilityCriteria) -> Evaluated {
    membership_check(Criterion::College, &student.college, &criteria.eligible_colleges)
}

fn course(student: &StudentProfile, criteria: &EligibilityCriteria) -> Evaluated {
    membership_check(Criterion::Course, &student.course, &criteria.eligible_courses)
}

fn income_ceiling(student: &StudentProfile, criteria: &EligibilityCriteria) -> Evaluated {
    let student_value = student
        .annual_family_income
        .map(|income| format!("PHP {income:.0}"))
        .unwrap_or_else(|| NOT_REPORTED.to_string());

    let Some(ceiling) = criteria.income_ceiling() else {
        return no_requirement(
            Criterion::IncomeCeiling,
            CheckImportance::Required,
            student_value,
        );
    };

    let required = format!("annual family income at most PHP {ceiling:.0}");
    match student.annual_family_income {
        Some(income) if income <= ceiling => pass(
            Criterion::IncomeCeiling,
            CheckImportance::Required,
            student_value,
            required,
            0.0,
        ),
        _ => fail(
            Criterion::IncomeCeiling,
            CheckImportance::Required,
            student_value,
            required,
            0.0,
        ),
    }
}

fn st_bracket(student: &StudentProfile, criteria: &EligibilityCriteria) -> Evaluated {
    let student_value = student
        .st_bracket
        .map(StBracket::label)
        .unwrap_or(NOT_REPORTED)
        .to_string();

    if criteria.required_st_brackets.is_empty() {
        return no_requirement(Criterion::StBracket, CheckImportance::Required, student_value);
    }

    let required = join_labels(&criteria.required_st_brackets, |bracket| {
        bracket.code().to_string()
    });
    match student.st_bracket {
        Some(bracket) if criteria.required_st_brackets.contains(&bracket) => pass(
            Criterion::StBracket,
            CheckImportance::Required,
            student_value,
            required,
            0.0,
        ),
        _ => fail(
            Criterion::StBracket,
            CheckImportance::Required,
            student_value,
            required,
            0.0,
        ),
    }
}

fn units_enrolled(student: &StudentProfile, criteria: &EligibilityCriteria) -> Evaluated {
    let student_value = student
        .units_enrolled
        .map(|units| units.to_string())
        .unwrap_or_else(|| NOT_REPORTED.to_string());

    let Some(minimum) = criteria.min_units_enrolled else {
        return no_requirement(
            Criterion::UnitsEnrolled,
            CheckImportance::Required,
            student_value,
        );
    };

    let required = format!("at least {minimum} units enrolled");
    match student.units_enrolled {
        Some(units) if units >= minimum => pass(
            Criterion::UnitsEnrolled,
            CheckImportance::Required,
            student_value,
            required,
            0.0,
        ),
        _ => fail(
            Criterion::UnitsEnrolled,
            CheckImportance::Required,
            student_value,
            required,
            0.0,
        ),
    }
}

// The profile service does not collect citizenship, thesis-grant, or
// province-of-residence data yet. The checks below stay visible in the
// result list so the gap is auditable, but they cannot fail until the
// upstream fields exist.

fn citizenship(criteria: &EligibilityCriteria) -> Evaluated {
    if !criteria.filipino_only {
        return no_requirement(
            Criterion::Citizenship,
            CheckImportance::Required,
            NOT_COLLECTED.to_string(),
        );
    }

    pass(
        Criterion::Citizenship,
        CheckImportance::Required,
        NOT_COLLECTED.to_string(),
        "Filipino citizen".to_string(),
        0.0,
    )
}

fn thesis_grant(criteria: &EligibilityCriteria) -> Evaluated {
    if !criteria.forbids_thesis_grant {
        return no_requirement(
            Criterion::ThesisGrant,
            CheckImportance::Required,
            NOT_COLLECTED.to_string(),
        );
    }

    pass(
        Criterion::ThesisGrant,
        CheckImportance::Required,
        NOT_COLLECTED.to_string(),
        "no concurrent thesis grant".to_string(),
        0.0,
    )
}

fn province(criteria: &EligibilityCriteria) -> Evaluated {
    if criteria.eligible_provinces.is_empty() {
        return no_requirement(
            Criterion::Province,
            CheckImportance::Required,
            NOT_COLLECTED.to_string(),
        );
    }

    pass(
        Criterion::Province,
        CheckImportance::Required,
        NOT_COLLECTED.to_string(),
        criteria.eligible_provinces.join(", "),
        0.0,
    )
}

fn approved_thesis(student: &StudentProfile, criteria: &EligibilityCriteria) -> Evaluated {
    let student_value = if student.has_approved_thesis {
        "approved thesis on record"
    } else {
        "no approved thesis"
    }
    .to_string();

    if !criteria.requires_approved_thesis {
        return no_requirement(
            Criterion::ApprovedThesis,
            CheckImportance::Required,
            student_value,
        );
    }

    let required = "approved thesis proposal".to_string();
    if student.has_approved_thesis {
        pass(
            Criterion::ApprovedThesis,
            CheckImportance::Required,
            student_value,
            required,
            0.0,
        )
    } else {
        fail(
            Criterion::ApprovedThesis,
            CheckImportance::Required,
            student_value,
            required,
            0.0,
        )
    }
}

fn other_scholarship(student: &StudentProfile, criteria: &EligibilityCriteria) -> Evaluated {
    let student_value = if student.has_existing_scholarship {
        "holds an existing scholarship"
    } else {
        "no existing scholarship"
    }
    .to_string();

    if !criteria.forbids_other_scholarship {
        return no_requirement(
            Criterion::OtherScholarship,
            CheckImportance::Required,
            student_value,
        );
    }

    let required = "no concurrent scholarship".to_string();
    if student.has_existing_scholarship {
        fail(
            Criterion::OtherScholarship,
            CheckImportance::Required,
            student_value,
            required,
            0.0,
        )
    } else {
        pass(
            Criterion::OtherScholarship,
            CheckImportance::Required,
            student_value,
            required,
            0.0,
        )
    }
}

fn disciplinary_action(student: &StudentProfile, criteria: &EligibilityCriteria) -> Evaluated {
    let student_value = if student.has_disciplinary_action {
        "disciplinary record on file"
    } else {
        "clean disciplinary record"
    }
    .to_string();

    if !criteria.forbids_disciplinary_action {
        return no_requirement(
            Criterion::DisciplinaryAction,
            CheckImportance::Required,
            student_value,
        );
    }

    let required = "no disciplinary record".to_string();
    if student.has_disciplinary_action {
        fail(
            Criterion::DisciplinaryAction,
            CheckImportance::Required,
            student_value,
            required,
            0.0,
        )
    } else {
        pass(
            Criterion::DisciplinaryAction,
            CheckImportance::Required,
            student_value,
            required,
            0.0,
        )
    }
}

fn major_alignment(student: &StudentProfile, criteria: &EligibilityCriteria) -> Evaluated {
    let display = display_text(&student.major);
    if criteria.eligible_majors.is_empty() {
        return no_requirement(Criterion::MajorAlignment, CheckImportance::Preferred, display);
    }

    let required = criteria.eligible_majors.join(", ");
    match &student.major {
        Some(major)
            if criteria
                .eligible_majors
                .iter()
                .any(|entry| tokens_match(entry, major)) =>
        {
            pass(
                Criterion::MajorAlignment,
                CheckImportance::Preferred,
                display,
                required,
                MAJOR_ALIGNMENT_WEIGHT,
            )
        }
        _ => fail(
            Criterion::MajorAlignment,
            CheckImportance::Preferred,
            display,
            required,
            MAJOR_ALIGNMENT_WEIGHT,
        ),
    }
}

fn preferred_st_bracket(student: &StudentProfile, criteria: &EligibilityCriteria) -> Evaluated {
    let student_value = student
        .st_bracket
        .map(StBracket::label)
        .unwrap_or(NOT_REPORTED)
        .to_string();

    if criteria.preferred_st_brackets.is_empty() {
        return no_requirement(
            Criterion::PreferredStBracket,
            CheckImportance::Preferred,
            student_value,
        );
    }

    let required = join_labels(&criteria.preferred_st_brackets, |bracket| {
        bracket.code().to_string()
    });
    match student.st_bracket {
        Some(bracket) if criteria.preferred_st_brackets.contains(&bracket) => pass(
            Criterion::PreferredStBracket,
            CheckImportance::Preferred,
            student_value,
            required,
            PREFERRED_BRACKET_WEIGHT,
        ),
        _ => fail(
            Criterion::PreferredStBracket,
            CheckImportance::Preferred,
            student_value,
            required,
            PREFERRED_BRACKET_WEIGHT,
        ),
    }
}

/// Intrinsic soft check: a student well behind the units expected at their
/// standing is a weaker fit. Missing data is not penalized.
fn units_progress(student: &StudentProfile) -> Evaluated {
    let required = format!(
        "at least {:.0}% of expected units completed",
        UNITS_PROGRESS_FLOOR * 100.0
    );

    let (passed, student_value) = match (student.units_passed, student.year_level) {
        (Some(passed_units), Some(level)) => {
            let expected = f64::from(level.expected_units());
            let ratio = f64::from(passed_units) / expected;
            (
                ratio >= UNITS_PROGRESS_FLOOR,
                format!("{passed_units} of {expected:.0} expected units"),
            )
        }
        _ => (true, NOT_REPORTED.to_string()),
    };

    Evaluated {
        check: CheckResult {
            criterion: Criterion::UnitsProgress,
            passed,
            student_value,
            required_value: required,
            importance: CheckImportance::Preferred,
        },
        declared: false,
        weight: UNITS_PROGRESS_WEIGHT,
    }
}

/// Intrinsic soft check rewarding a fully completed profile.
fn profile_completeness(student: &StudentProfile) -> Evaluated {
    Evaluated {
        check: CheckResult {
            criterion: Criterion::ProfileCompleteness,
            passed: student.profile_completed,
            student_value: if student.profile_completed {
                "profile complete".to_string()
            } else {
                "profile incomplete".to_string()
            },
            required_value: "completed applicant profile".to_string(),
            importance: CheckImportance::Preferred,
        },
        declared: false,
        weight: PROFILE_COMPLETENESS_WEIGHT,
    }
}
