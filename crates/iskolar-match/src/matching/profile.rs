//! Ingestion adapter reconciling the profile service's record shapes.
//!
//! Student records arrive either flat (legacy export) or with nested
//! `academic`/`financial` sections (v2 API), with several synonymous field
//! names in the wild. This module is the only place those variants exist;
//! everything downstream sees the canonical [`StudentProfile`].

use serde::Deserialize;

use super::domain::{StBracket, StudentProfile, YearLevel};

/// Raw student record as submitted. All fields optional; nested sections
/// win over their flat duplicates during resolution.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStudentRecord {
    #[serde(alias = "studentNumber", alias = "student_no")]
    pub student_number: Option<String>,
    #[serde(alias = "generalWeightedAverage", alias = "general_weighted_average")]
    pub gwa: Option<f64>,
    #[serde(alias = "yearLevel", alias = "classification")]
    pub year_level: Option<String>,
    pub college: Option<String>,
    #[serde(alias = "degreeProgram", alias = "degree_program", alias = "program")]
    pub course: Option<String>,
    pub major: Option<String>,
    #[serde(alias = "annualFamilyIncome", alias = "family_income")]
    pub annual_family_income: Option<f64>,
    #[serde(alias = "householdSize", alias = "household_members")]
    pub household_size: Option<i64>,
    #[serde(alias = "stBracket", alias = "bracket")]
    pub st_bracket: Option<String>,
    #[serde(alias = "unitsEnrolled")]
    pub units_enrolled: Option<f64>,
    #[serde(alias = "unitsPassed", alias = "units_completed")]
    pub units_passed: Option<f64>,
    #[serde(alias = "hasApprovedThesis")]
    pub has_approved_thesis: Option<bool>,
    #[serde(alias = "hasDisciplinaryAction", alias = "disciplinary_record")]
    pub has_disciplinary_action: Option<bool>,
    #[serde(alias = "hasExistingScholarship", alias = "existing_scholarship")]
    pub has_existing_scholarship: Option<bool>,
    #[serde(alias = "profileCompleted", alias = "profile_complete")]
    pub profile_completed: Option<bool>,
    pub academic: Option<RawAcademicSection>,
    pub financial: Option<RawFinancialSection>,
}

/// Nested academic section produced by the profile service's v2 API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAcademicSection {
    #[serde(alias = "generalWeightedAverage")]
    pub gwa: Option<f64>,
    #[serde(alias = "yearLevel", alias = "classification")]
    pub year_level: Option<String>,
    pub college: Option<String>,
    #[serde(alias = "degreeProgram", alias = "program")]
    pub course: Option<String>,
    pub major: Option<String>,
    #[serde(alias = "unitsEnrolled")]
    pub units_enrolled: Option<f64>,
    #[serde(alias = "unitsPassed", alias = "units_completed")]
    pub units_passed: Option<f64>,
    #[serde(alias = "hasApprovedThesis")]
    pub has_approved_thesis: Option<bool>,
}

/// Nested financial section produced by the profile service's v2 API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFinancialSection {
    #[serde(alias = "annualFamilyIncome", alias = "family_income")]
    pub annual_family_income: Option<f64>,
    #[serde(alias = "householdSize", alias = "household_members")]
    pub household_size: Option<i64>,
    #[serde(alias = "stBracket", alias = "bracket")]
    pub st_bracket: Option<String>,
    #[serde(alias = "hasExistingScholarship", alias = "existing_scholarship")]
    pub has_existing_scholarship: Option<bool>,
}

/// Resolves raw records into the canonical profile.
///
/// Resolution is total: every field that is missing, malformed, or outside
/// its domain becomes `None` (or `false` for flags) rather than an error,
/// and downstream consumers substitute their documented neutral defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileResolver;

impl ProfileResolver {
    pub fn resolve(&self, raw: RawStudentRecord) -> StudentProfile {
        let academic = raw.academic.unwrap_or_default();
        let financial = raw.financial.unwrap_or_default();

        StudentProfile {
            student_number: raw
                .student_number
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            gwa: sanitize_gwa(academic.gwa.or(raw.gwa)),
            year_level: academic
                .year_level
                .or(raw.year_level)
                .as_deref()
                .and_then(parse_year_level),
            college: clean_text(academic.college.or(raw.college)),
            course: clean_text(academic.course.or(raw.course)),
            major: clean_text(academic.major.or(raw.major)),
            annual_family_income: financial
                .annual_family_income
                .or(raw.annual_family_income)
                .filter(|income| income.is_finite() && *income >= 0.0),
            household_size: financial
                .household_size
                .or(raw.household_size)
                .filter(|size| (1..=30).contains(size))
                .map(|size| size as u8),
            st_bracket: financial
                .st_bracket
                .or(raw.st_bracket)
                .as_deref()
                .and_then(parse_st_bracket),
            units_enrolled: sanitize_units(academic.units_enrolled.or(raw.units_enrolled)),
            units_passed: sanitize_units(academic.units_passed.or(raw.units_passed)),
            has_approved_thesis: academic
                .has_approved_thesis
                .or(raw.has_approved_thesis)
                .unwrap_or(false),
            has_disciplinary_action: raw.has_disciplinary_action.unwrap_or(false),
            has_existing_scholarship: financial
                .has_existing_scholarship
                .or(raw.has_existing_scholarship)
                .unwrap_or(false),
            profile_completed: raw.profile_completed.unwrap_or(false),
        }
    }
}

/// GWA is valid only on the 1.0 (best) to 5.0 (worst) scale; anything else
/// resolves to "not reported".
fn sanitize_gwa(raw: Option<f64>) -> Option<f64> {
    raw.filter(|gwa| gwa.is_finite() && (1.0..=5.0).contains(gwa))
}

fn sanitize_units(raw: Option<f64>) -> Option<u16> {
    raw.filter(|units| units.is_finite() && (0.0..=300.0).contains(units))
        .map(|units| units.round() as u16)
}

fn clean_text(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Collapse whitespace, strip BOM/zero-width characters, and lowercase so
/// catalog values and student answers compare reliably.
pub(crate) fn normalize_token(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_lowercase()
}

pub(crate) fn tokens_match(left: &str, right: &str) -> bool {
    normalize_token(left) == normalize_token(right)
}

fn parse_year_level(raw: &str) -> Option<YearLevel> {
    match normalize_token(raw).as_str() {
        "1" | "first year" | "freshman" => Some(YearLevel::Freshman),
        "2" | "second year" | "sophomore" => Some(YearLevel::Sophomore),
        "3" | "third year" | "junior" => Some(YearLevel::Junior),
        "4" | "fourth year" | "senior" => Some(YearLevel::Senior),
        "5" | "graduate" | "graduate student" | "masters" | "doctoral" => {
            Some(YearLevel::Graduate)
        }
        _ => None,
    }
}

/// Accepts both short bracket codes ("fds", "pd80") and full names
/// ("Full Discount with Stipend").
fn parse_st_bracket(raw: &str) -> Option<StBracket> {
    let normalized = normalize_token(raw);
    [
        StBracket::FullDiscountWithStipend,
        StBracket::FullDiscount,
        StBracket::PartialDiscount80,
        StBracket::PartialDiscount60,
        StBracket::PartialDiscount40,
        StBracket::PartialDiscount20,
        StBracket::NoDiscount,
    ]
    .into_iter()
    .find(|bracket| {
        normalized == normalize_token(bracket.code()) || normalized == normalize_token(bracket.label())
    })
}

#[cfg(test)]
pub(crate) fn parse_st_bracket_for_tests(raw: &str) -> Option<StBracket> {
    parse_st_bracket(raw)
}

#[cfg(test)]
pub(crate) fn parse_year_level_for_tests(raw: &str) -> Option<YearLevel> {
    parse_year_level(raw)
}
