use serde::{Deserialize, Serialize};

/// Identifier wrapper for scholarship programs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScholarshipId(pub String);

/// Year of standing on the university classification ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YearLevel {
    Freshman,
    Sophomore,
    Junior,
    Senior,
    Graduate,
}

impl YearLevel {
    pub const fn label(self) -> &'static str {
        match self {
            YearLevel::Freshman => "Freshman",
            YearLevel::Sophomore => "Sophomore",
            YearLevel::Junior => "Junior",
            YearLevel::Senior => "Senior",
            YearLevel::Graduate => "Graduate",
        }
    }

    /// Ordinal position on the ladder, 1-based.
    pub const fn ordinal(self) -> u8 {
        match self {
            YearLevel::Freshman => 1,
            YearLevel::Sophomore => 2,
            YearLevel::Junior => 3,
            YearLevel::Senior => 4,
            YearLevel::Graduate => 5,
        }
    }

    /// Normalized standing used as a model feature.
    pub const fn standing_weight(self) -> f64 {
        match self {
            YearLevel::Freshman => 0.2,
            YearLevel::Sophomore => 0.4,
            YearLevel::Junior => 0.6,
            YearLevel::Senior => 0.8,
            YearLevel::Graduate => 1.0,
        }
    }

    /// Cumulative units a student at this standing is expected to have
    /// completed (33 units per year of standing).
    pub const fn expected_units(self) -> u16 {
        self.ordinal() as u16 * 33
    }
}

/// Socialized Tuition bracket, ordered from highest financial need to none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StBracket {
    FullDiscountWithStipend,
    FullDiscount,
    PartialDiscount80,
    PartialDiscount60,
    PartialDiscount40,
    PartialDiscount20,
    NoDiscount,
}

impl StBracket {
    pub const fn code(self) -> &'static str {
        match self {
            StBracket::FullDiscountWithStipend => "FDS",
            StBracket::FullDiscount => "FD",
            StBracket::PartialDiscount80 => "PD80",
            StBracket::PartialDiscount60 => "PD60",
            StBracket::PartialDiscount40 => "PD40",
            StBracket::PartialDiscount20 => "PD20",
            StBracket::NoDiscount => "ND",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            StBracket::FullDiscountWithStipend => "Full Discount with Stipend",
            StBracket::FullDiscount => "Full Discount",
            StBracket::PartialDiscount80 => "Partial Discount 80%",
            StBracket::PartialDiscount60 => "Partial Discount 60%",
            StBracket::PartialDiscount40 => "Partial Discount 40%",
            StBracket::PartialDiscount20 => "Partial Discount 20%",
            StBracket::NoDiscount => "No Discount",
        }
    }

    /// Monotone need weight: the deeper the tuition discount, the higher the
    /// assessed financial need.
    pub const fn need_weight(self) -> f64 {
        match self {
            StBracket::FullDiscountWithStipend => 1.0,
            StBracket::FullDiscount => 0.85,
            StBracket::PartialDiscount80 => 0.7,
            StBracket::PartialDiscount60 => 0.55,
            StBracket::PartialDiscount40 => 0.4,
            StBracket::PartialDiscount20 => 0.25,
            StBracket::NoDiscount => 0.1,
        }
    }
}

/// Canonical student record consumed by the rule engine and the feature
/// extractor. Produced exclusively by the ingestion adapter; fields the
/// profile service did not report stay `None` and degrade to neutral
/// defaults downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_number: String,
    pub gwa: Option<f64>,
    pub year_level: Option<YearLevel>,
    pub college: Option<String>,
    pub course: Option<String>,
    pub major: Option<String>,
    pub annual_family_income: Option<f64>,
    pub household_size: Option<u8>,
    pub st_bracket: Option<StBracket>,
    pub units_enrolled: Option<u16>,
    pub units_passed: Option<u16>,
    pub has_approved_thesis: bool,
    pub has_disciplinary_action: bool,
    pub has_existing_scholarship: bool,
    pub profile_completed: bool,
}

/// Eligibility rubric declared by a scholarship. Absent fields mean "no
/// requirement" and the corresponding check passes automatically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityCriteria {
    pub max_gwa: Option<f64>,
    pub min_gwa: Option<f64>,
    pub required_year_levels: Vec<YearLevel>,
    pub eligible_colleges: Vec<String>,
    pub eligible_courses: Vec<String>,
    pub eligible_majors: Vec<String>,
    pub max_annual_family_income: Option<f64>,
    pub required_st_brackets: Vec<StBracket>,
    pub preferred_st_brackets: Vec<StBracket>,
    pub eligible_provinces: Vec<String>,
    pub min_units_enrolled: Option<u16>,
    pub filipino_only: bool,
    pub requires_approved_thesis: bool,
    pub forbids_other_scholarship: bool,
    pub forbids_thesis_grant: bool,
    pub forbids_disciplinary_action: bool,
}

impl EligibilityCriteria {
    /// Reject rubrics that cannot be evaluated coherently. This is the one
    /// place a caller-supplied record produces a hard failure.
    pub fn validate(&self) -> Result<(), CriteriaError> {
        for bound in [self.max_gwa, self.min_gwa].into_iter().flatten() {
            if !bound.is_finite() || !(1.0..=5.0).contains(&bound) {
                return Err(CriteriaError::GwaOutOfRange { found: bound });
            }
        }

        if let (Some(min), Some(max)) = (self.min_gwa, self.max_gwa) {
            if min > max {
                return Err(CriteriaError::GwaBoundsInverted { min, max });
            }
        }

        if let Some(ceiling) = self.max_annual_family_income {
            if !ceiling.is_finite() || ceiling <= 0.0 {
                return Err(CriteriaError::InvalidIncomeCeiling { found: ceiling });
            }
        }

        Ok(())
    }

    /// Positive, finite income ceiling if one is declared.
    pub fn income_ceiling(&self) -> Option<f64> {
        self.max_annual_family_income
            .filter(|ceiling| ceiling.is_finite() && *ceiling > 0.0)
    }
}

/// Scholarship record as published by the catalog, paired with its rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarshipSnapshot {
    pub scholarship_id: ScholarshipId,
    pub name: String,
    pub criteria: EligibilityCriteria,
}

impl ScholarshipSnapshot {
    pub fn validate(&self) -> Result<(), CriteriaError> {
        if self.scholarship_id.0.trim().is_empty() {
            return Err(CriteriaError::MissingId);
        }
        self.criteria.validate()
    }
}

/// Validation errors for caller-supplied scholarship records.
#[derive(Debug, thiserror::Error)]
pub enum CriteriaError {
    #[error("scholarship id must not be empty")]
    MissingId,
    #[error("GWA bound {found} must be finite and within 1.0..=5.0")]
    GwaOutOfRange { found: f64 },
    #[error("GWA floor {min} exceeds ceiling {max}")]
    GwaBoundsInverted { min: f64, max: f64 },
    #[error("income ceiling {found} must be a positive finite amount")]
    InvalidIncomeCeiling { found: f64 },
}

/// Criteria evaluated by the rule engine, in their fixed evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    GwaCeiling,
    GwaFloor,
    YearLevel,
    College,
    Course,
    IncomeCeiling,
    StBracket,
    UnitsEnrolled,
    Citizenship,
    ApprovedThesis,
    OtherScholarship,
    ThesisGrant,
    DisciplinaryAction,
    Province,
    MajorAlignment,
    PreferredStBracket,
    UnitsProgress,
    ProfileCompleteness,
}

impl Criterion {
    pub const fn label(self) -> &'static str {
        match self {
            Criterion::GwaCeiling => "GWA ceiling",
            Criterion::GwaFloor => "GWA floor",
            Criterion::YearLevel => "year level",
            Criterion::College => "college",
            Criterion::Course => "degree program",
            Criterion::IncomeCeiling => "annual family income",
            Criterion::StBracket => "ST bracket",
            Criterion::UnitsEnrolled => "units enrolled",
            Criterion::Citizenship => "citizenship",
            Criterion::ApprovedThesis => "approved thesis",
            Criterion::OtherScholarship => "existing scholarship",
            Criterion::ThesisGrant => "thesis grant",
            Criterion::DisciplinaryAction => "disciplinary record",
            Criterion::Province => "province of residence",
            Criterion::MajorAlignment => "major alignment",
            Criterion::PreferredStBracket => "preferred ST bracket",
            Criterion::UnitsProgress => "units progress",
            Criterion::ProfileCompleteness => "profile completeness",
        }
    }
}

/// Whether failing a check disqualifies the candidate or only lowers the
/// compatibility score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckImportance {
    Required,
    Preferred,
}

impl CheckImportance {
    pub const fn label(self) -> &'static str {
        match self {
            CheckImportance::Required => "required",
            CheckImportance::Preferred => "preferred",
        }
    }
}

/// Outcome of a single eligibility check, with human-readable values for
/// audit trails and applicant-facing explanations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub criterion: Criterion,
    pub passed: bool,
    pub student_value: String,
    pub required_value: String,
    pub importance: CheckImportance,
}

/// Full rule-engine verdict for one student against one scholarship.
///
/// Invariant: `compatibility == 0` exactly when `eligible` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarshipMatch {
    pub scholarship_id: ScholarshipId,
    pub eligible: bool,
    pub compatibility: u8,
    pub checks: Vec<CheckResult>,
}

impl ScholarshipMatch {
    pub fn failed_requirements(&self) -> Vec<&CheckResult> {
        self.checks
            .iter()
            .filter(|check| !check.passed && check.importance == CheckImportance::Required)
            .collect()
    }
}
