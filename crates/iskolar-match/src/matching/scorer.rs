//! Compatibility score composition.
//!
//! Pure function over the rule-engine output: identical inputs always give
//! the identical integer score.

use super::domain::{EligibilityCriteria, StudentProfile};
use super::rules::Evaluated;

const GWA_MARGIN_BONUS_CAP: f64 = 15.0;
const PROFILE_COMPLETENESS_BONUS: f64 = 5.0;

/// Compose the 0-100 compatibility score.
///
/// Any hard failure short-circuits to 0. Otherwise each failed conditional
/// check subtracts `weight x 100` from a base of 100, bonuses reward GWA
/// margin under the cap, deep financial need, and a completed profile, and
/// the result is clamped back into [0, 100].
pub(crate) fn compatibility_score(
    student: &StudentProfile,
    criteria: &EligibilityCriteria,
    hard: &[Evaluated],
    conditional: &[Evaluated],
    income_fallback_ceiling: f64,
) -> u8 {
    if hard.iter().any(|evaluated| !evaluated.check.passed) {
        return 0;
    }

    let mut score = 100.0;

    for evaluated in conditional {
        if !evaluated.check.passed {
            score -= evaluated.weight * 100.0;
        }
    }

    if let (Some(cap), Some(gwa)) = (criteria.max_gwa, student.gwa) {
        let margin = (cap - gwa) * 10.0;
        if margin > 0.0 {
            score += margin.min(GWA_MARGIN_BONUS_CAP);
        }
    }

    if let Some(income) = student.annual_family_income {
        let ceiling = criteria.income_ceiling().unwrap_or(income_fallback_ceiling);
        let ratio = income / ceiling;
        if ratio < 0.5 {
            score += 10.0;
        } else if ratio < 0.75 {
            score += 5.0;
        }
    }

    if student.profile_completed {
        score += PROFILE_COMPLETENESS_BONUS;
    }

    score.clamp(0.0, 100.0).round() as u8
}
