//! Importer for registrar CSV exports of past scholarship decisions.
//!
//! Each row carries the applicant snapshot and the final status. Rows with
//! unknown scholarships or non-terminal statuses are skipped rather than
//! failing the import; the summary reports how many were dropped.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::matching::profile::{normalize_token, RawStudentRecord};
use crate::matching::{FeatureExtractor, ProfileResolver, ScholarshipId, ScholarshipSnapshot};
use crate::model::TrainingExample;

/// One labeled decision reconstructed from the export.
#[derive(Debug, Clone)]
pub struct HistoricalDecision {
    pub application_id: String,
    pub scholarship_id: ScholarshipId,
    pub approved: bool,
    pub example: TrainingExample,
}

/// Import result with bookkeeping for dropped rows.
#[derive(Debug)]
pub struct DecisionImport {
    pub decisions: Vec<HistoricalDecision>,
    pub skipped_rows: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryImportError {
    #[error("failed to read decision export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid decision CSV data: {0}")]
    Csv(#[from] csv::Error),
}

pub struct DecisionCsvImporter;

impl DecisionCsvImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        catalog: &[ScholarshipSnapshot],
        extractor: &FeatureExtractor,
    ) -> Result<DecisionImport, HistoryImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, catalog, extractor)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        catalog: &[ScholarshipSnapshot],
        extractor: &FeatureExtractor,
    ) -> Result<DecisionImport, HistoryImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let resolver = ProfileResolver;
        let mut decisions = Vec::new();
        let mut skipped_rows = 0;

        for record in csv_reader.deserialize::<DecisionRow>() {
            let row = record?;

            let Some(approved) = row.approval() else {
                skipped_rows += 1;
                continue;
            };

            let Some(scholarship) = row
                .scholarship_id
                .as_deref()
                .and_then(|id| find_scholarship(catalog, id))
            else {
                skipped_rows += 1;
                continue;
            };

            let student = resolver.resolve(row.to_raw_record());
            let features = extractor.extract(&student, &scholarship.criteria);

            decisions.push(HistoricalDecision {
                application_id: row
                    .application_id
                    .unwrap_or_else(|| format!("row-{}", decisions.len() + 1)),
                scholarship_id: scholarship.scholarship_id.clone(),
                approved,
                example: TrainingExample { features, approved },
            });
        }

        Ok(DecisionImport {
            decisions,
            skipped_rows,
        })
    }
}

fn find_scholarship<'a>(
    catalog: &'a [ScholarshipSnapshot],
    id: &str,
) -> Option<&'a ScholarshipSnapshot> {
    catalog
        .iter()
        .find(|snapshot| normalize_token(&snapshot.scholarship_id.0) == normalize_token(id))
}

#[derive(Debug, Deserialize)]
struct DecisionRow {
    #[serde(
        rename = "Application ID",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    application_id: Option<String>,
    #[serde(
        rename = "Scholarship ID",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    scholarship_id: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(rename = "GWA", default)]
    gwa: Option<f64>,
    #[serde(
        rename = "Year Level",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    year_level: Option<String>,
    #[serde(rename = "College", default, deserialize_with = "empty_string_as_none")]
    college: Option<String>,
    #[serde(rename = "Course", default, deserialize_with = "empty_string_as_none")]
    course: Option<String>,
    #[serde(rename = "Major", default, deserialize_with = "empty_string_as_none")]
    major: Option<String>,
    #[serde(rename = "Annual Family Income", default)]
    annual_family_income: Option<f64>,
    #[serde(rename = "Household Size", default)]
    household_size: Option<i64>,
    #[serde(
        rename = "ST Bracket",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    st_bracket: Option<String>,
    #[serde(rename = "Units Enrolled", default)]
    units_enrolled: Option<f64>,
    #[serde(rename = "Units Passed", default)]
    units_passed: Option<f64>,
    #[serde(
        rename = "Profile Completed",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    profile_completed: Option<String>,
}

impl DecisionRow {
    /// Terminal statuses only; anything else means the row cannot label a
    /// training example.
    fn approval(&self) -> Option<bool> {
        match self.status.as_deref().map(normalize_token)?.as_str() {
            "approved" | "granted" | "awarded" => Some(true),
            "rejected" | "denied" | "declined" => Some(false),
            _ => None,
        }
    }

    fn to_raw_record(&self) -> RawStudentRecord {
        RawStudentRecord {
            student_number: self.application_id.clone(),
            gwa: self.gwa,
            year_level: self.year_level.clone(),
            college: self.college.clone(),
            course: self.course.clone(),
            major: self.major.clone(),
            annual_family_income: self.annual_family_income,
            household_size: self.household_size,
            st_bracket: self.st_bracket.clone(),
            units_enrolled: self.units_enrolled,
            units_passed: self.units_passed,
            profile_completed: self
                .profile_completed
                .as_deref()
                .map(|value| matches!(normalize_token(value).as_str(), "yes" | "true" | "1")),
            ..RawStudentRecord::default()
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::EligibilityCriteria;
    use std::io::Cursor;

    fn catalog() -> Vec<ScholarshipSnapshot> {
        vec![ScholarshipSnapshot {
            scholarship_id: ScholarshipId("SCH-001".to_string()),
            name: "Academic Excellence Grant".to_string(),
            criteria: EligibilityCriteria {
                max_gwa: Some(2.0),
                max_annual_family_income: Some(500_000.0),
                ..EligibilityCriteria::default()
            },
        }]
    }

    const HEADER: &str = "Application ID,Scholarship ID,Status,GWA,Year Level,College,Course,Major,Annual Family Income,Household Size,ST Bracket,Units Enrolled,Units Passed,Profile Completed\n";

    #[test]
    fn imports_terminal_rows_and_labels_them() {
        let csv = format!(
            "{HEADER}\
APP-1,SCH-001,Approved,1.50,Junior,CAS,BS Biology,Genetics,150000,5,FDS,18,95,yes\n\
APP-2,sch-001,Rejected,3.20,Sophomore,CEM,BS Economics,,450000,4,PD40,15,40,no\n"
        );

        let import = DecisionCsvImporter::from_reader(
            Cursor::new(csv),
            &catalog(),
            &FeatureExtractor::default(),
        )
        .expect("import succeeds");

        assert_eq!(import.decisions.len(), 2);
        assert_eq!(import.skipped_rows, 0);
        assert!(import.decisions[0].approved);
        assert!(!import.decisions[1].approved);

        let strong = import.decisions[0].example.features.to_array();
        let weak = import.decisions[1].example.features.to_array();
        assert!(strong[0] > weak[0], "GWA strength should separate the rows");
    }

    #[test]
    fn pending_and_unknown_rows_are_skipped() {
        let csv = format!(
            "{HEADER}\
APP-3,SCH-001,Pending,1.50,Junior,CAS,BS Biology,,150000,5,FDS,18,95,yes\n\
APP-4,SCH-999,Approved,1.50,Junior,CAS,BS Biology,,150000,5,FDS,18,95,yes\n"
        );

        let import = DecisionCsvImporter::from_reader(
            Cursor::new(csv),
            &catalog(),
            &FeatureExtractor::default(),
        )
        .expect("import succeeds");

        assert!(import.decisions.is_empty());
        assert_eq!(import.skipped_rows, 2);
    }

    #[test]
    fn blank_cells_resolve_to_neutral_defaults() {
        let csv = format!("{HEADER}APP-5,SCH-001,Approved,,,,,,,,,,,\n");

        let import = DecisionCsvImporter::from_reader(
            Cursor::new(csv),
            &catalog(),
            &FeatureExtractor::default(),
        )
        .expect("import succeeds");

        assert_eq!(import.decisions.len(), 1);
        let features = import.decisions[0].example.features.to_array();
        for value in features {
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = DecisionCsvImporter::from_path(
            "./does-not-exist.csv",
            &catalog(),
            &FeatureExtractor::default(),
        )
        .expect_err("expected io error");

        match error {
            HistoryImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
