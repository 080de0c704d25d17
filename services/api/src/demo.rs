use crate::infra::{InMemoryDecisionLedger, InMemoryModelStore};
use clap::Args;
use iskolar_match::config::MatchingConfig;
use iskolar_match::error::AppError;
use iskolar_match::history::DecisionCsvImporter;
use iskolar_match::matching::profile::{RawAcademicSection, RawFinancialSection};
use iskolar_match::matching::{
    CandidateAssessment, EligibilityCriteria, FeatureExtractor, MatchingService, ProfileResolver,
    RawStudentRecord, ScholarshipId, ScholarshipSnapshot, StBracket, YearLevel,
};
use iskolar_match::model::{ModelScope, TrainingExample, TrainingLogEntry, TrainingLogOutcome};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional registrar CSV export of past decisions to train from.
    #[arg(long)]
    pub(crate) history_csv: Option<PathBuf>,
    /// Skip the training portion of the demo.
    #[arg(long)]
    pub(crate) skip_training: bool,
}

type DemoService = MatchingService<InMemoryModelStore, InMemoryDecisionLedger>;

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = MatchingConfig::default();
    let store = Arc::new(InMemoryModelStore::default());
    let ledger = Arc::new(InMemoryDecisionLedger::default());
    let service: DemoService = MatchingService::new(store, ledger.clone(), config.clone());

    let catalog = demo_catalog();

    println!("Scholarship matching demo");
    println!("=========================");

    for scholarship in &catalog {
        for (label, applicant) in [
            ("strong applicant", strong_applicant()),
            ("transfer applicant", transfer_applicant()),
        ] {
            let assessment = service.assess(applicant, scholarship)?;
            render_assessment(&scholarship.name, label, &assessment);
        }
    }

    if args.skip_training {
        println!("\nTraining skipped (--skip-training).");
        return Ok(());
    }

    println!("\nDecision history");
    println!("----------------");
    let loaded = match args.history_csv {
        Some(path) => {
            let import = DecisionCsvImporter::from_path(
                &path,
                &catalog,
                &FeatureExtractor::new(config.income_fallback_ceiling),
            )?;
            let skipped = import.skipped_rows;
            let count = ledger.ingest(import.decisions);
            println!(
                "Imported {count} labeled decision(s) from {} ({skipped} row(s) skipped)",
                path.display()
            );
            count
        }
        None => {
            let count = seed_synthetic_history(&ledger, &catalog, &config);
            println!("Seeded {count} synthetic labeled decision(s)");
            count
        }
    };
    println!("Ledger now holds {} example(s)", ledger.len());

    if loaded == 0 {
        println!("No labeled decisions available; predictions stay on defaults.");
        return Ok(());
    }

    println!("\nTraining");
    println!("--------");
    render_training(&service.train(ModelScope::Global));
    for scholarship in &catalog {
        let scope = ModelScope::Scholarship(scholarship.scholarship_id.clone());
        render_training(&service.train(scope));
    }

    println!("\nPredictions with trained weights");
    println!("--------------------------------");
    for scholarship in &catalog {
        let assessment = service.assess(strong_applicant(), scholarship)?;
        render_assessment(&scholarship.name, "strong applicant", &assessment);
    }

    Ok(())
}

fn render_assessment(scholarship: &str, applicant: &str, assessment: &CandidateAssessment) {
    println!("\n{scholarship} / {applicant}");
    println!(
        "  eligible: {} (compatibility {}/100)",
        assessment.eligibility.eligible, assessment.eligibility.compatibility
    );
    for failed in assessment.eligibility.failed_requirements() {
        println!(
            "  blocked by {}: {} (required: {})",
            failed.criterion.label(),
            failed.student_value,
            failed.required_value
        );
    }
    println!(
        "  approval probability: {}% ({}, confidence {})",
        assessment.prediction.percentage,
        assessment.prediction.outlook.label(),
        assessment.prediction.confidence.label()
    );
    println!("  weights: {}", assessment.prediction.source.describe());
    if let Some(factor) = assessment.prediction.factors.first() {
        println!("  top factor: {}", factor.description);
    }
}

fn render_training(entry: &TrainingLogEntry) {
    match &entry.outcome {
        TrainingLogOutcome::Trained {
            version,
            iterations,
            accuracy,
            converged,
        } => println!(
            "{}: trained {version} in {iterations} iteration(s), in-sample accuracy {:.2} (converged: {converged})",
            entry.scope, accuracy
        ),
        TrainingLogOutcome::Skipped { reason } => {
            println!("{}: skipped ({reason})", entry.scope)
        }
        TrainingLogOutcome::Failed { message } => {
            println!("{}: failed ({message})", entry.scope)
        }
    }
}

fn demo_catalog() -> Vec<ScholarshipSnapshot> {
    vec![
        ScholarshipSnapshot {
            scholarship_id: ScholarshipId("SCH-001".to_string()),
            name: "Academic Excellence Grant".to_string(),
            criteria: EligibilityCriteria {
                max_gwa: Some(2.0),
                eligible_colleges: vec!["CAS".to_string(), "CEM".to_string()],
                max_annual_family_income: Some(500_000.0),
                forbids_other_scholarship: true,
                forbids_disciplinary_action: true,
                ..EligibilityCriteria::default()
            },
        },
        ScholarshipSnapshot {
            scholarship_id: ScholarshipId("SCH-002".to_string()),
            name: "Financial Assistance Program".to_string(),
            criteria: EligibilityCriteria {
                max_annual_family_income: Some(200_000.0),
                required_st_brackets: vec![
                    StBracket::FullDiscountWithStipend,
                    StBracket::FullDiscount,
                ],
                required_year_levels: vec![
                    YearLevel::Sophomore,
                    YearLevel::Junior,
                    YearLevel::Senior,
                ],
                min_units_enrolled: Some(15),
                forbids_other_scholarship: true,
                ..EligibilityCriteria::default()
            },
        },
    ]
}

fn strong_applicant() -> RawStudentRecord {
    RawStudentRecord {
        student_number: Some("2021-00042".to_string()),
        gwa: Some(1.25),
        year_level: Some("Junior".to_string()),
        college: Some("CAS".to_string()),
        course: Some("BS Biology".to_string()),
        major: Some("Genetics".to_string()),
        annual_family_income: Some(85_000.0),
        household_size: Some(6),
        st_bracket: Some("FDS".to_string()),
        units_enrolled: Some(18.0),
        units_passed: Some(92.0),
        profile_completed: Some(true),
        ..RawStudentRecord::default()
    }
}

/// Arrives in the nested v2 record shape to exercise the ingestion adapter.
fn transfer_applicant() -> RawStudentRecord {
    RawStudentRecord {
        student_number: Some("2023-04417".to_string()),
        academic: Some(RawAcademicSection {
            gwa: Some(2.6),
            year_level: Some("Freshman".to_string()),
            college: Some("CEM".to_string()),
            course: Some("BS Economics".to_string()),
            ..RawAcademicSection::default()
        }),
        financial: Some(RawFinancialSection {
            annual_family_income: Some(320_000.0),
            st_bracket: Some("PD40".to_string()),
            ..RawFinancialSection::default()
        }),
        ..RawStudentRecord::default()
    }
}

/// Deterministic synthetic history: strong, needy profiles approved; weak,
/// well-off profiles rejected.
fn seed_synthetic_history(
    ledger: &InMemoryDecisionLedger,
    catalog: &[ScholarshipSnapshot],
    config: &MatchingConfig,
) -> usize {
    let resolver = ProfileResolver;
    let extractor = FeatureExtractor::new(config.income_fallback_ceiling);
    let mut count = 0;

    for scholarship in catalog {
        for index in 0..12usize {
            let approved = index % 2 == 0;
            let raw = RawStudentRecord {
                student_number: Some(format!("demo-{}-{index}", scholarship.scholarship_id.0)),
                gwa: Some(if approved {
                    1.3 + 0.05 * index as f64
                } else {
                    2.8 + 0.05 * index as f64
                }),
                year_level: Some("Junior".to_string()),
                annual_family_income: Some(if approved {
                    80_000.0 + 5_000.0 * index as f64
                } else {
                    380_000.0 + 5_000.0 * index as f64
                }),
                st_bracket: Some(if approved { "FDS" } else { "ND" }.to_string()),
                units_enrolled: Some(18.0),
                units_passed: Some(if approved { 95.0 } else { 55.0 }),
                profile_completed: Some(approved),
                ..RawStudentRecord::default()
            };

            let student = resolver.resolve(raw);
            let example = TrainingExample {
                features: extractor.extract(&student, &scholarship.criteria),
                approved,
            };
            ledger.record(&scholarship.scholarship_id, example);
            count += 1;
        }
    }

    count
}
