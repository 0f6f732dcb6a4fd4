use crate::infra::{load_reference_data, ReferenceData};
use chrono::{Datelike, Local};
use clap::Args;
use counsel_ai::config::{AppConfig, PredictionSettings};
use counsel_ai::error::AppError;
use counsel_ai::prediction::domain::MAX_COUNSELING_YEAR;
use counsel_ai::prediction::{
    InMemoryCollegeDirectory, InMemoryPatternStore, PredictionReport, PredictionRequest,
    PredictionService,
};
use std::path::PathBuf;
use std::sync::Arc;

type LocalService = PredictionService<InMemoryPatternStore, InMemoryCollegeDirectory>;

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Exam the score belongs to (NEET or JEE-MAIN)
    #[arg(long, default_value = "NEET")]
    pub(crate) exam: String,
    /// Score representation: marks, percentile, or rank
    #[arg(long, default_value = "marks")]
    pub(crate) score_type: String,
    /// Score value in the chosen representation
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) score: f64,
    /// Reservation category (General, OBC, SC, ST, EWS, PWD)
    #[arg(long, default_value = "General")]
    pub(crate) category: String,
    /// Home state, used for state quota eligibility
    #[arg(long)]
    pub(crate) state: Option<String>,
    /// Counseling year (defaults to the current year)
    #[arg(long)]
    pub(crate) year: Option<u16>,
    /// Household income band: low, middle, or high
    #[arg(long)]
    pub(crate) income_band: Option<String>,
    /// Historical cutoffs CSV (defaults to PREDICTION_CUTOFFS_CSV or the bundled sample)
    #[arg(long)]
    pub(crate) cutoffs: Option<PathBuf>,
    /// College reference CSV (defaults to PREDICTION_COLLEGES_CSV or the bundled sample)
    #[arg(long)]
    pub(crate) colleges: Option<PathBuf>,
    /// Print the full report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print each report as JSON instead of the text summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let PredictArgs {
        exam,
        score_type,
        score,
        category,
        state,
        year,
        income_band,
        cutoffs,
        colleges,
        json,
    } = args;

    let config = AppConfig::load()?;
    let cutoffs = cutoffs.or_else(|| config.prediction.cutoffs_csv.clone());
    let colleges = colleges.or_else(|| config.prediction.colleges_csv.clone());
    let data = load_reference_data(cutoffs.as_deref(), colleges.as_deref())?;
    let sources = format!(
        "Reference data: cutoffs from {}, colleges from {}",
        data.cutoffs_source, data.colleges_source
    );
    let service = build_service(data, &config.prediction);

    let request = PredictionRequest {
        exam_type: exam,
        score_type,
        score_value: score,
        category,
        state,
        year: year.unwrap_or_else(current_year),
        income_band,
    };
    let report = service.predict(request)?;
    print!("{}", predict_output(&sources, &report, json));
    Ok(())
}

/// Stdout for the `predict` command. JSON mode emits the report alone.
fn predict_output(sources: &str, report: &PredictionReport, json: bool) -> String {
    if json {
        render_report(report, true)
    } else {
        format!("{sources}\n{}", render_report(report, false))
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let data = load_reference_data(None, None)?;
    let service = build_service(data, &PredictionSettings::default());

    println!("Admission prediction demo (bundled sample data, 2025 counseling)");
    for (title, request) in demo_requests() {
        println!("\n{title}");
        match service.predict(request) {
            Ok(report) => print!("{}", render_report(&report, args.json)),
            Err(err) => println!("  Request rejected ({}): {}", err.field(), err),
        }
    }

    Ok(())
}

fn build_service(data: ReferenceData, settings: &PredictionSettings) -> LocalService {
    PredictionService::new(Arc::new(data.store), Arc::new(data.colleges), settings)
}

fn current_year() -> u16 {
    u16::try_from(Local::now().year()).unwrap_or(MAX_COUNSELING_YEAR)
}

fn demo_requests() -> Vec<(&'static str, PredictionRequest)> {
    let request = |exam: &str, score_type: &str, value: f64, category: &str, state: &str| {
        PredictionRequest {
            exam_type: exam.to_string(),
            score_type: score_type.to_string(),
            score_value: value,
            category: category.to_string(),
            state: Some(state.to_string()),
            year: 2025,
            income_band: None,
        }
    };

    let mut low_income = request("JEE-MAIN", "percentile", 99.0, "General", "Maharashtra");
    low_income.income_band = Some("low".to_string());

    vec![
        (
            "NEET 650 marks, General, Maharashtra domicile",
            request("NEET", "marks", 650.0, "General", "Maharashtra"),
        ),
        (
            "NEET 95th percentile, OBC, Tamil Nadu domicile",
            request("NEET", "percentile", 95.0, "OBC", "Tamil Nadu"),
        ),
        ("JEE Main 99th percentile, low income band", low_income),
        (
            "NEET 800 marks (out of range)",
            request("NEET", "marks", 800.0, "General", "Maharashtra"),
        ),
    ]
}

fn render_report(report: &PredictionReport, json: bool) -> String {
    if json {
        return match serde_json::to_string_pretty(report) {
            Ok(json) => format!("{json}\n"),
            Err(err) => format!("  Report payload unavailable: {err}\n"),
        };
    }

    let normalized = &report.normalized_score;
    let mut lines = vec![format!(
        "- {} {} {} -> rank {} (adjusted {}, difficulty x{:.2}, ~{:.2} percentile)",
        normalized.exam,
        normalized.original_type.label(),
        normalized.original_score,
        normalized.normalized_rank,
        normalized.adjusted_rank,
        normalized.difficulty_multiplier,
        normalized.estimated_percentile
    )];
    if report.low_confidence {
        lines.push(format!(
            "  Indicative only: conversion confidence {:.0}%",
            normalized.confidence * 100.0
        ));
    }

    if !report.data_available {
        lines.push("  No historical cutoff data available for this query".to_string());
    } else if report.predictions.is_empty() {
        lines.push("  No college clears the minimum admission probability".to_string());
    } else {
        let intervals = &report.confidence_intervals;
        lines.push(format!(
            "  {} predictions: {} high / {} medium / {} low confidence",
            intervals.total, intervals.high, intervals.medium, intervals.low
        ));
        for (index, prediction) in report.predictions.iter().enumerate() {
            lines.push(format!(
                "  {:>2}. {} ({}) {:.0}% | overall {:.2} | {} round {} closing rank {}{}",
                index + 1,
                prediction.college.name,
                prediction.college.location,
                prediction.admission_probability * 100.0,
                prediction.overall_score,
                prediction.exam_year,
                prediction.round,
                prediction.predicted_cutoff_rank,
                if prediction.state_quota {
                    " [state quota]"
                } else {
                    ""
                }
            ));
            lines.push(format!("      {}", prediction.reasoning));
        }
    }

    let mut output = lines.join("\n");
    output.push('\n');
    output
}
