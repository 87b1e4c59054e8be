//! Cycle report service. Summarizes the log history and writes Markdown reports.
//!
//! Coordinates between the log store (data), the predictor (next date) and the
//! filesystem (reports).

use crate::domain::{DomainError, LogEntry, PredictionResult, sort_history};
use crate::ports::LogStorePort;
use crate::usecases::cycle_predictor::{CyclePredictor, DEFAULT_CYCLE_DAYS, average_days};
use chrono::{Local, NaiveDate, TimeDelta};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::info;

/// Entries starting at most this many days after the previous one belong to the same period.
const SAME_PERIOD_GAP_DAYS: i64 = 2;
const DEFAULT_PERIOD_DAYS: i64 = 5;
/// Spread between shortest and longest cycle above which cycles count as irregular.
const IRREGULAR_SPREAD_DAYS: i64 = 7;
const SYMPTOM_WINDOW_DAYS: i64 = 90;
const SHORT_CYCLE_DAYS: i64 = 21;
const LONG_CYCLE_DAYS: i64 = 35;
/// More days than this until the next period reads as follicular.
const FOLLICULAR_MIN_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regularity {
    Regular,
    Irregular,
    InsufficientData,
    Unknown,
}

impl fmt::Display for Regularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Regularity::Regular => "Regular",
            Regularity::Irregular => "Irregular",
            Regularity::InsufficientData => "Insufficient data",
            Regularity::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Follicular,
    Luteal,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CyclePhase::Follicular => f.write_str("Follicular"),
            CyclePhase::Luteal => f.write_str("Luteal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Start-to-start lengths between grouped periods.
    pub cycle_lengths: Vec<i64>,
    pub avg_cycle_length: i64,
    pub avg_period_length: i64,
    pub last_period: NaiveDate,
    pub next_predicted: NaiveDate,
    pub regularity: Regularity,
    /// Most frequent first.
    pub symptom_frequency: Vec<SymptomCount>,
    pub alerts: Vec<String>,
}

/// A run of entries close enough together to be one period.
struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

fn group_periods(history: &[LogEntry]) -> Vec<Period> {
    let mut periods: Vec<Period> = Vec::new();
    let mut prev_start: Option<NaiveDate> = None;
    for entry in history {
        let entry_end = entry.end_date.unwrap_or(entry.start_date).max(entry.start_date);
        match (periods.last_mut(), prev_start) {
            (Some(current), Some(prev))
                if (entry.start_date - prev).num_days() <= SAME_PERIOD_GAP_DAYS =>
            {
                current.end = current.end.max(entry_end);
            }
            _ => periods.push(Period {
                start: entry.start_date,
                end: entry_end,
            }),
        }
        prev_start = Some(entry.start_date);
    }
    periods
}

fn rounded_mean(values: &[i64], default: i64) -> i64 {
    average_days(values).unwrap_or(default)
}

/// Summarize `history` as of `today`.
pub fn build_report(history: &[LogEntry], today: NaiveDate) -> CycleReport {
    let mut sorted = history.to_vec();
    sort_history(&mut sorted);

    let periods = group_periods(&sorted);
    let cycle_lengths: Vec<i64> = periods
        .windows(2)
        .map(|w| (w[1].start - w[0].start).num_days())
        .collect();
    let avg_cycle_length = rounded_mean(&cycle_lengths, DEFAULT_CYCLE_DAYS);

    let period_lengths: Vec<i64> = periods
        .iter()
        .map(|p| (p.end - p.start).num_days() + 1)
        .collect();
    let avg_period_length = rounded_mean(&period_lengths, DEFAULT_PERIOD_DAYS);

    let regularity = if periods.is_empty() {
        Regularity::Unknown
    } else if cycle_lengths.len() < 2 {
        Regularity::InsufficientData
    } else {
        let max = cycle_lengths.iter().max().copied().unwrap_or(0);
        let min = cycle_lengths.iter().min().copied().unwrap_or(0);
        if max - min > IRREGULAR_SPREAD_DAYS {
            Regularity::Irregular
        } else {
            Regularity::Regular
        }
    };

    let last_period = periods.last().map(|p| p.start).unwrap_or(today);
    let next_predicted = last_period
        .checked_add_signed(TimeDelta::days(avg_cycle_length))
        .unwrap_or(last_period);

    let window_start = today - TimeDelta::days(SYMPTOM_WINDOW_DAYS);
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in sorted.iter().filter(|e| e.start_date > window_start) {
        for symptom in &entry.symptoms {
            *counts.entry(symptom.as_str()).or_default() += 1;
        }
    }
    let mut symptom_frequency: Vec<SymptomCount> = counts
        .into_iter()
        .map(|(name, count)| SymptomCount {
            name: name.to_string(),
            count,
        })
        .collect();
    symptom_frequency.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

    let mut alerts = Vec::new();
    if avg_cycle_length < SHORT_CYCLE_DAYS {
        alerts.push("Short cycle (polymenorrhea) detected.".to_string());
    }
    if avg_cycle_length > LONG_CYCLE_DAYS {
        alerts.push("Long cycle (oligomenorrhea) detected.".to_string());
    }
    if alerts.is_empty() && !periods.is_empty() {
        alerts.push("Cycle length within normal range.".to_string());
    }

    CycleReport {
        cycle_lengths,
        avg_cycle_length,
        avg_period_length,
        last_period,
        next_predicted,
        regularity,
        symptom_frequency,
        alerts,
    }
}

/// Rough phase from days remaining until the predicted period.
pub fn phase_hint(prediction: &PredictionResult, today: NaiveDate) -> CyclePhase {
    if (prediction.next_date - today).num_days() > FOLLICULAR_MIN_DAYS {
        CyclePhase::Follicular
    } else {
        CyclePhase::Luteal
    }
}

pub struct ReportService {
    store: Arc<dyn LogStorePort>,
    predictor: Arc<CyclePredictor>,
    reports_dir: PathBuf,
}

impl ReportService {
    pub fn new(
        store: Arc<dyn LogStorePort>,
        predictor: Arc<CyclePredictor>,
        reports_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            predictor,
            reports_dir,
        }
    }

    pub async fn report(&self) -> Result<CycleReport, DomainError> {
        self.report_on(Local::now().date_naive()).await
    }

    pub async fn report_on(&self, today: NaiveDate) -> Result<CycleReport, DomainError> {
        let history = self.store.all_entries().await?;
        Ok(build_report(&history, today))
    }

    /// Write a Markdown report for `today`. Returns its path.
    pub async fn write_markdown(&self, today: NaiveDate) -> Result<PathBuf, DomainError> {
        fs::create_dir_all(&self.reports_dir)
            .await
            .map_err(|e| DomainError::Report(format!("Failed to create reports dir: {}", e)))?;

        let report = self.report_on(today).await?;
        let prediction = self.predictor.predict_next_period_on(today).await?;
        let md = render_markdown(&report, &prediction, today);

        let path = self.reports_dir.join(format!("report_{}.md", today.format("%Y-%m-%d")));
        fs::write(&path, md)
            .await
            .map_err(|e| DomainError::Report(format!("Failed to write report: {}", e)))?;

        info!(path = %path.display(), "report generated");
        Ok(path)
    }
}

pub fn render_markdown(
    report: &CycleReport,
    prediction: &PredictionResult,
    today: NaiveDate,
) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Cycle Report: {}\n\n", today.format("%b %-d, %Y")));
    md.push_str("---\n\n");

    md.push_str("## Overview\n\n");
    md.push_str(&format!(
        "- **Average cycle length:** {} days\n",
        report.avg_cycle_length
    ));
    md.push_str(&format!(
        "- **Average period length:** {} days\n",
        report.avg_period_length
    ));
    md.push_str(&format!(
        "- **Last period:** {}\n",
        report.last_period.format("%b %-d, %Y")
    ));
    md.push_str(&format!("- **Regularity:** {}\n", report.regularity));
    md.push_str(&format!(
        "- **Next period:** {} ({} estimate, {:.0}% confidence)\n",
        prediction.next_date.format("%b %-d, %Y"),
        prediction.source,
        prediction.confidence * 100.0
    ));
    md.push_str(&format!(
        "- **Likely phase:** {}\n\n",
        phase_hint(prediction, today)
    ));

    if !report.cycle_lengths.is_empty() {
        md.push_str("## Cycle History\n\n");
        let lengths: Vec<String> = report.cycle_lengths.iter().map(|d| d.to_string()).collect();
        md.push_str(&format!("{} days\n\n", lengths.join(", ")));
    }

    if !report.symptom_frequency.is_empty() {
        md.push_str("## Symptoms (last 90 days)\n\n");
        for s in &report.symptom_frequency {
            md.push_str(&format!("- {}: {}\n", s.name, s.count));
        }
        md.push('\n');
    }

    if !report.alerts.is_empty() {
        md.push_str("## Alerts\n\n");
        for alert in &report.alerts {
            md.push_str(&format!("- {}\n", alert));
        }
        md.push('\n');
    }

    md.push_str("---\n");
    md.push_str("*For information only. Not medical advice.*\n");
    md
}
