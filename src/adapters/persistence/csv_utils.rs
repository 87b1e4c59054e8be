//! CSV import/export of the period log. Uses the `csv` crate for quoting.
//!
//! Format: `start_date;end_date;flow;symptoms;notes` with a header row.
//! Symptoms are `|`-separated; empty cells mean "not recorded".

use crate::domain::{DomainError, FlowIntensity, LogEntry};
use chrono::NaiveDate;

const HEADER: [&str; 5] = ["start_date", "end_date", "flow", "symptoms", "notes"];
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn entries_to_csv(entries: &[LogEntry]) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_writer(Vec::new());

    wtr.write_record(HEADER)?;
    for e in entries {
        let start = e.start_date.format(DATE_FORMAT).to_string();
        let end = e
            .end_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
        let flow = e.flow_intensity.map(FlowIntensity::as_str).unwrap_or("");
        let symptoms = e.symptoms.iter().map(String::as_str).collect::<Vec<_>>().join("|");
        let notes = e.notes.replace('\n', " ").replace('\r', "");
        wtr.write_record([start.as_str(), end.as_str(), flow, symptoms.as_str(), notes.as_str()])?;
    }

    wtr.flush()?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))?;
    String::from_utf8(bytes).map_err(|e| {
        csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })
}

/// Parse CSV produced by `entries_to_csv`. Errors name the offending line.
pub fn entries_from_csv(data: &str) -> Result<Vec<LogEntry>, DomainError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_bytes());

    let mut entries = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let line = i + 2;
        let record = record.map_err(|e| DomainError::Input(format!("line {}: {}", line, e)))?;
        let field = |idx: usize| record.get(idx).map(str::trim).unwrap_or("");

        let parse_date = |s: &str| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map_err(|e| DomainError::Input(format!("line {}: bad date {:?}: {}", line, s, e)))
        };

        let mut entry = LogEntry::new(parse_date(field(0))?);
        if !field(1).is_empty() {
            entry = entry.with_end_date(parse_date(field(1))?);
        }
        if !field(2).is_empty() {
            let flow = FlowIntensity::parse(field(2)).ok_or_else(|| {
                DomainError::Input(format!("line {}: unknown flow {:?}", line, field(2)))
            })?;
            entry = entry.with_flow(flow);
        }
        entry = entry
            .with_symptoms(
                field(3)
                    .split('|')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_lowercase),
            )
            .with_notes(field(4));
        entries.push(entry);
    }
    Ok(entries)
}
