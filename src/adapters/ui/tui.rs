//! Implements InputPort. Inquire-based interactive shell.
//!
//! Main menu: prediction, report, chat, period logging, CSV transfer.

use crate::domain::{DomainError, FlowIntensity, LogEntry};
use crate::ports::InputPort;
use crate::usecases::report_service::phase_hint;
use crate::usecases::{ChatService, Conversation, CyclePredictor, HistoryService, ReportService};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use inquire::{Confirm, Select, Text};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Predict,
    Report,
    Chat,
    LogPeriod,
    History,
    ImportCsv,
    ExportCsv,
    Quit,
}

impl MenuAction {
    const ALL: [MenuAction; 8] = [
        MenuAction::Predict,
        MenuAction::Report,
        MenuAction::Chat,
        MenuAction::LogPeriod,
        MenuAction::History,
        MenuAction::ImportCsv,
        MenuAction::ExportCsv,
        MenuAction::Quit,
    ];
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuAction::Predict => "Predict next period",
            MenuAction::Report => "Cycle report",
            MenuAction::Chat => "Talk to Luna",
            MenuAction::LogPeriod => "Log a period",
            MenuAction::History => "Show history",
            MenuAction::ImportCsv => "Import CSV",
            MenuAction::ExportCsv => "Export CSV",
            MenuAction::Quit => "Quit",
        };
        f.write_str(label)
    }
}

fn prompt_err(e: inquire::InquireError) -> DomainError {
    DomainError::Input(e.to_string())
}

/// Empty input yields `None`.
fn parse_optional_date(s: &str) -> Result<Option<NaiveDate>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("expected YYYY-MM-DD, got {:?}", s))
}

fn parse_symptoms(s: &str) -> Vec<String> {
    s.split(',')
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}

pub struct TuiInputPort {
    predictor: Arc<CyclePredictor>,
    reports: Arc<ReportService>,
    chat: Arc<ChatService>,
    history: Arc<HistoryService>,
    user_name: String,
    rng_seed: Option<u64>,
}

impl TuiInputPort {
    pub fn new(
        predictor: Arc<CyclePredictor>,
        reports: Arc<ReportService>,
        chat: Arc<ChatService>,
        history: Arc<HistoryService>,
    ) -> Self {
        Self {
            predictor,
            reports,
            chat,
            history,
            user_name: "there".to_string(),
            rng_seed: None,
        }
    }

    pub fn with_rng_seed(mut self, seed: Option<u64>) -> Self {
        self.rng_seed = seed;
        self
    }

    async fn show_prediction(&self) -> Result<(), DomainError> {
        let today = Local::now().date_naive();
        let p = self.predictor.predict_next_period_on(today).await?;
        let days = (p.next_date - today).num_days();
        println!(
            "Next period: {} (in {} days, {:.0}% confidence, {})",
            p.next_date,
            days,
            p.confidence * 100.0,
            p.source
        );
        println!("Likely phase: {}", phase_hint(&p, today));
        Ok(())
    }

    async fn show_report(&self) -> Result<(), DomainError> {
        let today = Local::now().date_naive();
        let r = self.reports.report_on(today).await?;
        println!("Average cycle: {} days", r.avg_cycle_length);
        println!("Average period: {} days", r.avg_period_length);
        println!("Regularity: {}", r.regularity);
        for s in r.symptom_frequency.iter().take(5) {
            println!("  {} x{}", s.name, s.count);
        }
        for alert in &r.alerts {
            println!("! {}", alert);
        }
        let save = Confirm::new("Save as Markdown?")
            .with_default(false)
            .prompt()
            .map_err(prompt_err)?;
        if save {
            let path = self.reports.write_markdown(today).await?;
            println!("Saved {}", path.display());
        }
        Ok(())
    }

    async fn chat_loop(&self) -> Result<(), DomainError> {
        let conversation = match self.rng_seed {
            Some(seed) => Conversation::with_seed(seed),
            None => Conversation::new(),
        };
        println!("{}", ChatService::greeting(&self.user_name));
        println!("(empty line to go back)");
        loop {
            let text = Text::new("You:").prompt().map_err(prompt_err)?;
            if text.trim().is_empty() {
                return Ok(());
            }
            let reply = self.chat.reply(&conversation, &text).await;
            println!("Luna: {}\n", reply.text);
        }
    }

    async fn log_period(&self) -> Result<(), DomainError> {
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        let start = Text::new("Start date (YYYY-MM-DD):")
            .with_default(&today)
            .prompt()
            .map_err(prompt_err)?;
        let start = parse_optional_date(&start)
            .map_err(DomainError::Input)?
            .ok_or_else(|| DomainError::Input("start date is required".into()))?;
        let end = Text::new("End date (optional):")
            .prompt()
            .map_err(prompt_err)?;
        let end = parse_optional_date(&end).map_err(DomainError::Input)?;

        let flows = vec!["skip", "light", "medium", "heavy", "spotting"];
        let flow = Select::new("Flow:", flows).prompt().map_err(prompt_err)?;
        let symptoms = Text::new("Symptoms (comma-separated, optional):")
            .prompt()
            .map_err(prompt_err)?;
        let notes = Text::new("Notes (optional):")
            .prompt()
            .map_err(prompt_err)?;

        let mut entry = LogEntry::new(start)
            .with_symptoms(parse_symptoms(&symptoms))
            .with_notes(notes.trim());
        if let Some(end) = end {
            entry = entry.with_end_date(end);
        }
        if let Some(flow) = FlowIntensity::parse(flow) {
            entry = entry.with_flow(flow);
        }
        let id = self.history.log_period(entry).await?;
        println!("Saved entry #{}", id);
        Ok(())
    }

    async fn show_history(&self) -> Result<(), DomainError> {
        let entries = self.history.entries().await?;
        if entries.is_empty() {
            println!("No entries yet.");
            return Ok(());
        }
        for e in &entries {
            let end = e.end_date.map(|d| d.to_string()).unwrap_or_default();
            let flow = e.flow_intensity.map(FlowIntensity::as_str).unwrap_or("-");
            let symptoms: Vec<&str> = e.symptoms.iter().map(String::as_str).collect();
            println!(
                "#{:<4} {} {:<10} {:<8} {}",
                e.id.unwrap_or_default(),
                e.start_date,
                end,
                flow,
                symptoms.join(", ")
            );
        }
        let delete = Text::new("Delete entry # (empty to skip):")
            .prompt()
            .map_err(prompt_err)?;
        if let Ok(id) = delete.trim().parse::<i64>() {
            if self.history.delete(id).await? {
                println!("Deleted #{}", id);
            } else {
                println!("No entry #{}", id);
            }
        }
        Ok(())
    }

    async fn import_csv(&self) -> Result<(), DomainError> {
        let path = Text::new("CSV file to import:")
            .prompt()
            .map_err(prompt_err)?;
        let count = self.history.import_csv(&PathBuf::from(path.trim())).await?;
        println!("Imported {} entries", count);
        Ok(())
    }

    async fn export_csv(&self) -> Result<(), DomainError> {
        let path = Text::new("Export to:")
            .with_default("cycle_history.csv")
            .prompt()
            .map_err(prompt_err)?;
        let count = self.history.export_csv(&PathBuf::from(path.trim())).await?;
        println!("Exported {} entries", count);
        Ok(())
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let action = Select::new("What would you like to do?", MenuAction::ALL.to_vec())
                .prompt()
                .map_err(prompt_err)?;
            let result = match action {
                MenuAction::Predict => self.show_prediction().await,
                MenuAction::Report => self.show_report().await,
                MenuAction::Chat => self.chat_loop().await,
                MenuAction::LogPeriod => self.log_period().await,
                MenuAction::History => self.show_history().await,
                MenuAction::ImportCsv => self.import_csv().await,
                MenuAction::ExportCsv => self.export_csv().await,
                MenuAction::Quit => return Ok(()),
            };
            // Errors from one action leave the shell running.
            if let Err(e) = result {
                eprintln!("Error: {}", e);
            }
        }
    }
}
