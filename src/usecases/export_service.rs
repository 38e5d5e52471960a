//! CSV export of the expense list. Uses the `csv` crate for quoting.

use crate::domain::{DomainError, Expense};
use chrono::{NaiveDate, TimeZone};
use std::fmt;
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

/// Render expenses as semicolon-delimited CSV with a header row.
///
/// Format: `Date;Name;Category;Amount;Description`, dates in `tz`.
pub fn expenses_to_csv<Tz>(expenses: &[Expense], tz: &Tz) -> Result<String, csv::Error>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_writer(Vec::new());

    wtr.write_record(["Date", "Name", "Category", "Amount", "Description"])?;

    for e in expenses {
        let date_str = e
            .date
            .with_timezone(tz)
            .format("%Y-%m-%d %H:%M")
            .to_string();
        // The csv crate quotes delimiters and quotes; newlines are flattened for spreadsheet import.
        let description = e.description.replace('\n', " ").replace('\r', "");
        let amount = e.amount.to_string();
        wtr.write_record([
            date_str.as_str(),
            e.name.as_str(),
            e.category.as_str(),
            amount.as_str(),
            description.as_str(),
        ])?;
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

/// Writes CSV snapshots of the expense list to a reports directory.
pub struct ExportService {
    reports_dir: PathBuf,
}

impl ExportService {
    pub fn new(reports_dir: PathBuf) -> Self {
        Self { reports_dir }
    }

    /// Write `expenses_<day>.csv`, replacing an earlier export from the same day.
    pub async fn export<Tz>(
        &self,
        expenses: &[Expense],
        tz: &Tz,
        day: NaiveDate,
    ) -> Result<PathBuf, DomainError>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        fs::create_dir_all(&self.reports_dir)
            .await
            .map_err(|e| DomainError::Export(format!("Failed to create reports dir: {}", e)))?;

        let content = expenses_to_csv(expenses, tz)
            .map_err(|e| DomainError::Export(format!("Failed to generate CSV: {}", e)))?;

        let path = self
            .reports_dir
            .join(format!("expenses_{}.csv", day.format("%Y-%m-%d")));
        fs::write(&path, content)
            .await
            .map_err(|e| DomainError::Export(format!("Failed to write export: {}", e)))?;

        info!(path = %path.display(), rows = expenses.len(), "expenses exported");
        Ok(path)
    }
}
