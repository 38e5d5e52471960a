//! Implements InputPort. Inquire-based interactive prompts.
//!
//! Main menu loop over the expense store: add, history, today's summary, delete, export.

use crate::adapters::ui::format::{CURRENCY, day_heading, expense_row, format_amount};
use crate::adapters::ui::progress;
use crate::domain::draft::parse_amount;
use crate::domain::{Category, DailySummary, DomainError, Expense, ExpenseDraft};
use crate::ports::InputPort;
use crate::usecases::{ExpenseStore, ExportService, SuggestionService};
use async_trait::async_trait;
use chrono::Local;
use crossterm::style::Stylize;
use inquire::ui::{Color, RenderConfig, StyleSheet, Styled};
use inquire::validator::Validation;
use inquire::{Confirm, CustomUserError, InquireError, Select, Text};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Yellow-on-black prompt theme, applied globally once at startup.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("›").with_fg(Color::LightYellow))
        .with_highlighted_option_prefix(Styled::new("▶").with_fg(Color::LightYellow))
        .with_answer(StyleSheet::new().with_fg(Color::LightYellow))
        .with_help_message(StyleSheet::new().with_fg(Color::DarkGrey));
    inquire::set_global_render_config(config);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Add,
    History,
    Summary,
    Delete,
    Export,
    Quit,
}

impl MenuAction {
    const ALL: [MenuAction; 6] = [
        MenuAction::Add,
        MenuAction::History,
        MenuAction::Summary,
        MenuAction::Delete,
        MenuAction::Export,
        MenuAction::Quit,
    ];
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuAction::Add => "New expense",
            MenuAction::History => "Recent history",
            MenuAction::Summary => "Today's summary",
            MenuAction::Delete => "Delete an expense",
            MenuAction::Export => "Export to CSV",
            MenuAction::Quit => "Quit",
        };
        f.write_str(label)
    }
}

/// Select option wrapping an expense, rendered as a history row.
struct ExpenseChoice(Expense);

impl fmt::Display for ExpenseChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&expense_row(&self.0, &Local))
    }
}

fn is_cancel(e: &InquireError) -> bool {
    matches!(
        e,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

/// Esc / Ctrl-C inside a sub-form returns to the menu instead of failing.
fn ui_err(e: InquireError) -> DomainError {
    if is_cancel(&e) {
        DomainError::Cancelled
    } else {
        DomainError::Ui(e.to_string())
    }
}

fn print_error(title: &str, detail: &str) {
    println!("{} {}", format!("{}:", title).red().bold(), detail);
}

fn print_notice(text: &str) {
    println!("{}", text.dark_grey());
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    store: Arc<ExpenseStore>,
    suggestions: Arc<SuggestionService>,
    export: Arc<ExportService>,
    history_limit: usize,
}

impl TuiInputPort {
    pub fn new(
        store: Arc<ExpenseStore>,
        suggestions: Arc<SuggestionService>,
        export: Arc<ExportService>,
        history_limit: usize,
    ) -> Self {
        Self {
            store,
            suggestions,
            export,
            history_limit,
        }
    }

    /// Add-expense form. Validation errors are shown and nothing is stored.
    async fn add_expense(&self) -> Result<(), DomainError> {
        // A new form: any suggestion still in flight belongs to the old one.
        self.suggestions.invalidate();

        let name = Text::new("Expense name:")
            .with_placeholder("Rent, Lunch, etc.")
            .prompt()
            .map_err(ui_err)?;
        let amount = Text::new(&format!("Amount ({}):", CURRENCY))
            .with_placeholder("0")
            .with_validator(|input: &str| -> Result<Validation, CustomUserError> {
                if input.trim().is_empty() {
                    return Ok(Validation::Valid);
                }
                Ok(match parse_amount(input) {
                    Ok(_) => Validation::Valid,
                    Err(e) => Validation::Invalid(e.to_string().into()),
                })
            })
            .prompt()
            .map_err(ui_err)?;
        let description = Text::new("Description:")
            .with_help_message("optional")
            .prompt()
            .map_err(ui_err)?;

        let suggested = if Confirm::new("Suggest a category automatically?")
            .with_default(!(name.trim().is_empty() && description.trim().is_empty()))
            .prompt()
            .map_err(ui_err)?
        {
            self.suggest_category(&name, &description).await
        } else {
            None
        };

        let category = Select::new("Category:", Category::ALL.to_vec())
            .with_starting_cursor(suggested.unwrap_or_default().index())
            .prompt()
            .map_err(ui_err)?;
        if suggested.is_some_and(|s| s != category) {
            info!(suggested = ?suggested, chosen = %category, "suggestion overridden");
        }

        let draft = match ExpenseDraft::parse(&name, &amount, category, &description) {
            Ok(draft) => draft,
            Err(DomainError::Validation(msg)) => {
                print_error("Validation error", &msg);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        match self
            .store
            .add(draft.name, draft.amount, draft.category, draft.description)
            .await
        {
            Ok(expense) => println!(
                "{} {} {} {}",
                "Added".green().bold(),
                expense.name,
                CURRENCY,
                format_amount(expense.amount)
            ),
            Err(e @ DomainError::Storage(_)) => {
                print_error("Changes may not be saved", &e.to_string());
            }
            Err(e @ DomainError::Serialization(_)) => {
                print_error("Expense not added", &e.to_string());
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Ask the suggester, with a spinner. Any failure means "pick manually".
    async fn suggest_category(&self, name: &str, description: &str) -> Option<Category> {
        let spinner = progress::spinner("Suggesting a category...");
        let result = self.suggestions.suggest(name, description).await;
        spinner.finish_and_clear();

        match result {
            Ok(suggestion) => {
                let accepted = self.suggestions.accept(&suggestion);
                if let Some(category) = accepted {
                    print_notice(&format!("Suggested: {}", category));
                }
                accepted
            }
            Err(DomainError::Validation(msg)) => {
                print_error("Information missing", &msg);
                None
            }
            Err(DomainError::Busy) => {
                print_notice("A suggestion is already pending; pick a category manually.");
                None
            }
            Err(_) => {
                // Already logged by the service.
                print_notice("Suggestion unavailable; pick a category manually.");
                None
            }
        }
    }

    async fn show_history(&self) {
        let expenses = self.store.list().await;
        println!();
        println!("{}", "Recent History".yellow().bold());
        if expenses.is_empty() {
            print_notice("No expenses recorded yet.");
            print_notice("Add your first expense to get started.");
        } else {
            for expense in expenses.iter().take(self.history_limit) {
                println!("  {}", expense_row(expense, &Local));
            }
            if expenses.len() > self.history_limit {
                print_notice(&format!(
                    "  ... and {} older",
                    expenses.len() - self.history_limit
                ));
            }
        }
        println!();
    }

    async fn show_summary(&self) {
        let now = Local::now();
        let expenses = self.store.list().await;
        let summary = DailySummary::compute(&expenses, &now);

        println!();
        println!("{}", day_heading(&now).dark_grey());
        println!(
            "{}  {} {}",
            "TODAY'S TOTAL SPENDING".bold(),
            CURRENCY.yellow(),
            format_amount(summary.total).yellow().bold()
        );
        println!(
            "Transactions: {} today, {} recorded",
            summary.count_today, summary.count_all
        );
        for (category, amount) in summary.by_category.iter() {
            println!(
                "  {:<10} {} {:>12}",
                category.to_string(),
                CURRENCY,
                format_amount(amount)
            );
        }
        if self.store.is_dirty() {
            print_error("Warning", "some changes have not been saved to disk");
        }
        println!();
    }

    async fn delete_expense(&self) -> Result<(), DomainError> {
        let expenses = self.store.list().await;
        if expenses.is_empty() {
            print_notice("Nothing to delete.");
            return Ok(());
        }
        let options: Vec<ExpenseChoice> = expenses.into_iter().map(ExpenseChoice).collect();
        let ExpenseChoice(expense) = Select::new("Delete which expense?", options)
            .with_page_size(self.history_limit)
            .prompt()
            .map_err(ui_err)?;

        let confirmed = Confirm::new(&format!("Delete \"{}\"?", expense.name))
            .with_default(false)
            .prompt()
            .map_err(ui_err)?;
        if !confirmed {
            return Ok(());
        }

        match self.store.delete(&expense.id).await {
            Ok(true) => println!("{} {}", "Deleted".green().bold(), expense.name),
            Ok(false) => print_notice("That expense was already gone."),
            Err(e @ DomainError::Storage(_)) => {
                print_error("Changes may not be saved", &e.to_string());
            }
            Err(e @ DomainError::Serialization(_)) => {
                print_error("Expense not added", &e.to_string());
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn export_csv(&self) -> Result<(), DomainError> {
        let expenses = self.store.list().await;
        let today = Local::now().date_naive();
        match self.export.export(&expenses, &Local, today).await {
            Ok(path) => println!("{} {}", "Exported to".green().bold(), path.display()),
            Err(e) => print_error("Export failed", &e.to_string()),
        }
        Ok(())
    }

    /// Last chance to save a list whose previous write failed.
    async fn flush_on_exit(&self) {
        if let Err(e) = self.store.flush().await {
            warn!(error = %e, "unsaved changes at exit");
            print_error("Changes may not be saved", &e.to_string());
        }
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        self.show_summary().await;
        loop {
            let action = match Select::new("What would you like to do?", MenuAction::ALL.to_vec())
                .prompt()
            {
                Ok(action) => action,
                Err(e) if is_cancel(&e) => MenuAction::Quit,
                Err(e) => return Err(ui_err(e)),
            };

            let result = match action {
                MenuAction::Add => self.add_expense().await,
                MenuAction::History => {
                    self.show_history().await;
                    Ok(())
                }
                MenuAction::Summary => {
                    self.show_summary().await;
                    Ok(())
                }
                MenuAction::Delete => self.delete_expense().await,
                MenuAction::Export => self.export_csv().await,
                MenuAction::Quit => break,
            };

            match result {
                Ok(()) => {}
                Err(DomainError::Cancelled) => print_notice("Cancelled."),
                Err(e) => return Err(e),
            }
        }
        self.flush_on_exit().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_labels_unique() {
        let labels: Vec<String> = MenuAction::ALL.iter().map(|a| a.to_string()).collect();
        let mut deduped = labels.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(labels.len(), deduped.len());
    }

    #[test]
    fn test_cancel_detection() {
        assert!(is_cancel(&InquireError::OperationCanceled));
        assert!(is_cancel(&InquireError::OperationInterrupted));
        assert!(!is_cancel(&InquireError::NotTTY));
        assert!(matches!(
            ui_err(InquireError::OperationCanceled),
            DomainError::Cancelled
        ));
    }
}
