//! Application use cases. Orchestrate domain logic via ports.

pub mod expense_store;
pub mod export_service;
pub mod suggestion_service;

pub use expense_store::{ExpenseStore, STORAGE_KEY};
pub use export_service::ExportService;
pub use suggestion_service::{Suggestion, SuggestionService};
