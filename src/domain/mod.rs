//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod draft;
pub mod entities;
pub mod errors;
pub mod summary;

pub use draft::ExpenseDraft;
pub use entities::{
    AMOUNT_DECIMALS, Category, Expense, ExpenseId, UnknownCategory, is_storable_amount, max_amount,
};
pub use errors::DomainError;
pub use summary::{CategorySummary, DailySummary, category_summary_today, total_spent_today};
