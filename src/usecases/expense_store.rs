//! The expense store: authoritative list of expenses, persisted wholesale on every mutation.
//!
//! One instance per session: construct with [`ExpenseStore::load`] and share it by `Arc`.

use crate::domain::{Category, DomainError, Expense, ExpenseId, is_storable_amount};
use crate::ports::StoragePort;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Storage key holding the serialized expense list.
pub const STORAGE_KEY: &str = "as_expenses";

/// Serialize the full list (most-recent-first) to the persisted JSON format.
pub fn encode_expenses(expenses: &[Expense]) -> Result<String, DomainError> {
    serde_json::to_string(expenses).map_err(|e| DomainError::Serialization(e.to_string()))
}

pub fn decode_expenses(raw: &str) -> Result<Vec<Expense>, DomainError> {
    serde_json::from_str(raw).map_err(|e| DomainError::Serialization(e.to_string()))
}

pub struct ExpenseStore {
    storage: Arc<dyn StoragePort>,
    key: String,
    /// Most-recent-first.
    expenses: RwLock<Vec<Expense>>,
    /// Set when the last write failed; cleared by the next successful write.
    dirty: AtomicBool,
}

impl ExpenseStore {
    /// Load the list stored under [`STORAGE_KEY`].
    pub async fn load(storage: Arc<dyn StoragePort>) -> Result<Self, DomainError> {
        Self::load_with_key(storage, STORAGE_KEY).await
    }

    /// Load the list stored under `key`.
    ///
    /// An absent entry starts an empty store. A malformed entry is logged and also
    /// starts empty; it is overwritten by the next mutation. Read failures (I/O) are
    /// returned so an unreadable store is never replaced by an empty one.
    pub async fn load_with_key(
        storage: Arc<dyn StoragePort>,
        key: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let key = key.into();
        let expenses = match storage.get(&key).await? {
            None => {
                info!(key = %key, "no saved expenses, starting empty");
                Vec::new()
            }
            Some(raw) => match decode_expenses(&raw) {
                Ok(list) => {
                    info!(key = %key, count = list.len(), "loaded expenses");
                    list
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "failed to parse saved expenses, starting empty");
                    Vec::new()
                }
            },
        };

        Ok(Self {
            storage,
            key,
            expenses: RwLock::new(expenses),
            dirty: AtomicBool::new(false),
        })
    }

    /// Record a new expense stamped with a fresh id and the current instant.
    ///
    /// Inputs are not validated here; see [`crate::domain::ExpenseDraft`]. The one check
    /// is that `amount` reloads unchanged from the persisted format; otherwise nothing
    /// changes and `Serialization` is returned.
    /// If the write fails the expense stays in memory and the error is returned.
    pub async fn add(
        &self,
        name: impl Into<String>,
        amount: Decimal,
        category: Category,
        description: impl Into<String>,
    ) -> Result<Expense, DomainError> {
        if !is_storable_amount(amount) {
            return Err(DomainError::Serialization(format!(
                "amount {} cannot be stored exactly",
                amount
            )));
        }
        let mut expenses = self.expenses.write().await;
        let mut id = ExpenseId::generate();
        while expenses.iter().any(|e| e.id == id) {
            id = ExpenseId::generate();
        }
        let expense = Expense {
            id,
            name: name.into(),
            amount,
            category,
            description: description.into(),
            date: Utc::now(),
        };
        expenses.insert(0, expense.clone());
        info!(
            id = %expense.id,
            category = %expense.category,
            amount = %expense.amount,
            "expense added"
        );
        self.persist(&expenses).await?;
        Ok(expense)
    }

    /// Remove the expense with `id`. Returns whether anything was removed;
    /// an unknown id is not an error.
    pub async fn delete(&self, id: &ExpenseId) -> Result<bool, DomainError> {
        let mut expenses = self.expenses.write().await;
        let before = expenses.len();
        expenses.retain(|e| &e.id != id);
        let removed = expenses.len() != before;
        if removed {
            info!(id = %id, "expense deleted");
        } else {
            debug!(id = %id, "delete: no such expense");
        }
        if removed || self.is_dirty() {
            self.persist(&expenses).await?;
        }
        Ok(removed)
    }

    /// Snapshot of the current list, most-recent-first.
    pub async fn list(&self) -> Vec<Expense> {
        self.expenses.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.expenses.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.expenses.read().await.is_empty()
    }

    /// True if the in-memory list has changes the last write did not save.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Retry writing the full list if a previous write failed.
    pub async fn flush(&self) -> Result<(), DomainError> {
        if !self.is_dirty() {
            return Ok(());
        }
        let expenses = self.expenses.read().await;
        self.persist(&expenses).await
    }

    async fn persist(&self, expenses: &[Expense]) -> Result<(), DomainError> {
        let result = match encode_expenses(expenses) {
            Ok(json) => self.storage.set(&self.key, &json).await,
            Err(e) => Err(e),
        };
        match &result {
            Ok(()) => {
                self.dirty.store(false, Ordering::Release);
                debug!(key = %self.key, count = expenses.len(), "expenses persisted");
            }
            Err(e) => {
                self.dirty.store(true, Ordering::Release);
                warn!(key = %self.key, error = %e, "failed to persist expenses");
            }
        }
        result
    }
}
