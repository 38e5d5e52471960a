//! Optional "Auto" category suggestion for the add-expense form.
//!
//! One request at a time. Each request carries the form generation it was issued
//! against; a result is only applied if the form has not changed since.

use crate::domain::{Category, DomainError};
use crate::ports::CategorySuggesterPort;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{info, warn};

/// A category returned by the suggester, tagged with the form generation it answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    pub token: u64,
    pub category: Category,
}

/// Clears the busy flag when the request finishes, fails, or is dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SuggestionService {
    suggester: Arc<dyn CategorySuggesterPort>,
    busy: AtomicBool,
    generation: AtomicU64,
}

impl SuggestionService {
    pub fn new(suggester: Arc<dyn CategorySuggesterPort>) -> Self {
        Self {
            suggester,
            busy: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Mark the form as changed. Suggestions issued before this call become stale.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Ask the suggester for a category. The description is used when present,
    /// otherwise the name.
    ///
    /// # Errors
    /// - `Validation` if both name and description are blank
    /// - `Busy` if another request is still pending
    /// - `Suggestion` (or whatever the adapter returned) if the call failed; already logged
    pub async fn suggest(&self, name: &str, description: &str) -> Result<Suggestion, DomainError> {
        let text = if !description.trim().is_empty() {
            description.trim()
        } else if !name.trim().is_empty() {
            name.trim()
        } else {
            return Err(DomainError::Validation(
                "Please provide a name or description for category suggestion.".to_string(),
            ));
        };

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DomainError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        let token = self.generation.load(Ordering::Acquire);
        match self.suggester.suggest_category(text).await {
            Ok(category) => {
                info!(token, category = %category, "category suggested");
                Ok(Suggestion { token, category })
            }
            Err(e) => {
                warn!(error = %e, "category suggestion failed, falling back to manual choice");
                Err(e)
            }
        }
    }

    /// The suggested category, or `None` if the form changed after the request was issued.
    pub fn accept(&self, suggestion: &Suggestion) -> Option<Category> {
        let current = self.generation.load(Ordering::Acquire);
        if suggestion.token == current {
            Some(suggestion.category)
        } else {
            info!(
                token = suggestion.token,
                current, "discarding stale category suggestion"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Records the text it was asked about and answers with a fixed category.
    struct FixedSuggester {
        answer: Result<Category, String>,
        seen: Mutex<Vec<String>>,
    }

    impl FixedSuggester {
        fn new(answer: Result<Category, String>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl CategorySuggesterPort for FixedSuggester {
        async fn suggest_category(&self, text: &str) -> Result<Category, DomainError> {
            self.seen.lock().unwrap().push(text.to_string());
            self.answer.clone().map_err(DomainError::Suggestion)
        }
    }

    /// Blocks until released, so a request can be held in flight.
    struct GatedSuggester {
        gate: Notify,
    }

    #[async_trait::async_trait]
    impl CategorySuggesterPort for GatedSuggester {
        async fn suggest_category(&self, _text: &str) -> Result<Category, DomainError> {
            self.gate.notified().await;
            Ok(Category::Transport)
        }
    }

    #[tokio::test]
    async fn test_prefers_description_over_name() {
        let suggester = FixedSuggester::new(Ok(Category::Food));
        let service = SuggestionService::new(suggester.clone());

        service.suggest("Lunch", "burger at the mall").await.unwrap();
        service.suggest("Lunch", "   ").await.unwrap();

        let seen = suggester.seen.lock().unwrap().clone();
        assert_eq!(seen, vec!["burger at the mall", "Lunch"]);
    }

    #[tokio::test]
    async fn test_blank_input_rejected_without_calling_suggester() {
        let suggester = FixedSuggester::new(Ok(Category::Food));
        let service = SuggestionService::new(suggester.clone());
        let result = service.suggest("", " ").await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(suggester.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_returned_and_clears_busy() {
        let service = SuggestionService::new(FixedSuggester::new(Err("timeout".to_string())));
        assert!(matches!(
            service.suggest("Taxi", "").await,
            Err(DomainError::Suggestion(_))
        ));
        assert!(!service.is_busy());
    }

    #[tokio::test]
    async fn test_stale_suggestion_is_discarded() {
        let service = SuggestionService::new(FixedSuggester::new(Ok(Category::Bills)));
        let fresh = service.suggest("Electricity", "").await.unwrap();
        assert_eq!(service.accept(&fresh), Some(Category::Bills));

        let stale = service.suggest("Electricity", "").await.unwrap();
        service.invalidate();
        assert_eq!(service.accept(&stale), None);
    }

    #[tokio::test]
    async fn test_second_request_while_pending_is_busy() {
        let gated = Arc::new(GatedSuggester {
            gate: Notify::new(),
        });
        let service = Arc::new(SuggestionService::new(gated.clone()));

        let pending = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.suggest("Uber", "").await })
        };
        while !service.is_busy() {
            tokio::task::yield_now().await;
        }

        assert!(matches!(
            service.suggest("Bus", "").await,
            Err(DomainError::Busy)
        ));

        gated.gate.notify_one();
        let suggestion = pending.await.unwrap().unwrap();
        assert_eq!(suggestion.category, Category::Transport);
        assert!(!service.is_busy());
    }
}
