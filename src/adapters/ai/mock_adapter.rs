//! Mock suggester for running without an API key.
//!
//! Keyword lookup instead of a model; falls back to `Other`.

use crate::domain::{Category, DomainError};
use crate::ports::CategorySuggesterPort;
use std::time::Duration;
use tracing::info;

const KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Food,
        &[
            "lunch", "dinner", "breakfast", "coffee", "tea", "restaurant", "pizza", "burger",
            "grocer", "snack", "food", "meal", "cafe",
        ],
    ),
    (
        Category::Transport,
        &[
            "uber", "careem", "taxi", "bus", "train", "fuel", "petrol", "gas station", "metro",
            "parking", "ride", "flight", "rickshaw",
        ],
    ),
    (
        Category::Shopping,
        &[
            "shirt", "shoes", "clothes", "amazon", "daraz", "mall", "gift", "book", "store",
            "shopping",
        ],
    ),
    (
        Category::Bills,
        &[
            "rent", "electric", "water", "internet", "phone", "mobile", "bill", "subscription",
            "insurance", "utility",
        ],
    ),
];

/// Mock category suggester.
///
/// Simulates network latency with configurable delay.
pub struct MockSuggester {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl MockSuggester {
    /// Create a new mock suggester with default delay (300ms).
    pub fn new() -> Self {
        Self { delay_ms: 300 }
    }

    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }

    fn classify(text: &str) -> Category {
        let text = text.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| text.contains(w)))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Other)
    }
}

impl Default for MockSuggester {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CategorySuggesterPort for MockSuggester {
    async fn suggest_category(&self, text: &str) -> Result<Category, DomainError> {
        info!(text_len = text.len(), "[MOCK] Simulating category suggestion");
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        Ok(Self::classify(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_suggester() {
        let suggester = MockSuggester::with_delay(1);
        assert_eq!(
            suggester.suggest_category("Lunch with team").await.unwrap(),
            Category::Food
        );
        assert_eq!(
            suggester.suggest_category("Uber to office").await.unwrap(),
            Category::Transport
        );
        assert_eq!(
            suggester.suggest_category("Electricity BILL").await.unwrap(),
            Category::Bills
        );
        assert_eq!(
            suggester.suggest_category("haircut").await.unwrap(),
            Category::Other
        );
    }
}
