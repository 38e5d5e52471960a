//! Domain entities. Pure data structures for the core business.
//!
//! No storage/HTTP types here. The JSON layout of `Expense` is the persisted format.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed, closed set of expense categories.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Bills,
    #[default]
    Other,
}

impl Category {
    pub const COUNT: usize = 5;

    /// Every category, in display order.
    pub const ALL: [Category; Category::COUNT] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Bills,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills",
            Category::Other => "Other",
        }
    }

    /// Position in [`Category::ALL`].
    pub fn index(self) -> usize {
        match self {
            Category::Food => 0,
            Category::Transport => 1,
            Category::Shopping => 2,
            Category::Bills => 3,
            Category::Other => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label is not one of the five categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {:?}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Case-insensitive; surrounding whitespace and quotes are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().trim_matches(|c: char| c == '"' || c == '\'' || c == '.');
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Opaque expense identifier. New ids are UUIDv4; ids from older payloads load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(String);

impl ExpenseId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ExpenseId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ExpenseId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decimal places an amount may carry.
pub const AMOUNT_DECIMALS: u32 = 2;

/// Largest amount that survives the JSON-number round-trip exactly (15 significant digits).
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, AMOUNT_DECIMALS)
}

/// True if `amount` is written and read back unchanged by the persisted format.
pub fn is_storable_amount(amount: Decimal) -> bool {
    amount.abs() <= max_amount() && amount.normalize().scale() <= AMOUNT_DECIMALS
}

/// A single recorded spending event. Created only by the expense store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub name: String,
    /// Stored as a JSON number; see [`is_storable_amount`].
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    /// Creation instant, stamped by the store.
    pub date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_str_is_case_insensitive() {
        assert_eq!("food".parse::<Category>().unwrap(), Category::Food);
        assert_eq!(" TRANSPORT ".parse::<Category>().unwrap(), Category::Transport);
        assert_eq!("\"Bills\"".parse::<Category>().unwrap(), Category::Bills);
        assert!("Groceries".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_index_matches_all() {
        for (i, c) in Category::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn test_expense_json_matches_browser_layout() {
        let json = r#"[{"id":"k3j9x0a1b","name":"Lunch","amount":500,"category":"Food","description":"","date":"2024-03-05T12:30:00.000Z"}]"#;
        let list: Vec<Expense> = serde_json::from_str(json).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id.as_str(), "k3j9x0a1b");
        assert_eq!(list[0].amount, Decimal::from(500));
        assert_eq!(list[0].category, Category::Food);

        let out = serde_json::to_value(&list[0]).unwrap();
        assert!(out["amount"].is_number());
        assert_eq!(out["category"], "Food");
    }

    #[test]
    fn test_storable_amount_bounds() {
        assert!(is_storable_amount(Decimal::ZERO));
        assert!(is_storable_amount(max_amount()));
        assert!(is_storable_amount(Decimal::new(12500, 3)));
        assert!(!is_storable_amount(Decimal::new(1, 3)));
        assert!(!is_storable_amount(max_amount() + Decimal::new(1, 2)));
        assert!(!is_storable_amount(Decimal::MAX));
    }

    #[test]
    fn test_largest_storable_amount_survives_json() {
        let expense = Expense {
            id: ExpenseId::from("big"),
            name: "Big".to_string(),
            amount: max_amount(),
            category: Category::Other,
            description: String::new(),
            date: DateTime::parse_from_rfc3339("2024-03-05T12:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let json = serde_json::to_string(&expense).unwrap();
        let back: Expense = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expense);
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(ExpenseId::generate(), ExpenseId::generate());
    }
}
