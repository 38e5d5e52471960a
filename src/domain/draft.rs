//! Form input validation. Runs before anything reaches the expense store.

use crate::domain::{AMOUNT_DECIMALS, Category, DomainError, max_amount};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Validated input for a new expense.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub name: String,
    pub amount: Decimal,
    pub category: Category,
    pub description: String,
}

impl ExpenseDraft {
    /// Validate raw form fields.
    ///
    /// Name must be non-blank; amount must parse as a non-negative decimal.
    /// Thousands separators (`1,250`) are accepted.
    pub fn parse(
        name: &str,
        amount: &str,
        category: Category,
        description: &str,
    ) -> Result<Self, DomainError> {
        let name = name.trim();
        let amount = amount.trim();
        if name.is_empty() || amount.is_empty() {
            return Err(DomainError::Validation(
                "Expense name and amount are required.".to_string(),
            ));
        }
        let amount = parse_amount(amount)?;
        Ok(Self {
            name: name.to_string(),
            amount,
            category,
            description: description.trim().to_string(),
        })
    }
}

/// Parse a non-negative amount with at most two decimals, no larger than [`max_amount`].
pub fn parse_amount(raw: &str) -> Result<Decimal, DomainError> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let amount = Decimal::from_str(&cleaned)
        .map_err(|_| DomainError::Validation(format!("Amount must be a number, got {:?}", raw)))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DomainError::Validation(
            "Amount cannot be negative.".to_string(),
        ));
    }
    if amount.normalize().scale() > AMOUNT_DECIMALS {
        return Err(DomainError::Validation(format!(
            "Amount can have at most {} decimal places.",
            AMOUNT_DECIMALS
        )));
    }
    if amount > max_amount() {
        return Err(DomainError::Validation(format!(
            "Amount cannot exceed {}.",
            max_amount()
        )));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_draft() {
        let draft = ExpenseDraft::parse(" Lunch ", "1,250.50", Category::Food, "  ").unwrap();
        assert_eq!(draft.name, "Lunch");
        assert_eq!(draft.amount, Decimal::new(125050, 2));
        assert_eq!(draft.description, "");
    }

    #[test]
    fn test_missing_name_or_amount_rejected() {
        assert!(matches!(
            ExpenseDraft::parse("", "10", Category::Other, ""),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            ExpenseDraft::parse("Taxi", "  ", Category::Transport, ""),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_non_numeric_and_negative_amounts_rejected() {
        assert!(parse_amount("ten").is_err());
        assert!(parse_amount("-5").is_err());
        assert_eq!(parse_amount("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_amount_precision_and_range_bounded() {
        assert!(parse_amount("12345678901234567.89").is_err());
        assert!(parse_amount("79228162514264337593543950335").is_err());
        assert!(parse_amount("1.005").is_err());
        assert_eq!(parse_amount("1.500").unwrap(), Decimal::new(15, 1));
        assert_eq!(parse_amount("999,999,999,999.99").unwrap(), max_amount());
        assert!(parse_amount("1,000,000,000,000").is_err());
    }
}
