//! Text formatting for amounts and expense rows.

use crate::domain::Expense;
use chrono::{DateTime, TimeZone};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

pub const CURRENCY: &str = "Rs.";

/// Group the integer part by thousands, keep at most two decimals, drop trailing zeros.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// One history line: category initial, name, description, amount, local date.
pub fn expense_row<Tz>(expense: &Expense, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let initial = expense.category.as_str().chars().next().unwrap_or('?');
    let date = expense.date.with_timezone(tz).format("%d/%m/%Y");
    let mut row = format!("[{}] {}", initial, expense.name);
    if !expense.description.is_empty() {
        row.push_str(&format!(" ({})", truncate(&expense.description, 40)));
    }
    format!(
        "{:<60} {} {:>12}  {}",
        row,
        CURRENCY,
        format_amount(expense.amount),
        date
    )
}

/// Local calendar date of `now`, for headings.
pub fn day_heading<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    now.format("%A, %d %B %Y").to_string()
}

fn truncate(s: &str, max_chars: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    if first_line.chars().count() <= max_chars {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, ExpenseId};
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_format_amount_groups_thousands() {
        assert_eq!(format_amount(Decimal::ZERO), "0");
        assert_eq!(format_amount(Decimal::from(500)), "500");
        assert_eq!(format_amount(Decimal::from(1250)), "1,250");
        assert_eq!(format_amount(Decimal::from(1234567)), "1,234,567");
        assert_eq!(format_amount(Decimal::new(125050, 2)), "1,250.5");
        assert_eq!(format_amount(Decimal::new(99999, 3)), "100");
    }

    #[test]
    fn test_expense_row_contents() {
        let expense = Expense {
            id: ExpenseId::from("x"),
            name: "Lunch".to_string(),
            amount: Decimal::from(1500),
            category: Category::Food,
            description: "team lunch at the office cafeteria downtown branch".to_string(),
            date: DateTime::parse_from_rfc3339("2024-03-05T20:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let tz = FixedOffset::east_opt(5 * 3600).unwrap();
        let row = expense_row(&expense, &tz);
        assert!(row.starts_with("[F] Lunch (team lunch"));
        assert!(row.contains("..."));
        assert!(row.contains("1,500"));
        assert!(row.ends_with("06/03/2024"));
    }
}
