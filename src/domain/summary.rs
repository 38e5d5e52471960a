//! Derived views over the expense list, scoped to "today".
//!
//! "Today" is the calendar date of `now` in `now`'s own timezone. Callers pass
//! `Local::now()` in the app and a fixed offset in tests.
//!
//! Sums saturate at `Decimal::MAX`: hand-edited or legacy data must not crash the dashboard.

use crate::domain::{Category, Expense};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

/// Per-category totals. Every category is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategorySummary {
    totals: [Decimal; Category::COUNT],
}

impl CategorySummary {
    pub fn get(&self, category: Category) -> Decimal {
        self.totals[category.index()]
    }

    /// Categories in display order with their totals.
    pub fn iter(&self) -> impl Iterator<Item = (Category, Decimal)> + '_ {
        Category::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    pub fn total(&self) -> Decimal {
        saturating_sum(self.totals.iter().copied())
    }

    fn add(&mut self, category: Category, amount: Decimal) {
        let slot = &mut self.totals[category.index()];
        *slot = slot.saturating_add(amount);
    }
}

fn saturating_sum(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// True if `date` falls on the same calendar day as `now`, in `now`'s timezone.
pub fn is_on_day_of<Tz: TimeZone>(date: &DateTime<Utc>, now: &DateTime<Tz>) -> bool {
    date.with_timezone(&now.timezone()).date_naive() == now.date_naive()
}

/// Entries recorded today, preserving list order.
pub fn expenses_today<'a, Tz: TimeZone>(
    list: &'a [Expense],
    now: &'a DateTime<Tz>,
) -> impl Iterator<Item = &'a Expense> + 'a {
    list.iter().filter(move |e| is_on_day_of(&e.date, now))
}

pub fn total_spent_today<Tz: TimeZone>(list: &[Expense], now: &DateTime<Tz>) -> Decimal {
    saturating_sum(expenses_today(list, now).map(|e| e.amount))
}

pub fn category_summary_today<Tz: TimeZone>(
    list: &[Expense],
    now: &DateTime<Tz>,
) -> CategorySummary {
    let mut summary = CategorySummary::default();
    for e in expenses_today(list, now) {
        summary.add(e.category, e.amount);
    }
    summary
}

/// Everything the dashboard shows, computed in one pass over the list.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub day: NaiveDate,
    pub total: Decimal,
    pub by_category: CategorySummary,
    pub count_today: usize,
    /// All recorded expenses, not only today's.
    pub count_all: usize,
}

impl DailySummary {
    pub fn compute<Tz: TimeZone>(list: &[Expense], now: &DateTime<Tz>) -> Self {
        let by_category = category_summary_today(list, now);
        Self {
            day: now.date_naive(),
            total: by_category.total(),
            by_category,
            count_today: expenses_today(list, now).count(),
            count_all: list.len(),
        }
    }
}
