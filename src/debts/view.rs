//! In-memory table state: the fetched rows plus the visible, sorted,
//! filtered subset the user is looking at.

use std::cmp::Ordering;
use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::database::models::{Debt, DebtStatus};
use crate::debts::installments::installment_amount;
use crate::debts::strategy::{Allocation, Decision};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Description,
    Amount,
    Status,
    InstallmentAmount,
    Installments,
    CreatedAt,
}

impl SortColumn {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Description => "Desc",
            Self::Amount => "Amount",
            Self::Status => "Status",
            Self::InstallmentAmount => "Quota",
            Self::Installments => "Installments",
            Self::CreatedAt => "Created",
        }
    }

    fn compare(&self, a: &Debt, b: &Debt) -> Ordering {
        match self {
            Self::Description => a.description.cmp(&b.description),
            Self::Amount => a.amount.cmp(&b.amount),
            Self::Status => a.status.as_str().cmp(b.status.as_str()),
            Self::InstallmentAmount => a.installment_amount.cmp(&b.installment_amount),
            Self::Installments => a.installments.cmp(&b.installments),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn flip(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// How a row should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Strategy,
    Paid,
    Overdue,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub amount: Decimal,
    /// Sum of installment amounts over debts with more than one installment left.
    pub installment_amount: Decimal,
}

#[derive(Debug, Default, Clone)]
pub struct DebtTable {
    data: Vec<Debt>,
    rows: Vec<Debt>,
    next_direction: SortDirection,
    sorted_by: Option<(SortColumn, SortDirection)>,
    search: String,
    status_filter: Option<DebtStatus>,
    strategy_ids: HashSet<String>,
}

impl DebtTable {
    pub fn new(data: Vec<Debt>) -> Self {
        let mut table = Self::default();
        table.replace(data);
        table
    }

    /// Swaps in freshly fetched rows, dropping any strategy preview.
    /// Search, filter and sort carry over.
    pub fn replace(&mut self, data: Vec<Debt>) {
        self.data = data;
        self.strategy_ids.clear();
        self.recompute();
    }

    pub fn rows(&self) -> &[Debt] {
        &self.rows
    }

    pub fn data(&self) -> &[Debt] {
        &self.data
    }

    pub fn get(&self, index: usize) -> Option<&Debt> {
        self.rows.get(index)
    }

    pub fn sorted_by(&self) -> Option<(SortColumn, SortDirection)> {
        self.sorted_by
    }

    pub fn status_filter(&self) -> Option<DebtStatus> {
        self.status_filter
    }

    /// Sorts the visible rows by `column`. Every call flips the direction,
    /// starting with ascending.
    pub fn sort_by(&mut self, column: SortColumn) {
        let direction = self.next_direction;
        self.sorted_by = Some((column, direction));
        self.next_direction = direction.flip();
        self.apply_sort();
    }

    /// Case-insensitive match on the description.
    pub fn search(&mut self, text: &str) {
        self.search = text.to_string();
        self.recompute();
    }

    pub fn filter_status(&mut self, status: Option<DebtStatus>) {
        self.status_filter = status;
        self.recompute();
    }

    pub fn showing(&self) -> (usize, usize) {
        (self.rows.len(), self.data.len())
    }

    /// Footer sums. Saturate at `Decimal::MAX` rather than overflow.
    pub fn totals(&self) -> Totals {
        Totals {
            amount: self
                .rows
                .iter()
                .fold(Decimal::ZERO, |acc, d| acc.saturating_add(d.amount)),
            installment_amount: self
                .rows
                .iter()
                .filter(|d| d.installments > 1)
                .fold(Decimal::ZERO, |acc, d| acc.saturating_add(d.installment_amount)),
        }
    }

    /// Shows what the rows would look like after a strategy is carried out.
    pub fn apply_strategy(&mut self, allocations: &[Allocation]) {
        for allocation in allocations {
            if let Some(row) = self.rows.iter_mut().find(|d| d.id == allocation.debt_id) {
                apply_allocation(row, allocation);
                self.strategy_ids.insert(allocation.debt_id.clone());
            }
        }
    }

    pub fn clear_strategy(&mut self) {
        self.strategy_ids.clear();
        self.recompute();
    }

    pub fn has_strategy(&self) -> bool {
        !self.strategy_ids.is_empty()
    }

    pub fn highlight(&self, debt: &Debt) -> Highlight {
        if self.strategy_ids.contains(&debt.id) {
            return Highlight::Strategy;
        }
        match debt.status {
            DebtStatus::Paid => Highlight::Paid,
            DebtStatus::Overdue => Highlight::Overdue,
            DebtStatus::Pending => Highlight::Normal,
        }
    }

    fn recompute(&mut self) {
        let needle = self.search.to_lowercase();
        self.rows = self
            .data
            .iter()
            .filter(|d| needle.is_empty() || d.description.to_lowercase().contains(&needle))
            .filter(|d| self.status_filter.map_or(true, |s| d.status == s))
            .cloned()
            .collect();
        self.apply_sort();
    }

    fn apply_sort(&mut self) {
        if let Some((column, direction)) = self.sorted_by {
            self.rows.sort_by(|a, b| {
                let ord = column.compare(a, b);
                match direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }
    }
}

fn apply_allocation(row: &mut Debt, allocation: &Allocation) {
    match allocation.decision {
        Decision::PayInFull => {
            row.amount = Decimal::ZERO;
            row.installment_amount = Decimal::ZERO;
            row.status = DebtStatus::Paid;
        }
        Decision::PayPartial(paid) => {
            row.amount -= paid;
            row.installment_amount = installment_amount(row.amount, row.installments);
            row.status = DebtStatus::Pending;
        }
    }
}

/// Copy of `rows` with `allocations` applied.
pub fn preview_rows(rows: &[Debt], allocations: &[Allocation]) -> Vec<Debt> {
    let mut preview = rows.to_vec();
    for allocation in allocations {
        if let Some(row) = preview.iter_mut().find(|d| d.id == allocation.debt_id) {
            apply_allocation(row, allocation);
        }
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn debt(id: &str, description: &str, amount: &str, installments: i64, status: DebtStatus) -> Debt {
        let amount = dec(amount);
        Debt {
            id: id.to_string(),
            description: description.to_string(),
            amount,
            installments,
            installment_amount: installment_amount(amount, installments),
            status,
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn sample() -> DebtTable {
        DebtTable::new(vec![
            debt("1", "Car loan", "1200", 12, DebtStatus::Pending),
            debt("2", "Phone bill", "80", 1, DebtStatus::Overdue),
            debt("3", "Credit card", "500", 5, DebtStatus::Paid),
        ])
    }

    fn ids(table: &DebtTable) -> Vec<&str> {
        table.rows().iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn sort_toggles_direction() {
        let mut table = sample();
        table.sort_by(SortColumn::Amount);
        assert_eq!(ids(&table), ["2", "3", "1"]);
        table.sort_by(SortColumn::Amount);
        assert_eq!(ids(&table), ["1", "3", "2"]);
        assert_eq!(table.sorted_by(), Some((SortColumn::Amount, SortDirection::Desc)));
    }

    #[test]
    fn search_is_case_insensitive_over_all_rows() {
        let mut table = sample();
        table.search("CAR");
        assert_eq!(ids(&table), ["1"]);
        table.search("c");
        assert_eq!(ids(&table), ["1", "3"]);
        table.search("");
        assert_eq!(table.showing(), (3, 3));
    }

    #[test]
    fn status_filter() {
        let mut table = sample();
        table.filter_status(Some(DebtStatus::Overdue));
        assert_eq!(ids(&table), ["2"]);
        assert_eq!(table.showing(), (1, 3));
        table.filter_status(None);
        assert_eq!(table.showing(), (3, 3));
    }

    #[test]
    fn totals_skip_single_installment_quotas() {
        let table = sample();
        let totals = table.totals();
        assert_eq!(totals.amount, dec("1780"));
        // 100 + 100; the phone bill has a single installment
        assert_eq!(totals.installment_amount, dec("200"));
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let table = DebtTable::new(vec![
            debt("1", "Big one", "50000000000000000000000000000", 2, DebtStatus::Pending),
            debt("2", "Big two", "50000000000000000000000000000", 2, DebtStatus::Pending),
        ]);
        assert_eq!(table.totals().amount, Decimal::MAX);
    }

    #[test]
    fn strategy_preview_marks_rows() {
        let mut table = sample();
        let allocations = vec![
            Allocation {
                debt_id: "2".into(),
                decision: Decision::PayInFull,
                monthly_reduction: Decimal::ZERO,
                rationale: String::new(),
            },
            Allocation {
                debt_id: "1".into(),
                decision: Decision::PayPartial(dec("600")),
                monthly_reduction: Decimal::ZERO,
                rationale: String::new(),
            },
        ];
        table.apply_strategy(&allocations);

        let phone = table.rows().iter().find(|d| d.id == "2").unwrap();
        assert_eq!(phone.status, DebtStatus::Paid);
        assert_eq!(phone.amount, Decimal::ZERO);
        assert_eq!(table.highlight(phone), Highlight::Strategy);

        let car = table.rows().iter().find(|d| d.id == "1").unwrap();
        assert_eq!(car.amount, dec("600"));
        assert_eq!(car.installment_amount, dec("50"));

        // the fetched data is untouched
        assert_eq!(table.data()[0].amount, dec("1200"));

        table.clear_strategy();
        assert!(!table.has_strategy());
        let car = table.rows().iter().find(|d| d.id == "1").unwrap();
        assert_eq!(car.amount, dec("1200"));
    }

    #[test]
    fn highlight_follows_status() {
        let table = sample();
        assert_eq!(table.highlight(&table.data()[0]), Highlight::Normal);
        assert_eq!(table.highlight(&table.data()[1]), Highlight::Overdue);
        assert_eq!(table.highlight(&table.data()[2]), Highlight::Paid);
    }
}
