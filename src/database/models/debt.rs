use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DebtStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

impl DebtStatus {
    pub const ALL: [DebtStatus; 3] = [DebtStatus::Pending, DebtStatus::Paid, DebtStatus::Overdue];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Overdue => "OVERDUE",
        }
    }
}

impl fmt::Display for DebtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown debt status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

// Accepts any casing; the table itself always stores upper case.
impl FromStr for DebtStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("pending") {
            Ok(DebtStatus::Pending)
        } else if s.eq_ignore_ascii_case("paid") {
            Ok(DebtStatus::Paid)
        } else if s.eq_ignore_ascii_case("overdue") {
            Ok(DebtStatus::Overdue)
        } else {
            Err(UnknownStatus(s.to_string()))
        }
    }
}

/// One row of the `debts` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    pub installments: i64,
    pub installment_amount: Decimal,
    pub status: DebtStatus,
    pub created_at: NaiveDateTime,
}

/// Insert payload. `id` is chosen by the caller, `created_at` by the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDebt {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    pub installments: i64,
    pub status: DebtStatus,
}

/// Fields an edit may change. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtPatch {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub installments: Option<i64>,
    pub status: Option<DebtStatus>,
}

impl DebtPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.installments.is_none()
            && self.status.is_none()
    }
}

/// Filter for listing debts. An empty filter returns every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebtQuery {
    pub statuses: Option<Vec<DebtStatus>>,
    pub amount_min: Option<Decimal>,
    pub amount_max: Option<Decimal>,
}

impl DebtQuery {
    pub fn outstanding() -> Self {
        Self {
            statuses: Some(vec![DebtStatus::Pending, DebtStatus::Overdue]),
            ..Default::default()
        }
    }
}
