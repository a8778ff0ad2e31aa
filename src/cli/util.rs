use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::debts::installments::round_money;

pub const CURRENCY_SYMBOL: &str = "€";

/// `€ 1200.00`
pub fn fmt_money(d: &Decimal) -> String {
    format!("{} {:.2}", CURRENCY_SYMBOL, round_money(*d))
}

pub fn fmt_integer(n: i64) -> String {
    n.to_string()
}

/// `dd/mm/yyyy`
pub fn fmt_date(ts: &NaiveDateTime) -> String {
    ts.format("%d/%m/%Y").to_string()
}

/// Short form of an id for narrow columns.
pub fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map(|(i, _)| &id[..i]).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn money_always_has_two_decimals() {
        assert_eq!(fmt_money(&Decimal::from(12)), "€ 12.00");
        assert_eq!(fmt_money(&Decimal::from_str_exact("3.456").unwrap()), "€ 3.46");
    }

    #[test]
    fn dates_are_day_first() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(10, 0, 0).unwrap();
        assert_eq!(fmt_date(&ts), "09/03/2024");
    }

    #[test]
    fn short_id_truncates() {
        assert_eq!(short_id("0123456789"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }
}
