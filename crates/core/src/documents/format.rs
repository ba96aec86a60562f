//! pt-BR display formatting shared by every document channel.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::cpq::pricing::{round_money, MONEY_SCALE};
use crate::intake::{complete_postal_code, normalize_postal_code};

/// `R$ 1.234,56`: dot thousands, comma decimals, always two places.
pub fn format_brl(value: Decimal) -> String {
    let mut rounded = round_money(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    rounded.set_sign_positive(true);
    rounded.rescale(MONEY_SCALE);

    let plain = rounded.to_string();
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    let sign = if negative { "-" } else { "" };
    format!("R$ {sign}{},{fraction}", group_thousands(integer))
}

/// `dd/mm/yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `01310-100` for complete codes; anything else is shown as typed.
pub fn format_postal_code(raw: &str) -> String {
    match complete_postal_code(raw) {
        Some(digits) => format!("{}-{}", &digits[..5], &digits[5..]),
        None if normalize_postal_code(raw).is_empty() => raw.trim().to_string(),
        None => normalize_postal_code(raw),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    grouped
}
