use rust_decimal::{prelude::ToPrimitive as _, Decimal, RoundingStrategy};

use crate::consts::CURRENCY_SCALE;

/// Rounds to the cent, half away from zero
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts an amount to hundredths (cents, or hundredths of an hour), rounding half-up first.
///
/// Returns `None` if the value does not fit in an `i64`.
pub fn to_hundredths(value: Decimal) -> Option<i64> {
    round_currency(value).checked_mul(Decimal::ONE_HUNDRED)?.to_i64()
}

pub fn from_hundredths(value: i64) -> Decimal {
    Decimal::new(value, CURRENCY_SCALE)
}

/// Formats an amount the way French payslips print it: `3 033,40`
pub fn format_amount_fr(value: Decimal) -> String {
    let rounded = round_currency(value);
    let mut magnitude = rounded.abs();
    magnitude.rescale(CURRENCY_SCALE);
    let digits = magnitude.to_string();
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };

    format!("{sign}{grouped},{frac_part}")
}

/// Inverse of [`format_amount_fr`]
pub fn parse_amount_fr(value: &str) -> Option<Decimal> {
    let normalized = value
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect::<String>();

    normalized.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    use rust_decimal_macros::dec;

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(dec!(734.0828)), dec!(734.08));
        assert_eq!(round_currency(dec!(0.005)), dec!(0.01));
        assert_eq!(round_currency(dec!(2.675)), dec!(2.68));
        assert_eq!(round_currency(dec!(-0.005)), dec!(-0.01));
    }

    #[test]
    fn test_hundredths() {
        assert_eq!(to_hundredths(dec!(151.67)), Some(15167));
        assert_eq!(to_hundredths(dec!(3033.4000)), Some(303340));
        assert_eq!(to_hundredths(dec!(10.125)), Some(1013));
        assert_eq!(from_hundredths(303340), dec!(3033.40));
        assert_eq!(to_hundredths(Decimal::MAX), None);
    }

    #[test]
    fn test_format_amount_fr() {
        assert_eq!(format_amount_fr(dec!(3033.4)), "3 033,40");
        assert_eq!(format_amount_fr(dec!(2299.3172)), "2 299,32");
        assert_eq!(format_amount_fr(dec!(999.999)), "1 000,00");
        assert_eq!(format_amount_fr(dec!(1234567.8)), "1 234 567,80");
        assert_eq!(format_amount_fr(dec!(12)), "12,00");
        assert_eq!(format_amount_fr(Decimal::ZERO), "0,00");
        assert_eq!(format_amount_fr(dec!(-667.35)), "-667,35");
    }

    #[test]
    fn test_format_parse_round_trip() {
        for value in [dec!(0), dec!(0.01), dec!(3033.4), dec!(2299.3172), dec!(1234567.891), dec!(-42.5)] {
            assert_eq!(parse_amount_fr(&format_amount_fr(value)), Some(round_currency(value)));
        }
    }
}
