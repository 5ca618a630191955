use rust_decimal::Decimal;

/// Format an amount with a currency code and thousands separators: KES 1,234.56
pub fn money(val: Decimal, currency: &str) -> String {
    let negative = val.is_sign_negative() && !val.is_zero();
    let cents = format!("{:.2}", val.abs().round_dp(2));
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-{currency} {with_commas}.{dec_part}")
    } else {
        format!("{currency} {with_commas}.{dec_part}")
    }
}

/// Fraction (0.0-1.0) as a whole-number percentage
pub fn percent(fraction: Decimal) -> String {
    format!("{}%", fraction.saturating_mul(Decimal::ONE_HUNDRED).round_dp(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(dec("1234.56"), "KES"), "KES 1,234.56");
        assert_eq!(money(dec("-500"), "KES"), "-KES 500.00");
        assert_eq!(money(Decimal::ZERO, "KES"), "KES 0.00");
        assert_eq!(money(dec("1000000.999"), "KES"), "KES 1,000,001.00");
        assert_eq!(money(dec("42.1"), "TZS"), "TZS 42.10");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(dec("0.726")), "73%");
        assert_eq!(percent(Decimal::ONE), "100%");
        assert_eq!(percent(Decimal::MAX), format!("{}%", Decimal::MAX));
    }
}
