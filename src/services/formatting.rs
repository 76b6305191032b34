// Display formatting for currency values and token amounts.

use num_bigint::BigUint;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use std::str::FromStr;

use crate::{
    constants::{
        CURRENCY_DISPLAY_DECIMALS, CURRENCY_MAX_DISPLAY_DECIMALS, CURRENCY_SIGNIFICANT_DIGITS,
        CURRENCY_VALUE_DECIMALS, TOKEN_AMOUNT_DISPLAY_DECIMALS,
    },
    models::{token::deserialize_optional_decimals, TokenAmount},
    services::token_price::CurrencyValue,
    utils::{div_round_half_up, group_thousands, is_decimal_literal, pow10, split_fixed_point},
};

/// Anything that may carry a currency amount. `None` means the value is
/// missing or not numeric.
pub trait CurrencyInput {
    fn to_currency_decimal(&self) -> Option<Decimal>;

    fn prettify_currency(&self, symbol: &str) -> Option<String> {
        self.to_currency_decimal()
            .map(|decimal| prettify_currency_decimal(decimal, symbol))
    }
}

impl CurrencyInput for str {
    fn to_currency_decimal(&self) -> Option<Decimal> {
        let trimmed = self.trim();
        if !is_decimal_literal(trimmed) {
            return None;
        }
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .ok()
    }
}

impl CurrencyInput for String {
    fn to_currency_decimal(&self) -> Option<Decimal> {
        self.as_str().to_currency_decimal()
    }
}

impl CurrencyInput for f64 {
    fn to_currency_decimal(&self) -> Option<Decimal> {
        if !self.is_finite() {
            return None;
        }
        self.to_string().to_currency_decimal()
    }
}

impl CurrencyInput for i64 {
    fn to_currency_decimal(&self) -> Option<Decimal> {
        Some(Decimal::from(*self))
    }
}

impl CurrencyInput for u64 {
    fn to_currency_decimal(&self) -> Option<Decimal> {
        Some(Decimal::from(*self))
    }
}

impl CurrencyInput for Decimal {
    fn to_currency_decimal(&self) -> Option<Decimal> {
        Some(*self)
    }
}

impl CurrencyInput for CurrencyValue {
    fn to_currency_decimal(&self) -> Option<Decimal> {
        self.to_decimal()
    }

    // Exact at any size; the Decimal range only matters below one cent.
    fn prettify_currency(&self, symbol: &str) -> Option<String> {
        let cents = div_round_half_up(
            self.micros(),
            &pow10(CURRENCY_VALUE_DECIMALS - CURRENCY_DISPLAY_DECIMALS),
        );
        if cents == BigUint::default() && !self.is_zero() {
            return self
                .to_decimal()
                .map(|decimal| prettify_currency_decimal(decimal, symbol));
        }

        let (whole, fraction) = split_fixed_point(&cents, CURRENCY_DISPLAY_DECIMALS);
        Some(format!(
            "{}{}.{}",
            symbol,
            group_thousands(&whole.to_str_radix(10)),
            fraction
        ))
    }
}

impl<T: CurrencyInput + ?Sized> CurrencyInput for &T {
    fn to_currency_decimal(&self) -> Option<Decimal> {
        (**self).to_currency_decimal()
    }

    fn prettify_currency(&self, symbol: &str) -> Option<String> {
        (**self).prettify_currency(symbol)
    }
}

impl<T: CurrencyInput> CurrencyInput for Option<T> {
    fn to_currency_decimal(&self) -> Option<Decimal> {
        self.as_ref().and_then(CurrencyInput::to_currency_decimal)
    }

    fn prettify_currency(&self, symbol: &str) -> Option<String> {
        self.as_ref().and_then(|value| value.prettify_currency(symbol))
    }
}

/// Formats a currency value for display, e.g. `$123,456.12`.
///
/// Values that round to zero at two decimals but are not zero keep two
/// significant digits (`0.000885` → `$0.00089`), up to 18 fractional digits.
/// Anything smaller renders as `<$0.000000000000000001`.
///
/// Returns `None` when the input is missing or not numeric.
pub fn prettify_currency_value<V: CurrencyInput + ?Sized>(value: &V, symbol: &str) -> Option<String> {
    value.prettify_currency(symbol)
}

pub fn prettify_currency_decimal(value: Decimal, symbol: &str) -> String {
    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };
    let magnitude = value.abs();

    let mut standard = magnitude.round_dp_with_strategy(
        CURRENCY_DISPLAY_DECIMALS,
        RoundingStrategy::MidpointAwayFromZero,
    );
    if !standard.is_zero() || magnitude.is_zero() {
        standard.rescale(CURRENCY_DISPLAY_DECIMALS);
        return format!("{}{}{}", sign, symbol, group_decimal_string(&standard.to_string()));
    }

    let decimals = (leading_fraction_zeros(magnitude) + CURRENCY_SIGNIFICANT_DIGITS)
        .min(CURRENCY_MAX_DISPLAY_DECIMALS);
    let rounded = magnitude
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    if rounded.is_zero() {
        let smallest = format!("0.{}1", "0".repeat(CURRENCY_MAX_DISPLAY_DECIMALS as usize - 1));
        return format!("{}<{}{}", sign, symbol, smallest);
    }

    format!("{}{}{}", sign, symbol, rounded)
}

// Zeros between the decimal point and the first significant digit of a value below one.
fn leading_fraction_zeros(value: Decimal) -> u32 {
    let digits = value.mantissa().unsigned_abs().to_string().len() as u32;
    value.scale().saturating_sub(digits)
}

fn group_decimal_string(plain: &str) -> String {
    match plain.split_once('.') {
        Some((whole, fraction)) => format!("{}.{}", group_thousands(whole), fraction),
        None => group_thousands(plain),
    }
}

/// Loosely typed token amount, as received from clients. Any missing field
/// makes the amount unavailable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenAmountParams {
    #[serde(default)]
    pub amount: Option<TokenAmount>,
    #[serde(default, deserialize_with = "deserialize_optional_decimals")]
    pub decimals: Option<u32>,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Formats a token amount, e.g. `123,456,789.0123 ETH`, or `None` when
/// `amount` or `decimals` is missing.
pub fn prettify_token_amount(params: &TokenAmountParams) -> Option<String> {
    let amount = params.amount.as_ref()?;
    let decimals = params.decimals?;
    Some(format_token_amount(amount, decimals, params.symbol.as_deref()))
}

/// Shows the whole part grouped and at most four fractional digits, rounded
/// half-up, keeping at least one fractional digit.
pub fn format_token_amount(amount: &TokenAmount, decimals: u32, symbol: Option<&str>) -> String {
    let raw = amount.as_biguint();
    let scaled = if decimals <= TOKEN_AMOUNT_DISPLAY_DECIMALS {
        raw * pow10(TOKEN_AMOUNT_DISPLAY_DECIMALS - decimals)
    } else {
        div_round_half_up(raw, &pow10(decimals - TOKEN_AMOUNT_DISPLAY_DECIMALS))
    };

    let (whole, fraction) = split_fixed_point(&scaled, TOKEN_AMOUNT_DISPLAY_DECIMALS);
    let trimmed = fraction.trim_end_matches('0');
    let fraction = if trimmed.is_empty() { "0" } else { trimmed };
    let pretty = format!("{}.{}", group_thousands(&whole.to_str_radix(10)), fraction);

    match symbol.map(str::trim).filter(|s| !s.is_empty()) {
        Some(symbol) => format!("{} {}", pretty, symbol),
        None => pretty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pretty(raw: &str) -> Option<String> {
        prettify_currency_value(raw, "$")
    }

    fn params(amount: &str, decimals: u32, symbol: Option<&str>) -> TokenAmountParams {
        TokenAmountParams {
            amount: Some(amount.parse().unwrap()),
            decimals: Some(decimals),
            symbol: symbol.map(str::to_string),
        }
    }

    #[test]
    fn prettify_currency_value_standard_precision() {
        assert_eq!(prettify_currency_value(&0u64, "$").as_deref(), Some("$0.00"));
        assert_eq!(pretty("0").as_deref(), Some("$0.00"));
        assert_eq!(pretty("1.23456").as_deref(), Some("$1.23"));
        assert_eq!(pretty("123456.12").as_deref(), Some("$123,456.12"));
        assert_eq!(pretty("123456.123456").as_deref(), Some("$123,456.12"));
        assert_eq!(pretty("0.12").as_deref(), Some("$0.12"));
        assert_eq!(pretty("0.123456").as_deref(), Some("$0.12"));
    }

    #[test]
    fn prettify_currency_value_rounds_half_up() {
        assert_eq!(pretty("1.504").as_deref(), Some("$1.50"));
        assert_eq!(pretty("1.505").as_deref(), Some("$1.51"));
        assert_eq!(pretty("0.005").as_deref(), Some("$0.01"));
    }

    #[test]
    fn prettify_currency_value_adaptive_precision() {
        let cases = [
            ("0.0123456", "$0.012"),
            ("0.00123456", "$0.0012"),
            ("0.000123456", "$0.00012"),
            ("0.00000123", "$0.0000012"),
            ("0.0008923088", "$0.00089"),
            ("0.000885", "$0.00089"),
            ("0.0000001", "$0.0000001"),
        ];
        for (input, expected) in cases {
            assert_eq!(pretty(input).as_deref(), Some(expected), "input {}", input);
        }
    }

    #[test]
    fn prettify_currency_value_floors_at_max_precision() {
        assert_eq!(
            pretty("0.0000000000000000000001").as_deref(),
            Some("<$0.000000000000000001")
        );
        assert_eq!(
            pretty("0.0000000000000000123").as_deref(),
            Some("$0.000000000000000012")
        );
    }

    #[test]
    fn prettify_currency_value_accepts_numbers_and_values() {
        assert_eq!(prettify_currency_value(&1.505f64, "$").as_deref(), Some("$1.51"));
        assert_eq!(prettify_currency_value(&-1.5f64, "$").as_deref(), Some("-$1.50"));
        let value = CurrencyValue::from_micros(1_234_567_890u64.into());
        assert_eq!(prettify_currency_value(&value, "€").as_deref(), Some("€1,234.57"));
        assert_eq!(pretty("1e3").as_deref(), Some("$1,000.00"));
    }

    #[test]
    fn prettify_currency_value_from_micros_beyond_decimal_range() {
        let huge: BigUint = "173688133855974293135356477513031861779904976998460846059186376012"
            .parse()
            .unwrap();
        let value = CurrencyValue::from_micros(huge);
        assert!(value.to_decimal().is_none());
        assert_eq!(
            prettify_currency_value(&value, "$").as_deref(),
            Some("$173,688,133,855,974,293,135,356,477,513,031,861,779,904,976,998,460,846,059,186.38")
        );

        // 23 integer digits: rounded once, at the cent
        let wide: BigUint = "12345678901234567890123454999".parse().unwrap();
        assert_eq!(
            prettify_currency_value(&CurrencyValue::from_micros(wide), "$").as_deref(),
            Some("$12,345,678,901,234,567,890,123.45")
        );
    }

    #[test]
    fn prettify_currency_value_from_micros_below_a_cent() {
        let pretty_micros = |micros: u64| {
            prettify_currency_value(&CurrencyValue::from_micros(micros.into()), "$")
        };
        assert_eq!(pretty_micros(0).as_deref(), Some("$0.00"));
        assert_eq!(pretty_micros(5_000).as_deref(), Some("$0.01"));
        assert_eq!(pretty_micros(885).as_deref(), Some("$0.00089"));
        assert_eq!(pretty_micros(1).as_deref(), Some("$0.000001"));
        assert_eq!(
            prettify_currency_value(&Some(CurrencyValue::from_micros(4_999u64.into())), "$").as_deref(),
            Some("$0.005")
        );
    }

    #[test]
    fn prettify_currency_value_invalid_is_none() {
        assert!(prettify_currency_value(&None::<f64>, "$").is_none());
        assert!(pretty("foo").is_none());
        assert!(pretty("").is_none());
        assert!(pretty("1_000").is_none());
        assert!(pretty("0x10").is_none());
        assert!(prettify_currency_value(&f64::NAN, "$").is_none());
    }

    #[test]
    fn prettify_token_amount_formats_amounts() {
        let cases = [
            ("0", Some("ETH"), "0.0 ETH"),
            ("1000000000000000000", Some("ETH"), "1.0 ETH"),
            ("123456789000000000000000000", Some("ETH"), "123,456,789.0 ETH"),
            ("123456789012345690000000000", Some("ETH"), "123,456,789.0123 ETH"),
            ("12345678901234569000", Some("ETH"), "12.3457 ETH"),
            ("12345678901234569", Some("ETH"), "0.0123 ETH"),
            ("123456789000000000000000000", None, "123,456,789.0"),
        ];
        for (amount, symbol, expected) in cases {
            assert_eq!(
                prettify_token_amount(&params(amount, 18, symbol)).as_deref(),
                Some(expected)
            );
        }
    }

    #[test]
    fn format_token_amount_with_few_decimals() {
        assert_eq!(format_token_amount(&"1234".parse().unwrap(), 0, Some("X")), "1,234.0 X");
        assert_eq!(format_token_amount(&"12345".parse().unwrap(), 2, None), "123.45");
        // 0.99996 rounds up into the whole part
        assert_eq!(format_token_amount(&"99996".parse().unwrap(), 5, None), "1.0");
    }

    #[test]
    fn prettify_token_amount_missing_fields_is_none() {
        assert!(prettify_token_amount(&TokenAmountParams::default()).is_none());
        let parsed: TokenAmountParams = serde_json::from_str(r#"{"amount":"1"}"#).unwrap();
        assert!(prettify_token_amount(&parsed).is_none());
        let parsed: TokenAmountParams =
            serde_json::from_str(r#"{"amount":"0x0de0b6b3a7640000","decimals":"18","symbol":"ETH"}"#)
                .unwrap();
        assert_eq!(prettify_token_amount(&parsed).as_deref(), Some("1.0 ETH"));
    }
}
