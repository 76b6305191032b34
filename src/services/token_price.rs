//! Token price lookup and exact amount-to-currency conversion.
//!
//! Amounts are smallest-unit integers, prices are decimals, and every step
//! (shift by `10^decimals`, multiply by the unit price, sum across tokens) is
//! carried out on scaled integers. Results are rounded half-up once, at the
//! sixth fractional digit.

use num_bigint::BigUint;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::{collections::HashMap, fmt, iter::Sum, ops::Add, str::FromStr, sync::Arc};

use crate::{
    constants::CURRENCY_VALUE_DECIMALS,
    error::{AppError, Result},
    models::{
        ApiPriceDataResponse, ApiTokenDataResponse, PriceRecord, Token, TokenAmount,
        TokenWithBalance,
    },
    utils::{address_key, div_round_half_up, is_decimal_literal, pow10, split_fixed_point},
};

/// Resolves a token address to its pricing id.
pub trait PricingIdLookup {
    fn pricing_id_for(&self, address: &str) -> Option<i64>;
}

/// Resolves a pricing id to the latest price record.
pub trait PriceRecordLookup {
    fn price_record_for(&self, pricing_id: i64) -> Option<&PriceRecord>;
}

impl PricingIdLookup for ApiTokenDataResponse {
    fn pricing_id_for(&self, address: &str) -> Option<i64> {
        let key = address_key(address);
        self.tokens
            .iter()
            .find(|info| address_key(&info.address) == key)
            .and_then(|info| info.pricing_id)
    }
}

impl PriceRecordLookup for ApiPriceDataResponse {
    fn price_record_for(&self, pricing_id: i64) -> Option<&PriceRecord> {
        self.prices
            .iter()
            .find(|record| record.pricing_id == pricing_id)
    }
}

/// Keys are expected to be normalized with [`address_key`].
impl PricingIdLookup for HashMap<String, i64> {
    fn pricing_id_for(&self, address: &str) -> Option<i64> {
        self.get(&address_key(address)).copied()
    }
}

impl PriceRecordLookup for HashMap<i64, PriceRecord> {
    fn price_record_for(&self, pricing_id: i64) -> Option<&PriceRecord> {
        self.get(&pricing_id)
    }
}

/// Address → pricing id, keyed by normalized address.
///
/// The first entry for an address wins, including one without a pricing id,
/// so the index answers exactly like a scan of the metadata list.
#[derive(Debug, Clone, Default)]
pub struct TokenPricingIndex(HashMap<String, Option<i64>>);

impl TokenPricingIndex {
    /// Number of addresses that resolve to a pricing id.
    pub fn priced_count(&self) -> usize {
        self.0.values().filter(|id| id.is_some()).count()
    }
}

impl From<&ApiTokenDataResponse> for TokenPricingIndex {
    fn from(response: &ApiTokenDataResponse) -> Self {
        let mut index = HashMap::with_capacity(response.tokens.len());
        for info in &response.tokens {
            index
                .entry(address_key(&info.address))
                .or_insert(info.pricing_id);
        }
        Self(index)
    }
}

impl PricingIdLookup for TokenPricingIndex {
    fn pricing_id_for(&self, address: &str) -> Option<i64> {
        self.0.get(&address_key(address)).copied().flatten()
    }
}

/// Pricing id → price record. The first record for an id wins.
#[derive(Debug, Clone, Default)]
pub struct PriceIndex(HashMap<i64, PriceRecord>);

impl PriceIndex {
    pub fn record_count(&self) -> usize {
        self.0.len()
    }
}

impl From<&ApiPriceDataResponse> for PriceIndex {
    fn from(response: &ApiPriceDataResponse) -> Self {
        let mut index = HashMap::with_capacity(response.prices.len());
        for record in &response.prices {
            index
                .entry(record.pricing_id)
                .or_insert_with(|| record.clone());
        }
        Self(index)
    }
}

impl PriceRecordLookup for PriceIndex {
    fn price_record_for(&self, pricing_id: i64) -> Option<&PriceRecord> {
        self.0.price_record_for(pricing_id)
    }
}

/// Immutable pair of price feed mappings taken at one point in time.
#[derive(Debug, Clone)]
pub struct PricingSnapshot {
    pub tokens: Arc<TokenPricingIndex>,
    pub prices: Arc<PriceIndex>,
}

impl PricingSnapshot {
    pub fn new(tokens: Arc<TokenPricingIndex>, prices: Arc<PriceIndex>) -> Self {
        Self { tokens, prices }
    }

    pub fn from_responses(tokens: &ApiTokenDataResponse, prices: &ApiPriceDataResponse) -> Self {
        Self::new(Arc::new(tokens.into()), Arc::new(prices.into()))
    }

    pub fn lookup(&self, token: &Token) -> Option<PriceRecord> {
        lookup_token_price_details(token, self.tokens.as_ref(), self.prices.as_ref())
    }
}

/// Exact currency amount with a fixed resolution of 10^-6.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CurrencyValue {
    micros: BigUint,
}

impl CurrencyValue {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_micros(micros: BigUint) -> Self {
        Self { micros }
    }

    pub fn micros(&self) -> &BigUint {
        &self.micros
    }

    pub fn is_zero(&self) -> bool {
        self.micros == BigUint::default()
    }

    /// Renders exactly six fractional digits, e.g. `"1.230000"`.
    pub fn to_fixed(&self) -> String {
        let (whole, fraction) = split_fixed_point(&self.micros, CURRENCY_VALUE_DECIMALS);
        format!("{}.{}", whole, fraction)
    }

    /// `None` when the value exceeds the range of [`Decimal`].
    pub fn to_decimal(&self) -> Option<Decimal> {
        Decimal::from_str(&self.to_fixed()).ok()
    }
}

/// Trailing fractional zeros are trimmed: `"1.23"`, `"3096.890862"`, `"0"`.
impl fmt::Display for CurrencyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (whole, fraction) = split_fixed_point(&self.micros, CURRENCY_VALUE_DECIMALS);
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            write!(f, "{}", whole)
        } else {
            write!(f, "{}.{}", whole, fraction)
        }
    }
}

impl Serialize for CurrencyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Add for CurrencyValue {
    type Output = CurrencyValue;

    fn add(self, rhs: CurrencyValue) -> CurrencyValue {
        CurrencyValue::from_micros(self.micros + rhs.micros)
    }
}

impl Sum for CurrencyValue {
    fn sum<I: Iterator<Item = CurrencyValue>>(iter: I) -> Self {
        iter.fold(CurrencyValue::zero(), Add::add)
    }
}

/// Parses a unit price given as a decimal string such as `"1032.296954"`.
pub fn parse_unit_currency_value(raw: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    if !is_decimal_literal(trimmed) {
        return Err(AppError::InvalidInput(format!("not a decimal price: {:?}", raw)));
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| AppError::InvalidInput(format!("not a decimal price: {:?}", raw)))
}

/// Converts a float price through its shortest round-trip representation,
/// so `1.23` becomes exactly `1.23`.
pub fn unit_currency_value_from_f64(value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(AppError::InvalidInput(format!("non-finite price: {}", value)));
    }
    parse_unit_currency_value(&value.to_string())
}

/// Finds the price record for a token.
///
/// Returns `None` when the address is not in the metadata mapping, the entry has
/// no pricing id, or the pricing id is not in the price mapping.
pub fn lookup_token_price_details<T, P>(
    token: &Token,
    token_data: &T,
    prices_data: &P,
) -> Option<PriceRecord>
where
    T: PricingIdLookup + ?Sized,
    P: PriceRecordLookup + ?Sized,
{
    let pricing_id = token_data.pricing_id_for(&token.address)?;
    prices_data.price_record_for(pricing_id).cloned()
}

/// Computes `(amount / 10^decimals) * unit_currency_value`, rounded half-up at
/// the sixth fractional digit.
///
/// # Errors
/// * `InvalidInput` for a negative unit price.
pub fn convert_token_amount_to_currency_value(
    amount: &TokenAmount,
    decimals: u32,
    unit_currency_value: Decimal,
) -> Result<CurrencyValue> {
    if unit_currency_value.is_sign_negative() && !unit_currency_value.is_zero() {
        return Err(AppError::InvalidInput(format!(
            "negative unit price: {}",
            unit_currency_value
        )));
    }

    let price_mantissa = BigUint::from(unit_currency_value.mantissa().unsigned_abs());
    let numerator = amount.as_biguint() * price_mantissa * pow10(CURRENCY_VALUE_DECIMALS);
    let denominator = pow10(decimals + unit_currency_value.scale());

    Ok(CurrencyValue::from_micros(div_round_half_up(
        &numerator,
        &denominator,
    )))
}

/// Sums the currency value of every balance. Tokens without a resolvable price
/// or without a balance contribute zero, and so does a token whose feed price
/// cannot be converted (a negative unit price).
pub fn sum_token_balances_to_currency_value<T, P>(
    tokens: &[TokenWithBalance],
    token_data: &T,
    prices_data: &P,
) -> CurrencyValue
where
    T: PricingIdLookup + ?Sized,
    P: PriceRecordLookup + ?Sized,
{
    let mut total = CurrencyValue::zero();

    for item in tokens {
        let Some(balance) = item.balance.as_ref() else {
            continue;
        };
        let Some(price) = lookup_token_price_details(&item.token, token_data, prices_data) else {
            tracing::debug!("No price available for {}", item.token.address);
            continue;
        };
        match convert_token_amount_to_currency_value(balance, item.token.decimals, price.ccy_value)
        {
            Ok(value) => total = total + value,
            Err(e) => tracing::warn!("Skipping {} in total: {}", item.token.address, e),
        }
    }

    total
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::TokenInfo;

    pub(crate) const ETH: &str =
        "0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7";
    pub(crate) const DAI: &str =
        "0x03e85bfbb8e2a42b7bead9e88e9a1b19dbccf661471061807292120462396ec9";
    pub(crate) const UNPRICED: &str = "0x0123";

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).unwrap()
    }

    fn amount(raw: &str) -> TokenAmount {
        raw.parse().unwrap()
    }

    pub(crate) fn token(address: &str, symbol: &str, decimals: u32) -> Token {
        Token {
            address: address.to_string(),
            network_id: "goerli-alpha".to_string(),
            name: symbol.to_string(),
            symbol: symbol.to_string(),
            decimals,
            image: None,
            show_always: false,
        }
    }

    pub(crate) fn mock_prices() -> ApiPriceDataResponse {
        ApiPriceDataResponse {
            prices: vec![
                PriceRecord {
                    pricing_id: 1,
                    ccy_value: dec("1032.296954"),
                    ccy_day_change: dec("-0.008568"),
                    eth_value: dec("1"),
                    eth_day_change: dec("0"),
                },
                PriceRecord {
                    pricing_id: 2,
                    ccy_value: dec("1.001132"),
                    ccy_day_change: dec("0.0002"),
                    eth_value: dec("0.000969"),
                    eth_day_change: dec("0.0088"),
                },
            ],
        }
    }

    pub(crate) fn mock_token_data() -> ApiTokenDataResponse {
        let info = |address: &str, pricing_id: Option<i64>| TokenInfo {
            address: address.to_string(),
            pricing_id,
            name: None,
            symbol: None,
            decimals: Some(18),
            icon_url: None,
        };
        ApiTokenDataResponse {
            tokens: vec![
                info(ETH, Some(1)),
                info(DAI, Some(2)),
                info("0x0456", None),
                info("0x0789", Some(99)),
            ],
        }
    }

    #[test]
    fn convert_token_amount_to_currency_value_is_exact() {
        let cases = [
            ("1000000000000000000", 18, "1032.296954", "1032.296954"),
            ("20000000000000", 13, "1032.296954", "2064.593908"),
            // 1032.296954 * 3 in binary floating point is 3096.8908619999997
            ("30000000000", 10, "1032.296954", "3096.890862"),
        ];
        for (raw, decimals, price, expected) in cases {
            let value =
                convert_token_amount_to_currency_value(&amount(raw), decimals, dec(price)).unwrap();
            assert_eq!(value.to_fixed(), expected);
        }
    }

    #[test]
    fn convert_accepts_float_prices_and_trims_display() {
        let price = unit_currency_value_from_f64(1.23).unwrap();
        let value =
            convert_token_amount_to_currency_value(&amount("1000000000000000000"), 18, price)
                .unwrap();
        assert_eq!(value.to_string(), "1.23");
        assert_eq!(value.to_fixed(), "1.230000");
    }

    #[test]
    fn convert_with_zero_decimals_does_not_shift() {
        let value = convert_token_amount_to_currency_value(&amount("7"), 0, dec("2.5")).unwrap();
        assert_eq!(value.to_fixed(), "17.500000");
    }

    #[test]
    fn convert_rounds_half_up_at_sixth_digit() {
        // 0.0000005 exactly, then just below it
        let up = convert_token_amount_to_currency_value(&amount("5"), 7, dec("1")).unwrap();
        assert_eq!(up.to_fixed(), "0.000001");
        let down = convert_token_amount_to_currency_value(&amount("4999"), 10, dec("1")).unwrap();
        assert_eq!(down.to_fixed(), "0.000000");
    }

    #[test]
    fn convert_handles_amounts_beyond_u128() {
        // 2^256 - 1 wei at 1.5 per token
        let max = amount("115792089237316195423570985008687907853269984665640564039457584007913129639935");
        let value = convert_token_amount_to_currency_value(&max, 18, dec("1.5")).unwrap();
        assert_eq!(
            value.to_fixed(),
            "173688133855974293135356477513031861779904976998460846059186.376012"
        );
        assert!(value.to_decimal().is_none());
    }

    #[test]
    fn convert_rejects_negative_price() {
        let result = convert_token_amount_to_currency_value(&amount("1"), 0, dec("-1"));
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn parse_unit_currency_value_rejects_garbage() {
        assert!(parse_unit_currency_value("foo").is_err());
        assert!(parse_unit_currency_value("1_000").is_err());
        assert_eq!(parse_unit_currency_value(" 1e-3 ").unwrap(), dec("0.001"));
        assert!(unit_currency_value_from_f64(f64::NAN).is_err());
    }

    #[test]
    fn lookup_token_price_details_finds_record() {
        let price = lookup_token_price_details(
            &token(ETH, "ETH", 18),
            &mock_token_data(),
            &mock_prices(),
        )
        .unwrap();
        assert_eq!(price.pricing_id, 1);
        assert_eq!(price.ccy_value, dec("1032.296954"));
        assert_eq!(price.ccy_day_change, dec("-0.008568"));
        assert_eq!(price.eth_value, dec("1"));
        assert_eq!(price.eth_day_change, dec("0"));
    }

    #[test]
    fn lookup_normalizes_address_format() {
        let short = "0x49D36570D4E46F48E99674BD3FCC84644DDD6B96F7C741B1562B82F9E004DC7";
        let snapshot = PricingSnapshot::from_responses(&mock_token_data(), &mock_prices());
        assert!(snapshot.lookup(&token(short, "ETH", 18)).is_some());
    }

    #[test]
    fn lookup_misses_are_unavailable() {
        let tokens = mock_token_data();
        let prices = mock_prices();
        // not listed, listed without pricing id, pricing id without a price
        for address in [UNPRICED, "0x0456", "0x0789"] {
            assert!(lookup_token_price_details(&token(address, "X", 18), &tokens, &prices).is_none());
        }
    }

    #[test]
    fn keyed_maps_and_lists_agree() {
        let tokens = mock_token_data();
        let prices = mock_prices();
        let snapshot = PricingSnapshot::from_responses(&tokens, &prices);
        let dai = token(DAI, "DAI", 18);
        assert_eq!(
            lookup_token_price_details(&dai, &tokens, &prices),
            snapshot.lookup(&dai)
        );
        assert_eq!(snapshot.tokens.priced_count(), 3);
        assert_eq!(snapshot.prices.record_count(), 2);
    }

    #[test]
    fn duplicate_metadata_entries_resolve_like_the_list() {
        let info = |address: &str, pricing_id: Option<i64>| TokenInfo {
            address: address.to_string(),
            pricing_id,
            name: None,
            symbol: None,
            decimals: Some(18),
            icon_url: None,
        };
        let unpadded_eth = "0x49d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7";
        let tokens = ApiTokenDataResponse {
            tokens: vec![
                info(ETH, Some(1)),
                info(unpadded_eth, Some(2)),
                info(DAI, None),
                info(DAI, Some(1)),
                info("0x1", Some(2)),
                info("0x0001", Some(1)),
            ],
        };
        let mut prices = mock_prices();
        let mut shadow = prices.prices[1].clone();
        shadow.pricing_id = 1;
        prices.prices.push(shadow);

        let snapshot = PricingSnapshot::from_responses(&tokens, &prices);
        for (address, expected) in [(ETH, Some(1)), (DAI, None), ("0x0001", Some(2))] {
            let wanted = token(address, "X", 18);
            let from_list = lookup_token_price_details(&wanted, &tokens, &prices);
            assert_eq!(from_list, snapshot.lookup(&wanted), "address {}", address);
            assert_eq!(from_list.map(|p| p.pricing_id), expected, "address {}", address);
        }
        // the first record for id 1 wins in both paths
        let eth = snapshot.lookup(&token(unpadded_eth, "ETH", 18)).unwrap();
        assert_eq!(eth.ccy_value, dec("1032.296954"));
        assert_eq!(snapshot.tokens.priced_count(), 2);
        assert_eq!(snapshot.prices.record_count(), 2);
    }

    #[test]
    fn end_to_end_lookup_then_convert() {
        let eth = token(ETH, "ETH", 18);
        let price = lookup_token_price_details(&eth, &mock_token_data(), &mock_prices()).unwrap();
        let value = convert_token_amount_to_currency_value(
            &amount("1000000000000000000"),
            eth.decimals,
            price.ccy_value,
        )
        .unwrap();
        assert_eq!(value.to_string(), "1032.296954");
    }

    #[test]
    fn sum_token_balances_to_currency_value_skips_unpriced() {
        let balances = vec![
            TokenWithBalance::new(token(ETH, "ETH", 18), 1_000_000_000_000_000_000u64),
            TokenWithBalance::new(token(DAI, "DAI", 18), 2_000_000_000_000_000_000u64),
            TokenWithBalance::new(token(UNPRICED, "XYZ", 18), 5_000_000_000_000_000_000u64),
            TokenWithBalance {
                token: token(ETH, "ETH", 18),
                balance: None,
            },
        ];
        let total =
            sum_token_balances_to_currency_value(&balances, &mock_token_data(), &mock_prices());
        // 1032.296954 + 2 * 1.001132
        assert_eq!(total.to_fixed(), "1034.299218");
    }

    #[test]
    fn sum_skips_tokens_with_negative_feed_price() {
        let mut prices = mock_prices();
        prices.prices[1].ccy_value = dec("-0.01");
        let balances = vec![
            TokenWithBalance::new(token(ETH, "ETH", 18), 1_000_000_000_000_000_000u64),
            TokenWithBalance::new(token(DAI, "DAI", 18), 2_000_000_000_000_000_000u64),
        ];
        let snapshot = PricingSnapshot::from_responses(&mock_token_data(), &prices);
        let total = sum_token_balances_to_currency_value(
            &balances,
            snapshot.tokens.as_ref(),
            snapshot.prices.as_ref(),
        );
        assert_eq!(total.to_fixed(), "1032.296954");
    }

    #[test]
    fn sum_is_order_independent() {
        let mut balances = vec![
            TokenWithBalance::new(token(ETH, "ETH", 18), 123_456_789_012_345_678u64),
            TokenWithBalance::new(token(DAI, "DAI", 18), 987_654_321_098_765_432u64),
            TokenWithBalance::new(token(ETH, "ETH", 18), 3u64),
        ];
        let snapshot = PricingSnapshot::from_responses(&mock_token_data(), &mock_prices());
        let forward = sum_token_balances_to_currency_value(
            &balances,
            snapshot.tokens.as_ref(),
            snapshot.prices.as_ref(),
        );
        balances.reverse();
        let backward = sum_token_balances_to_currency_value(
            &balances,
            snapshot.tokens.as_ref(),
            snapshot.prices.as_ref(),
        );
        assert_eq!(forward, backward);
    }

    #[test]
    fn sum_of_empty_list_is_zero() {
        let total =
            sum_token_balances_to_currency_value(&[], &mock_token_data(), &mock_prices());
        assert!(total.is_zero());
        assert_eq!(total.to_string(), "0");
        assert_eq!(total.to_fixed(), "0.000000");
    }

    #[test]
    fn currency_value_sum_and_decimal_conversion() {
        let values = vec![
            CurrencyValue::from_micros(BigUint::from(1_500_000u32)),
            CurrencyValue::from_micros(BigUint::from(250_000u32)),
        ];
        let total: CurrencyValue = values.into_iter().sum();
        assert_eq!(total.to_string(), "1.75");
        assert_eq!(total.to_decimal(), Some(dec("1.750000")));
        assert_eq!(serde_json::to_string(&total).unwrap(), "\"1.75\"");
    }
}
