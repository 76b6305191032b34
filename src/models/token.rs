use num_bigint::BigUint;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

use crate::{
    constants::MAX_TOKEN_DECIMALS,
    error::{AppError, Result},
};

/// Smallest-unit token quantity of arbitrary size.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(BigUint);

impl TokenAmount {
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::default()
    }

    /// Coerces a wrapped integer into a decimals exponent.
    pub fn to_decimals(&self) -> Result<u32> {
        u32::try_from(&self.0)
            .ok()
            .filter(|decimals| *decimals <= MAX_TOKEN_DECIMALS)
            .ok_or_else(|| AppError::InvalidInput(format!("decimals out of range: {}", self)))
    }
}

impl FromStr for TokenAmount {
    type Err = AppError;

    /// Accepts base-10 digits or a `0x`-prefixed hex felt.
    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let parsed = if let Some(hex) = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                None
            } else {
                BigUint::parse_bytes(hex.as_bytes(), 16)
            }
        } else if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            BigUint::parse_bytes(trimmed.as_bytes(), 10)
        } else {
            None
        };

        parsed
            .map(Self)
            .ok_or_else(|| AppError::InvalidInput(format!("not an unsigned integer: {:?}", raw)))
    }
}

impl From<u64> for TokenAmount {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<u128> for TokenAmount {
    fn from(value: u128) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<BigUint> for TokenAmount {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_str_radix(10))
    }
}

struct TokenAmountVisitor;

impl<'de> de::Visitor<'de> for TokenAmountVisitor {
    type Value = TokenAmount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer as a number, digit string or hex string")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Self::Value, E> {
        Ok(TokenAmount::from(value))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> std::result::Result<Self::Value, E> {
        Ok(TokenAmount::from(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Self::Value, E> {
        u64::try_from(value)
            .map(TokenAmount::from)
            .map_err(|_| E::custom(format!("negative amount: {}", value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<Self::Value, E> {
        // Large JSON integers arrive as floats
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
            return Err(E::custom(format!("not an unsigned integer: {}", value)));
        }
        format!("{:.0}", value).parse().map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Self::Value, E> {
        value.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(TokenAmountVisitor)
    }
}

/// Deserializes a decimals field given as a number or a wrapped integer string.
pub fn deserialize_decimals<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    TokenAmount::deserialize(deserializer)?
        .to_decimals()
        .map_err(de::Error::custom)
}

pub fn deserialize_optional_decimals<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<TokenAmount>::deserialize(deserializer)?
        .map(|raw| raw.to_decimals().map_err(de::Error::custom))
        .transpose()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub address: String,
    pub network_id: String,
    pub name: String,
    pub symbol: String,
    #[serde(deserialize_with = "deserialize_decimals")]
    pub decimals: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub show_always: bool,
}

/// Token plus its on-chain balance, as reported by the account's balance query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenWithBalance {
    #[serde(flatten)]
    pub token: Token,
    #[serde(default)]
    pub balance: Option<TokenAmount>,
}

impl TokenWithBalance {
    pub fn new(token: Token, balance: impl Into<TokenAmount>) -> Self {
        Self {
            token,
            balance: Some(balance.into()),
        }
    }
}
