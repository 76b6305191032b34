/// Application constants

// Fixed precision of converted currency values (10^-6 units)
pub const CURRENCY_VALUE_DECIMALS: u32 = 6;

// Display precision
pub const CURRENCY_DISPLAY_DECIMALS: u32 = 2;
pub const CURRENCY_MAX_DISPLAY_DECIMALS: u32 = 18;
pub const CURRENCY_SIGNIFICANT_DIGITS: u32 = 2;
pub const TOKEN_AMOUNT_DISPLAY_DECIMALS: u32 = 4;
pub const THOUSANDS_SEPARATOR: char = ',';
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

// ERC-20 style decimals are a u8 on chain
pub const MAX_TOKEN_DECIMALS: u32 = 255;

// Starknet addresses must be below 2^251 - 256 (zero-padded to 64 digits)
pub const STARKNET_ADDRESS_BOUND: &str =
    "0x07ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff00";

// Token addresses (Starknet)
pub const TOKEN_ETH: &str = "0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7";

// Networks
pub const NETWORK_MAINNET: &str = "mainnet-alpha";
pub const NETWORK_GOERLI: &str = "goerli-alpha";
pub const NETWORK_LOCALHOST: &str = "localhost";
pub const LOCALHOST_URL_PREFIX: &str = "http://localhost";
pub const DEFAULT_LOCAL_DEVNET_PORT: u16 = 5050;

// Price API
pub const DEFAULT_PRICE_API_BASE_URL: &str = "https://cloud.argent-api.com/v1";
pub const PRICE_API_PRICES_PATH: &str = "tokens/prices";
pub const PRICE_API_TOKENS_PATH: &str = "tokens/info";
pub const PRICE_API_TIMEOUT_SECS: u64 = 10;

// Background service intervals
pub const PRICES_REFRESH_INTERVAL_SECS: u64 = 60;
pub const TOKEN_INFO_REFRESH_INTERVAL_SECS: u64 = 5 * 60;

// API version
pub const API_VERSION: &str = "v1";
