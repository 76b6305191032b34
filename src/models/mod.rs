// src/models/mod.rs
pub mod price;
pub mod token;

use serde::Serialize;

pub use price::{ApiPriceDataResponse, ApiTokenDataResponse, PriceRecord, TokenInfo};
pub use token::{Token, TokenAmount, TokenWithBalance};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
