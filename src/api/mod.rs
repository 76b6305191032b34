// src/api/mod.rs

pub mod health;
pub mod networks;
pub mod portfolio;
pub mod tokens;

use axum::extract::{FromRequest, FromRequestParts};
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::{PriceFeedService, TokenRegistry};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub price_feed: Arc<PriceFeedService>,
    pub registry: Arc<TokenRegistry>,
}

/// `Json` body whose rejection is an [`AppError::BadRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Query` string whose rejection is an [`AppError::BadRequest`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
