pub mod catalog;
pub mod chat;
pub mod compare;
pub mod config;
pub mod health;

use crate::core::errors::ApiError;

pub async fn not_found() -> ApiError {
    ApiError::NotFound("No such route".to_string())
}
