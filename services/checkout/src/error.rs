//! 服务错误定义

use rust_decimal::Decimal;
use storefront_errors::AppError;
use thiserror::Error;

/// 订单实体校验错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderError {
    #[error("Order id is required")]
    EmptyOrderId,

    #[error("Customer id is required")]
    EmptyCustomerId,

    #[error("Order item id is required")]
    EmptyItemId,

    #[error("Order item name is required")]
    EmptyItemName,

    #[error("Product id is required")]
    EmptyProductId,

    #[error("Quantity must be greater than 0, got {0}")]
    NonPositiveQuantity(i32),

    #[error("Price must not be negative, got {0}")]
    NegativePrice(Decimal),

    #[error("Order total exceeds the supported decimal range")]
    TotalOverflow,
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        AppError::validation(err.to_string())
    }
}
