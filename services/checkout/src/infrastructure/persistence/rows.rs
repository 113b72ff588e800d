//! 存储行结构与领域对象之间的映射

use rust_decimal::Decimal;
use sqlx::FromRow;
use storefront_errors::{AppError, AppResult};

use crate::domain::{Order, OrderId, OrderItem};

/// `orders` 表的一行
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OrderRow {
    pub id: String,
    pub customer_id: String,
    /// 写入时订单总金额的快照
    pub total: Decimal,
}

/// `order_items` 表的一行
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OrderItemRow {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub product_id: String,
    pub order_id: String,
    pub quantity: i32,
}

/// 订单行及其全部订单行明细
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order: OrderRow,
    pub items: Vec<OrderItemRow>,
}

impl OrderRow {
    /// 订单总金额超出范围时返回 `Validation`
    pub fn from_order(order: &Order) -> AppResult<Self> {
        Ok(Self {
            id: order.id().to_string(),
            customer_id: order.customer_id().to_string(),
            total: order.total()?,
        })
    }
}

impl OrderItemRow {
    pub fn from_item(item: &OrderItem, order_id: &OrderId) -> Self {
        Self {
            id: item.id().to_string(),
            name: item.name().to_string(),
            price: item.price(),
            product_id: item.product_id().to_string(),
            order_id: order_id.to_string(),
            quantity: item.quantity(),
        }
    }

    fn into_item(self) -> AppResult<OrderItem> {
        let id = self.id.clone();
        OrderItem::new(self.id, self.name, self.price, self.product_id, self.quantity)
            .map_err(|e| AppError::database(format!("Corrupt order item row {}: {}", id, e)))
    }
}

impl OrderRecord {
    pub fn from_order(order: &Order) -> AppResult<Self> {
        Ok(Self {
            order: OrderRow::from_order(order)?,
            items: order
                .items()
                .iter()
                .map(|item| OrderItemRow::from_item(item, order.id()))
                .collect(),
        })
    }

    /// 从存储行重建订单聚合
    pub fn into_order(self) -> AppResult<Order> {
        let items = self
            .items
            .into_iter()
            .map(OrderItemRow::into_item)
            .collect::<AppResult<Vec<_>>>()?;

        let id = self.order.id.clone();
        Order::new(self.order.id, self.order.customer_id, items)
            .map_err(|e| AppError::database(format!("Corrupt order row {}: {}", id, e)))
    }
}
