//! 内存订单存储
//!
//! 与 PostgreSQL 实现保持相同的行级语义（主键唯一、外键校验、原子创建），用于测试与本地开发。

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use storefront_errors::{AppError, AppResult};
use tokio::sync::RwLock;

use super::order_store::OrderStore;
use super::rows::{OrderItemRow, OrderRecord, OrderRow};

#[derive(Debug, Default)]
struct Tables {
    orders: BTreeMap<String, OrderRow>,
    order_items: BTreeMap<String, OrderItemRow>,
}

impl Tables {
    fn record(&self, order: &OrderRow) -> OrderRecord {
        OrderRecord {
            order: order.clone(),
            items: self
                .order_items
                .values()
                .filter(|item| item.order_id == order.id)
                .cloned()
                .collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    tables: RwLock<Tables>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订单行明细总数（包含所有订单）
    pub async fn item_count(&self) -> usize {
        self.tables.read().await.order_items.len()
    }

    /// 按 id 读取原始订单行明细
    pub async fn item_row(&self, id: &str) -> Option<OrderItemRow> {
        self.tables.read().await.order_items.get(id).cloned()
    }

    /// 按 id 读取原始订单行
    pub async fn order_row(&self, id: &str) -> Option<OrderRow> {
        self.tables.read().await.orders.get(id).cloned()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create_with_items(&self, order: &OrderRow, items: &[OrderItemRow]) -> AppResult<()> {
        let mut tables = self.tables.write().await;

        if tables.orders.contains_key(&order.id) {
            return Err(AppError::conflict(format!("Order {} already exists", order.id)));
        }

        let mut batch: HashMap<&str, &OrderItemRow> = HashMap::with_capacity(items.len());
        for item in items {
            if tables.order_items.contains_key(&item.id)
                || batch.insert(item.id.as_str(), item).is_some()
            {
                return Err(AppError::conflict(format!("Order item {} already exists", item.id)));
            }
        }

        tables.orders.insert(order.id.clone(), order.clone());
        for item in items {
            let mut row = item.clone();
            row.order_id = order.id.clone();
            tables.order_items.insert(row.id.clone(), row);
        }
        Ok(())
    }

    async fn update_order(&self, order: &OrderRow) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.orders.get_mut(&order.id) {
            Some(row) => {
                row.customer_id = order.customer_id.clone();
                row.total = order.total;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_or_create_item(&self, item: &OrderItemRow) -> AppResult<bool> {
        let mut tables = self.tables.write().await;

        if tables.order_items.contains_key(&item.id) {
            return Ok(false);
        }
        if !tables.orders.contains_key(&item.order_id) {
            return Err(AppError::not_found(format!("Order {} not found", item.order_id)));
        }

        tables.order_items.insert(item.id.clone(), item.clone());
        Ok(true)
    }

    async fn update_item(&self, item: &OrderItemRow) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(row) = tables.order_items.get_mut(&item.id) {
            row.name = item.name.clone();
            row.price = item.price;
            row.product_id = item.product_id.clone();
            row.quantity = item.quantity;
        }
        Ok(())
    }

    async fn remove_items_except(&self, order_id: &str, keep: &[String]) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.order_items.len();
        tables
            .order_items
            .retain(|id, item| item.order_id != order_id || keep.contains(id));
        Ok((before - tables.order_items.len()) as u64)
    }

    async fn find_by_pk(&self, id: &str) -> AppResult<Option<OrderRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.get(id).map(|order| tables.record(order)))
    }

    async fn find_all(&self) -> AppResult<Vec<OrderRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .values()
            .map(|order| tables.record(order))
            .collect())
    }
}
