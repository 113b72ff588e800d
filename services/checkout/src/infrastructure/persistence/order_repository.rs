//! 订单 Repository 适配器
//!
//! 在 `Order` 聚合与 `orders` / `order_items` 行之间转换，存储细节交给 [`OrderStore`]。

use async_trait::async_trait;
use storefront_errors::{AppError, AppResult};
use storefront_ports::Repository;
use tracing::{debug, instrument, warn};

use crate::domain::{Order, OrderId};

use super::order_store::OrderStore;
use super::rows::OrderRecord;

const OPERATIONS_METRIC: &str = "checkout_order_repository_operations_total";

/// 更新订单时如何处理存储中存在、但内存订单里已经没有的订单行明细
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// 只新增或覆盖，从不删除旧明细
    #[default]
    Additive,
    /// 新增或覆盖之后，删除不再出现的明细
    Synchronize,
}

/// 基于 [`OrderStore`] 的订单 Repository
pub struct OrderRepositoryAdapter<S> {
    store: S,
    merge_strategy: MergeStrategy,
}

impl<S: OrderStore> OrderRepositoryAdapter<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            merge_strategy: MergeStrategy::default(),
        }
    }

    pub fn with_merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.merge_strategy = strategy;
        self
    }

    pub fn merge_strategy(&self) -> MergeStrategy {
        self.merge_strategy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn create_record(&self, order: &Order) -> AppResult<()> {
        let record = OrderRecord::from_order(order)?;
        self.store.create_with_items(&record.order, &record.items).await?;

        debug!(items = record.items.len(), total = %record.order.total, "Order created");
        Ok(())
    }

    async fn update_record(&self, order: &Order) -> AppResult<()> {
        let record = OrderRecord::from_order(order)?;

        if !self.store.update_order(&record.order).await? {
            warn!("Order to update does not exist");
            return Err(AppError::not_found(format!("Order {} not found", order.id())));
        }

        let mut created = 0usize;
        for item in &record.items {
            if self.store.find_or_create_item(item).await? {
                created += 1;
                continue;
            }

            self.store.update_item(item).await?;
        }

        let removed = match self.merge_strategy {
            MergeStrategy::Additive => 0,
            MergeStrategy::Synchronize => {
                let keep: Vec<String> = record.items.iter().map(|item| item.id.clone()).collect();
                self.store.remove_items_except(&record.order.id, &keep).await?
            }
        };

        debug!(
            strategy = ?self.merge_strategy,
            created,
            updated = record.items.len() - created,
            removed,
            total = %record.order.total,
            "Order updated"
        );
        Ok(())
    }
}

fn record_operation<T>(operation: &'static str, result: &AppResult<T>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    metrics::counter!(OPERATIONS_METRIC, "operation" => operation, "outcome" => outcome)
        .increment(1);
}

#[async_trait]
impl<S: OrderStore> Repository<Order, OrderId> for OrderRepositoryAdapter<S> {
    #[instrument(skip(self, order), fields(order_id = %order.id()))]
    async fn create(&self, order: &Order) -> AppResult<()> {
        let result = self.create_record(order).await;
        record_operation("create", &result);
        result
    }

    #[instrument(skip(self, order), fields(order_id = %order.id()))]
    async fn update(&self, order: &Order) -> AppResult<()> {
        let result = self.update_record(order).await;
        record_operation("update", &result);
        result
    }

    #[instrument(skip(self, id), fields(order_id = %id))]
    async fn find(&self, id: &OrderId) -> AppResult<Order> {
        let result = match self.store.find_by_pk(id.as_str()).await {
            Ok(Some(record)) => record.into_order(),
            Ok(None) => {
                warn!("Order not found");
                Err(AppError::not_found(format!("Order {} not found", id)))
            }
            Err(e) => Err(e),
        };
        record_operation("find", &result);
        result
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> AppResult<Vec<Order>> {
        let result = self.store.find_all().await.and_then(|records| {
            records
                .into_iter()
                .map(OrderRecord::into_order)
                .collect::<AppResult<Vec<_>>>()
        });
        record_operation("find_all", &result);

        if let Ok(orders) = &result {
            debug!(count = orders.len(), "Orders loaded");
        }
        result
    }
}
