//! 订单持久化
//!
//! - `rows`: 存储行结构
//! - `order_store`: 行级持久化端口
//! - `order_repository`: 领域 Repository 适配器
//! - `postgres_order_store` / `in_memory_order_store`: 端口实现

mod in_memory_order_store;
mod order_repository;
mod order_store;
mod postgres_order_store;
mod rows;

pub use in_memory_order_store::InMemoryOrderStore;
pub use order_repository::{MergeStrategy, OrderRepositoryAdapter};
pub use order_store::OrderStore;
pub use postgres_order_store::PostgresOrderStore;
pub use rows::{OrderItemRow, OrderRecord, OrderRow};
