//! Checkout Service Library
//!
//! 订单聚合的持久化：
//! - `domain`: Order / OrderItem 实体与 OrderRepository 契约
//! - `infrastructure`: 行级存储端口、PostgreSQL 与内存实现、Repository 适配器
//! - `bootstrap`: 配置、日志与连接池初始化

pub mod bootstrap;
pub mod domain;
pub mod error;
pub mod infrastructure;
