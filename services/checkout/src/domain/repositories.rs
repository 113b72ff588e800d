//! 订单 Repository 契约

use storefront_ports::Repository;

use super::order::{Order, OrderId};

/// 订单 Repository
///
/// 即 `Repository<Order, OrderId>`：`create` / `update` / `find` / `find_all`。
/// 任何存储后端只要实现该契约即可替换。
pub trait OrderRepository: Repository<Order, OrderId> {}

impl<T> OrderRepository for T where T: Repository<Order, OrderId> + ?Sized {}
