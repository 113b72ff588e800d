//! 订单聚合

use derive_more::{Display, From};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::OrderError;

/// 定义字符串标识符新类型
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
            Display,
            From,
        )]
        #[display("{_0}")]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// 订单 ID
    OrderId
);
string_id!(
    /// 订单行 ID
    OrderItemId
);
string_id!(
    /// 客户 ID
    CustomerId
);
string_id!(
    /// 商品 ID
    ProductId
);

/// 订单行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    id: OrderItemId,
    name: String,
    price: Decimal,
    product_id: ProductId,
    quantity: i32,
}

impl OrderItem {
    pub fn new(
        id: impl Into<OrderItemId>,
        name: impl Into<String>,
        price: Decimal,
        product_id: impl Into<ProductId>,
        quantity: i32,
    ) -> Result<Self, OrderError> {
        let item = Self {
            id: id.into(),
            name: name.into(),
            price,
            product_id: product_id.into(),
            quantity,
        };
        item.validate()?;
        Ok(item)
    }

    fn validate(&self) -> Result<(), OrderError> {
        if self.id.as_str().trim().is_empty() {
            return Err(OrderError::EmptyItemId);
        }
        if self.name.trim().is_empty() {
            return Err(OrderError::EmptyItemName);
        }
        if self.product_id.as_str().trim().is_empty() {
            return Err(OrderError::EmptyProductId);
        }
        if self.quantity <= 0 {
            return Err(OrderError::NonPositiveQuantity(self.quantity));
        }
        if self.price < Decimal::ZERO {
            return Err(OrderError::NegativePrice(self.price));
        }
        line_total(self.price, self.quantity)?;
        Ok(())
    }

    pub fn id(&self) -> &OrderItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 单价
    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    /// 行金额 = 单价 × 数量
    pub fn total(&self) -> Result<Decimal, OrderError> {
        line_total(self.price, self.quantity)
    }

    pub fn change_price(&mut self, price: Decimal) -> Result<(), OrderError> {
        if price < Decimal::ZERO {
            return Err(OrderError::NegativePrice(price));
        }
        line_total(price, self.quantity)?;
        self.price = price;
        Ok(())
    }

    pub fn change_quantity(&mut self, quantity: i32) -> Result<(), OrderError> {
        if quantity <= 0 {
            return Err(OrderError::NonPositiveQuantity(quantity));
        }
        line_total(self.price, quantity)?;
        self.quantity = quantity;
        Ok(())
    }
}

/// 订单聚合根
///
/// 持有有序的订单行集合，总金额始终由订单行实时计算。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    items: Vec<OrderItem>,
}

impl Order {
    /// 创建订单；允许空订单行（存储层重建时可能没有订单行）
    pub fn new(
        id: impl Into<OrderId>,
        customer_id: impl Into<CustomerId>,
        items: Vec<OrderItem>,
    ) -> Result<Self, OrderError> {
        let id = id.into();
        let customer_id = customer_id.into();

        if id.as_str().trim().is_empty() {
            return Err(OrderError::EmptyOrderId);
        }
        if customer_id.as_str().trim().is_empty() {
            return Err(OrderError::EmptyCustomerId);
        }

        let order = Self {
            id,
            customer_id,
            items,
        };
        order.total()?;
        Ok(order)
    }

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// 总金额 = Σ 单价 × 数量，超出 `Decimal` 范围时返回 `TotalOverflow`
    pub fn total(&self) -> Result<Decimal, OrderError> {
        self.items.iter().try_fold(Decimal::ZERO, |sum, item| {
            sum.checked_add(item.total()?).ok_or(OrderError::TotalOverflow)
        })
    }

    pub fn add_item(&mut self, item: OrderItem) {
        self.items.push(item);
    }

    pub fn item_mut(&mut self, id: &OrderItemId) -> Option<&mut OrderItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    pub fn change_customer(
        &mut self,
        customer_id: impl Into<CustomerId>,
    ) -> Result<(), OrderError> {
        let customer_id = customer_id.into();
        if customer_id.as_str().trim().is_empty() {
            return Err(OrderError::EmptyCustomerId);
        }
        self.customer_id = customer_id;
        Ok(())
    }
}

fn line_total(price: Decimal, quantity: i32) -> Result<Decimal, OrderError> {
    price
        .checked_mul(Decimal::from(quantity))
        .ok_or(OrderError::TotalOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(price: i64, quantity: i32) -> OrderItem {
        OrderItem::new("i1", "Widget", Decimal::from(price), "p1", quantity).unwrap()
    }

    #[test]
    fn test_order_total() {
        let gadget = OrderItem::new("i2", "Gadget", Decimal::new(250, 2), "p2", 4).unwrap();
        let order = Order::new("o1", "c1", vec![widget(10, 2), gadget]).unwrap();

        assert_eq!(order.total().unwrap(), Decimal::from(30));
    }

    #[test]
    fn test_empty_order_total_is_zero() {
        let order = Order::new("o1", "c1", vec![]).unwrap();
        assert!(order.total().unwrap().is_zero());
        assert!(order.items().is_empty());
    }

    #[test]
    fn test_order_requires_ids() {
        assert_eq!(
            Order::new("", "c1", vec![]).unwrap_err(),
            OrderError::EmptyOrderId
        );
        assert_eq!(
            Order::new("o1", "  ", vec![]).unwrap_err(),
            OrderError::EmptyCustomerId
        );
    }

    #[test]
    fn test_item_validation() {
        assert_eq!(
            OrderItem::new("i1", "Widget", Decimal::from(10), "p1", 0).unwrap_err(),
            OrderError::NonPositiveQuantity(0)
        );
        assert_eq!(
            OrderItem::new("i1", "Widget", Decimal::from(-1), "p1", 1).unwrap_err(),
            OrderError::NegativePrice(Decimal::from(-1))
        );
        assert_eq!(
            OrderItem::new("i1", "", Decimal::from(10), "p1", 1).unwrap_err(),
            OrderError::EmptyItemName
        );
        assert_eq!(
            OrderItem::new("", "Widget", Decimal::from(10), "p1", 1).unwrap_err(),
            OrderError::EmptyItemId
        );
        assert_eq!(
            OrderItem::new("i1", "Widget", Decimal::from(10), "", 1).unwrap_err(),
            OrderError::EmptyProductId
        );
        assert!(OrderItem::new("i1", "Freebie", Decimal::ZERO, "p1", 1).is_ok());
    }

    #[test]
    fn test_change_item_price_updates_total() {
        let mut order = Order::new("o1", "c1", vec![widget(10, 2)]).unwrap();
        assert_eq!(order.total().unwrap(), Decimal::from(20));

        order
            .item_mut(&OrderItemId::from("i1"))
            .unwrap()
            .change_price(Decimal::from(15))
            .unwrap();
        assert_eq!(order.total().unwrap(), Decimal::from(30));
    }

    #[test]
    fn test_change_quantity_rejects_zero() {
        let mut item = widget(10, 2);
        assert!(item.change_quantity(0).is_err());
        item.change_quantity(3).unwrap();
        assert_eq!(item.total().unwrap(), Decimal::from(30));
    }

    #[test]
    fn test_item_total_out_of_range_is_rejected() {
        assert_eq!(
            OrderItem::new("i1", "Widget", Decimal::MAX, "p1", 2).unwrap_err(),
            OrderError::TotalOverflow
        );

        let mut item = widget(10, 2);
        assert_eq!(
            item.change_price(Decimal::MAX).unwrap_err(),
            OrderError::TotalOverflow
        );
        assert_eq!(item.price(), Decimal::from(10));

        let mut big = OrderItem::new("i2", "Gold", Decimal::MAX, "p2", 1).unwrap();
        assert_eq!(big.change_quantity(2).unwrap_err(), OrderError::TotalOverflow);
        assert_eq!(big.quantity(), 1);
    }

    #[test]
    fn test_order_total_out_of_range() {
        let big = |id: &str| OrderItem::new(id, "Gold", Decimal::MAX, "p1", 1).unwrap();

        assert_eq!(
            Order::new("o1", "c1", vec![big("i1"), big("i2")]).unwrap_err(),
            OrderError::TotalOverflow
        );

        let mut order = Order::new("o1", "c1", vec![big("i1")]).unwrap();
        order.add_item(big("i2"));
        assert_eq!(order.total().unwrap_err(), OrderError::TotalOverflow);
    }

    #[test]
    fn test_ids_display_as_inner_string() {
        let id = OrderId::from("o1");
        assert_eq!(id.to_string(), "o1");
        assert_eq!(id, OrderId::new(String::from("o1")));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"o1\"");
    }
}
