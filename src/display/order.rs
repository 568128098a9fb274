//! Order listing

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Order;

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Pickup")]
    pickup: String,
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "Items")]
    items: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn describe_items(order: &Order) -> String {
    order
        .items
        .iter()
        .map(|item| format!("{} x{}", item.product, item.quantity))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format orders as a table
pub fn format_order_list(orders: &[Order], currency_symbol: &str) -> String {
    if orders.is_empty() {
        return "No orders found.".to_string();
    }

    let mut table = Table::new(orders.iter().map(|order| OrderRow {
        id: order.id.to_string(),
        pickup: format!("{} {}", order.pickup_date, order.pickup_time),
        customer: order.customer_name.clone(),
        items: describe_items(order),
        total: order.total().format_with_symbol(currency_symbol),
        status: order.status.to_string(),
    }));
    table.with(Style::psql());

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, OrderItem, ProductCategory};
    use chrono::NaiveDate;

    #[test]
    fn test_order_row() {
        let order = Order::new(
            "Efisio",
            "070111",
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            "10:30",
        )
        .with_item(OrderItem::new(
            ProductCategory::Pasta,
            "Culurgiones",
            2.0,
            Money::from_euros(15),
        ));

        let output = format_order_list(&[order], "€");
        assert!(output.contains("Efisio"));
        assert!(output.contains("Culurgiones x2"));
        assert!(output.contains("€30.00"));
        assert!(output.contains("nuovo"));
    }

    #[test]
    fn test_empty() {
        assert_eq!(format_order_list(&[], "€"), "No orders found.");
    }
}
