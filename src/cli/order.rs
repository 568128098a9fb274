//! Order CLI commands
//!
//! Minimal order intake so reports and backups have records to work on.

use clap::Subcommand;

use super::{date_or_today, parse_date};
use crate::display::format_order_list;
use crate::error::{PastificioError, PastificioResult};
use crate::models::{Money, Order, OrderItem, OrderStatus, ProductCategory};
use crate::state::AppState;

/// Order subcommands
#[derive(Subcommand)]
pub enum OrderCommands {
    /// Add a new order
    Add {
        /// Customer name
        customer: String,

        /// Contact phone number
        #[arg(short, long)]
        phone: String,

        /// Pickup date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Pickup time (HH:MM)
        #[arg(short, long, default_value = "12:00")]
        time: String,

        /// Product line as CATEGORY:PRODUCT:QUANTITY:UNIT_PRICE (repeatable)
        #[arg(short, long = "item", required = true)]
        items: Vec<String>,

        /// Pack for travel
        #[arg(long)]
        travel: bool,

        /// Notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List orders
    List {
        /// Only orders picked up on this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Move an order to a new status
    Status {
        /// Order ID (full UUID or its leading characters)
        id: String,

        /// New status (nuovo, in_lavorazione, completato, consegnato, annullato)
        status: String,
    },
}

/// Handle an order command
pub fn handle_order_command(state: &AppState, cmd: OrderCommands) -> PastificioResult<()> {
    let orders = &state.storage().orders;

    match cmd {
        OrderCommands::Add {
            customer,
            phone,
            date,
            time,
            items,
            travel,
            notes,
        } => {
            let mut order = Order::new(customer, phone, date_or_today(date.as_deref())?, time);
            for line in &items {
                order.items.push(parse_item(line)?);
            }
            order.travel = travel;
            order.notes = notes.unwrap_or_default();
            order.validate()?;

            let id = order.id;
            let total = order.total();
            orders.upsert(order)?;
            orders.save()?;

            println!(
                "Added order {} ({})",
                id,
                total.format_with_symbol(&state.settings().currency_symbol)
            );
        }

        OrderCommands::List { date } => {
            let list = match date {
                Some(d) => orders.get_by_date(parse_date(&d)?)?,
                None => orders.get_all()?,
            };
            println!(
                "{}",
                format_order_list(&list, &state.settings().currency_symbol)
            );
        }

        OrderCommands::Status { id, status } => {
            let status: OrderStatus = status.parse()?;
            let target = find_order(&orders.get_all()?, &id)?;
            let order = orders.set_status(target, status)?;
            orders.save()?;
            println!("Order {} is now {}", order.id, order.status);
        }
    }

    Ok(())
}

/// Parse `CATEGORY:PRODUCT:QUANTITY:UNIT_PRICE`
fn parse_item(line: &str) -> PastificioResult<OrderItem> {
    let parts: Vec<&str> = line.split(':').collect();
    let invalid = |reason: String| {
        PastificioError::Validation(format!("Invalid item '{}': {}", line, reason))
    };

    let [category, product, quantity, price] = parts.as_slice() else {
        return Err(invalid(
            "expected CATEGORY:PRODUCT:QUANTITY:UNIT_PRICE".into(),
        ));
    };

    let category: ProductCategory = category.parse()?;
    let quantity: f64 = quantity
        .trim()
        .parse()
        .map_err(|_| invalid(format!("bad quantity '{}'", quantity)))?;
    let unit_price = Money::parse(price).map_err(|e| invalid(e.to_string()))?;

    Ok(OrderItem::new(category, product.trim(), quantity, unit_price))
}

/// Find the id of the single order whose id starts with `needle`
fn find_order(orders: &[Order], needle: &str) -> PastificioResult<crate::models::OrderId> {
    let needle = needle.trim_start_matches("ord-").to_lowercase();
    if needle.is_empty() {
        return Err(PastificioError::Validation("Order ID is empty".into()));
    }

    let mut matches = orders.iter().filter(|o| o.id.key().starts_with(&needle));
    match (matches.next(), matches.next()) {
        (Some(order), None) => Ok(order.id),
        (None, _) => Err(PastificioError::order_not_found(needle)),
        (Some(_), Some(_)) => Err(PastificioError::Validation(format!(
            "Order ID '{}' is ambiguous",
            needle
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::create_test_state;

    #[test]
    fn test_parse_item() {
        let item = parse_item("pasta:Culurgiones:2:15.00").unwrap();
        assert_eq!(item.category, ProductCategory::Pasta);
        assert_eq!(item.product, "Culurgiones");
        assert_eq!(item.quantity, 2.0);
        assert_eq!(item.line_total(), Money::from_euros(30));
    }

    #[test]
    fn test_parse_item_rejects_bad_input() {
        assert!(parse_item("pasta:Culurgiones:2").unwrap_err().is_validation());
        assert!(parse_item("pasta:Culurgiones:due:15").unwrap_err().is_validation());
        assert!(parse_item("pizza:Margherita:1:8").unwrap_err().is_validation());
    }

    #[test]
    fn test_add_and_update_status() {
        let (_temp, state) = create_test_state(None);

        handle_order_command(
            &state,
            OrderCommands::Add {
                customer: "Efisio".into(),
                phone: "070111".into(),
                date: Some("2026-10-18".into()),
                time: "10:30".into(),
                items: vec!["dolci:Seadas:4:3.50".into()],
                travel: false,
                notes: None,
            },
        )
        .unwrap();

        let order = state.storage().orders.get_all().unwrap().remove(0);
        let prefix = order.id.key()[..8].to_string();

        handle_order_command(
            &state,
            OrderCommands::Status {
                id: format!("ord-{}", prefix),
                status: "completato".into(),
            },
        )
        .unwrap();

        let updated = state.storage().orders.get(order.id).unwrap().unwrap();
        assert_eq!(updated.status, OrderStatus::Completed);
    }

    #[test]
    fn test_unknown_order() {
        assert!(find_order(&[], "abcd").unwrap_err().is_not_found());
    }
}
