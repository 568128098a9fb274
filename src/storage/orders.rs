//! Order repository for JSON storage
//!
//! Manages loading and saving orders to orders.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::PastificioError;
use crate::models::{Order, OrderId, OrderStatus};

use super::file_io::{read_json, write_json_atomic};

/// Serializable order data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct OrderData {
    orders: Vec<Order>,
}

/// Repository for order persistence
pub struct OrderRepository {
    path: PathBuf,
    data: RwLock<HashMap<OrderId, Order>>,
}

fn by_pickup(orders: &mut [Order]) {
    orders.sort_by(|a, b| {
        a.pickup_date
            .cmp(&b.pickup_date)
            .then_with(|| a.pickup_time.cmp(&b.pickup_time))
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

impl OrderRepository {
    /// Create a new order repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load orders from disk
    pub fn load(&self) -> Result<(), PastificioError> {
        let file_data: OrderData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            PastificioError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        for order in file_data.orders {
            data.insert(order.id, order);
        }

        Ok(())
    }

    /// Save orders to disk
    pub fn save(&self) -> Result<(), PastificioError> {
        let orders = self.get_all()?;
        write_json_atomic(&self.path, &OrderData { orders })
    }

    /// Get an order by ID
    pub fn get(&self, id: OrderId) -> Result<Option<Order>, PastificioError> {
        let data = self.data.read().map_err(|e| {
            PastificioError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    /// Get all orders, by pickup date and time
    pub fn get_all(&self) -> Result<Vec<Order>, PastificioError> {
        let data = self.data.read().map_err(|e| {
            PastificioError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut orders: Vec<_> = data.values().cloned().collect();
        by_pickup(&mut orders);
        Ok(orders)
    }

    /// Get orders picked up on a date
    pub fn get_by_date(&self, date: NaiveDate) -> Result<Vec<Order>, PastificioError> {
        let mut orders = self.get_all()?;
        orders.retain(|o| o.pickup_date == date);
        Ok(orders)
    }

    /// Insert or update an order
    pub fn upsert(&self, order: Order) -> Result<(), PastificioError> {
        let mut data = self.data.write().map_err(|e| {
            PastificioError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.insert(order.id, order);
        Ok(())
    }

    /// Move an order to a new status
    pub fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, PastificioError> {
        let mut data = self.data.write().map_err(|e| {
            PastificioError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let order = data
            .get_mut(&id)
            .ok_or_else(|| PastificioError::order_not_found(id.to_string()))?;
        order.set_status(status);
        Ok(order.clone())
    }

    /// Delete an order
    pub fn delete(&self, id: OrderId) -> Result<bool, PastificioError> {
        let mut data = self.data.write().map_err(|e| {
            PastificioError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(data.remove(&id).is_some())
    }

    /// Replace every order (used when restoring a backup)
    pub fn replace_all(&self, orders: Vec<Order>) -> Result<(), PastificioError> {
        let mut data = self.data.write().map_err(|e| {
            PastificioError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        for order in orders {
            data.insert(order.id, order);
        }
        Ok(())
    }

    /// Count orders
    pub fn count(&self) -> Result<usize, PastificioError> {
        let data = self.data.read().map_err(|e| {
            PastificioError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, OrderItem, ProductCategory};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, OrderRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("orders.json");
        let repo = OrderRepository::new(path);
        (temp_dir, repo)
    }

    fn create_test_order(day: u32, time: &str) -> Order {
        Order::new(
            "Giulia",
            "3339876543",
            NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
            time,
        )
        .with_item(OrderItem::new(
            ProductCategory::Pasta,
            "Fregola",
            2.0,
            Money::from_euros(8),
        ))
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_upsert_and_get() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let order = create_test_order(18, "10:00");
        let id = order.id;
        repo.upsert(order).unwrap();

        let retrieved = repo.get(id).unwrap().unwrap();
        assert_eq!(retrieved.customer_name, "Giulia");
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let order = create_test_order(18, "10:00");
        let id = order.id;
        repo.upsert(order).unwrap();
        repo.save().unwrap();

        let repo2 = OrderRepository::new(temp_dir.path().join("orders.json"));
        repo2.load().unwrap();
        assert!(repo2.get(id).unwrap().is_some());
    }

    #[test]
    fn test_get_all_sorted_by_pickup() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(create_test_order(19, "09:00")).unwrap();
        repo.upsert(create_test_order(18, "12:00")).unwrap();
        repo.upsert(create_test_order(18, "08:30")).unwrap();

        let times: Vec<_> = repo
            .get_all()
            .unwrap()
            .into_iter()
            .map(|o| (o.pickup_date.format("%d").to_string(), o.pickup_time))
            .collect();
        assert_eq!(
            times,
            vec![
                ("18".to_string(), "08:30".to_string()),
                ("18".to_string(), "12:00".to_string()),
                ("19".to_string(), "09:00".to_string()),
            ]
        );
    }

    #[test]
    fn test_get_by_date() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(create_test_order(18, "09:00")).unwrap();
        repo.upsert(create_test_order(19, "09:00")).unwrap();

        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(repo.get_by_date(day).unwrap().len(), 1);
    }

    #[test]
    fn test_set_status() {
        let (_temp_dir, repo) = create_test_repo();
        let order = create_test_order(18, "09:00");
        let id = order.id;
        repo.upsert(order).unwrap();

        let updated = repo.set_status(id, OrderStatus::Completed).unwrap();
        assert!(updated.is_completed());

        let missing = repo.set_status(OrderId::new(), OrderStatus::Completed);
        assert!(missing.unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_and_replace_all() {
        let (_temp_dir, repo) = create_test_repo();
        let order = create_test_order(18, "09:00");
        let id = order.id;
        repo.upsert(order).unwrap();

        assert!(repo.delete(id).unwrap());
        assert!(!repo.delete(id).unwrap());

        repo.replace_all(vec![create_test_order(20, "10:00"), create_test_order(21, "10:00")])
            .unwrap();
        assert_eq!(repo.count().unwrap(), 2);
    }
}
