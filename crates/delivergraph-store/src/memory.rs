use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;

use crate::{
  Delivery, DeliveryStats, DeliveryStatus, DeliveryUpdate, Error, ErrorLog, NewDelivery,
  NewErrorLog, Store, User, generate_user_id,
};

/// In-process store. Records live as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
  users: Vec<User>,
  /// Insertion order, used for most-recent-first listings.
  deliveries: Vec<Delivery>,
  by_ticket: HashMap<String, usize>,
  errors: Vec<ErrorLog>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(|e| e.into_inner())
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn create_user(
    &self,
    name: &str,
    email: Option<&str>,
    phone: Option<&str>,
  ) -> Result<User, Error> {
    let user = User {
      user_id: generate_user_id(),
      name: name.to_string(),
      email: email.map(str::to_string),
      phone: phone.map(str::to_string),
      created_at: Utc::now(),
    };
    self.lock().users.push(user.clone());
    Ok(user)
  }

  async fn get_user(&self, user_id: &str) -> Result<Option<User>, Error> {
    Ok(self.lock().users.iter().find(|u| u.user_id == user_id).cloned())
  }

  async fn list_users(&self, limit: u32) -> Result<Vec<User>, Error> {
    Ok(self.lock().users.iter().take(limit as usize).cloned().collect())
  }

  async fn create_delivery(&self, delivery: &NewDelivery) -> Result<String, Error> {
    let mut inner = self.lock();
    if inner.by_ticket.contains_key(&delivery.ticket_id) {
      return Err(Error::Conflict(delivery.ticket_id.clone()));
    }

    let index = inner.deliveries.len();
    inner.deliveries.push(Delivery {
      ticket_id: delivery.ticket_id.clone(),
      user_id: delivery.user_id.clone(),
      material_type: delivery.material_type.clone(),
      distance: delivery.distance,
      urgency: delivery.urgency.clone(),
      weight: delivery.weight,
      location_type: delivery.location_type.clone(),
      total_price: None,
      status: DeliveryStatus::Pending,
      action_log: Json(Vec::new()),
      created_at: Utc::now(),
    });
    inner.by_ticket.insert(delivery.ticket_id.clone(), index);
    Ok(delivery.ticket_id.clone())
  }

  async fn update_delivery(&self, ticket_id: &str, update: &DeliveryUpdate) -> Result<(), Error> {
    let mut inner = self.lock();
    let index = *inner
      .by_ticket
      .get(ticket_id)
      .ok_or_else(|| Error::NotFound(ticket_id.to_string()))?;

    let delivery = &mut inner.deliveries[index];
    if let Some(total_price) = update.total_price {
      delivery.total_price = Some(total_price);
    }
    if let Some(status) = update.status {
      delivery.status = status;
    }
    if let Some(action_log) = &update.action_log {
      delivery.action_log = Json(action_log.clone());
    }
    Ok(())
  }

  async fn get_delivery(&self, ticket_id: &str) -> Result<Option<Delivery>, Error> {
    let inner = self.lock();
    Ok(
      inner
        .by_ticket
        .get(ticket_id)
        .map(|&index| inner.deliveries[index].clone()),
    )
  }

  async fn list_deliveries(&self, limit: u32) -> Result<Vec<Delivery>, Error> {
    Ok(
      self
        .lock()
        .deliveries
        .iter()
        .rev()
        .take(limit as usize)
        .cloned()
        .collect(),
    )
  }

  async fn list_user_deliveries(&self, user_id: &str, limit: u32) -> Result<Vec<Delivery>, Error> {
    Ok(
      self
        .lock()
        .deliveries
        .iter()
        .rev()
        .filter(|d| d.user_id == user_id)
        .take(limit as usize)
        .cloned()
        .collect(),
    )
  }

  async fn log_error(&self, entry: &NewErrorLog) -> Result<ErrorLog, Error> {
    let mut inner = self.lock();
    let logged = ErrorLog {
      id: inner.errors.len() as i64 + 1,
      ticket_id: entry.ticket_id.clone(),
      error_type: entry.error_type.clone(),
      error_message: entry.error_message.clone(),
      node_name: entry.node_name.clone(),
      timestamp: Utc::now(),
    };
    inner.errors.push(logged.clone());
    Ok(logged)
  }

  async fn errors_for_ticket(&self, ticket_id: &str) -> Result<Vec<ErrorLog>, Error> {
    Ok(
      self
        .lock()
        .errors
        .iter()
        .filter(|e| e.ticket_id == ticket_id)
        .cloned()
        .collect(),
    )
  }

  async fn list_errors(&self, limit: u32) -> Result<Vec<ErrorLog>, Error> {
    Ok(
      self
        .lock()
        .errors
        .iter()
        .rev()
        .take(limit as usize)
        .cloned()
        .collect(),
    )
  }

  async fn delivery_stats(&self) -> Result<DeliveryStats, Error> {
    let inner = self.lock();
    let count = |status: DeliveryStatus| {
      inner
        .deliveries
        .iter()
        .filter(|d| d.status == status)
        .count() as i64
    };
    let revenue = inner.deliveries.iter().filter_map(|d| d.total_price).sum();

    Ok(DeliveryStats::new(
      inner.deliveries.len() as i64,
      count(DeliveryStatus::Completed),
      count(DeliveryStatus::Failed),
      count(DeliveryStatus::Pending),
      revenue,
    ))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn new_delivery(ticket_id: &str, user_id: &str) -> NewDelivery {
    NewDelivery {
      ticket_id: ticket_id.to_string(),
      user_id: user_id.to_string(),
      material_type: "standard".to_string(),
      distance: 10.0,
      urgency: "standard".to_string(),
      weight: 2.0,
      location_type: "rural".to_string(),
    }
  }

  #[tokio::test]
  async fn test_delivery_update_and_listing() {
    let store = MemoryStore::new();
    store.create_delivery(&new_delivery("DEL-1", "u1")).await.unwrap();
    store.create_delivery(&new_delivery("DEL-2", "u2")).await.unwrap();

    store
      .update_delivery("DEL-1", &DeliveryUpdate::completed(190.0, vec!["done".into()]))
      .await
      .unwrap();

    let first = store.get_delivery("DEL-1").await.unwrap().unwrap();
    assert_eq!(first.status, DeliveryStatus::Completed);
    assert_eq!(first.total_price, Some(190.0));
    assert_eq!(first.action_log.0, vec!["done".to_string()]);

    let listed: Vec<String> = store
      .list_deliveries(10)
      .await
      .unwrap()
      .into_iter()
      .map(|d| d.ticket_id)
      .collect();
    assert_eq!(listed, vec!["DEL-2", "DEL-1"]);
    assert_eq!(store.list_user_deliveries("u2", 10).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_conflict_and_not_found() {
    let store = MemoryStore::new();
    store.create_delivery(&new_delivery("DEL-1", "u1")).await.unwrap();
    assert!(matches!(
      store.create_delivery(&new_delivery("DEL-1", "u1")).await,
      Err(Error::Conflict(_))
    ));
    assert!(matches!(
      store
        .update_delivery("DEL-9", &DeliveryUpdate::default())
        .await,
      Err(Error::NotFound(_))
    ));
  }

  #[tokio::test]
  async fn test_errors_and_stats() {
    let store = MemoryStore::new();
    store.create_delivery(&new_delivery("DEL-1", "u1")).await.unwrap();
    store.create_delivery(&new_delivery("DEL-2", "u1")).await.unwrap();
    store
      .update_delivery("DEL-2", &DeliveryUpdate::failed(vec![]))
      .await
      .unwrap();
    store
      .log_error(&NewErrorLog {
        ticket_id: "DEL-2".to_string(),
        error_type: "workflow_error".to_string(),
        error_message: "boom".to_string(),
        node_name: "error_handler".to_string(),
      })
      .await
      .unwrap();

    assert_eq!(store.errors_for_ticket("DEL-2").await.unwrap().len(), 1);
    let stats = store.delivery_stats().await.unwrap();
    assert_eq!(stats.total_deliveries, 2);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.average_price, 0.0);
  }
}
