use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::types::Json;

use crate::{
  Delivery, DeliveryStats, DeliveryStatus, DeliveryUpdate, Error, ErrorLog, NewDelivery,
  NewErrorLog, Store, User, generate_user_id,
};

/// SQLite-based store implementation.
#[derive(Debug, Clone)]
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Open (creating if missing) the database at `url`. An in-memory URL
  /// gets a single-connection pool, see [`SqliteStore::in_memory`].
  pub async fn connect(url: &str) -> Result<Self, Error> {
    if url.contains(":memory:") {
      return Self::in_memory().await;
    }
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    Ok(Self::new(pool))
  }

  /// A private in-memory database. The pool holds exactly one connection
  /// for its whole life, since each in-memory connection is its own database.
  pub async fn in_memory() -> Result<Self, Error> {
    let pool = SqlitePoolOptions::new()
      .max_connections(1)
      .min_connections(1)
      .idle_timeout(None)
      .max_lifetime(None)
      .connect("sqlite::memory:")
      .await?;
    Ok(Self::new(pool))
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), Error> {
    sqlx::migrate!("../../migrations").run(&self.pool).await?;
    Ok(())
  }

  pub fn pool(&self) -> &SqlitePool {
    &self.pool
  }
}

#[async_trait]
impl Store for SqliteStore {
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

    sqlx::query(
      r#"
            INSERT INTO users (user_id, name, email, phone, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
    )
    .bind(&user.user_id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.phone)
    .bind(user.created_at)
    .execute(&self.pool)
    .await?;

    Ok(user)
  }

  async fn get_user(&self, user_id: &str) -> Result<Option<User>, Error> {
    let user = sqlx::query_as(
      r#"
            SELECT user_id, name, email, phone, created_at
            FROM users
            WHERE user_id = ?
            "#,
    )
    .bind(user_id)
    .fetch_optional(&self.pool)
    .await?;

    Ok(user)
  }

  async fn list_users(&self, limit: u32) -> Result<Vec<User>, Error> {
    let users = sqlx::query_as(
      r#"
            SELECT user_id, name, email, phone, created_at
            FROM users
            ORDER BY created_at ASC, rowid ASC
            LIMIT ?
            "#,
    )
    .bind(limit)
    .fetch_all(&self.pool)
    .await?;

    Ok(users)
  }

  async fn create_delivery(&self, delivery: &NewDelivery) -> Result<String, Error> {
    let result = sqlx::query(
            r#"
            INSERT INTO deliveries (ticket_id, user_id, material_type, distance, urgency, weight, location_type, total_price, status, action_log, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, NULL, ?, ?, ?)
            "#,
        )
        .bind(&delivery.ticket_id)
        .bind(&delivery.user_id)
        .bind(&delivery.material_type)
        .bind(delivery.distance)
        .bind(&delivery.urgency)
        .bind(delivery.weight)
        .bind(&delivery.location_type)
        .bind(DeliveryStatus::Pending)
        .bind(Json(Vec::<String>::new()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

    match result {
      Ok(_) => Ok(delivery.ticket_id.clone()),
      Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
        Err(Error::Conflict(delivery.ticket_id.clone()))
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn update_delivery(&self, ticket_id: &str, update: &DeliveryUpdate) -> Result<(), Error> {
    let result = sqlx::query(
      r#"
            UPDATE deliveries
            SET total_price = COALESCE(?, total_price),
                status = COALESCE(?, status),
                action_log = COALESCE(?, action_log)
            WHERE ticket_id = ?
            "#,
    )
    .bind(update.total_price)
    .bind(update.status)
    .bind(update.action_log.clone().map(Json))
    .bind(ticket_id)
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 0 {
      return Err(Error::NotFound(ticket_id.to_string()));
    }
    Ok(())
  }

  async fn get_delivery(&self, ticket_id: &str) -> Result<Option<Delivery>, Error> {
    let delivery = sqlx::query_as(
            r#"
            SELECT ticket_id, user_id, material_type, distance, urgency, weight, location_type, total_price, status, action_log, created_at
            FROM deliveries
            WHERE ticket_id = ?
            "#,
        )
        .bind(ticket_id)
        .fetch_optional(&self.pool)
        .await?;

    Ok(delivery)
  }

  async fn list_deliveries(&self, limit: u32) -> Result<Vec<Delivery>, Error> {
    let deliveries = sqlx::query_as(
            r#"
            SELECT ticket_id, user_id, material_type, distance, urgency, weight, location_type, total_price, status, action_log, created_at
            FROM deliveries
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

    Ok(deliveries)
  }

  async fn list_user_deliveries(&self, user_id: &str, limit: u32) -> Result<Vec<Delivery>, Error> {
    let deliveries = sqlx::query_as(
            r#"
            SELECT ticket_id, user_id, material_type, distance, urgency, weight, location_type, total_price, status, action_log, created_at
            FROM deliveries
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

    Ok(deliveries)
  }

  async fn log_error(&self, entry: &NewErrorLog) -> Result<ErrorLog, Error> {
    let timestamp = Utc::now();
    let result = sqlx::query(
      r#"
            INSERT INTO error_logs (ticket_id, error_type, error_message, node_name, timestamp)
            VALUES (?, ?, ?, ?, ?)
            "#,
    )
    .bind(&entry.ticket_id)
    .bind(&entry.error_type)
    .bind(&entry.error_message)
    .bind(&entry.node_name)
    .bind(timestamp)
    .execute(&self.pool)
    .await?;

    Ok(ErrorLog {
      id: result.last_insert_rowid(),
      ticket_id: entry.ticket_id.clone(),
      error_type: entry.error_type.clone(),
      error_message: entry.error_message.clone(),
      node_name: entry.node_name.clone(),
      timestamp,
    })
  }

  async fn errors_for_ticket(&self, ticket_id: &str) -> Result<Vec<ErrorLog>, Error> {
    let errors = sqlx::query_as(
      r#"
            SELECT id, ticket_id, error_type, error_message, node_name, timestamp
            FROM error_logs
            WHERE ticket_id = ?
            ORDER BY id ASC
            "#,
    )
    .bind(ticket_id)
    .fetch_all(&self.pool)
    .await?;

    Ok(errors)
  }

  async fn list_errors(&self, limit: u32) -> Result<Vec<ErrorLog>, Error> {
    let errors = sqlx::query_as(
      r#"
            SELECT id, ticket_id, error_type, error_message, node_name, timestamp
            FROM error_logs
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
    )
    .bind(limit)
    .fetch_all(&self.pool)
    .await?;

    Ok(errors)
  }

  async fn delivery_stats(&self) -> Result<DeliveryStats, Error> {
    let (total, completed, failed, pending, revenue): (i64, i64, i64, i64, f64) =
      sqlx::query_as(
        r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0),
                TOTAL(total_price)
            FROM deliveries
            "#,
      )
      .fetch_one(&self.pool)
      .await?;

    Ok(DeliveryStats::new(total, completed, failed, pending, revenue))
  }
}
