//! DeliverGraph
//!
//! Delivery price quoting built on a compiled state-graph workflow.
//!
//! [`DeliveryService`] owns one compiled pricing workflow together with its
//! collaborators and runs one invocation per [`quote`](DeliveryService::quote).
//!
//! ```ignore
//! let config = AppConfig::load(Path::new("delivergraph.json"))?;
//! let service = DeliveryService::connect(&config).await?;
//!
//! let state = service.quote(DeliveryRequest {
//!     user_id: "u1".into(),
//!     material_type: Some("fragile".into()),
//!     distance: Some(15.0),
//!     urgency: Some("express".into()),
//!     weight: Some(12.0),
//!     location_type: Some("rural".into()),
//!     ..Default::default()
//! }).await?;
//! assert_eq!(state.total_price, Some(375.0));
//! ```

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{info, instrument};

pub use delivergraph_config as config;
pub use delivergraph_notify as notify;
pub use delivergraph_pipeline as pipeline;
pub use delivergraph_store as store;
pub use delivergraph_workflow as workflow;

pub use delivergraph_config::{AppConfig, PricingConfig, ValidOptions, valid_options};
pub use delivergraph_pipeline::{DeliveryRequest, DeliveryState};

use delivergraph_notify::{ChannelNotifier, DisabledNotifier, Notifier, OutgoingMessage};
use delivergraph_pipeline::{Collaborators, build_workflow};
use delivergraph_store::{SqliteStore, Store};
use delivergraph_workflow::CompiledWorkflow;

/// Errors from constructing or running the service.
///
/// A rejected or failed quote is not an error: it comes back as a
/// [`DeliveryState`] with its error message set.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
  #[error("config error: {0}")]
  Config(#[from] delivergraph_config::ConfigError),

  #[error("storage error: {0}")]
  Store(#[from] delivergraph_store::Error),

  #[error("workflow graph error: {0}")]
  Graph(#[from] delivergraph_workflow::GraphError),

  /// An engine invariant was violated while running a quote.
  #[error("workflow execution error: {0}")]
  Execution(#[from] delivergraph_workflow::ExecutionError),
}

type Outbox = mpsc::UnboundedReceiver<OutgoingMessage>;

/// Prices delivery requests.
pub struct DeliveryService {
  workflow: CompiledWorkflow<DeliveryState>,
  store: Arc<dyn Store>,
  outbox: Mutex<Option<Outbox>>,
}

impl DeliveryService {
  /// Build the service around explicit collaborators.
  pub fn new(
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    pricing: PricingConfig,
  ) -> Result<Self, ServiceError> {
    pricing.validate()?;
    Self::from_collaborators(Collaborators {
      store,
      notifier,
      pricing: Arc::new(pricing),
      details_base_url: None,
    })
  }

  /// Build the service from collaborators, including the details link prefix.
  pub fn from_collaborators(collaborators: Collaborators) -> Result<Self, ServiceError> {
    let workflow = build_workflow(&collaborators)?;
    Ok(Self {
      workflow,
      store: collaborators.store,
      outbox: Mutex::new(None),
    })
  }

  /// Open the configured database, run migrations and wire the notifier.
  pub async fn connect(config: &AppConfig) -> Result<Self, ServiceError> {
    config.validate()?;

    let store = SqliteStore::connect(&config.database_url).await?;
    store.migrate().await?;
    info!(database_url = %config.database_url, "store ready");

    let (notifier, outbox) = if config.notification.enabled {
      let (notifier, outbox) = ChannelNotifier::channel(config.notification.from_address.clone());
      let notifier: Arc<dyn Notifier> = Arc::new(notifier);
      (notifier, Some(outbox))
    } else {
      info!("quote notifications disabled");
      let notifier: Arc<dyn Notifier> = Arc::new(DisabledNotifier);
      (notifier, None)
    };

    let service = Self::from_collaborators(Collaborators {
      store: Arc::new(store),
      notifier,
      pricing: Arc::new(config.pricing.clone()),
      details_base_url: Some(config.notification.details_base_url.clone()),
    })?;
    *service.lock_outbox() = outbox;
    Ok(service)
  }

  /// Price one request.
  #[instrument(name = "delivery_quote", skip(self, request), fields(user_id = %request.user_id))]
  pub async fn quote(&self, request: DeliveryRequest) -> Result<DeliveryState, ServiceError> {
    let state = self.workflow.invoke(DeliveryState::from(request)).await?;
    match &state.error_message {
      Some(error) => info!(ticket_id = %state.ticket_id, error = %error, "quote rejected"),
      None => info!(
        ticket_id = %state.ticket_id,
        total_price = state.total_price.unwrap_or_default(),
        "quote ready"
      ),
    }
    Ok(state)
  }

  /// The store, for read paths such as delivery lookup and statistics.
  pub fn store(&self) -> &Arc<dyn Store> {
    &self.store
  }

  pub fn workflow(&self) -> &CompiledWorkflow<DeliveryState> {
    &self.workflow
  }

  /// Claim the outgoing message queue. Only the first call gets it, and
  /// only when notifications are enabled.
  pub fn take_outbox(&self) -> Option<Outbox> {
    self.lock_outbox().take()
  }

  fn lock_outbox(&self) -> std::sync::MutexGuard<'_, Option<Outbox>> {
    self.outbox.lock().unwrap_or_else(|e| e.into_inner())
  }
}
