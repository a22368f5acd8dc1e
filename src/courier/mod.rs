//! Courier registration and the two-phase courier pipeline.
//!
//! Every notifiable kind has an ordered, immutable collection of couriers.
//! The pipeline runs all of them through `prepare` before a notification is
//! persisted and through `deliver` after, stopping a phase at the first
//! failure.

pub mod logging;
pub mod push;

pub use logging::LogCourier;
pub use push::PushCourier;

use crate::core::{Courier, Notification};
use crate::error::{ConfigError, DispatchError};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// The lifecycle phase a courier is invoked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before the notification is persisted
    Prepare,
    /// After the notification is persisted
    Deliver,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Prepare => "prepare",
            Phase::Deliver => "deliver",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supplies the ordered couriers registered for a notifiable kind.
pub trait CourierSource: Send + Sync {
    /// Couriers for `kind` in declaration order; empty when none are registered.
    fn couriers(&self, kind: &str) -> &[Arc<dyn Courier>];
}

/// Courier collections keyed by notifiable kind.
///
/// Built once and then shared read-only; the collections cannot change after
/// [`CourierRegistryBuilder::build`].
#[derive(Clone, Default)]
pub struct CourierRegistry {
    routes: HashMap<String, Arc<[Arc<dyn Courier>]>>,
}

impl CourierRegistry {
    pub fn builder() -> CourierRegistryBuilder {
        CourierRegistryBuilder::default()
    }

    /// Builds a registry from named routes.
    ///
    /// # Arguments
    /// * `routes` - Notifiable kind to ordered courier names.
    /// * `available` - The configured couriers, by name.
    pub fn from_routes(
        routes: &BTreeMap<String, Vec<String>>,
        available: &HashMap<String, Arc<dyn Courier>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Self::builder();
        for (kind, names) in routes {
            for name in names {
                let courier = available
                    .get(name)
                    .ok_or_else(|| ConfigError::UnknownCourier {
                        kind: kind.clone(),
                        courier: name.clone(),
                    })?;
                builder = builder.register(kind, Arc::clone(courier));
            }
        }
        Ok(builder.build())
    }

    /// The kinds that have at least one courier.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// The channels written by any routed courier, sorted and deduplicated.
    pub fn channels(&self) -> BTreeSet<&str> {
        self.routes
            .values()
            .flat_map(|couriers| couriers.iter().map(|c| c.channel()))
            .collect()
    }
}

impl CourierSource for CourierRegistry {
    fn couriers(&self, kind: &str) -> &[Arc<dyn Courier>] {
        match self.routes.get(kind) {
            Some(couriers) => &couriers[..],
            None => &[],
        }
    }
}

impl fmt::Debug for CourierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (kind, couriers) in &self.routes {
            let names: Vec<&str> = couriers.iter().map(|c| c.name()).collect();
            map.entry(kind, &names);
        }
        map.finish()
    }
}

#[derive(Default)]
pub struct CourierRegistryBuilder {
    routes: HashMap<String, Vec<Arc<dyn Courier>>>,
}

impl CourierRegistryBuilder {
    /// Appends `courier` to the collection for `kind`.
    pub fn register(mut self, kind: &str, courier: Arc<dyn Courier>) -> Self {
        self.routes.entry(kind.to_string()).or_default().push(courier);
        self
    }

    pub fn build(self) -> CourierRegistry {
        CourierRegistry {
            routes: self
                .routes
                .into_iter()
                .map(|(kind, couriers)| (kind, Arc::from(couriers)))
                .collect(),
        }
    }
}

/// Runs the couriers of a notification's kind through each lifecycle phase.
#[derive(Clone)]
pub struct CourierPipeline {
    source: Arc<dyn CourierSource>,
}

impl CourierPipeline {
    pub fn new(source: Arc<dyn CourierSource>) -> Self {
        Self { source }
    }

    /// Runs every courier's `prepare`, in order, before persistence.
    pub async fn prepare(&self, notification: &mut Notification) -> Result<(), DispatchError> {
        self.run(Phase::Prepare, notification).await
    }

    /// Runs every courier's `deliver`, in order, after persistence.
    pub async fn deliver(&self, notification: &mut Notification) -> Result<(), DispatchError> {
        self.run(Phase::Deliver, notification).await
    }

    #[instrument(skip_all, fields(phase = %phase, kind = %notification.notifiable.kind))]
    async fn run(&self, phase: Phase, notification: &mut Notification) -> Result<(), DispatchError> {
        let couriers = self.source.couriers(&notification.notifiable.kind);
        for courier in couriers {
            debug!(courier = courier.name(), "Running courier");
            let result = match phase {
                Phase::Prepare => courier.prepare(notification).await,
                Phase::Deliver => courier.deliver(notification).await,
            };
            if let Err(source) = result {
                metrics::counter!("courier_failures_total", "phase" => phase.as_str()).increment(1);
                error!(
                    courier = courier.name(),
                    error = %source,
                    "Courier failed, skipping the remaining couriers for this phase"
                );
                return Err(DispatchError::Courier {
                    courier: courier.name().to_string(),
                    phase,
                    source,
                });
            }
        }
        Ok(())
    }
}
