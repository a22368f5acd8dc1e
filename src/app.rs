//! The main application logic, decoupled from the entry point.

use crate::{
    activity::Activity,
    config::Config,
    core::{Courier, NotificationStore},
    courier::{CourierPipeline, CourierRegistry, LogCourier, PushCourier},
    dispatch::{DispatchOutcome, Dispatcher},
    error::{ConfigError, DispatchError},
    formatting::PlainTextFormatter,
    resolver::Descriptors,
    store::MemoryStore,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Counts of what a batch of activities produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Activities that dispatched (even if every receiver was suppressed)
    pub dispatched: usize,
    /// Activities with no receiver
    pub skipped: usize,
    /// Notifications persisted
    pub created: usize,
}

/// A configured activity dispatcher and the store it writes to.
pub struct App {
    dispatcher: Dispatcher<Activity>,
    store: Arc<dyn NotificationStore>,
    registry: Arc<CourierRegistry>,
}

impl App {
    /// Creates a new `AppBuilder` to construct an `App`.
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder::new(config)
    }

    pub fn dispatcher(&self) -> &Dispatcher<Activity> {
        &self.dispatcher
    }

    pub fn store(&self) -> &Arc<dyn NotificationStore> {
        &self.store
    }

    pub fn registry(&self) -> &CourierRegistry {
        &self.registry
    }

    /// Dispatches each activity in order, stopping at the first failure.
    #[instrument(skip_all, fields(count = activities.len()))]
    pub async fn dispatch_all(&self, activities: &[Activity]) -> Result<DispatchReport, DispatchError> {
        let mut report = DispatchReport::default();
        for activity in activities {
            match self.dispatcher.notification_callback(activity).await? {
                DispatchOutcome::NothingToNotify => report.skipped += 1,
                DispatchOutcome::Dispatched(notifications) => {
                    report.dispatched += 1;
                    report.created += notifications.len();
                }
            }
        }
        info!(?report, "Finished dispatching activities");
        Ok(report)
    }
}

/// Builder for the main application.
///
/// Separates constructing the application's components from running it, and
/// lets tests override the store and individual couriers.
pub struct AppBuilder {
    config: Config,
    store_override: Option<Arc<dyn NotificationStore>>,
    courier_overrides: HashMap<String, Arc<dyn Courier>>,
}

impl AppBuilder {
    /// Creates a new `AppBuilder` with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store_override: None,
            courier_overrides: HashMap::new(),
        }
    }

    /// Overrides the notification store for testing.
    pub fn store_override(mut self, store: Arc<dyn NotificationStore>) -> Self {
        self.store_override = Some(store);
        self
    }

    /// Makes `courier` available to routes under `name`, replacing any
    /// configured courier of that name.
    pub fn courier_override(mut self, name: &str, courier: Arc<dyn Courier>) -> Self {
        self.courier_overrides.insert(name.to_string(), courier);
        self
    }

    /// Builds the couriers, routes and dispatcher, returning a runnable `App`.
    #[instrument(skip_all)]
    pub fn build(self) -> Result<App, ConfigError> {
        let config = self.config;

        let mut available: HashMap<String, Arc<dyn Courier>> = HashMap::new();
        if config.couriers.log.enabled {
            available.insert("log".to_string(), Arc::new(LogCourier));
        }
        if let Some(push) = &config.couriers.push {
            available.insert(
                "push".to_string(),
                Arc::new(PushCourier::new(push.clone(), Box::new(PlainTextFormatter))),
            );
        }
        available.extend(self.courier_overrides);

        let registry = Arc::new(CourierRegistry::from_routes(&config.routes, &available)?);
        debug!(?registry, "Built courier registry");

        let descriptors = config
            .activity
            .descriptors(Descriptors::of(), &Activity::accessors())?;

        let store = self
            .store_override
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn NotificationStore>);
        let pipeline = CourierPipeline::new(registry.clone());
        let dispatcher = Dispatcher::with_descriptors(descriptors, pipeline, Arc::clone(&store));

        Ok(App {
            dispatcher,
            store,
            registry,
        })
    }
}
