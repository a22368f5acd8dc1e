#![allow(dead_code)]
pub mod fixtures;
pub mod recording;
pub mod test_metrics;

use notifiable::{
    courier::{CourierPipeline, CourierRegistry},
    Courier, Dispatcher, Notifiable, NotificationStore,
};
use std::sync::Arc;

/// Builds a dispatcher for `T` whose kind is routed to `couriers`, in order.
pub fn dispatcher<T: Notifiable>(
    couriers: Vec<Arc<dyn Courier>>,
    store: Arc<dyn NotificationStore>,
) -> Dispatcher<T> {
    let registry = couriers
        .into_iter()
        .fold(CourierRegistry::builder(), |builder, courier| {
            builder.register(T::kind(), courier)
        })
        .build();
    Dispatcher::new(CourierPipeline::new(Arc::new(registry)), store)
}
