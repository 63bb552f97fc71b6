//! Bookstore storefront with an in-process request metrics engine.
//!
//! Every request passes through the timing middleware, which records its
//! route, status, and duration into a shared [`metrics::MetricsRegistry`].
//! `/metrics`, `/metrics/stream`, and `/dashboard` report the aggregates.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub mod cli;
pub mod config;
pub mod handlers;
pub mod html;
pub mod load_generator;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod store;
pub mod telemetry;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    pub config: config::Config,

    /// Central metrics engine. The timing middleware records into it,
    /// reporting endpoints read snapshots.
    pub metrics: Arc<metrics::MetricsRegistry>,

    /// Catalog and shared cart.
    pub store: store::Store,

    /// Flag checked by every simulated shopper on each step.
    pub sim_running: Arc<AtomicBool>,

    /// Handle to the spawned simulation task so we can await clean shutdown.
    pub sim_handle: tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        Self {
            config,
            metrics: Arc::new(metrics::MetricsRegistry::new()),
            store: store::Store::with_demo_catalog(),
            sim_running: Arc::new(AtomicBool::new(false)),
            sim_handle: tokio::sync::Mutex::new(None),
        }
    }
}
