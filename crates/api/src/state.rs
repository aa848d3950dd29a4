//! Shared application state for the Axum API server.

use omnilink_common::config::AppConfig;
use omnilink_engine::dispatcher::Dispatcher;
use omnilink_engine::event_log::EventLog;
use omnilink_engine::intake::IntakeProcessor;
use omnilink_engine::uploads::UploadStore;
use omnilink_notifier::{DynMessageSender, FanOut, FanOutConfig};
use redis::aio::ConnectionManager;
use sqlx::PgPool;

/// Application state shared across all route handlers via Axum `State`.
///
/// Everything here is built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub redis: ConnectionManager,
    pub config: AppConfig,
    pub intake: IntakeProcessor,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        redis: ConnectionManager,
        config: AppConfig,
        sender: DynMessageSender,
        uploads: UploadStore,
    ) -> Self {
        let fanout = FanOut::new(sender, FanOutConfig::from_app_config(&config));
        let dispatcher = Dispatcher::new(fanout, EventLog::new(config.log_retention));

        Self {
            pool,
            redis,
            config,
            intake: IntakeProcessor::new(dispatcher),
            uploads,
        }
    }

    pub fn event_log(&self) -> &EventLog {
        self.intake.dispatcher().log()
    }
}
