//! Dispatcher: runs the notification fan-out and records the attempt.

use redis::aio::ConnectionManager;
use serde_json::json;

use omnilink_common::types::Contractor;
use omnilink_notifier::{FanOut, FanOutReport};

use crate::event_log::{EventLog, LogName};

#[derive(Clone)]
pub struct Dispatcher {
    fanout: FanOut,
    log: EventLog,
}

impl Dispatcher {
    pub fn new(fanout: FanOut, log: EventLog) -> Self {
        Self { fanout, log }
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Notify admin, override and (when it has credentials) the contractor,
    /// then append the per-destination results to `sent_messages`.
    pub async fn notify(
        &self,
        redis: &mut ConnectionManager,
        text: &str,
        contractor: Option<&Contractor>,
    ) -> FanOutReport {
        let destination = contractor.and_then(Contractor::destination);
        let report = self.fanout.dispatch(text, destination.as_ref()).await;

        self.log
            .record(
                redis,
                LogName::SentMessages,
                json!({
                    "message_text": text,
                    "contractor_id": contractor.map(|c| c.id.as_str()),
                    "results": &report,
                }),
            )
            .await;

        report
    }
}
