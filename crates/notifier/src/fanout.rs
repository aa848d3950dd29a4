//! Notification fan-out to the admin, override and contractor destinations.

use serde::Serialize;

use omnilink_common::config::AppConfig;
use omnilink_common::types::Destination;

use crate::DynMessageSender;

/// Fixed destinations, built once at startup and never mutated.
#[derive(Debug, Clone, Default)]
pub struct FanOutConfig {
    pub admin: Option<Destination>,
    pub override_destination: Option<Destination>,
}

impl FanOutConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            admin: Destination::from_parts(
                config.bot_token.as_deref(),
                config.admin_chat_id.as_deref(),
            ),
            override_destination: Destination::from_parts(
                config.override_token.as_deref(),
                config.override_chat_id.as_deref(),
            ),
        }
    }
}

/// Which slot of the fan-out a delivery belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Admin,
    Override,
    Contractor,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Admin => write!(f, "admin"),
            Target::Override => write!(f, "override"),
            Target::Contractor => write!(f, "contractor"),
        }
    }
}

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryOutcome {
    pub target: Target,
    pub chat_id: String,
    pub delivered: bool,
    pub error: Option<String>,
}

/// Per-destination results of one fan-out.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FanOutReport {
    pub deliveries: Vec<DeliveryOutcome>,
}

impl FanOutReport {
    pub fn outcome(&self, target: Target) -> Option<&DeliveryOutcome> {
        self.deliveries.iter().find(|d| d.target == target)
    }

    pub fn delivered_count(&self) -> usize {
        self.deliveries.iter().filter(|d| d.delivered).count()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }
}

/// Sends one event text to every configured destination.
///
/// Sends are awaited one after another in admin, override, contractor order.
/// Each failure is logged and recorded in the report; none is returned as an
/// error, and none prevents the remaining sends.
#[derive(Clone)]
pub struct FanOut {
    sender: DynMessageSender,
    config: FanOutConfig,
}

impl FanOut {
    pub fn new(sender: DynMessageSender, config: FanOutConfig) -> Self {
        if config.admin.is_none() {
            tracing::warn!("No admin destination configured; admin notifications are disabled");
        }
        Self { sender, config }
    }

    pub fn config(&self) -> &FanOutConfig {
        &self.config
    }

    pub async fn dispatch(&self, text: &str, contractor: Option<&Destination>) -> FanOutReport {
        let targets = [
            (Target::Admin, self.config.admin.as_ref()),
            (Target::Override, self.config.override_destination.as_ref()),
            (Target::Contractor, contractor),
        ];

        let mut report = FanOutReport::default();
        for (target, destination) in targets {
            let Some(destination) = destination else {
                continue;
            };

            let outcome = match self.sender.send(destination, text).await {
                Ok(()) => DeliveryOutcome {
                    target,
                    chat_id: destination.chat_id.clone(),
                    delivered: true,
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(
                        slot = %target,
                        chat_id = %destination.chat_id,
                        error = %e,
                        "Notification delivery failed"
                    );
                    DeliveryOutcome {
                        target,
                        chat_id: destination.chat_id.clone(),
                        delivered: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            report.deliveries.push(outcome);
        }

        tracing::debug!(
            attempted = report.deliveries.len(),
            delivered = report.delivered_count(),
            "Fan-out complete"
        );
        report
    }
}
