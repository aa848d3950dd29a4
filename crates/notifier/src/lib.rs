//! Notification delivery for OmniLink.
//!
//! Events are rendered into Telegram HTML text (`format`), then pushed to up to
//! three independent destinations by `FanOut`: the fixed admin chat, an optional
//! override chat, and the contractor's own chat. Delivery is at-most-once and
//! best effort; a failed send is reported, never raised.

pub mod fanout;
pub mod format;
pub mod telegram;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use omnilink_common::types::Destination;

pub use fanout::{DeliveryOutcome, FanOut, FanOutConfig, FanOutReport, Target};
pub use telegram::TelegramClient;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("rejected by bot API ({status}): {description}")]
    Rejected { status: u16, description: String },

    #[error("unreadable bot API response: {0}")]
    Decode(String),
}

/// Sends one text message to one destination.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, destination: &Destination, text: &str) -> Result<(), NotifyError>;
}

/// Convenient type alias for a shared sender.
pub type DynMessageSender = Arc<dyn MessageSender>;
