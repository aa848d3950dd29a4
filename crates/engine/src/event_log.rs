//! Event log: named, bounded, newest-first JSON logs in Redis.
//!
//! Each log is a Redis list. Appends are `LPUSH` followed by `LTRIM` in one
//! MULTI block, so a list never holds more than `retention` entries.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde_json::{Map, Value};

use omnilink_common::error::AppError;

/// The logs the API writes and exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogName {
    SentMessages,
    Leads,
    Contractors,
    Reviews,
    Messages,
    AdminMessages,
    Subscriptions,
    Badges,
    OverrideChanges,
}

impl LogName {
    pub const ALL: [LogName; 9] = [
        LogName::SentMessages,
        LogName::Leads,
        LogName::Contractors,
        LogName::Reviews,
        LogName::Messages,
        LogName::AdminMessages,
        LogName::Subscriptions,
        LogName::Badges,
        LogName::OverrideChanges,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogName::SentMessages => "sent_messages",
            LogName::Leads => "leads",
            LogName::Contractors => "contractors",
            LogName::Reviews => "reviews",
            LogName::Messages => "messages",
            LogName::AdminMessages => "admin_messages",
            LogName::Subscriptions => "subscriptions",
            LogName::Badges => "badges",
            LogName::OverrideChanges => "override_changes",
        }
    }

    fn key(&self) -> String {
        format!("omnilink:log:{}", self.as_str())
    }
}

impl std::fmt::Display for LogName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| AppError::NotFound(format!("Unknown log '{}'", s)))
    }
}

/// Redis-backed event log writer/reader.
#[derive(Debug, Clone)]
pub struct EventLog {
    retention: usize,
}

impl EventLog {
    pub fn new(retention: usize) -> Self {
        Self {
            retention: retention.max(1),
        }
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Stamp a payload with `ts`. Objects get the field merged in;
    /// anything else is wrapped as `{ts, data}`.
    pub fn entry(payload: Value, at: DateTime<Utc>) -> Value {
        let mut entry = Map::new();
        entry.insert("ts".to_string(), Value::String(at.to_rfc3339()));
        match payload {
            Value::Object(fields) => {
                for (k, v) in fields {
                    if k != "ts" {
                        entry.insert(k, v);
                    }
                }
            }
            other => {
                entry.insert("data".to_string(), other);
            }
        }
        Value::Object(entry)
    }

    /// Append one entry, trimming the list to the retention bound.
    pub async fn append(
        &self,
        redis: &mut ConnectionManager,
        name: LogName,
        payload: Value,
    ) -> Result<(), AppError> {
        let key = name.key();
        let serialized = Self::entry(payload, Utc::now()).to_string();
        let last = self.retention as isize - 1;

        let _: () = redis::pipe()
            .atomic()
            .lpush(&key, serialized)
            .ignore()
            .ltrim(&key, 0, last)
            .ignore()
            .query_async(redis)
            .await?;

        Ok(())
    }

    /// Append without failing the caller; a Redis error is only logged.
    pub async fn record(&self, redis: &mut ConnectionManager, name: LogName, payload: Value) {
        if let Err(e) = self.append(redis, name, payload).await {
            tracing::warn!(log = %name, error = %e, "Failed to append event log entry");
        }
    }

    /// Entries, newest first. Unparsable entries are skipped.
    pub async fn read(
        &self,
        redis: &mut ConnectionManager,
        name: LogName,
    ) -> Result<Vec<Value>, AppError> {
        let last = self.retention as isize - 1;
        let raw: Vec<String> = redis.lrange(name.key(), 0, last).await?;

        Ok(raw
            .into_iter()
            .filter_map(|line| match serde_json::from_str(&line) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(log = %name, error = %e, "Skipping corrupt event log entry");
                    None
                }
            })
            .collect())
    }
}
