pub mod catalog;
pub mod contractors;
pub mod dispatcher;
pub mod event_log;
pub mod intake;
pub mod leads;
pub mod messages;
pub mod resolver;
pub mod reviews;
pub mod uploads;

/// Trim an optional string and drop it when blank.
pub(crate) fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
