//! Telegram HTML renderings of lead, review, contractor and message events.
//!
//! All user-supplied text is escaped; long free text is cut to keep alerts short.

use chrono::{DateTime, Utc};

use omnilink_common::types::{Contractor, Lead, Review};

const LEAD_MESSAGE_LIMIT: usize = 200;
const REVIEW_COMMENT_LIMIT: usize = 300;

/// Escape the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Cut `input` to at most `max` characters, appending `...` when cut.
pub fn truncate(input: &str, max: usize) -> String {
    match input.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}...", &input[..byte_idx]),
        None => input.to_string(),
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn or_dash(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => escape_html(v),
        None => "-".to_string(),
    }
}

pub fn lead_alert(lead: &Lead, contractor_name: Option<&str>) -> String {
    let mut lines = vec![
        "<b>📩 New Lead</b>".to_string(),
        format!("👤 {}", escape_html(&lead.name)),
        format!("📞 {}", escape_html(&lead.phone)),
        format!("🛠 {}", escape_html(&lead.service)),
    ];
    if let Some(message) = lead.message.as_deref().filter(|m| !m.is_empty()) {
        lines.push(format!(
            "💬 {}",
            escape_html(&truncate(message, LEAD_MESSAGE_LIMIT))
        ));
    }
    if let Some(email) = lead.email.as_deref().filter(|e| !e.is_empty()) {
        lines.push(format!("📧 {}", escape_html(email)));
    }
    if let Some(name) = contractor_name {
        lines.push(format!("👷 Sent towards: {}", escape_html(name)));
    }
    lines.push(format!("⏱ {}", timestamp(lead.created_at)));
    lines.join("\n")
}

pub fn contractor_alert(contractor: &Contractor, created: bool) -> String {
    let title = if created {
        "🧰 Contractor Signup"
    } else {
        "🧰 Contractor Update"
    };
    format!(
        "<b>{}</b>\nCompany: {}\nName: {}\nService: {}\nPhone: {}",
        title,
        or_dash(contractor.company.as_deref()),
        or_dash(contractor.name.as_deref()),
        or_dash(contractor.service.as_deref()),
        escape_html(&contractor.phone),
    )
}

/// `contractor_label` is the resolved display name, or the raw reference on a miss.
pub fn review_alert(review: &Review, contractor_label: Option<&str>) -> String {
    let mut text = format!(
        "<b>⭐ New Review</b>\nContractor: {}\nReviewer: {}\nRating: {}",
        or_dash(contractor_label),
        escape_html(&review.reviewer_name),
        review.rating,
    );
    if !review.comment.is_empty() {
        text.push_str(&format!(
            "\nComment: {}",
            escape_html(&truncate(&review.comment, REVIEW_COMMENT_LIMIT))
        ));
    }
    if !review.images.is_empty() {
        text.push_str(&format!("\n🖼 {} image(s)", review.images.len()));
    }
    text
}

pub fn admin_message(body: &str, at: DateTime<Utc>) -> String {
    format!(
        "<b>📣 Message from Admin</b>\n{}\n⏱ {}",
        escape_html(body),
        timestamp(at)
    )
}

pub fn contractor_message(contractor_name: &str, body: &str, at: DateTime<Utc>) -> String {
    format!(
        "<b>✉️ Message from {}</b>\n{}\n⏱ {}",
        escape_html(contractor_name),
        escape_html(body),
        timestamp(at)
    )
}
