use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// Badge that soft-deletes a contractor.
pub const DELETED_BADGE: &str = "deleted";

/// A messaging-bot destination: the bot token plus the chat it posts into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub token: String,
    pub chat_id: String,
}

impl Destination {
    /// Build a destination only when both halves are present and non-blank.
    pub fn from_parts(token: Option<&str>, chat_id: Option<&str>) -> Option<Self> {
        let token = token.map(str::trim).filter(|t| !t.is_empty())?;
        let chat_id = chat_id.map(str::trim).filter(|c| !c.is_empty())?;
        Some(Self {
            token: token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }
}

/// Direction of a stored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageDirection {
    ToAdmin,
    ToContractor,
}

impl std::fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageDirection::ToAdmin => write!(f, "to_admin"),
            MessageDirection::ToContractor => write!(f, "to_contractor"),
        }
    }
}

/// Subscription plan applied to a contractor by an admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub plan: String,
    pub period_months: u32,
    pub price: f64,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SubscriptionPlan {
    /// Start a plan now; expiry is `period_months` calendar months later.
    pub fn starting_at(plan: String, period_months: u32, price: f64, now: DateTime<Utc>) -> Self {
        let expires_at = now.checked_add_months(Months::new(period_months)).unwrap_or(now);
        Self {
            plan,
            period_months,
            price,
            started_at: now,
            expires_at,
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// A service provider account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contractor {
    pub id: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub phone: String,
    pub service: Option<String>,
    pub email: Option<String>,
    /// Bot token used to notify this contractor; never sent to clients.
    #[serde(skip_serializing, default)]
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub logo_url: Option<String>,
    pub theme_color: Option<String>,
    pub bio: Option<String>,
    pub badge: Option<String>,
    pub subscription: Option<Json<SubscriptionPlan>>,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contractor {
    /// Company, then personal name, then phone.
    pub fn display_name(&self) -> &str {
        self.company
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.name.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(&self.phone)
    }

    /// The contractor's own notification destination, if fully configured.
    pub fn destination(&self) -> Option<Destination> {
        Destination::from_parts(
            self.telegram_token.as_deref(),
            self.telegram_chat_id.as_deref(),
        )
    }

    pub fn is_deleted(&self) -> bool {
        self.badge.as_deref() == Some(DELETED_BADGE)
    }
}

/// A prospective customer's service request.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub service: String,
    pub message: Option<String>,
    /// Contractor reference exactly as submitted (id, phone or name).
    pub contractor_ref: Option<String>,
    /// Canonical contractor id, resolved at creation time.
    pub contractor_id: Option<String>,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// A customer review of a contractor.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub contractor_id: Option<String>,
    pub contractor_ref: Option<String>,
    pub reviewer_name: String,
    pub rating: i32,
    pub comment: String,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A message between the admin and a contractor.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub contractor_id: String,
    pub body: String,
    pub direction: MessageDirection,
    pub created_at: DateTime<Utc>,
}

/// A service category from the public catalog.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}
