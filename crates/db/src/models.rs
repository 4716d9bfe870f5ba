use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Pending,
    Confirmed,
    Unsubscribed,
}

impl SubscriptionStatus {
    pub fn to_core(self) -> cadencea_core::newsletter::SubscriptionStatus {
        match self {
            SubscriptionStatus::Pending => cadencea_core::newsletter::SubscriptionStatus::Pending,
            SubscriptionStatus::Confirmed => {
                cadencea_core::newsletter::SubscriptionStatus::Confirmed
            }
            SubscriptionStatus::Unsubscribed => {
                cadencea_core::newsletter::SubscriptionStatus::Unsubscribed
            }
        }
    }
}

/// One email's newsletter opt-in record. At most one row per email; rows are
/// never deleted, only moved between statuses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: String,
    pub email: String,
    pub user_id: Option<String>,
    pub status: SubscriptionStatus,
    pub confirmation_token: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    pub id: String,
    pub action: String,
    pub table_name: String,
    pub record_id: String,
    pub new_values: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSession {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_to_core() {
        use cadencea_core::newsletter::SubscriptionStatus as Core;
        assert_eq!(SubscriptionStatus::Pending.to_core(), Core::Pending);
        assert_eq!(SubscriptionStatus::Confirmed.to_core(), Core::Confirmed);
        assert_eq!(SubscriptionStatus::Unsubscribed.to_core(), Core::Unsubscribed);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&SubscriptionStatus::Unsubscribed).unwrap();
        assert_eq!(json, "\"unsubscribed\"");
    }
}
