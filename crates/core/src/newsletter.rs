//! Subscription state machine.
//!
//! Handlers load the current row (if any), ask this module which transition
//! applies, and execute it as a single conditional UPDATE. Keeping the
//! branching here means the whole table from the docs is unit-testable
//! without a database.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Pending,
    Confirmed,
    Unsubscribed,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Confirmed => "confirmed",
            SubscriptionStatus::Unsubscribed => "unsubscribed",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(SubscriptionStatus::Pending),
            "confirmed" => Some(SubscriptionStatus::Confirmed),
            "unsubscribed" => Some(SubscriptionStatus::Unsubscribed),
            _ => None,
        }
    }
}

/// What a subscribe request should do, given the existing row's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeAction {
    /// No row yet: insert a pending row with a fresh token and send the
    /// confirmation email.
    CreateNew,
    /// Row is confirmed: idempotent success, nothing to mutate or send.
    AlreadySubscribed,
    /// Row is pending: rotate the token (invalidating the old link) and
    /// resend the confirmation email.
    ResendConfirmation,
    /// Row is unsubscribed: back to pending with a fresh token.
    Resubscribe,
}

pub fn plan_subscribe(existing: Option<SubscriptionStatus>) -> SubscribeAction {
    match existing {
        None => SubscribeAction::CreateNew,
        Some(SubscriptionStatus::Confirmed) => SubscribeAction::AlreadySubscribed,
        Some(SubscriptionStatus::Pending) => SubscribeAction::ResendConfirmation,
        Some(SubscriptionStatus::Unsubscribed) => SubscribeAction::Resubscribe,
    }
}

impl SubscribeAction {
    /// Every branch except the idempotent one issues a new token and an
    /// outbound email.
    pub fn issues_token(&self) -> bool {
        !matches!(self, SubscribeAction::AlreadySubscribed)
    }
}

/// What a confirm request should do for the row the token matched.
/// A token that matches no row at all is handled by the caller; tokens are
/// nulled on use, so that case is indistinguishable from a bogus token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Pending row: apply the transition, set confirmed_at, clear the token.
    Apply,
    /// Already confirmed: idempotent success.
    AlreadyConfirmed,
    /// Unsubscribed row holding a stale token: reject, the caller must
    /// resubscribe.
    RequiresResubscribe,
}

pub fn plan_confirm(status: SubscriptionStatus) -> ConfirmAction {
    match status {
        SubscriptionStatus::Pending => ConfirmAction::Apply,
        SubscriptionStatus::Confirmed => ConfirmAction::AlreadyConfirmed,
        SubscriptionStatus::Unsubscribed => ConfirmAction::RequiresResubscribe,
    }
}

/// What an unsubscribe request should do for an existing row. A missing row
/// is a NotFound error at the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsubscribeAction {
    /// Pending or confirmed: apply the transition, set unsubscribed_at.
    Apply,
    /// Already unsubscribed: idempotent success.
    AlreadyUnsubscribed,
}

pub fn plan_unsubscribe(status: SubscriptionStatus) -> UnsubscribeAction {
    match status {
        SubscriptionStatus::Pending | SubscriptionStatus::Confirmed => UnsubscribeAction::Apply,
        SubscriptionStatus::Unsubscribed => UnsubscribeAction::AlreadyUnsubscribed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SubscriptionStatus::*;

    #[test]
    fn test_subscribe_unknown_email_creates_pending() {
        assert_eq!(plan_subscribe(None), SubscribeAction::CreateNew);
    }

    #[test]
    fn test_subscribe_confirmed_is_idempotent() {
        let action = plan_subscribe(Some(Confirmed));
        assert_eq!(action, SubscribeAction::AlreadySubscribed);
        assert!(!action.issues_token());
    }

    #[test]
    fn test_subscribe_pending_rotates_token() {
        let action = plan_subscribe(Some(Pending));
        assert_eq!(action, SubscribeAction::ResendConfirmation);
        assert!(action.issues_token());
    }

    #[test]
    fn test_subscribe_unsubscribed_resubscribes() {
        let action = plan_subscribe(Some(Unsubscribed));
        assert_eq!(action, SubscribeAction::Resubscribe);
        assert!(action.issues_token());
    }

    #[test]
    fn test_confirm_pending_applies() {
        assert_eq!(plan_confirm(Pending), ConfirmAction::Apply);
    }

    #[test]
    fn test_confirm_twice_is_noop() {
        assert_eq!(plan_confirm(Confirmed), ConfirmAction::AlreadyConfirmed);
    }

    #[test]
    fn test_confirm_unsubscribed_rejected() {
        assert_eq!(plan_confirm(Unsubscribed), ConfirmAction::RequiresResubscribe);
    }

    #[test]
    fn test_unsubscribe_pending_and_confirmed_apply() {
        assert_eq!(plan_unsubscribe(Pending), UnsubscribeAction::Apply);
        assert_eq!(plan_unsubscribe(Confirmed), UnsubscribeAction::Apply);
    }

    #[test]
    fn test_unsubscribe_twice_is_noop() {
        assert_eq!(
            plan_unsubscribe(Unsubscribed),
            UnsubscribeAction::AlreadyUnsubscribed
        );
    }

    #[test]
    fn test_status_round_trip() {
        for status in [Pending, Confirmed, Unsubscribed] {
            assert_eq!(SubscriptionStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(SubscriptionStatus::from_str("deleted"), None);
    }

    // Full lifecycle from the docs: subscribe -> confirm -> confirm again ->
    // unsubscribe -> subscribe again.
    #[test]
    fn test_full_lifecycle_plan() {
        assert_eq!(plan_subscribe(None), SubscribeAction::CreateNew);
        assert_eq!(plan_confirm(Pending), ConfirmAction::Apply);
        assert_eq!(plan_confirm(Confirmed), ConfirmAction::AlreadyConfirmed);
        assert_eq!(plan_unsubscribe(Confirmed), UnsubscribeAction::Apply);
        assert_eq!(plan_subscribe(Some(Unsubscribed)), SubscribeAction::Resubscribe);
    }
}
