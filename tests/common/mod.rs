//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use policy_ledger::domain::{
    NotificationId, PolicyKind, PolicyNotification, PolicyVersion, UserId,
};

/// Test admin user ID
pub fn test_admin_id() -> UserId {
    UserId::from_uuid(Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap())
}

/// Test member user ID
pub fn test_user_id() -> UserId {
    UserId::from_uuid(Uuid::parse_str("22222222-2222-2222-2222-222222222222").unwrap())
}

/// Generate a random user ID
pub fn random_user_id() -> UserId {
    UserId::new()
}

/// A pending notification created `minutes_ago` minutes in the past.
pub fn notification_at(
    user: UserId,
    kind: PolicyKind,
    minutes_ago: i64,
) -> PolicyNotification {
    notification_with_time(user, kind, Utc::now() - Duration::minutes(minutes_ago))
}

pub fn notification_with_time(
    user: UserId,
    kind: PolicyKind,
    created_at: DateTime<Utc>,
) -> PolicyNotification {
    PolicyNotification {
        notification_id: NotificationId::new(),
        user_id: user,
        policy_kind: kind,
        old_version: None,
        new_version: PolicyVersion::INITIAL,
        title: format!("{kind} updated"),
        message: format!("{kind} was updated to version 1.0."),
        link: Some(format!("/policies/{kind}")),
        is_read: false,
        is_acknowledged: false,
        created_at,
        read_at: None,
        acknowledged_at: None,
    }
}
