//! Property-based tests using proptest.
//!
//! The pending-notification feed is fed by two producers: realtime events
//! and full reloads. These tests verify the merge converges regardless of
//! how the two interleave.

mod common;

use proptest::prelude::*;

use policy_ledger::domain::{NotificationEvent, PolicyKind, PolicyNotification, UserId};
use policy_ledger::session::NotificationFeed;

use common::notification_at;

fn arb_kind() -> impl Strategy<Value = PolicyKind> {
    prop_oneof![
        Just(PolicyKind::Terms),
        Just(PolicyKind::Privacy),
        Just(PolicyKind::CodeOfConduct),
        Just(PolicyKind::TrustSafety),
    ]
}

/// A pool of candidate rows, all for one user.
fn arb_rows(user: UserId) -> impl Strategy<Value = Vec<PolicyNotification>> {
    prop::collection::vec((arb_kind(), 0i64..10_000), 1..8).prop_map(move |specs| {
        specs
            .into_iter()
            .map(|(kind, age)| notification_at(user, kind, age))
            .collect()
    })
}

/// Event sequences over the row pool: create, read-flag update,
/// acknowledge update, delete.
fn arb_events(rows: Vec<PolicyNotification>) -> impl Strategy<Value = Vec<NotificationEvent>> {
    let n = rows.len();
    prop::collection::vec((0..n, 0u8..4), 0..24).prop_map(move |ops| {
        ops.into_iter()
            .map(|(idx, op)| {
                let row = rows[idx].clone();
                match op {
                    0 => NotificationEvent::Created { row },
                    1 => {
                        let mut row = row;
                        row.is_read = true;
                        NotificationEvent::Updated { row }
                    }
                    2 => {
                        let mut row = row;
                        row.is_acknowledged = true;
                        NotificationEvent::Updated { row }
                    }
                    _ => NotificationEvent::Deleted {
                        id: row.notification_id,
                    },
                }
            })
            .collect()
    })
}

proptest! {
    /// Applying an event sequence twice leaves the feed exactly where one
    /// application left it.
    #[test]
    fn merge_is_idempotent(
        (rows, events) in arb_rows(UserId::new())
            .prop_flat_map(|rows| (Just(rows.clone()), arb_events(rows)))
    ) {
        let _ = rows;
        let mut once = NotificationFeed::new();
        for event in &events {
            once.apply(event);
        }

        let mut twice = once.clone();
        for event in &events {
            twice.apply(event);
        }

        prop_assert_eq!(once.items(), twice.items());
    }

    /// The feed stays ordered newest-first under any event sequence.
    #[test]
    fn merge_preserves_newest_first_order(
        (rows, events) in arb_rows(UserId::new())
            .prop_flat_map(|rows| (Just(rows.clone()), arb_events(rows)))
    ) {
        let _ = rows;
        let mut feed = NotificationFeed::new();
        for event in &events {
            feed.apply(event);
        }

        let items = feed.items();
        for pair in items.windows(2) {
            prop_assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    /// An insert-then-update pair for one id converges to the update
    /// payload no matter where a full reload lands in the stream.
    ///
    /// Events are emitted after the store commit, so a reload taken at any
    /// point during delivery already sees the committed update.
    #[test]
    fn insert_then_update_converges_across_reloads(reload_at in 0usize..3) {
        let user = UserId::new();
        let row = notification_at(user, PolicyKind::Terms, 5);
        let mut updated = row.clone();
        updated.is_read = true;

        let server_state = vec![updated.clone()];
        let events = [
            NotificationEvent::Created { row: row.clone() },
            NotificationEvent::Updated { row: updated.clone() },
        ];

        let mut feed = NotificationFeed::new();
        for (i, event) in events.iter().enumerate() {
            if i == reload_at {
                feed.replace_all(server_state.clone());
            }
            feed.apply(event);
        }
        if reload_at >= events.len() {
            feed.replace_all(server_state.clone());
        }

        prop_assert_eq!(feed.items().len(), 1);
        prop_assert_eq!(&feed.items()[0], &updated);
    }

    /// Acknowledged rows never survive in the pending feed, whichever path
    /// delivers them.
    #[test]
    fn acknowledged_rows_never_linger(
        (rows, events) in arb_rows(UserId::new())
            .prop_flat_map(|rows| (Just(rows.clone()), arb_events(rows)))
    ) {
        let mut feed = NotificationFeed::new();
        feed.replace_all(rows);
        for event in &events {
            feed.apply(event);
        }

        prop_assert!(feed.items().iter().all(|n| !n.is_acknowledged));
    }
}
