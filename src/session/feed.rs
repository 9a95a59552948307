//! In-memory pending-notification list with id-keyed merge.
//!
//! Two producers feed this list: full reloads from the store and realtime
//! events from the hub. Both go through the same merge rules, keyed by
//! notification id, so arrival order between a reload and the stream does
//! not change the converged state:
//!
//! - `Created` inserts only if the id is unseen (a stale create never
//!   clobbers a newer update)
//! - `Updated` replaces in place, or inserts if the row was never seen
//! - `Deleted` removes
//! - any row with `is_acknowledged` leaves the pending list
//!
//! The list stays ordered newest-first by `created_at`.

use crate::domain::{NotificationEvent, NotificationId, PolicyNotification};

#[derive(Debug, Default, Clone)]
pub struct NotificationFeed {
    items: Vec<PolicyNotification>,
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[PolicyNotification] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        self.items.iter().any(|n| n.notification_id == id)
    }

    /// Replace the whole list from a store reload.
    pub fn replace_all(&mut self, mut rows: Vec<PolicyNotification>) {
        rows.retain(|n| !n.is_acknowledged);
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.items = rows;
    }

    /// Apply one realtime event. Idempotent: applying the same event twice
    /// leaves the list unchanged.
    pub fn apply(&mut self, event: &NotificationEvent) {
        match event {
            NotificationEvent::Created { row } => {
                if row.is_acknowledged {
                    self.remove(row.notification_id);
                } else if !self.contains(row.notification_id) {
                    self.insert_sorted(row.clone());
                }
            }
            NotificationEvent::Updated { row } => {
                if row.is_acknowledged {
                    self.remove(row.notification_id);
                } else if let Some(slot) = self
                    .items
                    .iter_mut()
                    .find(|n| n.notification_id == row.notification_id)
                {
                    *slot = row.clone();
                } else {
                    self.insert_sorted(row.clone());
                }
            }
            NotificationEvent::Deleted { id } => self.remove(*id),
        }
    }

    fn remove(&mut self, id: NotificationId) {
        self.items.retain(|n| n.notification_id != id);
    }

    fn insert_sorted(&mut self, row: PolicyNotification) {
        let at = self
            .items
            .iter()
            .position(|n| n.created_at <= row.created_at)
            .unwrap_or(self.items.len());
        self.items.insert(at, row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PolicyKind, PolicyVersion, UserId};
    use chrono::{Duration, Utc};

    fn row(id: NotificationId, minutes_ago: i64) -> PolicyNotification {
        PolicyNotification {
            notification_id: id,
            user_id: UserId::new(),
            policy_kind: PolicyKind::Terms,
            old_version: None,
            new_version: PolicyVersion::INITIAL,
            title: "Terms updated".to_string(),
            message: "Terms was updated to version 1.0.".to_string(),
            link: None,
            is_read: false,
            is_acknowledged: false,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            read_at: None,
            acknowledged_at: None,
        }
    }

    #[test]
    fn created_prepends_newest_first() {
        let mut feed = NotificationFeed::new();
        let old = row(NotificationId::new(), 10);
        let new = row(NotificationId::new(), 1);

        feed.apply(&NotificationEvent::Created { row: old.clone() });
        feed.apply(&NotificationEvent::Created { row: new.clone() });

        assert_eq!(feed.items()[0].notification_id, new.notification_id);
        assert_eq!(feed.items()[1].notification_id, old.notification_id);
    }

    #[test]
    fn created_is_idempotent() {
        let mut feed = NotificationFeed::new();
        let r = row(NotificationId::new(), 1);

        feed.apply(&NotificationEvent::Created { row: r.clone() });
        feed.apply(&NotificationEvent::Created { row: r.clone() });

        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn stale_create_does_not_clobber_update() {
        let mut feed = NotificationFeed::new();
        let id = NotificationId::new();
        let original = row(id, 5);
        let mut updated = original.clone();
        updated.is_read = true;

        feed.apply(&NotificationEvent::Updated { row: updated.clone() });
        feed.apply(&NotificationEvent::Created { row: original });

        assert_eq!(feed.len(), 1);
        assert!(feed.items()[0].is_read);
    }

    #[test]
    fn update_replaces_in_place() {
        let mut feed = NotificationFeed::new();
        let id = NotificationId::new();
        let original = row(id, 5);
        let mut updated = original.clone();
        updated.is_read = true;

        feed.apply(&NotificationEvent::Created { row: original });
        feed.apply(&NotificationEvent::Updated { row: updated });

        assert_eq!(feed.len(), 1);
        assert!(feed.items()[0].is_read);
    }

    #[test]
    fn acknowledged_rows_leave_the_feed() {
        let mut feed = NotificationFeed::new();
        let id = NotificationId::new();
        let original = row(id, 5);
        let mut acked = original.clone();
        acked.is_acknowledged = true;

        feed.apply(&NotificationEvent::Created { row: original });
        feed.apply(&NotificationEvent::Updated { row: acked });

        assert!(feed.is_empty());
    }

    #[test]
    fn delete_removes() {
        let mut feed = NotificationFeed::new();
        let id = NotificationId::new();

        feed.apply(&NotificationEvent::Created { row: row(id, 5) });
        feed.apply(&NotificationEvent::Deleted { id });
        feed.apply(&NotificationEvent::Deleted { id });

        assert!(feed.is_empty());
    }

    #[test]
    fn replace_all_drops_acknowledged_and_sorts() {
        let mut feed = NotificationFeed::new();
        let newest = row(NotificationId::new(), 1);
        let oldest = row(NotificationId::new(), 30);
        let mut acked = row(NotificationId::new(), 2);
        acked.is_acknowledged = true;

        feed.replace_all(vec![oldest.clone(), acked, newest.clone()]);

        assert_eq!(feed.len(), 2);
        assert_eq!(feed.items()[0].notification_id, newest.notification_id);
        assert_eq!(feed.items()[1].notification_id, oldest.notification_id);
    }
}
