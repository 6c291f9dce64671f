//! Alert Deduplicator
//!
//! Remembers when an alert was last emitted per `EventRef`. A repeat inside the
//! trailing window is suppressed. History is bounded: expired keys are pruned
//! on insert, then the oldest key is evicted if still at capacity.
//!
//! Not thread-safe on its own; the engine serializes access behind a mutex so
//! check-and-record is one step.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::types::EventRef;
use crate::logic::severity::Severity;

#[derive(Debug)]
pub struct AlertDeduplicator {
    window: Duration,
    capacity: usize,
    emitted: HashMap<EventRef, DateTime<Utc>>,
    // insertion order; may hold stale entries for re-emitted keys
    order: VecDeque<(EventRef, DateTime<Utc>)>,
}

impl AlertDeduplicator {
    pub fn new(window: Duration, capacity: usize) -> Self {
        Self {
            window,
            capacity: capacity.max(1),
            emitted: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.emitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitted.is_empty()
    }

    /// `true` = emit and remember; `false` = suppressed duplicate
    pub fn should_alert(&mut self, event_ref: &EventRef, severity: Severity, now: DateTime<Utc>) -> bool {
        if let Some(&last) = self.emitted.get(event_ref) {
            if self.within_window(last, now) {
                tracing::warn!(
                    event_ref = %event_ref,
                    severity = %severity,
                    last_emitted = %last,
                    "Duplicate alert suppressed"
                );
                return false;
            }
        }

        self.record(event_ref.clone(), now);
        true
    }

    fn within_window(&self, emitted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        // Clock went backwards: treat as recent
        match now.signed_duration_since(emitted_at).to_std() {
            Ok(elapsed) => elapsed < self.window,
            Err(_) => true,
        }
    }

    fn record(&mut self, event_ref: EventRef, now: DateTime<Utc>) {
        self.prune(now);

        while self.emitted.len() >= self.capacity {
            match self.order.pop_front() {
                Some((key, at)) => self.forget_if_current(&key, at),
                None => break,
            }
        }

        self.emitted.insert(event_ref.clone(), now);
        self.order.push_back((event_ref, now));
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        while let Some((_, at)) = self.order.front() {
            if self.within_window(*at, now) {
                break;
            }
            if let Some((key, at)) = self.order.pop_front() {
                self.forget_if_current(&key, at);
            }
        }
    }

    fn forget_if_current(&mut self, key: &EventRef, at: DateTime<Utc>) {
        if self.emitted.get(key) == Some(&at) {
            self.emitted.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn dedup() -> AlertDeduplicator {
        AlertDeduplicator::new(Duration::from_secs(60), 100)
    }

    #[test]
    fn test_same_ref_inside_window_is_suppressed() {
        let mut dedup = dedup();
        let key = EventRef::from("evt-1");
        let t0 = Utc::now();

        assert!(dedup.should_alert(&key, Severity::High, t0));
        assert!(!dedup.should_alert(&key, Severity::High, t0 + ChronoDuration::seconds(10)));
    }

    #[test]
    fn test_different_refs_both_alert() {
        let mut dedup = dedup();
        let t0 = Utc::now();

        assert!(dedup.should_alert(&EventRef::from("a"), Severity::High, t0));
        assert!(dedup.should_alert(&EventRef::from("b"), Severity::High, t0));
    }

    #[test]
    fn test_window_boundary_allows_again() {
        let mut dedup = dedup();
        let key = EventRef::from("evt");
        let t0 = Utc::now();

        assert!(dedup.should_alert(&key, Severity::Low, t0));
        assert!(!dedup.should_alert(&key, Severity::Low, t0 + ChronoDuration::seconds(59)));
        assert!(dedup.should_alert(&key, Severity::Low, t0 + ChronoDuration::seconds(60)));
        // re-emission restarts the window
        assert!(!dedup.should_alert(&key, Severity::Low, t0 + ChronoDuration::seconds(90)));
    }

    #[test]
    fn test_expired_entries_pruned_on_insert() {
        let mut dedup = dedup();
        let t0 = Utc::now();
        for i in 0..10 {
            dedup.should_alert(&EventRef::new(format!("old-{}", i)), Severity::Medium, t0);
        }
        assert_eq!(dedup.len(), 10);

        dedup.should_alert(&EventRef::from("new"), Severity::Medium, t0 + ChronoDuration::seconds(120));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut dedup = AlertDeduplicator::new(Duration::from_secs(60), 2);
        let t0 = Utc::now();
        let first = EventRef::from("first");

        assert!(dedup.should_alert(&first, Severity::High, t0));
        assert!(dedup.should_alert(&EventRef::from("second"), Severity::High, t0));
        assert!(dedup.should_alert(&EventRef::from("third"), Severity::High, t0));
        assert_eq!(dedup.len(), 2);

        // "first" was evicted, so it is no longer suppressed
        assert!(dedup.should_alert(&first, Severity::High, t0 + ChronoDuration::seconds(1)));
    }

    #[test]
    fn test_stale_order_entry_does_not_evict_fresh_key() {
        let mut dedup = AlertDeduplicator::new(Duration::from_secs(60), 2);
        let t0 = Utc::now();
        let key = EventRef::from("k");

        assert!(dedup.should_alert(&key, Severity::High, t0));
        assert!(dedup.should_alert(&key, Severity::High, t0 + ChronoDuration::seconds(61)));
        assert_eq!(dedup.len(), 1);
        assert!(!dedup.should_alert(&key, Severity::High, t0 + ChronoDuration::seconds(70)));
    }

    #[test]
    fn test_clock_skew_is_treated_as_recent() {
        let mut dedup = dedup();
        let key = EventRef::from("skew");
        let t0 = Utc::now();

        assert!(dedup.should_alert(&key, Severity::High, t0));
        assert!(!dedup.should_alert(&key, Severity::High, t0 - ChronoDuration::seconds(5)));
    }
}
