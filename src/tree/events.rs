//! Cluster-wide event list with unread hints

use std::collections::{HashSet, VecDeque};

use crate::constants::DEFAULT_MAX_EVENTS;
use crate::models::KubeEvent;

/// Events in arrival order, deduplicated by uid and capped in size.
///
/// While the events panel is closed, new arrivals raise the "has new" hint,
/// and warnings also raise "has new warning". Opening the panel clears both.
#[derive(Debug)]
pub struct EventStore {
    events: VecDeque<KubeEvent>,
    seen: HashSet<String>,
    max_events: usize,
    panel_open: bool,
    has_new_events: bool,
    has_new_warnings: bool,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EVENTS)
    }
}

impl EventStore {
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::new(),
            seen: HashSet::new(),
            max_events: max_events.max(1),
            panel_open: false,
            has_new_events: false,
            has_new_warnings: false,
        }
    }

    /// Replace the list wholesale, e.g. after fetching `/api/events`. No hints.
    pub fn set_events(&mut self, events: Vec<KubeEvent>) {
        self.events.clear();
        self.seen.clear();
        for event in events {
            self.push(event);
        }
    }

    /// Append an event unless its uid is already known.
    ///
    /// Returns false for duplicates, which leave the store untouched.
    pub fn add_event(&mut self, event: KubeEvent) -> bool {
        if self.seen.contains(&event.uid) {
            return false;
        }
        if !self.panel_open {
            self.has_new_events = true;
            if event.is_warning() {
                self.has_new_warnings = true;
            }
        }
        self.push(event);
        true
    }

    fn push(&mut self, event: KubeEvent) {
        if !self.seen.insert(event.uid.clone()) {
            return;
        }
        self.events.push_back(event);
        while self.events.len() > self.max_events {
            if let Some(evicted) = self.events.pop_front() {
                self.seen.remove(&evicted.uid);
            }
        }
    }

    pub fn toggle_panel(&mut self) {
        self.panel_open = !self.panel_open;
        if self.panel_open {
            self.clear_hints();
        }
    }

    pub fn clear_hints(&mut self) {
        self.has_new_events = false;
        self.has_new_warnings = false;
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn has_new_events(&self) -> bool {
        self.has_new_events
    }

    pub fn has_new_warnings(&self) -> bool {
        self.has_new_warnings
    }

    pub fn events(&self) -> impl Iterator<Item = &KubeEvent> {
        self.events.iter()
    }

    /// Events attached to one resource, newest observation first
    pub fn events_for(&self, resource_uid: &str) -> Vec<&KubeEvent> {
        let mut found: Vec<_> = self
            .events
            .iter()
            .filter(|e| e.resource_uid == resource_uid)
            .collect();
        found.sort_by(|a, b| b.last_observed.cmp(&a.last_observed));
        found
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventType;
    use chrono::Utc;

    fn event(uid: &str, event_type: EventType) -> KubeEvent {
        KubeEvent {
            uid: uid.to_string(),
            kind: "Kustomization".to_string(),
            name: "apps".to_string(),
            namespace: "flux-system".to_string(),
            reason: "ReconciliationSucceeded".to_string(),
            message: "applied".to_string(),
            source: "kustomize-controller".to_string(),
            event_type,
            first_observed: Utc::now(),
            last_observed: Utc::now(),
            count: 1,
            resource_uid: "ks-1".to_string(),
        }
    }

    #[test]
    fn test_hints_only_while_panel_closed() {
        let mut store = EventStore::default();
        store.add_event(event("e1", EventType::Normal));
        assert!(store.has_new_events());
        assert!(!store.has_new_warnings());

        store.toggle_panel();
        assert!(store.is_panel_open());
        assert!(!store.has_new_events());

        store.add_event(event("e2", EventType::Warning));
        assert!(!store.has_new_warnings());

        store.toggle_panel();
        store.add_event(event("e3", EventType::Warning));
        assert!(store.has_new_warnings());
        assert_eq!(store.events_for("ks-1").len(), 3);
        assert!(store.events_for("other").is_empty());
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut store = EventStore::new(2);
        for uid in ["a", "b", "c"] {
            store.add_event(event(uid, EventType::Normal));
        }
        let uids: Vec<_> = store.events().map(|e| e.uid.as_str()).collect();
        assert_eq!(uids, vec!["b", "c"]);
        // evicted uids may come back
        assert!(store.add_event(event("a", EventType::Normal)));
    }

    #[test]
    fn test_set_events_dedups_without_hints() {
        let mut store = EventStore::default();
        store.set_events(vec![
            event("a", EventType::Warning),
            event("a", EventType::Warning),
        ]);
        assert_eq!(store.len(), 1);
        assert!(!store.has_new_events());
    }
}
