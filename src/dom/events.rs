use crate::dom::document::NodeId;
use crate::dom::page::Page;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Submit,
    DomContentLoaded,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Submit => "submit",
            EventKind::DomContentLoaded => "DOMContentLoaded",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Event {
    kind: EventKind,
    target: NodeId,
    current_target: NodeId,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    pub(crate) fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn current_target(&self) -> NodeId {
        self.current_target
    }

    pub(crate) fn set_current_target(&mut self, node: NodeId) {
        self.current_target = node;
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

pub type Handler = Arc<dyn Fn(&Page, &mut Event) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Clone)]
struct Listener {
    id: ListenerId,
    handler: Handler,
}

#[derive(Default)]
pub(crate) struct ListenerStore {
    map: HashMap<(NodeId, EventKind), Vec<Listener>>,
    next_id: u64,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node: NodeId, kind: EventKind, handler: Handler) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.map
            .entry((node, kind))
            .or_default()
            .push(Listener { id, handler });
        id
    }

    pub(crate) fn remove(&mut self, node: NodeId, kind: EventKind, id: ListenerId) -> bool {
        let Some(listeners) = self.map.get_mut(&(node, kind)) else {
            return false;
        };
        let Some(pos) = listeners.iter().position(|listener| listener.id == id) else {
            return false;
        };
        listeners.remove(pos);
        if listeners.is_empty() {
            self.map.remove(&(node, kind));
        }
        true
    }

    /// Snapshot so handlers can register or remove listeners while running.
    pub(crate) fn get(&self, node: NodeId, kind: EventKind) -> Vec<Handler> {
        self.map
            .get(&(node, kind))
            .map(|listeners| listeners.iter().map(|l| l.handler.clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.map.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::document::Document;

    #[test]
    fn test_store_add_and_remove() {
        let doc = Document::new(1024);
        let body = doc.body();
        let mut store = ListenerStore::default();
        let handler: Handler = Arc::new(|_, _| {});

        let first = store.add(body, EventKind::Click, handler.clone());
        let second = store.add(body, EventKind::Click, handler);
        assert_ne!(first, second);
        assert_eq!(store.get(body, EventKind::Click).len(), 2);
        assert!(store.get(body, EventKind::Submit).is_empty());

        assert!(store.remove(body, EventKind::Click, first));
        assert!(!store.remove(body, EventKind::Click, first));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_event_flags() {
        let doc = Document::new(1024);
        let mut event = Event::new(EventKind::Submit, doc.body());
        assert!(!event.default_prevented());
        event.prevent_default();
        event.stop_propagation();
        assert!(event.default_prevented());
        assert!(event.propagation_stopped());
        assert_eq!(event.kind().as_str(), "submit");
    }
}
